//! Self-contained HTML test page served at `/`.

/// Test page: a textarea, an elapsed-time status line, and an audio player
/// that plays the WAV returned by `POST /tts`.
pub const INDEX_HTML: &str = r#"<!doctype html>
<html>
<head>
  <meta charset="utf-8">
  <title>Kokoro TTS</title>
  <style>
    body {
      font-family: system-ui, -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif;
      margin: 2rem;
      background: #111;
      color: #eee;
    }
    textarea {
      width: 100%;
      max-width: 640px;
    }
    button {
      padding: 0.5rem 1rem;
      font-size: 1rem;
      cursor: pointer;
    }
    #status {
      margin-top: 1rem;
      font-size: 0.95rem;
      font-style: italic;
    }
  </style>
</head>
<body>
  <h1>Kokoro-82M TTS</h1>
  <form id="tts-form">
    <textarea name="text" id="text" rows="5" cols="60"
              placeholder="Type some text to synthesize..."></textarea><br><br>
    <button type="submit" id="submit-btn">Generate Speech</button>
  </form>

  <div id="status"></div>

  <h2>Output</h2>
  <audio id="player" controls></audio>

  <script>
    const form = document.getElementById('tts-form');
    const player = document.getElementById('player');
    const statusEl = document.getElementById('status');
    const submitBtn = document.getElementById('submit-btn');

    let timerId = null;
    let elapsed = 0;

    function startTimer() {
      elapsed = 0;
      statusEl.textContent = 'Processing... 0.0s';
      timerId = setInterval(() => {
        elapsed += 0.1;
        statusEl.textContent = 'Processing... ' + elapsed.toFixed(1) + 's';
      }, 100);
    }

    function stopTimer(success, errorMsg) {
      if (timerId !== null) {
        clearInterval(timerId);
        timerId = null;
      }
      if (success) {
        statusEl.textContent = 'Done in ' + elapsed.toFixed(1) + 's';
      } else {
        statusEl.textContent = 'Error after ' + elapsed.toFixed(1) + 's: ' + errorMsg;
      }
    }

    form.addEventListener('submit', async (e) => {
      e.preventDefault();
      const text = document.getElementById('text').value;
      if (!text.trim()) {
        alert('Please enter some text.');
        return;
      }

      submitBtn.disabled = true;
      startTimer();

      try {
        const resp = await fetch('/tts', {
          method: 'POST',
          body: new URLSearchParams({ text: text })
        });

        if (!resp.ok) {
          let errText = resp.statusText;
          try {
            const errJson = await resp.json();
            if (errJson && errJson.error) {
              errText = errJson.error;
            }
          } catch (_) {}
          stopTimer(false, errText);
        } else {
          const blob = await resp.blob();
          player.src = URL.createObjectURL(blob);
          player.play();
          stopTimer(true);
        }
      } catch (err) {
        stopTimer(false, err.message || err);
      } finally {
        submitBtn.disabled = false;
      }
    });
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_posts_to_the_tts_endpoint() {
        assert!(INDEX_HTML.contains("fetch('/tts'"));
        assert!(INDEX_HTML.contains("URLSearchParams"));
    }

    #[test]
    fn page_has_player_and_status() {
        assert!(INDEX_HTML.contains("<audio"));
        assert!(INDEX_HTML.contains("id=\"status\""));
    }
}
