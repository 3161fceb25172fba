//! Single-page recorder UI
//!
//! The page records microphone audio with the Web Audio API, uploads it as
//! raw 16-bit PCM to `/api/turn`, plays the reply and re-renders the
//! transcript from the server's markup.

use crate::history::{StatusKind, render_status};
use crate::locale::Locale;

/// Render the full page with the current transcript
#[must_use]
pub fn render_page(locale: Locale, history_html: &str) -> String {
    let m = locale.messages();
    let status_html = render_status(m.ready, StatusKind::Info);
    let strings = serde_json::json!({
        "recording": m.recording,
        "processing": m.processing,
        "microphoneDenied": m.microphone_denied,
    });

    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{css}</style>
</head>
<body>
<div class="container">
  <div class="header">
    <h1 class="app-title">{title}</h1>
    <p class="app-subtitle">{subtitle}</p>
  </div>
  <div class="columns">
    <div class="column wide">
      <div class="panel">
        <div class="panel-header"><div class="panel-icon">💬</div><h2 class="panel-title">{history_title}</h2></div>
        <div id="chat-history" class="chat-history">{history_html}</div>
      </div>
    </div>
    <div class="column">
      <div class="panel">
        <div class="panel-header"><div class="panel-icon">🎤</div><h2 class="panel-title">{record_title}</h2></div>
        <div class="recording-indicator">
          <div id="ready-indicator"><span class="record-icon">⚪</span> {ready_to_record}</div>
          <div id="recording-active" class="pulse-recording" hidden><span class="record-icon">🔴</span> {recording}</div>
        </div>
        <div class="row">
          <button id="record-btn" class="secondary" type="button">🎙️</button>
          <span id="clip-info" class="clip-info"></span>
        </div>
        <div class="row">
          <button id="clear-btn" class="secondary" type="button">{clear_button}</button>
          <button id="submit-btn" class="primary" type="button">{send_button}</button>
        </div>
        <div id="status">{status_html}</div>
      </div>
      <div class="panel">
        <div class="panel-header"><div class="panel-icon">🔊</div><h2 class="panel-title">{reply_title}</h2></div>
        <audio id="voice-output" controls></audio>
      </div>
    </div>
  </div>
  <div class="footer"><p>{footer}</p></div>
</div>
<script>
const STRINGS = {strings};
{script}
</script>
</body>
</html>
"#,
        lang = locale.tag(),
        title = m.app_title,
        subtitle = m.app_subtitle,
        history_title = m.history_title,
        record_title = m.record_title,
        reply_title = m.reply_title,
        ready_to_record = m.ready_to_record,
        recording = m.recording,
        clear_button = m.clear_button,
        send_button = m.send_button,
        footer = m.footer,
        css = STYLE,
        script = SCRIPT,
    )
}

const STYLE: &str = r"
body { font-family: 'Segoe UI', Roboto, Arial, sans-serif; background-color: #f5f5f5; color: #333; margin: 0; line-height: 1.5; }
.container { max-width: 1200px; margin: 0 auto; }
.header { background-color: #4b6cb7; padding: 20px; border-radius: 0 0 10px 10px; margin-bottom: 20px; text-align: center; }
.app-title { margin: 0; font-size: 2rem; font-weight: 700; color: white; }
.app-subtitle { color: rgba(255, 255, 255, 0.9); font-size: 1rem; margin-top: 10px; }
.columns { display: flex; gap: 15px; flex-wrap: wrap; }
.column { flex: 2; min-width: 280px; }
.column.wide { flex: 3; }
.panel { background-color: white; border-radius: 8px; padding: 15px; margin-bottom: 15px; box-shadow: 0 2px 5px rgba(0, 0, 0, 0.1); }
.panel-header { display: flex; align-items: center; margin-bottom: 15px; border-bottom: 1px solid #eee; padding-bottom: 10px; }
.panel-icon { margin-right: 10px; font-size: 1.2rem; }
.panel-title { margin: 0; font-size: 1.1rem; font-weight: 600; }
.chat-container { max-height: 500px; overflow-y: auto; padding: 10px; border-radius: 8px; background-color: #fafafa; border: 1px solid #eee; }
.chat-row { margin-bottom: 15px; display: flex; flex-direction: column; }
.chat-bubble { padding: 10px 15px; max-width: 85%; border-radius: 12px; box-shadow: 0 1px 3px rgba(0, 0, 0, 0.1); }
.user-bubble { background-color: #3b5998; color: white; align-self: flex-end; border-bottom-right-radius: 4px; }
.assistant-bubble { background-color: #f0f0f0; color: #333; align-self: flex-start; border-bottom-left-radius: 4px; }
.chat-content { display: flex; align-items: flex-start; }
.chat-icon { margin-right: 8px; }
.timestamp { font-size: 0.75rem; opacity: 0.7; margin-top: 5px; text-align: right; }
.empty-history { text-align: center; color: #777; padding: 20px; font-style: italic; background-color: #fafafa; border-radius: 8px; border: 1px dashed #ddd; }
.recording-indicator { display: flex; align-items: center; justify-content: center; padding: 10px; margin: 10px 0; border-radius: 8px; background-color: #fafafa; border: 1px solid #eee; }
.pulse-recording { display: flex; align-items: center; color: #e53935; font-weight: 600; }
.record-icon { margin-right: 10px; }
.row { display: flex; gap: 10px; align-items: center; margin: 10px 0; }
.clip-info { color: #777; font-size: 0.9rem; }
button { flex: 1; padding: 10px; border-radius: 8px; border: 1px solid #e0e0e0; font-size: 1rem; cursor: pointer; }
button:disabled { opacity: 0.5; cursor: wait; }
button.primary { background-color: #4b6cb7; color: #fff; border-color: #4b6cb7; }
button.primary:hover { background-color: #3b5998; }
button.secondary { background-color: #fff; }
#voice-output { width: 100%; }
.status-message { margin-top: 10px; padding: 10px; border-radius: 8px; text-align: center; font-weight: 500; font-size: 0.9rem; }
.status-error { background-color: #ffebee; color: #c62828; border-left: 3px solid #c62828; }
.status-success { background-color: #e8f5e9; color: #2e7d32; border-left: 3px solid #2e7d32; }
.status-warning { background-color: #fff8e1; color: #f9a825; border-left: 3px solid #f9a825; }
.footer { text-align: center; margin-top: 20px; padding: 15px; color: #777; background-color: #f0f0f0; border-radius: 8px 8px 0 0; }
@media (max-width: 768px) { .app-title { font-size: 1.5rem; } .panel { padding: 10px; } .chat-bubble { max-width: 95%; } }
";

const SCRIPT: &str = r#"
const recordBtn = document.getElementById('record-btn');
const submitBtn = document.getElementById('submit-btn');
const clearBtn = document.getElementById('clear-btn');
const statusEl = document.getElementById('status');
const historyEl = document.getElementById('chat-history');
const clipInfo = document.getElementById('clip-info');
const output = document.getElementById('voice-output');
const readyIndicator = document.getElementById('ready-indicator');
const recordingActive = document.getElementById('recording-active');

let recorder = null;
let clip = null;

function setStatus(html) { statusEl.innerHTML = html; }

function setRecording(active) {
  recordingActive.hidden = !active;
  readyIndicator.hidden = active;
  recordBtn.textContent = active ? '⏹️' : '🎙️';
}

async function startRecording() {
  let stream;
  try {
    stream = await navigator.mediaDevices.getUserMedia({ audio: { channelCount: 1 } });
  } catch (e) {
    setStatus('<div class="status-message status-warning">' + STRINGS.microphoneDenied + '</div>');
    return;
  }
  const context = new AudioContext();
  const source = context.createMediaStreamSource(stream);
  const node = context.createScriptProcessor(4096, 1, 1);
  const chunks = [];
  node.onaudioprocess = (event) => chunks.push(new Float32Array(event.inputBuffer.getChannelData(0)));
  source.connect(node);
  node.connect(context.destination);
  recorder = { stream, context, source, node, chunks };
  clip = null;
  clipInfo.textContent = '';
  setRecording(true);
}

function stopRecording() {
  const { stream, context, source, node, chunks } = recorder;
  source.disconnect();
  node.disconnect();
  stream.getTracks().forEach((track) => track.stop());
  const length = chunks.reduce((sum, chunk) => sum + chunk.length, 0);
  const pcm = new Int16Array(length);
  let offset = 0;
  for (const chunk of chunks) {
    for (let i = 0; i < chunk.length; i++) {
      const s = Math.max(-1, Math.min(1, chunk[i]));
      pcm[offset++] = s < 0 ? s * 0x8000 : s * 0x7fff;
    }
  }
  clip = { sampleRate: context.sampleRate, pcm };
  clipInfo.textContent = (length / context.sampleRate).toFixed(1) + ' s';
  context.close();
  recorder = null;
  setRecording(false);
}

recordBtn.addEventListener('click', () => (recorder ? stopRecording() : startRecording()));

submitBtn.addEventListener('click', async () => {
  if (recorder) stopRecording();
  submitBtn.disabled = true;
  clearBtn.disabled = true;
  setStatus('<div class="status-message">' + STRINGS.processing + '</div>');
  try {
    const rate = clip ? clip.sampleRate : 16000;
    const response = await fetch('/api/turn?sample_rate=' + rate + '&channels=1', {
      method: 'POST',
      headers: { 'Content-Type': 'application/octet-stream' },
      body: clip ? clip.pcm.buffer : new ArrayBuffer(0),
    });
    const reply = await response.json();
    setStatus(reply.status_html);
    if (reply.history_html) historyEl.innerHTML = reply.history_html;
    if (reply.audio_url) {
      output.src = reply.audio_url;
      output.play().catch(() => {});
    }
  } catch (e) {
    setStatus('<div class="status-message status-error">' + e + '</div>');
  } finally {
    submitBtn.disabled = false;
    clearBtn.disabled = false;
  }
});

clearBtn.addEventListener('click', async () => {
  const response = await fetch('/api/history', { method: 'DELETE' });
  const reply = await response.json();
  setStatus(reply.status_html);
  historyEl.innerHTML = reply.history_html;
});
"#;
