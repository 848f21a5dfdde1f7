// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Live camera through the webview's media devices.
//
// Opening a stream injects a script that calls `getUserMedia`, attaches the
// track to the preview `<video>` on the scan page and posts full-resolution
// JPEG frames back over the eval channel. The newest frame is kept for the
// capture button; a permission refusal or a dead track is surfaced through
// `CameraStream::failure`.

use std::sync::{Arc, Mutex};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use dioxus::prelude::*;
use serde::Deserialize;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use allerscan_bridge::traits::{CameraStream, NativeCamera, VideoFrame};
use allerscan_capture::still::decode_frame;
use allerscan_core::error::{AllerscanError, Result};
use allerscan_core::types::FacingMode;

/// DOM id of the preview element the scan page renders.
pub const PREVIEW_ELEMENT_ID: &str = "allerscan-camera-preview";

/// Gap between frames posted back from the webview.
const FRAME_INTERVAL_MS: u32 = 400;

/// Messages posted by the camera script.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
enum CameraMessage {
    /// A `data:image/jpeg;base64,...` URL.
    Frame { data: String },
    Error { msg: String },
}

/// Opens webview camera streams. JPEG quality follows the capture setting.
pub struct WebviewCamera {
    quality: u8,
}

impl WebviewCamera {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }
}

impl NativeCamera for WebviewCamera {
    fn open_stream(&self, facing: FacingMode) -> Result<Box<dyn CameraStream>> {
        let shared = Arc::new(Mutex::new(Latest::default()));
        let (stop_tx, stop_rx) = oneshot::channel();

        let script = camera_script(facing, self.quality);
        spawn(pump(script, Arc::clone(&shared), stop_rx));
        info!(?facing, "webview camera requested");

        Ok(Box::new(WebviewStream {
            facing,
            shared,
            stop: Some(stop_tx),
        }))
    }
}

#[derive(Default)]
struct Latest {
    jpeg: Option<Vec<u8>>,
    failure: Option<String>,
}

/// Forward script messages into `shared` until stopped or the script ends.
async fn pump(script: String, shared: Arc<Mutex<Latest>>, mut stop: oneshot::Receiver<()>) {
    let mut eval = document::eval(&script);
    loop {
        tokio::select! {
            msg = eval.recv::<CameraMessage>() => match msg {
                Ok(msg) => {
                    let done = matches!(msg, CameraMessage::Error { .. });
                    apply_message(&shared, msg);
                    if done {
                        break;
                    }
                }
                Err(e) => {
                    debug!(error = ?e, "camera script ended");
                    break;
                }
            },
            _ = &mut stop => {
                if let Err(e) = eval.send("stop") {
                    debug!(error = ?e, "camera script already gone");
                }
                break;
            }
        }
    }
}

fn apply_message(shared: &Mutex<Latest>, msg: CameraMessage) {
    let Ok(mut latest) = shared.lock() else {
        return;
    };
    match msg {
        CameraMessage::Frame { data } => match frame_bytes(&data) {
            Ok(bytes) => latest.jpeg = Some(bytes),
            Err(e) => debug!(error = %e, "dropping malformed frame"),
        },
        CameraMessage::Error { msg } => {
            warn!(%msg, "webview camera failed");
            latest.failure = Some(msg);
        }
    }
}

/// Strip the data-URL prefix and decode the base64 payload.
fn frame_bytes(data: &str) -> Result<Vec<u8>> {
    let payload = data.split_once(',').map_or(data, |(_, b64)| b64);
    STANDARD
        .decode(payload)
        .map_err(|e| AllerscanError::ImageError(format!("frame payload: {e}")))
}

struct WebviewStream {
    facing: FacingMode,
    shared: Arc<Mutex<Latest>>,
    stop: Option<oneshot::Sender<()>>,
}

impl CameraStream for WebviewStream {
    fn facing(&self) -> FacingMode {
        self.facing
    }

    fn current_frame(&self) -> Option<VideoFrame> {
        let jpeg = self.shared.lock().ok()?.jpeg.clone()?;
        match decode_frame(&jpeg) {
            Ok(frame) => Some(frame),
            Err(e) => {
                debug!(error = %e, "undecodable preview frame");
                None
            }
        }
    }

    fn failure(&self) -> Option<String> {
        self.shared.lock().ok()?.failure.clone()
    }

    fn stop(&mut self) {
        if let Some(tx) = self.stop.take() {
            let _ = tx.send(());
        }
    }
}

fn camera_script(facing: FacingMode, quality: u8) -> String {
    let facing = match facing {
        FacingMode::Environment => "environment",
        FacingMode::User => "user",
    };
    let quality = f32::from(quality) / 100.0;
    format!(
        r#"
        let video = null;
        for (let i = 0; i < 50 && !video; i++) {{
            video = document.getElementById("{PREVIEW_ELEMENT_ID}");
            if (!video) await new Promise(r => setTimeout(r, 50));
        }}
        if (!video) {{
            dioxus.send({{ type: "error", msg: "camera preview missing" }});
            return;
        }}
        if (!navigator.mediaDevices || !navigator.mediaDevices.getUserMedia) {{
            dioxus.send({{ type: "error", msg: "media devices unavailable" }});
            return;
        }}
        if (video.srcObject) video.srcObject.getTracks().forEach(t => t.stop());

        let stream;
        try {{
            stream = await navigator.mediaDevices.getUserMedia({{
                video: {{ facingMode: "{facing}" }},
                audio: false,
            }});
        }} catch (e) {{
            dioxus.send({{ type: "error", msg: e.toString() }});
            return;
        }}
        if (!video.isConnected) {{
            stream.getTracks().forEach(t => t.stop());
            return;
        }}

        video.srcObject = stream;
        video.setAttribute("playsinline", "true");
        await video.play().catch(() => {{}});

        let running = true;
        const shutdown = () => {{
            running = false;
            stream.getTracks().forEach(t => t.stop());
            if (video.srcObject === stream) video.srcObject = null;
        }};
        dioxus.recv().then(shutdown);
        stream.getVideoTracks().forEach(t => t.addEventListener("ended", () => {{
            if (!running) return;
            dioxus.send({{ type: "error", msg: "camera track ended" }});
            shutdown();
        }}));

        const canvas = document.createElement("canvas");
        const ctx = canvas.getContext("2d");
        const pump = () => {{
            if (!running) return;
            if (!video.isConnected) {{
                shutdown();
                return;
            }}
            if (video.readyState >= video.HAVE_CURRENT_DATA && video.videoWidth > 0) {{
                canvas.width = video.videoWidth;
                canvas.height = video.videoHeight;
                ctx.drawImage(video, 0, 0);
                dioxus.send({{ type: "frame", data: canvas.toDataURL("image/jpeg", {quality}) }});
            }}
            setTimeout(pump, {FRAME_INTERVAL_MS});
        }};
        pump();
        "#
    )
}
