// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan page — live camera still, gallery pick, typed barcode and voice/text
// note. Every path ends in one `ScanRequest` handed to the analysis flow.
//
// The camera stream is owned by a `CameraSession` in a component signal: it
// is opened on mount and released on unmount (or when the signal drops).

use std::time::Duration;

use dioxus::prelude::*;

use allerscan_capture::gallery::pick_image;
use allerscan_capture::still::emit_still;
use allerscan_capture::{BarcodeEntry, CameraSession, VoiceEntry};
use allerscan_core::error::AllerscanError;
use allerscan_core::human_errors::humanize_error;
use allerscan_core::types::FacingMode;

use crate::services::app_services::AppServices;
use crate::services::webview_camera::PREVIEW_ELEMENT_ID;
use crate::state::{AppState, start_analysis};

use super::{
    BlockingAlert, INPUT_STYLE, InlineError, PRIMARY_BUTTON, SECONDARY_BUTTON, use_page_errors,
};

/// How often the open stream is checked for frames or failure.
const READY_POLL: Duration = Duration::from_millis(100);

const SECTION_STYLE: &str =
    "display: flex; flex-direction: column; gap: 8px; padding: 12px; border: 1px solid #e0e0e0; border-radius: 12px;";

#[component]
pub fn Scan() -> Element {
    let svc = use_context::<AppServices>();
    let ui = use_context::<Signal<AppState>>();
    let mut camera = use_signal(CameraSession::new);
    let mut barcode = use_signal(BarcodeEntry::default);
    let mut voice = use_signal(VoiceEntry::default);
    let errors = use_page_errors();

    let mount_svc = svc.clone();
    use_hook(move || camera.write().mount(mount_svc.camera()));
    use_drop(move || {
        if let Ok(mut cam) = camera.try_write() {
            cam.unmount();
        }
    });

    // Watch the open stream: first frame makes it ready, a device failure
    // raises the alert.
    use_future(move || async move {
        loop {
            let stale = {
                let cam = camera.peek();
                cam.has_stream() && (!cam.is_ready() || cam.stream_failed())
            };
            if stale {
                camera.write().refresh_readiness();
            }
            tokio::time::sleep(READY_POLL).await;
        }
    });

    let loading = ui.read().loading;
    let cam = camera.read();
    let can_capture = cam.can_capture() && !loading;
    let capturing = cam.is_capturing();
    let status = if cam.is_ready() {
        "Camera ready"
    } else if cam.has_stream() {
        "Starting camera..."
    } else {
        "Camera unavailable"
    };
    let facing = match cam.facing() {
        FacingMode::Environment => "Back camera",
        FacingMode::User => "Front camera",
    };
    let camera_alert = cam
        .alert()
        .map(|msg| humanize_error(&AllerscanError::Camera(msg.to_owned())));
    drop(cam);
    let other_alert = if camera_alert.is_none() { errors.blocking() } else { None };

    // -- Handlers -----------------------------------------------------------

    let capture_svc = svc.clone();
    let capture = move |_: MouseEvent| {
        let frame = match camera.write().begin_capture() {
            Ok(frame) => frame,
            Err(e) => {
                errors.report(&capture_svc, ui, &e);
                return;
            }
        };
        errors.clear();
        let svc = capture_svc.clone();
        spawn(async move {
            let config = svc.config().clone();
            let request = emit_still(frame, &config).await;
            camera.write().finish_capture();
            match request {
                Ok(request) => start_analysis(&svc, ui, request),
                Err(e) => errors.report(&svc, ui, &e),
            }
        });
    };

    let flip_svc = svc.clone();
    let flip = move |_: MouseEvent| camera.write().toggle_facing(flip_svc.camera());

    let gallery_svc = svc.clone();
    let gallery = move |_: MouseEvent| match pick_image(gallery_svc.bridge()) {
        Ok(Some(request)) => {
            errors.clear();
            start_analysis(&gallery_svc, ui, request);
        }
        Ok(None) => {}
        Err(e) => errors.report(&gallery_svc, ui, &e),
    };

    let barcode_svc = svc.clone();
    let submit_barcode = use_callback(move |()| {
        let submitted = barcode.write().submit();
        match submitted {
            Ok(request) => {
                errors.clear();
                start_analysis(&barcode_svc, ui, request);
            }
            Err(e) => errors.report(&barcode_svc, ui, &e),
        }
    });

    let attach_svc = svc.clone();
    let attach_audio = move |_: MouseEvent| {
        let attached = voice.write().attach_from_picker(attach_svc.bridge());
        if let Err(e) = attached {
            errors.report(&attach_svc, ui, &e);
        }
    };

    let voice_svc = svc.clone();
    let submit_voice = move |_: MouseEvent| {
        let submitted = voice.write().submit();
        match submitted {
            Ok(request) => {
                errors.clear();
                start_analysis(&voice_svc, ui, request);
            }
            Err(e) => errors.report(&voice_svc, ui, &e),
        }
    };

    let barcode_ready = barcode.read().can_submit() && !loading;
    let voice_ready = voice.read().can_submit() && !loading;
    let clip = voice.read().audio().map(|c| c.file_name.clone());

    rsx! {
        div { style: "max-width: 560px; margin: 0 auto; display: flex; flex-direction: column; gap: 16px;",
            h1 { "Scan" }

            if loading {
                p { style: "color: #2e7d32; font-weight: bold;", "Analyzing..." }
            }
            InlineError { error: errors.inline() }

            // Camera
            section { style: SECTION_STYLE,
                h3 { style: "margin: 0;", "Camera" }
                video {
                    id: PREVIEW_ELEMENT_ID,
                    style: "width: 100%; height: 240px; object-fit: cover; border-radius: 8px; background: #212121;",
                    autoplay: true,
                    muted: true,
                    playsinline: true,
                }
                p { style: "margin: 0; font-size: 14px; color: #555;", "{status} · {facing}" }
                div { style: "display: flex; gap: 8px;",
                    button {
                        style: PRIMARY_BUTTON,
                        disabled: !can_capture,
                        onclick: capture,
                        if capturing { "Capturing..." } else { "Take photo" }
                    }
                    button { style: SECONDARY_BUTTON, disabled: loading, onclick: flip, "Flip" }
                }
            }

            // Gallery
            section { style: SECTION_STYLE,
                h3 { style: "margin: 0;", "Gallery" }
                button {
                    style: SECONDARY_BUTTON,
                    disabled: loading,
                    onclick: gallery,
                    "Choose a photo"
                }
            }

            // Barcode
            section { style: SECTION_STYLE,
                h3 { style: "margin: 0;", "Barcode" }
                input {
                    style: INPUT_STYLE,
                    inputmode: "numeric",
                    placeholder: "Enter barcode digits",
                    value: "{barcode.read().value()}",
                    oninput: move |e| barcode.write().set_input(&e.value()),
                    onkeydown: move |e| {
                        if e.key() == Key::Enter && barcode_ready {
                            submit_barcode.call(());
                        }
                    },
                }
                button {
                    style: SECONDARY_BUTTON,
                    disabled: !barcode_ready,
                    onclick: move |_| submit_barcode.call(()),
                    "Look up"
                }
            }

            // Voice / text
            section { style: SECTION_STYLE,
                h3 { style: "margin: 0;", "Describe it" }
                textarea {
                    style: "{INPUT_STYLE} min-height: 80px;",
                    placeholder: "What's on the plate?",
                    value: "{voice.read().text()}",
                    oninput: move |e| voice.write().set_text(&e.value()),
                }
                div { style: "display: flex; gap: 8px; align-items: center;",
                    button {
                        style: SECONDARY_BUTTON,
                        disabled: loading,
                        onclick: attach_audio,
                        "Attach recording"
                    }
                    if let Some(name) = clip {
                        span { style: "font-size: 14px; color: #555;", "{name}" }
                        button {
                            style: SECONDARY_BUTTON,
                            onclick: move |_| voice.write().clear_audio(),
                            "Remove"
                        }
                    }
                }
                button {
                    style: SECONDARY_BUTTON,
                    disabled: !voice_ready,
                    onclick: submit_voice,
                    "Send"
                }
            }
        }

        if let Some(error) = camera_alert {
            BlockingAlert { error, ondismiss: move |_| camera.write().dismiss_alert() }
        }
        if let Some(error) = other_alert {
            BlockingAlert { error, ondismiss: move |_| errors.dismiss_blocking() }
        }
    }
}
