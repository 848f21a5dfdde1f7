// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// iOS platform bridge via objc2.
//
// Requires compilation with the iOS SDK (Xcode). The gallery and voice-note
// pickers present a UIDocumentPickerViewController from the root view
// controller. UIKit must be driven from the main thread; calls from any
// other thread fail with `AllerscanError::Bridge`.

#![cfg(target_os = "ios")]

use std::cell::RefCell;
use std::sync::mpsc;

use objc2::rc::Retained;
use objc2::runtime::{AnyObject, Bool, NSObject, ProtocolObject};
use objc2::{MainThreadMarker, define_class, msg_send};
use objc2_foundation::{NSArray, NSDate, NSDefaultRunLoopMode, NSRunLoop, NSString, NSURL};
use objc2_ui_kit::{
    UIApplication, UIDocumentPickerDelegate, UIDocumentPickerViewController, UIViewController,
};

use allerscan_core::error::{AllerscanError, Result};

use crate::traits::*;

/// How long one run-loop turn may block while the picker is up.
const RUN_LOOP_SLICE_SECS: f64 = 0.05;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Obtain the root `UIViewController` from the key window.
fn root_view_controller(mtm: MainThreadMarker) -> Result<Retained<UIViewController>> {
    let app = UIApplication::sharedApplication(mtm);

    // SAFETY: keyWindow and rootViewController are plain UIKit property
    // getters; the marker proves we are on the main thread.
    let root: Option<Retained<UIViewController>> = unsafe {
        let window: Option<Retained<AnyObject>> = msg_send![&app, keyWindow];
        window.and_then(|w| msg_send![&w, rootViewController])
    };

    root.ok_or_else(|| AllerscanError::Bridge("no root view controller available".into()))
}

fn require_main_thread() -> Result<MainThreadMarker> {
    MainThreadMarker::new()
        .ok_or_else(|| AllerscanError::Bridge("must be called from the main thread".into()))
}

/// Spin the main run loop until the delegate answers.
///
/// The picker's callbacks are delivered on this same thread, so a plain
/// blocking `recv` would never see them.
fn await_on_run_loop<T>(rx: &mpsc::Receiver<T>) -> Result<T> {
    let run_loop = NSRunLoop::currentRunLoop();
    loop {
        match rx.try_recv() {
            Ok(value) => return Ok(value),
            Err(mpsc::TryRecvError::Empty) => {
                let until = NSDate::dateWithTimeIntervalSinceNow(RUN_LOOP_SLICE_SECS);
                // SAFETY: NSDefaultRunLoopMode is a Foundation constant; running
                // the current thread's loop is always permitted.
                unsafe {
                    run_loop.runMode_beforeDate(NSDefaultRunLoopMode, &until);
                }
            }
            Err(mpsc::TryRecvError::Disconnected) => {
                return Err(AllerscanError::Bridge(
                    "document picker closed without answering".into(),
                ));
            }
        }
    }
}

/// Uniform type covering a whole MIME family, which `typeWithMIMEType:`
/// does not resolve.
fn wildcard_identifier(mime: &str) -> Option<&'static str> {
    match mime {
        "image/*" => Some("public.image"),
        "audio/*" => Some("public.audio"),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Document picker delegate (UIDocumentPickerDelegate)
// ---------------------------------------------------------------------------

struct DocPickerDelegateIvars {
    sender: RefCell<Option<mpsc::Sender<Option<String>>>>,
}

// SAFETY: NSObject subclass with no overridden memory management; callbacks
// arrive on the main thread, matching MainThreadOnly.
define_class! {
    #[unsafe(super(NSObject))]
    #[thread_kind = MainThreadOnly]
    #[name = "AllerscanDocPickerDelegate"]
    #[ivars = DocPickerDelegateIvars]
    struct DocPickerDelegate;

    unsafe impl UIDocumentPickerDelegate for DocPickerDelegate {
        #[unsafe(method(documentPicker:didPickDocumentsAtURLs:))]
        fn did_pick(
            &self,
            _controller: &UIDocumentPickerViewController,
            urls: &NSArray<NSURL>,
        ) {
            let path: Option<String> = urls.firstObject().and_then(|url| {
                // SAFETY: NSURL.path getter, returns an optional NSString.
                let ns_path: Option<Retained<NSString>> = unsafe { msg_send![&url, path] };
                ns_path.map(|p| p.to_string())
            });
            if let Some(tx) = self.ivars().sender.borrow_mut().take() {
                let _ = tx.send(path);
            }
        }

        #[unsafe(method(documentPickerWasCancelled:))]
        fn was_cancelled(&self, _controller: &UIDocumentPickerViewController) {
            if let Some(tx) = self.ivars().sender.borrow_mut().take() {
                let _ = tx.send(None);
            }
        }
    }
}

impl DocPickerDelegate {
    fn new(mtm: MainThreadMarker, tx: mpsc::Sender<Option<String>>) -> Retained<Self> {
        let this = mtm.alloc::<Self>();
        let this = this.set_ivars(DocPickerDelegateIvars {
            sender: RefCell::new(Some(tx)),
        });
        // SAFETY: plain NSObject init on a freshly allocated instance.
        unsafe { msg_send![super(this), init] }
    }
}

// ---------------------------------------------------------------------------
// IosBridge
// ---------------------------------------------------------------------------

/// Concrete iOS platform bridge.
pub struct IosBridge;

impl IosBridge {
    pub fn new() -> Self {
        Self
    }
}

impl PlatformBridge for IosBridge {
    fn platform_name(&self) -> &str {
        "iOS"
    }
}

impl NativeFilePicker for IosBridge {
    /// Present a document picker filtered to the given MIME types.
    ///
    /// MIME patterns are resolved to `UTType`s (`image/*` to `public.image`
    /// and so on); unknown ones are dropped and an empty result falls back to
    /// `public.data`.
    fn pick_file(&self, mime_types: &[&str]) -> Result<Option<String>> {
        let mtm = require_main_thread()?;
        tracing::info!(types = ?mime_types, "iOS: presenting document picker");

        let ut_types: Vec<Retained<AnyObject>> = mime_types
            .iter()
            .filter_map(|mime| {
                // SAFETY: UTType class methods; both return nil for unknown input.
                let ut: Option<Retained<AnyObject>> = match wildcard_identifier(mime) {
                    Some(id) => {
                        let ns_id = NSString::from_str(id);
                        unsafe { msg_send![objc2::class!(UTType), typeWithIdentifier: &*ns_id] }
                    }
                    None => {
                        let ns_mime = NSString::from_str(mime);
                        unsafe { msg_send![objc2::class!(UTType), typeWithMIMEType: &*ns_mime] }
                    }
                };
                ut
            })
            .collect();

        let content_types: Retained<NSArray<AnyObject>> = if ut_types.is_empty() {
            // SAFETY: UTType.dataType is a non-nil class property.
            let public_data: Retained<AnyObject> =
                unsafe { msg_send![objc2::class!(UTType), dataType] };
            NSArray::from_retained_slice(&[public_data])
        } else {
            NSArray::from_retained_slice(&ut_types)
        };

        // SAFETY: alloc + initForOpeningContentTypes:asCopy: with an array of
        // UTTypes. Copying puts the file inside the sandbox.
        let picker: Retained<UIDocumentPickerViewController> = unsafe {
            let alloc: Retained<UIDocumentPickerViewController> =
                msg_send![objc2::class!(UIDocumentPickerViewController), alloc];
            msg_send![alloc, initForOpeningContentTypes: &*content_types, asCopy: Bool::YES]
        };

        let (tx, rx) = mpsc::channel();
        let delegate = DocPickerDelegate::new(mtm, tx);
        // SAFETY: DocPickerDelegate implements UIDocumentPickerDelegate and
        // outlives the presentation (held until the answer arrives).
        unsafe {
            picker.setDelegate(Some(ProtocolObject::from_ref(&*delegate)));
        }

        let root_vc = root_view_controller(mtm)?;
        // SAFETY: main thread guaranteed by the marker above.
        unsafe {
            root_vc.presentViewController_animated_completion(&picker, true, None);
        }

        let picked = await_on_run_loop(&rx)?;
        drop(delegate);
        tracing::debug!(picked = picked.is_some(), "iOS: document picker closed");
        Ok(picked)
    }

    /// Read a file returned by the picker. The picker hands back a sandbox
    /// copy, so a plain read suffices.
    fn read_picked_file(&self, path: &str) -> Result<Vec<u8>> {
        tracing::debug!(path, "iOS: reading picked file");
        std::fs::read(path)
            .map_err(|e| AllerscanError::Bridge(format!("failed to read picked file: {e}")))
    }
}
