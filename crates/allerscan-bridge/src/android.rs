// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android platform bridge via JNI.
//
// The gallery and voice-note pickers launch the Storage Access Framework
// with `startActivityForResult`. The host Activity forwards the result to
// `PickResultReceiver.onFilePicked(String)`, which lands in the exported
// function below and wakes the waiting picker call. Picked `content://` URIs
// are read back through the ContentResolver.

#![cfg(target_os = "android")]

use std::sync::mpsc;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use jni::objects::{JByteArray, JClass, JObject, JString, JValue};
use jni::sys::jsize;
use jni::{JNIEnv, JavaVM};

use allerscan_core::error::{AllerscanError, Result};

use crate::traits::*;

/// Request code for `startActivityForResult`. The host Activity must
/// recognise it in its `onActivityResult` override.
pub const REQUEST_PICK_FILE: i32 = 0x414C_0001;

/// Longest a picker may stay open before the call gives up.
const PICK_TIMEOUT: Duration = Duration::from_secs(300);

/// Sender for the picker call currently waiting on `onActivityResult`.
static PENDING_PICK: Mutex<Option<mpsc::Sender<Option<String>>>> = Mutex::new(None);

static JAVA_VM: OnceLock<JavaVM> = OnceLock::new();

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

fn java_vm() -> Result<&'static JavaVM> {
    if let Some(vm) = JAVA_VM.get() {
        return Ok(vm);
    }
    let ctx = ndk_context::android_context();
    // SAFETY: `ctx.vm()` is the `JavaVM*` registered by the NDK glue and is
    // valid for the life of the process.
    let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }
        .map_err(|e| AllerscanError::Bridge(format!("failed to obtain JavaVM: {e}")))?;
    Ok(JAVA_VM.get_or_init(|| vm))
}

/// Attach the current thread (once) and return its `JNIEnv`.
fn jni_env() -> Result<JNIEnv<'static>> {
    java_vm()?
        .attach_current_thread_permanently()
        .map_err(|e| AllerscanError::Bridge(format!("failed to attach JNI thread: {e}")))
}

/// The hosting `Activity`.
fn activity() -> Result<JObject<'static>> {
    let ptr = ndk_context::android_context().context();
    if ptr.is_null() {
        return Err(AllerscanError::Bridge(
            "Android context is null, native activity not initialised".into(),
        ));
    }
    // SAFETY: the NDK keeps this global reference to the hosting Activity
    // alive for the life of the process.
    Ok(unsafe { JObject::from_raw(ptr.cast()) })
}

fn jni_err(context: &str, e: jni::errors::Error) -> AllerscanError {
    AllerscanError::Bridge(format!("{context}: {e}"))
}

fn pending_slot() -> Result<std::sync::MutexGuard<'static, Option<mpsc::Sender<Option<String>>>>> {
    PENDING_PICK
        .lock()
        .map_err(|_| AllerscanError::Bridge("picker state poisoned".into()))
}

/// Hand a picker result to the waiting call, if any.
fn deliver_pick(picked: Option<String>) {
    match pending_slot() {
        Ok(mut slot) => match slot.take() {
            Some(tx) => {
                let _ = tx.send(picked);
            }
            None => tracing::warn!("Android: picker result arrived with nobody waiting"),
        },
        Err(e) => tracing::error!(error = %e, "Android: dropping picker result"),
    }
}

/// Called by the host Activity from `onActivityResult` for
/// [`REQUEST_PICK_FILE`]. A null URI means the user cancelled.
#[unsafe(no_mangle)]
pub extern "system" fn Java_org_hyperpolymath_allerscan_PickResultReceiver_onFilePicked(
    mut env: JNIEnv,
    _class: JClass,
    uri: JString,
) {
    let picked = if uri.is_null() {
        None
    } else {
        match env.get_string(&uri) {
            Ok(s) => Some(String::from(s)),
            Err(e) => {
                tracing::warn!(error = %e, "Android: unreadable picker URI");
                None
            }
        }
    };
    deliver_pick(picked);
}

// ---------------------------------------------------------------------------
// Bridge struct
// ---------------------------------------------------------------------------

/// Android implementation of the platform bridge. All state lives on the
/// Java side.
pub struct AndroidBridge;

impl AndroidBridge {
    /// Does not touch JNI; the first call attaches lazily.
    pub fn new() -> Self {
        Self
    }
}

impl PlatformBridge for AndroidBridge {
    fn platform_name(&self) -> &str {
        "Android"
    }
}

// ---------------------------------------------------------------------------
// NativeFilePicker — Storage Access Framework
// ---------------------------------------------------------------------------

impl NativeFilePicker for AndroidBridge {
    /// Launch `ACTION_OPEN_DOCUMENT` filtered to the given MIME types and
    /// wait for the Activity to report the chosen `content://` URI.
    fn pick_file(&self, mime_types: &[&str]) -> Result<Option<String>> {
        let mut env = jni_env()?;
        let activity = activity()?;

        tracing::info!(?mime_types, "Android: launching ACTION_OPEN_DOCUMENT");

        let j_action: JString = env
            .new_string("android.intent.action.OPEN_DOCUMENT")
            .map_err(|e| jni_err("new_string(ACTION_OPEN_DOCUMENT)", e))?;
        let intent: JObject = env
            .new_object(
                "android/content/Intent",
                "(Ljava/lang/String;)V",
                &[JValue::Object(&j_action)],
            )
            .map_err(|e| jni_err("new Intent(OPEN_DOCUMENT)", e))?;

        let j_category: JString = env
            .new_string("android.intent.category.OPENABLE")
            .map_err(|e| jni_err("new_string(CATEGORY_OPENABLE)", e))?;
        env.call_method(
            &intent,
            "addCategory",
            "(Ljava/lang/String;)Landroid/content/Intent;",
            &[JValue::Object(&j_category)],
        )
        .map_err(|e| jni_err("addCategory(OPENABLE)", e))?;

        // One type goes straight into setType; several need EXTRA_MIME_TYPES.
        let base_type = match mime_types {
            [only] => *only,
            _ => "*/*",
        };
        let j_type: JString = env
            .new_string(base_type)
            .map_err(|e| jni_err("new_string(mime)", e))?;
        env.call_method(
            &intent,
            "setType",
            "(Ljava/lang/String;)Landroid/content/Intent;",
            &[JValue::Object(&j_type)],
        )
        .map_err(|e| jni_err("setType", e))?;

        if mime_types.len() > 1 {
            let string_class = env
                .find_class("java/lang/String")
                .map_err(|e| jni_err("find_class(String)", e))?;
            let mime_array = env
                .new_object_array(mime_types.len() as jsize, &string_class, JObject::null())
                .map_err(|e| jni_err("new_object_array(mimes)", e))?;
            for (i, mt) in mime_types.iter().enumerate() {
                let j_mt: JString = env
                    .new_string(mt)
                    .map_err(|e| jni_err("new_string(mime_type[i])", e))?;
                env.set_object_array_element(&mime_array, i as jsize, j_mt)
                    .map_err(|e| jni_err("set_object_array_element", e))?;
            }
            let j_extra_key: JString = env
                .new_string("android.intent.extra.MIME_TYPES")
                .map_err(|e| jni_err("new_string(EXTRA_MIME_TYPES)", e))?;
            env.call_method(
                &intent,
                "putExtra",
                "(Ljava/lang/String;[Ljava/lang/String;)Landroid/content/Intent;",
                &[JValue::Object(&j_extra_key), JValue::Object(&mime_array)],
            )
            .map_err(|e| jni_err("putExtra(EXTRA_MIME_TYPES)", e))?;
        }

        // Register before dispatching so a fast result is not lost. A stale
        // waiter from an abandoned pick is replaced and sees a disconnect.
        let (tx, rx) = mpsc::channel();
        *pending_slot()? = Some(tx);

        if let Err(e) = env.call_method(
            &activity,
            "startActivityForResult",
            "(Landroid/content/Intent;I)V",
            &[JValue::Object(&intent), JValue::Int(REQUEST_PICK_FILE)],
        ) {
            pending_slot()?.take();
            return Err(jni_err("startActivityForResult(OPEN_DOCUMENT)", e));
        }

        tracing::debug!(request_code = REQUEST_PICK_FILE, "Android: picker dispatched");

        match rx.recv_timeout(PICK_TIMEOUT) {
            Ok(picked) => {
                tracing::debug!(picked = picked.is_some(), "Android: picker closed");
                Ok(picked)
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                pending_slot()?.take();
                Err(AllerscanError::Bridge("file picker timed out".into()))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(AllerscanError::Bridge(
                "file picker superseded by a newer request".into(),
            )),
        }
    }

    /// Read all bytes behind a `content://` URI via
    /// `ContentResolver.openInputStream`.
    fn read_picked_file(&self, uri_string: &str) -> Result<Vec<u8>> {
        let mut env = jni_env()?;
        let activity = activity()?;

        tracing::info!(uri = uri_string, "Android: reading content:// URI");

        let j_uri_str: JString = env
            .new_string(uri_string)
            .map_err(|e| jni_err("new_string(uri)", e))?;
        let uri_obj: JObject = env
            .call_static_method(
                "android/net/Uri",
                "parse",
                "(Ljava/lang/String;)Landroid/net/Uri;",
                &[JValue::Object(&j_uri_str)],
            )
            .map_err(|e| jni_err("Uri.parse", e))?
            .l()
            .map_err(|e| jni_err("Uri.parse->l", e))?;

        let resolver: JObject = env
            .call_method(
                &activity,
                "getContentResolver",
                "()Landroid/content/ContentResolver;",
                &[],
            )
            .map_err(|e| jni_err("getContentResolver", e))?
            .l()
            .map_err(|e| jni_err("getContentResolver->l", e))?;

        let input_stream: JObject = env
            .call_method(
                &resolver,
                "openInputStream",
                "(Landroid/net/Uri;)Ljava/io/InputStream;",
                &[JValue::Object(&uri_obj)],
            )
            .map_err(|e| jni_err("openInputStream", e))?
            .l()
            .map_err(|e| jni_err("openInputStream->l", e))?;

        if input_stream.is_null() {
            return Err(AllerscanError::Bridge(format!(
                "ContentResolver returned no stream for {uri_string}"
            )));
        }

        let baos: JObject = env
            .new_object("java/io/ByteArrayOutputStream", "()V", &[])
            .map_err(|e| jni_err("new ByteArrayOutputStream", e))?;
        let buffer = env
            .new_byte_array(8192)
            .map_err(|e| jni_err("new_byte_array(8192)", e))?;

        loop {
            let bytes_read: i32 = env
                .call_method(&input_stream, "read", "([B)I", &[JValue::Object(&buffer)])
                .map_err(|e| jni_err("InputStream.read", e))?
                .i()
                .map_err(|e| jni_err("InputStream.read->i", e))?;
            if bytes_read < 0 {
                break;
            }
            env.call_method(
                &baos,
                "write",
                "([BII)V",
                &[
                    JValue::Object(&buffer),
                    JValue::Int(0),
                    JValue::Int(bytes_read),
                ],
            )
            .map_err(|e| jni_err("ByteArrayOutputStream.write", e))?;
        }

        env.call_method(&input_stream, "close", "()V", &[])
            .map_err(|e| jni_err("InputStream.close", e))?;

        let java_bytes: JByteArray = env
            .call_method(&baos, "toByteArray", "()[B", &[])
            .map_err(|e| jni_err("toByteArray", e))?
            .l()
            .map_err(|e| jni_err("toByteArray->l", e))?
            .into();
        let bytes = env
            .convert_byte_array(&java_bytes)
            .map_err(|e| jni_err("convert_byte_array", e))?;

        tracing::debug!(uri = uri_string, bytes = bytes.len(), "Android: content read");
        Ok(bytes)
    }
}
