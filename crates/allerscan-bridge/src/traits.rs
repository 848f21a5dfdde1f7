// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for native capabilities.

use allerscan_core::error::Result;
use allerscan_core::types::FacingMode;

/// MIME filter for the gallery picker.
pub const IMAGE_MIME_TYPES: &[&str] = &["image/*"];

/// MIME filter for the voice-note picker.
pub const AUDIO_MIME_TYPES: &[&str] = &["audio/*"];

/// Native services of the host operating system.
///
/// The live camera is not part of it: every target streams through the
/// webview's media devices, which the UI layer owns.
pub trait PlatformBridge: NativeFilePicker + Send + Sync {
    /// Human-readable platform name (e.g. "iOS 17", "Desktop").
    fn platform_name(&self) -> &str;
}

/// Live camera access.
pub trait NativeCamera {
    /// Start a live video stream on the requested camera.
    ///
    /// Fails with `AllerscanError::Camera` when permission is denied or no
    /// matching device exists.
    fn open_stream(&self, facing: FacingMode) -> Result<Box<dyn CameraStream>>;
}

/// A running video stream. Owned exclusively by whoever opened it.
pub trait CameraStream: Send {
    /// Camera this stream was opened on.
    fn facing(&self) -> FacingMode;

    /// Most recent frame at the sensor's native resolution, or `None` until
    /// the first frame has arrived.
    fn current_frame(&self) -> Option<VideoFrame>;

    /// Why the device stopped delivering frames after opening, if it did.
    fn failure(&self) -> Option<String> {
        None
    }

    /// Stop every track and release the device. Idempotent.
    fn stop(&mut self);
}

/// One decoded video frame, packed RGB8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

/// Pick files from the device storage.
pub trait NativeFilePicker {
    /// Show a file picker filtered to the given MIME types.
    /// Returns the file path chosen, or None if cancelled.
    fn pick_file(&self, mime_types: &[&str]) -> Result<Option<String>>;

    /// Read the bytes of a previously picked file.
    fn read_picked_file(&self, path: &str) -> Result<Vec<u8>>;
}
