// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Desktop bridge — native file dialogs via `rfd`.

use allerscan_core::error::Result;

use crate::traits::*;

/// Bridge used on Linux, macOS and Windows.
pub struct DesktopBridge;

impl PlatformBridge for DesktopBridge {
    fn platform_name(&self) -> &str {
        "Desktop"
    }
}

impl NativeFilePicker for DesktopBridge {
    fn pick_file(&self, mime_types: &[&str]) -> Result<Option<String>> {
        let (label, extensions) = dialog_filter(mime_types);
        let picked = rfd::FileDialog::new()
            .add_filter(label, extensions)
            .pick_file();
        Ok(picked.map(|p| p.display().to_string()))
    }

    fn read_picked_file(&self, path: &str) -> Result<Vec<u8>> {
        let bytes = std::fs::read(path)?;
        tracing::debug!(path, bytes = bytes.len(), "picked file read");
        Ok(bytes)
    }
}

/// Map MIME patterns onto the extension filters `rfd` understands.
fn dialog_filter(mime_types: &[&str]) -> (&'static str, &'static [&'static str]) {
    if mime_types.iter().any(|m| m.starts_with("audio/")) {
        ("Audio", &["mp3", "m4a", "wav", "ogg", "webm", "aac"])
    } else {
        ("Images", &["jpg", "jpeg", "png", "webp", "gif", "heic", "bmp"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allerscan_core::error::AllerscanError;

    #[test]
    fn filters_follow_mime_family() {
        assert_eq!(dialog_filter(IMAGE_MIME_TYPES).0, "Images");
        assert_eq!(dialog_filter(AUDIO_MIME_TYPES).0, "Audio");
    }

    #[test]
    fn reading_missing_file_is_io_error() {
        let err = DesktopBridge
            .read_picked_file("/definitely/not/here.jpg")
            .expect_err("missing file");
        assert!(matches!(err, AllerscanError::Io(_)));
    }
}
