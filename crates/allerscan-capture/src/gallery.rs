// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Gallery picks. The chosen file is uploaded as-is, without re-encoding.

use std::path::Path;

use tracing::info;

use allerscan_bridge::traits::{IMAGE_MIME_TYPES, NativeFilePicker};
use allerscan_core::error::{AllerscanError, Result};
use allerscan_core::types::{ImageKind, ImageUpload, ScanRequest};

/// Show the image picker. `Ok(None)` when the user cancels.
pub fn pick_image<P: NativeFilePicker + ?Sized>(picker: &P) -> Result<Option<ScanRequest>> {
    let Some(path) = picker.pick_file(IMAGE_MIME_TYPES)? else {
        return Ok(None);
    };
    let bytes = picker.read_picked_file(&path)?;
    if bytes.is_empty() {
        return Err(AllerscanError::ImageError(format!("{path} is empty")));
    }

    let file_name = Path::new(&path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.jpg".to_owned());
    let kind = ImageKind::from_file_name(&file_name);
    info!(%file_name, ?kind, bytes = bytes.len(), "gallery image selected");

    Ok(Some(ScanRequest::Upload(ImageUpload {
        file_name,
        kind,
        bytes,
    })))
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;

    /// Image picker that answers with a fixed choice.
    pub struct FakePicker {
        pub choice: Option<&'static str>,
        pub bytes: Vec<u8>,
    }

    impl NativeFilePicker for FakePicker {
        fn pick_file(&self, mime_types: &[&str]) -> Result<Option<String>> {
            assert_eq!(mime_types, IMAGE_MIME_TYPES);
            Ok(self.choice.map(str::to_owned))
        }

        fn read_picked_file(&self, _path: &str) -> Result<Vec<u8>> {
            Ok(self.bytes.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakePicker;
    use super::*;

    #[test]
    fn picked_file_is_forwarded_unchanged() {
        let picker = FakePicker {
            choice: Some("/photos/lunch.png"),
            bytes: vec![0x89, b'P', b'N', b'G'],
        };
        match pick_image(&picker).expect("pick") {
            Some(ScanRequest::Upload(upload)) => {
                assert_eq!(upload.file_name, "lunch.png");
                assert_eq!(upload.kind, ImageKind::Png);
                assert_eq!(upload.bytes, picker.bytes);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn cancel_yields_nothing() {
        let picker = FakePicker {
            choice: None,
            bytes: vec![],
        };
        assert_eq!(pick_image(&picker).expect("pick"), None);
    }

    #[test]
    fn empty_file_is_rejected() {
        let picker = FakePicker {
            choice: Some("/photos/empty.jpg"),
            bytes: vec![],
        };
        assert!(pick_image(&picker).is_err());
    }
}
