// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Voice / free-text dish description.
//
// The recording is attached from a picked audio file and sent base64
// encoded alongside any typed text.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::info;

use allerscan_bridge::traits::{AUDIO_MIME_TYPES, NativeFilePicker};
use allerscan_core::error::Result;
use allerscan_core::types::ScanRequest;

/// A recording attached to the note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceEntry {
    text: String,
    audio: Option<AudioClip>,
}

impl VoiceEntry {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_owned();
    }

    pub fn audio(&self) -> Option<&AudioClip> {
        self.audio.as_ref()
    }

    pub fn attach_audio(&mut self, clip: AudioClip) {
        self.audio = Some(clip);
    }

    pub fn clear_audio(&mut self) {
        self.audio = None;
    }

    /// Pick an audio file and attach it. Returns whether one was chosen.
    pub fn attach_from_picker<P: NativeFilePicker + ?Sized>(&mut self, picker: &P) -> Result<bool> {
        let Some(path) = picker.pick_file(AUDIO_MIME_TYPES)? else {
            return Ok(false);
        };
        let bytes = picker.read_picked_file(&path)?;
        let file_name = std::path::Path::new(&path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone());
        info!(%file_name, bytes = bytes.len(), "voice clip attached");
        self.audio = Some(AudioClip { file_name, bytes });
        Ok(true)
    }

    pub fn can_submit(&self) -> bool {
        !self.text.trim().is_empty() || self.audio.as_ref().is_some_and(|a| !a.bytes.is_empty())
    }

    /// Validate and emit; the entry is reset only on success.
    pub fn submit(&mut self) -> Result<ScanRequest> {
        let audio = self.audio.as_ref().map(|clip| STANDARD.encode(&clip.bytes));
        let request = ScanRequest::voice(Some(self.text.clone()), audio)?;
        *self = Self::default();
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allerscan_core::types::VoiceNote;

    #[test]
    fn text_only_note() {
        let mut entry = VoiceEntry::default();
        entry.set_text("chicken satay with rice");
        assert!(entry.can_submit());
        let request = entry.submit().expect("submit");
        assert_eq!(
            request,
            ScanRequest::Voice(VoiceNote {
                text: Some("chicken satay with rice".into()),
                audio_base64: None,
            })
        );
        assert!(!entry.can_submit());
    }

    #[test]
    fn audio_is_base64_encoded() {
        let mut entry = VoiceEntry::default();
        entry.attach_audio(AudioClip {
            file_name: "note.webm".into(),
            bytes: b"hello".to_vec(),
        });
        match entry.submit().expect("submit") {
            ScanRequest::Voice(note) => {
                assert_eq!(note.text, None);
                assert_eq!(note.audio_base64.as_deref(), Some("aGVsbG8="));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn blank_note_is_rejected_and_kept() {
        let mut entry = VoiceEntry::default();
        entry.set_text("   ");
        assert!(!entry.can_submit());
        assert!(entry.submit().is_err());
        assert_eq!(entry.text(), "   ");
    }
}
