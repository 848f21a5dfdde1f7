// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Allerscan client.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::allergen::AllergenSet;
use crate::error::{AllerscanError, Result};

/// Age bracket offered by the profile form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeRange {
    #[serde(rename = "under-18")]
    Under18,
    #[serde(rename = "18-24")]
    From18To24,
    #[serde(rename = "25-34")]
    From25To34,
    #[serde(rename = "35-44")]
    From35To44,
    #[serde(rename = "45-54")]
    From45To54,
    #[serde(rename = "55-64")]
    From55To64,
    #[serde(rename = "65+")]
    Over65,
}

impl AgeRange {
    pub const ALL: [AgeRange; 7] = [
        AgeRange::Under18,
        AgeRange::From18To24,
        AgeRange::From25To34,
        AgeRange::From35To44,
        AgeRange::From45To54,
        AgeRange::From55To64,
        AgeRange::Over65,
    ];

    pub fn wire_value(&self) -> &'static str {
        match self {
            Self::Under18 => "under-18",
            Self::From18To24 => "18-24",
            Self::From25To34 => "25-34",
            Self::From35To44 => "35-44",
            Self::From45To54 => "45-54",
            Self::From55To64 => "55-64",
            Self::Over65 => "65+",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Under18 => "Under 18",
            Self::Over65 => "65+",
            other => other.wire_value(),
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.wire_value() == value)
    }
}

/// Gender options offered by the profile form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Gender {
    Male,
    Female,
    NonBinary,
    PreferNotToSay,
}

impl Gender {
    pub const ALL: [Gender; 4] = [
        Gender::Male,
        Gender::Female,
        Gender::NonBinary,
        Gender::PreferNotToSay,
    ];

    pub fn wire_value(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::NonBinary => "non-binary",
            Self::PreferNotToSay => "prefer-not-to-say",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::NonBinary => "Non-binary",
            Self::PreferNotToSay => "Prefer not to say",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.wire_value() == value)
    }
}

/// The user's identity and allergen selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub age: Option<AgeRange>,
    pub gender: Option<Gender>,
    pub allergens: AllergenSet,
}

impl UserProfile {
    /// A profile counts as complete once it has a non-empty name.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// Which camera a live stream is opened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Rear camera, pointed at the food.
    #[default]
    Environment,
    /// Front (selfie) camera.
    User,
}

impl FacingMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Environment => Self::User,
            Self::User => Self::Environment,
        }
    }
}

/// Image encodings accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageKind {
    Jpeg,
    Png,
    Webp,
    Gif,
    Heic,
    Bmp,
}

impl ImageKind {
    /// MIME type for the multipart upload.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
            Self::Heic => "image/heic",
            Self::Bmp => "image/bmp",
        }
    }

    /// Infer the image kind from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            "gif" => Some(Self::Gif),
            "heic" | "heif" => Some(Self::Heic),
            "bmp" => Some(Self::Bmp),
            _ => None,
        }
    }

    /// Infer from a file name, falling back to JPEG.
    pub fn from_file_name(name: &str) -> Self {
        std::path::Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .unwrap_or(Self::Jpeg)
    }
}

/// An image ready to be posted to the image-scan endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub kind: ImageKind,
    pub bytes: Vec<u8>,
}

/// Free-text and/or recorded audio describing a dish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceNote {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_base64: Option<String>,
}

/// The normalised input to analysis, tagged by capture method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanRequest {
    Upload(ImageUpload),
    Barcode(String),
    Search(String),
    Voice(VoiceNote),
}

impl ScanRequest {
    /// Search request; the query must be non-empty once trimmed.
    pub fn search(query: &str) -> Result<Self> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AllerscanError::validation("Please enter a dish to search for."));
        }
        Ok(Self::Search(query.to_owned()))
    }

    /// Barcode request; must be a non-empty run of ASCII digits.
    pub fn barcode(code: &str) -> Result<Self> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AllerscanError::validation("Please enter a barcode."));
        }
        if !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(AllerscanError::validation("Barcodes contain digits only."));
        }
        Ok(Self::Barcode(code.to_owned()))
    }

    /// Voice request; at least one of text or audio must be present.
    pub fn voice(text: Option<String>, audio_base64: Option<String>) -> Result<Self> {
        let text = text.filter(|t| !t.trim().is_empty());
        let audio_base64 = audio_base64.filter(|a| !a.is_empty());
        if text.is_none() && audio_base64.is_none() {
            return Err(AllerscanError::validation(
                "Describe the dish or attach a recording first.",
            ));
        }
        Ok(Self::Voice(VoiceNote { text, audio_base64 }))
    }

    pub fn method(&self) -> ScanMethod {
        match self {
            Self::Upload(_) => ScanMethod::Upload,
            Self::Barcode(_) => ScanMethod::Barcode,
            Self::Search(_) => ScanMethod::Search,
            Self::Voice(_) => ScanMethod::Voice,
        }
    }
}

/// Capture method tag, also recorded with each history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMethod {
    Upload,
    Barcode,
    Search,
    Voice,
}

impl ScanMethod {
    /// `scan_type` value stored alongside history entries.
    pub fn scan_type(&self) -> &'static str {
        match self {
            Self::Upload => "image",
            Self::Barcode => "barcode",
            Self::Search => "search",
            Self::Voice => "voice",
        }
    }
}

/// Kind of a dismissible notification (toast).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

/// A dismissible message surfaced after a user-triggered action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_requires_text() {
        assert!(ScanRequest::search("   ").is_err());
        assert_eq!(
            ScanRequest::search("  pad thai ").expect("valid"),
            ScanRequest::Search("pad thai".into())
        );
    }

    #[test]
    fn barcode_must_be_digits() {
        assert!(ScanRequest::barcode("").is_err());
        assert!(ScanRequest::barcode("12a4").is_err());
        assert_eq!(
            ScanRequest::barcode("012345678905").expect("valid").method(),
            ScanMethod::Barcode
        );
    }

    #[test]
    fn voice_needs_text_or_audio() {
        assert!(ScanRequest::voice(None, None).is_err());
        assert!(ScanRequest::voice(Some("  ".into()), Some(String::new())).is_err());
        assert!(ScanRequest::voice(None, Some("UklGRg==".into())).is_ok());
        assert!(ScanRequest::voice(Some("green curry".into()), None).is_ok());
    }

    #[test]
    fn voice_note_omits_absent_fields() {
        let note = VoiceNote {
            text: Some("curry".into()),
            audio_base64: None,
        };
        let json = serde_json::to_string(&note).expect("serialize");
        assert_eq!(json, r#"{"text":"curry"}"#);
    }

    #[test]
    fn image_kind_from_file_name() {
        assert_eq!(ImageKind::from_file_name("lunch.PNG"), ImageKind::Png);
        assert_eq!(ImageKind::from_file_name("capture"), ImageKind::Jpeg);
        assert_eq!(ImageKind::Heic.mime_type(), "image/heic");
    }

    #[test]
    fn age_and_gender_wire_values() {
        assert_eq!(AgeRange::from_wire("65+"), Some(AgeRange::Over65));
        assert_eq!(AgeRange::from_wire("40"), None);
        assert_eq!(Gender::from_wire("non-binary"), Some(Gender::NonBinary));
        assert_eq!(
            serde_json::to_string(&Gender::PreferNotToSay).expect("serialize"),
            r#""prefer-not-to-say""#
        );
    }

    #[test]
    fn facing_mode_toggles() {
        assert_eq!(FacingMode::default().toggled(), FacingMode::User);
        assert_eq!(FacingMode::User.toggled(), FacingMode::Environment);
    }

    #[test]
    fn profile_completeness_follows_name() {
        let mut profile = UserProfile::default();
        assert!(!profile.is_complete());
        profile.name = "Ada".into();
        assert!(profile.is_complete());
    }
}
