// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages and how the UI should present them.
//
// Validation problems are shown inline next to the control, device problems
// block the screen with an alert, and network/backend problems become a
// dismissible notification carrying the raw server message.

use crate::error::AllerscanError;

/// How an error is surfaced in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// Inline hint next to the form control that caused it.
    Inline,
    /// Blocking alert the user must acknowledge.
    Blocking,
    /// Dismissible toast; state is left unchanged.
    Dismissible,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Drives the widget used to show the error.
    pub presentation: Presentation,
}

impl HumanError {
    /// Message and suggestion as one line, for toasts.
    pub fn one_line(&self) -> String {
        if self.suggestion.is_empty() {
            self.message.clone()
        } else {
            format!("{} {}", self.message, self.suggestion)
        }
    }
}

/// Convert an `AllerscanError` into a `HumanError`.
pub fn humanize_error(err: &AllerscanError) -> HumanError {
    match err {
        // -- Remote API --
        AllerscanError::Transport(_) => HumanError {
            message: "We couldn't reach the server.".into(),
            suggestion: "Check your internet connection, then try again.".into(),
            presentation: Presentation::Dismissible,
        },

        AllerscanError::Backend { status, message } => humanize_backend(*status, message),

        AllerscanError::MalformedResponse(_) => HumanError {
            message: "We couldn't recognise this food.".into(),
            suggestion: "Try a clearer photo, or search for the dish by name instead.".into(),
            presentation: Presentation::Dismissible,
        },

        // -- Validation --
        AllerscanError::Validation(detail) => HumanError {
            message: detail.clone(),
            suggestion: String::new(),
            presentation: Presentation::Inline,
        },

        AllerscanError::AllergensRequired => HumanError {
            message: "Please set your allergens first!".into(),
            suggestion: "Choose at least one allergen in Settings so we know what to look for.".into(),
            presentation: Presentation::Dismissible,
        },

        // -- Capture / devices --
        AllerscanError::Camera(_) => HumanError {
            message: "Unable to access camera. Please ensure camera permissions are granted.".into(),
            suggestion: "You can still pick a photo from your gallery, type a barcode, or describe the dish.".into(),
            presentation: Presentation::Blocking,
        },

        AllerscanError::CameraNotReady => HumanError {
            message: "The camera is still starting.".into(),
            suggestion: "Wait a moment for the preview to appear, then try again.".into(),
            presentation: Presentation::Inline,
        },

        AllerscanError::ImageError(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "Try taking the photo again, or pick a JPEG or PNG from your gallery.".into(),
            presentation: Presentation::Dismissible,
        },

        // -- Storage --
        AllerscanError::Storage(_) => HumanError {
            message: "The app's data storage had a problem.".into(),
            suggestion: "Try closing and reopening the app. You may need to sign in again.".into(),
            presentation: Presentation::Dismissible,
        },

        AllerscanError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    presentation: Presentation::Dismissible,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your device's storage may be full.".into(),
                    presentation: Presentation::Dismissible,
                }
            }
        }

        AllerscanError::Serialization(_) => HumanError {
            message: "The app had an internal data problem.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            presentation: Presentation::Dismissible,
        },

        // -- Platform --
        AllerscanError::Bridge(_) => HumanError {
            message: "A device-specific feature didn't work.".into(),
            suggestion: "Try restarting the app. Some features may not be available on all devices.".into(),
            presentation: Presentation::Blocking,
        },

        AllerscanError::PlatformUnavailable => HumanError {
            message: "This feature isn't available on your device.".into(),
            suggestion: "Use the gallery, barcode, or voice options instead.".into(),
            presentation: Presentation::Blocking,
        },
    }
}

/// Backend failures keep the raw server text as the message; only the
/// suggestion depends on the status code.
fn humanize_backend(status: u16, message: &str) -> HumanError {
    let suggestion = match status {
        401 | 403 => "Your session may have expired. Please sign in again.",
        404 => "It may already have been removed.",
        500..=599 => "The server had a problem. Please try again in a moment.",
        _ => "Please check your input and try again.",
    };
    HumanError {
        message: message.to_owned(),
        suggestion: suggestion.into(),
        presentation: Presentation::Dismissible,
    }
}
