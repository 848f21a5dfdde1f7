// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Allerscan.

use thiserror::Error;

/// Top-level error type for all Allerscan operations.
#[derive(Debug, Error)]
pub enum AllerscanError {
    // -- Remote API --
    #[error("network request failed: {0}")]
    Transport(String),

    /// Non-2xx response. The message is the response body text, or
    /// "Request failed" when the body was empty.
    #[error("{message}")]
    Backend { status: u16, message: String },

    #[error("unexpected response from server: {0}")]
    MalformedResponse(String),

    // -- Validation --
    #[error("{0}")]
    Validation(String),

    #[error("no allergens selected")]
    AllergensRequired,

    // -- Capture / devices --
    #[error("camera unavailable: {0}")]
    Camera(String),

    #[error("camera is not ready")]
    CameraNotReady,

    #[error("image encoding failed: {0}")]
    ImageError(String),

    // -- Storage / persistence --
    #[error("storage error: {0}")]
    Storage(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

impl AllerscanError {
    /// Shorthand for a validation failure with a user-facing message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, AllerscanError>;
