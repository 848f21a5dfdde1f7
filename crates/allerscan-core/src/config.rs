// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use serde::{Deserialize, Serialize};

/// Environment variable that overrides the configured backend URL.
pub const SERVER_URL_ENV: &str = "ALLERSCAN_SERVER_URL";

/// What to show when the backend returns no nutrition block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NutritionBackfill {
    /// Fill with pseudo-random values in fixed display ranges.
    #[default]
    Synthetic,
    /// Leave nutrition absent; the results page shows "unknown".
    Unknown,
}

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backend base URL, without the API prefix.
    pub server_url: String,
    /// Fixed path prefix prepended to every endpoint.
    pub api_prefix: String,
    /// How long the splash screen stays up, in milliseconds.
    pub splash_delay_ms: u64,
    /// Pause between a still capture and emitting it, in milliseconds.
    pub capture_delay_ms: u64,
    /// JPEG quality (1–100) for camera stills.
    pub jpeg_quality: u8,
    /// Nutrition handling when the backend omits it.
    pub nutrition_backfill: NutritionBackfill,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8000".into(),
            api_prefix: "/api/v1".into(),
            splash_delay_ms: 2000,
            capture_delay_ms: 500,
            jpeg_quality: 90,
            nutrition_backfill: NutritionBackfill::Synthetic,
        }
    }
}

impl AppConfig {
    /// Apply `ALLERSCAN_SERVER_URL` if it is set and non-empty.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(SERVER_URL_ENV)
            && !url.trim().is_empty()
        {
            self.server_url = url.trim().to_owned();
        }
        self
    }

    /// `server_url` + `api_prefix` + `path`, tolerating stray slashes.
    pub fn endpoint_url(&self, path: &str) -> String {
        let base = self.server_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{prefix}{path}")
        } else {
            format!("{base}{prefix}/{path}")
        }
    }
}
