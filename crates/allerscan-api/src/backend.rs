// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The backend port. The session controller talks to this trait only, so it
// can be driven by the HTTP client in production and by `MockBackend` in
// tests.

use async_trait::async_trait;

use allerscan_core::analysis::HistoryEntry;
use allerscan_core::error::Result;
use allerscan_core::types::{ImageUpload, VoiceNote};

use crate::wire::{
    AllergenFlags, AnalyzeRequest, AnalyzeResponse, HistoryAdd, LoginRequest, LoginResponse,
    ProfileRecord, RegisterRequest, ScanResponse,
};

/// Every remote operation the app performs.
///
/// Implementations attach the stored bearer token when one exists and map
/// failures onto `AllerscanError::{Transport, Backend, MalformedResponse}`.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait Backend: Send + Sync {
    // -- auth --
    async fn register(&self, request: RegisterRequest) -> Result<()>;
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse>;

    // -- profile --
    async fn get_profile(&self) -> Result<ProfileRecord>;
    async fn update_profile(&self, record: ProfileRecord) -> Result<()>;
    async fn get_allergens(&self) -> Result<AllergenFlags>;
    async fn update_allergens(&self, flags: AllergenFlags) -> Result<()>;

    // -- scanning --
    async fn scan_image(&self, upload: ImageUpload) -> Result<ScanResponse>;
    async fn scan_barcode(&self, barcode: String) -> Result<ScanResponse>;
    /// The voice endpoint's response shape is not fixed; it is returned raw.
    async fn scan_voice(&self, note: VoiceNote) -> Result<serde_json::Value>;
    async fn analyze_food(&self, request: AnalyzeRequest) -> Result<AnalyzeResponse>;

    // -- history --
    async fn get_history(&self) -> Result<Vec<HistoryEntry>>;
    async fn add_history(&self, entry: HistoryAdd) -> Result<()>;
    async fn delete_history_entry(&self, id: String) -> Result<()>;
    async fn clear_history(&self) -> Result<()>;
}
