// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Allerscan Capture — turns the four input methods (camera still, gallery
// pick, typed barcode, voice/text note) into a tagged `ScanRequest`.

pub mod barcode;
pub mod camera;
pub mod gallery;
pub mod still;
pub mod voice;

pub use barcode::BarcodeEntry;
pub use camera::CameraSession;
pub use voice::VoiceEntry;
