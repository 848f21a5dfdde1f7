// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Allerscan — Core types and error definitions shared across all crates.

pub mod allergen;
pub mod analysis;
pub mod config;
pub mod error;
pub mod human_errors;
pub mod types;

pub use allergen::{AllergenId, AllergenSet};
pub use analysis::{AnalysisResult, HistoryEntry, Nutrition, Verdict};
pub use config::AppConfig;
pub use error::AllerscanError;
pub use types::*;
