// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Analysis orchestration and history management.
//
// `analyze` runs one scan request end to end: allergen guard, endpoint
// dispatch, normalisation, nutrition backfill, history write, history
// refresh. Navigation is left to the caller, driven by the returned outcome.

use tracing::{debug, info, instrument, warn};

use allerscan_api::Backend;
use allerscan_api::wire::{AnalyzeRequest, HistoryAdd};
use allerscan_core::analysis::{AnalysisResult, HistoryEntry};
use allerscan_core::config::NutritionBackfill;
use allerscan_core::error::{AllerscanError, Result};
use allerscan_core::human_errors::humanize_error;
use allerscan_core::types::{Notification, ScanMethod, ScanRequest, UserProfile};

use crate::adapters::{
    BarcodeScan, ImageScan, NormalizeResult, SearchAnalysis, backfill_nutrition,
};
use crate::state::AppState;

pub const ANALYSIS_COMPLETE: &str = "Analysis complete!";
pub const VOICE_ANALYZED: &str = "Voice analyzed";
pub const ENTRY_DELETED: &str = "Entry deleted";
pub const ENTRY_DELETE_FAILED: &str = "Failed to delete entry";
pub const HISTORY_CLEARED: &str = "History cleared";
pub const HISTORY_CLEAR_FAILED: &str = "Failed to clear history";

/// How an `analyze` call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// A result was produced, stored, and set as the current result.
    Completed,
    /// The voice endpoint accepted the note; there is no result to show.
    VoiceAnalyzed,
    /// Refused before any request because no allergens are selected.
    AllergensRequired,
    /// A request or normalisation failed; state is unchanged.
    Failed,
}

/// What a dispatched request produced.
enum Dispatched {
    Result(AnalysisResult),
    Voice,
}

/// Send `request` to its endpoint and normalise the reply.
async fn dispatch<B: Backend + ?Sized>(
    backend: &B,
    request: ScanRequest,
    backfill: NutritionBackfill,
) -> Result<Dispatched> {
    let mut result = match request {
        ScanRequest::Upload(upload) => ImageScan(backend.scan_image(upload).await?).normalize()?,
        ScanRequest::Barcode(barcode) => {
            let response = backend.scan_barcode(barcode.clone()).await?;
            BarcodeScan { barcode, response }.normalize()?
        }
        ScanRequest::Search(query) => {
            let response = backend
                .analyze_food(AnalyzeRequest {
                    food_name: query.clone(),
                    ingredients: Vec::new(),
                    nutrition: None,
                })
                .await?;
            SearchAnalysis { query, response }.normalize()?
        }
        ScanRequest::Voice(note) => {
            let reply = backend.scan_voice(note).await?;
            debug!(%reply, "voice endpoint replied");
            return Ok(Dispatched::Voice);
        }
    };
    backfill_nutrition(&mut result, backfill);
    Ok(Dispatched::Result(result))
}

/// Dispatch, then store the result in history.
async fn run<B: Backend + ?Sized>(
    backend: &B,
    request: ScanRequest,
    backfill: NutritionBackfill,
) -> Result<Option<AnalysisResult>> {
    let method = request.method();
    match dispatch(backend, request, backfill).await? {
        Dispatched::Result(result) => {
            backend
                .add_history(HistoryAdd {
                    analysis: result.clone(),
                    scan_type: method.scan_type().to_owned(),
                })
                .await?;
            Ok(Some(result))
        }
        Dispatched::Voice => Ok(None),
    }
}

/// Analysis needs something to look for.
pub fn require_allergens(profile: &UserProfile) -> Result<()> {
    if profile.allergens.is_empty() {
        return Err(AllerscanError::AllergensRequired);
    }
    Ok(())
}

/// Analyse one request. Every failure becomes a notification; nothing is
/// raised to the caller.
#[instrument(skip_all, fields(method = ?request.method()))]
pub async fn analyze<B: Backend + ?Sized>(
    backend: &B,
    state: &mut AppState,
    request: ScanRequest,
    backfill: NutritionBackfill,
) -> AnalysisOutcome {
    if let Err(e) = require_allergens(&state.profile) {
        info!(error = %e, "analysis refused");
        state.notify(Notification::error(humanize_error(&e).message));
        return AnalysisOutcome::AllergensRequired;
    }

    let voice = request.method() == ScanMethod::Voice;
    state.loading = true;
    let outcome = run(backend, request, backfill).await;

    let outcome = match outcome {
        Ok(Some(result)) => {
            info!(dish = %result.dish_name, verdict = ?result.verdict, "analysis complete");
            refresh_history(backend, state).await;
            state.current_result = Some(result);
            state.notify(Notification::success(ANALYSIS_COMPLETE));
            AnalysisOutcome::Completed
        }
        Ok(None) => {
            debug_assert!(voice);
            state.notify(Notification::success(VOICE_ANALYZED));
            AnalysisOutcome::VoiceAnalyzed
        }
        Err(e) => {
            warn!(error = %e, "analysis failed");
            let message = if voice {
                e.to_string()
            } else {
                format!("Analysis failed: {e}")
            };
            state.notify(Notification::error(message));
            AnalysisOutcome::Failed
        }
    };
    state.loading = false;
    outcome
}

/// Replace the cached history with the remote list. Failures are logged
/// and the cache is left as it was.
#[instrument(skip_all)]
pub async fn refresh_history<B: Backend + ?Sized>(backend: &B, state: &mut AppState) {
    if let Some(history) = fetch_history(backend).await {
        state.history = history;
    }
}

pub async fn fetch_history<B: Backend + ?Sized>(backend: &B) -> Option<Vec<HistoryEntry>> {
    match backend.get_history().await {
        Ok(history) => {
            debug!(entries = history.len(), "history loaded");
            Some(history)
        }
        Err(e) => {
            warn!(error = %e, "history refresh failed");
            None
        }
    }
}

/// Delete one entry remotely, then locally.
#[instrument(skip(backend, state))]
pub async fn delete_history_entry<B: Backend + ?Sized>(
    backend: &B,
    state: &mut AppState,
    id: &str,
) -> bool {
    match backend.delete_history_entry(id.to_owned()).await {
        Ok(()) => {
            state.history.retain(|e| e.id != id);
            state.notify(Notification::success(ENTRY_DELETED));
            true
        }
        Err(e) => {
            warn!(error = %e, "history delete failed");
            state.notify(Notification::error(ENTRY_DELETE_FAILED));
            false
        }
    }
}

/// Clear all history. Nothing is sent unless `confirmed`.
#[instrument(skip(backend, state))]
pub async fn clear_history<B: Backend + ?Sized>(
    backend: &B,
    state: &mut AppState,
    confirmed: bool,
) -> bool {
    if !confirmed {
        return false;
    }
    match backend.clear_history().await {
        Ok(()) => {
            state.history.clear();
            state.notify(Notification::success(HISTORY_CLEARED));
            true
        }
        Err(e) => {
            warn!(error = %e, "history clear failed");
            state.notify(Notification::error(HISTORY_CLEAR_FAILED));
            false
        }
    }
}

/// Make a stored entry the current result. Returns false for unknown ids.
pub fn view_history_entry(state: &mut AppState, id: &str) -> bool {
    let Some(result) = state.history_entry(id).map(|e| e.result.clone()) else {
        return false;
    };
    state.current_result = Some(result);
    true
}
