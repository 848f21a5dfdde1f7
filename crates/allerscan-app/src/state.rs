// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Reactive view of the session state for the Dioxus UI.
//
// Pages read a `Signal<AppState>` snapshot and never mutate it directly,
// except to raise `loading` while an action is queued. Every change goes
// through the session controller and is then published back.

use dioxus::prelude::*;

use allerscan_core::types::ScanRequest;
pub use allerscan_flow::AppState;

use crate::services::app_services::{AppServices, AppSession};

/// Copy the controller's state into the UI signal.
pub fn publish(mut ui: Signal<AppState>, session: &AppSession) {
    ui.set(session.state().clone());
}

/// Run a synchronous controller action from an event handler.
pub fn dispatch(
    svc: &AppServices,
    ui: Signal<AppState>,
    action: impl FnOnce(&mut AppSession) + 'static,
) {
    let session = svc.session();
    spawn(async move {
        let mut session = session.lock().await;
        action(&mut session);
        publish(ui, &session);
    });
}

/// Queue an analysis. `loading` is raised on the snapshot at once so the
/// capture controls disable before the controller lock is taken.
pub fn start_analysis(svc: &AppServices, mut ui: Signal<AppState>, request: ScanRequest) {
    ui.write().loading = true;
    let session = svc.session();
    spawn(async move {
        let mut session = session.lock().await;
        let outcome = session.analyze(request).await;
        tracing::debug!(?outcome, "analysis finished");
        publish(ui, &session);
    });
}
