// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Allerscan Flow — the application logic between the UI and the backend.
//
// `Session` owns the single authoritative `AppState`. Pages call into it and
// render from a snapshot of that state; every page transition goes through
// `RouteGuard`.

pub mod adapters;
pub mod analysis;
pub mod history;
pub mod navigation;
pub mod profile;
pub mod session;
pub mod state;

pub use history::HistoryFilter;
pub use navigation::{Page, RouteGuard};
pub use session::Session;
pub use state::AppState;
