// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The application state shared by every page.

use uuid::Uuid;

use allerscan_core::analysis::{AnalysisResult, HistoryEntry};
use allerscan_core::types::{Notification, UserProfile};

use crate::navigation::Page;

/// Single source of truth for the UI. Cloned into a signal for rendering.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Page currently shown.
    pub page: Page,
    /// The confirmed profile, as last saved or loaded.
    pub profile: UserProfile,
    /// Set once a profile with a name has been loaded or saved.
    pub onboarded: bool,
    /// Name/age/gender collected on ProfileSetup, awaiting allergens.
    pub draft: UserProfile,
    /// Cached remote history, newest first.
    pub history: Vec<HistoryEntry>,
    /// Result shown on the results page.
    pub current_result: Option<AnalysisResult>,
    /// An analysis is in flight.
    pub loading: bool,
    /// A profile save is in flight.
    pub saving: bool,
    /// Toasts not yet dismissed, oldest first.
    pub notifications: Vec<Notification>,
}

impl AppState {
    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    pub fn dismiss(&mut self, id: Uuid) {
        self.notifications.retain(|n| n.id != id);
    }

    /// Most recent notification, if any.
    pub fn last_notification(&self) -> Option<&Notification> {
        self.notifications.last()
    }

    pub fn history_entry(&self, id: &str) -> Option<&HistoryEntry> {
        self.history.iter().find(|e| e.id == id)
    }
}
