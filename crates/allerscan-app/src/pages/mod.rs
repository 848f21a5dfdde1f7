// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page components — one per `Page` variant.

pub mod allergen_setup;
pub mod history;
pub mod home;
pub mod login;
pub mod profile_setup;
pub mod register;
pub mod results;
pub mod scan;
pub mod settings;
pub mod splash;
pub mod welcome;

use dioxus::prelude::*;

use allerscan_core::error::AllerscanError;
use allerscan_core::human_errors::{HumanError, Presentation, humanize_error};
use allerscan_core::types::Notification;

use crate::services::app_services::AppServices;
use crate::state::{AppState, dispatch};

/// Shared inline styles.
pub(crate) const INPUT_STYLE: &str =
    "width: 100%; padding: 10px; border: 1px solid #ccc; border-radius: 8px; font-size: 16px; box-sizing: border-box;";
pub(crate) const PRIMARY_BUTTON: &str =
    "width: 100%; padding: 12px; border: none; border-radius: 8px; background: #2e7d32; color: white; font-size: 16px; cursor: pointer;";
pub(crate) const SECONDARY_BUTTON: &str =
    "padding: 10px 14px; border: 1px solid #ccc; border-radius: 8px; background: white; font-size: 14px; cursor: pointer;";
pub(crate) const ERROR_TEXT: &str = "color: #c62828; font-size: 14px; margin: 4px 0;";

/// Page-local error slots. Each failure lands in the one its presentation
/// calls for; dismissible ones go to the toast stack instead.
#[derive(Clone, Copy)]
pub(crate) struct PageErrors {
    inline: Signal<Option<HumanError>>,
    blocking: Signal<Option<HumanError>>,
}

pub(crate) fn use_page_errors() -> PageErrors {
    PageErrors {
        inline: use_signal(|| None),
        blocking: use_signal(|| None),
    }
}

impl PageErrors {
    pub fn report(mut self, svc: &AppServices, ui: Signal<AppState>, err: &AllerscanError) {
        let human = humanize_error(err);
        tracing::debug!(error = %err, presentation = ?human.presentation, "page error");
        match human.presentation {
            Presentation::Inline => self.inline.set(Some(human)),
            Presentation::Blocking => self.blocking.set(Some(human)),
            Presentation::Dismissible => {
                let line = human.one_line();
                dispatch(svc, ui, move |s| s.notify(Notification::error(line)));
            }
        }
    }

    pub fn clear(mut self) {
        self.inline.set(None);
    }

    pub fn inline(&self) -> Option<HumanError> {
        self.inline.read().clone()
    }

    pub fn blocking(&self) -> Option<HumanError> {
        self.blocking.read().clone()
    }

    pub fn dismiss_blocking(mut self) {
        self.blocking.set(None);
    }
}

/// Inline hint under the control that failed.
#[component]
pub(crate) fn InlineError(error: Option<HumanError>) -> Element {
    let Some(error) = error else {
        return rsx! {};
    };
    rsx! {
        p { style: ERROR_TEXT, "{error.message}" }
        if !error.suggestion.is_empty() {
            p { style: "color: #777; font-size: 13px; margin: 0;", "{error.suggestion}" }
        }
    }
}

/// Modal alert the user must acknowledge.
#[component]
pub(crate) fn BlockingAlert(error: HumanError, ondismiss: EventHandler<()>) -> Element {
    rsx! {
        div {
            style: "position: fixed; inset: 0; background: rgba(0,0,0,0.5); display: flex; align-items: center; justify-content: center;",
            div { style: "max-width: 320px; padding: 20px; border-radius: 12px; background: white; display: flex; flex-direction: column; gap: 12px;",
                p { style: "margin: 0; font-weight: bold;", "{error.message}" }
                if !error.suggestion.is_empty() {
                    p { style: "margin: 0; color: #555;", "{error.suggestion}" }
                }
                button {
                    style: PRIMARY_BUTTON,
                    onclick: move |_| ondismiss.call(()),
                    "OK"
                }
            }
        }
    }
}
