// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Onboarding step two: name, age range and gender.

use dioxus::prelude::*;

use allerscan_core::types::{AgeRange, Gender};

use crate::services::app_services::AppServices;
use crate::state::{AppState, publish};

use super::{INPUT_STYLE, InlineError, PRIMARY_BUTTON, use_page_errors};

#[component]
pub fn ProfileSetup() -> Element {
    let svc = use_context::<AppServices>();
    let ui = use_context::<Signal<AppState>>();

    // Prefill from an unfinished draft, else from the loaded profile.
    let seed = use_hook(|| {
        let state = ui.peek();
        if state.draft.is_complete() {
            state.draft.clone()
        } else {
            state.profile.clone()
        }
    });
    let name = use_signal(|| seed.name.clone());
    let age = use_signal(|| seed.age);
    let gender = use_signal(|| seed.gender);
    let errors = use_page_errors();

    let next = move |_: MouseEvent| {
        let svc = svc.clone();
        spawn(async move {
            let session = svc.session();
            let mut session = session.lock().await;
            match session.submit_profile_draft(&name.read(), age(), gender()) {
                Ok(page) => {
                    tracing::debug!(?page, "profile draft stored");
                    errors.clear();
                }
                Err(e) => errors.report(&svc, ui, &e),
            }
            publish(ui, &session);
        });
    };

    rsx! {
        div { style: "max-width: 420px; margin: 0 auto; padding-top: 32px; display: flex; flex-direction: column; gap: 12px;",
            p { style: "color: #888; font-size: 14px;", "Step 1 of 2" }
            h1 { "About you" }
            ProfileFields { name, age, gender }
            InlineError { error: errors.inline() }
            button { style: PRIMARY_BUTTON, onclick: next, "Continue" }
        }
    }
}

/// Name, age-range and gender inputs, shared with Settings.
#[component]
pub fn ProfileFields(
    name: Signal<String>,
    age: Signal<Option<AgeRange>>,
    gender: Signal<Option<Gender>>,
) -> Element {
    let (mut name, mut age, mut gender) = (name, age, gender);
    rsx! {
        label { "Name" }
        input {
            style: INPUT_STYLE,
            placeholder: "Your name",
            value: "{name}",
            oninput: move |e| name.set(e.value()),
        }
        label { "Age" }
        select {
            style: INPUT_STYLE,
            onchange: move |e| age.set(AgeRange::from_wire(&e.value())),
            option { value: "", selected: age().is_none(), "Prefer not to say" }
            for range in AgeRange::ALL {
                option {
                    value: range.wire_value(),
                    selected: age() == Some(range),
                    "{range.label()}"
                }
            }
        }
        label { "Gender" }
        select {
            style: INPUT_STYLE,
            onchange: move |e| gender.set(Gender::from_wire(&e.value())),
            option { value: "", selected: gender().is_none(), "Prefer not to say" }
            for g in Gender::ALL {
                option {
                    value: g.wire_value(),
                    selected: gender() == Some(g),
                    "{g.label()}"
                }
            }
        }
    }
}
