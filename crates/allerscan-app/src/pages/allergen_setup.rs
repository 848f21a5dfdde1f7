// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Onboarding step three: allergen selection, then the first profile save.

use dioxus::prelude::*;

use allerscan_core::allergen::{AllergenId, AllergenSet};

use crate::services::app_services::AppServices;
use crate::state::{AppState, dispatch, publish};

use super::{INPUT_STYLE, PRIMARY_BUTTON, SECONDARY_BUTTON};

#[component]
pub fn AllergenSetup() -> Element {
    let svc = use_context::<AppServices>();
    let mut ui = use_context::<Signal<AppState>>();
    let selected = use_signal(|| ui.peek().draft.allergens.clone());
    let saving = ui.read().saving;

    let finish_svc = svc.clone();
    let finish = move |_: MouseEvent| {
        ui.write().saving = true;
        let allergens = selected.read().clone();
        let session = finish_svc.session();
        spawn(async move {
            let mut session = session.lock().await;
            let ok = session.complete_onboarding(allergens).await;
            tracing::info!(ok, "onboarding save finished");
            publish(ui, &session);
        });
    };

    rsx! {
        div { style: "max-width: 520px; margin: 0 auto; padding-top: 32px; display: flex; flex-direction: column; gap: 12px;",
            p { style: "color: #888; font-size: 14px;", "Step 2 of 2" }
            h1 { "Your allergens" }
            p { style: "color: #555;", "Select everything you need to avoid." }
            AllergenPicker { selected }
            div { style: "display: flex; gap: 8px;",
                button {
                    style: SECONDARY_BUTTON,
                    onclick: move |_| dispatch(&svc, ui, |s| {
                        s.start_onboarding();
                    }),
                    "Back"
                }
                button {
                    style: PRIMARY_BUTTON,
                    disabled: saving,
                    onclick: finish,
                    if saving { "Saving..." } else { "Finish" }
                }
            }
        }
    }
}

/// Toggle grid for the canonical allergens plus free-form custom entries.
#[component]
pub fn AllergenPicker(selected: Signal<AllergenSet>) -> Element {
    let mut selected = selected;
    let mut custom = use_signal(String::new);

    let mut add_custom = move || {
        let name = custom.read().trim().to_owned();
        if !name.is_empty() {
            selected.write().insert(AllergenId::from_id(&name));
            custom.set(String::new());
        }
    };

    let customs: Vec<AllergenId> = selected.read().iter().filter(|a| a.is_custom()).cloned().collect();

    rsx! {
        div { style: "display: grid; grid-template-columns: repeat(auto-fill, minmax(120px, 1fr)); gap: 8px;",
            for allergen in AllergenId::CANONICAL {
                AllergenChip { allergen: allergen.clone(), selected }
            }
        }
        if !customs.is_empty() {
            div { style: "display: flex; flex-wrap: wrap; gap: 8px;",
                for allergen in customs {
                    AllergenChip { allergen: allergen.clone(), selected }
                }
            }
        }
        div { style: "display: flex; gap: 8px;",
            input {
                style: INPUT_STYLE,
                placeholder: "Other allergen (e.g. kiwi)",
                value: "{custom}",
                oninput: move |e| custom.set(e.value()),
                onkeydown: move |e| {
                    if e.key() == Key::Enter {
                        add_custom();
                    }
                },
            }
            button { style: SECONDARY_BUTTON, onclick: move |_| add_custom(), "Add" }
        }
    }
}

#[component]
fn AllergenChip(allergen: AllergenId, selected: Signal<AllergenSet>) -> Element {
    let mut selected = selected;
    let on = selected.read().contains(&allergen);
    let (bg, fg) = if on { ("#2e7d32", "white") } else { ("white", "#333") };
    let label = allergen.label().to_owned();

    rsx! {
        button {
            style: "padding: 10px; border: 1px solid #2e7d32; border-radius: 20px; background: {bg}; color: {fg}; cursor: pointer;",
            onclick: move |_| selected.write().toggle(allergen.clone()),
            "{label}"
        }
    }
}
