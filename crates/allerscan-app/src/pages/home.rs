// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Home page — dish search plus shortcuts to the other tabs.

use dioxus::prelude::*;

use allerscan_core::types::ScanRequest;
use allerscan_flow::Page;

use crate::services::app_services::AppServices;
use crate::state::{AppState, dispatch, start_analysis};

use super::{INPUT_STYLE, InlineError, PRIMARY_BUTTON, use_page_errors};

#[component]
pub fn Home() -> Element {
    let svc = use_context::<AppServices>();
    let ui = use_context::<Signal<AppState>>();
    let mut query = use_signal(String::new);
    let errors = use_page_errors();

    let state = ui.read();
    let loading = state.loading;
    let greeting = if state.profile.name.is_empty() {
        "Hello!".to_owned()
    } else {
        format!("Hello, {}!", state.profile.name)
    };
    let allergen_count = state.profile.allergens.len();
    let recent = state.history.len();
    drop(state);

    let search_svc = svc.clone();
    let search = use_callback(move |()| {
        match ScanRequest::search(&query.read()) {
            Ok(request) => {
                errors.clear();
                start_analysis(&search_svc, ui, request);
            }
            Err(e) => errors.report(&search_svc, ui, &e),
        }
    });

    rsx! {
        div { style: "max-width: 560px; margin: 0 auto; display: flex; flex-direction: column; gap: 16px;",
            h1 { "{greeting}" }
            p { style: "color: #555;",
                "Watching for {allergen_count} allergen(s). {recent} past scan(s)."
            }

            section { style: "display: flex; flex-direction: column; gap: 8px;",
                h3 { style: "margin: 0;", "Search for a dish" }
                input {
                    style: INPUT_STYLE,
                    placeholder: "e.g. pad thai",
                    value: "{query}",
                    disabled: loading,
                    oninput: move |e| query.set(e.value()),
                    onkeydown: move |e| {
                        if e.key() == Key::Enter && !loading {
                            search.call(());
                        }
                    },
                }
                InlineError { error: errors.inline() }
                button {
                    style: PRIMARY_BUTTON,
                    disabled: loading,
                    onclick: move |_| search.call(()),
                    if loading { "Analyzing..." } else { "Analyze" }
                }
            }

            section { style: "display: grid; grid-template-columns: 1fr 1fr 1fr; gap: 8px;",
                Shortcut { to: Page::Scan, label: "Scan food" }
                Shortcut { to: Page::History, label: "History" }
                Shortcut { to: Page::Settings, label: "My allergens" }
            }
        }
    }
}

#[component]
fn Shortcut(to: Page, label: &'static str) -> Element {
    let svc = use_context::<AppServices>();
    let ui = use_context::<Signal<AppState>>();

    rsx! {
        button {
            style: "padding: 20px 8px; border: 1px solid #e0e0e0; border-radius: 12px; background: #fafafa; font-size: 14px; cursor: pointer;",
            onclick: move |_| dispatch(&svc, ui, move |s| {
                s.navigate(to);
            }),
            "{label}"
        }
    }
}
