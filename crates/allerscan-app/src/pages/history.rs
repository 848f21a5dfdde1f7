// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// History page — past analyses with a verdict filter, replay, delete and
// clear-all.

use dioxus::prelude::*;

use allerscan_core::analysis::HistoryEntry;
use allerscan_flow::HistoryFilter;

use crate::services::app_services::AppServices;
use crate::state::{AppState, dispatch, publish};

use super::SECONDARY_BUTTON;
use super::results::verdict_colour;

#[component]
pub fn History() -> Element {
    let svc = use_context::<AppServices>();
    let ui = use_context::<Signal<AppState>>();
    let mut confirming = use_signal(|| false);
    let mut filter = use_signal(HistoryFilter::default);

    // Refresh once per visit.
    let refresh_svc = svc.clone();
    use_hook(move || {
        let session = refresh_svc.session();
        spawn(async move {
            let mut session = session.lock().await;
            session.refresh_history().await;
            publish(ui, &session);
        });
    });

    let history = ui.read().history.clone();
    let active = filter();
    let shown: Vec<HistoryEntry> = active.apply(&history).into_iter().cloned().collect();
    let (empty_title, empty_body) = active.empty_message(history.is_empty());

    let clear_svc = svc.clone();
    let clear = move |_: MouseEvent| {
        confirming.set(false);
        let session = clear_svc.session();
        spawn(async move {
            let mut session = session.lock().await;
            session.clear_history(true).await;
            publish(ui, &session);
        });
    };

    rsx! {
        div { style: "max-width: 560px; margin: 0 auto; display: flex; flex-direction: column; gap: 12px;",
            div { style: "display: flex; justify-content: space-between; align-items: center;",
                h1 { "History" }
                if !history.is_empty() && !confirming() {
                    button {
                        style: SECONDARY_BUTTON,
                        onclick: move |_| confirming.set(true),
                        "Clear all"
                    }
                }
            }

            if confirming() {
                div { style: "padding: 12px; border-radius: 8px; background: #fff3e0; display: flex; flex-direction: column; gap: 8px;",
                    p { style: "margin: 0;", "Delete every saved analysis? This cannot be undone." }
                    div { style: "display: flex; gap: 8px;",
                        button { style: SECONDARY_BUTTON, onclick: clear, "Yes, clear" }
                        button {
                            style: SECONDARY_BUTTON,
                            onclick: move |_| confirming.set(false),
                            "Cancel"
                        }
                    }
                }
            }

            if !history.is_empty() {
                div { style: "display: flex; gap: 8px; align-items: center;",
                    span { style: "font-size: 14px; color: #888;", "Filter:" }
                    for option in HistoryFilter::ALL {
                        FilterButton {
                            key: "{option.label()}",
                            option,
                            selected: option == active,
                            onselect: move |f| filter.set(f),
                        }
                    }
                }
            }

            if shown.is_empty() {
                div { style: "padding: 32px; text-align: center; border: 1px solid #e0e0e0; border-radius: 8px;",
                    h3 { "{empty_title}" }
                    p { style: "color: #888;", "{empty_body}" }
                }
            }
            for entry in shown {
                HistoryRow { key: "{entry.id}", entry: entry.clone() }
            }
        }
    }
}

#[component]
fn FilterButton(option: HistoryFilter, selected: bool, onselect: EventHandler<HistoryFilter>) -> Element {
    let (bg, fg) = match (selected, option) {
        (false, _) => ("white", "#333"),
        (true, HistoryFilter::All) => ("#2e7d32", "white"),
        (true, HistoryFilter::Safe) => ("#43a047", "white"),
        (true, HistoryFilter::Unsafe) => ("#e53935", "white"),
    };
    rsx! {
        button {
            style: "padding: 4px 12px; border: 1px solid #ccc; border-radius: 16px; background: {bg}; color: {fg}; cursor: pointer;",
            onclick: move |_| onselect.call(option),
            "{option.label()}"
        }
    }
}

#[component]
fn HistoryRow(entry: HistoryEntry) -> Element {
    let svc = use_context::<AppServices>();
    let ui = use_context::<Signal<AppState>>();

    let when = entry
        .recorded_at()
        .map(|t| t.format("%b %e, %Y %H:%M").to_string())
        .unwrap_or_else(|| entry.timestamp.clone());
    let verdict = entry.result.verdict;
    let colour = verdict_colour(verdict);
    let label = verdict.label();

    let view_id = entry.id.clone();
    let view_svc = svc.clone();
    let delete_id = entry.id.clone();

    rsx! {
        div { style: "display: flex; justify-content: space-between; align-items: center; padding: 12px; border: 1px solid #e0e0e0; border-radius: 8px;",
            div {
                style: "cursor: pointer;",
                onclick: move |_| {
                    let id = view_id.clone();
                    dispatch(&view_svc, ui, move |s| {
                        s.view_history_entry(&id);
                    });
                },
                div { style: "font-weight: bold;", "{entry.result.dish_name}" }
                div { style: "font-size: 13px; color: #888;", "{when}" }
            }
            div { style: "display: flex; gap: 8px; align-items: center;",
                span { style: "padding: 4px 8px; border-radius: 12px; color: white; background: {colour}; font-size: 12px;",
                    "{label}"
                }
                button {
                    style: SECONDARY_BUTTON,
                    onclick: move |_| {
                        let id = delete_id.clone();
                        let session = svc.session();
                        spawn(async move {
                            let mut session = session.lock().await;
                            session.delete_history_entry(&id).await;
                            publish(ui, &session);
                        });
                    },
                    "Delete"
                }
            }
        }
    }
}
