// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Results page — the current analysis, fresh or replayed from history.

use dioxus::prelude::*;

use allerscan_core::analysis::{Nutrition, Verdict};
use allerscan_flow::Page;

use crate::services::app_services::AppServices;
use crate::state::{AppState, dispatch};

use super::{PRIMARY_BUTTON, SECONDARY_BUTTON};

pub(crate) fn verdict_colour(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Safe => "#2e7d32",
        Verdict::Risky => "#ef6c00",
        Verdict::Unsafe => "#c62828",
    }
}

#[component]
pub fn Results() -> Element {
    let svc = use_context::<AppServices>();
    let ui = use_context::<Signal<AppState>>();

    // The guard keeps us off this page without a result.
    let Some(result) = ui.read().current_result.clone() else {
        return rsx! { p { "Nothing to show yet." } };
    };

    let colour = verdict_colour(result.verdict);
    let label = result.verdict.label();
    let home_svc = svc.clone();

    rsx! {
        div { style: "max-width: 560px; margin: 0 auto; display: flex; flex-direction: column; gap: 12px;",
            div { style: "padding: 20px; border-radius: 12px; color: white; background: {colour}; text-align: center;",
                div { style: "font-size: 28px; font-weight: bold;", "{label}" }
                div { style: "font-size: 20px;", "{result.dish_name}" }
                div { style: "font-size: 14px; opacity: 0.9;", "{result.confidence}% confidence" }
            }

            p { style: "color: #555; line-height: 1.5;", "{result.explanation}" }

            if !result.detected_allergens.is_empty() {
                h3 { "Detected allergens" }
                ul {
                    for a in result.detected_allergens.iter() {
                        li { style: "color: #c62828;", "{a}" }
                    }
                }
            }

            if !result.risky_ingredients.is_empty() {
                h3 { "Ingredients to check" }
                ul {
                    for i in result.risky_ingredients.iter() {
                        li { "{i}" }
                    }
                }
            }

            if !result.substitutions.is_empty() {
                h3 { "Substitutions" }
                ul {
                    for s in result.substitutions.iter() {
                        li {
                            "{s.original} → {s.replacement}"
                            if !s.reason.is_empty() {
                                span { style: "color: #888;", " ({s.reason})" }
                            }
                        }
                    }
                }
            }

            if !result.alternative_dishes.is_empty() {
                h3 { "Try instead" }
                ul {
                    for d in result.alternative_dishes.iter() {
                        li {
                            "{d.name}"
                            if !d.reason.is_empty() {
                                span { style: "color: #888;", ": {d.reason}" }
                            }
                        }
                    }
                }
            }

            h3 { "Nutrition" }
            NutritionPanel { nutrition: result.nutrition }

            div { style: "display: flex; gap: 8px;",
                button {
                    style: PRIMARY_BUTTON,
                    onclick: move |_| dispatch(&svc, ui, |s| {
                        s.navigate(Page::Scan);
                    }),
                    "Scan another"
                }
                button {
                    style: SECONDARY_BUTTON,
                    onclick: move |_| dispatch(&home_svc, ui, |s| {
                        s.navigate(Page::Home);
                    }),
                    "Home"
                }
            }
        }
    }
}

#[component]
fn NutritionPanel(nutrition: Option<Nutrition>) -> Element {
    let Some(n) = nutrition else {
        return rsx! { p { style: "color: #888;", "Nutrition unknown." } };
    };

    rsx! {
        div { style: "display: grid; grid-template-columns: repeat(4, 1fr); gap: 8px; text-align: center;",
            NutritionCell { label: "Calories", value: format!("{:.0}", n.calories) }
            NutritionCell { label: "Protein", value: format!("{:.0} g", n.protein) }
            NutritionCell { label: "Carbs", value: format!("{:.0} g", n.carbs) }
            NutritionCell { label: "Fat", value: format!("{:.0} g", n.fat) }
        }
    }
}

#[component]
fn NutritionCell(label: &'static str, value: String) -> Element {
    rsx! {
        div { style: "padding: 8px; border-radius: 8px; background: #f5f5f5;",
            div { style: "font-size: 18px; font-weight: bold;", "{value}" }
            div { style: "font-size: 12px; color: #888;", "{label}" }
        }
    }
}
