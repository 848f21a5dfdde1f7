// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// First step of onboarding.

use dioxus::prelude::*;

use crate::services::app_services::AppServices;
use crate::state::{AppState, dispatch};

use super::PRIMARY_BUTTON;

#[component]
pub fn Welcome() -> Element {
    let svc = use_context::<AppServices>();
    let ui = use_context::<Signal<AppState>>();

    rsx! {
        div { style: "max-width: 420px; margin: 0 auto; padding-top: 48px;",
            h1 { "Welcome to Allerscan" }
            p { style: "color: #555; line-height: 1.5;",
                "Tell us who you are and what you're allergic to. We'll check dishes, "
                "photos, barcodes and voice notes against your allergens."
            }
            ul { style: "color: #555; line-height: 1.8;",
                li { "Snap a photo or pick one from your gallery" }
                li { "Type a product barcode" }
                li { "Search for a dish by name" }
                li { "Describe a meal out loud" }
            }
            button {
                style: "{PRIMARY_BUTTON} margin-top: 24px;",
                onclick: move |_| dispatch(&svc, ui, |s| {
                    s.start_onboarding();
                }),
                "Get Started"
            }
        }
    }
}
