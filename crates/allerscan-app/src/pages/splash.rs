// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Splash screen, shown while the session hydrates.

use dioxus::prelude::*;

#[component]
pub fn Splash() -> Element {
    rsx! {
        div {
            style: "display: flex; flex-direction: column; align-items: center; justify-content: center; height: 80vh;",
            h1 { style: "font-size: 40px; color: #2e7d32; margin-bottom: 8px;", "Allerscan" }
            p { style: "color: #666;", "Eat with confidence." }
            p { style: "color: #999; font-size: 14px;", "Loading..." }
        }
    }
}
