// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Settings page — edit profile and allergens, sign out.

use dioxus::prelude::*;

use allerscan_core::types::UserProfile;
use allerscan_flow::profile::validate_profile;

use crate::services::app_services::AppServices;
use crate::state::{AppState, dispatch, publish};

use super::allergen_setup::AllergenPicker;
use super::profile_setup::ProfileFields;
use super::{ERROR_TEXT, InlineError, PRIMARY_BUTTON, SECONDARY_BUTTON, use_page_errors};

#[component]
pub fn Settings() -> Element {
    let svc = use_context::<AppServices>();
    let mut ui = use_context::<Signal<AppState>>();

    let seed = use_hook(|| ui.peek().profile.clone());
    let name = use_signal(|| seed.name.clone());
    let age = use_signal(|| seed.age);
    let gender = use_signal(|| seed.gender);
    let allergens = use_signal(|| seed.allergens.clone());

    let errors = use_page_errors();

    let saving = ui.read().saving;
    let no_allergens = allergens.read().is_empty();
    let blank_name = name.read().trim().is_empty();

    let save_svc = svc.clone();
    let save = move |_: MouseEvent| {
        let profile = UserProfile {
            name: name.read().trim().to_owned(),
            age: age(),
            gender: gender(),
            allergens: allergens.read().clone(),
        };
        if let Err(e) = validate_profile(&profile) {
            errors.report(&save_svc, ui, &e);
            return;
        }
        errors.clear();
        ui.write().saving = true;
        let session = save_svc.session();
        spawn(async move {
            let mut session = session.lock().await;
            let ok = session.save_settings(profile).await;
            tracing::info!(ok, "settings save finished");
            publish(ui, &session);
        });
    };

    let server = svc.config().server_url.clone();
    let data_dir = svc.data_dir().display().to_string();

    rsx! {
        div { style: "max-width: 560px; margin: 0 auto; display: flex; flex-direction: column; gap: 12px;",
            h1 { "Settings" }

            h3 { "Profile" }
            ProfileFields { name, age, gender }
            InlineError { error: errors.inline() }

            h3 { "Allergens" }
            if no_allergens {
                p { style: ERROR_TEXT, "Select at least one allergen before scanning." }
            }
            AllergenPicker { selected: allergens }

            button {
                style: PRIMARY_BUTTON,
                disabled: saving || blank_name,
                onclick: save,
                if saving { "Saving..." } else { "Save" }
            }

            h3 { "Account" }
            p { style: "color: #888; font-size: 13px;", "Server: {server}" }
            p { style: "color: #888; font-size: 13px;", "Data: {data_dir}" }
            button {
                style: SECONDARY_BUTTON,
                onclick: move |_| dispatch(&svc, ui, |s| {
                    s.logout();
                }),
                "Sign out"
            }
        }
    }
}
