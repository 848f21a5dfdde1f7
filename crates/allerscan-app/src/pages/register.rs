// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Account creation. A successful registration signs in straight away.

use dioxus::prelude::*;

use allerscan_core::error::AllerscanError;
use allerscan_flow::Page;
use allerscan_flow::session::RegisterForm;

use crate::services::app_services::AppServices;
use crate::state::{AppState, dispatch, publish};

use super::{INPUT_STYLE, InlineError, PRIMARY_BUTTON, use_page_errors};

const MIN_PASSWORD_LEN: usize = 8;

#[component]
pub fn Register() -> Element {
    let svc = use_context::<AppServices>();
    let ui = use_context::<Signal<AppState>>();
    let mut form = use_signal(RegisterForm::default);
    let mut busy = use_signal(|| false);
    let errors = use_page_errors();

    let submit_svc = svc.clone();
    let submit = move |_: MouseEvent| {
        let draft = form.read().clone();
        if draft.email.trim().is_empty() {
            let err = AllerscanError::validation("Please enter your email.");
            errors.report(&submit_svc, ui, &err);
            return;
        }
        if draft.password.chars().count() < MIN_PASSWORD_LEN {
            let err = AllerscanError::validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters."
            ));
            errors.report(&submit_svc, ui, &err);
            return;
        }
        errors.clear();
        busy.set(true);
        let session = submit_svc.session();
        spawn(async move {
            let mut session = session.lock().await;
            let ok = session.register(draft).await;
            tracing::info!(ok, "registration finished");
            busy.set(false);
            publish(ui, &session);
        });
    };

    rsx! {
        div { style: "max-width: 420px; margin: 0 auto; padding-top: 32px; display: flex; flex-direction: column; gap: 12px;",
            h1 { "Create Account" }
            div { style: "display: flex; gap: 8px;",
                input {
                    style: INPUT_STYLE,
                    placeholder: "First name (optional)",
                    value: "{form.read().first_name}",
                    oninput: move |e| form.write().first_name = e.value(),
                }
                input {
                    style: INPUT_STYLE,
                    placeholder: "Last name (optional)",
                    value: "{form.read().last_name}",
                    oninput: move |e| form.write().last_name = e.value(),
                }
            }
            input {
                style: INPUT_STYLE,
                r#type: "email",
                placeholder: "Email",
                value: "{form.read().email}",
                oninput: move |e| form.write().email = e.value(),
            }
            input {
                style: INPUT_STYLE,
                r#type: "password",
                placeholder: "Password",
                value: "{form.read().password}",
                oninput: move |e| form.write().password = e.value(),
            }
            InlineError { error: errors.inline() }
            button {
                style: PRIMARY_BUTTON,
                disabled: busy(),
                onclick: submit,
                if busy() { "Creating account..." } else { "Create Account" }
            }
            p { style: "text-align: center; color: #555;",
                "Already registered? "
                a {
                    style: "color: #2e7d32; cursor: pointer;",
                    onclick: move |_| dispatch(&svc, ui, |s| {
                        s.navigate(Page::Login);
                    }),
                    "Log in"
                }
            }
        }
    }
}
