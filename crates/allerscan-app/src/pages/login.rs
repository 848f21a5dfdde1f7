// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Login page — email/password sign-in, with a link to registration.

use dioxus::prelude::*;

use allerscan_core::error::AllerscanError;
use allerscan_flow::Page;

use crate::services::app_services::AppServices;
use crate::state::{AppState, dispatch, publish};

use super::{INPUT_STYLE, InlineError, PRIMARY_BUTTON, use_page_errors};

#[component]
pub fn Login() -> Element {
    let svc = use_context::<AppServices>();
    let ui = use_context::<Signal<AppState>>();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut busy = use_signal(|| false);
    let errors = use_page_errors();

    let submit_svc = svc.clone();
    let submit = use_callback(move |()| {
        if busy() {
            return;
        }
        let (e, p) = (email.read().trim().to_owned(), password.read().clone());
        if e.is_empty() || p.is_empty() {
            let invalid = AllerscanError::validation("Please enter your email and password.");
            errors.report(&submit_svc, ui, &invalid);
            return;
        }
        errors.clear();
        busy.set(true);
        let session = submit_svc.session();
        spawn(async move {
            let mut session = session.lock().await;
            let ok = session.login(&e, &p).await;
            tracing::info!(ok, "login attempt finished");
            if ok {
                password.set(String::new());
            }
            busy.set(false);
            publish(ui, &session);
        });
    });

    rsx! {
        div { style: "max-width: 420px; margin: 0 auto; padding-top: 48px; display: flex; flex-direction: column; gap: 12px;",
            h1 { "Login" }
            input {
                style: INPUT_STYLE,
                r#type: "email",
                placeholder: "Email",
                value: "{email}",
                oninput: move |e| email.set(e.value()),
            }
            input {
                style: INPUT_STYLE,
                r#type: "password",
                placeholder: "Password",
                value: "{password}",
                oninput: move |e| password.set(e.value()),
                onkeydown: move |e| {
                    if e.key() == Key::Enter {
                        submit.call(());
                    }
                },
            }
            InlineError { error: errors.inline() }
            button {
                style: PRIMARY_BUTTON,
                disabled: busy(),
                onclick: move |_| submit.call(()),
                if busy() { "Signing in..." } else { "Login" }
            }
            p { style: "text-align: center; color: #555;",
                "No account yet? "
                a {
                    style: "color: #2e7d32; cursor: pointer;",
                    onclick: move |_| dispatch(&svc, ui, |s| {
                        s.navigate(Page::Register);
                    }),
                    "Create one"
                }
            }
        }
    }
}
