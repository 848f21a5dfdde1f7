// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Allerscan — allergen-aware food analysis client
//
// Entry point. Initialises logging, backend services, app state, and launches
// the Dioxus UI.

mod pages;
mod services;
mod state;

use std::time::Duration;

use dioxus::prelude::*;

use allerscan_core::types::{Notification, NotificationKind};
use allerscan_flow::Page;

use pages::allergen_setup::AllergenSetup;
use pages::history::History;
use pages::home::Home;
use pages::login::Login;
use pages::profile_setup::ProfileSetup;
use pages::register::Register;
use pages::results::Results;
use pages::scan::Scan;
use pages::settings::Settings;
use pages::splash::Splash;
use pages::welcome::Welcome;

use services::app_services::AppServices;
use state::{AppState, dispatch, publish};

/// How long a toast stays up before dismissing itself.
const TOAST_TTL: Duration = Duration::from_secs(4);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Allerscan starting");

    dioxus::launch(app);
}

/// Root component.
fn app() -> Element {
    let svc = use_hook(|| match AppServices::init() {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "persistent storage failed — using in-memory fallback");
            AppServices::fallback()
        }
    });

    use_context_provider(|| svc.clone());
    let ui = use_context_provider(|| Signal::new(AppState::default()));

    // Splash: hydrate while the delay runs, then route.
    let boot = svc.clone();
    use_hook(move || {
        let session = boot.session();
        spawn(async move {
            let mut session = session.lock().await;
            let page = session.bootstrap().await;
            tracing::info!(?page, "splash finished");
            publish(ui, &session);
        });
    });

    let page = ui.read().page;

    rsx! {
        div { class: "app-container",
            style: "display: flex; flex-direction: column; height: 100vh; font-family: system-ui, -apple-system, sans-serif;",

            div { class: "page-content",
                style: "flex: 1; overflow-y: auto; padding: 16px;",
                {render_page(page)}
            }

            if page.shows_tab_bar() {
                TabBar { current: page }
            }

            Toasts {}
        }
    }
}

fn render_page(page: Page) -> Element {
    match page {
        Page::Splash => rsx! { Splash {} },
        Page::Login => rsx! { Login {} },
        Page::Register => rsx! { Register {} },
        Page::Welcome => rsx! { Welcome {} },
        Page::ProfileSetup => rsx! { ProfileSetup {} },
        Page::AllergenSetup => rsx! { AllergenSetup {} },
        Page::Home => rsx! { Home {} },
        Page::Scan => rsx! { Scan {} },
        Page::Settings => rsx! { Settings {} },
        Page::History => rsx! { History {} },
        Page::Results => rsx! { Results {} },
    }
}

/// Persistent bottom tab bar.
#[component]
fn TabBar(current: Page) -> Element {
    rsx! {
        nav { class: "tab-bar",
            style: "display: flex; justify-content: space-around; padding: 8px 0; border-top: 1px solid #e0e0e0; background: #fafafa;",
            TabButton { to: Page::Home, current, label: "Home", icon: "H" }
            TabButton { to: Page::Scan, current, label: "Scan", icon: "S" }
            TabButton { to: Page::History, current, label: "History", icon: "R" }
            TabButton { to: Page::Settings, current, label: "Settings", icon: "A" }
        }
    }
}

#[component]
fn TabButton(to: Page, current: Page, label: &'static str, icon: &'static str) -> Element {
    let svc = use_context::<AppServices>();
    let ui = use_context::<Signal<AppState>>();
    let color = if to == current { "#2e7d32" } else { "#333" };

    rsx! {
        button {
            style: "display: flex; flex-direction: column; align-items: center; border: none; background: none; color: {color}; font-size: 12px; cursor: pointer;",
            onclick: move |_| {
                dispatch(&svc, ui, move |s| {
                    s.navigate(to);
                });
            },
            span { style: "font-size: 20px;", "{icon}" }
            span { "{label}" }
        }
    }
}

/// Stack of undismissed notifications, newest at the bottom.
#[component]
fn Toasts() -> Element {
    let ui = use_context::<Signal<AppState>>();
    let notes = ui.read().notifications.clone();

    rsx! {
        div {
            style: "position: fixed; top: 12px; left: 12px; right: 12px; display: flex; flex-direction: column; gap: 8px; pointer-events: none;",
            for note in notes {
                Toast { key: "{note.id}", note: note.clone() }
            }
        }
    }
}

#[component]
fn Toast(note: Notification) -> Element {
    let svc = use_context::<AppServices>();
    let ui = use_context::<Signal<AppState>>();
    let id = note.id;

    let timer_svc = svc.clone();
    use_hook(move || {
        spawn(async move {
            tokio::time::sleep(TOAST_TTL).await;
            dispatch(&timer_svc, ui, move |s| s.dismiss_notification(id));
        });
    });

    let bg = match note.kind {
        NotificationKind::Success => "#e8f5e9",
        NotificationKind::Error => "#ffebee",
        NotificationKind::Info => "#e3f2fd",
    };

    rsx! {
        div {
            style: "display: flex; justify-content: space-between; align-items: center; padding: 10px 14px; border-radius: 8px; background: {bg}; box-shadow: 0 2px 6px rgba(0,0,0,0.15); pointer-events: auto;",
            span { "{note.message}" }
            button {
                style: "border: none; background: none; font-size: 16px; cursor: pointer;",
                onclick: move |_| dispatch(&svc, ui, move |s| s.dismiss_notification(id)),
                "×"
            }
        }
    }
}
