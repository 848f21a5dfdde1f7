// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pages and the transition rules between them.

/// Every screen the app can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Page {
    #[default]
    Splash,
    Login,
    Register,
    Welcome,
    ProfileSetup,
    AllergenSetup,
    Home,
    Scan,
    Settings,
    History,
    Results,
}

impl Page {
    /// Pages that need a stored session token.
    pub fn requires_session(&self) -> bool {
        matches!(self, Self::Scan | Self::Settings | Self::History)
    }

    pub fn is_onboarding(&self) -> bool {
        matches!(self, Self::Welcome | Self::ProfileSetup | Self::AllergenSetup)
    }

    /// Whether the bottom tab bar is shown on this page.
    pub fn shows_tab_bar(&self) -> bool {
        matches!(
            self,
            Self::Home | Self::Scan | Self::Settings | Self::History | Self::Results
        )
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Splash => "Allerscan",
            Self::Login => "Login",
            Self::Register => "Create Account",
            Self::Welcome => "Welcome",
            Self::ProfileSetup => "Your Profile",
            Self::AllergenSetup => "Your Allergens",
            Self::Home => "Home",
            Self::Scan => "Scan",
            Self::Settings => "Settings",
            Self::History => "History",
            Self::Results => "Results",
        }
    }
}

/// What the guard needs to know about the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GuardContext {
    pub has_token: bool,
    pub has_result: bool,
}

/// The one place page access is decided.
pub struct RouteGuard;

impl RouteGuard {
    /// The page actually shown when `target` is requested.
    pub fn resolve(target: Page, ctx: GuardContext) -> Page {
        if target.requires_session() && !ctx.has_token {
            return Page::Login;
        }
        if target == Page::Results && !ctx.has_result {
            return Page::Home;
        }
        target
    }

    /// Where to go once the splash screen finishes (and after sign-in).
    pub fn after_splash(has_token: bool, profile_complete: bool, onboarded: bool) -> Page {
        if !has_token {
            Page::Login
        } else if profile_complete && onboarded {
            Page::Home
        } else {
            Page::Welcome
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNED_IN: GuardContext = GuardContext {
        has_token: true,
        has_result: false,
    };

    #[test]
    fn guarded_pages_bounce_to_login() {
        for page in [Page::Scan, Page::Settings, Page::History] {
            assert_eq!(RouteGuard::resolve(page, GuardContext::default()), Page::Login);
            assert_eq!(RouteGuard::resolve(page, SIGNED_IN), page);
        }
    }

    #[test]
    fn open_pages_need_no_token() {
        for page in [Page::Home, Page::Login, Page::Register, Page::Welcome] {
            assert_eq!(RouteGuard::resolve(page, GuardContext::default()), page);
        }
    }

    #[test]
    fn results_need_a_result() {
        assert_eq!(RouteGuard::resolve(Page::Results, SIGNED_IN), Page::Home);
        let ctx = GuardContext {
            has_result: true,
            ..SIGNED_IN
        };
        assert_eq!(RouteGuard::resolve(Page::Results, ctx), Page::Results);
    }

    #[test]
    fn post_splash_rule() {
        assert_eq!(RouteGuard::after_splash(false, true, true), Page::Login);
        assert_eq!(RouteGuard::after_splash(true, true, true), Page::Home);
        assert_eq!(RouteGuard::after_splash(true, true, false), Page::Welcome);
        assert_eq!(RouteGuard::after_splash(true, false, true), Page::Welcome);
    }
}
