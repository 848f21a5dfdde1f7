// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Session controller — owns `AppState` and performs every user-level action:
// splash hydration, sign-in, onboarding, settings, analysis and history.
// Page changes all pass through `navigate`, which applies the route guard.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use allerscan_api::wire::{LoginRequest, RegisterRequest};
use allerscan_api::{Backend, SessionStore};
use allerscan_core::allergen::AllergenSet;
use allerscan_core::config::AppConfig;
use allerscan_core::error::{AllerscanError, Result};
use allerscan_core::types::{AgeRange, Gender, Notification, ScanRequest, UserProfile};

use crate::analysis::{self, AnalysisOutcome};
use crate::navigation::{GuardContext, Page, RouteGuard};
use crate::profile;
use crate::state::AppState;

pub const LOGGED_IN: &str = "Logged in successfully";
pub const LOGIN_FAILED: &str = "Login failed";
pub const ACCOUNT_CREATED: &str = "Account created";
pub const REGISTER_LOGIN_FAILED: &str = "Registration succeeded but login failed";
pub const SIGNED_OUT: &str = "Signed out";

/// Fields of the registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Application controller, generic over the backend so tests can drive it
/// with a mock.
pub struct Session<B: Backend + ?Sized> {
    backend: Arc<B>,
    store: Arc<SessionStore>,
    config: AppConfig,
    state: AppState,
}

impl<B: Backend + ?Sized> Session<B> {
    pub fn new(backend: Arc<B>, store: Arc<SessionStore>, config: AppConfig) -> Self {
        Self {
            backend,
            store,
            config,
            state: AppState::default(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn page(&self) -> Page {
        self.state.page
    }

    pub fn is_signed_in(&self) -> bool {
        self.store.has_token()
    }

    fn guard_context(&self) -> GuardContext {
        GuardContext {
            has_token: self.is_signed_in(),
            has_result: self.state.current_result.is_some(),
        }
    }

    /// Move to `target`, or wherever the guard redirects it.
    pub fn navigate(&mut self, target: Page) -> Page {
        let page = RouteGuard::resolve(target, self.guard_context());
        if page != target {
            info!(?target, ?page, "navigation redirected");
        }
        self.state.page = page;
        page
    }

    /// Queue a notification raised outside the controller (page-level
    /// failures such as a file picker error).
    pub fn notify(&mut self, notification: Notification) {
        self.state.notify(notification);
    }

    pub fn dismiss_notification(&mut self, id: Uuid) {
        self.state.dismiss(id);
    }

    // -- Splash / hydration ---------------------------------------------------

    /// Profile, allergens and history, fetched concurrently. Skipped when
    /// signed out.
    async fn hydrate(&mut self) {
        if !self.is_signed_in() {
            return;
        }
        let backend = self.backend.as_ref();
        let (profile, history) = tokio::join!(
            profile::fetch_profile(backend),
            analysis::fetch_history(backend)
        );
        profile.apply(&mut self.state);
        if let Some(history) = history {
            self.state.history = history;
        }
    }

    fn route_after_sign_in(&mut self) -> Page {
        let page = RouteGuard::after_splash(
            self.is_signed_in(),
            self.state.profile.is_complete(),
            self.state.onboarded,
        );
        self.navigate(page)
    }

    /// Show the splash for the configured delay while hydrating, then route.
    #[instrument(skip(self))]
    pub async fn bootstrap(&mut self) -> Page {
        self.state.page = Page::Splash;
        let delay = Duration::from_millis(self.config.splash_delay_ms);
        tokio::join!(tokio::time::sleep(delay), self.hydrate());
        let page = self.route_after_sign_in();
        info!(?page, "splash finished");
        page
    }

    // -- Auth -----------------------------------------------------------------

    /// Exchange credentials for a token and store it.
    async fn sign_in(&self, email: &str, password: &str) -> Result<bool> {
        let response = self
            .backend
            .login(LoginRequest {
                email: email.trim().to_owned(),
                password: password.to_owned(),
            })
            .await?;
        match response.access_token.filter(|t| !t.trim().is_empty()) {
            Some(token) => {
                self.store.set_token(&token)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn finish_sign_in(&mut self, message: &str) -> Page {
        self.state.notify(Notification::success(message));
        self.hydrate().await;
        self.route_after_sign_in()
    }

    #[instrument(skip(self, password))]
    pub async fn login(&mut self, email: &str, password: &str) -> bool {
        if email.trim().is_empty() || password.is_empty() {
            self.state
                .notify(Notification::error("Please enter your email and password."));
            return false;
        }
        match self.sign_in(email, password).await {
            Ok(true) => {
                self.finish_sign_in(LOGGED_IN).await;
                true
            }
            Ok(false) => {
                warn!("login response carried no token");
                self.state.notify(Notification::error(LOGIN_FAILED));
                false
            }
            Err(e) => {
                warn!(error = %e, "login failed");
                self.state.notify(Notification::error(e.to_string()));
                false
            }
        }
    }

    /// Create the account, then sign in with the same credentials.
    #[instrument(skip_all, fields(email = %form.email))]
    pub async fn register(&mut self, form: RegisterForm) -> bool {
        if form.email.trim().is_empty() || form.password.is_empty() {
            self.state
                .notify(Notification::error("Please enter your email and password."));
            return false;
        }
        let non_empty = |s: &str| Some(s.trim().to_owned()).filter(|s| !s.is_empty());
        let request = RegisterRequest {
            email: form.email.trim().to_owned(),
            password: form.password.clone(),
            first_name: non_empty(&form.first_name),
            last_name: non_empty(&form.last_name),
        };

        if let Err(e) = self.backend.register(request).await {
            warn!(error = %e, "registration failed");
            self.state.notify(Notification::error(e.to_string()));
            return false;
        }
        match self.sign_in(&form.email, &form.password).await {
            Ok(true) => {
                self.finish_sign_in(ACCOUNT_CREATED).await;
                true
            }
            Ok(false) => {
                self.state.notify(Notification::error(REGISTER_LOGIN_FAILED));
                false
            }
            Err(e) => {
                warn!(error = %e, "login after registration failed");
                self.state.notify(Notification::error(e.to_string()));
                false
            }
        }
    }

    /// Forget the token and all cached user data.
    pub fn logout(&mut self) -> Page {
        if let Err(e) = self.store.clear_token() {
            warn!(error = %e, "could not clear access token");
        }
        self.state = AppState::default();
        self.state.notify(Notification::info(SIGNED_OUT));
        self.navigate(Page::Login)
    }

    // -- Onboarding -----------------------------------------------------------

    pub fn start_onboarding(&mut self) -> Page {
        self.navigate(Page::ProfileSetup)
    }

    /// Store name/age/gender as the draft and continue to allergen setup.
    pub fn submit_profile_draft(
        &mut self,
        name: &str,
        age: Option<AgeRange>,
        gender: Option<Gender>,
    ) -> Result<Page> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AllerscanError::validation("Please enter your name."));
        }
        self.state.draft = UserProfile {
            name: name.to_owned(),
            age,
            gender,
            allergens: self.state.profile.allergens.clone(),
        };
        Ok(self.navigate(Page::AllergenSetup))
    }

    /// Save the draft with `allergens`; on success greet the user and go
    /// home, otherwise stay on allergen setup.
    pub async fn complete_onboarding(&mut self, allergens: AllergenSet) -> bool {
        if !self.state.draft.is_complete() {
            self.navigate(Page::ProfileSetup);
            return false;
        }
        let mut profile = self.state.draft.clone();
        profile.allergens = allergens;
        let name = profile.name.clone();

        if profile::save_profile(self.backend.as_ref(), &mut self.state, profile).await {
            self.state.draft = UserProfile::default();
            self.state
                .notify(Notification::success(format!("Welcome, {name}!")));
            self.navigate(Page::Home);
            true
        } else {
            false
        }
    }

    // -- Settings -------------------------------------------------------------

    pub async fn save_settings(&mut self, profile: UserProfile) -> bool {
        profile::save_profile(self.backend.as_ref(), &mut self.state, profile).await
    }

    // -- Analysis -------------------------------------------------------------

    /// Run an analysis and move to wherever its outcome leads.
    pub async fn analyze(&mut self, request: ScanRequest) -> AnalysisOutcome {
        let backfill = self.config.nutrition_backfill;
        let outcome =
            analysis::analyze(self.backend.as_ref(), &mut self.state, request, backfill).await;
        match outcome {
            AnalysisOutcome::Completed => {
                self.navigate(Page::Results);
            }
            AnalysisOutcome::AllergensRequired => {
                self.navigate(Page::Settings);
            }
            AnalysisOutcome::VoiceAnalyzed | AnalysisOutcome::Failed => {}
        }
        outcome
    }

    // -- History --------------------------------------------------------------

    pub async fn refresh_history(&mut self) {
        analysis::refresh_history(self.backend.as_ref(), &mut self.state).await;
    }

    pub async fn delete_history_entry(&mut self, id: &str) -> bool {
        analysis::delete_history_entry(self.backend.as_ref(), &mut self.state, id).await
    }

    pub async fn clear_history(&mut self, confirmed: bool) -> bool {
        analysis::clear_history(self.backend.as_ref(), &mut self.state, confirmed).await
    }

    /// Replay a stored result on the results page without re-analysing.
    /// An unknown id leaves the current page alone.
    pub fn view_history_entry(&mut self, id: &str) -> Page {
        if !analysis::view_history_entry(&mut self.state, id) {
            warn!(id, "history entry not found");
            return self.page();
        }
        self.navigate(Page::Results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allerscan_api::MockBackend;
    use allerscan_api::wire::{AllergenFlags, LoginResponse, ProfileRecord};
    use allerscan_core::allergen::AllergenId;
    use allerscan_core::analysis::{AnalysisResult, HistoryEntry, Verdict};
    use allerscan_core::types::NotificationKind;

    fn session(mock: MockBackend, token: Option<&str>) -> Session<MockBackend> {
        let store = Arc::new(SessionStore::in_memory());
        if let Some(token) = token {
            store.set_token(token).expect("token");
        }
        let config = AppConfig {
            splash_delay_ms: 5,
            ..AppConfig::default()
        };
        Session::new(Arc::new(mock), store, config)
    }

    fn returning_user(mock: &mut MockBackend) {
        mock.expect_get_profile().returning(|| {
            Ok(ProfileRecord {
                name: "Ada".into(),
                age: None,
                gender: None,
            })
        });
        mock.expect_get_allergens().returning(|| {
            Ok(AllergenFlags {
                peanuts: true,
                ..AllergenFlags::default()
            })
        });
        mock.expect_get_history().returning(|| Ok(vec![]));
    }

    fn stored_entry() -> HistoryEntry {
        HistoryEntry {
            id: "h1".into(),
            timestamp: "2026-02-11T08:30:00Z".into(),
            result: AnalysisResult {
                dish_name: "Green curry".into(),
                verdict: Verdict::Unsafe,
                confidence: 88,
                detected_allergens: vec!["fish".into()],
                risky_ingredients: vec!["fish sauce".into()],
                substitutions: vec![],
                alternative_dishes: vec![],
                explanation: "Fish sauce base.".into(),
                nutrition: None,
                image_url: None,
            },
        }
    }

    #[tokio::test]
    async fn splash_without_token_goes_to_login() {
        let mut s = session(MockBackend::new(), None);
        assert_eq!(s.bootstrap().await, Page::Login);
    }

    #[tokio::test]
    async fn splash_with_complete_profile_goes_home() {
        let mut mock = MockBackend::new();
        returning_user(&mut mock);
        let mut s = session(mock, Some("tok"));
        assert_eq!(s.bootstrap().await, Page::Home);
        assert!(s.state().profile.allergens.contains(&AllergenId::Peanuts));
    }

    #[tokio::test]
    async fn splash_with_failed_hydration_goes_to_welcome() {
        let mut mock = MockBackend::new();
        mock.expect_get_profile()
            .returning(|| Err(AllerscanError::Transport("offline".into())));
        mock.expect_get_allergens()
            .returning(|| Err(AllerscanError::Transport("offline".into())));
        mock.expect_get_history()
            .returning(|| Err(AllerscanError::Transport("offline".into())));
        let mut s = session(mock, Some("tok"));
        assert_eq!(s.bootstrap().await, Page::Welcome);
        assert!(s.state().notifications.is_empty());
    }

    #[tokio::test]
    async fn guarded_pages_need_a_token() {
        let mut s = session(MockBackend::new(), None);
        for page in [Page::Scan, Page::Settings, Page::History] {
            assert_eq!(s.navigate(page), Page::Login);
        }
        assert_eq!(s.navigate(Page::Results), Page::Home);
    }

    #[tokio::test]
    async fn login_stores_token_and_routes_by_profile() {
        let mut mock = MockBackend::new();
        mock.expect_login()
            .withf(|req| req.email == "ada@example.com" && req.password == "pw")
            .returning(|_| {
                Ok(LoginResponse {
                    access_token: Some("tok-9".into()),
                    token_type: Some("bearer".into()),
                })
            });
        returning_user(&mut mock);

        let mut s = session(mock, None);
        assert!(s.login(" ada@example.com ", "pw").await);
        assert!(s.is_signed_in());
        assert_eq!(s.page(), Page::Home);
        assert_eq!(
            s.state().notifications[0].message,
            LOGGED_IN
        );
    }

    #[tokio::test]
    async fn login_without_token_fails() {
        let mut mock = MockBackend::new();
        mock.expect_login().returning(|_| Ok(LoginResponse::default()));

        let mut s = session(mock, None);
        assert!(!s.login("ada@example.com", "pw").await);
        assert!(!s.is_signed_in());
        let note = s.state().last_notification().expect("notification");
        assert_eq!(note.kind, NotificationKind::Error);
        assert_eq!(note.message, LOGIN_FAILED);
    }

    #[tokio::test]
    async fn register_then_login_starts_onboarding() {
        let mut mock = MockBackend::new();
        mock.expect_register()
            .withf(|req| req.first_name.as_deref() == Some("Ada") && req.last_name.is_none())
            .returning(|_| Ok(()));
        mock.expect_login().returning(|_| {
            Ok(LoginResponse {
                access_token: Some("fresh".into()),
                token_type: None,
            })
        });
        mock.expect_get_profile()
            .returning(|| Ok(ProfileRecord::default()));
        mock.expect_get_allergens()
            .returning(|| Ok(AllergenFlags::default()));
        mock.expect_get_history().returning(|| Ok(vec![]));

        let mut s = session(mock, None);
        let form = RegisterForm {
            email: "ada@example.com".into(),
            password: "pw".into(),
            first_name: "Ada".into(),
            last_name: " ".into(),
        };
        assert!(s.register(form).await);
        assert_eq!(s.page(), Page::Welcome);
    }

    #[tokio::test]
    async fn onboarding_is_linear_and_greets_on_success() {
        let mut mock = MockBackend::new();
        mock.expect_update_profile().returning(|_| Ok(()));
        mock.expect_update_allergens().returning(|_| Ok(()));

        let mut s = session(mock, Some("tok"));
        assert_eq!(s.start_onboarding(), Page::ProfileSetup);
        assert!(s.submit_profile_draft("  ", None, None).is_err());
        assert_eq!(
            s.submit_profile_draft(" Ada ", AgeRange::from_wire("25-34"), None)
                .expect("draft"),
            Page::AllergenSetup
        );

        let allergens: AllergenSet = vec![AllergenId::Eggs].into();
        assert!(s.complete_onboarding(allergens.clone()).await);
        assert_eq!(s.page(), Page::Home);
        assert_eq!(s.state().profile.name, "Ada");
        assert_eq!(s.state().profile.allergens, allergens);
        assert_eq!(
            s.state().last_notification().map(|n| n.message.as_str()),
            Some("Welcome, Ada!")
        );
    }

    #[tokio::test]
    async fn failed_onboarding_save_stays_put() {
        let mut mock = MockBackend::new();
        mock.expect_update_profile().returning(|_| Ok(()));
        mock.expect_update_allergens().returning(|_| {
            Err(AllerscanError::Backend {
                status: 500,
                message: "Failed to update allergens".into(),
            })
        });

        let mut s = session(mock, Some("tok"));
        s.submit_profile_draft("Ada", None, None).expect("draft");
        assert!(!s.complete_onboarding(vec![AllergenId::Soy].into()).await);
        assert_eq!(s.page(), Page::AllergenSetup);
        assert!(s.state().profile.name.is_empty());
    }

    #[tokio::test]
    async fn analysis_without_allergens_opens_settings() {
        let mut s = session(MockBackend::new(), Some("tok"));
        let outcome = s.analyze(ScanRequest::Search("pad thai".into())).await;
        assert_eq!(outcome, AnalysisOutcome::AllergensRequired);
        assert_eq!(s.page(), Page::Settings);
    }

    #[tokio::test]
    async fn history_replay_shows_stored_result() {
        let mut mock = MockBackend::new();
        mock.expect_get_history()
            .returning(|| Ok(vec![stored_entry()]));

        let mut s = session(mock, Some("tok"));
        s.refresh_history().await;
        assert_eq!(s.view_history_entry("h1"), Page::Results);
        assert_eq!(s.state().current_result, Some(stored_entry().result));
    }

    #[test]
    fn page_notifications_queue_and_dismiss() {
        let mut s = session(MockBackend::new(), None);
        s.notify(Notification::error("picker failed"));
        let id = s.state().last_notification().expect("queued").id;
        s.dismiss_notification(id);
        assert!(s.state().notifications.is_empty());
    }

    #[tokio::test]
    async fn unknown_history_entry_stays_on_history() {
        let mut mock = MockBackend::new();
        mock.expect_get_history()
            .returning(|| Ok(vec![stored_entry()]));

        let mut s = session(mock, Some("tok"));
        s.refresh_history().await;
        assert_eq!(s.navigate(Page::History), Page::History);
        assert_eq!(s.view_history_entry("gone"), Page::History);
        assert_eq!(s.page(), Page::History);
        assert_eq!(s.state().current_result, None);
    }

    #[tokio::test]
    async fn logout_forgets_everything() {
        let mut mock = MockBackend::new();
        returning_user(&mut mock);
        let mut s = session(mock, Some("tok"));
        s.bootstrap().await;

        assert_eq!(s.logout(), Page::Login);
        assert!(!s.is_signed_in());
        assert!(s.state().profile.name.is_empty());
        assert_eq!(s.navigate(Page::History), Page::Login);
    }
}
