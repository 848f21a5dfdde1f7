// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Profile and allergen state: loading from and saving to the backend.

use tracing::{info, instrument, warn};

use allerscan_api::Backend;
use allerscan_api::wire::{AllergenFlags, ProfileRecord};
use allerscan_core::error::{AllerscanError, Result};
use allerscan_core::human_errors::humanize_error;
use allerscan_core::types::{Notification, UserProfile};

use crate::state::AppState;

pub const PROFILE_SAVED: &str = "Profile saved successfully!";
pub const PROFILE_SAVE_FAILED: &str = "Failed to save profile. Please try again.";
pub const NAME_REQUIRED: &str = "Please enter your name.";

/// Outcome of fetching profile and allergens side by side.
pub struct ProfileFetch {
    pub profile: Result<ProfileRecord>,
    pub allergens: Result<AllergenFlags>,
}

impl ProfileFetch {
    /// Apply the fetch. Nothing is applied unless the profile itself arrived;
    /// allergens from the same round are only taken alongside it. A failed
    /// allergen half keeps the previous selection. Failures are logged, never
    /// raised.
    pub fn apply(self, state: &mut AppState) {
        let record = match self.profile {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "profile fetch failed, keeping previous profile");
                return;
            }
        };
        match self.allergens {
            Ok(flags) => state.profile.allergens = flags.to_set(),
            Err(e) => warn!(error = %e, "allergen fetch failed, keeping previous selection"),
        }
        record.apply_to(&mut state.profile);
        state.onboarded = state.profile.is_complete();
    }
}

/// Fetch the remote profile and allergen flags concurrently.
pub async fn fetch_profile<B: Backend + ?Sized>(backend: &B) -> ProfileFetch {
    let (profile, allergens) = tokio::join!(backend.get_profile(), backend.get_allergens());
    ProfileFetch { profile, allergens }
}

/// Best-effort hydration of `state.profile`.
#[instrument(skip_all)]
pub async fn load_profile<B: Backend + ?Sized>(backend: &B, state: &mut AppState) {
    fetch_profile(backend).await.apply(state);
}

/// A profile needs a name before it can be saved.
pub fn validate_profile(profile: &UserProfile) -> Result<()> {
    if !profile.is_complete() {
        return Err(AllerscanError::validation(NAME_REQUIRED));
    }
    Ok(())
}

/// Identity first, then the full allergen map.
async fn push_profile<B: Backend + ?Sized>(backend: &B, profile: &UserProfile) -> Result<()> {
    backend
        .update_profile(ProfileRecord::from_profile(profile))
        .await?;
    backend
        .update_allergens(AllergenFlags::from_set(&profile.allergens))
        .await
}

/// Save `profile` remotely and commit it locally only if both writes
/// succeed. A blank name is rejected before anything is sent. Emits a
/// notification either way.
#[instrument(skip_all, fields(allergens = profile.allergens.len()))]
pub async fn save_profile<B: Backend + ?Sized>(
    backend: &B,
    state: &mut AppState,
    profile: UserProfile,
) -> bool {
    if let Err(e) = validate_profile(&profile) {
        warn!(error = %e, "profile save rejected");
        state.notify(Notification::error(humanize_error(&e).message));
        return false;
    }

    state.saving = true;
    let outcome = push_profile(backend, &profile).await;
    state.saving = false;

    match outcome {
        Ok(()) => {
            info!("profile saved");
            state.profile = profile;
            state.onboarded = true;
            state.notify(Notification::success(PROFILE_SAVED));
            true
        }
        Err(e) => {
            warn!(error = %e, "profile save failed");
            state.notify(Notification::error(PROFILE_SAVE_FAILED));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allerscan_api::MockBackend;
    use allerscan_core::allergen::{AllergenId, AllergenSet};
    use allerscan_core::types::{AgeRange, NotificationKind};
    use mockall::Sequence;

    fn server_error() -> AllerscanError {
        AllerscanError::Backend {
            status: 500,
            message: "boom".into(),
        }
    }

    fn profile(name: &str, allergens: Vec<AllergenId>) -> UserProfile {
        UserProfile {
            name: name.into(),
            age: None,
            gender: None,
            allergens: allergens.into(),
        }
    }

    #[tokio::test]
    async fn load_maps_flags_then_custom() {
        let mut mock = MockBackend::new();
        mock.expect_get_profile().returning(|| {
            Ok(ProfileRecord {
                name: "Ada".into(),
                age: Some("25-34".into()),
                gender: None,
            })
        });
        mock.expect_get_allergens().returning(|| {
            Ok(AllergenFlags {
                sesame: true,
                peanuts: true,
                custom_allergens: vec!["kiwi".into(), "peanuts".into()],
                ..AllergenFlags::default()
            })
        });

        let mut state = AppState::default();
        load_profile(&mock, &mut state).await;

        let ids: Vec<&AllergenId> = state.profile.allergens.iter().collect();
        assert_eq!(
            ids,
            vec![
                &AllergenId::Peanuts,
                &AllergenId::Sesame,
                &AllergenId::Custom("kiwi".into())
            ]
        );
        assert_eq!(state.profile.name, "Ada");
        assert_eq!(state.profile.age, AgeRange::from_wire("25-34"));
        assert!(state.onboarded);
    }

    #[tokio::test]
    async fn no_flags_means_empty_set() {
        let mut mock = MockBackend::new();
        mock.expect_get_profile()
            .returning(|| Ok(ProfileRecord::default()));
        mock.expect_get_allergens()
            .returning(|| Ok(AllergenFlags::default()));

        let mut state = AppState::default();
        state.profile.allergens = vec![AllergenId::Dairy].into();
        load_profile(&mock, &mut state).await;
        assert!(state.profile.allergens.is_empty());
        assert!(!state.onboarded);
    }

    #[tokio::test]
    async fn load_failure_keeps_prior_profile_silently() {
        let mut mock = MockBackend::new();
        mock.expect_get_profile().returning(|| Err(server_error()));
        mock.expect_get_allergens().returning(|| Err(server_error()));

        let mut state = AppState::default();
        state.profile = profile("Grace", vec![AllergenId::Fish]);
        let before = state.profile.clone();
        load_profile(&mock, &mut state).await;
        assert_eq!(state.profile, before);
        assert!(state.notifications.is_empty());
    }

    #[tokio::test]
    async fn save_writes_profile_then_allergens() {
        let mut mock = MockBackend::new();
        let mut seq = Sequence::new();
        mock.expect_update_profile()
            .withf(|record| record.name == "Ada" && record.age.as_deref() == Some("18-24"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_update_allergens()
            .withf(|flags| flags.gluten && !flags.peanuts && flags.custom_allergens == ["kiwi"])
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let mut new_profile = profile(
            "Ada",
            vec![AllergenId::Gluten, AllergenId::Custom("kiwi".into())],
        );
        new_profile.age = AgeRange::from_wire("18-24");

        let mut state = AppState::default();
        assert!(save_profile(&mock, &mut state, new_profile.clone()).await);
        assert_eq!(state.profile, new_profile);
        assert!(state.onboarded);
        assert!(!state.saving);
        let note = state.last_notification().expect("notification");
        assert_eq!(note.kind, NotificationKind::Success);
        assert_eq!(note.message, PROFILE_SAVED);
    }

    #[tokio::test]
    async fn allergen_failure_after_profile_success_commits_nothing() {
        let mut mock = MockBackend::new();
        mock.expect_update_profile().times(1).returning(|_| Ok(()));
        mock.expect_update_allergens()
            .times(1)
            .returning(|_| Err(server_error()));

        let mut state = AppState::default();
        state.profile = profile("Grace", vec![AllergenId::Fish]);
        let before = state.profile.clone();

        let saved = save_profile(
            &mock,
            &mut state,
            profile("Grace Hopper", vec![AllergenId::Soy]),
        )
        .await;

        assert!(!saved);
        assert_eq!(state.profile, before);
        let note = state.last_notification().expect("notification");
        assert_eq!(note.kind, NotificationKind::Error);
        assert_eq!(note.message, PROFILE_SAVE_FAILED);
    }

    #[tokio::test]
    async fn profile_failure_skips_allergen_write() {
        let mut mock = MockBackend::new();
        mock.expect_update_profile().returning(|_| Err(server_error()));
        mock.expect_update_allergens().never();

        let mut state = AppState::default();
        let saved = save_profile(&mock, &mut state, profile("Ada", vec![])).await;
        assert!(!saved);
        assert_eq!(state.profile.allergens, AllergenSet::new());
    }

    #[tokio::test]
    async fn profile_failure_ignores_allergens_from_same_fetch() {
        let mut mock = MockBackend::new();
        mock.expect_get_profile().returning(|| Err(server_error()));
        mock.expect_get_allergens().returning(|| {
            Ok(AllergenFlags {
                soy: true,
                ..AllergenFlags::default()
            })
        });

        let mut state = AppState::default();
        state.profile = profile("Grace", vec![AllergenId::Fish]);
        state.onboarded = true;
        load_profile(&mock, &mut state).await;

        let ids: Vec<&AllergenId> = state.profile.allergens.iter().collect();
        assert_eq!(ids, vec![&AllergenId::Fish]);
        assert_eq!(state.profile.name, "Grace");
        assert!(state.onboarded);
    }

    #[tokio::test]
    async fn allergen_failure_keeps_selection_but_takes_profile() {
        let mut mock = MockBackend::new();
        mock.expect_get_profile().returning(|| {
            Ok(ProfileRecord {
                name: "Grace Hopper".into(),
                age: None,
                gender: None,
            })
        });
        mock.expect_get_allergens().returning(|| Err(server_error()));

        let mut state = AppState::default();
        state.profile = profile("Grace", vec![AllergenId::Fish]);
        load_profile(&mock, &mut state).await;

        assert_eq!(state.profile.name, "Grace Hopper");
        let ids: Vec<&AllergenId> = state.profile.allergens.iter().collect();
        assert_eq!(ids, vec![&AllergenId::Fish]);
    }

    #[tokio::test]
    async fn blank_name_is_rejected_without_remote_calls() {
        let mut mock = MockBackend::new();
        mock.expect_update_profile().never();
        mock.expect_update_allergens().never();

        let mut state = AppState::default();
        state.profile = profile("Grace", vec![AllergenId::Fish]);
        let before = state.profile.clone();

        let saved = save_profile(&mock, &mut state, profile("   ", vec![AllergenId::Soy])).await;

        assert!(!saved);
        assert_eq!(state.profile, before);
        assert!(!state.onboarded);
        assert!(!state.saving);
        let note = state.last_notification().expect("notification");
        assert_eq!(note.kind, NotificationKind::Error);
        assert_eq!(note.message, NAME_REQUIRED);
    }
}
