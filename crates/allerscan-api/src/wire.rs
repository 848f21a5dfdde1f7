// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Request and response bodies exchanged with the backend.
//
// Responses are parsed leniently: missing fields and explicit `null`s fall
// back to defaults so that one absent key never discards a whole analysis.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use allerscan_core::allergen::{AllergenId, AllergenSet};
use allerscan_core::analysis::{AlternativeDish, AnalysisResult, Nutrition, Substitution};
use allerscan_core::types::{AgeRange, Gender, UserProfile};

/// Treat `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// `/users/profile` body. Age and gender travel as their wire strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

impl ProfileRecord {
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            name: profile.name.clone(),
            age: profile.age.map(|a| a.wire_value().to_owned()),
            gender: profile.gender.map(|g| g.wire_value().to_owned()),
        }
    }

    /// Merge into `profile`, keeping its allergens. Unrecognised age or
    /// gender strings are dropped with a warning.
    pub fn apply_to(&self, profile: &mut UserProfile) {
        profile.name = self.name.clone();
        profile.age = self.age.as_deref().filter(|a| !a.is_empty()).and_then(|a| {
            let parsed = AgeRange::from_wire(a);
            if parsed.is_none() {
                warn!(age = a, "unknown age range from backend");
            }
            parsed
        });
        profile.gender = self
            .gender
            .as_deref()
            .filter(|g| !g.is_empty())
            .and_then(|g| {
                let parsed = Gender::from_wire(g);
                if parsed.is_none() {
                    warn!(gender = g, "unknown gender from backend");
                }
                parsed
            });
    }
}

/// `/users/allergens` body: one boolean per canonical allergen plus the
/// free-text custom list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllergenFlags {
    #[serde(deserialize_with = "null_as_default")]
    pub peanuts: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub tree_nuts: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub shellfish: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub fish: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub gluten: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub dairy: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub eggs: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub soy: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub sesame: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub sulfites: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub mustard: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub celery: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub lupin: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub mollusks: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub custom_allergens: Vec<String>,
}

impl AllergenFlags {
    fn flag(&self, allergen: &AllergenId) -> bool {
        match allergen {
            AllergenId::Peanuts => self.peanuts,
            AllergenId::TreeNuts => self.tree_nuts,
            AllergenId::Shellfish => self.shellfish,
            AllergenId::Fish => self.fish,
            AllergenId::Gluten => self.gluten,
            AllergenId::Dairy => self.dairy,
            AllergenId::Eggs => self.eggs,
            AllergenId::Soy => self.soy,
            AllergenId::Sesame => self.sesame,
            AllergenId::Sulfites => self.sulfites,
            AllergenId::Mustard => self.mustard,
            AllergenId::Celery => self.celery,
            AllergenId::Lupin => self.lupin,
            AllergenId::Mollusks => self.mollusks,
            AllergenId::Custom(name) => self.custom_allergens.iter().any(|c| c == name),
        }
    }

    fn set_flag(&mut self, allergen: &AllergenId) {
        match allergen {
            AllergenId::Peanuts => self.peanuts = true,
            AllergenId::TreeNuts => self.tree_nuts = true,
            AllergenId::Shellfish => self.shellfish = true,
            AllergenId::Fish => self.fish = true,
            AllergenId::Gluten => self.gluten = true,
            AllergenId::Dairy => self.dairy = true,
            AllergenId::Eggs => self.eggs = true,
            AllergenId::Soy => self.soy = true,
            AllergenId::Sesame => self.sesame = true,
            AllergenId::Sulfites => self.sulfites = true,
            AllergenId::Mustard => self.mustard = true,
            AllergenId::Celery => self.celery = true,
            AllergenId::Lupin => self.lupin = true,
            AllergenId::Mollusks => self.mollusks = true,
            AllergenId::Custom(name) => self.custom_allergens.push(name.clone()),
        }
    }

    /// Every canonical allergen is sent explicitly, so deselected ones are
    /// cleared on the server.
    pub fn from_set(set: &AllergenSet) -> Self {
        let mut flags = Self::default();
        for allergen in set.iter() {
            flags.set_flag(allergen);
        }
        flags
    }

    /// Canonical allergens whose flag is true, then custom names. A custom
    /// name that spells a canonical id collapses into it.
    pub fn to_set(&self) -> AllergenSet {
        AllergenId::CANONICAL
            .iter()
            .filter(|a| self.flag(a))
            .cloned()
            .chain(
                self.custom_allergens
                    .iter()
                    .map(|name| AllergenId::from_id(name)),
            )
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Scanning
// ---------------------------------------------------------------------------

/// Body of `/scan/image` and `/scan/barcode` responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanResponse {
    #[serde(default)]
    pub food_details: Option<FoodDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FoodDetails {
    #[serde(default)]
    pub food_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ingredients: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarcodeRequest {
    pub barcode: String,
}

/// `/scan/analyze` body. `nutrition` is always sent, as `null` when
/// unknown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeRequest {
    pub food_name: String,
    pub ingredients: Vec<String>,
    pub nutrition: Option<Nutrition>,
}

/// A substitution as the backend may send it: structured or a bare string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SubstitutionWire {
    Structured(Substitution),
    Text(String),
}

impl From<SubstitutionWire> for Substitution {
    fn from(value: SubstitutionWire) -> Self {
        match value {
            SubstitutionWire::Structured(s) => s,
            SubstitutionWire::Text(original) => Substitution {
                original,
                replacement: String::new(),
                reason: String::new(),
            },
        }
    }
}

/// An alternative dish: structured or just a name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AlternativeWire {
    Structured(AlternativeDish),
    Name(String),
}

impl From<AlternativeWire> for AlternativeDish {
    fn from(value: AlternativeWire) -> Self {
        match value {
            AlternativeWire::Structured(d) => d,
            AlternativeWire::Name(name) => AlternativeDish {
                name,
                reason: String::new(),
            },
        }
    }
}

/// Body of `/scan/analyze` responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub food_name: Option<String>,
    #[serde(default)]
    pub analysis_details: Option<String>,
    #[serde(default)]
    pub detected_allergens: Option<Vec<String>>,
    #[serde(default, rename = "detectedAllergens")]
    pub detected_allergens_camel: Option<Vec<String>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub risk_factors: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub substitutions: Vec<SubstitutionWire>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub alternative_suggestions: Vec<AlternativeWire>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_safe: bool,
    #[serde(default)]
    pub risk_level: Option<String>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    /// Kept raw: a partial block is ignored rather than failing the parse.
    #[serde(default)]
    pub nutrition: Option<serde_json::Value>,
}

impl AnalyzeResponse {
    /// Snake-case allergen list first, camel-case as the fallback.
    pub fn allergens(&self) -> Vec<String> {
        self.detected_allergens
            .clone()
            .or_else(|| self.detected_allergens_camel.clone())
            .unwrap_or_default()
    }

    /// The nutrition block, when the backend sent a complete one.
    pub fn nutrition(&self) -> Option<Nutrition> {
        let value = self.nutrition.clone()?;
        match serde_json::from_value::<Nutrition>(value) {
            Ok(n) => Some(Nutrition::new(n.calories, n.protein, n.carbs, n.fat)),
            Err(e) => {
                warn!(error = %e, "ignoring incomplete nutrition block");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// `POST /users/history` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryAdd {
    pub analysis: AnalysisResult,
    pub scan_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn allergen_flags_convert_both_ways() {
        let set: AllergenSet = vec![
            AllergenId::TreeNuts,
            AllergenId::Sesame,
            AllergenId::Custom("kiwi".into()),
        ]
        .into();
        let flags = AllergenFlags::from_set(&set);
        assert!(flags.tree_nuts && flags.sesame);
        assert!(!flags.peanuts);
        assert_eq!(flags.custom_allergens, vec!["kiwi".to_owned()]);

        let body = serde_json::to_value(&flags).expect("serialize");
        assert_eq!(body["peanuts"], json!(false));
        assert_eq!(body["tree_nuts"], json!(true));
        assert_eq!(flags.to_set(), set);
    }

    #[test]
    fn allergen_record_ignores_server_metadata() {
        let flags: AllergenFlags = serde_json::from_value(json!({
            "id": "a1",
            "user_id": "u1",
            "peanuts": true,
            "dairy": null,
            "custom_allergens": null,
            "severity_level": "moderate",
            "created_at": "2026-01-01T00:00:00"
        }))
        .expect("parse");
        let set = flags.to_set();
        assert_eq!(set.len(), 1);
        assert!(set.contains(&AllergenId::Peanuts));
    }

    #[test]
    fn profile_record_tolerates_unknown_values() {
        let record: ProfileRecord =
            serde_json::from_value(json!({"name": "Ada", "age": "25-34", "gender": "robot"}))
                .expect("parse");
        let mut profile = UserProfile::default();
        record.apply_to(&mut profile);
        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.age, Some(AgeRange::from_wire("25-34").expect("known")));
        assert_eq!(profile.gender, None);
    }

    #[test]
    fn profile_record_omits_missing_fields() {
        let record = ProfileRecord {
            name: "Ada".into(),
            age: None,
            gender: None,
        };
        assert_eq!(serde_json::to_value(&record).expect("serialize"), json!({"name": "Ada"}));
    }

    #[test]
    fn analyze_response_prefers_snake_case_allergens() {
        let res: AnalyzeResponse = serde_json::from_value(json!({
            "detected_allergens": [],
            "detectedAllergens": ["milk"],
        }))
        .expect("parse");
        assert!(res.allergens().is_empty());

        let res: AnalyzeResponse =
            serde_json::from_value(json!({"detectedAllergens": ["milk"]})).expect("parse");
        assert_eq!(res.allergens(), vec!["milk".to_owned()]);
    }

    #[test]
    fn alternatives_accept_strings_and_objects() {
        let res: AnalyzeResponse = serde_json::from_value(json!({
            "alternative_suggestions": ["Rice bowl", {"name": "Salad", "reason": "no nuts"}],
            "substitutions": [{"original": "butter", "replacement": "olive oil"}],
            "risk_factors": null,
        }))
        .expect("parse");
        let dishes: Vec<AlternativeDish> =
            res.alternative_suggestions.into_iter().map(Into::into).collect();
        assert_eq!(dishes[0].name, "Rice bowl");
        assert_eq!(dishes[0].reason, "");
        assert_eq!(dishes[1].reason, "no nuts");
        let subs: Vec<Substitution> = res.substitutions.into_iter().map(Into::into).collect();
        assert_eq!(subs[0].replacement, "olive oil");
        assert!(res.risk_factors.is_empty());
    }

    #[test]
    fn partial_nutrition_is_ignored() {
        let res: AnalyzeResponse =
            serde_json::from_value(json!({"nutrition": {"calories": 120}})).expect("parse");
        assert_eq!(res.nutrition(), None);

        let res: AnalyzeResponse = serde_json::from_value(json!({
            "nutrition": {"calories": 120, "protein": 4, "carbs": 30, "fat": 2}
        }))
        .expect("parse");
        assert_eq!(res.nutrition().map(|n| n.calories), Some(120.0));
    }

    #[test]
    fn analyze_request_sends_null_nutrition() {
        let body = serde_json::to_value(AnalyzeRequest {
            food_name: "pad thai".into(),
            ingredients: vec![],
            nutrition: None,
        })
        .expect("serialize");
        assert_eq!(body["nutrition"], json!(null));
    }
}
