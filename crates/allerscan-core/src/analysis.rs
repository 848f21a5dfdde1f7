// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Canonical analysis result and persisted history entries.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Headline safety classification of an analysed dish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Safe,
    Risky,
    Unsafe,
}

impl Verdict {
    /// Upper-case label as shown on the results card.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Safe => "SAFE",
            Self::Risky => "RISKY",
            Self::Unsafe => "UNSAFE",
        }
    }
}

/// Ingredient swap suggested for a risky dish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Substitution {
    pub original: String,
    pub replacement: String,
    #[serde(default)]
    pub reason: String,
}

/// A safer dish to try instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeDish {
    pub name: String,
    #[serde(default)]
    pub reason: String,
}

/// Macronutrient summary. All values are non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Nutrition {
    /// Build a block, clamping negatives to zero.
    pub fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calories: calories.max(0.0),
            protein: protein.max(0.0),
            carbs: carbs.max(0.0),
            fat: fat.max(0.0),
        }
    }
}

/// The single canonical shape every backend response is normalised into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub dish_name: String,
    pub verdict: Verdict,
    /// 0–100.
    pub confidence: u8,
    #[serde(default)]
    pub detected_allergens: Vec<String>,
    #[serde(default)]
    pub risky_ingredients: Vec<String>,
    #[serde(default)]
    pub substitutions: Vec<Substitution>,
    #[serde(default)]
    pub alternative_dishes: Vec<AlternativeDish>,
    #[serde(default)]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<Nutrition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A persisted, timestamped analysis result.
///
/// On the wire the result fields sit next to `id` and `timestamp` in one flat
/// object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    /// ISO-8601 instant as sent by the server.
    pub timestamp: String,
    #[serde(flatten)]
    pub result: AnalysisResult,
}

impl HistoryEntry {
    /// Parse the server timestamp. Accepts RFC 3339 and naive ISO-8601
    /// (which the server emits for UTC instants without an offset).
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.timestamp) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AnalysisResult {
        AnalysisResult {
            dish_name: "Pad Thai".into(),
            verdict: Verdict::Unsafe,
            confidence: 92,
            detected_allergens: vec!["peanuts".into()],
            risky_ingredients: vec!["crushed peanuts".into()],
            substitutions: vec![Substitution {
                original: "peanuts".into(),
                replacement: "toasted sunflower seeds".into(),
                reason: "nut-free crunch".into(),
            }],
            alternative_dishes: vec![AlternativeDish {
                name: "Pad See Ew".into(),
                reason: String::new(),
            }],
            explanation: "Contains peanuts".into(),
            nutrition: Some(Nutrition::new(450.0, 20.0, 60.0, 15.0)),
            image_url: None,
        }
    }

    #[test]
    fn result_uses_camel_case_wire_names() {
        let json = serde_json::to_value(sample()).expect("serialize");
        assert_eq!(json["dishName"], "Pad Thai");
        assert_eq!(json["verdict"], "UNSAFE");
        assert_eq!(json["detectedAllergens"][0], "peanuts");
        assert!(json.get("imageUrl").is_none());
    }

    #[test]
    fn history_entry_is_flat_on_the_wire() {
        let raw = serde_json::json!({
            "id": "abc123",
            "timestamp": "2026-03-01T12:30:00.123456",
            "dishName": "Pad Thai",
            "verdict": "UNSAFE",
            "confidence": 92,
            "detectedAllergens": ["peanuts"],
            "riskyIngredients": ["crushed peanuts"],
            "substitutions": [{"original": "peanuts", "replacement": "toasted sunflower seeds", "reason": "nut-free crunch"}],
            "alternativeDishes": [{"name": "Pad See Ew"}],
            "explanation": "Contains peanuts",
            "nutrition": {"calories": 450.0, "protein": 20.0, "carbs": 60.0, "fat": 15.0}
        });
        let entry: HistoryEntry = serde_json::from_value(raw).expect("parse");
        assert_eq!(entry.id, "abc123");
        assert_eq!(entry.result, sample());
        assert!(entry.recorded_at().is_some());
    }

    #[test]
    fn nutrition_clamps_negatives() {
        let n = Nutrition::new(-1.0, 2.0, -0.5, 3.0);
        assert_eq!(n.calories, 0.0);
        assert_eq!(n.carbs, 0.0);
        assert_eq!(n.protein, 2.0);
    }

    #[test]
    fn rfc3339_timestamp_parses() {
        let entry = HistoryEntry {
            id: "x".into(),
            timestamp: "2026-03-01T12:30:00Z".into(),
            result: sample(),
        };
        let at = entry.recorded_at().expect("timestamp");
        assert_eq!(at.format("%Y-%m-%d %H:%M").to_string(), "2026-03-01 12:30");
    }
}
