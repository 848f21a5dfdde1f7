// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One adapter per analysis endpoint, each turning that endpoint's raw
// response into the canonical `AnalysisResult`.

use rand::Rng;
use tracing::debug;

use allerscan_api::wire::{AnalyzeResponse, ScanResponse};
use allerscan_core::analysis::{AnalysisResult, Nutrition, Verdict};
use allerscan_core::config::NutritionBackfill;
use allerscan_core::error::{AllerscanError, Result};

/// Explanation used when the backend gives none.
pub const DEFAULT_EXPLANATION: &str = "AI-based allergen analysis";

/// Image and barcode scans carry no score of their own.
pub const IMAGE_CONFIDENCE: u8 = 70;
pub const BARCODE_CONFIDENCE: u8 = 65;

/// Used when the search analysis omits its score or reports zero.
const DEFAULT_SCORE: f64 = 0.7;

/// Shown when an image scan names no dish.
const UNKNOWN_DISH: &str = "Unknown dish";

/// Conversion of one endpoint's response into an `AnalysisResult`.
pub trait NormalizeResult {
    fn normalize(self) -> Result<AnalysisResult>;
}

/// `POST /scan/image` response.
pub struct ImageScan(pub ScanResponse);

/// `POST /scan/barcode` response with the code that was looked up.
pub struct BarcodeScan {
    pub barcode: String,
    pub response: ScanResponse,
}

/// `POST /scan/analyze` response with the query that was searched.
pub struct SearchAnalysis {
    pub query: String,
    pub response: AnalyzeResponse,
}

impl NormalizeResult for ImageScan {
    fn normalize(self) -> Result<AnalysisResult> {
        scan_result(self.0, "/scan/image", UNKNOWN_DISH.to_owned(), IMAGE_CONFIDENCE)
    }
}

impl NormalizeResult for BarcodeScan {
    fn normalize(self) -> Result<AnalysisResult> {
        let fallback = format!("Product {}", self.barcode);
        scan_result(self.response, "/scan/barcode", fallback, BARCODE_CONFIDENCE)
    }
}

/// Image and barcode scans only identify the food; the verdict is a fixed
/// SAFE with the ingredients listed for the user to check.
fn scan_result(
    response: ScanResponse,
    endpoint: &str,
    fallback_name: String,
    confidence: u8,
) -> Result<AnalysisResult> {
    let details = response.food_details.ok_or_else(|| {
        AllerscanError::MalformedResponse(format!("{endpoint}: missing food_details"))
    })?;
    let dish_name = details
        .food_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(fallback_name);

    Ok(AnalysisResult {
        dish_name,
        verdict: Verdict::Safe,
        confidence,
        detected_allergens: Vec::new(),
        risky_ingredients: details.ingredients,
        substitutions: Vec::new(),
        alternative_dishes: Vec::new(),
        explanation: DEFAULT_EXPLANATION.to_owned(),
        nutrition: None,
        image_url: None,
    })
}

impl NormalizeResult for SearchAnalysis {
    fn normalize(self) -> Result<AnalysisResult> {
        let res = self.response;
        let verdict = search_verdict(res.is_safe, res.risk_level.as_deref());
        let confidence = confidence_from_score(res.confidence_score);
        let detected_allergens = res.allergens();
        let nutrition = res.nutrition();
        debug!(?verdict, confidence, "search analysis normalised");

        Ok(AnalysisResult {
            dish_name: res
                .food_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or(self.query),
            verdict,
            confidence,
            detected_allergens,
            risky_ingredients: res.risk_factors,
            substitutions: res.substitutions.into_iter().map(Into::into).collect(),
            alternative_dishes: res
                .alternative_suggestions
                .into_iter()
                .map(Into::into)
                .collect(),
            explanation: res
                .analysis_details
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_EXPLANATION.to_owned()),
            nutrition,
            image_url: None,
        })
    }
}

/// SAFE when flagged safe, UNSAFE only for "high" risk, RISKY otherwise.
pub fn search_verdict(is_safe: bool, risk_level: Option<&str>) -> Verdict {
    if is_safe {
        Verdict::Safe
    } else if risk_level == Some("high") {
        Verdict::Unsafe
    } else {
        Verdict::Risky
    }
}

/// Score in 0.0–1.0 to a 0–100 percentage.
pub fn confidence_from_score(score: Option<f64>) -> u8 {
    let score = match score {
        Some(s) if s != 0.0 && s.is_finite() => s,
        _ => DEFAULT_SCORE,
    };
    (score * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Fill in nutrition the backend left out, according to `mode`.
pub fn backfill_nutrition(result: &mut AnalysisResult, mode: NutritionBackfill) {
    if result.nutrition.is_some() {
        return;
    }
    match mode {
        NutritionBackfill::Synthetic => {
            let mut rng = rand::rng();
            result.nutrition = Some(Nutrition::new(
                f64::from(rng.random_range(200u32..600)),
                f64::from(rng.random_range(10u32..40)),
                f64::from(rng.random_range(20u32..70)),
                f64::from(rng.random_range(5u32..25)),
            ));
        }
        NutritionBackfill::Unknown => {}
    }
}
