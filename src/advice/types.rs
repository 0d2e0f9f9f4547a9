use crate::error::ValidateError;
use crate::media::ImagePayload;
use serde::{Deserialize, Serialize};

/// Named category of AI-generated output. Each variant has its own response
/// schema (see [`super::schema`]) and instruction template (see
/// [`super::prompt`]); the three are kept in lockstep by exhaustive matches.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AdviceType {
    MealPlan,
    MacroTargets,
    GroceryList,
    LabelAudit,
    BloodworkExtraction,
    FormAudit,
    InteractionAudit,
    SupplementTiming,
    BatchUnitAudit,
    ScheduleOptimization,
    CheckInSummary,
    ProgressReview,
    HabitCoaching,
    RecoveryProtocol,
    InjuryTriage,
    PeakWeek,
    PostShowReset,
    MarketIntel,
    TrendForecast,
    MarketingCopy,
}

impl AdviceType {
    /// Whether this advice type accepts an attached image (photo of a label,
    /// bloodwork panel, lift footage frame, progress photo).
    #[must_use]
    pub fn accepts_image(self) -> bool {
        matches!(
            self,
            Self::LabelAudit | Self::BloodworkExtraction | Self::FormAudit | Self::ProgressReview
        )
    }
}

/// Fully assembled request for the generation endpoint. Built once per user
/// action, immutable, discarded after the matching response arrives or the
/// request fails.
#[derive(Debug, Clone, Serialize)]
pub struct AdviceRequest {
    pub advice_type: AdviceType,
    pub system_instruction: String,
    pub user_text: String,
    pub image: Option<ImagePayload>,
}

/// What came back from the endpoint for one request.
///
/// A response that arrived but did not conform is still a response: callers
/// get `ParseFailed` inside an `Ok`, and decide how to message the user.
#[derive(Debug, Clone)]
pub enum AdviceOutcome {
    Parsed(serde_json::Value),
    ParseFailed(ValidateError),
}

#[derive(Debug, Clone)]
pub struct AdviceResponse {
    pub advice_type: AdviceType,
    pub raw: String,
    pub outcome: AdviceOutcome,
}

impl AdviceResponse {
    /// The validated value, when the response conformed to its schema.
    #[must_use]
    pub fn parsed(&self) -> Option<&serde_json::Value> {
        match &self.outcome {
            AdviceOutcome::Parsed(value) => Some(value),
            AdviceOutcome::ParseFailed(_) => None,
        }
    }

    #[must_use]
    pub fn parse_error(&self) -> Option<&ValidateError> {
        match &self.outcome {
            AdviceOutcome::Parsed(_) => None,
            AdviceOutcome::ParseFailed(err) => Some(err),
        }
    }

    #[must_use]
    pub fn is_parsed(&self) -> bool {
        matches!(self.outcome, AdviceOutcome::Parsed(_))
    }

    /// Consumer-side allergen sweep over a parsed meal schedule.
    ///
    /// The validator only guarantees `allergen_safe` is boolean-typed; whether
    /// it is truthful is the model's claim. UIs cross-check the actual
    /// ingredient list against the client's allergens before trusting it.
    #[must_use]
    pub fn allergen_hits(&self, allergens: &[String]) -> Vec<String> {
        let Some(parsed) = self.parsed() else {
            return Vec::new();
        };
        let Some(schedule) = parsed.get("schedule").and_then(|s| s.as_array()) else {
            return Vec::new();
        };

        let mut hits = Vec::new();
        for meal in schedule {
            let Some(items) = meal.get("items").and_then(|i| i.as_array()) else {
                continue;
            };
            for item in items {
                let Some(ingredient) = item.get("ingredient").and_then(|i| i.as_str()) else {
                    continue;
                };
                let lowered = ingredient.to_lowercase();
                for allergen in allergens {
                    let allergen = allergen.to_lowercase();
                    // "peanuts" on the allergen list must catch "peanut butter".
                    let stem = allergen.trim_end_matches('s');
                    if (lowered.contains(&allergen) || (!stem.is_empty() && lowered.contains(stem)))
                        && !hits.contains(&lowered)
                    {
                        hits.push(lowered.clone());
                    }
                }
            }
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::{AdviceOutcome, AdviceResponse, AdviceType};
    use crate::error::ValidateError;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn advice_type_round_trips_through_strings() {
        for advice_type in AdviceType::iter() {
            let name = advice_type.to_string();
            assert_eq!(AdviceType::from_str(&name).unwrap(), advice_type);
        }
    }

    #[test]
    fn twenty_advice_types_registered() {
        assert_eq!(AdviceType::iter().count(), 20);
    }

    #[test]
    fn image_acceptance_is_limited_to_photo_driven_types() {
        assert!(AdviceType::BloodworkExtraction.accepts_image());
        assert!(AdviceType::LabelAudit.accepts_image());
        assert!(!AdviceType::MealPlan.accepts_image());
        assert!(!AdviceType::MarketingCopy.accepts_image());
    }

    #[test]
    fn response_accessors_split_on_outcome() {
        let ok = AdviceResponse {
            advice_type: AdviceType::MealPlan,
            raw: "{}".into(),
            outcome: AdviceOutcome::Parsed(serde_json::json!({})),
        };
        assert!(ok.is_parsed());
        assert!(ok.parsed().is_some());
        assert!(ok.parse_error().is_none());

        let failed = AdviceResponse {
            advice_type: AdviceType::BloodworkExtraction,
            raw: "Sorry, I cannot process this image.".into(),
            outcome: AdviceOutcome::ParseFailed(ValidateError::Json("expected value".into())),
        };
        assert!(!failed.is_parsed());
        assert!(failed.parsed().is_none());
        assert!(failed.parse_error().is_some());
    }

    #[test]
    fn allergen_sweep_catches_claimed_safe_plans() {
        let response = AdviceResponse {
            advice_type: AdviceType::MealPlan,
            raw: String::new(),
            outcome: AdviceOutcome::Parsed(serde_json::json!({
                "schedule": [{
                    "meal": "lunch",
                    "items": [
                        {"ingredient": "Peanut Butter", "grams": 30},
                        {"ingredient": "oats", "grams": 80}
                    ]
                }],
                "allergen_safe": true
            })),
        };
        let hits = response.allergen_hits(&["peanuts".into(), "shellfish".into()]);
        assert_eq!(hits, vec!["peanut butter".to_string()]);
    }

    #[test]
    fn allergen_sweep_is_empty_for_unparsed_responses() {
        let response = AdviceResponse {
            advice_type: AdviceType::MealPlan,
            raw: "garbage".into(),
            outcome: AdviceOutcome::ParseFailed(ValidateError::Json("oops".into())),
        };
        assert!(response.allergen_hits(&["peanut".into()]).is_empty());
    }
}
