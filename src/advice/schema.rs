//! Response shape registry.
//!
//! One declarative schema per advice type, built once at process start and
//! never mutated. The generation client also feeds these to the endpoint as a
//! response-shape constraint; conformance is still checked on the way back in
//! (see [`super::validate`]) because endpoint steering is best-effort.
//!
//! Severity-style vocabularies ("CRITICAL"/"MODERATE"/"LOW") are typed as
//! plain strings; the closed value set is steered by prompt text only.

use super::types::AdviceType;
use std::collections::HashMap;
use std::sync::LazyLock;
use strum::IntoEnumIterator;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("no schema registered for advice type `{0}`")]
pub struct UnknownAdviceType(pub AdviceType);

/// Primitive or composite type of one declared field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Array(Box<FieldKind>),
    Object(Vec<FieldSpec>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// Expected top-level shape of one advice type's response.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub root: FieldKind,
}

impl FieldSpec {
    #[must_use]
    pub fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

impl FieldKind {
    #[must_use]
    pub fn array(item: FieldKind) -> Self {
        Self::Array(Box::new(item))
    }

    #[must_use]
    pub fn object<I: IntoIterator<Item = FieldSpec>>(fields: I) -> Self {
        Self::Object(fields.into_iter().collect())
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

impl Schema {
    #[must_use]
    pub fn object<I: IntoIterator<Item = FieldSpec>>(fields: I) -> Self {
        Self {
            root: FieldKind::object(fields),
        }
    }
}

static REGISTRY: LazyLock<HashMap<AdviceType, Schema>> = LazyLock::new(|| {
    AdviceType::iter()
        .map(|advice_type| (advice_type, schema_for(advice_type)))
        .collect()
});

/// Look up the response schema for an advice type. Pure lookup against the
/// process-wide table; identical shape on every call.
pub fn get_schema(advice_type: AdviceType) -> Result<&'static Schema, UnknownAdviceType> {
    REGISTRY
        .get(&advice_type)
        .ok_or(UnknownAdviceType(advice_type))
}

fn schema_for(advice_type: AdviceType) -> Schema {
    use self::FieldKind as K;
    use self::FieldSpec as F;

    match advice_type {
        AdviceType::MealPlan => Schema::object([
            F::new(
                "schedule",
                K::array(K::object([
                    F::new("meal", K::String),
                    F::new("time", K::String),
                    F::new(
                        "items",
                        K::array(K::object([
                            F::new("ingredient", K::String),
                            F::new("grams", K::Number),
                        ])),
                    ),
                    F::new("calories", K::Number),
                    F::new("protein_g", K::Number),
                ])),
            ),
            F::new("daily_calories", K::Number),
            F::new("allergen_safe", K::Boolean),
            F::new("notes", K::String),
        ]),
        AdviceType::MacroTargets => Schema::object([
            F::new("calories", K::Number),
            F::new("protein_g", K::Number),
            F::new("carbs_g", K::Number),
            F::new("fat_g", K::Number),
            F::new("rationale", K::String),
        ]),
        AdviceType::GroceryList => Schema::object([
            F::new(
                "items",
                K::array(K::object([
                    F::new("name", K::String),
                    F::new("quantity", K::String),
                    F::new("aisle", K::String),
                ])),
            ),
            F::new("estimated_cost", K::Number),
        ]),
        AdviceType::LabelAudit => Schema::object([
            F::new("product_name", K::String),
            F::new(
                "flags",
                K::array(K::object([
                    F::new("ingredient", K::String),
                    F::new("severity", K::String),
                    F::new("reason", K::String),
                ])),
            ),
            F::new("verdict", K::String),
        ]),
        AdviceType::BloodworkExtraction => Schema::object([
            F::new(
                "markers",
                K::array(K::object([
                    F::new("name", K::String),
                    F::new("value", K::Number),
                    F::new("unit", K::String),
                    F::new("reference_range", K::String),
                    F::new("flagged", K::Boolean),
                ])),
            ),
            F::new("summary", K::String),
        ]),
        AdviceType::FormAudit => Schema::object([
            F::new("lift", K::String),
            F::new(
                "faults",
                K::array(K::object([
                    F::new("phase", K::String),
                    F::new("fault", K::String),
                    F::new("severity", K::String),
                    F::new("cue", K::String),
                ])),
            ),
            F::new("overall", K::String),
        ]),
        AdviceType::InteractionAudit => Schema::object([
            F::new(
                "interactions",
                K::array(K::object([
                    F::new("pair", K::array(K::String)),
                    F::new("severity", K::String),
                    F::new("mechanism", K::String),
                    F::new("recommendation", K::String),
                ])),
            ),
            F::new("safe_to_combine", K::Boolean),
        ]),
        AdviceType::SupplementTiming => Schema::object([
            F::new(
                "slots",
                K::array(K::object([
                    F::new("time", K::String),
                    F::new("items", K::array(K::String)),
                    F::new("with_food", K::Boolean),
                ])),
            ),
            F::new("notes", K::String),
        ]),
        AdviceType::BatchUnitAudit => Schema::object([
            F::new(
                "per_serving",
                K::array(K::object([
                    F::new("ingredient", K::String),
                    F::new("grams", K::Number),
                ])),
            ),
            F::new("total_grams", K::Number),
            F::new("discrepancies", K::array(K::String)),
        ]),
        AdviceType::ScheduleOptimization => Schema::object([
            F::new(
                "schedule",
                K::array(K::object([
                    F::new("day", K::String),
                    F::new("start", K::String),
                    F::new("duration_min", K::Number),
                    F::new("focus", K::String),
                ])),
            ),
            F::new("conflicts_resolved", K::Number),
            F::new("notes", K::String),
        ]),
        AdviceType::CheckInSummary => Schema::object([
            F::new("adherence_pct", K::Number),
            F::new("weight_trend", K::String),
            F::new("wins", K::array(K::String)),
            F::new("concerns", K::array(K::String)),
            F::new("reply_draft", K::String),
        ]),
        AdviceType::ProgressReview => Schema::object([
            F::new("trend", K::String),
            F::new("rate_kg_per_week", K::Number),
            F::new("plateau", K::Boolean),
            F::new("adjustments", K::array(K::String)),
        ]),
        AdviceType::HabitCoaching => Schema::object([
            F::new(
                "habits",
                K::array(K::object([
                    F::new("habit", K::String),
                    F::new("trigger", K::String),
                    F::new("replacement", K::String),
                ])),
            ),
            F::new("weekly_focus", K::String),
        ]),
        AdviceType::RecoveryProtocol => Schema::object([
            F::new(
                "protocols",
                K::array(K::object([
                    F::new("name", K::String),
                    F::new("duration_min", K::Number),
                    F::new("frequency", K::String),
                ])),
            ),
            F::new("red_flags", K::array(K::String)),
        ]),
        AdviceType::InjuryTriage => Schema::object([
            F::new("severity", K::String),
            F::new("likely_issue", K::String),
            F::new("stop_training", K::Boolean),
            F::new("referral_recommended", K::Boolean),
            F::new("modifications", K::array(K::String)),
        ]),
        AdviceType::PeakWeek => Schema::object([
            F::new(
                "days",
                K::array(K::object([
                    F::new("day", K::String),
                    F::new("water_liters", K::Number),
                    F::new("carbs_g", K::Number),
                    F::new("sodium_mg", K::Number),
                    F::new("notes", K::String),
                ])),
            ),
            F::new("warnings", K::array(K::String)),
        ]),
        AdviceType::PostShowReset => Schema::object([
            F::new(
                "weeks",
                K::array(K::object([
                    F::new("week", K::Number),
                    F::new("calories", K::Number),
                    F::new("cardio_min", K::Number),
                    F::new("focus", K::String),
                ])),
            ),
            F::new("rebound_risk", K::String),
        ]),
        AdviceType::MarketIntel => Schema::object([
            F::new(
                "competitors",
                K::array(K::object([
                    F::new("name", K::String),
                    F::new("offer", K::String),
                    F::new("price_point", K::String),
                ])),
            ),
            F::new("gaps", K::array(K::String)),
            F::new("positioning", K::String),
        ]),
        AdviceType::TrendForecast => Schema::object([
            F::new(
                "trends",
                K::array(K::object([
                    F::new("name", K::String),
                    F::new("momentum", K::String),
                    F::new("horizon_months", K::Number),
                ])),
            ),
            F::new("recommendation", K::String),
        ]),
        AdviceType::MarketingCopy => Schema::object([
            F::new("headline", K::String),
            F::new("body", K::String),
            F::new("call_to_action", K::String),
            F::new("variants", K::array(K::String)),
        ]),
    }
}
