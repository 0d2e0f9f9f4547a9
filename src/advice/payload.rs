use super::types::AdviceType;
use crate::identity::Tier;
use serde::{Deserialize, Serialize};

// ─── Shared building blocks ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientProfile {
    pub name: Option<String>,
    pub age: u32,
    pub sex: Option<String>,
    pub weight_kg: f64,
    pub height_cm: Option<f64>,
    pub tier: Tier,
    #[serde(default)]
    pub allergens: Vec<String>,
    pub goal: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackItem {
    pub name: String,
    pub dose: String,
    pub timing: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLog {
    pub date: String,
    pub weight_kg: Option<f64>,
    pub calories: Option<u32>,
    pub protein_g: Option<u32>,
    pub steps: Option<u32>,
    pub sleep_hours: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSlot {
    pub day: String,
    pub start: String,
    pub duration_min: u32,
    pub focus: String,
}

// ─── The payload union ──────────────────────────────────────────────────────

/// Request data for one advice call, one variant per advice type.
///
/// A closed set of known shapes: the payload, the response schema, and the
/// instruction template all key off the same variant, so a caller cannot pair
/// a meal-plan payload with a bloodwork schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "advice_type", rename_all = "snake_case")]
pub enum AdvicePayload {
    MealPlan {
        profile: ClientProfile,
        calorie_target: u32,
        meals_per_day: u8,
        #[serde(default)]
        dislikes: Vec<String>,
    },
    MacroTargets {
        profile: ClientProfile,
        activity_level: String,
    },
    GroceryList {
        meal_plan_text: String,
        days: u8,
    },
    LabelAudit {
        label_text: Option<String>,
    },
    BloodworkExtraction {
        notes: Option<String>,
    },
    FormAudit {
        lift: String,
        notes: Option<String>,
    },
    InteractionAudit {
        stack: Vec<StackItem>,
    },
    SupplementTiming {
        stack: Vec<StackItem>,
        training_time: String,
    },
    BatchUnitAudit {
        recipe_text: String,
        batch_servings: u32,
    },
    ScheduleOptimization {
        slots: Vec<SessionSlot>,
        #[serde(default)]
        constraints: Vec<String>,
    },
    CheckInSummary {
        client_name: String,
        logs: Vec<DailyLog>,
    },
    ProgressReview {
        profile: ClientProfile,
        logs: Vec<DailyLog>,
    },
    HabitCoaching {
        habits: Vec<String>,
        struggles: String,
    },
    RecoveryProtocol {
        soreness_areas: Vec<String>,
        sleep_hours: f64,
        training_days_per_week: u8,
    },
    InjuryTriage {
        complaint: String,
        location: String,
        onset: String,
    },
    PeakWeek {
        profile: ClientProfile,
        show_date: String,
    },
    PostShowReset {
        profile: ClientProfile,
        show_date: String,
    },
    MarketIntel {
        niche: String,
        region: String,
    },
    TrendForecast {
        niche: String,
        horizon_months: u8,
    },
    MarketingCopy {
        offer: String,
        audience: String,
        tone: String,
    },
}

impl AdvicePayload {
    /// The advice type this payload belongs to. Single source of truth for
    /// schema and template selection.
    #[must_use]
    pub fn advice_type(&self) -> AdviceType {
        match self {
            Self::MealPlan { .. } => AdviceType::MealPlan,
            Self::MacroTargets { .. } => AdviceType::MacroTargets,
            Self::GroceryList { .. } => AdviceType::GroceryList,
            Self::LabelAudit { .. } => AdviceType::LabelAudit,
            Self::BloodworkExtraction { .. } => AdviceType::BloodworkExtraction,
            Self::FormAudit { .. } => AdviceType::FormAudit,
            Self::InteractionAudit { .. } => AdviceType::InteractionAudit,
            Self::SupplementTiming { .. } => AdviceType::SupplementTiming,
            Self::BatchUnitAudit { .. } => AdviceType::BatchUnitAudit,
            Self::ScheduleOptimization { .. } => AdviceType::ScheduleOptimization,
            Self::CheckInSummary { .. } => AdviceType::CheckInSummary,
            Self::ProgressReview { .. } => AdviceType::ProgressReview,
            Self::HabitCoaching { .. } => AdviceType::HabitCoaching,
            Self::RecoveryProtocol { .. } => AdviceType::RecoveryProtocol,
            Self::InjuryTriage { .. } => AdviceType::InjuryTriage,
            Self::PeakWeek { .. } => AdviceType::PeakWeek,
            Self::PostShowReset { .. } => AdviceType::PostShowReset,
            Self::MarketIntel { .. } => AdviceType::MarketIntel,
            Self::TrendForecast { .. } => AdviceType::TrendForecast,
            Self::MarketingCopy { .. } => AdviceType::MarketingCopy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AdvicePayload, ClientProfile, StackItem};
    use crate::advice::types::AdviceType;
    use crate::identity::Tier;

    fn profile() -> ClientProfile {
        ClientProfile {
            name: Some("Alex".into()),
            age: 31,
            sex: None,
            weight_kg: 82.5,
            height_cm: Some(180.0),
            tier: Tier::Intermediate,
            allergens: vec!["peanuts".into(), "shellfish".into()],
            goal: "recomposition".into(),
        }
    }

    #[test]
    fn payload_maps_to_its_advice_type() {
        let payload = AdvicePayload::MealPlan {
            profile: profile(),
            calorie_target: 2400,
            meals_per_day: 4,
            dislikes: vec![],
        };
        assert_eq!(payload.advice_type(), AdviceType::MealPlan);

        let audit = AdvicePayload::InteractionAudit {
            stack: vec![StackItem {
                name: "caffeine".into(),
                dose: "200mg".into(),
                timing: Some("pre-workout".into()),
            }],
        };
        assert_eq!(audit.advice_type(), AdviceType::InteractionAudit);
    }

    #[test]
    fn payload_serde_tag_matches_advice_type_name() {
        let payload = AdvicePayload::BloodworkExtraction { notes: None };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["advice_type"], "bloodwork_extraction");
        assert_eq!(
            value["advice_type"],
            serde_json::to_value(payload.advice_type()).unwrap()
        );
    }

    #[test]
    fn payload_round_trips_through_json() {
        let payload = AdvicePayload::ScheduleOptimization {
            slots: vec![super::SessionSlot {
                day: "monday".into(),
                start: "06:30".into(),
                duration_min: 60,
                focus: "lower".into(),
            }],
            constraints: vec!["no sessions after 19:00".into()],
        };
        let json = serde_json::to_string(&payload).unwrap();
        let back: AdvicePayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payload);
    }
}
