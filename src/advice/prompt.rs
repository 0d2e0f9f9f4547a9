//! Prompt assembly.
//!
//! Combines the fixed coaching persona, a per-advice-type instruction, and the
//! caller's payload (serialized to JSON) into an [`AdviceRequest`]. This layer
//! is deterministic: identical inputs produce structurally identical requests,
//! and nothing here reads a clock or random source. Invalid data is passed
//! through untouched; if it fails, it fails at generation or validation.

use super::payload::AdvicePayload;
use super::types::{AdviceRequest, AdviceType};
use crate::media::ImagePayload;
use std::sync::LazyLock;
use tera::{Context, Tera};

/// The coaching persona and safety ruleset sent as the system instruction on
/// every advice call.
pub const PERSONA: &str = "\
You are an evidence-based fitness and nutrition coach for a coaching platform \
serving prospects, clients, and coaches. Speak plainly and encouragingly, \
never condescendingly. Ground every recommendation in the data you are given; \
when data is missing, say so instead of inventing numbers. Never prescribe \
medication, diagnose medical conditions, or override a physician's guidance - \
recommend professional referral whenever symptoms sound clinical. Respect \
declared allergens and intolerances absolutely: an ingredient on the client's \
allergen list must never appear in any plan. For audit-style answers, grade \
severity using exactly the vocabulary CRITICAL, MODERATE, or LOW. Answer with \
JSON only, matching the schema you were given, with no surrounding prose.";

const ADVICE_TEMPLATE_NAME: &str = "advice_user";

const ADVICE_TEMPLATE: &str = "\
{{ instruction }}

Input data (JSON):
{{ data }}

Respond with a single JSON value matching the requested schema, and nothing else.";

static ENGINE: LazyLock<Tera> = LazyLock::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_template(ADVICE_TEMPLATE_NAME, ADVICE_TEMPLATE)
        .expect("advice template is valid");
    tera
});

/// Per-advice-type instruction text. The schema tells the endpoint the shape;
/// this tells it the semantics and the vocabulary.
#[must_use]
pub fn instruction_for(advice_type: AdviceType) -> &'static str {
    match advice_type {
        AdviceType::MealPlan => {
            "Build a one-day meal schedule hitting the calorie target within 5%. \
             Every item lists ingredient and grams. Exclude all declared allergens \
             and disliked foods, and set allergen_safe accordingly."
        }
        AdviceType::MacroTargets => {
            "Compute daily calorie and macro targets for this client's goal and \
             activity level, with a short rationale."
        }
        AdviceType::GroceryList => {
            "Consolidate this meal plan into a grocery list for the given number \
             of days, grouped by store aisle, with an estimated total cost."
        }
        AdviceType::LabelAudit => {
            "Audit the attached supplement label (and any transcribed label text) \
             for red-flag ingredients, proprietary-blend obfuscation, and dosing \
             concerns. Grade each flag CRITICAL, MODERATE, or LOW."
        }
        AdviceType::BloodworkExtraction => {
            "Extract every marker from the attached bloodwork panel photo: name, \
             numeric value, unit, reference range, and whether it falls outside \
             that range. Summarize notable findings without diagnosing."
        }
        AdviceType::FormAudit => {
            "Review the attached lift footage frame for technique faults by movement \
             phase. Grade each fault CRITICAL, MODERATE, or LOW and give one \
             coaching cue per fault."
        }
        AdviceType::InteractionAudit => {
            "Audit this supplement stack for pairwise interactions. For each \
             interaction name the pair, grade severity CRITICAL, MODERATE, or LOW, \
             explain the mechanism briefly, and recommend an adjustment."
        }
        AdviceType::SupplementTiming => {
            "Lay out an intake timetable for this stack around the given training \
             time, noting which doses need food."
        }
        AdviceType::BatchUnitAudit => {
            "Check this batch recipe's arithmetic: per-serving ingredient grams for \
             the stated number of servings, the batch total, and any discrepancies \
             between the recipe text and the math."
        }
        AdviceType::ScheduleOptimization => {
            "Rearrange these session slots into a conflict-free weekly schedule \
             honoring every constraint. Report how many conflicts you resolved."
        }
        AdviceType::CheckInSummary => {
            "Summarize this client's check-in logs: adherence percentage, weight \
             trend, wins, concerns, and a short reply draft in the coach's voice."
        }
        AdviceType::ProgressReview => {
            "Review this client's logs against their profile and goal: trend, rate \
             of change per week, whether they have plateaued, and concrete \
             adjustments."
        }
        AdviceType::HabitCoaching => {
            "For each struggling habit propose a trigger and a replacement \
             behavior, and pick one weekly focus."
        }
        AdviceType::RecoveryProtocol => {
            "Propose recovery protocols for the sore areas given sleep and training \
             load, and list red flags that should pause training."
        }
        AdviceType::InjuryTriage => {
            "Triage this training complaint: severity (CRITICAL, MODERATE, or LOW), \
             the most likely issue in lay terms, whether to stop training, whether \
             to refer out, and training modifications meanwhile. Do not diagnose."
        }
        AdviceType::PeakWeek => {
            "Plan the final week before this show day by day: water, carbs, sodium, \
             and notes. List warnings for any manipulation that carries risk."
        }
        AdviceType::PostShowReset => {
            "Plan a post-show reset in weekly blocks: calories, cardio minutes, and \
             focus per week, with an honest rebound-risk assessment."
        }
        AdviceType::MarketIntel => {
            "Survey the competitive landscape for this coaching niche and region: \
             named competitors with offers and price points, underserved gaps, and \
             a positioning suggestion."
        }
        AdviceType::TrendForecast => {
            "Forecast fitness-industry trends for this niche over the given \
             horizon, with momentum ratings and one recommendation."
        }
        AdviceType::MarketingCopy => {
            "Write marketing copy for this offer and audience in the requested \
             tone: headline, body, call to action, and alternate headline variants."
        }
    }
}

/// Assemble the full request for one advice call.
pub fn assemble(
    payload: &AdvicePayload,
    image: Option<ImagePayload>,
) -> anyhow::Result<AdviceRequest> {
    let advice_type = payload.advice_type();

    let data = serde_json::to_string_pretty(payload)?;
    let mut ctx = Context::new();
    ctx.insert("instruction", instruction_for(advice_type));
    ctx.insert("data", &data);
    let user_text = ENGINE.render(ADVICE_TEMPLATE_NAME, &ctx)?;

    Ok(AdviceRequest {
        advice_type,
        system_instruction: PERSONA.to_string(),
        user_text,
        image,
    })
}
