mod policy;
mod rules;

pub use policy::{BmiCategory, Priority, RiskLevel};

use serde::{Deserialize, Serialize};

use super::domain::{AnswerSet, SubjectProfile};

/// Stateless evaluator applying the eight-indicator screening rubric.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssessmentEngine;

impl AssessmentEngine {
    pub fn new() -> Self {
        Self
    }

    /// Deterministic and total: unanswered questions and absent profile
    /// fields simply leave their indicators unmet, they are never an error.
    pub fn assess(&self, profile: &SubjectProfile, answers: &AnswerSet) -> AssessmentResult {
        let body_mass_index = rules::body_mass_index(profile);
        let (components, raw_score) =
            rules::indicator_components(profile, answers, body_mass_index);
        let risk_level = RiskLevel::from_score(raw_score);

        AssessmentResult {
            body_mass_index,
            bmi_category: BmiCategory::from_bmi(body_mass_index),
            raw_score,
            risk_level,
            risk_category: risk_level.category().to_string(),
            priority: Priority::from_score(raw_score),
            follow_up_needed: raw_score > rules::FOLLOW_UP_THRESHOLD,
            components,
        }
    }
}

/// The eight binary indicators of the screening rubric: five answered
/// directly, three derived from the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RiskIndicator {
    Snoring,
    Tiredness,
    ObservedApnea,
    Hypertension,
    NeckCircumference,
    BmiOver35,
    AgeOver50,
    MaleSex,
}

impl RiskIndicator {
    pub const fn label(self) -> &'static str {
        match self {
            RiskIndicator::Snoring => "snoring",
            RiskIndicator::Tiredness => "tiredness",
            RiskIndicator::ObservedApnea => "observed apnea",
            RiskIndicator::Hypertension => "hypertension",
            RiskIndicator::NeckCircumference => "neck circumference",
            RiskIndicator::BmiOver35 => "bmi over 35",
            RiskIndicator::AgeOver50 => "age over 50",
            RiskIndicator::MaleSex => "male sex",
        }
    }
}

/// Discrete indicator contribution, kept for transparent audits and the
/// derived risk flags on the outbound payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub indicator: RiskIndicator,
    pub points: u8,
    pub notes: String,
}

/// Classification output, fully determined by the profile and answers and
/// recomputed on demand rather than stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub body_mass_index: f64,
    pub bmi_category: BmiCategory,
    pub raw_score: u8,
    pub risk_level: RiskLevel,
    pub risk_category: String,
    pub priority: Priority,
    pub follow_up_needed: bool,
    pub components: Vec<ScoreComponent>,
}

impl AssessmentResult {
    pub const MAX_SCORE: u8 = 8;

    /// Whether the given indicator contributed a point.
    pub fn indicator_met(&self, indicator: RiskIndicator) -> bool {
        self.components
            .iter()
            .any(|component| component.indicator == indicator && component.points > 0)
    }
}
