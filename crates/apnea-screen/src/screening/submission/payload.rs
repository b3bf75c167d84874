use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::assessment::{AssessmentResult, RiskIndicator};
use super::super::domain::{AnswerSet, QuestionId, SubjectProfile};

/// Browser/client details forwarded for operator context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientContext {
    pub user_agent: String,
    pub referrer: String,
}

/// Metadata minted once per submission attempt; the session id is never
/// reused across attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadMetadata {
    pub submitted_at: DateTime<Utc>,
    pub session_id: String,
    pub source_tag: String,
    pub client: ClientContext,
}

/// Raised when the payload constructor finds a required field missing. The
/// orchestrator checks its precondition before assembling, so hitting this is
/// a caller error rather than a handled condition.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("profile field '{0}' is required for submission")]
    MissingProfileField(&'static str),
    #[error("questionnaire item '{0}' is unanswered")]
    MissingAnswer(&'static str),
}

/// Display-normalized outbound record; assembled exactly once per attempt and
/// immutable afterwards. Sinks rename these fields but never reinterpret them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub name: String,
    pub age: u32,
    pub phone: String,
    pub sex: String,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub bmi: f64,
    pub bmi_category: String,
    pub snoring: String,
    pub tiredness: String,
    pub observed_apnea: String,
    pub hypertension: String,
    pub neck_circumference: String,
    pub age_risk: String,
    pub bmi_risk: String,
    pub sex_risk: String,
    pub raw_score: u8,
    pub max_score: u8,
    pub risk_level: String,
    pub risk_category: String,
    pub priority: String,
    pub follow_up_needed: String,
    pub metadata: PayloadMetadata,
}

impl SubmissionPayload {
    /// Assemble the outbound record, validating that every required field is
    /// present before anything is dispatched.
    pub fn assemble(
        profile: &SubjectProfile,
        answers: &AnswerSet,
        assessment: &AssessmentResult,
        metadata: PayloadMetadata,
    ) -> Result<Self, PayloadError> {
        if profile.name.trim().is_empty() {
            return Err(PayloadError::MissingProfileField("name"));
        }
        let age = profile
            .age
            .ok_or(PayloadError::MissingProfileField("age"))?;
        if profile.phone.trim().is_empty() {
            return Err(PayloadError::MissingProfileField("phone"));
        }
        let sex = profile
            .sex
            .ok_or(PayloadError::MissingProfileField("sex"))?;
        let weight_kg = profile
            .weight_kg
            .ok_or(PayloadError::MissingProfileField("weightKg"))?;
        let height_cm = profile
            .height_cm
            .ok_or(PayloadError::MissingProfileField("heightCm"))?;

        let answer = |question: QuestionId| -> Result<String, PayloadError> {
            answers
                .get(question)
                .map(|answer| answer.label().to_string())
                .ok_or(PayloadError::MissingAnswer(question.key()))
        };

        Ok(Self {
            name: profile.name.trim().to_string(),
            age,
            phone: profile.phone.trim().to_string(),
            sex: sex.label().to_string(),
            weight_kg,
            height_cm,
            bmi: (assessment.body_mass_index * 10.0).round() / 10.0,
            bmi_category: assessment.bmi_category.label().to_string(),
            snoring: answer(QuestionId::Snoring)?,
            tiredness: answer(QuestionId::Tiredness)?,
            observed_apnea: answer(QuestionId::ObservedApnea)?,
            hypertension: answer(QuestionId::Hypertension)?,
            neck_circumference: answer(QuestionId::NeckCircumference)?,
            age_risk: flag(assessment.indicator_met(RiskIndicator::AgeOver50)),
            bmi_risk: flag(assessment.indicator_met(RiskIndicator::BmiOver35)),
            sex_risk: flag(assessment.indicator_met(RiskIndicator::MaleSex)),
            raw_score: assessment.raw_score,
            max_score: AssessmentResult::MAX_SCORE,
            risk_level: assessment.risk_level.label().to_string(),
            risk_category: assessment.risk_category.clone(),
            priority: assessment.priority.label().to_string(),
            follow_up_needed: flag(assessment.follow_up_needed),
            metadata,
        })
    }
}

fn flag(met: bool) -> String {
    if met { "yes" } else { "no" }.to_string()
}
