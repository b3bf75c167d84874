use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Biological sex as captured on the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub const fn label(self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

/// The five questionnaire items the subject answers directly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum QuestionId {
    Snoring,
    Tiredness,
    ObservedApnea,
    Hypertension,
    NeckCircumference,
}

impl QuestionId {
    pub const ALL: [QuestionId; 5] = [
        QuestionId::Snoring,
        QuestionId::Tiredness,
        QuestionId::ObservedApnea,
        QuestionId::Hypertension,
        QuestionId::NeckCircumference,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            QuestionId::Snoring => "snoring",
            QuestionId::Tiredness => "tiredness",
            QuestionId::ObservedApnea => "observedApnea",
            QuestionId::Hypertension => "hypertension",
            QuestionId::NeckCircumference => "neckCircumference",
        }
    }
}

/// Yes/no response to a questionnaire item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    pub const fn label(self) -> &'static str {
        match self {
            Answer::Yes => "yes",
            Answer::No => "no",
        }
    }

    pub const fn is_yes(self) -> bool {
        matches!(self, Answer::Yes)
    }
}

/// Recorded questionnaire responses; an absent key means unanswered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSet(BTreeMap<QuestionId, Answer>);

impl AnswerSet {
    pub fn record(&mut self, question: QuestionId, answer: Answer) {
        self.0.insert(question, answer);
    }

    pub fn get(&self, question: QuestionId) -> Option<Answer> {
        self.0.get(&question).copied()
    }

    pub fn answered(&self) -> usize {
        self.0.len()
    }

    /// Submit-eligible only once every question has an answer.
    pub fn is_complete(&self) -> bool {
        self.0.len() == QuestionId::ALL.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, Answer)> + '_ {
        self.0.iter().map(|(question, answer)| (*question, *answer))
    }
}

/// Subject details collected in steps 1 and 2. Optional fields model values
/// not yet entered; completeness is judged by the wizard's gating predicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectProfile {
    pub name: String,
    pub age: Option<u32>,
    pub phone: String,
    pub sex: Option<Sex>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
}

impl SubjectProfile {
    /// True while every field is still at its untouched default, which is the
    /// only state a restored draft is allowed to overwrite.
    pub fn is_untouched(&self) -> bool {
        self.name.is_empty()
            && self.age.is_none()
            && self.phone.is_empty()
            && self.sex.is_none()
            && self.weight_kg.is_none()
            && self.height_cm.is_none()
    }
}

/// Position within the four-step intake wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Profile,
    Metrics,
    Questionnaire,
    Results,
}

impl WizardStep {
    pub const fn number(self) -> u8 {
        match self {
            WizardStep::Profile => 1,
            WizardStep::Metrics => 2,
            WizardStep::Questionnaire => 3,
            WizardStep::Results => 4,
        }
    }

    pub const fn from_number(value: u8) -> Option<WizardStep> {
        match value {
            1 => Some(WizardStep::Profile),
            2 => Some(WizardStep::Metrics),
            3 => Some(WizardStep::Questionnaire),
            4 => Some(WizardStep::Results),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            WizardStep::Profile => "profile",
            WizardStep::Metrics => "metrics",
            WizardStep::Questionnaire => "questionnaire",
            WizardStep::Results => "results",
        }
    }

    pub const fn forward(self) -> Option<WizardStep> {
        match self {
            WizardStep::Profile => Some(WizardStep::Metrics),
            WizardStep::Metrics => Some(WizardStep::Questionnaire),
            WizardStep::Questionnaire => Some(WizardStep::Results),
            WizardStep::Results => None,
        }
    }

    pub const fn back(self) -> Option<WizardStep> {
        match self {
            WizardStep::Profile => None,
            WizardStep::Metrics => Some(WizardStep::Profile),
            WizardStep::Questionnaire => Some(WizardStep::Metrics),
            WizardStep::Results => Some(WizardStep::Questionnaire),
        }
    }
}

/// Where the session sits in the submission lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionState {
    Idle,
    Submitting,
    Submitted,
    Failed,
}

impl SubmissionState {
    pub const fn label(self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Submitting => "submitting",
            SubmissionState::Submitted => "submitted",
            SubmissionState::Failed => "failed",
        }
    }
}

/// One subject's in-progress interaction with the wizard.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardSession {
    pub current_step: WizardStep,
    pub profile: SubjectProfile,
    pub answers: AnswerSet,
    pub submission_state: SubmissionState,
}

impl Default for WizardSession {
    fn default() -> Self {
        Self {
            current_step: WizardStep::Profile,
            profile: SubjectProfile::default(),
            answers: AnswerSet::default(),
            submission_state: SubmissionState::Idle,
        }
    }
}
