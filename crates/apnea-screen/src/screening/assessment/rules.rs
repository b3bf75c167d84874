use super::super::domain::{Answer, AnswerSet, QuestionId, Sex, SubjectProfile};
use super::{RiskIndicator, ScoreComponent};

/// Scores above this threshold warrant clinical follow-up.
pub(crate) const FOLLOW_UP_THRESHOLD: u8 = 3;

const BMI_INDICATOR_THRESHOLD: f64 = 35.0;
const AGE_INDICATOR_THRESHOLD: u32 = 50;

pub(crate) fn body_mass_index(profile: &SubjectProfile) -> f64 {
    match (profile.weight_kg, profile.height_cm) {
        (Some(weight), Some(height)) if height > 0.0 => weight / (height / 100.0).powi(2),
        // Metrics not entered yet read as a zero BMI, keeping the rubric total.
        _ => 0.0,
    }
}

pub(crate) fn indicator_components(
    profile: &SubjectProfile,
    answers: &AnswerSet,
    bmi: f64,
) -> (Vec<ScoreComponent>, u8) {
    let mut components = Vec::with_capacity(8);
    let mut raw_score = 0u8;

    for question in QuestionId::ALL {
        let recorded = answers.get(question);
        let met = recorded.map(Answer::is_yes).unwrap_or(false);
        let notes = match recorded {
            Some(answer) => format!("reported {}", answer.label()),
            None => "unanswered".to_string(),
        };
        push(
            &mut components,
            &mut raw_score,
            indicator_for(question),
            met,
            notes,
        );
    }

    push(
        &mut components,
        &mut raw_score,
        RiskIndicator::BmiOver35,
        bmi > BMI_INDICATOR_THRESHOLD,
        format!("bmi {bmi:.1}"),
    );

    let age_notes = match profile.age {
        Some(age) => format!("age {age}"),
        None => "age not recorded".to_string(),
    };
    push(
        &mut components,
        &mut raw_score,
        RiskIndicator::AgeOver50,
        profile
            .age
            .map(|age| age > AGE_INDICATOR_THRESHOLD)
            .unwrap_or(false),
        age_notes,
    );

    let sex_notes = match profile.sex {
        Some(sex) => format!("sex {}", sex.label()),
        None => "sex not recorded".to_string(),
    };
    push(
        &mut components,
        &mut raw_score,
        RiskIndicator::MaleSex,
        profile.sex == Some(Sex::Male),
        sex_notes,
    );

    (components, raw_score)
}

const fn indicator_for(question: QuestionId) -> RiskIndicator {
    match question {
        QuestionId::Snoring => RiskIndicator::Snoring,
        QuestionId::Tiredness => RiskIndicator::Tiredness,
        QuestionId::ObservedApnea => RiskIndicator::ObservedApnea,
        QuestionId::Hypertension => RiskIndicator::Hypertension,
        QuestionId::NeckCircumference => RiskIndicator::NeckCircumference,
    }
}

fn push(
    components: &mut Vec<ScoreComponent>,
    raw_score: &mut u8,
    indicator: RiskIndicator,
    met: bool,
    notes: String,
) {
    let points = u8::from(met);
    *raw_score += points;
    components.push(ScoreComponent {
        indicator,
        points,
        notes,
    });
}
