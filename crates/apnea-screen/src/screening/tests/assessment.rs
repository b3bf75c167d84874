use super::common::{answers_with_yes, scenario_answers, scenario_profile};
use crate::screening::assessment::{
    AssessmentEngine, BmiCategory, Priority, RiskIndicator, RiskLevel,
};
use crate::screening::domain::{AnswerSet, Sex, SubjectProfile};

/// Profile that contributes no derived indicator points on its own.
fn baseline_profile() -> SubjectProfile {
    SubjectProfile {
        name: "Rana Said".to_string(),
        age: Some(30),
        phone: "0507654321".to_string(),
        sex: Some(Sex::Female),
        weight_kg: Some(70.0),
        height_cm: Some(175.0),
    }
}

#[test]
fn bmi_matches_formula_exactly() {
    let engine = AssessmentEngine::new();
    let result = engine.assess(&scenario_profile(), &AnswerSet::default());

    assert_eq!(
        result.body_mass_index,
        100.0 / (170.0f64 / 100.0).powi(2)
    );
}

#[test]
fn bmi_category_boundaries_are_closed_correctly() {
    assert_eq!(BmiCategory::from_bmi(18.499), BmiCategory::Underweight);
    assert_eq!(BmiCategory::from_bmi(18.5), BmiCategory::Normal);
    assert_eq!(BmiCategory::from_bmi(24.999), BmiCategory::Normal);
    assert_eq!(BmiCategory::from_bmi(25.0), BmiCategory::Overweight);
    assert_eq!(BmiCategory::from_bmi(29.999), BmiCategory::Overweight);
    assert_eq!(BmiCategory::from_bmi(30.0), BmiCategory::Obese);
}

#[test]
fn score_boundaries_drive_risk_priority_and_follow_up() {
    let engine = AssessmentEngine::new();
    let profile = baseline_profile();

    let three = engine.assess(&profile, &answers_with_yes(3));
    assert_eq!(three.raw_score, 3);
    assert_eq!(three.risk_level, RiskLevel::Low);
    assert_eq!(three.priority, Priority::Low);
    assert!(!three.follow_up_needed);

    let four = engine.assess(&profile, &answers_with_yes(4));
    assert_eq!(four.raw_score, 4);
    assert_eq!(four.risk_level, RiskLevel::Medium);
    assert_eq!(four.priority, Priority::Medium);
    assert!(four.follow_up_needed);

    let five = engine.assess(&profile, &answers_with_yes(5));
    assert_eq!(five.raw_score, 5);
    assert_eq!(five.risk_level, RiskLevel::Medium);
    assert_eq!(five.priority, Priority::Medium);

    let mut older = baseline_profile();
    older.age = Some(55);
    let six = engine.assess(&older, &answers_with_yes(5));
    assert_eq!(six.raw_score, 6);
    assert_eq!(six.risk_level, RiskLevel::High);
    assert_eq!(six.priority, Priority::High);
}

#[test]
fn unanswered_questions_contribute_nothing() {
    let engine = AssessmentEngine::new();

    let result = engine.assess(&baseline_profile(), &AnswerSet::default());
    assert_eq!(result.raw_score, 0);
    assert_eq!(result.risk_level, RiskLevel::Low);

    // Derived indicators still fire without any recorded answers.
    let result = engine.assess(&scenario_profile(), &AnswerSet::default());
    assert_eq!(result.raw_score, 2);
    assert!(result.indicator_met(RiskIndicator::AgeOver50));
    assert!(result.indicator_met(RiskIndicator::MaleSex));
}

#[test]
fn derived_indicator_boundaries_are_exclusive() {
    let engine = AssessmentEngine::new();

    // Age exactly 50 contributes nothing; 51 does.
    let mut profile = baseline_profile();
    profile.age = Some(50);
    assert!(!engine
        .assess(&profile, &AnswerSet::default())
        .indicator_met(RiskIndicator::AgeOver50));
    profile.age = Some(51);
    assert!(engine
        .assess(&profile, &AnswerSet::default())
        .indicator_met(RiskIndicator::AgeOver50));

    // BMI exactly 35 contributes nothing; above it does.
    let mut profile = baseline_profile();
    profile.weight_kg = Some(140.0);
    profile.height_cm = Some(200.0);
    let result = engine.assess(&profile, &AnswerSet::default());
    assert_eq!(result.body_mass_index, 35.0);
    assert!(!result.indicator_met(RiskIndicator::BmiOver35));

    profile.weight_kg = Some(144.0);
    assert!(engine
        .assess(&profile, &AnswerSet::default())
        .indicator_met(RiskIndicator::BmiOver35));
}

#[test]
fn missing_metrics_read_as_zero_bmi() {
    let engine = AssessmentEngine::new();
    let mut profile = baseline_profile();
    profile.weight_kg = None;

    let result = engine.assess(&profile, &AnswerSet::default());
    assert_eq!(result.body_mass_index, 0.0);
    assert_eq!(result.bmi_category, BmiCategory::Underweight);
}

#[test]
fn assessment_is_idempotent() {
    let engine = AssessmentEngine::new();
    let profile = scenario_profile();
    let answers = scenario_answers();

    let first = engine.assess(&profile, &answers);
    let second = engine.assess(&profile, &answers);

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).expect("serialize first"),
        serde_json::to_string(&second).expect("serialize second"),
    );
}

#[test]
fn reference_scenario_scores_five_at_medium_risk() {
    let engine = AssessmentEngine::new();
    let result = engine.assess(&scenario_profile(), &scenario_answers());

    // 100 kg at 170 cm is obese but below the 35-point cutoff.
    assert_eq!((result.body_mass_index * 10.0).round() / 10.0, 34.6);
    assert_eq!(result.bmi_category, BmiCategory::Obese);
    assert!(!result.indicator_met(RiskIndicator::BmiOver35));

    assert_eq!(result.raw_score, 5);
    assert_eq!(result.risk_level, RiskLevel::Medium);
    assert_eq!(result.priority, Priority::Medium);
    assert!(result.follow_up_needed);
    assert_eq!(
        result.risk_category,
        "Intermediate probability of obstructive sleep apnea"
    );
}
