use std::sync::Arc;

use clap::Args;

use apnea_screen::error::AppError;
use apnea_screen::screening::{
    Answer, InMemorySessionStore, QuestionId, ScreeningWizard, Sex,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Include the per-indicator component breakdown in the output
    #[arg(long)]
    pub(crate) components: bool,
}

/// Walk the canned reference subject through every wizard step and print the
/// resulting assessment. Nothing is dispatched to any sink.
pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(InMemorySessionStore::default());
    let mut wizard = ScreeningWizard::new(store);
    wizard.restore().await;

    wizard.update_profile(|profile| {
        profile.name = "Demo Subject".to_string();
        profile.age = Some(55);
        profile.phone = "0501234567".to_string();
        profile.sex = Some(Sex::Male);
    });
    assert!(wizard.next().await, "demo profile satisfies the step gate");

    wizard.update_profile(|profile| {
        profile.weight_kg = Some(100.0);
        profile.height_cm = Some(170.0);
    });
    assert!(wizard.next().await, "demo metrics satisfy the step gate");

    for (question, answer) in [
        (QuestionId::Snoring, Answer::Yes),
        (QuestionId::Tiredness, Answer::Yes),
        (QuestionId::ObservedApnea, Answer::No),
        (QuestionId::Hypertension, Answer::Yes),
        (QuestionId::NeckCircumference, Answer::No),
    ] {
        wizard.record_answer(question, answer);
    }
    assert!(wizard.next().await, "demo questionnaire satisfies the step gate");

    let mut assessment = wizard.assessment();

    println!("Sleep-apnea screening demo");
    println!(
        "  subject: {} ({} years, {})",
        wizard.session().profile.name,
        assessment_age(&wizard),
        wizard
            .session()
            .profile
            .sex
            .map(Sex::label)
            .unwrap_or("unspecified"),
    );

    if !args.components {
        assessment.components.clear();
    }
    println!("{}", serde_json::to_string_pretty(&assessment)?);

    Ok(())
}

fn assessment_age(wizard: &ScreeningWizard<InMemorySessionStore>) -> String {
    wizard
        .session()
        .profile
        .age
        .map(|age| age.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
