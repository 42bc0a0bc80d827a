//! End-to-end generation flow tests
//!
//! Runs the orchestrator over a file-backed tracker with a scripted generator
//! and checks quota booking, prompts and gating across a whole day.

use async_trait::async_trait;
use chrono::NaiveDate;
use contentcrafter::export::format_package_text;
use contentcrafter::generator::mock::mock_package;
use contentcrafter::generator::{
    ContentGenerator, ContentPackage, ContentType, GenerateError, GenerationRequest,
};
use contentcrafter::orchestrator::{GenerateOutcome, Orchestrator, PromptSignal};
use contentcrafter::usage::{
    FixedClock, JsonFileStore, Tier, UsageLimits, UsageStorage, UsageTracker,
};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Generator that replays queued results and records every request
#[derive(Default)]
struct ScriptedGenerator {
    results: Mutex<Vec<Result<ContentPackage, GenerateError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    fn push(&self, result: Result<ContentPackage, GenerateError>) {
        self.results.lock().unwrap().insert(0, result);
    }

    fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<ContentPackage, GenerateError> {
        self.requests.lock().unwrap().push(request.clone());
        self.results
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Ok(mock_package()))
    }
}

fn orchestrator(dir: &Path, generator: Arc<ScriptedGenerator>) -> Orchestrator {
    let store = JsonFileStore::in_dir(dir).unwrap();
    let mut tracker = UsageTracker::new(
        UsageStorage::new(Box::new(store)),
        Box::new(FixedClock(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap())),
        UsageLimits::default(),
    );
    tracker.initialize();
    Orchestrator::new(tracker, generator)
}

fn prompt_of(outcome: &GenerateOutcome) -> Option<PromptSignal> {
    match outcome {
        GenerateOutcome::Generated { prompt, .. } => *prompt,
        other => panic!("expected a package, got {:?}", other),
    }
}

#[tokio::test]
async fn test_whole_day_without_email() {
    let temp_dir = TempDir::new().unwrap();
    let generator = Arc::new(ScriptedGenerator::default());
    let mut orchestrator = orchestrator(temp_dir.path(), Arc::clone(&generator));

    let mut prompts = Vec::new();
    for _ in 0..6 {
        let outcome = orchestrator
            .generate("sourdough", Some(ContentType::Blog))
            .await;
        prompts.push(prompt_of(&outcome));
    }

    assert_eq!(
        prompts,
        vec![
            None,
            None,
            Some(PromptSignal::EmailUnlock),
            None,
            None,
            Some(PromptSignal::Paywall),
        ]
    );

    let blocked = orchestrator
        .generate("sourdough", Some(ContentType::Blog))
        .await;
    assert_eq!(blocked, GenerateOutcome::Gated(PromptSignal::Paywall));
    assert_eq!(generator.requests().len(), 6);
    assert_eq!(orchestrator.tracker().tier(), Tier::LimitReached);
}

#[tokio::test]
async fn test_quota_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let generator = Arc::new(ScriptedGenerator::default());

    let mut first = orchestrator(temp_dir.path(), Arc::clone(&generator));
    for _ in 0..4 {
        first.generate("kites", Some(ContentType::TikTok)).await;
    }
    drop(first);

    let mut second = orchestrator(temp_dir.path(), Arc::clone(&generator));
    assert_eq!(second.tracker().generations_left(), 2);
    assert_eq!(second.tracker().tier(), Tier::Email);

    let outcome = second.generate("kites", Some(ContentType::TikTok)).await;
    assert_eq!(prompt_of(&outcome), None);
}

#[tokio::test]
async fn test_failures_are_free() {
    let temp_dir = TempDir::new().unwrap();
    let generator = Arc::new(ScriptedGenerator::default());
    generator.push(Err(GenerateError::Api {
        status: 503,
        message: "overloaded".to_string(),
    }));
    generator.push(Err(GenerateError::InvalidCredential));

    let mut orchestrator = orchestrator(temp_dir.path(), Arc::clone(&generator));

    let first = orchestrator.generate("bees", Some(ContentType::Podcast)).await;
    assert_eq!(
        first,
        GenerateOutcome::Failed(
            "Failed to generate content. The AI model may be overloaded. Please try again later."
                .to_string()
        )
    );

    let second = orchestrator.generate("bees", Some(ContentType::Podcast)).await;
    assert_eq!(
        second,
        GenerateOutcome::Failed(
            "The provided API key is invalid. Please check it and try again.".to_string()
        )
    );

    assert_eq!(orchestrator.tracker().generations_used(), 0);
    assert!(orchestrator.last_package().is_none());

    let third = orchestrator.generate("bees", Some(ContentType::Podcast)).await;
    assert!(matches!(third, GenerateOutcome::Generated { .. }));
    assert_eq!(orchestrator.tracker().generations_used(), 1);
}

#[tokio::test]
async fn test_request_carries_trimmed_topic_and_override() {
    let temp_dir = TempDir::new().unwrap();
    let generator = Arc::new(ScriptedGenerator::default());
    let mut orchestrator = orchestrator(temp_dir.path(), Arc::clone(&generator))
        .with_api_key_override(Some("user-key".to_string()));

    orchestrator
        .generate("  tide pools \n", Some(ContentType::Instagram))
        .await;

    let requests = generator.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].topic, "tide pools");
    assert_eq!(requests[0].content_type, ContentType::Instagram);
    assert_eq!(requests[0].api_key.as_deref(), Some("user-key"));
}

#[tokio::test]
async fn test_incomplete_input_never_reaches_generator() {
    let temp_dir = TempDir::new().unwrap();
    let generator = Arc::new(ScriptedGenerator::default());
    let mut orchestrator = orchestrator(temp_dir.path(), Arc::clone(&generator));

    assert_eq!(
        orchestrator.generate("   ", Some(ContentType::Blog)).await,
        GenerateOutcome::Skipped
    );
    assert_eq!(
        orchestrator.generate("owls", None).await,
        GenerateOutcome::Skipped
    );
    assert!(generator.requests().is_empty());
}

#[tokio::test]
async fn test_background_generation_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let generator = Arc::new(ScriptedGenerator::default());
    let mut orchestrator = orchestrator(temp_dir.path(), Arc::clone(&generator));

    let pending = orchestrator
        .start("lighthouses", Some(ContentType::YouTube))
        .unwrap();
    assert!(orchestrator.is_in_flight());
    assert_eq!(
        orchestrator
            .start("lighthouses", Some(ContentType::YouTube))
            .err(),
        Some(GenerateOutcome::Busy)
    );

    let outcome = orchestrator.finish(pending.join().await);
    assert!(!orchestrator.is_in_flight());

    let package = orchestrator.last_package().unwrap();
    assert!(format_package_text(package).starts_with("Title Suggestions:\n- Mock Title 1"));
    assert!(matches!(outcome, GenerateOutcome::Generated { prompt: None, .. }));
}

#[tokio::test]
async fn test_late_email_cannot_reopen_exhausted_day() {
    let temp_dir = TempDir::new().unwrap();
    let generator = Arc::new(ScriptedGenerator::default());
    let mut orchestrator = orchestrator(temp_dir.path(), Arc::clone(&generator));

    for _ in 0..6 {
        orchestrator.generate("moss", Some(ContentType::Blog)).await;
    }
    assert!(orchestrator.confirm_email("late@example.com"));
    assert_eq!(orchestrator.tracker().tier(), Tier::LimitReached);
    assert_eq!(
        orchestrator.generate("moss", Some(ContentType::Blog)).await,
        GenerateOutcome::Gated(PromptSignal::Paywall)
    );
}
