//! # Generation Orchestrator
//!
//! Decides what happens when the user asks for a package:
//!
//! 1. A request already in flight → [`GenerateOutcome::Busy`]
//! 2. Quota used up → [`GenerateOutcome::Gated`] with the prompt to show
//! 3. Topic or content type missing → [`GenerateOutcome::Skipped`]
//! 4. Otherwise call the generator, count the generation on success and
//!    say whether an unlock or paywall prompt is due.
//!
//! The TUI cannot await inside its event loop, so the same sequence is also
//! available in two halves: [`Orchestrator::start`] spawns the request and
//! [`Orchestrator::finish`] books the result.

use crate::generator::{
    ContentGenerator, ContentPackage, ContentType, GenerateError, GenerationRequest,
};
use crate::usage::{Tier, UsageTracker};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Prompt the UI should raise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptSignal {
    /// Ask for an email to unlock more generations
    EmailUnlock,
    /// All free generations are used
    Paywall,
}

/// Result of one generate request
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateOutcome {
    Busy,
    Gated(PromptSignal),
    Skipped,
    Generated {
        package: ContentPackage,
        prompt: Option<PromptSignal>,
    },
    /// User-facing failure message
    Failed(String),
}

/// A generation running on the tokio runtime
pub struct PendingGeneration {
    handle: JoinHandle<Result<ContentPackage, GenerateError>>,
}

impl PendingGeneration {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the generator's result
    pub async fn join(self) -> Result<ContentPackage, GenerateError> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(GenerateError::Request(format!(
                "generation task failed: {}",
                e
            ))),
        }
    }
}

pub struct Orchestrator {
    tracker: UsageTracker,
    generator: Arc<dyn ContentGenerator>,
    api_key_override: Option<String>,
    in_flight: bool,
    last_package: Option<ContentPackage>,
}

impl Orchestrator {
    pub fn new(tracker: UsageTracker, generator: Arc<dyn ContentGenerator>) -> Self {
        Self {
            tracker,
            generator,
            api_key_override: None,
            in_flight: false,
            last_package: None,
        }
    }

    /// Credential sent with every request, overriding the generator's own
    pub fn with_api_key_override(mut self, api_key: Option<String>) -> Self {
        self.api_key_override = api_key;
        self
    }

    pub fn tracker(&self) -> &UsageTracker {
        &self.tracker
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// The most recent successful package
    pub fn last_package(&self) -> Option<&ContentPackage> {
        self.last_package.as_ref()
    }

    /// Run the gate and input checks; on success mark the request in flight
    pub fn begin(
        &mut self,
        topic: &str,
        content_type: Option<ContentType>,
    ) -> Result<GenerationRequest, GenerateOutcome> {
        if self.in_flight {
            return Err(GenerateOutcome::Busy);
        }

        if self.tracker.is_limit_reached() {
            let prompt = match self.tracker.tier() {
                Tier::Anonymous => PromptSignal::EmailUnlock,
                Tier::Email | Tier::LimitReached => PromptSignal::Paywall,
            };
            tracing::info!(tier = self.tracker.tier().as_str(), ?prompt, "Generation gated");
            return Err(GenerateOutcome::Gated(prompt));
        }

        let topic = topic.trim();
        let Some(content_type) = content_type.filter(|_| !topic.is_empty()) else {
            return Err(GenerateOutcome::Skipped);
        };

        self.in_flight = true;
        Ok(GenerationRequest {
            topic: topic.to_string(),
            content_type,
            api_key: self.api_key_override.clone(),
        })
    }

    /// Book the generator's result and clear the in-flight flag
    pub fn finish(&mut self, result: Result<ContentPackage, GenerateError>) -> GenerateOutcome {
        self.in_flight = false;

        let package = match result {
            Ok(package) => package,
            Err(e) => {
                tracing::warn!(error = %e, "Generation failed, quota unchanged");
                return GenerateOutcome::Failed(e.user_message().to_string());
            }
        };

        let tier_before = self.tracker.tier();
        self.tracker.increment_generations();

        let used = self.tracker.generations_used();
        let limits = self.tracker.limits();
        let prompt = if used == limits.total {
            Some(PromptSignal::Paywall)
        } else if tier_before == Tier::Anonymous && used == limits.anonymous {
            Some(PromptSignal::EmailUnlock)
        } else {
            None
        };

        tracing::info!(
            used,
            left = self.tracker.generations_left(),
            tier = self.tracker.tier().as_str(),
            "Generation complete"
        );

        self.last_package = Some(package.clone());
        GenerateOutcome::Generated { package, prompt }
    }

    /// Gate, generate and book in one call
    pub async fn generate(
        &mut self,
        topic: &str,
        content_type: Option<ContentType>,
    ) -> GenerateOutcome {
        let request = match self.begin(topic, content_type) {
            Ok(request) => request,
            Err(outcome) => return outcome,
        };

        let result = self.generator.generate(&request).await;
        self.finish(result)
    }

    /// Gate and spawn the generator on the current tokio runtime.
    ///
    /// The caller must hand the joined result to [`finish`](Self::finish).
    pub fn start(
        &mut self,
        topic: &str,
        content_type: Option<ContentType>,
    ) -> Result<PendingGeneration, GenerateOutcome> {
        let request = self.begin(topic, content_type)?;
        let generator = Arc::clone(&self.generator);

        let handle = tokio::spawn(async move { generator.generate(&request).await });
        Ok(PendingGeneration { handle })
    }

    /// Unlock the email tier. Returns false for an obviously invalid address.
    pub fn confirm_email(&mut self, email: &str) -> bool {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return false;
        }

        tracing::info!("Email submitted, unlocking email tier");
        self.tracker.start_email_tier();
        true
    }
}
