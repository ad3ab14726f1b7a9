//! Run Consensus use case
//!
//! Fans one question out to every configured model in parallel and
//! aggregates the parsed verdicts into a [`ConsensusReport`].

use crate::config::ConsensusSettings;
use crate::ports::model_invoker::{InvokeError, ModelInvoker};
use crate::ports::progress::{ConsensusProgress, NoProgress};
use autopilot_domain::{
    ApprovalThreshold, ConsensusMode, ConsensusReport, Model, ModelVerdict, PromptTemplate,
    Verdict, parse_verdict,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Errors that prevent a round from running at all
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    #[error("No models configured")]
    NoModels,
}

/// Input for the RunConsensus use case
#[derive(Debug, Clone)]
pub struct RunConsensusInput {
    pub mode: ConsensusMode,
    /// The question itself; the mode's prompt template wraps it
    pub question: String,
    pub models: Vec<Model>,
    pub threshold: ApprovalThreshold,
    /// Independent timeout per model
    pub timeout: Duration,
}

impl RunConsensusInput {
    pub fn new(
        mode: ConsensusMode,
        question: impl Into<String>,
        settings: &ConsensusSettings,
    ) -> Self {
        Self {
            mode,
            question: question.into(),
            models: settings.models.clone(),
            threshold: settings.threshold,
            timeout: settings.timeout,
        }
    }
}

/// Use case for running one consensus round
pub struct RunConsensusUseCase<I: ModelInvoker + 'static> {
    invoker: Arc<I>,
}

impl<I: ModelInvoker + 'static> RunConsensusUseCase<I> {
    pub fn new(invoker: Arc<I>) -> Self {
        Self { invoker }
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: RunConsensusInput,
    ) -> Result<ConsensusReport, ConsensusError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks.
    ///
    /// Returns only once every model has responded, failed, or timed out.
    /// Votes keep the order of `input.models`.
    pub async fn execute_with_progress(
        &self,
        input: RunConsensusInput,
        progress: &dyn ConsensusProgress,
    ) -> Result<ConsensusReport, ConsensusError> {
        if input.models.is_empty() {
            return Err(ConsensusError::NoModels);
        }

        info!(
            "Starting {} with {} models",
            input.mode.display_name(),
            input.models.len()
        );
        progress.on_round_start(input.mode, &input.models);

        let prompt = match input.mode {
            ConsensusMode::Plan => PromptTemplate::plan_prompt(&input.question),
            ConsensusMode::Review => PromptTemplate::review_prompt(&input.question),
        };
        let prompt: Arc<str> = Arc::from(prompt);

        let mut join_set = JoinSet::new();
        for (index, model) in input.models.iter().enumerate() {
            let invoker = Arc::clone(&self.invoker);
            let model = model.clone();
            let prompt = Arc::clone(&prompt);
            let mode = input.mode;
            let timeout = input.timeout;

            join_set.spawn(async move {
                let vote = Self::ask_model(&invoker, &model, &prompt, mode, timeout).await;
                (index, model, vote)
            });
        }

        let mut slots: Vec<Option<ModelVerdict>> = vec![None; input.models.len()];
        while let Some(result) = join_set.join_next().await {
            match result {
                Ok((index, model, vote)) => {
                    progress.on_vote(&model, &vote);
                    slots[index] = Some(vote);
                }
                Err(e) => {
                    warn!("Consensus task join error: {}", e);
                }
            }
        }

        let placeholder = Verdict::placeholder(input.mode);
        let votes: Vec<ModelVerdict> = slots
            .into_iter()
            .zip(&input.models)
            .map(|(slot, model)| {
                slot.unwrap_or_else(|| {
                    ModelVerdict::failed(model.as_str(), placeholder, "invocation task aborted", 0)
                })
            })
            .collect();

        let report = ConsensusReport::new(input.mode, input.question, votes, input.threshold);
        info!(
            "{}: {} ({})",
            report.mode().display_name(),
            report.verdict(),
            report.rationale()
        );
        progress.on_round_complete(&report);
        Ok(report)
    }

    /// Ask one model; every failure becomes an errored vote
    async fn ask_model(
        invoker: &Arc<I>,
        model: &Model,
        prompt: &str,
        mode: ConsensusMode,
        timeout: Duration,
    ) -> ModelVerdict {
        let started = Instant::now();
        let result = tokio::time::timeout(timeout, invoker.invoke(model, prompt)).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        let placeholder = Verdict::placeholder(mode);

        let error = match result {
            Ok(Ok(text)) if !text.trim().is_empty() => {
                let vote = parse_verdict(model.as_str(), &text, mode, elapsed_ms);
                debug!("Model {} voted {} in {}ms", model, vote.verdict, elapsed_ms);
                return vote;
            }
            Ok(Ok(_)) => InvokeError::EmptyOutput {
                model: model.to_string(),
            },
            Ok(Err(e)) => e,
            Err(_) => InvokeError::Timeout {
                model: model.to_string(),
                secs: timeout.as_secs(),
            },
        };

        warn!("Model {} excluded from quorum: {}", model, error);
        ModelVerdict::failed(model.as_str(), placeholder, error.to_string(), elapsed_ms)
    }
}
