//! Ingest Webhook use case
//!
//! Runs an inbound delivery through the verifier and, if it survives, admits
//! it to the scheduler. Webhook errors stop here; nothing past the admission
//! call sees them.

use crate::use_cases::scheduler::{Admission, SchedulerError, SchedulerHandle};
use autopilot_domain::{WebhookError, WebhookPayload, WebhookVerifier};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error(transparent)]
    Webhook(#[from] WebhookError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

/// What happened to an authentic delivery
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Admitted(Admission),
    /// Authentic, but carries no work (issue removed)
    Ignored,
}

pub struct IngestWebhookUseCase {
    verifier: Arc<WebhookVerifier>,
    scheduler: SchedulerHandle,
}

impl IngestWebhookUseCase {
    pub fn new(verifier: Arc<WebhookVerifier>, scheduler: SchedulerHandle) -> Self {
        Self {
            verifier,
            scheduler,
        }
    }

    /// Verify and admit one delivery.
    ///
    /// Checks run as signature, parse, timestamp, replay. A delivery that
    /// fails a later step has still been authenticated, but is never
    /// recorded in the replay cache unless it got that far.
    pub async fn execute(
        &self,
        raw_body: &[u8],
        signature: Option<&str>,
    ) -> Result<IngestOutcome, IngestError> {
        if !self.verifier.verify_signature(raw_body, signature) {
            warn!("Webhook rejected: signature verification failed");
            return Err(WebhookError::SignatureInvalid.into());
        }

        let payload = WebhookPayload::from_slice(raw_body).map_err(|e| {
            warn!("Webhook rejected: malformed payload: {}", e);
            WebhookError::MalformedPayload(e.to_string())
        })?;

        if !self.verifier.check_timestamp(payload.webhook_timestamp) {
            warn!(
                "Webhook rejected: stale timestamp {:?} for issue {}",
                payload.webhook_timestamp, payload.data.id
            );
            return Err(WebhookError::TimestampStale.into());
        }

        let key = WebhookVerifier::replay_key(raw_body, signature);
        if !self.verifier.check_replay(&key) {
            warn!("Webhook rejected: replayed delivery for issue {}", payload.data.id);
            return Err(WebhookError::ReplayDetected.into());
        }

        if payload.is_removal() {
            debug!("Ignoring removal event for issue {}", payload.data.id);
            return Ok(IngestOutcome::Ignored);
        }

        let admission = match self.scheduler.enqueue(payload.to_task_request()).await {
            Ok(admission) => admission,
            Err(e) => {
                if matches!(e, SchedulerError::QueueFull | SchedulerError::Stopped) {
                    // the sender will redeliver the same bytes
                    self.verifier.forget_replay(&key);
                }
                warn!("Webhook for issue {} not admitted: {}", payload.data.id, e);
                return Err(e.into());
            }
        };
        info!(
            "Webhook for issue {} -> task {} ({}{})",
            admission.task.issue_id,
            admission.task.id,
            admission.task.status,
            if admission.deduplicated { ", duplicate" } else { "" }
        );
        Ok(IngestOutcome::Admitted(admission))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;
    use crate::use_cases::execute_task::TaskError;
    use crate::use_cases::scheduler::{AttemptExecutor, SchedulerLoop};
    use async_trait::async_trait;
    use autopilot_domain::webhook::signature;
    use autopilot_domain::webhook::{FreshnessWindow, VerifierSettings};
    use autopilot_domain::{ManualClock, Task};
    use tokio::sync::Notify;
    use tokio_util::sync::CancellationToken;

    const SECRET: &str = "whsec_ingest";
    const NOW: i64 = 1_760_000_000_000;

    /// Attempts never finish, so admitted tasks stay active
    struct ParkedExecutor(Notify);

    #[async_trait]
    impl AttemptExecutor for ParkedExecutor {
        async fn execute(&self, _task: Task) -> Result<(), TaskError> {
            self.0.notified().await;
            Ok(())
        }
    }

    fn use_case(max_queue_size: usize) -> IngestWebhookUseCase {
        let clock = Arc::new(ManualClock::new(NOW));
        let verifier = WebhookVerifier::new(
            VerifierSettings {
                secret: Some(SECRET.to_string()),
                allow_unsigned: false,
                window: FreshnessWindow::default(),
                replay_cache_size: 100,
            },
            clock.clone(),
        );
        let (scheduler, handle) = SchedulerLoop::new(
            SchedulerConfig::default().with_max_queue_size(max_queue_size),
            Arc::new(ParkedExecutor(Notify::new())),
            clock,
            CancellationToken::new(),
        );
        scheduler.spawn();
        IngestWebhookUseCase::new(Arc::new(verifier), handle)
    }

    fn body(issue: &str, timestamp: i64) -> Vec<u8> {
        format!(
            r#"{{"action":"create","data":{{"id":"{}","title":"Fix it"}},"webhookTimestamp":{}}}"#,
            issue, timestamp
        )
        .into_bytes()
    }

    fn sign(body: &[u8]) -> String {
        signature::sign(SECRET.as_bytes(), body)
    }

    #[tokio::test]
    async fn test_valid_delivery_is_admitted() {
        let uc = use_case(10);
        let raw = body("ISS-1", NOW);
        let outcome = uc.execute(&raw, Some(&sign(&raw))).await.unwrap();
        match outcome {
            IngestOutcome::Admitted(admission) => {
                assert_eq!(admission.task.issue_id, "ISS-1");
                assert!(!admission.deduplicated);
            }
            other => panic!("expected admission, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bad_signature_rejected_before_parsing() {
        let uc = use_case(10);
        let err = uc.execute(b"not json", Some("00ff")).await.unwrap_err();
        assert_eq!(err, IngestError::Webhook(WebhookError::SignatureInvalid));

        let err = uc.execute(b"not json", None).await.unwrap_err();
        assert_eq!(err, IngestError::Webhook(WebhookError::SignatureInvalid));
    }

    #[tokio::test]
    async fn test_signed_garbage_is_malformed() {
        let uc = use_case(10);
        let raw = b"{\"oops\":".to_vec();
        let err = uc.execute(&raw, Some(&sign(&raw))).await.unwrap_err();
        assert!(matches!(
            err,
            IngestError::Webhook(WebhookError::MalformedPayload(_))
        ));
    }

    #[tokio::test]
    async fn test_stale_timestamp_rejected() {
        let uc = use_case(10);
        let raw = body("ISS-1", NOW - 6 * 60 * 1000);
        let err = uc.execute(&raw, Some(&sign(&raw))).await.unwrap_err();
        assert_eq!(err, IngestError::Webhook(WebhookError::TimestampStale));
    }

    #[tokio::test]
    async fn test_replay_rejected() {
        let uc = use_case(10);
        let raw = body("ISS-1", NOW);
        let sig = sign(&raw);
        uc.execute(&raw, Some(&sig)).await.unwrap();
        let err = uc.execute(&raw, Some(&sig)).await.unwrap_err();
        assert_eq!(err, IngestError::Webhook(WebhookError::ReplayDetected));
    }

    #[tokio::test]
    async fn test_resent_event_for_active_issue_is_deduplicated() {
        let uc = use_case(10);
        let first = body("ISS-1", NOW);
        let second = body("ISS-1", NOW + 1);

        uc.execute(&first, Some(&sign(&first))).await.unwrap();
        let outcome = uc.execute(&second, Some(&sign(&second))).await.unwrap();
        assert!(matches!(outcome, IngestOutcome::Admitted(a) if a.deduplicated));
    }

    #[tokio::test]
    async fn test_removal_ignored() {
        let uc = use_case(10);
        let raw = format!(
            r#"{{"action":"remove","data":{{"id":"ISS-1"}},"webhookTimestamp":{}}}"#,
            NOW
        )
        .into_bytes();
        let outcome = uc.execute(&raw, Some(&sign(&raw))).await.unwrap();
        assert_eq!(outcome, IngestOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_queue_full_surfaces_as_scheduler_error() {
        let uc = use_case(1);
        let a = body("ISS-1", NOW);
        let b = body("ISS-2", NOW);
        uc.execute(&a, Some(&sign(&a))).await.unwrap();
        let err = uc.execute(&b, Some(&sign(&b))).await.unwrap_err();
        assert_eq!(err, IngestError::Scheduler(SchedulerError::QueueFull));
    }

    #[tokio::test]
    async fn test_refused_delivery_can_be_redelivered() {
        let uc = use_case(1);
        let a = body("ISS-1", NOW);
        let b = body("ISS-2", NOW);
        let sig_b = sign(&b);
        uc.execute(&a, Some(&sign(&a))).await.unwrap();

        let err = uc.execute(&b, Some(&sig_b)).await.unwrap_err();
        assert_eq!(err, IngestError::Scheduler(SchedulerError::QueueFull));

        // same bytes and signature again: still refused for capacity, not as a replay
        let err = uc.execute(&b, Some(&sig_b)).await.unwrap_err();
        assert_eq!(err, IngestError::Scheduler(SchedulerError::QueueFull));
    }

    #[tokio::test]
    async fn test_invalid_task_keeps_replay_record() {
        let uc = use_case(10);
        let raw = format!(
            r#"{{"action":"create","data":{{"id":"ISS-3","title":"   "}},"webhookTimestamp":{}}}"#,
            NOW
        )
        .into_bytes();
        let sig = sign(&raw);

        let err = uc.execute(&raw, Some(&sig)).await.unwrap_err();
        assert!(matches!(
            err,
            IngestError::Scheduler(SchedulerError::InvalidTask(_))
        ));
        let err = uc.execute(&raw, Some(&sig)).await.unwrap_err();
        assert_eq!(err, IngestError::Webhook(WebhookError::ReplayDetected));
    }
}
