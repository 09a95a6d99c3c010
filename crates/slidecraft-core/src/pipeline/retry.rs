use std::future::Future;

use serde::Serialize;

use super::config::PipelineConfig;
use super::prompts::Feedback;
use super::report::{Phase, PhaseRecord};
use crate::error::{Result, SlidecraftError};
use crate::gate::GateResult;

/// Outcome of a gated phase once its retry budget is settled.
#[derive(Debug)]
pub(crate) enum Gated<T> {
    Passed(T),
    /// Every attempt failed. Carries the last output that parsed, if any.
    Exhausted(Option<T>),
}

/// Run `attempt` until its output passes the gate or the retry budget runs out.
///
/// Each attempt after the first gets the previous output and the gate's
/// feedback. Recoverable errors (gate failures, provider errors, timeouts)
/// consume an attempt; provider errors and timeouts also back off. Any other
/// error aborts the phase.
pub(crate) async fn run_gated<T, F, Fut>(
    phase: Phase,
    config: &PipelineConfig,
    record: &mut PhaseRecord,
    mut attempt: F,
) -> Result<Gated<T>>
where
    T: Serialize,
    F: FnMut(Option<Feedback>) -> Fut,
    Fut: Future<Output = Result<(T, GateResult)>>,
{
    let mut feedback: Option<Feedback> = None;
    let mut last: Option<T> = None;
    let mut provider_failures = 0u32;

    for _ in 0..=config.max_retries {
        record.begin_attempt();
        let outcome = match tokio::time::timeout(config.phase_timeout(), attempt(feedback.take())).await {
            Ok(outcome) => outcome,
            Err(_) => Err(SlidecraftError::Timeout {
                phase: phase.to_string(),
                seconds: config.phase_timeout_secs,
            }),
        };

        match outcome {
            Ok((output, GateResult::Pass)) => {
                record.pass();
                log::debug!("[{}] passed on attempt {}", phase, record.attempts);
                return Ok(Gated::Passed(output));
            }
            Ok((output, rejected)) => {
                log::info!(
                    "[{}] attempt {} rejected: {}",
                    phase,
                    record.attempts,
                    rejected.reasons().join("; ")
                );
                record.fail(rejected.reasons());
                feedback = Some(Feedback {
                    previous_output: serde_json::to_string_pretty(&output).unwrap_or_default(),
                    notes: rejected.feedback(),
                });
                last = Some(output);
            }
            Err(e) if e.is_recoverable() => {
                log::warn!("[{}] attempt {} failed: {}", phase, record.attempts, e);
                record.fail([e.to_string()]);
                let previous_output = last
                    .as_ref()
                    .and_then(|o| serde_json::to_string_pretty(o).ok())
                    .unwrap_or_default();
                feedback = Some(Feedback {
                    previous_output,
                    notes: format!("- {}", e),
                });
                if e.needs_backoff() && record.attempts <= config.max_retries {
                    let delay = config.backoff(provider_failures);
                    provider_failures += 1;
                    tokio::time::sleep(delay).await;
                }
            }
            Err(e) => return Err(e),
        }
    }

    Ok(Gated::Exhausted(last))
}

/// Turn a parse failure into a gate failure for `phase`.
pub(crate) fn parse_failure(phase: Phase, reason: String) -> SlidecraftError {
    SlidecraftError::ValidationGate {
        phase: phase.to_string(),
        reasons: vec![reason],
    }
}
