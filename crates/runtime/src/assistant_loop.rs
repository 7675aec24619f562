//! Assistant loop: one-shot and repeated turns.

use crate::turn::TurnExecutor;
use deskmate_core::{AssistantError, TurnResult, VoiceTriggerListener};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// What `run_loop` does when a turn fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnErrorPolicy {
    /// Return the error and end the loop.
    #[default]
    Propagate,
    /// Log the error, skip the turn, keep looping.
    LogAndContinue,
}

/// Cooperative stop request, checked between iterations and while sleeping.
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    /// Sender half sets `true` to request a stop.
    pub fn channel() -> (watch::Sender<bool>, StopSignal) {
        let (tx, rx) = watch::channel(false);
        (tx, StopSignal { rx })
    }

    /// A signal that never fires.
    pub fn never() -> StopSignal {
        Self::channel().1
    }

    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Sleep for `duration` unless a stop arrives first. Returns whether a
    /// stop was requested.
    pub async fn sleep(&mut self, duration: Duration) -> bool {
        if self.is_stopped() {
            return true;
        }
        let sleep = tokio::time::sleep(duration);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => return self.is_stopped(),
                changed = self.rx.changed() => {
                    if changed.is_err() {
                        // Sender gone: nobody can stop us any more.
                        (&mut sleep).await;
                        return false;
                    }
                    if self.is_stopped() {
                        return true;
                    }
                }
            }
        }
    }
}

pub struct AssistantLoop {
    executor: TurnExecutor,
    listener: Option<Arc<dyn VoiceTriggerListener>>,
    error_policy: TurnErrorPolicy,
    stop: StopSignal,
}

impl AssistantLoop {
    pub fn new(executor: TurnExecutor) -> Self {
        Self {
            executor,
            listener: None,
            error_policy: TurnErrorPolicy::default(),
            stop: StopSignal::never(),
        }
    }

    /// Gate every turn on a wake-word activation.
    pub fn with_listener(mut self, listener: Arc<dyn VoiceTriggerListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn with_error_policy(mut self, policy: TurnErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn executor(&self) -> &TurnExecutor {
        &self.executor
    }

    pub fn has_listener(&self) -> bool {
        self.listener.is_some()
    }

    /// Run exactly one turn.
    pub async fn run_once(&self, user_note: Option<&str>) -> Result<TurnResult, AssistantError> {
        self.executor.run_once(user_note).await
    }

    /// Run turns until `max_turns` complete or a stop is requested.
    ///
    /// With a listener, each iteration waits for an activation carrying a
    /// request; without one, every iteration runs a turn with `user_note`.
    /// The interval sleep only follows a turn. Returns the number of
    /// completed turns.
    pub async fn run_loop(
        &self,
        interval: Duration,
        user_note: Option<&str>,
        max_turns: Option<usize>,
    ) -> Result<usize, AssistantError> {
        let mut stop = self.stop.clone();
        let mut completed = 0usize;

        if max_turns == Some(0) {
            return Ok(0);
        }

        info!(
            interval_ms = interval.as_millis() as u64,
            max_turns = ?max_turns,
            listener = self.listener.is_some(),
            "Assistant loop started"
        );

        loop {
            if stop.is_stopped() {
                info!(completed, "Stop requested");
                break;
            }

            let turn_note = match &self.listener {
                Some(listener) => {
                    let Some(activation) = listener.listen_for_activation().await else {
                        continue;
                    };
                    match activation.user_note {
                        Some(note) => Some(note),
                        None => {
                            info!(
                                wake_word = %activation.wake_word,
                                "No request captured after wake word; waiting"
                            );
                            continue;
                        }
                    }
                }
                None => user_note.map(str::to_string),
            };

            match self.executor.run_once(turn_note.as_deref()).await {
                Ok(result) => {
                    completed += 1;
                    info!(turn = completed, "Assistant: {}", result.response_text);
                    if let Some(path) = &result.audio_path {
                        info!(path = %path.display(), "Audio saved");
                    }
                }
                Err(err) => match self.error_policy {
                    TurnErrorPolicy::Propagate => return Err(err),
                    TurnErrorPolicy::LogAndContinue => {
                        warn!(error = %err, "Turn failed; continuing");
                    }
                },
            }

            if max_turns.is_some_and(|max| completed >= max) {
                debug!(completed, "Turn limit reached");
                break;
            }

            if stop.sleep(interval).await {
                info!(completed, "Stop requested");
                break;
            }
        }

        Ok(completed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stop_before_sleep() {
        let (tx, mut stop) = StopSignal::channel();
        tx.send(true).unwrap();
        assert!(stop.sleep(Duration::from_secs(60)).await);
    }

    #[tokio::test]
    async fn test_stop_during_sleep() {
        let (tx, mut stop) = StopSignal::channel();
        let sleeper = tokio::spawn(async move { stop.sleep(Duration::from_secs(60)).await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        tx.send(true).unwrap();
        let stopped = tokio::time::timeout(Duration::from_secs(5), sleeper)
            .await
            .expect("sleep should end promptly")
            .unwrap();
        assert!(stopped);
    }

    #[tokio::test]
    async fn test_dropped_sender_sleeps_full_interval() {
        let (tx, mut stop) = StopSignal::channel();
        drop(tx);
        let started = std::time::Instant::now();
        assert!(!stop.sleep(Duration::from_millis(50)).await);
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_never_signal_elapses() {
        let mut stop = StopSignal::never();
        assert!(!stop.is_stopped());
        assert!(!stop.sleep(Duration::from_millis(5)).await);
    }
}
