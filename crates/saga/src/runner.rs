//! A small saga runner.
//!
//! A saga is an ordered list of named (action, compensation) pairs.
//! Actions run in order; when one fails, the compensations of every
//! previously completed step run in reverse order before the failure is
//! surfaced. Compensation failures are logged and never replace the
//! original error.

use futures_util::future::BoxFuture;

/// A deferred step action or compensation.
type StepFn<E> = Box<dyn FnOnce() -> BoxFuture<'static, Result<(), E>> + Send>;

struct SagaStep<E> {
    name: String,
    action: StepFn<E>,
    compensation: Option<StepFn<E>>,
}

/// The failure of a saga step, surfaced after compensation has run.
#[derive(Debug)]
pub struct SagaFailure<E> {
    /// Name of the step that failed.
    pub step: String,
    /// The step's error, unchanged by any compensation outcome.
    pub error: E,
}

/// An ordered list of (action, compensation) pairs.
pub struct Saga<E> {
    name: &'static str,
    steps: Vec<SagaStep<E>>,
}

impl<E: std::fmt::Display> Saga<E> {
    /// Creates an empty saga.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            steps: Vec::new(),
        }
    }

    /// Appends a step with a compensation.
    pub fn step<A, AF, C, CF>(&mut self, name: impl Into<String>, action: A, compensation: C)
    where
        A: FnOnce() -> AF + Send + 'static,
        AF: Future<Output = Result<(), E>> + Send + 'static,
        C: FnOnce() -> CF + Send + 'static,
        CF: Future<Output = Result<(), E>> + Send + 'static,
    {
        self.steps.push(SagaStep {
            name: name.into(),
            action: Box::new(move || Box::pin(action())),
            compensation: Some(Box::new(move || Box::pin(compensation()))),
        });
    }

    /// Appends a step whose effects need no compensation.
    pub fn step_without_compensation<A, AF>(&mut self, name: impl Into<String>, action: A)
    where
        A: FnOnce() -> AF + Send + 'static,
        AF: Future<Output = Result<(), E>> + Send + 'static,
    {
        self.steps.push(SagaStep {
            name: name.into(),
            action: Box::new(move || Box::pin(action())),
            compensation: None,
        });
    }

    /// Runs the actions in order.
    ///
    /// On the first failure, compensations of the completed steps run in
    /// reverse order and the step's error comes back as a
    /// [`SagaFailure`]. On success the completed saga is returned so the
    /// caller can still unwind if a later commit does not apply.
    pub async fn execute(self) -> Result<CompletedSaga<E>, SagaFailure<E>> {
        let name = self.name;
        let mut completed: Vec<(String, StepFn<E>)> = Vec::new();

        for step in self.steps {
            tracing::debug!(saga = name, step = %step.name, "saga step started");
            match (step.action)().await {
                Ok(()) => {
                    if let Some(compensation) = step.compensation {
                        completed.push((step.name, compensation));
                    }
                }
                Err(error) => {
                    tracing::warn!(saga = name, step = %step.name, %error, "saga step failed");
                    run_compensations(name, completed).await;
                    return Err(SagaFailure {
                        step: step.name,
                        error,
                    });
                }
            }
        }

        Ok(CompletedSaga {
            name,
            compensations: completed,
        })
    }
}

/// A saga whose actions all completed.
///
/// Holds the compensations so a caller can still unwind the side effects
/// when the final, version-checked commit loses to a concurrent writer.
pub struct CompletedSaga<E> {
    name: &'static str,
    compensations: Vec<(String, StepFn<E>)>,
}

impl<E: std::fmt::Display> CompletedSaga<E> {
    /// Unwinds every completed step in reverse order.
    pub async fn compensate(self) {
        run_compensations(self.name, self.compensations).await;
    }
}

async fn run_compensations<E: std::fmt::Display>(name: &str, completed: Vec<(String, StepFn<E>)>) {
    for (step, compensation) in completed.into_iter().rev() {
        if let Err(error) = compensation().await {
            // Never mask the original failure; the unwind keeps going.
            tracing::error!(saga = name, step = %step, %error, "compensation failed");
        } else {
            tracing::debug!(saga = name, step = %step, "compensation applied");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    fn record(log: &Arc<Mutex<Vec<&'static str>>>, entry: &'static str) {
        log.lock().unwrap().push(entry);
    }

    #[tokio::test]
    async fn all_steps_run_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut saga: Saga<String> = Saga::new("test");

        for (name, entry) in [("first", "a1"), ("second", "a2")] {
            let action_log = log.clone();
            let comp_log = log.clone();
            saga.step(
                name,
                move || async move {
                    record(&action_log, entry);
                    Ok(())
                },
                move || async move {
                    record(&comp_log, "never");
                    Ok(())
                },
            );
        }

        saga.execute().await.map_err(|f| f.step).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["a1", "a2"]);
    }

    #[tokio::test]
    async fn failure_compensates_completed_steps_in_reverse() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut saga: Saga<String> = Saga::new("test");

        for (name, action_entry, comp_entry) in
            [("first", "a1", "c1"), ("second", "a2", "c2")]
        {
            let action_log = log.clone();
            let comp_log = log.clone();
            saga.step(
                name,
                move || async move {
                    record(&action_log, action_entry);
                    Ok(())
                },
                move || async move {
                    record(&comp_log, comp_entry);
                    Ok(())
                },
            );
        }
        let failed_step_log = log.clone();
        saga.step(
            "third",
            || async { Err("boom".to_string()) },
            move || async move {
                // A failed step must not be compensated.
                record(&failed_step_log, "c3");
                Ok(())
            },
        );

        let failure = saga.execute().await.err().unwrap();
        assert_eq!(failure.step, "third");
        assert_eq!(failure.error, "boom");
        assert_eq!(*log.lock().unwrap(), vec!["a1", "a2", "c2", "c1"]);
    }

    #[tokio::test]
    async fn compensation_failure_does_not_stop_the_unwind() {
        let unwound = Arc::new(AtomicU32::new(0));
        let mut saga: Saga<String> = Saga::new("test");

        let counter = unwound.clone();
        saga.step(
            "first",
            || async { Ok(()) },
            move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        );
        saga.step(
            "second",
            || async { Ok(()) },
            || async { Err("compensation down".to_string()) },
        );
        saga.step("third", || async { Err("boom".to_string()) }, || async {
            Ok(())
        });

        let failure = saga.execute().await.err().unwrap();
        // The original error survives a failed compensation...
        assert_eq!(failure.error, "boom");
        // ...and earlier compensations still run.
        assert_eq!(unwound.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn completed_saga_can_unwind_later() {
        let unwound = Arc::new(AtomicU32::new(0));
        let mut saga: Saga<String> = Saga::new("test");

        for name in ["first", "second"] {
            let counter = unwound.clone();
            saga.step(
                name,
                || async { Ok(()) },
                move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                },
            );
        }
        saga.step_without_compensation("commitless", || async { Ok(()) });

        let completed = saga.execute().await.map_err(|f| f.step).unwrap();
        assert_eq!(unwound.load(Ordering::SeqCst), 0);

        completed.compensate().await;
        assert_eq!(unwound.load(Ordering::SeqCst), 2);
    }
}
