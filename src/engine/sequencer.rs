// src/engine/sequencer.rs

use std::future::{self, Future};

use chrono::TimeDelta;
use tracing::{debug, info};

use crate::engine::clock::VirtualClock;
use crate::engine::dispatch::Dispatcher;
use crate::engine::RunReport;
use crate::sequence::{Action, Sequence};
use crate::types::ActionKind;

/// Replays a [`Sequence`] against a [`VirtualClock`].
///
/// One control loop walks the time-ordered actions:
///
/// 1. `delay = action.time - clock.now()`.
/// 2. Negative delay: the action is skipped and never dispatched.
/// 3. Otherwise sleep for `delay`, hand the action to the dispatcher and move
///    on without waiting for it.
pub struct Sequencer<D: Dispatcher> {
    actions: Vec<Action>,
    clock: VirtualClock,
    dispatcher: D,
}

impl<D: Dispatcher> std::fmt::Debug for Sequencer<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequencer")
            .field("pending", &self.actions.len())
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl<D: Dispatcher> Sequencer<D> {
    /// Build a sequencer over `sequence`, dropping actions whose kind is in
    /// `disabled`.
    pub fn new(
        sequence: &Sequence,
        disabled: &[ActionKind],
        clock: VirtualClock,
        dispatcher: D,
    ) -> Self {
        let actions = sequence.filtered(disabled);
        debug!(
            total = sequence.len(),
            scheduled = actions.len(),
            ?disabled,
            "sequencer prepared"
        );
        Self {
            actions,
            clock,
            dispatcher,
        }
    }

    /// Actions still to be processed.
    pub fn pending(&self) -> &[Action] {
        &self.actions
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn into_dispatcher(self) -> D {
        self.dispatcher
    }

    /// Run to the end of the sequence.
    pub async fn run(&mut self) -> RunReport {
        self.run_until(future::pending::<()>()).await
    }

    /// Run until the end of the sequence or until `shutdown` completes,
    /// whichever comes first.
    pub async fn run_until<F>(&mut self, shutdown: F) -> RunReport
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut report = RunReport::default();
        let actions = std::mem::take(&mut self.actions);
        info!(actions = actions.len(), "sequencer started");

        let mut remaining = actions.into_iter();
        while let Some(action) = remaining.next() {
            let delay = action.time() - self.clock.now();

            if delay < TimeDelta::zero() {
                debug!(
                    kind = %action.kind(),
                    scheduled = %action.time(),
                    late_ms = -delay.num_milliseconds(),
                    "action time already passed; skipping"
                );
                report.skipped += 1;
                continue;
            }

            let wait = delay.to_std().unwrap_or_default();
            if !wait.is_zero() {
                debug!(
                    kind = %action.kind(),
                    delay_ms = delay.num_milliseconds(),
                    "waiting for next action"
                );

                tokio::select! {
                    _ = tokio::time::sleep(wait) => {}
                    _ = &mut shutdown => {
                        info!("shutdown requested; stopping sequencer");
                        report.interrupted = true;
                        self.actions = std::iter::once(action).chain(remaining).collect();
                        break;
                    }
                }
            }

            debug!(kind = %action.kind(), comment = %action.comment(), "dispatching");
            self.dispatcher.dispatch(action);
            report.dispatched += 1;
        }

        info!(
            dispatched = report.dispatched,
            skipped = report.skipped,
            interrupted = report.interrupted,
            "sequencer finished"
        );
        report
    }
}
