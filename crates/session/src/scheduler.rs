//! Render tick scheduling.
//!
//! The scheduler owns a [`MotionIntegrator`] inside a tokio task and ticks
//! it at a fixed rate. Each tick reads the latest published [`TargetSet`]
//! and publishes a [`RenderFrame`]. It never waits on the detection side.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use handweave_choreography::{MotionIntegrator, RenderFrame, TargetSet};
use handweave_common::clock::SessionClock;
use handweave_common::error::{HandweaveError, HandweaveResult};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Spawns render tick loops.
pub struct Scheduler;

impl Scheduler {
    /// Start ticking at `tick_rate_hz` until the returned handle is cancelled.
    pub fn spawn(
        mut integrator: MotionIntegrator,
        targets_rx: watch::Receiver<Arc<TargetSet>>,
        frames_tx: watch::Sender<RenderFrame>,
        tick_rate_hz: u32,
        clock: SessionClock,
    ) -> TickHandle {
        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let ticks = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&ticks);
        let period = Duration::from_nanos(1_000_000_000 / u64::from(tick_rate_hz.max(1)));

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            tracing::info!(hz = tick_rate_hz, "Render scheduler started");

            loop {
                tokio::select! {
                    biased;
                    changed = cancel_rx.changed() => {
                        // A dropped handle counts as cancellation too.
                        if changed.is_err() || *cancel_rx.borrow() {
                            break;
                        }
                    }
                    _ = interval.tick() => {
                        if *cancel_rx.borrow() {
                            break;
                        }
                        let targets = Arc::clone(&targets_rx.borrow());
                        integrator.tick(&targets, clock.elapsed_secs());
                        frames_tx.send_replace(integrator.snapshot());
                        counter.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }

            tracing::info!(ticks = integrator.ticks(), "Render scheduler stopped");
            integrator
        });

        TickHandle {
            cancel_tx,
            ticks,
            task,
        }
    }
}

/// Cancellation handle for a running tick loop.
pub struct TickHandle {
    cancel_tx: watch::Sender<bool>,
    ticks: Arc<AtomicU64>,
    task: JoinHandle<MotionIntegrator>,
}

impl TickHandle {
    /// Request that no further ticks run. Idempotent.
    pub fn cancel(&self) {
        self.cancel_tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }

    /// Ticks completed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    /// Cancel and wait for the loop to exit, returning the final integrator.
    pub async fn join(self) -> HandweaveResult<MotionIntegrator> {
        self.cancel();
        self.task
            .await
            .map_err(|e| HandweaveError::scheduler(format!("tick loop join failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handweave_choreography::FormationState;
    use handweave_common::config::MotionSettings;
    use handweave_model::spatial::{Euler, Vec3};

    fn targets(x: f64, generation: u64) -> Arc<TargetSet> {
        Arc::new(TargetSet {
            positions: vec![Vec3::new(x, 0.0, 0.0)],
            rotations: vec![Euler::default()],
            generation,
            state: FormationState::Idle,
        })
    }

    fn spawn(
        initial: Arc<TargetSet>,
    ) -> (
        TickHandle,
        watch::Sender<Arc<TargetSet>>,
        watch::Receiver<RenderFrame>,
    ) {
        let integrator = MotionIntegrator::new(&initial, &MotionSettings::default());
        let (targets_tx, targets_rx) = watch::channel(initial);
        let (frames_tx, frames_rx) = watch::channel(integrator.snapshot());
        let handle = Scheduler::spawn(
            integrator,
            targets_rx,
            frames_tx,
            200,
            SessionClock::start(),
        );
        (handle, targets_tx, frames_rx)
    }

    #[tokio::test]
    async fn test_ticks_publish_frames() {
        let (handle, _targets_tx, mut frames_rx) = spawn(targets(0.0, 0));
        frames_rx.changed().await.unwrap();
        assert!(frames_rx.borrow().tick >= 1);
        handle.join().await.unwrap();
    }

    #[tokio::test]
    async fn test_no_ticks_after_cancel() {
        let (handle, _targets_tx, _frames_rx) = spawn(targets(0.0, 0));
        tokio::time::sleep(Duration::from_millis(30)).await;
        let at_cancel = handle.ticks();
        handle.cancel();
        assert!(handle.is_cancelled());

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(handle.ticks(), at_cancel);
        let integrator = handle.join().await.unwrap();
        assert_eq!(integrator.ticks(), at_cancel);
    }

    #[tokio::test]
    async fn test_picks_up_new_targets() {
        let (handle, targets_tx, mut frames_rx) = spawn(targets(0.0, 0));
        targets_tx.send_replace(targets(1000.0, 1));

        loop {
            frames_rx.changed().await.unwrap();
            if frames_rx.borrow().objects[0].position.x > 0.0 {
                break;
            }
        }

        let integrator = handle.join().await.unwrap();
        assert!(integrator.max_distance_to(&targets(1000.0, 1)) < 1000.0);
    }
}
