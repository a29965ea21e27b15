//! The detection cycle: one sample in, at most one formation transition out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use handweave_choreography::{FormationCatalog, FormationController, FormationState, TargetSet};
use handweave_common::config::AppConfig;
use handweave_common::error::HandweaveResult;
use handweave_gesture::{GestureClassifier, GestureUpdate, LandmarkSource};
use handweave_model::gesture::GestureReading;
use handweave_model::landmark::DetectionSample;
use handweave_model::spatial::Vec3;
use serde::Serialize;
use tokio::sync::watch;

/// What a single detection cycle did with its sample.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// No hand in frame; the last gesture is retained.
    NoHand,
    /// Frame rejected; the last gesture is retained.
    Malformed,
    Classified {
        update: GestureUpdate,
        /// New targets if the gesture caused a formation change.
        transition: Option<Arc<TargetSet>>,
    },
}

impl CycleOutcome {
    pub fn transition(&self) -> Option<&Arc<TargetSet>> {
        match self {
            Self::Classified { transition, .. } => transition.as_ref(),
            _ => None,
        }
    }
}

/// Running counters for the detection side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DetectionStats {
    pub samples: u64,
    pub hands: u64,
    pub no_hand: u64,
    pub malformed: u64,
    pub gesture_changes: u64,
    pub transitions: u64,
    pub source_errors: u64,
}

/// Classifier plus formation controller.
pub struct DetectionCycle {
    classifier: GestureClassifier,
    controller: FormationController,
    stats: DetectionStats,
}

impl DetectionCycle {
    pub fn new(classifier: GestureClassifier, controller: FormationController) -> Self {
        Self {
            classifier,
            controller,
            stats: DetectionStats::default(),
        }
    }

    /// Build the catalog and both stages from configuration.
    pub fn from_config(config: &AppConfig) -> HandweaveResult<Self> {
        config.validate()?;
        let catalog = FormationCatalog::generate(&config.formation)?;
        let controller = FormationController::new(
            Arc::new(catalog),
            Vec3::from_array(config.motion.camera_rest),
        );
        Ok(Self::new(
            GestureClassifier::new(&config.classifier),
            controller,
        ))
    }

    /// Run one cycle on a sample.
    pub fn process(&mut self, sample: &DetectionSample) -> CycleOutcome {
        self.stats.samples += 1;

        let frame = match sample.landmark_frame() {
            None => {
                self.stats.no_hand += 1;
                return CycleOutcome::NoHand;
            }
            Some(Err(e)) => {
                self.stats.malformed += 1;
                tracing::warn!(t = sample.timestamp_ns, error = %e, "Dropping malformed frame");
                return CycleOutcome::Malformed;
            }
            Some(Ok(frame)) => frame,
        };
        self.stats.hands += 1;

        let update = self.classifier.update(&frame);
        let transition = if update.changed {
            self.stats.gesture_changes += 1;
            self.controller.on_gesture_changed(update.reading.gesture)
        } else {
            None
        };
        if transition.is_some() {
            self.stats.transitions += 1;
        }

        CycleOutcome::Classified { update, transition }
    }

    pub fn gesture(&self) -> GestureReading {
        self.classifier.last()
    }

    pub fn targets(&self) -> Arc<TargetSet> {
        self.controller.targets()
    }

    pub fn state(&self) -> FormationState {
        self.controller.state()
    }

    pub fn controller(&self) -> &FormationController {
        &self.controller
    }

    pub fn stats(&self) -> DetectionStats {
        self.stats
    }

    fn record_source_error(&mut self) {
        self.stats.source_errors += 1;
    }
}

/// Polls a source and publishes gesture and target changes until stopped.
pub struct DetectionTask {
    cycle: DetectionCycle,
    source: Box<dyn LandmarkSource>,
    targets_tx: watch::Sender<Arc<TargetSet>>,
    gesture_tx: watch::Sender<GestureReading>,
    stop_flag: Arc<AtomicBool>,
    poll_interval: Duration,
}

impl DetectionTask {
    pub fn new(
        cycle: DetectionCycle,
        source: Box<dyn LandmarkSource>,
        targets_tx: watch::Sender<Arc<TargetSet>>,
        gesture_tx: watch::Sender<GestureReading>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            cycle,
            source,
            targets_tx,
            gesture_tx,
            stop_flag: Arc::new(AtomicBool::new(false)),
            poll_interval,
        }
    }

    /// Run until the stop flag is set or the source is exhausted.
    pub async fn run(mut self) -> HandweaveResult<DetectionStats> {
        tracing::info!(source = %self.source.name(), "Detection task started");

        while !self.stop_flag.load(Ordering::Relaxed) {
            match self.source.poll() {
                Ok(Some(sample)) => {
                    self.handle(&sample);
                    // Let the render task run between back-to-back samples.
                    tokio::task::yield_now().await;
                }
                Ok(None) if self.source.is_exhausted() => {
                    tracing::info!("Landmark source exhausted");
                    break;
                }
                Ok(None) => {
                    tokio::time::sleep(self.poll_interval).await;
                }
                Err(e) => {
                    self.cycle.record_source_error();
                    tracing::warn!(error = %e, "Landmark source error");
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }

        let stats = self.cycle.stats();
        tracing::info!(
            samples = stats.samples,
            transitions = stats.transitions,
            "Detection task stopped"
        );
        Ok(stats)
    }

    fn handle(&mut self, sample: &DetectionSample) {
        if let CycleOutcome::Classified { update, transition } = self.cycle.process(sample) {
            // Targets first, so gesture subscribers see the matching state.
            if let Some(targets) = transition {
                self.targets_tx.send_replace(targets);
            }
            // The controller only reacts to gesture changes, but a moving
            // pinch still updates the published center.
            self.gesture_tx.send_if_modified(|current| {
                if *current == update.reading {
                    return false;
                }
                *current = update.reading;
                true
            });
        }
    }

    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handweave_common::config::FormationSettings;
    use handweave_gesture::synthetic::SyntheticHand;
    use handweave_gesture::ScriptedSource;
    use handweave_model::landmark::Landmark;
    use handweave_model::Gesture;

    fn cycle() -> DetectionCycle {
        let catalog = FormationCatalog::generate(&FormationSettings::default()).unwrap();
        let controller =
            FormationController::with_seed(Arc::new(catalog), Vec3::new(0.0, 0.0, 3000.0), 3);
        DetectionCycle::new(GestureClassifier::with_defaults(), controller)
    }

    #[test]
    fn test_no_hand_retains_gesture() {
        let mut cycle = cycle();
        cycle.process(&SyntheticHand::fist().sample(0));
        assert!(matches!(
            cycle.process(&DetectionSample::no_hand(1)),
            CycleOutcome::NoHand
        ));
        assert_eq!(cycle.gesture().gesture, Gesture::Fist);
        assert_eq!(cycle.state(), FormationState::Clustered);
    }

    #[test]
    fn test_malformed_frame_is_dropped() {
        let mut cycle = cycle();
        cycle.process(&SyntheticHand::open().sample(0));
        let short = DetectionSample::hand(1, vec![Landmark::new(0.5, 0.5, 0.0); 5]);
        assert!(matches!(cycle.process(&short), CycleOutcome::Malformed));
        assert_eq!(cycle.gesture().gesture, Gesture::OpenPalm);
        assert_eq!(cycle.stats().malformed, 1);
    }

    #[test]
    fn test_transition_only_on_change() {
        let mut cycle = cycle();
        let first = cycle.process(&SyntheticHand::fist().sample(0));
        assert!(first.transition().is_some());
        let second = cycle.process(&SyntheticHand::fist().sample(1));
        assert!(second.transition().is_none());
        assert_eq!(cycle.stats().transitions, 1);
        assert_eq!(cycle.stats().hands, 2);
    }

    #[tokio::test]
    async fn test_task_publishes_and_finishes_on_exhausted_source() {
        let cycle = cycle();
        let (targets_tx, targets_rx) = watch::channel(cycle.targets());
        let (gesture_tx, gesture_rx) = watch::channel(cycle.gesture());
        let source = ScriptedSource::new(vec![
            SyntheticHand::open().sample(0),
            DetectionSample::no_hand(1),
            SyntheticHand::pinch_at(0.4, 0.4).sample(2),
        ]);
        let task = DetectionTask::new(
            cycle,
            Box::new(source),
            targets_tx,
            gesture_tx,
            Duration::from_millis(1),
        );

        let stats = task.run().await.unwrap();
        assert_eq!(stats.samples, 3);
        assert_eq!(stats.transitions, 2);
        assert_eq!(targets_rx.borrow().state, FormationState::Focused);
        assert_eq!(gesture_rx.borrow().gesture, Gesture::Pinch);
    }

    #[tokio::test]
    async fn test_task_publishes_moving_pinch_center() {
        let cycle = cycle();
        let (targets_tx, _targets_rx) = watch::channel(cycle.targets());
        let (gesture_tx, gesture_rx) = watch::channel(cycle.gesture());
        let source = ScriptedSource::new(vec![
            SyntheticHand::pinch_at(0.4, 0.4).sample(0),
            SyntheticHand::pinch_at(0.7, 0.7).sample(1),
        ]);
        let task = DetectionTask::new(
            cycle,
            Box::new(source),
            targets_tx,
            gesture_tx,
            Duration::from_millis(1),
        );

        let stats = task.run().await.unwrap();
        assert_eq!(stats.gesture_changes, 1);
        let center = gesture_rx.borrow().pinch_center.unwrap();
        assert!((center.x - 0.7).abs() < 1e-9);
        assert!((center.y - 0.7).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_task_finishes_when_source_read_fails() {
        let dir = std::env::temp_dir().join("handweave_test_cycle_dir");
        std::fs::create_dir_all(&dir).unwrap();
        let source = handweave_gesture::ReplaySource::open(&dir).unwrap();

        let cycle = cycle();
        let (targets_tx, _targets_rx) = watch::channel(cycle.targets());
        let (gesture_tx, _gesture_rx) = watch::channel(cycle.gesture());
        let task = DetectionTask::new(
            cycle,
            Box::new(source),
            targets_tx,
            gesture_tx,
            Duration::from_millis(1),
        );

        let stats = tokio::time::timeout(Duration::from_secs(5), task.run())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stats.source_errors, 1);
        assert_eq!(stats.samples, 0);
    }
}
