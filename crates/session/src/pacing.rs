//! Wall-clock pacing for recorded detector output.

use handweave_common::clock::SessionClock;
use handweave_common::error::HandweaveResult;
use handweave_gesture::LandmarkSource;
use handweave_model::landmark::DetectionSample;

/// Releases samples from an inner source no earlier than their timestamps,
/// measured from the first sample and the moment pacing started.
pub struct PacedSource<S> {
    inner: S,
    clock: SessionClock,
    base_ns: Option<u64>,
    pending: Option<DetectionSample>,
}

impl<S: LandmarkSource> PacedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            clock: SessionClock::start(),
            base_ns: None,
            pending: None,
        }
    }

    fn due(&mut self, sample: &DetectionSample) -> bool {
        let base = *self.base_ns.get_or_insert(sample.timestamp_ns);
        sample.timestamp_ns.saturating_sub(base) <= self.clock.elapsed_ns()
    }
}

impl<S: LandmarkSource> LandmarkSource for PacedSource<S> {
    fn poll(&mut self) -> HandweaveResult<Option<DetectionSample>> {
        let sample = match self.pending.take() {
            Some(sample) => sample,
            None => match self.inner.poll()? {
                Some(sample) => sample,
                None => return Ok(None),
            },
        };

        if self.due(&sample) {
            Ok(Some(sample))
        } else {
            self.pending = Some(sample);
            Ok(None)
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_exhausted(&self) -> bool {
        self.pending.is_none() && self.inner.is_exhausted()
    }
}
