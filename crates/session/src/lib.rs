//! Handweave Session
//!
//! Runtime wiring for the two independent cycles:
//!
//! - **Detection:** one landmark sample in, classify, maybe transition,
//!   publish. Runs as fast as the source delivers samples.
//! - **Render:** a fixed-rate tick that smooths every object toward the
//!   latest published targets and emits a render frame.
//!
//! Targets cross between the two as whole immutable snapshots on a
//! `tokio::sync::watch` channel, so a tick always reads positions and
//! rotations from the same transition.
//!
//! [`OfflineDriver`] runs the same stages deterministically from sample
//! timestamps for replay and tests.

pub mod cycle;
pub mod offline;
pub mod pacing;
pub mod scheduler;
pub mod session;

pub use cycle::{CycleOutcome, DetectionCycle, DetectionStats, DetectionTask};
pub use offline::{OfflineDriver, ReplayReport, TransitionRecord};
pub use pacing::PacedSource;
pub use scheduler::{Scheduler, TickHandle};
pub use session::{ChoreographySession, SessionState, SessionSummary};
