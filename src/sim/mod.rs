//! Target motion simulator
//!
//! Message passing only:
//! - `init` establishes authoritative state, once per instance
//! - `animate` requests one step, `pause` suspends stepping
//! - `update` reports positions once they moved past the threshold
//!
//! Instances are tagged with a generation so a replaced instance's late
//! reports can be recognised and dropped.

pub mod motion;
pub mod protocol;
pub mod worker;

pub use motion::{MotionState, Simulator};
pub use protocol::{
    Bounds, Envelope, Generation, PayloadError, SimCommand, SimInit, SimReport, SimTarget,
    validate_positions,
};
pub use worker::{InlineSpawner, SimulatorLink, Spawn, ThreadSpawner};
