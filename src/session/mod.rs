//! Session coordination
//!
//! - `state`: the session value and its transition function
//! - `timers`: cancellable delayed callbacks
//! - `controller`: runs transitions and performs their side effects

pub mod controller;
pub mod state;
pub mod timers;

pub use controller::SessionController;
pub use state::{Effect, GameSession, PauseHolds, PauseReason, Phase, SessionEvent, transition};
pub use timers::{Scheduler, TimerHandle, TimerKind};
