//! Session state and transitions
//!
//! `transition` only mutates the `GameSession` value and describes the side
//! effects it wants; the controller performs them (spawning simulators,
//! drawing, scheduling). Timestamps are frame-clock milliseconds.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{MAX_TIME, START_TIME, TIME_BONUS, TIME_PENALTY};
use crate::feedback::BannerKind;
use crate::ports::{Overlay, SoundCue};

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Not started yet
    Idle,
    /// Countdown running, targets moving
    Running,
    /// Countdown and motion suspended
    Paused,
    /// Primary found; frozen until the next round starts
    RoundWon,
    /// Time ran out; only a restart leaves this phase
    GameOver,
}

/// Why the session is held in `Paused`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseReason {
    /// Pause menu / Escape
    Explicit,
    /// Window lost focus
    Unfocused,
}

/// Active pause reasons; the session resumes once none hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PauseHolds {
    pub explicit: bool,
    pub unfocused: bool,
}

impl PauseHolds {
    pub fn any(&self) -> bool {
        self.explicit || self.unfocused
    }

    fn flag(&mut self, reason: PauseReason) -> &mut bool {
        match reason {
            PauseReason::Explicit => &mut self.explicit,
            PauseReason::Unfocused => &mut self.unfocused,
        }
    }
}

/// The game session
#[derive(Debug, Clone, PartialEq)]
pub struct GameSession {
    pub phase: Phase,
    pub score: u32,
    /// Seconds, always within [0, MAX_TIME]
    pub time_remaining: f32,
    /// Countdown baseline; `None` until the first tick after entering `Running`
    pub last_tick: Option<f64>,
    /// When the current pause began
    pub paused_at: Option<f64>,
    pub holds: PauseHolds,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            score: 0,
            time_remaining: START_TIME,
            last_tick: None,
            paused_at: None,
            holds: PauseHolds::default(),
        }
    }

    /// Whether pointer input can affect the session
    pub fn is_interactive(&self) -> bool {
        self.phase == Phase::Running
    }
}

/// Inputs to the state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    Start { now: f64 },
    Hold { reason: PauseReason, now: f64 },
    Release { reason: PauseReason, now: f64 },
    Tick { now: f64 },
    /// Primary target clicked at a canvas point
    PrimaryHit { at: Vec2 },
    /// Decoy clicked at a canvas point
    DecoyHit { at: Vec2 },
    /// Auto-advance after the round-won freeze
    RoundAdvance { now: f64 },
    Restart { now: f64 },
}

/// Side effects requested by a transition, in execution order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Build a new roster and start a fresh simulator for it
    SpawnRound,
    TerminateSimulator,
    PauseSimulator(bool),
    /// Discard every decoy from the roster
    KeepPrimaryOnly,
    ClearRoster,
    ScheduleRoundAdvance,
    BeginInvincibility,
    CancelTimers,
    Overlay(Overlay, bool),
    Banner { kind: BannerKind, seconds: f32, at: Vec2 },
    Sound(SoundCue),
    TimerChanged,
    ScoreChanged,
}

/// Apply `event` to `session`, returning the side effects to perform
pub fn transition(session: &mut GameSession, event: SessionEvent) -> Vec<Effect> {
    let mut effects = Vec::new();

    match event {
        SessionEvent::Start { now } => {
            if session.phase != Phase::Idle {
                return effects;
            }
            session.score = 0;
            session.time_remaining = START_TIME;
            enter_round(session, now, &mut effects);
            effects.push(Effect::TimerChanged);
            effects.push(Effect::ScoreChanged);
        }

        SessionEvent::Hold { reason, now } => {
            let active = matches!(session.phase, Phase::Running | Phase::Paused);
            if reason == PauseReason::Explicit && !active {
                return effects;
            }
            let flag = session.holds.flag(reason);
            if *flag {
                return effects;
            }
            *flag = true;

            if session.phase == Phase::Running {
                session.phase = Phase::Paused;
                session.paused_at = Some(now);
                effects.push(Effect::PauseSimulator(true));
            }
            if active {
                effects.push(Effect::Overlay(overlay_for(reason), true));
            }
        }

        SessionEvent::Release { reason, now } => {
            let flag = session.holds.flag(reason);
            if !*flag {
                return effects;
            }
            *flag = false;
            effects.push(Effect::Overlay(overlay_for(reason), false));

            if session.phase == Phase::Paused && !session.holds.any() {
                session.phase = Phase::Running;
                // Shift the baseline so paused wall time is never charged
                if let (Some(last), Some(paused_at)) = (session.last_tick, session.paused_at) {
                    session.last_tick = Some(last + (now - paused_at).max(0.0));
                }
                session.paused_at = None;
                effects.push(Effect::PauseSimulator(false));
            }
        }

        SessionEvent::Tick { now } => {
            if session.phase != Phase::Running {
                return effects;
            }
            let Some(last) = session.last_tick else {
                session.last_tick = Some(now);
                return effects;
            };
            let elapsed = ((now - last) / 1000.0).max(0.0) as f32;
            if elapsed == 0.0 {
                return effects;
            }
            session.last_tick = Some(now);
            session.time_remaining = (session.time_remaining - elapsed).max(0.0);
            effects.push(Effect::TimerChanged);
            if session.time_remaining <= 0.0 {
                game_over(session, &mut effects);
            }
        }

        SessionEvent::PrimaryHit { at } => {
            if session.phase != Phase::Running {
                return effects;
            }
            session.time_remaining = (session.time_remaining + TIME_BONUS).min(MAX_TIME);
            session.score += 1;
            session.phase = Phase::RoundWon;
            session.last_tick = None;
            effects.extend([
                Effect::TerminateSimulator,
                Effect::KeepPrimaryOnly,
                Effect::Banner {
                    kind: BannerKind::Bonus,
                    seconds: TIME_BONUS,
                    at,
                },
                Effect::Sound(SoundCue::Caught),
                Effect::TimerChanged,
                Effect::ScoreChanged,
                Effect::ScheduleRoundAdvance,
            ]);
        }

        SessionEvent::DecoyHit { at } => {
            if session.phase != Phase::Running {
                return effects;
            }
            session.time_remaining = (session.time_remaining - TIME_PENALTY).max(0.0);
            effects.extend([
                Effect::Banner {
                    kind: BannerKind::Penalty,
                    seconds: TIME_PENALTY,
                    at,
                },
                Effect::Sound(SoundCue::Penalty),
                Effect::TimerChanged,
            ]);
            if session.time_remaining <= 0.0 {
                game_over(session, &mut effects);
            } else {
                effects.push(Effect::BeginInvincibility);
            }
        }

        SessionEvent::RoundAdvance { now } => {
            if session.phase != Phase::RoundWon {
                return effects;
            }
            enter_round(session, now, &mut effects);
        }

        SessionEvent::Restart { now } => {
            effects.extend([
                Effect::CancelTimers,
                Effect::TerminateSimulator,
                Effect::ClearRoster,
                Effect::Overlay(Overlay::GameOver, false),
            ]);
            if session.holds.explicit {
                session.holds.explicit = false;
                effects.push(Effect::Overlay(Overlay::PauseMenu, false));
            }
            // A won round carries its score and time into the next one
            if session.phase != Phase::RoundWon {
                session.score = 0;
                session.time_remaining = START_TIME;
            }
            enter_round(session, now, &mut effects);
            effects.push(Effect::TimerChanged);
            effects.push(Effect::ScoreChanged);
        }
    }

    effects
}

fn overlay_for(reason: PauseReason) -> Overlay {
    match reason {
        PauseReason::Explicit => Overlay::PauseMenu,
        PauseReason::Unfocused => Overlay::Unfocused,
    }
}

/// Spawn a round and enter `Running`, or `Paused` if a hold is already active
fn enter_round(session: &mut GameSession, now: f64, effects: &mut Vec<Effect>) {
    session.last_tick = None;
    session.paused_at = None;
    effects.push(Effect::SpawnRound);

    if session.holds.any() {
        session.phase = Phase::Paused;
        session.paused_at = Some(now);
        effects.push(Effect::PauseSimulator(true));
        if session.holds.unfocused {
            effects.push(Effect::Overlay(Overlay::Unfocused, true));
        }
    } else {
        session.phase = Phase::Running;
    }
}

fn game_over(session: &mut GameSession, effects: &mut Vec<Effect>) {
    session.time_remaining = 0.0;
    session.phase = Phase::GameOver;
    session.last_tick = None;
    session.paused_at = None;
    effects.push(Effect::TerminateSimulator);
    effects.push(Effect::Overlay(Overlay::GameOver, true));
}
