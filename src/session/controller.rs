//! Session controller
//!
//! Owns the session, the roster mirror and the live simulator handle. Hosts feed
//! it input (pointer, focus, frames) and it drives rendering and audio through
//! the ports. Everything here runs on the host's single control thread; only the
//! simulator lives elsewhere, and it is reached through messages.

use std::sync::mpsc::{self, Receiver, Sender};

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::state::{Effect, GameSession, PauseReason, Phase, SessionEvent, transition};
use super::timers::{Scheduler, TimerHandle, TimerKind};
use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH, INVINCIBILITY_MS, ROUND_WON_DELAY_MS};
use crate::difficulty::{DifficultyParameters, DifficultyScaler};
use crate::feedback::{BannerKind, FeedbackBanner, FeedbackOverlay};
use crate::hit::{self, Hit, PointerEvent, Viewport};
use crate::ports::{AudioPort, FrameView, RenderPort};
use crate::roster::{Roster, build_round};
use crate::settings::Settings;
use crate::sim::{
    Bounds, Envelope, Generation, SimCommand, SimInit, SimReport, SimulatorLink, Spawn,
    validate_positions,
};

/// Drives one game session
pub struct SessionController<S: Spawn, R: RenderPort, A: AudioPort> {
    session: GameSession,
    settings: Settings,
    scaler: DifficultyScaler,
    difficulty: DifficultyParameters,
    roster: Roster,
    feedback: FeedbackOverlay,
    scheduler: Scheduler,
    round_advance: Option<TimerHandle>,
    invincibility: Option<TimerHandle>,
    spawner: S,
    simulator: Option<Box<dyn SimulatorLink>>,
    generation: Generation,
    inbox: Receiver<Envelope>,
    inbox_tx: Sender<Envelope>,
    rng: Pcg32,
    next_target_id: u32,
    render: R,
    audio: A,
    /// Roster or banners changed since the last draw
    dirty: bool,
}

impl<S: Spawn, R: RenderPort, A: AudioPort> SessionController<S, R, A> {
    pub fn new(settings: Settings, spawner: S, render: R, audio: A, seed: u64) -> Self {
        let settings = settings.normalized();
        let scaler = DifficultyScaler::from_settings(&settings);
        let (inbox_tx, inbox) = mpsc::channel();
        Self {
            session: GameSession::new(),
            difficulty: scaler.parameters(0),
            scaler,
            settings,
            roster: Roster::default(),
            feedback: FeedbackOverlay::new(),
            scheduler: Scheduler::new(),
            round_advance: None,
            invincibility: None,
            spawner,
            simulator: None,
            generation: 0,
            inbox,
            inbox_tx,
            rng: Pcg32::seed_from_u64(seed),
            next_target_id: 1,
            render,
            audio,
            dirty: true,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Difficulty of the current (or last) round
    pub fn difficulty(&self) -> &DifficultyParameters {
        &self.difficulty
    }

    pub fn feedback(&self) -> &FeedbackOverlay {
        &self.feedback
    }

    /// Generation of the most recently spawned simulator
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn has_simulator(&self) -> bool {
        self.simulator.is_some()
    }

    /// Whether clicks are being ignored after a penalty
    pub fn is_invincible(&self, now: f64) -> bool {
        self.invincibility
            .and_then(|h| self.scheduler.deadline(h))
            .is_some_and(|deadline| now < deadline)
    }

    pub fn render(&self) -> &R {
        &self.render
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    /// Sender simulators post their reports to
    pub fn inbox_sender(&self) -> Sender<Envelope> {
        self.inbox_tx.clone()
    }

    pub fn start(&mut self, now: f64) {
        self.dispatch(SessionEvent::Start { now }, now);
    }

    pub fn restart(&mut self, now: f64) {
        self.dispatch(SessionEvent::Restart { now }, now);
    }

    /// Explicit pause (menu / Escape)
    pub fn pause(&mut self, now: f64) {
        self.dispatch(
            SessionEvent::Hold {
                reason: PauseReason::Explicit,
                now,
            },
            now,
        );
    }

    pub fn resume(&mut self, now: f64) {
        self.dispatch(
            SessionEvent::Release {
                reason: PauseReason::Explicit,
                now,
            },
            now,
        );
    }

    pub fn toggle_pause(&mut self, now: f64) {
        if self.session.holds.explicit {
            self.resume(now);
        } else {
            self.pause(now);
        }
    }

    pub fn focus_lost(&mut self, now: f64) {
        self.dispatch(
            SessionEvent::Hold {
                reason: PauseReason::Unfocused,
                now,
            },
            now,
        );
    }

    pub fn focus_gained(&mut self, now: f64) {
        self.dispatch(
            SessionEvent::Release {
                reason: PauseReason::Unfocused,
                now,
            },
            now,
        );
    }

    /// Advance the countdown to `now`
    pub fn tick(&mut self, now: f64) {
        self.dispatch(SessionEvent::Tick { now }, now);
    }

    /// One animation frame: timers, countdown, simulator traffic, redraw
    pub fn frame(&mut self, now: f64) {
        for (handle, kind) in self.scheduler.take_due(now) {
            match kind {
                TimerKind::RoundAdvance => {
                    if self.round_advance == Some(handle) {
                        self.round_advance = None;
                        self.dispatch(SessionEvent::RoundAdvance { now }, now);
                    }
                }
                TimerKind::InvincibilityEnd => {
                    if self.invincibility == Some(handle) {
                        self.invincibility = None;
                    }
                }
            }
        }

        if self.session.phase == Phase::Running {
            self.tick(now);
            if self.session.phase == Phase::Running {
                self.post(SimCommand::Animate { time: now });
            }
        }

        if let Some(link) = self.simulator.as_mut() {
            link.pump();
        }
        self.process_reports();

        if self.feedback.prune(now) || !self.feedback.is_empty() {
            self.dirty = true;
        }
        if self.dirty {
            self.redraw(now);
        }
    }

    /// Resolve a click against the roster and apply the result
    pub fn handle_pointer(&mut self, event: &PointerEvent, viewport: &Viewport, now: f64) -> Option<Hit> {
        if !self.session.is_interactive() {
            log::debug!("Click ignored in {:?}", self.session.phase);
            return None;
        }
        if self.is_invincible(now) {
            log::debug!("Click ignored during invincibility");
            return None;
        }

        let (at, hit) = hit::hit_test(event, viewport, &self.roster.targets)?;
        let event = match hit {
            Hit::Primary(_) => SessionEvent::PrimaryHit { at },
            Hit::Decoy(_) => SessionEvent::DecoyHit { at },
        };
        self.dispatch(event, now);
        Some(hit)
    }

    /// Apply every queued simulator report; returns how many were applied
    pub fn process_reports(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(envelope) = self.inbox.try_recv() {
            if self.apply_envelope(envelope) {
                applied += 1;
            }
        }
        applied
    }

    fn apply_envelope(&mut self, envelope: Envelope) -> bool {
        let live = self.simulator.as_ref().map(|link| link.generation());
        if live != Some(envelope.generation) {
            log::debug!("Dropping report from stale simulator {}", envelope.generation);
            return false;
        }

        let SimReport::Update { positions } = envelope.report;
        if let Err(e) = validate_positions(&positions, self.roster.len()) {
            log::warn!(
                "Simulator {} sent a bad update ({}), shutting it down",
                envelope.generation,
                e
            );
            self.terminate_simulator();
            return false;
        }

        // Fully validated before any target is touched
        self.roster.apply_positions(&positions);
        self.dirty = true;
        true
    }

    fn dispatch(&mut self, event: SessionEvent, now: f64) {
        let before = self.session.phase;
        let effects = transition(&mut self.session, event);
        if self.session.phase != before {
            log::info!(
                "{:?} -> {:?} (score {}, {:.2}s left)",
                before,
                self.session.phase,
                self.session.score,
                self.session.time_remaining
            );
        }
        for effect in effects {
            self.execute(effect, now);
        }
    }

    fn execute(&mut self, effect: Effect, now: f64) {
        match effect {
            Effect::SpawnRound => self.spawn_round(),
            Effect::TerminateSimulator => self.terminate_simulator(),
            Effect::PauseSimulator(paused) => self.post(SimCommand::Pause { paused }),
            Effect::KeepPrimaryOnly => {
                self.roster.keep_primary_only();
                self.dirty = true;
            }
            Effect::ClearRoster => {
                self.roster.clear();
                self.dirty = true;
            }
            Effect::ScheduleRoundAdvance => {
                if let Some(old) = self.round_advance.take() {
                    self.scheduler.cancel(old);
                }
                self.round_advance =
                    Some(self.scheduler.schedule(now, ROUND_WON_DELAY_MS, TimerKind::RoundAdvance));
            }
            Effect::BeginInvincibility => {
                if let Some(old) = self.invincibility.take() {
                    self.scheduler.cancel(old);
                }
                self.invincibility = Some(self.scheduler.schedule(
                    now,
                    INVINCIBILITY_MS,
                    TimerKind::InvincibilityEnd,
                ));
            }
            Effect::CancelTimers => {
                self.scheduler.cancel_all();
                self.round_advance = None;
                self.invincibility = None;
            }
            Effect::Overlay(overlay, visible) => self.render.set_overlay(overlay, visible),
            Effect::Banner { kind, seconds, at } => {
                let banner = match kind {
                    BannerKind::Bonus => FeedbackBanner::bonus(at, seconds, now),
                    BannerKind::Penalty => FeedbackBanner::penalty(at, seconds, now),
                };
                self.feedback.push(banner);
                self.dirty = true;
            }
            Effect::Sound(cue) => {
                if self.settings.sfx {
                    self.audio.play(cue);
                }
            }
            Effect::TimerChanged => self.render.update_timer(self.session.time_remaining),
            Effect::ScoreChanged => self.render.update_score(self.session.score),
        }
    }

    fn spawn_round(&mut self) {
        self.terminate_simulator();

        self.difficulty = self.scaler.parameters(self.session.score);
        let (roster, targets) = build_round(
            &self.settings,
            &self.difficulty,
            &mut self.rng,
            &mut self.next_target_id,
        );
        self.roster = roster;
        self.dirty = true;

        self.generation += 1;
        let mut link = self.spawner.spawn(self.generation, self.inbox_tx.clone());
        let init = SimInit {
            targets,
            bounds: Bounds {
                w: CANVAS_WIDTH,
                h: CANVAS_HEIGHT,
            },
            movement_threshold: self.settings.movement_threshold,
            use_interpolation: self.settings.use_interpolation,
        };
        if !link.post(SimCommand::Init(init)) {
            log::warn!("Simulator {} refused init", self.generation);
        }
        self.simulator = Some(link);

        log::info!(
            "Round {} with {} targets ({}..={}), simulator {}",
            self.session.score + 1,
            self.roster.len(),
            self.difficulty.min_count,
            self.difficulty.max_count,
            self.generation
        );
    }

    fn terminate_simulator(&mut self) {
        if let Some(mut link) = self.simulator.take() {
            link.terminate();
            log::debug!("Simulator {} terminated", link.generation());
        }
    }

    fn post(&mut self, command: SimCommand) {
        let delivered = match self.simulator.as_mut() {
            Some(link) => link.post(command),
            None => return,
        };
        if !delivered {
            log::warn!("Simulator {} is gone, dropping it", self.generation);
            self.terminate_simulator();
        }
    }

    fn redraw(&mut self, now: f64) {
        let frame = FrameView {
            targets: self.roster.in_draw_order().collect(),
            banners: self.feedback.views(now),
        };
        self.render.draw(&frame);
        self.dirty = false;
    }
}
