//! Authoritative target motion
//!
//! Runs on the simulator's execution unit and never touches controller state.
//! Targets bounce inside the bounds; positions are only reported once they have
//! moved far enough to be worth a redraw.

use glam::Vec2;

use super::protocol::{Bounds, SimCommand, SimInit, SimReport, SimTarget};
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

/// Motion state established by `init`
#[derive(Debug, Clone)]
pub struct MotionState {
    targets: Vec<SimTarget>,
    /// Positions at the previous fixed step (interpolation only)
    previous: Vec<Vec2>,
    /// Positions in the last emitted update
    last_emitted: Vec<Vec2>,
    bounds: Bounds,
    movement_threshold: f32,
    use_interpolation: bool,
    last_time: Option<f64>,
    accumulator: f32,
    paused: bool,
}

impl MotionState {
    pub fn new(init: SimInit) -> Self {
        let positions: Vec<Vec2> = init.targets.iter().map(|t| t.pos).collect();
        Self {
            targets: init.targets,
            previous: positions.clone(),
            last_emitted: positions,
            bounds: init.bounds,
            movement_threshold: init.movement_threshold,
            use_interpolation: init.use_interpolation,
            last_time: None,
            accumulator: 0.0,
            paused: false,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn targets(&self) -> &[SimTarget] {
        &self.targets
    }

    /// Suspend or resume stepping; state is kept either way
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused == paused {
            return;
        }
        self.paused = paused;
        // Re-baseline on the next animate so paused wall time is not simulated
        self.last_time = None;
    }

    /// Advance to `time` (ms). Returns positions when they moved past the threshold.
    pub fn animate(&mut self, time: f64) -> Option<Vec<Vec2>> {
        if self.paused {
            return None;
        }
        let Some(last) = self.last_time.replace(time) else {
            return None;
        };
        let dt = ((time - last) / 1000.0).max(0.0) as f32;
        if dt == 0.0 {
            return None;
        }

        if self.use_interpolation {
            self.accumulator = (self.accumulator + dt).min(SIM_DT * MAX_SUBSTEPS as f32);
            while self.accumulator >= SIM_DT {
                self.previous.clear();
                self.previous.extend(self.targets.iter().map(|t| t.pos));
                self.step(SIM_DT);
                self.accumulator -= SIM_DT;
            }
        } else {
            self.step(dt.min(MAX_FRAME_DT));
        }

        let positions = self.positions();
        let moved: f32 = positions
            .iter()
            .zip(&self.last_emitted)
            .map(|(now, then)| now.distance(*then))
            .sum();
        if moved > self.movement_threshold {
            self.last_emitted.clone_from(&positions);
            Some(positions)
        } else {
            None
        }
    }

    /// Current positions, blended between fixed steps when interpolating
    pub fn positions(&self) -> Vec<Vec2> {
        if self.use_interpolation {
            let alpha = self.accumulator / SIM_DT;
            self.previous
                .iter()
                .zip(&self.targets)
                .map(|(prev, t)| prev.lerp(t.pos, alpha))
                .collect()
        } else {
            self.targets.iter().map(|t| t.pos).collect()
        }
    }

    fn step(&mut self, dt: f32) {
        let bounds = Vec2::new(self.bounds.w, self.bounds.h);
        for target in &mut self.targets {
            target.pos += target.vel * dt;
            let max = (bounds - target.size).max(Vec2::ZERO);

            if target.pos.x <= 0.0 {
                target.pos.x = 0.0;
                target.vel.x = target.vel.x.abs();
            } else if target.pos.x >= max.x {
                target.pos.x = max.x;
                target.vel.x = -target.vel.x.abs();
            }

            if target.pos.y <= 0.0 {
                target.pos.y = 0.0;
                target.vel.y = target.vel.y.abs();
            } else if target.pos.y >= max.y {
                target.pos.y = max.y;
                target.vel.y = -target.vel.y.abs();
            }
        }
    }
}

/// Message handler for one simulator instance
#[derive(Debug, Default)]
pub struct Simulator {
    state: Option<MotionState>,
}

impl Simulator {
    pub fn new() -> Self {
        Self { state: None }
    }

    pub fn state(&self) -> Option<&MotionState> {
        self.state.as_ref()
    }

    /// Process one command, possibly producing a report
    pub fn handle(&mut self, command: SimCommand) -> Option<SimReport> {
        match command {
            SimCommand::Init(init) => {
                if self.state.is_some() {
                    log::warn!("Simulator already initialized, ignoring init");
                    return None;
                }
                log::debug!("Simulator init with {} targets", init.targets.len());
                self.state = Some(MotionState::new(init));
                None
            }
            SimCommand::Animate { time } => {
                let state = self.state.as_mut()?;
                state
                    .animate(time)
                    .map(|positions| SimReport::Update { positions })
            }
            SimCommand::Pause { paused } => {
                if let Some(state) = self.state.as_mut() {
                    state.set_paused(paused);
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init(targets: Vec<SimTarget>, threshold: f32, interpolate: bool) -> SimInit {
        SimInit {
            targets,
            bounds: Bounds { w: 960.0, h: 540.0 },
            movement_threshold: threshold,
            use_interpolation: interpolate,
        }
    }

    fn target(pos: Vec2, vel: Vec2) -> SimTarget {
        SimTarget {
            pos,
            vel,
            size: Vec2::new(60.0, 83.0),
        }
    }

    #[test]
    fn test_first_animate_only_baselines() {
        let mut state = MotionState::new(init(
            vec![target(Vec2::new(100.0, 100.0), Vec2::new(50.0, 0.0))],
            0.0,
            false,
        ));
        assert!(state.animate(1000.0).is_none());
        let positions = state.animate(1100.0).unwrap();
        assert!((positions[0].x - 105.0).abs() < 1e-3);
    }

    #[test]
    fn test_bounces_off_right_edge() {
        let mut state = MotionState::new(init(
            vec![target(Vec2::new(895.0, 10.0), Vec2::new(100.0, 0.0))],
            0.0,
            false,
        ));
        state.animate(0.0);
        let positions = state.animate(100.0).unwrap();
        assert_eq!(positions[0].x, 960.0 - 60.0);
        assert!(state.targets()[0].vel.x < 0.0);
    }

    #[test]
    fn test_bounces_off_top_edge() {
        let mut state = MotionState::new(init(
            vec![target(Vec2::new(10.0, 2.0), Vec2::new(0.0, -100.0))],
            0.0,
            false,
        ));
        state.animate(0.0);
        state.animate(100.0);
        assert_eq!(state.targets()[0].pos.y, 0.0);
        assert!(state.targets()[0].vel.y > 0.0);
    }

    #[test]
    fn test_large_frame_gap_is_clamped() {
        let mut state = MotionState::new(init(
            vec![target(Vec2::new(100.0, 100.0), Vec2::new(100.0, 0.0))],
            0.0,
            false,
        ));
        state.animate(0.0);
        let positions = state.animate(5000.0).unwrap();
        assert!((positions[0].x - (100.0 + 100.0 * MAX_FRAME_DT)).abs() < 1e-3);
    }

    #[test]
    fn test_threshold_suppresses_small_moves() {
        let mut state = MotionState::new(init(
            vec![target(Vec2::new(100.0, 100.0), Vec2::new(10.0, 0.0))],
            5.0,
            false,
        ));
        state.animate(0.0);
        // 10 px/s * 0.1 s = 1 px, below threshold
        assert!(state.animate(100.0).is_none());
        assert!(state.animate(200.0).is_none());
        // Movement accumulates against the last emitted positions
        let mut emitted = None;
        for step in 3..=8 {
            if let Some(positions) = state.animate(step as f64 * 100.0) {
                emitted = Some((step, positions));
                break;
            }
        }
        let (step, positions) = emitted.unwrap();
        assert_eq!(step, 6);
        assert!((positions[0].x - 106.0).abs() < 1e-3);
    }

    #[test]
    fn test_pause_freezes_and_rebaselines() {
        let mut state = MotionState::new(init(
            vec![target(Vec2::new(100.0, 100.0), Vec2::new(100.0, 0.0))],
            0.0,
            false,
        ));
        state.animate(0.0);
        state.animate(50.0);
        let before = state.positions();

        state.set_paused(true);
        assert!(state.animate(1000.0).is_none());
        assert_eq!(state.positions(), before);

        state.set_paused(false);
        // First animate after resume only re-baselines
        assert!(state.animate(4000.0).is_none());
        assert_eq!(state.positions(), before);
        assert!(state.animate(4050.0).is_some());
    }

    #[test]
    fn test_resume_never_reports_behind_pause() {
        let mut state = MotionState::new(init(
            vec![target(Vec2::new(100.0, 100.0), Vec2::new(120.0, 0.0))],
            0.0,
            true,
        ));
        let step_ms = SIM_DT as f64 * 1000.0;
        state.animate(0.0);
        let before = state.animate(1.5 * step_ms).unwrap();

        state.set_paused(true);
        state.set_paused(false);
        assert!(state.animate(10_000.0).is_none());
        let after = state.animate(10_000.0 + 0.2 * step_ms).unwrap();
        assert!(after[0].x > before[0].x);
        assert!((after[0].x - (100.0 + 120.0 * SIM_DT * 0.7)).abs() < 1e-2);
    }

    #[test]
    fn test_interpolation_blends_between_steps() {
        let mut state = MotionState::new(init(
            vec![target(Vec2::new(100.0, 100.0), Vec2::new(120.0, 0.0))],
            0.0,
            true,
        ));
        state.animate(0.0);
        // 1.5 fixed steps: one step taken, half a step of alpha
        let positions = state.animate(1.5 * SIM_DT as f64 * 1000.0).unwrap();
        let one_step = 120.0 * SIM_DT;
        assert!((state.targets()[0].pos.x - (100.0 + one_step)).abs() < 1e-3);
        assert!((positions[0].x - (100.0 + one_step * 0.5)).abs() < 1e-2);
    }

    #[test]
    fn test_simulator_ignores_second_init_and_early_animate() {
        let mut sim = Simulator::new();
        assert!(sim.handle(SimCommand::Animate { time: 0.0 }).is_none());

        let first = init(
            vec![target(Vec2::new(1.0, 1.0), Vec2::new(100.0, 0.0))],
            0.0,
            false,
        );
        sim.handle(SimCommand::Init(first));
        sim.handle(SimCommand::Init(init(vec![], 0.0, false)));
        assert_eq!(sim.state().map(|s| s.targets().len()), Some(1));

        sim.handle(SimCommand::Animate { time: 0.0 });
        let report = sim.handle(SimCommand::Animate { time: 100.0 });
        assert!(matches!(report, Some(SimReport::Update { ref positions }) if positions.len() == 1));
    }

    #[test]
    fn test_simulator_pause_message() {
        let mut sim = Simulator::new();
        sim.handle(SimCommand::Init(init(
            vec![target(Vec2::new(1.0, 1.0), Vec2::new(100.0, 0.0))],
            0.0,
            false,
        )));
        sim.handle(SimCommand::Pause { paused: true });
        assert!(sim.state().is_some_and(|s| s.is_paused()));
        sim.handle(SimCommand::Animate { time: 0.0 });
        assert!(sim.handle(SimCommand::Animate { time: 100.0 }).is_none());
    }
}
