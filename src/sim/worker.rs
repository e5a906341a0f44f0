//! Execution units for the motion simulator
//!
//! Each spawned instance owns its `Simulator` and talks to the controller only
//! through channels. Every instance posts into the same controller inbox, tagged
//! with its generation, so the controller can drop late reports from instances
//! it has already replaced.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread;

use super::motion::Simulator;
use super::protocol::{Envelope, Generation, SimCommand};

/// Controller-side handle to one simulator instance
pub trait SimulatorLink {
    fn generation(&self) -> Generation;

    /// Queue a command; returns false once the instance is gone
    fn post(&mut self, command: SimCommand) -> bool;

    /// Give the instance a chance to run (no-op for instances with their own thread)
    fn pump(&mut self) {}

    /// Stop the instance immediately; pending commands are discarded
    fn terminate(&mut self);
}

/// Creates simulator instances
pub trait Spawn {
    fn spawn(&mut self, generation: Generation, inbox: Sender<Envelope>) -> Box<dyn SimulatorLink>;
}

/// One OS thread per simulator instance
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSpawner;

impl Spawn for ThreadSpawner {
    fn spawn(&mut self, generation: Generation, inbox: Sender<Envelope>) -> Box<dyn SimulatorLink> {
        let (tx, rx) = mpsc::channel::<SimCommand>();
        let terminated = Arc::new(AtomicBool::new(false));
        let flag = terminated.clone();

        let spawned = thread::Builder::new()
            .name(format!("simulator-{generation}"))
            .spawn(move || {
                let mut simulator = Simulator::new();
                for command in rx {
                    if flag.load(Ordering::Acquire) {
                        break;
                    }
                    if let Some(report) = simulator.handle(command) {
                        if flag.load(Ordering::Acquire) {
                            break;
                        }
                        if inbox.send(Envelope { generation, report }).is_err() {
                            break;
                        }
                    }
                }
                log::debug!("Simulator {} stopped", generation);
            });

        if let Err(e) = &spawned {
            log::error!("Failed to spawn simulator thread: {}", e);
        }

        Box::new(ThreadLink {
            generation,
            commands: spawned.ok().map(|_| tx),
            terminated,
        })
    }
}

struct ThreadLink {
    generation: Generation,
    commands: Option<Sender<SimCommand>>,
    terminated: Arc<AtomicBool>,
}

impl SimulatorLink for ThreadLink {
    fn generation(&self) -> Generation {
        self.generation
    }

    fn post(&mut self, command: SimCommand) -> bool {
        match &self.commands {
            Some(tx) => tx.send(command).is_ok(),
            None => false,
        }
    }

    fn terminate(&mut self) {
        self.terminated.store(true, Ordering::Release);
        // Dropping the sender ends the thread's receive loop
        self.commands = None;
    }
}

impl Drop for ThreadLink {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Simulator run on the caller's thread, one queue drain per `pump`
///
/// Used where threads are unavailable (wasm32) and in deterministic tests.
/// Commands are never answered synchronously, matching the threaded unit.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineSpawner;

impl Spawn for InlineSpawner {
    fn spawn(&mut self, generation: Generation, inbox: Sender<Envelope>) -> Box<dyn SimulatorLink> {
        Box::new(InlineLink {
            generation,
            simulator: Simulator::new(),
            queue: VecDeque::new(),
            inbox: Some(inbox),
        })
    }
}

struct InlineLink {
    generation: Generation,
    simulator: Simulator,
    queue: VecDeque<SimCommand>,
    inbox: Option<Sender<Envelope>>,
}

impl SimulatorLink for InlineLink {
    fn generation(&self) -> Generation {
        self.generation
    }

    fn post(&mut self, command: SimCommand) -> bool {
        if self.inbox.is_none() {
            return false;
        }
        self.queue.push_back(command);
        true
    }

    fn pump(&mut self) {
        let Some(inbox) = &self.inbox else {
            return;
        };
        while let Some(command) = self.queue.pop_front() {
            if let Some(report) = self.simulator.handle(command) {
                let envelope = Envelope {
                    generation: self.generation,
                    report,
                };
                if inbox.send(envelope).is_err() {
                    self.queue.clear();
                    return;
                }
            }
        }
    }

    fn terminate(&mut self) {
        self.queue.clear();
        self.inbox = None;
    }
}
