//! The dual-rate scheduling loop.
//!
//! One loop drives two independently clocked activities against a single
//! machine: stepping it at the configured clock rate and presenting a
//! frame at exactly 60 Hz. Each iteration polls the frontend for control
//! input, blocks until the nearest trigger deadline (the loop's only
//! suspension point) and then services at most one due trigger, so a slow
//! frame throttles stepping and a slow step throttles frames rather than
//! either piling up work.
//!
//! Run state lives here and nowhere else. The frontend requests pause and
//! resume through the commands it returns from `poll`; they are applied
//! inside the iteration, never from another thread.

use std::io;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::clock::Ticker;
use crate::constants::{EVENT_LOG_CAPACITY, NANOS_PER_SECOND, PRESENT_RATE_HZ};
use crate::machine::{Machine, StepOutcome};
use crate::ui::{Command, Frontend, Snapshot};

/// Whether step triggers move the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
}

pub struct Runner<M, F> {
    machine: M,
    frontend: F,
    state: RunState,
    step: Ticker,
    present: Ticker,
    clock_hz: u64,
    events: Vec<String>,
}

impl<M: Machine, F: Frontend> Runner<M, F> {
    pub fn new(machine: M, frontend: F, start_paused: bool, clock_hz: u64) -> Self {
        Self::with_start(machine, frontend, start_paused, clock_hz, Instant::now())
    }

    /// Like [`new`](Self::new) with an explicit start instant, for callers
    /// that drive the loop with their own clock.
    pub fn with_start(
        machine: M,
        frontend: F,
        start_paused: bool,
        clock_hz: u64,
        start: Instant,
    ) -> Self {
        let clock_hz = clock_hz.max(1);
        let step_period = Duration::from_nanos(NANOS_PER_SECOND / clock_hz);
        let present_period = Duration::from_nanos(NANOS_PER_SECOND / PRESENT_RATE_HZ);
        Self {
            machine,
            frontend,
            state: if start_paused {
                RunState::Paused
            } else {
                RunState::Running
            },
            step: Ticker::new(step_period, start),
            present: Ticker::new(present_period, start),
            clock_hz,
            events: Vec::new(),
        }
    }

    /// Run until the frontend asks to quit. Only frontend I/O errors
    /// escape; everything else the loop absorbs.
    pub fn run(&mut self) -> io::Result<()> {
        info!(
            "stepping at {} Hz, presenting at {} Hz",
            self.clock_hz, PRESENT_RATE_HZ
        );
        self.present_frame()?;
        loop {
            let wait = self.wait_budget(Instant::now());
            if let Some(command) = self.frontend.poll(wait)? {
                if !self.apply_command(command) {
                    break;
                }
            }
            self.tick(Instant::now())?;
        }
        info!("stopped after {} cycles", self.machine.view().cycles);
        Ok(())
    }

    /// Time until the nearest trigger deadline, zero when one is already
    /// due. This is how long the frontend poll may block.
    pub fn wait_budget(&self, now: Instant) -> Duration {
        let next = self.step.deadline().min(self.present.deadline());
        next.saturating_duration_since(now)
    }

    /// Service at most one due trigger, always the one with the older
    /// deadline; an exact tie goes to the step trigger. A trigger passed
    /// over while the other was serviced ages past it and takes a later
    /// call, so even a step period shorter than the loop's own latency
    /// cannot hold off presentation.
    pub fn tick(&mut self, now: Instant) -> io::Result<()> {
        // When the older deadline has not passed, neither has the other.
        if self.step.deadline() <= self.present.deadline() {
            if self.step.fire(now) {
                self.step_machine();
            }
        } else if self.present.fire(now) {
            self.present_frame()?;
        }
        Ok(())
    }

    /// Apply a frontend command. Returns false when the loop should stop.
    pub fn apply_command(&mut self, command: Command) -> bool {
        match command {
            Command::Quit => {
                debug!("quit requested");
                false
            }
            Command::TogglePause => {
                self.state = match self.state {
                    RunState::Running => RunState::Paused,
                    RunState::Paused => RunState::Running,
                };
                let note = match self.state {
                    RunState::Running => "resumed",
                    RunState::Paused => "paused",
                };
                info!("{note}");
                self.push_event(note.to_string());
                true
            }
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn machine(&self) -> &M {
        &self.machine
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    /// Recent user-facing events, oldest first.
    pub fn events(&self) -> &[String] {
        &self.events
    }

    pub fn into_parts(self) -> (M, F) {
        (self.machine, self.frontend)
    }

    /// The machine is advanced even while paused; it sees the run state
    /// and decides what moves, and breakpoint checks happen either way.
    fn step_machine(&mut self) {
        let paused = self.state == RunState::Paused;
        match self.machine.advance(paused) {
            StepOutcome::Normal => {}
            StepOutcome::BreakpointHit(hit) => {
                warn!("{hit}");
                self.state = RunState::Paused;
                self.push_event(hit.to_string());
            }
        }
    }

    fn present_frame(&mut self) -> io::Result<()> {
        let snapshot = Snapshot {
            view: self.machine.view(),
            state: self.state,
            clock_hz: self.clock_hz,
            events: &self.events,
        };
        self.frontend.draw(&snapshot)
    }

    fn push_event(&mut self, event: String) {
        if self.events.len() == EVENT_LOG_CAPACITY {
            self.events.remove(0);
        }
        self.events.push(event);
    }
}
