//! A CHIP-8 virtual machine with a terminal front end.
//!
//! The machine steps at a configurable clock rate while frames are
//! presented at a fixed 60 fps, both driven from one single-threaded
//! loop in [`runner`]. Programs are loaded from raw images or assembled
//! from listings by the companion `c8asm` crate, and a program that
//! fails to load is replaced by an empty machine so the front end always
//! comes up.

pub mod cli;
pub mod clock;
pub mod constants;
pub mod loader;
pub mod machine;
pub mod roms;
pub mod runner;
pub mod settings;
pub mod ui;

// Re-export commonly used types
pub use loader::ProgramSource;
pub use machine::{Machine, MachineView, StepOutcome, Vm};
pub use runner::{RunState, Runner};
pub use ui::{Command, Frontend, HeadlessFrontend, Snapshot, TermFrontend};
