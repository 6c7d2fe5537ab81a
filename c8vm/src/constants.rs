//! Central configuration and constants for the front end

// Scheduling rates
pub const DEFAULT_CLOCK_HZ: u64 = 500; // one step every 2ms
pub const PRESENT_RATE_HZ: u64 = 60;
pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

// Memory layout of a stock 4K machine; the program region bounds are the
// assembler's, so the two crates cannot disagree on them
pub use c8asm::{PROGRAM_CAPACITY, PROGRAM_LIMIT, PROGRAM_ORIGIN};
pub const MEMORY_SIZE: usize = 0x1000;
pub const FONT_ORIGIN: usize = 0x50;
pub const DISPLAY_ORIGIN: usize = 0xF00; // last page holds the frame buffer
pub const DISPLAY_BYTES: usize = 0x100;

// Display geometry (1 bit per pixel)
pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

// UI
pub const EVENT_LOG_CAPACITY: usize = 8; // recent events kept for the events pane
