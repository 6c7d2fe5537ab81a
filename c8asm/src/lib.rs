//! Assembler for flat hex image listings.
//!
//! A listing describes a CHIP-8 program image one line at a time. `;`
//! starts a comment, an optional leading `ADDR:` moves the location
//! counter forward (the skipped range is zero filled), and each remaining
//! whitespace-separated group emits data: two hex digits for a byte, four
//! for a big-endian word. The bare word `break` marks the current location
//! for the debugger without emitting anything.
//!
//! ```text
//! ; clear the screen, then spin
//! 200: 00E0
//!      break          ; stop here under a debugger
//!      1202           ; jp 0x202
//! ```
//!
//! The location counter starts at 0x200 and may not leave the program
//! region, which ends at 0xEA0 where the interpreter work area begins.
//! A marker may park the counter on the end itself, but emitting data or
//! a `break` there is an error.

pub mod assembler;
pub mod types;

pub use assembler::ListingAssembler;
pub use types::{AsmError, Assembly, PROGRAM_CAPACITY, PROGRAM_LIMIT, PROGRAM_ORIGIN};

// Re-export for convenience
pub fn assemble(source: &str) -> Result<Assembly, AsmError> {
    ListingAssembler::new().assemble(source)
}
