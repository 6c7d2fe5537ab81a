//! The machine contract the scheduling loop drives, plus the bundled
//! machine implementing it.

use std::fmt;

use thiserror::Error;

use crate::constants::{
    DISPLAY_BYTES, DISPLAY_ORIGIN, FONT_ORIGIN, MEMORY_SIZE, PROGRAM_CAPACITY, PROGRAM_ORIGIN,
};

/// Hex digit glyphs resident below the program region, 5 bytes per digit.
#[rustfmt::skip]
const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Reported by [`Machine::advance`] when the program counter stops on a
/// registered breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakpointHit {
    pub addr: u16,
}

impl fmt::Display for BreakpointHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "breakpoint hit at {:#06x}", self.addr)
    }
}

/// Outcome of one advance call. There are exactly two kinds; machine
/// faults are not part of the stepping contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Normal,
    BreakpointHit(BreakpointHit),
}

/// Read-only state handed to the presentation layer once per frame.
#[derive(Debug, Clone, Copy)]
pub struct MachineView<'a> {
    pub pc: u16,
    pub cycles: u64,
    pub program_len: usize,
    /// The 1-bpp frame buffer, row major, most significant bit first.
    pub display: &'a [u8],
    pub breakpoints: &'a [u16],
}

/// What the scheduling loop requires from a machine.
///
/// `advance` is called at the step rate whether or not the front end is
/// paused. Breakpoint detection must run on every call; visible state may
/// only move on unpaused calls.
pub trait Machine {
    fn advance(&mut self, paused: bool) -> StepOutcome;
    fn view(&self) -> MachineView<'_>;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("program image is {size} bytes; the program region holds {max}", max = PROGRAM_CAPACITY)]
    TooLarge { size: usize },
}

/// The bundled machine: the canonical 4K memory map, a program walker and
/// a breakpoint set. It does not interpret instructions; interpreter cores
/// implement [`Machine`] the same way and slot into the runner unchanged.
#[derive(Debug)]
pub struct Vm {
    memory: [u8; MEMORY_SIZE],
    pc: u16,
    cycles: u64,
    program_len: usize,
    breakpoints: Vec<u16>,
    stopped_at: Option<u16>,
}

impl Vm {
    /// A machine with no program: font in place, display cleared, program
    /// counter parked at the origin. This is the image the loader falls
    /// back to when a program cannot be produced.
    pub fn new() -> Self {
        let mut memory = [0u8; MEMORY_SIZE];
        memory[FONT_ORIGIN..FONT_ORIGIN + FONT.len()].copy_from_slice(&FONT);
        Self {
            memory,
            pc: PROGRAM_ORIGIN,
            cycles: 0,
            program_len: 0,
            breakpoints: Vec::new(),
            stopped_at: None,
        }
    }

    /// Copy a program image into the program region and rewind: the
    /// program counter returns to the origin, the cycle count restarts
    /// and any breakpoint stop is released.
    pub fn load_image(&mut self, image: &[u8]) -> Result<(), ImageError> {
        if image.len() > PROGRAM_CAPACITY {
            return Err(ImageError::TooLarge { size: image.len() });
        }
        let start = usize::from(PROGRAM_ORIGIN);
        self.memory[start..start + image.len()].copy_from_slice(image);
        self.program_len = image.len();
        self.pc = PROGRAM_ORIGIN;
        self.cycles = 0;
        self.stopped_at = None;
        Ok(())
    }

    /// Register a breakpoint address. Duplicates collapse and the set stays
    /// sorted.
    pub fn add_breakpoint(&mut self, addr: u16) {
        if let Err(slot) = self.breakpoints.binary_search(&addr) {
            self.breakpoints.insert(slot, addr);
        }
    }

    /// One step. A breakpoint at the program counter is reported exactly
    /// once per stop: repeated calls while parked on the address stay
    /// quiet, and executing off it re-arms the report for the next visit.
    pub fn advance(&mut self, paused: bool) -> StepOutcome {
        if self.breakpoints.binary_search(&self.pc).is_ok() && self.stopped_at != Some(self.pc) {
            self.stopped_at = Some(self.pc);
            return StepOutcome::BreakpointHit(BreakpointHit { addr: self.pc });
        }
        if paused {
            return StepOutcome::Normal;
        }
        self.stopped_at = None;
        self.cycles += 1;
        let end = PROGRAM_ORIGIN + self.program_len as u16;
        let next = self.pc + 2;
        self.pc = if next >= end { PROGRAM_ORIGIN } else { next };
        StepOutcome::Normal
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// Unpaused steps taken since load.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn breakpoints(&self) -> &[u16] {
        &self.breakpoints
    }

    /// The loaded program bytes.
    pub fn program(&self) -> &[u8] {
        let start = usize::from(PROGRAM_ORIGIN);
        &self.memory[start..start + self.program_len]
    }

    /// The 1-bpp frame buffer page.
    pub fn display(&self) -> &[u8] {
        &self.memory[DISPLAY_ORIGIN..DISPLAY_ORIGIN + DISPLAY_BYTES]
    }

    /// The whole address space.
    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn view(&self) -> MachineView<'_> {
        MachineView {
            pc: self.pc,
            cycles: self.cycles,
            program_len: self.program_len,
            display: self.display(),
            breakpoints: &self.breakpoints,
        }
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine for Vm {
    fn advance(&mut self, paused: bool) -> StepOutcome {
        Vm::advance(self, paused)
    }

    fn view(&self) -> MachineView<'_> {
        Vm::view(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(image: &[u8]) -> Vm {
        let mut vm = Vm::new();
        vm.load_image(image).unwrap();
        vm
    }

    #[test]
    fn test_new_machine_is_initialized() {
        let vm = Vm::new();
        assert_eq!(vm.pc(), 0x200);
        assert_eq!(vm.cycles(), 0);
        assert!(vm.program().is_empty());
        assert!(vm.breakpoints().is_empty());
        assert!(vm.display().iter().all(|&b| b == 0));
        // Digit glyphs live at 0x50; spot-check the zero.
        assert_eq!(&vm.memory()[0x50..0x55], &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
    }

    #[test]
    fn test_load_image_places_program_at_origin() {
        let vm = loaded(&[0xAA, 0xBB, 0xCC, 0xDD]);
        assert_eq!(vm.program(), &[0xAA, 0xBB, 0xCC, 0xDD]);
        assert_eq!(&vm.memory()[0x200..0x204], &[0xAA, 0xBB, 0xCC, 0xDD]);
    }

    #[test]
    fn test_load_image_rewinds_a_used_machine() {
        let mut vm = loaded(&[0; 8]);
        vm.advance(false);
        vm.advance(false);
        vm.load_image(&[0xAA, 0xBB]).unwrap();
        assert_eq!(vm.pc(), 0x200);
        assert_eq!(vm.cycles(), 0);
        assert_eq!(vm.program(), &[0xAA, 0xBB]);
    }

    #[test]
    fn test_load_image_rejects_oversized_program() {
        let mut vm = Vm::new();
        let err = vm.load_image(&vec![0u8; PROGRAM_CAPACITY + 1]).unwrap_err();
        assert_eq!(
            err,
            ImageError::TooLarge {
                size: PROGRAM_CAPACITY + 1
            }
        );
    }

    #[test]
    fn test_load_image_accepts_region_sized_program() {
        let vm = loaded(&vec![0x0Fu8; PROGRAM_CAPACITY]);
        assert_eq!(vm.program().len(), PROGRAM_CAPACITY);
    }

    #[test]
    fn test_advance_walks_one_word() {
        let mut vm = loaded(&[0; 8]);
        assert_eq!(vm.advance(false), StepOutcome::Normal);
        assert_eq!(vm.pc(), 0x202);
        assert_eq!(vm.cycles(), 1);
    }

    #[test]
    fn test_advance_wraps_at_image_end() {
        let mut vm = loaded(&[0; 4]);
        vm.advance(false);
        vm.advance(false);
        assert_eq!(vm.pc(), 0x200);
        assert_eq!(vm.cycles(), 2);
    }

    #[test]
    fn test_empty_machine_stays_at_origin() {
        let mut vm = Vm::new();
        vm.advance(false);
        vm.advance(false);
        assert_eq!(vm.pc(), 0x200);
        assert_eq!(vm.cycles(), 2);
    }

    #[test]
    fn test_paused_advance_freezes_visible_state() {
        let mut vm = loaded(&[0; 8]);
        assert_eq!(vm.advance(true), StepOutcome::Normal);
        assert_eq!(vm.pc(), 0x200);
        assert_eq!(vm.cycles(), 0);
    }

    #[test]
    fn test_add_breakpoint_keeps_set_sorted_and_unique() {
        let mut vm = Vm::new();
        vm.add_breakpoint(0x220);
        vm.add_breakpoint(0x204);
        vm.add_breakpoint(0x220);
        assert_eq!(vm.breakpoints(), &[0x204, 0x220]);
    }

    #[test]
    fn test_breakpoint_reports_on_arrival() {
        let mut vm = loaded(&[0; 8]);
        vm.add_breakpoint(0x202);
        assert_eq!(vm.advance(false), StepOutcome::Normal);
        assert_eq!(
            vm.advance(false),
            StepOutcome::BreakpointHit(BreakpointHit { addr: 0x202 })
        );
        // The hit itself does not move the machine.
        assert_eq!(vm.pc(), 0x202);
        assert_eq!(vm.cycles(), 1);
    }

    #[test]
    fn test_breakpoint_reports_once_per_stop() {
        let mut vm = loaded(&[0; 8]);
        vm.add_breakpoint(0x200);
        assert!(matches!(vm.advance(true), StepOutcome::BreakpointHit(_)));
        for _ in 0..5 {
            assert_eq!(vm.advance(true), StepOutcome::Normal);
        }
    }

    #[test]
    fn test_resume_steps_over_the_breakpoint() {
        let mut vm = loaded(&[0; 8]);
        vm.add_breakpoint(0x200);
        assert!(matches!(vm.advance(false), StepOutcome::BreakpointHit(_)));
        assert_eq!(vm.advance(false), StepOutcome::Normal);
        assert_eq!(vm.pc(), 0x202);
    }

    #[test]
    fn test_breakpoint_rearms_on_revisit() {
        let mut vm = loaded(&[0; 4]);
        vm.add_breakpoint(0x202);
        assert!(matches!(vm.advance(false), StepOutcome::Normal));
        assert!(matches!(vm.advance(false), StepOutcome::BreakpointHit(_)));
        assert_eq!(vm.advance(false), StepOutcome::Normal); // steps over, wraps
        assert_eq!(vm.pc(), 0x200);
        assert!(matches!(vm.advance(false), StepOutcome::Normal));
        assert!(matches!(vm.advance(false), StepOutcome::BreakpointHit(_)));
    }

    #[test]
    fn test_self_loop_refires_every_visit() {
        // A one-word program wraps onto itself; each executed step is a
        // fresh visit.
        let mut vm = loaded(&[0x12, 0x00]);
        vm.add_breakpoint(0x200);
        assert!(matches!(vm.advance(false), StepOutcome::BreakpointHit(_)));
        assert_eq!(vm.advance(false), StepOutcome::Normal);
        assert!(matches!(vm.advance(false), StepOutcome::BreakpointHit(_)));
    }

    #[test]
    fn test_breakpoint_added_while_parked_is_seen() {
        let mut vm = loaded(&[0; 8]);
        vm.advance(true);
        vm.add_breakpoint(0x200);
        assert!(matches!(vm.advance(true), StepOutcome::BreakpointHit(_)));
    }

    #[test]
    fn test_view_mirrors_accessors() {
        let mut vm = loaded(&[1, 2, 3, 4]);
        vm.add_breakpoint(0x202);
        vm.advance(false);
        let view = vm.view();
        assert_eq!(view.pc, vm.pc());
        assert_eq!(view.cycles, 1);
        assert_eq!(view.program_len, 4);
        assert_eq!(view.display.len(), 0x100);
        assert_eq!(view.breakpoints, &[0x202]);
    }
}
