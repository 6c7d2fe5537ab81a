//! Built-in program images.

/// Loaded when no program file is named on the command line. On a real
/// interpreter it clears the screen, draws a figure eight in the middle and
/// spins on a self-jump.
#[rustfmt::skip]
pub const DEMO: &[u8] = &[
    0x00, 0xE0,                   // 0x200  cls
    0xA2, 0x0C,                   // 0x202  i = 0x20C
    0x61, 0x1C,                   // 0x204  v1 = 28
    0x62, 0x0E,                   // 0x206  v2 = 14
    0xD1, 0x25,                   // 0x208  draw 8x5 at (v1, v2)
    0x12, 0x0A,                   // 0x20A  jp 0x20A
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 0x20C  figure-eight sprite
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PROGRAM_CAPACITY;

    #[test]
    fn test_demo_fits_the_program_region() {
        assert!(DEMO.len() <= PROGRAM_CAPACITY);
    }

    #[test]
    fn test_demo_jump_targets_itself() {
        // The spin instruction sits at 0x20A and jumps to 0x20A.
        assert_eq!(&DEMO[0x0A..0x0C], &[0x12, 0x0A]);
    }
}
