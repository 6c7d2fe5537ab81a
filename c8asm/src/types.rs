use thiserror::Error;

/// Address where program images are loaded on a stock interpreter.
pub const PROGRAM_ORIGIN: u16 = 0x200;

/// First address past the program region; the interpreter work area starts
/// here on a 4K machine.
pub const PROGRAM_LIMIT: u16 = 0xEA0;

/// Bytes available to an image loaded at the default origin.
pub const PROGRAM_CAPACITY: usize = (PROGRAM_LIMIT - PROGRAM_ORIGIN) as usize;

/// Result of assembling a listing: the raw image plus every address marked
/// with the `break` directive, sorted and deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assembly {
    pub image: Vec<u8>,
    pub breakpoints: Vec<u16>,
}

/// All the ways a listing can be malformed. Every variant carries the
/// 1-based source line it was raised on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    #[error("Line {line}: '{text}' is not hexadecimal")]
    InvalidHex { line: usize, text: String },

    #[error("Line {line}: '{text}' must be two hex digits (byte) or four (word)")]
    InvalidWidth { line: usize, text: String },

    #[error("Line {line}: origin {requested:#06x} is behind the location counter {current:#06x}")]
    OriginBehind {
        line: usize,
        requested: u16,
        current: u16,
    },

    #[error("Line {line}: address '{text}' is outside the program region")]
    OutOfRange { line: usize, text: String },

    #[error("Line {line}: the image does not fit in the program region")]
    Overflow { line: usize },
}

impl AsmError {
    /// Source line the error was raised on.
    pub fn line(&self) -> usize {
        match self {
            AsmError::InvalidHex { line, .. }
            | AsmError::InvalidWidth { line, .. }
            | AsmError::OriginBehind { line, .. }
            | AsmError::OutOfRange { line, .. }
            | AsmError::Overflow { line, .. } => *line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_the_line() {
        let err = AsmError::InvalidHex {
            line: 3,
            text: "xyz".to_string(),
        };
        assert_eq!(err.line(), 3);
        assert_eq!(err.to_string(), "Line 3: 'xyz' is not hexadecimal");
    }

    #[test]
    fn test_origin_errors_format_addresses_as_hex() {
        let err = AsmError::OriginBehind {
            line: 7,
            requested: 0x204,
            current: 0x20A,
        };
        assert_eq!(
            err.to_string(),
            "Line 7: origin 0x0204 is behind the location counter 0x020a"
        );
    }

    #[test]
    fn test_program_region_bounds() {
        assert_eq!(PROGRAM_CAPACITY, 0xCA0);
        assert!(PROGRAM_ORIGIN < PROGRAM_LIMIT);
    }
}
