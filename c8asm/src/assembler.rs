//! Line-oriented assembly of hex listings into raw program images.

use crate::types::{AsmError, Assembly, PROGRAM_LIMIT, PROGRAM_ORIGIN};

/// Assembles image listings.
///
/// The assembler tracks a location counter that starts at the origin and
/// advances as bytes are emitted. `ADDR:` markers may only move it
/// forward; the gap is zero filled so the emitted image stays flat.
pub struct ListingAssembler {
    origin: u16,
}

impl ListingAssembler {
    pub fn new() -> Self {
        Self {
            origin: PROGRAM_ORIGIN,
        }
    }

    /// Assemble for a non-default load address. The region end stays fixed
    /// at 0xEA0, so a higher origin leaves less room.
    pub fn with_origin(origin: u16) -> Self {
        Self { origin }
    }

    pub fn assemble(&self, source: &str) -> Result<Assembly, AsmError> {
        let mut image = Vec::new();
        let mut breakpoints = Vec::new();
        let mut counter = self.origin;

        for (idx, raw_line) in source.lines().enumerate() {
            let line = idx + 1;
            let text = match raw_line.find(';') {
                Some(pos) => &raw_line[..pos],
                None => raw_line,
            };

            let mut rest = text.trim();
            if rest.is_empty() {
                continue;
            }

            if let Some(pos) = rest.find(':') {
                let marker = rest[..pos].trim();
                counter = self.relocate(marker, counter, &mut image, line)?;
                rest = rest[pos + 1..].trim();
            }

            for group in rest.split_whitespace() {
                if group.eq_ignore_ascii_case("break") {
                    // A breakpoint must name an executable address.
                    if counter >= PROGRAM_LIMIT {
                        return Err(AsmError::OutOfRange {
                            line,
                            text: format!("{counter:X}"),
                        });
                    }
                    if let Err(slot) = breakpoints.binary_search(&counter) {
                        breakpoints.insert(slot, counter);
                    }
                    continue;
                }
                counter = self.emit(group, counter, &mut image, line)?;
            }
        }

        Ok(Assembly { image, breakpoints })
    }

    /// Move the location counter to an `ADDR:` marker, zero-filling the gap.
    fn relocate(
        &self,
        marker: &str,
        counter: u16,
        image: &mut Vec<u8>,
        line: usize,
    ) -> Result<u16, AsmError> {
        if marker.is_empty() || !marker.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(AsmError::InvalidHex {
                line,
                text: marker.to_string(),
            });
        }
        let requested = match u32::from_str_radix(marker, 16) {
            Ok(addr) if addr >= u32::from(self.origin) && addr <= u32::from(PROGRAM_LIMIT) => {
                addr as u16
            }
            _ => {
                return Err(AsmError::OutOfRange {
                    line,
                    text: marker.to_string(),
                })
            }
        };
        if requested < counter {
            return Err(AsmError::OriginBehind {
                line,
                requested,
                current: counter,
            });
        }
        image.resize(usize::from(requested - self.origin), 0);
        Ok(requested)
    }

    /// Emit one hex group at the counter.
    fn emit(
        &self,
        group: &str,
        counter: u16,
        image: &mut Vec<u8>,
        line: usize,
    ) -> Result<u16, AsmError> {
        if !group.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(AsmError::InvalidHex {
                line,
                text: group.to_string(),
            });
        }
        match group.len() {
            2 => {
                let value = u8::from_str_radix(group, 16).map_err(|_| AsmError::InvalidHex {
                    line,
                    text: group.to_string(),
                })?;
                self.push(&[value], counter, image, line)
            }
            4 => {
                let value = u16::from_str_radix(group, 16).map_err(|_| AsmError::InvalidHex {
                    line,
                    text: group.to_string(),
                })?;
                self.push(&value.to_be_bytes(), counter, image, line)
            }
            _ => Err(AsmError::InvalidWidth {
                line,
                text: group.to_string(),
            }),
        }
    }

    fn push(
        &self,
        bytes: &[u8],
        counter: u16,
        image: &mut Vec<u8>,
        line: usize,
    ) -> Result<u16, AsmError> {
        let end = u32::from(counter) + bytes.len() as u32;
        if end > u32::from(PROGRAM_LIMIT) {
            return Err(AsmError::Overflow { line });
        }
        image.extend_from_slice(bytes);
        Ok(counter + bytes.len() as u16)
    }
}

impl Default for ListingAssembler {
    fn default() -> Self {
        Self::new()
    }
}
