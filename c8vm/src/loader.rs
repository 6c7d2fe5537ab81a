//! Turns a command-line program source into a runnable machine.
//!
//! Producing an image can fail in all the usual ways; handing the runner a
//! machine never does. [`produce`] is the fallible half, [`load`] wraps it
//! and substitutes an empty machine on any failure, so a bad file or a
//! typo in a listing leaves the front end running instead of dead.

use std::fs;
use std::io;
use std::path::PathBuf;

use log::{info, warn};
use thiserror::Error;

use crate::machine::{ImageError, Vm};
use crate::roms;

/// Where the program image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramSource {
    /// The bundled demo image; loading it does no I/O.
    BuiltIn,
    File(PathBuf),
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read program: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Asm(#[from] c8asm::AsmError),

    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Produce a fully loaded machine, breakpoints registered.
///
/// With `assemble` set the file is treated as an image listing and its
/// `break` annotations become machine breakpoints; otherwise the file is
/// loaded byte for byte as a pre-built image. The flag is ignored for the
/// built-in source.
pub fn produce(source: &ProgramSource, assemble: bool) -> Result<Vm, LoadError> {
    match source {
        ProgramSource::BuiltIn => {
            let mut vm = Vm::new();
            vm.load_image(roms::DEMO)?;
            Ok(vm)
        }
        ProgramSource::File(path) if assemble => {
            let text = fs::read_to_string(path)?;
            let assembly = c8asm::assemble(&text)?;
            let mut vm = Vm::new();
            vm.load_image(&assembly.image)?;
            for addr in assembly.breakpoints {
                vm.add_breakpoint(addr);
            }
            Ok(vm)
        }
        ProgramSource::File(path) => {
            let image = fs::read(path)?;
            let mut vm = Vm::new();
            vm.load_image(&image)?;
            Ok(vm)
        }
    }
}

/// Like [`produce`], but failure falls back to the empty machine so the
/// caller always gets something runnable. This is the only recovery point
/// on the load path.
pub fn load(source: &ProgramSource, assemble: bool) -> Vm {
    match produce(source, assemble) {
        Ok(vm) => {
            info!(
                "loaded {} bytes, {} breakpoints",
                vm.program().len(),
                vm.breakpoints().len()
            );
            vm
        }
        Err(e) => {
            warn!("{e}; continuing with an empty machine");
            Vm::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("c8vm_loader_{}_{}", std::process::id(), name))
    }

    fn write_scratch(name: &str, contents: &[u8]) -> PathBuf {
        let path = scratch_path(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn cleanup(path: &Path) {
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_builtin_source_loads_the_demo() {
        let vm = produce(&ProgramSource::BuiltIn, false).unwrap();
        assert_eq!(vm.program(), roms::DEMO);
        assert!(vm.breakpoints().is_empty());
    }

    #[test]
    fn test_builtin_source_ignores_the_assemble_flag() {
        let vm = produce(&ProgramSource::BuiltIn, true).unwrap();
        assert_eq!(vm.program(), roms::DEMO);
    }

    #[test]
    fn test_binary_file_loads_byte_for_byte() {
        let path = write_scratch("plain.ch8", &[0x00, 0xE0, 0x12, 0x00]);
        let vm = produce(&ProgramSource::File(path.clone()), false).unwrap();
        assert_eq!(vm.program(), &[0x00, 0xE0, 0x12, 0x00]);
        assert!(vm.breakpoints().is_empty());
        cleanup(&path);
    }

    #[test]
    fn test_listing_file_registers_breakpoints() {
        let path = write_scratch("listing.c8l", b"200: 00E0\nbreak\n1200\n");
        let vm = produce(&ProgramSource::File(path.clone()), true).unwrap();
        assert_eq!(vm.program(), &[0x00, 0xE0, 0x12, 0x00]);
        assert_eq!(vm.breakpoints(), &[0x202]);
        cleanup(&path);
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let source = ProgramSource::File(scratch_path("missing.ch8"));
        let err = produce(&source, false).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn test_bad_listing_is_an_asm_error() {
        let path = write_scratch("bad.c8l", b"this is not a listing\n");
        let err = produce(&ProgramSource::File(path.clone()), true).unwrap_err();
        assert!(matches!(err, LoadError::Asm(_)));
        cleanup(&path);
    }

    #[test]
    fn test_oversized_image_is_an_image_error() {
        let path = write_scratch("huge.ch8", &vec![0u8; 0xCA1]);
        let err = produce(&ProgramSource::File(path.clone()), false).unwrap_err();
        assert!(matches!(err, LoadError::Image(_)));
        cleanup(&path);
    }

    #[test]
    fn test_load_recovers_with_an_empty_machine() {
        let path = write_scratch("garbage.c8l", b"not hex at all\n");
        let vm = load(&ProgramSource::File(path.clone()), true);
        assert!(vm.program().is_empty());
        assert!(vm.breakpoints().is_empty());
        cleanup(&path);
    }

    #[test]
    fn test_load_passes_through_on_success() {
        let vm = load(&ProgramSource::BuiltIn, false);
        assert_eq!(vm.program(), roms::DEMO);
    }
}
