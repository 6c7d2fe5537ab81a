use clap::Parser;
use std::path::PathBuf;

use crate::constants::DEFAULT_CLOCK_HZ;
use crate::loader::ProgramSource;

#[derive(Parser, Debug)]
#[command(
    name = "c8vm",
    about = "CHIP-8 virtual machine - Run CHIP-8 program images",
    long_about = "Runs a CHIP-8 program image in a terminal front end, stepping the machine\n\
                  at a fixed clock rate and presenting frames at 60 fps. With no program\n\
                  argument a built-in demo image is loaded.",
    version,
    author
)]
pub struct Cli {
    /// Program image to run (the built-in demo when omitted)
    pub program: Option<PathBuf>,

    /// Treat the program as an assembly listing and assemble it first
    #[arg(short = 'a', long)]
    pub assemble: bool,

    /// Start paused
    #[arg(short = 'b', long)]
    pub paused: bool,

    /// Machine steps per second
    #[arg(long, default_value_t = DEFAULT_CLOCK_HZ)]
    pub clock: u64,
}

impl Cli {
    pub fn source(&self) -> ProgramSource {
        match &self.program {
            Some(path) => ProgramSource::File(path.clone()),
            None => ProgramSource::BuiltIn,
        }
    }
}
