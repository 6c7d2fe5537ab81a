use std::io;
use std::process;

use clap::Parser;
use colored::*;
use log::info;

use c8vm::cli::Cli;
use c8vm::loader::{self, ProgramSource};
use c8vm::runner::Runner;
use c8vm::ui::{self, TermFrontend};

/// Install signal handlers to restore the terminal on exit
fn install_signal_handlers() {
    use signal_hook::{consts::SIGINT, consts::SIGTERM, iterator::Signals};
    use std::thread;

    if let Ok(mut signals) = Signals::new(&[SIGINT, SIGTERM]) {
        thread::spawn(move || {
            for _ in signals.forever() {
                let _ = ui::restore_terminal();
                process::exit(130); // 128 + SIGINT(2)
            }
        });
    }
}

fn main() -> io::Result<()> {
    env_logger::init();
    ui::install_terminal_cleanup_hook();
    install_signal_handlers();

    let cli = Cli::parse();
    let source = cli.source();

    match &source {
        ProgramSource::BuiltIn => println!("{}", "Loading built-in demo".cyan()),
        ProgramSource::File(path) => println!("{} {}", "Loading".cyan(), path.display()),
    }

    let vm = loader::load(&source, cli.assemble);
    info!(
        "program: {} bytes, {} breakpoints",
        vm.program().len(),
        vm.breakpoints().len()
    );

    let frontend = match TermFrontend::new() {
        Ok(frontend) => frontend,
        Err(e) => {
            let _ = ui::restore_terminal();
            eprintln!(
                "{}: {}",
                "Failed to set up the terminal".bright_red().bold(),
                e
            );
            process::exit(1);
        }
    };

    let mut runner = Runner::new(vm, frontend, cli.paused, cli.clock);
    let result = runner.run();

    let (vm, frontend) = runner.into_parts();
    frontend.shutdown()?;
    result?;

    println!(
        "{} after {} cycles",
        "Stopped".bright_green().bold(),
        vm.cycles()
    );
    Ok(())
}
