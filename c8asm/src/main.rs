use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "c8asm")]
#[command(about = "Assembles CHIP-8 image listings into raw program images")]
#[command(version)]
struct Cli {
    /// Input listing file
    input: PathBuf,

    /// Output image file (defaults to the input with a .ch8 extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Validate the listing without writing anything
    #[arg(long)]
    check: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let source = fs::read_to_string(&cli.input)?;
    let assembly = match c8asm::assemble(&source) {
        Ok(assembly) => assembly,
        Err(e) => {
            eprintln!("Assembly failed:");
            eprintln!("  - {e}");
            process::exit(1);
        }
    };

    if cli.check {
        println!("✓ {} is valid", cli.input.display());
    } else {
        let output_path = cli.output.unwrap_or_else(|| {
            let mut path = cli.input.clone();
            path.set_extension("ch8");
            path
        });
        fs::write(&output_path, &assembly.image)?;
        println!("✓ Assembled to {}", output_path.display());
    }

    println!("  Image: {} bytes", assembly.image.len());
    if !assembly.breakpoints.is_empty() {
        println!("  Breakpoints: {}", assembly.breakpoints.len());
        for addr in &assembly.breakpoints {
            println!("    - {addr:#06x}");
        }
    }

    Ok(())
}
