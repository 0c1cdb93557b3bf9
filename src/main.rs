//! vm2asm CLI.
//!
//! ```bash
//! vm2asm SimpleAdd.vm              # -> SimpleAdd.asm
//! vm2asm FibonacciElement/         # -> FibonacciElement/FibonacciElement.asm
//! vm2asm prog/ -o build/prog.asm
//! RUST_LOG=debug vm2asm prog/      # per-unit logging
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{debug, info};
use tempfile::NamedTempFile;

use vm2asm::{VmError, output_path, translate_path};

#[derive(Parser, Debug)]
#[command(name = "vm2asm")]
#[command(version)]
#[command(about = "Translate stack VM code to Hack assembly")]
struct Args {
    /// Input .vm file, or a directory of .vm files translated as one program
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output .asm path (defaults next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(dest) => {
            println!("{}", dest.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(1)
        }
    }
}

fn run(args: &Args) -> Result<PathBuf, VmError> {
    debug!("input: {}", args.input.display());

    let asm = translate_path(&args.input)?;
    let dest = args
        .output
        .clone()
        .unwrap_or_else(|| output_path(&args.input));

    write_atomic(&dest, &asm)?;
    info!(
        "wrote {} ({} lines)",
        dest.display(),
        asm.lines().count()
    );
    Ok(dest)
}

/// Write through a temporary file in the destination directory, persisting
/// only once the full output is on disk. A failed run never leaves a
/// truncated .asm behind.
fn write_atomic(dest: &Path, contents: &str) -> Result<(), VmError> {
    let dir = dest.parent().filter(|p| !p.as_os_str().is_empty());
    let write_err = |source: std::io::Error| VmError::FileWrite {
        path: dest.display().to_string(),
        source,
    };

    let mut tmp = match dir {
        Some(dir) => NamedTempFile::new_in(dir),
        None => NamedTempFile::new_in("."),
    }
    .map_err(write_err)?;

    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    tmp.persist(dest).map_err(|e| write_err(e.error))?;
    Ok(())
}
