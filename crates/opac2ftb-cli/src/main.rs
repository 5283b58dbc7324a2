//! opac2ftb - Convert Open Parties and Claims data to FTB Chunks
//!
//! Usage:
//!   opac2ftb <input_dir>                    - Convert with default settings into .
//!   opac2ftb convert <input_dir> [-o out]   - Convert a player-claims directory
//!   opac2ftb show <file>                    - Print a claim file as SNBT

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use opac2ftb::ftbchunks::{DEFAULT_MAX_CLAIM_CHUNKS, DEFAULT_MAX_FORCE_LOAD_CHUNKS};
use opac2ftb::{convert_directory, nbt, ConversionPolicy, ConvertOptions, Tag};

#[derive(Parser)]
#[command(name = "opac2ftb")]
#[command(version = "0.1.0")]
#[command(about = "Convert Open Parties and Claims chunk claims to FTB Chunks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// OpenPaC player-claims directory (for quick convert mode)
    input_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every claim file in a directory
    Convert {
        /// OpenPaC player-claims directory
        input_dir: PathBuf,
        /// Output directory (ftbchunks/ and ftbteams/ are rebuilt inside it)
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        /// Claim limit written to every team
        #[arg(long, default_value_t = DEFAULT_MAX_CLAIM_CHUNKS)]
        max_claim_chunks: i32,
        /// Force-load limit written to every team
        #[arg(long, default_value_t = DEFAULT_MAX_FORCE_LOAD_CHUNKS)]
        max_force_load_chunks: i32,
        /// Do not carry force-load state over to converted chunks
        #[arg(long)]
        no_forceload: bool,
        /// Hide the progress bar
        #[arg(short, long)]
        quiet: bool,
    },
    /// Decode a single NBT file and print it as SNBT
    Show {
        /// NBT file (raw or gzip-compressed)
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing::subscriber::set_global_default(log_subscriber(
        std::io::stderr,
        std::io::stderr().is_terminal(),
    ))?;

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Convert {
            input_dir,
            output,
            max_claim_chunks,
            max_force_load_chunks,
            no_forceload,
            quiet,
        }) => {
            let policy = ConversionPolicy {
                max_claim_chunks,
                max_force_load_chunks,
                propagate_forceload: !no_forceload,
            };
            let options = ConvertOptions::new(input_dir, output)
                .with_policy(policy)
                .with_progress(!quiet);
            run_convert(&options)?;
        }
        Some(Commands::Show { file }) => {
            show_file(&file)?;
        }
        None => {
            if let Some(input_dir) = cli.input_dir {
                run_convert(&ConvertOptions::new(input_dir, "."))?;
            } else {
                eprintln!("Usage: opac2ftb <input_dir>");
                eprintln!("       opac2ftb convert <input_dir> [-o output] [--max-claim-chunks N]");
                eprintln!("                        [--max-force-load-chunks N] [--no-forceload]");
                eprintln!("       opac2ftb show <file>");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Log subscriber writing to `writer`, with colors only when `ansi` is set
fn log_subscriber<W>(writer: W, ansi: bool) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .finish()
}

fn run_convert(options: &ConvertOptions) -> Result<()> {
    println!(
        "Converting {} into {}...",
        options.input_dir.display(),
        options.output_dir.display()
    );

    let report = convert_directory(options)
        .with_context(|| format!("Failed to convert {}", options.input_dir.display()))?;

    println!();
    println!("Converted: {} files", report.converted.len());
    if !report.invalid.is_empty() {
        println!("Invalid (no claims): {} files", report.invalid.len());
    }
    if !report.failed.is_empty() {
        println!("Failed: {} files", report.failed.len());
        for (path, err) in &report.failed {
            println!("  {}: {}", path.display(), err);
        }
    }
    if !report.skipped_dirs.is_empty() {
        println!("Skipped directories: {}", report.skipped_dirs.len());
    }
    if let Some(team) = &report.server_team {
        println!("Server team: {}", team.display());
    }

    Ok(())
}

fn show_file(path: &Path) -> Result<()> {
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let root = nbt::from_bytes(&data)
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    let text = nbt::to_snbt(&Tag::Compound(root))?;
    println!("{}", text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn captured(ansi: bool) -> String {
        let buffer = Buffer::default();
        let writer = buffer.clone();
        tracing::subscriber::with_default(log_subscriber(move || writer.clone(), ansi), || {
            tracing::warn!(file = "player.nbt", "conversion failed");
        });
        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_plain_log_has_no_escape_codes() {
        let text = captured(false);
        assert!(text.contains("conversion failed"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_terminal_log_is_colored() {
        assert!(captured(true).contains('\x1b'));
    }
}
