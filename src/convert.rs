//! Batch conversion of an OpenPaC player-claims directory
//!
//! A run rebuilds `<output>/ftbchunks` and `<output>/ftbteams` from scratch,
//! converts every regular file of the input directory on its own, and never
//! lets one bad file stop the rest.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::ftbchunks::{self, ConversionPolicy};
use crate::openpac::{self, Claimant};
use crate::server_team;

pub const CHUNKS_DIR: &str = "ftbchunks";
pub const TEAMS_DIR: &str = "ftbteams";

/// Options for a directory conversion
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub policy: ConversionPolicy,
    pub show_progress: bool,
}

impl ConvertOptions {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        ConvertOptions {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            policy: ConversionPolicy::default(),
            show_progress: true,
        }
    }

    pub fn with_policy(mut self, policy: ConversionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

/// Per-file outcome of a run
#[derive(Debug, Default)]
pub struct ConversionReport {
    /// (input, output) pairs that were written
    pub converted: Vec<(PathBuf, PathBuf)>,
    /// Inputs that decoded fine but own no chunks
    pub invalid: Vec<PathBuf>,
    /// Inputs that could not be read, decoded or written
    pub failed: Vec<(PathBuf, crate::Error)>,
    /// Subdirectories found in the input directory
    pub skipped_dirs: Vec<PathBuf>,
    /// Server team descriptor, when a server claim file was seen
    pub server_team: Option<PathBuf>,
}

impl ConversionReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Delete and recreate the `ftbchunks` and `ftbteams` output trees
pub fn reset_output_tree(output: &Path) -> Result<()> {
    for dir in [CHUNKS_DIR, TEAMS_DIR] {
        let path = output.join(dir);
        if path.exists() {
            fs::remove_dir_all(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
    }
    Ok(())
}

/// List regular files (sorted) and subdirectories of the input directory
pub fn collect_input_files(dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut files = Vec::new();
    let mut dirs = Vec::new();

    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        } else if path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    dirs.sort();
    Ok((files, dirs))
}

/// `<output>/ftbchunks/<input stem>.snbt`
pub fn output_path_for(output: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| sanitize_file_name(&s.to_string_lossy()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unnamed".to_string());
    output.join(CHUNKS_DIR).join(format!("{}.snbt", stem))
}

fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Convert one claim file and write its SNBT next to the others
pub fn convert_file(
    input: &Path,
    output: &Path,
    policy: &ConversionPolicy,
    now: i64,
) -> crate::Result<PathBuf> {
    let claimant = Claimant::open(input)?;
    debug!(
        file = %input.display(),
        username = %claimant.username,
        dimensions = claimant.dimensions.len(),
        positions = claimant.position_count(),
        "decoded claim file"
    );

    let record = ftbchunks::convert(&claimant, policy, now)?;
    if record.exceeds_force_load_limit() {
        warn!(
            file = %input.display(),
            forceloaded = record.forceloaded_count(),
            limit = record.max_force_load_chunks,
            "more force-loaded chunks than the team limit"
        );
    }
    let snbt = record.to_snbt()?;

    let output_path = output_path_for(output, input);
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(&output_path)?;
    file.write_all(snbt.as_bytes())?;

    Ok(output_path)
}

/// Convert every claim file in `options.input_dir`
///
/// Only output-tree setup and input listing are fatal; per-file problems
/// are collected in the report. Per-file lines go to stdout.
pub fn convert_directory(options: &ConvertOptions) -> Result<ConversionReport> {
    convert_directory_with_log(options, &mut io::stdout())
}

/// Same as [`convert_directory`], writing per-file lines to `log` when the
/// progress bar is hidden
pub fn convert_directory_with_log<W: Write>(
    options: &ConvertOptions,
    log: &mut W,
) -> Result<ConversionReport> {
    let input = &options.input_dir;
    let output = &options.output_dir;

    reset_output_tree(output)?;
    let (files, dirs) = collect_input_files(input)?;

    let mut report = ConversionReport {
        skipped_dirs: dirs,
        ..ConversionReport::default()
    };

    let pb = if options.show_progress {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
        )?);
        pb
    } else {
        ProgressBar::hidden()
    };

    for dir in &report.skipped_dirs {
        emit(&pb, log, format!("Skipping directory {}", dir.display()))?;
        warn!(dir = %dir.display(), "skipping directory in input");
    }

    info!(
        files = files.len(),
        input = %input.display(),
        output = %output.display(),
        "converting claim files"
    );

    let now = ftbchunks::unix_now();
    let mut written_paths: HashSet<PathBuf> = HashSet::new();

    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        pb.set_message(name.clone());

        if report.server_team.is_none() && openpac::is_server_claimant(&name) {
            match server_team::write_server_team(output) {
                Ok(team) => {
                    emit(&pb, log, format!("Wrote server team {}", team.display()))?;
                    report.server_team = Some(team);
                }
                Err(e) => {
                    emit(&pb, log, format!("Error writing server team: {}", e))?;
                    warn!(error = %e, "failed to write server team descriptor");
                }
            }
        }

        let target = output_path_for(output, &path);
        let result = if written_paths.contains(&target) {
            Err(crate::Error::Io(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} was already written by another input", target.display()),
            )))
        } else {
            convert_file(&path, output, &options.policy, now)
        };

        match result {
            Ok(written) => {
                emit(&pb, log, format!("Converted {} -> {}", name, written.display()))?;
                written_paths.insert(written.clone());
                report.converted.push((path, written));
            }
            Err(crate::Error::EmptyResult) => {
                emit(&pb, log, format!("Invalid input {}: no claimed chunks", name))?;
                warn!(file = %path.display(), "no claimed chunks, skipping");
                report.invalid.push(path);
            }
            Err(e) => {
                emit(&pb, log, format!("Error converting {}: {}", name, e))?;
                warn!(file = %path.display(), kind = e.kind(), error = %e, "conversion failed");
                report.failed.push((path, e));
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");

    info!(
        converted = report.converted.len(),
        invalid = report.invalid.len(),
        failed = report.failed.len(),
        "conversion finished"
    );

    Ok(report)
}

/// Print above the bar, or straight to `log` when there is no bar
fn emit<W: Write>(pb: &ProgressBar, log: &mut W, line: String) -> io::Result<()> {
    if pb.is_hidden() {
        writeln!(log, "{}", line)
    } else {
        pb.println(line);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_for() {
        let out = output_path_for(
            Path::new("out"),
            Path::new("claims/069a79f4-44e9-4726-a5be-fca90e38aaf5.nbt"),
        );
        assert_eq!(
            out,
            Path::new("out/ftbchunks/069a79f4-44e9-4726-a5be-fca90e38aaf5.snbt")
        );
    }

    #[test]
    fn test_output_path_without_extension() {
        let out = output_path_for(Path::new("out"), Path::new("claims/player"));
        assert_eq!(out, Path::new("out/ftbchunks/player.snbt"));
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("a:b*c"), "a_b_c");
        assert_eq!(sanitize_file_name("plain-name_1"), "plain-name_1");
    }
}
