//! # opac2ftb
//!
//! Converts Open Parties and Claims (OpenPaC) chunk claims into
//! FTB Chunks / FTB Teams save data.
//!
//! ## Overview
//!
//! OpenPaC keeps one binary NBT file per player (plus one for the server)
//! listing the chunks the player claimed. FTB Chunks reads one SNBT file per
//! team. This library provides:
//!
//! - A binary NBT reader and writer (big-endian, Modified UTF-8, gzip aware)
//! - An SNBT renderer
//! - Typed OpenPaC and FTB Chunks schemas with the mapping between them
//! - Batch conversion of a whole player-claims directory
//!
//! ## Example - Single file
//!
//! ```rust,no_run
//! use opac2ftb::{ConversionPolicy, openpac::Claimant, ftbchunks};
//!
//! fn main() -> anyhow::Result<()> {
//!     let claimant = Claimant::open("player-claims/069a79f4-44e9-4726-a5be-fca90e38aaf5.nbt")?;
//!     let record = ftbchunks::convert(&claimant, &ConversionPolicy::default(), ftbchunks::unix_now())?;
//!     println!("{}", record.to_snbt()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Example - Directory
//!
//! ```rust,no_run
//! use opac2ftb::{convert_directory, ConvertOptions};
//!
//! fn main() -> anyhow::Result<()> {
//!     let report = convert_directory(&ConvertOptions::new("player-claims", "out"))?;
//!     println!("{} converted, {} failed", report.converted.len(), report.failed.len());
//!     Ok(())
//! }
//! ```

pub mod convert;
pub mod error;
pub mod ftbchunks;
pub mod nbt;
pub mod openpac;
pub mod server_team;

pub use convert::{
    convert_directory, convert_directory_with_log, convert_file, ConversionReport, ConvertOptions,
};
pub use error::{Error, Result};
pub use ftbchunks::{ChunkEntry, ClaimRecord, ConversionPolicy};
pub use nbt::{Compound, List, Tag, TagId};
pub use openpac::Claimant;
