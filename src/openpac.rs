//! Open Parties and Claims player-claim data
//!
//! Each player's claims are stored in one NBT file:
//!
//! ```text
//! {
//!   confirmedActivity: <long>
//!   username: <string>
//!   dimensions: {
//!     "minecraft:overworld": {
//!       claims: [ { positions: [ { x: <int>, y: <int> }, ... ],
//!                   state: { forceloaded: <byte>, subConfigIndex: <int> } }, ... ]
//!     },
//!     ...
//!   }
//! }
//! ```
//!
//! OpenPaC stores the chunk z coordinate under `y`.

use std::path::Path;

use crate::error::Result;
use crate::nbt::bind::{entries, expect_compound, field, within};
use crate::nbt::{self, Compound, FromTag, Tag};

/// Server-owned claims are stored under the nil-prefixed UUID
pub const SERVER_CLAIMANT_PATTERN: &str = "00000000-0000-0000-0000-";

/// Whether a claim file belongs to the server rather than a player
pub fn is_server_claimant(file_name: &str) -> bool {
    file_name.contains(SERVER_CLAIMANT_PATTERN)
}

/// One player's (or the server's) claims
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Claimant {
    pub confirmed_activity: i64,
    pub username: String,
    /// Dimension id to claims, in file order
    pub dimensions: Vec<(String, Dimension)>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dimension {
    pub claims: Vec<Claim>,
}

/// A group of chunks sharing one claim state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Claim {
    pub positions: Vec<Position>,
    pub state: ClaimState,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClaimState {
    pub forceloaded: bool,
    pub sub_config_index: i32,
}

impl Claimant {
    /// Decode a claim file from raw (optionally gzip-compressed) bytes
    pub fn parse(data: &[u8]) -> Result<Self> {
        let root = nbt::from_bytes(data)?;
        Self::from_compound(&root)
    }

    /// Read and decode a claim file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::parse(&data)
    }

    pub fn from_compound(root: &Compound) -> Result<Self> {
        let dimensions: Vec<(String, Dimension)> = match root.get("dimensions") {
            Some(tag) => expect_compound(tag)
                .and_then(entries)
                .map_err(|e| within("dimensions", e))?,
            None => Vec::new(),
        };

        Ok(Claimant {
            confirmed_activity: field(root, "confirmedActivity")?,
            username: field(root, "username")?,
            dimensions,
        })
    }

    /// Total number of claimed chunk positions across all dimensions
    pub fn position_count(&self) -> usize {
        self.dimensions
            .iter()
            .flat_map(|(_, dim)| &dim.claims)
            .map(|claim| claim.positions.len())
            .sum()
    }
}

impl FromTag for Dimension {
    fn from_tag(tag: &Tag) -> Result<Self> {
        let c = expect_compound(tag)?;
        Ok(Dimension {
            claims: field(c, "claims")?,
        })
    }
}

impl FromTag for Claim {
    fn from_tag(tag: &Tag) -> Result<Self> {
        let c = expect_compound(tag)?;
        Ok(Claim {
            positions: field(c, "positions")?,
            state: field(c, "state")?,
        })
    }
}

impl FromTag for Position {
    fn from_tag(tag: &Tag) -> Result<Self> {
        let c = expect_compound(tag)?;
        Ok(Position {
            x: field(c, "x")?,
            y: field(c, "y")?,
        })
    }
}

impl FromTag for ClaimState {
    fn from_tag(tag: &Tag) -> Result<Self> {
        let c = expect_compound(tag)?;
        Ok(ClaimState {
            forceloaded: field(c, "forceloaded")?,
            sub_config_index: field(c, "subConfigIndex")?,
        })
    }
}
