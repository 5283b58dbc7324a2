//! FTB Chunks claim records and the OpenPaC → FTB Chunks mapping
//!
//! FTB Chunks keeps one record per team:
//!
//! ```text
//! { max_claim_chunks: 250, max_force_load_chunks: 2, last_login_time: <long>L,
//!   chunks: { "minecraft:overworld": [ { x: 0, z: 0, time: <long>L }, ... ] },
//!   member_data: {} }
//! ```
//!
//! Every OpenPaC position becomes one chunk entry under the same dimension.
//! OpenPaC's `y` is FTB's `z`.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};
use crate::nbt::{self, Compound, IntoTag, Tag};
use crate::openpac::Claimant;

pub const DEFAULT_MAX_CLAIM_CHUNKS: i32 = 250;
pub const DEFAULT_MAX_FORCE_LOAD_CHUNKS: i32 = 2;

/// Knobs applied to every converted record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionPolicy {
    pub max_claim_chunks: i32,
    pub max_force_load_chunks: i32,
    /// Mark chunks of force-loaded OpenPaC claims as force-loaded
    pub propagate_forceload: bool,
}

impl Default for ConversionPolicy {
    fn default() -> Self {
        ConversionPolicy {
            max_claim_chunks: DEFAULT_MAX_CLAIM_CHUNKS,
            max_force_load_chunks: DEFAULT_MAX_FORCE_LOAD_CHUNKS,
            propagate_forceload: true,
        }
    }
}

/// A single claimed chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkEntry {
    pub x: i32,
    pub z: i32,
    /// Claim time, unix seconds
    pub time: i64,
    /// Force-load time, unix seconds; absent for chunks that are not force-loaded
    pub forceloaded: Option<i64>,
}

/// One converted claim file
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimRecord {
    pub max_claim_chunks: i32,
    pub max_force_load_chunks: i32,
    pub last_login_time: i64,
    /// Dimension id to chunks, in source order
    pub chunks: Vec<(String, Vec<ChunkEntry>)>,
    pub member_data: Compound,
}

/// Current wall-clock time in unix seconds
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

impl ClaimRecord {
    /// Map a claimant onto an FTB Chunks record stamped with `now`
    ///
    /// Dimensions keep their source order; within a dimension, chunks follow
    /// claim order and then position order. Dimensions without claims are
    /// kept with an empty chunk list.
    pub fn from_claimant(claimant: &Claimant, policy: &ConversionPolicy, now: i64) -> Self {
        let chunks = claimant
            .dimensions
            .iter()
            .map(|(dimension, dim)| {
                let entries = dim
                    .claims
                    .iter()
                    .flat_map(|claim| {
                        let forceloaded = (policy.propagate_forceload && claim.state.forceloaded)
                            .then_some(now);
                        claim.positions.iter().map(move |pos| ChunkEntry {
                            x: pos.x,
                            z: pos.y,
                            time: now,
                            forceloaded,
                        })
                    })
                    .collect();
                (dimension.clone(), entries)
            })
            .collect();

        ClaimRecord {
            max_claim_chunks: policy.max_claim_chunks,
            max_force_load_chunks: policy.max_force_load_chunks,
            last_login_time: now,
            chunks,
            member_data: Compound::new(),
        }
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.iter().map(|(_, entries)| entries.len()).sum()
    }

    pub fn forceloaded_count(&self) -> usize {
        self.chunks
            .iter()
            .flat_map(|(_, entries)| entries)
            .filter(|e| e.forceloaded.is_some())
            .count()
    }

    /// More force-loaded chunks than `max_force_load_chunks` allows
    pub fn exceeds_force_load_limit(&self) -> bool {
        self.forceloaded_count() > self.max_force_load_chunks.max(0) as usize
    }

    /// Render the record as SNBT
    pub fn to_snbt(&self) -> Result<String> {
        nbt::to_snbt(&self.to_tag()?)
    }
}

/// Convert a claimant, rejecting one that owns no chunks at all
pub fn convert(claimant: &Claimant, policy: &ConversionPolicy, now: i64) -> Result<ClaimRecord> {
    let record = ClaimRecord::from_claimant(claimant, policy, now);
    if record.chunk_count() == 0 {
        return Err(Error::EmptyResult);
    }
    Ok(record)
}

impl IntoTag for ChunkEntry {
    fn to_tag(&self) -> Result<Tag> {
        let mut c = Compound::new();
        c.insert("x", self.x);
        c.insert("z", self.z);
        c.insert("time", self.time);
        if let Some(at) = self.forceloaded {
            c.insert("forceloaded", at);
        }
        Ok(Tag::Compound(c))
    }
}

impl IntoTag for ClaimRecord {
    fn to_tag(&self) -> Result<Tag> {
        let mut chunks = Compound::new();
        for (dimension, entries) in &self.chunks {
            chunks.insert(dimension.clone(), entries.to_tag()?);
        }

        let mut c = Compound::new();
        c.insert("max_claim_chunks", self.max_claim_chunks);
        c.insert("max_force_load_chunks", self.max_force_load_chunks);
        c.insert("last_login_time", self.last_login_time);
        c.insert("chunks", chunks);
        c.insert("member_data", self.member_data.clone());
        Ok(Tag::Compound(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openpac::{Claim, ClaimState, Dimension, Position};

    const NOW: i64 = 1_700_000_000;

    fn claim(positions: &[(i32, i32)], forceloaded: bool) -> Claim {
        Claim {
            positions: positions.iter().map(|&(x, y)| Position { x, y }).collect(),
            state: ClaimState {
                forceloaded,
                sub_config_index: 3,
            },
        }
    }

    fn claimant() -> Claimant {
        Claimant {
            confirmed_activity: 42,
            username: "Steve".into(),
            dimensions: vec![
                (
                    "minecraft:overworld".into(),
                    Dimension {
                        claims: vec![claim(&[(0, 0), (1, -1)], false), claim(&[(5, 6)], true)],
                    },
                ),
                ("minecraft:the_end".into(), Dimension::default()),
                (
                    "minecraft:the_nether".into(),
                    Dimension {
                        claims: vec![claim(&[(-8, 9)], false)],
                    },
                ),
            ],
        }
    }

    #[test]
    fn test_one_entry_per_position() {
        let source = claimant();
        let record = convert(&source, &ConversionPolicy::default(), NOW).unwrap();
        assert_eq!(record.chunk_count(), source.position_count());

        let keys: Vec<_> = record.chunks.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec!["minecraft:overworld", "minecraft:the_end", "minecraft:the_nether"]
        );
        assert_eq!(record.chunks[0].1.len(), 3);
        assert!(record.chunks[1].1.is_empty());
        assert_eq!(record.chunks[2].1.len(), 1);
    }

    #[test]
    fn test_y_becomes_z_in_claim_order() {
        let record = convert(&claimant(), &ConversionPolicy::default(), NOW).unwrap();
        let coords: Vec<_> = record.chunks[0].1.iter().map(|e| (e.x, e.z)).collect();
        assert_eq!(coords, vec![(0, 0), (1, -1), (5, 6)]);
        assert!(record.chunks[0].1.iter().all(|e| e.time == NOW));
    }

    #[test]
    fn test_constants_and_login_time() {
        let record = convert(&claimant(), &ConversionPolicy::default(), NOW).unwrap();
        assert_eq!(record.max_claim_chunks, 250);
        assert_eq!(record.max_force_load_chunks, 2);
        assert_eq!(record.last_login_time, NOW);
        assert!(record.member_data.is_empty());
    }

    #[test]
    fn test_forceload_follows_claim_state() {
        let record = convert(&claimant(), &ConversionPolicy::default(), NOW).unwrap();
        let overworld = &record.chunks[0].1;
        assert_eq!(overworld[0].forceloaded, None);
        assert_eq!(overworld[2].forceloaded, Some(NOW));
        assert_eq!(record.forceloaded_count(), 1);

        let policy = ConversionPolicy {
            propagate_forceload: false,
            ..ConversionPolicy::default()
        };
        let record = convert(&claimant(), &policy, NOW).unwrap();
        assert_eq!(record.forceloaded_count(), 0);
    }

    #[test]
    fn test_force_load_limit() {
        let source = Claimant {
            dimensions: vec![(
                "minecraft:overworld".into(),
                Dimension {
                    claims: vec![claim(&[(0, 0), (1, 0), (2, 0)], true)],
                },
            )],
            ..Claimant::default()
        };
        let record = convert(&source, &ConversionPolicy::default(), NOW).unwrap();
        assert_eq!(record.forceloaded_count(), 3);
        assert!(record.exceeds_force_load_limit());

        let policy = ConversionPolicy {
            max_force_load_chunks: 3,
            ..ConversionPolicy::default()
        };
        let record = convert(&source, &policy, NOW).unwrap();
        assert!(!record.exceeds_force_load_limit());

        let record = convert(&claimant(), &ConversionPolicy::default(), NOW).unwrap();
        assert!(!record.exceeds_force_load_limit());
    }

    #[test]
    fn test_empty_claimant_is_rejected() {
        let mut source = claimant();
        for (_, dim) in &mut source.dimensions {
            for claim in &mut dim.claims {
                claim.positions.clear();
            }
        }
        assert!(matches!(
            convert(&source, &ConversionPolicy::default(), NOW),
            Err(Error::EmptyResult)
        ));
        assert!(matches!(
            convert(&Claimant::default(), &ConversionPolicy::default(), NOW),
            Err(Error::EmptyResult)
        ));
    }

    #[test]
    fn test_snbt_output() {
        let source = Claimant {
            dimensions: vec![(
                "minecraft:overworld".into(),
                Dimension {
                    claims: vec![claim(&[(3, -4)], false), claim(&[(7, 7)], true)],
                },
            )],
            ..Claimant::default()
        };
        let record = convert(&source, &ConversionPolicy::default(), NOW).unwrap();
        assert_eq!(
            record.to_snbt().unwrap(),
            "{ max_claim_chunks: 250, max_force_load_chunks: 2, last_login_time: 1700000000L, \
             chunks: { \"minecraft:overworld\": [ { x: 3, z: -4, time: 1700000000L }, \
             { x: 7, z: 7, time: 1700000000L, forceloaded: 1700000000L } ] }, member_data: {} }"
        );
    }
}
