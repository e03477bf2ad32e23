//! Ordered asset history of one creative
use super::error::{ReviewError, ValidationError};
use super::timestamp::TimeStamp;
use super::utils::non_blank;
use chrono::Utc;

#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct Version {
    #[n(0)]
    pub sequence: u32, // 0 is the original upload
    #[n(1)]
    pub asset_ref: String, // opaque, issued by the asset store
    #[n(2)]
    pub filename: String,
    #[n(3)]
    pub created_at: TimeStamp<Utc>,
}

/// Append-only. Sequence numbers form the gap-free run `0..=N`.
#[derive(Debug, Clone, Default, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct VersionLedger {
    #[n(0)]
    entries: Vec<Version>,
}

impl VersionLedger {
    /// A ledger holding only the original upload as version 0.
    pub fn seeded(asset_ref: &str, filename: &str) -> Result<Self, ValidationError> {
        let seed = Self::entry(0, asset_ref, filename)?;
        Ok(Self {
            entries: vec![seed],
        })
    }

    /// Assigns `max(sequence) + 1`, or 1 when the ledger is empty.
    pub fn append(&mut self, asset_ref: &str, filename: &str) -> Result<Version, ValidationError> {
        // entries are kept in sequence order, so the last one is the max
        let sequence = self.entries.last().map_or(1, |v| v.sequence + 1);
        let version = Self::entry(sequence, asset_ref, filename)?;
        self.entries.push(version.clone());

        Ok(version)
    }

    fn entry(sequence: u32, asset_ref: &str, filename: &str) -> Result<Version, ValidationError> {
        let asset_ref = non_blank(asset_ref).ok_or(ValidationError::EmptyAssetRef)?;
        let filename = non_blank(filename).ok_or(ValidationError::EmptyFilename)?;

        Ok(Version {
            sequence,
            asset_ref: asset_ref.to_string(),
            filename: filename.to_string(),
            created_at: TimeStamp::new(),
        })
    }

    pub fn current(&self) -> Result<&Version, ReviewError> {
        self.entries.last().ok_or(ReviewError::EmptyLedger)
    }

    pub fn first(&self) -> Result<&Version, ReviewError> {
        self.entries.first().ok_or(ReviewError::EmptyLedger)
    }

    pub fn all(&self) -> std::slice::Iter<'_, Version> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when the ledger opens with the seed and runs `1..=N` after it.
    pub fn is_contiguous(&self) -> bool {
        self.entries.first().is_some_and(|seed| seed.sequence == 0)
            && self
                .entries
                .iter()
                .enumerate()
                .all(|(i, v)| v.sequence as usize == i)
    }
}
