//! sled-backed creative repository
use super::creative::Creative;
use super::error::{ReviewError, Result};
use super::repository::{CreativeFilter, CreativeRepository, check_revision, newest_first};
use sled::IVec;
use std::path::Path;
use std::sync::Arc;

const CREATIVES_TREE: &str = "creatives";

pub struct SledRepository {
    instance: Arc<sled::Db>,
    creatives: sled::Tree,
}

impl SledRepository {
    pub fn new(instance: Arc<sled::Db>) -> Result<Self> {
        let creatives = instance.open_tree(CREATIVES_TREE)?;
        Ok(Self {
            instance,
            creatives,
        })
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(Arc::new(sled::open(path)?))
    }

    pub fn flush(&self) -> Result<()> {
        self.instance.flush()?;
        Ok(())
    }

    fn decode(bytes: &[u8]) -> Result<Creative> {
        let creative: Creative = minicbor::decode(bytes)?;
        creative.check_invariants().map_err(ReviewError::Codec)?;
        Ok(creative)
    }

    /// Writes `creative` over `current`, the bytes read for its key.
    fn swap(&self, current: Option<IVec>, creative: &mut Creative) -> Result<()> {
        let stored = current.as_deref().map(Self::decode).transpose()?;
        check_revision(stored.as_ref(), creative)?;

        let mut next = creative.clone();
        next.bump_revision();
        let encoded = minicbor::to_vec(&next)?;

        // a writer that slipped in after `current` was read makes the swap fail
        let key = creative.id.as_bytes();
        match self.creatives.compare_and_swap(key, current, Some(encoded))? {
            Ok(()) => {
                *creative = next;
                Ok(())
            }
            Err(cas) => {
                let found = cas
                    .current
                    .as_deref()
                    .map(Self::decode)
                    .transpose()?
                    .map_or(0, |c| c.revision());
                tracing::warn!(creative_id = %creative.id, found, "compare-and-swap lost a race");
                Err(ReviewError::Conflict {
                    id: creative.id.clone(),
                    expected: creative.revision(),
                    found,
                })
            }
        }
    }
}

impl CreativeRepository for SledRepository {
    fn save(&self, creative: &mut Creative) -> Result<()> {
        let current = self.creatives.get(creative.id.as_bytes())?;
        self.swap(current, creative)
    }

    fn find_by_id(&self, id: &str) -> Result<Creative> {
        match self.creatives.get(id.as_bytes())? {
            Some(bytes) => Self::decode(&bytes),
            None => Err(ReviewError::not_found("creative", id)),
        }
    }

    fn list(&self, filter: &CreativeFilter) -> Result<Vec<Creative>> {
        let mut found = Vec::new();
        for entry in self.creatives.iter() {
            let (_, bytes) = entry?;
            let creative = Self::decode(&bytes)?;
            if filter.matches(&creative) {
                found.push(creative);
            }
        }
        newest_first(&mut found);

        Ok(found)
    }
}
