//! Persistence surface for creatives
use super::creative::{Creative, CreativeStatus, CreativeType};
use super::error::{ReviewError, Result};
use std::collections::HashMap;
use std::sync::Mutex;

/// Saves use optimistic concurrency: `creative.revision()` must match what is
/// stored (0 for a creative never saved), otherwise the save fails with
/// `Conflict` and nothing is written. A successful save bumps the revision.
pub trait CreativeRepository: Send + Sync {
    fn save(&self, creative: &mut Creative) -> Result<()>;

    /// Soft-deleted creatives are still returned.
    fn find_by_id(&self, id: &str) -> Result<Creative>;

    /// Newest first.
    fn list(&self, filter: &CreativeFilter) -> Result<Vec<Creative>>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreativeFilter {
    pub company_id: Option<String>,
    pub status: Option<CreativeStatus>,
    pub kind: Option<CreativeType>,
    pub include_deleted: bool,
}

impl CreativeFilter {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set_company(mut self, company_id: &str) -> Self {
        self.company_id = Some(company_id.to_string());
        self
    }
    pub fn set_status(mut self, status: CreativeStatus) -> Self {
        self.status = Some(status);
        self
    }
    pub fn set_kind(mut self, kind: CreativeType) -> Self {
        self.kind = Some(kind);
        self
    }
    pub fn with_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }

    pub fn matches(&self, creative: &Creative) -> bool {
        (self.include_deleted || !creative.is_deleted())
            && self
                .company_id
                .as_deref()
                .is_none_or(|id| creative.company_id.as_deref() == Some(id))
            && self.status.is_none_or(|status| creative.status() == status)
            && self.kind.is_none_or(|kind| creative.kind == kind)
    }
}

pub(crate) fn newest_first(creatives: &mut [Creative]) {
    creatives.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

pub(crate) fn check_revision(stored: Option<&Creative>, creative: &Creative) -> Result<()> {
    let found = stored.map_or(0, |s| s.revision());
    if found != creative.revision() {
        return Err(ReviewError::Conflict {
            id: creative.id.clone(),
            expected: creative.revision(),
            found,
        });
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct MemoryRepository {
    creatives: Mutex<HashMap<String, Creative>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Creative>>> {
        self.creatives
            .lock()
            .map_err(|_| ReviewError::Persistence("repository lock poisoned".into()))
    }
}

impl CreativeRepository for MemoryRepository {
    fn save(&self, creative: &mut Creative) -> Result<()> {
        let mut creatives = self.lock()?;
        check_revision(creatives.get(&creative.id), creative)?;

        creative.bump_revision();
        creatives.insert(creative.id.clone(), creative.clone());

        Ok(())
    }

    fn find_by_id(&self, id: &str) -> Result<Creative> {
        self.lock()?
            .get(id)
            .cloned()
            .ok_or_else(|| ReviewError::not_found("creative", id))
    }

    fn list(&self, filter: &CreativeFilter) -> Result<Vec<Creative>> {
        let mut found: Vec<Creative> = self
            .lock()?
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        newest_first(&mut found);

        Ok(found)
    }
}
