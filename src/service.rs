//! Service layer API for creative review operations
//!
//! Every mutating call loads the creative, applies one change through the
//! aggregate or the approval state machine, saves it and hands back the
//! updated creative. A refused change is never saved, and a stale save comes
//! back as `Conflict` for the caller to retry against fresh state.
use super::asset::{AssetStore, FsAssetStore};
use super::comment::Remark;
use super::company::CompanyProvider;
use super::config::ReviewConfig;
use super::creative::{Creative, CreativeStatus, NewCreative};
use super::error::{ReviewError, Result, ValidationError};
use super::repository::{CreativeFilter, CreativeRepository};
use super::sled_store::SledRepository;
use super::state::{ApprovalEvent, ApprovalStateMachine};
use super::telemetry;
use super::utils::non_blank;
use std::sync::Arc;

/// Per-status counts over a filtered listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusSummary {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl StatusSummary {
    pub fn total(&self) -> usize {
        self.pending + self.approved + self.rejected
    }
}

pub struct ReviewService {
    repository: Arc<dyn CreativeRepository>,
    companies: Arc<dyn CompanyProvider>,
    assets: Arc<dyn AssetStore>,
}

impl ReviewService {
    /// Service over explicit collaborators.
    pub fn new(
        repository: Arc<dyn CreativeRepository>,
        companies: Arc<dyn CompanyProvider>,
        assets: Arc<dyn AssetStore>,
    ) -> Self {
        Self {
            repository,
            companies,
            assets,
        }
    }

    /// sled repository and filesystem asset store at the configured paths, with
    /// tracing filtered by `config.log_filter`.
    pub fn from_config(
        config: &ReviewConfig,
        companies: Arc<dyn CompanyProvider>,
    ) -> anyhow::Result<Self> {
        config.validate()?;
        telemetry::init_tracing(config);
        let repository = SledRepository::open(&config.db_path)?;
        let assets = FsAssetStore::new(&config.asset_dir)?;
        tracing::info!(
            db = %config.db_path.display(),
            assets = %config.asset_dir.display(),
            "review service ready"
        );

        Ok(Self::new(Arc::new(repository), companies, Arc::new(assets)))
    }

    fn load(&self, creative_id: &str) -> Result<Creative> {
        tracing::debug!(creative_id, "loading creative");
        self.repository.find_by_id(creative_id)
    }

    fn load_live(&self, creative_id: &str) -> Result<Creative> {
        let creative = self.load(creative_id)?;
        creative.ensure_live()?;
        Ok(creative)
    }

    fn commit(&self, mut creative: Creative, action: &str) -> Result<Creative> {
        match self.repository.save(&mut creative) {
            Ok(()) => {
                tracing::info!(
                    creative_id = %creative.id,
                    status = %creative.status(),
                    revision = creative.revision(),
                    action,
                    "creative saved"
                );
                Ok(creative)
            }
            Err(err) => {
                tracing::warn!(creative_id = %creative.id, action, error = %err, "save refused");
                Err(err)
            }
        }
    }

    /// Surfaces a validation failure in the log before returning it.
    fn refuse<T>(creative_id: &str, action: &str, result: Result<T>) -> Result<T> {
        if let Err(err @ ReviewError::Validation(_)) = &result {
            tracing::warn!(creative_id, action, error = %err, "request refused");
        }
        result
    }

    /// Creates a pending creative around an already stored asset reference.
    pub fn create_creative(&self, draft: NewCreative, asset_ref: &str) -> Result<Creative> {
        let creative = Self::refuse(
            "new",
            "create",
            Creative::create(draft, asset_ref, self.companies.as_ref()),
        )?;
        self.commit(creative, "create")
    }

    /// Stores the payload, then creates the creative around the returned reference.
    pub fn upload_creative(
        &self,
        draft: NewCreative,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<Creative> {
        // refuse before writing a blob nobody will reference
        Self::refuse("new", "upload", draft.validate(self.companies.as_ref()))?;
        let asset_ref = self.assets.store(bytes, content_type)?;
        self.create_creative(draft, &asset_ref)
    }

    /// Appends a version (a slide for carousels); status is left as it is.
    pub fn add_version(
        &self,
        creative_id: &str,
        asset_ref: &str,
        filename: &str,
    ) -> Result<Creative> {
        let mut creative = self.load(creative_id)?;
        Self::refuse(
            creative_id,
            "add_version",
            creative.append_version(asset_ref, filename),
        )?;
        self.commit(creative, "add_version")
    }

    /// Stores the payload, then appends it as the next version.
    pub fn upload_version(
        &self,
        creative_id: &str,
        bytes: &[u8],
        content_type: &str,
        filename: &str,
    ) -> Result<Creative> {
        self.load_live(creative_id)?;
        if non_blank(filename).is_none() {
            let refused = Err(ValidationError::EmptyFilename.into());
            return Self::refuse(creative_id, "upload_version", refused);
        }
        let asset_ref = self.assets.store(bytes, content_type)?;
        self.add_version(creative_id, &asset_ref, filename)
    }

    /// New primary version plus a reset to `pending`, saved together.
    pub fn resubmit(
        &self,
        creative_id: &str,
        asset_ref: &str,
        filename: &str,
    ) -> Result<Creative> {
        let mut creative = self.load_live(creative_id)?;
        if creative.kind.is_carousel() {
            return Self::refuse(
                creative_id,
                "resubmit",
                Err(ValidationError::CarouselResubmission.into()),
            );
        }

        Self::refuse(
            creative_id,
            "resubmit",
            creative.append_version(asset_ref, filename),
        )?;
        ApprovalStateMachine::apply(&mut creative, &ApprovalEvent::ResetToPending)?;
        self.commit(creative, "resubmit")
    }

    /// Appends a comment; `author_id` is `None` for system notes.
    pub fn add_comment(
        &self,
        creative_id: &str,
        author_id: Option<&str>,
        author_name: &str,
        text: &str,
    ) -> Result<Creative> {
        let mut creative = self.load(creative_id)?;
        Self::refuse(
            creative_id,
            "add_comment",
            creative.append_comment(author_id, author_name, text),
        )?;
        self.commit(creative, "add_comment")
    }

    fn transition(&self, creative_id: &str, event: ApprovalEvent) -> Result<Creative> {
        let mut creative = self.load(creative_id)?;
        let transition = Self::refuse(
            creative_id,
            event.name(),
            ApprovalStateMachine::apply(&mut creative, &event),
        )?;

        if !transition.changed() {
            tracing::debug!(creative_id, event = event.name(), "transition changed nothing");
            return Ok(creative);
        }
        self.commit(creative, event.name())
    }

    /// Approves from any status; a remark, when given, joins the comment log.
    pub fn approve(&self, creative_id: &str, remark: Option<Remark>) -> Result<Creative> {
        self.transition(creative_id, ApprovalEvent::Approve { remark })
    }

    /// Rejects; `remark` must carry non-blank text and joins the comment log.
    pub fn reject(&self, creative_id: &str, remark: Remark) -> Result<Creative> {
        self.transition(creative_id, ApprovalEvent::reject(remark))
    }

    /// Sends the creative back to `pending` for another review round.
    pub fn reset_to_pending(&self, creative_id: &str) -> Result<Creative> {
        self.transition(creative_id, ApprovalEvent::ResetToPending)
    }

    /// `None` leaves a field alone; blank text clears it.
    pub fn update_details(
        &self,
        creative_id: &str,
        title: Option<&str>,
        caption: Option<&str>,
    ) -> Result<Creative> {
        let stored = self.load(creative_id)?;
        let mut creative = stored.clone();
        creative.update_details(title, caption)?;

        if creative.title == stored.title && creative.caption == stored.caption {
            return Ok(stored);
        }
        self.commit(creative, "update_details")
    }

    /// Idempotent; deleting an already deleted creative writes nothing.
    pub fn soft_delete(&self, creative_id: &str) -> Result<()> {
        let mut creative = self.load(creative_id)?;
        if creative.is_deleted() {
            tracing::debug!(creative_id, "already deleted");
            return Ok(());
        }

        creative.soft_delete();
        self.commit(creative, "soft_delete")?;
        Ok(())
    }

    /// Also returns soft-deleted creatives.
    pub fn get(&self, creative_id: &str) -> Result<Creative> {
        self.load(creative_id)
    }

    /// Creatives matching `filter`, newest first.
    pub fn list(&self, filter: &CreativeFilter) -> Result<Vec<Creative>> {
        let creatives = self.repository.list(filter)?;
        tracing::debug!(?filter, count = creatives.len(), "listed creatives");
        Ok(creatives)
    }

    /// Counts by status. A status set on `filter` is ignored so all three are counted.
    pub fn status_summary(&self, filter: &CreativeFilter) -> Result<StatusSummary> {
        let filter = CreativeFilter {
            status: None,
            ..filter.clone()
        };

        let mut summary = StatusSummary::default();
        for creative in self.repository.list(&filter)? {
            match creative.status() {
                CreativeStatus::Pending => summary.pending += 1,
                CreativeStatus::Approved => summary.approved += 1,
                CreativeStatus::Rejected => summary.rejected += 1,
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::MemoryAssetStore;
    use crate::company::CompanyDirectory;
    use crate::creative::CreativeType;
    use crate::repository::MemoryRepository;

    struct BrokenStore;

    impl AssetStore for BrokenStore {
        fn store(&self, _: &[u8], _: &str) -> Result<String> {
            Err(ReviewError::Storage("bucket unavailable".into()))
        }
    }

    fn service_with(assets: Arc<dyn AssetStore>) -> (ReviewService, Arc<MemoryRepository>) {
        let repository = Arc::new(MemoryRepository::new());
        let companies = Arc::new(CompanyDirectory::new());
        companies.register("company_active", true).unwrap();
        companies.register("company_dormant", false).unwrap();

        let service = ReviewService::new(repository.clone(), companies, assets);
        (service, repository)
    }

    fn service() -> (ReviewService, Arc<MemoryRepository>) {
        service_with(Arc::new(MemoryAssetStore::new()))
    }

    fn post() -> NewCreative {
        NewCreative::new(CreativeType::Post, "user_agency", "v0.png").set_company("company_active")
    }

    #[test]
    fn storage_failure_persists_nothing() {
        let (service, repository) = service_with(Arc::new(BrokenStore));

        let err = service.upload_creative(post(), b"png", "image/png").unwrap_err();

        assert!(matches!(err, ReviewError::Storage(ref msg) if msg == "bucket unavailable"));
        assert!(repository.list(&CreativeFilter::new().with_deleted()).unwrap().is_empty());
    }

    #[test]
    fn upload_refuses_dormant_company_before_storing() {
        let assets = Arc::new(MemoryAssetStore::new());
        let (service, _) = service_with(assets.clone());

        let draft = NewCreative::new(CreativeType::Post, "user_agency", "v0.png")
            .set_company("company_dormant");
        let err = service.upload_creative(draft, b"png", "image/png").unwrap_err();

        assert!(matches!(
            err,
            ReviewError::Validation(ValidationError::InactiveCompany(_))
        ));
        assert!(assets.is_empty());
    }

    #[test]
    fn refused_drafts_store_no_blob() {
        let assets = Arc::new(MemoryAssetStore::new());
        let (service, repository) = service_with(assets.clone());

        let blank_filename = NewCreative::new(CreativeType::Post, "user_agency", "   ");
        let blank_uploader = NewCreative::new(CreativeType::Post, " ", "v0.png");

        assert!(matches!(
            service.upload_creative(blank_filename, b"bytes", "image/png"),
            Err(ReviewError::Validation(ValidationError::EmptyFilename))
        ));
        assert!(matches!(
            service.upload_creative(blank_uploader, b"bytes", "image/png"),
            Err(ReviewError::Validation(ValidationError::EmptyAuthor))
        ));
        assert!(assets.is_empty());
        assert!(repository.list(&CreativeFilter::new().with_deleted()).unwrap().is_empty());
    }

    #[test]
    fn upload_version_stores_then_appends() {
        let assets = Arc::new(MemoryAssetStore::new());
        let (service, _) = service_with(assets.clone());

        let creative = service.upload_creative(post(), b"first", "image/png").unwrap();
        let creative = service
            .upload_version(&creative.id, b"second", "image/png", "v1.png")
            .unwrap();

        assert_eq!(creative.versions().len(), 2);
        assert_eq!(assets.len(), 2);
        assert_eq!(
            assets.fetch(creative.primary_asset_ref()).unwrap().1,
            b"second".to_vec()
        );
    }

    #[test]
    fn upload_version_refuses_blank_filename_before_storing() {
        let assets = Arc::new(MemoryAssetStore::new());
        let (service, _) = service_with(assets.clone());
        let creative = service.create_creative(post(), "asset://0").unwrap();

        let err = service
            .upload_version(&creative.id, b"second", "image/png", "  ")
            .unwrap_err();

        assert!(matches!(
            err,
            ReviewError::Validation(ValidationError::EmptyFilename)
        ));
        assert!(assets.is_empty());
        assert_eq!(service.get(&creative.id).unwrap(), creative);
    }

    #[test]
    fn resubmit_resets_status() {
        let (service, _) = service();
        let creative = service.create_creative(post(), "asset://0").unwrap();
        let creative = service
            .reject(&creative.id, Remark::new("Client", "Logo too small"))
            .unwrap();

        let creative = service.resubmit(&creative.id, "asset://1", "v1.png").unwrap();

        assert_eq!(creative.status(), CreativeStatus::Pending);
        assert_eq!(creative.primary_asset_ref(), "asset://1");
        assert_eq!(creative.comments().len(), 1);
    }

    #[test]
    fn carousel_cannot_be_resubmitted() {
        let (service, _) = service();
        let draft = NewCreative::new(CreativeType::Carousel, "user_agency", "slide-0.png");
        let creative = service.create_creative(draft, "asset://slide-0").unwrap();

        let err = service
            .resubmit(&creative.id, "asset://slide-1", "slide-1.png")
            .unwrap_err();

        assert!(matches!(
            err,
            ReviewError::Validation(ValidationError::CarouselResubmission)
        ));
        assert_eq!(service.get(&creative.id).unwrap().versions().len(), 1);
    }

    #[test]
    fn silent_reapproval_does_not_write() {
        let (service, _) = service();
        let creative = service.create_creative(post(), "asset://0").unwrap();
        let approved = service.approve(&creative.id, None).unwrap();

        let again = service.approve(&creative.id, None).unwrap();

        assert_eq!(again.revision(), approved.revision());
        assert_eq!(again, approved);
    }

    #[test]
    fn summary_counts_every_status() {
        let (service, _) = service();
        let a = service.create_creative(post(), "asset://a").unwrap();
        let b = service.create_creative(post(), "asset://b").unwrap();
        service.create_creative(post(), "asset://c").unwrap();
        service.approve(&a.id, None).unwrap();
        service.reject(&b.id, Remark::new("Client", "no")).unwrap();

        let summary = service
            .status_summary(&CreativeFilter::new().set_status(CreativeStatus::Approved))
            .unwrap();

        assert_eq!(
            summary,
            StatusSummary {
                pending: 1,
                approved: 1,
                rejected: 1
            }
        );
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn update_details_edits_caption() {
        let (service, _) = service();
        let creative = service.create_creative(post(), "asset://0").unwrap();

        let updated = service
            .update_details(&creative.id, None, Some("Winter sale"))
            .unwrap();
        let unchanged = service
            .update_details(&creative.id, None, Some("Winter sale"))
            .unwrap();

        assert_eq!(updated.caption.as_deref(), Some("Winter sale"));
        assert_eq!(updated.revision(), creative.revision() + 1);
        assert_eq!(unchanged.revision(), updated.revision());
    }
}
