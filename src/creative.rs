//! Creative aggregate: identity, classification, status, ledger and log
use super::comment::{Comment, CommentLog, Remark};
use super::company::CompanyProvider;
use super::error::{ReviewError, ValidationError};
use super::ledger::{Version, VersionLedger};
use super::timestamp::TimeStamp;
use super::utils::{new_uuid_to_bech32, non_blank};
use chrono::Utc;
use std::fmt;
use std::str::FromStr;

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreativeType {
    #[n(0)]
    Post,
    #[n(1)]
    Story,
    #[n(2)]
    Carousel,
    #[n(3)]
    Reels,
    #[n(4)]
    Motion,
    #[n(5)]
    Banner,
    #[n(6)]
    Video,
    #[n(7)]
    Other,
}

impl CreativeType {
    pub const ALL: [CreativeType; 8] = [
        Self::Post,
        Self::Story,
        Self::Carousel,
        Self::Reels,
        Self::Motion,
        Self::Banner,
        Self::Video,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Story => "story",
            Self::Carousel => "carousel",
            Self::Reels => "reels",
            Self::Motion => "motion",
            Self::Banner => "banner",
            Self::Video => "video",
            Self::Other => "other",
        }
    }

    /// Carousel versions are ordered slides, not revisions.
    pub fn is_carousel(&self) -> bool {
        matches!(self, Self::Carousel)
    }
}

impl fmt::Display for CreativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CreativeType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| ValidationError::UnknownCreativeType(s.to_string()))
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CreativeStatus {
    #[default]
    #[n(0)]
    Pending,
    #[n(1)]
    Approved,
    #[n(2)]
    Rejected,
}

impl CreativeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for CreativeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CreativeStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ValidationError::UnknownStatus(s.to_string())),
        }
    }
}

// used for constructing uploads before they become a creative
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCreative {
    pub kind: CreativeType,
    pub uploader_id: String,
    pub title: Option<String>,
    pub caption: Option<String>,
    pub company_id: Option<String>,
    pub filename: String,
}

impl NewCreative {
    pub fn new(kind: CreativeType, uploader_id: &str, filename: &str) -> Self {
        Self {
            kind,
            uploader_id: uploader_id.trim().to_string(),
            title: None,
            caption: None,
            company_id: None,
            filename: filename.to_string(),
        }
    }
    /// Same as [`NewCreative::new`] with the type given as free text.
    pub fn parse(kind: &str, uploader_id: &str, filename: &str) -> Result<Self, ValidationError> {
        Ok(Self::new(kind.parse()?, uploader_id, filename))
    }
    pub fn set_title(mut self, title: &str) -> Self {
        self.title = non_blank(title).map(str::to_string);
        self
    }
    pub fn set_caption(mut self, caption: &str) -> Self {
        self.caption = non_blank(caption).map(str::to_string);
        self
    }
    pub fn set_company(mut self, company_id: &str) -> Self {
        self.company_id = Some(company_id.to_string());
        self
    }

    /// Everything [`Creative::create`] checks before it needs an asset reference.
    pub fn validate(&self, companies: &dyn CompanyProvider) -> Result<(), ReviewError> {
        non_blank(&self.uploader_id).ok_or(ValidationError::EmptyAuthor)?;
        non_blank(&self.filename).ok_or(ValidationError::EmptyFilename)?;

        if let Some(company_id) = self.company_id.as_deref() {
            if !companies.is_active(company_id)? {
                return Err(ValidationError::InactiveCompany(company_id.to_string()).into());
            }
        }
        Ok(())
    }
}

#[derive(minicbor::Encode, minicbor::Decode, Debug, Clone, PartialEq, Eq)]
pub struct Creative {
    #[n(0)]
    pub id: String, // bech32 `creative_1...`
    #[n(1)]
    pub title: Option<String>,
    #[n(2)]
    pub kind: CreativeType,
    #[n(3)]
    status: CreativeStatus,
    #[n(4)]
    pub caption: Option<String>,
    #[n(5)]
    primary_asset_ref: String,
    #[n(6)]
    pub company_id: Option<String>,
    #[n(7)]
    pub uploader_id: String,
    #[n(8)]
    versions: VersionLedger,
    #[n(9)]
    comments: CommentLog,
    #[n(10)]
    pub created_at: TimeStamp<Utc>,
    #[n(11)]
    pub updated_at: TimeStamp<Utc>,
    #[n(12)]
    pub deleted_at: Option<TimeStamp<Utc>>,
    #[n(13)]
    revision: u64, // bumped by the repository on every successful save
}

impl Creative {
    /// Builds a pending creative seeded with version 0.
    ///
    /// The company, when given, must be known to `companies` and active.
    pub fn create(
        draft: NewCreative,
        initial_asset_ref: &str,
        companies: &dyn CompanyProvider,
    ) -> Result<Self, ReviewError> {
        draft.validate(companies)?;

        let versions = VersionLedger::seeded(initial_asset_ref, &draft.filename)?;
        let primary_asset_ref = versions.current()?.asset_ref.clone();
        let now = TimeStamp::new();

        Ok(Self {
            id: new_uuid_to_bech32("creative_")?,
            title: draft.title,
            kind: draft.kind,
            status: CreativeStatus::Pending,
            caption: draft.caption,
            primary_asset_ref,
            company_id: draft.company_id,
            uploader_id: draft.uploader_id.trim().to_string(),
            versions,
            comments: CommentLog::default(),
            created_at: now.clone(),
            updated_at: now,
            deleted_at: None,
            revision: 0,
        })
    }

    pub fn status(&self) -> CreativeStatus {
        self.status
    }

    pub fn primary_asset_ref(&self) -> &str {
        &self.primary_asset_ref
    }

    pub fn versions(&self) -> &VersionLedger {
        &self.versions
    }

    pub fn comments(&self) -> &CommentLog {
        &self.comments
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Revision of the stored copy this was loaded from, 0 before the first save.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Appends a revision, or a slide for carousels. Status is left alone.
    pub fn append_version(
        &mut self,
        asset_ref: &str,
        filename: &str,
    ) -> Result<Version, ReviewError> {
        self.ensure_live()?;

        let version = self.versions.append(asset_ref, filename)?;
        if !self.kind.is_carousel() {
            self.primary_asset_ref = version.asset_ref.clone();
        }
        self.touch();

        Ok(version)
    }

    pub fn append_comment(
        &mut self,
        author_id: Option<&str>,
        author_name: &str,
        text: &str,
    ) -> Result<Comment, ReviewError> {
        self.ensure_live()?;

        let mut remark = Remark::new(author_name, text);
        remark.author_id = author_id.map(str::to_string);
        let comment = self.comments.append(&remark)?;
        self.touch();

        Ok(comment)
    }

    pub fn update_details(
        &mut self,
        title: Option<&str>,
        caption: Option<&str>,
    ) -> Result<(), ReviewError> {
        self.ensure_live()?;

        if let Some(title) = title {
            self.title = non_blank(title).map(str::to_string);
        }
        if let Some(caption) = caption {
            self.caption = non_blank(caption).map(str::to_string);
        }
        self.touch();

        Ok(())
    }

    /// Idempotent: a second call keeps the first deletion time.
    pub fn soft_delete(&mut self) {
        if self.deleted_at.is_none() {
            let now = TimeStamp::new();
            self.deleted_at = Some(now.clone());
            self.updated_at = now;
        }
    }

    /// Checks the aggregate invariants; used on records coming back from storage.
    pub fn check_invariants(&self) -> Result<(), String> {
        if !self.versions.is_contiguous() {
            return Err(format!("{}: version sequences are not a gap-free run", self.id));
        }
        let expected_primary = if self.kind.is_carousel() {
            self.versions.first()
        } else {
            self.versions.current()
        }
        .map_err(|e| e.to_string())?;
        if expected_primary.asset_ref != self.primary_asset_ref {
            return Err(format!("{}: primary asset does not match ledger", self.id));
        }
        if !self.comments.is_ordered() {
            return Err(format!("{}: comment log is out of order", self.id));
        }
        if self.status == CreativeStatus::Rejected && self.comments.is_empty() {
            return Err(format!("{}: rejected without a comment", self.id));
        }

        Ok(())
    }

    pub(crate) fn ensure_live(&self) -> Result<(), ReviewError> {
        if self.is_deleted() {
            return Err(ReviewError::not_found("creative", &self.id));
        }
        Ok(())
    }

    pub(crate) fn set_status(&mut self, status: CreativeStatus) {
        self.status = status;
    }

    pub(crate) fn comment_log_mut(&mut self) -> &mut CommentLog {
        &mut self.comments
    }

    pub(crate) fn bump_revision(&mut self) {
        self.revision += 1;
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = TimeStamp::new().max(self.updated_at.clone());
    }
}
