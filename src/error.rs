//! Error taxonomy for the review engine

/// Bad input. Raised before any mutation is applied.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("comment text must not be empty")]
    EmptyComment,
    #[error("comment required for rejection")]
    CommentRequiredForRejection,
    #[error("author name must not be empty")]
    EmptyAuthor,
    #[error("unknown creative type: {0}")]
    UnknownCreativeType(String),
    #[error("unknown creative status: {0}")]
    UnknownStatus(String),
    #[error("company {0} is not active")]
    InactiveCompany(String),
    #[error("asset reference must not be empty")]
    EmptyAssetRef,
    #[error("filename must not be empty")]
    EmptyFilename,
    #[error("carousel slides are not revisions and cannot be resubmitted")]
    CarouselResubmission,
}

#[derive(thiserror::Error, Debug)]
pub enum ReviewError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("stale write for creative {id}: expected revision {expected}, found {found}")]
    Conflict {
        id: String,
        expected: u64,
        found: u64,
    },
    #[error("asset storage failed: {0}")]
    Storage(String),
    #[error("version ledger was never seeded")]
    EmptyLedger,
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("codec failure: {0}")]
    Codec(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ReviewError>;

impl ReviewError {
    /// Only a stale write is worth retrying, and only after reloading.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ReviewError::Conflict { .. })
    }

    pub fn not_found(what: &str, id: &str) -> Self {
        ReviewError::NotFound(format!("{what} {id}"))
    }
}

impl From<sled::Error> for ReviewError {
    fn from(err: sled::Error) -> Self {
        ReviewError::Persistence(err.to_string())
    }
}

impl From<minicbor::decode::Error> for ReviewError {
    fn from(err: minicbor::decode::Error) -> Self {
        ReviewError::Codec(err.to_string())
    }
}

impl From<minicbor::encode::Error<std::convert::Infallible>> for ReviewError {
    fn from(err: minicbor::encode::Error<std::convert::Infallible>) -> Self {
        ReviewError::Codec(err.to_string())
    }
}
