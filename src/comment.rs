//! Append-only comment log
use super::error::ValidationError;
use super::timestamp::TimeStamp;
use super::utils::non_blank;
use chrono::Utc;

#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct Comment {
    #[n(0)]
    pub id: u64, // per creative, starts at 1
    #[n(1)]
    pub author_name: String,
    #[n(2)]
    pub author_id: Option<String>, // None for system-authored remarks
    #[n(3)]
    pub text: String,
    #[n(4)]
    pub created_at: TimeStamp<Utc>,
}

/// Unvalidated comment input, as supplied by a reviewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remark {
    pub author_id: Option<String>,
    pub author_name: String,
    pub text: String,
}

impl Remark {
    pub fn new(author_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author_id: None,
            author_name: author_name.into(),
            text: text.into(),
        }
    }
    pub fn by(mut self, author_id: impl Into<String>) -> Self {
        self.author_id = Some(author_id.into());
        self
    }
    pub fn has_text(&self) -> bool {
        non_blank(&self.text).is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct CommentLog {
    #[n(0)]
    entries: Vec<Comment>,
}

impl CommentLog {
    /// Validates a remark into the comment that `append` would record, without recording it.
    pub fn prepare(&self, remark: &Remark) -> Result<Comment, ValidationError> {
        let text = non_blank(&remark.text).ok_or(ValidationError::EmptyComment)?;
        let author_name = non_blank(&remark.author_name).ok_or(ValidationError::EmptyAuthor)?;

        let (id, created_at) = match self.entries.last() {
            // clock skew must never reorder the log
            Some(last) => (last.id + 1, TimeStamp::new().max(last.created_at.clone())),
            None => (1, TimeStamp::new()),
        };

        Ok(Comment {
            id,
            author_name: author_name.to_string(),
            author_id: remark.author_id.clone(),
            text: text.to_string(),
            created_at,
        })
    }

    pub fn append(&mut self, remark: &Remark) -> Result<Comment, ValidationError> {
        let comment = self.prepare(remark)?;
        self.entries.push(comment.clone());
        Ok(comment)
    }

    pub(crate) fn record(&mut self, comment: Comment) {
        self.entries.push(comment);
    }

    /// Chronological, oldest first.
    pub fn all(&self) -> std::slice::Iter<'_, Comment> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&Comment> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn is_ordered(&self) -> bool {
        self.entries
            .windows(2)
            .all(|w| w[0].id < w[1].id && w[0].created_at <= w[1].created_at)
    }
}
