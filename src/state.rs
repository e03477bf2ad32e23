//! Approval state machine
//!
//! The only code path that changes a creative's status. Every event is validated
//! in full before the creative is touched, so a refused event leaves both the
//! status and the comment log exactly as they were.
//!
//! | From | Event | Guard | To |
//! |---|---|---|---|
//! | any | approve(remark?) | none | approved |
//! | any | reject(remark) | remark has text | rejected |
//! | any | reset_to_pending | none | pending |
use super::comment::Remark;
use super::creative::{Creative, CreativeStatus};
use super::error::{ReviewError, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalEvent {
    Approve { remark: Option<Remark> },
    Reject { remark: Remark },
    ResetToPending,
}

impl ApprovalEvent {
    pub fn approve() -> Self {
        Self::Approve { remark: None }
    }
    pub fn approve_with(remark: Remark) -> Self {
        Self::Approve {
            remark: Some(remark),
        }
    }
    pub fn reject(remark: Remark) -> Self {
        Self::Reject { remark }
    }
    pub fn name(&self) -> &'static str {
        match self {
            Self::Approve { .. } => "approve",
            Self::Reject { .. } => "reject",
            Self::ResetToPending => "reset_to_pending",
        }
    }
}

/// What an applied event did to the creative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: CreativeStatus,
    pub to: CreativeStatus,
    pub commented: bool,
}

impl Transition {
    /// False for a silent re-approval and similar no-ops.
    pub fn changed(&self) -> bool {
        self.from != self.to || self.commented
    }
}

pub struct ApprovalStateMachine;

impl ApprovalStateMachine {
    /// Target status for `event`, or the guard that refused it.
    pub fn transition(
        _current: CreativeStatus,
        event: &ApprovalEvent,
    ) -> Result<CreativeStatus, ValidationError> {
        match event {
            ApprovalEvent::Approve { .. } => Ok(CreativeStatus::Approved),
            ApprovalEvent::Reject { remark } if remark.has_text() => Ok(CreativeStatus::Rejected),
            ApprovalEvent::Reject { .. } => Err(ValidationError::CommentRequiredForRejection),
            ApprovalEvent::ResetToPending => Ok(CreativeStatus::Pending),
        }
    }

    pub fn can_transition(current: CreativeStatus, event: &ApprovalEvent) -> bool {
        Self::transition(current, event).is_ok()
    }

    /// Applies `event` to `creative` as one unit: the comment and the status change
    /// land together or not at all.
    pub fn apply(
        creative: &mut Creative,
        event: &ApprovalEvent,
    ) -> Result<Transition, ReviewError> {
        creative.ensure_live()?;

        let from = creative.status();
        let to = Self::transition(from, event)?;

        let remark = match event {
            ApprovalEvent::Approve { remark } => remark.as_ref(),
            ApprovalEvent::Reject { remark } => Some(remark),
            ApprovalEvent::ResetToPending => None,
        };
        let comment = remark
            .map(|remark| creative.comments().prepare(remark))
            .transpose()?;

        // nothing below can fail
        let commented = comment.is_some();
        if let Some(comment) = comment {
            creative.comment_log_mut().record(comment);
        }
        creative.set_status(to);

        let transition = Transition { from, to, commented };
        if transition.changed() {
            creative.touch();
        }

        Ok(transition)
    }
}
