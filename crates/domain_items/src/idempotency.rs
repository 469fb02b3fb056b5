//! Retry safety for claim operations
//!
//! Clients may attach an idempotency key to a claim request. The first
//! successful request under a key is recorded; a retry with the same key
//! replays the current item instead of running the transition (and its
//! notification) a second time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{CoreError, IdempotencyKey, ItemId, UserId};

/// The claim operation a key was used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimOperation {
    SubmitClaim,
    ApproveClaim,
    RejectClaim,
}

impl ClaimOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimOperation::SubmitClaim => "submit_claim",
            ClaimOperation::ApproveClaim => "approve_claim",
            ClaimOperation::RejectClaim => "reject_claim",
        }
    }
}

impl fmt::Display for ClaimOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimOperation {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submit_claim" => Ok(ClaimOperation::SubmitClaim),
            "approve_claim" => Ok(ClaimOperation::ApproveClaim),
            "reject_claim" => Ok(ClaimOperation::RejectClaim),
            other => Err(CoreError::validation(format!("Unknown claim operation: {other}"))),
        }
    }
}

/// A completed claim request, scoped to the user who sent it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdempotencyRecord {
    pub key: IdempotencyKey,
    pub user_id: UserId,
    pub operation: ClaimOperation,
    pub item_id: ItemId,
    pub created_at: DateTime<Utc>,
}

impl IdempotencyRecord {
    pub fn new(key: IdempotencyKey, user_id: UserId, operation: ClaimOperation, item_id: ItemId) -> Self {
        Self {
            key,
            user_id,
            operation,
            item_id,
            created_at: Utc::now(),
        }
    }

    /// True if a retry targets the same item with the same operation
    pub fn matches(&self, item_id: ItemId, operation: ClaimOperation) -> bool {
        self.item_id == item_id && self.operation == operation
    }
}
