//! Claim workflow
//!
//! ```text
//!              submit                approve
//!  available ─────────► pending ─────────────► claimed
//!      ▲                   │
//!      └───────────────────┘
//!             reject
//! ```
//!
//! Each transition is a compare-and-swap on the stored status followed by
//! exactly one notification. A failed notification does not undo the
//! transition. Both writes run on a spawned task, so a caller that gives up
//! waiting does not cut the pair in half.

use std::sync::Arc;

use core_kernel::{IdempotencyKey, ItemId, PortError, UserId};

use crate::actor::Actor;
use crate::authorization::{ensure_can_mutate, ItemAction};
use crate::error::ItemError;
use crate::idempotency::{ClaimOperation, IdempotencyRecord};
use crate::item::{Item, ItemStatus};
use crate::notification::NotificationDispatcher;
use crate::ports::{IdempotencyPort, ItemPort, NotificationPort, TransitionOutcome};

/// A status change driven by the claim workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimTransition {
    /// available → pending, recording the claimant
    Submit { claimant: UserId },
    /// pending → claimed, keeping the claimant
    Approve,
    /// pending → available, clearing the claimant
    Reject,
}

/// What a transition does to `claimed_by`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimantUpdate {
    Assign(UserId),
    Retain,
    Clear,
}

impl ClaimTransition {
    pub fn resolution(approve: bool) -> Self {
        if approve {
            ClaimTransition::Approve
        } else {
            ClaimTransition::Reject
        }
    }

    /// Status the item must be in for the transition to apply
    pub fn expected_status(&self) -> ItemStatus {
        match self {
            ClaimTransition::Submit { .. } => ItemStatus::Available,
            ClaimTransition::Approve | ClaimTransition::Reject => ItemStatus::Pending,
        }
    }

    pub fn target_status(&self) -> ItemStatus {
        match self {
            ClaimTransition::Submit { .. } => ItemStatus::Pending,
            ClaimTransition::Approve => ItemStatus::Claimed,
            ClaimTransition::Reject => ItemStatus::Available,
        }
    }

    pub fn claimant_update(&self) -> ClaimantUpdate {
        match self {
            ClaimTransition::Submit { claimant } => ClaimantUpdate::Assign(*claimant),
            ClaimTransition::Approve => ClaimantUpdate::Retain,
            ClaimTransition::Reject => ClaimantUpdate::Clear,
        }
    }

    pub fn operation(&self) -> ClaimOperation {
        match self {
            ClaimTransition::Submit { .. } => ClaimOperation::SubmitClaim,
            ClaimTransition::Approve => ClaimOperation::ApproveClaim,
            ClaimTransition::Reject => ClaimOperation::RejectClaim,
        }
    }

    /// Message returned when the item is not in the expected status
    pub fn conflict_message(&self) -> &'static str {
        match self {
            ClaimTransition::Submit { .. } => "Item not available for claim",
            ClaimTransition::Approve | ClaimTransition::Reject => "This item is not pending approval",
        }
    }
}

/// Runs claim transitions and their notifications
#[derive(Clone)]
pub struct ClaimWorkflow {
    items: Arc<dyn ItemPort>,
    dispatcher: NotificationDispatcher,
    idempotency: Arc<dyn IdempotencyPort>,
}

impl ClaimWorkflow {
    pub fn new(
        items: Arc<dyn ItemPort>,
        notifications: Arc<dyn NotificationPort>,
        idempotency: Arc<dyn IdempotencyPort>,
    ) -> Self {
        Self {
            items,
            dispatcher: NotificationDispatcher::new(notifications),
            idempotency,
        }
    }

    /// Claims an available item for the acting user
    ///
    /// Any authenticated user may claim, including the reporter.
    pub async fn submit_claim(
        &self,
        item_id: ItemId,
        actor: &Actor,
        key: Option<IdempotencyKey>,
    ) -> Result<Item, ItemError> {
        let transition = ClaimTransition::Submit { claimant: actor.id };
        if let Some(item) = self.replay(key, actor, item_id, transition.operation()).await? {
            return Ok(item);
        }

        self.commit_detached(item_id, actor, transition, key).await
    }

    /// Approves or rejects the pending claim on an item
    ///
    /// Only the reporter or an admin may resolve.
    pub async fn resolve_claim(
        &self,
        item_id: ItemId,
        actor: &Actor,
        approve: bool,
        key: Option<IdempotencyKey>,
    ) -> Result<Item, ItemError> {
        let transition = ClaimTransition::resolution(approve);
        if let Some(item) = self.replay(key, actor, item_id, transition.operation()).await? {
            return Ok(item);
        }

        let item = self
            .items
            .get_item(item_id)
            .await
            .map_err(ItemError::from_item_lookup(item_id))?;
        ensure_can_mutate(&item, actor, ItemAction::ResolveClaim)?;

        self.commit_detached(item_id, actor, transition, key).await
    }

    /// Runs [`Self::commit`] on its own task
    ///
    /// Dropping the caller (a request timeout, a closed connection) cannot
    /// stop the task between the status write and the notification write.
    async fn commit_detached(
        &self,
        item_id: ItemId,
        actor: &Actor,
        transition: ClaimTransition,
        key: Option<IdempotencyKey>,
    ) -> Result<Item, ItemError> {
        let workflow = self.clone();
        let actor = *actor;
        tokio::spawn(async move { workflow.commit(item_id, actor, transition, key).await })
            .await
            .map_err(|err| {
                ItemError::Store(PortError::internal(format!(
                    "Claim task for item {item_id} did not finish: {err}"
                )))
            })?
    }

    /// Applies the transition, records the idempotency key and notifies
    async fn commit(
        &self,
        item_id: ItemId,
        actor: Actor,
        transition: ClaimTransition,
        key: Option<IdempotencyKey>,
    ) -> Result<Item, ItemError> {
        let outcome = self.apply(item_id, &transition).await?;

        let resolved = match transition {
            ClaimTransition::Submit { claimant } => {
                if outcome.item.is_reported_by(claimant) {
                    tracing::info!(item_id = %item_id, user_id = %claimant, "Reporter claimed their own item");
                }
                tracing::info!(item_id = %item_id, claimant = %claimant, "Claim submitted");
                None
            }
            ClaimTransition::Approve | ClaimTransition::Reject => {
                let claimant = outcome.previous_claimant.ok_or_else(|| {
                    ItemError::Store(PortError::internal(format!(
                        "Item {item_id} was pending without a claimant"
                    )))
                })?;
                let approved = transition == ClaimTransition::Approve;
                tracing::info!(
                    item_id = %item_id,
                    claimant = %claimant,
                    approved,
                    resolved_by = %actor.id,
                    "Claim resolved"
                );
                Some((claimant, approved))
            }
        };

        self.remember(key, &actor, transition.operation(), item_id).await;
        let notified = match resolved {
            None => self.dispatcher.claim_submitted(&outcome.item).await,
            Some((claimant, approved)) => {
                self.dispatcher
                    .claim_resolved(&outcome.item, claimant, approved)
                    .await
            }
        };
        notified.map_err(|source| notification_failed(item_id, source))?;

        Ok(outcome.item)
    }

    async fn apply(
        &self,
        item_id: ItemId,
        transition: &ClaimTransition,
    ) -> Result<TransitionOutcome, ItemError> {
        if let Some(outcome) = self.items.transition(item_id, transition).await? {
            return Ok(outcome);
        }

        let current = self
            .items
            .get_item(item_id)
            .await
            .map_err(ItemError::from_item_lookup(item_id))?;
        tracing::warn!(
            item_id = %item_id,
            status = %current.status,
            expected = %transition.expected_status(),
            "Claim transition lost"
        );
        Err(ItemError::Conflict {
            message: transition.conflict_message().to_string(),
            current: current.status,
        })
    }

    /// Returns the current item if this request was already completed under `key`
    async fn replay(
        &self,
        key: Option<IdempotencyKey>,
        actor: &Actor,
        item_id: ItemId,
        operation: ClaimOperation,
    ) -> Result<Option<Item>, ItemError> {
        let Some(key) = key else {
            return Ok(None);
        };
        let Some(record) = self.idempotency.lookup(key, actor.id).await? else {
            return Ok(None);
        };
        if !record.matches(item_id, operation) {
            return Err(ItemError::validation(
                "Idempotency key was already used for a different request",
            ));
        }

        tracing::debug!(item_id = %item_id, key = %key, %operation, "Replaying completed claim request");
        let item = self
            .items
            .get_item(item_id)
            .await
            .map_err(ItemError::from_item_lookup(item_id))?;
        Ok(Some(item))
    }

    async fn remember(
        &self,
        key: Option<IdempotencyKey>,
        actor: &Actor,
        operation: ClaimOperation,
        item_id: ItemId,
    ) {
        let Some(key) = key else {
            return;
        };
        let record = IdempotencyRecord::new(key, actor.id, operation, item_id);
        if let Err(err) = self.idempotency.store(&record).await {
            tracing::warn!(key = %key, error = %err, "Failed to store idempotency record");
        }
    }
}

fn notification_failed(item_id: ItemId, source: PortError) -> ItemError {
    tracing::error!(item_id = %item_id, error = %source, "Claim notification could not be recorded");
    ItemError::NotificationFailed { item_id, source }
}
