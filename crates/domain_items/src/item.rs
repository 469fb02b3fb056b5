//! Item aggregate

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{CoreError, ItemId, UserId};
use crate::workflow::{ClaimTransition, ClaimantUpdate};

/// Item category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    Electronics,
    Books,
    Clothing,
    Accessories,
    /// Student cards, passports, licences
    #[serde(rename = "IDs")]
    Ids,
    Others,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 6] = [
        ItemCategory::Electronics,
        ItemCategory::Books,
        ItemCategory::Clothing,
        ItemCategory::Accessories,
        ItemCategory::Ids,
        ItemCategory::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Electronics => "Electronics",
            ItemCategory::Books => "Books",
            ItemCategory::Clothing => "Clothing",
            ItemCategory::Accessories => "Accessories",
            ItemCategory::Ids => "IDs",
            ItemCategory::Others => "Others",
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ItemCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| CoreError::validation(format!("Unknown category: {s}")))
    }
}

/// Whether the item was lost or found by its reporter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Lost,
    Found,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Lost => "lost",
            ItemType::Found => "found",
        }
    }

    /// The perspective of the other party: a claimant of a lost report has found it
    pub fn opposite(&self) -> ItemType {
        match self {
            ItemType::Lost => ItemType::Found,
            ItemType::Found => ItemType::Lost,
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lost" => Ok(ItemType::Lost),
            "found" => Ok(ItemType::Found),
            other => Err(CoreError::validation(format!("Type must be lost or found, got {other}"))),
        }
    }
}

/// Item status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Open for claims
    Available,
    /// A claim awaits the reporter's decision
    Pending,
    /// Claim approved; terminal
    Claimed,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Available => "available",
            ItemStatus::Pending => "pending",
            ItemStatus::Claimed => "claimed",
        }
    }

    /// Statuses in which `claimed_by` must be set
    pub fn requires_claimant(&self) -> bool {
        matches!(self, ItemStatus::Pending | ItemStatus::Claimed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ItemStatus::Claimed)
    }

    /// Checks if transition is valid
    pub fn can_transition_to(&self, target: ItemStatus) -> bool {
        use ItemStatus::*;
        matches!(
            (*self, target),
            (Available, Pending) |
            (Pending, Claimed) |
            (Pending, Available)
        )
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(ItemStatus::Available),
            "pending" => Ok(ItemStatus::Pending),
            "claimed" => Ok(ItemStatus::Claimed),
            other => Err(CoreError::validation(format!("Unknown status: {other}"))),
        }
    }
}

/// A lost or found item report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier
    pub id: ItemId,
    pub category: ItemCategory,
    pub description: String,
    /// Day the item was lost or found
    pub date: NaiveDate,
    pub location: String,
    /// Lost or found; fixed at report time
    pub item_type: ItemType,
    pub status: ItemStatus,
    /// Owner of the report; fixed at report time
    pub reported_by: UserId,
    /// Claimant while pending or claimed
    pub claimed_by: Option<UserId>,
    pub photo_url: Option<String>,
    pub contact_info: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Creates a new available item owned by `reported_by`
    pub fn report(reported_by: UserId, report: NewItem) -> Self {
        Self {
            id: ItemId::new_v7(),
            category: report.category,
            description: report.description.trim().to_string(),
            date: report.date,
            location: report.location.trim().to_string(),
            item_type: report.item_type,
            status: ItemStatus::Available,
            reported_by,
            claimed_by: None,
            photo_url: non_blank(report.photo_url),
            contact_info: non_blank(report.contact_info),
            notes: non_blank(report.notes),
            created_at: Utc::now(),
        }
    }

    /// `claimed_by` is set exactly when the status requires a claimant
    pub fn has_consistent_claimant(&self) -> bool {
        self.claimed_by.is_some() == self.status.requires_claimant()
    }

    pub fn is_reported_by(&self, user: UserId) -> bool {
        self.reported_by == user
    }

    /// Applies a workflow transition in memory
    ///
    /// Stores that cannot express the guard in a single statement call this
    /// while holding their write lock.
    pub fn apply(&mut self, transition: &ClaimTransition) -> Result<(), CoreError> {
        let target = transition.target_status();
        if self.status != transition.expected_status() || !self.status.can_transition_to(target) {
            return Err(CoreError::invalid_state(format!(
                "Cannot move item from {} to {}",
                self.status, target
            )));
        }

        match transition.claimant_update() {
            ClaimantUpdate::Assign(claimant) => self.claimed_by = Some(claimant),
            ClaimantUpdate::Retain => {}
            ClaimantUpdate::Clear => self.claimed_by = None,
        }
        self.status = target;
        Ok(())
    }

    /// Applies a direct edit
    ///
    /// Status changes are refused here; they only happen through
    /// [`ClaimTransition`]s so the claimant invariant cannot be bypassed.
    pub fn apply_changes(&mut self, changes: &ItemChanges) -> Result<(), CoreError> {
        changes.validate_for(self.status)?;

        if let Some(category) = changes.category {
            self.category = category;
        }
        if let Some(description) = non_blank(changes.description.clone()) {
            self.description = description;
        }
        if let Some(date) = changes.date {
            self.date = date;
        }
        if let Some(location) = non_blank(changes.location.clone()) {
            self.location = location;
        }
        if let Some(photo_url) = non_blank(changes.photo_url.clone()) {
            self.photo_url = Some(photo_url);
        }
        if let Some(contact_info) = non_blank(changes.contact_info.clone()) {
            self.contact_info = Some(contact_info);
        }
        if let Some(notes) = non_blank(changes.notes.clone()) {
            self.notes = Some(notes);
        }
        Ok(())
    }
}

/// Data for reporting a new item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub category: ItemCategory,
    pub description: String,
    pub date: NaiveDate,
    pub location: String,
    pub item_type: ItemType,
    pub photo_url: Option<String>,
    pub contact_info: Option<String>,
    pub notes: Option<String>,
}

impl NewItem {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.description.trim().is_empty() {
            return Err(CoreError::validation("Description is required"));
        }
        if self.location.trim().is_empty() {
            return Err(CoreError::validation("Location is required"));
        }
        Ok(())
    }
}

/// Partial update of an item's descriptive fields
///
/// Blank optional text is ignored rather than clearing the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemChanges {
    pub category: Option<ItemCategory>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub location: Option<String>,
    /// Only accepted when equal to the current status
    pub status: Option<ItemStatus>,
    pub photo_url: Option<String>,
    pub contact_info: Option<String>,
    pub notes: Option<String>,
}

impl ItemChanges {
    /// Boundary checks that do not need the stored item
    pub fn validate(&self) -> Result<(), CoreError> {
        if matches!(&self.description, Some(d) if d.trim().is_empty()) {
            return Err(CoreError::validation("Description must be valid"));
        }
        if matches!(&self.location, Some(l) if l.trim().is_empty()) {
            return Err(CoreError::validation("Location must be valid"));
        }
        Ok(())
    }

    /// Full check including the status rule
    pub fn validate_for(&self, current: ItemStatus) -> Result<(), CoreError> {
        self.validate()?;
        match self.status {
            Some(requested) if requested != current => Err(CoreError::validation(format!(
                "Status cannot be changed from {current} to {requested} by editing; use the claim endpoints"
            ))),
            _ => Ok(()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &ItemChanges::default()
    }

    /// Trimmed copy with blank text and the status field dropped
    ///
    /// This is the form stores persist; call [`ItemChanges::validate_for`] first.
    pub fn normalized(&self) -> ItemChanges {
        ItemChanges {
            category: self.category,
            description: non_blank(self.description.clone()),
            date: self.date,
            location: non_blank(self.location.clone()),
            status: None,
            photo_url: non_blank(self.photo_url.clone()),
            contact_info: non_blank(self.contact_info.clone()),
            notes: non_blank(self.notes.clone()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
