//! Test Data Builders
//!
//! Builders that produce items already in a given lifecycle state, for
//! seeding stores directly without running the workflow.

use chrono::{DateTime, Duration, Utc};
use core_kernel::UserId;
use domain_items::{ClaimTransition, Item, ItemCategory, ItemType, NewItem};

use crate::fixtures::ItemFixtures;

enum TargetState {
    Available,
    Pending(UserId),
    Claimed(UserId),
}

/// Builder for items
pub struct ItemBuilder {
    reporter: UserId,
    report: NewItem,
    state: TargetState,
    created_at: Option<DateTime<Utc>>,
}

impl Default for ItemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemBuilder {
    /// An available lost phone reported by a fresh user
    pub fn new() -> Self {
        Self {
            reporter: UserId::new(),
            report: ItemFixtures::lost_phone(),
            state: TargetState::Available,
            created_at: None,
        }
    }

    pub fn reported_by(mut self, reporter: UserId) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn from_report(mut self, report: NewItem) -> Self {
        self.report = report;
        self
    }

    pub fn category(mut self, category: ItemCategory) -> Self {
        self.report.category = category;
        self
    }

    pub fn item_type(mut self, item_type: ItemType) -> Self {
        self.report.item_type = item_type;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.report.description = description.into();
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.report.location = location.into();
        self
    }

    /// Pending with a claim from `claimant`
    pub fn pending(mut self, claimant: UserId) -> Self {
        self.state = TargetState::Pending(claimant);
        self
    }

    /// Claimed by `claimant`
    pub fn claimed(mut self, claimant: UserId) -> Self {
        self.state = TargetState::Claimed(claimant);
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Created `minutes` before now
    pub fn created_minutes_ago(self, minutes: i64) -> Self {
        self.created_at(Utc::now() - Duration::minutes(minutes))
    }

    pub fn build(self) -> Item {
        let mut item = Item::report(self.reporter, self.report);
        let steps: Vec<ClaimTransition> = match self.state {
            TargetState::Available => vec![],
            TargetState::Pending(claimant) => vec![ClaimTransition::Submit { claimant }],
            TargetState::Claimed(claimant) => {
                vec![ClaimTransition::Submit { claimant }, ClaimTransition::Approve]
            }
        };
        for step in &steps {
            item.apply(step)
                .expect("builder transitions follow the lifecycle");
        }
        if let Some(created_at) = self.created_at {
            item.created_at = created_at;
        }
        item
    }
}
