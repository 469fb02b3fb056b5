//! Read-side filtering over items

use std::cmp::Ordering;

use crate::item::{Item, ItemCategory, ItemStatus, ItemType};

/// Optional exact-match filters combined with AND, plus free-text search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub item_type: Option<ItemType>,
    pub category: Option<ItemCategory>,
    pub status: Option<ItemStatus>,
    /// Matched against description, location, and category
    pub search: Option<String>,
}

impl ItemFilter {
    /// Creates a filter on status only
    pub fn by_status(status: ItemStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Adds a free-text search
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Lowercased, whitespace-separated search terms
    ///
    /// An item matches the search if any term occurs in any searchable field.
    pub fn search_terms(&self) -> Vec<String> {
        self.search
            .as_deref()
            .map(|s| s.split_whitespace().map(str::to_lowercase).collect())
            .unwrap_or_default()
    }

    pub fn matches(&self, item: &Item) -> bool {
        if let Some(item_type) = self.item_type {
            if item.item_type != item_type {
                return false;
            }
        }
        if let Some(category) = self.category {
            if item.category != category {
                return false;
            }
        }
        if let Some(status) = self.status {
            if item.status != status {
                return false;
            }
        }

        let terms = self.search_terms();
        if terms.is_empty() {
            return true;
        }
        let haystacks = [
            item.description.to_lowercase(),
            item.location.to_lowercase(),
            item.category.as_str().to_lowercase(),
        ];
        terms
            .iter()
            .any(|term| haystacks.iter().any(|field| field.contains(term.as_str())))
    }
}

/// Most recent report first; ties broken by the time-ordered id
pub fn newest_first(a: &Item, b: &Item) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

pub fn sort_newest_first(items: &mut [Item]) {
    items.sort_by(newest_first);
}
