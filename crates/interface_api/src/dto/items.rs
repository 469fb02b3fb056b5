//! Item DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{ItemId, UserId};
use domain_items::{
    Item, ItemCategory, ItemChanges, ItemDetails, ItemFilter, ItemStatus, ItemType, NewItem,
    UserSummary,
};

use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub category: ItemCategory,
    #[validate(length(min = 1, max = 2000, message = "Description is required"))]
    pub description: String,
    /// YYYY-MM-DD
    pub date: NaiveDate,
    #[validate(length(min = 1, max = 255, message = "Location is required"))]
    pub location: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[validate(length(max = 2048, message = "Photo URL is too long"))]
    pub photo_url: Option<String>,
    #[validate(length(max = 255, message = "Contact info is too long"))]
    pub contact_info: Option<String>,
    #[validate(length(max = 2000, message = "Notes are too long"))]
    pub notes: Option<String>,
}

impl From<CreateItemRequest> for NewItem {
    fn from(request: CreateItemRequest) -> Self {
        NewItem {
            category: request.category,
            description: request.description,
            date: request.date,
            location: request.location,
            item_type: request.item_type,
            photo_url: request.photo_url,
            contact_info: request.contact_info,
            notes: request.notes,
        }
    }
}

/// Partial edit; unknown fields such as `claimedBy` are ignored
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub category: Option<ItemCategory>,
    #[validate(length(min = 1, max = 2000, message = "Description must be valid"))]
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 255, message = "Location must be valid"))]
    pub location: Option<String>,
    pub status: Option<ItemStatus>,
    #[validate(length(max = 2048, message = "Photo URL is too long"))]
    pub photo_url: Option<String>,
    #[validate(length(max = 255, message = "Contact info is too long"))]
    pub contact_info: Option<String>,
    #[validate(length(max = 2000, message = "Notes are too long"))]
    pub notes: Option<String>,
}

impl From<UpdateItemRequest> for ItemChanges {
    fn from(request: UpdateItemRequest) -> Self {
        ItemChanges {
            category: request.category,
            description: request.description,
            date: request.date,
            location: request.location,
            status: request.status,
            photo_url: request.photo_url,
            contact_info: request.contact_info,
            notes: request.notes,
        }
    }
}

/// Body of `PUT /api/items/:id/process-claim`
///
/// A missing or non-boolean `approve` is rejected while deserializing.
#[derive(Debug, Deserialize, Validate)]
pub struct ProcessClaimRequest {
    pub approve: bool,
}

/// `GET /api/items` query string
///
/// Values arrive as raw strings so an empty parameter means "no filter".
#[derive(Debug, Default, Deserialize)]
pub struct ListItemsQuery {
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

impl ListItemsQuery {
    pub fn into_filter(self) -> Result<ItemFilter, ApiError> {
        Ok(ItemFilter {
            item_type: parse_param(self.item_type)?,
            category: parse_param(self.category)?,
            status: parse_param(self.status)?,
            search: self.search.filter(|s| !s.trim().is_empty()),
        })
    }
}

fn parse_param<T>(value: Option<String>) -> Result<Option<T>, ApiError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ApiError::Validation(e.to_string())),
    }
}

/// A user reference; names are present when the directory knows the user
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserRefResponse {
    pub id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university_id: Option<String>,
}

impl UserRefResponse {
    fn bare(id: UserId) -> Self {
        Self {
            id,
            first_name: None,
            last_name: None,
            university_id: None,
        }
    }

    fn resolved(id: UserId, summary: Option<UserSummary>) -> Self {
        match summary {
            Some(user) => Self {
                id,
                first_name: Some(user.first_name),
                last_name: Some(user.last_name),
                university_id: Some(user.university_id),
            },
            None => Self::bare(id),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: ItemId,
    pub category: ItemCategory,
    pub description: String,
    pub date: NaiveDate,
    pub location: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub status: ItemStatus,
    pub reported_by: UserRefResponse,
    pub claimed_by: Option<UserRefResponse>,
    pub photo_url: Option<String>,
    pub contact_info: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            category: item.category,
            description: item.description,
            date: item.date,
            location: item.location,
            item_type: item.item_type,
            status: item.status,
            reported_by: UserRefResponse::bare(item.reported_by),
            claimed_by: item.claimed_by.map(UserRefResponse::bare),
            photo_url: item.photo_url,
            contact_info: item.contact_info,
            notes: item.notes,
            created_at: item.created_at,
        }
    }
}

impl From<ItemDetails> for ItemResponse {
    fn from(details: ItemDetails) -> Self {
        let ItemDetails {
            item,
            reporter,
            claimant,
        } = details;
        let reported_by = UserRefResponse::resolved(item.reported_by, reporter);
        let claimed_by = item
            .claimed_by
            .map(|id| UserRefResponse::resolved(id, claimant));

        Self {
            reported_by,
            claimed_by,
            ..ItemResponse::from(item)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
