//! Property-Based Test Generators
//!
//! Proptest strategies for item data, plus `fake`-backed helpers for
//! realistic-looking text.

use chrono::NaiveDate;
use core_kernel::UserId;
use domain_items::{ClaimTransition, ItemCategory, ItemType, NewItem, UserSummary};
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use proptest::prelude::*;

/// Strategy for generating item categories
pub fn item_category_strategy() -> impl Strategy<Value = ItemCategory> {
    proptest::sample::select(ItemCategory::ALL.to_vec())
}

pub fn item_type_strategy() -> impl Strategy<Value = ItemType> {
    prop_oneof![Just(ItemType::Lost), Just(ItemType::Found)]
}

/// Dates within 2023-2025
pub fn item_date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2023i32..=2025, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

/// Strategy for generating reports that pass validation
pub fn new_item_strategy() -> impl Strategy<Value = NewItem> {
    (
        item_category_strategy(),
        "[A-Za-z][A-Za-z0-9 ]{2,60}",
        item_date_strategy(),
        "[A-Za-z][A-Za-z0-9 ,]{2,40}",
        item_type_strategy(),
        proptest::option::of("[a-z0-9 ]{1,30}"),
    )
        .prop_map(|(category, description, date, location, item_type, notes)| NewItem {
            category,
            description,
            date,
            location,
            item_type,
            photo_url: None,
            contact_info: None,
            notes,
        })
}

/// Arbitrary claim transitions, valid or not for any given state
pub fn claim_transition_strategy() -> impl Strategy<Value = ClaimTransition> {
    prop_oneof![
        Just(ClaimTransition::Submit {
            claimant: UserId::new()
        }),
        Just(ClaimTransition::Approve),
        Just(ClaimTransition::Reject),
    ]
}

/// A directory entry with generated names
pub fn fake_user_summary(id: UserId) -> UserSummary {
    UserSummary {
        id,
        first_name: FirstName().fake(),
        last_name: LastName().fake(),
        university_id: (10_000_000u32..99_999_999).fake::<u32>().to_string(),
    }
}

/// A plausible free-text description
pub fn fake_description() -> String {
    Sentence(3..8).fake()
}
