//! Pre-built Test Fixtures
//!
//! Ready-to-use actors and item reports. Values are fixed so assertions can
//! compare against them directly.

use chrono::NaiveDate;
use core_kernel::UserId;
use domain_items::{Actor, ItemCategory, ItemType, NewItem, Role, UserSummary};

/// Fixture for acting users
pub struct ActorFixtures;

impl ActorFixtures {
    pub fn student() -> Actor {
        Actor::new(UserId::new(), Role::Student)
    }

    pub fn staff() -> Actor {
        Actor::new(UserId::new(), Role::Staff)
    }

    pub fn admin() -> Actor {
        Actor::new(UserId::new(), Role::Admin)
    }
}

/// Fixture for directory entries
pub struct UserFixtures;

impl UserFixtures {
    /// A directory entry for `actor`
    pub fn summary_for(actor: &Actor, first_name: &str, last_name: &str) -> UserSummary {
        UserSummary {
            id: actor.id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            university_id: format!("UG{}", &actor.id.as_uuid().simple().to_string()[..8]),
        }
    }
}

/// Fixture for item reports
pub struct ItemFixtures;

impl ItemFixtures {
    /// Day most fixtures were lost or found on
    pub fn report_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
    }

    pub fn lost_phone() -> NewItem {
        NewItem {
            category: ItemCategory::Electronics,
            description: "Black iPhone 13 with a cracked screen protector".to_string(),
            date: Self::report_date(),
            location: "Balme Library, ground floor".to_string(),
            item_type: ItemType::Lost,
            photo_url: None,
            contact_info: Some("0241234567".to_string()),
            notes: None,
        }
    }

    pub fn found_wallet() -> NewItem {
        NewItem {
            category: ItemCategory::Accessories,
            description: "Brown leather wallet".to_string(),
            date: Self::report_date(),
            location: "Night market bus stop".to_string(),
            item_type: ItemType::Found,
            photo_url: Some("https://images.example.edu/wallet.jpg".to_string()),
            contact_info: None,
            notes: Some("Handed to the porters' lodge".to_string()),
        }
    }

    pub fn student_card() -> NewItem {
        NewItem {
            category: ItemCategory::Ids,
            description: "Student ID card".to_string(),
            date: Self::report_date(),
            location: "Great Hall".to_string(),
            item_type: ItemType::Found,
            photo_url: None,
            contact_info: None,
            notes: None,
        }
    }

    pub fn textbook() -> NewItem {
        NewItem {
            category: ItemCategory::Books,
            description: "Calculus textbook, 8th edition".to_string(),
            date: Self::report_date(),
            location: "Engineering lecture theatre".to_string(),
            item_type: ItemType::Lost,
            photo_url: None,
            contact_info: None,
            notes: None,
        }
    }
}
