//! Data Transfer Objects for API requests/responses

pub mod items;
pub mod notifications;
