//! Wire DTOs for the admin API.
//!
//! # Design
//! Field names follow the backend's PascalCase JSON. The types are defined
//! independently from the mock-server crate; integration tests catch schema
//! drift between the two.

use serde::{Deserialize, Serialize};

/// A user as returned by `Users.Whoami`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Registration payload for `Users.Create`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct UserWithPassword {
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// A blog owned by the authenticated user. `slug` is unique within the
/// owner's list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Blog {
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Blog {
    /// Name shown in listings: the display name when set and non-empty,
    /// else the slug.
    pub fn name(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.slug,
        }
    }
}

/// Parameters of `Blogs.Delete`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteBlogArgs {
    pub slug: String,
}
