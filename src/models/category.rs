/**
 * Category Model
 *
 * A top-level grouping for discussion threads.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Entity;

/// A forum category.
///
/// Names are expected to be unique by convention only; nothing at the data
/// layer enforces it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique category ID (assigned by the store on creation)
    pub id: String,
    /// Display name (non-empty)
    pub name: String,
    /// Created at timestamp
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Updated at timestamp
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Entity for Category {
    const COLLECTION: &'static str = "categories";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Mutable fields of a category. `id` and `created_at` cannot be named here,
/// so they cannot be patched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
}
