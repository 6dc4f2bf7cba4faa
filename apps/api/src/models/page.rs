use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::layout::{normalize_layout, LayoutDocument, RawLayout};

/// A page exactly as stored. `layout` may be a native object or a JSON-encoded string.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PageRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub layout: Option<Value>,
    pub published: bool,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A page with its layout already normalized; the only form handed to renderers and
/// returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: Uuid,
    pub user_id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub layout: Option<LayoutDocument>,
    pub published: bool,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PageRow> for Page {
    fn from(row: PageRow) -> Self {
        Page {
            id: row.id,
            user_id: row.user_id,
            slug: row.slug,
            title: row.title,
            description: row.description,
            layout: normalize_layout(RawLayout::from(row.layout)),
            published: row.published,
            view_count: row.view_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Page {
    /// Published pages are visible to anyone; drafts only to their owner.
    pub fn is_visible_to(&self, viewer: Option<Uuid>) -> bool {
        self.published || viewer == Some(self.user_id)
    }
}

/// Fields supplied when creating a page. The layout always starts empty.
#[derive(Debug, Clone)]
pub struct NewPage {
    pub user_id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
}

/// Partial metadata update; `None` leaves a field as is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMetadataUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
}

/// Slugs are lowercase ASCII letters, digits and single inner hyphens, 1–100 chars.
pub fn validate_slug(slug: &str) -> Result<(), String> {
    if slug.is_empty() || slug.len() > 100 {
        return Err("slug must be between 1 and 100 characters".to_string());
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("slug may only contain lowercase letters, digits and '-'".to_string());
    }
    if slug.starts_with('-') || slug.ends_with('-') || slug.contains("--") {
        return Err("slug may not start or end with '-' or contain '--'".to_string());
    }
    Ok(())
}
