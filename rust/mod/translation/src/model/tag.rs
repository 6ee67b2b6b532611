use serde::{Deserialize, Serialize};

/// A free-text label attachable to many translations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Body of `POST /tags` and `PUT /tags/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagInput {
    #[serde(default)]
    pub name: Option<String>,
}

/// `GET /tags?search=`: name prefix filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagSearch {
    #[serde(default)]
    pub search: Option<String>,
}
