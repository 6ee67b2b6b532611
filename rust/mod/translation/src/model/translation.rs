use serde::{Deserialize, Serialize};

use super::{Locale, Tag};

/// A (locale, key) → value mapping, with its locale and tags loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translation {
    pub id: i64,
    pub locale_id: i64,

    /// Dotted identifier, unique per locale (e.g. "app.title").
    pub key: String,

    /// Localized text, unique per locale.
    pub value: String,

    pub created_at: String,
    pub updated_at: String,

    pub locale: Locale,

    /// Attached tags, ascending by id.
    pub tags: Vec<Tag>,
}

/// A tag reference in a translation body: a name (created on demand)
/// or the id of an existing tag.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TagRef {
    Id(i64),
    Name(String),
}

/// Body of `POST /translations` and `PUT /translations/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslationInput {
    #[serde(default)]
    pub locale_id: Option<i64>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<String>,

    /// `None` leaves the tag set untouched on update;
    /// `Some(vec![])` detaches every tag.
    #[serde(default)]
    pub tags: Option<Vec<TagRef>>,
}

/// `GET /translations?key=&locale=&tag=`: all filters combine with AND.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslationFilters {
    /// Key prefix.
    #[serde(default)]
    pub key: Option<String>,

    /// Exact locale code.
    #[serde(default)]
    pub locale: Option<String>,

    /// Exact tag name (case-sensitive).
    #[serde(default)]
    pub tag: Option<String>,
}

/// `GET /translations/export?locale=&tag=`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub locale: Option<String>,

    /// Comma-separated tag names, each trimmed; a translation matches if
    /// it carries any.
    #[serde(default)]
    pub tag: Option<String>,
}

/// Parsed export scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportFilters {
    pub locale: Option<String>,
    /// Empty means no tag restriction.
    pub tags: Vec<String>,
}

impl From<ExportQuery> for ExportFilters {
    fn from(q: ExportQuery) -> Self {
        let tags = q
            .tag
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();
        Self {
            locale: q.locale.filter(|l| !l.is_empty()),
            tags,
        }
    }
}
