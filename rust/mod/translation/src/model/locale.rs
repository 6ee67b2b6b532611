use serde::{Deserialize, Serialize};

/// A language/region identifier with a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    pub id: i64,

    /// Short code, unique across locales (e.g. "en").
    pub code: String,

    /// Display name (e.g. "English").
    pub name: String,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

/// Body of `POST /locales` and `PUT /locales/{id}`.
///
/// Fields are optional here so that missing ones surface as
/// per-field validation messages instead of a deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocaleInput {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}
