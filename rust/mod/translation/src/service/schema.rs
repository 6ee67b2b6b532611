use polyglot_core::ServiceError;
use polyglot_sql::SQLStore;

/// SQL schema for locales, tags, translations and their join table.
///
/// Uniqueness lives in the schema: `locales.code`, `tags.name`,
/// `(locale_id, key)` and `(locale_id, value)`. A translation pins its
/// locale (RESTRICT); tag links go away with either side (CASCADE).
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS locales (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    code        TEXT NOT NULL UNIQUE,
    name        TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tags (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS translations (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    locale_id   INTEGER NOT NULL REFERENCES locales(id) ON DELETE RESTRICT,
    key         TEXT NOT NULL,
    value       TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    UNIQUE (locale_id, key),
    UNIQUE (locale_id, value)
);
CREATE INDEX IF NOT EXISTS idx_translations_key ON translations(key);

CREATE TABLE IF NOT EXISTS tag_translations (
    translation_id  INTEGER NOT NULL REFERENCES translations(id) ON DELETE CASCADE,
    tag_id          INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    PRIMARY KEY (translation_id, tag_id)
) WITHOUT ROWID;
CREATE INDEX IF NOT EXISTS idx_tag_translations_tag ON tag_translations(tag_id);
";

/// Initialize the SQLite schema for all translation resources.
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), ServiceError> {
    sql.exec_batch(SCHEMA)
        .map_err(|e| ServiceError::Storage(format!("translation schema init: {e}")))
}
