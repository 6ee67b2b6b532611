pub mod schema;
pub mod locale;
pub mod tag;
pub mod translation;
pub mod export;

use std::sync::Arc;

use polyglot_core::{FieldErrors, ServiceError};
use polyglot_sql::{Row, SQLError, SQLStore};

/// The translation service: locale, tag and translation stores plus the
/// filter/export engine. All state lives in the SQL store.
pub struct TranslationService {
    pub(crate) sql: Arc<dyn SQLStore>,
}

impl TranslationService {
    /// Create a new TranslationService, initializing the DB schema.
    pub fn new(sql: Arc<dyn SQLStore>) -> Result<Arc<Self>, ServiceError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Arc::new(Self { sql }))
    }
}

// ── Error mapping ───────────────────────────────────────────────────

pub(crate) fn storage(e: SQLError) -> ServiceError {
    ServiceError::Storage(e.to_string())
}

/// Map a storage error, turning constraint violations into the
/// validation error produced by `on_constraint`.
///
/// The application-level uniqueness checks only produce friendlier
/// messages; the storage constraint is what actually holds the line
/// when two requests race.
pub(crate) fn constraint_or_storage(
    e: SQLError,
    on_constraint: impl FnOnce(&str) -> ServiceError,
) -> ServiceError {
    match e {
        SQLError::Constraint(msg) => on_constraint(&msg),
        other => storage(other),
    }
}

// ── Row decoding ────────────────────────────────────────────────────

pub(crate) fn col_text(row: &Row, name: &str) -> Result<String, ServiceError> {
    row.get_str(name)
        .map(String::from)
        .ok_or_else(|| ServiceError::Internal(format!("missing column {name}")))
}

pub(crate) fn col_i64(row: &Row, name: &str) -> Result<i64, ServiceError> {
    row.get_i64(name)
        .ok_or_else(|| ServiceError::Internal(format!("missing column {name}")))
}

pub(crate) fn count_of(rows: &[Row]) -> usize {
    rows.first()
        .and_then(|r| r.get_i64("cnt"))
        .unwrap_or(0)
        .max(0) as usize
}

/// Join filter conditions into a ` WHERE ...` clause (empty when none).
pub(crate) fn where_clause(conds: &[String]) -> String {
    if conds.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conds.join(" AND "))
    }
}

// ── Input validation ────────────────────────────────────────────────

fn label(field: &str) -> String {
    field.replace('_', " ")
}

pub(crate) fn taken(field: &str) -> ServiceError {
    ServiceError::invalid(field, format!("The {} has already been taken.", label(field)))
}

/// Validate a required string field, recording failures in `errors`.
///
/// Returns the trimmed value when it is present, non-blank and within
/// `max` characters.
pub(crate) fn required_str<'a>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&'a str>,
    max: Option<usize>,
) -> Option<&'a str> {
    let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        errors.add(field, format!("The {} field is required.", label(field)));
        return None;
    };
    if let Some(max) = max {
        if v.chars().count() > max {
            errors.add(
                field,
                format!(
                    "The {} field must not be greater than {} characters.",
                    label(field),
                    max
                ),
            );
            return None;
        }
    }
    Some(v)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_str_rules() {
        let mut errors = FieldErrors::new();
        assert_eq!(required_str(&mut errors, "code", Some("en"), Some(10)), Some("en"));
        assert_eq!(required_str(&mut errors, "code", Some(" en\t"), Some(2)), Some("en"));
        assert!(errors.is_empty());

        assert_eq!(required_str(&mut errors, "code", None, Some(10)), None);
        assert_eq!(required_str(&mut errors, "name", Some("   "), None), None);
        assert_eq!(
            required_str(&mut errors, "locale_id", Some("abcdefghijk"), Some(10)),
            None
        );
        assert_eq!(errors.get("code").unwrap()[0], "The code field is required.");
        assert_eq!(errors.get("name").unwrap()[0], "The name field is required.");
        assert_eq!(
            errors.get("locale_id").unwrap()[0],
            "The locale id field must not be greater than 10 characters."
        );
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let mut errors = FieldErrors::new();
        assert!(required_str(&mut errors, "name", Some("日本語日本語日本語日"), Some(10)).is_some());
        assert!(errors.is_empty());
    }

    #[test]
    fn constraint_maps_to_validation() {
        let err = constraint_or_storage(
            SQLError::Constraint("UNIQUE constraint failed: tags.name".into()),
            |_| taken("name"),
        );
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = constraint_or_storage(SQLError::Execution("disk I/O".into()), |_| taken("name"));
        assert!(matches!(err, ServiceError::Storage(_)));
    }
}
