use polyglot_core::{FieldErrors, ServiceError, now_rfc3339};
use polyglot_sql::{Executor, Row, Value};
use tracing::info;

use crate::model::{Locale, LocaleInput};
use crate::service::{
    TranslationService, col_i64, col_text, constraint_or_storage, count_of, required_str, storage,
    taken,
};

const CODE_MAX: usize = 10;
const NAME_MAX: usize = 50;

const LOCALE_COLUMNS: &str = "id, code, name, created_at, updated_at";

/// Validated locale fields.
struct LocaleFields<'a> {
    code: &'a str,
    name: &'a str,
}

impl TranslationService {
    /// All locales, ordered by code.
    pub fn list_locales(&self) -> Result<Vec<Locale>, ServiceError> {
        let rows = self
            .sql
            .query(
                &format!("SELECT {LOCALE_COLUMNS} FROM locales ORDER BY code ASC"),
                &[],
            )
            .map_err(storage)?;
        rows.iter().map(row_to_locale).collect()
    }

    /// Create a locale. The code must be unique.
    pub fn create_locale(&self, input: LocaleInput) -> Result<Locale, ServiceError> {
        let tx = self.sql.begin().map_err(storage)?;
        let fields = validate_locale(&*tx, &input, None)?;

        let now = now_rfc3339();
        let rows = tx
            .query(
                &format!(
                    "INSERT INTO locales (code, name, created_at, updated_at) \
                     VALUES (?1, ?2, ?3, ?3) RETURNING {LOCALE_COLUMNS}"
                ),
                &[
                    Value::from(fields.code),
                    Value::from(fields.name),
                    Value::Text(now),
                ],
            )
            .map_err(|e| constraint_or_storage(e, |_| taken("code")))?;
        let locale = first_locale(&rows)?;
        tx.commit().map_err(storage)?;

        info!("Created locale {} ({})", locale.code, locale.id);
        Ok(locale)
    }

    /// Get a locale by id.
    pub fn get_locale(&self, id: i64) -> Result<Locale, ServiceError> {
        find_locale(self.sql.as_ref(), id)?.ok_or_else(not_found)
    }

    /// Replace a locale's code and name. Uniqueness ignores the locale itself.
    pub fn update_locale(&self, id: i64, input: LocaleInput) -> Result<Locale, ServiceError> {
        let tx = self.sql.begin().map_err(storage)?;
        find_locale(&*tx, id)?.ok_or_else(not_found)?;
        let fields = validate_locale(&*tx, &input, Some(id))?;

        let rows = tx
            .query(
                &format!(
                    "UPDATE locales SET code = ?1, name = ?2, updated_at = ?3 \
                     WHERE id = ?4 RETURNING {LOCALE_COLUMNS}"
                ),
                &[
                    Value::from(fields.code),
                    Value::from(fields.name),
                    Value::Text(now_rfc3339()),
                    Value::Integer(id),
                ],
            )
            .map_err(|e| constraint_or_storage(e, |_| taken("code")))?;
        let locale = first_locale(&rows)?;
        tx.commit().map_err(storage)?;
        Ok(locale)
    }

    /// Delete a locale.
    ///
    /// Refused while translations still reference it; the foreign key
    /// backs this up if a translation is added concurrently.
    pub fn delete_locale(&self, id: i64) -> Result<(), ServiceError> {
        let tx = self.sql.begin().map_err(storage)?;
        let locale = find_locale(&*tx, id)?.ok_or_else(not_found)?;

        let rows = tx
            .query(
                "SELECT COUNT(*) AS cnt FROM translations WHERE locale_id = ?1",
                &[Value::Integer(id)],
            )
            .map_err(storage)?;
        let in_use = count_of(&rows);
        if in_use > 0 {
            return Err(still_referenced(in_use));
        }

        tx.exec("DELETE FROM locales WHERE id = ?1", &[Value::Integer(id)])
            .map_err(|e| constraint_or_storage(e, |_| still_referenced(1)))?;
        tx.commit().map_err(storage)?;

        info!("Deleted locale {} ({})", locale.code, locale.id);
        Ok(())
    }
}

fn not_found() -> ServiceError {
    ServiceError::NotFound("Locale not found".into())
}

fn still_referenced(count: usize) -> ServiceError {
    ServiceError::invalid(
        "locale",
        format!("The locale is still used by {count} translation(s)."),
    )
}

pub(crate) fn find_locale<E: Executor + ?Sized>(
    db: &E,
    id: i64,
) -> Result<Option<Locale>, ServiceError> {
    let rows = db
        .query(
            &format!("SELECT {LOCALE_COLUMNS} FROM locales WHERE id = ?1"),
            &[Value::Integer(id)],
        )
        .map_err(storage)?;
    rows.first().map(row_to_locale).transpose()
}

fn validate_locale<'a, E: Executor + ?Sized>(
    db: &E,
    input: &'a LocaleInput,
    ignore_id: Option<i64>,
) -> Result<LocaleFields<'a>, ServiceError> {
    let mut errors = FieldErrors::new();
    let code = required_str(&mut errors, "code", input.code.as_deref(), Some(CODE_MAX));
    let name = required_str(&mut errors, "name", input.name.as_deref(), Some(NAME_MAX));

    if let Some(code) = code {
        let rows = db
            .query(
                "SELECT id FROM locales WHERE code = ?1 AND id != ?2",
                &[Value::from(code), Value::Integer(ignore_id.unwrap_or(0))],
            )
            .map_err(storage)?;
        if !rows.is_empty() {
            errors.add("code", "The code has already been taken.");
        }
    }

    errors.into_result()?;
    match (code, name) {
        (Some(code), Some(name)) => Ok(LocaleFields { code, name }),
        _ => Err(ServiceError::Internal("locale validation inconsistent".into())),
    }
}

fn first_locale(rows: &[Row]) -> Result<Locale, ServiceError> {
    rows.first()
        .map(row_to_locale)
        .transpose()?
        .ok_or_else(|| ServiceError::Internal("no row returned".into()))
}

fn row_to_locale(row: &Row) -> Result<Locale, ServiceError> {
    Ok(Locale {
        id: col_i64(row, "id")?,
        code: col_text(row, "code")?,
        name: col_text(row, "name")?,
        created_at: col_text(row, "created_at")?,
        updated_at: col_text(row, "updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::test_service;

    fn input(code: &str, name: &str) -> LocaleInput {
        LocaleInput {
            code: Some(code.into()),
            name: Some(name.into()),
        }
    }

    #[test]
    fn test_locale_crud() {
        let svc = test_service();

        let en = svc.create_locale(input("en", "English")).unwrap();
        assert_eq!(en.code, "en");
        assert!(en.id > 0);

        let fetched = svc.get_locale(en.id).unwrap();
        assert_eq!(fetched, en);

        let updated = svc.update_locale(en.id, input("en-US", "English (US)")).unwrap();
        assert_eq!(updated.code, "en-US");
        assert_eq!(updated.id, en.id);

        svc.delete_locale(en.id).unwrap();
        assert!(matches!(svc.get_locale(en.id), Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn test_list_ordered_by_code() {
        let svc = test_service();
        for (code, name) in [("jp", "Japanese"), ("de", "German"), ("en", "English")] {
            svc.create_locale(input(code, name)).unwrap();
        }
        let codes: Vec<String> = svc.list_locales().unwrap().into_iter().map(|l| l.code).collect();
        assert_eq!(codes, vec!["de", "en", "jp"]);
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let svc = test_service();
        svc.create_locale(input("en", "English")).unwrap();

        match svc.create_locale(input("en", "Other")) {
            Err(ServiceError::Validation(errors)) => {
                assert_eq!(errors.get("code").unwrap()[0], "The code has already been taken.");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(svc.list_locales().unwrap().len(), 1);
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        let svc = test_service();
        let en = svc.create_locale(input(" en ", " English")).unwrap();
        assert_eq!(en.code, "en");
        assert_eq!(en.name, "English");
        assert!(matches!(
            svc.create_locale(input("en", "Other")),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_update_keeps_own_code() {
        let svc = test_service();
        let en = svc.create_locale(input("en", "English")).unwrap();
        let de = svc.create_locale(input("de", "German")).unwrap();

        // Same code as itself is fine.
        svc.update_locale(en.id, input("en", "English (UK)")).unwrap();
        // Someone else's code is not.
        assert!(matches!(
            svc.update_locale(de.id, input("en", "German")),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_length_and_required_rules() {
        let svc = test_service();
        match svc.create_locale(input("abcdefghijk", "")) {
            Err(ServiceError::Validation(errors)) => {
                assert!(errors.get("code").is_some());
                assert!(errors.get("name").is_some());
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(svc.create_locale(LocaleInput::default()).is_err());
        let long_name = "x".repeat(51);
        assert!(svc.create_locale(input("xx", &long_name)).is_err());
    }

    #[test]
    fn test_missing_ids() {
        let svc = test_service();
        assert!(matches!(svc.get_locale(99), Err(ServiceError::NotFound(_))));
        assert!(matches!(
            svc.update_locale(99, input("en", "English")),
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(svc.delete_locale(99), Err(ServiceError::NotFound(_))));
    }
}
