use std::collections::{BTreeSet, HashMap};

use polyglot_core::{FieldErrors, Page, PageParams, ServiceError, now_rfc3339};
use polyglot_sql::{Executor, Row, Value};
use tracing::{debug, info};

use crate::model::{Locale, Tag, TagRef, Translation, TranslationFilters, TranslationInput};
use crate::service::locale::find_locale;
use crate::service::tag::{TAG_NAME_MAX, find_tag, get_or_create_tag, row_to_tag};
use crate::service::{
    TranslationService, col_i64, col_text, constraint_or_storage, count_of, required_str, storage,
    taken, where_clause,
};

const KEY_MAX: usize = 255;

const TRANSLATION_FROM: &str = "translations t JOIN locales l ON l.id = t.locale_id";

const TRANSLATION_COLUMNS: &str = "t.id, t.locale_id, t.key, t.value, t.created_at, t.updated_at, \
     l.code AS locale_code, l.name AS locale_name, \
     l.created_at AS locale_created_at, l.updated_at AS locale_updated_at";

/// Validated translation fields.
struct TranslationFields<'a> {
    locale_id: i64,
    key: &'a str,
    value: &'a str,
}

impl TranslationService {
    /// List translations ascending by id with their locale and tags.
    ///
    /// Filters combine with AND: `key` is a prefix, `locale` an exact
    /// code, `tag` an exact tag name the translation must carry.
    pub fn list_translations(
        &self,
        filters: &TranslationFilters,
        params: &PageParams,
    ) -> Result<Page<Translation>, ServiceError> {
        let mut conds = Vec::new();
        let mut args: Vec<Value> = Vec::new();
        if let Some(key) = filters.key.as_deref().filter(|s| !s.is_empty()) {
            args.push(Value::from(key));
            conds.push(format!("substr(t.key, 1, length(?{n})) = ?{n}", n = args.len()));
        }
        if let Some(code) = filters.locale.as_deref().filter(|s| !s.is_empty()) {
            args.push(Value::from(code));
            conds.push(format!("l.code = ?{}", args.len()));
        }
        if let Some(tag) = filters.tag.as_deref().filter(|s| !s.is_empty()) {
            args.push(Value::from(tag));
            conds.push(format!(
                "EXISTS (SELECT 1 FROM tag_translations tt JOIN tags tg ON tg.id = tt.tag_id \
                 WHERE tt.translation_id = t.id AND tg.name = ?{})",
                args.len()
            ));
        }
        let where_sql = where_clause(&conds);

        let rows = self
            .sql
            .query(
                &format!("SELECT COUNT(*) AS cnt FROM {TRANSLATION_FROM}{where_sql}"),
                &args,
            )
            .map_err(storage)?;
        let total = count_of(&rows);

        args.push(Value::Integer(params.limit() as i64));
        args.push(Value::Integer(params.offset() as i64));
        let page_sql = format!(
            "FROM {TRANSLATION_FROM}{where_sql} ORDER BY t.id ASC LIMIT ?{} OFFSET ?{}",
            args.len() - 1,
            args.len()
        );

        let rows = self
            .sql
            .query(&format!("SELECT {TRANSLATION_COLUMNS} {page_sql}"), &args)
            .map_err(storage)?;

        // Tags for the whole page in one query; the page is re-selected
        // in a subquery so the id list never has to be bound.
        let tag_rows = self
            .sql
            .query(
                &format!(
                    "SELECT link.translation_id, g.id, g.name, g.created_at, g.updated_at \
                     FROM tag_translations link JOIN tags g ON g.id = link.tag_id \
                     WHERE link.translation_id IN (SELECT t.id {page_sql}) \
                     ORDER BY g.id ASC"
                ),
                &args,
            )
            .map_err(storage)?;
        let mut tags_by_translation: HashMap<i64, Vec<Tag>> = HashMap::new();
        for row in &tag_rows {
            tags_by_translation
                .entry(col_i64(row, "translation_id")?)
                .or_default()
                .push(row_to_tag(row)?);
        }

        let data = rows
            .iter()
            .map(|row| {
                let id = col_i64(row, "id")?;
                row_to_translation(row, tags_by_translation.remove(&id).unwrap_or_default())
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(data, params, total))
    }

    /// Create a translation and attach its tags.
    ///
    /// Tag names are resolved with get-or-create; tag ids must exist.
    /// Everything happens in one transaction.
    pub fn create_translation(&self, input: TranslationInput) -> Result<Translation, ServiceError> {
        let tx = self.sql.begin().map_err(storage)?;
        let fields = validate_translation(&*tx, &input, None)?;

        let now = now_rfc3339();
        let rows = tx
            .query(
                "INSERT INTO translations (locale_id, key, value, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?4) RETURNING id",
                &[
                    Value::Integer(fields.locale_id),
                    Value::from(fields.key),
                    Value::from(fields.value),
                    Value::Text(now),
                ],
            )
            .map_err(|e| constraint_or_storage(e, translation_constraint))?;
        let id = rows
            .first()
            .map(|r| col_i64(r, "id"))
            .transpose()?
            .ok_or_else(|| ServiceError::Internal("no row returned".into()))?;

        if let Some(refs) = &input.tags {
            let wanted = resolve_tags(&*tx, refs)?;
            sync_tags(&*tx, id, &wanted)?;
        }

        let translation = find_translation(&*tx, id)?.ok_or_else(not_found)?;
        tx.commit().map_err(storage)?;

        info!(
            "Created translation {} ({}) in locale {}",
            translation.key, translation.id, translation.locale.code
        );
        Ok(translation)
    }

    /// Get a translation by id with its locale and tags.
    pub fn get_translation(&self, id: i64) -> Result<Translation, ServiceError> {
        find_translation(self.sql.as_ref(), id)?.ok_or_else(not_found)
    }

    /// Replace a translation's locale, key and value.
    ///
    /// When `tags` is present the association set becomes exactly that
    /// list; when it is absent the current tags are kept.
    pub fn update_translation(
        &self,
        id: i64,
        input: TranslationInput,
    ) -> Result<Translation, ServiceError> {
        let tx = self.sql.begin().map_err(storage)?;
        translation_exists(&*tx, id)?;
        let fields = validate_translation(&*tx, &input, Some(id))?;

        tx.exec(
            "UPDATE translations SET locale_id = ?1, key = ?2, value = ?3, updated_at = ?4 \
             WHERE id = ?5",
            &[
                Value::Integer(fields.locale_id),
                Value::from(fields.key),
                Value::from(fields.value),
                Value::Text(now_rfc3339()),
                Value::Integer(id),
            ],
        )
        .map_err(|e| constraint_or_storage(e, translation_constraint))?;

        if let Some(refs) = &input.tags {
            let wanted = resolve_tags(&*tx, refs)?;
            sync_tags(&*tx, id, &wanted)?;
        }

        let translation = find_translation(&*tx, id)?.ok_or_else(not_found)?;
        tx.commit().map_err(storage)?;
        Ok(translation)
    }

    /// Delete a translation. Its tag links go with it.
    pub fn delete_translation(&self, id: i64) -> Result<(), ServiceError> {
        let affected = self
            .sql
            .exec("DELETE FROM translations WHERE id = ?1", &[Value::Integer(id)])
            .map_err(storage)?;
        if affected == 0 {
            return Err(not_found());
        }
        info!("Deleted translation {}", id);
        Ok(())
    }
}

fn not_found() -> ServiceError {
    ServiceError::NotFound("Translation not found".into())
}

/// Map a constraint violation on `translations` to the offending field.
fn translation_constraint(msg: &str) -> ServiceError {
    if msg.contains("translations.key") {
        taken("key")
    } else if msg.contains("translations.value") {
        taken("value")
    } else if msg.contains("FOREIGN KEY") {
        invalid_locale()
    } else {
        ServiceError::invalid("translation", msg.to_string())
    }
}

fn invalid_locale() -> ServiceError {
    ServiceError::invalid("locale_id", "The selected locale id is invalid.")
}

fn translation_exists<E: Executor + ?Sized>(db: &E, id: i64) -> Result<(), ServiceError> {
    let rows = db
        .query("SELECT id FROM translations WHERE id = ?1", &[Value::Integer(id)])
        .map_err(storage)?;
    if rows.is_empty() {
        return Err(not_found());
    }
    Ok(())
}

fn validate_translation<'a, E: Executor + ?Sized>(
    db: &E,
    input: &'a TranslationInput,
    ignore_id: Option<i64>,
) -> Result<TranslationFields<'a>, ServiceError> {
    let mut errors = FieldErrors::new();

    let locale_id = match input.locale_id {
        None => {
            errors.add("locale_id", "The locale id field is required.");
            None
        }
        Some(id) => match find_locale(db, id)? {
            Some(_) => Some(id),
            None => {
                errors.add("locale_id", "The selected locale id is invalid.");
                None
            }
        },
    };
    let key = required_str(&mut errors, "key", input.key.as_deref(), Some(KEY_MAX));
    let value = required_str(&mut errors, "value", input.value.as_deref(), None);

    if let Some(locale_id) = locale_id {
        let ignore = Value::Integer(ignore_id.unwrap_or(0));
        for (field, candidate) in [("key", key), ("value", value)] {
            let Some(candidate) = candidate else { continue };
            let rows = db
                .query(
                    &format!(
                        "SELECT id FROM translations WHERE locale_id = ?1 AND {field} = ?2 AND id != ?3"
                    ),
                    &[Value::Integer(locale_id), Value::from(candidate), ignore.clone()],
                )
                .map_err(storage)?;
            if !rows.is_empty() {
                errors.add(field, format!("The {field} has already been taken."));
            }
        }
    }

    for tag in input.tags.iter().flatten() {
        match tag {
            TagRef::Id(id) => {
                if find_tag(db, *id)?.is_none() {
                    errors.add("tags", format!("The selected tag id {id} is invalid."));
                }
            }
            TagRef::Name(name) => {
                let len = name.trim().chars().count();
                if len == 0 || len > TAG_NAME_MAX {
                    errors.add(
                        "tags",
                        format!("Each tag name must be between 1 and {TAG_NAME_MAX} characters."),
                    );
                }
            }
        }
    }

    errors.into_result()?;
    match (locale_id, key, value) {
        (Some(locale_id), Some(key), Some(value)) => Ok(TranslationFields {
            locale_id,
            key,
            value,
        }),
        _ => Err(ServiceError::Internal(
            "translation validation inconsistent".into(),
        )),
    }
}

/// Resolve tag references to a set of tag ids, creating named tags that
/// do not exist yet. Duplicates collapse.
fn resolve_tags<E: Executor + ?Sized>(
    db: &E,
    refs: &[TagRef],
) -> Result<BTreeSet<i64>, ServiceError> {
    let mut ids = BTreeSet::new();
    for r in refs {
        let id = match r {
            TagRef::Id(id) => *id,
            TagRef::Name(name) => get_or_create_tag(db, name)?.id,
        };
        ids.insert(id);
    }
    Ok(ids)
}

/// Make the translation's tag set exactly `wanted`, touching only the
/// links that differ.
fn sync_tags<E: Executor + ?Sized>(
    db: &E,
    translation_id: i64,
    wanted: &BTreeSet<i64>,
) -> Result<(), ServiceError> {
    let rows = db
        .query(
            "SELECT tag_id FROM tag_translations WHERE translation_id = ?1",
            &[Value::Integer(translation_id)],
        )
        .map_err(storage)?;
    let current = rows
        .iter()
        .map(|r| col_i64(r, "tag_id"))
        .collect::<Result<BTreeSet<_>, _>>()?;

    let removed: Vec<i64> = current.difference(wanted).copied().collect();
    let added: Vec<i64> = wanted.difference(&current).copied().collect();

    for tag_id in &removed {
        db.exec(
            "DELETE FROM tag_translations WHERE translation_id = ?1 AND tag_id = ?2",
            &[Value::Integer(translation_id), Value::Integer(*tag_id)],
        )
        .map_err(storage)?;
    }
    for tag_id in &added {
        db.exec(
            "INSERT INTO tag_translations (translation_id, tag_id) VALUES (?1, ?2) \
             ON CONFLICT DO NOTHING",
            &[Value::Integer(translation_id), Value::Integer(*tag_id)],
        )
        .map_err(|e| {
            constraint_or_storage(e, |_| {
                ServiceError::invalid("tags", format!("The selected tag id {tag_id} is invalid."))
            })
        })?;
    }

    if !removed.is_empty() || !added.is_empty() {
        debug!(
            "Synced tags of translation {}: added {:?}, removed {:?}",
            translation_id, added, removed
        );
    }
    Ok(())
}

pub(crate) fn find_translation<E: Executor + ?Sized>(
    db: &E,
    id: i64,
) -> Result<Option<Translation>, ServiceError> {
    let rows = db
        .query(
            &format!("SELECT {TRANSLATION_COLUMNS} FROM {TRANSLATION_FROM} WHERE t.id = ?1"),
            &[Value::Integer(id)],
        )
        .map_err(storage)?;
    let Some(row) = rows.first() else {
        return Ok(None);
    };

    let tag_rows = db
        .query(
            "SELECT g.id, g.name, g.created_at, g.updated_at \
             FROM tag_translations link JOIN tags g ON g.id = link.tag_id \
             WHERE link.translation_id = ?1 ORDER BY g.id ASC",
            &[Value::Integer(id)],
        )
        .map_err(storage)?;
    let tags = tag_rows.iter().map(row_to_tag).collect::<Result<Vec<_>, _>>()?;

    row_to_translation(row, tags).map(Some)
}

fn row_to_translation(row: &Row, tags: Vec<Tag>) -> Result<Translation, ServiceError> {
    let locale_id = col_i64(row, "locale_id")?;
    Ok(Translation {
        id: col_i64(row, "id")?,
        locale_id,
        key: col_text(row, "key")?,
        value: col_text(row, "value")?,
        created_at: col_text(row, "created_at")?,
        updated_at: col_text(row, "updated_at")?,
        locale: Locale {
            id: locale_id,
            code: col_text(row, "locale_code")?,
            name: col_text(row, "locale_name")?,
            created_at: col_text(row, "locale_created_at")?,
            updated_at: col_text(row, "locale_updated_at")?,
        },
        tags,
    })
}
