use polyglot_core::{FieldErrors, Page, PageParams, ServiceError, now_rfc3339};
use polyglot_sql::{Executor, Row, Value};
use tracing::info;

use crate::model::{Tag, TagInput};
use crate::service::{
    TranslationService, col_i64, col_text, constraint_or_storage, count_of, required_str, storage,
    taken,
};

pub(crate) const TAG_NAME_MAX: usize = 255;

const TAG_COLUMNS: &str = "id, name, created_at, updated_at";

impl TranslationService {
    /// List tags ascending by id, optionally restricted to a name prefix.
    pub fn list_tags(
        &self,
        search: Option<&str>,
        params: &PageParams,
    ) -> Result<Page<Tag>, ServiceError> {
        let mut where_sql = String::new();
        let mut args: Vec<Value> = Vec::new();
        if let Some(prefix) = search.filter(|s| !s.is_empty()) {
            where_sql.push_str(" WHERE substr(name, 1, length(?1)) = ?1");
            args.push(Value::from(prefix));
        }

        let rows = self
            .sql
            .query(&format!("SELECT COUNT(*) AS cnt FROM tags{where_sql}"), &args)
            .map_err(storage)?;
        let total = count_of(&rows);

        let limit_idx = args.len() + 1;
        let offset_idx = args.len() + 2;
        args.push(Value::Integer(params.limit() as i64));
        args.push(Value::Integer(params.offset() as i64));

        let rows = self
            .sql
            .query(
                &format!(
                    "SELECT {TAG_COLUMNS} FROM tags{where_sql} \
                     ORDER BY id ASC LIMIT ?{limit_idx} OFFSET ?{offset_idx}"
                ),
                &args,
            )
            .map_err(storage)?;
        let data = rows.iter().map(row_to_tag).collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(data, params, total))
    }

    /// Create a tag. The name must be unique.
    pub fn create_tag(&self, input: TagInput) -> Result<Tag, ServiceError> {
        let tx = self.sql.begin().map_err(storage)?;
        let name = validate_tag(&*tx, &input, None)?;

        let rows = tx
            .query(
                &format!(
                    "INSERT INTO tags (name, created_at, updated_at) \
                     VALUES (?1, ?2, ?2) RETURNING {TAG_COLUMNS}"
                ),
                &[Value::from(name), Value::Text(now_rfc3339())],
            )
            .map_err(|e| constraint_or_storage(e, |_| taken("name")))?;
        let tag = first_tag(&rows)?;
        tx.commit().map_err(storage)?;

        info!("Created tag {:?} ({})", tag.name, tag.id);
        Ok(tag)
    }

    /// Get a tag by id.
    pub fn get_tag(&self, id: i64) -> Result<Tag, ServiceError> {
        find_tag(self.sql.as_ref(), id)?.ok_or_else(not_found)
    }

    /// Rename a tag. Uniqueness ignores the tag itself.
    pub fn update_tag(&self, id: i64, input: TagInput) -> Result<Tag, ServiceError> {
        let tx = self.sql.begin().map_err(storage)?;
        find_tag(&*tx, id)?.ok_or_else(not_found)?;
        let name = validate_tag(&*tx, &input, Some(id))?;

        let rows = tx
            .query(
                &format!(
                    "UPDATE tags SET name = ?1, updated_at = ?2 WHERE id = ?3 RETURNING {TAG_COLUMNS}"
                ),
                &[Value::from(name), Value::Text(now_rfc3339()), Value::Integer(id)],
            )
            .map_err(|e| constraint_or_storage(e, |_| taken("name")))?;
        let tag = first_tag(&rows)?;
        tx.commit().map_err(storage)?;
        Ok(tag)
    }

    /// Delete a tag. Its translation links are removed; the translations stay.
    pub fn delete_tag(&self, id: i64) -> Result<(), ServiceError> {
        let affected = self
            .sql
            .exec("DELETE FROM tags WHERE id = ?1", &[Value::Integer(id)])
            .map_err(storage)?;
        if affected == 0 {
            return Err(not_found());
        }
        info!("Deleted tag {}", id);
        Ok(())
    }

    /// Return the tag named `name`, creating it if absent.
    pub fn get_or_create_tag(&self, name: &str) -> Result<Tag, ServiceError> {
        let tx = self.sql.begin().map_err(storage)?;
        let tag = get_or_create_tag(&*tx, name)?;
        tx.commit().map_err(storage)?;
        Ok(tag)
    }
}

fn not_found() -> ServiceError {
    ServiceError::NotFound("Tag not found".into())
}

/// Upsert-by-name: the insert is a no-op when the name already exists,
/// so racing callers all end up reading the same row.
pub(crate) fn get_or_create_tag<E: Executor + ?Sized>(
    db: &E,
    name: &str,
) -> Result<Tag, ServiceError> {
    let name = name.trim();
    db.exec(
        "INSERT INTO tags (name, created_at, updated_at) VALUES (?1, ?2, ?2) \
         ON CONFLICT(name) DO NOTHING",
        &[Value::from(name), Value::Text(now_rfc3339())],
    )
    .map_err(storage)?;

    let rows = db
        .query(
            &format!("SELECT {TAG_COLUMNS} FROM tags WHERE name = ?1"),
            &[Value::from(name)],
        )
        .map_err(storage)?;
    first_tag(&rows)
}

pub(crate) fn find_tag<E: Executor + ?Sized>(db: &E, id: i64) -> Result<Option<Tag>, ServiceError> {
    let rows = db
        .query(
            &format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = ?1"),
            &[Value::Integer(id)],
        )
        .map_err(storage)?;
    rows.first().map(row_to_tag).transpose()
}

fn validate_tag<'a, E: Executor + ?Sized>(
    db: &E,
    input: &'a TagInput,
    ignore_id: Option<i64>,
) -> Result<&'a str, ServiceError> {
    let mut errors = FieldErrors::new();
    let name = required_str(&mut errors, "name", input.name.as_deref(), Some(TAG_NAME_MAX));

    if let Some(name) = name {
        let rows = db
            .query(
                "SELECT id FROM tags WHERE name = ?1 AND id != ?2",
                &[Value::from(name), Value::Integer(ignore_id.unwrap_or(0))],
            )
            .map_err(storage)?;
        if !rows.is_empty() {
            errors.add("name", "The name has already been taken.");
        }
    }

    errors.into_result()?;
    name.ok_or_else(|| ServiceError::Internal("tag validation inconsistent".into()))
}

fn first_tag(rows: &[Row]) -> Result<Tag, ServiceError> {
    rows.first()
        .map(row_to_tag)
        .transpose()?
        .ok_or_else(|| ServiceError::Internal("no row returned".into()))
}

pub(crate) fn row_to_tag(row: &Row) -> Result<Tag, ServiceError> {
    Ok(Tag {
        id: col_i64(row, "id")?,
        name: col_text(row, "name")?,
        created_at: col_text(row, "created_at")?,
        updated_at: col_text(row, "updated_at")?,
    })
}
