use std::collections::BTreeMap;

use polyglot_core::ServiceError;
use polyglot_sql::Value;
use tracing::debug;

use crate::model::ExportFilters;
use crate::service::{TranslationService, col_text, storage, where_clause};

impl TranslationService {
    /// Flatten translations into a key → value map.
    ///
    /// `locale` restricts to one locale code; a non-empty `tags` list keeps
    /// translations carrying any of those tag names. Rows are applied in id
    /// order, so when the same key appears in several locales the one with
    /// the highest id wins.
    pub fn export(&self, filters: &ExportFilters) -> Result<BTreeMap<String, String>, ServiceError> {
        let mut conds = Vec::new();
        let mut args: Vec<Value> = Vec::new();

        if let Some(code) = filters.locale.as_deref() {
            args.push(Value::from(code));
            conds.push(format!("l.code = ?{}", args.len()));
        }
        if !filters.tags.is_empty() {
            let placeholders = filters
                .tags
                .iter()
                .map(|name| {
                    args.push(Value::from(name.as_str()));
                    format!("?{}", args.len())
                })
                .collect::<Vec<_>>()
                .join(", ");
            conds.push(format!(
                "EXISTS (SELECT 1 FROM tag_translations tt JOIN tags tg ON tg.id = tt.tag_id \
                 WHERE tt.translation_id = t.id AND tg.name IN ({placeholders}))"
            ));
        }

        let rows = self
            .sql
            .query(
                &format!(
                    "SELECT t.key, t.value FROM translations t \
                     JOIN locales l ON l.id = t.locale_id{} ORDER BY t.id ASC",
                    where_clause(&conds)
                ),
                &args,
            )
            .map_err(storage)?;

        let mut out = BTreeMap::new();
        for row in &rows {
            let key = col_text(row, "key")?;
            let value = col_text(row, "value")?;
            if let Some(previous) = out.insert(key.clone(), value) {
                debug!("Export key {:?} overwritten (was {:?})", key, previous);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LocaleInput, TagRef, TranslationInput};
    use crate::service::test_support::test_service;

    fn seed(svc: &TranslationService) {
        let mut locale_ids = BTreeMap::new();
        for (code, name) in [("en", "English"), ("jp", "Japanese")] {
            let locale = svc
                .create_locale(LocaleInput {
                    code: Some(code.into()),
                    name: Some(name.into()),
                })
                .unwrap();
            locale_ids.insert(code, locale.id);
        }
        let rows: [(&str, &str, &str, &[&str]); 4] = [
            ("en", "app.title", "App", &["Header"]),
            ("en", "app.footer", "Bye", &["Footer"]),
            ("jp", "app.title", "アプリ", &["Header"]),
            ("jp", "app.body", "本文", &[]),
        ];
        for (code, key, value, tags) in rows {
            svc.create_translation(TranslationInput {
                locale_id: Some(locale_ids[code]),
                key: Some(key.into()),
                value: Some(value.into()),
                tags: Some(tags.iter().map(|t| TagRef::Name(t.to_string())).collect()),
            })
            .unwrap();
        }
    }

    fn export(svc: &TranslationService, locale: Option<&str>, tags: &[&str]) -> Vec<(String, String)> {
        svc.export(&ExportFilters {
            locale: locale.map(String::from),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        })
        .unwrap()
        .into_iter()
        .collect()
    }

    fn kv(key: &str, value: &str) -> (String, String) {
        (key.to_string(), value.to_string())
    }

    #[test]
    fn test_export_scoped_to_locale() {
        let svc = test_service();
        seed(&svc);
        assert_eq!(
            export(&svc, Some("jp"), &[]),
            vec![kv("app.body", "本文"), kv("app.title", "アプリ")]
        );
        assert!(export(&svc, Some("fr"), &[]).is_empty());
    }

    #[test]
    fn test_export_unfiltered_is_last_wins() {
        let svc = test_service();
        seed(&svc);
        // app.title exists in en and jp; the later jp row wins.
        assert_eq!(
            export(&svc, None, &[]),
            vec![
                kv("app.body", "本文"),
                kv("app.footer", "Bye"),
                kv("app.title", "アプリ"),
            ]
        );
    }

    #[test]
    fn test_export_tags_match_any() {
        let svc = test_service();
        seed(&svc);
        assert_eq!(
            export(&svc, Some("en"), &["Header", "Footer"]),
            vec![kv("app.footer", "Bye"), kv("app.title", "App")]
        );
        assert_eq!(export(&svc, Some("en"), &["Header"]), vec![kv("app.title", "App")]);
        // Untagged rows are not excluded when no tag filter is given.
        assert_eq!(export(&svc, Some("jp"), &[]).len(), 2);
        assert!(export(&svc, None, &["Missing"]).is_empty());
    }
}
