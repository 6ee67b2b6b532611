use polyglot_core::{FieldErrors, new_id, now_rfc3339};
use polyglot_sql::{Row, SQLError, Value};
use tracing::info;

use crate::model::{CreateUser, User};
use crate::service::{AuthError, AuthService};

const USER_COLUMNS: &str = "id, name, email, created_at, updated_at";

impl AuthService {
    /// Create a new user. The email must be unique.
    pub fn create_user(&self, input: CreateUser) -> Result<User, AuthError> {
        let mut errors = FieldErrors::new();
        if input.name.trim().is_empty() {
            errors.add("name", "The name field is required.");
        }
        if !input.email.contains('@') {
            errors.add("email", "The email field must be a valid email address.");
        }
        if input.password_hash.is_empty() {
            errors.add("password", "The password field is required.");
        }
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        let now = now_rfc3339();
        let user = User {
            id: new_id(),
            name: input.name,
            email: input.email,
            created_at: now.clone(),
            updated_at: now,
        };

        self.sql
            .exec(
                "INSERT INTO users (id, name, email, password_hash, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                &[
                    Value::from(user.id.as_str()),
                    Value::from(user.name.as_str()),
                    Value::from(user.email.as_str()),
                    Value::from(input.password_hash),
                    Value::from(user.created_at.as_str()),
                ],
            )
            .map_err(|e| match e {
                SQLError::Constraint(_) => AuthError::Validation(FieldErrors::single(
                    "email",
                    "The email has already been taken.",
                )),
                other => other.into(),
            })?;

        info!("Created user {} ({})", user.email, user.id);
        Ok(user)
    }

    /// Get a user by id.
    pub fn get_user(&self, id: &str) -> Result<User, AuthError> {
        let rows = self.sql.query(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            &[Value::from(id)],
        )?;
        rows.first()
            .map(row_to_user)
            .transpose()?
            .ok_or_else(|| AuthError::NotFound("User not found".into()))
    }

    /// Look up a user and their password hash by email.
    pub(crate) fn find_credentials(&self, email: &str) -> Result<Option<(User, String)>, AuthError> {
        let rows = self.sql.query(
            &format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = ?1"),
            &[Value::from(email)],
        )?;
        let Some(row) = rows.first() else {
            return Ok(None);
        };
        let hash = row
            .get_str("password_hash")
            .ok_or_else(|| AuthError::Internal("missing column password_hash".into()))?
            .to_string();
        Ok(Some((row_to_user(row)?, hash)))
    }

    /// Create the user unless one with the same email already exists.
    /// Returns the user and whether it was created.
    pub fn ensure_user(&self, input: CreateUser) -> Result<(User, bool), AuthError> {
        if let Some((user, _)) = self.find_credentials(&input.email)? {
            return Ok((user, false));
        }
        self.create_user(input).map(|u| (u, true))
    }
}

fn row_to_user(row: &Row) -> Result<User, AuthError> {
    let text = |name: &str| {
        row.get_str(name)
            .map(String::from)
            .ok_or_else(|| AuthError::Internal(format!("missing column {name}")))
    };
    Ok(User {
        id: text("id")?,
        name: text("name")?,
        email: text("email")?,
        created_at: text("created_at")?,
        updated_at: text("updated_at")?,
    })
}
