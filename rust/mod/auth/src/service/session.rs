use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::{error, info, warn};

use polyglot_core::{FieldErrors, new_id};
use polyglot_sql::Value;

use crate::model::{Claims, LoginRequest, LoginResponse, Session, User};
use crate::service::{AuthError, AuthService, verify_password};

const INVALID_CREDENTIALS: &str = "Invalid credentials.";

impl AuthService {
    /// Check email and password and issue a bearer token.
    ///
    /// Unknown email and wrong password fail the same way, as a
    /// validation error on `email`.
    pub fn login(&self, input: &LoginRequest) -> Result<LoginResponse, AuthError> {
        let mut errors = FieldErrors::new();
        let email = input.email.as_deref().unwrap_or_default().trim();
        let password = input.password.as_deref().unwrap_or_default();
        if email.is_empty() {
            errors.add("email", "The email field is required.");
        } else if !email.contains('@') {
            errors.add("email", "The email field must be a valid email address.");
        }
        if password.is_empty() {
            errors.add("password", "The password field is required.");
        }
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        let user = match self.find_credentials(email)? {
            Some((user, hash)) if verify_password(password, &hash) => user,
            _ => {
                warn!("Rejected login for {}", email);
                return Err(AuthError::Validation(FieldErrors::single(
                    "email",
                    INVALID_CREDENTIALS,
                )));
            }
        };

        let response = self.issue_token(&user)?;
        info!("User {} logged in", user.email);
        Ok(response)
    }

    /// Issue a signed JWT for a user, backed by a new session row.
    pub fn issue_token(&self, user: &User) -> Result<LoginResponse, AuthError> {
        let session_id = new_id();
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::seconds(self.config.token_ttl);

        let claims = Claims {
            sub: user.id.clone(),
            name: user.name.clone(),
            sid: session_id.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| {
            error!("Failed to encode JWT: {}", e);
            AuthError::Internal(format!("JWT encode failed: {e}"))
        })?;

        self.sql.exec(
            "INSERT INTO sessions (id, user_id, issued_at, expires_at, revoked) \
             VALUES (?1, ?2, ?3, ?4, 0)",
            &[
                Value::from(session_id),
                Value::from(user.id.as_str()),
                Value::Text(now.to_rfc3339()),
                Value::Text(exp.to_rfc3339()),
            ],
        )?;

        Ok(LoginResponse {
            message: "Login successful".to_string(),
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.token_ttl,
        })
    }

    /// Verify and decode a JWT.
    /// Returns the claims if the signature and expiry check out and the
    /// session is still live.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| AuthError::Unauthorized(format!("invalid token: {e}")))?;
        let claims = token_data.claims;

        match self.get_session(&claims.sid) {
            Ok(session) if session.revoked => {
                Err(AuthError::Unauthorized("session has been revoked".into()))
            }
            Ok(_) => Ok(claims),
            Err(AuthError::NotFound(_)) => Err(AuthError::Unauthorized("unknown session".into())),
            Err(e) => Err(e),
        }
    }

    /// Revoke a session (its token becomes invalid).
    pub fn revoke_session(&self, session_id: &str) -> Result<(), AuthError> {
        let affected = self.sql.exec(
            "UPDATE sessions SET revoked = 1 WHERE id = ?1",
            &[Value::from(session_id)],
        )?;
        if affected == 0 {
            return Err(AuthError::NotFound("Session not found".into()));
        }
        info!("Revoked session {}", session_id);
        Ok(())
    }

    /// Get a session by id.
    pub fn get_session(&self, id: &str) -> Result<Session, AuthError> {
        let rows = self.sql.query(
            "SELECT id, user_id, issued_at, expires_at, revoked FROM sessions WHERE id = ?1",
            &[Value::from(id)],
        )?;
        let row = rows
            .first()
            .ok_or_else(|| AuthError::NotFound("Session not found".into()))?;
        let text = |name: &str| {
            row.get_str(name)
                .map(String::from)
                .ok_or_else(|| AuthError::Internal(format!("missing column {name}")))
        };
        Ok(Session {
            id: text("id")?,
            user_id: text("user_id")?,
            issued_at: text("issued_at")?,
            expires_at: text("expires_at")?,
            revoked: row.get_i64("revoked").unwrap_or(0) != 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::AuthConfig;
    use crate::service::test_support::{alice, test_service, test_service_with};

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    fn email_error(err: AuthError) -> String {
        match err {
            AuthError::Validation(errors) => errors.get("email").unwrap()[0].clone(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_login_and_verify() {
        let svc = test_service();
        let user = alice(&svc);

        let resp = svc.login(&login("alice@example.com", "secret")).unwrap();
        assert_eq!(resp.message, "Login successful");
        assert_eq!(resp.token_type, "Bearer");
        assert_eq!(resp.expires_in, 86400);

        let claims = svc.verify_token(&resp.token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.name, "Alice");
        assert!(!svc.get_session(&claims.sid).unwrap().revoked);
    }

    #[test]
    fn test_bad_credentials_look_alike() {
        let svc = test_service();
        alice(&svc);

        let wrong_pw = svc.login(&login("alice@example.com", "nope")).unwrap_err();
        let unknown = svc.login(&login("bob@example.com", "secret")).unwrap_err();
        assert_eq!(email_error(wrong_pw), INVALID_CREDENTIALS);
        assert_eq!(email_error(unknown), INVALID_CREDENTIALS);
    }

    #[test]
    fn test_login_requires_fields() {
        let svc = test_service();
        match svc.login(&LoginRequest::default()).unwrap_err() {
            AuthError::Validation(errors) => {
                assert_eq!(errors.get("email").unwrap()[0], "The email field is required.");
                assert!(errors.get("password").is_some());
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        let err = svc.login(&login("not-an-email", "x")).unwrap_err();
        assert_eq!(email_error(err), "The email field must be a valid email address.");
    }

    #[test]
    fn test_revoke_session() {
        let svc = test_service();
        let user = alice(&svc);
        let first = svc.issue_token(&user).unwrap();
        let second = svc.issue_token(&user).unwrap();

        let claims = svc.verify_token(&first.token).unwrap();
        svc.revoke_session(&claims.sid).unwrap();

        assert!(matches!(
            svc.verify_token(&first.token),
            Err(AuthError::Unauthorized(_))
        ));
        // Other sessions are unaffected.
        assert!(svc.verify_token(&second.token).is_ok());
        assert!(matches!(svc.revoke_session("missing"), Err(AuthError::NotFound(_))));
    }

    #[test]
    fn test_expired_token() {
        let svc = test_service_with(AuthConfig {
            token_ttl: -3600,
            ..Default::default()
        });
        let user = alice(&svc);
        let resp = svc.issue_token(&user).unwrap();
        assert!(matches!(
            svc.verify_token(&resp.token),
            Err(AuthError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let svc = test_service();
        let user = alice(&svc);
        let other = test_service_with(AuthConfig {
            jwt_secret: "another-secret".into(),
            ..Default::default()
        });
        let resp = other.issue_token(&alice(&other)).unwrap();
        assert!(svc.verify_token(&resp.token).is_err());
        assert!(svc.verify_token(&svc.issue_token(&user).unwrap().token).is_ok());
    }
}
