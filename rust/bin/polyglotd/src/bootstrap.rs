//! Bootstrap: first-start checks and admin account creation.
//!
//! When polyglotd starts:
//! 1. Verify the config is usable: if not, refuse to start.
//! 2. If `[admin]` is configured, make sure that user exists.

use auth::model::CreateUser;
use auth::service::AuthService;
use tracing::info;

use crate::config::{AdminConfig, ServerConfig};

/// Verify server configuration is ready for use.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.jwt.secret.is_empty() {
        anyhow::bail!("JWT secret is empty in configuration.");
    }
    if config.storage.data_dir.is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    if let Some(admin) = &config.admin {
        if admin.password_hash.is_empty() {
            anyhow::bail!(
                "No admin password hash found in configuration.\n\
                 Run `polyglotd hash-password <password>` and set [admin].password_hash."
            );
        }
    }
    Ok(())
}

/// Ensure the configured admin user exists. Creates it if missing.
pub fn ensure_admin(svc: &AuthService, admin: &AdminConfig) -> anyhow::Result<()> {
    let (user, created) = svc
        .ensure_user(CreateUser {
            name: admin.name.clone(),
            email: admin.email.clone(),
            password_hash: admin.password_hash.clone(),
        })
        .map_err(|e| anyhow::anyhow!("failed to create admin user: {}", e))?;
    if created {
        info!("Created admin user {}", user.email);
    } else {
        info!("Admin user {} already exists", user.email);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use auth::service::{AuthConfig, hash_password};
    use polyglot_sql::SqliteStore;

    use super::*;
    use crate::config::{JwtConfig, StorageConfig};

    fn config() -> ServerConfig {
        ServerConfig {
            storage: StorageConfig {
                data_dir: "/tmp".to_string(),
            },
            jwt: JwtConfig {
                secret: "test".to_string(),
                expire_secs: 3600,
            },
            admin: None,
        }
    }

    #[test]
    fn test_verify_config() {
        assert!(verify_config(&config()).is_ok());

        let mut empty_secret = config();
        empty_secret.jwt.secret.clear();
        assert!(verify_config(&empty_secret).is_err());

        let mut empty_dir = config();
        empty_dir.storage.data_dir.clear();
        assert!(verify_config(&empty_dir).is_err());

        let mut no_hash = config();
        no_hash.admin = Some(AdminConfig {
            email: "admin@example.com".into(),
            name: "Admin".into(),
            password_hash: String::new(),
        });
        assert!(verify_config(&no_hash).is_err());
    }

    #[test]
    fn test_ensure_admin_twice() {
        let svc = AuthService::new(
            Arc::new(SqliteStore::open_in_memory().unwrap()),
            AuthConfig::default(),
        )
        .unwrap();
        let admin = AdminConfig {
            email: "admin@example.com".into(),
            name: "Admin".into(),
            password_hash: hash_password("pw").unwrap(),
        };
        ensure_admin(&svc, &admin).unwrap();
        ensure_admin(&svc, &admin).unwrap();

        let login = svc
            .login(&auth::model::LoginRequest {
                email: Some("admin@example.com".into()),
                password: Some("pw".into()),
            })
            .unwrap();
        assert!(!login.token.is_empty());
    }
}
