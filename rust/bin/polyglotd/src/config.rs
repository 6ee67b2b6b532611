//! Server-side configuration file (`/etc/polyglot/<name>.toml`).

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

/// Directory holding named server configs.
const CONFIG_DIR: &str = "/etc/polyglot";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub storage: StorageConfig,
    pub jwt: JwtConfig,
    /// Account created on first start, if configured.
    #[serde(default)]
    pub admin: Option<AdminConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// SQLite lives at `{data_dir}/data.sqlite`.
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_expire_secs")]
    pub expire_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub email: String,
    #[serde(default = "default_admin_name")]
    pub name: String,
    /// argon2id PHC string (`polyglotd hash-password`).
    pub password_hash: String,
}

fn default_expire_secs() -> u64 {
    86400
}

fn default_admin_name() -> String {
    "Admin".to_string()
}

impl ServerConfig {
    /// A bare name resolves to `/etc/polyglot/<name>.toml`; anything
    /// containing `/` or `.` is used as a path.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            Path::new(CONFIG_DIR).join(format!("{name_or_path}.toml"))
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_path() {
        assert_eq!(
            ServerConfig::resolve_path("prod"),
            PathBuf::from("/etc/polyglot/prod.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("./local.toml"),
            PathBuf::from("./local.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("/srv/polyglot.toml"),
            PathBuf::from("/srv/polyglot.toml")
        );
    }

    #[test]
    fn test_parse_defaults() {
        let config = ServerConfig::parse(
            r#"
            [storage]
            data_dir = "/var/lib/polyglot"

            [jwt]
            secret = "s3cret"
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.data_dir, "/var/lib/polyglot");
        assert_eq!(config.jwt.expire_secs, 86400);
        assert!(config.admin.is_none());
    }

    #[test]
    fn test_parse_admin() {
        let config = ServerConfig::parse(
            r#"
            [storage]
            data_dir = "/data"

            [jwt]
            secret = "s3cret"
            expire_secs = 600

            [admin]
            email = "admin@example.com"
            password_hash = "$argon2id$v=19$m=19456,t=2,p=1$abc$def"
            "#,
        )
        .unwrap();
        let admin = config.admin.unwrap();
        assert_eq!(admin.email, "admin@example.com");
        assert_eq!(admin.name, "Admin");
        assert_eq!(config.jwt.expire_secs, 600);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ServerConfig::load(&dir.path().join("nope.toml")).is_err());
    }

    #[test]
    fn test_missing_section_rejected() {
        assert!(ServerConfig::parse("[storage]\ndata_dir = \"/d\"\n").is_err());
    }
}
