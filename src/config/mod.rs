//! Configuration module for the submission gateway

use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};
use std::path::PathBuf;

/// Main application settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub supabase: SupabaseSettings,
    pub submission: SubmissionSettings,
    pub admin: AdminSettings,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Timeout applied to every upstream request
    pub request_timeout_secs: u64,
    /// Largest accepted JSON body (base64 files included)
    pub max_body_bytes: usize,
}

/// Supabase project the gateway forwards to
#[derive(Clone, Deserialize)]
pub struct SupabaseSettings {
    /// Project URL, e.g. https://<ref>.supabase.co
    pub url: String,
    /// Service or anon key sent as `apikey` and bearer token
    pub key: String,
    /// Storage bucket for images, attachments and signed uploads
    pub bucket: String,
    /// Table holding submission rows
    pub table: String,
}

// The key must never reach the logs.
impl std::fmt::Debug for SupabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseSettings")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("table", &self.table)
            .finish()
    }
}

/// Intake validation rules
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionSettings {
    pub title_min_chars: usize,
    pub content_min_chars: usize,
    pub default_category: String,
    pub default_author: String,
    pub max_images: usize,
    pub max_image_bytes: usize,
    pub max_attachment_bytes: usize,
    pub allowed_image_types: Vec<String>,
}

/// Back-office credentials
#[derive(Clone, Deserialize)]
pub struct AdminSettings {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSettings")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

const DEFAULT_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

impl Settings {
    /// Load configuration from files and environment variables
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Environment variables (prefixed with GATEWAY_)
    /// 2. config/local.toml (gitignored)
    /// 3. config/default.toml
    /// 4. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config_dir = std::env::var("CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"));

        let defaults = Settings::default();

        let builder = Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", defaults.server.port as i64)?
            .set_default("server.request_timeout_secs", defaults.server.request_timeout_secs as i64)?
            .set_default("server.max_body_bytes", defaults.server.max_body_bytes as i64)?
            .set_default("supabase.url", defaults.supabase.url)?
            .set_default("supabase.key", defaults.supabase.key)?
            .set_default("supabase.bucket", defaults.supabase.bucket)?
            .set_default("supabase.table", defaults.supabase.table)?
            .set_default("submission.title_min_chars", defaults.submission.title_min_chars as i64)?
            .set_default("submission.content_min_chars", defaults.submission.content_min_chars as i64)?
            .set_default("submission.default_category", defaults.submission.default_category)?
            .set_default("submission.default_author", defaults.submission.default_author)?
            .set_default("submission.max_images", defaults.submission.max_images as i64)?
            .set_default("submission.max_image_bytes", defaults.submission.max_image_bytes as i64)?
            .set_default("submission.max_attachment_bytes", defaults.submission.max_attachment_bytes as i64)?
            .set_default("submission.allowed_image_types", defaults.submission.allowed_image_types)?
            .set_default("admin.username", defaults.admin.username)?
            .set_default("admin.password", defaults.admin.password)?
            // Start with default configuration
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local overrides (gitignored)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment variables (GATEWAY__SUPABASE__URL, etc.)
            .add_source(
                Environment::with_prefix("GATEWAY")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("submission.allowed_image_types")
                    .try_parsing(true)
            );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the gateway cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.supabase.url.trim().is_empty() {
            return Err(ConfigError::Message("supabase.url is not set".to_string()));
        }
        if self.supabase.key.trim().is_empty() {
            return Err(ConfigError::Message("supabase.key is not set".to_string()));
        }
        if self.supabase.bucket.trim().is_empty() || self.supabase.table.trim().is_empty() {
            return Err(ConfigError::Message(
                "supabase.bucket and supabase.table must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 8080,
                workers: None,
                request_timeout_secs: 30,
                max_body_bytes: 48 * 1024 * 1024,
            },
            supabase: SupabaseSettings {
                url: String::new(),
                key: String::new(),
                bucket: "submissions".to_string(),
                table: "submissions".to_string(),
            },
            submission: SubmissionSettings {
                title_min_chars: 5,
                content_min_chars: 50,
                default_category: "uncategorized".to_string(),
                default_author: "anonymous".to_string(),
                max_images: 5,
                max_image_bytes: 5 * 1024 * 1024,
                max_attachment_bytes: 10 * 1024 * 1024,
                allowed_image_types: DEFAULT_IMAGE_TYPES.iter().map(|t| t.to_string()).collect(),
            },
            admin: AdminSettings {
                // Prototype credentials, override through GATEWAY__ADMIN__PASSWORD
                username: "admin".to_string(),
                password: "123456".to_string(),
            },
        }
    }
}
