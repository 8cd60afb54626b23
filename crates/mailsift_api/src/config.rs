//! Configuration management for the validation API
//!
//! Configuration is layered with figment: built-in defaults, then an
//! optional `Config.toml`, then `MAILSIFT_*` environment variables. The
//! struct is kept flat so every engine knob maps to one environment
//! variable.

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use mailsift_core::{CheckerConfig, CheckerName, SmtpSettings};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Application configuration: server settings plus the engine surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Emit JSON structured logs instead of the human-readable format
    pub json_logs: bool,
    /// Default log level filter when RUST_LOG is unset
    pub log_level: String,

    // List files; a checker is constructed only when its path is non-empty.
    pub free_emails_file: String,
    pub disposable_emails_file: String,
    pub role_emails_file: String,
    pub ban_words_file: String,
    pub blacklist_emails_file: String,
    pub blacklist_domains_file: String,

    /// Comma-separated validator names enabled at startup
    pub enabled_validators: String,

    /// Target false-positive rate for the list filters (0 = exact maps)
    pub false_positive_rate: f64,
    /// Result cache capacity (entries)
    pub cache_size: u64,
    /// Result cache TTL in seconds
    pub cache_timeout_secs: u64,
    /// Per-checker deadline in seconds
    pub validation_timeout_secs: u64,
    /// Global cap on in-flight checker tasks
    pub max_concurrent_validations: usize,

    /// SMTP dial/read deadline in seconds
    pub smtp_timeout_secs: u64,
    /// Domain announced in HELO
    pub smtp_from_domain: String,
    /// Sender announced in MAIL FROM
    pub smtp_from_email: String,
    /// Attempt VRFY before RCPT
    pub enable_smtp_vrfy: bool,
    /// Probe the mailbox with RCPT TO
    pub enable_smtp_rcpt: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            json_logs: false,
            log_level: "info".to_string(),
            free_emails_file: String::new(),
            disposable_emails_file: String::new(),
            role_emails_file: String::new(),
            ban_words_file: String::new(),
            blacklist_emails_file: String::new(),
            blacklist_domains_file: String::new(),
            enabled_validators: "syntax".to_string(),
            false_positive_rate: 0.01,
            cache_size: 1000,
            cache_timeout_secs: 600,
            validation_timeout_secs: 5,
            max_concurrent_validations: 10,
            smtp_timeout_secs: 5,
            smtp_from_domain: "example.com".to_string(),
            smtp_from_email: "test@example.com".to_string(),
            enable_smtp_vrfy: false,
            enable_smtp_rcpt: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional `Config.toml`, and
    /// `MAILSIFT_*` environment variables.
    pub fn load() -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

        if std::path::Path::new("Config.toml").exists() {
            figment = figment.merge(Toml::file("Config.toml"));
        }

        figment.merge(Env::prefixed("MAILSIFT_")).extract()
    }

    /// Translate into the engine's configuration.
    pub fn checker_config(&self) -> CheckerConfig {
        let enabled_validators = self
            .enabled_validators
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .filter_map(|name| match name.parse::<CheckerName>() {
                Ok(parsed) => Some(parsed),
                Err(_) => {
                    warn!("Ignoring unknown validator {:?} in enabled_validators", name);
                    None
                }
            })
            .collect();

        CheckerConfig {
            free_emails_file: path_opt(&self.free_emails_file),
            disposable_emails_file: path_opt(&self.disposable_emails_file),
            role_emails_file: path_opt(&self.role_emails_file),
            ban_words_file: path_opt(&self.ban_words_file),
            blacklist_emails_file: path_opt(&self.blacklist_emails_file),
            blacklist_domains_file: path_opt(&self.blacklist_domains_file),
            enabled_validators,
            false_positive_rate: self.false_positive_rate,
            cache_size: self.cache_size,
            cache_timeout: Duration::from_secs(self.cache_timeout_secs),
            validation_timeout: Duration::from_secs(self.validation_timeout_secs),
            max_concurrent_validations: self.max_concurrent_validations,
            smtp: SmtpSettings {
                timeout: Duration::from_secs(self.smtp_timeout_secs),
                from_domain: self.smtp_from_domain.clone(),
                from_email: self.smtp_from_email.clone(),
                enable_vrfy: self.enable_smtp_vrfy,
                enable_rcpt: self.enable_smtp_rcpt,
            },
            dialer: None,
        }
    }
}

fn path_opt(path: &str) -> Option<PathBuf> {
    if path.trim().is_empty() {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

/// Environment variable names for configuration
#[allow(dead_code)]
pub mod env_vars {
    pub const HOST: &str = "MAILSIFT_HOST";
    pub const PORT: &str = "MAILSIFT_PORT";
    pub const FREE_EMAILS_FILE: &str = "MAILSIFT_FREE_EMAILS_FILE";
    pub const DISPOSABLE_EMAILS_FILE: &str = "MAILSIFT_DISPOSABLE_EMAILS_FILE";
    pub const ROLE_EMAILS_FILE: &str = "MAILSIFT_ROLE_EMAILS_FILE";
    pub const BAN_WORDS_FILE: &str = "MAILSIFT_BAN_WORDS_FILE";
    pub const BLACKLIST_EMAILS_FILE: &str = "MAILSIFT_BLACKLIST_EMAILS_FILE";
    pub const BLACKLIST_DOMAINS_FILE: &str = "MAILSIFT_BLACKLIST_DOMAINS_FILE";
    pub const ENABLED_VALIDATORS: &str = "MAILSIFT_ENABLED_VALIDATORS";
    pub const FALSE_POSITIVE_RATE: &str = "MAILSIFT_FALSE_POSITIVE_RATE";
    pub const CACHE_SIZE: &str = "MAILSIFT_CACHE_SIZE";
    pub const CACHE_TIMEOUT_SECS: &str = "MAILSIFT_CACHE_TIMEOUT_SECS";
    pub const VALIDATION_TIMEOUT_SECS: &str = "MAILSIFT_VALIDATION_TIMEOUT_SECS";
    pub const MAX_CONCURRENT_VALIDATIONS: &str = "MAILSIFT_MAX_CONCURRENT_VALIDATIONS";
    pub const SMTP_TIMEOUT_SECS: &str = "MAILSIFT_SMTP_TIMEOUT_SECS";
    pub const SMTP_FROM_DOMAIN: &str = "MAILSIFT_SMTP_FROM_DOMAIN";
    pub const SMTP_FROM_EMAIL: &str = "MAILSIFT_SMTP_FROM_EMAIL";
    pub const ENABLE_SMTP_VRFY: &str = "MAILSIFT_ENABLE_SMTP_VRFY";
    pub const ENABLE_SMTP_RCPT: &str = "MAILSIFT_ENABLE_SMTP_RCPT";
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_engine_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.enabled_validators, "syntax");
        assert_eq!(config.cache_size, 1000);
        assert_eq!(config.cache_timeout_secs, 600);
        assert!(config.enable_smtp_rcpt);
        assert!(!config.enable_smtp_vrfy);
    }

    #[test]
    fn conversion_parses_enabled_validators() {
        let config = AppConfig {
            enabled_validators: "syntax, mx ,bogus,smtp".to_string(),
            ..AppConfig::default()
        };
        let checker = config.checker_config();
        assert_eq!(
            checker.enabled_validators,
            vec![CheckerName::Syntax, CheckerName::Mx, CheckerName::Smtp]
        );
    }

    #[test]
    fn empty_paths_disable_list_checkers() {
        let checker = AppConfig::default().checker_config();
        assert!(checker.disposable_emails_file.is_none());
        assert!(checker.free_emails_file.is_none());

        let config = AppConfig {
            disposable_emails_file: "data/disposable.txt".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(
            config.checker_config().disposable_emails_file,
            Some(PathBuf::from("data/disposable.txt"))
        );
    }

    #[test]
    fn env_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("MAILSIFT_PORT", "9999");
            jail.set_env("MAILSIFT_ENABLED_VALIDATORS", "syntax,disposable");
            let config = AppConfig::load().expect("config should load");
            assert_eq!(config.port, 9999);
            assert_eq!(config.enabled_validators, "syntax,disposable");
            Ok(())
        });
    }
}
