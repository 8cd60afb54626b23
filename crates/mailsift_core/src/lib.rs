//! # mailsift_core
//!
//! Composable email validation engine. Each submitted address is run through
//! a set of independent checkers — syntactic, list-based, and network-based —
//! and the verdicts are aggregated into a single result with per-check detail.
//!
//! ## Features
//!
//! - **RFC 5322 syntax gate** using the `email_address` parser
//! - **List-based classification** (disposable, free, role, banned words,
//!   blacklists) backed by exact sets or cuckoo filters
//! - **Network probes**: MX resolution with implicit-MX fallback, a raw SMTP
//!   dialogue against the primary MX, and a Gravatar lookup
//! - **Concurrent orchestration** with a global concurrency cap, per-check
//!   deadlines, and an LRU result cache
//!
//! ## Example
//!
//! ```rust,no_run
//! use mailsift_core::{CheckerConfig, EmailChecker};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let checker = EmailChecker::new(CheckerConfig::default())?;
//!
//!     let result = checker.check("someone@example.com").await;
//!     println!("valid: {}", result.is_valid);
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod checks;
pub mod dns;
pub mod engine;
pub mod filter;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tokio::net::TcpStream;

/// Wire names of the available checkers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckerName {
    Syntax,
    Disposable,
    Free,
    Role,
    Banwords,
    BlacklistEmails,
    BlacklistDomains,
    Mx,
    Smtp,
    Gravatar,
}

impl CheckerName {
    /// Every checker the engine knows about.
    pub const ALL: [CheckerName; 10] = [
        CheckerName::Syntax,
        CheckerName::Disposable,
        CheckerName::Free,
        CheckerName::Role,
        CheckerName::Banwords,
        CheckerName::BlacklistEmails,
        CheckerName::BlacklistDomains,
        CheckerName::Mx,
        CheckerName::Smtp,
        CheckerName::Gravatar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckerName::Syntax => "syntax",
            CheckerName::Disposable => "disposable",
            CheckerName::Free => "free",
            CheckerName::Role => "role",
            CheckerName::Banwords => "banwords",
            CheckerName::BlacklistEmails => "blacklist_emails",
            CheckerName::BlacklistDomains => "blacklist_domains",
            CheckerName::Mx => "mx",
            CheckerName::Smtp => "smtp",
            CheckerName::Gravatar => "gravatar",
        }
    }
}

impl fmt::Display for CheckerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckerName {
    type Err = EngineError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "syntax" => Ok(CheckerName::Syntax),
            "disposable" => Ok(CheckerName::Disposable),
            "free" => Ok(CheckerName::Free),
            "role" => Ok(CheckerName::Role),
            "banwords" => Ok(CheckerName::Banwords),
            "blacklist_emails" => Ok(CheckerName::BlacklistEmails),
            "blacklist_domains" => Ok(CheckerName::BlacklistDomains),
            "mx" => Ok(CheckerName::Mx),
            "smtp" => Ok(CheckerName::Smtp),
            "gravatar" => Ok(CheckerName::Gravatar),
            other => Err(EngineError::UnknownChecker(other.to_string())),
        }
    }
}

/// Outcome of a single checker.
///
/// `valid == true` means "this checker found no reason to reject". For the
/// classifying checkers (disposable, free, role, banwords, blacklists) a
/// `false` means the class was matched; the summary reinterprets those.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub details: serde_json::Map<String, serde_json::Value>,
    pub duration: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    /// A failed result with no details, used for synthetic outcomes.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
            details: serde_json::Map::new(),
            duration: Duration::ZERO,
            error: None,
        }
    }
}

/// Aggregated result of one validation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub email: String,
    pub timestamp: SystemTime,
    pub duration: Duration,
    pub results: HashMap<CheckerName, ValidationResult>,
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<CheckSummary>,
}

/// Quick classification flags derived from the per-checker results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSummary {
    pub is_disposable: bool,
    pub is_free: bool,
    pub is_role: bool,
}

/// Pluggable TCP dialer used by the SMTP checker, the seam for proxy
/// injection.
pub trait Dialer: Send + Sync + fmt::Debug {
    fn connect<'a>(
        &'a self,
        host: &'a str,
        port: u16,
    ) -> Pin<Box<dyn Future<Output = std::io::Result<TcpStream>> + Send + 'a>>;
}

/// Default dialer: a plain TCP connect bounded by a timeout.
#[derive(Debug, Clone)]
pub struct TcpDialer {
    pub timeout: Duration,
}

impl Dialer for TcpDialer {
    fn connect<'a>(
        &'a self,
        host: &'a str,
        port: u16,
    ) -> Pin<Box<dyn Future<Output = std::io::Result<TcpStream>> + Send + 'a>> {
        Box::pin(async move {
            tokio::time::timeout(self.timeout, TcpStream::connect((host, port)))
                .await
                .map_err(|_| {
                    std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        format!("connect to {}:{} timed out", host, port),
                    )
                })?
        })
    }
}

/// SMTP probe behaviour.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    /// Deadline for the TCP dial and each protocol turn.
    pub timeout: Duration,
    /// Domain announced in `HELO`.
    pub from_domain: String,
    /// Sender announced in `MAIL FROM`.
    pub from_email: String,
    /// Attempt a `VRFY` before `RCPT TO`.
    pub enable_vrfy: bool,
    /// Probe the mailbox with `RCPT TO`.
    pub enable_rcpt: bool,
}

/// Configuration for the validation engine.
///
/// List-backed checkers are constructed only when their file path is set;
/// everything else is immutable after [`EmailChecker::new`].
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    pub free_emails_file: Option<PathBuf>,
    pub disposable_emails_file: Option<PathBuf>,
    pub role_emails_file: Option<PathBuf>,
    pub ban_words_file: Option<PathBuf>,
    pub blacklist_emails_file: Option<PathBuf>,
    pub blacklist_domains_file: Option<PathBuf>,

    /// Checkers flipped to enabled at startup; the rest stay constructed but
    /// disabled.
    pub enabled_validators: Vec<CheckerName>,

    /// Target false-positive rate for the list filters. Zero selects the
    /// exact map backend.
    pub false_positive_rate: f64,

    pub cache_size: u64,
    pub cache_timeout: Duration,

    /// Per-check deadline applied at fan-out.
    pub validation_timeout: Duration,
    /// Global cap on in-flight checker tasks across all requests.
    pub max_concurrent_validations: usize,

    pub smtp: SmtpSettings,

    /// Custom TCP dialer for the SMTP probe; defaults to [`TcpDialer`].
    pub dialer: Option<Arc<dyn Dialer>>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            free_emails_file: None,
            disposable_emails_file: None,
            role_emails_file: None,
            ban_words_file: None,
            blacklist_emails_file: None,
            blacklist_domains_file: None,
            enabled_validators: vec![CheckerName::Syntax],
            false_positive_rate: 0.01,
            cache_size: 1000,
            cache_timeout: Duration::from_secs(600),
            validation_timeout: Duration::from_secs(5),
            max_concurrent_validations: 10,
            smtp: SmtpSettings {
                timeout: Duration::from_secs(5),
                from_domain: "example.com".to_string(),
                from_email: "test@example.com".to_string(),
                enable_vrfy: false,
                enable_rcpt: true,
            },
            dialer: None,
        }
    }
}

/// Errors that can occur while building or steering the engine.
///
/// Per-checker failures never surface here; they are captured inside the
/// checker's [`ValidationResult`].
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("validator {0} not found")]
    UnknownChecker(String),
    #[error("failed to initialize {checker} validator: {source}")]
    CheckerInit {
        checker: CheckerName,
        #[source]
        source: loader::LoadError,
    },
    #[error(transparent)]
    Load(#[from] loader::LoadError),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

// Re-export main types
pub use engine::EmailChecker;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_enables_only_syntax() {
        let config = CheckerConfig::default();
        assert_eq!(config.enabled_validators, vec![CheckerName::Syntax]);
        assert_eq!(config.cache_size, 1000);
        assert_eq!(config.cache_timeout, Duration::from_secs(600));
        assert_eq!(config.validation_timeout, Duration::from_secs(5));
        assert_eq!(config.max_concurrent_validations, 10);
        assert!(config.smtp.enable_rcpt);
        assert!(!config.smtp.enable_vrfy);
    }

    #[test]
    fn checker_name_round_trip() {
        for name in CheckerName::ALL {
            assert_eq!(name.as_str().parse::<CheckerName>().unwrap(), name);
        }
        assert!("dnsbl".parse::<CheckerName>().is_err());
    }

    #[test]
    fn checker_name_serializes_to_wire_form() {
        let json = serde_json::to_string(&CheckerName::BlacklistEmails).unwrap();
        assert_eq!(json, "\"blacklist_emails\"");
    }
}
