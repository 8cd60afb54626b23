//! The checkers
//!
//! Each checker classifies an address along one dimension and reports a
//! [`ValidationResult`]. The set is closed and small, so dispatch is a tagged
//! enum rather than trait objects.

pub mod banwords;
pub mod blacklist_domains;
pub mod blacklist_emails;
pub mod disposable;
pub mod free;
pub mod gravatar;
pub mod mx;
pub mod role;
pub mod smtp;
pub mod syntax;

use crate::{CheckerName, ValidationResult};

/// A constructed checker instance.
pub enum Checker {
    Syntax(syntax::SyntaxCheck),
    Disposable(disposable::DisposableCheck),
    Free(free::FreeCheck),
    Role(role::RoleCheck),
    Banwords(banwords::BanWordsCheck),
    BlacklistEmails(blacklist_emails::BlacklistEmailsCheck),
    BlacklistDomains(blacklist_domains::BlacklistDomainsCheck),
    Mx(mx::MxCheck),
    Smtp(smtp::SmtpCheck),
    Gravatar(gravatar::GravatarCheck),
}

impl Checker {
    pub fn name(&self) -> CheckerName {
        match self {
            Checker::Syntax(_) => CheckerName::Syntax,
            Checker::Disposable(_) => CheckerName::Disposable,
            Checker::Free(_) => CheckerName::Free,
            Checker::Role(_) => CheckerName::Role,
            Checker::Banwords(_) => CheckerName::Banwords,
            Checker::BlacklistEmails(_) => CheckerName::BlacklistEmails,
            Checker::BlacklistDomains(_) => CheckerName::BlacklistDomains,
            Checker::Mx(_) => CheckerName::Mx,
            Checker::Smtp(_) => CheckerName::Smtp,
            Checker::Gravatar(_) => CheckerName::Gravatar,
        }
    }

    /// Run the checker against a normalized address.
    ///
    /// Failures are captured in the returned result, never propagated.
    pub async fn validate(&self, email: &str) -> ValidationResult {
        match self {
            Checker::Syntax(check) => check.validate(email),
            Checker::Disposable(check) => check.validate(email),
            Checker::Free(check) => check.validate(email),
            Checker::Role(check) => check.validate(email),
            Checker::Banwords(check) => check.validate(email),
            Checker::BlacklistEmails(check) => check.validate(email),
            Checker::BlacklistDomains(check) => check.validate(email),
            Checker::Mx(check) => check.validate(email).await,
            Checker::Smtp(check) => check.validate(email).await,
            Checker::Gravatar(check) => check.validate(email).await,
        }
    }
}

/// Domain part of an address, lowercased. Empty unless the address has
/// exactly one `@`.
pub(crate) fn extract_domain(email: &str) -> String {
    split_once_at(email).map(|(_, domain)| domain.to_lowercase()).unwrap_or_default()
}

/// Local part of an address, lowercased. Empty unless the address has
/// exactly one `@`.
pub(crate) fn extract_local_part(email: &str) -> String {
    split_once_at(email).map(|(local, _)| local.to_lowercase()).unwrap_or_default()
}

fn split_once_at(email: &str) -> Option<(&str, &str)> {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => Some((local, domain)),
        _ => None,
    }
}

/// Extract the object out of a `json!({..})` literal for a details map.
pub(crate) fn details_map(
    value: serde_json::Value,
) -> serde_json::Map<String, serde_json::Value> {
    match value {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}
