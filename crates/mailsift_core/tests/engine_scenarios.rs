//! End-to-end engine scenarios using file-backed lists and no live network.

use mailsift_core::{CheckResult, CheckerConfig, CheckerName, EmailChecker};
use std::io::Write;
use tempfile::NamedTempFile;

fn list_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn as_json(result: &CheckResult) -> serde_json::Value {
    serde_json::to_value(result).unwrap()
}

#[tokio::test]
async fn syntax_only_engine_normalizes_and_passes() {
    let engine = EmailChecker::new(CheckerConfig::default()).unwrap();

    let result = engine.check("Alice@Example.COM").await;

    assert_eq!(result.email, "alice@example.com");
    assert!(result.is_valid);
    assert_eq!(result.results.len(), 1);

    let syntax = &result.results[&CheckerName::Syntax];
    assert!(syntax.valid);
    assert_eq!(
        syntax.details.get("parsed_address").unwrap(),
        "alice@example.com"
    );
}

#[tokio::test]
async fn disposable_domain_drives_summary_and_validity() {
    let disposable = list_file("mailinator.com\nguerrillamail.com\n");
    let config = CheckerConfig {
        disposable_emails_file: Some(disposable.path().to_path_buf()),
        enabled_validators: vec![CheckerName::Syntax, CheckerName::Disposable],
        ..CheckerConfig::default()
    };
    let engine = EmailChecker::new(config).unwrap();

    let result = engine.check("bob@mailinator.com").await;

    assert!(!result.is_valid);
    let summary = result.summary.as_ref().unwrap();
    assert!(summary.is_disposable);
    assert!(!summary.is_free);
    assert!(!result.results[&CheckerName::Disposable].valid);
    assert!(result.results[&CheckerName::Syntax].valid);
}

#[tokio::test]
async fn role_account_is_flagged() {
    let roles = list_file("admin\nsupport\ninfo\n");
    let config = CheckerConfig {
        role_emails_file: Some(roles.path().to_path_buf()),
        enabled_validators: vec![CheckerName::Syntax, CheckerName::Role],
        ..CheckerConfig::default()
    };
    let engine = EmailChecker::new(config).unwrap();

    let result = engine.check("admin@acme.com").await;

    assert!(!result.is_valid);
    assert!(result.summary.as_ref().unwrap().is_role);
}

#[tokio::test]
async fn syntax_rejection_short_circuits_and_is_not_cached() {
    let engine = EmailChecker::new(CheckerConfig::default()).unwrap();

    let result = engine.check("not-an-email").await;

    assert!(!result.is_valid);
    assert!(result.summary.is_none());
    assert_eq!(result.results.len(), 1);
    let syntax = &result.results[&CheckerName::Syntax];
    assert!(!syntax.valid);
    assert!(syntax.error.is_some());

    // The rejection was not cached; a second call re-evaluates.
    assert_eq!(engine.cache_len(), 0);
    let again = engine.check("not-an-email").await;
    assert!(!again.is_valid);
    assert_eq!(engine.cache_len(), 0);
}

#[tokio::test]
async fn cache_hit_returns_identical_content() {
    let engine = EmailChecker::new(CheckerConfig::default()).unwrap();

    let first = engine.check("alice@example.com").await;
    let second = engine.check("alice@example.com").await;

    assert_eq!(as_json(&first), as_json(&second));
}

#[tokio::test]
async fn normalization_makes_case_variants_equivalent() {
    let free = list_file("gmail.com\n");
    let config = CheckerConfig {
        free_emails_file: Some(free.path().to_path_buf()),
        enabled_validators: vec![CheckerName::Syntax, CheckerName::Free],
        ..CheckerConfig::default()
    };
    let engine = EmailChecker::new(config).unwrap();

    let lower = engine.check("carol@gmail.com").await;
    let upper = engine.check("CAROL@GMAIL.COM").await;

    let mut lower_keys: Vec<_> = lower.results.keys().collect();
    let mut upper_keys: Vec<_> = upper.results.keys().collect();
    lower_keys.sort();
    upper_keys.sort();
    assert_eq!(lower_keys, upper_keys);

    for (name, result) in &lower.results {
        assert_eq!(result.valid, upper.results[name].valid);
    }
    assert_eq!(lower.is_valid, upper.is_valid);
}

#[tokio::test]
async fn selection_intersects_with_enabled_checkers() {
    let banned = list_file("spam\n");
    let config = CheckerConfig {
        ban_words_file: Some(banned.path().to_path_buf()),
        // banwords is constructed but not enabled.
        enabled_validators: vec![CheckerName::Syntax],
        ..CheckerConfig::default()
    };
    let engine = EmailChecker::new(config).unwrap();

    let result = engine
        .check_with("spam@example.com", &[CheckerName::Banwords])
        .await;

    // Requested-but-disabled yields no entries at all.
    assert!(result.results.is_empty());
    assert!(result.is_valid);

    // Enabling it makes a later request effective. A fresh address avoids
    // the result cached above.
    engine
        .set_validator_enabled(CheckerName::Banwords, true)
        .unwrap();
    let result = engine
        .check_with("spamlord@example.com", &[CheckerName::Banwords])
        .await;
    assert_eq!(result.results.len(), 1);
    assert!(!result.results[&CheckerName::Banwords].valid);
}

#[tokio::test]
async fn every_enabled_checker_reports_exactly_once() {
    let disposable = list_file("mailinator.com\n");
    let free = list_file("gmail.com\n");
    let roles = list_file("admin\n");
    let banned = list_file("spam\n");
    let blacklist_emails = list_file("abuse@bad.example\n");
    let blacklist_domains = list_file("bad.example\n");

    let config = CheckerConfig {
        disposable_emails_file: Some(disposable.path().to_path_buf()),
        free_emails_file: Some(free.path().to_path_buf()),
        role_emails_file: Some(roles.path().to_path_buf()),
        ban_words_file: Some(banned.path().to_path_buf()),
        blacklist_emails_file: Some(blacklist_emails.path().to_path_buf()),
        blacklist_domains_file: Some(blacklist_domains.path().to_path_buf()),
        enabled_validators: vec![
            CheckerName::Syntax,
            CheckerName::Disposable,
            CheckerName::Free,
            CheckerName::Role,
            CheckerName::Banwords,
            CheckerName::BlacklistEmails,
            CheckerName::BlacklistDomains,
        ],
        ..CheckerConfig::default()
    };
    let engine = EmailChecker::new(config).unwrap();

    let result = engine.check("alice@corp.example").await;

    assert_eq!(result.results.len(), 7);
    let conjunction = result.results.values().all(|r| r.valid);
    assert_eq!(result.is_valid, conjunction);
    assert!(result.is_valid);

    // Summary flags mirror the classifying checkers' verdicts.
    let summary = result.summary.as_ref().unwrap();
    assert_eq!(
        summary.is_disposable,
        !result.results[&CheckerName::Disposable].valid
    );
    assert_eq!(summary.is_free, !result.results[&CheckerName::Free].valid);
    assert_eq!(summary.is_role, !result.results[&CheckerName::Role].valid);
}

#[tokio::test]
async fn startup_fails_when_a_required_list_is_missing() {
    let config = CheckerConfig {
        disposable_emails_file: Some("/definitely/missing.txt".into()),
        ..CheckerConfig::default()
    };
    assert!(EmailChecker::new(config).is_err());
}

#[tokio::test]
async fn missing_domain_blacklist_degrades_gracefully() {
    let config = CheckerConfig {
        blacklist_domains_file: Some("/definitely/missing.txt".into()),
        enabled_validators: vec![CheckerName::Syntax, CheckerName::BlacklistDomains],
        ..CheckerConfig::default()
    };
    let engine = EmailChecker::new(config).unwrap();

    let result = engine.check("alice@anything.example").await;
    assert!(result.is_valid);
    assert!(result.results[&CheckerName::BlacklistDomains].valid);
}
