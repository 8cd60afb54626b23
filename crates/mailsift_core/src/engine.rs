//! Orchestrator and checker registry
//!
//! The engine owns the constructed checkers, the result cache, and the
//! global concurrency limiter. A request flows: normalize → cache probe →
//! syntax gate → fan-out to the selected checkers → aggregate → cache.

use crate::cache::ResultCache;
use crate::checks::banwords::BanWordsCheck;
use crate::checks::blacklist_domains::BlacklistDomainsCheck;
use crate::checks::blacklist_emails::BlacklistEmailsCheck;
use crate::checks::disposable::DisposableCheck;
use crate::checks::free::FreeCheck;
use crate::checks::gravatar::GravatarCheck;
use crate::checks::mx::MxCheck;
use crate::checks::role::RoleCheck;
use crate::checks::smtp::SmtpCheck;
use crate::checks::syntax::SyntaxCheck;
use crate::checks::Checker;
use crate::dns::DnsResolver;
use crate::{
    CheckResult, CheckSummary, CheckerConfig, CheckerName, Dialer, EngineError, Result, TcpDialer,
    ValidationResult,
};
use email_address::EmailAddress;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::{Arc, RwLock};
use std::time::{Instant, SystemTime};
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, info};

/// Owns the checker instances and their enabled flags.
pub struct Registry {
    checkers: HashMap<CheckerName, Arc<Checker>>,
    enabled: RwLock<HashSet<CheckerName>>,
}

impl Registry {
    /// Construct every checker the configuration calls for.
    ///
    /// The syntax checker and the network checkers are always built;
    /// list-backed checkers only when their file path is set. A missing list
    /// file fails startup, except for the domain blacklist which degrades to
    /// an empty list.
    fn build(
        config: &CheckerConfig,
        resolver: DnsResolver,
        dialer: Arc<dyn Dialer>,
    ) -> Result<Self> {
        let mut checkers: HashMap<CheckerName, Arc<Checker>> = HashMap::new();

        checkers.insert(
            CheckerName::Syntax,
            Arc::new(Checker::Syntax(SyntaxCheck::new())),
        );

        if let Some(path) = &config.disposable_emails_file {
            let check = DisposableCheck::from_file(path, config.false_positive_rate)
                .map_err(|source| EngineError::CheckerInit {
                    checker: CheckerName::Disposable,
                    source,
                })?;
            checkers.insert(CheckerName::Disposable, Arc::new(Checker::Disposable(check)));
        }

        if let Some(path) = &config.free_emails_file {
            let check = FreeCheck::from_file(path, config.false_positive_rate).map_err(
                |source| EngineError::CheckerInit {
                    checker: CheckerName::Free,
                    source,
                },
            )?;
            checkers.insert(CheckerName::Free, Arc::new(Checker::Free(check)));
        }

        if let Some(path) = &config.role_emails_file {
            let check = RoleCheck::from_file(path).map_err(|source| EngineError::CheckerInit {
                checker: CheckerName::Role,
                source,
            })?;
            checkers.insert(CheckerName::Role, Arc::new(Checker::Role(check)));
        }

        if let Some(path) = &config.ban_words_file {
            let check =
                BanWordsCheck::from_file(path).map_err(|source| EngineError::CheckerInit {
                    checker: CheckerName::Banwords,
                    source,
                })?;
            checkers.insert(CheckerName::Banwords, Arc::new(Checker::Banwords(check)));
        }

        if let Some(path) = &config.blacklist_emails_file {
            let check = BlacklistEmailsCheck::from_file(path, config.false_positive_rate)
                .map_err(|source| EngineError::CheckerInit {
                    checker: CheckerName::BlacklistEmails,
                    source,
                })?;
            checkers.insert(
                CheckerName::BlacklistEmails,
                Arc::new(Checker::BlacklistEmails(check)),
            );
        }

        if let Some(path) = &config.blacklist_domains_file {
            let check = BlacklistDomainsCheck::from_file(path, config.false_positive_rate);
            checkers.insert(
                CheckerName::BlacklistDomains,
                Arc::new(Checker::BlacklistDomains(check)),
            );
        }

        checkers.insert(
            CheckerName::Mx,
            Arc::new(Checker::Mx(MxCheck::new(resolver.clone()))),
        );
        checkers.insert(
            CheckerName::Smtp,
            Arc::new(Checker::Smtp(SmtpCheck::new(
                resolver,
                config.smtp.clone(),
                dialer,
            ))),
        );
        checkers.insert(
            CheckerName::Gravatar,
            Arc::new(Checker::Gravatar(GravatarCheck::new(
                config.validation_timeout,
            )?)),
        );

        let enabled: HashSet<CheckerName> = config
            .enabled_validators
            .iter()
            .copied()
            .filter(|name| checkers.contains_key(name))
            .collect();

        Ok(Self {
            checkers,
            enabled: RwLock::new(enabled),
        })
    }

    /// Constructed checkers with their current enabled state.
    pub fn list(&self) -> HashMap<CheckerName, bool> {
        let enabled = self.enabled.read().unwrap_or_else(|e| e.into_inner());
        self.checkers
            .keys()
            .map(|name| (*name, enabled.contains(name)))
            .collect()
    }

    /// Names of all constructed checkers, sorted for stable output.
    pub fn names(&self) -> Vec<CheckerName> {
        let mut names: Vec<CheckerName> = self.checkers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Flip a checker's enabled flag. Unknown (or unconstructed) names error.
    pub fn set_enabled(&self, name: CheckerName, enabled: bool) -> Result<()> {
        if !self.checkers.contains_key(&name) {
            return Err(EngineError::UnknownChecker(name.to_string()));
        }
        let mut set = self.enabled.write().unwrap_or_else(|e| e.into_inner());
        if enabled {
            set.insert(name);
        } else {
            set.remove(&name);
        }
        Ok(())
    }

    /// Resolve the effective checker set: the requested names intersected
    /// with the enabled ones, or every enabled checker when the request is
    /// empty.
    fn selection(&self, requested: &[CheckerName]) -> Vec<(CheckerName, Arc<Checker>)> {
        let enabled = self.enabled.read().unwrap_or_else(|e| e.into_inner());
        let pick = |name: &CheckerName| {
            enabled
                .contains(name)
                .then(|| self.checkers.get(name).map(|c| (*name, Arc::clone(c))))
                .flatten()
        };

        if requested.is_empty() {
            self.checkers.keys().filter_map(pick).collect()
        } else {
            requested.iter().filter_map(pick).collect()
        }
    }
}

struct EngineInner {
    config: CheckerConfig,
    registry: Registry,
    cache: ResultCache,
    semaphore: Arc<Semaphore>,
}

/// The validation engine. Cheap to clone; all state is shared.
#[derive(Clone)]
pub struct EmailChecker {
    inner: Arc<EngineInner>,
}

impl EmailChecker {
    /// Build the engine: load list files, construct checkers, size the cache
    /// and the concurrency limiter.
    pub fn new(config: CheckerConfig) -> Result<Self> {
        info!("Initializing email checker engine");

        let resolver = DnsResolver::new(config.validation_timeout);
        let dialer: Arc<dyn Dialer> = config.dialer.clone().unwrap_or_else(|| {
            Arc::new(TcpDialer {
                timeout: config.smtp.timeout,
            })
        });

        let registry = Registry::build(&config, resolver, dialer)?;
        let cache = ResultCache::new(config.cache_size, config.cache_timeout);
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_validations));

        let constructed = registry.names().len();
        let enabled = registry.list().values().filter(|on| **on).count();
        info!(
            "Engine ready: {} validators constructed, {} enabled",
            constructed, enabled
        );

        Ok(Self {
            inner: Arc::new(EngineInner {
                config,
                registry,
                cache,
                semaphore,
            }),
        })
    }

    /// Validate an address with every currently-enabled checker.
    pub async fn check(&self, email: &str) -> CheckResult {
        self.check_with(email, &[]).await
    }

    /// Validate an address with the intersection of `requested` and the
    /// enabled checkers. An empty request means "all enabled".
    pub async fn check_with(&self, email: &str, requested: &[CheckerName]) -> CheckResult {
        let email = email.trim().to_lowercase();
        let start = Instant::now();

        let cache_key = ResultCache::key(&email, requested);
        if let Some(hit) = self.inner.cache.get(&cache_key).await {
            return (*hit).clone();
        }

        let timestamp = SystemTime::now();

        // Gate on syntax before spending any checker budget. The rejection
        // is deliberately not cached so a later identical request
        // re-evaluates.
        if let Err(e) = EmailAddress::from_str(&email) {
            debug!("Address {:?} rejected by syntax gate", email);
            let mut results = HashMap::new();
            results.insert(
                CheckerName::Syntax,
                ValidationResult {
                    valid: false,
                    message: "Invalid email syntax".to_string(),
                    details: serde_json::Map::new(),
                    duration: start.elapsed(),
                    error: Some(e.to_string()),
                },
            );
            return CheckResult {
                email,
                timestamp,
                duration: start.elapsed(),
                results,
                is_valid: false,
                summary: None,
            };
        }

        let selection = self.inner.registry.selection(requested);
        let results = self.fan_out(&email, selection).await;

        let (is_valid, summary) = aggregate(&results);
        let result = CheckResult {
            email,
            timestamp,
            duration: start.elapsed(),
            results,
            is_valid,
            summary: Some(summary),
        };

        self.inner
            .cache
            .insert(cache_key, Arc::new(result.clone()))
            .await;

        result
    }

    /// Run the selected checkers as independent tasks under the global
    /// concurrency cap, each bounded by the validation timeout.
    async fn fan_out(
        &self,
        email: &str,
        selection: Vec<(CheckerName, Arc<Checker>)>,
    ) -> HashMap<CheckerName, ValidationResult> {
        let (tx, mut rx) = mpsc::channel(selection.len().max(1));

        for (name, checker) in selection {
            let tx = tx.clone();
            let email = email.to_string();
            let semaphore = Arc::clone(&self.inner.semaphore);
            let deadline = self.inner.config.validation_timeout;

            tokio::spawn(async move {
                // Non-blocking acquire: under load, checks are skipped
                // rather than queued.
                let permit = match semaphore.try_acquire_owned() {
                    Ok(permit) => permit,
                    Err(_) => {
                        let _ = tx
                            .send((name, ValidationResult::failure("skipped due to rate limiting")))
                            .await;
                        return;
                    }
                };

                let result = match tokio::time::timeout(deadline, checker.validate(&email)).await {
                    Ok(result) => result,
                    Err(_) => ValidationResult {
                        valid: false,
                        message: "Validation timed out".to_string(),
                        details: serde_json::Map::new(),
                        duration: deadline,
                        error: Some(format!(
                            "{} did not complete within {:?}",
                            name, deadline
                        )),
                    },
                };

                drop(permit);
                let _ = tx.send((name, result)).await;
            });
        }
        drop(tx);

        let mut results = HashMap::new();
        while let Some((name, result)) = rx.recv().await {
            results.insert(name, result);
        }
        results
    }

    /// Constructed checkers with their enabled state.
    pub fn validators(&self) -> HashMap<CheckerName, bool> {
        self.inner.registry.list()
    }

    /// Enable or disable a checker at runtime.
    pub fn set_validator_enabled(&self, name: CheckerName, enabled: bool) -> Result<()> {
        self.inner.registry.set_enabled(name, enabled)
    }

    /// Names of every constructed checker.
    pub fn validator_names(&self) -> Vec<CheckerName> {
        self.inner.registry.names()
    }

    /// Approximate number of cached results.
    pub fn cache_len(&self) -> u64 {
        self.inner.cache.len()
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.inner.config
    }
}

/// Overall validity is the conjunction of every present result; the summary
/// reinterprets the classifying checkers.
fn aggregate(results: &HashMap<CheckerName, ValidationResult>) -> (bool, CheckSummary) {
    let mut is_valid = true;
    let mut summary = CheckSummary::default();

    for (name, result) in results {
        if !result.valid {
            is_valid = false;
            match name {
                CheckerName::Disposable => summary.is_disposable = true,
                CheckerName::Free => summary.is_free = true,
                CheckerName::Role => summary.is_role = true,
                _ => {}
            }
        }
    }

    (is_valid, summary)
}
