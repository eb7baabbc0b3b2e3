//! Account gate state: one semaphore and one stats entry per account.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

use super::entry::AccountStats;

/// Entries idle this long are dropped when a new account is first seen.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(60 * 60);

/// Held by a saga for its whole run; dropping it lets the next saga in.
#[derive(Debug)]
pub struct AccountPermit {
    _permit: OwnedSemaphorePermit,
}

#[derive(Debug)]
struct AccountEntry {
    semaphore: Arc<Semaphore>,
    stats: AccountStats,
}

impl AccountEntry {
    /// Nobody holds or waits on the semaphore and nothing was recorded for `idle_for`.
    fn is_idle(&self, idle_for: Duration) -> bool {
        Arc::strong_count(&self.semaphore) == 1
            && self
                .stats
                .last_activity()
                .map_or(true, |at| at.elapsed() >= idle_for)
    }
}

type AccountMap = HashMap<String, AccountEntry>;

fn prune(accounts: &mut AccountMap, idle_for: Duration) -> usize {
    let before = accounts.len();
    accounts.retain(|_, entry| !entry.is_idle(idle_for));
    before - accounts.len()
}

/// Shared registry of account id -> concurrency permits and outcome counters.
#[derive(Debug)]
pub struct AccountGate {
    permits_per_account: usize,
    idle_ttl: Duration,
    accounts: Mutex<AccountMap>,
}

impl Default for AccountGate {
    fn default() -> Self {
        Self::new(1)
    }
}

impl AccountGate {
    /// Create a gate allowing `permits_per_account` concurrent sagas per account (min 1).
    pub fn new(permits_per_account: usize) -> Self {
        Self {
            permits_per_account: permits_per_account.max(1),
            idle_ttl: DEFAULT_IDLE_TTL,
            accounts: Mutex::new(HashMap::new()),
        }
    }

    /// Forget idle accounts after `idle_ttl` instead of [`DEFAULT_IDLE_TTL`].
    pub fn with_idle_ttl(mut self, idle_ttl: Duration) -> Self {
        self.idle_ttl = idle_ttl;
        self
    }

    pub fn permits_per_account(&self) -> usize {
        self.permits_per_account
    }

    fn lock(&self) -> MutexGuard<'_, AccountMap> {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_entry<R>(&self, account_id: &str, f: impl FnOnce(&mut AccountEntry) -> R) -> R {
        let mut accounts = self.lock();
        if !accounts.contains_key(account_id) {
            let dropped = prune(&mut accounts, self.idle_ttl);
            if dropped > 0 {
                tracing::debug!(dropped, "forgot idle accounts");
            }
        }
        let permits = self.permits_per_account;
        let entry = accounts
            .entry(account_id.to_string())
            .or_insert_with(|| AccountEntry {
                semaphore: Arc::new(Semaphore::new(permits)),
                stats: AccountStats::default(),
            });
        f(entry)
    }

    /// Wait for a permit to run a saga against `account_id`.
    /// Errors only if the account's semaphore was closed.
    pub async fn acquire(&self, account_id: &str) -> Result<AccountPermit, AcquireError> {
        let semaphore = self.with_entry(account_id, |e| Arc::clone(&e.semaphore));
        if semaphore.available_permits() == 0 {
            tracing::debug!(account = account_id, "waiting for account permit");
        }
        let permit = semaphore.acquire_owned().await?;
        Ok(AccountPermit { _permit: permit })
    }

    /// Permits currently free for the account (full count if never seen).
    pub fn available(&self, account_id: &str) -> usize {
        self.lock()
            .get(account_id)
            .map(|e| e.semaphore.available_permits())
            .unwrap_or(self.permits_per_account)
    }

    /// Snapshot of the account's counters, if the gate has seen it.
    pub fn stats(&self, account_id: &str) -> Option<AccountStats> {
        self.lock().get(account_id).map(|e| e.stats.clone())
    }

    /// Drop accounts with no permit held or awaited and no outcome recorded
    /// for `idle_for`. Returns how many were dropped.
    pub fn prune_idle(&self, idle_for: Duration) -> usize {
        prune(&mut self.lock(), idle_for)
    }

    /// Record that a saga for the account ended rate-limited.
    pub fn record_throttled(&self, account_id: &str) {
        self.with_entry(account_id, |e| e.stats.throttled());
    }

    /// Record a saga failure other than throttling.
    pub fn record_error(&self, account_id: &str) {
        self.with_entry(account_id, |e| e.stats.error());
    }

    /// Record a published carousel.
    pub fn record_success(&self, account_id: &str) {
        self.with_entry(account_id, |e| e.stats.success());
    }
}
