//! Per-account publish gate.
//!
//! Tracks, per platform account id:
//! - a semaphore bounding how many sagas may run against the account at once
//! - throttling / error / success counters from finished sagas
//!
//! The gate is process-local and injected into each saga (share it with an
//! `Arc`) so concurrent publishes to one account compete for a permit instead
//! of for the platform's rate-limit budget. There is no global instance.
//!
//! Entries are created on first use. An entry nobody holds or waits on, with
//! no outcome for the gate's idle TTL, is dropped the next time a new account
//! shows up, or explicitly through [`AccountGate::prune_idle`].

mod entry;
mod state;

pub use entry::AccountStats;
pub use state::{AccountGate, AccountPermit, DEFAULT_IDLE_TTL};
