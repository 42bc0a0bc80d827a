//! # Usage Tracker
//!
//! Daily generation quota with a three-stage tier:
//!
//! ```text
//! anonymous ──(count >= anonymous limit)──> email ──(count >= total)──> limit-reached
//! ```
//!
//! Tiers only move forward within a day. A new date key resets the record to
//! `anonymous` with a zero count, both at load time and when the date changes
//! under a running tracker. Until [`UsageTracker::initialize`] has run
//! the tracker reports the limit as reached.

use super::storage::{Tier, UsageRecord, UsageStorage};
use chrono::{Datelike, Local, NaiveDate};

/// Anonymous generations allowed per day
pub const ANONYMOUS_GENERATIONS_LIMIT: u32 = 3;

/// Extra generations unlocked by giving an email
pub const EMAIL_GENERATIONS_LIMIT: u32 = 3;

/// Source of "today" for the date key
pub trait Clock: Send {
    fn today(&self) -> NaiveDate;
}

/// Clock reading the process-local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to one date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Format a date as the storage date key (`YYYY-M-D`, no zero padding)
pub fn date_key(date: NaiveDate) -> String {
    format!("{}-{}-{}", date.year(), date.month(), date.day())
}

/// Quota thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageLimits {
    /// Count at which anonymous users must unlock with an email
    pub anonymous: u32,
    /// Count at which all free generations are exhausted
    pub total: u32,
}

impl UsageLimits {
    pub fn new(anonymous: u32, email: u32) -> Self {
        Self {
            anonymous,
            total: anonymous.saturating_add(email),
        }
    }
}

impl Default for UsageLimits {
    fn default() -> Self {
        Self::new(ANONYMOUS_GENERATIONS_LIMIT, EMAIL_GENERATIONS_LIMIT)
    }
}

/// Tier implied by `count`, never moving backwards from `current`
pub fn derive_tier(count: u32, current: Tier, limits: UsageLimits) -> Tier {
    if count >= limits.total {
        Tier::LimitReached
    } else if count >= limits.anonymous && current == Tier::Anonymous {
        Tier::Email
    } else {
        current
    }
}

/// Owns today's usage counters and persists every change
pub struct UsageTracker {
    storage: UsageStorage,
    clock: Box<dyn Clock>,
    limits: UsageLimits,
    identifier: Option<String>,
    /// Date key the counters belong to
    date: String,
    count: u32,
    tier: Tier,
    initialized: bool,
}

impl UsageTracker {
    /// Create an uninitialized tracker. It blocks generations until
    /// [`initialize`](Self::initialize) is called.
    pub fn new(storage: UsageStorage, clock: Box<dyn Clock>, limits: UsageLimits) -> Self {
        Self {
            storage,
            clock,
            limits,
            identifier: None,
            date: String::new(),
            count: 0,
            tier: Tier::Anonymous,
            initialized: false,
        }
    }

    /// Create a tracker on the local clock and load today's state
    pub fn open(storage: UsageStorage, limits: UsageLimits) -> Self {
        let mut tracker = Self::new(storage, Box::new(LocalClock), limits);
        tracker.initialize();
        tracker
    }

    /// Load today's record, discarding stale or corrupt data
    pub fn initialize(&mut self) {
        let today = date_key(self.clock.today());

        self.identifier = Some(self.storage.load_or_create_identifier());

        let record = match self.storage.load() {
            Some(record) if record.date == today => record,
            Some(stale) => {
                tracing::info!(stored = %stale.date, today = %today, "New day, resetting usage");
                if let Err(e) = self.storage.clear() {
                    tracing::warn!(error = %e, "Failed to clear stale usage record");
                }
                UsageRecord::new(today)
            }
            None => UsageRecord::new(today),
        };

        self.date = record.date;
        self.count = record.count;
        self.tier = derive_tier(record.count, record.tier, self.limits);
        self.initialized = true;

        tracing::debug!(
            user = self.identifier.as_deref().unwrap_or_default(),
            count = self.count,
            tier = self.tier.as_str(),
            "Usage tracker initialized"
        );
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// True until initialized, then whenever the daily quota is used up
    pub fn is_limit_reached(&self) -> bool {
        !self.initialized || self.generations_used() >= self.limits.total
    }

    /// Record one successful generation
    pub fn increment_generations(&mut self) {
        if !self.initialized {
            return;
        }

        self.roll_over_if_stale();
        self.count = self.count.saturating_add(1);
        self.tier = derive_tier(self.count, self.tier, self.limits);
        self.persist();
    }

    /// Move to the email tier after the user unlocked with an email.
    ///
    /// This does not look at the current tier. The count-derived
    /// `limit-reached` state still wins, so an exhausted quota stays closed.
    pub fn start_email_tier(&mut self) {
        if !self.initialized {
            return;
        }

        self.roll_over_if_stale();

        if self.tier == Tier::LimitReached {
            tracing::warn!(count = self.count, "Email tier requested after limit was reached");
        }

        self.tier = derive_tier(self.count, Tier::Email, self.limits);
        self.persist();
    }

    /// Generations booked today. Counters left over from an earlier day read as zero.
    pub fn generations_used(&self) -> u32 {
        if self.is_current_day() {
            self.count
        } else {
            0
        }
    }

    pub fn generations_left(&self) -> u32 {
        self.limits.total.saturating_sub(self.generations_used())
    }

    pub fn tier(&self) -> Tier {
        if self.is_current_day() {
            self.tier
        } else {
            Tier::Anonymous
        }
    }

    pub fn limits(&self) -> UsageLimits {
        self.limits
    }

    /// Stable per-install identifier, once initialized
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    fn is_current_day(&self) -> bool {
        !self.initialized || self.date == date_key(self.clock.today())
    }

    /// Start a fresh record when the date key moved since the counters were loaded
    fn roll_over_if_stale(&mut self) {
        let today = date_key(self.clock.today());
        if self.date == today {
            return;
        }

        tracing::info!(previous = %self.date, today = %today, "Day changed, resetting usage");
        if let Err(e) = self.storage.clear() {
            tracing::warn!(error = %e, "Failed to clear stale usage record");
        }
        self.date = today;
        self.count = 0;
        self.tier = Tier::Anonymous;
    }

    fn persist(&mut self) {
        let record = UsageRecord {
            date: self.date.clone(),
            count: self.count,
            tier: self.tier,
        };

        if let Err(e) = self.storage.save(&record) {
            tracing::error!(error = %e, "Failed to persist usage record");
        }
    }
}
