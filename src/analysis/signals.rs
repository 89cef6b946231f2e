//! Leak-signal detection over visible page text
//!
//! Each detector produces a non-negative count; only positive counts are
//! recorded, so a signal key is present iff it fired.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::LazyLock;

/// Texts with more lines than this look like a paste or dump
pub const DUMP_LINE_THRESHOLD: usize = 120;

/// Labels that introduce an account identifier, e.g. `seller: darkfox`
const USERNAME_LABELS: &[&str] = &["username", "user", "seller", "vendor", "handle", "id"];

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}\b").expect("valid email pattern")
});

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:\+?\d{1,3}[\s-]?)?(?:\(?\d{2,4}\)?[\s-]?)?\d{3,4}[\s-]?\d{4}\b")
        .expect("valid phone pattern")
});

static WALLET_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // BTC (legacy / P2SH)
        r"\b[13][a-km-zA-HJ-NP-Z1-9]{25,34}\b",
        // ETH
        r"\b0x[a-fA-F0-9]{40}\b",
        // TRON
        r"\bT[a-zA-Z0-9]{33}\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid wallet pattern"))
    .collect()
});

static USERNAME_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    USERNAME_LABELS
        .iter()
        .map(|label| {
            Regex::new(&format!(r"{}\s*[:\-]\s*[a-zA-Z0-9_\-]{{3,}}", label))
                .expect("valid username pattern")
        })
        .collect()
});

/// Kind of sensitive-data indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeakSignal {
    Emails,
    Phones,
    Wallets,
    Usernames,
    DumpStructure,
}

impl LeakSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emails => "emails",
            Self::Phones => "phones",
            Self::Wallets => "wallets",
            Self::Usernames => "usernames",
            Self::DumpStructure => "dump_structure",
        }
    }
}

impl fmt::Display for LeakSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leak-signal counts for one page; zero counts are never stored
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeakSignals(BTreeMap<LeakSignal, u32>);

impl LeakSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a count, dropping it if zero
    pub fn record(&mut self, signal: LeakSignal, count: usize) {
        if count > 0 {
            let count = u32::try_from(count).unwrap_or(u32::MAX);
            self.0.insert(signal, count);
        }
    }

    /// Count for a signal; absent means zero
    pub fn get(&self, signal: LeakSignal) -> u32 {
        self.0.get(&signal).copied().unwrap_or(0)
    }

    pub fn contains(&self, signal: LeakSignal) -> bool {
        self.0.contains_key(&signal)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LeakSignal, u32)> + '_ {
        self.0.iter().map(|(signal, count)| (*signal, *count))
    }
}

/// Runs every leak-signal detector over visible page text
///
/// - `emails`: distinct email addresses
/// - `phones`: phone-number matches (optional country code, loose separators)
/// - `wallets`: BTC + ETH + TRON address matches, summed across patterns
/// - `usernames`: `<label>: <token>` occurrences for each label
/// - `dump_structure`: 1 when the text spans more than 120 lines
pub fn detect_leak_signals(text: &str) -> LeakSignals {
    let mut signals = LeakSignals::new();

    let emails: HashSet<&str> = EMAIL_RE.find_iter(text).map(|m| m.as_str()).collect();
    signals.record(LeakSignal::Emails, emails.len());

    signals.record(LeakSignal::Phones, PHONE_RE.find_iter(text).count());

    let wallets: usize = WALLET_RES.iter().map(|re| re.find_iter(text).count()).sum();
    signals.record(LeakSignal::Wallets, wallets);

    let lowered = text.to_lowercase();
    let usernames: usize = USERNAME_RES
        .iter()
        .map(|re| re.find_iter(&lowered).count())
        .sum();
    signals.record(LeakSignal::Usernames, usernames);

    if text.lines().count() > DUMP_LINE_THRESHOLD {
        signals.record(LeakSignal::DumpStructure, 1);
    }

    signals
}
