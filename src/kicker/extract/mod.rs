//! Field extractors.
//!
//! Every field is read through a cascade: an ordered list of independent
//! strategies with the same signature. The runner stops at the first
//! strategy whose result is acceptable and otherwise keeps the earliest
//! partial result.

pub(crate) mod date;
pub(crate) mod goals;
pub(crate) mod lineups;
pub(crate) mod score;

use std::cell::RefCell;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::Html;
use crate::error::{ExtractionIssue, Result};

/// One cascade tier: a name for logging and the strategy itself.
pub(crate) type Strategy<C, T> = (&'static str, fn(&Html, &C) -> Result<Option<T>>);

/// Result of a cascade together with the tier that produced it.
#[derive(Debug)]
pub(crate) struct Hit<T> {
    pub tier: &'static str,
    pub value: T,
}

pub(crate) fn cascade<C, T>(
    document: &Html,
    context: &C,
    strategies: &[Strategy<C, T>],
    accept: impl Fn(&T) -> bool,
) -> Result<Option<Hit<T>>> {
    let mut partial = None;
    for &(tier, strategy) in strategies {
        match strategy(document, context)? {
            Some(value) if accept(&value) => {
                debug!(tier, "cascade tier accepted");
                return Ok(Some(Hit { tier, value }));
            }
            Some(value) => {
                debug!(tier, "cascade tier incomplete, trying next");
                if partial.is_none() {
                    partial = Some(Hit { tier, value });
                }
            }
            None => debug!(tier, "cascade tier empty"),
        }
    }
    Ok(partial)
}

/// Issues collected by strategies that only get a shared reference.
#[derive(Debug, Default)]
pub(crate) struct Findings(RefCell<Vec<ExtractionIssue>>);

impl Findings {
    pub fn report(&self, issue: ExtractionIssue) {
        self.0.borrow_mut().push(issue);
    }

    pub fn into_vec(self) -> Vec<ExtractionIssue> {
        self.0.into_inner()
    }
}

pub(crate) static MINUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,3})\s*['’´.]?(?:\s*\+\s*(\d{1,2}))?").expect("minute pattern")
});

/// Only minutes followed by a minute mark, for free text that also holds scores.
pub(crate) static MARKED_MINUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,3})\s*['’´](?:\s*\+\s*(\d{1,2}))?").expect("marked minute pattern")
});

/// Minute of play from texts like `59'`, `90'+11`, `90' +5` or `90. + 3`.
///
/// Stoppage time is added to the base minute.
pub(crate) fn parse_minute(text: &str) -> Option<u16> {
    minute_with(&MINUTE_RE, text)
}

/// Like [`parse_minute`], but prefers a number carrying a minute mark.
pub(crate) fn parse_marked_minute(text: &str) -> Option<u16> {
    minute_with(&MARKED_MINUTE_RE, text).or_else(|| parse_minute(text))
}

fn minute_with(pattern: &Regex, text: &str) -> Option<u16> {
    let caps = pattern.captures(text)?;
    let base: u16 = caps[1].parse().ok()?;
    let extra: u16 = match caps.get(2) {
        Some(extra) => extra.as_str().parse().ok()?,
        None => 0,
    };
    Some(base + extra)
}
