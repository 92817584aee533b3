//! Cleanup of names and other short text tokens scraped from match pages.
//!
//! kicker.de renders many names twice (a short mobile variant and a full
//! desktop variant, one of them hidden by CSS), so plain text extraction
//! yields artefacts like `WirtzWirtz` or `G. XhakaG. Xhaka`. Lineup entries
//! also carry player ratings such as `2,5`.

use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;

use crate::config::TeamNames;

static RATING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+[.,]\d+").expect("rating pattern"));
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d+\b").expect("number pattern"));

/// Normalize a player or team name.
///
/// Collapses whitespace, removes ratings and stray numbers, and folds
/// duplicated renderings of the same name into one. The function is
/// idempotent.
pub fn normalize_name(raw: &str) -> String {
    let without_ratings = RATING_RE.replace_all(raw, " ");
    let without_numbers = NUMBER_RE.replace_all(&without_ratings, " ");
    let mut name = collapse_whitespace(&without_numbers);
    loop {
        let next = fold_duplicates(&name);
        if next == name {
            return name;
        }
        name = next;
    }
}

/// Join all whitespace-separated words with single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().join(" ")
}

fn fold_duplicates(name: &str) -> String {
    let trimmed = name.trim_matches(|c: char| !c.is_alphanumeric() && c != '.');
    if let Some(half) = repeated_half(trimmed) {
        return half.trim().to_string();
    }

    let words = trimmed
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(|w| repeated_half(w).unwrap_or(w))
        .dedup()
        .collect_vec();

    if words.len() >= 2 && words.len() % 2 == 0 {
        let (first, second) = words.split_at(words.len() / 2);
        if first == second {
            return first.join(" ");
        }
    }

    if words.len() >= 3 && is_abbreviation(words[0]) {
        let rest = &words[1..];
        let repeats = rest.iter().any(|w| *w == words[0]) || rest.iter().duplicates().next().is_some();
        if repeats {
            if let Some(surname) = rest
                .iter()
                .find(|w| w.chars().count() >= 3 && w.chars().all(char::is_alphabetic))
            {
                return format!("{} {}", words[0], surname);
            }
        }
    }

    words.join(" ")
}

/// `Some(t)` when `s` is `t` glued to itself and `t` looks like a name.
fn repeated_half(s: &str) -> Option<&str> {
    let chars = s.chars().count();
    if chars < 4 || chars % 2 != 0 {
        return None;
    }
    let (split, _) = s.char_indices().nth(chars / 2)?;
    let (first, second) = s.split_at(split);
    let starts_upper = first.chars().next().is_some_and(char::is_uppercase);
    (first == second && starts_upper).then_some(first)
}

fn is_abbreviation(word: &str) -> bool {
    word.ends_with('.') && word.chars().count() <= 3
}

/// Turn a URL slug such as `union-berlin` into `Union Berlin`.
pub fn title_case_slug(slug: &str) -> String {
    slug.split(['-', '_'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .join(" ")
}

/// Display name for a club slug.
///
/// Looks up the whole slug, then each `-` separated segment in order, and
/// title-cases the slug when nothing matches.
pub fn team_display_name(slug: &str, names: &TeamNames) -> String {
    let slug = slug.to_lowercase();
    names
        .get(&slug)
        .or_else(|| slug.split('-').find_map(|part| names.get(part)))
        .map(str::to_string)
        .unwrap_or_else(|| title_case_slug(&slug))
}
