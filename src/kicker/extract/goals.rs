//! Goal events.
//!
//! Tiers, strongest first:
//! 1. `structural`: the "Tore" card of the 2024+ layout, one
//!    `kick__goals__row` per goal with left/right placement.
//! 2. `legacy-class`: any element whose class mentions goals or scorers.
//! 3. `full-text`: minute/name adjacency in the visible page text.
//!
//! A stoppage-time sweep over the live-ticker text runs after the cascade,
//! whatever tier won.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};
use tracing::debug;

use super::{cascade, parse_marked_minute, parse_minute, Strategy};
use crate::error::{ExtractionIssue, Result};
use crate::kicker::{element_text, has_class_containing, select_text, visible_text, Html};
use crate::model::{GoalEvent, Side, SideConfidence};
use crate::normalize::normalize_name;
use crate::resolve::Resolver;

pub(crate) const STRUCTURAL_TIER: &str = "structural";

const GOALS_HEADLINE: &str = "Tore";

/// Latest minute accepted from free text (extra time plus stoppage).
const MAX_MINUTE: u16 = 130;

static GOAL_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(tor|goal|treffer)\b").expect("goal word pattern"));

static MINUTE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,3})['’]\s*([A-ZÄÖÜ][a-zäöüß]+(?:\s+[A-ZÄÖÜ][a-zäöüß]+)*)")
        .expect("minute name pattern")
});

static NAME_MINUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-ZÄÖÜ][a-zäöüß]+)\s+(\d{1,3})['’]").expect("name minute pattern")
});

/// Ticker spellings of a goal in second-half stoppage time.
const STOPPAGE_PREFIXES: [&str; 3] = [
    r"90\+(\d{1,2})\.?",
    r"90\.\s*\+\s*(\d{1,2})\.?",
    r"90\s*\+\s*(\d{1,2})\.?",
];

static STOPPAGE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    STOPPAGE_PREFIXES
        .iter()
        .map(|prefix| {
            Regex::new(&format!(
                r"{prefix}\s*Spielminute\s*Tor\s*(\d{{1,2}}):(\d{{1,2}})\s*([A-ZÄÖÜ][^:\d]*?)\s*(Linksschuss|Rechtsschuss|Kopfball|Foulelfmeter|Handelfmeter|Elfmeter|Eigentor)"
            ))
            .expect("stoppage pattern")
        })
        .collect()
});

#[derive(Debug)]
pub(crate) struct GoalExtraction {
    pub goals: Vec<GoalEvent>,
    pub tier: Option<&'static str>,
    pub issues: Vec<ExtractionIssue>,
}

impl GoalExtraction {
    /// Whether the sides of the goals come from page structure.
    pub fn is_structural(&self) -> bool {
        self.tier == Some(STRUCTURAL_TIER)
    }
}

pub(crate) fn extract_goals(document: &Html, resolver: &Resolver) -> Result<GoalExtraction> {
    let tiers: [Strategy<Resolver, Vec<GoalEvent>>; 3] = [
        (STRUCTURAL_TIER, structural_goals),
        ("legacy-class", legacy_class_goals),
        ("full-text", full_text_goals),
    ];
    let hit = cascade(document, resolver, &tiers, |goals| !goals.is_empty())?;
    let (tier, mut goals) = match hit {
        Some(hit) => (Some(hit.tier), hit.value),
        None => (None, vec![]),
    };

    let added = sweep_stoppage_time(document, resolver, &mut goals);
    debug!(?tier, count = goals.len(), added, "goals extracted");

    let issues = goals
        .iter()
        .filter(|g| g.side_confidence == SideConfidence::Assumed)
        .map(|g| ExtractionIssue::UnresolvedSide {
            name: g.scorer.clone(),
        })
        .collect();

    Ok(GoalExtraction {
        goals,
        tier,
        issues,
    })
}

fn structural_goals(document: &Html, _: &Resolver) -> Result<Option<Vec<GoalEvent>>> {
    let headline_selector = Selector::parse("h4.kick__card-headline")?;
    let Some(headline) = document
        .select(&headline_selector)
        .find(|h| element_text(h) == GOALS_HEADLINE)
    else {
        return Ok(None);
    };

    let container = headline
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "div")
        .or_else(|| {
            headline
                .ancestors()
                .filter_map(ElementRef::wrap)
                .find(|e| e.value().name() == "section")
        });
    let Some(container) = container else {
        debug!("goals headline without container");
        return Ok(None);
    };

    let row_selector = Selector::parse("div.kick__goals__row")?;
    let mut goals = vec![];
    for row in container.select(&row_selector) {
        if let Some(goal) = parse_goal_row(&row)? {
            goals.push(goal);
        }
    }
    Ok((!goals.is_empty()).then_some(goals))
}

fn parse_goal_row(row: &ElementRef) -> Result<Option<GoalEvent>> {
    let player_selector = Selector::parse("a.kick__goals__player")?;
    let time_selector = Selector::parse("span.kick__goals__time")?;
    let desktop_name_selector = Selector::parse("span.kick__substitutions--hide-mobile")?;
    let assist_selector = Selector::parse("div.kick__assist__player")?;
    let assist_player_selector = Selector::parse("a")?;
    let goal_type_selector = Selector::parse("span")?;
    let score_selector = Selector::parse("div.kick__goals__score")?;

    for player in row.select(&player_selector) {
        let Some(team) = player
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|e| has_class_containing(e, "kick__goals__team"))
        else {
            continue;
        };

        let side = if has_class_containing(&team, "kick__goals__team--left") {
            Side::Home
        } else if has_class_containing(&team, "kick__goals__team--right") {
            Side::Away
        } else {
            continue;
        };

        let time = row.select(&time_selector).find(|t| {
            let is_left = has_class_containing(t, "kick__goals__time--left");
            match side {
                Side::Home => is_left,
                Side::Away => !is_left,
            }
        });

        let raw_name = match player.select(&desktop_name_selector).next() {
            Some(span) => element_text(&span),
            None => desktop_text(&player),
        };
        let scorer = normalize_name(&raw_name);
        if scorer.is_empty() {
            continue;
        }

        let minute = time
            .and_then(|t| parse_minute(&element_text(&t)))
            .unwrap_or_default();

        let assist_block = team.select(&assist_selector).next();
        let goal_type = assist_block
            .map(|a| select_text(&a, &goal_type_selector))
            .filter(|t| !t.is_empty());
        let assist = assist_block
            .map(|a| normalize_name(&select_text(&a, &assist_player_selector)))
            .filter(|t| !t.is_empty());

        let score_after = parse_running_score(&select_text(row, &score_selector));

        return Ok(Some(GoalEvent {
            minute,
            scorer,
            side,
            side_confidence: SideConfidence::Structural,
            assist,
            goal_type,
            score_after,
        }));
    }
    Ok(None)
}

/// Link text without the spans only shown on mobile.
fn desktop_text(link: &ElementRef) -> String {
    let words: Vec<&str> = link
        .descendants()
        .filter(|node| {
            !node
                .ancestors()
                .filter_map(ElementRef::wrap)
                .take_while(|e| e.id() != link.id())
                .any(|e| has_class_containing(&e, "show-mobile"))
        })
        .filter_map(|node| node.value().as_text())
        .flat_map(|text| text.split_whitespace())
        .collect();
    words.join(" ")
}

fn parse_running_score(text: &str) -> Option<(u8, u8)> {
    let (home, away) = text.split_once(':')?;
    Some((home.trim().parse().ok()?, away.trim().parse().ok()?))
}

fn legacy_class_goals(document: &Html, resolver: &Resolver) -> Result<Option<Vec<GoalEvent>>> {
    let selector = Selector::parse("[class*='goal'], [class*='scorer']")?;
    let profile_link_selector = Selector::parse("a[href*='/spieler']")?;
    let name_span_selector = Selector::parse("span[class*='player'], span[class*='name']")?;

    let elements: Vec<ElementRef> = document.select(&selector).collect();
    let matched: HashSet<_> = elements.iter().map(|e| e.id()).collect();

    let mut goals: Vec<GoalEvent> = vec![];
    for element in &elements {
        let has_inner_match = element
            .descendants()
            .skip(1)
            .any(|node| matched.contains(&node.id()));
        if has_inner_match {
            continue;
        }

        let text = element_text(element);
        let Some(minute) = parse_marked_minute(&text) else {
            continue;
        };

        let raw_name = element
            .select(&profile_link_selector)
            .next()
            .or_else(|| element.select(&name_span_selector).next())
            .map(|e| element_text(&e))
            .unwrap_or_else(|| crude_name(&text));
        let scorer = normalize_name(&raw_name);
        if scorer.is_empty() || goals.iter().any(|g| g.same_goal(minute, &scorer)) {
            continue;
        }
        goals.push(resolved_goal(resolver, minute, scorer));
    }
    Ok((!goals.is_empty()).then_some(goals))
}

/// First word left after removing minutes and goal words.
fn crude_name(text: &str) -> String {
    let without_minutes = super::MINUTE_RE.replace_all(text, " ");
    let without_words = GOAL_WORD_RE.replace_all(&without_minutes, " ");
    without_words
        .split_whitespace()
        .find(|w| w.chars().any(char::is_alphabetic))
        .unwrap_or_default()
        .to_string()
}

fn full_text_goals(document: &Html, resolver: &Resolver) -> Result<Option<Vec<GoalEvent>>> {
    let text = visible_text(document);
    let mut goals: Vec<GoalEvent> = vec![];

    let minute_first = MINUTE_NAME_RE
        .captures_iter(&text)
        .filter_map(|caps| Some((caps[1].parse::<u16>().ok()?, caps[2].to_string())));
    let name_first = NAME_MINUTE_RE
        .captures_iter(&text)
        .filter_map(|caps| Some((caps[2].parse::<u16>().ok()?, caps[1].to_string())));

    for (minute, raw_name) in minute_first.chain(name_first) {
        if minute > MAX_MINUTE {
            continue;
        }
        let scorer = normalize_name(&raw_name);
        if scorer.is_empty() || goals.iter().any(|g| g.same_goal(minute, &scorer)) {
            continue;
        }
        goals.push(resolved_goal(resolver, minute, scorer));
    }
    Ok((!goals.is_empty()).then_some(goals))
}

fn resolved_goal(resolver: &Resolver, minute: u16, scorer: String) -> GoalEvent {
    let resolution = resolver.resolve(&scorer, None);
    GoalEvent {
        side: resolution.side,
        side_confidence: resolution.confidence,
        ..GoalEvent::new(minute, scorer, resolution.side)
    }
}

/// Append stoppage-time goals from the ticker that no earlier pass found.
///
/// Goals are identified by minute and scorer, so running the sweep again
/// adds nothing. Returns the number of goals added.
pub(crate) fn sweep_stoppage_time(
    document: &Html,
    resolver: &Resolver,
    goals: &mut Vec<GoalEvent>,
) -> usize {
    let text = visible_text(document);
    let mut added = 0;
    for pattern in STOPPAGE_RES.iter() {
        for caps in pattern.captures_iter(&text) {
            let Ok(extra) = caps[1].parse::<u16>() else {
                continue;
            };
            let minute = 90 + extra;
            let scorer = normalize_name(&caps[4]);
            let score_after = caps[2].parse().ok().zip(caps[3].parse().ok());
            // A running score names one goal, whatever the scorer is called.
            let known = goals.iter().any(|g| {
                g.same_goal(minute, &scorer)
                    || (g.minute == minute && score_after.is_some() && g.score_after == score_after)
            });
            if scorer.is_empty() || known {
                continue;
            }
            debug!(minute, %scorer, "stoppage-time goal recovered from ticker");
            goals.push(GoalEvent {
                goal_type: Some(caps[5].to_string()),
                score_after,
                ..resolved_goal(resolver, minute, scorer)
            });
            added += 1;
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Season;
    use crate::resolve::Rosters;

    const SCHEMA_2024: &str = include_str!("../../../fixtures/schema_2024.html");
    const SCHEMA_LEGACY: &str = include_str!("../../../fixtures/schema_legacy.html");

    fn with_resolver<T>(f: impl FnOnce(&Resolver) -> T) -> T {
        let rosters = Rosters::bundled().unwrap();
        let resolver = Resolver::new(
            &rosters,
            "Bor. Mönchengladbach",
            "Bayer 04 Leverkusen",
            Season::new(2024),
            Side::Home,
        );
        f(&resolver)
    }

    #[test]
    fn test_structural_rows() {
        let document = Html::parse_document(SCHEMA_2024);
        let result = with_resolver(|r| extract_goals(&document, r)).unwrap();
        assert!(result.is_structural());
        assert!(result.issues.is_empty());

        let summary: Vec<(u16, &str, Side)> = result
            .goals
            .iter()
            .map(|g| (g.minute, g.scorer.as_str(), g.side))
            .collect();
        assert_eq!(
            summary,
            vec![
                (12, "G. Xhaka", Side::Away),
                (38, "Wirtz", Side::Away),
                (59, "Elvedi", Side::Home),
                (85, "Kleindienst", Side::Home),
                (101, "Wirtz", Side::Away),
            ]
        );

        let first = &result.goals[0];
        assert_eq!(first.goal_type.as_deref(), Some("Linksschuss"));
        assert_eq!(first.assist.as_deref(), Some("Grimaldo"));
        assert_eq!(first.score_after, Some((0, 1)));
    }

    #[test]
    fn test_legacy_class_tier() {
        let document = Html::parse_document(SCHEMA_LEGACY);
        let result = with_resolver(|r| extract_goals(&document, r)).unwrap();
        assert_eq!(result.tier, Some("legacy-class"));

        let summary: Vec<(u16, &str)> = result
            .goals
            .iter()
            .map(|g| (g.minute, g.scorer.as_str()))
            .collect();
        assert_eq!(summary, vec![(23, "Allofs"), (67, "Littbarski"), (90, "Völler")]);
        assert!(result
            .goals
            .iter()
            .all(|g| g.side_confidence == SideConfidence::Assumed));
        assert_eq!(result.issues.len(), 3);
    }

    #[test]
    fn test_full_text_tier() {
        let document = Html::parse_document(
            "<html><body><p>Die Tore: 14' Elvedi, Wirtz 77'</p></body></html>",
        );
        let result = with_resolver(|r| extract_goals(&document, r)).unwrap();
        assert_eq!(result.tier, Some("full-text"));

        let summary: Vec<(u16, &str, Side, SideConfidence)> = result
            .goals
            .iter()
            .map(|g| (g.minute, g.scorer.as_str(), g.side, g.side_confidence))
            .collect();
        assert_eq!(
            summary,
            vec![
                (14, "Elvedi", Side::Home, SideConfidence::Roster),
                (77, "Wirtz", Side::Away, SideConfidence::Roster),
            ]
        );
    }

    #[test]
    fn test_no_goals_anywhere() {
        let document = Html::parse_document("<html><body><p>Spiel abgesagt</p></body></html>");
        let result = with_resolver(|r| extract_goals(&document, r)).unwrap();
        assert!(result.goals.is_empty());
        assert_eq!(result.tier, None);
    }

    #[test]
    fn test_stoppage_sweep_recovers_missing_goal() {
        let document = Html::parse_document(
            "<html><body><div class=\"kick__ticker-event\">\
             90. + 11 Spielminute Tor 2:3 Wirtz Rechtsschuss Leverkusen</div></body></html>",
        );
        with_resolver(|resolver| {
            let mut goals = vec![];
            assert_eq!(sweep_stoppage_time(&document, resolver, &mut goals), 1);
            let goal = &goals[0];
            assert_eq!(goal.minute, 101);
            assert_eq!(goal.scorer, "Wirtz");
            assert_eq!(goal.side, Side::Away);
            assert_eq!(goal.score_after, Some((2, 3)));
            assert_eq!(goal.goal_type.as_deref(), Some("Rechtsschuss"));
        });
    }

    #[test]
    fn test_stoppage_sweep_skips_goal_under_abbreviated_name() {
        let document = Html::parse_document(
            "<html><body><div class=\"kick__ticker-event\">\
             90. + 11 Spielminute Tor 2:3 F. Wirtz Rechtsschuss</div></body></html>",
        );
        with_resolver(|resolver| {
            let mut goals = vec![GoalEvent::new(101, "Wirtz", Side::Away)];
            assert_eq!(sweep_stoppage_time(&document, resolver, &mut goals), 0);
            assert_eq!(goals.len(), 1);
        });
    }

    #[test]
    fn test_stoppage_sweep_skips_goal_with_same_running_score() {
        let document = Html::parse_document(
            "<html><body><div class=\"kick__ticker-event\">\
             90. + 11 Spielminute Tor 2:3 Florian Rechtsschuss</div></body></html>",
        );
        with_resolver(|resolver| {
            let mut goals = vec![GoalEvent {
                score_after: Some((2, 3)),
                ..GoalEvent::new(101, "Wirtz", Side::Away)
            }];
            assert_eq!(sweep_stoppage_time(&document, resolver, &mut goals), 0);
        });
    }

    #[test]
    fn test_stoppage_sweep_is_idempotent() {
        let document = Html::parse_document(SCHEMA_2024);
        with_resolver(|resolver| {
            let mut goals = vec![];
            sweep_stoppage_time(&document, resolver, &mut goals);
            let after_first = goals.clone();
            assert_eq!(sweep_stoppage_time(&document, resolver, &mut goals), 0);
            assert_eq!(goals, after_first);
            assert_eq!(goals.iter().filter(|g| g.minute == 101).count(), 1);
        });
    }
}
