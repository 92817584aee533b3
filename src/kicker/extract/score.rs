use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;
use tracing::debug;

use super::{cascade, Findings, Strategy};
use crate::error::{ExtractionIssue, Field, Result};
use crate::kicker::{compact_text, element_text, Html};
use crate::model::{Score, ScoreSource, Sourced};

static TITLE_SCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,3})[:：](\d{1,3})").expect("title score pattern"));
static STRICT_SCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+):(\d+)$").expect("strict score pattern"));

/// Upper bound (exclusive) for a believable football score.
const MAX_PLAUSIBLE_GOALS: u32 = 20;

const PLACEHOLDER: Score = Score { home: 0, away: 0 };

#[derive(Debug)]
pub(crate) struct ScoreExtraction {
    pub score: Sourced<Score>,
    pub source: ScoreSource,
    pub issues: Vec<ExtractionIssue>,
}

pub(crate) fn extract_score(document: &Html) -> Result<ScoreExtraction> {
    let findings = Findings::default();
    let tiers: [Strategy<Findings, (Score, ScoreSource)>; 2] = [
        ("title", score_from_title),
        ("score-element", score_from_elements),
    ];
    let hit = cascade(document, &findings, &tiers, |_| true)?;
    let mut issues = findings.into_vec();

    Ok(match hit {
        Some(hit) => {
            let (score, source) = hit.value;
            debug!(tier = hit.tier, %score, "score extracted");
            ScoreExtraction {
                score: Sourced::extracted(score),
                source,
                issues,
            }
        }
        None => {
            issues.push(ExtractionIssue::Empty { field: Field::Score });
            ScoreExtraction {
                score: Sourced::defaulted(PLACEHOLDER),
                source: ScoreSource::Placeholder,
                issues,
            }
        }
    })
}

fn score_from_title(document: &Html, findings: &Findings) -> Result<Option<(Score, ScoreSource)>> {
    let selector = Selector::parse("title, h1")?;
    for element in document.select(&selector) {
        let text = element_text(&element);
        for caps in TITLE_SCORE_RE.captures_iter(&text) {
            if let Some(score) = plausible_score(&caps[1], &caps[2], findings) {
                return Ok(Some((score, ScoreSource::Title)));
            }
        }
    }
    Ok(None)
}

/// Both values below [`MAX_PLAUSIBLE_GOALS`], otherwise reported as ambiguous.
fn plausible_score(home: &str, away: &str, findings: &Findings) -> Option<Score> {
    let (Ok(home_goals), Ok(away_goals)) = (home.parse::<u32>(), away.parse::<u32>()) else {
        return None;
    };
    if home_goals >= MAX_PLAUSIBLE_GOALS || away_goals >= MAX_PLAUSIBLE_GOALS {
        findings.report(ExtractionIssue::Ambiguous {
            field: Field::Score,
            candidate: format!("{home}:{away}"),
        });
        return None;
    }
    // Both values are below 20, so they fit.
    Some(Score::new(home_goals as u8, away_goals as u8))
}

fn score_from_elements(
    document: &Html,
    findings: &Findings,
) -> Result<Option<(Score, ScoreSource)>> {
    let selector = Selector::parse(
        "span[class*='score'], span[class*='result'], div[class*='score'], div[class*='result']",
    )?;

    let mut final_candidates = vec![];
    let mut other_candidates = vec![];
    for element in document.select(&selector) {
        let text = compact_text(&element);
        let Some(caps) = STRICT_SCORE_RE.captures(&text) else {
            continue;
        };
        let Some(score) = plausible_score(&caps[1], &caps[2], findings) else {
            continue;
        };

        let classes: Vec<&str> = element.value().classes().collect();
        let is_holder = classes.iter().any(|c| c.contains("scoreHolder"));
        let is_fragment = classes
            .iter()
            .any(|c| c.contains("subscore") || c.contains("goals"));
        if is_holder && !is_fragment {
            final_candidates.push(score);
        } else {
            other_candidates.push(score);
        }
    }

    // The last plain candidate is usually the final score; earlier ones are half-time.
    let score = final_candidates
        .first()
        .or(other_candidates.last())
        .copied();
    Ok(score.map(|s| (s, ScoreSource::ScoreElement)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_score_ascii_and_full_width() {
        for (home, away) in [(0u8, 0u8), (2, 3), (11, 0), (7, 19)] {
            for colon in [":", "："] {
                let html = format!(
                    "<html><head><title>Gladbach gegen Leverkusen {home}{colon}{away} | Spielschema</title></head></html>"
                );
                let result = extract_score(&Html::parse_document(&html)).unwrap();
                assert_eq!(result.score.value, Score::new(home, away));
                assert_eq!(result.source, ScoreSource::Title);
                assert!(!result.score.is_defaulted());
            }
        }
    }

    #[test]
    fn test_score_holder_preferred_over_fragments() {
        let html = r#"<html><head><title>Spielschema</title></head><body>
            <div class="kick__v100-scoreBoard__scoreHolder kick__v100-scoreBoard__scoreHolder--subscore"><span>1:1</span></div>
            <div class="kick__v100-scoreBoard__scoreHolder"><span>2</span><span>:</span><span>3</span></div>
            <div class="kick__goals__score">0:1</div>
        </body></html>"#;
        let result = extract_score(&Html::parse_document(html)).unwrap();
        assert_eq!(result.score.value, Score::new(2, 3));
        assert_eq!(result.source, ScoreSource::ScoreElement);
    }

    #[test]
    fn test_composite_and_implausible_candidates_rejected() {
        let html = r#"<html><body>
            <span class="match-result">2:30:2</span>
            <span class="match-result">25:1</span>
            <span class="match-result">1:0</span>
            <span class="match-result">4:1</span>
        </body></html>"#;
        let result = extract_score(&Html::parse_document(html)).unwrap();
        assert_eq!(result.score.value, Score::new(4, 1));
        assert_eq!(
            result.issues,
            vec![ExtractionIssue::Ambiguous {
                field: Field::Score,
                candidate: "25:1".to_string()
            }]
        );
    }

    #[test]
    fn test_kickoff_time_in_title_is_not_a_score() {
        let html = r#"<html><head><title>Gladbach - Leverkusen | Anstoss 20:30 | kicker</title></head><body>
            <div class="kick__v100-scoreBoard__scoreHolder"><span>2</span><span>:</span><span>3</span></div>
        </body></html>"#;
        let result = extract_score(&Html::parse_document(html)).unwrap();
        assert_eq!(result.score.value, Score::new(2, 3));
        assert_eq!(result.source, ScoreSource::ScoreElement);
        assert_eq!(
            result.issues,
            vec![ExtractionIssue::Ambiguous {
                field: Field::Score,
                candidate: "20:30".to_string()
            }]
        );
    }

    #[test]
    fn test_title_skips_time_before_score() {
        let html = "<html><head><title>Anstoss 20:30 - Gladbach 1:0 Leverkusen</title></head></html>";
        let result = extract_score(&Html::parse_document(html)).unwrap();
        assert_eq!(result.score.value, Score::new(1, 0));
        assert_eq!(result.source, ScoreSource::Title);
        assert!(!result.score.is_defaulted());
    }

    #[test]
    fn test_only_implausible_title_falls_back_to_placeholder() {
        let html = "<html><head><title>Anstoss 20:30</title></head><body></body></html>";
        let result = extract_score(&Html::parse_document(html)).unwrap();
        assert!(result.score.is_defaulted());
        assert_eq!(result.source, ScoreSource::Placeholder);
        assert_eq!(result.issues.len(), 2);
    }

    #[test]
    fn test_placeholder_when_nothing_found() {
        let result = extract_score(&Html::parse_document("<html><body><p>kein Ergebnis</p></body></html>")).unwrap();
        assert!(result.score.is_defaulted());
        assert_eq!(result.source, ScoreSource::Placeholder);
        assert!(result
            .issues
            .contains(&ExtractionIssue::Empty { field: Field::Score }));
    }
}
