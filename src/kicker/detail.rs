use tracing::{debug, instrument, warn};

use super::extract::date::extract_date;
use super::extract::goals::extract_goals;
use super::extract::lineups::extract_lineups;
use super::extract::score::extract_score;
use super::Html;
use crate::config::ScraperConfig;
use crate::error::{ExtractionIssue, Result};
use crate::model::{Match, MatchAddress, Player, Score, ScoreSource, Side, Sourced, Team};
use crate::resolve::Resolver;
use crate::transport::PageSource;

/// Fetch and extract one match detail page.
///
/// Only address and transport problems are errors. Anything the page does
/// not yield ends up as a default value plus an entry in `Match::issues`.
#[instrument(skip(source, config))]
pub(crate) async fn fetch_match<S: PageSource>(
    source: &S,
    address: &str,
    config: &ScraperConfig,
) -> Result<Match> {
    let address = MatchAddress::parse(address)?;
    let body = source.fetch_page(&address.url).await?;
    let result = parse_match(&address, &body, config)?;
    debug!(
        score = %result.score.value,
        home_goals = result.home_goals.len(),
        away_goals = result.away_goals.len(),
        issues = result.issues.len(),
        "parsed match detail"
    );
    Ok(result)
}

pub(crate) fn parse_match(address: &MatchAddress, html: &str, config: &ScraperConfig) -> Result<Match> {
    let document = Html::parse_document(html);
    let season = address.season();
    let home_name = config.team_names.display_name(&address.home_slug);
    let away_name = config.team_names.display_name(&address.away_slug);
    let resolver = Resolver::new(
        &config.rosters,
        &home_name,
        &away_name,
        season,
        config.default_side,
    );

    let mut issues = vec![];

    let score = extract_score(&document)?;
    issues.extend(score.issues);

    let date = extract_date(&document, season.start_year())?;
    issues.extend(date.issue);

    let goals = extract_goals(&document, &resolver)?;
    let structural_goals = goals.is_structural();
    issues.extend(goals.issues);
    let (home_goals, away_goals): (Vec<_>, Vec<_>) =
        goals.goals.into_iter().partition(|g| g.side == Side::Home);

    let lineups = extract_lineups(&document, &resolver)?;
    issues.extend(lineups.issues);

    let (score, score_source) = if structural_goals && !(home_goals.is_empty() && away_goals.is_empty()) {
        let tally = Score::new(saturating_count(&home_goals), saturating_count(&away_goals));
        if score.source != ScoreSource::Placeholder && score.score.value != tally {
            warn!(tally = %tally, page = %score.score.value, "goal tally disagrees with page score");
            issues.push(ExtractionIssue::ScoreMismatch {
                tally: tally.to_string(),
                page: score.score.value.to_string(),
            });
        }
        (Sourced::extracted(tally), ScoreSource::GoalTally)
    } else {
        (score.score, score.source)
    };

    Ok(Match {
        address: address.url.clone(),
        home_team: team(home_name, lineups.home),
        away_team: team(away_name, lineups.away),
        date: date.date,
        season,
        matchday: None,
        score,
        score_source,
        home_goals,
        away_goals,
        issues,
    })
}

fn team(name: String, players: Vec<Player>) -> Team {
    Team { name, players }
}

fn saturating_count<T>(items: &[T]) -> u8 {
    u8::try_from(items.len()).unwrap_or(u8::MAX)
}
