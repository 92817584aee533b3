use scraper::{ElementRef, Selector};
use tracing::debug;

use super::{cascade, Strategy};
use crate::error::{ExtractionIssue, Field, Result};
use crate::kicker::{element_text, select_text, Html};
use crate::model::{Player, PlayerDetails, Position, Side};
use crate::normalize::normalize_name;
use crate::resolve::Resolver;

pub(crate) const STARTING_ELEVEN: usize = 11;

const LINEUP_HEADLINE: &str = "Aufstellung";

#[derive(Debug)]
pub(crate) struct LineupExtraction {
    pub home: Vec<Player>,
    pub away: Vec<Player>,
    pub tier: Option<&'static str>,
    pub issues: Vec<ExtractionIssue>,
}

type Sides = (Vec<Player>, Vec<Player>);

/// Starting elevens of both teams, at most 11 players each.
pub(crate) fn extract_lineups(document: &Html, resolver: &Resolver) -> Result<LineupExtraction> {
    let tiers: [Strategy<Resolver, Sides>; 2] = [
        ("structural", structural_lineups),
        ("profile-links", lineups_from_profile_links),
    ];
    let hit = cascade(document, resolver, &tiers, |(home, away)| {
        home.len() >= STARTING_ELEVEN && away.len() >= STARTING_ELEVEN
    })?;
    let (tier, (mut home, mut away)) = match hit {
        Some(hit) => (Some(hit.tier), hit.value),
        None => (None, (vec![], vec![])),
    };
    home.truncate(STARTING_ELEVEN);
    away.truncate(STARTING_ELEVEN);

    let issues = [(Field::HomeLineup, home.len()), (Field::AwayLineup, away.len())]
        .into_iter()
        .filter(|&(_, found)| found < STARTING_ELEVEN)
        .map(|(field, found)| ExtractionIssue::Incomplete {
            field,
            found,
            expected: STARTING_ELEVEN,
        })
        .collect();

    debug!(?tier, home = home.len(), away = away.len(), "lineups extracted");
    Ok(LineupExtraction {
        home,
        away,
        tier,
        issues,
    })
}

fn structural_lineups(document: &Html, _: &Resolver) -> Result<Option<Sides>> {
    let section_selector = Selector::parse("section.kick__section-item")?;
    let headline_selector = Selector::parse("header h4")?;
    let left_selector = Selector::parse("div.kick__lineup__team--left")?;
    let right_selector = Selector::parse("div.kick__lineup__team--right")?;

    let Some(section) = document.select(&section_selector).find(|section| {
        select_text(section, &headline_selector).contains(LINEUP_HEADLINE)
    }) else {
        return Ok(None);
    };

    let home = match section.select(&left_selector).next() {
        Some(team) => team_lineup(&team)?,
        None => vec![],
    };
    let away = match section.select(&right_selector).next() {
        Some(team) => team_lineup(&team)?,
        None => vec![],
    };

    if home.is_empty() && away.is_empty() {
        return Ok(None);
    }
    Ok(Some((home, away)))
}

fn team_lineup(team: &ElementRef) -> Result<Vec<Player>> {
    let list_selector = Selector::parse("div.kick__lineup-text__unorderedList")?;
    let link_selector = Selector::parse("a[href*='/spieler']")?;
    let captain_selector = Selector::parse("span.kick__icon-Captain_DICK")?;
    let rating_selector = Selector::parse("span.kick__badge--note")?;

    let list = team.select(&list_selector).next().unwrap_or(*team);
    let mut players = vec![];
    for link in list.select(&link_selector) {
        let name = normalize_name(&element_text(&link));
        if name.is_empty() {
            continue;
        }
        let holder = link.parent().and_then(ElementRef::wrap).unwrap_or(link);
        let is_captain = holder.select(&captain_selector).next().is_some();
        let rating = holder
            .select(&rating_selector)
            .next()
            .and_then(|badge| element_text(&badge).replace(',', ".").parse::<f32>().ok());

        let position = Position::from_lineup_index(players.len());
        players.push(Player {
            name,
            details: Some(PlayerDetails {
                position,
                rating,
                is_captain,
            }),
        });
    }
    Ok(players)
}

/// Every profile link on the page, split in half and corrected by roster.
fn lineups_from_profile_links(document: &Html, resolver: &Resolver) -> Result<Option<Sides>> {
    let selector = Selector::parse("a[href*='/spieler']")?;
    let mut names: Vec<String> = vec![];
    for link in document.select(&selector) {
        let name = normalize_name(&element_text(&link));
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
    }
    if names.is_empty() {
        return Ok(None);
    }

    let half = names.len().div_ceil(2);
    let (mut home, mut away) = (vec![], vec![]);
    for (index, name) in names.into_iter().enumerate() {
        let positional = if index < half { Side::Home } else { Side::Away };
        match resolver.roster_side(&name).unwrap_or(positional) {
            Side::Home => home.push(Player::new(name)),
            Side::Away => away.push(Player::new(name)),
        }
    }
    Ok(Some((home, away)))
}
