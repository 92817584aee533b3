use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};
use tracing::{debug, instrument, warn};

use super::{absolute_url, element_text, get_document, Html};
use crate::error::Result;
use crate::model::{DiscoveredMatch, MatchAddress, Season, SeasonMatchList};
use crate::transport::PageSource;

static MATCHDAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.\s*Spieltag").expect("matchday pattern"));

const HEADING_SELECTOR: &str =
    "h2[class*='headline'], h2[class*='title'], h3[class*='headline'], h3[class*='title']";
const GAME_ROW_CLASS: &str = "kick__v100-gameList__gameRow";

/// Overview page listing every matchday of a season.
pub(crate) fn season_overview_url(base_url: &str, season: Season) -> String {
    format!("{base_url}/bundesliga/spieltag/{season}/-1")
}

/// All fixtures of `season`, in page order, each tagged with its matchday.
#[instrument(skip(source))]
pub(crate) async fn list_season_matches<S: PageSource>(
    source: &S,
    base_url: &str,
    season: Season,
) -> Result<SeasonMatchList> {
    let url = season_overview_url(base_url, season);
    let document = get_document(source, &url).await?;
    let result = parse_season_matches(&document, base_url, season)?;
    debug!(count = result.len(), "parsed season match list");
    Ok(result)
}

pub(crate) fn parse_season_matches(
    document: &Html,
    base_url: &str,
    season: Season,
) -> Result<SeasonMatchList> {
    let heading_selector = Selector::parse(HEADING_SELECTOR)?;
    let row_selector = Selector::parse(&format!("div.{GAME_ROW_CLASS}"))?;
    let link_selector = Selector::parse("a[href]")?;
    let max_matchday = season.expected_matchdays();

    let mut matches: SeasonMatchList = vec![];
    for heading in document.select(&heading_selector) {
        let Some(matchday) = matchday_of(&heading) else {
            continue;
        };
        if matchday == 0 || matchday > max_matchday {
            warn!(matchday, %season, max_matchday, "discarding matchday outside the season");
            continue;
        }

        for row in matchday_rows(&heading, &heading_selector, &row_selector) {
            let Some(href) = row
                .select(&link_selector)
                .filter_map(|a| a.value().attr("href"))
                .find(|href| href.ends_with("/schema") || href.ends_with("/analyse"))
            else {
                continue;
            };

            let href = match href.strip_suffix("/analyse") {
                Some(stem) => format!("{stem}/schema"),
                None => href.to_string(),
            };
            let address = absolute_url(base_url, &href);
            if let Err(e) = MatchAddress::parse(&address) {
                warn!(%address, error = %e, "skipping fixture with unexpected address");
                continue;
            }
            if matches.iter().any(|m| m.address == address) {
                continue;
            }
            matches.push(DiscoveredMatch {
                address,
                expected_matchday: matchday,
            });
        }
    }
    Ok(matches)
}

fn matchday_of(heading: &ElementRef) -> Option<u8> {
    let text = element_text(heading);
    MATCHDAY_RE.captures(&text)?[1].parse().ok()
}

/// Game rows belonging to one matchday heading.
///
/// A wrapper that holds only this heading is the container. Otherwise the
/// rows are the siblings following the heading, up to the next matchday
/// heading.
fn matchday_rows<'a>(
    heading: &ElementRef<'a>,
    heading_selector: &Selector,
    row_selector: &Selector,
) -> Vec<ElementRef<'a>> {
    if let Some(parent) = heading.parent().and_then(ElementRef::wrap) {
        let headings_in_parent = parent
            .select(heading_selector)
            .filter(|h| matchday_of(h).is_some())
            .count();
        if headings_in_parent == 1 {
            return parent.select(row_selector).collect();
        }
    }

    let mut rows = vec![];
    for sibling in heading.next_siblings().filter_map(ElementRef::wrap) {
        if heading_selector.matches(&sibling) && matchday_of(&sibling).is_some() {
            break;
        }
        if sibling.value().classes().any(|c| c == GAME_ROW_CLASS) {
            rows.push(sibling);
        } else {
            rows.extend(sibling.select(row_selector));
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BASE_URL;
    use crate::error::KickerError;

    const SPIELTAG_2024: &str = include_str!("../../fixtures/spieltag_2024.html");

    fn addresses(list: &SeasonMatchList) -> Vec<(&str, u8)> {
        list.iter()
            .map(|m| (m.address.trim_start_matches(BASE_URL), m.expected_matchday))
            .collect()
    }

    #[test]
    fn test_overview_url() {
        assert_eq!(
            season_overview_url(BASE_URL, Season::new(2024)),
            "https://www.kicker.de/bundesliga/spieltag/2024-25/-1"
        );
    }

    #[test]
    fn test_parse_fixture_page() {
        let document = Html::parse_document(SPIELTAG_2024);
        let list = parse_season_matches(&document, BASE_URL, Season::new(2024)).unwrap();
        assert_eq!(
            addresses(&list),
            vec![
                ("/gladbach-gegen-leverkusen-2024-bundesliga-4862162/schema", 1),
                ("/bayern-gegen-wolfsburg-2024-bundesliga-4862160/schema", 1),
                ("/leverkusen-gegen-leipzig-2024-bundesliga-4862170/schema", 2),
                ("/bremen-gegen-dortmund-2024-bundesliga-4862180/schema", 3),
                ("/stuttgart-gegen-mainz-2024-bundesliga-4862190/schema", 4),
            ]
        );
    }

    #[test]
    fn test_matchdays_beyond_season_format_are_discarded() {
        let html = r#"<html><body>
            <div class="kick__v100-gameList">
              <h2 class="kick__v100-gameList__header-title">34. Spieltag</h2>
              <div class="kick__v100-gameList__gameRow">
                <a href="/hamburg-gegen-bayern-1996-bundesliga-10/schema">Spielschema</a>
              </div>
            </div>
            <div class="kick__v100-gameList">
              <h2 class="kick__v100-gameList__header-title">40. Spieltag</h2>
              <div class="kick__v100-gameList__gameRow">
                <a href="/koeln-gegen-schalke-1996-bundesliga-11/schema">Spielschema</a>
              </div>
            </div>
        </body></html>"#;
        let list =
            parse_season_matches(&Html::parse_document(html), BASE_URL, Season::new(1996)).unwrap();
        assert_eq!(
            addresses(&list),
            vec![("/hamburg-gegen-bayern-1996-bundesliga-10/schema", 34)]
        );
    }

    struct OnePage(&'static str);

    impl PageSource for OnePage {
        async fn fetch_page(&self, url: &str) -> Result<String> {
            if url == "https://www.kicker.de/bundesliga/spieltag/2024-25/-1" {
                Ok(self.0.to_string())
            } else {
                Err(KickerError::UnexpectedStatus {
                    url: url.to_string(),
                    status: reqwest::StatusCode::NOT_FOUND,
                })
            }
        }
    }

    #[tokio::test]
    async fn test_list_season_matches() {
        let list = list_season_matches(&OnePage(SPIELTAG_2024), BASE_URL, Season::new(2024))
            .await
            .unwrap();
        assert_eq!(list.len(), 5);

        let err = list_season_matches(&OnePage(SPIELTAG_2024), BASE_URL, Season::new(2023))
            .await
            .unwrap_err();
        assert!(err.is_network());
    }
}
