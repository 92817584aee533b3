use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;

use super::{cascade, Strategy};
use crate::error::{ExtractionIssue, Field, Result};
use crate::kicker::{element_text, Html};
use crate::model::Sourced;

static DAY_MONTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}\.\d{1,2}\.").expect("day month pattern"));

#[derive(Debug)]
pub(crate) struct DateExtraction {
    pub date: Sourced<String>,
    pub issue: Option<ExtractionIssue>,
}

/// Display date of the match, or `01.09.{season_start_year}` when the page has none.
pub(crate) fn extract_date(document: &Html, season_start_year: u16) -> Result<DateExtraction> {
    let tiers: [Strategy<(), String>; 1] = [("date-element", date_from_elements)];
    Ok(match cascade(document, &(), &tiers, |_| true)? {
        Some(hit) => DateExtraction {
            date: Sourced::extracted(hit.value),
            issue: None,
        },
        None => DateExtraction {
            date: Sourced::defaulted(format!("01.09.{season_start_year}")),
            issue: Some(ExtractionIssue::Empty { field: Field::Date }),
        },
    })
}

fn date_from_elements(document: &Html, _: &()) -> Result<Option<String>> {
    let selector = Selector::parse(
        "time[class*='date'], time[class*='time'], span[class*='date'], span[class*='time'], \
         div[class*='date'], div[class*='time']",
    )?;
    Ok(document
        .select(&selector)
        .map(|e| element_text(&e))
        .find(|text| DAY_MONTH_RE.is_match(text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_day_month_text_wins() {
        let html = r#"<html><body>
            <span class="kick__goals__time">12'</span>
            <div class="kick__v100-gameCell__dateTime"><span>Fr., 30.08.2024</span> <span>20:30</span></div>
            <time class="date">31.08.2024</time>
        </body></html>"#;
        let result = extract_date(&Html::parse_document(html), 2024).unwrap();
        assert_eq!(result.date.value, "Fr., 30.08.2024 20:30");
        assert!(result.issue.is_none());
    }

    #[test]
    fn test_fallback_to_season_start() {
        let result =
            extract_date(&Html::parse_document("<html><body></body></html>"), 1987).unwrap();
        assert_eq!(result.date.value, "01.09.1987");
        assert!(result.date.is_defaulted());
        assert_eq!(result.issue, Some(ExtractionIssue::Empty { field: Field::Date }));
    }
}
