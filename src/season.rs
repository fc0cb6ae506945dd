//! Season page expansion.
//!
//! A season page (`.../seas/<YYYY>.html`) lists every match of the year,
//! grouped into rounds. Each round block starts with a named anchor
//! (`<a name="3">`) and contains a "Match stats" link per game pointing at
//! `.../stats/games/<YYYY>/<id>.html`.
//!
//! Expansion turns a season URL into the ordered, duplicate-free list of
//! absolute match URLs, either for the whole season or for one round.

use crate::error::ScrapeError;
use crate::fetcher::PageFetcher;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

/// Visible text of the per-game link inside a round block.
pub const MATCH_LINK_LABEL: &str = "Match stats";

static SEASON_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/seas/(\d{4})\.html$").expect("season year pattern"));
static MATCH_HREF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/stats/games/(\d{4})/[A-Za-z0-9]+\.html$").expect("match href pattern")
});
static LINKS: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("link selector"));
static NAMED_ANCHORS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[name]").expect("anchor selector"));

/// Pull the 4-digit year out of a season URL, e.g. `/seas/2024.html` -> `2024`.
pub fn extract_year(season_url: &str) -> Option<String> {
    SEASON_YEAR
        .captures(season_url)
        .map(|caps| caps[1].to_string())
}

/// Like [`extract_year`], but a missing year is a [`ScrapeError::YearDetection`].
pub fn detect_year(season_url: &str) -> Result<String, ScrapeError> {
    extract_year(season_url).ok_or_else(|| ScrapeError::YearDetection {
        url: season_url.to_string(),
    })
}

fn parse_base(season_url: &str) -> Result<Url, ScrapeError> {
    Url::parse(season_url).map_err(|source| ScrapeError::InvalidUrl {
        url: season_url.to_string(),
        source,
    })
}

fn resolve(base: &Url, href: &str) -> Option<String> {
    base.join(href).ok().map(String::from)
}

/// Every match link for `year` on the season page, in document order.
///
/// Links are resolved against `season_url` and deduplicated on the absolute
/// URL, keeping the first occurrence.
pub fn collect_all_match_links(
    html: &str,
    season_url: &str,
    year: &str,
) -> Result<Vec<String>, ScrapeError> {
    let base = parse_base(season_url)?;
    let document = Html::parse_document(html);

    let links = document
        .select(&LINKS)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| {
            MATCH_HREF
                .captures(href)
                .is_some_and(|caps| &caps[1] == year)
        })
        .filter_map(|href| resolve(&base, href))
        .unique()
        .collect::<Vec<_>>();

    debug!(count = links.len(), %year, "Collected season match links");
    Ok(links)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    BeforeAnchor,
    Collecting,
    Done,
}

/// Named anchors use `name`; an empty name counts as no name.
fn anchor_name<'a>(el: &ElementRef<'a>) -> Option<&'a str> {
    el.value().attr("name").filter(|n| !n.is_empty())
}

/// Match links between `<a name="{round}">` and the next differently named anchor.
///
/// The scan covers every `<a>` element in document order starting at the
/// round anchor's container. Links before the anchor inside that container
/// are ignored; the first anchor with another name ends the round and is not
/// itself collected. A round whose anchor exists but yields no links is
/// reported as [`ScrapeError::RoundNotFound`], the same as a missing anchor.
pub fn collect_round_match_links(
    html: &str,
    season_url: &str,
    round: u32,
) -> Result<Vec<String>, ScrapeError> {
    let not_found = || ScrapeError::RoundNotFound {
        round,
        url: season_url.to_string(),
    };

    let base = parse_base(season_url)?;
    let document = Html::parse_document(html);
    let round_name = round.to_string();

    let anchor = document
        .select(&NAMED_ANCHORS)
        .find(|a| anchor_name(a) == Some(round_name.as_str()))
        .ok_or_else(not_found)?;
    let container = anchor.parent().and_then(ElementRef::wrap).unwrap_or(anchor);

    let ordered_links = document
        .root_element()
        .descendants()
        .skip_while(|node| node.id() != container.id())
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "a");

    let mut state = ScanState::BeforeAnchor;
    let mut hrefs = Vec::new();
    for link in ordered_links {
        state = match (state, anchor_name(&link)) {
            (ScanState::BeforeAnchor, Some(name)) if name == round_name => ScanState::Collecting,
            (ScanState::BeforeAnchor, _) => ScanState::BeforeAnchor,
            (ScanState::Collecting, Some(name)) if name != round_name => ScanState::Done,
            (ScanState::Collecting, Some(_)) => ScanState::Collecting,
            (ScanState::Collecting, None) => {
                let label = link.text().collect::<String>();
                if label.trim() == MATCH_LINK_LABEL {
                    if let Some(href) = link.value().attr("href") {
                        if href.contains("/stats/games/") {
                            hrefs.push(href);
                        }
                    }
                }
                ScanState::Collecting
            }
            (ScanState::Done, _) => ScanState::Done,
        };
        if state == ScanState::Done {
            break;
        }
    }

    let links = hrefs
        .into_iter()
        .filter_map(|href| resolve(&base, href))
        .unique()
        .collect::<Vec<_>>();

    debug!(count = links.len(), round, "Collected round match links");
    if links.is_empty() {
        return Err(not_found());
    }
    Ok(links)
}

/// Fallback season expansion: fetch the season page and collect its match URLs.
///
/// The year is checked before anything is fetched, so a malformed season URL
/// fails without touching the network.
///
/// # Arguments
///
/// * `season_url` - Season page address ending in `/seas/<YYYY>.html`
/// * `fetcher` - Used for the single season page request
/// * `round` - When set, only the links listed under that round's anchor
///
/// # Returns
///
/// Absolute match URLs in page order, without duplicates. Fails with
/// [`ScrapeError::YearDetection`] for a malformed URL and
/// [`ScrapeError::RoundNotFound`] when the round has no match links.
///
/// # Examples
///
/// ```ignore
/// let urls = expand_season("https://afltables.com/afl/seas/2024.html", &fetcher, Some(2)).await?;
/// assert!(urls.iter().all(|u| u.contains("/stats/games/2024/")));
/// ```
#[instrument(level = "info", skip_all, fields(%season_url, ?round))]
pub async fn expand_season(
    season_url: &str,
    fetcher: &dyn PageFetcher,
    round: Option<u32>,
) -> Result<Vec<String>, ScrapeError> {
    let year = detect_year(season_url)?;
    let html = fetcher.get(season_url).await?;

    let urls = match round {
        Some(round) => collect_round_match_links(&html, season_url, round)?,
        None => collect_all_match_links(&html, season_url, &year)?,
    };
    info!(count = urls.len(), %year, "Expanded season page");
    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEASON_URL: &str = "https://afltables.com/afl/seas/2024.html";

    fn round_page() -> String {
        r#"<html><body>
        <p><a href="../stats/games/2024/early.html">Match stats</a></p>
        <center>
          <a name="1"></a><b>Round: 1</b>
          <table><tr><td><a href="../stats/games/2024/r1g1.html">Match stats</a></td></tr></table>
        </center>
        <center>
          <a name="2"></a><b>Round: 2</b>
          <table>
            <tr><td><a href="../stats/games/2024/r2g1.html">Match stats</a></td></tr>
            <tr><td><a href="../teams/richmond/idx.html">Richmond</a></td></tr>
            <tr><td><a href="../stats/games/2024/r2g2.html"> Match stats </a></td></tr>
            <tr><td><a href="../stats/games/2024/r2g2.html">Match stats</a></td></tr>
            <tr><td><a href="../stats/games/2024/r2g3.html">Match stats</a></td></tr>
          </table>
        </center>
        <center>
          <a name="3"></a><b>Round: 3</b>
          <table><tr><td><a href="../stats/games/2024/r3g1.html">Match stats</a></td></tr></table>
        </center>
        <center>
          <a name="4"></a><b>Round: 4</b><p>Bye round</p>
        </center>
        <a name="5"></a>
        </body></html>"#
            .to_string()
    }

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year(SEASON_URL).as_deref(), Some("2024"));
        assert_eq!(extract_year("https://afltables.com/afl/seas/1897.html").as_deref(), Some("1897"));
        assert_eq!(extract_year("https://afltables.com/afl/seas/2024.htm"), None);
        assert_eq!(extract_year("https://afltables.com/afl/seas/24.html"), None);
        assert_eq!(extract_year("https://afltables.com/afl/seas/2024.html?x=1"), None);
    }

    #[test]
    fn test_detect_year_error() {
        let err = detect_year("https://afltables.com/afl/stats/games/2024/abc.html").unwrap_err();
        assert!(matches!(err, ScrapeError::YearDetection { .. }));
    }

    #[test]
    fn test_round_links_stop_at_next_anchor() {
        let links = collect_round_match_links(&round_page(), SEASON_URL, 2).unwrap();
        assert_eq!(
            links,
            vec![
                "https://afltables.com/afl/stats/games/2024/r2g1.html",
                "https://afltables.com/afl/stats/games/2024/r2g2.html",
                "https://afltables.com/afl/stats/games/2024/r2g3.html",
            ]
        );
    }

    #[test]
    fn test_round_scenario_three_links() {
        let html = r#"<div>
            <a name="2"></a>
            <a href="/afl/stats/games/2024/a1.html">Match stats</a>
            <a href="/afl/stats/games/2024/a2.html">Match stats</a>
            <a href="/afl/stats/games/2024/a3.html">Match stats</a>
            <a name="3"></a>
            <a href="/afl/stats/games/2024/b1.html">Match stats</a>
        </div>"#;
        let links = collect_round_match_links(html, SEASON_URL, 2).unwrap();
        assert_eq!(
            links,
            vec![
                "https://afltables.com/afl/stats/games/2024/a1.html",
                "https://afltables.com/afl/stats/games/2024/a2.html",
                "https://afltables.com/afl/stats/games/2024/a3.html",
            ]
        );
    }

    #[test]
    fn test_links_before_anchor_in_same_container_are_ignored() {
        let html = r#"<div>
            <a href="/afl/stats/games/2024/before.html">Match stats</a>
            <a name="7"></a>
            <a href="/afl/stats/games/2024/after.html">Match stats</a>
        </div>"#;
        let links = collect_round_match_links(html, SEASON_URL, 7).unwrap();
        assert_eq!(links, vec!["https://afltables.com/afl/stats/games/2024/after.html"]);
    }

    #[test]
    fn test_last_round_runs_to_end_of_document() {
        let links = collect_round_match_links(&round_page(), SEASON_URL, 3).unwrap();
        assert_eq!(links, vec!["https://afltables.com/afl/stats/games/2024/r3g1.html"]);
    }

    #[test]
    fn test_missing_round_anchor() {
        let err = collect_round_match_links(&round_page(), SEASON_URL, 9).unwrap_err();
        assert!(matches!(err, ScrapeError::RoundNotFound { round: 9, .. }));
    }

    #[test]
    fn test_anchor_without_links_is_round_not_found() {
        let err = collect_round_match_links(&round_page(), SEASON_URL, 4).unwrap_err();
        assert!(matches!(err, ScrapeError::RoundNotFound { round: 4, .. }));
    }

    #[test]
    fn test_duplicate_round_anchor_uses_first() {
        let html = r#"<div>
            <a name="1"></a>
            <a href="/afl/stats/games/2024/x1.html">Match stats</a>
            <a name="1"></a>
            <a href="/afl/stats/games/2024/x2.html">Match stats</a>
            <a name="2"></a>
        </div>"#;
        let links = collect_round_match_links(html, SEASON_URL, 1).unwrap();
        assert_eq!(links.len(), 2);
        assert!(links[0].ends_with("x1.html"));
    }

    #[test]
    fn test_all_match_links_dedup_in_order() {
        let links = collect_all_match_links(&round_page(), SEASON_URL, "2024").unwrap();
        assert_eq!(
            links,
            vec![
                "https://afltables.com/afl/stats/games/2024/early.html",
                "https://afltables.com/afl/stats/games/2024/r1g1.html",
                "https://afltables.com/afl/stats/games/2024/r2g1.html",
                "https://afltables.com/afl/stats/games/2024/r2g2.html",
                "https://afltables.com/afl/stats/games/2024/r2g3.html",
                "https://afltables.com/afl/stats/games/2024/r3g1.html",
            ]
        );
        assert_eq!(links.iter().unique().count(), links.len());
    }

    #[test]
    fn test_all_match_links_filters_other_years_and_ids() {
        let html = r#"
            <a href="/afl/stats/games/2023/old.html">old</a>
            <a href="/afl/stats/games/2024/ok1.html">ok</a>
            <a href="/afl/stats/games/2024/not-alnum.html">bad id</a>
            <a href="/afl/stats/games/2024/ok2.html#top">fragment</a>
            <a href="https://afltables.com/afl/stats/games/2024/ok3.html">absolute</a>
        "#;
        let links = collect_all_match_links(html, SEASON_URL, "2024").unwrap();
        assert_eq!(
            links,
            vec![
                "https://afltables.com/afl/stats/games/2024/ok1.html",
                "https://afltables.com/afl/stats/games/2024/ok3.html",
            ]
        );
    }
}
