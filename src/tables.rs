//! Statistics table parsing.
//!
//! Match pages carry one sortable table per team. The first header row is a
//! banner cell spanning the table, e.g. `Richmond Match Statistics [Season]`,
//! and the second header row names the columns. Player detail pages follow
//! the same layout with a `Player Details` banner.
//!
//! Parsing a page yields one [`Row`] per player line. Banner-less tables,
//! totals lines and opposition/coach lines are skipped, and lines whose cell
//! count does not match the header are dropped without error.

use crate::models::{IDENTITY_COLUMNS, Row};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::{Number, Value};
use tracing::debug;

static SORTABLE_TABLES: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table.sortable").expect("table selector"));
static BANNER_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("thead th[colspan]").expect("banner selector"));
static HEADER_ROWS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("thead tr").expect("header row selector"));
static HEADER_CELLS: Lazy<Selector> = Lazy::new(|| Selector::parse("th").expect("th selector"));
static BODY_ROWS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tbody tr").expect("body row selector"));
static BODY_CELLS: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("td selector"));
static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("number pattern")
});

const TOTALS_MARKER: &str = "Totals";

/// The two table schemas found on the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    MatchStatistics,
    PlayerDetails,
}

impl TableKind {
    pub const ALL: [TableKind; 2] = [TableKind::MatchStatistics, TableKind::PlayerDetails];

    /// Banner text identifying the table.
    pub fn marker(&self) -> &'static str {
        match self {
            TableKind::MatchStatistics => "Match Statistics",
            TableKind::PlayerDetails => "Player Details",
        }
    }

    /// Text identifying body lines that are not players.
    pub fn non_player_marker(&self) -> &'static str {
        match self {
            TableKind::MatchStatistics => "Opposition",
            TableKind::PlayerDetails => "Coach",
        }
    }

    fn from_banner(banner: &str, accept: &[TableKind]) -> Option<TableKind> {
        accept.iter().copied().find(|k| banner.contains(k.marker()))
    }
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

/// Cell text without surrounding whitespace or non-breaking spaces.
fn clean_cell(raw: &str) -> String {
    raw.trim().replace('\u{a0}', "")
}

/// Rows from every qualifying table on the page, in table then row order.
///
/// Both `Match Statistics` and `Player Details` tables are accepted. The two
/// schemas have different columns, so numeric coercion runs separately for
/// each kind of table.
///
/// # Arguments
///
/// * `html` - The page source
/// * `url` - The page address, stored in every row's `SourceURL` column
///
/// # Returns
///
/// One [`Row`] per player line, tagged with the team from its table banner.
/// A page with no qualifying tables yields an empty vector.
///
/// # Examples
///
/// ```ignore
/// let rows = parse_stat_tables(&html, "https://afltables.com/afl/stats/games/2024/091420240314.html");
/// assert_eq!(rows[0].team(), Some("Richmond"));
/// assert_eq!(rows[0].get("Kicks"), Some(&json!(5)));
/// ```
pub fn parse_stat_tables(html: &str, url: &str) -> Vec<Row> {
    parse_tables(html, url, &TableKind::ALL)
}

/// Rows from the `Match Statistics` tables of a match page.
pub fn parse_match_stats(html: &str, url: &str) -> Vec<Row> {
    parse_tables(html, url, &[TableKind::MatchStatistics])
}

/// Rows from the `Player Details` tables of a page.
pub fn parse_player_details(html: &str, url: &str) -> Vec<Row> {
    parse_tables(html, url, &[TableKind::PlayerDetails])
}

fn parse_tables(html: &str, url: &str, accept: &[TableKind]) -> Vec<Row> {
    let document = Html::parse_document(html);
    let mut parsed: Vec<(TableKind, Vec<Row>)> = Vec::new();

    for table in document.select(&SORTABLE_TABLES) {
        let Some(banner) = table.select(&BANNER_CELL).next() else {
            continue;
        };
        let banner = element_text(&banner).trim().to_string();
        let Some(kind) = TableKind::from_banner(&banner, accept) else {
            continue;
        };
        let team = banner
            .split(kind.marker())
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();

        let Some(header_row) = table.select(&HEADER_ROWS).nth(1) else {
            continue;
        };
        let columns: Vec<String> = header_row
            .select(&HEADER_CELLS)
            .map(|th| element_text(&th).trim().to_string())
            .collect();

        let rows = parse_body(&table, kind, &columns, &team, url);
        debug!(%team, ?kind, columns = columns.len(), rows = rows.len(), "Parsed table");
        parsed.push((kind, rows));
    }

    for kind in accept {
        let Some(first) = parsed
            .iter()
            .filter(|(k, _)| *k == *kind)
            .find_map(|(_, rows)| rows.first())
        else {
            continue;
        };
        let columns = numeric_columns(first);
        for (_, rows) in parsed.iter_mut().filter(|(k, _)| *k == *kind) {
            coerce_columns(rows, &columns);
        }
    }

    parsed.into_iter().flat_map(|(_, rows)| rows).collect()
}

fn parse_body(
    table: &ElementRef<'_>,
    kind: TableKind,
    columns: &[String],
    team: &str,
    url: &str,
) -> Vec<Row> {
    table
        .select(&BODY_ROWS)
        .filter(|tr| {
            let text = element_text(tr);
            !text.contains(TOTALS_MARKER) && !text.contains(kind.non_player_marker())
        })
        .filter_map(|tr| {
            let cells: Vec<String> = tr
                .select(&BODY_CELLS)
                .enumerate()
                .map(|(i, td)| {
                    let text = clean_cell(&element_text(&td));
                    // Jumper numbers can carry sub/injury markers.
                    if i == 0 {
                        text.chars().filter(char::is_ascii_digit).collect()
                    } else {
                        text
                    }
                })
                .collect();
            if cells.len() != columns.len() {
                return None;
            }
            let mut row = Row::from_cells(columns, cells);
            row.tag(team, url);
            Some(row)
        })
        .collect()
}

/// Numeric value of the leading number in `text`, if it has one.
///
/// Integral values become JSON integers so `5` stays `5`, not `5.0`.
pub fn parse_number(text: &str) -> Option<Number> {
    let m = LEADING_NUMBER.find(text)?;
    let value: f64 = m.as_str().parse().ok()?;
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(Number::from(value as i64))
    } else {
        Number::from_f64(value)
    }
}

/// Turn numeric-looking text cells into numbers, column by column.
///
/// The columns to coerce are every column of the first row except the
/// identity columns. Cells that are already numbers, empty or non-numeric
/// are left untouched, so applying this twice changes nothing.
pub fn coerce_numeric_columns(rows: &mut [Row]) {
    let Some(first) = rows.first() else {
        return;
    };
    let columns = numeric_columns(first);
    coerce_columns(rows, &columns);
}

fn numeric_columns(first: &Row) -> Vec<String> {
    first
        .columns()
        .filter(|c| !IDENTITY_COLUMNS.contains(c))
        .map(str::to_string)
        .collect()
}

fn coerce_columns(rows: &mut [Row], columns: &[String]) {
    for row in rows.iter_mut() {
        for column in columns {
            if let Some(cell) = row.get_mut(column) {
                let number = match cell {
                    Value::String(text) if !text.is_empty() => parse_number(text),
                    _ => None,
                };
                if let Some(number) = number {
                    *cell = Value::Number(number);
                }
            }
        }
    }
}
