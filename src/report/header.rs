use chrono::NaiveDate;
use lazy_regex::regex_captures;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::report::document::{Document, Page};
use crate::report::traits::{FromTableRow, UNKNOWN};

const MATCH_DATE_LABEL: &str = "Spiel/Datum";
const DATE_START_MARKER: &str = " am ";
const DATE_END_MARKER: &str = " um";
const LEAGUE_LABEL: &str = "Spielklasse";
const HOME_LABEL: &str = "Heim:";
const GUEST_LABEL: &str = "Gast:";
const FINAL_SCORE_LABEL: &str = "Endstand";

/// Accepted date layouts together with the width of their year component.
const DATE_FORMATS: [(&str, usize); 2] = [("%d.%m.%Y", 4), ("%d.%m.%y", 2)];

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct MatchInfo {
    pub match_id: String,
    pub league: String,
    /// `None` when the report's date couldn't be read; such matches are unsortable.
    pub date: Option<NaiveDate>,
    pub home_team: String,
    pub guest_team: String,
    pub final_score: String,
    pub halftime_score: String,
}

impl Default for MatchInfo {
    fn default() -> Self {
        Self {
            match_id: UNKNOWN.to_string(),
            league: UNKNOWN.to_string(),
            date: None,
            home_team: UNKNOWN.to_string(),
            guest_team: UNKNOWN.to_string(),
            final_score: UNKNOWN.to_string(),
            halftime_score: UNKNOWN.to_string(),
        }
    }
}

impl MatchInfo {
    /// Short league code, e.g. `M-BL` from `Männer Bezirksliga (M-BL)`.
    pub fn league_abbreviation(&self) -> &str {
        regex_captures!(r"\((.*?)\)", &self.league).map_or("", |(_, abbreviation)| abbreviation)
    }

    pub fn date_string(&self) -> String {
        self.date
            .map_or_else(|| UNKNOWN.to_string(), |d| d.format("%Y-%m-%d").to_string())
    }
}

/// The `Spiel/Datum` row: `<id>, <weekday> am <date> um <time>`.
struct MatchDateRow {
    match_id: String,
    date: Option<NaiveDate>,
}

impl FromTableRow for MatchDateRow {
    fn from_row(row: &[Option<String>]) -> Option<Self> {
        let label = Self::cell(row, 0);
        let value = Self::cell(row, 1);
        if !label.contains(MATCH_DATE_LABEL) || value.is_empty() {
            return None;
        }
        let mut parts = value.split(',');
        let match_id = parts.next().unwrap_or_default().trim().to_string();
        let date = parts
            .next()
            .and_then(|rest| rest.split(DATE_START_MARKER).nth(1))
            .and_then(|rest| rest.split(DATE_END_MARKER).next())
            .and_then(parse_report_date);
        Some(Self { match_id, date })
    }
}

pub fn parse_report_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let year_width = raw.rsplit('.').next().map_or(0, str::len);
    DATE_FORMATS
        .iter()
        .filter(|(_, width)| *width == year_width)
        .find_map(|(format, _)| NaiveDate::parse_from_str(raw, format).ok())
}

/// Remainder after the first colon of a labelled line.
fn label_value(line: &str) -> Option<String> {
    line.split_once(':').map(|(_, value)| value.trim().to_string())
}

impl MatchInfo {
    pub fn locate<D: Document>(document: &D, full_text: &str) -> Self {
        let mut info = Self::default();
        info.scan_first_page(document);
        info.scan_text(full_text);
        info
    }

    fn scan_first_page<D: Document>(&mut self, document: &D) {
        let Some(first_page) = document.pages().first() else {
            return;
        };
        for table in first_page.tables() {
            if let Some(row) = table.rows.iter().find_map(|r| MatchDateRow::from_row(r)) {
                self.match_id = row.match_id;
                self.date = row.date;
                if self.date.is_none() {
                    debug!("Unreadable match date for {}", self.match_id);
                }
            }
            if self.match_id != UNKNOWN {
                break;
            }
        }
    }

    fn scan_text(&mut self, full_text: &str) {
        for line in full_text.lines() {
            let line = line.trim();
            let target = if line.starts_with(LEAGUE_LABEL) {
                Some(&mut self.league)
            } else if line.starts_with(HOME_LABEL) {
                Some(&mut self.home_team)
            } else if line.starts_with(GUEST_LABEL) {
                Some(&mut self.guest_team)
            } else {
                None
            };
            if let Some(field) = target {
                if let Some(value) = label_value(line) {
                    *field = value;
                }
            } else if line.contains(FINAL_SCORE_LABEL) {
                if let Some((_, final_score, halftime)) =
                    regex_captures!(r"Endstand\s*([\d\s:]+)\s*\((\d+:\d+)\)", line)
                {
                    self.final_score = final_score.trim().to_string();
                    self.halftime_score = halftime.trim().to_string();
                }
            }
        }
    }
}
