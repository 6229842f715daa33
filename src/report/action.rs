//! Free-text descriptions from the match log, e.g. `Tor durch Max Muster (7, TSV Beispiel)`.
//!
//! Three generations of report generators phrase the same action differently, so
//! parsing falls through progressively looser forms until one applies.

use const_format::concatcp;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::report::traits::{Cell, FromTableRow, JerseyNumber};

/// Joins the action type and the acting player, checked in this order.
const CONNECTORS: [&str; 3] = [" durch ", " für ", " von "];
const PLAYER_PREFIX: &str = "Spieler";
const JERSEY_GROUP: &str = r"(?P<jersey>\d{1,2}),\s*";
const TEAM_GROUP: &str = r"(?P<team>.*?)";
const MIN_ACTION_ROW_CELLS: usize = 4;

lazy_static! {
    static ref PARENTHETICAL_REGEX: Regex =
        Regex::new(concatcp!(r"\(", JERSEY_GROUP, TEAM_GROUP, r"\)$")).unwrap();
    static ref PLAYER_REFERENCE_REGEX: Regex =
        Regex::new(concatcp!(PLAYER_PREFIX, r"\s*", JERSEY_GROUP, r"(?P<team>.*)")).unwrap();
}

#[derive(Debug, Default, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct ParsedAction {
    pub action_type: String,
    pub player_name: Option<String>,
    pub jersey_number: Option<JerseyNumber>,
    pub team_hint: Option<String>,
}

impl ParsedAction {
    fn from_action_type(action_type: &str) -> Self {
        Self {
            action_type: action_type.trim().to_string(),
            ..Self::default()
        }
    }

    /// `<action> [durch|für|von <player>] (<jersey>, <team>)`
    fn parenthetical(text: &str) -> Option<Self> {
        let captures = PARENTHETICAL_REGEX.captures(text)?;
        let whole = captures.get(0)?;
        let main_part = text[..whole.start()].trim();
        let mut parsed = match split_connector(main_part) {
            Some((action_type, player)) => Self {
                player_name: Some(player.trim().to_string()),
                ..Self::from_action_type(action_type)
            },
            None => Self::from_action_type(main_part),
        };
        parsed.jersey_number = Some(captures["jersey"].to_string());
        parsed.team_hint = Some(captures["team"].trim().to_string());
        Some(parsed)
    }

    /// `<action> durch|für|von <rest>`, where the rest may be `Spieler <jersey>, <team>`.
    fn connector(text: &str) -> Option<Self> {
        let (action_type, rest) = split_connector(text)?;
        let mut parsed = Self::from_action_type(action_type);
        if let Some(captures) = PLAYER_REFERENCE_REGEX.captures(rest.trim()) {
            let jersey = &captures["jersey"];
            parsed.player_name = Some(format!("{PLAYER_PREFIX} {jersey}"));
            parsed.jersey_number = Some(jersey.to_string());
            parsed.team_hint = Some(captures["team"].trim().to_string());
        }
        Some(parsed)
    }

    /// `<action> [<team>]`
    fn fallback(text: &str) -> Self {
        match text.split_once(' ') {
            Some((action_type, team)) => Self {
                action_type: action_type.to_string(),
                team_hint: Some(team.trim().to_string()),
                ..Self::default()
            },
            None => Self {
                action_type: text.to_string(),
                ..Self::default()
            },
        }
    }
}

fn split_connector(text: &str) -> Option<(&str, &str)> {
    CONNECTORS.iter().find_map(|c| text.split_once(c))
}

pub fn parse_action(text: &str) -> ParsedAction {
    let text = text.trim();
    if text.is_empty() {
        return ParsedAction::default();
    }
    ParsedAction::parenthetical(text)
        .or_else(|| ParsedAction::connector(text))
        .unwrap_or_else(|| ParsedAction::fallback(text))
}

/// A match log row: `<no.> | <time> | <score> | <action> | ...`
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct ActionRow {
    pub time: String,
    pub score: String,
    pub action: String,
}

impl FromTableRow for ActionRow {
    fn from_row(row: &[Cell]) -> Option<Self> {
        if row.len() < MIN_ACTION_ROW_CELLS {
            return None;
        }
        let action = Self::cell(row, 3);
        if action.is_empty() {
            return None;
        }
        Some(Self {
            time: Self::cell(row, 1),
            score: Self::cell(row, 2),
            action,
        })
    }
}
