use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::report::header::MatchInfo;
use crate::report::record::{Event, MatchRecord};
use crate::report::roster::Player;
use crate::report::traits::{Side, UNKNOWN};

pub trait RecordToRows {
    fn from_record(record: &MatchRecord) -> Box<dyn Iterator<Item = Self> + '_>
    where
        Self: Sized;
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct GameRow {
    pub match_id: String,
    pub league: String,
    /// `YYYY-MM-DD`, or the unknown marker.
    pub date: String,
    pub home_team: String,
    pub guest_team: String,
    pub final_score: String,
    pub halftime_score: String,
}

impl From<&MatchInfo> for GameRow {
    fn from(info: &MatchInfo) -> Self {
        Self {
            match_id: info.match_id.clone(),
            league: info.league.clone(),
            date: info.date_string(),
            home_team: info.home_team.clone(),
            guest_team: info.guest_team.clone(),
            final_score: info.final_score.clone(),
            halftime_score: info.halftime_score.clone(),
        }
    }
}

impl From<&GameRow> for MatchInfo {
    fn from(row: &GameRow) -> Self {
        let date = if row.date == UNKNOWN {
            None
        } else {
            chrono::NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").ok()
        };
        Self {
            match_id: row.match_id.clone(),
            league: row.league.clone(),
            date,
            home_team: row.home_team.clone(),
            guest_team: row.guest_team.clone(),
            final_score: row.final_score.clone(),
            halftime_score: row.halftime_score.clone(),
        }
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct PlayerRow {
    pub match_id: String,
    pub side: Side,
    pub team: String,
    pub jersey_number: String,
    pub name: String,
    pub birth_year: String,
    pub goals: String,
    pub penalty_goals: String,
    pub penalty_attempts: String,
    pub warning: String,
    pub suspension_1: String,
    pub suspension_2: String,
    pub suspension_3: String,
    pub disqualification: String,
}

impl PlayerRow {
    fn new(record: &MatchRecord, side: Side, player: &Player) -> Self {
        Self {
            match_id: record.match_id().to_string(),
            side,
            team: record.team_name(side).to_string(),
            jersey_number: player.jersey_number.clone(),
            name: player.name.clone(),
            birth_year: player.birth_year.clone(),
            goals: player.goals.clone(),
            penalty_goals: player.penalty_goals.clone(),
            penalty_attempts: player.penalty_attempts.clone(),
            warning: player.warning.clone(),
            suspension_1: player.suspension_1.clone(),
            suspension_2: player.suspension_2.clone(),
            suspension_3: player.suspension_3.clone(),
            disqualification: player.disqualification.clone(),
        }
    }

    /// The player without events; those live in their own table.
    pub fn to_player(&self) -> Player {
        Player {
            jersey_number: self.jersey_number.clone(),
            name: self.name.clone(),
            birth_year: self.birth_year.clone(),
            goals: self.goals.clone(),
            penalty_goals: self.penalty_goals.clone(),
            penalty_attempts: self.penalty_attempts.clone(),
            warning: self.warning.clone(),
            suspension_1: self.suspension_1.clone(),
            suspension_2: self.suspension_2.clone(),
            suspension_3: self.suspension_3.clone(),
            disqualification: self.disqualification.clone(),
            events: vec![],
        }
    }
}

impl RecordToRows for PlayerRow {
    fn from_record(record: &MatchRecord) -> Box<dyn Iterator<Item = Self> + '_> {
        Box::new(Side::iter().flat_map(move |side| {
            record
                .roster(side)
                .players()
                .iter()
                .map(move |p| Self::new(record, side, p))
        }))
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct PlayerActionRow {
    pub match_id: String,
    pub side: Side,
    pub team: String,
    pub jersey_number: String,
    /// Position within the player's log.
    pub sequence: usize,
    pub time: String,
    pub action_type: String,
    pub score: String,
}

impl RecordToRows for PlayerActionRow {
    fn from_record(record: &MatchRecord) -> Box<dyn Iterator<Item = Self> + '_> {
        Box::new(Side::iter().flat_map(move |side| {
            record.roster(side).players().iter().flat_map(move |p| {
                p.events.iter().enumerate().map(move |(sequence, e)| Self {
                    match_id: record.match_id().to_string(),
                    side,
                    team: record.team_name(side).to_string(),
                    jersey_number: p.jersey_number.clone(),
                    sequence,
                    time: e.time.clone(),
                    action_type: e.action_type.clone(),
                    score: e.score.clone(),
                })
            })
        }))
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct TeamActionRow {
    pub match_id: String,
    pub side: Side,
    pub team: String,
    pub sequence: usize,
    pub time: String,
    pub action_type: String,
    pub score: String,
}

impl RecordToRows for TeamActionRow {
    fn from_record(record: &MatchRecord) -> Box<dyn Iterator<Item = Self> + '_> {
        Box::new(Side::iter().flat_map(move |side| {
            record
                .team_events
                .get(side)
                .iter()
                .enumerate()
                .map(move |(sequence, e)| Self {
                    match_id: record.match_id().to_string(),
                    side,
                    team: record.team_name(side).to_string(),
                    sequence,
                    time: e.time.clone(),
                    action_type: e.action_type.clone(),
                    score: e.score.clone(),
                })
        }))
    }
}

pub trait ToEvent {
    fn to_event(&self) -> Event;
}

impl ToEvent for PlayerActionRow {
    fn to_event(&self) -> Event {
        Event {
            time: self.time.clone(),
            action_type: self.action_type.clone(),
            score: self.score.clone(),
        }
    }
}

impl ToEvent for TeamActionRow {
    fn to_event(&self) -> Event {
        Event {
            time: self.time.clone(),
            action_type: self.action_type.clone(),
            score: self.score.clone(),
        }
    }
}
