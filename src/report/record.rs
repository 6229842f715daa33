use serde::{Deserialize, Serialize};

use crate::report::header::MatchInfo;
use crate::report::roster::{Player, Roster, Rosters};
use crate::report::traits::{Matchup, Side};

/// One line of the match log. Time and running score are kept as printed.
#[derive(Debug, Default, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct Event {
    pub time: String,
    pub action_type: String,
    pub score: String,
}

/// Everything extracted from one match report.
#[derive(Debug, Default, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub info: MatchInfo,
    pub rosters: Rosters,
    /// Log entries attributed to a team rather than to one of its players.
    pub team_events: Matchup<Vec<Event>>,
}

impl MatchRecord {
    pub fn match_id(&self) -> &str {
        &self.info.match_id
    }

    pub fn team_name(&self, side: Side) -> &str {
        match side {
            Side::Home => &self.info.home_team,
            Side::Guest => &self.info.guest_team,
        }
    }

    pub fn roster(&self, side: Side) -> &Roster {
        self.rosters.get(side)
    }

    pub fn player(&self, side: Side, jersey_number: &str) -> Option<&Player> {
        self.roster(side)
            .players()
            .iter()
            .find(|p| p.jersey_number == jersey_number)
    }
}

/// Accumulates a `MatchRecord` while one document is scanned.
#[derive(Debug, Default)]
pub struct MatchRecordBuilder {
    record: MatchRecord,
}

impl MatchRecordBuilder {
    pub fn new(info: MatchInfo) -> Self {
        Self {
            record: MatchRecord {
                info,
                ..MatchRecord::default()
            },
        }
    }

    pub const fn info(&self) -> &MatchInfo {
        &self.record.info
    }

    pub fn rosters_mut(&mut self) -> &mut Rosters {
        &mut self.record.rosters
    }

    /// Appends to the player's own log. Returns `false` if no such player is on the roster.
    pub fn push_player_event(&mut self, side: Side, jersey_number: &str, event: Event) -> bool {
        match self.record.rosters.get_mut(side).get_mut(jersey_number) {
            Some(player) => {
                player.events.push(event);
                true
            }
            None => false,
        }
    }

    pub fn push_team_event(&mut self, side: Side, event: Event) {
        self.record.team_events.get_mut(side).push(event);
    }

    pub fn build(self) -> MatchRecord {
        self.record
    }
}
