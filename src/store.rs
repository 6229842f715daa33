use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Writer, WriterBuilder};
use fixed_map::{Key, Map};
use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde::Serialize;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use tracing::{debug, info};

use crate::report::header::MatchInfo;
use crate::report::record::{MatchRecord, MatchRecordBuilder};
use crate::report::schemas::{
    GameRow, PlayerActionRow, PlayerRow, RecordToRows, TeamActionRow, ToEvent,
};
use crate::report::traits::{is_placeholder_name, UNKNOWN};

#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash, Display, EnumIter, Key)]
#[strum(serialize_all = "snake_case")]
enum StoreTable {
    Games,
    Players,
    PlayerActions,
    TeamActions,
}

impl StoreTable {
    fn path(self, root: &Path) -> PathBuf {
        root.join(format!("{self}.csv"))
    }

    /// Written first, then renamed over `path` once every table is complete.
    fn staging_path(self, root: &Path) -> PathBuf {
        root.join(format!("{self}.csv.tmp"))
    }
}

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum InsertOutcome {
    Stored,
    /// A match with this id was stored before; nothing was written.
    AlreadyPresent,
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Default, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
pub enum GameSort {
    MatchId,
    #[default]
    Date,
    HomeTeam,
    GuestTeam,
    FinalScore,
    League,
}

impl GameSort {
    /// Dates and scores read best newest/highest first, names alphabetically.
    pub const fn descending_by_default(self) -> bool {
        !matches!(self, Self::HomeTeam | Self::GuestTeam | Self::League)
    }

    fn compare(self, a: &GameRow, b: &GameRow) -> Ordering {
        match self {
            Self::MatchId => a.match_id.cmp(&b.match_id),
            Self::Date => a.date.cmp(&b.date),
            Self::HomeTeam => a.home_team.cmp(&b.home_team),
            Self::GuestTeam => a.guest_team.cmp(&b.guest_team),
            Self::FinalScore => a.final_score.cmp(&b.final_score),
            Self::League => a.league.cmp(&b.league),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct GameFilter {
    pub team: Option<String>,
    pub league: Option<String>,
    pub sort_by: GameSort,
    pub descending: bool,
}

/// Match records flattened into one table per entity, persisted as CSV files
/// in a directory.
#[derive(Debug, Default)]
pub struct MatchStore {
    root: PathBuf,
    games: Vec<GameRow>,
    players: Vec<PlayerRow>,
    player_actions: Vec<PlayerActionRow>,
    team_actions: Vec<TeamActionRow>,
}

fn read_table<T: DeserializeOwned>(table: StoreTable, root: &Path) -> Result<Vec<T>> {
    let path = table.path(root);
    if !path.exists() {
        return Ok(vec![]);
    }
    debug!("Reading {}", path.display());
    ReaderBuilder::new()
        .from_path(&path)?
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn write_table<T: Serialize>(
    writers: &mut Map<StoreTable, Writer<File>>,
    table: StoreTable,
    rows: &[T],
) -> Result<()> {
    let writer = writers
        .get_mut(table)
        .context("Failed to initialize writer for table")?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().context("Failed to flush writer")
}

impl MatchStore {
    pub fn open(root: &Path) -> Result<Self> {
        let store = Self {
            root: root.to_path_buf(),
            games: read_table(StoreTable::Games, root)?,
            players: read_table(StoreTable::Players, root)?,
            player_actions: read_table(StoreTable::PlayerActions, root)?,
            team_actions: read_table(StoreTable::TeamActions, root)?,
        };
        debug!("Opened store with {} games", store.games.len());
        Ok(store)
    }

    pub fn save(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("Unable to create {}", self.root.display()))?;
        let mut writers = Map::new();
        for table in StoreTable::iter() {
            let staging = table.staging_path(&self.root);
            let writer = WriterBuilder::new()
                .from_path(&staging)
                .with_context(|| format!("Unable to create {}", staging.display()))?;
            writers.insert(table, writer);
        }
        write_table(&mut writers, StoreTable::Games, &self.games)?;
        write_table(&mut writers, StoreTable::Players, &self.players)?;
        write_table(&mut writers, StoreTable::PlayerActions, &self.player_actions)?;
        write_table(&mut writers, StoreTable::TeamActions, &self.team_actions)?;
        drop(writers);
        // Existing tables are only replaced after all of them were written
        for table in StoreTable::iter() {
            let path = table.path(&self.root);
            std::fs::rename(table.staging_path(&self.root), &path)
                .with_context(|| format!("Unable to replace {}", path.display()))?;
        }
        info!("Saved {} games to {}", self.games.len(), self.root.display());
        Ok(())
    }

    pub fn contains(&self, match_id: &str) -> bool {
        self.games.iter().any(|g| g.match_id == match_id)
    }

    /// Stores every row of `record` at once, or nothing if the match id is taken.
    pub fn insert(&mut self, record: &MatchRecord) -> InsertOutcome {
        if self.contains(record.match_id()) {
            return InsertOutcome::AlreadyPresent;
        }
        self.games.push(GameRow::from(&record.info));
        self.players.extend(PlayerRow::from_record(record));
        self.player_actions.extend(PlayerActionRow::from_record(record));
        self.team_actions.extend(TeamActionRow::from_record(record));
        InsertOutcome::Stored
    }

    pub fn load(&self, match_id: &str) -> Option<MatchRecord> {
        let game = self.games.iter().find(|g| g.match_id == match_id)?;
        let mut builder = MatchRecordBuilder::new(MatchInfo::from(game));
        for row in self.players.iter().filter(|p| p.match_id == match_id) {
            builder.rosters_mut().get_mut(row.side).push(row.to_player());
        }
        let player_actions = self
            .player_actions
            .iter()
            .filter(|a| a.match_id == match_id)
            .sorted_by_key(|a| a.sequence);
        for row in player_actions {
            builder.push_player_event(row.side, &row.jersey_number, row.to_event());
        }
        let team_actions = self
            .team_actions
            .iter()
            .filter(|a| a.match_id == match_id)
            .sorted_by_key(|a| a.sequence);
        for row in team_actions {
            builder.push_team_event(row.side, row.to_event());
        }
        Some(builder.build())
    }

    /// Removes the match and everything recorded for it.
    pub fn delete(&mut self, match_id: &str) -> bool {
        let before = self.games.len();
        self.games.retain(|g| g.match_id != match_id);
        self.players.retain(|p| p.match_id != match_id);
        self.player_actions.retain(|a| a.match_id != match_id);
        self.team_actions.retain(|a| a.match_id != match_id);
        before != self.games.len()
    }

    pub fn rename_player(
        &mut self,
        match_id: &str,
        team: &str,
        jersey_number: &str,
        name: &str,
    ) -> bool {
        match self.players.iter_mut().find(|p| {
            p.match_id == match_id && p.team == team && p.jersey_number == jersey_number
        }) {
            Some(player) => {
                player.name = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Jersey number to name for one team in one match, real names only.
    pub fn named_roster(&self, match_id: &str, team: &str) -> BTreeMap<String, String> {
        self.players
            .iter()
            .filter(|p| {
                p.match_id == match_id && p.team == team && !is_placeholder_name(&p.name)
            })
            .map(|p| (p.jersey_number.clone(), p.name.clone()))
            .collect()
    }

    /// Copies names onto the players of `team` in the target match by jersey
    /// number. Returns how many players were renamed.
    pub fn apply_roster(
        &mut self,
        target_match_id: &str,
        team: &str,
        roster: &BTreeMap<String, String>,
    ) -> usize {
        let mut renamed = 0;
        for player in self
            .players
            .iter_mut()
            .filter(|p| p.match_id == target_match_id && p.team == team)
        {
            if let Some(name) = roster.get(&player.jersey_number) {
                player.name = name.clone();
                renamed += 1;
            }
        }
        renamed
    }

    /// Games matching `filter`. Games without a known date always come last
    /// when sorting by date.
    pub fn games(&self, filter: &GameFilter) -> Vec<&GameRow> {
        self.games
            .iter()
            .filter(|g| {
                filter
                    .team
                    .as_ref()
                    .map_or(true, |t| &g.home_team == t || &g.guest_team == t)
            })
            .filter(|g| filter.league.as_ref().map_or(true, |l| &g.league == l))
            .sorted_by(|&a, &b| {
                let unknown_date =
                    |g: &GameRow| filter.sort_by == GameSort::Date && g.date == UNKNOWN;
                unknown_date(a).cmp(&unknown_date(b)).then_with(|| {
                    let ordering = filter.sort_by.compare(a, b);
                    if filter.descending {
                        ordering.reverse()
                    } else {
                        ordering
                    }
                })
            })
            .collect()
    }

    pub fn teams(&self) -> Vec<&str> {
        self.games
            .iter()
            .flat_map(|g| [g.home_team.as_str(), g.guest_team.as_str()])
            .sorted()
            .dedup()
            .collect()
    }

    pub fn leagues(&self) -> Vec<&str> {
        self.games
            .iter()
            .map(|g| g.league.as_str())
            .filter(|l| !l.is_empty() && *l != UNKNOWN)
            .sorted()
            .dedup()
            .collect()
    }

    /// Distinct real player names ever listed for `team`.
    pub fn named_players(&self, team: &str) -> Vec<&str> {
        self.players
            .iter()
            .filter(|p| p.team == team && !is_placeholder_name(&p.name))
            .map(|p| p.name.as_str())
            .sorted()
            .dedup()
            .collect()
    }
}
