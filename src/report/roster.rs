use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::report::document::{Page, PageLayout};
use crate::report::record::Event;
use crate::report::traits::{Cell, FromTableRow, JerseyNumber, Matchup, Side};

/// Words containing this mark the start of the guest section of a roster page.
const GUEST_MARKER: &str = "gast";
const MIN_PLAYER_ROW_CELLS: usize = 12;

/// One roster line of the report. Counts and disciplinary marks stay the raw
/// cell text; an empty string means the form had no entry.
#[derive(Debug, Default, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct Player {
    pub jersey_number: JerseyNumber,
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
    pub events: Vec<Event>,
}

impl FromTableRow for Player {
    fn from_row(row: &[Cell]) -> Option<Self> {
        let jersey_number = row.first()?.as_deref()?;
        if jersey_number.is_empty()
            || !jersey_number.chars().all(|c| c.is_ascii_digit())
            || row.len() < MIN_PLAYER_ROW_CELLS
        {
            return None;
        }
        // 7m cell is "attempts/goals"
        let penalties = Self::cell(row, 6);
        let (penalty_attempts, penalty_goals) = if penalties.contains('/') {
            let mut parts = penalties.split('/').map(str::trim);
            (
                parts.next().unwrap_or_default().to_string(),
                parts.next().unwrap_or_default().to_string(),
            )
        } else {
            (String::new(), String::new())
        };
        Some(Self {
            jersey_number: jersey_number.to_string(),
            name: Self::cell(row, 1),
            birth_year: Self::cell(row, 2),
            goals: Self::cell(row, 5),
            penalty_goals,
            penalty_attempts,
            warning: Self::cell(row, 7),
            suspension_1: Self::cell(row, 8),
            suspension_2: Self::cell(row, 9),
            suspension_3: Self::cell(row, 10),
            disqualification: Self::cell(row, 11),
            events: vec![],
        })
    }
}

/// Players of one team in report order, unique by jersey number.
#[derive(Debug, Default, Eq, PartialEq, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster(Vec<Player>);

impl Roster {
    /// Appends `player` unless the jersey number is already taken, in which case
    /// the first occurrence wins and `false` is returned.
    pub fn push(&mut self, player: Player) -> bool {
        if self.contains(&player.jersey_number) {
            return false;
        }
        self.0.push(player);
        true
    }

    pub fn contains(&self, jersey_number: &str) -> bool {
        self.0.iter().any(|p| p.jersey_number == jersey_number)
    }

    pub fn get_mut(&mut self, jersey_number: &str) -> Option<&mut Player> {
        self.0.iter_mut().find(|p| p.jersey_number == jersey_number)
    }

    pub fn players(&self) -> &[Player] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub type Rosters = Matchup<Roster>;

/// Vertical offset of the first word mentioning the guest team, if the page has one.
pub fn guest_section_start<L: PageLayout + ?Sized>(layout: &L) -> Option<f64> {
    layout
        .words()
        .find(|w| w.text.to_lowercase().contains(GUEST_MARKER))
        .map(|w| w.top)
}

/// Decides for every extracted table whether it lists home or guest players.
/// Tables starting at or below the guest marker are guest tables; without a
/// marker everything is home. Returns `None` when the extracted tables and the
/// detected table regions disagree in number, since rows could be misattributed.
pub fn classify_tables<L: PageLayout + ?Sized>(
    layout: &L,
    table_count: usize,
) -> Option<Vec<Side>> {
    let regions = layout.table_regions();
    if regions.len() != table_count {
        return None;
    }
    let guest_start = guest_section_start(layout);
    Some(
        regions
            .iter()
            .map(|region| match guest_start {
                Some(start) if region.top >= start => Side::Guest,
                _ => Side::Home,
            })
            .collect(),
    )
}

/// Reads the player rows of one roster page into `rosters`.
pub fn read_roster_page<P: Page>(page: &P, page_number: usize, rosters: &mut Rosters) {
    let tables = page.tables();
    let Some(sides) = classify_tables(page, tables.len()) else {
        debug!(
            "Page {}: table count doesn't match detected regions, skipping roster",
            page_number
        );
        return;
    };
    for (table, side) in tables.iter().zip(sides) {
        let roster = rosters.get_mut(side);
        for player in table.rows.iter().filter_map(|r| Player::from_row(r)) {
            let jersey_number = player.jersey_number.clone();
            if !roster.push(player) {
                debug!("Duplicate {} jersey number {}, row dropped", side, jersey_number);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::document::{Region, SnapshotPage, Table, Word};

    fn player_row(jersey: &str, name: &str, penalties: &str) -> Vec<Cell> {
        vec![
            Some(jersey.to_string()),
            Some(name.to_string()),
            Some("1995".to_string()),
            None,
            None,
            Some("4".to_string()),
            Some(penalties.to_string()),
            Some("12:30".to_string()),
            Some("20:01".to_string()),
            None,
            None,
            None,
        ]
    }

    fn table(top: f64, rows: Vec<Vec<Cell>>) -> Table {
        Table {
            bbox: Region {
                top,
                bottom: top + 100.0,
                ..Region::default()
            },
            rows,
        }
    }

    fn guest_word(top: f64) -> Word {
        Word {
            text: "Gast:".to_string(),
            top,
        }
    }

    #[test]
    fn parses_player_row() {
        let player = Player::from_row(&player_row("7", "Max Muster", "3/2")).unwrap();
        assert_eq!(player.jersey_number, "7");
        assert_eq!(player.name, "Max Muster");
        assert_eq!(player.birth_year, "1995");
        assert_eq!(player.goals, "4");
        assert_eq!(player.penalty_attempts, "3");
        assert_eq!(player.penalty_goals, "2");
        assert_eq!(player.warning, "12:30");
        assert_eq!(player.suspension_1, "20:01");
        assert_eq!(player.suspension_2, "");
        assert_eq!(player.disqualification, "");
        assert!(player.events.is_empty());
    }

    #[test]
    fn parsing_is_idempotent() {
        let row = player_row("11", "Erika Beispiel", "1/1");
        assert_eq!(Player::from_row(&row), Player::from_row(&row));
    }

    #[test]
    fn malformed_penalty_cell_leaves_both_empty() {
        let player = Player::from_row(&player_row("9", "A", "-")).unwrap();
        assert_eq!(player.penalty_attempts, "");
        assert_eq!(player.penalty_goals, "");
    }

    #[test]
    fn rejects_non_player_rows() {
        assert!(Player::from_row(&player_row("Nr.", "Name", "7m")).is_none());
        assert!(Player::from_row(&player_row("", "Name", "")).is_none());
        let mut short = player_row("5", "Kurz", "");
        short.truncate(11);
        assert!(Player::from_row(&short).is_none());
        let mut missing: Vec<Cell> = player_row("5", "Leer", "");
        missing[0] = None;
        assert!(Player::from_row(&missing).is_none());
    }

    #[test]
    fn first_jersey_number_wins() {
        let mut roster = Roster::default();
        assert!(roster.push(Player::from_row(&player_row("7", "Erster", "")).unwrap()));
        assert!(!roster.push(Player::from_row(&player_row("7", "Zweiter", "")).unwrap()));
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.players()[0].name, "Erster");
    }

    #[test]
    fn classifies_by_guest_marker() {
        let page = SnapshotPage {
            tables: vec![table(100.0, vec![]), table(400.0, vec![]), table(380.0, vec![])],
            words: vec![
                Word {
                    text: "Heim:".to_string(),
                    top: 80.0,
                },
                guest_word(380.0),
            ],
            ..SnapshotPage::default()
        };
        assert_eq!(
            classify_tables(&page, 3),
            Some(vec![Side::Home, Side::Guest, Side::Guest])
        );
    }

    #[test]
    fn no_marker_means_home() {
        let page = SnapshotPage {
            tables: vec![table(100.0, vec![]), table(400.0, vec![])],
            ..SnapshotPage::default()
        };
        assert_eq!(classify_tables(&page, 2), Some(vec![Side::Home, Side::Home]));
    }

    #[test]
    fn region_mismatch_skips_page() {
        let page = SnapshotPage {
            tables: vec![table(
                100.0,
                vec![player_row("1", "Torwart", "")],
            )],
            regions: Some(vec![]),
            words: vec![guest_word(50.0)],
            ..SnapshotPage::default()
        };
        let mut rosters = Rosters::default();
        read_roster_page(&page, 1, &mut rosters);
        assert!(rosters.home.is_empty());
        assert!(rosters.guest.is_empty());
    }

    #[test]
    fn reads_both_rosters() {
        let page = SnapshotPage {
            tables: vec![
                table(
                    100.0,
                    vec![
                        player_row("Nr.", "Name", "7m"),
                        player_row("1", "Heim Eins", ""),
                        player_row("1", "Heim Doppelt", ""),
                    ],
                ),
                table(500.0, vec![player_row("1", "Gast Eins", "2/1")]),
            ],
            words: vec![guest_word(450.0)],
            ..SnapshotPage::default()
        };
        let mut rosters = Rosters::default();
        read_roster_page(&page, 1, &mut rosters);
        assert_eq!(rosters.home.len(), 1);
        assert_eq!(rosters.home.players()[0].name, "Heim Eins");
        assert_eq!(rosters.guest.players()[0].name, "Gast Eins");
    }
}
