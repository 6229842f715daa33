use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Placeholder the report generator prints for a field it has no value for.
/// Every unresolved header field falls back to it.
pub const UNKNOWN: &str = "n.g.";

pub type Cell = Option<String>;
pub type Row = Vec<Cell>;
pub type JerseyNumber = String;

#[derive(
    Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Copy, Clone, Display, EnumString, EnumIter,
    AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Guest,
}

#[derive(Debug, Default, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct Matchup<T> {
    pub home: T,
    pub guest: T,
}

impl<T> Matchup<T> {
    pub const fn new(home: T, guest: T) -> Self {
        Self { home, guest }
    }

    pub const fn get(&self, side: Side) -> &T {
        match side {
            Side::Home => &self.home,
            Side::Guest => &self.guest,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Home => &mut self.home,
            Side::Guest => &mut self.guest,
        }
    }
}

/// Builds a value out of one extracted table row. Rows that don't have the
/// expected shape are header, footer or blank rows and yield `None`.
pub trait FromTableRow {
    fn from_row(row: &[Cell]) -> Option<Self>
    where
        Self: Sized;

    /// Text of the cell at `index`, empty when the cell is missing or merged away.
    fn cell(row: &[Cell], index: usize) -> String {
        row.get(index)
            .and_then(Option::as_deref)
            .unwrap_or_default()
            .to_string()
    }
}

/// Names the generator prints when it doesn't know who wore a jersey.
pub fn is_placeholder_name(name: &str) -> bool {
    name.starts_with("Spieler ") || name.starts_with("N.N.")
}
