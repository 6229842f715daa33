use std::collections::HashSet;

use crate::report::traits::{Matchup, Side};

fn word_set(name: &str) -> HashSet<&str> {
    name.split_whitespace().collect()
}

/// Works out which of the two teams a (possibly shortened) name from the match
/// log refers to. Containment in a full name is tried first, home before guest;
/// otherwise the side sharing strictly more words wins. Ties, including no
/// overlap at all, stay unresolved.
pub fn resolve_team(hint: &str, teams: &Matchup<String>) -> Option<Side> {
    if hint.is_empty() {
        return None;
    }
    let hint = hint.to_lowercase();
    let home = teams.home.to_lowercase();
    let guest = teams.guest.to_lowercase();

    if home.contains(&hint) {
        return Some(Side::Home);
    }
    if guest.contains(&hint) {
        return Some(Side::Guest);
    }

    let hint_words = word_set(&hint);
    let home_score = hint_words.intersection(&word_set(&home)).count();
    let guest_score = hint_words.intersection(&word_set(&guest)).count();
    match home_score.cmp(&guest_score) {
        std::cmp::Ordering::Greater => Some(Side::Home),
        std::cmp::Ordering::Less => Some(Side::Guest),
        std::cmp::Ordering::Equal => None,
    }
}
