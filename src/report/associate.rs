use either::Either;
use tracing::debug;

use crate::report::action::{parse_action, ActionRow};
use crate::report::record::{Event, MatchRecordBuilder};
use crate::report::team_name::resolve_team;
use crate::report::traits::{JerseyNumber, Matchup, Side};

/// Where a log entry ends up: a player's own log or the team's.
pub type EventTarget = Either<(Side, JerseyNumber), Side>;

/// Outcome of attributing one log row; `None` means the row is dropped.
pub fn event_target(row: &ActionRow, teams: &Matchup<String>) -> Option<(EventTarget, Event)> {
    let parsed = parse_action(&row.action);
    let Some(side) = parsed.team_hint.as_deref().and_then(|hint| resolve_team(hint, teams)) else {
        debug!("Unattributable log entry {:?}", row.action);
        return None;
    };
    if parsed.action_type.is_empty() {
        return None;
    }
    let event = Event {
        time: row.time.clone(),
        action_type: parsed.action_type,
        score: row.score.clone(),
    };
    let target = match parsed.jersey_number {
        Some(jersey_number) => Either::Left((side, jersey_number)),
        None => Either::Right(side),
    };
    Some((target, event))
}

/// Files one log row under the player or team it belongs to. Entries naming a
/// jersey number that isn't on the resolved team's roster are dropped, never
/// reassigned to the team.
pub fn associate(row: &ActionRow, teams: &Matchup<String>, builder: &mut MatchRecordBuilder) {
    let Some((target, event)) = event_target(row, teams) else {
        return;
    };
    match target {
        Either::Left((side, jersey_number)) => {
            if !builder.push_player_event(side, &jersey_number, event) {
                debug!("No {} player with jersey {}, entry dropped", side, jersey_number);
            }
        }
        Either::Right(side) => builder.push_team_event(side, event),
    }
}
