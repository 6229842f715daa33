use anyhow::{bail, Result};
use itertools::Itertools;
use tracing::{debug, warn};

use crate::report::action::ActionRow;
use crate::report::associate::associate;
use crate::report::document::{open_document, Document, Page};
use crate::report::header::MatchInfo;
use crate::report::record::{MatchRecord, MatchRecordBuilder};
use crate::report::roster::read_roster_page;
use crate::report::traits::{FromTableRow, Matchup};

/// The first pages hold the rosters, everything after is the match log.
const ROSTER_PAGES: usize = 2;

pub fn parse_document<D: Document>(document: &D) -> Result<MatchRecord> {
    let pages = document.pages();
    if pages.is_empty() {
        bail!("Match report has no pages");
    }
    let full_text = pages.iter().map(Page::text).join("\n");
    let mut builder = MatchRecordBuilder::new(MatchInfo::locate(document, &full_text));

    for (index, page) in pages.iter().take(ROSTER_PAGES).enumerate() {
        read_roster_page(page, index + 1, builder.rosters_mut());
    }
    let rosters = builder.rosters_mut();
    let (home_players, guest_players) = (rosters.home.len(), rosters.guest.len());
    if rosters.home.is_empty() || rosters.guest.is_empty() {
        warn!("Incomplete rosters in match {}", builder.info().match_id);
    }
    debug!("{} home and {} guest players", home_players, guest_players);

    let teams = Matchup::new(
        builder.info().home_team.clone(),
        builder.info().guest_team.clone(),
    );
    let mut skipped = 0_usize;
    for page in pages.iter().skip(ROSTER_PAGES) {
        for row in page.tables().iter().flat_map(|t| &t.rows) {
            match ActionRow::from_row(row) {
                Some(action_row) => associate(&action_row, &teams, &mut builder),
                None => skipped += 1,
            }
        }
    }
    debug!("{} log rows without an action", skipped);

    Ok(builder.build())
}

/// Opens and parses a serialized report in one step.
pub fn parse_report_bytes(bytes: &[u8]) -> Result<MatchRecord> {
    parse_document(&open_document(bytes)?)
}

#[cfg(test)]
pub(crate) mod tests {
    use serde_json::json;

    use super::*;
    use crate::report::traits::{Side, UNKNOWN};

    fn player(jersey: &str, name: &str) -> serde_json::Value {
        json!([jersey, name, "1998", null, null, "3", "2/1", null, null, null, null, null])
    }

    fn log(no: u32, time: &str, score: &str, action: &str) -> serde_json::Value {
        json!([no.to_string(), time, score, action])
    }

    pub(crate) fn sample_report() -> serde_json::Value {
        json!({"pages": [
            {
                "text": concat!(
                    "Spielklasse: Männer Bezirksliga (M-BL)\n",
                    "Heim: TSV Beispiel 1990\n",
                    "Gast: SG Nord\n",
                    "Endstand 27:25 (14:12)"
                ),
                "words": [{"text": "Heim:", "top": 90.0}, {"text": "Gast:", "top": 400.0}],
                "tables": [
                    {"bbox": {"x0": 0, "top": 20, "x1": 500, "bottom": 60},
                     "rows": [["Spiel/Datum", "4711, Sa am 05.03.2024 um 18:00 Uhr"]]},
                    {"bbox": {"x0": 0, "top": 100, "x1": 500, "bottom": 380},
                     "rows": [
                         ["Nr.", "Name"],
                         player("7", "Max Muster"),
                         player("12", "N.N. 12"),
                         player("7", "Doppelt")
                     ]},
                    {"bbox": {"x0": 0, "top": 420, "x1": 500, "bottom": 700},
                     "rows": [player("4", "Erika Nord"), player("9", "Spieler 9")]}
                ]
            },
            {"text": "", "tables": [{"bbox": {"x0": 0, "top": 100, "x1": 500, "bottom": 200},
                                     "rows": [player("21", "Nachzügler")]}],
             "regions": []},
            {"text": "", "tables": [{"bbox": {"x0": 0, "top": 10, "x1": 500, "bottom": 800},
                "rows": [
                    ["Nr.", "Zeit", "Spielstand", "Aktion"],
                    log(1, "00:00", "", "Spielbeginn"),
                    log(2, "01:12", "1:0", "Tor durch Max Muster (7, TSV Beispiel)"),
                    log(3, "02:40", "1:1", "7m-Tor für Spieler 4, SG Nord"),
                    log(4, "05:00", "1:1", "Auszeit SG Nord"),
                    log(5, "06:00", "1:1", "Verwarnung (99, SG Nord)"),
                    log(6, "07:00", "1:1", "Auszeit Füchse"),
                    ["7", "08:00", "1:1", null],
                    ["8", "09:00"]
                ]}]}
        ]})
    }

    #[test]
    fn parses_sample_report() {
        let bytes = serde_json::to_vec(&sample_report()).unwrap();
        let record = parse_report_bytes(&bytes).unwrap();

        assert_eq!(record.match_id(), "4711");
        assert_eq!(record.info.date_string(), "2024-03-05");
        assert_eq!(record.team_name(Side::Home), "TSV Beispiel 1990");
        assert_eq!(record.team_name(Side::Guest), "SG Nord");
        assert_eq!(record.info.final_score, "27:25");

        let home: Vec<_> = record
            .roster(Side::Home)
            .players()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(home, vec!["Max Muster", "N.N. 12"]);
        assert_eq!(record.roster(Side::Guest).len(), 2);

        let max = record.player(Side::Home, "7").unwrap();
        assert_eq!(max.events.len(), 1);
        assert_eq!(max.events[0].action_type, "Tor");
        assert_eq!(max.events[0].score, "1:0");
        let erika = record.player(Side::Guest, "4").unwrap();
        assert_eq!(erika.events[0].action_type, "7m-Tor");
        assert_eq!(erika.events[0].time, "02:40");

        assert!(record.team_events.home.is_empty());
        assert_eq!(record.team_events.guest.len(), 1);
        assert_eq!(record.team_events.guest[0].action_type, "Auszeit");
    }

    #[test]
    fn empty_document_fails() {
        assert!(parse_report_bytes(br#"{"pages": []}"#).is_err());
    }

    #[test]
    fn single_page_document_has_no_log() {
        let bytes = br#"{"pages": [{"text": "Heim: A\nGast: B"}]}"#;
        let record = parse_report_bytes(bytes).unwrap();
        assert_eq!(record.match_id(), UNKNOWN);
        assert_eq!(record.team_name(Side::Home), "A");
        assert!(record.rosters.home.is_empty());
    }
}
