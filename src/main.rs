#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::cargo)]
#![warn(
    clippy::nursery,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cargo_common_metadata
)]

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use glob::{glob, GlobError};
use rayon::prelude::*;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crate::report::header::MatchInfo;
use crate::report::parser::parse_report_bytes;
use crate::report::record::MatchRecord;
use crate::store::{GameFilter, GameSort, InsertOutcome, MatchStore};

mod report;
mod store;

const ABOUT: &str = "Creates structured match records from extracted handball match reports.";

#[derive(Parser, Debug)]
#[command(name = "handball-report", about = ABOUT)]
struct Opt {
    /// Directory holding the stored match tables
    #[arg(short, long, default_value = "spielberichte")]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse every report snapshot matching the pattern and store new matches
    Import { pattern: String },
    /// Print one stored match as JSON
    Show { match_id: String },
    /// List stored matches
    List {
        #[arg(long)]
        team: Option<String>,
        #[arg(long)]
        league: Option<String>,
        #[arg(long, default_value_t = GameSort::Date)]
        sort_by: GameSort,
        #[arg(long, conflicts_with = "descending")]
        ascending: bool,
        #[arg(long)]
        descending: bool,
    },
    /// List known teams and leagues
    Teams,
    /// List real player names ever recorded for a team
    Players { team: String },
    Delete { match_id: String },
    RenamePlayer {
        match_id: String,
        team: String,
        jersey_number: String,
        name: String,
    },
    /// Copy known player names of a team from one match onto another
    CopyRoster {
        source_match_id: String,
        target_match_id: String,
        team: String,
    },
}

#[derive(Debug, Default, Eq, PartialEq)]
struct ImportSummary {
    imported: usize,
    already_present: usize,
    failed: usize,
}

fn parse_file(path: &Path) -> Result<MatchRecord> {
    let bytes = std::fs::read(path).with_context(|| format!("Unable to read {}", path.display()))?;
    parse_report_bytes(&bytes)
}

/// Documents are parsed in parallel, then stored one at a time in file order.
fn import(store: &mut MatchStore, pattern: &str) -> Result<ImportSummary> {
    let mut files = glob(pattern)?.collect::<Result<Vec<PathBuf>, GlobError>>()?;
    files.par_sort();
    info!("Parsing {} match reports", files.len());
    let parsed = files
        .par_iter()
        .map(|f| (f, parse_file(f)))
        .collect::<Vec<_>>();

    let mut summary = ImportSummary::default();
    for (file, result) in parsed {
        match result {
            Ok(record) => match store.insert(&record) {
                InsertOutcome::Stored => {
                    info!("Stored match {} from {}", record.match_id(), file.display());
                    summary.imported += 1;
                }
                InsertOutcome::AlreadyPresent => {
                    warn!(
                        "File {} contains already-stored match {}, ignoring",
                        file.display(),
                        record.match_id()
                    );
                    summary.already_present += 1;
                }
            },
            Err(e) => {
                error!("Failed to process {}: {:?}", file.display(), e);
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

fn list(store: &MatchStore, filter: &GameFilter) {
    let games = store.games(filter);
    for game in &games {
        let info = MatchInfo::from(*game);
        let date = info
            .date
            .map_or_else(|| game.date.clone(), |d| d.format("%d.%m.%Y").to_string());
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            info.match_id,
            date,
            info.home_team,
            info.guest_team,
            info.final_score,
            info.league_abbreviation()
        );
    }
    println!("{} matches", games.len());
}

fn run(opt: Opt) -> Result<()> {
    let mut store = MatchStore::open(&opt.store)?;
    match opt.command {
        Command::Import { pattern } => {
            let start = Instant::now();
            let summary = import(&mut store, &pattern)?;
            store.save()?;
            info!(
                "{} imported, {} already present, {} failed in {:?}",
                summary.imported,
                summary.already_present,
                summary.failed,
                start.elapsed()
            );
        }
        Command::Show { match_id } => {
            let record = store
                .load(&match_id)
                .with_context(|| format!("Match {match_id} not found"))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::List {
            team,
            league,
            sort_by,
            ascending,
            descending,
        } => {
            let filter = GameFilter {
                team,
                league,
                sort_by,
                descending: descending || (!ascending && sort_by.descending_by_default()),
            };
            list(&store, &filter);
        }
        Command::Teams => {
            println!("Teams:\n  {}", store.teams().join("\n  "));
            println!("Leagues:\n  {}", store.leagues().join("\n  "));
        }
        Command::Players { team } => {
            for name in store.named_players(&team) {
                println!("{name}");
            }
        }
        Command::Delete { match_id } => {
            if !store.delete(&match_id) {
                bail!("Match {match_id} not found");
            }
            store.save()?;
            info!("Deleted match {match_id}");
        }
        Command::RenamePlayer {
            match_id,
            team,
            jersey_number,
            name,
        } => {
            if !store.rename_player(&match_id, &team, &jersey_number, &name) {
                bail!("No player {jersey_number} of {team} in match {match_id}");
            }
            store.save()?;
            info!("Renamed #{jersey_number} of {team} in match {match_id} to {name}");
        }
        Command::CopyRoster {
            source_match_id,
            target_match_id,
            team,
        } => {
            let roster = store.named_roster(&source_match_id, &team);
            if roster.is_empty() {
                warn!("Match {source_match_id} has no named players for {team}");
                return Ok(());
            }
            let renamed = store.apply_roster(&target_match_id, &team, &roster);
            store.save()?;
            info!("Copied {renamed} names of {team} onto match {target_match_id}");
        }
    }
    Ok(())
}

#[allow(clippy::expect_used)]
fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to initialize trace");

    run(Opt::parse()).expect("Error occurred while processing match reports");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::parser::tests::sample_report;

    #[test]
    fn import_counts_each_outcome_once() {
        let dir =
            std::env::temp_dir().join(format!("handball-report-import-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let report = serde_json::to_vec(&sample_report()).unwrap();
        std::fs::write(dir.join("a.json"), &report).unwrap();
        std::fs::write(dir.join("b.json"), &report).unwrap();
        std::fs::write(dir.join("c.json"), b"not a report").unwrap();

        let mut store = MatchStore::default();
        let pattern = dir.join("*.json");
        let summary = import(&mut store, &pattern.to_string_lossy()).unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                imported: 1,
                already_present: 1,
                failed: 1,
            }
        );
        assert!(store.contains("4711"));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn cli_parses_list_options() {
        let opt = Opt::parse_from([
            "handball-report",
            "list",
            "--sort-by",
            "home_team",
            "--team",
            "SG Nord",
        ]);
        match opt.command {
            Command::List {
                sort_by,
                team,
                ascending,
                ..
            } => {
                assert_eq!(sort_by, GameSort::HomeTeam);
                assert_eq!(team.as_deref(), Some("SG Nord"));
                assert!(!ascending);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(opt.store, PathBuf::from("spielberichte"));
    }
}
