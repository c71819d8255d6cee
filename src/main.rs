use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use trix_score::export;
use trix_score::notation;
use trix_score::{
    calculate_all_player_totals, calculate_round_deltas, is_game_finished, is_round_partial,
    validate_round_data, HandMode, JsonFileBackend, Match, MatchStore, PlayerId, Session,
    TrixError, PLAYER_COUNT,
};

#[derive(Parser)]
#[command(name = "trix")]
#[command(about = "Keep score of Trix matches: four kingdoms of PLUS and MINUS hands", long_about = None)]
struct Cli {
    /// JSON file holding all matches
    #[arg(long, global = true, env = "TRIX_STORE", default_value = "trix_app_state.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new match (it becomes the active one)
    New {
        /// Player names in seat order; missing names become "Player N"
        names: Vec<String>,

        /// Allow doubling the king of hearts and queens
        #[arg(long)]
        doubling: bool,
    },

    /// Show the active match: kingdom, totals and rounds
    Status,

    /// Record a hand in the current kingdom
    Play {
        /// PLUS or MINUS; may be left out when only one is left
        #[arg(short, long)]
        mode: Option<String>,

        /// One entry per seat, e.g. "K Q2x" "D5" "-" "C13"
        entries: Vec<String>,
    },

    /// Replace the entries of a saved round
    Edit {
        /// Round identifier (see `status`)
        round_id: String,

        /// One entry per seat
        entries: Vec<String>,
    },

    /// Delete a round from the active match
    DeleteRound {
        round_id: String,
    },

    /// List all saved matches
    List,

    /// Make a saved match the active one
    Open {
        match_id: String,
    },

    /// Close the active match (it stays saved)
    Close,

    /// Start a new match with the active match's players and settings
    Duplicate,

    /// Delete a match (the active one by default)
    Delete {
        #[arg(long = "match")]
        match_id: Option<String>,
    },

    /// Export a score sheet (.csv or .xlsx)
    Export {
        /// Output file
        output: PathBuf,

        /// Match to export instead of the active one
        #[arg(long = "match")]
        match_id: Option<String>,
    },

    /// Check every stored round against the count limits and its cached scores
    Validate,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let store_path = cli.store.as_path();

    match cli.command {
        Commands::New { names, doubling } => {
            new_match(store_path, &names, doubling)?;
        }
        Commands::Status => {
            status(store_path)?;
        }
        Commands::Play { mode, entries } => {
            play(store_path, mode.as_deref(), &entries)?;
        }
        Commands::Edit { round_id, entries } => {
            edit(store_path, &round_id, &entries)?;
        }
        Commands::DeleteRound { round_id } => {
            let mut session = active_session(store_path)?;
            session.delete_round(&round_id)?;
            println!("Deleted round {}", round_id);
        }
        Commands::List => {
            list(store_path)?;
        }
        Commands::Open { match_id } => {
            let mut session = open_session(store_path);
            let m = session.open(&match_id)?;
            print_match(m);
        }
        Commands::Close => {
            open_session(store_path).leave()?;
            println!("Match closed");
        }
        Commands::Duplicate => {
            let mut session = active_session(store_path)?;
            let m = session.duplicate()?;
            println!("Started match {}", m.id);
            print_match(m);
        }
        Commands::Delete { match_id } => {
            delete(store_path, match_id.as_deref())?;
        }
        Commands::Export { output, match_id } => {
            export_sheet(store_path, &output, match_id.as_deref())?;
        }
        Commands::Validate => {
            validate(store_path)?;
        }
    }

    Ok(())
}

fn open_session(path: &Path) -> Session<JsonFileBackend> {
    Session::new(MatchStore::open(path))
}

/// Session with the stored active match loaded
fn active_session(path: &Path) -> Result<Session<JsonFileBackend>> {
    let mut session = open_session(path);
    if session
        .resume()
        .with_context(|| format!("Failed to read {}", path.display()))?
        .is_none()
    {
        anyhow::bail!("No active match. Start one with `trix new` or `trix open <id>`");
    }
    Ok(session)
}

fn new_match(path: &Path, names: &[String], doubling: bool) -> Result<()> {
    if names.len() > PLAYER_COUNT {
        anyhow::bail!("Trix is played by {} players, got {} names", PLAYER_COUNT, names.len());
    }

    let mut session = open_session(path);
    let m = session
        .start_match(names, doubling)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Started match {}", m.id);
    print_match(m);
    Ok(())
}

fn status(path: &Path) -> Result<()> {
    let session = active_session(path)?;
    if let Some(m) = session.current_match() {
        print_match(m);
    }
    Ok(())
}

fn parse_mode(mode: Option<&str>) -> Result<Option<HandMode>> {
    let parsed = mode
        .map(|s| HandMode::from_str(s).ok_or_else(|| TrixError::InvalidHandMode(s.to_string())))
        .transpose()?;
    Ok(parsed)
}

/// Fill the session's draft from one notation string per seat
fn apply_entries(session: &mut Session<JsonFileBackend>, entries: &[String]) -> Result<()> {
    if entries.len() > PLAYER_COUNT {
        anyhow::bail!("Expected at most {} entries, got {}", PLAYER_COUNT, entries.len());
    }

    for (seat, text) in entries.iter().enumerate() {
        let parsed = notation::parse_entries(text)
            .with_context(|| format!("Seat {}", seat + 1))?;
        session.set_entries(&PlayerId::from_seat(seat), &parsed)?;
    }
    Ok(())
}

fn play(path: &Path, mode: Option<&str>, entries: &[String]) -> Result<()> {
    let mode = parse_mode(mode)?;
    let mut session = active_session(path)?;

    let mode = session.begin_hand(mode)?;
    apply_entries(&mut session, entries)?;

    if session.is_draft_empty() {
        println!("Warning: saving a {} hand with no cards counted", mode);
    }

    let round = session.save_hand()?;
    println!("Saved round {}", round.id);
    if round.is_partial() {
        println!("  (partial hand)");
    }
    println!();

    if let Some(m) = session.current_match() {
        print_match(m);
    }
    Ok(())
}

fn edit(path: &Path, round_id: &str, entries: &[String]) -> Result<()> {
    let mut session = active_session(path)?;

    let mode = session.begin_edit(round_id)?;
    session.reset_draft()?;
    apply_entries(&mut session, entries)?;

    let round = session.save_hand()?;
    println!("Updated round {} ({})", round.id, mode);
    println!();

    if let Some(m) = session.current_match() {
        print_match(m);
    }
    Ok(())
}

fn list(path: &Path) -> Result<()> {
    let store = MatchStore::open(path);
    let matches = store.all().context("Failed to read match store")?;
    let active_id = store.get_active()?.map(|m| m.id);

    if matches.is_empty() {
        println!("No saved matches");
        return Ok(());
    }

    for m in &matches {
        let marker = if active_id.as_deref() == Some(m.id.as_str()) { "*" } else { " " };
        let names: Vec<&str> = m.players.iter().map(|p| p.name.as_str()).collect();
        let progress = if is_game_finished(m) {
            "finished".to_string()
        } else {
            format!("kingdom {}", m.current_kingdom)
        };
        println!(
            "{} {}  {}  {}  {} rounds, {}",
            marker,
            m.id,
            m.created_at.format("%Y-%m-%d %H:%M"),
            names.join(", "),
            m.rounds.len(),
            progress
        );
    }
    Ok(())
}

fn delete(path: &Path, match_id: Option<&str>) -> Result<()> {
    match match_id {
        Some(id) => {
            let mut store = MatchStore::open(path);
            if store.get(id)?.is_none() {
                anyhow::bail!("Match not found: {}", id);
            }
            store.delete(id)?;
            println!("Deleted match {}", id);
        }
        None => {
            let mut session = active_session(path)?;
            session.delete_match()?;
            println!("Deleted active match");
        }
    }
    Ok(())
}

fn export_sheet(path: &Path, output: &Path, match_id: Option<&str>) -> Result<()> {
    let store = MatchStore::open(path);
    let m = match match_id {
        Some(id) => store.get(id)?.ok_or_else(|| anyhow!("Match not found: {}", id))?,
        None => store
            .get_active()?
            .ok_or_else(|| anyhow!("No active match; pass --match <id>"))?,
    };

    let ext = output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "csv" => {
            println!("Writing CSV file: {}", output.display());
            export::write_score_sheet_csv(&m, output).context("Failed to write CSV file")?;
        }
        "xlsx" => {
            println!("Writing Excel file: {}", output.display());
            export::write_score_sheet_xlsx(&m, output).context("Failed to write Excel file")?;
        }
        _ => {
            anyhow::bail!("Unsupported output format: {}", ext);
        }
    }

    println!("Done!");
    Ok(())
}

fn validate(path: &Path) -> Result<()> {
    let store = MatchStore::open(path);
    let matches = store.all().context("Failed to read match store")?;
    println!("Match store {} is readable", store.backend().path().display());
    println!("  {} matches", matches.len());

    let mut issues = Vec::new();
    for m in &matches {
        for (index, round) in m.rounds.iter().enumerate() {
            let label = format!("Match {} round {} ({})", m.id, index + 1, round.id);

            // scores of a round past the count limits are meaningless
            if let Err(e) = validate_round_data(round) {
                issues.push(format!("{}: {}", label, e));
                continue;
            }

            let expected = calculate_round_deltas(round, round.hand_mode(), m.doubling_enabled);
            if round.computed().is_empty() {
                issues.push(format!("{}: no cached scores (recomputed on read)", label));
            } else if round.computed() != &expected {
                issues.push(format!("{}: cached scores differ from entries", label));
            }

            if round.is_partial() != is_round_partial(round) {
                issues.push(format!("{}: partial flag out of date", label));
            }
        }
    }

    if issues.is_empty() {
        println!("  No issues found");
    } else {
        println!("  Issues found:");
        for issue in issues {
            println!("    - {}", issue);
        }
    }
    Ok(())
}

fn print_match(m: &Match) {
    println!("Match {}{}", m.id, if m.doubling_enabled { " (doubling)" } else { "" });

    if is_game_finished(m) {
        println!("Game Finished");
    } else if let Some(kingdom) = m.current() {
        println!("Kingdom {} of 4 - {}", m.current_kingdom, kingdom.status());
    }
    println!();

    let totals = calculate_all_player_totals(m);
    for p in &m.players {
        println!("  {:<16} {:>6}", p.name, totals.get(&p.id).copied().unwrap_or(0));
    }

    if m.rounds.is_empty() {
        return;
    }

    println!();
    for (index, round) in m.rounds.iter().enumerate() {
        let deltas: Vec<String> = m
            .players
            .iter()
            .map(|p| format!("{:+}", round.delta_for(&p.id).unwrap_or(0)))
            .collect();
        println!(
            "  {:<18} {:<8} {}  [{}]  {}",
            round.label(index),
            if round.is_partial() { "Partial" } else { "" },
            round.created_at.format("%H:%M"),
            deltas.join(" "),
            round.id
        );
        for p in &m.players {
            if let Some(entries) = round.entries(&p.id).filter(|e| !e.is_empty()) {
                println!("      {}: {}", p.name, entries.to_notation());
            }
        }
    }
}
