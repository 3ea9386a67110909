use clap::Args;
use coachsync_core::{
    extract_guest_emails, get_excluded_events, get_matching_stats, get_unmatched_events,
    match_events_to_all_clients, match_events_to_clients, CalendarEvent, Client, Config,
};
use indexmap::IndexMap;
use std::path::PathBuf;

use super::{print_json, read_events, read_json};

#[derive(Args)]
pub struct EventsArgs {
    /// JSON file with an array of calendar events ("-" for stdin)
    #[arg(short, long)]
    pub events: PathBuf,
}

#[derive(Args)]
pub struct RosterArgs {
    #[command(flatten)]
    pub events: EventsArgs,
    /// JSON file with an array of clients
    #[arg(short, long)]
    pub clients: PathBuf,
}

#[derive(Args)]
pub struct MatchArgs {
    #[command(flatten)]
    pub roster: RosterArgs,
    /// Match even events that fail the session filter
    #[arg(long)]
    pub skip_validation: bool,
    /// First matching client per event only
    #[arg(long, conflicts_with = "skip_validation")]
    pub single: bool,
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn load_roster(
    args: &RosterArgs,
) -> Result<(Vec<CalendarEvent>, Vec<Client>), Box<dyn std::error::Error>> {
    let events = read_events(&args.events.events)?;
    let clients: Vec<Client> = read_json(&args.clients)?;
    Ok((events, clients))
}

pub fn run_match(args: MatchArgs) -> CliResult {
    let (events, clients) = load_roster(&args.roster)?;

    if args.single {
        print_json(&match_events_to_clients(&events, &clients))
    } else {
        let rules = Config::load_or_default().matching_rules();
        print_json(&match_events_to_all_clients(
            &events,
            &clients,
            &rules,
            args.skip_validation,
        ))
    }
}

pub fn run_unmatched(args: RosterArgs) -> CliResult {
    let (events, clients) = load_roster(&args)?;
    let rules = Config::load_or_default().matching_rules();
    print_json(&get_unmatched_events(&events, &clients, &rules))
}

pub fn run_excluded(args: EventsArgs) -> CliResult {
    let events = read_events(&args.events)?;
    let rules = Config::load_or_default().matching_rules();
    print_json(&get_excluded_events(&events, &rules))
}

pub fn run_stats(args: RosterArgs) -> CliResult {
    let (events, clients) = load_roster(&args)?;
    print_json(&get_matching_stats(&events, &clients))
}

pub fn run_guests(args: EventsArgs) -> CliResult {
    let events = read_events(&args.events)?;
    let guests: IndexMap<String, Vec<String>> = events
        .iter()
        .filter_map(|event| Some((event.id.clone()?, extract_guest_emails(event))))
        .filter(|(_, emails)| !emails.is_empty())
        .collect();
    print_json(&guests)
}
