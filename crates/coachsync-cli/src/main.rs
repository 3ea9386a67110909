use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "coachsync-cli", version, about = "CoachSync CLI")]
struct Cli {
    /// Log matching decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match calendar events to clients
    Match(commands::matching::MatchArgs),
    /// Valid sessions whose attendees match no client
    Unmatched(commands::matching::RosterArgs),
    /// Events with attendees rejected by the session filter
    Excluded(commands::matching::EventsArgs),
    /// Match coverage statistics
    Stats(commands::matching::RosterArgs),
    /// Guest emails recorded by the work calendar sync
    Guests(commands::matching::EventsArgs),
    /// Recurrence rules for week templates
    Rrule {
        #[command(subcommand)]
        action: commands::rrule::RruleAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Match(args) => commands::matching::run_match(args),
        Commands::Unmatched(args) => commands::matching::run_unmatched(args),
        Commands::Excluded(args) => commands::matching::run_excluded(args),
        Commands::Stats(args) => commands::matching::run_stats(args),
        Commands::Guests(args) => commands::matching::run_guests(args),
        Commands::Rrule { action } => commands::rrule::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
