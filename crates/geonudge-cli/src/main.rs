use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "geonudge-cli", version, about = "Geonudge CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Place management
    Place {
        #[command(subcommand)]
        action: commands::place::PlaceAction,
    },
    /// Location sample processing
    Location {
        #[command(subcommand)]
        action: commands::location::LocationAction,
    },
    /// Task statistics
    Stats,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Storage health check
    Doctor,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Task { action } => commands::task::run(action),
        Commands::Place { action } => commands::place::run(action),
        Commands::Location { action } => commands::location::run(action),
        Commands::Stats => commands::stats::run(),
        Commands::Config { action } => commands::config::run(action),
        Commands::Doctor => commands::doctor::run(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
