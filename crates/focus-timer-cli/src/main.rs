use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use focus_timer_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "focus-timer",
    version,
    about = "Focus Timer CLI",
    after_help = "Note: a session left running is offered for resume by the next `run`. \
Commands that change state (task, settings, stats reset) save it as stopped, \
so the next `run` restores tasks and settings without asking and starts a \
fresh timer."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current state as JSON
    Status,
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Timer settings
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Today's statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
    /// Interactive timer. Reads commands from stdin.
    Run,
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    init_tracing(&config);

    let result = match cli.command {
        Commands::Status => commands::status::run(&config),
        Commands::Task { action } => commands::task::run(action, &config),
        Commands::Settings { action } => commands::settings::run(action, &config),
        Commands::Stats { action } => commands::stats::run(action, &config),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "focus-timer",
                &mut std::io::stdout(),
            );
            Ok(())
        }
        Commands::Run => commands::run::run(&config),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
