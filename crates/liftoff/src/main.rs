mod args;
mod commands;

use args::{StageArgs, TimingArgs};
use clap::{Parser, Subcommand};
use liftoff_cloud::Verb;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "liftoff")]
#[command(about = "Stand up and tear down a GameLift game backend by name", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show debug logs (including every aws CLI invocation)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    stage: StageArgs,

    #[command(flatten)]
    timing: TimingArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Create resources (build, fleet, user_pool, lambdas, rest_api or all)
    Create {
        /// Resource kinds, processed in the order given
        kinds: Vec<String>,
    },
    /// Delete resources (build, fleet, user_pool, lambdas, rest_api or all)
    Delete {
        /// Resource kinds, processed in the order given
        kinds: Vec<String>,
    },
    /// Show which resources exist (defaults to all)
    Status {
        /// Resource kinds to look up
        kinds: Vec<String>,
    },
    /// Print the resolved configuration
    Config,
    /// Check the aws CLI and credentials
    Auth,
    /// Show version information
    Version,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Version needs neither config nor logging
    if matches!(cli.command, Commands::Version) {
        println!("liftoff {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_tracing(cli.verbose);

    let code = match &cli.command {
        Commands::Create { kinds } => {
            commands::run::handle(Verb::Create, kinds, &cli.stage, &cli.timing).await?
        }
        Commands::Delete { kinds } => {
            commands::run::handle(Verb::Delete, kinds, &cli.stage, &cli.timing).await?
        }
        Commands::Status { kinds } => {
            commands::status::handle(kinds, &cli.stage).await?;
            0
        }
        Commands::Config => {
            commands::config::handle(&cli.stage)?;
            0
        }
        Commands::Auth => commands::auth::handle(&cli.stage).await?,
        Commands::Version => {
            unreachable!("Version is handled before config loading");
        }
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
