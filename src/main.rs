use clap::{Parser, Subcommand, ValueEnum};
use credkit::{CredkitError, Env};
use std::process;

mod commands;
mod display;
mod types;

use commands::SettingsArgs;

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Parser)]
#[command(name = "credkit")]
#[command(about = "Credential Kit (credkit) - AWS credential resolution and client bootstrap")]
#[command(
    long_about = "credkit resolves AWS credentials the way provisioning tools do: static keys, then the environment, then the shared credentials file, then the EC2 instance role.\n\nUsage: credkit [GLOBAL_OPTIONS] <COMMAND>\nExample: credkit --region eu-west-1 --profile deploy check"
)]
#[command(version = env!("CREDKIT_VERSION"))]
struct Cli {
    #[arg(
        short = 'o',
        long = "format",
        value_enum,
        default_value = "table",
        global = true,
        help = "Output format: table or json (default: table) (global option)"
    )]
    format: OutputFormat,

    #[command(flatten)]
    settings: SettingsArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Bootstrap every AWS client and validate the credentials with IAM")]
    Check,

    #[command(about = "Resolve credentials through the chain without calling AWS")]
    Resolve,

    #[command(about = "Check whether an EC2 instance metadata service is reachable")]
    Probe {
        #[arg(long, help = "Metadata base URL (default: AWS_METADATA_URL or 169.254.169.254)")]
        url: Option<String>,
        #[arg(long = "timeout-ms", help = "Probe timeout in milliseconds (default: 100)")]
        timeout_ms: Option<u64>,
    },

    #[command(about = "List the supported AWS regions")]
    Regions,
}

async fn run(cli: Cli) -> Result<(), CredkitError> {
    let format = cli.format;

    match cli.command {
        Commands::Check => {
            let config = cli.settings.load(&Env::real())?;
            commands::check(config, &format).await
        }
        Commands::Resolve => {
            let config = cli.settings.load(&Env::real())?;
            commands::resolve(config, &format).await
        }
        Commands::Probe { url, timeout_ms } => commands::probe(url, timeout_ms, &format).await,
        Commands::Regions => commands::regions(&format).await,
    }
}

#[tokio::main]
async fn main() {
    credkit::logging::init_logging();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("{}", e);
        process::exit(1);
    }
}
