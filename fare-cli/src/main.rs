mod app;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use app::{App, FareEdit};
use clap::{Parser, Subcommand};
use fare_client::GeminiDistanceClient;
use fare_core::data::store::JsonFileStore;
use fare_core::domain::fare::FareDraft;
use fare_core::infrastructure::config::AppConfig;
use fare_core::infrastructure::logging::init_logging;
use tracing::error;

#[derive(Parser, Debug)]
#[clap(name = "fare", about = "Taxi fare table, accounts and long-trip estimates")]
struct Cli {
    /// Store file; overrides FARE_STORE_PATH.
    #[clap(short, long)]
    store: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Register {
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
        #[clap(long)]
        confirm: String,
    },
    Login {
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },
    Logout,
    Whoami,
    /// Registered accounts (admin).
    Users,
    #[clap(subcommand)]
    Fares(FareCommand),
    #[clap(subcommand)]
    Trip(TripCommand),
}

#[derive(Subcommand, Debug)]
enum FareCommand {
    List {
        #[clap(long, default_value = "")]
        search: String,
    },
    Add {
        #[clap(long)]
        destination: String,
        #[clap(long)]
        region: String,
        #[clap(long)]
        meter: f64,
        #[clap(long)]
        counter: f64,
    },
    Edit {
        id: String,
        #[clap(long)]
        destination: Option<String>,
        #[clap(long)]
        region: Option<String>,
        #[clap(long)]
        meter: Option<f64>,
        #[clap(long)]
        counter: Option<f64>,
    },
    Delete {
        id: String,
    },
    Import {
        file: PathBuf,
    },
    Export {
        #[clap(long, default_value = ".")]
        dir: PathBuf,
    },
    Template {
        #[clap(long, default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum TripCommand {
    Estimate {
        #[clap(long)]
        origin: String,
        #[clap(long)]
        destination: String,
    },
    /// Shows the price per km, or sets it (admin) when a value is given.
    Price { value: Option<f64> },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config.log_filter);

    match run(args, config).await {
        Ok(output) => {
            println!("{}", output.trim_end());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("command failed: {:#}", e);
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli, config: AppConfig) -> anyhow::Result<String> {
    let store_path = args.store.unwrap_or(config.store_path);
    let store = Arc::new(JsonFileStore::new(store_path));
    let estimator = Arc::new(GeminiDistanceClient::connect(&config.gemini)?);
    let mut app = App::new(store, estimator, config.default_price_per_km);

    match args.command {
        Command::Register {
            email,
            password,
            confirm,
        } => app.register(&email, &password, &confirm),
        Command::Login { email, password } => app.login(&email, &password),
        Command::Logout => Ok(app.logout()),
        Command::Whoami => Ok(app.whoami()),
        Command::Users => app.users(),
        Command::Fares(command) => match command {
            FareCommand::List { search } => app.list_fares(&search),
            FareCommand::Add {
                destination,
                region,
                meter,
                counter,
            } => app.add_fare(FareDraft {
                region,
                destination,
                meter_value: meter,
                counter_value: counter,
            }),
            FareCommand::Edit {
                id,
                destination,
                region,
                meter,
                counter,
            } => app.edit_fare(
                &id,
                FareEdit {
                    destination,
                    region,
                    meter_value: meter,
                    counter_value: counter,
                },
            ),
            FareCommand::Delete { id } => app.delete_fare(&id),
            FareCommand::Import { file } => app.import_fares(&file),
            FareCommand::Export { dir } => app.export_fares(&dir),
            FareCommand::Template { dir } => app.template(&dir),
        },
        Command::Trip(command) => match command {
            TripCommand::Estimate {
                origin,
                destination,
            } => app.estimate(&origin, &destination).await,
            TripCommand::Price { value } => app.price(value),
        },
    }
}
