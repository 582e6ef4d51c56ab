//! Seed the greetings table with its first row.
//!
//! Resolves the datastore exactly as the server does, applies pending
//! migrations, and inserts the greeting only when the table is empty, so
//! repeated runs leave the table unchanged.

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use mockable::DefaultEnv;
use tokio::runtime::Builder;

use hello_assistant::domain::GreetingMessage;
use hello_assistant::domain::ports::GreetingRepository;
use hello_assistant::outbound::persistence::{
    BuildMode, Datastore, DieselGreetingRepository, database_settings_from_env,
};

const DEFAULT_MESSAGE: &str = "Hello from Rust + PostgreSQL!";

/// `seed-greetings` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "seed-greetings",
    about = "Insert the first greeting when the greetings table is empty",
    version
)]
struct CliArgs {
    /// Greeting text to insert.
    #[arg(long, value_name = "text", default_value = DEFAULT_MESSAGE)]
    message: String,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to create Tokio runtime")?;
    runtime.block_on(seed(args))
}

async fn seed(args: CliArgs) -> Result<()> {
    let message = GreetingMessage::new(args.message).wrap_err("invalid greeting message")?;
    let settings =
        database_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
            .wrap_err("failed to resolve datastore settings")?;
    let datastore = Datastore::connect(&settings)
        .await
        .wrap_err("failed to prepare datastore")?;

    let repository = DieselGreetingRepository::new(datastore.pool().clone());
    let outcome = repository.insert_if_empty(&message).await;
    datastore
        .shutdown()
        .await
        .wrap_err("failed to stop datastore")?;

    if outcome.wrap_err("failed to seed greeting")? {
        println!("Seeded greeting: {}", message.as_str());
    } else {
        println!("Greetings table already has rows; nothing to do.");
    }
    Ok(())
}
