use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use clap::Parser;
use env_logger::{Env, Target};
use fs_err::OpenOptions;
use log::{error, info};
use synergy_roster::{
    config::{Config, DEFAULT_CONFIG_PATH},
    credentials, update,
};
use synergy_roster_utils::{credentials::Credentials, fs_json_util::read_toml_or_default};

/// Downloads the current rosters from Synergy into the local database.
#[derive(Parser)]
struct Opts {
    /// The log is appended to this file.
    log_path: PathBuf,
    #[arg(short, long, required_unless_present = "prompt")]
    user: Option<String>,
    #[arg(short, long, required_unless_present = "prompt")]
    password: Option<String>,
    /// Ask for the user name and password instead.
    #[arg(long, conflicts_with_all = ["user", "password"])]
    prompt: bool,
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[arg(long)]
    database: Option<PathBuf>,
    /// Seconds a single report job may take.
    #[arg(long)]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&opts.log_path)?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(log_file)))
        .init();

    let result = run(opts).await;
    if let Err(e) = &result {
        error!("Roster update failed: {e:#}");
    }
    result
}

async fn run(opts: Opts) -> anyhow::Result<()> {
    let mut config: Config = read_toml_or_default(&opts.config)?;
    if let Some(database) = opts.database {
        config.database_path = database;
    }
    if let Some(timeout) = opts.timeout {
        config.timeout = Duration::from_secs(timeout);
    }

    let credentials = match (opts.user, opts.password) {
        (Some(user), Some(password)) => Credentials::builder()
            .user_name(user.into())
            .password(password.into())
            .build(),
        _ => credentials::prompt().context("Credentials are required")?,
    };

    update::run(&config, &credentials).await?;
    info!("Roster update finished.");
    Ok(())
}
