use std::path::PathBuf;

use clap::Parser;
use synergy_roster::{
    config::{Config, DEFAULT_CONFIG_PATH},
    roster::rosters_by_period,
    store::{RosterStore, SqliteStore},
};
use synergy_roster_utils::fs_json_util::{read_toml_or_default, write_json};

/// Prints the rosters of a teacher, one per period, as JSON.
#[derive(Parser)]
struct Opts {
    /// Teacher email address.
    teacher: String,
    #[arg(long)]
    per: Option<String>,
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[arg(long)]
    database: Option<PathBuf>,
    /// Write to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts = Opts::parse();

    let config: Config = read_toml_or_default(&opts.config)?;
    let store = SqliteStore::open(opts.database.unwrap_or(config.database_path))?;
    let records = match &opts.per {
        Some(per) => store.query_by_teacher_period(&opts.teacher, per)?,
        None => store.query_by_teacher(&opts.teacher)?,
    };
    let rosters = rosters_by_period(&records);

    match opts.output {
        Some(path) => write_json(path, &rosters)?,
        None => println!("{}", serde_json::to_string_pretty(&rosters)?),
    }
    Ok(())
}
