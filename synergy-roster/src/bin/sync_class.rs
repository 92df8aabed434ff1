use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use classroom_api::{schema::CourseId, ClassroomApi};
use log::info;
use serde::Deserialize;
use synergy_roster::{
    config::{Config, DEFAULT_CONFIG_PATH},
    store::{RosterStore, SqliteStore},
    sync::{sync_class, SyncRequest},
};
use synergy_roster_utils::fs_json_util::{read_json, read_toml_or_default};
use url::Url;

#[derive(Parser)]
struct Opts {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[arg(long)]
    database: Option<PathBuf>,
    #[command(subcommand)]
    sub: Sub,
}

#[derive(Clone, Subcommand)]
enum Sub {
    /// Creates a course for a class and invites its students.
    Create(Create),
    List(List),
    Inactivate(Inactivate),
}

#[derive(Clone, Args)]
struct Create {
    group_id: String,
    name: String,
    #[arg(long, default_value = "")]
    description: String,
    /// JSON file with an `access_token` field.
    #[arg(long)]
    token_path: PathBuf,
    #[arg(long)]
    classroom_url: Option<Url>,
}

#[derive(Clone, Args)]
struct List {
    teacher: String,
}

#[derive(Clone, Args)]
struct Inactivate {
    course_id: String,
}

#[derive(Deserialize)]
struct AccessToken {
    access_token: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts = Opts::parse();

    let config: Config = read_toml_or_default(&opts.config)?;
    let store = SqliteStore::open(opts.database.unwrap_or(config.database_path))?;

    match opts.sub {
        Sub::Create(sub) => {
            let token: AccessToken = read_json(&sub.token_path)?;
            let classroom = match sub.classroom_url {
                Some(url) => ClassroomApi::with_base_url(url, token.access_token)?,
                None => ClassroomApi::new(token.access_token)?,
            };
            let request = SyncRequest::builder()
                .group_id(sub.group_id)
                .name(sub.name)
                .description(sub.description)
                .build();
            let class = sync_class(&classroom, &store, &request).await?;
            info!("Created course {} for group {}", class.course_id(), class.group_id());
            println!("{}", serde_json::to_string_pretty(&class)?);
        }
        Sub::List(sub) => {
            let classes = store.sync_classes_by_teacher(&sub.teacher)?;
            println!("{}", serde_json::to_string_pretty(&classes)?);
        }
        Sub::Inactivate(sub) => {
            let course_id = CourseId::from(sub.course_id);
            store
                .inactivate_sync_class(&course_id)
                .with_context(|| format!("While inactivating {course_id}"))?;
        }
    }
    Ok(())
}
