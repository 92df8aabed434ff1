use anyhow::Context;
use log::{info, warn};
use synergy_roster_utils::credentials::Credentials;

use crate::{
    config::Config,
    roster::{compute_group_ids, reconcile_teacher_emails},
    store::{RosterStore, SqliteStore},
    synergy::{Endpoints, Session},
};

/// Downloads both reports, normalizes them and replaces the stored rosters.
///
/// Nothing is written until both downloads and the normalization succeeded.
/// Returns the number of enrollment records stored.
pub async fn update_rosters<S: RosterStore>(
    session: &Session,
    store: &mut S,
    email_domain: &str,
) -> anyhow::Result<usize> {
    let directory = session
        .download_staff_directory()
        .await
        .context("While downloading the staff directory")?;
    let mut records = session
        .download_enrollments(email_domain)
        .await
        .context("While downloading the enrollments")?;

    compute_group_ids(&mut records)?;
    reconcile_teacher_emails(&mut records, &directory);

    store.replace_enrollment_records(&records)?;
    store.insert_staff_directory(&directory)?;
    Ok(records.len())
}

/// One full update run: log in, update, log out.
pub async fn run(config: &Config, credentials: &Credentials) -> anyhow::Result<()> {
    let endpoints = Endpoints::new(&config.portal.base_url()?)?;
    let session = Session::login(endpoints, credentials, config.timeout).await?;
    let mut store = SqliteStore::open(&config.database_path)?;

    let count = update_rosters(&session, &mut store, &config.portal.email_domain).await?;
    info!(
        "Stored {count} enrollment records in {:?}.",
        config.database_path
    );

    if let Err(e) = session.logout().await {
        warn!("Failed to log out: {e}");
    }
    Ok(())
}
