use anyhow::Context;
use inquire::{Password, PasswordDisplayMode, Text};
use synergy_roster_utils::credentials::Credentials;

/// Asks for the portal login on the terminal.
pub fn prompt() -> anyhow::Result<Credentials> {
    let user_name = Text::new("Synergy user name:")
        .prompt()
        .context("Could not read the user name")?;
    let password = Password::new("Synergy password:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Could not read the password")?;
    Ok(Credentials::builder()
        .user_name(user_name.into())
        .password(password.into())
        .build())
}
