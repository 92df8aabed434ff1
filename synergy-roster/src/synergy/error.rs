use std::time::Duration;

use url::Url;

use super::schema::JobGuid;

#[derive(Debug, thiserror::Error)]
pub enum SynergyError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("No job was created by `{job}`: the response carried no job GUID")]
    Request { job: &'static str },
    #[error("Job {guid} did not finish within {timeout:?}")]
    Timeout { guid: JobGuid, timeout: Duration },
    #[error("Status polling of job {guid} stopped without a result")]
    PollerStopped { guid: JobGuid },
    #[error("Could not download {url}: {reason}")]
    Fetch { url: Url, reason: String },
    #[error("Request to the portal failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid portal URL: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials or the portal changed: login landed on {landed}")]
    InvalidCredentials { landed: Url },
    #[error("Could not establish a session: no focus key on the landing page")]
    NoFocusKey,
    #[error("Login request failed: {0}")]
    Transport(#[source] reqwest::Error),
}
