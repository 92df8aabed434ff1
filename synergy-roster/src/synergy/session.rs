use std::time::Duration;

use getset::Getters;
use log::{debug, info, warn};
use serde::Serialize;
use synergy_roster_utils::credentials::{Credentials, Password, UserName};
use url::Url;

use super::{
    error::{AuthError, SynergyError},
    schema::{FocusKey, JobGuid, ReportFormat},
    scrape,
};

pub const DEFAULT_BASE_URL: &str = "https://synergy.aps.edu/";

/// Every URL the client talks to, derived from one base URL.
#[derive(Clone, Debug, Getters)]
#[getset(get = "pub")]
pub struct Endpoints {
    login: Url,
    logout: Url,
    /// Where a successful login lands.
    post_login: Url,
    xml_do_request: Url,
    upload: Url,
    download: Url,
    report_output: Url,
}
impl Endpoints {
    pub fn new(base: &Url) -> Result<Self, url::ParseError> {
        let mut base = base.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        Ok(Self {
            login: base.join("Login.aspx")?,
            logout: base.join("ST_Content.aspx?logout=true")?,
            post_login: base.join("ST_Content.aspx")?,
            xml_do_request: base.join("Service/RTCommunication.asmx/XMLDoRequest")?,
            upload: base.join("ST_UploadFile.aspx")?,
            download: base.join("Download.aspx")?,
            report_output: base.join("ReportOutput/")?,
        })
    }

    pub fn artifact(&self, guid: &JobGuid, format: ReportFormat) -> Result<Url, url::ParseError> {
        self.report_output.join(&format!("{guid}.{format}"))
    }
}

/// An authenticated portal session.
///
/// The cookie jar lives inside `client` and is shared by every request made
/// through this session. Create one session per update run.
#[derive(Debug, Getters)]
#[getset(get = "pub")]
pub struct Session {
    client: reqwest::Client,
    endpoints: Endpoints,
    focus_key: FocusKey,
    /// Upper bound for a single job to finish.
    timeout: Duration,
}

impl Session {
    pub async fn login(
        endpoints: Endpoints,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<Self, AuthError> {
        info!("Trying to log in as {}.", credentials.user_name);
        let (view_state, view_state_generator) = get_tokens(endpoints.login())
            .await
            .map_err(AuthError::Transport)?;

        // A fresh client, so that the jar only holds the cookies of this session.
        let client = reqwest_client().map_err(AuthError::Transport)?;
        let response = client
            .post(endpoints.login().clone())
            .form(&LoginForm::new(
                credentials,
                &view_state,
                &view_state_generator,
            ))
            .send()
            .await
            .map_err(AuthError::Transport)?;

        let landed = response.url().clone();
        if &landed != endpoints.post_login() {
            return Err(AuthError::InvalidCredentials { landed });
        }
        let body = response.text().await.map_err(AuthError::Transport)?;
        let focus_key = scrape::focus_key()
            .extract(&body)
            .and_then(FocusKey::new)
            .ok_or(AuthError::NoFocusKey)?;
        debug!("Obtained a focus key.");
        info!("Successfully logged in.");

        Ok(Self {
            client,
            endpoints,
            focus_key,
            timeout,
        })
    }

    pub async fn logout(&self) -> Result<(), SynergyError> {
        self.client
            .get(self.endpoints.logout().clone())
            .send()
            .await?
            .error_for_status()?;
        info!("Logged out.");
        Ok(())
    }

    /// Posts a single-field form and returns the response body.
    pub(crate) async fn post_form(
        &self,
        url: &Url,
        field: &'static str,
        value: String,
    ) -> Result<String, SynergyError> {
        post_form(&self.client, url, field, value).await
    }
}

pub(crate) async fn post_form(
    client: &reqwest::Client,
    url: &Url,
    field: &'static str,
    value: String,
) -> Result<String, SynergyError> {
    Ok(client
        .post(url.clone())
        .form(&[(field, value)])
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?)
}

/// Fetches the anti-forgery tokens of the login page.
/// A missing token is submitted as an empty string and left for the server to reject.
async fn get_tokens(login: &Url) -> reqwest::Result<(String, String)> {
    let body = reqwest::Client::builder()
        .connection_verbose(true)
        .build()?
        .get(login.clone())
        .send()
        .await?
        .text()
        .await?;
    let view_state = scrape::view_state().extract(&body).unwrap_or_else(|| {
        warn!("__VIEWSTATE was not found in the login page.");
        String::new()
    });
    let view_state_generator = scrape::view_state_generator()
        .extract(&body)
        .unwrap_or_else(|| {
            warn!("__VIEWSTATEGENERATOR was not found in the login page.");
            String::new()
        });
    Ok((view_state, view_state_generator))
}

fn reqwest_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .cookie_store(true)
        .connection_verbose(true)
        .build()
}

#[derive(Debug, Serialize)]
struct LoginForm<'a> {
    #[serde(rename = "__VIEWSTATE")]
    view_state: &'a str,
    #[serde(rename = "__VIEWSTATEGENERATOR")]
    view_state_generator: &'a str,
    login_name: &'a UserName,
    password: &'a Password,
}
impl<'a> LoginForm<'a> {
    fn new(
        credentials: &'a Credentials,
        view_state: &'a str,
        view_state_generator: &'a str,
    ) -> Self {
        Self {
            view_state,
            view_state_generator,
            login_name: &credentials.user_name,
            password: &credentials.password,
        }
    }
}
