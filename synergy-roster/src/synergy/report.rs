use anyhow::Context;
use log::info;
use url::Url;

use super::{
    error::SynergyError,
    job::ReportJob,
    schema::{JobGuid, ReportFormat},
    session::Session,
};
use crate::roster::{
    parser::{parse_staff_directory, parse_stu415s},
    schema::{StaffDirectoryEntry, Stu415},
};

impl Session {
    /// Downloads the artifact of a finished job.
    ///
    /// `Download.aspx` has to be visited first, otherwise the file is not served.
    pub async fn fetch_report(
        &self,
        guid: &JobGuid,
        format: ReportFormat,
    ) -> Result<Vec<u8>, SynergyError> {
        let download = self.endpoints().download();
        self.client()
            .get(download.clone())
            .send()
            .await
            .map_err(|e| fetch_error(download, e))?;

        let url = self.endpoints().artifact(guid, format)?;
        let response = self
            .client()
            .get(url.clone())
            .send()
            .await
            .map_err(|e| fetch_error(&url, e))?;
        if !response.status().is_success() {
            return Err(SynergyError::Fetch {
                reason: format!("server returned {}", response.status()),
                url,
            });
        }
        let bytes = response.bytes().await.map_err(|e| fetch_error(&url, e))?;
        if bytes.is_empty() {
            return Err(SynergyError::Fetch {
                url,
                reason: "the body was empty".to_owned(),
            });
        }
        info!("Downloaded {} bytes from {url}", bytes.len());
        Ok(bytes.to_vec())
    }

    /// Submit, wait, fetch.
    pub async fn run_report(&self, job: &ReportJob) -> Result<Vec<u8>, SynergyError> {
        let guid = self.submit_and_await(job).await?;
        self.fetch_report(&guid, job.format).await
    }

    pub async fn download_staff_directory(&self) -> anyhow::Result<Vec<StaffDirectoryEntry>> {
        let raw = self.run_report(&ReportJob::STAFF_EMAILS).await?;
        let entries = parse_staff_directory(&raw);
        info!("Staff directory has {} entries.", entries.len());
        Ok(entries)
    }

    /// Downloads the STU415 report. Permanent ids get `@{email_domain}` appended.
    pub async fn download_enrollments(&self, email_domain: &str) -> anyhow::Result<Vec<Stu415>> {
        let raw = self.run_report(&ReportJob::STU415).await?;
        let records =
            parse_stu415s(&raw, email_domain).context("While parsing the STU415 report")?;
        info!("STU415 report has {} rows.", records.len());
        Ok(records)
    }
}

fn fetch_error(url: &Url, e: reqwest::Error) -> SynergyError {
    SynergyError::Fetch {
        url: url.clone(),
        reason: e.to_string(),
    }
}
