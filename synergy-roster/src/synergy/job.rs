use std::time::Duration;

use log::{debug, info, trace};
use tokio::{
    spawn,
    sync::mpsc,
    time::{sleep, Instant},
};
use url::Url;

use super::{
    error::SynergyError,
    schema::{FocusKey, JobGuid, ReportFormat},
    scrape::{self, TokenExtractor},
    session::{post_form, Session},
    template::{self, Template},
};

pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Where a job request is submitted, and under which form field.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum JobEndpoint {
    /// `ST_UploadFile.aspx`, field `data`.
    Upload,
    /// The XML dispatcher, field `xml`.
    XmlDoRequest,
}
impl JobEndpoint {
    pub fn field(self) -> &'static str {
        match self {
            Self::Upload => "data",
            Self::XmlDoRequest => "xml",
        }
    }

    fn url(self, session: &Session) -> &Url {
        match self {
            Self::Upload => session.endpoints().upload(),
            Self::XmlDoRequest => session.endpoints().xml_do_request(),
        }
    }
}

/// One kind of report the portal can be asked to generate.
#[derive(Clone, Copy)]
pub struct ReportJob {
    pub name: &'static str,
    pub endpoint: JobEndpoint,
    pub request: Template,
    pub guid: fn() -> &'static dyn TokenExtractor,
    /// Sent to the XML dispatcher right after the job has been created.
    pub priming: &'static [Template],
    pub format: ReportFormat,
}
impl ReportJob {
    /// The `staff_emails` query: one `email,name` row per staff member.
    pub const STAFF_EMAILS: Self = Self {
        name: "staff_emails",
        endpoint: JobEndpoint::Upload,
        request: template::STAFF_EMAILS_QUERY,
        guid: scrape::uploaded_query_guid,
        priming: &[template::STAFF_BO_PROPERTIES],
        format: ReportFormat::Txt,
    };

    /// The STU415 class roster report.
    pub const STU415: Self = Self {
        name: "STU415",
        endpoint: JobEndpoint::XmlDoRequest,
        request: template::STU415_REPORT,
        guid: scrape::report_row_guid,
        priming: &[],
        format: ReportFormat::Csv,
    };
}

impl Session {
    /// Creates the job on the portal and returns its GUID.
    pub async fn submit(&self, job: &ReportJob) -> Result<JobGuid, SynergyError> {
        info!("Submitting `{}`.", job.name);
        let body = self
            .post_form(
                job.endpoint.url(self),
                job.endpoint.field(),
                job.request.render(self.focus_key(), None),
            )
            .await?;
        let guid = (job.guid)()
            .extract(&body)
            .and_then(|guid| JobGuid::try_from(guid).ok())
            .ok_or(SynergyError::Request { job: job.name })?;
        debug!("`{}` was queued as {guid}", job.name);

        for priming in job.priming {
            trace!("Sending {}", priming.name());
            self.post_form(
                self.endpoints().xml_do_request(),
                JobEndpoint::XmlDoRequest.field(),
                priming.render(self.focus_key(), Some(&guid)),
            )
            .await?;
        }
        Ok(guid)
    }

    /// Waits until the job reaches the finished state, or until the session's timeout elapses.
    ///
    /// The status is polled by a background task. On timeout only the channel
    /// is closed; the task notices it after its current sleep and stops, so at
    /// most one extra status request is sent.
    pub async fn await_job(&self, guid: &JobGuid) -> Result<(), SynergyError> {
        let (tx, mut rx) = mpsc::channel(1);
        let poller = StatusPoller {
            client: self.client().clone(),
            url: self.endpoints().xml_do_request().clone(),
            focus_key: self.focus_key().clone(),
            guid: guid.clone(),
        };
        let started = Instant::now();
        spawn(poller.run(tx));

        tokio::select! {
            received = rx.recv() => {
                let result = received.unwrap_or_else(|| Err(SynergyError::PollerStopped { guid: guid.clone() }));
                if result.is_ok() {
                    info!("Job {guid} finished after {:?}.", started.elapsed());
                }
                result
            }
            _ = sleep(*self.timeout()) => {
                rx.close();
                Err(SynergyError::Timeout {
                    guid: guid.clone(),
                    timeout: *self.timeout(),
                })
            }
        }
    }

    /// Submits the job, waits for it and asks the portal to publish its results.
    pub async fn submit_and_await(&self, job: &ReportJob) -> Result<JobGuid, SynergyError> {
        let guid = self.submit(job).await?;
        self.await_job(&guid).await?;
        self.post_form(
            self.endpoints().xml_do_request(),
            JobEndpoint::XmlDoRequest.field(),
            template::JOB_RESULTS.render(self.focus_key(), Some(&guid)),
        )
        .await?;
        Ok(guid)
    }
}

struct StatusPoller {
    client: reqwest::Client,
    url: Url,
    focus_key: FocusKey,
    guid: JobGuid,
}
impl StatusPoller {
    async fn run(self, tx: mpsc::Sender<Result<(), SynergyError>>) {
        let request = template::JOB_STATUS.render(&self.focus_key, Some(&self.guid));
        for polls in 1usize.. {
            let result = post_form(
                &self.client,
                &self.url,
                JobEndpoint::XmlDoRequest.field(),
                request.clone(),
            )
            .await;
            match result {
                Ok(body) if scrape::job_finished(&body, &self.guid) => {
                    debug!("Job {} finished on poll #{polls}", self.guid);
                    // The receiver may have given up already; nobody is waiting then.
                    let _ = tx.try_send(Ok(()));
                    return;
                }
                Ok(_) => trace!("Job {} is not finished yet (poll #{polls})", self.guid),
                Err(e) => {
                    let _ = tx.try_send(Err(e));
                    return;
                }
            }
            sleep(POLL_INTERVAL).await;
            if tx.is_closed() {
                debug!("Stopped polling job {} after {polls} polls", self.guid);
                return;
            }
        }
    }
}
