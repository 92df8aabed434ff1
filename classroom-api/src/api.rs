use std::fmt::Write;

use getset::Getters;
use log::{info, warn};
use reqwest::StatusCode;
use url::Url;

use crate::schema::{Course, CourseId, NewCourse, NewInvitation, UserId};

pub const DEFAULT_BASE_URL: &str = "https://classroom.googleapis.com/";

#[derive(Debug, thiserror::Error)]
pub enum ClassroomError {
    #[error("Request to the classroom service failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("The classroom service answered {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("Invalid classroom endpoint: {0}")]
    Url(#[from] url::ParseError),
    #[error("{} of {} invitations failed:{}", .0.failed.len(), .0.failed.len() + .0.invited.len(), .0.describe_failures())]
    Invitations(InviteReport),
}

/// Outcome of a batch of invitations. A failed invite never stops the batch.
#[derive(Debug, Default, Getters)]
#[getset(get = "pub")]
pub struct InviteReport {
    invited: Vec<UserId>,
    failed: Vec<(UserId, String)>,
}
impl InviteReport {
    pub fn push_invited(&mut self, user_id: UserId) {
        self.invited.push(user_id);
    }

    pub fn push_failed(&mut self, user_id: UserId, reason: String) {
        self.failed.push((user_id, reason));
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn into_result(self) -> Result<Self, ClassroomError> {
        if self.is_complete() {
            Ok(self)
        } else {
            Err(ClassroomError::Invitations(self))
        }
    }

    fn describe_failures(&self) -> String {
        let mut ret = String::new();
        for (user_id, reason) in &self.failed {
            let _ = write!(ret, "\n  {user_id}: {reason}");
        }
        ret
    }
}

/// Course creation and student invitations, the two things a roster sync needs.
#[allow(async_fn_in_trait)]
pub trait Classroom {
    async fn create_course(&self, course: &NewCourse<'_>) -> Result<CourseId, ClassroomError>;

    async fn invite_students(&self, course_id: &CourseId, students: &[UserId]) -> InviteReport;
}

pub struct ClassroomApi {
    reqwest: reqwest::Client,
    base_url: Url,
    access_token: String,
}

impl ClassroomApi {
    pub fn new(access_token: String) -> Result<Self, ClassroomError> {
        Self::with_base_url(Url::parse(DEFAULT_BASE_URL)?, access_token)
    }

    pub fn with_base_url(base_url: Url, access_token: String) -> Result<Self, ClassroomError> {
        let reqwest = reqwest::Client::builder()
            .connection_verbose(true)
            .build()?;
        Ok(Self {
            reqwest,
            base_url,
            access_token,
        })
    }

    async fn post<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, ClassroomError> {
        let response = self
            .reqwest
            .post(self.base_url.join(path)?)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassroomError::Api { status, body });
        }
        Ok(response)
    }
}

impl Classroom for ClassroomApi {
    async fn create_course(&self, course: &NewCourse<'_>) -> Result<CourseId, ClassroomError> {
        let course: Course = self.post("v1/courses", course).await?.json().await?;
        info!("Created course {} ({:?})", course.id, course.name);
        Ok(course.id)
    }

    async fn invite_students(&self, course_id: &CourseId, students: &[UserId]) -> InviteReport {
        let mut report = InviteReport::default();
        for user_id in students {
            let invitation = NewInvitation {
                course_id,
                role: "STUDENT",
                user_id,
            };
            match self.post("v1/invitations", &invitation).await {
                Ok(_) => report.push_invited(user_id.clone()),
                Err(e) => {
                    warn!("Failed to invite {user_id} to {course_id}: {e}");
                    report.push_failed(user_id.clone(), e.to_string());
                }
            }
        }
        report
    }
}
