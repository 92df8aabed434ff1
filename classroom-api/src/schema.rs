use derive_more::{AsRef, Display, From};
use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq, Debug, From, AsRef, Display, Serialize, Deserialize)]
#[as_ref(forward)]
pub struct CourseId(String);

/// The invitee; the classroom service accepts an email address here.
#[derive(Clone, PartialEq, Eq, Debug, From, AsRef, Display, Serialize, Deserialize)]
#[as_ref(forward)]
pub struct UserId(String);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse<'a> {
    pub name: &'a str,
    pub section: &'a str,
    pub description: &'a str,
    pub owner_id: &'a str,
}
impl<'a> NewCourse<'a> {
    /// A course owned by whoever the access token belongs to.
    pub fn owned_by_me(name: &'a str, section: &'a str, description: &'a str) -> Self {
        Self {
            name,
            section,
            description,
            owner_id: "me",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Course {
    pub id: CourseId,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewInvitation<'a> {
    pub course_id: &'a CourseId,
    pub role: &'static str,
    pub user_id: &'a UserId,
}
