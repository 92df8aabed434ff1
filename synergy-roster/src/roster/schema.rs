use derive_more::{AsRef, Display, From};
use getset::Getters;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Identifies one class across runs: a hash of period, course, section and term.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, From, AsRef, Display, Serialize, Deserialize)]
#[as_ref(forward)]
pub struct GroupId(String);

/// One row of the STU415 report: a student enrolled in one section for one term.
///
/// `teacher` starts out as a display name and becomes an email address once
/// the staff directory has been applied.
#[derive(Clone, PartialEq, Eq, Debug, TypedBuilder, Getters, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct Stu415 {
    #[builder(default, setter(into))]
    organization_name: String,
    #[builder(default, setter(into))]
    school_year: String,
    #[builder(setter(into))]
    student_name: String,
    /// Permanent id with the email domain appended.
    #[builder(setter(into))]
    perm_id: String,
    #[builder(default, setter(into))]
    gender: String,
    #[builder(default, setter(into))]
    grade: String,
    #[builder(default, setter(into))]
    term_name: String,
    #[builder(setter(into))]
    per: String,
    #[builder(setter(into))]
    term: String,
    #[builder(setter(into))]
    section_id: String,
    #[builder(setter(into))]
    course_id_and_title: String,
    #[builder(default, setter(into))]
    meet_days: String,
    #[builder(setter(into))]
    teacher: String,
    #[builder(default, setter(into))]
    room: String,
    #[builder(default, setter(into))]
    prescheduled: String,
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    group_id: Option<GroupId>,
}
impl Stu415 {
    pub(crate) fn set_teacher(&mut self, teacher: String) {
        self.teacher = teacher;
    }

    pub(crate) fn set_group_id(&mut self, group_id: GroupId) {
        self.group_id = Some(group_id);
    }
}

/// A `(name, email)` pair of the staff directory.
#[derive(Clone, PartialEq, Eq, Debug, TypedBuilder, Getters, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct StaffDirectoryEntry {
    #[builder(setter(into))]
    email: String,
    #[builder(setter(into))]
    name: String,
}

/// Records sharing a period or a group id. The title is taken from the first member.
#[derive(Clone, PartialEq, Eq, Debug, Getters, Serialize)]
#[getset(get = "pub")]
pub struct Roster {
    id: Option<GroupId>,
    title: String,
    per: String,
    teacher: String,
    students: Vec<Stu415>,
}
impl Roster {
    /// `None` for an empty group.
    pub(crate) fn from_students(students: Vec<Stu415>) -> Option<Self> {
        let first = students.first()?;
        Some(Self {
            id: first.group_id.clone(),
            title: first.course_id_and_title.clone(),
            per: first.per.clone(),
            teacher: first.teacher.clone(),
            students,
        })
    }
}
