use anyhow::{bail, Context};
use classroom_api::{
    schema::{NewCourse, UserId},
    Classroom,
};
use itertools::Itertools;
use log::info;
use typed_builder::TypedBuilder;

use crate::{
    roster::GroupId,
    store::{RosterStore, SyncClass},
};

#[derive(Debug, TypedBuilder)]
pub struct SyncRequest {
    #[builder(setter(into))]
    group_id: String,
    #[builder(setter(into))]
    name: String,
    #[builder(default, setter(into))]
    description: String,
}

/// Creates a Classroom course for one class and invites its students.
///
/// The class is recorded even if some invitations fail, since the course
/// exists by then; the failures are reported afterwards.
pub async fn sync_class<C: Classroom, S: RosterStore>(
    classroom: &C,
    store: &S,
    request: &SyncRequest,
) -> anyhow::Result<SyncClass> {
    if request.group_id.is_empty() || request.name.is_empty() {
        bail!("Course not created: a group id and a name are required");
    }
    let group_id = GroupId::from(request.group_id.clone());
    let roster = store.query_by_group_id(&group_id)?;
    let Some(first) = roster.first() else {
        bail!("Course not created: there are no students in group {group_id}");
    };

    let course_id = classroom
        .create_course(&NewCourse::owned_by_me(
            &request.name,
            first.per(),
            &request.description,
        ))
        .await
        .with_context(|| format!("While creating a course for group {group_id}"))?;
    let students = roster
        .iter()
        .map(|student| UserId::from(student.perm_id().clone()))
        .collect_vec();
    let report = classroom.invite_students(&course_id, &students).await;
    info!(
        "Invited {} of {} students to {course_id}",
        report.invited().len(),
        students.len()
    );

    let class = SyncClass::builder()
        .course_id(course_id)
        .group_id(group_id)
        .per(first.per())
        .term(first.term())
        .name(request.name.as_str())
        .course_id_and_title(first.course_id_and_title())
        .description(request.description.as_str())
        .teacher(first.teacher())
        .build();
    store.insert_sync_class(&class)?;
    report.into_result()?;
    Ok(class)
}
