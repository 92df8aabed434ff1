use classroom_api::{
    schema::{NewCourse, UserId},
    Classroom, ClassroomApi, ClassroomError,
};
use url::Url;
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

async fn api(server: &MockServer) -> ClassroomApi {
    ClassroomApi::with_base_url(Url::parse(&server.uri()).unwrap(), "token".to_owned()).unwrap()
}

#[tokio::test]
async fn create_course_returns_the_new_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/courses"))
        .and(header("authorization", "Bearer token"))
        .and(body_partial_json(serde_json::json!({"name": "Algebra", "ownerId": "me"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"id": "course-1", "name": "Algebra"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let course_id = api(&server)
        .await
        .create_course(&NewCourse::owned_by_me("Algebra", "3", "Fall"))
        .await
        .unwrap();
    assert_eq!(course_id.to_string(), "course-1");
}

#[tokio::test]
async fn rejected_course_surfaces_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/courses"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let err = api(&server)
        .await
        .create_course(&NewCourse::owned_by_me("Algebra", "3", "Fall"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClassroomError::Api { status, .. } if status.as_u16() == 403));
}

#[tokio::test]
async fn failed_invites_do_not_stop_the_batch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/invitations"))
        .and(body_partial_json(serde_json::json!({"userId": "bad@aps.edu"})))
        .respond_with(ResponseTemplate::new(400).set_body_string("no such user"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/invitations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "inv"})))
        .expect(2)
        .mount(&server)
        .await;

    let students: Vec<UserId> = ["a@aps.edu", "bad@aps.edu", "b@aps.edu"]
        .map(|s| UserId::from(s.to_owned()))
        .to_vec();
    let report = api(&server)
        .await
        .invite_students(&"course-1".to_owned().into(), &students)
        .await;
    assert_eq!(report.invited().len(), 2);
    assert_eq!(report.failed().len(), 1);
    assert_eq!(report.failed()[0].0.to_string(), "bad@aps.edu");

    let err = report.into_result().unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("1 of 3 invitations failed"), "{message}");
    assert!(message.contains("bad@aps.edu"));
}
