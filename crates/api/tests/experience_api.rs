//! HTTP-level integration tests of the curriculum experiences: creation,
//! edition and removal of professional and educational experiences.

mod common;

use admission_client::Resource;
use axum::http::StatusCode;
use common::{all_links, body_json, draft, get_auth, location, post_json_auth, token, FakeAdmissionService};
use serde_json::json;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn illness() -> serde_json::Value {
    json!({
        "start_date_month": 2,
        "start_date_year": 2020,
        "end_date_month": 2,
        "end_date_year": 2021,
        "type": "ILLNESS",
    })
}

/// Experience as stored by the service for a general education admission.
fn stored_educational() -> serde_json::Value {
    json!({
        "uuid": "e-2",
        "country": "BE",
        "institute": "inst-1",
        "program": "prog-1",
        "evaluation_type": "ECTS_CREDITS",
        "linguistic_regime": "FR",
        "transcript_type": "ONE_FOR_ALL_YEARS",
        "transcript": ["global"],
        "obtained_diploma": false,
        "educationalexperienceyear_set": [
            { "academic_year": 2020, "result": "SUCCESS", "registered_credit_number": 60.0, "acquired_credit_number": 60.0 },
        ],
    })
}

// ---------------------------------------------------------------------------
// Test: professional experiences
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_professional_experience_is_posted() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service.with_admission(draft(uuid, all_links()));
    let app = common::build_test_app(service.clone());

    let uri = format!("/general-education/{uuid}/update/curriculum/professional/create");
    let response = post_json_auth(app, &uri, illness(), &token()).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        format!("/general-education/{uuid}/update/curriculum#non-academic-activities")
    );
    let writes = service.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].method, "POST");
    assert_eq!(writes[0].path, "curriculum/professional");
    assert_eq!(writes[0].payload["start_date"], "2020-02-01");
    assert_eq!(writes[0].payload["end_date"], "2021-02-28");
}

#[tokio::test]
async fn incomplete_work_experience_returns_422() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service.with_admission(draft(uuid, all_links()));
    let app = common::build_test_app(service.clone());

    let mut body = illness();
    body["type"] = json!("WORK");
    let uri = format!("/doctorate/{uuid}/update/curriculum/professional/create");
    let response = post_json_auth(app, &uri, body, &token()).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert!(json["data"]["errors"]["fields"]["role"].is_array());
    assert!(json["data"]["errors"]["fields"]["institute_name"].is_array());
    assert!(service.writes().is_empty());
}

#[tokio::test]
async fn professional_edit_form_shows_months() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service.with_admission(draft(uuid, all_links())).with_resource(
        Resource::ProfessionalExperience("e-1".into()),
        json!({ "uuid": "e-1", "start_date": "2019-09-01", "end_date": "2020-06-30", "type": "INTERNSHIP" }),
    );
    let app = common::build_test_app(service);

    let uri = format!("/doctorate/{uuid}/update/curriculum/professional/e-1/update");
    let response = get_auth(app, &uri, &token()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["values"]["start_date_month"], 9);
    assert_eq!(json["data"]["values"]["end_date_year"], 2020);
    assert_eq!(json["data"]["context"]["experience"]["uuid"], "e-1");
}

#[tokio::test]
async fn professional_experience_update_follows_redirect_to() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service.with_admission(draft(uuid, all_links()));
    let app = common::build_test_app(service.clone());

    let uri = format!(
        "/doctorate/{uuid}/update/curriculum/professional/e-1/update?redirect_to=/doctorate/{uuid}/curriculum"
    );
    let response = post_json_auth(app, &uri, illness(), &token()).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/doctorate/{uuid}/curriculum"));
    assert_eq!(service.writes()[0].method, "PUT");
    assert_eq!(service.writes()[0].path, "curriculum/professional/e-1");
}

#[tokio::test]
async fn experiences_need_the_curriculum_update_action() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service.with_admission(draft(uuid, all_links().deny("update_curriculum", "Curriculum locked")));
    let app = common::build_test_app(service.clone());

    let uri = format!("/doctorate/{uuid}/update/curriculum/professional/e-1/delete");
    let response = post_json_auth(app, &uri, json!({}), &token()).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Curriculum locked");
    assert!(service.writes().is_empty());
}

// ---------------------------------------------------------------------------
// Test: educational experiences
// ---------------------------------------------------------------------------

#[tokio::test]
async fn educational_edit_form_lists_every_year_between_the_enrolled_ones() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    let mut stored = stored_educational();
    stored["educationalexperienceyear_set"]
        .as_array_mut()
        .unwrap()
        .push(json!({ "academic_year": 2018, "result": "FAILURE" }));
    service
        .with_admission(draft(uuid, all_links()))
        .with_resource(Resource::EducationalExperience("e-2".into()), stored);
    let app = common::build_test_app(service);

    let uri = format!("/general-education/{uuid}/update/curriculum/educational/e-2/update");
    let response = get_auth(app, &uri, &token()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let values = &body_json(response).await["data"]["values"];
    assert_eq!(values["start"], 2018);
    assert_eq!(values["end"], 2020);
    let years: Vec<_> = values["years"]
        .as_array()
        .unwrap()
        .iter()
        .map(|year| (year["academic_year"].clone(), year["is_enrolled"].clone()))
        .collect();
    assert_eq!(
        years,
        vec![(json!(2020), json!(true)), (json!(2019), json!(false)), (json!(2018), json!(true))]
    );
}

#[tokio::test]
async fn continuing_education_keeps_the_fields_it_does_not_edit() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service
        .with_admission(draft(uuid, all_links()))
        .with_resource(Resource::EducationalExperience("e-2".into()), stored_educational());
    let app = common::build_test_app(service.clone());

    let body = json!({
        "start": 2020,
        "end": 2020,
        "country": "BE",
        "institute": "inst-2",
        "program": "prog-1",
        "obtained_diploma": false,
        "years": [{ "academic_year": 2020 }],
    });
    let uri = format!("/continuing-education/{uuid}/update/curriculum/educational/e-2/update");
    let response = post_json_auth(app, &uri, body, &token()).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        format!("/continuing-education/{uuid}/update/curriculum#academic-activities")
    );
    let writes = service.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].path, "curriculum/educational/e-2");
    let payload = &writes[0].payload;
    assert_eq!(payload["institute"], "inst-2");
    assert_eq!(payload["evaluation_type"], "ECTS_CREDITS");
    assert_eq!(payload["linguistic_regime"], "FR");
    assert_eq!(payload["transcript"], json!(["global"]));
    let year = &payload["educationalexperienceyear_set"][0];
    assert_eq!(year["academic_year"], 2020);
    assert_eq!(year["result"], "SUCCESS");
    assert_eq!(year["registered_credit_number"], 60.0);
}

#[tokio::test]
async fn educational_experience_without_enrolled_year_returns_422() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service.with_admission(draft(uuid, all_links()));
    let app = common::build_test_app(service.clone());

    let body = json!({
        "start": 2020,
        "end": 2020,
        "country": "BE",
        "institute": "inst-1",
        "program": "prog-1",
        "evaluation_type": "ECTS_CREDITS",
        "transcript_type": "ONE_FOR_ALL_YEARS",
        "obtained_diploma": false,
        "years": [{ "academic_year": 2020, "is_enrolled": false }],
    });
    let uri = format!("/general-education/{uuid}/update/curriculum/educational/create");
    let response = post_json_auth(app, &uri, body, &token()).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(
        json["data"]["errors"]["non_field"],
        json!(["At least one academic year is required."])
    );
    assert!(service.writes().is_empty());
}

#[tokio::test]
async fn educational_experience_removal() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service.with_admission(draft(uuid, all_links()));
    let app = common::build_test_app(service.clone());

    let uri = format!("/doctorate/{uuid}/update/curriculum/educational/e-2/delete");
    let response = post_json_auth(app, &uri, json!({}), &token()).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        format!("/doctorate/{uuid}/update/curriculum#academic-activities")
    );
    let writes = service.writes();
    assert_eq!(writes[0].method, "DELETE");
    assert_eq!(writes[0].path, "curriculum/educational/e-2");
}
