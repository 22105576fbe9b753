//! HTTP-level integration tests of the steps around submission: the
//! confirmation page, application fees, requested documents, and the
//! supervision and jury actions.

mod common;

use admission_api::handlers::payment::PAYMENT_FAILED_MESSAGE;
use admission_client::Resource;
use admission_core::admission::Links;
use admission_core::forms::confirm::{INCOMPLETE_MESSAGE, VERIFICATION_UNREADABLE_MESSAGE};
use admission_core::questions::REQUIRED_DOCUMENTS_MESSAGE;
use axum::http::StatusCode;
use common::{
    all_links, body_json, draft, get_auth, location, post_json_auth, token, FakeAdmissionService,
};
use serde_json::json;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn requested_documents() -> serde_json::Value {
    json!({
        "immediate_requested_documents": [
            { "name": "id-card", "type": "document", "label": "Identity card", "tab": "person", "required": true },
        ],
        "later_requested_documents": [],
        "deadline": "2026-11-30",
    })
}

/// Pool and year posted back by the confirmation page.
fn hidden_values() -> serde_json::Value {
    json!({ "pool": "ADMISSION_POOL_UE5_BELGIAN", "annee": 2026 })
}

// ---------------------------------------------------------------------------
// Test: home page and tab access
// ---------------------------------------------------------------------------

#[tokio::test]
async fn tabs_report_read_and_update_access() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service.with_admission(draft(uuid, all_links().deny("update_project", "Locked")));
    let app = common::build_test_app(service);

    let response = get_auth(app, &format!("/doctorate/{uuid}/tabs"), &token()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let project = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|group| group["children"].as_array().unwrap().iter())
        .find(|tab| tab["name"] == "project")
        .expect("project tab listed");
    assert_eq!(project["can_read"], true);
    assert_eq!(project["can_update"], false);
}

#[tokio::test]
async fn cancel_redirects_to_the_list() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service.with_admission(draft(uuid, all_links()));
    let app = common::build_test_app(service.clone());

    let response =
        post_json_auth(app, &format!("/doctorate/{uuid}/cancel"), json!({}), &token()).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/propositions");
    assert_eq!(service.writes()[0].method, "DELETE");
}

// ---------------------------------------------------------------------------
// Test: confirmation and submission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn incomplete_application_cannot_be_submitted() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service
        .with_admission(draft(uuid, all_links()))
        .with_resource(
            Resource::Verification,
            json!([{ "status_code": "PROPOSITION-29", "detail": "Missing curriculum." }]),
        );
    let app = common::build_test_app(service.clone());

    let uri = format!("/doctorate/{uuid}/update/confirm");
    let response = post_json_auth(app.clone(), &uri, json!({}), &token()).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["data"]["errors"]["non_field"][0], INCOMPLETE_MESSAGE);
    assert_eq!(json["data"]["context"]["verification_errors"].as_array().map(Vec::len), Some(1));
    assert!(service.writes().is_empty());

    let response = get_auth(app, &uri, &token()).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unreadable_verification_blocks_submission() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service
        .with_admission(draft(uuid, all_links()))
        .with_resource(Resource::Verification, json!({ "errors": "internal failure" }));
    let app = common::build_test_app(service.clone());

    let uri = format!("/doctorate/{uuid}/update/confirm");
    let response = post_json_auth(app, &uri, hidden_values(), &token()).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["data"]["errors"]["non_field"], json!([VERIFICATION_UNREADABLE_MESSAGE]));
    assert!(service.writes().is_empty());
}

#[tokio::test]
async fn submitted_application_is_announced_once_on_home() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service
        .with_admission(draft(uuid, all_links()))
        .with_resource(Resource::Verification, json!([]))
        .with_response(Resource::Submission, json!({ "status": "CONFIRMEE" }));
    let app = common::build_test_app(service.clone());

    let uri = format!("/doctorate/{uuid}/update/confirm");
    let response = post_json_auth(app.clone(), &uri, hidden_values(), &token()).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/doctorate/{uuid}"));
    assert_eq!(service.writes()[0].path, "submit");

    let home = format!("/doctorate/{uuid}");
    let json = body_json(get_auth(app.clone(), &home, &token()).await).await;
    assert_eq!(json["data"]["just_submitted"], "doctorate");

    let json = body_json(get_auth(app, &home, &token()).await).await;
    assert!(json["data"]["just_submitted"].is_null());
}

#[tokio::test]
async fn submission_pending_fees_leads_to_payment() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service
        .with_admission(draft(uuid, all_links()))
        .with_resource(Resource::Verification, json!([]))
        .with_response(Resource::Submission, json!({ "status": "FRAIS_DOSSIER_EN_ATTENTE" }));
    let app = common::build_test_app(service);

    let uri = format!("/general-education/{uuid}/update/confirm");
    let response = post_json_auth(app, &uri, hidden_values(), &token()).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/general-education/{uuid}/payment"));
}

// ---------------------------------------------------------------------------
// Test: application fees
// ---------------------------------------------------------------------------

#[tokio::test]
async fn payment_page_requires_an_open_payment() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service.with_admission(draft(uuid, all_links()));
    let app = common::build_test_app(service);

    let response = get_auth(app, &format!("/general-education/{uuid}/payment"), &token()).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn both_payments_open_is_an_internal_error() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    let links = Links::new()
        .allow("pay_after_submission")
        .allow("pay_after_request");
    service.with_admission(draft(uuid, links));
    let app = common::build_test_app(service);

    let response = get_auth(app, &format!("/general-education/{uuid}/payment"), &token()).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn valid_payment_is_recorded_and_announced_on_home() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service.with_admission(draft(uuid, Links::new().allow("pay_after_submission")));
    let app = common::build_test_app(service.clone());

    let uri = format!("/general-education/{uuid}/payment");
    let json = body_json(get_auth(app.clone(), &uri, &token()).await).await;
    assert_eq!(json["data"]["payment"], "after-submission");

    let response =
        post_json_auth(app.clone(), &uri, json!({ "action": "valid-payment" }), &token()).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/general-education/{uuid}"));
    let writes = service.writes();
    assert_eq!(writes[0].method, "POST");
    assert_eq!(writes[0].path, "pay_after_submission");

    let home = format!("/general-education/{uuid}");
    let json = body_json(get_auth(app, &home, &token()).await).await;
    assert_eq!(json["data"]["payment_completed"], "after-submission");
}

#[tokio::test]
async fn invalid_payment_shows_the_failure() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service.with_admission(draft(uuid, Links::new().allow("pay_after_request")));
    let app = common::build_test_app(service.clone());

    let uri = format!("/general-education/{uuid}/payment");
    let response = post_json_auth(app, &uri, json!({ "action": "invalid-payment" }), &token()).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["data"]["errors"]["non_field"], json!([PAYMENT_FAILED_MESSAGE]));
    assert!(service.writes().is_empty());
}

#[tokio::test]
async fn unknown_payment_action_returns_400() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service.with_admission(draft(uuid, Links::new().allow("pay_after_request")));
    let app = common::build_test_app(service);

    let uri = format!("/general-education/{uuid}/payment");
    let response = post_json_auth(app, &uri, json!({ "action": "refund" }), &token()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: requested documents
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_requested_document_returns_422() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service
        .with_admission(draft(uuid, all_links()))
        .with_resource(Resource::Documents, requested_documents());
    let app = common::build_test_app(service.clone());

    let uri = format!("/doctorate/{uuid}/update/documents");
    let response = post_json_auth(app, &uri, json!({ "person": { "id-card": [] } }), &token()).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    let non_field = json["data"]["errors"]["non_field"].as_array().unwrap().clone();
    assert!(non_field.contains(&json!(REQUIRED_DOCUMENTS_MESSAGE)));
    assert!(service.writes().is_empty());
}

#[tokio::test]
async fn documents_confirmation_is_shown_once() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service
        .with_admission(draft(uuid, all_links()))
        .with_resource(Resource::Documents, requested_documents());
    let app = common::build_test_app(service.clone());

    let uri = format!("/doctorate/{uuid}/update/documents");
    let body = json!({ "person": { "id-card": ["token-1"] } });
    let response = post_json_auth(app.clone(), &uri, body, &token()).await;

    let confirm = format!("/doctorate/{uuid}/update/confirm-documents");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), confirm);

    let writes = service.writes();
    assert_eq!(writes[0].method, "PUT");
    assert_eq!(writes[0].path, "documents");
    assert_eq!(
        writes[0].payload["reponses_documents_a_completer"]["id-card"],
        json!(["token-1"])
    );

    let response = get_auth(app.clone(), &confirm, &token()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["home_url"], format!("/doctorate/{uuid}"));

    let response = get_auth(app, &confirm, &token()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn documents_confirmation_of_another_admission_is_refused() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    let other = Uuid::new_v4();
    service
        .with_admission(draft(uuid, all_links()))
        .with_admission(draft(other, all_links()))
        .with_resource(Resource::Documents, requested_documents());
    let app = common::build_test_app(service);

    let uri = format!("/doctorate/{uuid}/update/documents");
    let body = json!({ "person": { "id-card": ["token-1"] } });
    post_json_auth(app.clone(), &uri, body, &token()).await;

    let confirm = format!("/doctorate/{other}/update/confirm-documents");
    let response = get_auth(app, &confirm, &token()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Test: supervision and jury actions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn supervision_member_removal_posts_and_redirects() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service.with_admission(draft(uuid, all_links()));
    let app = common::build_test_app(service.clone());

    let uri = format!("/doctorate/{uuid}/update/supervision/remove-member");
    let body = json!({ "type": "PROMOTER", "uuid_membre": "member-1" });
    let response = post_json_auth(app, &uri, body, &token()).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/doctorate/{uuid}/supervision"));
    let writes = service.writes();
    assert_eq!(writes[0].path, "supervision/member");
    assert_eq!(writes[0].payload["uuid_membre"], "member-1");
}

#[tokio::test]
async fn signatures_are_requested() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service.with_admission(draft(uuid, all_links()));
    let app = common::build_test_app(service.clone());

    let uri = format!("/doctorate/{uuid}/update/supervision/request-signatures");
    let response = post_json_auth(app, &uri, json!({}), &token()).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(service.writes()[0].path, "request_signatures");
}

#[tokio::test]
async fn jury_role_must_be_a_known_role() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service.with_admission(draft(uuid, all_links()));
    let app = common::build_test_app(service.clone());

    let uri = format!("/doctorate/{uuid}/update/jury/members/member-1/change-role");
    let response = post_json_auth(app.clone(), &uri, json!({ "role": "KING" }), &token()).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert!(json["data"]["errors"]["fields"]["role"].is_array());
    assert!(service.writes().is_empty());

    let response = post_json_auth(app, &uri, json!({ "role": "PRESIDENT" }), &token()).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/doctorate/{uuid}/jury"));
    let writes = service.writes();
    assert_eq!(writes[0].method, "PUT");
    assert_eq!(writes[0].path, "jury/members/member-1/role");
}

#[tokio::test]
async fn jury_member_is_removed() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service.with_admission(draft(uuid, all_links()));
    let app = common::build_test_app(service.clone());

    let uri = format!("/doctorate/{uuid}/update/jury/members/member-1/remove");
    let response = post_json_auth(app, &uri, json!({}), &token()).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let writes = service.writes();
    assert_eq!(writes[0].method, "DELETE");
    assert_eq!(writes[0].path, "jury/members/member-1");
}

#[tokio::test]
async fn jury_exists_only_for_doctorates() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service.with_admission(draft(uuid, all_links()));
    let app = common::build_test_app(service);

    let uri = format!("/general-education/{uuid}/update/jury/members/member-1");
    let response = get_auth(app, &uri, &token()).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: requested destination after an action
// ---------------------------------------------------------------------------

#[tokio::test]
async fn supervision_member_removal_follows_redirect_to() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service.with_admission(draft(uuid, all_links()));
    let app = common::build_test_app(service.clone());

    let target = format!("/doctorate/{uuid}/project");
    let uri = format!("/doctorate/{uuid}/update/supervision/remove-member?redirect_to={target}");
    let body = json!({ "type": "PROMOTER", "uuid_membre": "member-1", "redirect_to": target });
    let response = post_json_auth(app, &uri, body, &token()).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), target);
    assert_eq!(service.writes()[0].path, "supervision/member");
}

#[tokio::test]
async fn jury_member_removal_follows_redirect_to() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service.with_admission(draft(uuid, all_links()));
    let app = common::build_test_app(service.clone());

    let target = format!("/doctorate/{uuid}/supervision");
    let uri = format!("/doctorate/{uuid}/update/jury/members/member-1/remove?redirect_to={target}");
    let response = post_json_auth(app, &uri, json!({}), &token()).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), target);
}

#[tokio::test]
async fn signatures_request_ignores_an_off_site_redirect() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service.with_admission(draft(uuid, all_links()));
    let app = common::build_test_app(service.clone());

    let uri = format!(
        "/doctorate/{uuid}/update/supervision/request-signatures?redirect_to=https://evil.example"
    );
    let response = post_json_auth(app, &uri, json!({}), &token()).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/doctorate/{uuid}/supervision"));
}

#[tokio::test]
async fn payment_follows_redirect_to() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service.with_admission(draft(uuid, Links::new().allow("pay_after_request")));
    let app = common::build_test_app(service.clone());

    let uri = format!("/general-education/{uuid}/payment");
    let body = json!({ "action": "valid-payment", "redirect_to": "/propositions" });
    let response = post_json_auth(app, &uri, body, &token()).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/propositions");
    assert_eq!(service.writes()[0].path, "pay_after_request");
}

#[tokio::test]
async fn cancel_follows_redirect_to() {
    let service = FakeAdmissionService::new();
    let uuid = Uuid::new_v4();
    service.with_admission(draft(uuid, all_links()));
    let app = common::build_test_app(service.clone());

    let uri = format!("/doctorate/{uuid}/cancel?redirect_to=/general-education/create/training-choice");
    let response = post_json_auth(app, &uri, json!({}), &token()).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/general-education/create/training-choice");
}
