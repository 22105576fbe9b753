pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{
    documents, experience, jury, payment, proposition, public, supervision, training, wizard,
};
use crate::state::AppState;

/// Build the portal route tree.
///
/// Route hierarchy:
///
/// ```text
/// /propositions                                              list (GET)
///
/// /{context}/create/training-choice                          create form (GET, POST)
///
/// /{context}/{uuid}                                          home (GET)
/// /{context}/{uuid}/tabs                                     tabs with access flags (GET)
/// /{context}/{uuid}/cancel                                   cancel (POST)
/// /{context}/{uuid}/payment                                  page, pay (GET, POST)
/// /{context}/{uuid}/{tab}                                    read view (GET)
/// /{context}/{uuid}/update/{tab}                             edit form, submit (GET, POST)
/// /{context}/{uuid}/update/confirm-documents                 one-shot confirmation (GET)
/// /{context}/{uuid}/update/supervision/request-signatures    request signatures (POST)
/// /{context}/{uuid}/update/supervision/remove-member         remove member (POST)
/// /{context}/{uuid}/update/jury/members/{member}             edit member (GET, POST)
/// /{context}/{uuid}/update/jury/members/{member}/remove      remove member (POST)
/// /{context}/{uuid}/update/jury/members/{member}/change-role change role (POST)
/// /{context}/{uuid}/update/curriculum/{kind}/create          new experience (GET, POST)
/// /{context}/{uuid}/update/curriculum/{kind}/{id}/update     edit experience (GET, POST)
/// /{context}/{uuid}/update/curriculum/{kind}/{id}/delete     remove experience (POST)
/// /{context}/{uuid}/training/{namespace}                     activities, batch submit (GET, POST)
/// /{context}/{uuid}/training/{namespace}/add/{category}      new activity (GET, POST)
/// /{context}/{uuid}/training/{namespace}/{activity}/edit     edit activity (GET, POST)
/// /{context}/{uuid}/training/{namespace}/{activity}/delete   remove activity (POST)
/// /{context}/{uuid}/training/{namespace}/{activity}/assent   promoter assent (GET, POST)
///
/// /public/doctorate/{uuid}/external-approval/{token}         external decision (GET, POST)
/// /public/doctorate/{uuid}/external-confirm                  decision saved (GET)
/// ```
///
/// `{kind}` is `professional` or `educational`. Training routes and public
/// pages exist for doctorates only.
///
/// Static segments take precedence over `{tab}`, so the dedicated routes
/// are never dispatched to the generic tab handlers.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/propositions", get(proposition::list))
        .route(
            "/{context}/create/training-choice",
            get(wizard::create_form).post(wizard::create),
        )
        .route("/{context}/{uuid}", get(proposition::home))
        .route("/{context}/{uuid}/tabs", get(proposition::tabs))
        .route("/{context}/{uuid}/cancel", post(proposition::cancel))
        .route(
            "/{context}/{uuid}/payment",
            get(payment::page).post(payment::submit),
        )
        .route("/{context}/{uuid}/{tab}", get(wizard::detail))
        .route(
            "/{context}/{uuid}/update/{tab}",
            get(wizard::edit).post(wizard::submit),
        )
        .route(
            "/{context}/{uuid}/update/confirm-documents",
            get(documents::confirm_documents),
        )
        .route(
            "/{context}/{uuid}/update/supervision/request-signatures",
            post(supervision::request_signatures),
        )
        .route(
            "/{context}/{uuid}/update/supervision/remove-member",
            post(supervision::remove_member),
        )
        .route(
            "/{context}/{uuid}/update/jury/members/{member}",
            get(jury::member).post(jury::update_member),
        )
        .route(
            "/{context}/{uuid}/update/jury/members/{member}/remove",
            post(jury::remove_member),
        )
        .route(
            "/{context}/{uuid}/update/jury/members/{member}/change-role",
            post(jury::change_role),
        )
        .route(
            "/{context}/{uuid}/update/curriculum/professional/create",
            get(experience::new_professional).post(experience::create_professional),
        )
        .route(
            "/{context}/{uuid}/update/curriculum/professional/{experience}/update",
            get(experience::professional).post(experience::update_professional),
        )
        .route(
            "/{context}/{uuid}/update/curriculum/professional/{experience}/delete",
            post(experience::delete_professional),
        )
        .route(
            "/{context}/{uuid}/update/curriculum/educational/create",
            get(experience::new_educational).post(experience::create_educational),
        )
        .route(
            "/{context}/{uuid}/update/curriculum/educational/{experience}/update",
            get(experience::educational).post(experience::update_educational),
        )
        .route(
            "/{context}/{uuid}/update/curriculum/educational/{experience}/delete",
            post(experience::delete_educational),
        )
        .route(
            "/{context}/{uuid}/training/{namespace}",
            get(training::list).post(training::submit),
        )
        .route(
            "/{context}/{uuid}/training/{namespace}/add/{category}",
            get(training::new_activity).post(training::create_activity),
        )
        .route(
            "/{context}/{uuid}/training/{namespace}/{activity}/edit",
            get(training::activity).post(training::update_activity),
        )
        .route(
            "/{context}/{uuid}/training/{namespace}/{activity}/delete",
            post(training::delete_activity),
        )
        .route(
            "/{context}/{uuid}/training/{namespace}/{activity}/assent",
            get(training::assent).post(training::give_assent),
        )
        .route(
            "/public/doctorate/{uuid}/external-approval/{token}",
            get(public::approval).post(public::decide),
        )
        .route(
            "/public/doctorate/{uuid}/external-confirm",
            get(public::confirm),
        )
}
