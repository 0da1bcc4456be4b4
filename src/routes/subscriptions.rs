use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::web;
use actix_web::HttpResponse;
use serde::Deserialize;

use crate::form::SubmitOutcome;
use crate::form::SubscribeError;
use crate::form::SubscriptionForm;
use crate::routes::LandingPage;
use crate::store_client::RestStoreClient;
use crate::ui::InfoModal;
use crate::ui::NavDrawer;
use crate::utils::error_500;

#[derive(Deserialize)]
pub struct FormData {
    email: String,
}

/// Status of the re-rendered page; the body always carries the inline message
fn status_code(e: &SubscribeError) -> StatusCode {
    match e {
        SubscribeError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
        SubscribeError::AlreadySubscribed(_) => StatusCode::CONFLICT,
        SubscribeError::Rejected(_) => StatusCode::BAD_GATEWAY,
        SubscribeError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `POST /subscriptions`
///
/// Runs one `SubscriptionForm` for the request and renders the landing page
/// with whatever state it settled in. A missing `email` field is rejected by
/// the `Form` extractor (400) before we get here.
///
/// # Request example
///
/// ```sh
///     curl -v --data 'email=john%40foo.com' http://127.0.0.1:8000/subscriptions
/// ```
#[tracing::instrument(
    name = "Adding new subscriber",
    skip(form, store, page),
    fields(subscriber_email = %form.email)
)]
pub async fn subscribe(
    form: web::Form<FormData>,
    // inherited via App.app_data
    store: web::Data<RestStoreClient>,
    page: web::Data<LandingPage>,
) -> Result<HttpResponse, actix_web::Error> {
    let controller = SubscriptionForm::new(store.into_inner(), page.success_dismiss);
    controller.set_email(form.0.email);

    let status = match controller.submit().await {
        SubmitOutcome::Subscribed => StatusCode::OK,
        SubmitOutcome::Failed(e) => status_code(&e),
        // a fresh controller is never busy
        SubmitOutcome::AlreadyInFlight => StatusCode::CONFLICT,
    };

    let body = page
        .render(
            &controller.state(),
            NavDrawer::default(),
            InfoModal::default(),
        )
        .map_err(error_500)?;

    Ok(HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(body))
}
