//! HTTP handlers for the public submission endpoints.
//!
//! Every submission walks the same gauntlet, failing fast at each step:
//! client identification, rate limiting, honeypot, minimum fill time,
//! validation, then exactly one delivery attempt. A tripped honeypot is
//! the one deliberate lie: the bot sees a success response while nothing
//! is delivered.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use sanitization::forms::{
    validate_contact_form, validate_job_application, ContactForm, JobApplicationForm,
};
use sanitization::sanitize_string;

use crate::config::AppConfig;
use crate::email::{Mailer, OutboundEmail};
use crate::rate_limit::RateLimiter;
use crate::store::{ApplicationRecord, ApplicationStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub limiter: RateLimiter,
    pub mailer: Arc<dyn Mailer>,
    pub store: Arc<dyn ApplicationStore>,
}

/// Routes only; the caller layers middleware on top.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/contact", post(submit_contact))
        .route("/api/careers/apply", post(submit_application))
        .with_state(state)
}

/// Contact submission as posted by the browser: the form fields plus the
/// two anti-automation fields. Unknown or missing fields never reject the
/// request here; validation reports them as field errors instead.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactPayload {
    #[serde(flatten)]
    form: ContactForm,
    /// Hidden decoy field; humans never fill it.
    honeypot: String,
    /// Milliseconds since epoch when the client rendered the form.
    form_load_time: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationPayload {
    #[serde(flatten)]
    form: JobApplicationForm,
    position_id: String,
    position_title: String,
    department: String,
    /// Upload URL issued by the careers page, passed through untouched.
    resume_url: String,
    honeypot: String,
    form_load_time: Option<i64>,
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "provira-forms",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

fn client_identifier(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|value| value.to_str().ok())
        })
        .unwrap_or("unknown")
        .to_owned()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn success_response() -> Response {
    Json(json!({ "success": true })).into_response()
}

fn validation_failure(errors: Vec<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Validation failed", "errors": errors })),
    )
        .into_response()
}

/// Runs the shared anti-abuse gauntlet. `Some(response)` short-circuits
/// the handler; `None` means the submission may proceed to validation.
async fn abuse_checks(
    state: &AppState,
    client: &str,
    endpoint: &str,
    honeypot: &str,
    form_load_time: Option<i64>,
) -> Option<Response> {
    if !state.limiter.check_and_increment(client).await {
        warn!(%client, endpoint, "Rate limit exceeded");
        return Some(error_response(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests. Please try again later.",
        ));
    }

    if !honeypot.is_empty() {
        // Report success without delivering so the bot learns nothing.
        warn!(%client, endpoint, "Honeypot triggered; discarding submission");
        return Some(success_response());
    }

    if let Some(loaded_at) = form_load_time {
        let elapsed = Utc::now().timestamp_millis() - loaded_at;
        if elapsed < state.config.min_fill_time.as_millis() as i64 {
            warn!(%client, endpoint, elapsed, "Form submitted too quickly");
            return Some(error_response(
                StatusCode::BAD_REQUEST,
                "Please take a moment to fill out the form properly.",
            ));
        }
    }

    None
}

async fn submit_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ContactPayload>,
) -> Response {
    let client = client_identifier(&headers);
    if let Some(rejection) = abuse_checks(
        &state,
        &client,
        "contact",
        &payload.honeypot,
        payload.form_load_time,
    )
    .await
    {
        return rejection;
    }

    let outcome = validate_contact_form(&payload.form);
    if !outcome.is_valid() {
        return validation_failure(outcome.errors);
    }
    let contact = outcome.payload;

    let email = OutboundEmail {
        subject: format!(
            "New Contact: {} {} - {}",
            contact.first_name, contact.last_name, contact.company
        ),
        body: format!(
            "New Contact Form Submission\n\n\
             Name: {} {}\n\
             Email: {}\n\
             Company: {}\n\n\
             Message:\n{}\n\n\
             ---\n\
             Sent from the Provira website contact form\n\
             IP: {}",
            contact.first_name,
            contact.last_name,
            contact.email,
            contact.company,
            contact.message,
            client
        ),
        reply_to: Some(contact.email.clone()),
    };

    if let Err(err) = state.mailer.send(email).await {
        error!(error = ?err, "Contact email delivery failed");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to send message. Please try again.",
        );
    }

    success_response()
}

async fn submit_application(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ApplicationPayload>,
) -> Response {
    let client = client_identifier(&headers);
    if let Some(rejection) = abuse_checks(
        &state,
        &client,
        "careers",
        &payload.honeypot,
        payload.form_load_time,
    )
    .await
    {
        return rejection;
    }

    let outcome = validate_job_application(&payload.form);
    if !outcome.is_valid() {
        return validation_failure(outcome.errors);
    }
    let application = outcome.payload;

    let resume_url = payload.resume_url.trim();
    let record = ApplicationRecord {
        position_id: sanitize_string(&payload.position_id, false),
        position_title: sanitize_string(&payload.position_title, false),
        department: sanitize_string(&payload.department, false),
        first_name: application.first_name,
        last_name: application.last_name,
        email: application.email,
        phone: (!application.phone.is_empty()).then_some(application.phone),
        cover_letter: application.cover_letter,
        resume_url: (!resume_url.is_empty()).then(|| resume_url.to_owned()),
        applied_at: Utc::now().to_rfc3339(),
    };

    if let Err(err) = state.store.insert(record).await {
        error!(error = ?err, "Job application persistence failed");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to submit application. Please try again.",
        );
    }

    success_response()
}
