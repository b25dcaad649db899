//! Sign-in, sign-up and sign-out, relayed to the identity provider.
//!
//! On success the access token is kept in the cookie session under
//! `access_token`; API clients may use the returned token as a bearer instead.

use super::error::render_error;
use crate::constants::ACCESS_TOKEN_KEY;
use crate::middleware::client_ctx::{access_token_from_request, IdentityData};
use actix_session::Session;
use actix_web::http::StatusCode;
use actix_web::{error, post, web, Error, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use validator::{Validate, ValidationError};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(sign_in).service(sign_up).service(sign_out);
}

#[derive(Deserialize, Validate)]
pub struct SignInFormData {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 1000))]
    pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct SignUpFormData {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 1000))]
    pub password: String,
    #[validate(custom = "validate_display_name")]
    pub display_name: String,
}

/// Display names are stored trimmed, so they are measured trimmed.
fn validate_display_name(display_name: &str) -> Result<(), ValidationError> {
    let len = display_name.trim().chars().count();
    if len == 0 || len > 255 {
        return Err(ValidationError::new("display_name_length"));
    }
    Ok(())
}

fn remember_token(session: &Session, access_token: &str) -> Result<(), Error> {
    session.renew();
    session.insert(ACCESS_TOKEN_KEY, access_token).map_err(|e| {
        log::error!("Unable to store access token in session: {}", e);
        error::ErrorInternalServerError("Failed to start session")
    })
}

#[post("/api/auth/sign_in")]
pub async fn sign_in(
    identity: IdentityData,
    session: Session,
    form: web::Json<SignInFormData>,
) -> Result<impl Responder, Error> {
    if let Err(e) = form.validate() {
        log::debug!("Sign-in validation failed: {}", e);
        return Ok(render_error(StatusCode::BAD_REQUEST, "Invalid email or password."));
    }

    let email = form.email.trim().to_lowercase();
    let auth = identity.sign_in(&email, &form.password).await?;
    remember_token(&session, &auth.access_token)?;

    log::info!("User {} signed in", auth.actor.id().unwrap_or_default());
    Ok(HttpResponse::Ok().json(auth))
}

#[post("/api/auth/sign_up")]
pub async fn sign_up(
    identity: IdentityData,
    session: Session,
    form: web::Json<SignUpFormData>,
) -> Result<impl Responder, Error> {
    if let Err(e) = form.validate() {
        log::debug!("Sign-up validation failed: {}", e);
        return Ok(render_error(StatusCode::BAD_REQUEST, "Invalid registration data."));
    }

    let email = form.email.trim().to_lowercase();
    let display_name = form.display_name.trim();

    match identity
        .sign_up(&email, &form.password, display_name)
        .await?
    {
        Some(auth) => {
            remember_token(&session, &auth.access_token)?;
            log::info!("User {} signed up", auth.actor.id().unwrap_or_default());
            Ok(HttpResponse::Created().json(auth))
        }
        None => Ok(HttpResponse::Accepted().json(serde_json::json!({
            "notice": "Check your email to confirm your account."
        }))),
    }
}

#[post("/api/auth/sign_out")]
pub async fn sign_out(
    req: HttpRequest,
    identity: IdentityData,
    session: Session,
) -> Result<impl Responder, Error> {
    // Signing out never resolves the actor, so it works while the provider is down.
    if let Some(token) = access_token_from_request(&req) {
        // The local session ends regardless of what the provider says.
        if let Err(e) = identity.sign_out(&token).await {
            log::warn!("Identity provider sign-out failed: {}", e);
        }
    } else {
        log::debug!("sign_out: missing token (already signed out?)");
    }

    session.purge();
    Ok(HttpResponse::NoContent().finish())
}
