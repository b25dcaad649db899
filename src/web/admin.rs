//! Administrator endpoints
//!
//! Access is decided by the administrator allow-list in `Policy`, never by
//! anything the client sends.

use super::StoreData;
use crate::error::PollError;
use crate::lifecycle;
use crate::middleware::ClientCtx;
use crate::policy::Policy;
use actix_web::{delete, get, web, web::Data, HttpResponse, Responder};
use serde_json::Value;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_all_polls).service(delete_any_poll);
}

/// Every poll, newest first. Non-administrators get an empty listing with a notice.
#[get("/api/admin/polls")]
pub async fn view_all_polls(
    client: ClientCtx,
    store: StoreData,
    policy: Data<Policy>,
) -> Result<impl Responder, PollError> {
    let listing =
        lifecycle::list_all_polls(store.get_ref().as_ref(), &policy, client.actor()).await?;
    Ok(HttpResponse::Ok().json(listing))
}

#[delete("/api/admin/polls/{poll_id}")]
pub async fn delete_any_poll(
    client: ClientCtx,
    store: StoreData,
    policy: Data<Policy>,
    path: web::Path<String>,
) -> Result<impl Responder, PollError> {
    let poll_id = Value::String(path.into_inner());
    lifecycle::delete_poll_as_administrator(
        store.get_ref().as_ref(),
        &policy,
        client.actor(),
        &poll_id,
    )
    .await?;

    Ok(HttpResponse::NoContent().finish())
}
