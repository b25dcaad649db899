//! Poll and voting endpoints

use super::StoreData;
use crate::error::PollError;
use crate::ledger;
use crate::lifecycle;
use crate::middleware::ClientCtx;
use crate::policy::can_mutate_poll;
use crate::storage::Poll;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // `mine` must come before `{poll_id}`.
    conf.service(create_poll)
        .service(view_own_polls)
        .service(view_poll)
        .service(update_poll)
        .service(delete_poll)
        .service(vote_on_poll)
        .service(view_results);
}

/// Body of create and update. Missing fields arrive as null and are
/// rejected by validation.
#[derive(Debug, Deserialize)]
pub struct PollFormData {
    #[serde(default)]
    pub question: Value,
    #[serde(default)]
    pub options: Value,
}

#[derive(Debug, Deserialize)]
pub struct VoteFormData {
    #[serde(default)]
    pub option_index: Value,
}

/// A poll as shown to a reader.
#[derive(Debug, Serialize)]
pub struct PollView {
    #[serde(flatten)]
    pub poll: Poll,
    /// Whether the reader may edit or delete it
    pub is_owner: bool,
}

#[post("/api/polls")]
pub async fn create_poll(
    client: ClientCtx,
    store: StoreData,
    form: web::Json<PollFormData>,
) -> Result<impl Responder, PollError> {
    let poll = lifecycle::create_poll(
        store.get_ref().as_ref(),
        client.actor(),
        &form.question,
        &form.options,
    )
    .await?;

    Ok(HttpResponse::Created().json(poll))
}

#[get("/api/polls/mine")]
pub async fn view_own_polls(
    client: ClientCtx,
    store: StoreData,
) -> Result<impl Responder, PollError> {
    let listing = lifecycle::list_own_polls(store.get_ref().as_ref(), client.actor()).await?;
    Ok(HttpResponse::Ok().json(listing))
}

#[get("/api/polls/{poll_id}")]
pub async fn view_poll(
    client: ClientCtx,
    store: StoreData,
    path: web::Path<String>,
) -> Result<impl Responder, PollError> {
    let poll_id = Value::String(path.into_inner());
    let poll = lifecycle::fetch_poll(store.get_ref().as_ref(), &poll_id).await?;
    let is_owner = can_mutate_poll(client.actor(), &poll.owner_id);

    Ok(HttpResponse::Ok().json(PollView { poll, is_owner }))
}

#[put("/api/polls/{poll_id}")]
pub async fn update_poll(
    client: ClientCtx,
    store: StoreData,
    path: web::Path<String>,
    form: web::Json<PollFormData>,
) -> Result<impl Responder, PollError> {
    let poll_id = Value::String(path.into_inner());
    lifecycle::update_poll(
        store.get_ref().as_ref(),
        client.actor(),
        &poll_id,
        &form.question,
        &form.options,
    )
    .await?;

    Ok(HttpResponse::NoContent().finish())
}

#[delete("/api/polls/{poll_id}")]
pub async fn delete_poll(
    client: ClientCtx,
    store: StoreData,
    path: web::Path<String>,
) -> Result<impl Responder, PollError> {
    let poll_id = Value::String(path.into_inner());
    lifecycle::delete_poll(store.get_ref().as_ref(), client.actor(), &poll_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

#[post("/api/polls/{poll_id}/vote")]
pub async fn vote_on_poll(
    client: ClientCtx,
    store: StoreData,
    path: web::Path<String>,
    form: web::Json<VoteFormData>,
) -> Result<impl Responder, PollError> {
    let poll_id = Value::String(path.into_inner());
    ledger::submit_vote(
        store.get_ref().as_ref(),
        &poll_id,
        &form.option_index,
        client.actor(),
    )
    .await?;

    Ok(HttpResponse::Created().finish())
}

#[get("/api/polls/{poll_id}/results")]
pub async fn view_results(
    client: ClientCtx,
    store: StoreData,
    path: web::Path<String>,
) -> Result<impl Responder, PollError> {
    let poll_id = Value::String(path.into_inner());
    let results =
        ledger::compute_results(store.get_ref().as_ref(), &poll_id, client.actor()).await?;

    Ok(HttpResponse::Ok().json(results))
}
