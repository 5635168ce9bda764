use super::error::ApiError;
use super::not_found;
use crate::constants::MAX_PAYLOAD_BYTES;
use crate::store::ScoreStore;
use actix_web::web::{self, Bytes, Data, Json};
use actix_web::{Responder, Result};
use chrono::Utc;
use util::ScoreSubmission;

pub mod util;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .app_data(web::PayloadConfig::new(MAX_PAYLOAD_BYTES))
            .route(web::get().to(get_scores))
            .route(web::post().to(add_score))
            .default_service(web::to(not_found)),
    );
}

async fn get_scores(store: Data<dyn ScoreStore>) -> Result<impl Responder, ApiError> {
    let leaderboard = web::block(move || util::get_scores(store.get_ref())).await??;
    Ok(Json(leaderboard))
}

async fn add_score(
    body: Result<Bytes, actix_web::Error>,
    store: Data<dyn ScoreStore>,
) -> Result<impl Responder, ApiError> {
    // An unreadable or oversized body is reported like any other malformed one
    let body = body.map_err(|err| {
        log::debug!("Unreadable score submission body: {}", err);
        ApiError::InvalidPayload
    })?;
    let submission = ScoreSubmission::parse(&body).map_err(|err| {
        log::debug!("Rejected score submission: {}", err);
        err
    })?;
    let name = submission.name.clone();
    let score = submission.score;
    let leaderboard =
        web::block(move || util::add_score(store.get_ref(), submission, Utc::now())).await??;
    log::info!("Recorded score {} for {}", score, name);
    Ok(Json(leaderboard))
}
