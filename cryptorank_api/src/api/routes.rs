use actix_web::{Responder, HttpResponse, web, get};
use chrono::Utc;

use cryptorank_data::MarketSourceRef;
use crate::api::convert::ToResponse;
use crate::api::models::{ResponseStatus, PingResponse};
use crate::snapshot;

#[get("/ping")]
pub async fn ping() -> impl Responder {
    let now = Utc::now();
    HttpResponse::Ok().json(PingResponse {
        status: ResponseStatus::Success,
        timestamp: now,
    })
}

#[get("/crypto")]
pub async fn get_crypto(source: web::Data<MarketSourceRef>) -> impl Responder {
    let result =
        snapshot::take_snapshot_json(source.get_ref().as_ref())
            .await;

    let body = match result {
        Ok(x) => x,
        Err(e) => return e.to_response(),
    };

    HttpResponse::Ok()
        .content_type("application/json")
        .body(body)
}
