pub mod models;
pub mod routes;
mod convert;

use actix_web::{web, Scope};

pub fn services() -> Scope {
    web::scope("/api")
        .service(routes::ping)
        .service(routes::get_crypto)
}
