use super::controller::create_checkout;
use actix_web::web;

pub fn checkout_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/create-checkout", web::post().to(create_checkout));
}
