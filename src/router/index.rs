use crate::checkout::index::checkout_routes;
use crate::comment::index::comment_routes;
use crate::forum::index::forum_routes;
use crate::moderation::index::moderation_routes;
use actix_web::web;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(comment_routes);
    cfg.configure(forum_routes);
    cfg.configure(checkout_routes);
    cfg.configure(moderation_routes);
}
