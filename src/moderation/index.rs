use super::controller::{moderation_queue, set_admin_reply, set_approval};
use crate::middleware::auth::verify_admin_token;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

pub fn moderation_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/admin/comments")
            .wrap(HttpAuthentication::bearer(verify_admin_token))
            .route("", web::get().to(moderation_queue))
            .route("/{comment_id}/approval", web::put().to(set_approval))
            .route("/{comment_id}/reply", web::put().to(set_admin_reply)),
    );
}
