use super::controller::{
    comment_tree, create_comment, delete_comment, list_comments, update_comment,
};
use actix_web::web;

pub fn comment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/comments")
            .route("", web::get().to(list_comments))
            .route("", web::post().to(create_comment))
            .route("", web::put().to(update_comment))
            .route("", web::delete().to(delete_comment))
            .route("/tree", web::get().to(comment_tree)),
    );
}
