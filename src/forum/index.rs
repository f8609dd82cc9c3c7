use super::controller::{
    create_post, delete_post, get_post, like_post, list_posts, search_posts, update_post,
};
use actix_web::web;

pub fn forum_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/forum")
            .route("", web::get().to(list_posts))
            .route("", web::post().to(create_post))
            .route("", web::put().to(update_post))
            .route("", web::delete().to(delete_post))
            .route("/search", web::get().to(search_posts))
            .route("/{slug}", web::get().to(get_post))
            .route("/{slug}/like", web::post().to(like_post)),
    );
}
