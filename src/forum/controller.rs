use crate::comment::service::parse_object_id;
use crate::forum::model::{
    DeleteForumPostRequest, ForumCategory, ForumListQuery, ForumListResponse, ForumPostPayload,
    ForumSearchQuery,
};
use crate::forum::service::ForumService;
use crate::utils::error::CustomError;
use crate::utils::helpers::request_language;
use crate::utils::validation::{ValidationError, validate_forum_post};
use actix_web::http::header::{CacheControl, CacheDirective};
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

/// Optional category filter from a query string. Unknown names are a 400 so
/// a typo doesn't silently return everything.
fn category_filter(raw: Option<&str>, req: &HttpRequest) -> Result<Option<ForumCategory>, CustomError> {
    match raw.map(str::trim).filter(|c| !c.is_empty() && *c != "all") {
        None => Ok(None),
        Some(c) => ForumCategory::parse(c).map(Some).ok_or_else(|| {
            CustomError::validation(
                ValidationError::UnknownCategory(c.to_string()),
                request_language(req, None),
            )
        }),
    }
}

fn require_author_id(author_id: Option<&str>) -> Result<&str, CustomError> {
    author_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| CustomError::BadRequestError("authorId is required".to_string()))
}

/// GET /api/forum?category=&page=&limit=
pub async fn list_posts(
    req: HttpRequest,
    forum_service: web::Data<ForumService>,
    query: web::Query<ForumListQuery>,
) -> Result<HttpResponse, CustomError> {
    let category = category_filter(query.category.as_deref(), &req)?;
    let posts = forum_service
        .list_posts(category, query.page, query.limit)
        .await?;

    Ok(HttpResponse::Ok()
        .insert_header(CacheControl(vec![CacheDirective::NoStore]))
        .json(ForumListResponse { posts }))
}

/// GET /api/forum/search?q=&category=
pub async fn search_posts(
    req: HttpRequest,
    forum_service: web::Data<ForumService>,
    query: web::Query<ForumSearchQuery>,
) -> Result<HttpResponse, CustomError> {
    let category = category_filter(query.category.as_deref(), &req)?;
    let posts = forum_service
        .search_posts(query.q.as_deref(), category)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "query": query.q.as_deref().unwrap_or(""),
        "count": posts.len(),
        "posts": posts
    })))
}

/// GET /api/forum/{slug}
pub async fn get_post(
    forum_service: web::Data<ForumService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let post = forum_service
        .view_post(&path.into_inner())
        .await?
        .ok_or_else(|| CustomError::NotFoundError("Post not found".to_string()))?;

    Ok(HttpResponse::Ok()
        .insert_header(CacheControl(vec![CacheDirective::NoStore]))
        .json(json!({ "post": post })))
}

/// POST /api/forum
pub async fn create_post(
    req: HttpRequest,
    forum_service: web::Data<ForumService>,
    body: web::Json<ForumPostPayload>,
) -> Result<HttpResponse, CustomError> {
    let lang = request_language(&req, None);
    let category = validate_forum_post(&body).map_err(|e| CustomError::validation(e, lang))?;
    let author_id = require_author_id(body.author_id.as_deref())?;

    let post = forum_service.create_post(&body, category, author_id).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Post created successfully",
        "httpStatusCode": 201,
        "post": post
    })))
}

/// PUT /api/forum
pub async fn update_post(
    req: HttpRequest,
    forum_service: web::Data<ForumService>,
    body: web::Json<ForumPostPayload>,
) -> Result<HttpResponse, CustomError> {
    let lang = request_language(&req, None);
    let category = validate_forum_post(&body).map_err(|e| CustomError::validation(e, lang))?;
    let author_id = require_author_id(body.author_id.as_deref())?;
    let post_id = body
        .post_id
        .as_deref()
        .ok_or_else(|| CustomError::BadRequestError("postId is required".to_string()))?;
    let post_id = parse_object_id(post_id, "post")?;

    forum_service
        .update_post(&post_id, author_id, &body, category)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post updated successfully",
        "httpStatusCode": 200
    })))
}

/// DELETE /api/forum
pub async fn delete_post(
    forum_service: web::Data<ForumService>,
    body: web::Json<DeleteForumPostRequest>,
) -> Result<HttpResponse, CustomError> {
    let author_id = require_author_id(Some(&body.author_id))?;
    let post_id = parse_object_id(&body.post_id, "post")?;

    forum_service.delete_post(&post_id, author_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post deleted successfully",
        "httpStatusCode": 200
    })))
}

/// POST /api/forum/{slug}/like
pub async fn like_post(
    forum_service: web::Data<ForumService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let likes = forum_service.like_post(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post liked",
        "likes": likes
    })))
}
