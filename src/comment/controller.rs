use crate::comment::model::{
    Comment, CommentListQuery, CommentListResponse, CommentPayload, CommentTreeQuery, DeleteCommentRequest,
};
use crate::comment::render::render_tree;
use crate::comment::service::{CommentService, parse_object_id};
use crate::comment::tree::{build_tree, count_visible, rating_summary};
use crate::forum::service::ForumService;
use crate::utils::error::CustomError;
use crate::utils::helpers::request_language;
use crate::utils::validation::{normalize_comment, validate_comment};
use actix_web::http::header::{CacheControl, CacheDirective};
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

fn require_slug(slug: &str) -> Result<&str, CustomError> {
    let slug = slug.trim();
    if slug.is_empty() {
        return Err(CustomError::BadRequestError("postSlug is required".to_string()));
    }
    Ok(slug)
}

fn require_author_id(author_id: Option<&str>) -> Result<&str, CustomError> {
    author_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| CustomError::BadRequestError("authorId is required".to_string()))
}

/// Flat comment list of one subject
/// GET /api/comments?postSlug=
pub async fn list_comments(
    comment_service: web::Data<CommentService>,
    query: web::Query<CommentListQuery>,
) -> Result<HttpResponse, CustomError> {
    let slug = require_slug(&query.post_slug)?;
    let comments = comment_service
        .get_comments_for_post(slug)
        .await?
        .into_iter()
        .map(Comment::public)
        .collect();

    Ok(HttpResponse::Ok()
        .insert_header(CacheControl(vec![CacheDirective::NoStore]))
        .json(CommentListResponse { comments }))
}

/// Threaded and rendered view of one subject
/// GET /api/comments/tree?postSlug=&authorId=&lang=
pub async fn comment_tree(
    req: HttpRequest,
    comment_service: web::Data<CommentService>,
    query: web::Query<CommentTreeQuery>,
) -> Result<HttpResponse, CustomError> {
    let slug = require_slug(&query.post_slug)?;
    let lang = request_language(&req, query.lang.as_deref());

    let comments = comment_service.get_comments_for_post(slug).await?;
    let tree = build_tree(&comments);
    let views = render_tree(&tree, query.author_id.as_deref(), lang);

    Ok(HttpResponse::Ok()
        .insert_header(CacheControl(vec![CacheDirective::NoStore]))
        .json(json!({
            "postSlug": slug,
            "count": count_visible(&tree),
            "rating": rating_summary(&comments),
            "comments": views
        })))
}

/// Create a comment or a reply
/// POST /api/comments
pub async fn create_comment(
    req: HttpRequest,
    comment_service: web::Data<CommentService>,
    forum_service: web::Data<ForumService>,
    body: web::Json<CommentPayload>,
) -> Result<HttpResponse, CustomError> {
    let lang = request_language(&req, None);
    let payload = normalize_comment(body.into_inner());
    let slug = require_slug(&payload.post_slug)?.to_string();
    validate_comment(&payload).map_err(|e| CustomError::validation(e, lang))?;
    let author_id = require_author_id(payload.author_id.as_deref())?;

    let comment_id = comment_service.add_comment(&payload, author_id).await?;
    forum_service.record_reply(&slug).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Comment created successfully",
        "httpStatusCode": 201,
        "commentId": comment_id.to_hex()
    })))
}

/// Edit one's own comment
/// PUT /api/comments
pub async fn update_comment(
    req: HttpRequest,
    comment_service: web::Data<CommentService>,
    body: web::Json<CommentPayload>,
) -> Result<HttpResponse, CustomError> {
    let lang = request_language(&req, None);
    let payload = normalize_comment(body.into_inner());
    validate_comment(&payload).map_err(|e| CustomError::validation(e, lang))?;
    let author_id = require_author_id(payload.author_id.as_deref())?;

    let comment_id = payload
        .comment_id
        .as_deref()
        .ok_or_else(|| CustomError::BadRequestError("commentId is required".to_string()))?;
    let comment_id = parse_object_id(comment_id, "comment")?;

    comment_service
        .update_comment(&comment_id, author_id, &payload)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Comment updated successfully",
        "httpStatusCode": 200
    })))
}

/// Soft-delete one's own comment
/// DELETE /api/comments
pub async fn delete_comment(
    comment_service: web::Data<CommentService>,
    body: web::Json<DeleteCommentRequest>,
) -> Result<HttpResponse, CustomError> {
    let author_id = require_author_id(Some(&body.author_id))?;
    let comment_id = parse_object_id(&body.comment_id, "comment")?;

    comment_service.delete_comment(&comment_id, author_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Comment deleted successfully",
        "httpStatusCode": 200
    })))
}
