use crate::comment::service::parse_object_id;
use crate::middleware::auth::get_admin_from_request;
use crate::moderation::service::{ModerationService, ModerationStatus};
use crate::utils::error::CustomError;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct QueueQuery {
    #[serde(default)]
    pub status: ModerationStatus,
}

#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub approved: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminReplyRequest {
    pub admin_reply: String,
    #[serde(default)]
    pub published: bool,
}

fn moderator(req: &HttpRequest) -> String {
    get_admin_from_request(req).unwrap_or_else(|| "unknown".to_string())
}

/// GET /api/admin/comments?status=pending|approved|deleted|all
pub async fn moderation_queue(
    moderation_service: web::Data<ModerationService>,
    query: web::Query<QueueQuery>,
) -> Result<HttpResponse, CustomError> {
    let comments = moderation_service.list_by_status(query.status).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": comments.len(),
        "comments": comments
    })))
}

/// PUT /api/admin/comments/{comment_id}/approval
pub async fn set_approval(
    req: HttpRequest,
    moderation_service: web::Data<ModerationService>,
    path: web::Path<String>,
    body: web::Json<ApprovalRequest>,
) -> Result<HttpResponse, CustomError> {
    let comment_id = parse_object_id(&path.into_inner(), "comment")?;
    moderation_service
        .set_approval(&comment_id, body.approved, &moderator(&req))
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Comment moderation updated"
    })))
}

/// PUT /api/admin/comments/{comment_id}/reply
pub async fn set_admin_reply(
    req: HttpRequest,
    moderation_service: web::Data<ModerationService>,
    path: web::Path<String>,
    body: web::Json<AdminReplyRequest>,
) -> Result<HttpResponse, CustomError> {
    let comment_id = parse_object_id(&path.into_inner(), "comment")?;
    if body.admin_reply.trim().is_empty() {
        return Err(CustomError::BadRequestError(
            "adminReply cannot be empty".to_string(),
        ));
    }

    moderation_service
        .set_admin_reply(&comment_id, &body.admin_reply, body.published, &moderator(&req))
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Official reply saved"
    })))
}
