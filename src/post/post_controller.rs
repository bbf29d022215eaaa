use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, web};
use futures_util::StreamExt;
use serde_json::json;

use crate::comment::model::{CommentResponse, CreateCommentRequest};
use crate::middleware::auth::current_user;
use crate::post::post_service::PostService;
use crate::post::post_workflow::{self, ImagePayload};
use crate::uploader::BlobStorage;
use crate::utils::error::CustomError;

fn service_name() -> String {
    std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string())
}

/// Pull the post text and the optional image out of the creation form.
async fn extract_create_form(
    mut payload: Multipart,
) -> Result<(String, Option<ImagePayload>), CustomError> {
    let mut text = String::new();
    let mut image: Option<ImagePayload> = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| {
            CustomError::ValidationError(format!("Error reading multipart field: {e}"))
        })?;

        let content_disposition = match field.content_disposition() {
            Some(cd) => cd,
            None => continue,
        };
        let field_name = content_disposition.get_name().unwrap_or("").to_string();
        let file_name = content_disposition
            .get_filename()
            .map(|f| f.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let content_type = field.content_type().map(|ct| ct.to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| {
                CustomError::ValidationError(format!("Error reading multipart chunk: {e}"))
            })?;
            data.extend_from_slice(&chunk);
        }

        match field_name.as_str() {
            "text" => {
                text = String::from_utf8(data).map_err(|_| {
                    CustomError::ValidationError("Post text must be valid UTF-8".to_string())
                })?;
            }
            "image" => {
                image = Some(ImagePayload {
                    file_name,
                    content_type,
                    data,
                });
            }
            _ => {}
        }
    }

    Ok((text, image))
}

/// Create a post from a multipart form (`text` plus optional `image`)
/// POST /posts
pub async fn create_post(
    req: HttpRequest,
    post_service: web::Data<PostService>,
    blob_storage: web::Data<BlobStorage>,
    payload: Multipart,
) -> Result<HttpResponse, CustomError> {
    let user = current_user(&req).ok();
    let (text, image) = extract_create_form(payload).await?;

    let post = post_workflow::create_post(
        user,
        &text,
        image,
        blob_storage.get_ref(),
        post_service.get_ref(),
    )
    .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Post created successfully",
        "httpStatusCode": 201,
        "service": service_name(),
        "post": post,
    })))
}

/// List every post, newest first, with comments resolved
/// GET /posts
pub async fn get_posts(post_service: web::Data<PostService>) -> Result<HttpResponse, CustomError> {
    let posts = post_service.get_all_posts().await?;
    let count = posts.len();

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Posts fetched successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "count": count,
        "data": posts,
    })))
}

/// PUT /posts/{id}/like
pub async fn like_post(
    req: HttpRequest,
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    let user = current_user(&req)?;
    post_service
        .like_post(&post_id.into_inner(), &user.user_id)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post liked",
        "httpStatusCode": 200,
        "service": service_name(),
    })))
}

/// PUT /posts/{id}/unlike
pub async fn unlike_post(
    req: HttpRequest,
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    let user = current_user(&req)?;
    post_service
        .unlike_post(&post_id.into_inner(), &user.user_id)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post unliked",
        "httpStatusCode": 200,
        "service": service_name(),
    })))
}

/// POST /posts/{id}/comments
pub async fn create_comment(
    req: HttpRequest,
    post_id: web::Path<String>,
    body: web::Json<CreateCommentRequest>,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    let user = current_user(&req)?;
    let comment = post_service
        .comment_on_post(&post_id.into_inner(), user, &body.text)
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Comment created successfully",
        "httpStatusCode": 201,
        "service": service_name(),
        "comment": CommentResponse::from(comment),
    })))
}

/// GET /posts/{id}/comments
pub async fn get_post_comments(
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    let comments = post_service.get_comments(&post_id.into_inner()).await?;
    let count = comments.len();

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Comments fetched successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "count": count,
        "data": comments,
    })))
}

/// DELETE /posts/{id}
pub async fn delete_post(
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    post_service.remove_post(&post_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post deleted successfully",
        "httpStatusCode": 200,
        "service": service_name(),
    })))
}
