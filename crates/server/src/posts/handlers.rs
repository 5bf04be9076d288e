//! Post handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};
use validator::Validate;

use crate::core::config::{AppState, THUMBNAILS_DEST};
use crate::core::ctx::Ctx;
use crate::core::error::{Error, Result};
use crate::core::files::{post_file_name, random_jpg_name};
use crate::core::models::{CreatePostDto, Post, UpdatePostDto};
use crate::core::upload::{Thumbnail, UploadForm};
use crate::posts::slug_id;

/// GET /posts
pub async fn get_all_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>> {
    info!("GET /posts");
    Ok(Json(state.posts.get_all_posts().await?))
}

/// GET /posts/{id}
pub async fn get_post_by_id(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<Post>> {
    info!("GET /posts/{}", post_id);
    Ok(Json(state.posts.get_post_by_id(&post_id).await?))
}

/// POST /posts
pub async fn create_post(
    State(state): State<AppState>,
    ctx: Ctx,
    mut form: UploadForm<Thumbnail>,
) -> Result<(StatusCode, Json<Post>)> {
    info!("POST /posts - user {}", ctx.user_id());

    let dto = CreatePostDto {
        title: form
            .take_text("title")
            .ok_or_else(|| Error::Validation("Missing `title` field".to_string()))?,
        content: form.take_text("content").unwrap_or_default(),
    };
    dto.validate()?;
    let file = form.require_file()?;

    let post_id = slug_id(&dto.title);
    let filepath = state
        .files
        .save(THUMBNAILS_DEST, &random_jpg_name(), &file.data)
        .await?;

    match state
        .posts
        .create_post(post_id, ctx.user_id(), dto, filepath.clone())
        .await
    {
        Ok(post) => Ok((StatusCode::CREATED, Json(post))),
        Err(e) => {
            // No record references the file
            state.files.remove_best_effort(&filepath).await;
            Err(e)
        }
    }
}

/// PUT /posts/{id}
pub async fn update_post(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(post_id): Path<String>,
    mut form: UploadForm<Thumbnail>,
) -> Result<Json<Post>> {
    info!("PUT /posts/{} - user {}", post_id, ctx.user_id());

    let dto = UpdatePostDto {
        title: form.take_text("title"),
        content: form.take_text("content"),
    };
    dto.validate()?;

    let mut filepath = None;
    if let Some(file) = form.take_file() {
        let filename = post_file_name(&post_id, form.text("filename"))?;

        // Checks ownership before anything touches the disk
        state
            .posts
            .remove_thumbnail_file(ctx.user_id(), &post_id)
            .await?;

        filepath = Some(
            state
                .files
                .save(THUMBNAILS_DEST, &filename, &file.data)
                .await?,
        );
    }

    let post = state
        .posts
        .update_post(ctx.user_id(), &post_id, dto, filepath)
        .await?;

    Ok(Json(post))
}

/// DELETE /posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(post_id): Path<String>,
) -> Result<Json<Post>> {
    info!("DELETE /posts/{} - user {}", post_id, ctx.user_id());

    state
        .posts
        .remove_thumbnail_file(ctx.user_id(), &post_id)
        .await?;
    let post = state.posts.delete_post(ctx.user_id(), &post_id).await?;

    Ok(Json(post))
}

/// DELETE /posts/thumbnail/{id}
pub async fn delete_post_thumbnail(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(post_id): Path<String>,
) -> Result<Json<Post>> {
    info!("DELETE /posts/thumbnail/{} - user {}", post_id, ctx.user_id());

    state
        .posts
        .remove_thumbnail_file(ctx.user_id(), &post_id)
        .await?;
    let post = state
        .posts
        .delete_post_thumbnail(ctx.user_id(), &post_id)
        .await?;

    Ok(Json(post))
}

/// DELETE /posts/tumbnail/{id}
///
/// Misspelled route kept for existing clients.
pub async fn delete_post_thumbnail_legacy(
    state: State<AppState>,
    ctx: Ctx,
    path: Path<String>,
) -> Result<Json<Post>> {
    warn!("DELETE /posts/tumbnail/{} is deprecated, use /posts/thumbnail/{{id}}", path.0);
    delete_post_thumbnail(state, ctx, path).await
}
