//! User handlers, all scoped to the authenticated user

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;
use validator::Validate;

use crate::core::config::{AppState, AVATARS_DEST};
use crate::core::ctx::Ctx;
use crate::core::error::Result;
use crate::core::files::random_jpg_name;
use crate::core::models::{Post, UpdateUserDto, User};
use crate::core::upload::{Avatar, UploadForm};

/// GET /users/me
pub async fn me(State(state): State<AppState>, ctx: Ctx) -> Result<Json<User>> {
    info!("GET /users/me - user {}", ctx.user_id());
    let user = state.users.get_user(ctx.user_id()).await?;
    Ok(Json(user))
}

/// PATCH /users/me
pub async fn update_profile(
    State(state): State<AppState>,
    ctx: Ctx,
    Json(dto): Json<UpdateUserDto>,
) -> Result<Json<User>> {
    info!("PATCH /users/me - user {}", ctx.user_id());
    dto.validate()?;

    let user = state.users.update_user(ctx.user_id(), dto).await?;
    Ok(Json(user))
}

/// GET /users/me/posts
pub async fn get_my_posts(State(state): State<AppState>, ctx: Ctx) -> Result<Json<Vec<Post>>> {
    info!("GET /users/me/posts - user {}", ctx.user_id());
    Ok(Json(state.users.get_all_users_posts(ctx.user_id()).await?))
}

/// GET /users/me/posts/{id}
pub async fn get_my_post(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(post_id): Path<String>,
) -> Result<Json<Post>> {
    info!("GET /users/me/posts/{} - user {}", post_id, ctx.user_id());
    let post = state
        .users
        .get_users_post_by_id(ctx.user_id(), &post_id)
        .await?;
    Ok(Json(post))
}

/// POST /users/me/avatar
pub async fn upload_avatar(
    State(state): State<AppState>,
    ctx: Ctx,
    mut form: UploadForm<Avatar>,
) -> Result<Json<User>> {
    info!("POST /users/me/avatar - user {}", ctx.user_id());

    let file = form.require_file()?;

    state.users.remove_avatar_file(ctx.user_id()).await?;
    let filepath = state
        .files
        .save(AVATARS_DEST, &random_jpg_name(), &file.data)
        .await?;

    let user = state.users.upload_avatar(ctx.user_id(), filepath).await?;
    Ok(Json(user))
}

/// DELETE /users/me/avatar
pub async fn delete_avatar(State(state): State<AppState>, ctx: Ctx) -> Result<Json<User>> {
    info!("DELETE /users/me/avatar - user {}", ctx.user_id());

    state.users.remove_avatar_file(ctx.user_id()).await?;
    let user = state.users.delete_avatar(ctx.user_id()).await?;
    Ok(Json(user))
}
