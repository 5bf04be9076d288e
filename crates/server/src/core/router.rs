//! Router
//!
//! Public reads, bearer-protected mutations, and the static `public/`
//! directory the stored image paths point into.

use crate::core::auth::middleware::mw_require_auth;
use crate::core::AppState;
use crate::{posts, users};
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/posts", get(posts::handlers::get_all_posts))
        .route("/posts/{id}", get(posts::handlers::get_post_by_id))
        .route("/health", get(health_check));

    let protected = Router::new()
        // Posts
        .route("/posts", post(posts::handlers::create_post))
        .route(
            "/posts/{id}",
            put(posts::handlers::update_post).delete(posts::handlers::delete_post),
        )
        .route(
            "/posts/thumbnail/{id}",
            delete(posts::handlers::delete_post_thumbnail),
        )
        .route(
            "/posts/tumbnail/{id}",
            delete(posts::handlers::delete_post_thumbnail_legacy),
        )
        // Users
        .route(
            "/users/me",
            get(users::handlers::me).patch(users::handlers::update_profile),
        )
        .route("/users/me/posts", get(users::handlers::get_my_posts))
        .route("/users/me/posts/{id}", get(users::handlers::get_my_post))
        .route(
            "/users/me/avatar",
            post(users::handlers::upload_avatar).delete(users::handlers::delete_avatar),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            mw_require_auth,
        ));

    let public_dir = state.config.base_dir.join("public");
    let body_limit = state.config.max_upload_bytes();

    public
        .merge(protected)
        .nest_service("/public", ServeDir::new(public_dir))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> &'static str {
    "OK - Quill Server"
}
