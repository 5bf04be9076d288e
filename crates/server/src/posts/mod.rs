//! Posts
//!
//! Post records and their thumbnail references. Ownership and existence are
//! checked here before any mutation; handlers do not re-check.

pub mod handlers;
pub mod slug;

use std::sync::Arc;

use tracing::{info, warn};

use crate::core::error::{Error, Result};
use crate::core::files::FileStore;
use crate::core::models::{CreatePostDto, NewPost, Post, PostChanges, PostFilter, UpdatePostDto};
use crate::core::store::Store;

pub use slug::slug_id;

pub struct PostService {
    store: Arc<dyn Store>,
    files: FileStore,
}

impl PostService {
    pub fn new(store: Arc<dyn Store>, files: FileStore) -> Self {
        Self { store, files }
    }

    pub async fn get_all_posts(&self) -> Result<Vec<Post>> {
        self.store.find_posts(&PostFilter::all()).await
    }

    pub async fn get_post_by_id(&self, id: &str) -> Result<Post> {
        self.store
            .find_post(&PostFilter::by_id(id))
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// The uploaded file must already be at `thumbnail_path`.
    pub async fn create_post(
        &self,
        id: String,
        author_id: i64,
        dto: CreatePostDto,
        thumbnail_path: String,
    ) -> Result<Post> {
        let post = self
            .store
            .insert_post(NewPost {
                id,
                title: dto.title,
                content: dto.content,
                author_id,
                thumbnail: Some(thumbnail_path),
            })
            .await?;

        info!("[Posts] User {} created post {}", author_id, post.id);
        Ok(post)
    }

    pub async fn update_post(
        &self,
        author_id: i64,
        id: &str,
        dto: UpdatePostDto,
        thumbnail_path: Option<String>,
    ) -> Result<Post> {
        self.owned_post(author_id, id).await?;

        let mut changes = PostChanges::from(dto);
        if let Some(path) = thumbnail_path {
            changes.thumbnail = Some(Some(path));
        }

        let post = self
            .store
            .update_post(id, changes)
            .await?
            .ok_or_else(|| not_found(id))?;

        info!("[Posts] User {} updated post {}", author_id, id);
        Ok(post)
    }

    pub async fn delete_post(&self, author_id: i64, id: &str) -> Result<Post> {
        self.owned_post(author_id, id).await?;

        let post = self
            .store
            .delete_post(id)
            .await?
            .ok_or_else(|| not_found(id))?;

        info!("[Posts] User {} deleted post {}", author_id, id);
        Ok(post)
    }

    /// Clears the thumbnail reference; the row stays.
    pub async fn delete_post_thumbnail(&self, author_id: i64, id: &str) -> Result<Post> {
        self.owned_post(author_id, id).await?;

        let changes = PostChanges {
            thumbnail: Some(None),
            ..PostChanges::default()
        };
        self.store
            .update_post(id, changes)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Delete the file behind the post's current thumbnail, if any.
    ///
    /// Must run before any call that clears or overwrites the reference.
    /// File-system failures are logged and swallowed so the record mutation
    /// that follows still happens.
    pub async fn remove_thumbnail_file(&self, author_id: i64, id: &str) -> Result<()> {
        let post = self.owned_post(author_id, id).await?;

        if let Some(path) = post.thumbnail.as_deref() {
            if !self.files.remove_best_effort(path).await {
                warn!("[Posts] Thumbnail of post {} left behind or already gone", id);
            }
        }
        Ok(())
    }

    /// Fetch `id` and check `author_id` owns it.
    async fn owned_post(&self, author_id: i64, id: &str) -> Result<Post> {
        let post = self.get_post_by_id(id).await?;
        if post.author_id != author_id {
            warn!(
                "[Posts] User {} tried to modify post {} owned by {}",
                author_id, id, post.author_id
            );
            return Err(Error::Forbidden(format!(
                "Post {} belongs to another user",
                id
            )));
        }
        Ok(post)
    }
}

fn not_found(id: &str) -> Error {
    Error::NotFound(format!("Post {}", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::THUMBNAILS_DEST;
    use crate::core::models::NewUser;
    use crate::core::store::MemoryStore;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        files: FileStore,
        store: Arc<MemoryStore>,
        service: PostService,
        alice: i64,
        bob: i64,
    }

    async fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let files = FileStore::new(dir.path());
        let store = Arc::new(MemoryStore::new());
        let alice = store
            .insert_user(NewUser {
                email: "alice@example.com".into(),
                ..NewUser::default()
            })
            .await
            .unwrap()
            .id;
        let bob = store
            .insert_user(NewUser {
                email: "bob@example.com".into(),
                ..NewUser::default()
            })
            .await
            .unwrap()
            .id;
        let service = PostService::new(store.clone(), files.clone());
        Fixture {
            _dir: dir,
            files,
            store,
            service,
            alice,
            bob,
        }
    }

    async fn create(fx: &Fixture, title: &str) -> Post {
        let thumb = fx
            .files
            .save(THUMBNAILS_DEST, "thumb.jpg", b"jpeg")
            .await
            .unwrap();
        fx.service
            .create_post(
                slug_id(title),
                fx.alice,
                CreatePostDto {
                    title: title.into(),
                    content: "Hello".into(),
                },
                thumb,
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_missing_post_is_not_found() {
        let fx = fixture().await;
        assert!(matches!(
            fx.service.get_post_by_id("nope").await,
            Err(Error::NotFound(_))
        ));
        assert!(fx.service.get_all_posts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_then_read() {
        let fx = fixture().await;
        let post = create(&fx, "Café Día").await;

        assert!(post.id.starts_with("cafe-dia"));
        assert_eq!(post.author_id, fx.alice);
        assert_eq!(post.thumbnail.as_deref(), Some("/public/thumbnails/thumb.jpg"));
        assert_eq!(fx.service.get_post_by_id(&post.id).await.unwrap(), post);
    }

    #[tokio::test]
    async fn test_duplicate_id_is_conflict() {
        let fx = fixture().await;
        let post = create(&fx, "Dup").await;

        let err = fx
            .service
            .create_post(
                post.id.clone(),
                fx.alice,
                CreatePostDto {
                    title: "Dup".into(),
                    content: String::new(),
                },
                "/public/thumbnails/x.jpg".into(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn test_non_owner_cannot_mutate() {
        let fx = fixture().await;
        let post = create(&fx, "Mine").await;

        let update = fx
            .service
            .update_post(
                fx.bob,
                &post.id,
                UpdatePostDto {
                    title: Some("Stolen".into()),
                    content: None,
                },
                Some("/public/thumbnails/evil.jpg".into()),
            )
            .await;
        assert!(matches!(update, Err(Error::Forbidden(_))));
        assert!(matches!(
            fx.service.delete_post(fx.bob, &post.id).await,
            Err(Error::Forbidden(_))
        ));
        assert!(matches!(
            fx.service.delete_post_thumbnail(fx.bob, &post.id).await,
            Err(Error::Forbidden(_))
        ));
        assert!(matches!(
            fx.service.remove_thumbnail_file(fx.bob, &post.id).await,
            Err(Error::Forbidden(_))
        ));

        let stored = fx.store.find_post(&PostFilter::by_id(&post.id)).await.unwrap();
        assert_eq!(stored, Some(post.clone()));
        assert!(fx.files.exists(post.thumbnail.as_deref().unwrap()).await);
    }

    #[tokio::test]
    async fn test_update_merges_fields_and_thumbnail() {
        let fx = fixture().await;
        let post = create(&fx, "Draft").await;

        let updated = fx
            .service
            .update_post(
                fx.alice,
                &post.id,
                UpdatePostDto {
                    title: None,
                    content: Some("Edited".into()),
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(updated.id, post.id);
        assert_eq!(updated.title, "Draft");
        assert_eq!(updated.content, "Edited");
        assert_eq!(updated.thumbnail, post.thumbnail);

        let updated = fx
            .service
            .update_post(
                fx.alice,
                &post.id,
                UpdatePostDto::default(),
                Some("/public/thumbnails/new.jpg".into()),
            )
            .await
            .unwrap();
        assert_eq!(updated.thumbnail.as_deref(), Some("/public/thumbnails/new.jpg"));
        assert_eq!(updated.author_id, fx.alice);
    }

    #[tokio::test]
    async fn test_update_missing_post_is_not_found() {
        let fx = fixture().await;
        let err = fx
            .service
            .update_post(fx.alice, "ghost", UpdatePostDto::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_file_then_record() {
        let fx = fixture().await;
        let post = create(&fx, "Bye").await;
        let thumb = post.thumbnail.clone().unwrap();

        fx.service.remove_thumbnail_file(fx.alice, &post.id).await.unwrap();
        assert!(!fx.files.exists(&thumb).await);

        let deleted = fx.service.delete_post(fx.alice, &post.id).await.unwrap();
        assert_eq!(deleted.id, post.id);
        assert!(matches!(
            fx.service.get_post_by_id(&post.id).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_thumbnail_file_does_not_block_delete() {
        let fx = fixture().await;
        let post = create(&fx, "Orphan").await;
        fx.files.remove(post.thumbnail.as_deref().unwrap()).await.unwrap();

        fx.service.remove_thumbnail_file(fx.alice, &post.id).await.unwrap();
        fx.service.delete_post(fx.alice, &post.id).await.unwrap();
        assert!(fx.service.get_all_posts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_thumbnail_keeps_row() {
        let fx = fixture().await;
        let post = create(&fx, "Keep").await;

        fx.service.remove_thumbnail_file(fx.alice, &post.id).await.unwrap();
        let cleared = fx
            .service
            .delete_post_thumbnail(fx.alice, &post.id)
            .await
            .unwrap();
        assert!(cleared.thumbnail.is_none());
        assert_eq!(cleared.title, "Keep");

        // Nothing left to remove
        fx.service.remove_thumbnail_file(fx.alice, &post.id).await.unwrap();
    }
}
