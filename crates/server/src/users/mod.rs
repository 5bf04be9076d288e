//! Users
//!
//! A user's own posts, profile fields and avatar reference.

pub mod handlers;

use std::sync::Arc;

use tracing::info;

use crate::core::error::{Error, Result};
use crate::core::files::FileStore;
use crate::core::models::{Post, PostFilter, UpdateUserDto, User, UserChanges};
use crate::core::store::Store;

pub struct UserService {
    store: Arc<dyn Store>,
    files: FileStore,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, files: FileStore) -> Self {
        Self { store, files }
    }

    pub async fn get_all_users_posts(&self, user_id: i64) -> Result<Vec<Post>> {
        self.store.find_posts(&PostFilter::by_author(user_id)).await
    }

    /// Only matches posts owned by `user_id`.
    pub async fn get_users_post_by_id(&self, user_id: i64, post_id: &str) -> Result<Post> {
        self.store
            .find_post(&PostFilter::by_id(post_id).and_author(user_id))
            .await?
            .ok_or_else(|| Error::NotFound(format!("Post {}", post_id)))
    }

    pub async fn get_user(&self, user_id: i64) -> Result<User> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| user_not_found(user_id))
    }

    pub async fn update_user(&self, user_id: i64, dto: UpdateUserDto) -> Result<User> {
        let user = self
            .store
            .update_user(user_id, UserChanges::from(dto))
            .await?
            .ok_or_else(|| user_not_found(user_id))?;

        info!("[Users] Profile updated for {}", user_id);
        Ok(user)
    }

    /// The file must already be at `file_path`.
    pub async fn upload_avatar(&self, user_id: i64, file_path: String) -> Result<User> {
        self.store
            .update_user(user_id, UserChanges::avatar(Some(file_path)))
            .await?
            .ok_or_else(|| user_not_found(user_id))
    }

    /// Clears the avatar reference only; see [`Self::remove_avatar_file`].
    pub async fn delete_avatar(&self, user_id: i64) -> Result<User> {
        self.store
            .update_user(user_id, UserChanges::avatar(None))
            .await?
            .ok_or_else(|| user_not_found(user_id))
    }

    /// Best-effort removal of the current avatar file. Call before the
    /// reference is replaced or cleared.
    pub async fn remove_avatar_file(&self, user_id: i64) -> Result<()> {
        let user = self.get_user(user_id).await?;
        if let Some(path) = user.avatar.as_deref() {
            self.files.remove_best_effort(path).await;
        }
        Ok(())
    }
}

fn user_not_found(user_id: i64) -> Error {
    Error::NotFound(format!("User {}", user_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AVATARS_DEST;
    use crate::core::models::{NewPost, NewUser};
    use crate::core::store::MemoryStore;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, FileStore, Arc<MemoryStore>, UserService, User) {
        let dir = TempDir::new().unwrap();
        let files = FileStore::new(dir.path());
        let store = Arc::new(MemoryStore::new());
        let user = store
            .insert_user(NewUser {
                email: "ada@example.com".into(),
                first_name: Some("Ada".into()),
                last_name: None,
            })
            .await
            .unwrap();
        let service = UserService::new(store.clone(), files.clone());
        (dir, files, store, service, user)
    }

    fn post(id: &str, author_id: i64) -> NewPost {
        NewPost {
            id: id.into(),
            title: id.into(),
            content: String::new(),
            author_id,
            thumbnail: None,
        }
    }

    #[tokio::test]
    async fn test_users_posts_scoped_to_owner() {
        let (_dir, _files, store, service, ada) = setup().await;
        let other = store
            .insert_user(NewUser {
                email: "other@example.com".into(),
                ..NewUser::default()
            })
            .await
            .unwrap();
        store.insert_post(post("a", ada.id)).await.unwrap();
        store.insert_post(post("b", other.id)).await.unwrap();

        let mine = service.get_all_users_posts(ada.id).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "a");

        assert_eq!(service.get_users_post_by_id(ada.id, "a").await.unwrap().id, "a");
        assert!(matches!(
            service.get_users_post_by_id(ada.id, "b").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_user_merges_fields() {
        let (_dir, _files, _store, service, ada) = setup().await;

        let updated = service
            .update_user(
                ada.id,
                UpdateUserDto {
                    last_name: Some("Lovelace".into()),
                    ..UpdateUserDto::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.first_name.as_deref(), Some("Ada"));
        assert_eq!(updated.last_name.as_deref(), Some("Lovelace"));
        assert_eq!(updated.email, "ada@example.com");

        assert!(matches!(
            service.update_user(999, UpdateUserDto::default()).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_avatar_clears_reference_and_file() {
        let (_dir, files, _store, service, ada) = setup().await;
        let path = files.save(AVATARS_DEST, "ada.jpg", b"img").await.unwrap();

        let user = service.upload_avatar(ada.id, path.clone()).await.unwrap();
        assert_eq!(user.avatar.as_deref(), Some("/public/avatars/ada.jpg"));

        // delete_avatar alone only clears the column
        service.remove_avatar_file(ada.id).await.unwrap();
        let user = service.delete_avatar(ada.id).await.unwrap();
        assert!(user.avatar.is_none());
        assert!(!files.exists(&path).await);
    }

    #[tokio::test]
    async fn test_remove_avatar_file_without_avatar_is_noop() {
        let (_dir, _files, _store, service, ada) = setup().await;
        service.remove_avatar_file(ada.id).await.unwrap();
        assert!(matches!(
            service.remove_avatar_file(404).await,
            Err(Error::NotFound(_))
        ));
    }
}
