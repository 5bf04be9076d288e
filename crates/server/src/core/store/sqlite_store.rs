//! SQLite-backed store
//!
//! Tables are created on startup if missing. Timestamps are stored as
//! RFC 3339 text.

use super::Store;
use crate::core::error::Result;
use crate::core::models::{NewPost, NewUser, Post, PostChanges, PostFilter, User, UserChanges};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

const POST_COLUMNS: &str = "id, title, content, author_id, thumbnail, created_at, updated_at";
const USER_COLUMNS: &str = "id, email, first_name, last_name, avatar, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to `database_url`, creating the file and tables if missing.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        let store = Self { pool };
        store.init_db().await?;

        info!("[Store] SQLite ready at {}", database_url);

        Ok(store)
    }

    /// Private in-memory database, one connection kept alive for the pool's lifetime.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_db().await?;
        Ok(store)
    }

    async fn init_db(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT UNIQUE NOT NULL,
                first_name TEXT,
                last_name TEXT,
                avatar TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                author_id INTEGER NOT NULL,
                thumbnail TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (author_id) REFERENCES users(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_posts_author ON posts(author_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn find_post(&self, filter: &PostFilter) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts
             WHERE (?1 IS NULL OR id = ?1) AND (?2 IS NULL OR author_id = ?2)
             LIMIT 1"
        ))
        .bind(filter.id.as_deref())
        .bind(filter.author_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn find_posts(&self, filter: &PostFilter) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts
             WHERE (?1 IS NULL OR id = ?1) AND (?2 IS NULL OR author_id = ?2)
             ORDER BY created_at, id"
        ))
        .bind(filter.id.as_deref())
        .bind(filter.author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post> {
        let now = Utc::now();
        let post = sqlx::query_as::<_, Post>(&format!(
            "INSERT INTO posts (id, title, content, author_id, thumbnail, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING {POST_COLUMNS}"
        ))
        .bind(&post.id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.author_id)
        .bind(&post.thumbnail)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    async fn update_post(&self, id: &str, changes: PostChanges) -> Result<Option<Post>> {
        let (set_thumbnail, thumbnail) = match changes.thumbnail {
            Some(thumbnail) => (true, thumbnail),
            None => (false, None),
        };

        let post = sqlx::query_as::<_, Post>(&format!(
            "UPDATE posts SET
                title = COALESCE(?1, title),
                content = COALESCE(?2, content),
                thumbnail = CASE WHEN ?3 THEN ?4 ELSE thumbnail END,
                updated_at = ?5
             WHERE id = ?6
             RETURNING {POST_COLUMNS}"
        ))
        .bind(changes.title)
        .bind(changes.content)
        .bind(set_thumbnail)
        .bind(thumbnail)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn delete_post(&self, id: &str) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "DELETE FROM posts WHERE id = ? RETURNING {POST_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let now = Utc::now();
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, first_name, last_name, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<User>> {
        let (set_avatar, avatar) = match changes.avatar {
            Some(avatar) => (true, avatar),
            None => (false, None),
        };

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET
                email = COALESCE(?1, email),
                first_name = COALESCE(?2, first_name),
                last_name = COALESCE(?3, last_name),
                avatar = CASE WHEN ?4 THEN ?5 ELSE avatar END,
                updated_at = ?6
             WHERE id = ?7
             RETURNING {USER_COLUMNS}"
        ))
        .bind(changes.email)
        .bind(changes.first_name)
        .bind(changes.last_name)
        .bind(set_avatar)
        .bind(avatar)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Error;

    async fn seeded() -> (SqliteStore, User) {
        let store = SqliteStore::in_memory().await.unwrap();
        let user = store
            .insert_user(NewUser {
                email: "ada@example.com".into(),
                ..NewUser::default()
            })
            .await
            .unwrap();
        (store, user)
    }

    fn new_post(id: &str, author_id: i64) -> NewPost {
        NewPost {
            id: id.into(),
            title: "Title".into(),
            content: "Body".into(),
            author_id,
            thumbnail: Some("/public/thumbnails/a.jpg".into()),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_post() {
        let (store, user) = seeded().await;
        store.insert_post(new_post("p1", user.id)).await.unwrap();

        let found = store.find_post(&PostFilter::by_id("p1")).await.unwrap().unwrap();
        assert_eq!(found.author_id, user.id);
        assert_eq!(found.thumbnail.as_deref(), Some("/public/thumbnails/a.jpg"));

        let missing = store
            .find_post(&PostFilter::by_id("p1").and_author(user.id + 1))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_post_id_is_conflict() {
        let (store, user) = seeded().await;
        store.insert_post(new_post("same", user.id)).await.unwrap();

        let err = store.insert_post(new_post("same", user.id)).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_post_keeps_unset_columns() {
        let (store, user) = seeded().await;
        store.insert_post(new_post("p1", user.id)).await.unwrap();

        let updated = store
            .update_post(
                "p1",
                PostChanges {
                    content: Some("New body".into()),
                    ..PostChanges::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Title");
        assert_eq!(updated.content, "New body");
        assert_eq!(updated.thumbnail.as_deref(), Some("/public/thumbnails/a.jpg"));

        let cleared = store
            .update_post(
                "p1",
                PostChanges {
                    thumbnail: Some(None),
                    ..PostChanges::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(cleared.thumbnail.is_none());

        assert!(store
            .update_post("nope", PostChanges::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_post_returns_row() {
        let (store, user) = seeded().await;
        store.insert_post(new_post("p1", user.id)).await.unwrap();

        let deleted = store.delete_post("p1").await.unwrap().unwrap();
        assert_eq!(deleted.id, "p1");
        assert!(store.delete_post("p1").await.unwrap().is_none());
        assert!(store.find_posts(&PostFilter::all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_user_avatar_and_email_conflict() {
        let (store, user) = seeded().await;
        store
            .insert_user(NewUser {
                email: "grace@example.com".into(),
                ..NewUser::default()
            })
            .await
            .unwrap();

        let with_avatar = store
            .update_user(user.id, UserChanges::avatar(Some("/public/avatars/x.jpg".into())))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(with_avatar.avatar.as_deref(), Some("/public/avatars/x.jpg"));

        let err = store
            .update_user(
                user.id,
                UserChanges {
                    email: Some("grace@example.com".into()),
                    ..UserChanges::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }
}
