//! Record storage
//!
//! Services talk to the database through the [`Store`] trait so the SQLite
//! backend can be swapped for the in-memory one in tests.

pub mod memory_store;
pub mod sqlite_store;

pub use memory_store::MemoryStore;
pub use sqlite_store::SqliteStore;

use crate::core::error::Result;
use crate::core::models::{NewPost, NewUser, Post, PostChanges, PostFilter, User, UserChanges};
use async_trait::async_trait;

#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// First post matching `filter`.
    async fn find_post(&self, filter: &PostFilter) -> Result<Option<Post>>;
    /// All posts matching `filter`, oldest first.
    async fn find_posts(&self, filter: &PostFilter) -> Result<Vec<Post>>;
    /// Fails with `Conflict` when the id is taken.
    async fn insert_post(&self, post: NewPost) -> Result<Post>;
    /// Returns `None` when no post has this id.
    async fn update_post(&self, id: &str, changes: PostChanges) -> Result<Option<Post>>;
    /// Returns the removed row, `None` when no post has this id.
    async fn delete_post(&self, id: &str) -> Result<Option<Post>>;

    async fn find_user(&self, id: i64) -> Result<Option<User>>;
    async fn insert_user(&self, user: NewUser) -> Result<User>;
    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<User>>;
}
