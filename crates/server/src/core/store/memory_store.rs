//! In-memory store
//!
//! Same contract as [`super::SqliteStore`], including conflict and
//! unique-email errors. Used by tests and local experiments.

use super::Store;
use crate::core::error::{Error, Result};
use crate::core::models::{NewPost, NewUser, Post, PostChanges, PostFilter, User, UserChanges};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    posts: HashMap<String, Post>,
    users: HashMap<i64, User>,
    next_user_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_post(&self, filter: &PostFilter) -> Result<Option<Post>> {
        Ok(self.find_posts(filter).await?.into_iter().next())
    }

    async fn find_posts(&self, filter: &PostFilter) -> Result<Vec<Post>> {
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .values()
            .filter(|post| filter.matches(post))
            .cloned()
            .collect();
        posts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(posts)
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post> {
        let mut tables = self.tables.write().await;
        if tables.posts.contains_key(&post.id) {
            return Err(Error::Conflict(format!("Post {} already exists", post.id)));
        }
        if !tables.users.contains_key(&post.author_id) {
            return Err(Error::Validation(format!(
                "Author {} does not exist",
                post.author_id
            )));
        }

        let now = Utc::now();
        let post = Post {
            id: post.id,
            title: post.title,
            content: post.content,
            author_id: post.author_id,
            thumbnail: post.thumbnail,
            created_at: now,
            updated_at: now,
        };
        tables.posts.insert(post.id.clone(), post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: &str, changes: PostChanges) -> Result<Option<Post>> {
        let mut tables = self.tables.write().await;
        Ok(tables.posts.get_mut(id).map(|post| {
            changes.apply(post);
            post.clone()
        }))
    }

    async fn delete_post(&self, id: &str) -> Result<Option<Post>> {
        Ok(self.tables.write().await.posts.remove(id))
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(Error::Conflict(format!("Email {} already registered", user.email)));
        }

        tables.next_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: tables.next_user_id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            avatar: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<User>> {
        let mut tables = self.tables.write().await;
        if let Some(email) = &changes.email {
            if tables.users.values().any(|u| u.id != id && &u.email == email) {
                return Err(Error::Conflict(format!("Email {} already in use", email)));
            }
        }

        Ok(tables.users.get_mut(&id).map(|user| {
            changes.apply(user);
            user.clone()
        }))
    }
}
