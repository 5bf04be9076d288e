use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A registered user. Rows are created by the registration flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Public path of the avatar image, `None` when no avatar is set
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A blog post. `id` is the slug derived from the title at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    /// Public path of the thumbnail image, `None` when cleared
    pub thumbnail: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePostDto {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePostDto {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserDto {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
}

/// Row to insert for a new post
#[derive(Debug, Clone)]
pub struct NewPost {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub thumbnail: Option<String>,
}

/// Row to insert for a new user
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Partial update of a post. `None` leaves a column untouched; for
/// `thumbnail`, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub thumbnail: Option<Option<String>>,
}

impl PostChanges {
    pub fn apply(self, post: &mut Post) {
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(content) = self.content {
            post.content = content;
        }
        if let Some(thumbnail) = self.thumbnail {
            post.thumbnail = thumbnail;
        }
        post.updated_at = Utc::now();
    }
}

impl From<UpdatePostDto> for PostChanges {
    fn from(dto: UpdatePostDto) -> Self {
        Self {
            title: dto.title,
            content: dto.content,
            thumbnail: None,
        }
    }
}

/// Partial update of a user, same conventions as [`PostChanges`].
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<Option<String>>,
}

impl UserChanges {
    pub fn avatar(avatar: Option<String>) -> Self {
        Self {
            avatar: Some(avatar),
            ..Self::default()
        }
    }

    pub fn apply(self, user: &mut User) {
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(first_name) = self.first_name {
            user.first_name = Some(first_name);
        }
        if let Some(last_name) = self.last_name {
            user.last_name = Some(last_name);
        }
        if let Some(avatar) = self.avatar {
            user.avatar = avatar;
        }
        user.updated_at = Utc::now();
    }
}

impl From<UpdateUserDto> for UserChanges {
    fn from(dto: UpdateUserDto) -> Self {
        Self {
            email: dto.email,
            first_name: dto.first_name,
            last_name: dto.last_name,
            avatar: None,
        }
    }
}

/// Selection criteria for posts; unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub id: Option<String>,
    pub author_id: Option<i64>,
}

impl PostFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            author_id: None,
        }
    }

    pub fn by_author(author_id: i64) -> Self {
        Self {
            id: None,
            author_id: Some(author_id),
        }
    }

    pub fn and_author(mut self, author_id: i64) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn matches(&self, post: &Post) -> bool {
        self.id.as_deref().map_or(true, |id| post.id == id)
            && self.author_id.map_or(true, |author| post.author_id == author)
    }
}
