//! Blog service.

use std::collections::HashMap;

use chrono::Utc;
use paws_common::{AppError, AppResult, IdGenerator};
use paws_db::{
    entities::{
        blog::{self, BlogCategory},
        user,
    },
    repositories::{BlogQuery, BlogRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use super::{lifecycle::VET_ROLES, user::non_empty};

const EXCERPT_CHARS: usize = 150;
const DEFAULT_PAGE_SIZE: u64 = 10;
const MAX_PAGE_SIZE: u64 = 50;

/// Input for writing a post.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlogInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1, max = 50000))]
    pub content: String,

    pub category: BlogCategory,

    #[validate(length(max = 500))]
    pub excerpt: Option<String>,

    #[serde(rename = "imageURL", alias = "imageUrl")]
    #[validate(url)]
    pub image_url: Option<String>,
}

/// Partial update of a post. Empty strings leave the field unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBlogInput {
    #[validate(length(max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 50000))]
    pub content: Option<String>,

    pub category: Option<BlogCategory>,

    #[validate(length(max = 500))]
    pub excerpt: Option<String>,

    #[serde(rename = "imageURL", alias = "imageUrl")]
    pub image_url: Option<String>,

    pub is_published: Option<bool>,
}

/// Paging and filters for the public listing.
#[derive(Debug, Clone, Default)]
pub struct BlogListQuery {
    pub filter: BlogQuery,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// A post with its author, if the author still exists.
#[derive(Debug, Clone)]
pub struct BlogView {
    pub blog: blog::Model,
    pub author: Option<user::Model>,
}

/// One page of the public listing.
#[derive(Debug, Clone)]
pub struct BlogPage {
    pub blogs: Vec<BlogView>,
    pub total_pages: u64,
    pub current_page: u64,
    pub total: u64,
}

/// Blog service for business logic.
#[derive(Clone)]
pub struct BlogService {
    blog_repo: BlogRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl BlogService {
    /// Create a new blog service.
    #[must_use]
    pub const fn new(blog_repo: BlogRepository, user_repo: UserRepository) -> Self {
        Self {
            blog_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Publish a new post. Vets and admins only.
    pub async fn create(&self, user: &user::Model, input: CreateBlogInput) -> AppResult<BlogView> {
        user.require_role(VET_ROLES)?;
        input.validate()?;

        let title = input.title.trim().to_string();
        let content = input.content.trim().to_string();
        if title.is_empty() || content.is_empty() {
            return Err(AppError::BadRequest(
                "Title, content, and category are required".to_string(),
            ));
        }

        let excerpt = non_empty(input.excerpt).unwrap_or_else(|| excerpt_of(&content));
        let model = blog::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(user.id.clone()),
            title: Set(title),
            content: Set(content),
            excerpt: Set(excerpt),
            category: Set(input.category),
            image_url: Set(non_empty(input.image_url)),
            is_published: Set(true),
            views: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };
        let blog = self.blog_repo.create(model).await?;

        tracing::info!(blog_id = %blog.id, author_id = %user.id, "Blog published");

        Ok(BlogView {
            blog,
            author: Some(user.clone()),
        })
    }

    /// Published posts, newest first.
    pub async fn list(&self, query: &BlogListQuery) -> AppResult<BlogPage> {
        let limit = query
            .limit
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);
        let page = query.page.filter(|p| *p > 0).unwrap_or(1);

        let total = self.blog_repo.count_published(&query.filter).await?;
        let blogs = self
            .blog_repo
            .find_published(&query.filter, (page - 1).saturating_mul(limit), limit)
            .await?;

        Ok(BlogPage {
            blogs: self.with_authors(blogs).await?,
            total_pages: total.div_ceil(limit),
            current_page: page,
            total,
        })
    }

    /// One post. Counts a view.
    ///
    /// Unpublished posts are only visible to their author and admins.
    pub async fn get(&self, viewer: Option<&user::Model>, id: &str) -> AppResult<BlogView> {
        let mut blog = self.blog_repo.get_by_id(id).await?;

        if !blog.is_published {
            let allowed = viewer.is_some_and(|v| v.id == blog.author_id || v.is_admin());
            if !allowed {
                return Err(AppError::Forbidden("Blog not available".to_string()));
            }
        }

        self.blog_repo.increment_views(id).await?;
        blog.views += 1;

        let author = self.user_repo.find_by_id(&blog.author_id).await?;
        Ok(BlogView { blog, author })
    }

    /// Every post written by `user`, drafts included.
    pub async fn my_blogs(&self, user: &user::Model) -> AppResult<Vec<BlogView>> {
        user.require_role(VET_ROLES)?;

        let blogs = self.blog_repo.find_by_author(&user.id).await?;
        Ok(blogs
            .into_iter()
            .map(|blog| BlogView {
                blog,
                author: Some(user.clone()),
            })
            .collect())
    }

    /// Edit a post. Author only.
    pub async fn update(
        &self,
        user: &user::Model,
        id: &str,
        input: UpdateBlogInput,
    ) -> AppResult<BlogView> {
        user.require_role(VET_ROLES)?;
        input.validate()?;

        let blog = self.blog_repo.get_by_id(id).await?;
        if blog.author_id != user.id {
            return Err(AppError::Forbidden(
                "Not authorized to update this blog".to_string(),
            ));
        }

        let mut active: blog::ActiveModel = blog.into();
        if let Some(title) = non_empty(input.title) {
            active.title = Set(title);
        }
        if let Some(content) = non_empty(input.content) {
            active.content = Set(content);
        }
        if let Some(category) = input.category {
            active.category = Set(category);
        }
        if let Some(excerpt) = non_empty(input.excerpt) {
            active.excerpt = Set(excerpt);
        }
        if let Some(image_url) = non_empty(input.image_url) {
            active.image_url = Set(Some(image_url));
        }
        if let Some(is_published) = input.is_published {
            active.is_published = Set(is_published);
        }
        active.updated_at = Set(Some(Utc::now().into()));

        let blog = self.blog_repo.update(active).await?;
        Ok(BlogView {
            blog,
            author: Some(user.clone()),
        })
    }

    /// Delete a post. Author or admin.
    pub async fn delete(&self, user: &user::Model, id: &str) -> AppResult<()> {
        user.require_role(VET_ROLES)?;

        let blog = self.blog_repo.get_by_id(id).await?;
        if blog.author_id != user.id && !user.is_admin() {
            return Err(AppError::Forbidden(
                "Not authorized to delete this blog".to_string(),
            ));
        }

        self.blog_repo.delete(blog).await?;
        tracing::info!(blog_id = %id, deleted_by = %user.id, "Blog deleted");
        Ok(())
    }

    /// Categories with at least one published post.
    pub async fn categories(&self) -> AppResult<Vec<BlogCategory>> {
        self.blog_repo.published_categories().await
    }

    async fn with_authors(&self, blogs: Vec<blog::Model>) -> AppResult<Vec<BlogView>> {
        let mut ids: Vec<String> = blogs.iter().map(|b| b.author_id.clone()).collect();
        ids.sort();
        ids.dedup();

        let authors: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        Ok(blogs
            .into_iter()
            .map(|blog| BlogView {
                author: authors.get(&blog.author_id).cloned(),
                blog,
            })
            .collect())
    }
}

/// The first `EXCERPT_CHARS` characters of `content` followed by an ellipsis.
fn excerpt_of(content: &str) -> String {
    let head: String = content.chars().take(EXCERPT_CHARS).collect();
    format!("{head}...")
}
