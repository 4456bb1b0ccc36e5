//! Blog repository.

use std::sync::Arc;

use crate::entities::{
    Blog,
    blog::{self, BlogCategory},
};
use paws_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    sea_query::{Expr, Func},
};

/// Filters for the public blog listing.
#[derive(Debug, Clone, Default)]
pub struct BlogQuery {
    /// Only posts in this category.
    pub category: Option<BlogCategory>,
    /// Case-insensitive substring matched against title, content and excerpt.
    pub search: Option<String>,
}

/// Blog repository for database operations.
#[derive(Clone)]
pub struct BlogRepository {
    db: Arc<DatabaseConnection>,
}

impl BlogRepository {
    /// Create a new blog repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<blog::Model>> {
        Blog::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<blog::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Blog {id} not found")))
    }

    /// Create a new post.
    pub async fn create(&self, model: blog::ActiveModel) -> AppResult<blog::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: blog::ActiveModel) -> AppResult<blog::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post.
    pub async fn delete(&self, model: blog::Model) -> AppResult<()> {
        model
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    fn published_condition(query: &BlogQuery) -> Condition {
        let mut condition = Condition::all().add(blog::Column::IsPublished.eq(true));

        if let Some(category) = query.category {
            condition = condition.add(blog::Column::Category.eq(category));
        }

        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!(
                "%{}%",
                search
                    .to_lowercase()
                    .replace('%', "\\%")
                    .replace('_', "\\_")
            );
            condition = condition.add(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col(blog::Column::Title))).like(&pattern))
                    .add(Expr::expr(Func::lower(Expr::col(blog::Column::Content))).like(&pattern))
                    .add(Expr::expr(Func::lower(Expr::col(blog::Column::Excerpt))).like(&pattern)),
            );
        }

        condition
    }

    /// Published posts matching `query`, newest first.
    pub async fn find_published(
        &self,
        query: &BlogQuery,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<blog::Model>> {
        Blog::find()
            .filter(Self::published_condition(query))
            .order_by_desc(blog::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Number of published posts matching `query`.
    pub async fn count_published(&self, query: &BlogQuery) -> AppResult<u64> {
        Blog::find()
            .filter(Self::published_condition(query))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All posts by an author, newest first.
    pub async fn find_by_author(&self, author_id: &str) -> AppResult<Vec<blog::Model>> {
        Blog::find()
            .filter(blog::Column::AuthorId.eq(author_id))
            .order_by_desc(blog::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Increment the view counter atomically.
    pub async fn increment_views(&self, id: &str) -> AppResult<()> {
        Blog::update_many()
            .col_expr(blog::Column::Views, Expr::col(blog::Column::Views).add(1))
            .filter(blog::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Categories that have at least one published post.
    pub async fn published_categories(&self) -> AppResult<Vec<BlogCategory>> {
        Blog::find()
            .select_only()
            .column(blog::Column::Category)
            .distinct()
            .filter(blog::Column::IsPublished.eq(true))
            .into_tuple::<BlogCategory>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
