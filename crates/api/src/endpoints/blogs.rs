//! Blog endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use paws_common::{AppError, AppResult};
use paws_core::{BlogListQuery, CreateBlogInput, UpdateBlogInput};
use paws_db::{entities::blog::BlogCategory, repositories::BlogQuery};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AppJson, AppQuery, AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{self, ApiResponse, BlogResponse, MessageResponse},
};

#[derive(Debug, Default, Deserialize)]
pub struct ListBlogsParams {
    /// Category name; `All` or empty means any.
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl ListBlogsParams {
    fn into_query(self) -> AppResult<BlogListQuery> {
        let category = match self.category.as_deref().map(str::trim) {
            None | Some("" | "All" | "all") => None,
            Some(name) => Some(parse_category(name)?),
        };

        Ok(BlogListQuery {
            filter: BlogQuery {
                category,
                search: self.search,
            },
            page: self.page,
            limit: self.limit,
        })
    }
}

fn parse_category(name: &str) -> AppResult<BlogCategory> {
    serde_json::from_value(serde_json::Value::String(name.to_string()))
        .map_err(|_| AppError::BadRequest(format!("Unknown category: {name}")))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPageResponse {
    pub blogs: Vec<BlogResponse>,
    pub total_pages: u64,
    pub current_page: u64,
    pub total: u64,
}

async fn list_blogs(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ListBlogsParams>,
) -> AppResult<ApiResponse<BlogPageResponse>> {
    let page = state.blog_service.list(&params.into_query()?).await?;
    Ok(ApiResponse::ok(BlogPageResponse {
        blogs: page.blogs.into_iter().map(BlogResponse::from).collect(),
        total_pages: page.total_pages,
        current_page: page.current_page,
        total: page.total,
    }))
}

async fn categories(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<BlogCategory>>> {
    Ok(ApiResponse::ok(state.blog_service.categories().await?))
}

async fn my_blogs(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<BlogResponse>>> {
    let blogs = state.blog_service.my_blogs(&user).await?;
    Ok(ApiResponse::ok(blogs.into_iter().map(BlogResponse::from).collect()))
}

async fn get_blog(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<BlogResponse>> {
    let view = state.blog_service.get(user.as_ref(), &id).await?;
    Ok(ApiResponse::ok(view.into()))
}

async fn create_blog(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateBlogInput>,
) -> AppResult<ApiResponse<BlogResponse>> {
    let view = state.blog_service.create(&user, req).await?;
    Ok(ApiResponse::created(view.into()))
}

async fn update_blog(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateBlogInput>,
) -> AppResult<ApiResponse<BlogResponse>> {
    let view = state.blog_service.update(&user, &id, req).await?;
    Ok(ApiResponse::ok(view.into()))
}

async fn delete_blog(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state.blog_service.delete(&user, &id).await?;
    Ok(response::message("Blog deleted successfully"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_blogs).post(create_blog))
        .route("/categories", get(categories))
        .route("/my/blogs", get(my_blogs))
        .route("/{id}", get(get_blog).put(update_blog).delete(delete_blog))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parsing() {
        assert_eq!(parse_category("Rescue Stories").unwrap(), BlogCategory::RescueStories);
        assert!(parse_category("Gossip").is_err());

        let params = ListBlogsParams {
            category: Some("All".to_string()),
            ..Default::default()
        };
        assert!(params.into_query().unwrap().filter.category.is_none());
    }
}
