use axum::{
    Form, Router,
    extract::{Path, State},
    response::Redirect,
    routing::get,
};
use axum_extra::extract::Query;
use serde::{Deserialize, Serialize};

use super::{CurrentUser, Error, Messages, Page, Result};
use crate::{
    content::{CommentForm, FormState, POSTS_PER_PAGE, PageInfo},
    state::AppState,
    storage::{Comment, DBPool, Post, Querier, Store},
};

const LIST_TEMPLATE: &str = "blog/index.html";
const DETAIL_TEMPLATE: &str = "blog/post_detail.html";

/// 配置博客路由。
///
/// 路由包括：
/// - `GET /`：文章列表
/// - `GET /{slug}/`：文章详情；`POST` 提交评论
/// - `GET|POST /{slug}/edit_comment/{comment_id}`：修改评论
/// - `GET|POST /{slug}/delete_comment/{comment_id}`：删除评论
pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/", get(post_list))
        .route("/{slug}/", get(post_detail).post(comment_create))
        .route(
            "/{slug}/edit_comment/{comment_id}",
            get(comment_edit_redirect).post(comment_edit),
        )
        .route(
            "/{slug}/delete_comment/{comment_id}",
            get(comment_delete).post(comment_delete),
        )
}

/// 文章元信息，用于列表展示。
#[derive(Debug, Serialize)]
pub struct PostMeta {
    pub title: String,
    pub slug: String,
    pub author: String,
    pub featured_image: String,
    pub excerpt: String,
    pub created_on: i64,
    pub updated_on: i64,
}

/// 完整文章，包括元信息和正文。
#[derive(Debug, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    meta: PostMeta,

    content: String,
}

impl From<Post> for PostDetail {
    fn from(mut post: Post) -> Self {
        let content = std::mem::take(&mut post.content);
        Self {
            meta: PostMeta::from(post),
            content,
        }
    }
}

impl From<Post> for PostMeta {
    fn from(post: Post) -> Self {
        Self {
            title: post.title,
            slug: post.slug,
            author: post.author,
            featured_image: post.featured_image,
            excerpt: post.excerpt,
            created_on: post.created_on.timestamp_millis(),
            updated_on: post.updated_on.timestamp_millis(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    id: i64,
    author: String,
    body: String,
    approved: bool,
    created_on: i64,
}

impl From<Comment> for CommentView {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            author: c.author,
            body: c.body,
            approved: c.approved,
            created_on: c.created_on.timestamp_millis(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostListContext {
    post_list: Vec<PostMeta>,
    page_obj: PageInfo,
    is_paginated: bool,
}

#[derive(Debug, Serialize)]
pub struct PostDetailContext {
    post: PostDetail,
    comments: Vec<CommentView>,
    comment_count: i64,
    comment_form: FormState<CommentForm>,
}

/// 列表查询参数，`page` 可以是页码或 `last`。
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    page: Option<String>,
}

/// 解析页码，无法解析时返回 `None`。`last` 指向最后一页。
fn parse_page(raw: Option<&str>, num_pages: i64) -> Option<i64> {
    match raw.map(str::trim) {
        None | Some("") => Some(1),
        Some("last") => Some(num_pages),
        Some(s) => s.parse().ok(),
    }
}

/// 已发布文章列表，每页 [`POSTS_PER_PAGE`] 篇。
///
/// 页码无效或超出范围返回 [`Error::NotFound`]。
async fn post_list(
    Query(params): Query<ListParams>,
    State(pool): State<DBPool>,
    messages: Messages,
) -> Result<Page<PostListContext>> {
    let total = pool.published_post_count().await?;
    let num_pages = PageInfo::page_count(POSTS_PER_PAGE, total);

    let page = parse_page(params.page.as_deref(), num_pages)
        .and_then(|n| PageInfo::new(n, POSTS_PER_PAGE, total))
        .ok_or(Error::NotFound)?;

    let post_list = pool
        .published_posts(POSTS_PER_PAGE, page.offset(POSTS_PER_PAGE))
        .await?
        .into_iter()
        .map(PostMeta::from)
        .collect();

    Ok(Page::new(
        LIST_TEMPLATE,
        PostListContext {
            post_list,
            is_paginated: page.is_paginated(),
            page_obj: page,
        },
        messages,
    ))
}

async fn post_detail(
    Path(slug): Path<String>,
    State(pool): State<DBPool>,
    user: Option<CurrentUser>,
    messages: Messages,
) -> Result<Page<PostDetailContext>> {
    let post = pool.published_post(&slug).await?.ok_or(Error::NotFound)?;
    render_detail(&pool, post, user.as_ref(), FormState::empty(), messages).await
}

/// 提交评论。
///
/// 新评论未审核，仅作者本人可见，直到管理员审核通过。
async fn comment_create(
    Path(slug): Path<String>,
    State(pool): State<DBPool>,
    user: CurrentUser,
    mut messages: Messages,
    Form(data): Form<CommentForm>,
) -> Result<Page<PostDetailContext>> {
    let post = pool.published_post(&slug).await?.ok_or(Error::NotFound)?;
    let form = FormState::bind(data);

    let form = if form.is_valid() {
        let id = pool
            .create_comment(post.id, user.id(), &form.data.body)
            .await?;
        tracing::info!(id, post = %post.slug, user = user.id(), "comment submitted");
        messages.success("Comment submitted and awaiting approval");
        FormState::empty()
    } else {
        form
    };

    render_detail(&pool, post, Some(&user), form, messages).await
}

async fn render_detail(
    pool: &DBPool,
    post: Post,
    viewer: Option<&CurrentUser>,
    comment_form: FormState<CommentForm>,
    messages: Messages,
) -> Result<Page<PostDetailContext>> {
    let (comments, comment_count) = tokio::try_join!(
        pool.visible_comments(post.id, viewer.map(CurrentUser::id)),
        pool.approved_comment_count(post.id),
    )?;

    Ok(Page::new(
        DETAIL_TEMPLATE,
        PostDetailContext {
            post: post.into(),
            comments: comments.into_iter().map(CommentView::from).collect(),
            comment_count,
            comment_form,
        },
        messages,
    ))
}

/// 查找已发布文章下的某条评论，任一不存在都返回 [`Error::NotFound`]。
async fn find_comment(pool: &DBPool, slug: &str, comment_id: &str) -> Result<(Post, Comment)> {
    let comment_id: i64 = comment_id.parse().map_err(|_| Error::NotFound)?;

    let post = pool.published_post(slug).await?.ok_or(Error::NotFound)?;
    let comment = pool
        .comment(post.id, comment_id)
        .await?
        .ok_or(Error::NotFound)?;

    Ok((post, comment))
}

fn is_owner(user: Option<&CurrentUser>, comment: &Comment) -> bool {
    user.is_some_and(|u| u.id() == comment.author_id)
}

fn detail_url(slug: &str) -> String {
    format!("/{slug}/")
}

async fn comment_edit_redirect(
    Path((slug, comment_id)): Path<(String, String)>,
    State(pool): State<DBPool>,
) -> Result<Redirect> {
    find_comment(&pool, &slug, &comment_id).await?;
    Ok(Redirect::to(&detail_url(&slug)))
}

/// 修改评论。
///
/// 只有评论作者可以修改，修改后评论回到未审核状态。结果通过消息提示，总是重定向回文章页。
async fn comment_edit(
    Path((slug, comment_id)): Path<(String, String)>,
    State(pool): State<DBPool>,
    user: Option<CurrentUser>,
    mut messages: Messages,
    Form(data): Form<CommentForm>,
) -> Result<(Messages, Redirect)> {
    let (post, comment) = find_comment(&pool, &slug, &comment_id).await?;
    let form = FormState::bind(data);

    if form.is_valid() && is_owner(user.as_ref(), &comment) {
        pool.update_comment(comment.id, &form.data.body).await?;
        tracing::info!(id = comment.id, post = %post.slug, "comment updated");
        messages.success("Comment Updated!");
    } else {
        messages.error("Error updating comment!");
    }

    Ok((messages, Redirect::to(&detail_url(&post.slug))))
}

/// 删除评论，只有评论作者可以删除。
async fn comment_delete(
    Path((slug, comment_id)): Path<(String, String)>,
    State(pool): State<DBPool>,
    user: Option<CurrentUser>,
    mut messages: Messages,
) -> Result<(Messages, Redirect)> {
    let (post, comment) = find_comment(&pool, &slug, &comment_id).await?;

    if is_owner(user.as_ref(), &comment) {
        pool.delete_comment(comment.id).await?;
        tracing::info!(id = comment.id, post = %post.slug, "comment deleted");
        messages.success("Comment deleted!");
    } else {
        messages.error("You can only delete your own comments!");
    }

    Ok((messages, Redirect::to(&detail_url(&post.slug))))
}
