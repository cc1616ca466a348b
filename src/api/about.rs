use axum::{Form, Router, extract::State, routing::get};
use serde::Serialize;

use super::{Messages, Page, Result};
use crate::{
    content::{CollaborateForm, FormState},
    state::AppState,
    storage::{DBPool, Querier, Store},
};

const TEMPLATE: &str = "about/about.html";

const COLLABORATE_SUCCESS: &str =
    "Collaboration request received! I endeavour to respond within 2 working days.";

/// 配置关于页路由。
///
/// - `GET /about/`：关于页
/// - `POST /about/`：提交合作请求
pub fn setup_route() -> Router<AppState> {
    Router::new().route("/about/", get(about_me).post(collaborate))
}

/// 关于页内容
#[derive(Debug, Serialize)]
pub struct AboutView {
    title: String,
    content: String,
    updated_on: i64,
}

#[derive(Debug, Serialize)]
pub struct AboutContext {
    about: Option<AboutView>,
    collaborate_form: FormState<CollaborateForm>,
}

async fn about_me(
    State(pool): State<DBPool>,
    messages: Messages,
) -> Result<Page<AboutContext>> {
    render(&pool, FormState::empty(), messages).await
}

/// 提交合作请求。
///
/// 校验通过则保存并提示成功，表单清空；否则带着字段错误重新渲染，不写入数据。
async fn collaborate(
    State(pool): State<DBPool>,
    mut messages: Messages,
    Form(data): Form<CollaborateForm>,
) -> Result<Page<AboutContext>> {
    let form = FormState::bind(data);

    let form = if form.is_valid() {
        let id = pool.insert_collaborate_request(&form.data).await?;
        tracing::info!(id, "collaboration request received");
        messages.success(COLLABORATE_SUCCESS);
        FormState::empty()
    } else {
        form
    };

    render(&pool, form, messages).await
}

async fn render(
    pool: &DBPool,
    collaborate_form: FormState<CollaborateForm>,
    messages: Messages,
) -> Result<Page<AboutContext>> {
    let about = pool.latest_about().await?.map(|a| AboutView {
        title: a.title,
        content: a.content,
        updated_on: a.updated_on.timestamp_millis(),
    });

    Ok(Page::new(
        TEMPLATE,
        AboutContext {
            about,
            collaborate_form,
        },
        messages,
    ))
}
