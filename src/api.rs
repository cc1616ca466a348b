mod about;
mod auth;
mod blog;
mod page;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::instrument;

pub use self::{
    auth::{CurrentUser, USER_HEADER},
    page::{Level, MESSAGES_COOKIE, Message, Messages, Page},
};

use crate::{
    error::{Error, Result},
    state::AppState,
};

/// 设置应用的路由。
///
/// 组合关于页和博客的路由，并绑定应用状态。
pub fn setup_route(app: AppState) -> Router {
    Router::new()
        .merge(about::setup_route())
        .merge(blog::setup_route())
        .with_state(app)
}

/// 在 `addr` 上启动 HTTP 服务，并使用给定的路由处理请求。
#[instrument(name = "http server", skip(router))]
pub async fn run_server_with_router(router: Router, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("listening on {}", addr);

    axum::serve(listener, router).await?;
    Ok(())
}

/// 启动 HTTP 服务，自动设置路由和中间件。
///
/// 1. 生成路由
/// 2. 添加日志和追踪中间件
/// 3. 启动服务器
pub async fn run_server(app: AppState, addr: &str) -> Result<()> {
    let router = setup_route(app);
    let router = add_middlewares(router);
    run_server_with_router(router, addr).await
}

/// 为路由添加中间件，包括请求追踪和失败日志记录。
///
/// 日志记录会在请求失败时输出错误信息。
fn add_middlewares(router: Router) -> Router {
    fn log_failure(
        err: tower_http::classify::ServerErrorsFailureClass,
        _latency: std::time::Duration,
        _span: &tracing::Span,
    ) {
        tracing::error!(error = %err, "request failed");
    }

    router.layer(
        TraceLayer::new_for_http()
            .on_failure(log_failure)
            .on_request(|_req: &_, _span: &tracing::Span| {
                // 关闭请求日志
            }),
    )
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::util::ServiceExt;

    use super::*;

    /// 使用不会真正连接的连接池；这里的请求都在访问数据库之前结束
    fn router() -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/blogsite_unused")
            .expect("invalid database url");
        setup_route(AppState::new(pool))
    }

    fn form_post(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .expect("build request")
    }

    #[tokio::test]
    async fn test_comment_requires_user() {
        let resp = router()
            .oneshot(form_post("/some-post/", "body=hello"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_user_header_is_rejected() {
        let mut req = form_post("/some-post/", "body=hello");
        req.headers_mut()
            .insert(USER_HEADER, "not-a-number".parse().unwrap());

        let resp = router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_non_numeric_comment_id_is_not_found() {
        let req = Request::get("/some-post/edit_comment/abc")
            .body(Body::empty())
            .unwrap();
        let resp = router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = Request::get("/some-post/delete_comment/1x")
            .body(Body::empty())
            .unwrap();
        let resp = router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let req = Request::get("/a/b/c/d").body(Body::empty()).unwrap();
        let resp = router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
