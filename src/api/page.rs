use std::convert::Infallible;

use axum::{
    Json,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, IntoResponseParts, Response, ResponseParts},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};

/// 存放待展示消息的 cookie 名
pub const MESSAGES_COOKIE: &str = "messages";

/// 消息级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Success,
    Warning,
    Error,
}

/// 一条一次性提示消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub level: Level,
    pub text: String,
}

/// 一次性提示消息队列
///
/// 消息保存在 cookie 中，可以跨越重定向；渲染 [`Page`] 时全部取出并清除 cookie。
/// 作为响应的一部分返回时（例如和 `Redirect` 组成元组），未展示的消息会写回 cookie。
#[derive(Debug)]
pub struct Messages {
    jar: CookieJar,
    queue: Vec<Message>,
}

impl Messages {
    pub fn push(&mut self, level: Level, text: impl Into<String>) {
        self.queue.push(Message {
            level,
            text: text.into(),
        });
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(Level::Success, text)
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(Level::Error, text)
    }

    /// 取出全部消息，并返回清除了消息 cookie 的 jar
    fn drain(self) -> (CookieJar, Vec<Message>) {
        (clear_cookie(self.jar), self.queue)
    }

    fn into_jar(self) -> CookieJar {
        if self.queue.is_empty() {
            return clear_cookie(self.jar);
        }

        match serde_json::to_string(&self.queue) {
            Ok(value) => self.jar.add(
                Cookie::build((MESSAGES_COOKIE, value))
                    .path("/")
                    .http_only(true),
            ),
            Err(e) => {
                tracing::warn!(%e, "failed to encode messages");
                self.jar
            }
        }
    }
}

fn clear_cookie(jar: CookieJar) -> CookieJar {
    if jar.get(MESSAGES_COOKIE).is_none() {
        return jar;
    }
    jar.remove(Cookie::build(MESSAGES_COOKIE).path("/"))
}

impl<S: Send + Sync> FromRequestParts<S> for Messages {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state).await?;

        // 无法解析的 cookie 直接丢弃
        let queue = jar
            .get(MESSAGES_COOKIE)
            .and_then(|c| serde_json::from_str(c.value()).ok())
            .unwrap_or_default();

        Ok(Self { jar, queue })
    }
}

impl IntoResponseParts for Messages {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.into_jar().into_response_parts(res)
    }
}

/// 交给展示层的页面：模板名、上下文和待展示的消息。
///
/// 序列化为 `{ "template": ..., "context": ..., "messages": [...] }`。
pub struct Page<C> {
    template: &'static str,
    context: C,
    messages: Messages,
}

impl<C: Serialize> Page<C> {
    pub fn new(template: &'static str, context: C, messages: Messages) -> Self {
        Self {
            template,
            context,
            messages,
        }
    }
}

#[derive(Serialize)]
struct PageBody<'a, C> {
    template: &'a str,
    context: &'a C,
    messages: &'a [Message],
}

impl<C: Serialize> IntoResponse for Page<C> {
    fn into_response(self) -> Response {
        let (jar, messages) = self.messages.drain();

        let body = PageBody {
            template: self.template,
            context: &self.context,
            messages: &messages,
        };

        (jar, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, header},
        response::Redirect,
    };

    use super::*;

    async fn extract(req: Request<Body>) -> Messages {
        let (mut parts, _) = req.into_parts();
        let Ok(messages) = Messages::from_request_parts(&mut parts, &()).await;
        messages
    }

    fn set_cookie_values(resp: &Response) -> Vec<String> {
        resp.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let data = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&data).unwrap()
    }

    #[tokio::test]
    async fn test_page_contains_pushed_messages() {
        let mut messages = extract(Request::new(Body::empty())).await;
        messages.success("saved");

        let resp = Page::new("about/about.html", serde_json::json!({"k": 1}), messages)
            .into_response();
        let json = body_json(resp).await;

        assert_eq!(json["template"], "about/about.html");
        assert_eq!(json["context"]["k"], 1);
        assert_eq!(json["messages"][0]["level"], "success");
        assert_eq!(json["messages"][0]["text"], "saved");
    }

    #[tokio::test]
    async fn test_messages_survive_redirect_and_are_shown_once() {
        // 第一次请求：写入消息并重定向
        let mut messages = extract(Request::new(Body::empty())).await;
        messages.error("You can only delete your own comments!");
        let resp = (messages, Redirect::to("/post/")).into_response();

        let cookies = set_cookie_values(&resp);
        assert_eq!(cookies.len(), 1);
        let cookie_pair = cookies[0].split(';').next().unwrap().to_string();
        assert!(cookie_pair.starts_with("messages="));

        // 第二次请求：带着 cookie 渲染页面
        let req = Request::builder()
            .header(header::COOKIE, &cookie_pair)
            .body(Body::empty())
            .unwrap();
        let messages = extract(req).await;
        let resp = Page::new("blog/post_detail.html", (), messages).into_response();

        let cookies = set_cookie_values(&resp);
        assert_eq!(cookies.len(), 1, "rendered page should clear the cookie");
        assert!(cookies[0].starts_with("messages=;") || cookies[0].starts_with("messages=\"\""));

        let json = body_json(resp).await;
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
        assert_eq!(
            json["messages"][0]["text"],
            "You can only delete your own comments!"
        );
    }

    #[tokio::test]
    async fn test_malformed_cookie_is_ignored() {
        let req = Request::builder()
            .header(header::COOKIE, "messages=not-json")
            .body(Body::empty())
            .unwrap();
        let messages = extract(req).await;
        assert!(messages.queue.is_empty());
    }
}
