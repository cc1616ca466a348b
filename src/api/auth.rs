use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};

use crate::{
    error::Error,
    storage::{DBPool, Querier, User},
};

/// 上游认证层写入的用户 id 请求头
pub const USER_HEADER: &str = "x-user-id";

/// 当前请求的用户
///
/// 认证由上游完成，这里只根据 [`USER_HEADER`] 在 `users` 表中查找用户。
/// 作为 `Option<CurrentUser>` 提取时，缺少请求头视为匿名；
/// 请求头无法解析或用户不存在时返回 [`Error::Unauthorized`]。
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> i64 {
        self.0.id
    }
}

impl<S> OptionalFromRequestParts<S> for CurrentUser
where
    DBPool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        let Some(value) = parts.headers.get(USER_HEADER) else {
            return Ok(None);
        };

        let id: i64 = value
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .ok_or(Error::Unauthorized)?;

        let pool = DBPool::from_ref(state);
        let user = pool.user(id).await?.ok_or(Error::Unauthorized)?;

        Ok(Some(CurrentUser(user)))
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    DBPool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        <Self as OptionalFromRequestParts<S>>::from_request_parts(parts, state)
            .await?
            .ok_or(Error::Unauthorized)
    }
}
