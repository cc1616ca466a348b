use axum::extract::FromRef;

use crate::storage::DBPool;

/// 应用程序上下文
///
/// [`AppState`] 持有数据库连接池，处理函数通过 `State<DBPool>` 取用。
#[derive(Clone, FromRef)]
pub struct AppState {
    pool: DBPool,
}

impl AppState {
    /// 创建一个新的 [`AppState`] 实例
    pub fn new(pool: DBPool) -> Self {
        Self { pool }
    }
}
