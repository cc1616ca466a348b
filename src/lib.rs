pub mod api;
pub mod content;
pub mod error;
pub mod state;
pub mod storage;

use std::env;

use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

use state::AppState;

/// 未设置 `BLOGSITE_ADDR` 时的监听地址
pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";

/// 初始化日志输出
///
/// 日志级别由环境变量 `BLOGSITE_LOG` 控制，例如 `BLOGSITE_LOG=info`。
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
        .with_env_filter(EnvFilter::from_env("BLOGSITE_LOG"))
        .init();
}

pub async fn run() -> error::Result<()> {
    init_tracing();

    let pool = storage::init_db_from_env().await?;
    let app = AppState::new(pool);

    api::run_server(app, &bind_addr()).await
}

fn bind_addr() -> String {
    env::var("BLOGSITE_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string())
}
