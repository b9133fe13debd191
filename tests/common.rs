#![allow(dead_code)]

use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// ファイル出力の guard。テストプロセス終了まで保持する
static LOG_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// テスト用 tracing を一度だけ設定する（libtest が捕捉する出力 + logs/dm-tests.log）
pub fn init() {
    LOG_GUARD.get_or_init(|| {
        let (file, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never("logs", "dm-tests.log"));
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("session=debug,app=info,worker=info"));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_test_writer().compact())
            .with(fmt::layer().with_ansi(false).with_writer(file))
            .try_init();

        tracing::debug!(target: "session", "test logging ready");
        guard
    });
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    format!("http://{addr}")
}
