use color_eyre::Result;
use dungeon_master::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // エラーハンドリングの初期化
    color_eyre::install()?;

    // 環境変数のロード
    dotenvy::dotenv().ok();

    // ロギングの初期化
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,server=debug")),
        )
        .init();

    let config = Config::from_env();
    let listener = tokio::net::TcpListener::bind(&config.server_addr).await?;
    let addr = listener.local_addr()?;
    tracing::info!(target: "server", "Mock DM backend running on http://{}", addr);

    axum::serve(listener, dungeon_master::server::router()).await?;
    Ok(())
}
