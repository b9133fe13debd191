use color_eyre::{Result, eyre::WrapErr};
use dungeon_master::modes::GameContext;
use dungeon_master::voice::{AudioSink, FileSink, RodioSink};
use dungeon_master::worker::DmWorker;
use dungeon_master::{Config, HttpDmClient};
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    color_eyre::install()?;

    // Load .env (optional). DM_BACKEND_URL などをローカルの .env から読めるようにする
    let _ = dotenvy::dotenv();

    // ログ: 標準出力は使わず、ファイルへのみ出力してratatuiと衝突しないようにする
    let file_appender = rolling::daily("logs", "app.log");
    // guard はdropするとログが失われるため、main終了まで保持
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // ファイルにANSIカラー不要
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    let config = Config::from_env();
    tracing::info!(target: "app", backend = %config.backend_url, voice = config.voice_enabled, "starting");

    let client = HttpDmClient::new(&config)?;
    let runtime = tokio::runtime::Runtime::new().wrap_err("building tokio runtime for DM worker")?;
    let worker = DmWorker::spawn(client, runtime);
    // 出力デバイスが無ければクリップをファイルに書き出す
    let sink: Box<dyn AudioSink> = match RodioSink::try_default() {
        Ok(sink) => Box::new(sink),
        Err(e) => {
            tracing::warn!(target: "app", error = %e, dir = %config.audio_dir.display(), "no audio device, writing clips to disk");
            Box::new(FileSink::new(config.audio_dir.clone()))
        }
    };
    let ctx = GameContext::new(worker, sink, config.voice_enabled);

    let terminal = ratatui::init();
    let res = dungeon_master::run(terminal, ctx, &config);
    ratatui::restore();
    res
}
