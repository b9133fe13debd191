//! DMバックエンド呼び出しワーカー（TUIとは別スレッドで動く）
//!
//! ジョブは到着順に1件ずつ処理するため、同一セッションのリクエストが
//! 同時に飛ぶことはない。

use crate::client::{DmService, ServiceError};
use crate::game::{DmRequest, DmResponse, GameStartInfo, VoiceRequest, VoiceResponse};
use color_eyre::{Result, eyre::eyre};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use tokio::runtime::Runtime;
use tracing::{info, warn};

/// ワーカーへの依頼
#[derive(Debug, Clone)]
pub enum Job {
    Narrate(DmRequest),
    Voice(VoiceRequest),
    GameStart,
}

/// ワーカーからの結果
#[derive(Debug)]
pub enum Reply {
    Narration(Result<DmResponse, ServiceError>),
    Voice(Result<VoiceResponse, ServiceError>),
    GameStart(Result<GameStartInfo, ServiceError>),
}

/// UI側が持つワーカーへのハンドル
pub struct DmWorker {
    tx: Sender<Job>,
    rx: Receiver<Reply>,
}

impl DmWorker {
    /// ワーカースレッドを開始する。ランタイムは呼び出し側で構築して渡す
    pub fn spawn<S: DmService>(service: S, runtime: Runtime) -> Self {
        let (tx_job, rx_job) = mpsc::channel::<Job>();
        let (tx_reply, rx_reply) = mpsc::channel::<Reply>();

        std::thread::spawn(move || {
            runtime.block_on(async move {
                while let Ok(job) = rx_job.recv() {
                    let reply = process_job(&service, job).await;
                    if tx_reply.send(reply).is_err() {
                        // UI側が終了した
                        break;
                    }
                }
            });
            info!(target: "worker", "worker_stopped");
        });

        Self { tx: tx_job, rx: rx_reply }
    }

    pub fn send(&self, job: Job) -> Result<()> {
        self.tx.send(job).map_err(|_| eyre!("DM worker has stopped"))
    }

    /// 非ブロッキングで結果を1件取り出す
    pub fn try_recv(&self) -> Option<Reply> {
        match self.rx.try_recv() {
            Ok(reply) => Some(reply),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                warn!(target: "worker", "reply_channel_disconnected");
                None
            }
        }
    }
}

async fn process_job<S: DmService>(service: &S, job: Job) -> Reply {
    match job {
        Job::Narrate(request) => {
            info!(target: "worker", turn = request.state.turn_count, "job_narrate");
            let result = service.narrate(&request).await;
            log_outcome("narrate", &result);
            Reply::Narration(result)
        }
        Job::Voice(request) => {
            info!(target: "worker", chars = request.text.len(), "job_voice");
            let result = service.voice(&request).await;
            log_outcome("voice", &result);
            Reply::Voice(result)
        }
        Job::GameStart => {
            let result = service.game_start().await;
            log_outcome("game_start", &result);
            Reply::GameStart(result)
        }
    }
}

fn log_outcome<T>(job: &str, result: &Result<T, ServiceError>) {
    match result {
        Ok(_) => info!(target: "worker", job, "job_done"),
        Err(e) => warn!(target: "worker", job, error = %e, "job_failed"),
    }
}
