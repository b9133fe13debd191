//! 音声ナレーション: base64デコードと再生先（シンク）
//!
//! 通常は rodio で出力デバイスから再生する。デバイスが無い環境では
//! クリップをファイルへ書き出すだけの `FileSink` に切り替える。

use crate::game::VoiceResponse;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use color_eyre::{Result, eyre::WrapErr};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::io::Cursor;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("voice audio is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("voice audio is empty")]
    Empty,
}

/// デコード済みの音声クリップ
#[derive(Debug, Clone)]
pub struct VoiceClip {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl VoiceClip {
    pub fn decode(resp: &VoiceResponse) -> Result<Self, VoiceError> {
        let bytes = STANDARD.decode(resp.audio_base64.trim())?;
        if bytes.is_empty() {
            return Err(VoiceError::Empty);
        }
        Ok(Self { bytes, content_type: resp.content_type.clone() })
    }

    /// 書き出し用の拡張子（Content-Type から決める）
    pub fn extension(&self) -> &'static str {
        match self.content_type.to_ascii_lowercase().as_str() {
            "audio/mpeg" | "audio/mp3" => "mp3",
            "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
            "audio/ogg" => "ogg",
            _ => "bin",
        }
    }

    /// rodio のデコーダを作る（形式はデータから判定される）
    pub fn source(&self) -> Result<Decoder<Cursor<Vec<u8>>>> {
        Decoder::new(Cursor::new(self.bytes.clone()))
            .wrap_err_with(|| format!("decoding {} voice clip", self.content_type))
    }
}

/// 音声の再生先
pub trait AudioSink {
    /// 再生を開始する（完了は待たない）
    fn play(&mut self, clip: &VoiceClip, turn: u32) -> Result<()>;

    /// 再生が終わっていれば true
    fn is_done(&self) -> bool;

    /// 再生中のクリップを止める（スキップ）
    fn stop(&mut self);
}

/// 出力デバイスで再生するシンク
pub struct RodioSink {
    // drop すると出力が止まるため保持する
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sink: Option<Sink>,
}

impl RodioSink {
    pub fn try_default() -> Result<Self> {
        let (stream, handle) = OutputStream::try_default().wrap_err("opening audio output device")?;
        Ok(Self { _stream: stream, handle, sink: None })
    }
}

impl AudioSink for RodioSink {
    fn play(&mut self, clip: &VoiceClip, turn: u32) -> Result<()> {
        self.stop();
        let source = clip.source()?;
        let sink = Sink::try_new(&self.handle).wrap_err("creating audio sink")?;
        sink.append(source);
        info!(target: "app", turn, bytes = clip.bytes.len(), "voice_playback_started");
        self.sink = Some(sink);
        Ok(())
    }

    fn is_done(&self) -> bool {
        self.sink.as_ref().is_none_or(Sink::empty)
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }
}

/// 出力デバイスが無い場合のフォールバック。クリップを書き出すだけで即座に完了扱い
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl AudioSink for FileSink {
    fn play(&mut self, clip: &VoiceClip, turn: u32) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .wrap_err_with(|| format!("creating audio dir {}", self.dir.display()))?;
        let path = self.dir.join(format!("narration-{turn:04}.{}", clip.extension()));
        std::fs::write(&path, &clip.bytes).wrap_err_with(|| format!("writing {}", path.display()))?;
        info!(target: "app", path = %path.display(), "voice_clip_written");
        Ok(())
    }

    fn is_done(&self) -> bool {
        true
    }

    fn stop(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::mock::tone_wav;

    fn response(bytes: &[u8], content_type: &str) -> VoiceResponse {
        VoiceResponse { audio_base64: STANDARD.encode(bytes), content_type: content_type.into() }
    }

    #[test]
    fn wav_clip_decodes_for_playback() {
        let clip = VoiceClip::decode(&response(&tone_wav(1), "audio/wav")).unwrap();
        assert_eq!(clip.extension(), "wav");
        assert!(clip.source().is_ok());
    }

    #[test]
    fn garbage_audio_fails_to_decode() {
        let clip = VoiceClip::decode(&response(b"definitely not audio", "audio/mp3")).unwrap();
        assert_eq!(clip.extension(), "mp3");
        assert!(clip.source().is_err());
    }

    #[test]
    fn bad_audio_is_rejected() {
        let bad = VoiceResponse { audio_base64: "not base64 !!".into(), content_type: "audio/mp3".into() };
        assert!(matches!(VoiceClip::decode(&bad), Err(VoiceError::Base64(_))));
        let empty = VoiceResponse { audio_base64: String::new(), content_type: "audio/mp3".into() };
        assert!(matches!(VoiceClip::decode(&empty), Err(VoiceError::Empty)));
    }

    #[test]
    fn file_sink_writes_numbered_clip() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileSink::new(dir.path().join("audio"));
        let clip = VoiceClip::decode(&response(&tone_wav(1), "audio/wav")).unwrap();
        sink.play(&clip, 3).unwrap();
        assert!(sink.is_done());
        let written = std::fs::read(dir.path().join("audio").join("narration-0003.wav")).unwrap();
        assert_eq!(written, clip.bytes);
    }
}
