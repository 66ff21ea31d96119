//! エラーハンドリングシステム
//!
//! 編集コア全体で使用される統一されたエラー型とユーティリティを定義
//! バッファ操作は全か無か、ハイライトの失敗は内部で吸収してプレーンテキストへ退避する

use crate::buffer::Position;
use std::time::{Duration, Instant};
use thiserror::Error;

/// クレート全体のエラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeckoError {
    /// バッファ操作エラー
    #[error("Buffer operation failed: {0}")]
    Buffer(#[from] BufferError),

    /// ハイライト処理エラー
    #[error("Highlight failed: {0}")]
    Highlight(#[from] HighlightError),

    /// 設定エラー
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// バッファ操作固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("invalid position: line {line}, column {column}")]
    InvalidPosition { line: usize, column: usize },

    #[error("invalid range: {start}..{end}")]
    InvalidRange { start: Position, end: Position },

    #[error("buffer is empty")]
    EmptyBuffer,

    #[error("invalid search pattern: {0}")]
    InvalidPattern(String),
}

/// ハイライト処理固有のエラー（公開APIからは漏れない）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HighlightError {
    #[error("highlight pass exceeded its time budget")]
    Timeout,

    #[error("highlight pass was cancelled")]
    Cancelled,

    #[error("formatter failed: {0}")]
    Formatter(String),
}

impl HighlightError {
    /// 時間切れ・キャンセルによる中断か（前回の出力を維持すべきか）
    pub fn is_interrupted(&self) -> bool {
        matches!(self, HighlightError::Timeout | HighlightError::Cancelled)
    }
}

/// 設定固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration file: {path}")]
    InvalidFile { path: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("IO error: {message}")]
    Io { message: String },
}

/// エラーレベル分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLevel {
    Info,
    Warning,
    Error,
}

/// ステータス行に一時表示するメッセージ
#[derive(Debug, Clone)]
pub struct ErrorDisplay {
    /// 表示メッセージ
    pub message: String,
    /// エラーレベル
    pub level: ErrorLevel,
    /// 表示開始時刻
    pub start_time: Instant,
    /// 表示持続時間
    pub duration: Duration,
}

impl ErrorDisplay {
    const DEFAULT_DURATION: Duration = Duration::from_secs(5);

    pub fn new(error: &GeckoError) -> Self {
        let (message, level) = Self::format_error(error);
        Self::with_message(message, level)
    }

    /// 任意のメッセージから作成
    pub fn with_message(message: impl Into<String>, level: ErrorLevel) -> Self {
        Self {
            message: message.into(),
            level,
            start_time: Instant::now(),
            duration: Self::DEFAULT_DURATION,
        }
    }

    /// アンドゥ境界の通知
    pub fn nothing_to_undo() -> Self {
        Self::with_message("これ以上元に戻せません", ErrorLevel::Info)
    }

    /// リドゥ境界の通知
    pub fn nothing_to_redo() -> Self {
        Self::with_message("これ以上やり直せません", ErrorLevel::Info)
    }

    fn format_error(error: &GeckoError) -> (String, ErrorLevel) {
        match error {
            GeckoError::Buffer(BufferError::InvalidPosition { line, column }) => (
                format!("無効なカーソル位置です: {}:{}", line + 1, column + 1),
                ErrorLevel::Error,
            ),
            GeckoError::Buffer(BufferError::InvalidRange { .. }) => {
                ("選択範囲が不正です".to_string(), ErrorLevel::Warning)
            }
            GeckoError::Buffer(BufferError::EmptyBuffer) => {
                ("バッファが空です".to_string(), ErrorLevel::Error)
            }
            GeckoError::Buffer(BufferError::InvalidPattern(message)) => {
                (format!("検索パターンが不正です: {}", message), ErrorLevel::Warning)
            }
            GeckoError::Highlight(_) => {
                ("シンタックスハイライトを一時的に無効化しました".to_string(), ErrorLevel::Warning)
            }
            GeckoError::Config(ConfigError::InvalidFile { path }) => {
                (format!("設定ファイルが不正です: {}", path), ErrorLevel::Error)
            }
            _ => (format!("エラーが発生しました: {}", error), ErrorLevel::Error),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.start_time.elapsed() >= self.duration
    }
}

/// プロジェクト標準のResult型
pub type Result<T> = std::result::Result<T, GeckoError>;

/// 各モジュール固有のResult型
pub mod buffer {
    pub type Result<T> = std::result::Result<T, super::BufferError>;
}

pub mod highlight {
    pub type Result<T> = std::result::Result<T, super::HighlightError>;
}

impl From<std::io::Error> for ConfigError {
    fn from(error: std::io::Error) -> Self {
        ConfigError::Io {
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_creation() {
        let error = GeckoError::Buffer(BufferError::InvalidPosition { line: 2, column: 9 });
        let display = ErrorDisplay::new(&error);

        assert_eq!(display.level, ErrorLevel::Error);
        assert!(display.message.contains("3:10"));
        assert!(!display.is_expired());
    }

    #[test]
    fn test_error_display_expiry() {
        let mut display = ErrorDisplay::nothing_to_undo();
        assert_eq!(display.level, ErrorLevel::Info);
        assert!(!display.is_expired());

        // 時間経過をシミュレート
        display.start_time = Instant::now() - Duration::from_secs(6);
        assert!(display.is_expired());
    }

    #[test]
    fn test_from_conversions() {
        let error: GeckoError = BufferError::EmptyBuffer.into();
        assert!(matches!(error, GeckoError::Buffer(BufferError::EmptyBuffer)));

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let config: ConfigError = io.into();
        assert!(matches!(config, ConfigError::Io { .. }));
    }

    #[test]
    fn test_interrupted_classification() {
        assert!(HighlightError::Timeout.is_interrupted());
        assert!(HighlightError::Cancelled.is_interrupted());
        assert!(!HighlightError::Formatter("boom".into()).is_interrupted());
    }
}
