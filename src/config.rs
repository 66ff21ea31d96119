//! 設定
//!
//! バッファ・ハイライトの各種閾値。JSONファイルから読み込み、
//! 未指定の項目は既定値で補完する。時間はミリ秒単位で保持する。

use crate::error::ConfigError;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// エディタ全体の設定
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub buffer: BufferConfig,
    pub highlight: HighlightConfig,
}

/// テキストバッファの設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// 履歴の上限件数
    pub max_history: usize,
    /// 大きなファイルとみなす行数
    pub large_file_lines: usize,
    /// 大きなファイルのシグネチャで抽出する行数（先頭・中央・末尾それぞれ）
    pub signature_sample_lines: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            max_history: 100,
            large_file_lines: 1000,
            signature_sample_lines: 100,
        }
    }
}

/// ハイライトの設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// キャッシュの最大エントリ数
    pub cache_capacity: usize,
    /// キャッシュを再利用できる期間
    pub freshness_ms: u64,
    /// 満杯時に破棄する古さの閾値
    pub staleness_ms: u64,
    /// 1パスあたりの時間予算
    pub timeout_ms: u64,
    /// ビューポートの上下に追加でハイライトする行数
    pub viewport_margin: usize,
    /// これ以上のダーティ行で全体再ハイライトへ切り替える
    pub dirty_threshold: usize,
    /// ダーティ行の前後に含める文脈行数
    pub dirty_context: usize,
    /// 全体ハイライトを行う最大バイト数
    pub whole_buffer_max_bytes: usize,
    /// 全体ハイライトを行う最大行数
    pub whole_buffer_max_lines: usize,
    /// テーマ名
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 100,
            freshness_ms: 5_000,
            staleness_ms: 30_000,
            timeout_ms: 100,
            viewport_margin: 10,
            dirty_threshold: 50,
            dirty_context: 2,
            whole_buffer_max_bytes: 1024 * 1024,
            whole_buffer_max_lines: 5_000,
            theme: "base16-ocean.dark".to_string(),
        }
    }
}

impl HighlightConfig {
    pub fn freshness(&self) -> Duration {
        Duration::from_millis(self.freshness_ms)
    }

    pub fn staleness(&self) -> Duration {
        Duration::from_millis(self.staleness_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl EditorConfig {
    /// 設定ファイルを読み込む
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: EditorConfig = serde_json::from_str(&raw).map_err(|_| ConfigError::InvalidFile {
            path: path.display().to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 設定ファイルがなければ既定値を返す
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("config {} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// 既定の設定ファイルパス（`<config_dir>/gecko/config.json`）
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gecko").join("config.json"))
    }

    /// `~` を展開したパス
    pub fn expand_path(raw: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(raw).into_owned())
    }

    /// 値の整合性を検証
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer.max_history == 0 {
            return Err(invalid("buffer.max_history", self.buffer.max_history));
        }
        if self.buffer.signature_sample_lines == 0 {
            return Err(invalid(
                "buffer.signature_sample_lines",
                self.buffer.signature_sample_lines,
            ));
        }
        let hl = &self.highlight;
        if hl.cache_capacity == 0 {
            return Err(invalid("highlight.cache_capacity", hl.cache_capacity));
        }
        if hl.staleness_ms < hl.freshness_ms {
            return Err(invalid("highlight.staleness_ms", hl.staleness_ms));
        }
        if hl.dirty_threshold == 0 {
            return Err(invalid("highlight.dirty_threshold", hl.dirty_threshold));
        }
        Ok(())
    }
}

fn invalid(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_thresholds() {
        let config = EditorConfig::default();
        assert_eq!(config.buffer.max_history, 100);
        assert_eq!(config.highlight.cache_capacity, 100);
        assert_eq!(config.highlight.freshness(), Duration::from_secs(5));
        assert_eq!(config.highlight.staleness(), Duration::from_secs(30));
        assert_eq!(config.highlight.timeout(), Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: EditorConfig =
            serde_json::from_str(r#"{"highlight": {"timeout_ms": 250}}"#).unwrap();
        assert_eq!(config.highlight.timeout_ms, 250);
        assert_eq!(config.highlight.dirty_threshold, 50);
        assert_eq!(config.buffer, BufferConfig::default());
    }

    #[test]
    fn test_validate_rejects_inverted_windows() {
        let mut config = EditorConfig::default();
        config.highlight.staleness_ms = 10;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "highlight.staleness_ms"
        ));
    }

    #[test]
    fn test_expand_path_without_tilde() {
        assert_eq!(EditorConfig::expand_path("/tmp/x.json"), PathBuf::from("/tmp/x.json"));
    }
}
