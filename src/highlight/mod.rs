//! シンタックスハイライト
//!
//! 表示範囲だけを色付けし、結果を行範囲＋内容をキーにキャッシュする。
//! 失敗・時間切れは内部で吸収し、呼び出し側には常に表示可能な行を返す。
//!
//! ロック順序は文書状態 → キャッシュ。

mod cache;
mod document;
pub mod formatter;

pub use document::{RefreshMode, RefreshOutcome};
pub use formatter::{Formatter, SyntaxAssets, SyntectFormatter, DEFAULT_THEME};

use crate::cancel::{Budget, CancelToken};
use crate::config::HighlightConfig;
use crate::error::HighlightError;
use crate::error::highlight::Result;
use cache::{CacheKey, HighlightCache};
use document::DocumentState;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Range, RangeInclusive};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// 前回の全体ハイライト結果（内容ハッシュ付き）
type WholeBufferResult = Option<(u64, Vec<String>)>;

pub struct Highlighter {
    formatter: Arc<dyn Formatter>,
    config: HighlightConfig,
    cache: Mutex<HighlightCache>,
    whole: Mutex<WholeBufferResult>,
    document: Mutex<DocumentState>,
}

impl fmt::Debug for Highlighter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Highlighter")
            .field("formatter", &self.formatter.name())
            .field("cache_len", &self.cache_len())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// フォーマッタ出力を行へ分割し、行数を検証する
fn split_formatted(formatted: &str, expected: usize) -> Result<Vec<String>> {
    let mut lines: Vec<String> = formatted.split('\n').map(str::to_string).collect();
    if lines.len() == expected + 1 && lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    if lines.len() != expected {
        return Err(HighlightError::Formatter(format!(
            "expected {} lines, got {}",
            expected,
            lines.len()
        )));
    }
    Ok(lines)
}

impl Highlighter {
    /// ファイル名から構文を推定して作成
    pub fn new(filename: &str) -> Self {
        Self::with_config(filename, HighlightConfig::default())
    }

    pub fn with_config(filename: &str, config: HighlightConfig) -> Self {
        let formatter = SyntectFormatter::for_file(filename, &config.theme);
        Self::with_formatter(Arc::new(formatter), config)
    }

    /// 読み込み済みの構文定義を共有して作成
    pub fn with_assets(assets: SyntaxAssets, filename: &str, config: HighlightConfig) -> Self {
        let formatter = SyntectFormatter::with_assets(assets, filename, &config.theme);
        Self::with_formatter(Arc::new(formatter), config)
    }

    /// 任意のフォーマッタを注入して作成
    pub fn with_formatter(formatter: Arc<dyn Formatter>, config: HighlightConfig) -> Self {
        let cache = HighlightCache::new(
            config.cache_capacity,
            config.freshness(),
            config.staleness(),
        );
        Self {
            formatter,
            config,
            cache: Mutex::new(cache),
            whole: Mutex::new(None),
            document: Mutex::new(DocumentState::default()),
        }
    }

    pub fn formatter_name(&self) -> &str {
        self.formatter.name()
    }

    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    pub fn cache_len(&self) -> usize {
        lock(&self.cache).len()
    }

    /// すべてのキャッシュと文書状態を破棄する
    pub fn clear_cache(&self) {
        let mut document = lock(&self.document);
        document.clear();
        lock(&self.cache).clear();
        *lock(&self.whole) = None;
    }

    /// `start..=end` の行を色付けする
    ///
    /// 範囲は有効な行へ切り詰め、逆順なら入れ替える。失敗時は元の行を返す。
    pub fn highlight_lines(
        &self,
        lines: &[String],
        start: usize,
        end: usize,
        cancel: &CancelToken,
    ) -> Vec<String> {
        let Some(last) = lines.len().checked_sub(1) else {
            return Vec::new();
        };
        let (mut start, mut end) = (start.min(last), end.min(last));
        if start > end {
            std::mem::swap(&mut start, &mut end);
        }

        let budget = Budget::with_token(self.config.timeout(), cancel);
        match self.try_highlight(lines, start..=end, &budget) {
            Ok(colored) => colored,
            Err(err) => {
                log::warn!("failed to highlight lines {}..={}: {}", start, end, err);
                lines[start..=end].to_vec()
            }
        }
    }

    fn try_highlight(
        &self,
        lines: &[String],
        range: RangeInclusive<usize>,
        budget: &Budget,
    ) -> Result<Vec<String>> {
        let (start, end) = (*range.start(), *range.end());
        let slice = &lines[range];
        let key = CacheKey::new(start, end, slice);

        if let Some(hit) = lock(&self.cache).get(&key, Instant::now()) {
            return Ok(hit);
        }

        budget.check()?;
        let formatted = self.formatter.format(&slice.join("\n"), budget)?;
        let colored = split_formatted(&formatted, slice.len())?;

        lock(&self.cache).insert(key, colored.clone(), Instant::now());
        Ok(colored)
    }

    /// 文書全体を色付けする（小さなファイル向け）
    ///
    /// 内容が前回と同じならトークナイズを省略する。サイズ・行数の上限を
    /// 超えた場合はプレーンテキストを返す。
    pub fn highlight_all(&self, content: &str) -> Vec<String> {
        let plain = || content.split('\n').map(str::to_string).collect::<Vec<_>>();

        let line_count = content.bytes().filter(|&b| b == b'\n').count() + 1;
        if content.len() > self.config.whole_buffer_max_bytes
            || line_count > self.config.whole_buffer_max_lines
        {
            log::debug!(
                "whole-buffer highlight disabled ({} bytes, {} lines)",
                content.len(),
                line_count
            );
            return plain();
        }

        let mut hasher = DefaultHasher::new();
        content.hash(&mut hasher);
        let hash = hasher.finish();

        if let Some((previous, colored)) = lock(&self.whole).as_ref() {
            if *previous == hash {
                return colored.clone();
            }
        }

        let budget = Budget::new(self.config.timeout());
        let result = self
            .formatter
            .format(content, &budget)
            .and_then(|formatted| split_formatted(&formatted, line_count));

        match result {
            Ok(colored) => {
                *lock(&self.whole) = Some((hash, colored.clone()));
                colored
            }
            Err(err) => {
                log::warn!("failed to highlight buffer: {}", err);
                plain()
            }
        }
    }

    /// 編集された行を記録する
    pub fn mark_dirty(&self, line: usize) {
        lock(&self.document).mark_dirty(line);
    }

    /// `first..=last` を記録する
    pub fn mark_dirty_range(&self, first: usize, last: usize) {
        lock(&self.document).mark_dirty_range(first, last);
    }

    pub fn dirty_count(&self) -> usize {
        lock(&self.document).dirty_len()
    }

    /// ビューポートを更新する
    ///
    /// 行数が変わった場合やダーティ行が閾値以上なら全体を再計算し、
    /// そうでなければダーティ行の周辺だけを再トークナイズして差し込む。
    /// その後ビューポート±余白で未計算の行と、色付け時から内容が変わった
    /// 行を埋める。中断時は前回の色付けを残し、ダーティ行も保持する。
    /// 内容が一致しない行はプレーンテキストで返す。
    pub fn refresh(
        &self,
        lines: &[String],
        viewport: Range<usize>,
        cancel: &CancelToken,
    ) -> RefreshOutcome {
        let total = lines.len();
        let view_end = viewport.end.min(total);
        let view_start = viewport.start.min(view_end);
        if total == 0 {
            return RefreshOutcome {
                lines: Vec::new(),
                mode: RefreshMode::Cached,
                timed_out: false,
            };
        }

        let margin = self.config.viewport_margin;
        let window_start = view_start.saturating_sub(margin).min(total - 1);
        let window_end = view_end
            .saturating_add(margin)
            .min(total)
            .saturating_sub(1)
            .max(window_start);
        let window = window_start..=window_end;
        let budget = Budget::with_token(self.config.timeout(), cancel);

        let mut document = lock(&self.document);
        let mut mode = RefreshMode::Cached;
        let mut timed_out = false;

        if document.line_count() == total {
            document.prune_dirty();
        }

        if document.line_count() != total || document.dirty_len() >= self.config.dirty_threshold {
            mode = RefreshMode::Full;
            let resized = document.line_count() != total;
            match self.try_highlight(lines, window.clone(), &budget) {
                Ok(colored) => {
                    document.reset(total);
                    document.splice(*window.start(), &lines[window.clone()], colored);
                }
                Err(err) if err.is_interrupted() => {
                    timed_out = true;
                    if resized {
                        document.reset(total);
                    }
                }
                Err(err) => {
                    log::warn!("full re-highlight failed: {}", err);
                    document.reset(total);
                    document.splice(
                        *window.start(),
                        &lines[window.clone()],
                        lines[window.clone()].to_vec(),
                    );
                }
            }
        } else if document.dirty_len() > 0 {
            mode = RefreshMode::Incremental;
            for range in document.dirty_windows(self.config.dirty_context) {
                match self.try_highlight(lines, range.clone(), &budget) {
                    Ok(colored) => document.splice(*range.start(), &lines[range.clone()], colored),
                    Err(err) if err.is_interrupted() => {
                        timed_out = true;
                        break;
                    }
                    Err(err) => {
                        log::warn!("incremental highlight failed: {}", err);
                        let source = &lines[range.clone()];
                        document.splice(*range.start(), source, source.to_vec());
                    }
                }
                document.clean(range);
            }
        }

        if !timed_out {
            for run in document.missing_runs(window, lines) {
                if mode == RefreshMode::Cached {
                    mode = RefreshMode::Incremental;
                }
                match self.try_highlight(lines, run.clone(), &budget) {
                    Ok(colored) => document.splice(*run.start(), &lines[run.clone()], colored),
                    Err(err) if err.is_interrupted() => {
                        timed_out = true;
                        break;
                    }
                    Err(err) => {
                        log::warn!("highlight failed: {}", err);
                        let source = &lines[run.clone()];
                        document.splice(*run.start(), source, source.to_vec());
                    }
                }
            }
        }

        if timed_out {
            log::debug!("highlight pass interrupted, keeping previous output");
        }

        RefreshOutcome {
            lines: document.render(lines, view_start, view_end),
            mode,
            timed_out,
        }
    }
}
