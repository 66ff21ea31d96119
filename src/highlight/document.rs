//! 文書全体の色付け状態とダーティ行
//!
//! 行ごとの色付け済みテキスト（未計算は None）と再計算待ちの行番号を持つ。
//! 色付け結果は元の行と組で保持し、現在の行と一致しない結果は使わない。

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

/// 1回の更新で行った処理
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// 再トークナイズなし
    Cached,
    /// ダーティ行周辺・未計算行のみ再トークナイズ
    Incremental,
    /// 全体を破棄して再計算
    Full,
}

/// 更新結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// ビューポートの行（未計算はプレーンテキスト）
    pub lines: Vec<String>,
    pub mode: RefreshMode,
    /// 時間切れ・キャンセルで中断したか
    pub timed_out: bool,
}

/// 色付けした時点の元の行と結果
#[derive(Debug, Clone)]
struct ColoredLine {
    source: String,
    colored: String,
}

#[derive(Debug, Default)]
pub(crate) struct DocumentState {
    colored: Vec<Option<ColoredLine>>,
    dirty: BTreeSet<usize>,
}

impl DocumentState {
    pub(crate) fn line_count(&self) -> usize {
        self.colored.len()
    }

    pub(crate) fn dirty_len(&self) -> usize {
        self.dirty.len()
    }

    pub(crate) fn mark_dirty(&mut self, line: usize) {
        self.dirty.insert(line);
    }

    /// 文書外を指すダーティ行を捨てる
    pub(crate) fn prune_dirty(&mut self) {
        let total = self.colored.len();
        self.dirty.retain(|&line| line < total);
    }

    pub(crate) fn mark_dirty_range(&mut self, first: usize, last: usize) {
        let (first, last) = if first <= last { (first, last) } else { (last, first) };
        self.dirty.extend(first..=last);
    }

    /// すべての行を未計算に戻す
    pub(crate) fn reset(&mut self, line_count: usize) {
        self.colored = vec![None; line_count];
        self.dirty.clear();
    }

    pub(crate) fn clear(&mut self) {
        self.reset(0);
    }

    /// ダーティ行の前後 `context` 行を含む窓を重なりごとに結合して返す
    pub(crate) fn dirty_windows(&self, context: usize) -> Vec<RangeInclusive<usize>> {
        let Some(last) = self.colored.len().checked_sub(1) else {
            return Vec::new();
        };

        let mut windows: Vec<RangeInclusive<usize>> = Vec::new();
        for &line in self.dirty.iter().filter(|&&line| line <= last) {
            let start = line.saturating_sub(context);
            let end = (line + context).min(last);
            match windows.last_mut() {
                Some(prev) if start <= prev.end() + 1 => {
                    *prev = *prev.start()..=end.max(*prev.end());
                }
                _ => windows.push(start..=end),
            }
        }
        windows
    }

    /// `start` 行目から色付け結果を差し込む（`sources` は色付け元の行）
    pub(crate) fn splice(&mut self, start: usize, sources: &[String], colored: Vec<String>) {
        for ((offset, source), colored) in sources.iter().enumerate().zip(colored) {
            if let Some(slot) = self.colored.get_mut(start + offset) {
                *slot = Some(ColoredLine {
                    source: source.clone(),
                    colored,
                });
            }
        }
    }

    /// 現在の行に対応する色付け結果
    fn colored_for<'a>(&'a self, line: usize, plain: &str) -> Option<&'a str> {
        match self.colored.get(line) {
            Some(Some(entry)) if entry.source == plain => Some(&entry.colored),
            _ => None,
        }
    }

    pub(crate) fn clean(&mut self, range: RangeInclusive<usize>) {
        for line in range {
            self.dirty.remove(&line);
        }
    }

    /// 窓内で未計算、または元の行が変わった連続区間
    pub(crate) fn missing_runs(
        &self,
        window: RangeInclusive<usize>,
        plain: &[String],
    ) -> Vec<RangeInclusive<usize>> {
        let mut runs = Vec::new();
        let mut run_start: Option<usize> = None;

        for line in window.clone() {
            let missing = line < self.colored.len()
                && plain
                    .get(line)
                    .is_some_and(|text| self.colored_for(line, text).is_none());
            match (missing, run_start) {
                (true, None) => run_start = Some(line),
                (false, Some(start)) => {
                    runs.push(start..=line - 1);
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            runs.push(start..=*window.end());
        }
        runs
    }

    /// 指定範囲を色付き（未計算・内容不一致ならプレーン）で組み立てる
    pub(crate) fn render(&self, plain: &[String], start: usize, end: usize) -> Vec<String> {
        plain[start..end]
            .iter()
            .enumerate()
            .map(|(offset, text)| {
                self.colored_for(start + offset, text)
                    .unwrap_or(text.as_str())
                    .to_string()
            })
            .collect()
    }
}
