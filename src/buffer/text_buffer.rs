//! テキストバッファ
//!
//! `BufferState` を RwLock で包んだスレッドセーフなハンドル。
//! 参照系は共有ロック、変更系は排他ロックを取り、完了まで保持する。

use super::position::{Position, Selection};
use super::state::BufferState;
use crate::cancel::CancelToken;
use crate::config::BufferConfig;
use crate::error::buffer::Result;
use crate::search::{self, SearchMatch, SearchResults};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

/// これを超えた操作はデバッグログに記録する
const SLOW_OPERATION: Duration = Duration::from_millis(1);

/// 行配列ベースの編集バッファ
#[derive(Debug)]
pub struct TextBuffer {
    state: RwLock<BufferState>,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuffer {
    /// 空のバッファ（1行の空行）
    pub fn new() -> Self {
        Self::from_str("")
    }

    /// 文字列から作成
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> Self {
        Self::from_str_with_config(text, &BufferConfig::default())
    }

    pub fn from_str_with_config(text: &str, config: &BufferConfig) -> Self {
        Self {
            state: RwLock::new(BufferState::new(text, config.clone())),
        }
    }

    /// 履歴上限を指定して作成
    pub fn with_max_history(text: &str, max_history: usize) -> Self {
        let config = BufferConfig {
            max_history,
            ..BufferConfig::default()
        };
        Self::from_str_with_config(text, &config)
    }

    fn read(&self) -> RwLockReadGuard<'_, BufferState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BufferState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 排他ロック下で操作を実行し、遅い操作を記録する
    fn mutate<T>(&self, name: &str, op: impl FnOnce(&mut BufferState) -> T) -> T {
        let started = Instant::now();
        let result = {
            let mut state = self.write();
            op(&mut state)
        };
        let elapsed = started.elapsed();
        if elapsed > SLOW_OPERATION {
            log::debug!("slow buffer operation {}: {:?}", name, elapsed);
        }
        result
    }

    // ---- 参照系 ----

    pub fn content(&self) -> String {
        self.read().content()
    }

    pub fn lines(&self) -> Vec<String> {
        self.read().lines.clone()
    }

    /// 指定範囲の行（終端は排他的、範囲外は切り詰める）
    pub fn lines_range(&self, start: usize, end: usize) -> Vec<String> {
        self.read().lines_range(start, end)
    }

    pub fn line(&self, index: usize) -> Option<String> {
        self.read().lines.get(index).cloned()
    }

    pub fn line_count(&self) -> usize {
        self.read().lines.len()
    }

    pub fn cursor(&self) -> Position {
        self.read().cursor
    }

    pub fn selection(&self) -> Option<Selection> {
        self.read().selection
    }

    pub fn has_selection(&self) -> bool {
        self.read().selection.is_some()
    }

    pub fn is_select_all_anchored(&self) -> bool {
        self.read().mode.anchor().is_some()
    }

    pub fn selected_text(&self) -> String {
        self.read().selected_text()
    }

    /// カーソル下の単語範囲（ハイライト用）
    pub fn word_bounds_at_cursor(&self) -> Option<(usize, usize)> {
        self.read().word_bounds_at_cursor()
    }

    pub fn cursor_display_column(&self, tab_width: usize) -> usize {
        self.read().cursor_display_column(tab_width)
    }

    /// 変更検出用シグネチャ
    pub fn signature(&self) -> u64 {
        self.read().signature
    }

    pub fn is_modified(&self) -> bool {
        self.read().is_modified()
    }

    /// 現在の内容を保存済みとして記録
    pub fn mark_saved(&self) {
        self.write().mark_saved();
    }

    pub fn history_len(&self) -> usize {
        self.read().history.len()
    }

    pub fn history_index(&self) -> usize {
        self.read().history.index()
    }

    pub fn can_undo(&self) -> bool {
        self.read().history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.read().history.can_redo()
    }

    // ---- カーソル・選択 ----

    pub fn set_cursor(&self, pos: Position) {
        self.write().set_cursor(pos);
    }

    pub fn move_cursor_delta(&self, delta_line: isize, delta_column: isize, extend: bool) {
        self.write().move_cursor_delta(delta_line, delta_column, extend);
    }

    pub fn move_to_word_boundary(&self, forward: bool, extend: bool) {
        self.write().move_to_word_boundary(forward, extend);
    }

    pub fn move_to_line_start(&self, extend: bool) {
        self.write().move_to_line_start(extend);
    }

    pub fn move_to_line_end(&self, extend: bool) {
        self.write().move_to_line_end(extend);
    }

    pub fn go_to_line(&self, line: usize) {
        self.write().go_to_line(line);
    }

    pub fn select_all(&self) {
        self.write().select_all();
    }

    pub fn select_line(&self) {
        self.write().select_line();
    }

    /// カーソル下の単語を選択。単語がなければ false
    pub fn select_word(&self) -> bool {
        self.write().select_word()
    }

    pub fn set_selection(&self, selection: Selection) -> Result<()> {
        self.write().set_selection(selection)
    }

    pub fn clear_selection(&self) {
        self.write().clear_selection();
    }

    // ---- 編集 ----

    /// カーソル位置へ挿入（選択範囲があれば置換）
    pub fn insert_text(&self, text: &str) -> Result<()> {
        self.mutate("insert_text", |state| state.insert_text(text))
    }

    /// 1文字削除（選択範囲があればそれを削除）
    pub fn delete_char(&self, backward: bool) -> Result<()> {
        self.mutate("delete_char", |state| state.delete_char(backward))
    }

    /// 選択範囲を削除。選択がなければ false
    pub fn delete_selection(&self) -> bool {
        self.mutate("delete_selection", BufferState::delete_selection)
    }

    pub fn undo(&self) -> bool {
        self.mutate("undo", BufferState::undo)
    }

    pub fn redo(&self) -> bool {
        self.mutate("redo", BufferState::redo)
    }

    // ---- 検索 ----

    pub fn find_text(&self, query: &str, case_sensitive: bool) -> Vec<SearchMatch> {
        search::find_text(&self.read().lines, query, case_sensitive)
    }

    pub fn find_text_cancellable(
        &self,
        query: &str,
        case_sensitive: bool,
        cancel: &CancelToken,
    ) -> Vec<SearchMatch> {
        search::find_text_cancellable(&self.read().lines, query, case_sensitive, cancel)
    }

    pub fn find_regex(&self, pattern: &str, case_sensitive: bool) -> Result<Vec<SearchMatch>> {
        search::find_regex(&self.read().lines, pattern, case_sensitive)
    }

    /// 検索してカーソル行に最も近いマッチを現在位置とした結果を返す
    pub fn search(&self, query: &str, case_sensitive: bool) -> SearchResults {
        let (matches, line) = {
            let state = self.read();
            (
                search::find_text(&state.lines, query, case_sensitive),
                state.cursor.line,
            )
        };
        let mut results = SearchResults::new(query, matches);
        results.select_nearest(line);
        results
    }
}
