//! バッファ状態と編集ロジック
//!
//! ロックを持たない内部表現。`TextBuffer` が RwLock 越しに操作する。
//! すべての変更操作は検証を先に済ませ、失敗時は何も変更しない。

use super::history::{History, Snapshot};
use super::position::{byte_index, char_len, Position, Selection, SelectionMode};
use super::signature::content_signature;
use super::word;
use crate::config::BufferConfig;
use crate::error::BufferError;
use crate::error::buffer::Result;
use unicode_width::UnicodeWidthChar;

/// 改行コードの正規化（CRLF / CR → LF）
pub(crate) fn normalize_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

#[derive(Debug, Clone)]
pub(crate) struct BufferState {
    pub(crate) lines: Vec<String>,
    pub(crate) cursor: Position,
    pub(crate) selection: Option<Selection>,
    pub(crate) mode: SelectionMode,
    pub(crate) history: History,
    pub(crate) signature: u64,
    /// 現在の内容を表す編集リビジョン（編集ごとに一意）
    revision: u64,
    last_revision: u64,
    saved_revision: u64,
    config: BufferConfig,
}

impl BufferState {
    pub(crate) fn new(text: &str, config: BufferConfig) -> Self {
        let lines: Vec<String> = normalize_line_endings(text)
            .split('\n')
            .map(str::to_string)
            .collect();
        let cursor = Position::origin();
        let signature = content_signature(
            &lines,
            config.large_file_lines,
            config.signature_sample_lines,
        );
        let history = History::new(Snapshot::new(lines.clone(), cursor), config.max_history);

        Self {
            lines,
            cursor,
            selection: None,
            mode: SelectionMode::Normal,
            history,
            signature,
            revision: 0,
            last_revision: 0,
            saved_revision: 0,
            config,
        }
    }

    // ---- 参照系 ----

    pub(crate) fn content(&self) -> String {
        self.lines.join("\n")
    }

    pub(crate) fn line_len(&self, line: usize) -> usize {
        self.lines.get(line).map(|text| char_len(text)).unwrap_or(0)
    }

    fn last_line(&self) -> usize {
        self.lines.len().saturating_sub(1)
    }

    pub(crate) fn lines_range(&self, start: usize, end: usize) -> Vec<String> {
        let end = end.min(self.lines.len());
        let start = start.min(end);
        self.lines[start..end].to_vec()
    }

    /// 保存時点のリビジョンと比較する（シグネチャの標本化に依存しない）
    pub(crate) fn is_modified(&self) -> bool {
        self.revision != self.saved_revision
    }

    pub(crate) fn mark_saved(&mut self) {
        self.saved_revision = self.revision;
    }

    /// 空でない選択範囲
    fn active_selection(&self) -> Option<Selection> {
        self.selection.filter(|sel| !sel.is_empty())
    }

    pub(crate) fn selected_text(&self) -> String {
        let Some(selection) = self.selection else {
            return String::new();
        };
        let (start, end) = selection.normalized();
        if start.line >= self.lines.len() || end.line >= self.lines.len() {
            return String::new();
        }

        if start.line == end.line {
            let line = &self.lines[start.line];
            let from = byte_index(line, start.column);
            let to = byte_index(line, end.column);
            return if from < to {
                line[from..to].to_string()
            } else {
                String::new()
            };
        }

        let mut result = String::new();
        let first = &self.lines[start.line];
        result.push_str(&first[byte_index(first, start.column)..]);
        result.push('\n');

        for line in &self.lines[start.line + 1..end.line] {
            result.push_str(line);
            result.push('\n');
        }

        let last = &self.lines[end.line];
        result.push_str(&last[..byte_index(last, end.column)]);
        result
    }

    pub(crate) fn word_bounds_at_cursor(&self) -> Option<(usize, usize)> {
        let line = self.lines.get(self.cursor.line)?;
        word::word_bounds(line, self.cursor.column)
    }

    /// カーソルの表示列（端末セル単位、タブは次のタブストップまで）
    pub(crate) fn cursor_display_column(&self, tab_width: usize) -> usize {
        let tab_width = tab_width.max(1);
        let Some(line) = self.lines.get(self.cursor.line) else {
            return 0;
        };
        line.chars()
            .take(self.cursor.column)
            .fold(0, |col, ch| match ch {
                '\t' => (col / tab_width + 1) * tab_width,
                _ => col + ch.width().unwrap_or(0),
            })
    }

    // ---- 検証 ----

    pub(crate) fn clamp(&self, pos: Position) -> Position {
        if self.lines.is_empty() {
            return Position::origin();
        }
        let line = pos.line.min(self.last_line());
        let column = pos.column.min(self.line_len(line));
        Position::new(line, column)
    }

    fn validate_structure(&self) -> Result<()> {
        if self.lines.is_empty() {
            return Err(BufferError::EmptyBuffer);
        }
        Ok(())
    }

    fn validate_position(&self, pos: Position) -> Result<()> {
        if !pos.is_valid_in(&self.lines) {
            return Err(BufferError::InvalidPosition {
                line: pos.line,
                column: pos.column,
            });
        }
        Ok(())
    }

    fn validate_selection(&self, selection: Option<Selection>) -> Result<()> {
        match selection {
            Some(sel) if !sel.is_valid_in(&self.lines) => Err(BufferError::InvalidRange {
                start: sel.start,
                end: sel.end,
            }),
            _ => Ok(()),
        }
    }

    fn validate_for_edit(&self) -> Result<()> {
        self.validate_structure()?;
        self.validate_position(self.cursor)?;
        self.validate_selection(self.selection)
    }

    // ---- 履歴 ----

    fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.lines.clone(), self.cursor).at_revision(self.revision)
    }

    fn begin_edit(&mut self) {
        self.history.checkpoint(self.snapshot());
        self.mode = SelectionMode::Normal;
    }

    fn finish_edit(&mut self) {
        self.selection = None;
        self.last_revision += 1;
        self.revision = self.last_revision;
        self.refresh_signature();
        self.history.commit(self.snapshot());
    }

    fn refresh_signature(&mut self) {
        self.signature = content_signature(
            &self.lines,
            self.config.large_file_lines,
            self.config.signature_sample_lines,
        );
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.lines = snapshot.lines;
        self.revision = snapshot.revision;
        self.cursor = self.clamp(snapshot.cursor);
        self.selection = None;
        self.mode = SelectionMode::Normal;
        self.refresh_signature();
    }

    pub(crate) fn undo(&mut self) -> bool {
        match self.history.undo(self.snapshot()) {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    pub(crate) fn redo(&mut self) -> bool {
        match self.history.redo(self.snapshot()) {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    // ---- カーソル移動 ----

    pub(crate) fn set_cursor(&mut self, pos: Position) {
        self.cursor = self.clamp(pos);
    }

    pub(crate) fn go_to_line(&mut self, line: usize) {
        self.cursor = self.clamp(Position::new(line, 0));
        self.selection = None;
        self.mode = SelectionMode::Normal;
    }

    /// 全選択アンカーの遷移。移動を消費した場合 true
    fn resolve_anchor(&mut self, extend: bool) -> bool {
        if let SelectionMode::SelectAllAnchored(anchor) = self.mode {
            self.mode = SelectionMode::Normal;
            if !extend {
                self.cursor = self.clamp(anchor);
                self.selection = None;
                return true;
            }
        }
        false
    }

    fn move_with<F>(&mut self, extend: bool, target: F)
    where
        F: FnOnce(&Self) -> Position,
    {
        if self.resolve_anchor(extend) {
            return;
        }

        if extend && self.selection.is_none() {
            self.selection = Some(Selection::caret(self.cursor));
        }

        let next = target(self);
        self.cursor = self.clamp(next);

        if extend {
            if let Some(selection) = self.selection.as_mut() {
                selection.end = self.cursor;
            }
        } else {
            self.selection = None;
        }
    }

    pub(crate) fn move_cursor_delta(&mut self, delta_line: isize, delta_column: isize, extend: bool) {
        self.move_with(extend, |state| state.delta_target(delta_line, delta_column));
    }

    fn delta_target(&self, delta_line: isize, delta_column: isize) -> Position {
        let last = self.last_line() as isize;
        let mut line = (self.cursor.line as isize).saturating_add(delta_line).clamp(0, last);
        let mut column = (self.cursor.column as isize).saturating_add(delta_column);

        if delta_column < 0 && column < 0 && line > 0 {
            line -= 1;
            column = self.line_len(line as usize) as isize;
        } else if delta_column > 0
            && column > self.line_len(line as usize) as isize
            && line < last
        {
            line += 1;
            column = 0;
        }

        Position::new(line as usize, column.max(0) as usize)
    }

    pub(crate) fn move_to_word_boundary(&mut self, forward: bool, extend: bool) {
        self.move_with(extend, |state| {
            if forward {
                word::next_word_boundary(&state.lines, state.cursor)
            } else {
                word::prev_word_boundary(&state.lines, state.cursor)
            }
        });
    }

    pub(crate) fn move_to_line_start(&mut self, extend: bool) {
        self.move_with(extend, |state| Position::new(state.cursor.line, 0));
    }

    pub(crate) fn move_to_line_end(&mut self, extend: bool) {
        self.move_with(extend, |state| {
            Position::new(state.cursor.line, state.line_len(state.cursor.line))
        });
    }

    // ---- 選択 ----

    pub(crate) fn select_all(&mut self) {
        let anchor = self.mode.anchor().unwrap_or(self.cursor);
        let last = self.last_line();
        let end = Position::new(last, self.line_len(last));

        self.mode = SelectionMode::SelectAllAnchored(anchor);
        self.selection = Some(Selection::new(Position::origin(), end));
        self.cursor = end;
    }

    pub(crate) fn select_line(&mut self) {
        let line = self.cursor.line;
        let end = Position::new(line, self.line_len(line));
        self.mode = SelectionMode::Normal;
        self.selection = Some(Selection::new(Position::new(line, 0), end));
        self.cursor = end;
    }

    pub(crate) fn select_word(&mut self) -> bool {
        let Some((start, end)) = self.word_bounds_at_cursor() else {
            return false;
        };
        let line = self.cursor.line;
        self.mode = SelectionMode::Normal;
        self.selection = Some(Selection::new(Position::new(line, start), Position::new(line, end)));
        self.cursor = Position::new(line, end);
        true
    }

    pub(crate) fn set_selection(&mut self, selection: Selection) -> Result<()> {
        self.validate_selection(Some(selection))?;
        self.mode = SelectionMode::Normal;
        self.selection = Some(selection);
        Ok(())
    }

    pub(crate) fn clear_selection(&mut self) {
        self.selection = None;
        self.mode = SelectionMode::Normal;
    }

    // ---- 編集 ----

    /// 検証済みの選択範囲を削除する（履歴は呼び出し側で扱う）
    fn remove_selection(&mut self, selection: Selection) {
        let (start, end) = selection.normalized();

        if start.line == end.line {
            let line = &mut self.lines[start.line];
            let from = byte_index(line, start.column);
            let to = byte_index(line, end.column);
            line.replace_range(from..to, "");
        } else {
            let tail = {
                let last = &self.lines[end.line];
                last[byte_index(last, end.column)..].to_string()
            };
            let first = &mut self.lines[start.line];
            let cut = byte_index(first, start.column);
            first.truncate(cut);
            first.push_str(&tail);
            self.lines.drain(start.line + 1..=end.line);
        }

        self.cursor = start;
        self.selection = None;
    }

    pub(crate) fn insert_text(&mut self, text: &str) -> Result<()> {
        self.validate_for_edit()?;

        let normalized = normalize_line_endings(text);
        let selection = self.active_selection();
        if normalized.is_empty() && selection.is_none() {
            return Ok(());
        }

        self.begin_edit();
        if let Some(selection) = selection {
            self.remove_selection(selection);
            self.cursor = self.clamp(self.cursor);
        }

        let segments: Vec<&str> = normalized.split('\n').collect();
        if segments.len() == 1 {
            self.insert_single_line(segments[0]);
        } else {
            self.insert_multiple_lines(&segments);
        }

        self.finish_edit();
        Ok(())
    }

    fn insert_single_line(&mut self, text: &str) {
        let line = &mut self.lines[self.cursor.line];
        let at = byte_index(line, self.cursor.column);
        line.insert_str(at, text);
        self.cursor.column += char_len(text);
    }

    fn insert_multiple_lines(&mut self, segments: &[&str]) {
        let row = self.cursor.line;
        let count = segments.len();

        let current = &mut self.lines[row];
        let at = byte_index(current, self.cursor.column);
        let tail = current.split_off(at);
        current.push_str(segments[0]);

        let mut inserted: Vec<String> = segments[1..count - 1]
            .iter()
            .map(|segment| segment.to_string())
            .collect();
        let mut last = segments[count - 1].to_string();
        last.push_str(&tail);
        inserted.push(last);

        if self.lines.len() > self.config.large_file_lines {
            // 大きなファイルは新しい配列へ順に詰め直す
            let mut rebuilt = Vec::with_capacity(self.lines.len() + inserted.len());
            let mut old = std::mem::take(&mut self.lines).into_iter();
            rebuilt.extend(old.by_ref().take(row + 1));
            rebuilt.extend(inserted);
            rebuilt.extend(old);
            self.lines = rebuilt;
        } else {
            self.lines.splice(row + 1..row + 1, inserted);
        }

        self.cursor = Position::new(row + count - 1, char_len(segments[count - 1]));
    }

    pub(crate) fn delete_char(&mut self, backward: bool) -> Result<()> {
        self.validate_for_edit()?;

        if let Some(selection) = self.active_selection() {
            self.begin_edit();
            self.remove_selection(selection);
            self.finish_edit();
            return Ok(());
        }

        let Position { line, column } = self.cursor;
        let line_len = self.line_len(line);

        if backward {
            if column > 0 {
                self.begin_edit();
                let text = &mut self.lines[line];
                let at = byte_index(text, column - 1);
                text.remove(at);
                self.cursor.column -= 1;
                self.finish_edit();
            } else if line > 0 {
                self.begin_edit();
                let current = self.lines.remove(line);
                let join = self.line_len(line - 1);
                self.lines[line - 1].push_str(&current);
                self.cursor = Position::new(line - 1, join);
                self.finish_edit();
            } else {
                self.selection = None;
            }
        } else if column < line_len {
            self.begin_edit();
            let text = &mut self.lines[line];
            let at = byte_index(text, column);
            text.remove(at);
            self.finish_edit();
        } else if line < self.last_line() {
            self.begin_edit();
            let next = self.lines.remove(line + 1);
            self.lines[line].push_str(&next);
            self.finish_edit();
        } else {
            self.selection = None;
        }

        Ok(())
    }

    pub(crate) fn delete_selection(&mut self) -> bool {
        let Some(selection) = self.selection else {
            return false;
        };
        if self.validate_selection(Some(selection)).is_err() {
            return false;
        }
        if selection.is_empty() {
            self.clear_selection();
            return false;
        }

        self.begin_edit();
        self.remove_selection(selection);
        self.finish_edit();
        true
    }
}
