//! 位置・選択範囲の値型
//!
//! 行・列はいずれも0ベース。列は行内の文字（Unicodeスカラー値）単位で数える。

use std::fmt;

/// バッファ内の1点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    /// 行番号（0ベース）
    pub line: usize,
    /// 列番号（0ベース、文字単位）
    pub column: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// 原点 (0, 0)
    pub const fn origin() -> Self {
        Self::new(0, 0)
    }

    /// 指定された行集合に対して有効な位置か判定
    pub fn is_valid_in(&self, lines: &[String]) -> bool {
        match lines.get(self.line) {
            Some(text) => self.column <= char_len(text),
            None => false,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// 2点で区切られた選択範囲（正規化されていない場合がある）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
    pub start: Position,
    pub end: Position,
}

impl Selection {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// 単一点に収束した選択範囲
    pub const fn caret(at: Position) -> Self {
        Self::new(at, at)
    }

    /// 文書順（行→列）に並べ替えた (start, end) を返す
    pub fn normalized(&self) -> (Position, Position) {
        if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        }
    }

    /// start と end を入れ替えた選択範囲
    pub fn reversed(&self) -> Self {
        Self::new(self.end, self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// 指定行が選択範囲に含まれるか
    pub fn contains_line(&self, line: usize) -> bool {
        let (start, end) = self.normalized();
        start.line <= line && line <= end.line
    }

    /// 両端が有効な位置か判定
    pub fn is_valid_in(&self, lines: &[String]) -> bool {
        self.start.is_valid_in(lines) && self.end.is_valid_in(lines)
    }
}

/// 全選択アンカーの状態
///
/// `SelectAllAnchored` は全選択前のカーソル位置を保持し、
/// 次の非拡張移動でその位置へ復帰する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    #[default]
    Normal,
    SelectAllAnchored(Position),
}

impl SelectionMode {
    pub fn anchor(&self) -> Option<Position> {
        match self {
            SelectionMode::Normal => None,
            SelectionMode::SelectAllAnchored(pos) => Some(*pos),
        }
    }
}

/// 行の文字数
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// 文字列内の文字位置をバイト位置へ変換（範囲外は末尾）
pub(crate) fn byte_index(text: &str, column: usize) -> usize {
    text.char_indices()
        .nth(column)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}
