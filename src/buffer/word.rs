//! 単語境界
//!
//! 移動用（空白のみで区切る）とハイライト用（記号も区切りとする）の
//! 2種類の境界判定を別々に持つ。

use super::position::Position;

/// ハイライト用の区切り記号
const BOUNDARY_CHARS: &[char] = &[
    '.', ',', ';', ':', '!', '?', '(', ')', '[', ']', '{', '}', '<', '>', '"', '\'', '/', '\\',
    '|', '&', '*', '+', '-', '=', '@', '#', '$', '%', '^', '~', '`',
];

fn is_boundary(ch: char) -> bool {
    BOUNDARY_CHARS.contains(&ch)
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// 次の単語先頭（移動用）
///
/// 現在の非空白列、続く空白列を読み飛ばす。行末に達し後続行があれば次行頭へ。
pub fn next_word_boundary(lines: &[String], pos: Position) -> Position {
    let Some(line) = lines.get(pos.line) else {
        return pos;
    };
    let chars: Vec<char> = line.chars().collect();
    let mut col = pos.column.min(chars.len());

    while col < chars.len() && !chars[col].is_whitespace() {
        col += 1;
    }
    while col < chars.len() && chars[col].is_whitespace() {
        col += 1;
    }

    if col >= chars.len() && pos.line + 1 < lines.len() {
        return Position::new(pos.line + 1, 0);
    }
    Position::new(pos.line, col)
}

/// 前の単語先頭（移動用）
pub fn prev_word_boundary(lines: &[String], pos: Position) -> Position {
    let Some(line) = lines.get(pos.line) else {
        return pos;
    };
    let chars: Vec<char> = line.chars().collect();
    let mut col = pos.column.min(chars.len());

    if col == 0 {
        if pos.line > 0 {
            let prev = &lines[pos.line - 1];
            return Position::new(pos.line - 1, prev.chars().count());
        }
        return pos;
    }

    col -= 1;
    while col > 0 && chars[col].is_whitespace() {
        col -= 1;
    }
    while col > 0 && !chars[col - 1].is_whitespace() {
        col -= 1;
    }
    Position::new(pos.line, col)
}

/// カーソル下の単語範囲（ハイライト用、終端は排他的）
///
/// 空白または区切り記号上では None。英数字・アンダースコアを含まない
/// 記号列も None とする。
pub fn word_bounds(line: &str, column: usize) -> Option<(usize, usize)> {
    let chars: Vec<char> = line.chars().collect();
    if chars.is_empty() {
        return None;
    }

    let col = column.min(chars.len() - 1);
    let at = chars[col];
    if at.is_whitespace() || is_boundary(at) {
        return None;
    }

    let inside = |ch: char| !ch.is_whitespace() && !is_boundary(ch);

    let mut start = col;
    while start > 0 && inside(chars[start - 1]) {
        start -= 1;
    }
    let mut end = col + 1;
    while end < chars.len() && inside(chars[end]) {
        end += 1;
    }

    if chars[start..end].iter().copied().any(is_word_char) {
        Some((start, end))
    } else {
        None
    }
}
