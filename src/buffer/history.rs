//! 編集履歴
//!
//! 行＋カーソルのスナップショットを上限付きで保持する。
//! `entries[index]` は常に確定済みの現在状態と一致する。

use super::position::Position;
use std::collections::VecDeque;

/// 行とカーソルの不変コピー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub lines: Vec<String>,
    pub cursor: Position,
    /// 作成時点の編集リビジョン
    pub revision: u64,
}

impl Snapshot {
    pub fn new(lines: Vec<String>, cursor: Position) -> Self {
        Self {
            lines,
            cursor,
            revision: 0,
        }
    }

    pub fn at_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }
}

/// 上限付きスナップショット履歴
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Snapshot>,
    index: usize,
    max_entries: usize,
}

impl History {
    /// 初期スナップショットを保存して作成
    pub fn new(initial: Snapshot, max_entries: usize) -> Self {
        let mut entries = VecDeque::with_capacity(max_entries.min(128));
        entries.push_back(initial);
        Self {
            entries,
            index: 0,
            max_entries: max_entries.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// 変更前のチェックポイント
    ///
    /// リドゥ側を破棄し、現在位置のエントリを実際の状態で更新する。
    pub fn checkpoint(&mut self, current: Snapshot) {
        self.entries.truncate(self.index + 1);
        self.entries[self.index] = current;
    }

    /// 変更後の状態を確定
    pub fn commit(&mut self, after: Snapshot) {
        self.entries.push_back(after);
        self.index = self.entries.len() - 1;

        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
            self.index -= 1;
        }
    }

    /// 1つ前の状態を返す（境界では None）
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.entries[self.index] = current;
        self.index -= 1;
        Some(self.entries[self.index].clone())
    }

    /// 1つ後の状態を返す（境界では None）
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.entries[self.index] = current;
        self.index += 1;
        Some(self.entries[self.index].clone())
    }
}
