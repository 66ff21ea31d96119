//! テキストバッファ
//!
//! 行配列・カーソル・選択範囲・アンドゥ履歴を持つ編集モデル。

pub mod history;
pub mod position;
pub mod signature;
pub mod word;

mod state;
mod text_buffer;

pub use history::{History, Snapshot};
pub use position::{Position, Selection, SelectionMode};
pub use signature::content_signature;
pub use text_buffer::TextBuffer;
