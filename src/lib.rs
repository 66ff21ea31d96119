//! gecko-core - 端末テキストエディタの編集コア
//!
//! 行配列ベースのテキストバッファと、表示範囲を逐次色付けする
//! シンタックスハイライタ

// コアモジュール
pub mod cancel;
pub mod config;
pub mod error;
pub mod logging;

// データ層
pub mod buffer;

// ロジック層
pub mod highlight;
pub mod search;

// 公開API
pub use buffer::{Position, Selection, SelectionMode, TextBuffer};
pub use cancel::{Budget, CancelToken};
pub use config::{BufferConfig, EditorConfig, HighlightConfig};
pub use error::{BufferError, GeckoError, HighlightError, Result};
pub use highlight::{Formatter, Highlighter, RefreshMode, RefreshOutcome};
pub use search::{SearchMatch, SearchResults};
