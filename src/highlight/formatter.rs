//! トークナイザ／フォーマッタ
//!
//! ハイライタへ注入する境界。既定実装は syntect による24ビットANSI出力。

use crate::cancel::Budget;
use crate::error::HighlightError;
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

/// 既定のテーマ
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

const RESET: &str = "\x1b[0m";

/// 構文定義の正規表現を初回利用前にコンパイルさせるための入力
const WARM_UP_SOURCE: &str = "fn main() {\n    let value = 1; // note\n    let text = \"s\";\n}\n";

/// ソース片を色付きテキストへ変換する
///
/// 出力は入力と同じ行数でなければならない。時間予算は実装側で
/// 適宜確認する。
pub trait Formatter: Send + Sync {
    fn name(&self) -> &str;

    fn format(&self, source: &str, budget: &Budget) -> Result<String, HighlightError>;
}

/// 読み込み済みの構文定義とテーマ
#[derive(Debug, Clone)]
pub struct SyntaxAssets {
    syntaxes: Arc<SyntaxSet>,
    themes: Arc<ThemeSet>,
}

impl SyntaxAssets {
    /// syntect 同梱の定義を読み込む
    pub fn load_defaults() -> Self {
        Self {
            syntaxes: Arc::new(SyntaxSet::load_defaults_newlines()),
            themes: Arc::new(ThemeSet::load_defaults()),
        }
    }

    pub fn syntaxes(&self) -> &SyntaxSet {
        &self.syntaxes
    }

    pub fn themes(&self) -> &ThemeSet {
        &self.themes
    }

    /// ファイル名から構文を選ぶ（拡張子→ファイル名→プレーンテキスト）
    pub fn syntax_for_file(&self, filename: &str) -> &SyntaxReference {
        let path = Path::new(filename);
        let by_extension = path
            .extension()
            .and_then(OsStr::to_str)
            .and_then(|ext| self.syntaxes.find_syntax_by_extension(ext));
        let by_name = || {
            path.file_name()
                .and_then(OsStr::to_str)
                .and_then(|name| self.syntaxes.find_syntax_by_extension(name))
        };

        by_extension
            .or_else(by_name)
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text())
    }

    fn theme(&self, name: &str) -> Theme {
        self.themes
            .themes
            .get(name)
            .or_else(|| {
                log::warn!("unknown theme {}, falling back to {}", name, DEFAULT_THEME);
                self.themes.themes.get(DEFAULT_THEME)
            })
            .cloned()
            .unwrap_or_default()
    }
}

/// syntect を使った端末向けフォーマッタ
#[derive(Debug, Clone)]
pub struct SyntectFormatter {
    assets: SyntaxAssets,
    syntax_name: String,
    theme: Theme,
}

impl SyntectFormatter {
    pub fn for_file(filename: &str, theme: &str) -> Self {
        Self::with_assets(SyntaxAssets::load_defaults(), filename, theme)
    }

    /// 読み込み済みの定義を共有して作成
    pub fn with_assets(assets: SyntaxAssets, filename: &str, theme: &str) -> Self {
        let syntax_name = assets.syntax_for_file(filename).name.clone();
        let theme = assets.theme(theme);
        log::debug!("highlighter for {} uses syntax {}", filename, syntax_name);
        let formatter = Self {
            assets,
            syntax_name,
            theme,
        };
        formatter.warm_up();
        formatter
    }

    /// 遅延コンパイルされる正規表現を作成時に一度通しておく
    fn warm_up(&self) {
        let started = Instant::now();
        match self.format(WARM_UP_SOURCE, &Budget::unbounded()) {
            Ok(_) => log::debug!(
                "warmed up syntax {} in {:?}",
                self.syntax_name,
                started.elapsed()
            ),
            Err(err) => log::debug!("warm-up for syntax {} failed: {}", self.syntax_name, err),
        }
    }

    fn syntax(&self) -> &SyntaxReference {
        let syntaxes = self.assets.syntaxes();
        syntaxes
            .find_syntax_by_name(&self.syntax_name)
            .unwrap_or_else(|| syntaxes.find_syntax_plain_text())
    }
}

impl Formatter for SyntectFormatter {
    fn name(&self) -> &str {
        &self.syntax_name
    }

    fn format(&self, source: &str, budget: &Budget) -> Result<String, HighlightError> {
        let syntaxes = self.assets.syntaxes();
        let mut highlighter = HighlightLines::new(self.syntax(), &self.theme);
        let mut output = String::with_capacity(source.len() * 2);

        for line in LinesWithEndings::from(source) {
            budget.check()?;
            let ranges = highlighter
                .highlight_line(line, syntaxes)
                .map_err(|err| HighlightError::Formatter(err.to_string()))?;
            let escaped = as_24_bit_terminal_escaped(&ranges, false);

            // 行ごとに装飾をリセットする
            match escaped.strip_suffix('\n') {
                Some(body) => {
                    output.push_str(body);
                    output.push_str(RESET);
                    output.push('\n');
                }
                None => {
                    output.push_str(&escaped);
                    output.push_str(RESET);
                }
            }
        }

        Ok(output)
    }
}
