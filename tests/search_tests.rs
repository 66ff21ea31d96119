use gecko_core::buffer::{Position, TextBuffer};
use gecko_core::cancel::CancelToken;
use gecko_core::error::BufferError;
use gecko_core::search::{self, LiteralMatcher, SearchMatch, StringMatcher};

fn positions(matches: &[SearchMatch]) -> Vec<Position> {
    matches.iter().map(SearchMatch::position).collect()
}

#[test]
fn test_find_text_case_sensitivity() {
    let buffer = TextBuffer::from_str("say hi there");

    assert_eq!(
        positions(&buffer.find_text("Hi", false)),
        vec![Position::new(0, 4)]
    );
    assert!(buffer.find_text("Hi", true).is_empty());
}

#[test]
fn test_find_text_orders_by_line_then_column() {
    let buffer = TextBuffer::from_str("ab ab\nxx\nab");
    let found = buffer.find_text("ab", true);

    assert_eq!(
        positions(&found),
        vec![Position::new(0, 0), Position::new(0, 3), Position::new(2, 0)]
    );
    assert!(found.iter().all(|m| m.len() == 2));
}

#[test]
fn test_find_text_columns_count_chars() {
    let buffer = TextBuffer::from_str("日本語のテキスト");
    let found = buffer.find_text("テキスト", true);
    assert_eq!(found, vec![SearchMatch::new(0, 4, 8)]);
}

#[test]
fn test_cancellable_search_stops_early() {
    let buffer = TextBuffer::from_str("x\nx\nx");
    let token = CancelToken::new();
    assert_eq!(buffer.find_text_cancellable("x", true, &token).len(), 3);

    token.cancel();
    assert!(buffer.find_text_cancellable("x", true, &token).is_empty());
}

#[test]
fn test_find_regex() {
    let buffer = TextBuffer::from_str("let a = 10;\nlet bb = 200;");
    let found = buffer.find_regex(r"\d+", true).expect("valid pattern");
    assert_eq!(found, vec![SearchMatch::new(0, 8, 10), SearchMatch::new(1, 9, 12)]);

    let upper = buffer.find_regex("LET", false).expect("valid pattern");
    assert_eq!(upper.len(), 2);

    assert!(matches!(
        buffer.find_regex("[", true),
        Err(BufferError::InvalidPattern(_))
    ));
}

#[test]
fn test_search_results_navigation() {
    let buffer = TextBuffer::from_str("foo\nfoo\nbar\nfoo");
    buffer.set_cursor(Position::new(2, 0));

    let mut results = buffer.search("foo", true);
    assert_eq!(results.current().map(|m| m.line), Some(3));
    assert_eq!(results.status_message(), "Match 3 of 3 for \"foo\"");

    assert_eq!(results.next().map(|m| m.line), Some(0));
    assert_eq!(results.prev().map(|m| m.line), Some(3));

    let selection = results.current().map(|m| m.to_selection());
    buffer.set_selection(selection.unwrap()).unwrap();
    assert_eq!(buffer.selected_text(), "foo");
}

#[test]
fn test_matcher_on_raw_lines() {
    let lines = vec!["Straße".to_string(), "STRASSE".to_string()];
    let matcher = LiteralMatcher::new("straße", false);
    let found = search::scan_lines(&lines, &matcher, None);
    assert_eq!(found, vec![SearchMatch::new(0, 0, 6)]);
    assert!(matcher.find_in_line(1, &lines[1]).is_empty());
}
