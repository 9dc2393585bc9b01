use super::*;

#[test]
fn edits_at_the_cursor() {
    let mut input = Input::with_text("qa");
    input.home();
    input.insert_char('Q');
    input.delete();
    assert_eq!(input.buf, "Qa");
    input.end();
    input.backspace();
    input.insert_char('A');
    assert_eq!(input.buf, "QA");
    assert_eq!(input.cursor, 2);
}

#[test]
fn handles_multibyte_characters() {
    let mut input = Input::with_text("ünï");
    input.move_left();
    input.backspace();
    assert_eq!(input.buf, "üï");
    input.move_left();
    input.move_left();
    input.move_left();
    assert_eq!(input.cursor, 0);
    input.delete();
    assert_eq!(input.buf, "ï");
}

#[test]
fn masking_hides_content_but_keeps_length() {
    let input = Input::with_text("ghp_secret");
    let shown = input.display(true);
    assert!(!shown.contains("secret"));
    assert_eq!(shown.chars().count(), 10);
    assert_eq!(input.display(false), "ghp_secret");
}
