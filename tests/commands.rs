use genny::commands::Command;
use std::path::PathBuf;

#[test]
fn test_blank_line_is_ignored() {
    assert_eq!(Command::parse("   "), None);
}

#[test]
fn test_plain_text_is_a_question() {
    assert_eq!(
        Command::parse("  What are my chances at Yale?  "),
        Some(Command::Ask("What are my chances at Yale?".to_string()))
    );
}

#[test]
fn test_upload_takes_several_paths() {
    assert_eq!(
        Command::parse("/upload transcript.pdf  scores.png"),
        Some(Command::Upload(vec![
            PathBuf::from("transcript.pdf"),
            PathBuf::from("scores.png")
        ]))
    );
    assert_eq!(Command::parse("/upload"), Some(Command::Upload(Vec::new())));
}

#[test]
fn test_names_keep_inner_spaces() {
    assert_eq!(
        Command::parse("/save Jane Doe"),
        Some(Command::Save("Jane Doe".to_string()))
    );
    assert_eq!(Command::parse("/LOAD  Jane"), Some(Command::Load("Jane".to_string())));
}

#[test]
fn test_aliases() {
    assert_eq!(Command::parse("/list"), Some(Command::Students));
    assert_eq!(Command::parse("/new"), Some(Command::Reset));
    assert_eq!(Command::parse("/?"), Some(Command::Help));
    assert_eq!(Command::parse("/exit"), Some(Command::Quit));
    assert_eq!(
        Command::parse("/frobnicate now"),
        Some(Command::Unknown("frobnicate".to_string()))
    );
}
