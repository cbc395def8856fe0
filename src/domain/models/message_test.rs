use anyhow::Result;

use super::Author;
use super::Message;
use super::MessageType;
use crate::configuration::Config;
use crate::configuration::ConfigKey;

#[test]
fn it_executes_new() {
    let msg = Message::new(Author::Assistant, "Hi there!");
    assert_eq!(msg.author, Author::Assistant);
    assert_eq!(msg.author.to_string(), "Crewforge");
    assert_eq!(msg.text, "Hi there!".to_string());
    assert_eq!(msg.mtype, MessageType::Normal);
    assert!(msg.id.starts_with("ai-"));
}

#[test]
fn it_executes_new_replacing_tabs() {
    let msg = Message::new(Author::Assistant, "\t\tHi there!");
    assert_eq!(msg.text, "    Hi there!".to_string());
}

#[test]
fn it_executes_new_with_type() {
    let msg = Message::new_with_type(Author::Assistant, MessageType::Error, "It broke!");
    assert_eq!(msg.text, "It broke!".to_string());
    assert_eq!(msg.message_type(), MessageType::Error);
}

#[test]
fn it_names_users_from_config() {
    Config::set(ConfigKey::Username, "ada");
    let msg = Message::new(Author::User, "a todo app");
    assert_eq!(msg.author.to_string(), "ada");
    assert!(msg.id.starts_with("user-"));
}

#[test]
fn it_mints_unique_ids() {
    let first = Message::new(Author::User, "one");
    let second = Message::new(Author::User, "two");
    assert_ne!(first.id, second.id);
}

#[test]
fn it_overrides_ids() {
    let msg = Message::new(Author::Assistant, "Hello").with_id("initial-greeting");
    assert_eq!(msg.id, "initial-greeting");
}

#[test]
fn it_round_trips_through_json() -> Result<()> {
    let msg = Message::new_with_type(Author::Assistant, MessageType::Error, "Nope");
    let payload = serde_json::to_string(&msg)?;
    assert!(payload.contains(r#""author":"assistant""#));
    assert!(payload.contains(r#""mtype":"error""#));
    assert!(payload.contains(r#""createdAt":"#));

    let parsed: Message = serde_json::from_str(&payload)?;
    assert_eq!(parsed, msg);

    return Ok(());
}

#[test]
fn it_defaults_missing_message_type() -> Result<()> {
    let msg: Message = serde_json::from_str(
        r#"{"id":"ai-1","author":"assistant","text":"hi","createdAt":"2024-01-01T00:00:00Z"}"#,
    )?;
    assert_eq!(msg.message_type(), MessageType::Normal);

    return Ok(());
}

#[test]
fn it_executes_as_string_lines() {
    let msg = Message::new(Author::Assistant, "Hi there, it's me! How are you?");
    assert_eq!(
        msg.as_string_lines(10),
        vec!["Hi there,", "it's me!", "How are", "you?"]
    );
}

#[test]
fn it_executes_as_string_lines_with_blank_lines() {
    let msg = Message::new(Author::Assistant, "Hi\n\nthere");
    assert_eq!(msg.as_string_lines(10), vec!["Hi", " ", "there"]);
}

#[test]
fn it_keeps_long_words_on_their_own_line() {
    let msg = Message::new(Author::Assistant, "a supercalifragilistic word");
    assert_eq!(
        msg.as_string_lines(8),
        vec!["a", "supercalifragilistic", "word"]
    );
}
