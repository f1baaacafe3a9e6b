use anyhow::Result;

use super::Message;
use super::Role;

#[test]
fn it_deserializes_wire_messages() -> Result<()> {
    let messages: Vec<Message> = serde_json::from_str(
        r#"[
            {"role": "user", "content": "Is the vaccine safe?"},
            {"role": "assistant", "content": "I have my doubts."}
        ]"#,
    )?;

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[0].content, "Is the vaccine safe?");
    return Ok(());
}

#[test]
fn it_serializes_lowercase_roles() -> Result<()> {
    let message = Message::new(Role::Assistant, "Hello");
    let json = serde_json::to_string(&message)?;
    assert_eq!(json, r#"{"role":"assistant","content":"Hello"}"#);
    return Ok(());
}

#[test]
fn it_rejects_unknown_roles() {
    let res = serde_json::from_str::<Message>(r#"{"role": "system", "content": "nope"}"#);
    assert!(res.is_err());
}
