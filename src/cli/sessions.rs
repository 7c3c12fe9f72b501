//! Listing of saved chats for `llm-chat sessions`.

use std::error::Error;

use crate::core::config::data::Config;
use crate::core::store::SessionStore;
use crate::ui::chat_loop::setup::open_session_store;

pub fn list_sessions() -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    let store = open_session_store(&config)?;
    for line in session_lines(&store)? {
        println!("{line}");
    }
    Ok(())
}

fn session_lines(store: &SessionStore) -> Result<Vec<String>, Box<dyn Error>> {
    let names = store.list()?;
    if names.is_empty() {
        return Ok(vec![
            "No saved chats. Use /save <name> inside a chat to keep one.".to_string(),
        ]);
    }

    let mut lines = vec![format!("💾 Saved chats ({})", names.len())];
    for name in names {
        let line = match store.load(&name) {
            Ok(session) => {
                let turns = session.transcript.len();
                if session.model.is_empty() {
                    format!("  • {name} ({turns} messages)")
                } else {
                    format!("  • {name} ({turns} messages, {})", session.model)
                }
            }
            Err(err) => format!("  • {name} (unreadable: {err})"),
        };
        lines.push(line);
    }
    lines.push(String::new());
    lines.push("💡 Reopen one with /load <name>".to_string());
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Message;
    use crate::core::session::Session;

    #[test]
    fn empty_store_prints_hint() {
        let lines = session_lines(&SessionStore::in_memory()).expect("lines");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("No saved chats"));
    }

    #[test]
    fn lists_sessions_without_reserved_keys() {
        let store = SessionStore::in_memory();
        store.set_host_address("http://box:11434").expect("host");
        let mut session = Session::new("llama3.2", "");
        session.transcript.push(Message::user("hi"));
        session.transcript.push(Message::assistant("hello"));
        store.save("greeting", &session).expect("save");

        let lines = session_lines(&store).expect("lines");
        assert_eq!(lines[0], "💾 Saved chats (1)");
        assert_eq!(lines[1], "  • greeting (2 messages, llama3.2)");
        assert!(!lines.iter().any(|line| line.contains("host-address")));
    }
}
