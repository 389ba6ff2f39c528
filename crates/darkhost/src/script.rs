//! JavaScript snippets evaluated in the webview.
//!
//! Synthetic input is delivered as DOM events on the focused element, so the
//! page sees the same `KeyboardEvent.key` values a real keyboard produces.

use relaykey::InputEvent;

use crate::settings::{SESSION_COOKIE, Session};

/// IPC message the page posts when Control+N is released.
pub const NEW_WINDOW_MSG: &str = "new-window";

/// Quote `s` as a JavaScript string literal.
fn js_str(s: &str) -> String {
    // JSON strings are valid JS string literals; serializing a &str cannot fail.
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

/// Script that dispatches `event` to the focused element.
pub fn input_event(event: &InputEvent) -> String {
    match event {
        InputEvent::KeyDown { key } => key_event("keydown", &key.to_string()),
        InputEvent::KeyUp { key } => key_event("keyup", &key.to_string()),
        InputEvent::Char { ch } => char_event(*ch),
    }
}

fn key_event(kind: &str, key: &str) -> String {
    format!(
        "(function(){{var t=document.activeElement||document.body;\
         t.dispatchEvent(new KeyboardEvent({kind},{{key:{key},bubbles:true,cancelable:true}}));}})();",
        kind = js_str(kind),
        key = js_str(key),
    )
}

fn char_event(ch: char) -> String {
    let s = js_str(&ch.to_string());
    format!(
        "(function(){{var t=document.activeElement||document.body;\
         var ok=t.dispatchEvent(new KeyboardEvent(\"keypress\",{{key:{s},charCode:{code},bubbles:true,cancelable:true}}));\
         if(ok&&(t.isContentEditable||\"value\" in t)){{document.execCommand(\"insertText\",false,{s});}}}})();",
        code = u32::from(ch),
    )
}

/// Script that reloads the page.
pub fn reload() -> &'static str {
    "window.location.reload();"
}

/// Script that navigates the current page to `url`.
pub fn navigate(url: &str) -> String {
    format!("window.location.assign({});", js_str(url))
}

/// Initialization script run on every page load.
///
/// Posts [`NEW_WINDOW_MSG`] over IPC when Control+N is released, and keeps
/// the session cookie set on pages of the session's origin.
pub fn init(session: Option<&Session>) -> String {
    let mut js = format!(
        "window.addEventListener(\"keyup\",function(e){{\
         if(e.ctrlKey&&e.code===\"KeyN\"){{window.ipc.postMessage({msg});}}}},true);",
        msg = js_str(NEW_WINDOW_MSG),
    );
    if let Some(s) = session {
        js.push_str(&format!(
            "if(window.location.href.indexOf({base})===0){{document.cookie={cookie};}}",
            base = js_str(&s.base_url),
            cookie = js_str(&format!("{}={}; path=/", SESSION_COOKIE, s.sid)),
        ));
    }
    js
}

#[cfg(test)]
mod tests {
    use keycode::ResolvedKey;

    use super::*;

    #[test]
    fn key_events_carry_resolved_key() {
        let js = input_event(&InputEvent::KeyDown {
            key: ResolvedKey::Named("Enter"),
        });
        assert!(js.contains("new KeyboardEvent(\"keydown\""), "{js}");
        assert!(js.contains("key:\"Enter\""), "{js}");
        let js = input_event(&InputEvent::KeyUp {
            key: ResolvedKey::Oem('\\'),
        });
        assert!(js.contains("\"keyup\""));
        assert!(js.contains("key:\"\\\\\""), "{js}");
    }

    #[test]
    fn char_event_escapes_quotes() {
        let js = input_event(&InputEvent::Char { ch: '"' });
        assert!(js.contains("key:\"\\\"\""), "{js}");
        assert!(js.contains("charCode:34"));
        assert!(js.contains("insertText"));
    }

    #[test]
    fn navigate_quotes_url() {
        assert_eq!(
            navigate("https://a/b?c=\"d\""),
            "window.location.assign(\"https://a/b?c=\\\"d\\\"\");"
        );
    }

    #[test]
    fn init_sets_cookie_only_with_session() {
        assert!(!init(None).contains("document.cookie"));
        let s = Session {
            base_url: "https://int1.darkorbit.com".into(),
            sid: "abc".into(),
        };
        let js = init(Some(&s));
        assert!(js.contains("\"dosid=abc; path=/\""), "{js}");
        assert!(js.contains(NEW_WINDOW_MSG));
    }
}
