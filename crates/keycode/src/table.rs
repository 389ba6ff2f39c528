//! Static key tables.
//!
//! Codes follow the Windows virtual-key / DOM `keyCode` numbering; names are
//! the DOM `KeyboardEvent.key` values the webview expects.

/// Named (non-printable) keys.
pub static NAMED_KEYS: &[(u32, &str)] = &[
    // control
    (8, "Backspace"),
    (9, "Tab"),
    (13, "Enter"),
    (16, "Shift"),
    (17, "Control"),
    (18, "Alt"),
    (19, "Pause"),
    (20, "CapsLock"),
    (27, "Escape"),
    (32, "Space"),
    // navigation
    (33, "PageUp"),
    (34, "PageDown"),
    (35, "End"),
    (36, "Home"),
    (37, "ArrowLeft"),
    (38, "ArrowUp"),
    (39, "ArrowRight"),
    (40, "ArrowDown"),
    (45, "Insert"),
    (46, "Delete"),
    // left and right Windows / Command both map to Meta
    (91, "Meta"),
    (92, "Meta"),
    (93, "ContextMenu"),
    // numpad digits
    (96, "Numpad0"),
    (97, "Numpad1"),
    (98, "Numpad2"),
    (99, "Numpad3"),
    (100, "Numpad4"),
    (101, "Numpad5"),
    (102, "Numpad6"),
    (103, "Numpad7"),
    (104, "Numpad8"),
    (105, "Numpad9"),
    // numpad operators
    (106, "NumpadMultiply"),
    (107, "NumpadAdd"),
    (108, "NumpadEnter"),
    (109, "NumpadSubtract"),
    (110, "NumpadDecimal"),
    (111, "NumpadDivide"),
    // function
    (112, "F1"),
    (113, "F2"),
    (114, "F3"),
    (115, "F4"),
    (116, "F5"),
    (117, "F6"),
    (118, "F7"),
    (119, "F8"),
    (120, "F9"),
    (121, "F10"),
    (122, "F11"),
    (123, "F12"),
    // locks
    (144, "NumLock"),
    (145, "ScrollLock"),
];

/// OEM punctuation keys (US layout).
pub static OEM_KEYS: &[(u32, char)] = &[
    (186, ';'),
    (187, '='),
    (188, ','),
    (189, '-'),
    (190, '.'),
    (191, '/'),
    (192, '`'),
    (219, '['),
    (220, '\\'),
    (221, ']'),
    (222, '\''),
];

/// Look up a named key.
pub(crate) fn named(code: u32) -> Option<&'static str> {
    NAMED_KEYS
        .iter()
        .find_map(|&(c, name)| (c == code).then_some(name))
}

/// Look up an OEM key.
pub(crate) fn oem(code: u32) -> Option<char> {
    OEM_KEYS.iter().find_map(|&(c, ch)| (c == code).then_some(ch))
}
