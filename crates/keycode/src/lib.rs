//! keycode: numeric key codes and the key identifiers they resolve to.
//!
//! - `KeyCode`: a producer-supplied numeric code (Windows VK / DOM `keyCode`).
//! - `ResolvedKey`: the identifier a webview understands (`"Enter"`, `","`,
//!   `"A"`).
//! - `resolve`: table lookup with a code-point fallback.
//!
//! Two static tables drive resolution: named keys (control, navigation,
//! meta, numpad, function and lock keys) and OEM punctuation keys. The tables
//! share no codes.

mod code;
pub use code::{KeyCode, ParseKeyCodeError};

mod resolve;
pub use resolve::{ResolvedKey, resolve};

mod table;
pub use table::{NAMED_KEYS, OEM_KEYS};
