use std::fmt;

use crate::{KeyCode, table};

/// The key identifier a numeric code resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResolvedKey {
    /// A named key from the named-key table, e.g. `"Enter"`.
    Named(&'static str),
    /// A punctuation character from the OEM table.
    Oem(char),
    /// Fallback: the character whose code point equals the code.
    Char(char),
}

impl ResolvedKey {
    /// True for table-backed results, false for the code-point fallback.
    pub fn is_mapped(&self) -> bool {
        !matches!(self, Self::Char(_))
    }
}

impl fmt::Display for ResolvedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Oem(ch) | Self::Char(ch) => write!(f, "{ch}"),
        }
    }
}

/// Resolve a key code to its key identifier.
///
/// Named keys win over OEM keys; anything in neither table is read as a
/// Unicode code point. Code points that are not scalar values (surrogates,
/// anything above U+10FFFF) become U+FFFD.
pub fn resolve(code: KeyCode) -> ResolvedKey {
    let raw = code.get();
    if let Some(name) = table::named(raw) {
        return ResolvedKey::Named(name);
    }
    if let Some(ch) = table::oem(raw) {
        return ResolvedKey::Oem(ch);
    }
    ResolvedKey::Char(char::from_u32(raw).unwrap_or(char::REPLACEMENT_CHARACTER))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NAMED_KEYS, OEM_KEYS};

    fn key(code: u32) -> String {
        resolve(KeyCode(code)).to_string()
    }

    #[test]
    fn every_named_code_resolves_to_its_name() {
        for &(code, name) in NAMED_KEYS {
            assert_eq!(resolve(KeyCode(code)), ResolvedKey::Named(name));
        }
        assert_eq!(key(13), "Enter");
        assert_eq!(key(37), "ArrowLeft");
        assert_eq!(key(92), "Meta");
    }

    #[test]
    fn every_oem_code_resolves_to_its_char() {
        for &(code, ch) in OEM_KEYS {
            assert_eq!(resolve(KeyCode(code)), ResolvedKey::Oem(ch));
        }
        assert_eq!(key(188), ",");
    }

    #[test]
    fn unmapped_codes_fall_back_to_code_point() {
        assert_eq!(resolve(KeyCode(65)), ResolvedKey::Char('A'));
        assert_eq!(key(48), "0");
        // 97 is Numpad1, not 'a'
        assert_eq!(key(97), "Numpad1");
        assert_eq!(key(0x263A), "\u{263A}");
        assert!(!resolve(KeyCode(65)).is_mapped());
        assert!(resolve(KeyCode(9)).is_mapped());
    }

    #[test]
    fn invalid_code_points_become_replacement() {
        assert_eq!(resolve(KeyCode(0xD800)), ResolvedKey::Char('\u{FFFD}'));
        assert_eq!(resolve(KeyCode(u32::MAX)), ResolvedKey::Char('\u{FFFD}'));
    }
}
