//! Key Derivation Module
//!
//! Turns a list of heterogeneous key parts into one cache key.

use std::fmt::{Display, Write};

/// Separator placed between rendered key parts.
pub const KEY_SEPARATOR: char = '|';

// == Generate Key ==
/// Renders every part with its `Display` form and joins them with `|`.
///
/// Parts are not escaped: `["a|b"]` and `["a", "b"]` derive the same key.
/// Callers sharing a cache must pick part lists that cannot collide.
///
/// ```
/// use mini_ttl_cache::generate_key;
///
/// assert_eq!(generate_key(&[&"part1", &123, &true]), "part1|123|true");
/// ```
pub fn generate_key(parts: &[&dyn Display]) -> String {
    let mut key = String::new();

    for (index, part) in parts.iter().enumerate() {
        if index > 0 {
            key.push(KEY_SEPARATOR);
        }
        // Writing into a String never fails
        let _ = write!(key, "{}", part);
    }

    key
}
