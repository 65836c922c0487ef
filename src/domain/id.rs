//! Task identifiers
//!
//! ID Format:
//! - Explicit IDs: any non-empty string supplied by the caller (e.g. `A`, `api-42`)
//! - Derived IDs: `t_{n}` where `n < 100000`, folded from the title (e.g. `t_624`)
//!
//! Derived IDs are a pure function of the title. Same title always produces
//! the same ID, different titles usually (not always) differ.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ID returned for an empty title
const EMPTY_TITLE_ID: &str = "t_0";

/// Seed of the title fold
const HASH_SEED: u32 = 17;

/// Perturbation applied whenever the accumulator is divisible by 11
const HASH_PERTURBATION: u32 = 0x5a5a;

/// Derived IDs are reduced modulo this value
const HASH_MODULUS: u32 = 100_000;

/// Identifier of a task within a collection
///
/// The empty string is representable so that validation can report it;
/// see [`crate::domain::validate_task`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Creates an ID from any string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derives the ID for a title
    pub fn from_title(title: &str) -> Self {
        id_from_title(title)
    }

    /// Returns the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the ID is empty (invalid for a stored task)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl FromStr for TaskId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().to_string()))
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derives a short deterministic ID (`t_{n}`) from a title
///
/// Folds the UTF-16 code units of the title into a wrapping `u32`
/// (`h = h * 31 + unit`), xor-ing in `0x5a5a` whenever the accumulator is
/// divisible by 11.
pub fn id_from_title(title: &str) -> TaskId {
    if title.is_empty() {
        return TaskId::new(EMPTY_TITLE_ID);
    }

    let mut h = HASH_SEED;
    for unit in title.encode_utf16() {
        h = h.wrapping_mul(31).wrapping_add(u32::from(unit));
        if h % 11 == 0 {
            h ^= HASH_PERTURBATION;
        }
    }

    TaskId(format!("t_{}", h % HASH_MODULUS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_title_maps_to_t_0() {
        assert_eq!(id_from_title("").as_str(), "t_0");
    }

    #[test]
    fn single_char_fold() {
        // 17 * 31 + 'a' = 624
        assert_eq!(id_from_title("a").as_str(), "t_624");
    }

    #[test]
    fn two_char_fold() {
        // 624 * 31 + 'b' = 19442
        assert_eq!(id_from_title("ab").as_str(), "t_19442");
    }

    #[test]
    fn perturbation_applies_on_multiple_of_eleven() {
        // 17 * 31 = 527 = 11 * 47 + 10, so code unit 1 lands on 528 = 11 * 48
        let title = "\u{1}";
        assert_eq!(id_from_title(title).as_str(), "t_22602");
    }

    #[test]
    fn deterministic() {
        let a = id_from_title("Implement Login");
        let b = id_from_title("Implement Login");
        let c = id_from_title("Other");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn derived_id_shape() {
        for title in ["Login Bug", "CI Fix", "Feature: Boards", "Ünïcödé ✓"] {
            let id = id_from_title(title);
            let digits = id.as_str().strip_prefix("t_").unwrap();
            let n: u32 = digits.parse().unwrap();
            assert!(n < 100_000);
        }
    }

    #[test]
    fn non_bmp_characters_fold_as_surrogate_pairs() {
        // One astral character is two UTF-16 code units
        let astral = id_from_title("😀");
        let mut h: u32 = 17;
        for unit in [0xD83Du32, 0xDE00u32] {
            h = h.wrapping_mul(31).wrapping_add(unit);
            if h % 11 == 0 {
                h ^= 0x5a5a;
            }
        }
        assert_eq!(astral.as_str(), format!("t_{}", h % 100_000));
    }

    #[test]
    fn serde_is_transparent() {
        let id = TaskId::new("A");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"A\"");
        let parsed: TaskId = serde_json::from_str("\"t_42\"").unwrap();
        assert_eq!(parsed.as_str(), "t_42");
    }

    #[test]
    fn parse_trims_whitespace() {
        let id: TaskId = "  t_1 ".parse().unwrap();
        assert_eq!(id.as_str(), "t_1");
    }
}
