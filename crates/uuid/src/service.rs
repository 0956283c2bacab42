//! GUIDs and the generators that allocate them.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// GUID used as an `II` root. Always renders as 36 upper-case characters, hyphenated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Guid(Uuid);

impl Default for Guid {
    fn default() -> Self {
        Self::new()
    }
}

impl Guid {
    /// Generates a new random (version 4) GUID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Builds a GUID from its 128-bit value.
    pub fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Uuid::encode_buffer();
        f.write_str(self.0.hyphenated().encode_upper(&mut buf))
    }
}

/// Source of fresh GUIDs for generated clinical statements.
///
/// Implementations must be safe to share between threads building independent documents.
pub trait IdGenerator: Send + Sync + fmt::Debug {
    /// Allocates a GUID that has not been handed out by this generator before.
    fn next_guid(&self) -> Guid;
}

/// Allocates random version 4 GUIDs.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_guid(&self) -> Guid {
        Guid::new()
    }
}

/// Allocates GUIDs from a monotonically increasing counter.
///
/// The first GUID is `00000000-0000-0000-0000-000000000001` unless a different start is given.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_guid(&self) -> Guid {
        let value = self.next.fetch_add(1, Ordering::Relaxed);
        Guid::from_u128(u128::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn is_upper_hyphenated(text: &str) -> bool {
        text.len() == 36
            && text.bytes().enumerate().all(|(i, b)| match i {
                8 | 13 | 18 | 23 => b == b'-',
                _ => matches!(b, b'0'..=b'9' | b'A'..=b'F'),
            })
    }

    #[test]
    fn test_new_renders_upper_case_hyphenated() {
        let rendered = Guid::new().to_string();
        assert!(is_upper_hyphenated(&rendered), "unexpected form {rendered}");
    }

    #[test]
    fn test_from_u128_renders_hex_digits_upper_case() {
        assert_eq!(
            Guid::from_u128(0xABC).to_string(),
            "00000000-0000-0000-0000-000000000ABC"
        );
    }

    #[test]
    fn test_sequential_generator_is_predictable() {
        let ids = SequentialIdGenerator::new();

        assert_eq!(
            ids.next_guid().to_string(),
            "00000000-0000-0000-0000-000000000001"
        );
        assert_eq!(
            ids.next_guid().to_string(),
            "00000000-0000-0000-0000-000000000002"
        );
    }

    #[test]
    fn test_sequential_generator_starting_at() {
        let ids = SequentialIdGenerator::starting_at(255);

        assert_eq!(
            ids.next_guid().to_string(),
            "00000000-0000-0000-0000-0000000000FF"
        );
    }

    #[test]
    fn test_sequential_generator_unique_across_threads() {
        let ids = Arc::new(SequentialIdGenerator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || (0..250).map(|_| ids.next_guid()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for guid in handle.join().expect("thread panicked") {
                assert!(seen.insert(guid), "duplicate GUID {guid}");
            }
        }
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn test_random_generator_yields_distinct_guids() {
        let ids = RandomIdGenerator;
        assert_ne!(ids.next_guid(), ids.next_guid());
    }
}
