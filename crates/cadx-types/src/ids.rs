use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use uuid::Uuid;

/// Source of feature IDs.
///
/// `next_id` takes `&self` and only touches atomics, so one generator can be
/// shared across threads that construct features concurrently.
#[derive(Debug)]
pub struct IdGenerator {
    mode: Mode,
}

#[derive(Debug)]
enum Mode {
    Uuid,
    Sequential { prefix: String, next: AtomicU64 },
}

impl IdGenerator {
    /// Random v4 UUID strings.
    pub fn uuid() -> Self {
        Self { mode: Mode::Uuid }
    }

    /// `"{prefix}1"`, `"{prefix}2"`, ... for reproducible ID sequences.
    pub fn sequential(prefix: impl Into<String>) -> Self {
        Self {
            mode: Mode::Sequential {
                prefix: prefix.into(),
                next: AtomicU64::new(1),
            },
        }
    }

    /// The process-wide UUID generator.
    pub fn global() -> &'static IdGenerator {
        static GLOBAL: OnceLock<IdGenerator> = OnceLock::new();
        GLOBAL.get_or_init(IdGenerator::uuid)
    }

    pub fn next_id(&self) -> String {
        match &self.mode {
            Mode::Uuid => Uuid::new_v4().to_string(),
            Mode::Sequential { prefix, next } => {
                let n = next.fetch_add(1, Ordering::Relaxed);
                format!("{prefix}{n}")
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::uuid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn sequential_ids_are_predictable() {
        let ids = IdGenerator::sequential("F");
        assert_eq!(ids.next_id(), "F1");
        assert_eq!(ids.next_id(), "F2");
        assert_eq!(ids.next_id(), "F3");
    }

    #[test]
    fn uuid_ids_parse_as_uuids() {
        let id = IdGenerator::uuid().next_id();
        assert!(Uuid::parse_str(&id).is_ok());
        assert_ne!(IdGenerator::global().next_id(), IdGenerator::global().next_id());
    }

    #[test]
    fn concurrent_generation_never_repeats() {
        let ids = Arc::new(IdGenerator::sequential("T"));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || (0..500).map(|_| ids.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id generated");
            }
        }
        assert_eq!(seen.len(), 8 * 500);
    }
}
