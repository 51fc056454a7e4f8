use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

static TIMESTAMP_COUNTER: AtomicU64 = AtomicU64::new(0);

pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum IdStrategy {
    #[default]
    Uuid,
    Timestamp,
}

impl IdStrategy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uuid => "uuid",
            Self::Timestamp => "timestamp",
        }
    }
}

impl FromStr for IdStrategy {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "uuid" | "random" => Ok(Self::Uuid),
            "timestamp" | "counter" => Ok(Self::Timestamp),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CardIdGenerator {
    strategy: IdStrategy,
}

impl CardIdGenerator {
    pub fn new(strategy: IdStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> IdStrategy {
        self.strategy
    }
}

impl IdGenerator for CardIdGenerator {
    fn next_id(&mut self) -> String {
        match self.strategy {
            IdStrategy::Uuid => Uuid::new_v4().to_string(),
            IdStrategy::Timestamp => timestamp_id(),
        }
    }
}

/// Non-cryptographic id: wall-clock millis plus a process-wide counter, so two
/// calls within the same millisecond still differ.
pub fn timestamp_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or(0);
    let sequence = TIMESTAMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("card-{millis:x}-{sequence:x}")
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_uuid_ids_are_pairwise_distinct() {
        let mut generator = CardIdGenerator::new(IdStrategy::Uuid);
        let ids: HashSet<String> = (0..500).map(|_| generator.next_id()).collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn test_timestamp_ids_are_pairwise_distinct() {
        let mut generator = CardIdGenerator::new(IdStrategy::Timestamp);
        let ids: HashSet<String> = (0..500).map(|_| generator.next_id()).collect();
        assert_eq!(ids.len(), 500);
        assert!(ids.iter().all(|id| id.starts_with("card-")));
    }

    #[test]
    fn test_id_strategy_parse() {
        assert_eq!(IdStrategy::from_str("UUID"), Ok(IdStrategy::Uuid));
        assert_eq!(IdStrategy::from_str(" timestamp "), Ok(IdStrategy::Timestamp));
        assert!(IdStrategy::from_str("sequential").is_err());
    }
}
