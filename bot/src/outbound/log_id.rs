//! UUID-backed log IDs.

use uuid::Uuid;

use crate::domain::LogId;
use crate::domain::ports::LogIdGenerator;

/// Mints log IDs from random v4 UUIDs in 32-digit lowercase hex.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidLogIdGenerator;

impl LogIdGenerator for UuidLogIdGenerator {
    fn next_log_id(&self) -> LogId {
        LogId::from_uuid(Uuid::new_v4())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn log_ids_are_simple_hex_and_unique() {
        let generator = UuidLogIdGenerator;
        let ids: HashSet<String> = (0..64)
            .map(|_| generator.next_log_id().to_string())
            .collect();
        assert_eq!(ids.len(), 64);
        assert!(ids.iter().all(|id| {
            id.len() == 32 && id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
        }));
    }
}
