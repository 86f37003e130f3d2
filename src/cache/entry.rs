//! Cache Entry Module
//!
//! A stored payload together with the absolute time it stops being served.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// Serialized payload plus expiration, as held by the in-memory backend.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// JSON payload
    pub value: String,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry expiring `ttl` from now.
    ///
    /// The expiration is fixed here; reading the entry never extends it.
    pub fn new(value: String, ttl: Duration) -> Self {
        let now = current_timestamp_ms();
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);

        Self {
            value,
            created_at: now,
            expires_at: now.saturating_add(ttl_ms),
        }
    }

    // == Is Expired ==
    /// An entry is expired once the current time reaches its expiration time.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at
    }

    // == Time To Live ==
    /// Remaining lifetime, zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        let now = current_timestamp_ms();
        Duration::from_millis(self.expires_at.saturating_sub(now))
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new("[]".to_string(), Duration::from_secs(60));

        assert_eq!(entry.value, "[]");
        assert_eq!(entry.expires_at - entry.created_at, 60_000);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new("{}".to_string(), Duration::from_secs(1));

        assert!(!entry.is_expired());

        sleep(Duration::from_millis(1100));

        assert!(entry.is_expired());
        assert_eq!(entry.ttl_remaining(), Duration::ZERO);
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = CacheEntry::new("{}".to_string(), Duration::from_secs(10));

        let remaining = entry.ttl_remaining();
        assert!(remaining <= Duration::from_secs(10));
        assert!(remaining >= Duration::from_secs(9));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = current_timestamp_ms();
        let entry = CacheEntry {
            value: "{}".to_string(),
            created_at: now,
            expires_at: now,
        };

        assert!(entry.is_expired(), "Entry should be expired at boundary");
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let entry = CacheEntry::new("{}".to_string(), Duration::MAX);
        assert_eq!(entry.expires_at, u64::MAX);
        assert!(!entry.is_expired());
    }
}
