use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 1-based position of a tour in play order.
///
/// Position `1` is the first letter of the primer. Zero is never a valid
/// position; use [`TourPosition::new`] which rejects it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TourPosition(u32);

impl TourPosition {
    /// The first tour.
    pub const FIRST: Self = Self(1);

    /// Creates a new `TourPosition`, or `None` for zero.
    #[must_use]
    pub fn new(position: u32) -> Option<Self> {
        (position > 0).then_some(Self(position))
    }

    /// Returns the underlying 1-based value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Zero-based index into an ordered tour list.
    #[must_use]
    pub fn index(&self) -> usize {
        usize::try_from(self.0 - 1).unwrap_or(usize::MAX)
    }

    /// Position for a zero-based list index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index)
            .ok()
            .and_then(|idx| idx.checked_add(1))
            .map(Self)
    }

    /// The following position, if it is representable.
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl TryFrom<u32> for TourPosition {
    type Error = ParseIdError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(ParseIdError {
            kind: "TourPosition".to_string(),
        })
    }
}

impl From<TourPosition> for u32 {
    fn from(position: TourPosition) -> Self {
        position.0
    }
}

/// Unique identifier for a registered user
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    /// Creates a new `UserId`
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying u64 value
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Identifier of an audit log row
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditLogId(u64);

impl AuditLogId {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TourPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TourPosition({})", self.0)
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Debug for AuditLogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuditLogId({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for TourPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for AuditLogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for TourPosition {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .ok()
            .and_then(TourPosition::new)
            .ok_or_else(|| ParseIdError {
                kind: "TourPosition".to_string(),
            })
    }
}

impl FromStr for UserId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(UserId::new)
            .map_err(|_| ParseIdError {
                kind: "UserId".to_string(),
            })
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_rejects_zero() {
        assert!(TourPosition::new(0).is_none());
        assert!("0".parse::<TourPosition>().is_err());
    }

    #[test]
    fn test_position_index_mapping() {
        let pos = TourPosition::new(3).unwrap();
        assert_eq!(pos.index(), 2);
        assert_eq!(TourPosition::from_index(2), Some(pos));
        assert_eq!(pos.next(), TourPosition::new(4));
    }

    #[test]
    fn test_position_from_str() {
        let pos: TourPosition = " 12 ".parse().unwrap();
        assert_eq!(pos.value(), 12);
        assert!("twelve".parse::<TourPosition>().is_err());
    }

    #[test]
    fn test_position_deserialize_rejects_zero() {
        let ok: TourPosition = serde_json::from_str("5").unwrap();
        assert_eq!(ok.value(), 5);
        assert!(serde_json::from_str::<TourPosition>("0").is_err());
    }

    #[test]
    fn test_user_id_display() {
        let id = UserId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!("42".parse::<UserId>().unwrap(), id);
    }
}
