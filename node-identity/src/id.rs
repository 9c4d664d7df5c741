use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Identifier of a node within its cluster.
///
/// Zero is reserved to mean "not yet assigned"; a freshly booted node carries
/// [`NodeId::UNSET`] until an external bootstrap hands it a real id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    pub const UNSET: NodeId = NodeId(0);

    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(&self) -> u64 {
        self.0
    }

    pub const fn is_set(&self) -> bool {
        self.0 != 0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            0 => write!(f, "unset"),
            id => write!(f, "{}", id),
        }
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for NodeId {
    type Err = std::num::ParseIntError;

    /// Parses the decimal form used by the legacy `id` marker.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_display() {
        assert_eq!(NodeId::UNSET.to_string(), "unset");
        assert_eq!(NodeId::new(42).to_string(), "42");
        assert!(!NodeId::default().is_set());
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!("18446744073709551615".parse::<NodeId>().unwrap().get(), u64::MAX);
        assert!("-1".parse::<NodeId>().is_err());
        assert!("0x10".parse::<NodeId>().is_err());
    }

    #[test]
    fn test_serializes_as_integer() {
        let json = serde_json::to_string(&NodeId::new(7)).unwrap();
        assert_eq!(json, "7");
    }
}
