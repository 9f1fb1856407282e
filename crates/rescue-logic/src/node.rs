//! Room identity: a `(floor, room)` pair.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A room in the building.
///
/// Floors are zero-based, rooms are one-based. The derived ordering compares
/// floor first and room second, which is what the search uses to break ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Node {
    floor: u32,
    room: u32,
}

impl Node {
    pub const fn new(floor: u32, room: u32) -> Self {
        Self { floor, room }
    }

    pub const fn floor(&self) -> u32 {
        self.floor
    }

    pub const fn room(&self) -> u32 {
        self.room
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}:R{}", self.floor, self.room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_equality() {
        assert_eq!(Node::new(2, 5), Node::new(2, 5));
        assert_ne!(Node::new(2, 5), Node::new(5, 2));
    }

    #[test]
    fn test_order_floor_then_room() {
        assert!(Node::new(0, 12) < Node::new(1, 1));
        assert!(Node::new(3, 2) < Node::new(3, 10));
    }

    #[test]
    fn test_usable_as_key() {
        let set: BTreeSet<Node> = [Node::new(1, 2), Node::new(0, 9), Node::new(1, 1)]
            .into_iter()
            .collect();
        let ordered: Vec<_> = set.into_iter().collect();
        assert_eq!(
            ordered,
            vec![Node::new(0, 9), Node::new(1, 1), Node::new(1, 2)]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Node::new(6, 12).to_string(), "F6:R12");
    }
}
