//! Debate sides and per-side storage.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two advocates in a debate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Argues for the position
    Bull,
    /// Argues against the position
    Bear,
}

impl Side {
    /// Both sides in fan-out order.
    pub const ALL: [Side; 2] = [Side::Bull, Side::Bear];

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Bull => "bull",
            Side::Bear => "bear",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Side::Bull => "Bull",
            Side::Bear => "Bear",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A value held for each side of the debate.
///
/// Each slot is addressed by [`Side`], so a writer for one side never
/// touches the other side's slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sides<T> {
    pub bull: T,
    pub bear: T,
}

impl<T> Sides<T> {
    pub fn new(bull: T, bear: T) -> Self {
        Self { bull, bear }
    }

    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::Bull => &self.bull,
            Side::Bear => &self.bear,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Bull => &mut self.bull,
            Side::Bear => &mut self.bear,
        }
    }

    /// Replace the slot for `side`, returning the previous value.
    pub fn set(&mut self, side: Side, value: T) -> T {
        std::mem::replace(self.get_mut(side), value)
    }

    pub fn map<U>(&self, mut f: impl FnMut(Side, &T) -> U) -> Sides<U> {
        Sides {
            bull: f(Side::Bull, &self.bull),
            bear: f(Side::Bear, &self.bear),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Side, &T)> {
        [(Side::Bull, &self.bull), (Side::Bear, &self.bear)].into_iter()
    }
}

impl<T: Clone> Sides<T> {
    /// Same value on both sides.
    pub fn splat(value: T) -> Self {
        Self {
            bull: value.clone(),
            bear: value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_serde_lowercase() {
        let json = serde_json::to_string(&Side::Bear).unwrap();
        assert_eq!(json, "\"bear\"");
        let side: Side = serde_json::from_str("\"bull\"").unwrap();
        assert_eq!(side, Side::Bull);
    }

    #[test]
    fn test_sides_set_only_touches_one_slot() {
        let mut sides: Sides<Option<u32>> = Sides::default();
        let previous = sides.set(Side::Bear, Some(7));

        assert!(previous.is_none());
        assert_eq!(sides.bear, Some(7));
        assert!(sides.bull.is_none());
    }

    #[test]
    fn test_sides_map_and_iter() {
        let sides = Sides::new(1, 2);
        let doubled = sides.map(|_, v| v * 2);
        assert_eq!(doubled, Sides::new(2, 4));

        let order: Vec<Side> = sides.iter().map(|(side, _)| side).collect();
        assert_eq!(order, vec![Side::Bull, Side::Bear]);
    }
}
