//! Intent aggregation.
//!
//! Each directional axis is held by a set of opaque holders (keyboard bindings,
//! the path seeker, ...). An axis counts as held while any holder remains, and
//! opposite axes cancel each other out instead of the last writer winning.

use serde::{Deserialize, Serialize};
use tinyvec::TinyVec;

use crate::components::{Direction, Style};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Axis {
    Forward,
    Backward,
    RotateLeft,
    RotateRight,
}

/// Something asserting intent on an axis.
///
/// `Stagger` holders behave like `Key` holders but additionally request the
/// drunk style while their axis is the active direction.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum HolderId {
    /// Reserved for the path seeker.
    #[default]
    Path,
    Key(u32),
    Stagger(u32),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeySet(TinyVec<[HolderId; 4]>);

impl KeySet {
    /// Returns false if the holder was already present.
    pub fn insert(&mut self, holder: HolderId) -> bool {
        if self.contains(holder) { return false; }
        self.0.push(holder);
        true
    }

    /// Returns false if the holder was not present.
    pub fn remove(&mut self, holder: HolderId) -> bool {
        let Some(i) = self.0.iter().position(|&h| h == holder) else { return false };
        self.0.swap_remove(i);
        true
    }

    pub fn contains(&self, holder: HolderId) -> bool {
        self.0.contains(&holder)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_staggered(&self) -> bool {
        self.0.iter().any(|h| matches!(h, HolderId::Stagger(_)))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeySets {
    pub forward: KeySet,
    pub backward: KeySet,
    pub rotate_left: KeySet,
    pub rotate_right: KeySet,
}

impl KeySets {
    pub fn set(&self, axis: Axis) -> &KeySet {
        match axis {
            Axis::Forward => &self.forward,
            Axis::Backward => &self.backward,
            Axis::RotateLeft => &self.rotate_left,
            Axis::RotateRight => &self.rotate_right,
        }
    }

    pub fn set_mut(&mut self, axis: Axis) -> &mut KeySet {
        match axis {
            Axis::Forward => &mut self.forward,
            Axis::Backward => &mut self.backward,
            Axis::RotateLeft => &mut self.rotate_left,
            Axis::RotateRight => &mut self.rotate_right,
        }
    }

    pub fn set_held(&mut self, axis: Axis, holder: HolderId, held: bool) -> bool {
        if held { self.set_mut(axis).insert(holder) }
        else { self.set_mut(axis).remove(holder) }
    }

    pub fn is_held(&self, axis: Axis) -> bool {
        !self.set(axis).is_empty()
    }

    /// Net linear intent: opposite axes cancel.
    pub fn linear(&self) -> Direction {
        match (self.is_held(Axis::Forward), self.is_held(Axis::Backward)) {
            (true, false) => Direction::Forward,
            (false, true) => Direction::Backward,
            _ => Direction::Still,
        }
    }

    /// Net rotational intent: +1 left (counter-clockwise), -1 right.
    pub fn rotation(&self) -> f32 {
        match (self.is_held(Axis::RotateLeft), self.is_held(Axis::RotateRight)) {
            (true, false) => 1.,
            (false, true) => -1.,
            _ => 0.,
        }
    }

    /// Drunk only when the set for the active direction carries a stagger holder.
    pub fn style_for(&self, direction: Direction) -> Style {
        let staggered = match direction {
            Direction::Forward => self.forward.is_staggered(),
            Direction::Backward => self.backward.is_staggered(),
            Direction::Still => false,
        };
        if staggered { Style::Drunk } else { Style::Standard }
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty() && self.backward.is_empty()
            && self.rotate_left.is_empty() && self.rotate_right.is_empty()
    }
}
