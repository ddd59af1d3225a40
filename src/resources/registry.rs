//! Lifetime of per-entity movement state.
//!
//! A [`MovementState`] exists only while something is happening: it is created
//! on the first intent and discarded as soon as the entity is idle with nothing
//! held, so large token counts don't accumulate idle bookkeeping.

use std::{collections::HashMap, hash::Hash};

use bevy_ecs::prelude::*;
use derive_more::{Deref, DerefMut};
use tile::Cell;

use crate::{
    components::{
        heading::normalize,
        keyset::{Axis, HolderId},
        movement::{MovementState, PathGoal},
    },
    resources::config::MotionConfig,
    systems::{
        path,
        tick::{self, TickOutcome},
        Ctx,
    },
};

#[derive(Debug)]
pub struct Registry<K> {
    states: HashMap<K, MovementState>,
}

impl<K> Default for Registry<K> {
    fn default() -> Self {
        Self { states: HashMap::new() }
    }
}

impl<K> Registry<K>
where K: Copy + Eq + Hash {
    /// Add a holder to an axis, creating the state if needed.
    pub fn press(&mut self, key: K, axis: Axis, holder: HolderId) -> bool {
        self.states.entry(key).or_default().keys.set_held(axis, holder, true)
    }

    /// Remove a holder; an idle state left holding nothing is discarded.
    pub fn release(&mut self, key: K, axis: Axis, holder: HolderId) -> bool {
        let Some(state) = self.states.get_mut(&key) else { return false };
        let removed = state.keys.set_held(axis, holder, false);
        self.discard_if_spent(key);
        removed
    }

    /// Start seeking `target` from `from`, replacing any earlier goal.
    pub fn seek(&mut self, key: K, from: Cell, target: Cell, config: &MotionConfig) {
        let state = self.states.entry(key).or_default();
        state.path = Some(PathGoal { target, gait: path::gait_for_distance(from, target, config), reached: false });
        state.keys.set_held(Axis::Forward, HolderId::Path, true);
    }

    pub fn cancel_seek(&mut self, key: K) {
        let Some(state) = self.states.get_mut(&key) else { return };
        state.path = None;
        state.keys.set_held(Axis::Forward, HolderId::Path, false);
        self.discard_if_spent(key);
    }

    /// Request a facing angle. Applied on the next tick unless a step is in
    /// flight. Non-finite angles are ignored.
    pub fn face(&mut self, key: K, angle: f32) -> bool {
        if !angle.is_finite() { return false; }
        self.states.entry(key).or_default().heading.pending = Some(normalize(angle));
        true
    }

    /// Forget an entity entirely (despawned).
    pub fn remove(&mut self, key: K) -> Option<MovementState> {
        self.states.remove(&key)
    }

    pub fn get(&self, key: K) -> Option<&MovementState> {
        self.states.get(&key)
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut MovementState> {
        self.states.get_mut(&key)
    }

    pub fn contains(&self, key: K) -> bool {
        self.states.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.states.keys()
    }

    /// Run `f` on every state, keeping those for which it returns true.
    pub fn retain(&mut self, mut f: impl FnMut(K, &mut MovementState) -> bool) {
        self.states.retain(|&key, state| f(key, state));
    }

    /// Tick one state, dropping it if the tick says so.
    pub fn tick(&mut self, key: K, ctx: &mut Ctx, dt: f32) -> Option<TickOutcome> {
        let state = self.states.get_mut(&key)?;
        let outcome = tick::tick(state, ctx, dt);
        if outcome == TickOutcome::Discard { self.states.remove(&key); }
        Some(outcome)
    }

    fn discard_if_spent(&mut self, key: K) {
        let spent = self.states.get(&key)
            .is_some_and(|s| s.is_spent() && s.heading.pending.is_none());
        if spent {
            log::trace!("discarding idle movement state");
            self.states.remove(&key);
        }
    }
}

/// Movement state of every active token.
#[derive(Default, Deref, DerefMut, Resource)]
pub struct Movements(Registry<Entity>);
