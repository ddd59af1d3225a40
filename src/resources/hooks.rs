//! Injectable observers for diagnostics and metrics.

use bevy_ecs::prelude::*;
use tile::Cell;

use crate::components::{step::LandingVariant, Phase};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MotionEvent {
    PhaseChanged { from: Phase, to: Phase },
    FallStarted { height_drop: i32, variant: LandingVariant },
    LandingStarted { variant: LandingVariant },
    StepCommitted { cell: Cell },
    PathReached { cell: Cell },
    /// The movement state was dropped; `malfunction` when it went non-finite.
    Discarded { malfunction: bool },
}

pub trait MotionObserver {
    fn notify(&mut self, event: &MotionEvent);
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl MotionObserver for Silent {
    fn notify(&mut self, _: &MotionEvent) {}
}

/// Forwards every event to `log` at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl MotionObserver for LogObserver {
    fn notify(&mut self, event: &MotionEvent) {
        log::debug!("{event:?}");
    }
}

/// Fan-out of registered observers.
#[derive(Default, Resource)]
pub struct MotionHooks {
    observers: Vec<Box<dyn MotionObserver + Send + Sync>>,
}

impl MotionHooks {
    pub fn add(&mut self, observer: impl MotionObserver + Send + Sync + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl MotionObserver for MotionHooks {
    fn notify(&mut self, event: &MotionEvent) {
        for observer in &mut self.observers {
            observer.notify(event);
        }
    }
}
