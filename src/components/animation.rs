use std::collections::HashMap;

use bevy_ecs::prelude::*;

/// Parameters for starting a clip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayOptions {
    pub fade_in: f32,
    pub fade_out: f32,
    pub time_scale: f32,
    /// Restart even if the clip is already the one playing.
    pub force: bool,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self { fade_in: 0.2, fade_out: 0.2, time_scale: 1., force: false }
    }
}

impl PlayOptions {
    pub fn fade(seconds: f32) -> Self {
        Self { fade_in: seconds, fade_out: seconds, ..Self::default() }
    }

    pub fn forced(self) -> Self {
        Self { force: true, ..self }
    }

    pub fn scaled(self, time_scale: f32) -> Self {
        Self { time_scale, ..self }
    }
}

/// Whatever owns the clips of one token. The controller only ever looks at
/// clip names and durations.
pub trait AnimationPlayback {
    fn has_action(&self, key: &str) -> bool;
    fn play(&mut self, key: &str, options: PlayOptions);
    /// Seconds; 0 for unknown clips.
    fn duration_of(&self, key: &str) -> f32;
}

#[derive(Clone, Debug, PartialEq)]
pub struct Playing {
    pub key: String,
    pub options: PlayOptions,
}

/// Clip table for one token, recording the clip the controller selected.
///
/// A render layer reads [`ClipPlayer::current`] and drives its own mixer.
#[derive(Clone, Component, Debug, Default)]
pub struct ClipPlayer {
    durations: HashMap<String, f32>,
    current: Option<Playing>,
    plays: usize,
}

impl ClipPlayer {
    pub fn new<I, S>(clips: I) -> Self
    where I: IntoIterator<Item = (S, f32)>, S: Into<String> {
        let mut player = Self::default();
        for (key, duration) in clips { player.insert(key, duration); }
        player
    }

    pub fn with_clip(mut self, key: impl Into<String>, duration: f32) -> Self {
        self.insert(key, duration);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, duration: f32) {
        self.durations.insert(key.into(), duration);
    }

    pub fn current(&self) -> Option<&Playing> {
        self.current.as_ref()
    }

    pub fn current_key(&self) -> Option<&str> {
        self.current.as_ref().map(|p| p.key.as_str())
    }

    /// Number of times a clip was (re)started.
    pub fn plays(&self) -> usize {
        self.plays
    }
}

impl AnimationPlayback for ClipPlayer {
    fn has_action(&self, key: &str) -> bool {
        self.durations.contains_key(key)
    }

    fn play(&mut self, key: &str, options: PlayOptions) {
        if let Some(current) = self.current.as_mut().filter(|p| p.key == key && !options.force) {
            current.options = options;
            return;
        }
        self.current = Some(Playing { key: key.to_owned(), options });
        self.plays += 1;
    }

    fn duration_of(&self, key: &str) -> f32 {
        self.durations.get(key).copied().unwrap_or(0.)
    }
}
