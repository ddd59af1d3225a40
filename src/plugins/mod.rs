mod locomotion;

pub use locomotion::LocomotionPlugin;
