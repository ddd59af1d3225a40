use bevy_math::EulerRot;
use bevy_transform::components::Transform;
use glam::Vec3;

/// The position and yaw the controller writes every tick.
pub trait TransformSink {
    fn translation(&self) -> Vec3;
    fn set_translation(&mut self, translation: Vec3);
    fn yaw(&self) -> f32;
    /// Must be a pure function of `yaw`: writing the same angle twice is a no-op.
    fn set_yaw(&mut self, yaw: f32);
}

impl TransformSink for Transform {
    fn translation(&self) -> Vec3 {
        let t = self.translation;
        Vec3::new(t.x, t.y, t.z)
    }

    fn set_translation(&mut self, translation: Vec3) {
        self.translation = bevy_math::Vec3::new(translation.x, translation.y, translation.z);
    }

    fn yaw(&self) -> f32 {
        self.rotation.to_euler(EulerRot::YXZ).0
    }

    fn set_yaw(&mut self, yaw: f32) {
        self.rotation = bevy_math::Quat::from_rotation_y(yaw);
    }
}

/// Headless transform for simulations and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose {
    pub translation: Vec3,
    pub yaw: f32,
}

impl Pose {
    pub fn at(translation: Vec3) -> Self {
        Self { translation, yaw: 0. }
    }
}

impl TransformSink for Pose {
    fn translation(&self) -> Vec3 { self.translation }
    fn set_translation(&mut self, translation: Vec3) { self.translation = translation; }
    fn yaw(&self) -> f32 { self.yaw }
    fn set_yaw(&mut self, yaw: f32) { self.yaw = yaw; }
}
