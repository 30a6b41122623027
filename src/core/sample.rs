use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Number of independent articulated angles carried per sample (one per wheel)
pub const ARTICULATED_ANGLES: usize = 4;

/// One recorded instant of the tracked vehicle and camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSample {
    /// Seconds since recording start
    pub time: f64,

    /// World-space position of the vehicle
    pub primary_position: Vec3,

    /// Vehicle rotation, expected to be a unit quaternion
    pub primary_orientation: Quat,

    /// Per-wheel spin angles in radians
    pub articulated_angles: [f32; ARTICULATED_ANGLES],

    /// World-space position of the camera
    pub secondary_position: Vec3,

    /// Camera rotation, expected to be a unit quaternion
    pub secondary_orientation: Quat,
}

impl FrameSample {
    /// Create a sample with only the vehicle pose set; the camera sits at the origin
    pub fn new(time: f64, position: Vec3, orientation: Quat) -> Self {
        Self {
            time,
            primary_position: position,
            primary_orientation: orientation,
            ..Self::default()
        }
    }

    /// Set the camera pose
    pub fn with_camera(mut self, position: Vec3, orientation: Quat) -> Self {
        self.secondary_position = position;
        self.secondary_orientation = orientation;
        self
    }

    /// Set the wheel angles
    pub fn with_angles(mut self, angles: [f32; ARTICULATED_ANGLES]) -> Self {
        self.articulated_angles = angles;
        self
    }
}

impl Default for FrameSample {
    fn default() -> Self {
        Self {
            time: 0.0,
            primary_position: Vec3::ZERO,
            primary_orientation: Quat::IDENTITY,
            articulated_angles: [0.0; ARTICULATED_ANGLES],
            secondary_position: Vec3::ZERO,
            secondary_orientation: Quat::IDENTITY,
        }
    }
}
