//! Core types: math re-exports and the demo camera.

pub use glam::{Mat3, Mat4, Vec2, Vec3, Vec4, vec2, vec3};

pub mod camera;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_view_projection_is_finite() {
        let cam = camera::Camera::new(vec3(0.0, 1.0, 4.0), Vec3::Y, -90.0, -15.0);
        let proj = Mat4::perspective_rh_gl(cam.fov_deg().to_radians(), 16.0 / 9.0, 0.1, 100.0);
        let pv = (proj * cam.view()).to_cols_array();
        assert!(pv.iter().all(|f| f.is_finite()));
    }
}
