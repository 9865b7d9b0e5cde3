use crate::{Mat4, Vec3};

/// Default yaw looking down -Z.
pub const YAW: f32 = -90.0;
pub const PITCH: f32 = 0.0;
pub const SPEED: f32 = 2.5;
pub const SENSITIVITY: f32 = 0.1;
pub const FOV: f32 = 45.0;

const PITCH_LIMIT: f32 = 89.0;
const FOV_MIN: f32 = 1.0;
const FOV_MAX: f32 = 90.0;

/// Hand-tuned response factors for analog sticks.
pub const PAD_MOVE_SCALE: f32 = 100.0;
pub const PAD_LOOK_SCALE: f32 = 10.0;

/// Discrete movement directions for keyboard input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraMove {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Free-look FPS camera driven by Euler angles (degrees).
///
/// The orientation basis (`front`/`right`/`up`) is derived from yaw and
/// pitch and refreshed after every mutation, so it is always orthonormal.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    pub speed: f32,
    pub sensitivity: f32,
    fov_deg: f32,
}

impl Camera {
    pub fn new(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: world_up,
            right: Vec3::X,
            world_up,
            yaw,
            pitch,
            speed: SPEED,
            sensitivity: SENSITIVITY,
            fov_deg: FOV,
        };
        camera.update_basis();
        camera
    }

    /// Look-at view matrix for the current position and orientation.
    #[inline]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    #[inline]
    pub fn fov_deg(&self) -> f32 {
        self.fov_deg
    }

    #[inline]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[inline]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    #[inline]
    pub fn front(&self) -> Vec3 {
        self.front
    }

    #[inline]
    pub fn right(&self) -> Vec3 {
        self.right
    }

    #[inline]
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Translate along the current basis. `dt` is the frame delta in seconds.
    pub fn keyboard_move(&mut self, direction: CameraMove, dt: f32) {
        let velocity = self.speed * dt;
        match direction {
            CameraMove::Forward => self.position += self.front * velocity,
            CameraMove::Backward => self.position -= self.front * velocity,
            CameraMove::Left => self.position -= self.right * velocity,
            CameraMove::Right => self.position += self.right * velocity,
            CameraMove::Up => self.position += self.up * velocity,
            CameraMove::Down => self.position -= self.up * velocity,
        }
        self.update_basis();
    }

    /// Apply accumulated mouse deltas. Positive `dy` looks up.
    pub fn mouse_move(&mut self, dx: f32, dy: f32, constrain_pitch: bool) {
        self.yaw += dx * self.sensitivity;
        self.pitch += dy * self.sensitivity;
        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }
        self.update_basis();
    }

    /// Narrow the field of view by `offset` degrees (scroll-to-zoom).
    pub fn zoom(&mut self, offset: f32) {
        self.fov_deg = (self.fov_deg - offset).clamp(FOV_MIN, FOV_MAX);
    }

    /// Apply one frame of analog stick input. Left stick translates, right
    /// stick looks around. Axis convention: stick down/right is positive.
    /// The response curve (velocity multiplied by dt a second time, times
    /// the scale constants) reproduces the tuned feel of the controls.
    pub fn gamepad_move(
        &mut self,
        left_x: f32,
        left_y: f32,
        right_x: f32,
        right_y: f32,
        dt: f32,
        constrain_pitch: bool,
    ) {
        let velocity = self.speed * dt;
        self.position -= self.front * velocity * left_y * dt * PAD_MOVE_SCALE;
        self.position += self.right * velocity * left_x * dt * PAD_MOVE_SCALE;

        self.yaw += self.sensitivity * right_x * PAD_LOOK_SCALE;
        self.pitch -= self.sensitivity * right_y * PAD_LOOK_SCALE;
        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }
        self.update_basis();
    }

    fn update_basis(&mut self) {
        let (yaw_sin, yaw_cos) = self.yaw.to_radians().sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.to_radians().sin_cos();
        self.front = Vec3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos).normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::Y, YAW, PITCH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3;

    const EPS: f32 = 1e-4;

    fn assert_orthonormal(camera: &Camera) {
        assert!((camera.front().length() - 1.0).abs() < EPS);
        assert!((camera.right().length() - 1.0).abs() < EPS);
        assert!((camera.up().length() - 1.0).abs() < EPS);
        assert!(camera.front().dot(camera.right()).abs() < EPS);
        assert!(camera.front().dot(camera.up()).abs() < EPS);
        assert!(camera.right().dot(camera.up()).abs() < EPS);
    }

    #[test]
    fn default_faces_negative_z() {
        let camera = Camera::default();
        assert!((camera.front() - Vec3::NEG_Z).length() < EPS);
        assert!((camera.right() - Vec3::X).length() < EPS);
        assert!((camera.up() - Vec3::Y).length() < EPS);
    }

    #[test]
    fn basis_stays_orthonormal_across_angles() {
        for yaw in [-180.0, -90.0, -35.0, 0.0, 45.0, 90.0, 170.0] {
            for pitch in [-89.0, -45.0, 0.0, 30.0, 89.0] {
                let camera = Camera::new(Vec3::ZERO, Vec3::Y, yaw, pitch);
                assert_orthonormal(&camera);
            }
        }
    }

    #[test]
    fn mouse_look_mutations_keep_basis_orthonormal() {
        let mut camera = Camera::default();
        for step in 0..50 {
            camera.mouse_move(37.0, -23.0 + step as f32, true);
            assert_orthonormal(&camera);
        }
    }

    #[test]
    fn pitch_clamps_when_constrained() {
        let mut camera = Camera::default();
        camera.mouse_move(0.0, 1e5, true);
        assert_eq!(camera.pitch(), 89.0);
        camera.mouse_move(0.0, -1e6, true);
        assert_eq!(camera.pitch(), -89.0);
    }

    #[test]
    fn pitch_unconstrained_can_flip_over() {
        let mut camera = Camera::default();
        camera.mouse_move(0.0, 1500.0, false);
        assert!(camera.pitch() > 89.0);
    }

    #[test]
    fn fov_clamps_to_range() {
        let mut camera = Camera::default();
        camera.zoom(-1000.0);
        assert_eq!(camera.fov_deg(), 90.0);
        camera.zoom(1000.0);
        assert_eq!(camera.fov_deg(), 1.0);
        camera.zoom(-4.5);
        assert!((camera.fov_deg() - 5.5).abs() < EPS);
    }

    #[test]
    fn view_maps_eye_to_origin() {
        let camera = Camera::new(vec3(3.0, -2.0, 7.5), Vec3::Y, 12.0, -20.0);
        let eye_in_view = camera.view().transform_point3(camera.position);
        assert!(eye_in_view.length() < EPS);
    }

    #[test]
    fn keyboard_moves_along_basis() {
        let mut camera = Camera::default();
        camera.keyboard_move(CameraMove::Forward, 2.0);
        assert!((camera.position - vec3(0.0, 0.0, -5.0)).length() < EPS);

        let mut camera = Camera::default();
        camera.keyboard_move(CameraMove::Right, 1.0);
        assert!((camera.position - vec3(2.5, 0.0, 0.0)).length() < EPS);

        let mut camera = Camera::default();
        camera.keyboard_move(CameraMove::Down, 1.0);
        assert!((camera.position - vec3(0.0, -2.5, 0.0)).length() < EPS);
    }

    #[test]
    fn vertical_moves_follow_the_pitched_basis() {
        // At pitch 45 the derived up tilts to (0, 0.707, 0.707); a world-Y
        // translation would leave z untouched.
        let mut camera = Camera::new(Vec3::ZERO, Vec3::Y, YAW, 45.0);
        camera.keyboard_move(CameraMove::Up, 1.0);
        assert!((camera.position - camera.up() * SPEED).length() < EPS);
        assert!(camera.position.z > 1.0);

        let mut camera = Camera::new(Vec3::ZERO, Vec3::Y, YAW, 45.0);
        camera.keyboard_move(CameraMove::Down, 1.0);
        assert!((camera.position + camera.up() * SPEED).length() < EPS);
        assert!(camera.position.z < -1.0);
    }

    #[test]
    fn gamepad_left_stick_up_moves_forward() {
        // Stick up arrives as negative left_y under the GLFW-style axis
        // convention this formula was tuned against.
        let mut camera = Camera::default();
        let dt = 0.016;
        camera.gamepad_move(0.0, -1.0, 0.0, 0.0, dt, true);
        let expected = camera.speed * dt * dt * PAD_MOVE_SCALE;
        assert!((camera.position.z + expected).abs() < EPS);
        assert_eq!(camera.position.y, 0.0);
    }

    #[test]
    fn gamepad_right_stick_turns() {
        let mut camera = Camera::default();
        camera.gamepad_move(0.0, 0.0, 1.0, 0.25, 0.016, true);
        assert!((camera.yaw() - (YAW + SENSITIVITY * PAD_LOOK_SCALE)).abs() < EPS);
        assert!((camera.pitch() + SENSITIVITY * 0.25 * PAD_LOOK_SCALE).abs() < EPS);
    }
}
