//! Perspective camera and orbit controls
//!
//! The camera orbits a target point. Pointer drags rotate it, the wheel
//! dollies it in and out, and `OrbitControls::update` applies the pending
//! input once per refresh.

use std::f32::consts::{PI, TAU};

use glam::{Mat4, Vec3};

use crate::settings::CameraConfig;

/// Keeps the polar angle off the poles so `look_at` stays defined
const POLAR_EPS: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view (radians)
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            position: Vec3::from(config.position),
            target: Vec3::ZERO,
            fov_y: config.fov_degrees.to_radians(),
            aspect,
            near: config.near,
            far: config.far,
        }
    }

    /// Update the aspect ratio after a resize
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Spherical coordinates around the y axis
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    /// Polar angle from +y
    phi: f32,
    /// Azimuth around +y, measured from +z
    theta: f32,
}

impl Spherical {
    fn from_offset(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self {
                radius,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
            theta: v.x.atan2(v.z),
        }
    }

    fn to_offset(self) -> Vec3 {
        let s = self.phi.sin() * self.radius;
        Vec3::new(s * self.theta.sin(), self.phi.cos() * self.radius, s * self.theta.cos())
    }
}

/// Drag-to-rotate, wheel-to-dolly camera controller
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub enabled: bool,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,

    // Pending input, consumed by `update`
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    drag_origin: Option<(f32, f32)>,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            enabled: true,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            drag_origin: None,
        }
    }
}

impl OrbitControls {
    pub fn is_dragging(&self) -> bool {
        self.drag_origin.is_some()
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        if self.enabled {
            self.drag_origin = Some((x, y));
        }
    }

    /// Pointer moved to `(x, y)` on a viewport `viewport_height` pixels tall
    pub fn pointer_move(&mut self, x: f32, y: f32, viewport_height: f32) {
        let Some((x0, y0)) = self.drag_origin else {
            return;
        };
        if !self.enabled || viewport_height <= 0.0 {
            return;
        }
        let dx = (x - x0) * self.rotate_speed;
        let dy = (y - y0) * self.rotate_speed;
        self.rotate_left(TAU * dx / viewport_height);
        self.rotate_up(TAU * dy / viewport_height);
        self.drag_origin = Some((x, y));
    }

    pub fn pointer_up(&mut self) {
        self.drag_origin = None;
    }

    /// Wheel scrolled by `delta_y`; negative moves closer
    pub fn wheel(&mut self, delta_y: f32) {
        if !self.enabled {
            return;
        }
        let step = 0.95f32.powf(self.zoom_speed);
        if delta_y < 0.0 {
            self.scale *= step;
        } else if delta_y > 0.0 {
            self.scale /= step;
        }
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.delta_theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.delta_phi -= angle;
    }

    /// Apply pending rotation and dolly to `camera`. Returns whether the
    /// camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let offset = camera.position - camera.target;
        let mut spherical = Spherical::from_offset(offset);

        spherical.theta += self.delta_theta;
        spherical.phi += self.delta_phi;
        spherical.phi = spherical
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(POLAR_EPS, PI - POLAR_EPS);
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        let position = camera.target + spherical.to_offset();
        let moved = position.distance_squared(camera.position) > f32::EPSILON;
        camera.position = position;

        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.scale = 1.0;
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::from_config(&CameraConfig::default(), 16.0 / 9.0)
    }

    #[test]
    fn test_default_camera_sees_origin() {
        let cam = camera();
        assert_eq!(cam.position, Vec3::new(60.0, 60.0, -60.0));
        let clip = cam.view_projection() * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_update_without_input_keeps_position() {
        let mut cam = camera();
        let mut controls = OrbitControls::default();
        let start = cam.position;
        assert!(!controls.update(&mut cam));
        assert!((cam.position - start).length() < 1e-3);
    }

    #[test]
    fn test_drag_rotates_at_constant_distance() {
        let mut cam = camera();
        let mut controls = OrbitControls::default();
        let r = cam.position.length();

        controls.pointer_down(100.0, 100.0);
        controls.pointer_move(160.0, 100.0, 600.0);
        assert!(controls.update(&mut cam));
        assert!((cam.position.length() - r).abs() < 1e-3);
        assert!((cam.position.y - 60.0).abs() < 1e-3);

        // Moving without a held pointer does nothing
        controls.pointer_up();
        let p = cam.position;
        controls.pointer_move(400.0, 400.0, 600.0);
        controls.update(&mut cam);
        assert!((cam.position - p).length() < 1e-3);
    }

    #[test]
    fn test_wheel_dollies() {
        let mut cam = camera();
        let mut controls = OrbitControls::default();
        let r = cam.position.length();

        controls.wheel(-100.0);
        controls.update(&mut cam);
        assert!((cam.position.length() - r * 0.95).abs() < 1e-2);

        controls.wheel(100.0);
        controls.update(&mut cam);
        assert!((cam.position.length() - r).abs() < 1e-2);
    }

    #[test]
    fn test_polar_angle_clamped() {
        let mut cam = camera();
        let mut controls = OrbitControls::default();
        controls.rotate_up(10.0);
        controls.update(&mut cam);
        assert!(cam.position.y > 0.0);
        assert!(cam.view_matrix().is_finite());

        controls.max_polar_angle = PI / 2.0;
        controls.rotate_up(-10.0);
        controls.update(&mut cam);
        assert!(cam.position.y >= -1e-3);
    }

    #[test]
    fn test_disabled_controls_ignore_input() {
        let mut cam = camera();
        let mut controls = OrbitControls {
            enabled: false,
            ..Default::default()
        };
        controls.pointer_down(0.0, 0.0);
        assert!(!controls.is_dragging());
        controls.wheel(-1.0);
        assert!(!controls.update(&mut cam));
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut cam = camera();
        cam.set_viewport(800, 400);
        assert_eq!(cam.aspect, 2.0);
        cam.set_viewport(0, 400);
        assert_eq!(cam.aspect, 2.0);
    }
}
