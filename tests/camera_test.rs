use cgmath::{Deg, Vector2, Zero};
use dorm_viewer::{
    camera::{Camera, SAFE_FRAC_PI_2},
    input::Motion,
    settings::CameraSettings,
};
use instant::Duration;

use crate::common::test_utils::approx_eq;

mod common;

fn full_motion() -> Motion {
    Motion {
        forward: 1.0,
        right: -1.0,
        up: 1.0,
    }
}

#[test]
fn pitch_stays_inside_the_open_interval() {
    let mut camera = Camera::new(&CameraSettings::default(), (800, 600));
    for dy in [1.0e6, -3.0e7, 5.0e3, f32::MAX / 4.0, -42.0] {
        camera.update(Vector2::new(17.0, dy), Motion::default(), Duration::from_millis(16));
        let pitch = camera.pitch().0;
        assert!(pitch.abs() <= SAFE_FRAC_PI_2, "pitch {pitch} escaped");
        assert!(pitch.abs() < std::f32::consts::FRAC_PI_2);
    }
}

#[test]
fn zero_dt_does_not_move() {
    let mut camera = Camera::new(&CameraSettings::default(), (800, 600));
    let start = camera.position;
    camera.update(Vector2::zero(), full_motion(), Duration::ZERO);
    assert_eq!(camera.position, start);
}

#[test]
fn moves_along_forward_scaled_by_speed_and_dt() {
    let mut camera = Camera::new(&CameraSettings::default(), (800, 600));
    let start = camera.position;
    let motion = Motion {
        forward: 1.0,
        ..Motion::default()
    };
    camera.update(Vector2::zero(), motion, Duration::from_millis(500));
    let expected = start + camera.forward() * camera.speed * 0.5;
    assert!(approx_eq(camera.position.x, expected.x));
    assert!(approx_eq(camera.position.y, expected.y));
    assert!(approx_eq(camera.position.z, expected.z));
}

#[test]
fn default_camera_looks_down_negative_z() {
    let camera = Camera::new(&CameraSettings::default(), (800, 600));
    let forward = camera.forward();
    assert!(approx_eq(forward.x, 0.0));
    assert!(approx_eq(forward.y, 0.0));
    assert!(approx_eq(forward.z, -1.0));
    assert!(approx_eq(camera.right().x, 1.0));
    assert!(approx_eq(camera.up().y, 1.0));
}

#[test]
fn resize_recomputes_the_projection_each_time() {
    let mut camera = Camera::new(&CameraSettings::default(), (1280, 720));
    let perspective = |aspect: f32| cgmath::perspective(camera_fovy(), aspect, 0.1, 100.0);

    camera.set_window_size(800, 600);
    assert_eq!(camera.aspect_ratio(), 800.0 / 600.0);
    assert_eq!(camera.projection_matrix(), perspective(800.0 / 600.0));
    let four_by_three = camera.projection_matrix();

    camera.set_window_size(1000, 500);
    assert_eq!(camera.aspect_ratio(), 2.0);
    assert_ne!(camera.projection_matrix(), four_by_three);
    assert_eq!(camera.projection_matrix(), perspective(2.0));

    camera.set_window_size(400, 300);
    assert_eq!(camera.aspect_ratio(), 400.0 / 300.0);
    assert_eq!(camera.window_size(), (400, 300));
    assert_eq!(camera.projection_matrix(), perspective(400.0 / 300.0));
    assert_eq!(camera.projection_matrix(), four_by_three);
}

fn camera_fovy() -> cgmath::Rad<f32> {
    CameraSettings::default().fovy.into()
}

#[test]
fn fovy_change_recomputes_the_projection() {
    let mut camera = Camera::new(&CameraSettings::default(), (800, 600));
    let before = camera.projection_matrix();
    camera.set_fovy(Deg(60.0));
    assert_ne!(camera.projection_matrix(), before);
}

#[test]
fn degenerate_aspect_is_ignored() {
    let mut camera = Camera::new(&CameraSettings::default(), (800, 600));
    let before = camera.projection_matrix();
    camera.set_aspect_ratio(0.0);
    camera.set_aspect_ratio(f32::NAN);
    assert_eq!(camera.aspect_ratio(), 800.0 / 600.0);
    assert_eq!(camera.projection_matrix(), before);
}
