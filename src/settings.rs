//! Runtime configuration with sensible defaults for the dormitory scene.

use std::path::PathBuf;

use cgmath::Deg;

#[derive(Clone, Debug, PartialEq)]
pub struct CameraSettings {
    pub position: [f32; 3],
    pub yaw: Deg<f32>,
    pub pitch: Deg<f32>,
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
    /// World units per second at full motion intent.
    pub speed: f32,
    /// Degrees of rotation per pixel of mouse motion.
    pub sensitivity: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: [0.0, 1.5, 3.0],
            yaw: Deg(-90.0),
            pitch: Deg(0.0),
            fovy: Deg(45.0),
            znear: 0.1,
            zfar: 100.0,
            speed: 2.5,
            sensitivity: 0.2,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub window_title: String,
    pub window_size: (u32, u32),
    pub fps_limit: u32,
    pub vsync: bool,
    /// MSAA sample count for the colour and depth targets; 1 disables it.
    pub msaa_samples: u32,
    pub clear_colour: wgpu::Color,
    pub asset_root: PathBuf,
    pub camera: CameraSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_title: "Dorm Room".to_string(),
            window_size: (1280, 720),
            fps_limit: 60,
            vsync: true,
            msaa_samples: 4,
            clear_colour: wgpu::Color::BLACK,
            asset_root: PathBuf::from("assets"),
            camera: CameraSettings::default(),
        }
    }
}

impl Settings {
    pub fn asset(&self, file_name: &str) -> PathBuf {
        self.asset_root.join(file_name)
    }
}
