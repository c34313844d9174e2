use nalgebra::{Isometry3, Matrix4, Perspective3, Point3, Vector3};

use crate::{config::ScrollerConfig, plain::Plain};

// nalgebra produces opengl clip space (z in -1..1), wgpu wants z in 0..1
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub aspect: f32,
    pub fovy: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn matrix(&self) -> Matrix4<f32> {
        Perspective3::new(self.aspect, self.fovy, self.near, self.far).into_inner()
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

unsafe impl Plain for CameraUniform {}

#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
    pub projection: Projection,
}

impl Camera {
    /// Creates a new [`Camera`].
    pub fn new(eye: Point3<f32>, target: Point3<f32>, projection: Projection) -> Self {
        Self {
            eye,
            target,
            projection,
        }
    }

    /// Looks straight down -z at the middle of the screen from
    /// [ScrollerConfig::camera_distance].
    pub fn for_screen(config: &ScrollerConfig) -> Self {
        let centre_x = config.screen_width as f32 / 2.0;
        let centre_y = config.screen_height as f32 / 2.0;
        Self::new(
            Point3::new(centre_x, centre_y, config.camera_distance()),
            Point3::new(centre_x, centre_y, 0.0),
            Projection {
                aspect: config.screen_width as f32 / config.screen_height as f32,
                fovy: config.fov_y,
                near: 0.1,
                far: config.far_plane(),
            },
        )
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if height == 0 {
            return;
        }
        self.projection.aspect = width as f32 / height as f32;
    }

    pub fn view(&self) -> Matrix4<f32> {
        Isometry3::look_at_rh(&self.eye, &self.target, &Vector3::y()).to_homogeneous()
    }

    pub fn projection(&self) -> Matrix4<f32> {
        self.projection.matrix()
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * self.projection() * self.view()
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection().into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    use super::{Camera, Projection};
    use crate::config::ScrollerConfig;

    #[test]
    fn projection_follows_config_planes() {
        let config = ScrollerConfig::default();
        let camera = Camera::for_screen(&config);
        assert_eq!(
            camera.projection,
            Projection {
                aspect: 1600.0 / 1100.0,
                fovy: config.fov_y,
                near: 0.1,
                far: config.far_plane(),
            }
        );
    }

    #[test]
    fn screen_centre_lands_in_clip_centre() {
        let config = ScrollerConfig::default();
        let camera = Camera::for_screen(&config);
        let p = camera
            .view_projection()
            .transform_point(&Point3::new(800.0, 550.0, 0.0));
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-5);
        assert!(p.z > 0.0 && p.z < 1.0);
    }

    #[test]
    fn glyph_line_is_inside_depth_range() {
        let config = ScrollerConfig::default();
        let camera = Camera::for_screen(&config);
        let p = camera
            .view_projection()
            .transform_point(&Point3::new(800.0, config.baseline_y, config.glyph_depth));
        assert!(p.z > 0.0 && p.z < 1.0);
        // below the centre line
        assert!(p.y < 0.0);
    }

    #[test]
    fn parked_slots_are_off_screen() {
        let config = ScrollerConfig::default();
        let camera = Camera::for_screen(&config);
        let vp = camera.view_projection();
        let right = vp.transform_point(&Point3::new(
            config.right_edge(),
            config.baseline_y,
            config.glyph_depth,
        ));
        assert!(right.x > 1.0);
    }

    #[test]
    fn aspect_follows_resize() {
        let config = ScrollerConfig::default();
        let mut camera = Camera::for_screen(&config);
        let before = camera.projection();
        camera.set_aspect(800, 1100);
        let after = camera.projection();
        assert_relative_eq!(after[(0, 0)], before[(0, 0)] * 2.0, epsilon = 1e-5);
        camera.set_aspect(800, 0);
        assert_eq!(camera.projection(), after);
    }
}
