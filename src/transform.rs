use nalgebra::{Matrix4, Rotation3, Scale3, Translation3};

type T = Translation3<f32>;
type R = Rotation3<f32>;
type S = Scale3<f32>;

pub struct Transform {
    pub translation: T,
    pub rotation: R,
    pub scale: S,
}

impl Transform {
    pub fn new(translation: T, rotation: R, scale: S) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Flat quad placement: no rotation, uniform scale in x and y.
    pub fn placed(x: f32, y: f32, z: f32, scale: f32) -> Self {
        Self::new(
            Translation3::new(x, y, z),
            Rotation3::identity(),
            Scale3::new(scale, scale, 1.0),
        )
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        self.translation.to_homogeneous()
            * self.rotation.to_homogeneous()
            * self.scale.to_homogeneous()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Rotation3, Scale3, Translation3, Vector3};

    use super::Transform;

    #[test]
    fn placed_scales_then_translates() {
        let m = Transform::placed(100.0, 300.0, 230.0, 50.0).matrix();
        let corner = m.transform_point(&Point3::new(0.5, 0.5, 0.0));
        assert_relative_eq!(corner, Point3::new(125.0, 325.0, 230.0));
    }

    #[test]
    fn rotation_applies_before_translation() {
        let t = Transform::new(
            Translation3::new(1.0, 0.0, 0.0),
            Rotation3::from_axis_angle(&Vector3::z_axis(), std::f32::consts::FRAC_PI_2),
            Scale3::new(2.0, 2.0, 2.0),
        );
        let p = t.matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(1.0, 2.0, 0.0), epsilon = 1e-6);
    }
}
