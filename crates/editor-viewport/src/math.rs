pub use emath::{Pos2, Rect, Vec2};
pub use glam::{DMat4, DQuat, DVec2, DVec3, DVec4, Vec4Swizzles};

/// Transform of a scene object or of the gizmo group, decomposed into
/// scale, rotation and translation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub scale: mint::Vector3<f64>,
    pub rotation: mint::Quaternion<f64>,
    pub translation: mint::Vector3<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: DVec3::ONE.into(),
            rotation: DQuat::IDENTITY.into(),
            translation: DVec3::ZERO.into(),
        }
    }
}

impl Transform {
    pub fn from_scale_rotation_translation(
        scale: impl Into<mint::Vector3<f64>>,
        rotation: impl Into<mint::Quaternion<f64>>,
        translation: impl Into<mint::Vector3<f64>>,
    ) -> Self {
        Self {
            scale: scale.into(),
            rotation: rotation.into(),
            translation: translation.into(),
        }
    }

    /// Matrix form of this transform.
    pub fn to_matrix(self) -> DMat4 {
        DMat4::from_scale_rotation_translation(
            self.scale.into(),
            self.rotation.into(),
            self.translation.into(),
        )
    }
}

/// World space ray, cast from the camera position through a point on screen.
#[derive(Debug, Copy, Clone)]
pub struct Ray {
    pub origin: DVec3,
    pub direction: DVec3,
}

/// Calculates 2d screen coordinates from 3d world coordinates
pub(crate) fn world_to_screen(viewport: Rect, mvp: DMat4, pos: DVec3) -> Option<Pos2> {
    let mut pos = mvp * DVec4::from((pos, 1.0));

    if pos.w < 1e-10 {
        return None;
    }

    pos /= pos.w;
    pos.y *= -1.0;

    let center = viewport.center();

    Some(Pos2::new(
        (center.x as f64 + pos.x * viewport.width() as f64 / 2.0) as f32,
        (center.y as f64 + pos.y * viewport.height() as f64 / 2.0) as f32,
    ))
}

/// Calculates 3d world coordinates from normalized device coordinates
pub(crate) fn ndc_to_world(mat: DMat4, x: f64, y: f64, z: f64) -> DVec3 {
    let mut world_pos = mat * DVec4::new(x, y, z, 1.0);

    // w is zero when far plane is set to infinity
    if world_pos.w.abs() < 1e-7 {
        world_pos.w = 1e-7;
    }

    world_pos /= world_pos.w;

    world_pos.xyz()
}

/// Casts a world space ray through the given normalized device coordinates
pub(crate) fn ndc_ray(inv_view_projection: DMat4, ndc_x: f64, ndc_y: f64) -> Ray {
    let origin = ndc_to_world(inv_view_projection, ndc_x, ndc_y, -1.0);
    let target = ndc_to_world(inv_view_projection, ndc_x, ndc_y, 1.0);

    Ray {
        origin,
        direction: (target - origin).normalize(),
    }
}

/// Casts a world space ray through the given screen space position
pub(crate) fn pointer_ray(viewport: Rect, view_projection: DMat4, screen_pos: Pos2) -> Ray {
    let x = (((screen_pos.x - viewport.min.x) / viewport.width()) * 2.0 - 1.0) as f64;
    let y = (((screen_pos.y - viewport.min.y) / viewport.height()) * 2.0 - 1.0) as f64;

    ndc_ray(view_projection.inverse(), x, -y)
}
