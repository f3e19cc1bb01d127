use std::ops::{Deref, DerefMut};

pub use ecolor::Color32;

use emath::Rect;
use enumset::{EnumSet, EnumSetType};

use crate::math::{DMat4, DQuat, DVec3, Transform};

/// Configuration of the viewport interaction layer.
///
/// Defines the active camera, the screen area covered by the viewport
/// and how the transform gizmo is drawn and interacted with.
#[derive(Debug, Copy, Clone)]
pub struct ViewportConfig {
    /// View matrix of the active camera.
    pub view_matrix: mint::RowMatrix4<f64>,
    /// Projection matrix of the active camera.
    pub projection_matrix: mint::RowMatrix4<f64>,
    /// Screen area covered by the viewport.
    pub viewport: Rect,
    /// The gizmo's enabled operation modes.
    pub modes: EnumSet<GizmoMode>,
    /// Visual settings for the gizmo, mirrors and markers.
    pub visuals: ViewportVisuals,
    /// Ratio of window's physical size to logical size.
    pub pixels_per_point: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            view_matrix: DMat4::IDENTITY.into(),
            projection_matrix: DMat4::IDENTITY.into(),
            viewport: Rect::NOTHING,
            modes: GizmoMode::all(),
            visuals: ViewportVisuals::default(),
            pixels_per_point: 1.0,
        }
    }
}

impl ViewportConfig {
    /// Whether the enabled modes have changed, compared to given other config
    pub(crate) fn modes_changed(&self, other: &Self) -> bool {
        self.modes != other.modes
    }
}

/// [`ViewportConfig`] together with values derived from it and from the
/// current gizmo anchor, used for interaction and drawing.
#[derive(Debug, Copy, Clone, Default)]
pub(crate) struct PreparedViewportConfig {
    config: ViewportConfig,
    /// Rotation of the gizmo anchor
    pub(crate) rotation: DQuat,
    /// Translation of the gizmo anchor
    pub(crate) translation: DVec3,
    /// Scale of the gizmo anchor
    pub(crate) scale: DVec3,
    /// Combined view-projection matrix
    pub(crate) view_projection: DMat4,
    /// Model matrix of the gizmo anchor
    pub(crate) model_matrix: DMat4,
    /// Combined model-view-projection matrix
    pub(crate) mvp: DMat4,
    /// Scale factor that keeps the gizmo a constant size on screen
    pub(crate) scale_factor: f32,
    /// World space tolerance used when sizing the handle pick meshes
    pub(crate) focus_distance: f32,
}

impl Deref for PreparedViewportConfig {
    type Target = ViewportConfig;

    fn deref(&self) -> &Self::Target {
        &self.config
    }
}

impl DerefMut for PreparedViewportConfig {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.config
    }
}

impl PreparedViewportConfig {
    pub(crate) fn from_config(config: ViewportConfig) -> Self {
        let mut prepared = Self::default();
        prepared.update_for_config(config);
        prepared
    }

    pub(crate) fn update_for_config(&mut self, config: ViewportConfig) {
        let projection_matrix = DMat4::from(config.projection_matrix);
        let view_matrix = DMat4::from(config.view_matrix);

        self.config = config;
        self.view_projection = projection_matrix * view_matrix;

        self.update_for_anchor(Transform {
            scale: self.scale.into(),
            rotation: self.rotation.into(),
            translation: self.translation.into(),
        });
    }

    pub(crate) fn update_for_anchor(&mut self, anchor: Transform) {
        self.translation = anchor.translation.into();
        self.rotation = anchor.rotation.into();
        self.scale = anchor.scale.into();
        self.model_matrix =
            DMat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation);
        self.mvp = self.view_projection * self.model_matrix;

        self.scale_factor = self.mvp.as_ref()[15] as f32
            / self.config.projection_matrix.x.x as f32
            / self.config.viewport.width()
            * 2.0;

        self.focus_distance = self.scale_factor * (self.config.visuals.stroke_width / 2.0 + 5.0);
    }

    pub(crate) fn as_transform(&self) -> Transform {
        Transform {
            scale: self.scale.into(),
            rotation: self.rotation.into(),
            translation: self.translation.into(),
        }
    }
}

/// Operation mode of the gizmo.
#[derive(Debug, EnumSetType, Hash)]
pub enum GizmoMode {
    /// Translate along a cardinal axis
    Translate,
    /// Rotate around a cardinal plane
    Rotate,
    /// Scale along a cardinal axis
    Scale,
}

impl GizmoMode {
    /// All modes
    pub fn all() -> EnumSet<Self> {
        EnumSet::all()
    }
}

/// Cardinal axis a translation or scale handle acts along.
#[derive(Debug, EnumSetType, Hash)]
pub enum GizmoAxis {
    X,
    Y,
    Z,
}

impl GizmoAxis {
    /// Unit vector of the axis in gizmo-local space
    pub(crate) const fn unit(self) -> DVec3 {
        match self {
            Self::X => DVec3::X,
            Self::Y => DVec3::Y,
            Self::Z => DVec3::Z,
        }
    }
}

/// Cardinal plane a rotation handle spins in, spanned by two axes.
#[derive(Debug, EnumSetType, Hash)]
pub enum GizmoPlane {
    Xy,
    Yz,
    Zx,
}

impl GizmoPlane {
    /// The two basis vectors spanning the plane in gizmo-local space
    pub(crate) const fn basis(self) -> (DVec3, DVec3) {
        match self {
            Self::Xy => (DVec3::X, DVec3::Y),
            Self::Yz => (DVec3::Y, DVec3::Z),
            Self::Zx => (DVec3::Z, DVec3::X),
        }
    }

    /// Normal of the plane, the rotation axis
    pub(crate) const fn normal(self) -> DVec3 {
        match self {
            Self::Xy => DVec3::Z,
            Self::Yz => DVec3::X,
            Self::Zx => DVec3::Y,
        }
    }
}

/// Controls the visual style of the gizmo, mirrors and pick marker
#[derive(Debug, Copy, Clone)]
pub struct ViewportVisuals {
    /// Color of the x axis
    pub x_color: Color32,
    /// Color of the y axis
    pub y_color: Color32,
    /// Color of the z axis
    pub z_color: Color32,
    /// Alpha of the gizmo color when inactive
    pub inactive_alpha: f32,
    /// Alpha of the gizmo color when highlighted/active
    pub highlight_alpha: f32,
    /// Color to use for highlighted and active axes. By default, the axis color is used with `highlight_alpha`
    pub highlight_color: Option<Color32>,
    /// Width (thickness) of the gizmo strokes
    pub stroke_width: f32,
    /// Gizmo size in pixels
    pub gizmo_size: f32,
    /// Base color of mirrored scene objects
    pub object_color: Color32,
    /// Color of the transient pick marker
    pub marker_color: Color32,
    /// Radius of the transient pick marker in pixels
    pub marker_radius: f32,
    /// Alpha of the back-facing ghost pass
    pub ghost_alpha: f32,
    /// How much the base color of a selected mirror is lightened
    pub selection_lighten: f32,
    /// Alpha of the front pass of a selected mirror
    pub selection_alpha: f32,
}

impl Default for ViewportVisuals {
    fn default() -> Self {
        Self {
            x_color: Color32::from_rgb(255, 0, 125),
            y_color: Color32::from_rgb(0, 255, 125),
            z_color: Color32::from_rgb(0, 125, 255),
            inactive_alpha: 0.7,
            highlight_alpha: 1.0,
            highlight_color: None,
            stroke_width: 4.0,
            gizmo_size: 75.0,
            object_color: Color32::from_rgb(150, 150, 155),
            marker_color: Color32::from_rgb(255, 255, 255),
            marker_radius: 4.0,
            ghost_alpha: 0.25,
            selection_lighten: 0.3,
            selection_alpha: 0.85,
        }
    }
}
