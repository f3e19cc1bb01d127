//! Gizmo handles.
//!
//! Each handle is one grabbable piece of the transform gizmo: an axis
//! shaft, a rotation ring or a scale shaft with a tip marker. Handles
//! share the [`HandleConfig`] carrier and differ only in their
//! [`HandleKind`] implementation, which supplies the pick geometry, the
//! drag math and the draw routine.

use std::any::Any;
use std::fmt::Debug;
use std::hash::{BuildHasher, Hash, Hasher};
use std::ops::Deref;

use enum_dispatch::enum_dispatch;

use crate::authority::MeshRecord;
use crate::config::PreparedViewportConfig;
use crate::gizmo::DragSession;
use crate::math::{Pos2, Transform};
use crate::renderer::SceneRenderer;
use crate::shape::OverlayDrawData;

pub(crate) use rotation::RotationHandle;
pub(crate) use scale::ScaleHandle;
pub(crate) use translation::TranslationHandle;

pub(crate) mod common;
pub(crate) mod rotation;
pub(crate) mod scale;
pub(crate) mod translation;

/// Enumeration of the different handle types.
#[derive(Clone, Debug)]
#[enum_dispatch(HandleControl)]
pub(crate) enum GizmoHandle {
    Translation(TranslationHandle),
    Rotation(RotationHandle),
    Scale(ScaleHandle),
}

#[enum_dispatch]
pub(crate) trait HandleControl {
    /// Unique identifier of this handle.
    fn id(&self) -> u64;
    /// Update the configuration used by the handle.
    fn update_config(&mut self, config: PreparedViewportConfig);
    /// Sets whether this handle is currently hovered.
    fn set_focused(&mut self, focused: bool);
    /// Sets whether this handle is currently being dragged.
    fn set_active(&mut self, active: bool);
    /// Returns true if this handle is currently hovered.
    fn is_focused(&self) -> bool;
    /// Returns true if this handle is currently being dragged.
    fn is_active(&self) -> bool;
    /// World space geometry used for hover tests against this handle.
    fn pick_mesh(&self) -> MeshRecord;
    /// Advances the drag session with the current pointer position and
    /// returns the resulting gizmo transform. `None` skips this frame's
    /// update because the screen space projection was degenerate.
    fn drag(
        &self,
        session: &mut DragSession,
        pointer: Pos2,
        renderer: &dyn SceneRenderer,
    ) -> Option<Transform>;
    /// Draw the handle.
    fn draw(&self) -> OverlayDrawData;
}

pub(crate) trait HandleKind: 'static {
    type Params: Debug + Copy + Hash;

    fn pick_mesh(handle: &HandleConfig<Self>) -> MeshRecord
    where
        Self: Sized;
    fn drag(
        handle: &HandleConfig<Self>,
        session: &mut DragSession,
        pointer: Pos2,
        renderer: &dyn SceneRenderer,
    ) -> Option<Transform>
    where
        Self: Sized;
    fn draw(handle: &HandleConfig<Self>) -> OverlayDrawData
    where
        Self: Sized;
}

#[derive(Clone, Debug)]
pub(crate) struct HandleConfig<T: HandleKind> {
    id: u64,
    /// Additional parameters depending on the handle kind.
    params: T::Params,

    /// Configuration of the whole viewport
    pub(crate) config: PreparedViewportConfig,
    /// Whether this handle is hovered this frame
    pub(crate) focused: bool,
    /// Whether this handle is being dragged this frame
    pub(crate) active: bool,
}

impl<T: HandleKind> Deref for HandleConfig<T> {
    type Target = T::Params;

    fn deref(&self) -> &Self::Target {
        &self.params
    }
}

impl<T> HandleConfig<T>
where
    T: HandleKind,
{
    pub(crate) fn new(config: PreparedViewportConfig, params: T::Params) -> Self {
        let mut hasher = ahash::RandomState::with_seeds(1, 2, 3, 4).build_hasher();
        params.type_id().hash(&mut hasher);
        params.hash(&mut hasher);
        let id = hasher.finish();

        Self {
            id,
            params,
            config,
            focused: false,
            active: false,
        }
    }
}

impl<T> HandleControl for HandleConfig<T>
where
    T: HandleKind,
{
    fn id(&self) -> u64 {
        self.id
    }

    fn update_config(&mut self, config: PreparedViewportConfig) {
        self.config = config;
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn is_focused(&self) -> bool {
        self.focused
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn pick_mesh(&self) -> MeshRecord {
        T::pick_mesh(self)
    }

    fn drag(
        &self,
        session: &mut DragSession,
        pointer: Pos2,
        renderer: &dyn SceneRenderer,
    ) -> Option<Transform> {
        T::drag(self, session, pointer, renderer)
    }

    fn draw(&self) -> OverlayDrawData {
        T::draw(self)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::authority::MeshRecord;
    use crate::compositor::FramePlan;
    use crate::config::{PreparedViewportConfig, ViewportConfig};
    use crate::gizmo::DragSession;
    use crate::math::{Pos2, Ray, Rect, Transform, Vec2};
    use crate::renderer::{HandleHit, MeshHandle, SceneRenderer};

    /// Orthographic projection with 100 pixels per world unit, centered
    /// at (400, 300) with screen y pointing down. The z axis is dropped,
    /// as if looking straight down the camera axis.
    pub(crate) struct OrthoRenderer;

    impl SceneRenderer for OrthoRenderer {
        fn upload_mesh(&mut self, _record: &MeshRecord) -> MeshHandle {
            MeshHandle(0)
        }

        fn free_mesh(&mut self, _handle: MeshHandle) {}

        fn project_world_to_screen(&self, point: mint::Vector3<f64>) -> Option<Pos2> {
            Some(Pos2::new(
                400.0 + point.x as f32 * 100.0,
                300.0 - point.y as f32 * 100.0,
            ))
        }

        fn intersect_ray_with_meshes(&self, _ray: Ray, _meshes: &[MeshHandle]) -> Option<HandleHit> {
            None
        }

        fn resize_targets(&mut self, _width: u32, _height: u32) {}

        fn render_frame(&mut self, _plan: &FramePlan) {}
    }

    pub(crate) fn ortho_config() -> PreparedViewportConfig {
        PreparedViewportConfig::from_config(ViewportConfig {
            viewport: Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0)),
            ..Default::default()
        })
    }

    pub(crate) fn session_at(start_pointer: Pos2) -> DragSession {
        DragSession {
            handle: 1,
            start_transform: Transform::default(),
            start_pointer,
            last_pointer: start_pointer,
            reference: None,
            travel: 0.0,
        }
    }
}
