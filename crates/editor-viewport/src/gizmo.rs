//! The transform gizmo engine.
//!
//! Owns the handle set, the hover and drag state machine and the pick
//! meshes uploaded for hover testing. Each frame the engine consumes
//! the pointer input, advances the state machine and reports the
//! transform to write back and the click to route to picking.

use std::mem;

use log::trace;

use crate::config::{GizmoAxis, GizmoMode, GizmoPlane, PreparedViewportConfig};
use crate::handle::rotation::RotationParams;
use crate::handle::scale::ScaleParams;
use crate::handle::translation::TranslationParams;
use crate::handle::{
    GizmoHandle, HandleControl, RotationHandle, ScaleHandle, TranslationHandle,
};
use crate::math::{pointer_ray, Pos2, Transform};
use crate::renderer::{MeshHandle, SceneRenderer};
use crate::shape::OverlayDrawData;

/// Pointer travel in pixels beyond which a gesture commits to a drag
/// and stops counting as a click.
pub(crate) const DRAG_THRESHOLD: f32 = 5.0;

/// Pick meshes follow the anchor. A scale factor drift beyond this
/// fraction rebuilds them so hover stays aligned with the drawn size.
const SCALE_DRIFT_LIMIT: f32 = 0.01;

/// Pointer input for one frame, in viewport coordinates.
#[derive(Debug, Default, Clone, Copy)]
pub struct PointerInput {
    /// Pointer position, `None` when the pointer is outside the viewport.
    pub position: Option<Pos2>,
    /// The primary button went down this frame.
    pub pressed: bool,
    /// The primary button went up this frame.
    pub released: bool,
}

/// Outcome of one engine frame.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct EngineUpdate {
    /// New anchor transform produced by an active drag this frame.
    pub(crate) transform_write: Option<Transform>,
    /// Click position to resolve into a pick, reported on release of a
    /// gesture that stayed within the drag threshold.
    pub(crate) click: Option<Pos2>,
}

/// State captured when a drag starts, updated as the pointer moves.
#[derive(Debug, Clone)]
pub(crate) struct DragSession {
    /// Id of the dragged handle.
    pub(crate) handle: u64,
    /// Anchor transform at the moment the drag started.
    pub(crate) start_transform: Transform,
    /// Pointer position at the moment the drag started.
    pub(crate) start_pointer: Pos2,
    /// Pointer position of the previous frame.
    pub(crate) last_pointer: Pos2,
    /// Zero reference captured by the handle on its first drag frame.
    pub(crate) reference: Option<f64>,
    /// Path length the pointer has travelled since the drag started.
    pub(crate) travel: f32,
}

/// Interaction state of the gizmo. Hover is recomputed every frame and
/// suspended for the whole duration of a drag.
#[derive(Debug, Clone, Default)]
pub(crate) enum GizmoState {
    #[default]
    Idle,
    Hovering(u64),
    Dragging(DragSession),
}

impl GizmoState {
    fn on_hover(self, hovered: Option<u64>) -> Self {
        match (self, hovered) {
            (dragging @ Self::Dragging(_), _) => dragging,
            (_, Some(handle)) => Self::Hovering(handle),
            (_, None) => Self::Idle,
        }
    }

    fn on_press(self, pointer: Pos2, anchor: Transform) -> Self {
        match self {
            Self::Hovering(handle) => {
                trace!("drag started on handle {handle:#018x}");
                Self::Dragging(DragSession {
                    handle,
                    start_transform: anchor,
                    start_pointer: pointer,
                    last_pointer: pointer,
                    reference: None,
                    travel: 0.0,
                })
            }
            other => other,
        }
    }

    fn on_release(self) -> Self {
        match self {
            Self::Dragging(session) => {
                trace!("drag ended on handle {:#018x}", session.handle);
                Self::Idle
            }
            other => other,
        }
    }
}

/// A background gesture that may still resolve into a pick on release.
#[derive(Debug, Clone, Copy)]
struct PendingClick {
    last_pointer: Pos2,
    travel: f32,
}

#[derive(Default)]
pub(crate) struct GizmoEngine {
    config: PreparedViewportConfig,
    handles: Vec<GizmoHandle>,
    pick_meshes: Vec<(u64, MeshHandle)>,
    /// Anchor and scale factor the pick meshes were last built for.
    meshes_built_for: Option<(Transform, f32)>,
    state: GizmoState,
    pending_click: Option<PendingClick>,
}

impl GizmoEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Advances the gizmo by one frame.
    ///
    /// `config` carries the current camera, `anchor` the transform of
    /// the selected object the gizmo attaches to. Without an anchor the
    /// gizmo is hidden and only background gestures are tracked.
    pub(crate) fn update(
        &mut self,
        config: PreparedViewportConfig,
        anchor: Option<Transform>,
        input: PointerInput,
        renderer: &mut dyn SceneRenderer,
    ) -> EngineUpdate {
        let modes_changed = self.config.modes_changed(&config);
        self.config = config;

        match anchor {
            Some(anchor) => {
                self.config.update_for_anchor(anchor);

                if self.handles.is_empty() || modes_changed {
                    self.rebuild_handles(renderer);
                }
            }
            None => {
                self.clear_handles(renderer);
                self.state = mem::take(&mut self.state).on_release();
            }
        }

        for handle in &mut self.handles {
            handle.update_config(self.config);
        }

        self.refresh_pick_meshes(renderer);

        let mut update = EngineUpdate::default();
        let mut state = mem::take(&mut self.state);

        if let Some(pointer) = input.position {
            state = state.on_hover(self.hovered_handle(pointer, &*renderer));
        }

        if input.pressed {
            if let Some(pointer) = input.position {
                if matches!(state, GizmoState::Hovering(_)) {
                    state = state.on_press(pointer, self.config.as_transform());
                } else {
                    self.pending_click = Some(PendingClick {
                        last_pointer: pointer,
                        travel: 0.0,
                    });
                }
            }
        }

        if let (GizmoState::Dragging(session), Some(pointer)) = (&mut state, input.position) {
            session.travel += (pointer - session.last_pointer).length();
            session.last_pointer = pointer;

            let dragged = self.handles.iter().find(|h| h.id() == session.handle);
            if let Some(handle) = dragged {
                if let Some(transform) = handle.drag(session, pointer, &*renderer) {
                    self.config.update_for_anchor(transform);
                    update.transform_write = Some(transform);
                }
            }
        }

        if let (Some(pending), Some(pointer)) = (&mut self.pending_click, input.position) {
            pending.travel += (pointer - pending.last_pointer).length();
            pending.last_pointer = pointer;
        }

        if input.released {
            state = state.on_release();

            if let Some(pending) = self.pending_click.take() {
                if pending.travel <= DRAG_THRESHOLD {
                    update.click = Some(pending.last_pointer);
                }
            }
        }

        let (focused, active) = match &state {
            GizmoState::Idle => (None, None),
            GizmoState::Hovering(id) => (Some(*id), None),
            GizmoState::Dragging(session) => (Some(session.handle), Some(session.handle)),
        };
        for handle in &mut self.handles {
            let id = handle.id();
            handle.update_config(self.config);
            handle.set_focused(focused == Some(id));
            handle.set_active(active == Some(id));
        }

        self.state = state;
        update
    }

    /// Whether the host should withhold camera navigation input because
    /// the pointer is engaged with the gizmo.
    pub(crate) fn camera_input_blocked(&self) -> bool {
        matches!(self.state, GizmoState::Hovering(_) | GizmoState::Dragging(_))
    }

    /// Tessellated overlay geometry for all visible handles.
    pub(crate) fn draw(&self) -> OverlayDrawData {
        self.handles
            .iter()
            .map(HandleControl::draw)
            .fold(OverlayDrawData::default(), |acc, data| acc + data)
    }

    fn rebuild_handles(&mut self, renderer: &mut dyn SceneRenderer) {
        self.clear_handles(renderer);

        let config = self.config;
        for mode in config.modes {
            match mode {
                GizmoMode::Translate => {
                    self.handles
                        .extend([GizmoAxis::X, GizmoAxis::Y, GizmoAxis::Z].map(|axis| {
                            TranslationHandle::new(config, TranslationParams { axis }).into()
                        }));
                }
                GizmoMode::Rotate => {
                    self.handles.extend(
                        [GizmoPlane::Xy, GizmoPlane::Yz, GizmoPlane::Zx].map(|plane| {
                            RotationHandle::new(config, RotationParams { plane }).into()
                        }),
                    );
                }
                GizmoMode::Scale => {
                    self.handles
                        .extend([GizmoAxis::X, GizmoAxis::Y, GizmoAxis::Z].map(|axis| {
                            ScaleHandle::new(config, ScaleParams { axis }).into()
                        }));
                }
            }
        }
    }

    fn clear_handles(&mut self, renderer: &mut dyn SceneRenderer) {
        self.handles.clear();
        for (_, handle) in self.pick_meshes.drain(..) {
            renderer.free_mesh(handle);
        }
        self.meshes_built_for = None;
    }

    /// Re-uploads the hover geometry when it went stale. The meshes live
    /// in world space, so they must follow the anchor; they are kept
    /// as-is through an active drag, where hover is suspended anyway.
    fn refresh_pick_meshes(&mut self, renderer: &mut dyn SceneRenderer) {
        if matches!(self.state, GizmoState::Dragging(_)) || self.handles.is_empty() {
            return;
        }

        let anchor = self.config.as_transform();
        let scale_factor = self.config.scale_factor;

        let stale = match &self.meshes_built_for {
            None => true,
            Some((built_anchor, built_scale)) => {
                *built_anchor != anchor
                    || (built_scale - scale_factor).abs() > built_scale.abs() * SCALE_DRIFT_LIMIT
            }
        };
        if !stale {
            return;
        }

        for (_, handle) in self.pick_meshes.drain(..) {
            renderer.free_mesh(handle);
        }
        for handle in &self.handles {
            let record = handle.pick_mesh();
            self.pick_meshes
                .push((handle.id(), renderer.upload_mesh(&record)));
        }
        self.meshes_built_for = Some((anchor, scale_factor));
    }

    fn hovered_handle(&self, pointer: Pos2, renderer: &dyn SceneRenderer) -> Option<u64> {
        if self.pick_meshes.is_empty() {
            return None;
        }

        let ray = pointer_ray(self.config.viewport, self.config.view_projection, pointer);
        let meshes: Vec<MeshHandle> = self.pick_meshes.iter().map(|(_, mesh)| *mesh).collect();

        let hit = renderer.intersect_ray_with_meshes(ray, &meshes)?;
        self.pick_meshes
            .iter()
            .find(|(_, mesh)| *mesh == hit.mesh)
            .map(|(id, _)| *id)
    }
}
