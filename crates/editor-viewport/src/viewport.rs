//! The viewport facade.
//!
//! Owns every component of the interaction layer and advances them in a
//! fixed order once per frame: pointer input through the gizmo engine,
//! transform writes and clicks back to the authority, a dirty-checked
//! reconcile and finally composition and present. Everything runs on
//! the caller's thread; no component holds interior mutability.

use glam::DMat4;
use log::debug;

use crate::authority::{HitResult, InstanceId, SceneAuthority};
use crate::compositor::{Compositor, FramePlan};
use crate::config::{PreparedViewportConfig, ViewportConfig};
use crate::error::{Result, ViewportError};
use crate::gizmo::{GizmoEngine, PointerInput};
use crate::mesh_cache::MeshCache;
use crate::picking::PickingService;
use crate::reconciler::Reconciler;
use crate::renderer::SceneRenderer;
use crate::shape::ShapeBuilder;

/// What happened during one frame.
#[derive(Debug, Default, Clone)]
pub struct FrameOutcome {
    /// Result of a click resolved into a pick this frame.
    pub pick: Option<HitResult>,
    /// Whether an active drag wrote a transform to the authority.
    pub transform_written: bool,
    /// Whether the host should withhold camera navigation input.
    pub camera_input_blocked: bool,
}

/// The interaction layer of one editor viewport.
pub struct Viewport {
    config: PreparedViewportConfig,
    engine: GizmoEngine,
    picking: PickingService,
    reconciler: Reconciler,
    cache: MeshCache,
    compositor: Compositor,
    /// Instance the gizmo is anchored to, from the last synced snapshot.
    selected: Option<InstanceId>,
}

impl Viewport {
    /// Validates the configuration and performs the first full sync.
    ///
    /// Initialization failure is fatal; the viewport is only handed out
    /// once the camera is usable and the scene has been mirrored.
    pub fn initialize(
        config: ViewportConfig,
        authority: &mut dyn SceneAuthority,
        renderer: &mut dyn SceneRenderer,
    ) -> Result<Self> {
        validate_config(&config)?;

        let mut viewport = Self {
            config: PreparedViewportConfig::from_config(config),
            engine: GizmoEngine::new(),
            picking: PickingService::new(),
            reconciler: Reconciler::new(),
            cache: MeshCache::new(),
            compositor: Compositor::new(),
            selected: None,
        };

        let snapshot = authority.scene_snapshot();
        viewport.reconciler.sync(
            &snapshot,
            &viewport.config.visuals,
            &mut viewport.cache,
            &*authority,
            renderer,
        );
        authority.clear_dirty();
        viewport.selected = selected_instance(&snapshot);

        // Prime the gizmo so its handle meshes are uploaded before the
        // first frame when the scene starts out with a selection.
        let anchor = viewport.anchor();
        viewport
            .engine
            .update(viewport.config, anchor, PointerInput::default(), renderer);

        Ok(viewport)
    }

    /// Applies a new camera and viewport area, effective immediately.
    pub fn update_config(&mut self, config: ViewportConfig) {
        self.config.update_for_config(config);
    }

    /// Requests a render target resize, coalesced until the next frame.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.compositor.request_resize(width, height);
    }

    /// Advances the viewport by one frame and presents it.
    pub fn frame(
        &mut self,
        input: PointerInput,
        authority: &mut dyn SceneAuthority,
        renderer: &mut dyn SceneRenderer,
    ) -> FrameOutcome {
        let mut outcome = FrameOutcome::default();

        let anchor = self.anchor();
        let update = self.engine.update(self.config, anchor, input, renderer);

        if let (Some(transform), Some(id)) = (update.transform_write, self.selected) {
            if authority.update_transform(id, transform) {
                outcome.transform_written = true;
            } else {
                debug!("transform write refused for instance {:?}", id.0);
            }
        }

        if let Some(click) = update.click {
            let (ndc_x, ndc_y) = self.click_to_ndc(click);
            outcome.pick = self
                .picking
                .pick(ndc_x, ndc_y, &self.config, authority, &self.reconciler);
        }

        self.reconcile(authority, renderer);

        let plan = self.compose();
        self.compositor.present(&plan, renderer);

        outcome.camera_input_blocked = self.engine.camera_input_blocked();
        outcome
    }

    /// Moves the selection one hierarchy level up.
    pub fn select_parent(&mut self, authority: &mut dyn SceneAuthority) -> bool {
        self.picking.select_parent(authority)
    }

    /// World position of the transient pick marker, if any.
    pub fn marker(&self) -> Option<mint::Vector3<f64>> {
        self.picking.marker()
    }

    /// Removes the transient pick marker.
    pub fn clear_marker(&mut self) {
        self.picking.clear_marker();
    }

    /// Whether the host should withhold camera navigation input.
    pub fn camera_input_blocked(&self) -> bool {
        self.engine.camera_input_blocked()
    }

    /// Number of mirrored instances.
    pub fn mirror_count(&self) -> usize {
        self.reconciler.len()
    }

    fn anchor(&self) -> Option<crate::math::Transform> {
        self.selected.and_then(|id| self.reconciler.transform_of(id))
    }

    /// Syncs the mirrors when the authority reports changes. The dirty
    /// flag is read and cleared exactly once per sync.
    fn reconcile(&mut self, authority: &mut dyn SceneAuthority, renderer: &mut dyn SceneRenderer) {
        if !authority.is_dirty() {
            return;
        }

        let snapshot = authority.scene_snapshot();
        self.reconciler.sync(
            &snapshot,
            &self.config.visuals,
            &mut self.cache,
            &*authority,
            renderer,
        );
        authority.clear_dirty();
        self.selected = selected_instance(&snapshot);
    }

    fn compose(&self) -> FramePlan {
        let mut overlay = self.engine.draw();

        if let Some(marker) = self.picking.marker() {
            let builder = ShapeBuilder::new(
                self.config.view_projection,
                self.config.viewport,
                self.config.pixels_per_point,
            );
            overlay += builder
                .dot(
                    marker.into(),
                    self.config.visuals.marker_radius,
                    self.config.visuals.marker_color,
                )
                .into();
        }

        self.compositor.compose(&self.reconciler, overlay)
    }

    fn click_to_ndc(&self, click: emath::Pos2) -> (f64, f64) {
        let viewport = self.config.viewport;
        let x = f64::from(((click.x - viewport.min.x) / viewport.width()) * 2.0 - 1.0);
        let y = f64::from(((click.y - viewport.min.y) / viewport.height()) * 2.0 - 1.0);

        (x, -y)
    }
}

fn validate_config(config: &ViewportConfig) -> Result<()> {
    let viewport = config.viewport;
    if !(viewport.width() > 0.0 && viewport.height() > 0.0) || !viewport.is_finite() {
        return Err(ViewportError::Init {
            reason: format!("viewport area is degenerate: {viewport:?}"),
        });
    }

    if !DMat4::from(config.view_matrix).is_finite()
        || !DMat4::from(config.projection_matrix).is_finite()
    {
        return Err(ViewportError::Init {
            reason: "camera matrices are not finite".into(),
        });
    }

    if config.pixels_per_point <= 0.0 {
        return Err(ViewportError::Init {
            reason: format!("invalid pixels per point: {}", config.pixels_per_point),
        });
    }

    Ok(())
}

fn selected_instance(snapshot: &[crate::authority::RenderInstance]) -> Option<InstanceId> {
    snapshot
        .iter()
        .find(|instance| instance.is_selected)
        .map(|instance| instance.id)
}
