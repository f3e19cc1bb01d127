//! Frame composition.
//!
//! Flattens the mirror set and the frame's overlay geometry into a
//! [`FramePlan`] the rendering backend consumes in a single call.
//! Resize requests are coalesced and applied at most once per frame;
//! camera changes bypass the compositor entirely and take effect on the
//! viewport config immediately.

use crate::authority::InstanceId;
use crate::math::Transform;
use crate::reconciler::Reconciler;
use crate::renderer::{MaterialParams, MeshHandle, SceneRenderer};
pub use crate::shape::OverlayDrawData;

/// One mesh drawn with one material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub mesh: MeshHandle,
    pub transform: Transform,
    pub material: MaterialParams,
}

/// Everything the rendering backend needs to rasterize one frame.
#[derive(Debug, Default, Clone)]
pub struct FramePlan {
    /// Front-facing opaque pass, drawn first.
    pub opaque_pass: Vec<DrawCall>,
    /// Back-facing translucent ghost pass, drawn over the opaque pass.
    pub ghost_pass: Vec<DrawCall>,
    /// Instances whose silhouette is outlined.
    pub outline_targets: Vec<InstanceId>,
    /// Screen space overlay, the gizmo handles and the pick marker.
    pub overlay: OverlayDrawData,
}

/// Builds the per-frame plan and hands it to the backend.
#[derive(Debug, Default)]
pub struct Compositor {
    pending_resize: Option<(u32, u32)>,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a render target resize. Requests arriving within one
    /// frame are coalesced and the latest size wins.
    pub fn request_resize(&mut self, width: u32, height: u32) {
        self.pending_resize = Some((width, height));
    }

    /// Flattens the current mirrors and the overlay into a frame plan.
    /// Draw calls are ordered by instance id so the plan is stable
    /// across frames.
    pub(crate) fn compose(&self, reconciler: &Reconciler, overlay: OverlayDrawData) -> FramePlan {
        let mut mirrors: Vec<_> = reconciler.mirrors().collect();
        mirrors.sort_by_key(|(id, _)| id.0);

        let mut plan = FramePlan {
            overlay,
            ..Default::default()
        };

        for (_, mirror) in mirrors {
            plan.opaque_pass.push(DrawCall {
                mesh: mirror.mesh.handle,
                transform: mirror.transform,
                material: mirror.front,
            });
            plan.ghost_pass.push(DrawCall {
                mesh: mirror.mesh.handle,
                transform: mirror.transform,
                material: mirror.ghost,
            });
        }

        plan.outline_targets = reconciler.outline_targets().to_vec();
        plan
    }

    /// Applies at most one pending resize, then presents the plan.
    pub(crate) fn present(&mut self, plan: &FramePlan, renderer: &mut dyn SceneRenderer) {
        if let Some((width, height)) = self.pending_resize.take() {
            renderer.resize_targets(width, height);
        }

        renderer.render_frame(plan);
    }
}
