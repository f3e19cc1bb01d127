//! Object picking and hierarchy selection.
//!
//! A pick casts a ray through the clicked point, lets the authority
//! resolve the closest scene intersection and routes the result back as
//! a selection change. The viewport only remembers one piece of derived
//! state: the transient marker at the last hit position.

use log::debug;

use crate::authority::{HitResult, SceneAuthority};
use crate::config::PreparedViewportConfig;
use crate::math::ndc_ray;
use crate::reconciler::Reconciler;

/// Resolves viewport clicks into authoritative selection changes.
#[derive(Debug, Default)]
pub struct PickingService {
    marker: Option<mint::Vector3<f64>>,
}

impl PickingService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks the scene at the given normalized device coordinates.
    ///
    /// A hit selects the hit node's hierarchy path and places the marker
    /// at the hit position. A miss clears both the selection and the
    /// marker. A hit that names an instance without a local mirror is a
    /// stale reference and is treated as a miss.
    pub fn pick(
        &mut self,
        ndc_x: f64,
        ndc_y: f64,
        config: &PreparedViewportConfig,
        authority: &mut dyn SceneAuthority,
        reconciler: &Reconciler,
    ) -> Option<HitResult> {
        let ray = ndc_ray(config.view_projection.inverse(), ndc_x, ndc_y);

        let hit = authority
            .raycast_closest_hit(ray.origin.into(), ray.direction.into())
            .filter(|hit| {
                let known = reconciler.contains(hit.object_id);
                if !known {
                    debug!("dropping stale hit on instance {:?}", hit.object_id.0);
                }
                known
            });

        match &hit {
            Some(hit) => {
                authority.select_by_path(&hit.selection_path);
                self.marker = Some(hit.position);
            }
            None => {
                authority.deselect();
                self.marker = None;
            }
        }

        hit
    }

    /// Moves the selection one hierarchy level up.
    /// Returns whether a parent existed.
    pub fn select_parent(&mut self, authority: &mut dyn SceneAuthority) -> bool {
        authority.select_parent()
    }

    /// World position of the transient pick marker, if any.
    pub fn marker(&self) -> Option<mint::Vector3<f64>> {
        self.marker
    }

    /// Removes the transient pick marker.
    pub fn clear_marker(&mut self) {
        self.marker = None;
    }
}
