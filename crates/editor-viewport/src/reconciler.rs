//! Reconciliation of authoritative scene snapshots into local mirrors.
//!
//! The reconciler keeps one mirror per authoritative instance. Each sync
//! diffs the latest snapshot against the mirrors: new instances are
//! created, moved instances get their transform updated in place, and
//! mirrors whose instance disappeared are removed. Selection highlights
//! are recomputed from scratch on every sync so they can never drift
//! from the authoritative selection state.

use ahash::AHashMap;
use ecolor::{Color32, Rgba};
use log::{debug, warn};
use std::sync::Arc;

use crate::authority::{InstanceId, RenderInstance, SceneAuthority};
use crate::config::ViewportVisuals;
use crate::math::Transform;
use crate::mesh_cache::{CachedMesh, MeshCache};
use crate::renderer::{MaterialParams, SceneRenderer};

/// Local mirror of one authoritative instance.
///
/// Carries two render passes over the same geometry: a front-facing
/// opaque pass and a back-facing translucent ghost pass that keeps
/// objects legible when seen from inside.
#[derive(Debug, Clone)]
pub struct Mirror {
    pub mesh: Arc<CachedMesh>,
    pub transform: Transform,
    pub front: MaterialParams,
    pub ghost: MaterialParams,
    /// Materials as they were before the highlight variant was applied.
    /// `Some` exactly while the mirror is highlighted.
    saved: Option<(MaterialParams, MaterialParams)>,
}

/// Diffs scene snapshots into the local mirror set.
#[derive(Debug, Default)]
pub struct Reconciler {
    mirrors: AHashMap<InstanceId, Mirror>,
    outline: Vec<InstanceId>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings the mirror set in line with the given snapshot.
    ///
    /// A mesh the authority cannot provide geometry for only skips its
    /// own instance; the rest of the sync is unaffected and the skipped
    /// instance is retried on the next sync.
    pub fn sync(
        &mut self,
        snapshot: &[RenderInstance],
        visuals: &ViewportVisuals,
        cache: &mut MeshCache,
        authority: &dyn SceneAuthority,
        renderer: &mut dyn SceneRenderer,
    ) {
        let mut created = 0_usize;
        let mut failed = 0_usize;

        for instance in snapshot {
            if let Some(mirror) = self.mirrors.get_mut(&instance.id) {
                mirror.transform = instance.transform;
                continue;
            }

            let mesh = match cache.geometry(&instance.mesh_id, authority, renderer) {
                Ok(mesh) => mesh,
                Err(err) => {
                    warn!(
                        "skipping instance {:?} this sync: {}",
                        instance.id.0, err
                    );
                    failed += 1;
                    continue;
                }
            };

            self.mirrors.insert(
                instance.id,
                Mirror {
                    mesh,
                    transform: instance.transform,
                    front: MaterialParams {
                        color: visuals.object_color,
                        opacity: 1.0,
                    },
                    ghost: MaterialParams {
                        color: visuals.object_color,
                        opacity: visuals.ghost_alpha,
                    },
                    saved: None,
                },
            );
            created += 1;
        }

        let before = self.mirrors.len();
        self.mirrors
            .retain(|id, _| snapshot.iter().any(|instance| instance.id == *id));
        let removed = before - self.mirrors.len();

        self.refresh_highlights(snapshot, visuals);

        debug!(
            "sync: {} mirrors ({} created, {} removed, {} skipped)",
            self.mirrors.len(),
            created,
            removed,
            failed
        );
    }

    /// Recomputes selection highlights and the outline target list.
    ///
    /// Applying the highlight saves the base materials once; clearing it
    /// restores them exactly, so repeated syncs never compound the tint.
    fn refresh_highlights(&mut self, snapshot: &[RenderInstance], visuals: &ViewportVisuals) {
        self.outline.clear();

        for instance in snapshot {
            let Some(mirror) = self.mirrors.get_mut(&instance.id) else {
                continue;
            };

            if instance.is_selected {
                let (base_front, base_ghost) =
                    *mirror.saved.get_or_insert((mirror.front, mirror.ghost));

                mirror.front = MaterialParams {
                    color: lighten(base_front.color, visuals.selection_lighten),
                    opacity: visuals.selection_alpha,
                };
                mirror.ghost = MaterialParams {
                    color: lighten(base_ghost.color, visuals.selection_lighten),
                    opacity: base_ghost.opacity,
                };

                self.outline.push(instance.id);
            } else if let Some((front, ghost)) = mirror.saved.take() {
                mirror.front = front;
                mirror.ghost = ghost;
            }
        }
    }

    /// Whether a mirror exists for the given instance.
    pub fn contains(&self, id: InstanceId) -> bool {
        self.mirrors.contains_key(&id)
    }

    /// Transform of the given instance's mirror.
    pub fn transform_of(&self, id: InstanceId) -> Option<Transform> {
        self.mirrors.get(&id).map(|mirror| mirror.transform)
    }

    /// All current mirrors.
    pub fn mirrors(&self) -> impl Iterator<Item = (&InstanceId, &Mirror)> {
        self.mirrors.iter()
    }

    /// Number of mirrors.
    pub fn len(&self) -> usize {
        self.mirrors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mirrors.is_empty()
    }

    /// Instances whose silhouette should be outlined this frame.
    pub fn outline_targets(&self) -> &[InstanceId] {
        &self.outline
    }
}

/// Blends a color towards white by the given amount.
fn lighten(color: Color32, amount: f32) -> Color32 {
    let base = Rgba::from(color);
    let blended = base * (1.0 - amount) + Rgba::WHITE * amount;
    Color32::from(blended)
}
