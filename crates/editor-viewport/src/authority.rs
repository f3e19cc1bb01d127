//! Contract against the authoritative scene state.
//!
//! The viewport layer never owns scene objects. It consumes read-only
//! snapshots of the scene, asks the authority to resolve rays and mesh
//! data, and pushes selection changes and transform edits back through
//! this trait. All other scene bookkeeping stays on the authority's side.

use crate::math::Transform;

/// Identifier of a scene object instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(pub u64);

/// Identifier of a mesh asset.
///
/// Deliberately a distinct type so an instance id can never be passed
/// where a mesh id is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MeshId(pub String);

/// Identifier of a node in the scene hierarchy, one step of a selection path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

/// One entry of an authoritative scene snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderInstance {
    pub id: InstanceId,
    pub mesh_id: MeshId,
    pub transform: Transform,
    pub is_selected: bool,
}

/// Raw mesh geometry, immutable once fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshRecord {
    pub mesh_id: MeshId,
    pub vertex_positions: Vec<f32>,
    pub face_indices: Vec<u32>,
}

/// Result of an authority raycast.
#[derive(Debug, Clone, PartialEq)]
pub struct HitResult {
    /// World space position of the hit.
    pub position: mint::Vector3<f64>,
    /// The instance that was hit.
    pub object_id: InstanceId,
    /// Path from the hierarchy root down to the hit node.
    pub selection_path: Vec<NodeId>,
}

/// The authoritative owner of scene objects, hierarchy and selection.
pub trait SceneAuthority {
    /// Current snapshot of all renderable instances.
    fn scene_snapshot(&self) -> Vec<RenderInstance>;

    /// Whether the scene has changed since [`SceneAuthority::clear_dirty`]
    /// was last called.
    fn is_dirty(&self) -> bool;

    /// Acknowledges the current scene state.
    fn clear_dirty(&mut self);

    /// Geometry for the given mesh. `None` signals a transient fetch
    /// failure; the caller is expected to retry on a later sync.
    fn mesh_data(&self, mesh_id: &MeshId) -> Option<MeshRecord>;

    /// Closest intersection of the given world space ray with the scene.
    fn raycast_closest_hit(
        &self,
        origin: mint::Vector3<f64>,
        direction: mint::Vector3<f64>,
    ) -> Option<HitResult>;

    /// Selects the node addressed by the given hierarchy path.
    fn select_by_path(&mut self, path: &[NodeId]);

    /// Clears the current selection.
    fn deselect(&mut self);

    /// Moves the selection one level up the hierarchy.
    /// Returns false when the selection is already at the root.
    fn select_parent(&mut self) -> bool;

    /// Number of objects in the scene.
    fn object_count(&self) -> usize;

    /// Writes a new transform for the given instance.
    /// Returns false when the instance does not exist.
    fn update_transform(&mut self, id: InstanceId, transform: Transform) -> bool;
}
