//! Contract against the rendering backend.
//!
//! The backend owns the GPU: it keeps uploaded geometry, projects points
//! through the active camera and rasterizes the per-frame plan handed to
//! it by the compositor. The viewport layer only ever refers to uploaded
//! geometry through opaque [`MeshHandle`] values.

use ecolor::Color32;
use emath::Pos2;

use crate::authority::MeshRecord;
use crate::compositor::FramePlan;
use crate::math::Ray;

/// Opaque handle to geometry uploaded to the rendering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u64);

/// Intersection of a ray with one of the meshes passed to
/// [`SceneRenderer::intersect_ray_with_meshes`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleHit {
    /// The mesh that was hit.
    pub mesh: MeshHandle,
    /// Distance along the ray to the hit.
    pub distance: f64,
}

/// Shading parameters of one draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialParams {
    pub color: Color32,
    pub opacity: f32,
}

/// The rendering backend of the viewport.
pub trait SceneRenderer {
    /// Uploads mesh geometry and returns a handle to it.
    fn upload_mesh(&mut self, record: &MeshRecord) -> MeshHandle;

    /// Releases previously uploaded geometry.
    fn free_mesh(&mut self, handle: MeshHandle);

    /// Projects a world space point through the active camera.
    /// `None` when the point falls behind the near plane.
    fn project_world_to_screen(&self, point: mint::Vector3<f64>) -> Option<Pos2>;

    /// Closest intersection of the given ray with the given meshes only.
    /// Used for gizmo handle hover; the full scene is never tested here.
    fn intersect_ray_with_meshes(&self, ray: Ray, meshes: &[MeshHandle]) -> Option<HandleHit>;

    /// Resizes the render targets to the given physical size.
    fn resize_targets(&mut self, width: u32, height: u32);

    /// Rasterizes and presents one frame.
    fn render_frame(&mut self, plan: &FramePlan);
}
