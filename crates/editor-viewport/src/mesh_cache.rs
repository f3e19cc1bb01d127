//! Memoized mesh geometry.
//!
//! Each distinct [`MeshId`] is fetched from the authority and uploaded to
//! the rendering backend exactly once. Later lookups hand out a shared
//! reference to the cached entry. There is no eviction; the cache lives
//! as long as the viewport and is only cleared on a full scene reset.

use std::sync::Arc;

use ahash::AHashMap;

use crate::authority::{MeshId, MeshRecord, SceneAuthority};
use crate::error::{Result, ViewportError};
use crate::renderer::{MeshHandle, SceneRenderer};

/// A mesh that has been fetched and uploaded.
#[derive(Debug, Clone)]
pub struct CachedMesh {
    pub record: MeshRecord,
    pub handle: MeshHandle,
}

/// Cache of uploaded meshes, keyed by [`MeshId`].
#[derive(Debug, Default)]
pub struct MeshCache {
    meshes: AHashMap<MeshId, Arc<CachedMesh>>,
}

impl MeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Geometry for the given mesh id.
    ///
    /// A miss fetches from the authority and uploads to the renderer;
    /// a hit returns the memoized entry without touching either.
    pub fn geometry(
        &mut self,
        mesh_id: &MeshId,
        authority: &dyn SceneAuthority,
        renderer: &mut dyn SceneRenderer,
    ) -> Result<Arc<CachedMesh>> {
        if let Some(cached) = self.meshes.get(mesh_id) {
            return Ok(Arc::clone(cached));
        }

        let record = authority
            .mesh_data(mesh_id)
            .ok_or_else(|| ViewportError::MeshUnavailable {
                mesh_id: mesh_id.clone(),
            })?;

        let handle = renderer.upload_mesh(&record);
        let cached = Arc::new(CachedMesh { record, handle });
        self.meshes.insert(mesh_id.clone(), Arc::clone(&cached));

        Ok(cached)
    }

    /// Number of cached meshes.
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Drops all cached entries and frees their uploaded geometry.
    pub fn clear(&mut self, renderer: &mut dyn SceneRenderer) {
        for (_, cached) in self.meshes.drain() {
            renderer.free_mesh(cached.handle);
        }
    }
}
