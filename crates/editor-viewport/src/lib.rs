//! Interaction layer for an embedded 3d editor viewport.
//!
//! The viewport sits between a scene authority, which owns the document
//! and answers picking queries, and a rendering backend, which owns the
//! GPU resources. Each frame the host feeds pointer input to
//! [`Viewport::frame`]; the viewport routes it through the transform
//! gizmo, resolves clicks into picks, mirrors the authority's scene
//! graph and hands the backend a flat [`compositor::FramePlan`] to
//! rasterize.
//!
//! The host integrates by implementing two traits:
//! [`SceneAuthority`] for the document side and [`SceneRenderer`] for
//! the GPU side. Everything in between, the gizmo drag math, the
//! click-versus-drag arbitration, the mirror bookkeeping, is handled
//! here.

mod gizmo;
mod handle;
mod shape;

pub mod authority;
pub mod compositor;
pub mod config;
pub mod error;
pub mod math;
pub mod mesh_cache;
pub mod picking;
pub mod reconciler;
pub mod renderer;
pub mod viewport;

pub mod prelude;

pub use prelude::*;
