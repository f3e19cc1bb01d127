pub use crate::authority::{
    HitResult, InstanceId, MeshId, MeshRecord, NodeId, RenderInstance, SceneAuthority,
};
pub use crate::compositor::{DrawCall, FramePlan, OverlayDrawData};
pub use crate::config::{GizmoAxis, GizmoMode, GizmoPlane, ViewportConfig, ViewportVisuals};
pub use crate::error::{Result, ViewportError};
pub use crate::gizmo::PointerInput;
pub use crate::math::{Ray, Transform};
pub use crate::renderer::{HandleHit, MaterialParams, MeshHandle, SceneRenderer};
pub use crate::viewport::{FrameOutcome, Viewport};

pub use enumset::{enum_set, EnumSet};

pub use mint;

pub use ecolor::Color32;
pub use emath::{Pos2, Rect};
