use ecolor::Color32;
use emath::{Pos2, Vec2};
use glam::{DMat4, DVec3};

use crate::authority::{MeshId, MeshRecord};
use crate::config::{GizmoAxis, GizmoPlane, PreparedViewportConfig, ViewportVisuals};
use crate::renderer::SceneRenderer;
use crate::shape::ShapeBuilder;

/// Squared screen space lengths and determinants below this are treated
/// as degenerate and skip the frame's update.
pub(crate) const SCREEN_EPSILON: f64 = 1e-6;

pub(crate) const fn axis_color(visuals: &ViewportVisuals, axis: GizmoAxis) -> Color32 {
    match axis {
        GizmoAxis::X => visuals.x_color,
        GizmoAxis::Y => visuals.y_color,
        GizmoAxis::Z => visuals.z_color,
    }
}

/// A rotation ring is colored after the axis it spins around.
pub(crate) const fn plane_color(visuals: &ViewportVisuals, plane: GizmoPlane) -> Color32 {
    match plane {
        GizmoPlane::Xy => visuals.z_color,
        GizmoPlane::Yz => visuals.x_color,
        GizmoPlane::Zx => visuals.y_color,
    }
}

pub(crate) fn handle_color(visuals: &ViewportVisuals, focused: bool, base: Color32) -> Color32 {
    let color = if focused {
        visuals.highlight_color.unwrap_or(base)
    } else {
        base
    };

    let alpha = if focused {
        visuals.highlight_alpha
    } else {
        visuals.inactive_alpha
    };

    color.linear_multiply(alpha)
}

/// Model matrix of the gizmo group, without the anchor scale so handle
/// geometry keeps its own sizing.
pub(crate) fn gizmo_model(config: &PreparedViewportConfig) -> DMat4 {
    DMat4::from_rotation_translation(config.rotation, config.translation)
}

pub(crate) fn overlay_builder(config: &PreparedViewportConfig) -> ShapeBuilder {
    ShapeBuilder::new(
        config.view_projection * gizmo_model(config),
        config.viewport,
        config.pixels_per_point,
    )
}

/// Projects a world space axis anchored at `anchor` onto the screen.
/// Returns the anchor position in pixels and the screen vector covered
/// by one world unit along the axis.
pub(crate) fn project_screen_axis(
    renderer: &dyn SceneRenderer,
    anchor: DVec3,
    axis: DVec3,
) -> Option<(Pos2, Vec2)> {
    let anchor_px = renderer.project_world_to_screen(anchor.into())?;
    let tip_px = renderer.project_world_to_screen((anchor + axis).into())?;

    Some((anchor_px, tip_px - anchor_px))
}

/// Scalar position of the pointer along a world space axis, measured in
/// world units from the anchor.
///
/// The axis is projected to a screen vector `v`; the pointer offset from
/// the anchor is then projected onto `v` and normalized by its squared
/// length. `None` when the axis is degenerate on screen (seen end-on or
/// behind the camera).
pub(crate) fn screen_axis_scalar(
    renderer: &dyn SceneRenderer,
    anchor: DVec3,
    axis: DVec3,
    pointer: Pos2,
) -> Option<f64> {
    let (anchor_px, v) = project_screen_axis(renderer, anchor, axis)?;

    let (vx, vy) = (v.x as f64, v.y as f64);
    let len2 = vx * vx + vy * vy;
    if len2 < SCREEN_EPSILON {
        return None;
    }

    let offset = pointer - anchor_px;
    Some(((offset.x as f64) * vx + (offset.y as f64) * vy) / len2)
}

/// Solves the plane coordinates `(u, v)` of a screen offset against the
/// projected plane basis `[v1 | v2]` by inverting the 2x2 mapping.
/// `None` when the basis is degenerate on screen (plane seen edge-on).
pub(crate) fn solve_plane_coords(v1: Vec2, v2: Vec2, offset: Vec2) -> Option<(f64, f64)> {
    let (a, b) = (v1.x as f64, v2.x as f64);
    let (c, d) = (v1.y as f64, v2.y as f64);

    let det = a * d - b * c;
    if det.abs() < SCREEN_EPSILON {
        return None;
    }

    let (x, y) = (offset.x as f64, offset.y as f64);
    Some(((d * x - b * y) / det, (-c * x + a * y) / det))
}

/// World space box around the segment from `from` to `to`, used as
/// hover geometry for shaft handles.
pub(crate) fn shaft_pick_mesh(
    mesh_id: MeshId,
    from: DVec3,
    to: DVec3,
    half_width: f64,
) -> MeshRecord {
    let axis = (to - from).normalize_or_zero();
    let (u, v) = axis.any_orthonormal_pair();
    let u = u * half_width;
    let v = v * half_width;

    let corners = [
        from - u - v,
        from + u - v,
        from + u + v,
        from - u + v,
        to - u - v,
        to + u - v,
        to + u + v,
        to - u + v,
    ];

    let mut vertex_positions = Vec::with_capacity(corners.len() * 3);
    for corner in corners {
        vertex_positions.extend([corner.x as f32, corner.y as f32, corner.z as f32]);
    }

    let mut face_indices = vec![0, 1, 2, 0, 2, 3, 4, 6, 5, 4, 7, 6];
    for i in 0..4_u32 {
        let a = i;
        let b = (i + 1) % 4;
        face_indices.extend([a, b, b + 4, a, b + 4, a + 4]);
    }

    MeshRecord {
        mesh_id,
        vertex_positions,
        face_indices,
    }
}

/// Flat world space annulus around `center` in the plane with the given
/// normal, used as hover geometry for rotation rings.
pub(crate) fn ring_pick_mesh(
    mesh_id: MeshId,
    center: DVec3,
    normal: DVec3,
    radius: f64,
    half_width: f64,
    segments: u32,
) -> MeshRecord {
    let (u, v) = normal.any_orthonormal_pair();

    let mut vertex_positions = Vec::with_capacity(segments as usize * 6);
    for i in 0..segments {
        let angle = std::f64::consts::TAU * f64::from(i) / f64::from(segments);
        let spoke = u * angle.cos() + v * angle.sin();

        for r in [radius - half_width, radius + half_width] {
            let p = center + spoke * r;
            vertex_positions.extend([p.x as f32, p.y as f32, p.z as f32]);
        }
    }

    let mut face_indices = Vec::with_capacity(segments as usize * 6);
    for i in 0..segments {
        let inner = i * 2;
        let outer = inner + 1;
        let next_inner = ((i + 1) % segments) * 2;
        let next_outer = next_inner + 1;

        face_indices.extend([inner, outer, next_outer, inner, next_outer, next_inner]);
    }

    MeshRecord {
        mesh_id,
        vertex_positions,
        face_indices,
    }
}

/// Synthetic mesh id for a handle's hover geometry.
pub(crate) fn pick_mesh_id(handle_id: u64) -> MeshId {
    MeshId(format!("gizmo-handle-{handle_id:016x}"))
}
