use glam::{DMat4, DQuat, DVec3};

use crate::authority::MeshRecord;
use crate::config::{GizmoPlane, PreparedViewportConfig};
use crate::gizmo::DragSession;
use crate::handle::common::{
    handle_color, pick_mesh_id, plane_color, project_screen_axis, ring_pick_mesh,
    solve_plane_coords,
};
use crate::handle::{HandleConfig, HandleControl, HandleKind};
use crate::math::{Pos2, Transform};
use crate::renderer::SceneRenderer;
use crate::shape::{OverlayDrawData, ShapeBuilder, Stroke};

pub(crate) type RotationHandle = HandleConfig<Rotation>;

const RING_SEGMENTS: u32 = 48;

#[derive(Debug, Copy, Clone, Hash)]
pub(crate) struct RotationParams {
    pub plane: GizmoPlane,
}

#[derive(Default, Debug, Copy, Clone)]
pub(crate) struct Rotation;

impl HandleKind for Rotation {
    type Params = RotationParams;

    fn pick_mesh(handle: &RotationHandle) -> MeshRecord {
        let config = &handle.config;
        let normal = config.rotation * handle.plane.normal();

        ring_pick_mesh(
            pick_mesh_id(handle.id()),
            config.translation,
            normal,
            ring_radius(config),
            f64::from(config.focus_distance),
            RING_SEGMENTS,
        )
    }

    /// Both the grab point and the live pointer are expressed in the
    /// screen image of the rotation plane, as coordinates against the
    /// projected plane basis. The angle is the difference of their polar
    /// angles in that basis, so it only depends on where the pointer is
    /// now, not on the path it took.
    fn drag(
        handle: &RotationHandle,
        session: &mut DragSession,
        pointer: Pos2,
        renderer: &dyn SceneRenderer,
    ) -> Option<Transform> {
        let start = session.start_transform;
        let start_rotation = DQuat::from(start.rotation);
        let anchor = DVec3::from(start.translation);

        let (u_axis, v_axis) = handle.plane.basis();
        let world_u = start_rotation * u_axis;
        let world_v = start_rotation * v_axis;

        let (anchor_px, u_px) = project_screen_axis(renderer, anchor, world_u)?;
        let (_, v_px) = project_screen_axis(renderer, anchor, world_v)?;

        let (start_u, start_v) = solve_plane_coords(u_px, v_px, session.start_pointer - anchor_px)?;
        let (live_u, live_v) = solve_plane_coords(u_px, v_px, pointer - anchor_px)?;

        let delta = f64::atan2(live_v, live_u) - f64::atan2(start_v, start_u);

        let world_normal = start_rotation * handle.plane.normal();
        let rotation = DQuat::from_axis_angle(world_normal, delta) * start_rotation;

        Some(Transform {
            rotation: rotation.into(),
            ..start
        })
    }

    fn draw(handle: &RotationHandle) -> OverlayDrawData {
        let config = &handle.config;

        let builder = ShapeBuilder::new(
            config.view_projection * ring_model(config, handle.plane),
            config.viewport,
            config.pixels_per_point,
        );

        let color = handle_color(
            &config.visuals,
            handle.focused,
            plane_color(&config.visuals, handle.plane),
        );

        builder
            .circle(
                ring_radius(config),
                Stroke::new(config.visuals.stroke_width, color),
            )
            .into()
    }
}

fn ring_radius(config: &PreparedViewportConfig) -> f64 {
    f64::from(config.scale_factor * config.visuals.gizmo_size)
}

/// Aligns the builder's y axis with the ring normal so the circle drawn
/// in the builder's xz plane lands in the handle's rotation plane.
fn ring_model(config: &PreparedViewportConfig, plane: GizmoPlane) -> DMat4 {
    let align = DQuat::from_rotation_arc(DVec3::Y, plane.normal());
    DMat4::from_rotation_translation(config.rotation * align, config.translation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::test_support::{ortho_config, session_at, OrthoRenderer};

    fn handle(plane: GizmoPlane) -> RotationHandle {
        HandleConfig::new(ortho_config(), RotationParams { plane })
    }

    #[test]
    fn test_quarter_turn_in_screen_space() {
        let handle = handle(GizmoPlane::Xy);
        let renderer = OrthoRenderer;
        // Grab on the positive x side of the ring.
        let mut session = session_at(Pos2::new(500.0, 300.0));

        // Pointer moves to the positive y side, a quarter turn
        // counterclockwise around z.
        let transform = handle
            .drag(&mut session, Pos2::new(400.0, 200.0), &renderer)
            .unwrap();

        let rotation = DQuat::from(transform.rotation);
        let rotated = rotation * DVec3::X;

        assert!((rotated - DVec3::Y).length() < 1e-9);
        assert!(DVec3::from(transform.translation).length() < 1e-9);
    }

    #[test]
    fn test_angle_depends_only_on_final_pointer() {
        let handle = handle(GizmoPlane::Xy);
        let renderer = OrthoRenderer;
        let target = Pos2::new(400.0, 200.0);

        let mut direct = session_at(Pos2::new(500.0, 300.0));
        let direct_result = handle.drag(&mut direct, target, &renderer).unwrap();

        let mut wandering = session_at(Pos2::new(500.0, 300.0));
        handle.drag(&mut wandering, Pos2::new(480.0, 350.0), &renderer);
        handle.drag(&mut wandering, Pos2::new(300.0, 310.0), &renderer);
        let wandering_result = handle.drag(&mut wandering, target, &renderer).unwrap();

        let a = DQuat::from(direct_result.rotation);
        let b = DQuat::from(wandering_result.rotation);
        assert!(a.angle_between(b) < 1e-9);
    }

    #[test]
    fn test_rotation_composes_onto_start_rotation() {
        let handle = handle(GizmoPlane::Xy);
        let renderer = OrthoRenderer;
        let start = Transform::from_scale_rotation_translation(
            DVec3::ONE,
            DQuat::from_rotation_z(0.3),
            DVec3::ZERO,
        );

        let mut session = session_at(Pos2::new(500.0, 300.0));
        session.start_transform = start;

        let transform = handle
            .drag(&mut session, Pos2::new(500.0, 300.0), &renderer)
            .unwrap();

        // Pointer still at the grab point, the start rotation must come
        // back unchanged.
        let rotation = DQuat::from(transform.rotation);
        assert!(rotation.angle_between(DQuat::from_rotation_z(0.3)) < 1e-9);
    }

    #[test]
    fn test_edge_on_plane_skips_the_frame() {
        // The zx plane projects to a single screen line in the test
        // renderer, its basis is degenerate on screen.
        let handle = handle(GizmoPlane::Zx);
        let renderer = OrthoRenderer;
        let mut session = session_at(Pos2::new(500.0, 300.0));

        assert!(handle
            .drag(&mut session, Pos2::new(400.0, 200.0), &renderer)
            .is_none());
    }

    #[test]
    fn test_pick_mesh_is_centered_on_anchor() {
        let mut config = ortho_config();
        config.update_for_anchor(Transform::from_scale_rotation_translation(
            DVec3::ONE,
            DQuat::IDENTITY,
            DVec3::new(5.0, 0.0, 0.0),
        ));
        let handle: RotationHandle = HandleConfig::new(
            config,
            RotationParams {
                plane: GizmoPlane::Xy,
            },
        );

        let mesh = handle.pick_mesh();
        let radius = ring_radius(&config);

        for chunk in mesh.vertex_positions.chunks_exact(3) {
            let p = DVec3::new(chunk[0].into(), chunk[1].into(), chunk[2].into());
            let distance = (p - DVec3::new(5.0, 0.0, 0.0)).length();
            assert!((distance - radius).abs() < radius * 0.5);
        }
    }
}
