use glam::{DQuat, DVec3};

use crate::authority::MeshRecord;
use crate::config::{GizmoAxis, PreparedViewportConfig};
use crate::gizmo::DragSession;
use crate::handle::common::{
    axis_color, handle_color, overlay_builder, pick_mesh_id, screen_axis_scalar, shaft_pick_mesh,
};
use crate::handle::{HandleConfig, HandleControl, HandleKind};
use crate::math::{Pos2, Transform};
use crate::renderer::SceneRenderer;
use crate::shape::{OverlayDrawData, Stroke};

pub(crate) type TranslationHandle = HandleConfig<Translation>;

/// Fraction of the shaft length left open around the anchor so the
/// shafts do not overlap each other at the gizmo center.
const SHAFT_START: f64 = 0.2;
/// Length of the arrow tip as a fraction of the shaft length.
const TIP_LENGTH: f64 = 0.2;

#[derive(Debug, Copy, Clone, Hash)]
pub(crate) struct TranslationParams {
    pub axis: GizmoAxis,
}

#[derive(Default, Debug, Copy, Clone)]
pub(crate) struct Translation;

impl HandleKind for Translation {
    type Params = TranslationParams;

    fn pick_mesh(handle: &TranslationHandle) -> MeshRecord {
        let config = &handle.config;
        let world_axis = config.rotation * handle.axis.unit();
        let length = shaft_length(config);

        shaft_pick_mesh(
            pick_mesh_id(handle.id()),
            config.translation + world_axis * (length * SHAFT_START),
            config.translation + world_axis * (length * (1.0 + TIP_LENGTH)),
            f64::from(config.focus_distance),
        )
    }

    /// The pointer is projected onto the screen image of the dragged
    /// axis. The scalar measured on the first frame becomes the zero
    /// reference, so the anchor follows pointer movement relative to
    /// the grab point instead of jumping under the pointer.
    fn drag(
        handle: &TranslationHandle,
        session: &mut DragSession,
        pointer: Pos2,
        renderer: &dyn SceneRenderer,
    ) -> Option<Transform> {
        let start = session.start_transform;
        let start_rotation = DQuat::from(start.rotation);
        let anchor = DVec3::from(start.translation);
        let world_axis = start_rotation * handle.axis.unit();

        let scalar = screen_axis_scalar(renderer, anchor, world_axis, pointer)?;
        let zero = *session.reference.get_or_insert(scalar);

        let translation = anchor + world_axis * (scalar - zero);

        Some(Transform {
            translation: translation.into(),
            ..start
        })
    }

    fn draw(handle: &TranslationHandle) -> OverlayDrawData {
        let config = &handle.config;
        let builder = overlay_builder(config);

        let color = handle_color(
            &config.visuals,
            handle.focused,
            axis_color(&config.visuals, handle.axis),
        );

        let axis = handle.axis.unit();
        let length = shaft_length(config);

        let mut draw_data = OverlayDrawData::default();
        draw_data += builder
            .line_segment(
                axis * (length * SHAFT_START),
                axis * length,
                Stroke::new(config.visuals.stroke_width, color),
            )
            .into();
        draw_data += builder
            .arrow(
                axis * length,
                axis * (length * (1.0 + TIP_LENGTH)),
                Stroke::new(config.visuals.stroke_width * 3.0, color),
            )
            .into();

        draw_data
    }
}

fn shaft_length(config: &PreparedViewportConfig) -> f64 {
    f64::from(config.scale_factor * config.visuals.gizmo_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewportConfig;
    use crate::handle::test_support::{ortho_config, session_at, OrthoRenderer};

    fn handle() -> TranslationHandle {
        HandleConfig::new(ortho_config(), TranslationParams { axis: GizmoAxis::X })
    }

    #[test]
    fn test_first_drag_frame_is_a_no_op() {
        let handle = handle();
        let renderer = OrthoRenderer;
        // Grab point is half a world unit along the axis.
        let mut session = session_at(Pos2::new(450.0, 300.0));

        let transform = handle
            .drag(&mut session, Pos2::new(450.0, 300.0), &renderer)
            .unwrap();

        let translation = DVec3::from(transform.translation);
        assert!(translation.length() < 1e-9);
        assert_eq!(session.reference, Some(0.5));
    }

    #[test]
    fn test_drag_moves_anchor_relative_to_grab_point() {
        let handle = handle();
        let renderer = OrthoRenderer;
        let mut session = session_at(Pos2::new(450.0, 300.0));

        handle.drag(&mut session, Pos2::new(450.0, 300.0), &renderer);
        let transform = handle
            .drag(&mut session, Pos2::new(550.0, 300.0), &renderer)
            .unwrap();

        // 100 px at 100 px per world unit is one unit along x.
        let translation = DVec3::from(transform.translation);
        assert!((translation - DVec3::X).length() < 1e-9);
        assert_eq!(DQuat::from(transform.rotation), DQuat::IDENTITY);
    }

    #[test]
    fn test_perpendicular_pointer_motion_is_ignored() {
        let handle = handle();
        let renderer = OrthoRenderer;
        let mut session = session_at(Pos2::new(450.0, 300.0));

        handle.drag(&mut session, Pos2::new(450.0, 300.0), &renderer);
        let transform = handle
            .drag(&mut session, Pos2::new(450.0, 200.0), &renderer)
            .unwrap();

        assert!(DVec3::from(transform.translation).length() < 1e-9);
    }

    #[test]
    fn test_degenerate_screen_axis_skips_the_frame() {
        // The z axis projects to a zero screen vector in the test
        // renderer, as if seen end-on.
        let handle: TranslationHandle =
            HandleConfig::new(ortho_config(), TranslationParams { axis: GizmoAxis::Z });
        let renderer = OrthoRenderer;
        let mut session = session_at(Pos2::new(400.0, 300.0));

        assert!(handle
            .drag(&mut session, Pos2::new(420.0, 300.0), &renderer)
            .is_none());
        assert_eq!(session.reference, None);
    }

    #[test]
    fn test_pick_mesh_follows_anchor_rotation() {
        let mut config = ortho_config();
        config.update_for_anchor(Transform::from_scale_rotation_translation(
            DVec3::ONE,
            DQuat::from_rotation_z(std::f64::consts::FRAC_PI_2),
            DVec3::ZERO,
        ));
        let handle: TranslationHandle =
            HandleConfig::new(config, TranslationParams { axis: GizmoAxis::X });

        let mesh = handle.pick_mesh();

        // A quarter turn around z maps the x shaft onto the y axis.
        for chunk in mesh.vertex_positions.chunks_exact(3) {
            assert!(chunk[1] > 0.0);
            assert!(chunk[0].abs() < 1.0);
        }
    }

    #[test]
    fn test_handle_ids_differ_per_axis() {
        let x = handle();
        let y: TranslationHandle =
            HandleConfig::new(ortho_config(), TranslationParams { axis: GizmoAxis::Y });

        assert_ne!(x.id(), y.id());
    }

    #[test]
    fn test_draw_produces_shaft_and_tip() {
        let config = PreparedViewportConfig::from_config(ViewportConfig {
            viewport: crate::math::Rect::from_min_size(
                Pos2::ZERO,
                crate::math::Vec2::new(800.0, 600.0),
            ),
            view_matrix: glam::DMat4::look_at_rh(
                DVec3::new(0.0, 3.0, 5.0),
                DVec3::ZERO,
                DVec3::Y,
            )
            .into(),
            projection_matrix: glam::DMat4::perspective_rh(1.0, 800.0 / 600.0, 0.1, 100.0).into(),
            ..Default::default()
        });
        let handle: TranslationHandle =
            HandleConfig::new(config, TranslationParams { axis: GizmoAxis::X });

        let draw_data = handle.draw();

        assert!(!draw_data.vertices.is_empty());
        assert_eq!(draw_data.vertices.len(), draw_data.colors.len());
    }
}
