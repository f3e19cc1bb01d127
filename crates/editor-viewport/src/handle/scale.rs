use glam::{DQuat, DVec3};

use crate::authority::MeshRecord;
use crate::config::GizmoAxis;
use crate::gizmo::DragSession;
use crate::handle::common::{
    axis_color, handle_color, overlay_builder, pick_mesh_id, screen_axis_scalar, shaft_pick_mesh,
};
use crate::handle::{HandleConfig, HandleControl, HandleKind};
use crate::math::{Pos2, Transform};
use crate::renderer::SceneRenderer;
use crate::shape::{OverlayDrawData, Stroke};

pub(crate) type ScaleHandle = HandleConfig<Scale>;

/// Scale factors are clamped away from zero so the anchor matrix stays
/// invertible.
const MIN_SCALE: f64 = 1e-4;

#[derive(Debug, Copy, Clone, Hash)]
pub(crate) struct ScaleParams {
    pub axis: GizmoAxis,
}

#[derive(Default, Debug, Copy, Clone)]
pub(crate) struct Scale;

impl HandleKind for Scale {
    type Params = ScaleParams;

    fn pick_mesh(handle: &ScaleHandle) -> MeshRecord {
        let config = &handle.config;
        let world_axis = config.rotation * handle.axis.unit();
        let tip = axis_component(config.scale, handle.axis);

        shaft_pick_mesh(
            pick_mesh_id(handle.id()),
            config.translation,
            config.translation + world_axis * tip,
            f64::from(config.focus_distance),
        )
    }

    /// The shaft covers one world unit per unit of scale, so the scalar
    /// position of the pointer along it is the scale factor itself. The
    /// grab point therefore reads back the current scale and the axis
    /// follows the pointer absolutely, without a zero reference. The
    /// other two axes keep their drag-start values.
    fn drag(
        handle: &ScaleHandle,
        session: &mut DragSession,
        pointer: Pos2,
        renderer: &dyn SceneRenderer,
    ) -> Option<Transform> {
        let start = session.start_transform;
        let start_rotation = DQuat::from(start.rotation);
        let anchor = DVec3::from(start.translation);
        let world_axis = start_rotation * handle.axis.unit();

        let scalar = screen_axis_scalar(renderer, anchor, world_axis, pointer)?;
        let factor = scalar.max(MIN_SCALE);

        let mut scale = DVec3::from(start.scale);
        match handle.axis {
            GizmoAxis::X => scale.x = factor,
            GizmoAxis::Y => scale.y = factor,
            GizmoAxis::Z => scale.z = factor,
        }

        Some(Transform {
            scale: scale.into(),
            ..start
        })
    }

    fn draw(handle: &ScaleHandle) -> OverlayDrawData {
        let config = &handle.config;
        let builder = overlay_builder(config);

        let color = handle_color(
            &config.visuals,
            handle.focused,
            axis_color(&config.visuals, handle.axis),
        );

        let axis = handle.axis.unit();
        let tip = axis * axis_component(config.scale, handle.axis);
        let marker_half = f64::from(config.scale_factor * config.visuals.stroke_width) * 1.25;

        let mut draw_data = OverlayDrawData::default();
        draw_data += builder
            .line_segment(
                DVec3::ZERO,
                tip,
                Stroke::new(config.visuals.stroke_width, color),
            )
            .into();
        draw_data += builder
            .line_segment(
                tip - axis * marker_half,
                tip + axis * marker_half,
                Stroke::new(config.visuals.stroke_width * 2.5, color),
            )
            .into();

        draw_data
    }
}

fn axis_component(scale: DVec3, axis: GizmoAxis) -> f64 {
    match axis {
        GizmoAxis::X => scale.x,
        GizmoAxis::Y => scale.y,
        GizmoAxis::Z => scale.z,
    }
}
