use std::f64::consts::TAU;
use std::ops::{Add, AddAssign};

use ecolor::{Color32, Rgba};
use epaint::{Mesh, TessellationOptions, Tessellator, TextureId};
pub(crate) use epaint::{PathStroke, Shape, Stroke};
use glam::{DMat4, DVec3};

use crate::math::{world_to_screen, Pos2, Rect};

const STEPS_PER_RAD: f64 = 20.0;

/// Tessellated overlay geometry for one frame, in viewport coordinates.
#[derive(Default, Clone, Debug)]
pub struct OverlayDrawData {
    /// Vertices in viewport space.
    pub vertices: Vec<[f32; 2]>,
    /// RGBA colors.
    pub colors: Vec<[f32; 4]>,
    /// Indices to the vertex data.
    pub indices: Vec<u32>,
}

impl From<Mesh> for OverlayDrawData {
    fn from(mesh: Mesh) -> Self {
        let (vertices, colors): (Vec<_>, Vec<_>) = mesh
            .vertices
            .iter()
            .map(|vertex| {
                (
                    [vertex.pos.x, vertex.pos.y],
                    Rgba::from(vertex.color).to_array(),
                )
            })
            .unzip();

        Self {
            vertices,
            colors,
            indices: mesh.indices,
        }
    }
}

impl AddAssign for OverlayDrawData {
    fn add_assign(&mut self, rhs: Self) {
        let index_offset = self.vertices.len() as u32;
        self.vertices.extend(rhs.vertices);
        self.colors.extend(rhs.colors);
        self.indices
            .extend(rhs.indices.into_iter().map(|idx| index_offset + idx));
    }
}

impl Add for OverlayDrawData {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

/// Projects shapes in model space through the given mvp and tessellates
/// them into overlay meshes.
pub(crate) struct ShapeBuilder {
    mvp: DMat4,
    viewport: Rect,
    pixels_per_point: f32,
}

impl ShapeBuilder {
    pub(crate) fn new(mvp: DMat4, viewport: Rect, pixels_per_point: f32) -> Self {
        Self {
            mvp,
            viewport,
            pixels_per_point,
        }
    }

    fn tessellate_shape(&self, shape: Shape) -> Mesh {
        let mut tessellator = Tessellator::new(
            self.pixels_per_point,
            TessellationOptions {
                feathering: true,
                ..Default::default()
            },
            Default::default(),
            Default::default(),
        );

        let mut mesh = Mesh::default();
        tessellator.tessellate_shape(shape, &mut mesh);

        mesh.texture_id = TextureId::default();
        mesh
    }

    fn arc_points(&self, radius: f64, start_angle: f64, end_angle: f64) -> Vec<Pos2> {
        let angle = f64::clamp(end_angle - start_angle, -TAU, TAU);

        let step_count = steps(angle);
        let mut points = Vec::with_capacity(step_count);

        let step_size = angle / (step_count - 1) as f64;

        for step in (0..step_count).map(|i| step_size * i as f64) {
            let x = f64::cos(start_angle + step) * radius;
            let z = f64::sin(start_angle + step) * radius;

            points.push(DVec3::new(x, 0.0, z));
        }

        points
            .into_iter()
            .filter_map(|point| self.vec3_to_pos2(point))
            .collect::<Vec<_>>()
    }

    pub(crate) fn arc(
        &self,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        stroke: impl Into<PathStroke>,
    ) -> Mesh {
        let mut points = self.arc_points(radius, start_angle, end_angle);

        let closed = points
            .first()
            .zip(points.last())
            .filter(|(first, last)| first.distance(**last) < 1e-2)
            .is_some();

        self.tessellate_shape(if closed {
            points.pop();
            Shape::closed_line(points, stroke.into())
        } else {
            Shape::line(points, stroke.into())
        })
    }

    pub(crate) fn circle(&self, radius: f64, stroke: impl Into<PathStroke>) -> Mesh {
        self.arc(radius, 0.0, TAU, stroke)
    }

    /// Filled dot of a fixed pixel radius at a world space position.
    pub(crate) fn dot(&self, pos: DVec3, radius: f32, color: Color32) -> Mesh {
        match self.vec3_to_pos2(pos) {
            Some(center) => self.tessellate_shape(Shape::circle_filled(center, radius, color)),
            None => Mesh::default(),
        }
    }

    pub(crate) fn line_segment(
        &self,
        from: DVec3,
        to: DVec3,
        stroke: impl Into<Stroke>,
    ) -> Mesh {
        let mut points: [Pos2; 2] = Default::default();

        for (i, point) in points.iter_mut().enumerate() {
            if let Some(pos) = world_to_screen(self.viewport, self.mvp, [from, to][i]) {
                *point = pos;
            } else {
                return Mesh::default();
            }
        }

        self.tessellate_shape(Shape::LineSegment {
            points,
            stroke: stroke.into(),
        })
    }

    pub(crate) fn arrow(&self, from: DVec3, to: DVec3, stroke: impl Into<Stroke>) -> Mesh {
        let stroke = stroke.into();
        let arrow_start = world_to_screen(self.viewport, self.mvp, from);
        let arrow_end = world_to_screen(self.viewport, self.mvp, to);

        self.tessellate_shape(if let Some((start, end)) = arrow_start.zip(arrow_end) {
            let cross = (end - start).normalized().rot90() * stroke.width / 2.0;

            Shape::convex_polygon(
                vec![start - cross, start + cross, end],
                stroke.color,
                PathStroke::NONE,
            )
        } else {
            Shape::Noop
        })
    }

    fn vec3_to_pos2(&self, vec: DVec3) -> Option<Pos2> {
        world_to_screen(self.viewport, self.mvp, vec)
    }
}

fn steps(angle: f64) -> usize {
    (STEPS_PER_RAD * angle.abs()).ceil().max(1.0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;

    fn builder() -> ShapeBuilder {
        let viewport = Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0));
        let view = DMat4::look_at_rh(DVec3::new(0.0, 3.0, 5.0), DVec3::ZERO, DVec3::Y);
        let proj = DMat4::perspective_rh(1.0, 800.0 / 600.0, 0.1, 100.0);
        ShapeBuilder::new(proj * view, viewport, 1.0)
    }

    #[test]
    fn test_circle_produces_closed_geometry() {
        let mesh = builder().circle(1.0, Stroke::new(2.0, Color32::WHITE));

        assert!(!mesh.vertices.is_empty());
        assert!(!mesh.indices.is_empty());
    }

    #[test]
    fn test_dot_is_placed_at_the_projected_position() {
        let mesh = builder().dot(DVec3::ZERO, 4.0, Color32::WHITE);

        assert!(!mesh.vertices.is_empty());
        // World origin projects to the viewport center.
        for vertex in &mesh.vertices {
            assert!((vertex.pos - Pos2::new(400.0, 300.0)).length() < 8.0);
        }
    }

    #[test]
    fn test_dot_behind_the_camera_is_empty() {
        let mesh = builder().dot(DVec3::new(0.0, 3.0, 6.0), 4.0, Color32::WHITE);

        assert!(mesh.vertices.is_empty());
    }

    #[test]
    fn test_draw_data_concatenation_offsets_indices() {
        let shapes = builder();
        let mut data = OverlayDrawData::from(shapes.circle(1.0, Stroke::new(2.0, Color32::WHITE)));
        let first_len = data.vertices.len() as u32;

        data += OverlayDrawData::from(shapes.line_segment(
            DVec3::ZERO,
            DVec3::X,
            Stroke::new(2.0, Color32::WHITE),
        ));

        assert!(data.indices.iter().any(|idx| *idx >= first_len));
        assert_eq!(data.vertices.len(), data.colors.len());
    }
}
