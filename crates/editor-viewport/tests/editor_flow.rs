//! End-to-end exercises of the viewport against in-memory fakes of the
//! scene authority and the rendering backend.

use editor_viewport::prelude::*;

struct FakeAuthority {
    instances: Vec<RenderInstance>,
    dirty: bool,
    hit: Option<HitResult>,
    missing_meshes: Vec<String>,
    selected_paths: Vec<Vec<NodeId>>,
    deselects: usize,
}

impl FakeAuthority {
    fn new(instances: Vec<RenderInstance>) -> Self {
        Self {
            instances,
            dirty: false,
            hit: None,
            missing_meshes: Vec::new(),
            selected_paths: Vec::new(),
            deselects: 0,
        }
    }
}

impl SceneAuthority for FakeAuthority {
    fn scene_snapshot(&self) -> Vec<RenderInstance> {
        self.instances.clone()
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    fn mesh_data(&self, mesh_id: &MeshId) -> Option<MeshRecord> {
        if self.missing_meshes.contains(&mesh_id.0) {
            return None;
        }
        Some(MeshRecord {
            mesh_id: mesh_id.clone(),
            vertex_positions: vec![0.0; 9],
            face_indices: vec![0, 1, 2],
        })
    }

    fn raycast_closest_hit(
        &self,
        _origin: mint::Vector3<f64>,
        _direction: mint::Vector3<f64>,
    ) -> Option<HitResult> {
        self.hit.clone()
    }

    fn select_by_path(&mut self, path: &[NodeId]) {
        self.selected_paths.push(path.to_vec());
    }

    fn deselect(&mut self) {
        self.deselects += 1;
    }

    fn select_parent(&mut self) -> bool {
        false
    }

    fn object_count(&self) -> usize {
        self.instances.len()
    }

    fn update_transform(&mut self, id: InstanceId, transform: Transform) -> bool {
        let Some(instance) = self.instances.iter_mut().find(|i| i.id == id) else {
            return false;
        };
        instance.transform = transform;
        self.dirty = true;
        true
    }
}

/// Orthographic projection with 100 pixels per world unit, centered at
/// (400, 300) with screen y pointing down. Handle hovers hit the first
/// uploaded pick mesh whenever `hover` is set.
#[derive(Default)]
struct FakeRenderer {
    uploads: u64,
    resizes: Vec<(u32, u32)>,
    last_plan: Option<FramePlan>,
    hover: bool,
}

impl SceneRenderer for FakeRenderer {
    fn upload_mesh(&mut self, _record: &MeshRecord) -> MeshHandle {
        self.uploads += 1;
        MeshHandle(self.uploads)
    }

    fn free_mesh(&mut self, _handle: MeshHandle) {}

    fn project_world_to_screen(&self, point: mint::Vector3<f64>) -> Option<Pos2> {
        Some(Pos2::new(
            400.0 + point.x as f32 * 100.0,
            300.0 - point.y as f32 * 100.0,
        ))
    }

    fn intersect_ray_with_meshes(&self, _ray: Ray, meshes: &[MeshHandle]) -> Option<HandleHit> {
        if self.hover {
            meshes.first().map(|mesh| HandleHit {
                mesh: *mesh,
                distance: 1.0,
            })
        } else {
            None
        }
    }

    fn resize_targets(&mut self, width: u32, height: u32) {
        self.resizes.push((width, height));
    }

    fn render_frame(&mut self, plan: &FramePlan) {
        self.last_plan = Some(plan.clone());
    }
}

fn config() -> ViewportConfig {
    ViewportConfig {
        viewport: Rect::from_min_max(Pos2::ZERO, Pos2::new(800.0, 600.0)),
        ..Default::default()
    }
}

fn instance(id: u64, mesh: &str, selected: bool) -> RenderInstance {
    RenderInstance {
        id: InstanceId(id),
        mesh_id: MeshId(mesh.into()),
        transform: Transform::default(),
        is_selected: selected,
    }
}

fn idle() -> PointerInput {
    PointerInput::default()
}

fn pointer(x: f32, y: f32) -> PointerInput {
    PointerInput {
        position: Some(Pos2::new(x, y)),
        pressed: false,
        released: false,
    }
}

fn press(x: f32, y: f32) -> PointerInput {
    PointerInput {
        pressed: true,
        ..pointer(x, y)
    }
}

fn release(x: f32, y: f32) -> PointerInput {
    PointerInput {
        released: true,
        ..pointer(x, y)
    }
}

#[test]
fn test_selection_highlight_is_applied_once_and_removed_with_the_mirror() {
    let mut authority = FakeAuthority::new(vec![instance(1, "cube", false)]);
    let mut renderer = FakeRenderer::default();
    let mut viewport = Viewport::initialize(config(), &mut authority, &mut renderer).unwrap();

    viewport.frame(idle(), &mut authority, &mut renderer);
    let plan = renderer.last_plan.clone().unwrap();
    let base = plan.opaque_pass[0].material;
    assert!(plan.outline_targets.is_empty());

    // The authority selects the instance.
    authority.instances[0].is_selected = true;
    authority.dirty = true;
    viewport.frame(idle(), &mut authority, &mut renderer);
    let plan = renderer.last_plan.clone().unwrap();
    let highlighted = plan.opaque_pass[0].material;
    assert_ne!(highlighted, base);
    assert_eq!(plan.outline_targets, vec![InstanceId(1)]);

    // A redundant re-sync of the same selection must not compound.
    authority.dirty = true;
    viewport.frame(idle(), &mut authority, &mut renderer);
    let plan = renderer.last_plan.clone().unwrap();
    assert_eq!(plan.opaque_pass[0].material, highlighted);

    // Removing the instance removes its mirror and highlight.
    authority.instances.clear();
    authority.dirty = true;
    viewport.frame(idle(), &mut authority, &mut renderer);
    let plan = renderer.last_plan.clone().unwrap();
    assert_eq!(viewport.mirror_count(), 0);
    assert!(plan.opaque_pass.is_empty());
    assert!(plan.outline_targets.is_empty());
}

#[test]
fn test_deselection_restores_the_base_material() {
    let mut authority = FakeAuthority::new(vec![instance(1, "cube", false)]);
    let mut renderer = FakeRenderer::default();
    let mut viewport = Viewport::initialize(config(), &mut authority, &mut renderer).unwrap();

    viewport.frame(idle(), &mut authority, &mut renderer);
    let base = renderer.last_plan.clone().unwrap().opaque_pass[0].material;

    authority.instances[0].is_selected = true;
    authority.dirty = true;
    viewport.frame(idle(), &mut authority, &mut renderer);

    authority.instances[0].is_selected = false;
    authority.dirty = true;
    viewport.frame(idle(), &mut authority, &mut renderer);
    let plan = renderer.last_plan.clone().unwrap();

    assert_eq!(plan.opaque_pass[0].material, base);
    assert!(plan.outline_targets.is_empty());
}

#[test]
fn test_drag_on_the_gizmo_writes_back_and_never_picks() {
    let mut authority = FakeAuthority::new(vec![instance(1, "cube", true)]);
    let mut renderer = FakeRenderer {
        hover: true,
        ..Default::default()
    };
    let mut viewport = Viewport::initialize(config(), &mut authority, &mut renderer).unwrap();

    let outcome = viewport.frame(pointer(420.0, 300.0), &mut authority, &mut renderer);
    assert!(outcome.camera_input_blocked);

    viewport.frame(press(420.0, 300.0), &mut authority, &mut renderer);

    // The first hovered handle is the x translation shaft; 100 px of
    // pointer motion is one world unit in the fake projection.
    let outcome = viewport.frame(pointer(520.0, 300.0), &mut authority, &mut renderer);
    assert!(outcome.transform_written);
    assert!(outcome.camera_input_blocked);

    let translation = authority.instances[0].transform.translation;
    assert!((translation.x - 1.0).abs() < 1e-6);
    assert!(translation.y.abs() < 1e-6);
    assert!(translation.z.abs() < 1e-6);

    let outcome = viewport.frame(release(520.0, 300.0), &mut authority, &mut renderer);
    assert!(outcome.pick.is_none());
    assert!(authority.selected_paths.is_empty());
    assert_eq!(authority.deselects, 0);
}

#[test]
fn test_background_click_resolves_into_a_pick() {
    let mut authority = FakeAuthority::new(vec![instance(1, "cube", false)]);
    authority.hit = Some(HitResult {
        position: mint::Vector3 {
            x: 1.0,
            y: 2.0,
            z: 3.0,
        },
        object_id: InstanceId(1),
        selection_path: vec![NodeId(3), NodeId(9)],
    });
    let mut renderer = FakeRenderer::default();
    let mut viewport = Viewport::initialize(config(), &mut authority, &mut renderer).unwrap();

    viewport.frame(press(400.0, 300.0), &mut authority, &mut renderer);
    let outcome = viewport.frame(release(400.0, 300.0), &mut authority, &mut renderer);

    let hit = outcome.pick.unwrap();
    assert_eq!(hit.object_id, InstanceId(1));
    assert_eq!(authority.selected_paths, vec![vec![NodeId(3), NodeId(9)]]);
    assert_eq!(authority.deselects, 0);

    let marker = viewport.marker().unwrap();
    assert_eq!((marker.x, marker.y, marker.z), (1.0, 2.0, 3.0));
}

#[test]
fn test_short_gesture_picks_long_gesture_does_not() {
    let mut authority = FakeAuthority::new(vec![instance(1, "cube", false)]);
    let mut renderer = FakeRenderer::default();
    let mut viewport = Viewport::initialize(config(), &mut authority, &mut renderer).unwrap();

    // 4 px of travel stays a click; the miss deselects.
    viewport.frame(press(100.0, 100.0), &mut authority, &mut renderer);
    viewport.frame(pointer(104.0, 100.0), &mut authority, &mut renderer);
    viewport.frame(release(104.0, 100.0), &mut authority, &mut renderer);
    assert_eq!(authority.deselects, 1);

    // 6 px of travel commits to a camera drag and never picks.
    viewport.frame(press(200.0, 200.0), &mut authority, &mut renderer);
    viewport.frame(pointer(206.0, 200.0), &mut authority, &mut renderer);
    let outcome = viewport.frame(release(206.0, 200.0), &mut authority, &mut renderer);
    assert!(outcome.pick.is_none());
    assert_eq!(authority.deselects, 1);
}

#[test]
fn test_hit_on_an_unmirrored_instance_is_a_miss() {
    let mut authority = FakeAuthority::new(vec![instance(1, "cube", false)]);
    authority.hit = Some(HitResult {
        position: mint::Vector3 {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        },
        object_id: InstanceId(99),
        selection_path: vec![NodeId(99)],
    });
    let mut renderer = FakeRenderer::default();
    let mut viewport = Viewport::initialize(config(), &mut authority, &mut renderer).unwrap();

    viewport.frame(press(400.0, 300.0), &mut authority, &mut renderer);
    let outcome = viewport.frame(release(400.0, 300.0), &mut authority, &mut renderer);

    assert!(outcome.pick.is_none());
    assert!(authority.selected_paths.is_empty());
    assert_eq!(authority.deselects, 1);
    assert!(viewport.marker().is_none());
}

#[test]
fn test_failing_mesh_skips_its_instance_and_is_retried() {
    let mut authority =
        FakeAuthority::new(vec![instance(1, "cube", false), instance(2, "broken", false)]);
    authority.missing_meshes.push("broken".into());
    let mut renderer = FakeRenderer::default();
    let mut viewport = Viewport::initialize(config(), &mut authority, &mut renderer).unwrap();

    assert_eq!(viewport.mirror_count(), 1);

    // The mesh becomes available again; the next sync picks it up.
    authority.missing_meshes.clear();
    authority.dirty = true;
    viewport.frame(idle(), &mut authority, &mut renderer);

    assert_eq!(viewport.mirror_count(), 2);
}

#[test]
fn test_resize_requests_coalesce_across_frames() {
    let mut authority = FakeAuthority::new(Vec::new());
    let mut renderer = FakeRenderer::default();
    let mut viewport = Viewport::initialize(config(), &mut authority, &mut renderer).unwrap();

    viewport.resize(640, 480);
    viewport.resize(1920, 1080);
    viewport.frame(idle(), &mut authority, &mut renderer);
    viewport.frame(idle(), &mut authority, &mut renderer);

    assert_eq!(renderer.resizes, vec![(1920, 1080)]);
}
