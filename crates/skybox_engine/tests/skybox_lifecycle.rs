//! Skybox attach/detach lifecycle and per-frame behaviour through a full
//! headless frame loop.

use std::rc::Rc;
use std::sync::Arc;

use approx::assert_relative_eq;
use skybox_engine::config::{Config, ConfigFormat, EngineSettings, SceneRendererConfig};
use skybox_engine::foundation::math::{Transform, Vec3};
use skybox_engine::plugin::{skybox_shader, SkyboxController, SkyboxOptions};
use skybox_engine::render::{
    Camera, DrawPass, Geometry, HeadlessBackend, HeadlessRenderer, Material, RenderBackend, RenderError,
    RenderState, SceneRenderer, TextureCube,
};
use skybox_engine::scene::{RenderableObject, Scene};

fn listeners(scene: &Scene) -> usize {
    scene.before_render_event().listener_count()
}

fn camera_at(position: Vec3) -> Camera {
    let mut camera = Camera::default();
    camera.set_position(position);
    camera
}

fn scene_object(backend: &mut dyn RenderBackend, name: &str, position: Vec3) -> RenderableObject {
    let shader = skybox_shader(backend).unwrap();
    let mut geometry = Geometry::cube(name, 0.5);
    geometry.upload(backend).unwrap();
    let mut material = Material::new(name, Arc::clone(&shader));
    material.create_resources(backend).unwrap();
    RenderableObject::new(name, geometry, material).with_transform(Transform::from_position(position))
}

#[test]
fn test_attach_switch_and_three_frames() {
    let mut renderer = HeadlessRenderer::headless();
    let s0 = Rc::new(Scene::new("s0"));
    let s1 = Rc::new(Scene::new("s1"));
    let t0 = Rc::new(TextureCube::new("t0"));

    let mut skybox = SkyboxController::new(
        renderer.backend_mut(),
        SkyboxOptions::new()
            .with_scene(s0.clone())
            .with_environment_map(Rc::clone(&t0)),
    )
    .unwrap();

    assert_eq!(listeners(&s0), 1);
    assert!(Rc::ptr_eq(&skybox.environment_map().unwrap(), &t0));

    skybox.attach_scene(s1.clone()).unwrap();
    assert_eq!(listeners(&s0), 0);
    assert_eq!(listeners(&s1), 1);
    assert!(skybox.is_attached_to(&*s1));
    assert!(!skybox.is_attached_to(&*s0));

    for position in [Vec3::zeros(), Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 2.0, 3.0)] {
        renderer.render(&s1, &camera_at(position)).unwrap();
    }

    assert_relative_eq!(skybox.position(), Vec3::new(1.0, 2.0, 3.0));
    let skybox_draws: Vec<_> = renderer
        .backend()
        .draws()
        .iter()
        .filter(|draw| draw.label == "skybox")
        .collect();
    assert_eq!(skybox_draws.len(), 3);
    assert!(skybox_draws.iter().all(|draw| draw.pass == DrawPass::Injected));
    assert_eq!(skybox.injection_count(), 3);

    skybox.dispose(renderer.backend_mut());
}

#[test]
fn test_only_latest_scene_triggers_draws() {
    let mut renderer = HeadlessRenderer::headless();
    let a = Rc::new(Scene::new("a"));
    let b = Rc::new(Scene::new("b"));
    let mut skybox =
        SkyboxController::new(renderer.backend_mut(), SkyboxOptions::new().with_scene(a.clone())).unwrap();
    skybox.attach_scene(b.clone()).unwrap();

    let stats_a = renderer.render(&a, &Camera::default()).unwrap();
    assert_eq!(stats_a.listeners_notified, 0);
    assert_eq!(stats_a.injected_draws, 0);

    let stats_b = renderer.render(&b, &Camera::default()).unwrap();
    assert_eq!(stats_b.listeners_notified, 1);
    assert_eq!(stats_b.injected_draws, 1);
    assert_eq!(skybox.injection_count(), 1);

    skybox.dispose(renderer.backend_mut());
}

#[test]
fn test_detach_is_idempotent() {
    let mut backend = HeadlessBackend::new();
    let scene = Rc::new(Scene::new("main"));

    let mut never_attached = SkyboxController::new(&mut backend, SkyboxOptions::new()).unwrap();
    assert!(!never_attached.detach_scene());
    assert!(!never_attached.detach_scene());

    let mut skybox = SkyboxController::new(&mut backend, SkyboxOptions::new().with_scene(scene.clone())).unwrap();
    assert!(skybox.detach_scene());
    assert!(!skybox.detach_scene());
    assert!(!skybox.is_attached());
    assert_eq!(listeners(&scene), 0);

    never_attached.dispose(&mut backend);
    skybox.dispose(&mut backend);
}

#[test]
fn test_position_follows_camera_every_frame() {
    let mut renderer = HeadlessRenderer::headless();
    let scene = Rc::new(Scene::new("main"));
    let mut skybox =
        SkyboxController::new(renderer.backend_mut(), SkyboxOptions::new().with_scene(scene.clone())).unwrap();

    let path = [
        Vec3::new(0.0, 3.0, 3.0),
        Vec3::new(-10.0, 0.5, 2.0),
        Vec3::new(250.0, -40.0, 8.0),
    ];
    for position in path {
        let camera = camera_at(position);
        renderer.render(&scene, &camera).unwrap();
        assert_relative_eq!(skybox.position(), camera.world_position());

        let draw = renderer.backend().draws().last().unwrap();
        assert_relative_eq!(draw.world, Transform::from_position(position).to_matrix());
    }

    skybox.dispose(renderer.backend_mut());
}

#[test]
fn test_skybox_draw_precedes_scene_draws() {
    let mut renderer = HeadlessRenderer::headless();
    let scene = Rc::new(Scene::new("main"));
    for (i, z) in [-4.0, -6.0, -8.0].into_iter().enumerate() {
        let object = scene_object(renderer.backend_mut(), &format!("rock{i}"), Vec3::new(0.0, 0.0, z));
        scene.add(object);
    }
    let mut skybox =
        SkyboxController::new(renderer.backend_mut(), SkyboxOptions::new().with_scene(scene.clone())).unwrap();

    let mut camera = camera_at(Vec3::zeros());
    camera.look_at(Vec3::new(0.0, 0.0, -1.0), Vec3::y());
    for _ in 0..2 {
        renderer.render(&scene, &camera).unwrap();
    }

    let draws = renderer.backend().draws();
    for frame in 1..=2 {
        let frame_draws: Vec<_> = draws.iter().filter(|draw| draw.frame == frame).collect();
        let sky = frame_draws.iter().find(|draw| draw.label == "skybox").unwrap();
        let scene_draws: Vec<_> = frame_draws.iter().filter(|draw| draw.pass == DrawPass::Scene).collect();

        assert_eq!(scene_draws.len(), 3);
        assert!(scene_draws.iter().all(|draw| sky.sequence < draw.sequence));
        assert!(!sky.render_state.contains(RenderState::DEPTH_WRITE));
    }

    skybox.dispose(renderer.backend_mut());
}

#[test]
fn test_skybox_drawn_for_any_camera_orientation() {
    let mut renderer = HeadlessRenderer::headless();
    let scene = Rc::new(Scene::new("main"));
    // A regular object behind the first camera, to show culling is active
    scene.add(scene_object(renderer.backend_mut(), "behind", Vec3::new(0.0, 0.0, 50.0)));
    let mut skybox =
        SkyboxController::new(renderer.backend_mut(), SkyboxOptions::new().with_scene(scene.clone())).unwrap();

    let targets = [
        Vec3::new(0.0, 0.0, -1.0),
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, -1.0, 0.001),
    ];
    let mut culled = 0;
    for target in targets {
        let mut camera = camera_at(Vec3::new(5.0, 5.0, 5.0));
        camera.look_at(Vec3::new(5.0, 5.0, 5.0) + target, Vec3::y());
        let stats = renderer.render(&scene, &camera).unwrap();
        assert_eq!(stats.injected_draws, 1);
        culled += stats.culled_objects;
    }

    assert_eq!(skybox.injection_count(), 4);
    assert!(culled > 0);
    skybox.dispose(renderer.backend_mut());
}

#[test]
fn test_object_limit_never_drops_skybox() {
    let config = SceneRendererConfig {
        max_objects_per_frame: 0,
        ..SceneRendererConfig::default()
    };
    let mut renderer = SceneRenderer::new(HeadlessBackend::new(), config);
    let scene = Rc::new(Scene::new("main"));
    scene.add(scene_object(renderer.backend_mut(), "rock", Vec3::new(0.0, 0.0, -5.0)));
    let mut skybox =
        SkyboxController::new(renderer.backend_mut(), SkyboxOptions::new().with_scene(scene.clone())).unwrap();

    let stats = renderer.render(&scene, &Camera::default()).unwrap();

    assert_eq!(stats.injected_draws, 1);
    assert_eq!(stats.scene_draws, 0);
    let draws = renderer.backend().draws();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].pass, DrawPass::Injected);
    assert_eq!(draws[0].label, "skybox");
    assert_eq!(skybox.injection_count(), draws.len() as u64);

    skybox.dispose(renderer.backend_mut());
}

#[test]
fn test_allocation_failure_propagates_from_construction() {
    let mut warm = HeadlessBackend::new();
    // Make sure the shared program exists so the failure comes from buffers
    skybox_shader(&mut warm).unwrap();

    let mut backend = HeadlessBackend::new();
    backend.set_fail_allocations(true);
    let result = SkyboxController::new(&mut backend, SkyboxOptions::new());

    assert!(matches!(result, Err(RenderError::ResourceCreationFailed(_))));
    assert_eq!(backend.live_geometry_count(), 0);
    assert_eq!(backend.live_material_count(), 0);
}

#[test]
fn test_dispose_releases_resources_once() {
    let mut backend = HeadlessBackend::new();
    let scene = Rc::new(Scene::new("main"));
    let mut skybox = SkyboxController::new(&mut backend, SkyboxOptions::new().with_scene(scene.clone())).unwrap();
    let geometry = skybox.renderable().geometry.gpu_handle().unwrap();
    let material = skybox.renderable().material.gpu_handle().unwrap();

    skybox.dispose(&mut backend);
    assert!(!backend.is_geometry_live(geometry));
    assert!(!backend.is_material_live(material));
    assert_eq!(listeners(&scene), 0);

    skybox.dispose(&mut backend);
    assert!(skybox.is_disposed());
}

#[test]
fn test_settings_file_drives_skybox() {
    let settings = EngineSettings::from_str_with_format(
        r#"
        log_level = "debug"

        [skybox]
        half_extent = 500.0
        "#,
        ConfigFormat::Toml,
    )
    .unwrap();

    let mut backend = HeadlessBackend::new();
    let mut skybox =
        SkyboxController::new(&mut backend, SkyboxOptions::new().with_settings(settings.skybox.clone())).unwrap();

    assert_relative_eq!(skybox.renderable().geometry.bounds().max, Vec3::repeat(500.0));
    assert_eq!(skybox.settings().environment_map_parameter, "environmentMap");
    skybox.dispose(&mut backend);
}
