//! Skybox demo application
//!
//! Orbits a camera around a single crate in a headless scene with a skybox
//! attached, logging per-frame statistics.
//!
//! Usage: `skybox_demo [settings.toml|settings.ron]`

use std::rc::Rc;

use skybox_engine::config::{Config, ConfigError, EngineSettings};
use skybox_engine::foundation::logging;
use skybox_engine::foundation::math::{utils, Transform, Vec3};
use skybox_engine::plugin::{skybox_shader, SkyboxController, SkyboxOptions};
use skybox_engine::render::{
    Camera, CubeFace, Geometry, HeadlessBackend, Material, RenderError, SceneRenderer, TextureCube,
};
use skybox_engine::scene::{RenderableObject, Scene};

const FRAMES: u32 = 12;
const ORBIT_RADIUS: f32 = 6.0;

#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error("rendering: {0}")]
    Render(#[from] RenderError),

    #[error("settings: {0}")]
    Config(#[from] ConfigError),
}

fn load_settings() -> Result<EngineSettings, DemoError> {
    match std::env::args().nth(1) {
        Some(path) => {
            let settings = EngineSettings::load_from_file(&path)?;
            Ok(settings)
        }
        None => Ok(EngineSettings::default()),
    }
}

fn environment_map() -> Rc<TextureCube> {
    let mut texture = TextureCube::new("sky");
    for face in CubeFace::ALL {
        texture = texture.with_face(face, format!("assets/textures/sky/{}.jpg", face.short_name()));
    }
    texture.mark_ready();
    Rc::new(texture)
}

fn crate_object(backend: &mut HeadlessBackend) -> Result<RenderableObject, RenderError> {
    let shader = skybox_shader(backend)?;
    let mut geometry = Geometry::cube("crate", 0.5);
    geometry.upload(backend)?;
    let mut material = Material::new("crate", shader);
    material.create_resources(backend)?;
    Ok(RenderableObject::new("crate", geometry, material).with_transform(Transform::identity()))
}

fn run(settings: &EngineSettings) -> Result<(), DemoError> {
    let mut renderer = SceneRenderer::new(HeadlessBackend::new(), settings.renderer.clone());
    let scene = Rc::new(Scene::new("demo"));
    scene.add(crate_object(renderer.backend_mut())?);

    let mut skybox = SkyboxController::new(
        renderer.backend_mut(),
        SkyboxOptions::new()
            .with_scene(scene.clone())
            .with_environment_map(environment_map())
            .with_settings(settings.skybox.clone()),
    )?;

    let mut camera = Camera::perspective(Vec3::new(0.0, 2.0, ORBIT_RADIUS), 60.0, 16.0 / 9.0, 0.1, 100.0);
    for frame in 0..FRAMES {
        let angle = utils::deg_to_rad(360.0 * frame as f32 / FRAMES as f32);
        camera.set_position(Vec3::new(ORBIT_RADIUS * angle.sin(), 2.0, ORBIT_RADIUS * angle.cos()));
        camera.look_at(Vec3::zeros(), Vec3::y());

        let stats = renderer.render(&scene, &camera)?;
        log::info!(
            "frame {:>2}: skybox at {:?}, {} injected / {} scene draws, {} culled",
            stats.frame_index,
            skybox.position(),
            stats.injected_draws,
            stats.scene_draws,
            stats.culled_objects
        );
    }

    skybox.dispose(renderer.backend_mut());
    log::info!(
        "Recorded {} draws; {} geometry buffers still live",
        renderer.backend().draws().len(),
        renderer.backend().live_geometry_count()
    );
    Ok(())
}

fn main() {
    let settings = match load_settings() {
        Ok(settings) => settings,
        Err(err) => {
            logging::init_with_level(log::LevelFilter::Info);
            log::error!("Failed to load settings: {}", err);
            std::process::exit(1);
        }
    };
    logging::init_with_level(settings.level_filter());

    log::info!("Starting skybox demo...");
    if let Err(err) = run(&settings) {
        log::error!("Skybox demo failed: {}", err);
        std::process::exit(1);
    }
    log::info!("Skybox demo finished");
}
