//! Scene viewer demo
//!
//! Loads a scene description, runs a fixed number of frames on the headless
//! backend while sweeping the head pose across the scene, and reports gaze
//! events and frame statistics.
//!
//! ```text
//! scene_viewer [session.toml] [scene.ron]
//! ```

use std::thread;

use thiserror::Error;
use vr_scene::config::ConfigError;
use vr_scene::prelude::*;

const FRAME_COUNT: u64 = 240;
const STATS_INTERVAL: u64 = 60;
const TOGGLE_INTERVAL: u64 = 90;
const SWEEP_DEGREES: f32 = 50.0;
const SCREEN_SIZE: u32 = 64;
const SCREEN_REFRESH_FRAMES: u64 = 120;

#[derive(Error, Debug)]
enum ViewerError {
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scene is missing required object '{0}'")]
    MissingObject(String),

    #[error("Texture worker thread panicked")]
    WorkerPanicked,
}

/// Scene used when no description file is given
fn sample_scene() -> SceneDescription {
    let mut head = ObjectDescription::new("head");
    head.position = [0.0, 1.6, 0.0];
    head.camera = Some(Camera::perspective(100.0, 1.0, 0.05, 100.0));
    head.main_camera = true;

    let mut screen = ObjectDescription::new("screen");
    screen.position = [0.0, 1.6, -4.0];
    screen.mesh = Some("quad".to_string());
    screen.bounds = Some(BoundsDescription {
        min: [-1.6, -0.9, -0.05],
        max: [1.6, 0.9, 0.05],
    });

    let mut frame = ObjectDescription::new("frame");
    frame.mesh = Some("border".to_string());
    screen.children.push(frame);

    let mut panels = ObjectDescription::new("panels");
    panels.position = [3.0, 1.2, -3.0];
    panels.rotation = [0.0, -40.0, 0.0];
    for i in 0..3u8 {
        let mut panel = ObjectDescription::new(format!("panel_{}", i));
        panel.position = [0.0, f32::from(i) * 0.6, 0.0];
        panel.mesh = Some("quad".to_string());
        panel.opacity = 0.8;
        panels.children.push(panel);
    }

    let mut floor = ObjectDescription::new("floor");
    floor.mesh = Some("plane".to_string());
    floor.scale = [20.0, 1.0, 20.0];

    SceneDescription {
        objects: vec![head, screen, panels, floor],
        occlusion_enabled: true,
    }
}

/// RGBA8 checkerboard
fn checkerboard(size: u32, cell: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let light = ((x / cell) + (y / cell)) % 2 == 0;
            let value = if light { 230 } else { 40 };
            pixels.extend_from_slice(&[value, value, value, 255]);
        }
    }
    pixels
}

struct ViewerApp {
    session: Session,
    backend: HeadlessBackend,
    head: NodeId,
    screen: NodeId,
    panels: Option<NodeId>,
    gaze: LookStateDetector,
}

impl ViewerApp {
    fn new(config: SessionConfig, description: &SceneDescription) -> Result<Self, ViewerError> {
        let mut session = Session::new(config);
        let report = session.load_scene(description)?;
        for name in &report.failed_textures {
            log::warn!("Texture '{}' unavailable, rendering without it", name);
        }

        let find = |name: &str| {
            session
                .scene()
                .find_by_name(name)
                .ok_or_else(|| ViewerError::MissingObject(name.to_string()))
        };
        let head = find("head")?;
        let screen = find("screen")?;
        let panels = session.scene().find_by_name("panels");

        Ok(Self {
            session,
            backend: HeadlessBackend::new(),
            head,
            screen,
            panels,
            gaze: LookStateDetector::new(screen),
        })
    }

    /// Stream the screen's texture in from a worker, the way video frames would arrive
    fn start_screen_feed(&mut self) -> Result<(), ViewerError> {
        let screen = self.screen;
        let bare = self.session.create_bare_texture();
        let sender = self.session.task_sender();

        let worker = thread::spawn(move || {
            let pixels = checkerboard(SCREEN_SIZE, 8);
            sender.submit(move |scene, textures| {
                if let Err(e) = textures.update(bare, SCREEN_SIZE, SCREEN_SIZE, pixels) {
                    log::error!("Screen texture update failed: {}", e);
                    return;
                }
                let render_data = scene
                    .object(screen)
                    .ok()
                    .and_then(|object| object.render_data().cloned())
                    .unwrap_or_default()
                    .with_texture(bare);
                if let Err(e) = scene.set_render_data(screen, Some(render_data)) {
                    log::error!("Cannot attach screen texture: {}", e);
                }
            })?;

            let refreshed = checkerboard(SCREEN_SIZE, 4);
            sender.submit_after(SCREEN_REFRESH_FRAMES, move |_, textures| {
                if let Err(e) = textures.update(bare, SCREEN_SIZE, SCREEN_SIZE, refreshed) {
                    log::error!("Screen texture refresh failed: {}", e);
                }
            })
        });

        worker.join().map_err(|_| ViewerError::WorkerPanicked)??;
        Ok(())
    }

    fn head_pose(&self, frame: u64) -> Result<Transform, ViewerError> {
        let phase = (frame as f32 / FRAME_COUNT as f32) * std::f32::consts::TAU;
        let yaw = SWEEP_DEGREES * phase.sin();
        let position = self.session.scene().object(self.head).map_err(SessionError::from)?.transform().position;
        Ok(Transform::from_euler_degrees(position, Vec3::new(0.0, yaw, 0.0), Vec3::new(1.0, 1.0, 1.0)))
    }

    fn run(&mut self) -> Result<(), ViewerError> {
        self.session.recenter_pose();
        self.start_screen_feed()?;

        for frame in 0..FRAME_COUNT {
            let pose = self.head_pose(frame)?;
            self.session.scene_mut().set_transform(self.head, pose).map_err(SessionError::from)?;

            if frame > 0 && frame % TOGGLE_INTERVAL == 0 {
                if let Some(panels) = self.panels {
                    let scene = self.session.scene_mut();
                    let visible = scene.object(panels).map_err(SessionError::from)?.is_visible();
                    scene.set_visible(panels, !visible).map_err(SessionError::from)?;
                    log::info!("Frame {}: panels {}", frame, if visible { "hidden" } else { "shown" });
                }
            }

            let stats = self.session.render_frame(&mut self.backend)?;

            match self.gaze.update(self.session.scene()) {
                Some(LookEvent::Start) => {
                    log::info!("Frame {}: looking at screen", frame);
                    self.session.show_gaze_cursor();
                }
                Some(LookEvent::End) => {
                    log::info!("Frame {}: looked away from screen", frame);
                    self.session.hide_gaze_cursor();
                }
                Some(LookEvent::Looking) | None => {}
            }

            if stats.frame_index % STATS_INTERVAL == 0 || stats.tasks_run > 0 {
                log::info!(
                    "Frame {}: {} objects, {} shown, {} uploads, {} tasks, recull: {}",
                    stats.frame_index,
                    stats.objects,
                    stats.shown,
                    stats.textures_uploaded,
                    stats.tasks_run,
                    stats.recull
                );
            }
        }

        self.session.shutdown(&mut self.backend);
        log::info!(
            "Drew {} frames; {} GPU textures released",
            self.backend.frames_drawn(),
            self.backend.destroyed_textures().len()
        );
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);

    let config = match args.next() {
        Some(path) => SessionConfig::load_from_file(&path)?,
        None => SessionConfig::default(),
    };
    vr_scene::foundation::logging::init_with_config(&config.logging);
    log::info!("Starting scene viewer");

    let description = match args.next() {
        Some(path) => {
            log::info!("Loading scene description from {}", path);
            SceneDescription::load_from_file(&path)?
        }
        None => sample_scene(),
    };

    let mut app = ViewerApp::new(config, &description)?;
    match app.run() {
        Ok(()) => {
            log::info!("Scene viewer finished");
            Ok(())
        }
        Err(e) => {
            log::error!("Scene viewer failed: {}", e);
            Err(e.into())
        }
    }
}
