//! VR session context
//!
//! A [`Session`] owns everything one rendering context needs: the current
//! scene, the texture table, the asset source and the head-mounted display
//! runtime. Nothing here is process-global, so several sessions (or tests)
//! can run side by side.
//!
//! ## Threading
//!
//! The scene and textures are only touched on the thread that calls
//! [`Session::render_frame`]. Other threads submit work through a
//! [`RenderTaskSender`]; queued tasks run at the start of the next frame, at
//! most `max_tasks_per_frame` at a time. Tasks submitted with a delay wait
//! the requested number of frames first.

use std::collections::{HashMap, VecDeque};
use crossbeam::channel::{unbounded, Receiver, Sender};
use thiserror::Error;

use crate::assets::{AssetError, AssetSource, FileAssetSource, ImageLoadError};
use crate::config::{ConfigError, SessionConfig};
use crate::foundation::collections::{NodeId, TextureHandle};
use crate::render::{FrameView, GraphicsBackend, RenderError, TextureError, TextureResource, TextureTable};
use crate::scene::{Scene, SceneDescription, SceneError};

/// Session-level errors
#[derive(Error, Debug)]
pub enum SessionError {
    /// Scene graph failure
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Texture failure
    #[error("Texture error: {0}")]
    Texture(#[from] TextureError),

    /// Backend failure while drawing
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Configuration failure
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Asset source failure
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// Image decoding failure
    #[error("Image error: {0}")]
    Image(#[from] ImageLoadError),

    /// The session that owned the task queue is gone
    #[error("Render task queue is closed")]
    TaskQueueClosed,

    /// The session was shut down
    #[error("Session has been shut down")]
    ShutDown,
}

/// Head-mounted display runtime
///
/// Calls are fire-and-forget requests; a runtime that cannot honor one just
/// ignores it.
pub trait HmdRuntime {
    /// Reset the head pose so the current orientation faces forward
    fn recenter_pose(&mut self);

    /// Show or hide the gaze cursor
    fn set_gaze_cursor_visible(&mut self, visible: bool);
}

/// Runtime for sessions without a headset; requests are only logged
#[derive(Debug, Default)]
pub struct NullHmdRuntime {
    gaze_cursor_visible: bool,
    recenter_count: u32,
}

impl NullHmdRuntime {
    /// Create a runtime with the gaze cursor hidden
    pub fn new() -> Self {
        Self::default()
    }

    /// Last requested gaze cursor state
    pub fn gaze_cursor_visible(&self) -> bool {
        self.gaze_cursor_visible
    }

    /// Number of recenter requests received
    pub fn recenter_count(&self) -> u32 {
        self.recenter_count
    }
}

impl HmdRuntime for NullHmdRuntime {
    fn recenter_pose(&mut self) {
        self.recenter_count += 1;
        log::info!("Recenter pose requested (no HMD attached)");
    }

    fn set_gaze_cursor_visible(&mut self, visible: bool) {
        self.gaze_cursor_visible = visible;
        log::info!("Gaze cursor {} (no HMD attached)", if visible { "shown" } else { "hidden" });
    }
}

/// Work item run on the render thread before a frame is drawn
pub type RenderTask = Box<dyn FnOnce(&mut Scene, &mut TextureTable) + Send>;

struct ScheduledTask {
    delay_frames: u64,
    task: RenderTask,
}

struct PendingTask {
    due_frame: u64,
    task: RenderTask,
}

/// Cloneable handle for queueing render tasks from any thread
#[derive(Debug, Clone)]
pub struct RenderTaskSender {
    sender: Sender<ScheduledTask>,
}

impl RenderTaskSender {
    /// Queue a task for the next frame
    pub fn submit<F>(&self, task: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut Scene, &mut TextureTable) + Send + 'static,
    {
        self.submit_after(0, task)
    }

    /// Queue a task to run `frames` frames after the session receives it
    ///
    /// A delay of zero is the same as [`submit`](Self::submit). Delayed tasks
    /// still count against the per-frame task budget once they are due.
    pub fn submit_after<F>(&self, frames: u64, task: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut Scene, &mut TextureTable) + Send + 'static,
    {
        self.sender
            .send(ScheduledTask {
                delay_frames: frames,
                task: Box::new(task),
            })
            .map_err(|_| SessionError::TaskQueueClosed)
    }
}

/// Statistics for one rendered frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Index of the frame just drawn
    pub frame_index: u64,
    /// Queued tasks run before drawing
    pub tasks_run: usize,
    /// Objects in the flattened list
    pub objects: usize,
    /// Objects that were shown
    pub shown: usize,
    /// GPU textures created this frame
    pub textures_created: usize,
    /// Texture uploads this frame
    pub textures_uploaded: usize,
    /// Texture creations or uploads the backend refused
    pub texture_failures: usize,
    /// Whether the frame recomputed culling state
    pub recull: bool,
}

/// Outcome of [`Session::load_scene`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Objects created
    pub objects: usize,
    /// Distinct textures decoded for this scene
    pub textures_loaded: usize,
    /// Texture assets that could not be loaded
    pub failed_textures: Vec<String>,
}

/// Explicit VR session context
pub struct Session {
    config: SessionConfig,
    scene: Scene,
    textures: TextureTable,
    textures_by_name: HashMap<String, TextureHandle>,
    assets: Box<dyn AssetSource>,
    hmd: Box<dyn HmdRuntime>,
    task_sender: Sender<ScheduledTask>,
    task_receiver: Receiver<ScheduledTask>,
    pending_tasks: VecDeque<PendingTask>,
    frame_index: u64,
    shut_down: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("objects", &self.scene.object_count())
            .field("textures", &self.textures.len())
            .field("pending_tasks", &self.pending_tasks.len())
            .field("frame_index", &self.frame_index)
            .field("shut_down", &self.shut_down)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session with an empty scene, file-backed assets and no HMD
    pub fn new(config: SessionConfig) -> Self {
        let assets = Box::new(FileAssetSource::from_config(&config.assets));
        let (task_sender, task_receiver) = unbounded();
        log::info!(
            "Session created (search paths: {:?}, max tasks per frame: {})",
            config.assets.search_paths,
            config.max_tasks_per_frame
        );
        Self {
            config,
            scene: Scene::new(),
            textures: TextureTable::new(),
            textures_by_name: HashMap::new(),
            assets,
            hmd: Box::new(NullHmdRuntime::new()),
            task_sender,
            task_receiver,
            pending_tasks: VecDeque::new(),
            frame_index: 0,
            shut_down: false,
        }
    }

    /// Replace the asset source
    pub fn with_asset_source(mut self, assets: impl AssetSource + 'static) -> Self {
        self.assets = Box::new(assets);
        self
    }

    /// Replace the HMD runtime
    pub fn with_hmd_runtime(mut self, hmd: impl HmdRuntime + 'static) -> Self {
        self.hmd = Box::new(hmd);
        self
    }

    /// Session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current scene
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Current scene, mutably
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Texture table
    pub fn textures(&self) -> &TextureTable {
        &self.textures
    }

    /// Texture table, mutably
    pub fn textures_mut(&mut self) -> &mut TextureTable {
        &mut self.textures
    }

    /// Handle for queueing work from other threads
    pub fn task_sender(&self) -> RenderTaskSender {
        RenderTaskSender {
            sender: self.task_sender.clone(),
        }
    }

    /// Number of frames drawn so far
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Whether [`shutdown`](Self::shutdown) has run
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Load a texture asset, sharing it with earlier loads of the same name
    pub fn load_texture(&mut self, name: &str) -> Result<TextureHandle, SessionError> {
        if let Some(&handle) = self.textures_by_name.get(name) {
            if self.textures.contains(handle) {
                return Ok(handle);
            }
            self.textures_by_name.remove(name);
        }

        let texture = TextureResource::load(
            self.assets.as_ref(),
            name,
            self.config.textures.default_sampling,
        )?;
        let handle = self.textures.insert(texture);
        self.textures_by_name.insert(name.to_string(), handle);
        Ok(handle)
    }

    /// Create a bare texture with the configured default sampling
    pub fn create_bare_texture(&mut self) -> TextureHandle {
        self.textures
            .insert(TextureResource::create_bare(self.config.textures.default_sampling))
    }

    /// Build a scene from a description and make it current
    ///
    /// Textures that fail to load are reported and left off their objects;
    /// the rest of the scene still loads. The previous scene is dropped.
    pub fn load_scene(&mut self, description: &SceneDescription) -> Result<LoadReport, SessionError> {
        let mut report = LoadReport::default();
        let textures_before = self.textures.len();

        let scene = description.build_scene(|name| match self.load_texture(name) {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("Texture '{}' failed to load, object will be untextured: {}", name, e);
                if !report.failed_textures.iter().any(|failed| failed == name) {
                    report.failed_textures.push(name.to_string());
                }
                None
            }
        })?;

        report.objects = scene.object_count();
        report.textures_loaded = self.textures.len() - textures_before;
        self.set_scene(scene);

        log::info!(
            "Loaded scene: {} objects, {} new textures, {} failed",
            report.objects,
            report.textures_loaded,
            report.failed_textures.len()
        );
        Ok(report)
    }

    /// Make `scene` current and return the previous one
    pub fn set_scene(&mut self, scene: Scene) -> Scene {
        let old = std::mem::replace(&mut self.scene, scene);
        self.scene.mark_dirty(crate::scene::DirtyFlags::all());
        log::info!(
            "Scene swapped ({} objects replaced by {})",
            old.object_count(),
            self.scene.object_count()
        );
        old
    }

    /// Ask the HMD runtime to recenter the head pose
    pub fn recenter_pose(&mut self) {
        self.hmd.recenter_pose();
    }

    /// Show the gaze cursor
    pub fn show_gaze_cursor(&mut self) {
        self.hmd.set_gaze_cursor_visible(true);
    }

    /// Hide the gaze cursor
    pub fn hide_gaze_cursor(&mut self) {
        self.hmd.set_gaze_cursor_visible(false);
    }

    /// Whether the main camera looks at `target` in the current scene
    pub fn is_looking_at(&self, target: NodeId) -> Result<bool, SessionError> {
        Ok(self.scene.is_looking_at(target)?)
    }

    /// Number of received tasks waiting for their frame or for budget
    pub fn pending_task_count(&self) -> usize {
        self.pending_tasks.len()
    }

    fn run_pending_tasks(&mut self) -> usize {
        for scheduled in self.task_receiver.try_iter() {
            self.pending_tasks.push_back(PendingTask {
                due_frame: self.frame_index.saturating_add(scheduled.delay_frames),
                task: scheduled.task,
            });
        }

        let budget = self.config.max_tasks_per_frame;
        let mut run = 0;
        let mut waiting = VecDeque::with_capacity(self.pending_tasks.len());
        while let Some(pending) = self.pending_tasks.pop_front() {
            if run < budget && pending.due_frame <= self.frame_index {
                (pending.task)(&mut self.scene, &mut self.textures);
                run += 1;
            } else {
                waiting.push_back(pending);
            }
        }
        self.pending_tasks = waiting;
        run
    }

    /// Run queued tasks, sync textures and draw one frame
    ///
    /// The dirty state is cleared only after the backend accepted the frame.
    pub fn render_frame(&mut self, backend: &mut dyn GraphicsBackend) -> Result<FrameStats, SessionError> {
        if self.shut_down {
            return Err(SessionError::ShutDown);
        }

        let tasks_run = self.run_pending_tasks();
        let sync = self.textures.sync(backend);
        let objects = self.scene.whole_scene_objects();
        let recull = self.scene.is_dirty();

        let view = FrameView {
            scene: &self.scene,
            textures: &self.textures,
            objects: &objects,
            main_camera: self.scene.main_camera(),
            view: self.scene.view_matrix(),
            projection: self.scene.projection_matrix(),
            dirty: self.scene.dirty_flags(),
            recull,
            frustum_active: self.scene.is_frustum_active(),
            occlusion_enabled: self.scene.is_occlusion_enabled(),
            frame_index: self.frame_index,
        };
        let shown = view.shown_objects().count();
        backend.draw_frame(&view)?;

        let stats = FrameStats {
            frame_index: self.frame_index,
            tasks_run,
            objects: objects.len(),
            shown,
            textures_created: sync.created,
            textures_uploaded: sync.uploaded,
            texture_failures: sync.failed,
            recull,
        };
        self.scene.clear_dirty();
        self.frame_index += 1;
        log::trace!("Frame stats: {:?}", stats);
        Ok(stats)
    }

    /// Release every GPU texture and drop all textures
    ///
    /// Safe to call more than once; later calls release nothing.
    pub fn shutdown(&mut self, backend: &mut dyn GraphicsBackend) {
        if self.shut_down {
            return;
        }
        self.textures.release_all(backend);
        self.textures_by_name.clear();
        if !self.pending_tasks.is_empty() {
            log::warn!("Dropping {} render tasks that never ran", self.pending_tasks.len());
            self.pending_tasks.clear();
        }
        self.shut_down = true;
        log::info!("Session shut down after {} frames", self.frame_index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::image_loader::test_support::{rgb_png, rgba_png};
    use crate::assets::MemoryAssetSource;
    use crate::render::HeadlessBackend;
    use crate::scene::{ObjectDescription, SceneObject};

    fn assets() -> MemoryAssetSource {
        MemoryAssetSource::new()
            .with_asset("red.png", rgba_png(2, 2, [255, 0, 0, 255].repeat(4)))
            .with_asset("opaque.png", rgb_png(2, 2))
    }

    fn textured(name: &str, texture: &str) -> ObjectDescription {
        let mut object = ObjectDescription::new(name);
        object.mesh = Some("quad".to_string());
        object.texture = Some(texture.to_string());
        object
    }

    #[test]
    fn test_textures_shared_by_name() {
        let mut session = Session::new(SessionConfig::default()).with_asset_source(assets());
        let a = session.load_texture("red.png").unwrap();
        let b = session.load_texture("red.png").unwrap();
        assert_eq!(a, b);
        assert_eq!(session.textures().len(), 1);
        assert!(matches!(
            session.load_texture("nope.png"),
            Err(SessionError::Texture(TextureError::DecodeFailure(ImageLoadError::AssetNotFound(_))))
        ));
        session.shutdown(&mut HeadlessBackend::new());
    }

    #[test]
    fn test_failed_texture_does_not_abort_scene_load() {
        let mut session = Session::new(SessionConfig::default()).with_asset_source(assets());
        let desc = SceneDescription {
            objects: vec![
                textured("good", "red.png"),
                textured("rgb", "opaque.png"),
                textured("missing", "missing.png"),
                textured("again", "red.png"),
            ],
            ..SceneDescription::default()
        };

        let report = session.load_scene(&desc).unwrap();
        assert_eq!(report.objects, 4);
        assert_eq!(report.textures_loaded, 1);
        assert_eq!(report.failed_textures, vec!["opaque.png".to_string(), "missing.png".to_string()]);

        let scene = session.scene();
        let rgb = scene.find_by_name("rgb").unwrap();
        assert_eq!(scene.object(rgb).unwrap().render_data().unwrap().texture, None);

        let mut backend = HeadlessBackend::new();
        let stats = session.render_frame(&mut backend).unwrap();
        assert_eq!(stats.objects, 4);
        assert_eq!(backend.last_frame().unwrap().textured_count, 2);
        session.shutdown(&mut backend);
    }

    #[test]
    fn test_task_budget_per_frame() {
        let config = SessionConfig::default().with_max_tasks_per_frame(2);
        let mut session = Session::new(config);
        let sender = session.task_sender();
        for i in 0..5 {
            sender
                .submit(move |scene, _| {
                    scene.add_object(SceneObject::new(format!("task{}", i))).unwrap();
                })
                .unwrap();
        }

        let mut backend = HeadlessBackend::new();
        let counts: Vec<usize> = (0..4)
            .map(|_| session.render_frame(&mut backend).unwrap().tasks_run)
            .collect();
        assert_eq!(counts, vec![2, 2, 1, 0]);
        assert_eq!(session.scene().object_count(), 5);
        session.shutdown(&mut backend);
    }

    #[test]
    fn test_recull_only_when_dirty() {
        let mut session = Session::new(SessionConfig::default());
        let mut backend = HeadlessBackend::new();

        assert!(session.render_frame(&mut backend).unwrap().recull);
        assert!(!session.render_frame(&mut backend).unwrap().recull);

        let id = session.scene_mut().add_object(SceneObject::new("late")).unwrap();
        let stats = session.render_frame(&mut backend).unwrap();
        assert!(stats.recull);
        assert_eq!(stats.shown, 1);

        session.scene_mut().set_visible(id, false).unwrap();
        let stats = session.render_frame(&mut backend).unwrap();
        assert!(stats.recull);
        assert_eq!(stats.shown, 0);
        assert_eq!(backend.frames_drawn(), 4);
    }

    #[test]
    fn test_set_scene_returns_previous() {
        let mut session = Session::new(SessionConfig::default());
        session.scene_mut().add_object(SceneObject::new("old")).unwrap();

        let old = session.set_scene(Scene::new());
        assert_eq!(old.object_count(), 1);
        assert_eq!(session.scene().object_count(), 0);
        assert!(session.scene().is_dirty());
    }

    #[test]
    fn test_ids_from_swapped_out_scene_fail_closed() {
        let mut session = Session::new(SessionConfig::default());
        let head = session.scene_mut().add_object(SceneObject::new("head")).unwrap();
        let mut detector = crate::scene::LookStateDetector::new(head);

        let mut fresh = Scene::new();
        fresh.add_object(SceneObject::new("unrelated")).unwrap();
        session.set_scene(fresh);

        assert_eq!(session.scene().object(head).err(), Some(SceneError::InvalidHandle(head)));
        assert!(matches!(session.is_looking_at(head), Err(SessionError::Scene(SceneError::InvalidHandle(_)))));
        assert_eq!(detector.update(session.scene()), None);

        let sender = session.task_sender();
        sender
            .submit(move |scene, _| {
                assert!(scene.set_visible(head, false).is_err());
            })
            .unwrap();
        let mut backend = HeadlessBackend::new();
        assert_eq!(session.render_frame(&mut backend).unwrap().shown, 1);
    }

    #[test]
    fn test_delayed_task_runs_on_its_frame() {
        let mut session = Session::new(SessionConfig::default());
        let sender = session.task_sender();
        sender
            .submit_after(2, |scene, _| {
                scene.add_object(SceneObject::new("late")).unwrap();
            })
            .unwrap();
        sender
            .submit(|scene, _| {
                scene.add_object(SceneObject::new("now")).unwrap();
            })
            .unwrap();

        let mut backend = HeadlessBackend::new();
        let first = session.render_frame(&mut backend).unwrap();
        assert_eq!(first.tasks_run, 1);
        assert_eq!(session.pending_task_count(), 1);
        assert_eq!(session.render_frame(&mut backend).unwrap().tasks_run, 0);

        let third = session.render_frame(&mut backend).unwrap();
        assert_eq!(third.frame_index, 2);
        assert_eq!(third.tasks_run, 1);
        assert_eq!(session.pending_task_count(), 0);
        assert!(session.scene().find_by_name("late").is_some());
    }

    #[test]
    fn test_due_delayed_tasks_share_the_budget() {
        let config = SessionConfig::default().with_max_tasks_per_frame(1);
        let mut session = Session::new(config);
        let sender = session.task_sender();
        for delay in [1, 1, 0] {
            sender.submit_after(delay, |_, _| {}).unwrap();
        }

        let mut backend = HeadlessBackend::new();
        let counts: Vec<usize> = (0..4)
            .map(|_| session.render_frame(&mut backend).unwrap().tasks_run)
            .collect();
        assert_eq!(counts, vec![1, 1, 1, 0]);
    }

    #[test]
    fn test_culling_toggle_forces_recull() {
        let mut session = Session::new(SessionConfig::default());
        let mut backend = HeadlessBackend::new();
        session.render_frame(&mut backend).unwrap();

        session.scene_mut().set_occlusion_enabled(true);
        let stats = session.render_frame(&mut backend).unwrap();
        assert!(stats.recull);
        assert!(backend.last_frame().unwrap().recull);

        session.scene_mut().set_occlusion_enabled(true);
        assert!(!session.render_frame(&mut backend).unwrap().recull);
    }

    #[test]
    fn test_refused_texture_create_still_draws() {
        let mut session = Session::new(SessionConfig::default()).with_asset_source(assets());
        session.load_scene(&SceneDescription {
            objects: vec![textured("good", "red.png")],
            ..SceneDescription::default()
        })
        .unwrap();

        let mut backend = HeadlessBackend::new();
        backend.set_fail_creates(true);
        let stats = session.render_frame(&mut backend).unwrap();
        assert_eq!(stats.texture_failures, 1);
        assert_eq!(stats.shown, 1);
        assert_eq!(backend.last_frame().unwrap().textured_count, 0);

        backend.set_fail_creates(false);
        let stats = session.render_frame(&mut backend).unwrap();
        assert_eq!((stats.textures_created, stats.textures_uploaded), (1, 1));
        session.shutdown(&mut backend);
        assert_eq!(backend.live_texture_count(), 0);
    }

    #[test]
    fn test_shutdown_releases_once_and_blocks_frames() {
        let mut session = Session::new(SessionConfig::default()).with_asset_source(assets());
        session.load_texture("red.png").unwrap();
        session.create_bare_texture();
        let mut backend = HeadlessBackend::new();
        session.render_frame(&mut backend).unwrap();
        assert_eq!(backend.live_texture_count(), 2);

        session.shutdown(&mut backend);
        session.shutdown(&mut backend);
        assert_eq!(backend.live_texture_count(), 0);
        assert_eq!(backend.destroyed_textures().len(), 2);
        assert_eq!(backend.invalid_release_count(), 0);
        assert!(matches!(session.render_frame(&mut backend), Err(SessionError::ShutDown)));
    }

    #[test]
    fn test_hmd_requests_are_forwarded() {
        #[derive(Default)]
        struct Recorder(std::rc::Rc<std::cell::RefCell<Vec<String>>>);
        impl HmdRuntime for Recorder {
            fn recenter_pose(&mut self) {
                self.0.borrow_mut().push("recenter".to_string());
            }
            fn set_gaze_cursor_visible(&mut self, visible: bool) {
                self.0.borrow_mut().push(format!("cursor:{}", visible));
            }
        }

        let log = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut session = Session::new(SessionConfig::default()).with_hmd_runtime(Recorder(log.clone()));
        session.recenter_pose();
        session.show_gaze_cursor();
        session.hide_gaze_cursor();

        assert_eq!(*log.borrow(), vec!["recenter", "cursor:true", "cursor:false"]);
    }
}
