//! The AR exercise view: one component for every exercise screen.
//!
//! Hosts drive an [`ArView`] with session lifecycle calls, a per-frame
//! callback, and pointer events, all from the same thread.

use glam::{Vec2, Vec3};

use super::interaction::{InteractionConfig, InteractionHandler, PointerId};
use super::loader::{
    AssetSource, LoadedAsset, LoadedModel, ModelLoader, SceneModel, DEFAULT_MODEL_HEIGHT,
};
use super::placement::{fallback_pose, PlacementController, PlacementMode, PlacementState};
use super::platform::{HitTestCapability, HitTestSourceHandle, XrPlatform};
use super::render_loop::{FrameSnapshot, RenderLoop, Renderer};
use super::surface::SurfaceDetector;
use super::{ArError, Pose, SessionId};

#[derive(Debug, Clone, PartialEq)]
pub struct ArViewConfig {
    pub placement_mode: PlacementMode,
    /// Where the model goes, in viewer space, when hit testing is unavailable.
    pub fallback_offset: Vec3,
    pub interaction: InteractionConfig,
    pub default_model_height: f32,
    /// The user's own height in metres, if they entered one.
    pub user_height: Option<f32>,
}

impl Default for ArViewConfig {
    fn default() -> Self {
        Self {
            placement_mode: PlacementMode::Automatic,
            fallback_offset: Vec3::new(0.0, 0.0, -1.5),
            interaction: InteractionConfig::default(),
            default_model_height: DEFAULT_MODEL_HEIGHT,
            user_height: None,
        }
    }
}

/// Identifies one model load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug)]
pub struct ArView {
    config: ArViewConfig,
    loader: ModelLoader,
    detector: SurfaceDetector,
    placement: PlacementController,
    interaction: InteractionHandler,
    render_loop: RenderLoop,
    model: Option<LoadedModel>,
    session: Option<SessionId>,
    capability: Option<HitTestCapability>,
    next_session: u64,
    pending_load: Option<(LoadTicket, String)>,
    next_load: u64,
}

impl ArView {
    pub fn new(config: ArViewConfig) -> Self {
        Self {
            loader: ModelLoader::new(config.default_model_height),
            detector: SurfaceDetector::new(),
            placement: PlacementController::new(config.placement_mode),
            interaction: InteractionHandler::new(config.interaction),
            render_loop: RenderLoop::new(),
            model: None,
            session: None,
            capability: None,
            next_session: 1,
            pending_load: None,
            next_load: 1,
            config,
        }
    }

    // -- Model loading -----------------------------------------------------

    /// Start loading `url`. Returns `None` while another load is in flight.
    pub fn begin_model_load(&mut self, url: &str) -> Option<LoadTicket> {
        if self.pending_load.is_some() {
            tracing::debug!(url, "Model load already in flight");
            return None;
        }
        let ticket = LoadTicket(self.next_load);
        self.next_load += 1;
        self.pending_load = Some((ticket, url.to_string()));
        Some(ticket)
    }

    /// Complete a load started with [`begin_model_load`](Self::begin_model_load).
    ///
    /// Results for a ticket that is no longer pending are dropped. A failed
    /// load is logged and leaves the view without a model.
    pub fn finish_model_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<LoadedAsset, ArError>,
    ) -> bool {
        let url = match self.pending_load.take() {
            Some((pending, url)) if pending == ticket => url,
            other => {
                self.pending_load = other;
                tracing::debug!(?ticket, "Dropping stale model load");
                return false;
            }
        };
        match self.loader.complete(&url, result, self.config.user_height) {
            Some(loaded) => {
                self.model = Some(loaded);
                true
            }
            None => false,
        }
    }

    /// Load synchronously through `source`.
    pub fn load_model(&mut self, source: &mut dyn AssetSource, url: &str) -> bool {
        match self.begin_model_load(url) {
            Some(ticket) => {
                let result = source.load(url);
                self.finish_model_load(ticket, result)
            }
            None => false,
        }
    }

    // -- Session lifecycle -------------------------------------------------

    /// Begin a new AR session. Any current session is ended first.
    pub fn start_session(&mut self, platform: &mut dyn XrPlatform) -> SessionId {
        if self.session.is_some() {
            self.end_session(platform);
        }
        let session = SessionId(self.next_session);
        self.next_session += 1;

        let capability = self.detector.start(session, platform);
        tracing::info!(session = session.0, ?capability, "AR session started");

        self.session = Some(session);
        self.capability = Some(capability);
        self.placement.reset();
        self.interaction.reset();
        self.render_loop.start();
        session
    }

    /// End the current session, releasing the hit-test source. The model
    /// stays loaded but hidden and unplaced.
    pub fn end_session(&mut self, platform: &mut dyn XrPlatform) {
        let Some(session) = self.session.take() else {
            return;
        };
        self.detector.stop(platform);
        self.placement.reset();
        self.interaction.reset();
        self.render_loop.stop();
        self.capability = None;
        if let Some(loaded) = self.model.as_mut() {
            loaded.model.visible = false;
        }
        tracing::info!(session = session.0, "AR session ended");
    }

    /// Hand over a hit-test source the runtime finished creating.
    pub fn on_hit_test_source_ready(
        &mut self,
        session: SessionId,
        source: HitTestSourceHandle,
        platform: &mut dyn XrPlatform,
    ) -> bool {
        self.detector.on_source_ready(session, source, platform)
    }

    /// Tear everything down when the page goes away.
    pub fn dispose(&mut self, platform: &mut dyn XrPlatform) {
        self.end_session(platform);
        self.pending_load = None;
        self.model = None;
    }

    // -- Frame -------------------------------------------------------------

    /// Per-frame callback. Returns `false` once the session has ended.
    pub fn on_frame(
        &mut self,
        timestamp_ms: f64,
        viewer: Pose,
        platform: &dyn XrPlatform,
        renderer: &mut dyn Renderer,
    ) -> bool {
        let Some(delta_secs) = self.render_loop.begin_frame(timestamp_ms) else {
            return false;
        };

        if let Some(player) = self.model.as_mut().and_then(|m| m.player.as_mut()) {
            player.advance(delta_secs);
        }

        if !self.placement.is_placed() {
            let candidate = if self.detector.is_unsupported() {
                Some(fallback_pose(viewer, self.config.fallback_offset))
            } else {
                self.detector.poll(platform)
            };
            let model_ready = self.model.is_some();
            if let Some(anchor) = self.placement.on_surface(candidate, model_ready) {
                self.show_model_at(anchor);
            }
        }

        renderer.draw(&FrameSnapshot {
            model: self.model.as_ref().map(|m| &m.model),
            reticle: self.placement.reticle(),
            delta_secs,
        });
        true
    }

    // -- Pointer input -----------------------------------------------------

    pub fn pointer_down(&mut self, id: PointerId, position: Vec2) {
        if self.session.is_none() {
            return;
        }
        if !self.placement.is_placed() {
            let model_ready = self.model.is_some();
            if let Some(anchor) = self.placement.on_pointer_down(model_ready) {
                self.show_model_at(anchor);
            }
        }
        if self.placement.is_placed() {
            self.interaction.pointer_down(id, position);
        }
    }

    pub fn pointer_move(&mut self, id: PointerId, position: Vec2) -> bool {
        let (Some(anchor), Some(loaded)) = (self.placement.anchor(), self.model.as_mut()) else {
            return false;
        };
        self.interaction
            .pointer_move(id, position, anchor, &mut loaded.model)
    }

    pub fn pointer_up(&mut self, id: PointerId) {
        self.interaction.pointer_up(id);
    }

    fn show_model_at(&mut self, anchor: Pose) {
        if let Some(loaded) = self.model.as_mut() {
            loaded.model.visible = true;
            self.interaction.apply(anchor, &mut loaded.model);
        }
    }

    // -- Accessors ---------------------------------------------------------

    pub fn placement_state(&self) -> PlacementState {
        self.placement.state()
    }

    pub fn model(&self) -> Option<&SceneModel> {
        self.model.as_ref().map(|m| &m.model)
    }

    pub fn loaded_model(&self) -> Option<&LoadedModel> {
        self.model.as_ref()
    }

    pub fn session(&self) -> Option<SessionId> {
        self.session
    }

    pub fn capability(&self) -> Option<HitTestCapability> {
        self.capability
    }

    pub fn reticle(&self) -> Option<Pose> {
        self.placement.reticle()
    }

    pub fn is_running(&self) -> bool {
        self.render_loop.is_running()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use glam::Quat;

    use super::super::animation::AnimationClip;
    use super::super::interaction::DragMapping;
    use super::super::loader::Aabb;
    use super::super::testing::{FakePlatform, RecordingRenderer};
    use super::*;

    fn squat_asset() -> LoadedAsset {
        LoadedAsset {
            bounds: Aabb::new(Vec3::new(-0.3, 0.0, -0.3), Vec3::new(0.3, 2.0, 0.3)),
            clips: vec![AnimationClip {
                name: "Sumo_high_pull".into(),
                duration_secs: 2.0,
            }],
        }
    }

    fn surface(z: f32) -> Pose {
        Pose::from_position(Vec3::new(0.0, 0.0, z))
    }

    fn viewer() -> Pose {
        Pose::new(Vec3::new(0.0, 1.6, 0.0), Quat::IDENTITY)
    }

    fn loaded_view(config: ArViewConfig) -> ArView {
        let mut view = ArView::new(config);
        let ticket = view.begin_model_load("/models/Sumo_high_pull.glb").unwrap();
        assert!(view.finish_model_load(ticket, Ok(squat_asset())));
        view
    }

    #[test]
    fn places_once_per_session_on_first_surface() {
        let mut platform = FakePlatform::supported();
        let mut renderer = RecordingRenderer::default();
        let mut view = loaded_view(ArViewConfig::default());

        let session = view.start_session(&mut platform);
        platform.results = vec![surface(-1.0), surface(-4.0)];

        // No source yet: nothing placed.
        view.on_frame(0.0, viewer(), &platform, &mut renderer);
        assert_eq!(view.placement_state(), PlacementState::Unplaced);
        assert!(!view.model().unwrap().visible);

        view.on_hit_test_source_ready(session, HitTestSourceHandle(1), &mut platform);
        view.on_frame(16.0, viewer(), &platform, &mut renderer);
        assert_eq!(view.placement_state(), PlacementState::Placed);
        let placed_at = view.model().unwrap().translation;
        assert_eq!(placed_at, Vec3::new(0.0, 0.0, -1.0));

        platform.results = vec![surface(-2.0)];
        for i in 2..10 {
            view.on_frame(16.0 * i as f64, viewer(), &platform, &mut renderer);
        }
        assert_eq!(view.model().unwrap().translation, placed_at);
        assert_eq!(renderer.frames.len(), 10);
        assert!(renderer.frames[1].0, "model visible from the placing frame on");
    }

    #[test]
    fn unsupported_platform_uses_fixed_offset() {
        let mut platform = FakePlatform::unsupported();
        let mut renderer = RecordingRenderer::default();
        let mut view = loaded_view(ArViewConfig::default());

        view.start_session(&mut platform);
        assert_eq!(view.capability(), Some(HitTestCapability::Unsupported));
        view.on_frame(0.0, viewer(), &platform, &mut renderer);

        assert_eq!(view.placement_state(), PlacementState::Placed);
        let model = view.model().unwrap();
        assert!((model.translation - Vec3::new(0.0, 0.0, -1.5)).length() < 1e-5);
    }

    #[test]
    fn manual_mode_places_on_tap_over_reticle() {
        let mut platform = FakePlatform::supported();
        let mut renderer = RecordingRenderer::default();
        let mut view = loaded_view(ArViewConfig {
            placement_mode: PlacementMode::ManualConfirm,
            ..ArViewConfig::default()
        });
        let session = view.start_session(&mut platform);
        view.on_hit_test_source_ready(session, HitTestSourceHandle(1), &mut platform);
        platform.results = vec![surface(-2.0)];

        view.on_frame(0.0, viewer(), &platform, &mut renderer);
        assert_eq!(view.reticle(), Some(surface(-2.0)));
        assert_eq!(renderer.frames[0], (false, Some(surface(-2.0))));

        view.pointer_down(1, Vec2::new(200.0, 300.0));
        assert_eq!(view.placement_state(), PlacementState::Placed);
        assert_eq!(view.reticle(), None);

        // The placing touch keeps going as a twist.
        assert!(view.pointer_move(1, Vec2::new(300.0, 300.0)));
        assert!(view.model().unwrap().rotation.angle_between(Quat::IDENTITY) > 0.4);
    }

    #[test]
    fn pointer_input_ignored_before_placement() {
        let mut platform = FakePlatform::supported();
        let mut view = loaded_view(ArViewConfig {
            interaction: InteractionConfig {
                single_drag: DragMapping::TranslateHorizontal,
                ..InteractionConfig::default()
            },
            ..ArViewConfig::default()
        });
        view.start_session(&mut platform);
        view.pointer_down(1, Vec2::ZERO);
        assert!(!view.pointer_move(1, Vec2::new(100.0, 0.0)));
        assert_eq!(view.model().unwrap().translation, Vec3::ZERO);
    }

    #[test]
    fn new_session_starts_clean() {
        let mut platform = FakePlatform::supported();
        let mut renderer = RecordingRenderer::default();
        let mut view = loaded_view(ArViewConfig::default());

        let first = view.start_session(&mut platform);
        view.on_hit_test_source_ready(first, HitTestSourceHandle(1), &mut platform);
        platform.results = vec![surface(-1.0)];
        view.on_frame(0.0, viewer(), &platform, &mut renderer);
        assert_eq!(view.placement_state(), PlacementState::Placed);

        view.end_session(&mut platform);
        assert!(!view.is_running());
        assert!(!view.model().unwrap().visible);
        assert_eq!(platform.cancelled, vec![HitTestSourceHandle(1)]);
        assert!(!view.on_frame(16.0, viewer(), &platform, &mut renderer));

        // A source for the ended session arriving late is released, not used.
        assert!(!view.on_hit_test_source_ready(first, HitTestSourceHandle(2), &mut platform));

        let second = view.start_session(&mut platform);
        assert_ne!(first, second);
        assert_eq!(view.placement_state(), PlacementState::Unplaced);
    }

    #[test]
    fn failed_load_leaves_view_without_model() {
        let mut platform = FakePlatform::unsupported();
        let mut renderer = RecordingRenderer::default();
        let mut view = ArView::new(ArViewConfig::default());
        let ticket = view.begin_model_load("/models/missing.glb").unwrap();
        let failed = view.finish_model_load(
            ticket,
            Err(ArError::AssetLoad {
                url: "/models/missing.glb".into(),
                reason: "404".into(),
            }),
        );
        assert!(!failed);

        view.start_session(&mut platform);
        assert!(view.on_frame(0.0, viewer(), &platform, &mut renderer));
        assert!(view.model().is_none());
        assert_eq!(view.placement_state(), PlacementState::Unplaced);
        assert_eq!(renderer.frames, vec![(false, Some(fallback_pose(viewer(), Vec3::new(0.0, 0.0, -1.5))))]);
    }

    #[test]
    fn only_one_load_in_flight() {
        let mut view = ArView::new(ArViewConfig::default());
        let first = view.begin_model_load("a.glb").unwrap();
        assert!(view.begin_model_load("b.glb").is_none());
        assert!(view.finish_model_load(first, Ok(squat_asset())));
        assert!(view.begin_model_load("b.glb").is_some());
    }

    #[test]
    fn stale_load_result_dropped() {
        let mut platform = FakePlatform::supported();
        let mut view = ArView::new(ArViewConfig::default());
        let ticket = view.begin_model_load("a.glb").unwrap();
        view.dispose(&mut platform);
        assert!(!view.finish_model_load(ticket, Ok(squat_asset())));
        assert!(view.model().is_none());
    }

    #[test]
    fn user_height_scales_model() {
        let view = loaded_view(ArViewConfig {
            user_height: Some(1.0),
            ..ArViewConfig::default()
        });
        assert!((view.model().unwrap().scale - 0.5).abs() < 1e-6);
    }

    #[test]
    fn animation_advances_with_frames() {
        let mut platform = FakePlatform::unsupported();
        let mut renderer = RecordingRenderer::default();
        let mut view = loaded_view(ArViewConfig::default());
        view.start_session(&mut platform);
        view.on_frame(1000.0, viewer(), &platform, &mut renderer);
        view.on_frame(1500.0, viewer(), &platform, &mut renderer);
        let player = view.loaded_model().unwrap().player.as_ref().unwrap();
        assert_matches!(player.time_of("Sumo_high_pull"), Some(t) if (t - 0.5).abs() < 1e-5);
    }
}
