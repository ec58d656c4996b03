//! Model loading and normalisation.
//!
//! Exercise models come in arbitrary units. After loading, a model is scaled
//! uniformly so its vertical extent matches the user's height (or a default),
//! lifted so its lowest point rests on the placement surface, and kept hidden
//! until placement.

use glam::{Quat, Vec3};

use super::animation::{AnimationClip, AnimationPlayer};
use super::ArError;

/// Model height used when the user has not set one, in metres.
pub const DEFAULT_MODEL_HEIGHT: f32 = 1.7;

/// Accepted range for a user-supplied height preference, in metres.
pub const MIN_USER_HEIGHT: f32 = 0.5;
pub const MAX_USER_HEIGHT: f32 = 3.0;

/// Axis-aligned bounding box in model units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

/// What an asset parser hands back: geometry bounds and animation clips.
#[derive(Debug, Clone)]
pub struct LoadedAsset {
    pub bounds: Aabb,
    pub clips: Vec<AnimationClip>,
}

/// Fetches and parses a 3D asset (e.g. a `.glb` file).
pub trait AssetSource {
    fn load(&mut self, url: &str) -> Result<LoadedAsset, ArError>;
}

/// The model's node in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneModel {
    pub visible: bool,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: f32,
    /// Height above the node origin that puts the model's feet at y = 0.
    pub floor_offset: f32,
}

/// A normalised model plus its animation player, if it has clips.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub model: SceneModel,
    pub player: Option<AnimationPlayer>,
}

#[derive(Debug, Clone)]
pub struct ModelLoader {
    default_height: f32,
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_HEIGHT)
    }
}

impl ModelLoader {
    pub fn new(default_height: f32) -> Self {
        Self { default_height }
    }

    /// Resolve the target height: a finite preference clamped to
    /// [`MIN_USER_HEIGHT`, `MAX_USER_HEIGHT`], otherwise the default.
    pub fn target_height(&self, preference: Option<f32>) -> f32 {
        match preference {
            Some(h) if h.is_finite() => h.clamp(MIN_USER_HEIGHT, MAX_USER_HEIGHT),
            _ => self.default_height,
        }
    }

    /// Normalise a parsed asset into a hidden, floor-aligned scene model.
    pub fn prepare(
        &self,
        url: &str,
        asset: LoadedAsset,
        height_preference: Option<f32>,
    ) -> Result<LoadedModel, ArError> {
        let height = asset.bounds.height();
        if !height.is_finite() || height <= f32::EPSILON {
            return Err(ArError::DegenerateBounds {
                url: url.to_string(),
            });
        }
        let scale = self.target_height(height_preference) / height;
        let floor_offset = -asset.bounds.min.y * scale;

        let model = SceneModel {
            visible: false,
            translation: Vec3::new(0.0, floor_offset, 0.0),
            rotation: Quat::IDENTITY,
            scale,
            floor_offset,
        };
        Ok(LoadedModel {
            model,
            player: AnimationPlayer::new(asset.clips),
        })
    }

    /// Normalise the outcome of fetching `url`.
    ///
    /// Failures are logged and yield `None`; the AR view carries on without
    /// a model and nothing is retried.
    pub fn complete(
        &self,
        url: &str,
        fetched: Result<LoadedAsset, ArError>,
        height_preference: Option<f32>,
    ) -> Option<LoadedModel> {
        match fetched.and_then(|asset| self.prepare(url, asset, height_preference)) {
            Ok(loaded) => {
                tracing::debug!(url, scale = loaded.model.scale, "Model loaded");
                Some(loaded)
            }
            Err(e) => {
                tracing::error!(url, error = %e, "Model load failed, continuing without a model");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    struct FixedSource(Result<LoadedAsset, ()>);

    impl AssetSource for FixedSource {
        fn load(&mut self, url: &str) -> Result<LoadedAsset, ArError> {
            self.0.clone().map_err(|()| ArError::AssetLoad {
                url: url.to_string(),
                reason: "404".into(),
            })
        }
    }

    fn asset(min_y: f32, max_y: f32, clips: usize) -> LoadedAsset {
        LoadedAsset {
            bounds: Aabb::new(Vec3::new(-0.5, min_y, -0.5), Vec3::new(0.5, max_y, 0.5)),
            clips: (0..clips)
                .map(|i| AnimationClip {
                    name: format!("clip{i}"),
                    duration_secs: 1.0,
                })
                .collect(),
        }
    }

    #[test]
    fn scales_to_default_height() {
        let loaded = ModelLoader::default()
            .prepare("/models/squat.glb", asset(0.0, 170.0, 0), None)
            .unwrap();
        assert!((loaded.model.scale - 0.01).abs() < 1e-6);
        assert!(!loaded.model.visible);
        assert!(loaded.player.is_none());
    }

    #[test]
    fn user_height_is_clamped() {
        let loader = ModelLoader::default();
        assert_eq!(loader.target_height(Some(1.85)), 1.85);
        assert_eq!(loader.target_height(Some(0.1)), MIN_USER_HEIGHT);
        assert_eq!(loader.target_height(Some(9.0)), MAX_USER_HEIGHT);
        assert_eq!(loader.target_height(Some(f32::NAN)), DEFAULT_MODEL_HEIGHT);
    }

    #[test]
    fn lifts_model_onto_floor() {
        let loaded = ModelLoader::default()
            .prepare("m.glb", asset(-1.0, 1.0, 2), Some(1.0))
            .unwrap();
        assert!((loaded.model.scale - 0.5).abs() < 1e-6);
        assert!((loaded.model.floor_offset - 0.5).abs() < 1e-6);
        assert_eq!(loaded.player.unwrap().clips().len(), 2);
    }

    #[test]
    fn flat_asset_rejected() {
        let err = ModelLoader::default()
            .prepare("flat.glb", asset(1.0, 1.0, 0), None)
            .unwrap_err();
        assert_matches!(err, ArError::DegenerateBounds { .. });
    }

    #[test]
    fn fetch_failure_yields_none() {
        let mut source = FixedSource(Err(()));
        let fetched = source.load("missing.glb");
        assert!(ModelLoader::default().complete("missing.glb", fetched, None).is_none());
    }

    #[test]
    fn degenerate_asset_yields_none() {
        let fetched = Ok(asset(0.0, 0.0, 0));
        assert!(ModelLoader::default().complete("flat.glb", fetched, None).is_none());
    }

    #[test]
    fn fetched_asset_is_prepared() {
        let mut source = FixedSource(Ok(asset(0.0, 2.0, 1)));
        let fetched = source.load("ok.glb");
        let loaded = ModelLoader::default().complete("ok.glb", fetched, None).unwrap();
        assert!((loaded.model.scale - 0.85).abs() < 1e-6);
    }
}
