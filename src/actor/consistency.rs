//! Animation/frame consistency rules
//!
//! Pure derivations re-evaluated after every edit to the component lists or
//! animation settings. The store applies `normalize_frames` to each new
//! snapshot; the cost estimators feed the budget numbers in the editor
//! status displays.

use super::component::{ColliderComponent, ColliderShape};
use super::definition::ActorDefinition;

/// Engine bound on authored frame counts
pub const MAX_FRAMES: u32 = 256;

/// Tile budget above which an actor is flagged heavy
pub const TILES_HEAVY_ABOVE: f32 = 1200.0;
/// Tile budget above which an actor is flagged medium
pub const TILES_MEDIUM_ABOVE: f32 = 600.0;

/// Largest primary-file count across the actor's sprites
pub fn most_files_on_sprite(actor: &ActorDefinition) -> u32 {
    actor
        .components
        .sprites
        .iter()
        .map(|sprite| sprite.files.len())
        .max()
        .unwrap_or(0) as u32
}

/// Whether the actor animates via one source file per frame
pub fn is_multi_file_animation(actor: &ActorDefinition) -> bool {
    most_files_on_sprite(actor) > 1
}

/// Re-derive `animations.total_frames` for a new snapshot
///
/// No animation components force a single frame. Multi-file animations are
/// frame-count-driven by the file count, overriding any authored value.
/// Otherwise the authored value stands, bounded to `[1, MAX_FRAMES]`.
pub fn normalize_frames(actor: &mut ActorDefinition) {
    if actor.components.animations.is_empty() {
        actor.animations.total_frames = 1;
        return;
    }
    let most_files = most_files_on_sprite(actor);
    if most_files > 1 {
        actor.animations.total_frames = most_files;
    } else {
        actor.animations.total_frames = actor.animations.total_frames.clamp(1, MAX_FRAMES);
    }
}

/// Aggregate tile-memory estimate across all baked sprite artifacts
///
/// Per image: a known largest-frame count is exact; otherwise the raw tile
/// count is averaged over the frame count - except for multiframe actors,
/// which keep every frame's tiles resident and pay the full count.
pub fn tile_count(actor: &ActorDefinition) -> f32 {
    let frames = actor.animations.total_frames.max(1) as f32;
    let mut total = 0.0;
    for sprite in &actor.components.sprites {
        let Some(cache) = &sprite.image_cache else {
            continue;
        };
        for image in &cache.images {
            let largest = image.animation.as_ref().and_then(|meta| meta.largest_frame);
            if let Some(largest) = largest {
                total += largest as f32;
            } else if actor.animations.multiframe {
                total += image.tiles.count as f32;
            } else {
                total += image.tiles.count as f32 / frames;
            }
        }
    }
    total
}

/// Coarse cost score of a collider configuration
pub fn collider_heaviness(collider: &ColliderComponent) -> u32 {
    let shape_cost = match collider.shape {
        ColliderShape::Ball => 1,
        ColliderShape::LineField => 2,
        ColliderShape::Box | ColliderShape::InverseBox => 3,
    };
    let check_cost = if collider.check_for_collisions { 2 } else { 0 };
    shape_cost + check_cost
}

/// Three-band cost classification shown next to budget numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightBand {
    Light,
    Medium,
    Heavy,
}

impl WeightBand {
    pub fn label(&self) -> &'static str {
        match self {
            WeightBand::Light => "light",
            WeightBand::Medium => "medium",
            WeightBand::Heavy => "heavy",
        }
    }

    /// Classify a cost number against a pair of exclusive lower bounds
    pub fn classify(value: f32, medium_above: f32, heavy_above: f32) -> WeightBand {
        if value > heavy_above {
            WeightBand::Heavy
        } else if value > medium_above {
            WeightBand::Medium
        } else {
            WeightBand::Light
        }
    }
}

/// Band for a collider heaviness score
pub fn heaviness_band(heaviness: u32) -> WeightBand {
    WeightBand::classify(heaviness as f32, 2.0, 4.0)
}

/// Band for the aggregate tile budget
pub fn tile_count_band(tiles: f32) -> WeightBand {
    WeightBand::classify(tiles, TILES_MEDIUM_ABOVE, TILES_HEAVY_ABOVE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::component::{
        AnimationComponent, AnimationMeta, BakedImage, SpriteComponent, SpriteImageData, TileSet,
    };

    fn sprite_with_files(count: usize) -> SpriteComponent {
        SpriteComponent {
            files: (0..count).map(|i| format!("frame{i}.png")).collect(),
            ..SpriteComponent::default()
        }
    }

    fn artifact_with_raw_count(count: u32) -> SpriteImageData {
        SpriteImageData {
            images: vec![BakedImage {
                name: "test".to_string(),
                tiles: TileSet {
                    count,
                    data: String::new(),
                    frame_offsets: None,
                },
                maps: Vec::new(),
                animation: None,
            }],
        }
    }

    #[test]
    fn test_frame_count_follows_file_count() {
        let mut actor = ActorDefinition::default();
        actor.components.sprites.push(sprite_with_files(5));
        actor.components.animations.push(AnimationComponent::default());
        actor.animations.total_frames = 12;

        normalize_frames(&mut actor);

        assert_eq!(actor.animations.total_frames, 5);
        assert!(is_multi_file_animation(&actor));
    }

    #[test]
    fn test_no_animations_collapse_to_one_frame() {
        let mut actor = ActorDefinition::default();
        actor.components.sprites.push(sprite_with_files(5));
        actor.animations.total_frames = 7;

        normalize_frames(&mut actor);

        assert_eq!(actor.animations.total_frames, 1);
    }

    #[test]
    fn test_authored_frames_survive_single_file_animation() {
        let mut actor = ActorDefinition::default();
        actor.components.sprites.push(sprite_with_files(1));
        actor.components.animations.push(AnimationComponent::default());
        actor.animations.total_frames = 7;

        normalize_frames(&mut actor);
        assert_eq!(actor.animations.total_frames, 7);

        actor.animations.total_frames = 100_000;
        normalize_frames(&mut actor);
        assert_eq!(actor.animations.total_frames, MAX_FRAMES);

        actor.animations.total_frames = 0;
        normalize_frames(&mut actor);
        assert_eq!(actor.animations.total_frames, 1);
    }

    #[test]
    fn test_tile_count_divides_by_frames() {
        let mut actor = ActorDefinition::default();
        for _ in 0..2 {
            let mut sprite = SpriteComponent::default();
            sprite.image_cache = Some(artifact_with_raw_count(120));
            actor.components.sprites.push(sprite);
        }
        actor.animations.total_frames = 4;

        assert_eq!(tile_count(&actor), 60.0);

        actor.animations.multiframe = true;
        assert_eq!(tile_count(&actor), 240.0);
    }

    #[test]
    fn test_tile_count_prefers_largest_frame() {
        let mut actor = ActorDefinition::default();
        let mut artifact = artifact_with_raw_count(120);
        artifact.images[0].animation = Some(AnimationMeta {
            largest_frame: Some(42),
        });
        let mut sprite = SpriteComponent::default();
        sprite.image_cache = Some(artifact);
        actor.components.sprites.push(sprite);
        actor.animations.total_frames = 4;

        assert_eq!(tile_count(&actor), 42.0);
    }

    #[test]
    fn test_heaviness_banding() {
        let boxy = ColliderComponent {
            shape: ColliderShape::Box,
            check_for_collisions: true,
            ..ColliderComponent::default()
        };
        assert_eq!(collider_heaviness(&boxy), 5);
        assert_eq!(heaviness_band(5), WeightBand::Heavy);

        let ball = ColliderComponent::default();
        assert_eq!(collider_heaviness(&ball), 1);
        assert_eq!(heaviness_band(1), WeightBand::Light);

        let line = ColliderComponent {
            shape: ColliderShape::LineField,
            check_for_collisions: true,
            ..ColliderComponent::default()
        };
        assert_eq!(collider_heaviness(&line), 4);
        assert_eq!(heaviness_band(4), WeightBand::Medium);
    }

    #[test]
    fn test_tile_band_thresholds() {
        assert_eq!(tile_count_band(600.0), WeightBand::Light);
        assert_eq!(tile_count_band(600.5), WeightBand::Medium);
        assert_eq!(tile_count_band(1200.0), WeightBand::Medium);
        assert_eq!(tile_count_band(1201.0), WeightBand::Heavy);
    }
}
