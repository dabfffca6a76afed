//! Actor component definitions
//!
//! An actor is a composition of independently addressable components: sprites,
//! animations, colliders, wireframes, mutators, child references and sound
//! references, each kept in its own ordered list. The singleton body is a
//! settings block on the actor itself (see `definition`), not a list entry.
//!
//! Records are design-time definitions; the runtime spawns engine-side
//! counterparts from them when the actor is instantiated.

use serde::{Deserialize, Serialize};

use crate::rasterizer::Segment;

/// The seven list-backed component kinds an actor can own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentKind {
    Sprites,
    Animations,
    Colliders,
    Wireframes,
    Mutators,
    Children,
    Sounds,
}

impl ComponentKind {
    /// All list-backed kinds, in panel order
    pub const ALL: &'static [ComponentKind] = &[
        ComponentKind::Sprites,
        ComponentKind::Animations,
        ComponentKind::Colliders,
        ComponentKind::Wireframes,
        ComponentKind::Mutators,
        ComponentKind::Children,
        ComponentKind::Sounds,
    ];

    /// Key used in selection keys and logs
    pub fn key(&self) -> &'static str {
        match self {
            ComponentKind::Sprites => "sprites",
            ComponentKind::Animations => "animations",
            ComponentKind::Colliders => "colliders",
            ComponentKind::Wireframes => "wireframes",
            ComponentKind::Mutators => "mutators",
            ComponentKind::Children => "children",
            ComponentKind::Sounds => "sounds",
        }
    }

    /// Get a human-readable name for this component kind
    pub fn label(&self) -> &'static str {
        match self {
            ComponentKind::Sprites => "Sprite",
            ComponentKind::Animations => "Animation",
            ComponentKind::Colliders => "Collider",
            ComponentKind::Wireframes => "Wireframe",
            ComponentKind::Mutators => "Mutator",
            ComponentKind::Children => "Child",
            ComponentKind::Sounds => "Sound",
        }
    }

    /// Singleton kinds allow at most one live entry
    pub fn is_singleton(&self) -> bool {
        matches!(self, ComponentKind::Mutators)
    }

    /// Kinds whose records carry an editable name. Children and sounds
    /// display the name of the entity they reference instead.
    pub fn has_name(&self) -> bool {
        !matches!(self, ComponentKind::Children | ComponentKind::Sounds)
    }
}

// =============================================================================
// Shared geometry / value types
// =============================================================================

/// Integer pixel vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelVector {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl PixelVector {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// Float vector for rotation and scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Vector3 = Vector3 { x: 1.0, y: 1.0, z: 1.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl Default for Vector3 {
    fn default() -> Self {
        Vector3::ZERO
    }
}

/// Axis addressed by a displacement edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Axis {
    X,
    Y,
    Z,
    Parallax,
}

/// A single-axis displacement offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisDelta {
    pub axis: Axis,
    pub offset: i32,
}

impl AxisDelta {
    pub fn new(axis: Axis, offset: i32) -> Self {
        Self { axis, offset }
    }
}

/// Pixel displacement with a stereo parallax component
///
/// Positive parallax pushes the component behind the screen plane, negative
/// pulls it in front.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Displacement {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub parallax: i32,
}

impl Displacement {
    /// Add a single-axis offset
    pub fn apply(&mut self, delta: &AxisDelta) {
        match delta.axis {
            Axis::X => self.x += delta.offset,
            Axis::Y => self.y += delta.offset,
            Axis::Z => self.z += delta.offset,
            Axis::Parallax => self.parallax += delta.offset,
        }
    }

    /// Reset all four axes to zero (the "center component" command)
    pub fn reset(&mut self) {
        *self = Displacement::default();
    }

    pub fn is_zero(&self) -> bool {
        *self == Displacement::default()
    }
}

/// Interlaced-display transparency of a drawable component
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Transparency {
    #[default]
    None,
    Odd,
    Even,
}

/// Blank pixels added around a sprite's frames before tiling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TexturePadding {
    pub x: u8,
    pub y: u8,
}

/// Tile-data compression mode passed to the image converter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TileCompression {
    #[default]
    None,
    Rle,
}

// =============================================================================
// Baked sprite artifact (derived state)
// =============================================================================

/// Baked tile/map artifact attached to a sprite record
///
/// Derived state: never authored directly, always regenerated from the
/// sprite's source files and settings. Overwritten when a bake pass completes
/// for the sprite, cleared as soon as its file lists become empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteImageData {
    /// Up to two parallel images: index 0 = primary/mono/left eye,
    /// index 1 = stereo right eye
    pub images: Vec<BakedImage>,
}

/// One baked image inside a sprite artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BakedImage {
    /// Generated base name, carrying an L/R suffix for stereo pairs
    pub name: String,
    pub tiles: TileSet,
    pub maps: Vec<TileMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationMeta>,
}

/// Compressed tile set of a baked image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSet {
    /// Raw 8x8 tile count before compression
    pub count: u32,
    /// Compression-encoded tile words
    pub data: String,
    /// Compression-encoded per-frame start offsets (individual-file
    /// animations only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_offsets: Option<String>,
}

/// Compressed map of tile references of a baked image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileMap {
    /// Map width in tiles
    pub width: u32,
    /// Map height in tiles
    pub height: u32,
    /// Compression-encoded map entries
    pub data: String,
}

/// Animation bookkeeping reported by the converter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationMeta {
    /// Tile count of the heaviest frame, when per-frame counts are knowable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub largest_frame: Option<u32>,
}

// =============================================================================
// Component records
// =============================================================================

/// A sprite bound to one or two source-file lists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteComponent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub displacement: Displacement,
    #[serde(default)]
    pub transparency: Transparency,
    /// Palette slot baked into map entries (0-3)
    #[serde(default)]
    pub palette: u8,
    #[serde(default)]
    pub padding: TexturePadding,
    /// Primary source files (mono, or left eye when paired)
    #[serde(default)]
    pub files: Vec<String>,
    /// Secondary source files (stereo right eye)
    #[serde(default)]
    pub files2: Vec<String>,
    /// Opt-in tile deduplication for non-animated sprites
    #[serde(default)]
    pub optimize_tiles: bool,
    #[serde(default)]
    pub compression: TileCompression,
    /// Derived bake artifact; never authored directly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_cache: Option<SpriteImageData>,
}

impl SpriteComponent {
    pub fn has_source_files(&self) -> bool {
        !self.files.is_empty() || !self.files2.is_empty()
    }
}

/// A named animation over the actor's shared frame pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationComponent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Engine cycles each frame is held for
    #[serde(default = "default_cycles")]
    pub cycles: u32,
    /// Frame indices played in order; empty plays 0..total_frames
    #[serde(default)]
    pub frames: Vec<u32>,
    #[serde(default = "default_true")]
    pub loops: bool,
    /// Method invoked when the animation completes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback: Option<String>,
}

impl Default for AnimationComponent {
    fn default() -> Self {
        Self {
            name: None,
            cycles: default_cycles(),
            frames: Vec::new(),
            loops: default_true(),
            callback: None,
        }
    }
}

fn default_cycles() -> u32 {
    8
}

fn default_true() -> bool {
    true
}

/// Collision shape of a collider component
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColliderShape {
    #[default]
    Ball,
    Box,
    InverseBox,
    LineField,
}

impl ColliderShape {
    pub fn label(&self) -> &'static str {
        match self {
            ColliderShape::Ball => "Ball",
            ColliderShape::Box => "Box",
            ColliderShape::InverseBox => "Inverse Box",
            ColliderShape::LineField => "Line Field",
        }
    }
}

/// A collider attached to the actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColliderComponent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub shape: ColliderShape,
    #[serde(default = "default_collider_size")]
    pub pixel_size: PixelVector,
    #[serde(default)]
    pub displacement: Displacement,
    #[serde(default)]
    pub rotation: Vector3,
    #[serde(default = "default_scale")]
    pub scale: Vector3,
    /// Whether this collider actively tests against others each frame
    #[serde(default)]
    pub check_for_collisions: bool,
    #[serde(default)]
    pub layers: Vec<String>,
    #[serde(default)]
    pub layers_to_check: Vec<String>,
}

impl Default for ColliderComponent {
    fn default() -> Self {
        Self {
            name: None,
            shape: ColliderShape::default(),
            pixel_size: default_collider_size(),
            displacement: Displacement::default(),
            rotation: Vector3::ZERO,
            scale: default_scale(),
            check_for_collisions: false,
            layers: Vec::new(),
            layers_to_check: Vec::new(),
        }
    }
}

fn default_collider_size() -> PixelVector {
    PixelVector::new(32, 32, 32)
}

fn default_scale() -> Vector3 {
    Vector3::ONE
}

/// Shape of a wireframe component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WireframeShape {
    /// Arbitrary 3-D line segments
    Mesh { segments: Vec<Segment> },
    /// Projected circle around the component position
    Sphere { radius: i32, draw_center: bool },
    /// Three axis-aligned lines crossing at the component position
    Asterisk { length: i32 },
}

impl Default for WireframeShape {
    fn default() -> Self {
        WireframeShape::Mesh { segments: Vec::new() }
    }
}

/// A vector-drawn preview/debug overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireframeComponent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub shape: WireframeShape,
    #[serde(default)]
    pub displacement: Displacement,
    /// Line shade (0-3)
    #[serde(default = "default_wire_color")]
    pub color: u8,
    #[serde(default)]
    pub transparency: Transparency,
    /// Plot only every other pixel/step
    #[serde(default)]
    pub interlaced: bool,
}

impl Default for WireframeComponent {
    fn default() -> Self {
        Self {
            name: None,
            shape: WireframeShape::default(),
            displacement: Displacement::default(),
            color: default_wire_color(),
            transparency: Transparency::default(),
            interlaced: false,
        }
    }
}

fn default_wire_color() -> u8 {
    3
}

/// Behavior mutation applied to the actor's logic class (singleton)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutatorComponent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Engine class performing the mutation
    #[serde(default)]
    pub mutation_class: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for MutatorComponent {
    fn default() -> Self {
        Self {
            name: None,
            mutation_class: String::new(),
            enabled: default_true(),
        }
    }
}

/// Reference to another actor spawned as a child
///
/// Carries no name of its own; the display name is resolved from the
/// referenced actor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildComponent {
    /// Id of the referenced actor
    pub actor_id: String,
    #[serde(default)]
    pub position: PixelVector,
    #[serde(default)]
    pub rotation: Vector3,
}

/// Reference to a sound owned by the project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundComponent {
    /// Id of the referenced sound
    pub sound_id: String,
}

// =============================================================================
// Generic record wrapper
// =============================================================================

/// A component record of any kind
///
/// Store operations that are uniform across kinds (add, remove, move, clone)
/// dispatch through this wrapper; kind-specific editing goes through the
/// typed lists on `Components`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentRecord {
    Sprite(SpriteComponent),
    Animation(AnimationComponent),
    Collider(ColliderComponent),
    Wireframe(WireframeComponent),
    Mutator(MutatorComponent),
    Child(ChildComponent),
    Sound(SoundComponent),
}

impl ComponentRecord {
    /// The kind of list this record belongs to
    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentRecord::Sprite(_) => ComponentKind::Sprites,
            ComponentRecord::Animation(_) => ComponentKind::Animations,
            ComponentRecord::Collider(_) => ComponentKind::Colliders,
            ComponentRecord::Wireframe(_) => ComponentKind::Wireframes,
            ComponentRecord::Mutator(_) => ComponentKind::Mutators,
            ComponentRecord::Child(_) => ComponentKind::Children,
            ComponentRecord::Sound(_) => ComponentKind::Sounds,
        }
    }

    /// The record's own name, where its kind carries one
    pub fn name(&self) -> Option<&str> {
        match self {
            ComponentRecord::Sprite(s) => s.name.as_deref(),
            ComponentRecord::Animation(a) => a.name.as_deref(),
            ComponentRecord::Collider(c) => c.name.as_deref(),
            ComponentRecord::Wireframe(w) => w.name.as_deref(),
            ComponentRecord::Mutator(m) => m.name.as_deref(),
            ComponentRecord::Child(_) | ComponentRecord::Sound(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_displacement_apply_and_reset() {
        let mut d = Displacement::default();
        d.apply(&AxisDelta::new(Axis::X, 4));
        d.apply(&AxisDelta::new(Axis::Parallax, -2));
        d.apply(&AxisDelta::new(Axis::X, 1));
        assert_eq!(d, Displacement { x: 5, y: 0, z: 0, parallax: -2 });

        d.reset();
        assert!(d.is_zero());
    }

    #[test]
    fn test_kind_name_rules() {
        assert!(ComponentKind::Sprites.has_name());
        assert!(ComponentKind::Mutators.has_name());
        assert!(!ComponentKind::Children.has_name());
        assert!(!ComponentKind::Sounds.has_name());
    }

    #[test]
    fn test_record_kind_roundtrip() {
        for kind in ComponentKind::ALL {
            let record = match kind {
                ComponentKind::Sprites => ComponentRecord::Sprite(SpriteComponent::default()),
                ComponentKind::Animations => {
                    ComponentRecord::Animation(AnimationComponent::default())
                }
                ComponentKind::Colliders => ComponentRecord::Collider(ColliderComponent::default()),
                ComponentKind::Wireframes => {
                    ComponentRecord::Wireframe(WireframeComponent::default())
                }
                ComponentKind::Mutators => ComponentRecord::Mutator(MutatorComponent::default()),
                ComponentKind::Children => ComponentRecord::Child(ChildComponent::default()),
                ComponentKind::Sounds => ComponentRecord::Sound(SoundComponent::default()),
            };
            assert_eq!(record.kind(), *kind);
        }
    }
}
