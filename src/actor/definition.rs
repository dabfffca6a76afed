//! Actor root entity
//!
//! An `ActorDefinition` is the complete editable document: the settings
//! blocks shown in the property panels plus the per-kind component lists.
//! It is owned exclusively by the editing session; baked artifacts live on
//! their parent sprite records and have no independent lifetime.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::component::{
    AnimationComponent, ChildComponent, ColliderComponent, ComponentKind, ComponentRecord,
    Displacement, MutatorComponent, PixelVector, SoundComponent, SpriteComponent,
    WireframeComponent,
};

/// UI-visible size/info block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraProperties {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub pixel_size: PixelVector,
}

/// Actor-level animation settings
///
/// `total_frames` is partly derived: the consistency rules override it for
/// multi-file animations and when no animation components exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationSettings {
    #[serde(default)]
    pub default_animation: String,
    #[serde(default = "default_total_frames")]
    pub total_frames: u32,
    /// Keep every frame's tiles resident simultaneously
    #[serde(default)]
    pub multiframe: bool,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            default_animation: String::new(),
            total_frames: default_total_frames(),
            multiframe: false,
        }
    }
}

fn default_total_frames() -> u32 {
    1
}

/// Engine sprite class the actor's sprites render through
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpriteType {
    #[default]
    Bgmap,
    Object,
}

/// Actor-level sprite settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteSettings {
    #[serde(rename = "type")]
    pub sprite_type: SpriteType,
    #[serde(default)]
    pub use_z_displacement_in_projection: bool,
}

/// Axes a body responds to gravity on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GravityAxes {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

/// Singleton physical body settings
///
/// The body is flag-bearing rather than list-backed: adding the "body
/// component" enables it, removing it disables it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodySettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_mass")]
    pub mass: f32,
    #[serde(default)]
    pub friction: f32,
    #[serde(default)]
    pub bounciness: f32,
    #[serde(default)]
    pub maximum_speed: f32,
    #[serde(default)]
    pub maximum_velocity: PixelVector,
    #[serde(default)]
    pub gravity_axes: GravityAxes,
}

impl Default for BodySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            mass: default_mass(),
            friction: 0.0,
            bounciness: 0.0,
            maximum_speed: 0.0,
            maximum_velocity: PixelVector::default(),
            gravity_axes: GravityAxes::default(),
        }
    }
}

fn default_mass() -> f32 {
    1.0
}

/// Logic class configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicSettings {
    /// Engine class instantiated for this actor; empty uses the stock one
    #[serde(default)]
    pub custom_allocator: String,
    #[serde(default)]
    pub configuration: BTreeMap<String, String>,
}

/// The complete editable actor document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorDefinition {
    #[serde(default)]
    pub extra_properties: ExtraProperties,
    #[serde(default)]
    pub animations: AnimationSettings,
    #[serde(default)]
    pub sprites: SpriteSettings,
    #[serde(default)]
    pub body: BodySettings,
    #[serde(default)]
    pub logic: LogicSettings,
    #[serde(default)]
    pub in_game_type: String,
    #[serde(default)]
    pub components: Components,
}

/// Per-kind ordered component lists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub sprites: Vec<SpriteComponent>,
    #[serde(default)]
    pub animations: Vec<AnimationComponent>,
    #[serde(default)]
    pub colliders: Vec<ColliderComponent>,
    #[serde(default)]
    pub wireframes: Vec<WireframeComponent>,
    #[serde(default)]
    pub mutators: Vec<MutatorComponent>,
    #[serde(default)]
    pub children: Vec<ChildComponent>,
    #[serde(default)]
    pub sounds: Vec<SoundComponent>,
}

impl Components {
    /// Number of records in a kind's list
    pub fn len(&self, kind: ComponentKind) -> usize {
        match kind {
            ComponentKind::Sprites => self.sprites.len(),
            ComponentKind::Animations => self.animations.len(),
            ComponentKind::Colliders => self.colliders.len(),
            ComponentKind::Wireframes => self.wireframes.len(),
            ComponentKind::Mutators => self.mutators.len(),
            ComponentKind::Children => self.children.len(),
            ComponentKind::Sounds => self.sounds.len(),
        }
    }

    pub fn is_empty(&self, kind: ComponentKind) -> bool {
        self.len(kind) == 0
    }

    /// Whether `(kind, index)` resolves to a record
    pub fn contains(&self, kind: ComponentKind, index: usize) -> bool {
        index < self.len(kind)
    }

    /// Structural copy of the record at `(kind, index)`
    pub fn clone_record(&self, kind: ComponentKind, index: usize) -> Option<ComponentRecord> {
        match kind {
            ComponentKind::Sprites => {
                self.sprites.get(index).cloned().map(ComponentRecord::Sprite)
            }
            ComponentKind::Animations => self
                .animations
                .get(index)
                .cloned()
                .map(ComponentRecord::Animation),
            ComponentKind::Colliders => self
                .colliders
                .get(index)
                .cloned()
                .map(ComponentRecord::Collider),
            ComponentKind::Wireframes => self
                .wireframes
                .get(index)
                .cloned()
                .map(ComponentRecord::Wireframe),
            ComponentKind::Mutators => self
                .mutators
                .get(index)
                .cloned()
                .map(ComponentRecord::Mutator),
            ComponentKind::Children => self
                .children
                .get(index)
                .cloned()
                .map(ComponentRecord::Child),
            ComponentKind::Sounds => self.sounds.get(index).cloned().map(ComponentRecord::Sound),
        }
    }

    /// Insert a record at `index` in its kind's list
    ///
    /// Returns false (without inserting) when the record's variant does not
    /// match `kind` or `index` is past the end.
    pub fn insert(&mut self, kind: ComponentKind, index: usize, record: ComponentRecord) -> bool {
        if index > self.len(kind) {
            return false;
        }
        match (kind, record) {
            (ComponentKind::Sprites, ComponentRecord::Sprite(s)) => self.sprites.insert(index, s),
            (ComponentKind::Animations, ComponentRecord::Animation(a)) => {
                self.animations.insert(index, a)
            }
            (ComponentKind::Colliders, ComponentRecord::Collider(c)) => {
                self.colliders.insert(index, c)
            }
            (ComponentKind::Wireframes, ComponentRecord::Wireframe(w)) => {
                self.wireframes.insert(index, w)
            }
            (ComponentKind::Mutators, ComponentRecord::Mutator(m)) => {
                self.mutators.insert(index, m)
            }
            (ComponentKind::Children, ComponentRecord::Child(c)) => self.children.insert(index, c),
            (ComponentKind::Sounds, ComponentRecord::Sound(s)) => self.sounds.insert(index, s),
            _ => return false,
        }
        true
    }

    /// Append a record to its kind's list
    pub fn push(&mut self, kind: ComponentKind, record: ComponentRecord) -> bool {
        let end = self.len(kind);
        self.insert(kind, end, record)
    }

    /// Splice the record at `(kind, index)` out of its list
    pub fn remove(&mut self, kind: ComponentKind, index: usize) -> Option<ComponentRecord> {
        if !self.contains(kind, index) {
            return None;
        }
        Some(match kind {
            ComponentKind::Sprites => ComponentRecord::Sprite(self.sprites.remove(index)),
            ComponentKind::Animations => ComponentRecord::Animation(self.animations.remove(index)),
            ComponentKind::Colliders => ComponentRecord::Collider(self.colliders.remove(index)),
            ComponentKind::Wireframes => ComponentRecord::Wireframe(self.wireframes.remove(index)),
            ComponentKind::Mutators => ComponentRecord::Mutator(self.mutators.remove(index)),
            ComponentKind::Children => ComponentRecord::Child(self.children.remove(index)),
            ComponentKind::Sounds => ComponentRecord::Sound(self.sounds.remove(index)),
        })
    }

    /// Set the name of the record at `(kind, index)`
    ///
    /// Children and sounds have no name of their own; returns false for them
    /// and for unresolvable addresses.
    pub fn set_name(&mut self, kind: ComponentKind, index: usize, name: &str) -> bool {
        let slot = match kind {
            ComponentKind::Sprites => self.sprites.get_mut(index).map(|r| &mut r.name),
            ComponentKind::Animations => self.animations.get_mut(index).map(|r| &mut r.name),
            ComponentKind::Colliders => self.colliders.get_mut(index).map(|r| &mut r.name),
            ComponentKind::Wireframes => self.wireframes.get_mut(index).map(|r| &mut r.name),
            ComponentKind::Mutators => self.mutators.get_mut(index).map(|r| &mut r.name),
            ComponentKind::Children | ComponentKind::Sounds => None,
        };
        match slot {
            Some(slot) => {
                *slot = Some(name.to_string());
                true
            }
            None => false,
        }
    }

    /// Mutable displacement of the record at `(kind, index)`, for kinds that
    /// carry one
    pub fn displacement_mut(
        &mut self,
        kind: ComponentKind,
        index: usize,
    ) -> Option<&mut Displacement> {
        match kind {
            ComponentKind::Sprites => self.sprites.get_mut(index).map(|r| &mut r.displacement),
            ComponentKind::Colliders => self.colliders.get_mut(index).map(|r| &mut r.displacement),
            ComponentKind::Wireframes => {
                self.wireframes.get_mut(index).map(|r| &mut r.displacement)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_rejects_kind_mismatch() {
        let mut components = Components::default();
        let record = ComponentRecord::Sprite(SpriteComponent::default());
        assert!(!components.insert(ComponentKind::Colliders, 0, record));
        assert!(components.is_empty(ComponentKind::Colliders));
        assert!(components.is_empty(ComponentKind::Sprites));
    }

    #[test]
    fn test_push_remove_roundtrip() {
        let mut components = Components::default();
        assert!(components.push(
            ComponentKind::Animations,
            ComponentRecord::Animation(AnimationComponent::default()),
        ));
        assert_eq!(components.len(ComponentKind::Animations), 1);

        let removed = components.remove(ComponentKind::Animations, 0);
        assert!(matches!(removed, Some(ComponentRecord::Animation(_))));
        assert!(components.is_empty(ComponentKind::Animations));
        assert!(components.remove(ComponentKind::Animations, 0).is_none());
    }

    #[test]
    fn test_set_name_rules() {
        let mut components = Components::default();
        components.sprites.push(SpriteComponent::default());
        components.children.push(ChildComponent::default());

        assert!(components.set_name(ComponentKind::Sprites, 0, "Torch"));
        assert_eq!(components.sprites[0].name.as_deref(), Some("Torch"));

        assert!(!components.set_name(ComponentKind::Children, 0, "Nope"));
        assert!(!components.set_name(ComponentKind::Sprites, 5, "OutOfRange"));
    }
}
