//! Default component records
//!
//! Adding a component asks the defaults service for a fresh record. The
//! built-in table maps each kind to a constructor so new kinds register in
//! one place instead of growing a dispatch switch; applications with
//! schema-driven defaults substitute their own implementation.

use std::collections::HashMap;

use super::component::{
    AnimationComponent, ChildComponent, ColliderComponent, ComponentKind, ComponentRecord,
    MutatorComponent, SoundComponent, SpriteComponent, WireframeComponent,
};

/// Schema-defaults collaborator
pub trait ComponentDefaults {
    /// Produce a default-valued record for `kind`, or `None` when no default
    /// is known (the add operation then becomes a no-op)
    fn generate_default(&self, kind: ComponentKind) -> Option<ComponentRecord>;
}

type DefaultFn = fn() -> ComponentRecord;

/// Built-in kind -> constructor table
pub struct DefaultsTable {
    entries: HashMap<ComponentKind, DefaultFn>,
}

impl DefaultsTable {
    /// Table covering every built-in kind
    pub fn new() -> Self {
        let mut table = Self {
            entries: HashMap::new(),
        };
        table.register(ComponentKind::Sprites, default_sprite);
        table.register(ComponentKind::Animations, default_animation);
        table.register(ComponentKind::Colliders, default_collider);
        table.register(ComponentKind::Wireframes, default_wireframe);
        table.register(ComponentKind::Mutators, default_mutator);
        table.register(ComponentKind::Children, default_child);
        table.register(ComponentKind::Sounds, default_sound);
        table
    }

    /// Register or replace the constructor for a kind
    pub fn register(&mut self, kind: ComponentKind, constructor: DefaultFn) {
        self.entries.insert(kind, constructor);
    }

    /// Drop the constructor for a kind, making adds of it no-ops
    pub fn unregister(&mut self, kind: ComponentKind) {
        self.entries.remove(&kind);
    }
}

impl Default for DefaultsTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentDefaults for DefaultsTable {
    fn generate_default(&self, kind: ComponentKind) -> Option<ComponentRecord> {
        self.entries.get(&kind).map(|constructor| constructor())
    }
}

fn default_sprite() -> ComponentRecord {
    ComponentRecord::Sprite(SpriteComponent::default())
}

fn default_animation() -> ComponentRecord {
    ComponentRecord::Animation(AnimationComponent::default())
}

fn default_collider() -> ComponentRecord {
    ComponentRecord::Collider(ColliderComponent::default())
}

fn default_wireframe() -> ComponentRecord {
    ComponentRecord::Wireframe(WireframeComponent::default())
}

fn default_mutator() -> ComponentRecord {
    ComponentRecord::Mutator(MutatorComponent::default())
}

fn default_child() -> ComponentRecord {
    ComponentRecord::Child(ChildComponent::default())
}

fn default_sound() -> ComponentRecord {
    ComponentRecord::Sound(SoundComponent::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_all_kinds() {
        let table = DefaultsTable::new();
        for kind in ComponentKind::ALL {
            let record = table
                .generate_default(*kind)
                .unwrap_or_else(|| panic!("no default for {}", kind.key()));
            assert_eq!(record.kind(), *kind);
        }
    }

    #[test]
    fn test_unregistered_kind_yields_none() {
        let mut table = DefaultsTable::new();
        table.unregister(ComponentKind::Sounds);
        assert!(table.generate_default(ComponentKind::Sounds).is_none());
        assert!(table.generate_default(ComponentKind::Sprites).is_some());
    }
}
