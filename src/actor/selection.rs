//! Selection addressing
//!
//! Identifies which part of the actor is currently being edited. The address
//! is a tagged value the store revalidates after every mutation, so a
//! selection can never dangle past a removal or reorder; `key()` renders the
//! `"kind-index"` string form used for display and logs.

use serde::{Deserialize, Serialize};

use super::component::ComponentKind;
use super::definition::ActorDefinition;

/// The currently edited part of the actor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Selection {
    #[default]
    None,
    ExtraProperties,
    Logic,
    Body,
    Component { kind: ComponentKind, index: usize },
}

impl Selection {
    pub fn component(kind: ComponentKind, index: usize) -> Self {
        Selection::Component { kind, index }
    }

    /// Legacy display key: `"sprites-2"`, `"body"`, ...
    pub fn key(&self) -> Option<String> {
        match self {
            Selection::None => None,
            Selection::ExtraProperties => Some("extraProperties".to_string()),
            Selection::Logic => Some("logic".to_string()),
            Selection::Body => Some("body".to_string()),
            Selection::Component { kind, index } => Some(format!("{}-{}", kind.key(), index)),
        }
    }

    /// Whether the selection still resolves inside the snapshot
    pub fn is_valid(&self, actor: &ActorDefinition) -> bool {
        match self {
            Selection::None | Selection::ExtraProperties | Selection::Logic => true,
            Selection::Body => actor.body.enabled,
            Selection::Component { kind, index } => actor.components.contains(*kind, *index),
        }
    }

    /// Clear the selection when it no longer resolves
    pub fn revalidate(&mut self, actor: &ActorDefinition) {
        if !self.is_valid(actor) {
            *self = Selection::None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::component::SpriteComponent;

    #[test]
    fn test_selection_keys() {
        assert_eq!(Selection::None.key(), None);
        assert_eq!(Selection::Body.key().as_deref(), Some("body"));
        assert_eq!(
            Selection::component(ComponentKind::Sprites, 2).key().as_deref(),
            Some("sprites-2"),
        );
    }

    #[test]
    fn test_revalidate_clears_dangling_component() {
        let mut actor = ActorDefinition::default();
        actor.components.sprites.push(SpriteComponent::default());

        let mut selection = Selection::component(ComponentKind::Sprites, 0);
        selection.revalidate(&actor);
        assert_eq!(selection, Selection::component(ComponentKind::Sprites, 0));

        actor.components.sprites.clear();
        selection.revalidate(&actor);
        assert_eq!(selection, Selection::None);
    }

    #[test]
    fn test_body_selection_requires_enabled_body() {
        let mut actor = ActorDefinition::default();
        let mut selection = Selection::Body;
        selection.revalidate(&actor);
        assert_eq!(selection, Selection::None);

        actor.body.enabled = true;
        let mut selection = Selection::Body;
        selection.revalidate(&actor);
        assert_eq!(selection, Selection::Body);
    }
}
