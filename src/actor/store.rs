//! Component store operations
//!
//! All editing goes through an `EditSession`: the current actor snapshot,
//! the selection, and the collaborator handles. Operations run synchronously
//! to completion, re-run the consistency rules on the new snapshot, and
//! report whether the edit needs a rebake. While a bake pass is generating,
//! structural edits are rejected.
//!
//! The edit-API boundary never throws for normal edge cases: missing
//! collaborator data ignores the edit, a declined confirmation aborts it
//! with zero side effects. Internal lookups use `Result<_, NotFoundError>`.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, warn};

use crate::bake::{start_bake, BakeError, BakeOutcome, BakeServices, PendingBake};
use crate::services::{ConfirmPrompt, EntityKind, ProjectLookup};

use super::component::{AxisDelta, ComponentKind};
use super::consistency;
use super::defaults::ComponentDefaults;
use super::definition::ActorDefinition;
use super::selection::Selection;

/// A (kind, index) address that does not resolve in the current snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotFoundError {
    pub kind: ComponentKind,
    pub index: usize,
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no {} component at index {}", self.kind.key(), self.index)
    }
}

impl std::error::Error for NotFoundError {}

/// Boundary result of a store operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum EditOutcome {
    /// The edit was applied; `rebake` marks asset-affecting changes
    Applied { rebake: bool },
    /// Missing collaborator data or an unresolvable address; nothing changed
    Ignored,
    /// The user declined the confirmation prompt; nothing changed
    Declined,
    /// A bake pass is generating; the edit was rejected
    Blocked,
}

impl EditOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, EditOutcome::Applied { .. })
    }

    /// Whether the applied edit invalidated baked artifacts
    pub fn needs_rebake(&self) -> bool {
        matches!(self, EditOutcome::Applied { rebake: true })
    }
}

/// Collaborators injected into an editing session
#[derive(Clone)]
pub struct SessionServices {
    pub defaults: Arc<dyn ComponentDefaults + Send + Sync>,
    pub lookup: Arc<dyn ProjectLookup>,
    pub confirm: Arc<dyn ConfirmPrompt>,
}

/// The editing session: one actor document plus its collaborators
pub struct EditSession {
    pub actor: ActorDefinition,
    pub selection: Selection,
    services: SessionServices,
    bake_services: BakeServices,
    generating: Arc<AtomicBool>,
    pending: Option<PendingBake>,
}

impl EditSession {
    pub fn new(
        actor: ActorDefinition,
        services: SessionServices,
        bake_services: BakeServices,
    ) -> Self {
        let mut session = Self {
            actor,
            selection: Selection::None,
            services,
            bake_services,
            generating: Arc::new(AtomicBool::new(false)),
            pending: None,
        };
        consistency::normalize_frames(&mut session.actor);
        session
    }

    /// Whether a bake pass is in flight
    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::Acquire)
    }

    fn blocked(&self) -> bool {
        if self.is_generating() {
            debug!("edit rejected: bake pass in flight");
            return true;
        }
        false
    }

    /// Normalize the new snapshot and revalidate the selection
    fn finish_edit(&mut self, rebake: bool) -> EditOutcome {
        consistency::normalize_frames(&mut self.actor);
        self.selection.revalidate(&self.actor);
        EditOutcome::Applied { rebake }
    }

    fn affects_assets(kind: ComponentKind) -> bool {
        matches!(kind, ComponentKind::Sprites | ComponentKind::Animations)
    }

    // =========================================================================
    // Component operations
    // =========================================================================

    /// Append a default-valued component and select it
    ///
    /// No-op when the defaults collaborator has no record for the kind, or
    /// when a singleton kind already has a live entry.
    pub fn add_component(&mut self, kind: ComponentKind) -> EditOutcome {
        if self.blocked() {
            return EditOutcome::Blocked;
        }
        if kind.is_singleton() && !self.actor.components.is_empty(kind) {
            debug!("add {} ignored: singleton already present", kind.key());
            return EditOutcome::Ignored;
        }
        let Some(record) = self.services.defaults.generate_default(kind) else {
            debug!("add {} ignored: no schema default", kind.key());
            return EditOutcome::Ignored;
        };
        if !self.actor.components.push(kind, record) {
            return EditOutcome::Ignored;
        }
        let index = self.actor.components.len(kind) - 1;
        self.selection = Selection::component(kind, index);
        self.finish_edit(Self::affects_assets(kind))
    }

    /// Enable the singleton body and select it
    pub fn add_body(&mut self) -> EditOutcome {
        if self.blocked() {
            return EditOutcome::Blocked;
        }
        if self.actor.body.enabled {
            return EditOutcome::Ignored;
        }
        self.actor.body.enabled = true;
        self.selection = Selection::Body;
        self.finish_edit(false)
    }

    /// Splice a component out after user confirmation
    ///
    /// The selection is cleared unconditionally afterwards, even when it
    /// addressed a surviving index.
    pub fn remove_component(&mut self, kind: ComponentKind, index: usize) -> EditOutcome {
        if self.blocked() {
            return EditOutcome::Blocked;
        }
        if self.resolve(kind, index).is_err() {
            return EditOutcome::Ignored;
        }
        let label = self
            .component_label(kind, index)
            .unwrap_or_else(|| kind.label().to_string());
        if !self
            .services
            .confirm
            .confirm("Remove component", &format!("Remove {}?", label))
        {
            debug!("remove {}-{} declined", kind.key(), index);
            return EditOutcome::Declined;
        }
        self.actor.components.remove(kind, index);
        self.selection = Selection::None;
        self.finish_edit(Self::affects_assets(kind))
    }

    /// Disable the singleton body after user confirmation
    pub fn remove_body(&mut self) -> EditOutcome {
        if self.blocked() {
            return EditOutcome::Blocked;
        }
        if !self.actor.body.enabled {
            return EditOutcome::Ignored;
        }
        if !self
            .services
            .confirm
            .confirm("Remove component", "Remove Body?")
        {
            return EditOutcome::Declined;
        }
        self.actor.body.enabled = false;
        self.selection = Selection::None;
        self.finish_edit(false)
    }

    /// Move a component to a drop target within its kind's list
    ///
    /// `to_target` addresses a slot in the pre-removal list; targets past the
    /// source are adjusted down by one because the removal already shifted
    /// later indices.
    pub fn move_component(
        &mut self,
        kind: ComponentKind,
        from: usize,
        to_target: usize,
    ) -> EditOutcome {
        if self.blocked() {
            return EditOutcome::Blocked;
        }
        if self.resolve(kind, from).is_err() || to_target > self.actor.components.len(kind) {
            return EditOutcome::Ignored;
        }
        let Some(record) = self.actor.components.remove(kind, from) else {
            return EditOutcome::Ignored;
        };
        let to = if to_target > from { to_target - 1 } else { to_target };
        self.actor.components.insert(kind, to, record);
        self.finish_edit(false)
    }

    /// Duplicate a component, inserting the copy right after the original
    pub fn clone_component(&mut self, kind: ComponentKind, index: usize) -> EditOutcome {
        if self.blocked() {
            return EditOutcome::Blocked;
        }
        if kind.is_singleton() {
            return EditOutcome::Ignored;
        }
        let Some(copy) = self.actor.components.clone_record(kind, index) else {
            return EditOutcome::Ignored;
        };
        self.actor.components.insert(kind, index + 1, copy);
        self.selection = Selection::component(kind, index + 1);
        self.finish_edit(Self::affects_assets(kind))
    }

    /// Set a component's name
    ///
    /// Unavailable for children and sounds, whose names derive from the
    /// referenced entity.
    pub fn rename_component(
        &mut self,
        kind: ComponentKind,
        index: usize,
        name: &str,
    ) -> EditOutcome {
        if self.blocked() {
            return EditOutcome::Blocked;
        }
        if !kind.has_name() {
            return EditOutcome::Ignored;
        }
        if !self.actor.components.set_name(kind, index, name) {
            return EditOutcome::Ignored;
        }
        self.finish_edit(false)
    }

    /// Add per-axis offsets to a component's displacement
    ///
    /// An empty delta list resets all four axes to zero instead (the
    /// "center component" command). Kinds without a displacement ignore the
    /// edit.
    pub fn displace_component(
        &mut self,
        kind: ComponentKind,
        index: usize,
        deltas: &[AxisDelta],
    ) -> EditOutcome {
        if self.blocked() {
            return EditOutcome::Blocked;
        }
        let Some(displacement) = self.actor.components.displacement_mut(kind, index) else {
            return EditOutcome::Ignored;
        };
        if deltas.is_empty() {
            displacement.reset();
        } else {
            for delta in deltas {
                displacement.apply(delta);
            }
        }
        self.finish_edit(false)
    }

    /// Replace a sprite's source-file lists
    ///
    /// Emptying both lists clears the cached artifact immediately; any other
    /// change leaves the stale artifact in place until the rebake lands.
    pub fn set_sprite_files(
        &mut self,
        index: usize,
        files: Vec<String>,
        files2: Vec<String>,
    ) -> EditOutcome {
        if self.blocked() {
            return EditOutcome::Blocked;
        }
        let Some(sprite) = self.actor.components.sprites.get_mut(index) else {
            return EditOutcome::Ignored;
        };
        sprite.files = files;
        sprite.files2 = files2;
        if !sprite.has_source_files() {
            sprite.image_cache = None;
        }
        self.finish_edit(true)
    }

    /// Display name for a component
    ///
    /// Children and sounds resolve through the project lookup; other kinds
    /// use their own name, falling back to a positional label.
    pub fn component_label(&self, kind: ComponentKind, index: usize) -> Option<String> {
        let record = self.actor.components.clone_record(kind, index)?;
        let resolved = match &record {
            super::component::ComponentRecord::Child(child) => self
                .services
                .lookup
                .resolve(&child.actor_id, EntityKind::Actor)
                .map(|entry| entry.name),
            super::component::ComponentRecord::Sound(sound) => self
                .services
                .lookup
                .resolve(&sound.sound_id, EntityKind::Sound)
                .map(|entry| entry.name),
            _ => record.name().map(|name| name.to_string()),
        };
        Some(resolved.unwrap_or_else(|| format!("{} {}", kind.label(), index + 1)))
    }

    /// Internal resolver for `(kind, index)` addresses
    fn resolve(&self, kind: ComponentKind, index: usize) -> Result<(), NotFoundError> {
        if self.actor.components.contains(kind, index) {
            Ok(())
        } else {
            Err(NotFoundError { kind, index })
        }
    }

    // =========================================================================
    // Bake integration
    // =========================================================================

    /// Start a background bake pass against the current snapshot
    ///
    /// Returns false when a pass is already generating (the request is
    /// dropped, not queued).
    pub fn request_bake(&mut self) -> bool {
        match start_bake(
            &self.actor,
            self.bake_services.clone(),
            Arc::clone(&self.generating),
        ) {
            Some(pending) => {
                self.pending = Some(pending);
                true
            }
            None => false,
        }
    }

    /// Poll the in-flight pass, applying its artifacts when it completes
    ///
    /// Returns `None` while no pass is pending or the pass is still running.
    /// Conversion failures ride along in the returned outcome; the failed
    /// sprites keep their previous artifacts.
    pub fn poll_bake(&mut self) -> Option<Result<BakeOutcome, BakeError>> {
        if !self.pending.as_mut()?.is_complete() {
            return None;
        }
        let pending = self.pending.take()?;
        let result = pending.take().unwrap_or_else(|| {
            Err(BakeError::Worker(
                "bake thread terminated without a result".to_string(),
            ))
        });
        if let Ok(outcome) = &result {
            outcome.apply_to(&mut self.actor);
            if !outcome.failures.is_empty() {
                warn!("{} sprite(s) failed to bake", outcome.failures.len());
            }
        }
        Some(result)
    }

    /// Block until the in-flight pass (if any) completes and apply it
    pub fn finish_bake(&mut self) -> Option<Result<BakeOutcome, BakeError>> {
        let pending = self.pending.take()?;
        let result = pending.wait();
        if let Ok(outcome) = &result {
            outcome.apply_to(&mut self.actor);
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::component::{Axis, ComponentRecord, SpriteComponent};
    use crate::actor::defaults::DefaultsTable;
    use crate::bake::compress::{CompressError, PayloadCompressor};
    use crate::bake::convert::{
        ConversionOutput, ConvertError, ConvertRequest, ImageConverter, RawTileSet,
    };
    use crate::services::{AutoConfirm, AutoDecline, NullProgress, StaticLookup};

    struct StubConverter;

    impl ImageConverter for StubConverter {
        fn convert(&self, _request: &ConvertRequest) -> Result<ConversionOutput, ConvertError> {
            Ok(ConversionOutput {
                tiles: RawTileSet {
                    count: 1,
                    data: vec![0; 4],
                    frame_offsets: None,
                },
                maps: Vec::new(),
                animation: None,
            })
        }
    }

    struct JsonCompressor;

    impl PayloadCompressor for JsonCompressor {
        fn compress(&self, value: &serde_json::Value) -> Result<String, CompressError> {
            Ok(value.to_string())
        }
    }

    fn bake_services() -> BakeServices {
        BakeServices {
            converter: Arc::new(StubConverter),
            compressor: Arc::new(JsonCompressor),
            progress: Arc::new(NullProgress),
        }
    }

    fn session() -> EditSession {
        session_with_confirm(Arc::new(AutoConfirm))
    }

    fn session_with_confirm(confirm: Arc<dyn ConfirmPrompt>) -> EditSession {
        let mut lookup = StaticLookup::new();
        lookup.insert(EntityKind::Actor, "punk", "Punk");
        lookup.insert(EntityKind::Sound, "bgm", "Main Theme");
        EditSession::new(
            ActorDefinition::default(),
            SessionServices {
                defaults: Arc::new(DefaultsTable::new()),
                lookup: Arc::new(lookup),
                confirm,
            },
            bake_services(),
        )
    }

    #[test]
    fn test_add_selects_appended_component() {
        let mut session = session();
        let outcome = session.add_component(ComponentKind::Sprites);
        assert_eq!(outcome, EditOutcome::Applied { rebake: true });
        assert_eq!(
            session.selection,
            Selection::component(ComponentKind::Sprites, 0),
        );

        let outcome = session.add_component(ComponentKind::Colliders);
        assert_eq!(outcome, EditOutcome::Applied { rebake: false });
        assert_eq!(
            session.selection,
            Selection::component(ComponentKind::Colliders, 0),
        );
    }

    #[test]
    fn test_add_without_schema_default_is_ignored() {
        let mut session = session();
        let mut table = DefaultsTable::new();
        table.unregister(ComponentKind::Wireframes);
        session.services.defaults = Arc::new(table);

        let outcome = session.add_component(ComponentKind::Wireframes);
        assert_eq!(outcome, EditOutcome::Ignored);
        assert!(session.actor.components.wireframes.is_empty());
        assert_eq!(session.selection, Selection::None);
    }

    #[test]
    fn test_singletons_reject_second_entry() {
        let mut session = session();
        assert!(session.add_component(ComponentKind::Mutators).is_applied());
        assert_eq!(
            session.add_component(ComponentKind::Mutators),
            EditOutcome::Ignored,
        );
        assert_eq!(session.actor.components.mutators.len(), 1);

        assert!(session.add_body().is_applied());
        assert_eq!(session.add_body(), EditOutcome::Ignored);
        assert_eq!(session.selection, Selection::Body);
    }

    #[test]
    fn test_remove_clears_selection_unconditionally() {
        let mut session = session();
        for _ in 0..3 {
            let _ = session.add_component(ComponentKind::Colliders);
        }
        // select an index that survives the removal
        session.selection = Selection::component(ComponentKind::Colliders, 0);

        let outcome = session.remove_component(ComponentKind::Colliders, 2);
        assert!(outcome.is_applied());
        assert_eq!(session.actor.components.colliders.len(), 2);
        assert_eq!(session.selection, Selection::None);
    }

    #[test]
    fn test_declined_removal_has_no_side_effects() {
        let mut session = session_with_confirm(Arc::new(AutoDecline));
        let _ = session.add_component(ComponentKind::Sounds);
        session.selection = Selection::component(ComponentKind::Sounds, 0);

        let outcome = session.remove_component(ComponentKind::Sounds, 0);
        assert_eq!(outcome, EditOutcome::Declined);
        assert_eq!(session.actor.components.sounds.len(), 1);
        assert_eq!(
            session.selection,
            Selection::component(ComponentKind::Sounds, 0),
        );
    }

    #[test]
    fn test_move_reorders_with_post_removal_shift() {
        let mut session = session();
        for i in 0..4 {
            let _ = session.add_component(ComponentKind::Animations);
            let _ = session.rename_component(ComponentKind::Animations, i, &format!("A{i}"));
        }

        // target slot 2 in the pre-removal list puts the record at index 1
        let outcome = session.move_component(ComponentKind::Animations, 0, 2);
        assert!(outcome.is_applied());
        let names: Vec<_> = session
            .actor
            .components
            .animations
            .iter()
            .map(|a| a.name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["A1", "A0", "A2", "A3"]);
    }

    #[test]
    fn test_move_before_source_keeps_target_index() {
        let mut session = session();
        for i in 0..3 {
            let _ = session.add_component(ComponentKind::Animations);
            let _ = session.rename_component(ComponentKind::Animations, i, &format!("A{i}"));
        }

        let outcome = session.move_component(ComponentKind::Animations, 2, 0);
        assert!(outcome.is_applied());
        let names: Vec<_> = session
            .actor
            .components
            .animations
            .iter()
            .map(|a| a.name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["A2", "A0", "A1"]);
    }

    #[test]
    fn test_clone_inserts_copy_after_original() {
        let mut session = session();
        let _ = session.add_component(ComponentKind::Sprites);
        let _ = session.add_component(ComponentKind::Sprites);
        let _ = session.rename_component(ComponentKind::Sprites, 0, "Original");

        let outcome = session.clone_component(ComponentKind::Sprites, 0);
        assert_eq!(outcome, EditOutcome::Applied { rebake: true });
        assert_eq!(session.actor.components.sprites.len(), 3);
        assert_eq!(
            session.actor.components.sprites[1].name.as_deref(),
            Some("Original"),
        );
        assert_eq!(
            session.selection,
            Selection::component(ComponentKind::Sprites, 1),
        );
    }

    #[test]
    fn test_rename_rejected_for_children() {
        let mut session = session();
        let _ = session.add_component(ComponentKind::Children);
        assert_eq!(
            session.rename_component(ComponentKind::Children, 0, "Nope"),
            EditOutcome::Ignored,
        );
    }

    #[test]
    fn test_displace_and_center() {
        let mut session = session();
        let _ = session.add_component(ComponentKind::Wireframes);

        let deltas = [
            AxisDelta::new(Axis::X, 3),
            AxisDelta::new(Axis::Z, -1),
            AxisDelta::new(Axis::Parallax, 2),
        ];
        assert!(session
            .displace_component(ComponentKind::Wireframes, 0, &deltas)
            .is_applied());
        let d = session.actor.components.wireframes[0].displacement;
        assert_eq!((d.x, d.y, d.z, d.parallax), (3, 0, -1, 2));

        // empty delta list doubles as the center command
        assert!(session
            .displace_component(ComponentKind::Wireframes, 0, &[])
            .is_applied());
        assert!(session.actor.components.wireframes[0].displacement.is_zero());
    }

    #[test]
    fn test_displace_ignored_for_kinds_without_displacement() {
        let mut session = session();
        let _ = session.add_component(ComponentKind::Sounds);
        assert_eq!(
            session.displace_component(ComponentKind::Sounds, 0, &[]),
            EditOutcome::Ignored,
        );
    }

    #[test]
    fn test_edits_are_blocked_while_generating() {
        let mut session = session();
        session.generating.store(true, Ordering::Release);

        assert_eq!(session.add_component(ComponentKind::Sprites), EditOutcome::Blocked);
        assert_eq!(
            session.remove_component(ComponentKind::Sprites, 0),
            EditOutcome::Blocked,
        );
        assert_eq!(session.request_bake(), false);
        assert!(session.actor.components.sprites.is_empty());
    }

    #[test]
    fn test_component_labels_resolve_references() {
        let mut session = session();
        let _ = session.add_component(ComponentKind::Children);
        session.actor.components.children[0].actor_id = "punk".to_string();
        let _ = session.add_component(ComponentKind::Sounds);
        session.actor.components.sounds[0].sound_id = "bgm".to_string();
        let _ = session.add_component(ComponentKind::Colliders);

        assert_eq!(
            session.component_label(ComponentKind::Children, 0).as_deref(),
            Some("Punk"),
        );
        assert_eq!(
            session.component_label(ComponentKind::Sounds, 0).as_deref(),
            Some("Main Theme"),
        );
        // unnamed collider falls back to a positional label
        assert_eq!(
            session.component_label(ComponentKind::Colliders, 0).as_deref(),
            Some("Collider 1"),
        );
    }

    #[test]
    fn test_edit_reapplies_frame_rules() {
        let mut session = session();
        let _ = session.add_component(ComponentKind::Sprites);
        let _ = session.add_component(ComponentKind::Animations);
        let files = (0..5).map(|i| format!("f{i}.png")).collect();
        assert!(session.set_sprite_files(0, files, Vec::new()).needs_rebake());
        assert_eq!(session.actor.animations.total_frames, 5);

        // removing the last animation collapses the frame count
        let outcome = session.remove_component(ComponentKind::Animations, 0);
        assert!(outcome.is_applied());
        assert_eq!(session.actor.animations.total_frames, 1);
    }

    #[test]
    fn test_emptying_sprite_files_clears_artifact() {
        let mut session = session();
        let _ = session.add_component(ComponentKind::Sprites);
        let files = vec!["a.png".to_string()];
        let _ = session.set_sprite_files(0, files, Vec::new());
        session.actor.components.sprites[0].image_cache =
            Some(crate::actor::component::SpriteImageData { images: Vec::new() });

        let outcome = session.set_sprite_files(0, Vec::new(), Vec::new());
        assert!(outcome.is_applied());
        assert!(session.actor.components.sprites[0].image_cache.is_none());
    }

    #[test]
    fn test_add_rejects_mismatched_default_record() {
        struct WrongDefaults;
        impl ComponentDefaults for WrongDefaults {
            fn generate_default(&self, _kind: ComponentKind) -> Option<ComponentRecord> {
                Some(ComponentRecord::Sprite(SpriteComponent::default()))
            }
        }
        let mut session = session();
        session.services.defaults = Arc::new(WrongDefaults);
        assert_eq!(session.add_component(ComponentKind::Sounds), EditOutcome::Ignored);
        assert!(session.actor.components.sounds.is_empty());
    }

    #[test]
    fn test_bake_roundtrip_through_session() {
        let mut session = session();
        let _ = session.add_component(ComponentKind::Sprites);
        let _ = session.set_sprite_files(0, vec!["a.png".to_string()], Vec::new());

        assert!(session.request_bake());
        let result = session.finish_bake().expect("pass pending");
        let outcome = result.expect("pass completed");
        assert!(outcome.failures.is_empty());
        assert!(session.actor.components.sprites[0].image_cache.is_some());
        assert!(!session.is_generating());
    }
}
