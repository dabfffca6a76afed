//! Sprite asset baking
//!
//! Derives renderable tile/map artifacts from each sprite's source files and
//! settings. A pass walks the sprite list in order; within a sprite the (up
//! to two) eye conversions run concurrently. At most one pass is in flight
//! at a time: requests made while generating are dropped, not queued.
//!
//! Execution follows a fire-and-poll model: `start_bake` snapshots the actor
//! and runs the pass on a background thread, returning a `PendingBake` the
//! session polls each frame.
//!
//! # Module Organization
//!
//! - `convert` - the image-conversion collaborator and stock tile converter
//! - `compress` - the payload-compression collaborator

pub mod compress;
pub mod convert;

use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use log::{debug, warn};

use crate::actor::component::{BakedImage, SpriteComponent, SpriteImageData, TileMap, TileSet};
use crate::actor::consistency::{is_multi_file_animation, most_files_on_sprite};
use crate::actor::definition::ActorDefinition;
use crate::services::ProgressSink;

use compress::{CompressError, PayloadCompressor};
use convert::{
    AnimationParams, ConvertError, ConvertRequest, DisplayParams, ImageConverter, TilesetParams,
};

/// Collaborators the pipeline runs against
#[derive(Clone)]
pub struct BakeServices {
    pub converter: Arc<dyn ImageConverter>,
    pub compressor: Arc<dyn PayloadCompressor>,
    pub progress: Arc<dyn ProgressSink>,
}

/// Baking failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BakeError {
    Convert(ConvertError),
    Compress(CompressError),
    /// The bake thread died without reporting a result
    Worker(String),
}

impl fmt::Display for BakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BakeError::Convert(e) => write!(f, "conversion failed: {}", e),
            BakeError::Compress(e) => write!(f, "compression failed: {}", e),
            BakeError::Worker(msg) => write!(f, "bake worker failed: {}", msg),
        }
    }
}

impl std::error::Error for BakeError {}

impl From<ConvertError> for BakeError {
    fn from(e: ConvertError) -> Self {
        BakeError::Convert(e)
    }
}

impl From<CompressError> for BakeError {
    fn from(e: CompressError) -> Self {
        BakeError::Compress(e)
    }
}

/// A sprite whose conversion failed during a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteFailure {
    pub sprite: usize,
    pub name: String,
    pub error: BakeError,
}

/// Result of a completed pass
///
/// `artifacts` carries one entry per processed sprite: `Some` overwrites the
/// sprite's cache slot, `None` clears it (no source files). Sprites that
/// failed appear in `failures` instead and keep their previous artifact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BakeOutcome {
    pub artifacts: Vec<(usize, Option<SpriteImageData>)>,
    pub failures: Vec<SpriteFailure>,
}

impl BakeOutcome {
    /// Write the derived artifacts back onto a snapshot
    pub fn apply_to(&self, actor: &mut ActorDefinition) {
        for (index, artifact) in &self.artifacts {
            if let Some(sprite) = actor.components.sprites.get_mut(*index) {
                sprite.image_cache = artifact.clone();
            }
        }
    }
}

// =============================================================================
// Group resolution
// =============================================================================

/// One conversion unit: the files baked into a single eye image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionGroup {
    pub files: Vec<String>,
    /// Generated base name; carries the L/R suffix for stereo pairs
    pub name: String,
    /// Artifact slot: 0 = primary/mono/left, 1 = stereo right
    pub slot: usize,
    pub stereo: bool,
}

/// Resolve the file groups of one sprite
///
/// Slot 0 takes the primary files, slot 1 the secondary files. Exactly one
/// file in each list forms a stereo pair sharing a tile set; the L/R name
/// suffix applies only in that case.
pub fn resolve_groups(sprite: &SpriteComponent) -> Vec<ConversionGroup> {
    if sprite.files.len() == 1 && sprite.files2.len() == 1 {
        return vec![
            ConversionGroup {
                files: sprite.files.clone(),
                name: format!("{}L", sanitized_stem(&sprite.files[0])),
                slot: 0,
                stereo: true,
            },
            ConversionGroup {
                files: sprite.files2.clone(),
                name: format!("{}R", sanitized_stem(&sprite.files2[0])),
                slot: 1,
                stereo: true,
            },
        ];
    }

    let mut groups = Vec::new();
    if !sprite.files.is_empty() {
        groups.push(ConversionGroup {
            files: sprite.files.clone(),
            name: sanitized_stem(&sprite.files[0]),
            slot: 0,
            stereo: false,
        });
    }
    if !sprite.files2.is_empty() {
        groups.push(ConversionGroup {
            files: sprite.files2.clone(),
            name: sanitized_stem(&sprite.files2[0]),
            slot: 1,
            stereo: false,
        });
    }
    groups
}

/// Alphanumeric file stem used as the generated base name
fn sanitized_stem(file: &str) -> String {
    let stem = Path::new(file)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let sanitized: String = stem.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if sanitized.is_empty() {
        "Image".to_string()
    } else {
        sanitized
    }
}

/// Whether a sprite's conversion should fold duplicate/flipped tiles
///
/// Without animations the sprite opts in; with animations, only multi-file
/// animations can fold (sheet frames must keep their tile layout).
pub fn optimize_tiles(actor: &ActorDefinition, sprite: &SpriteComponent) -> bool {
    let has_animations = !actor.components.animations.is_empty();
    if has_animations {
        is_multi_file_animation(actor)
    } else {
        sprite.optimize_tiles
    }
}

/// Build the converter request for one group
fn request_for_group(
    actor: &ActorDefinition,
    sprite: &SpriteComponent,
    group: &ConversionGroup,
) -> ConvertRequest {
    let multi_file = is_multi_file_animation(actor);
    let has_animations = !actor.components.animations.is_empty();
    let optimize = optimize_tiles(actor, sprite);

    ConvertRequest {
        files: group.files.clone(),
        name: group.name.clone(),
        animation: AnimationParams {
            is_animation: has_animations,
            individual_files: multi_file,
            frames: if multi_file {
                most_files_on_sprite(actor)
            } else {
                actor.animations.total_frames
            },
        },
        tileset: TilesetParams {
            shared: group.stereo,
            compression: sprite.compression,
            reduce_flipped: optimize,
            reduce_unique: optimize,
        },
        display: DisplayParams {
            palette: sprite.palette,
            padding: sprite.padding,
        },
    }
}

// =============================================================================
// The pass
// =============================================================================

/// Run one bake pass over a snapshot
///
/// Sprites are processed in array order; a sprite's eye conversions run
/// concurrently. Failures are collected per sprite and never abort the
/// remaining sprites.
pub fn run_bake_pass(actor: &ActorDefinition, services: &BakeServices) -> BakeOutcome {
    let sprites = &actor.components.sprites;
    let total = 2 * sprites.len() as u32;
    let mut tick = 0u32;
    let mut outcome = BakeOutcome::default();

    for (index, sprite) in sprites.iter().enumerate() {
        tick += 1;
        services.progress.report(tick, total);

        if !sprite.has_source_files() {
            // stale artifacts do not outlive their sources
            outcome.artifacts.push((index, None));
            tick += 1;
            services.progress.report(tick, total);
            continue;
        }

        let groups = resolve_groups(sprite);
        let requests: Vec<ConvertRequest> = groups
            .iter()
            .map(|group| request_for_group(actor, sprite, group))
            .collect();
        debug!(
            "baking sprite {} ({} group{})",
            index,
            groups.len(),
            if groups.len() == 1 { "" } else { "s" },
        );

        let results: Vec<Result<BakedImage, BakeError>> = thread::scope(|scope| {
            let handles: Vec<_> = requests
                .iter()
                .map(|request| scope.spawn(move || bake_group(services, request)))
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle.join().unwrap_or_else(|_| {
                        Err(BakeError::Worker("conversion thread panicked".to_string()))
                    })
                })
                .collect()
        });

        let mut images = Vec::with_capacity(results.len());
        let mut failure = None;
        for result in results {
            match result {
                Ok(image) => images.push(image),
                Err(error) => failure = Some(error),
            }
        }

        match failure {
            Some(error) => {
                warn!("sprite {} bake failed: {}", index, error);
                outcome.failures.push(SpriteFailure {
                    sprite: index,
                    name: sprite.name.clone().unwrap_or_default(),
                    error,
                });
            }
            None => outcome
                .artifacts
                .push((index, Some(SpriteImageData { images }))),
        }

        tick += 1;
        services.progress.report(tick, total);
    }

    outcome
}

/// Convert and compress one group into a baked image
fn bake_group(services: &BakeServices, request: &ConvertRequest) -> Result<BakedImage, BakeError> {
    let raw = services.converter.convert(request)?;

    let tiles_data = compress_payload(services, &raw.tiles.data)?;
    let frame_offsets = match &raw.tiles.frame_offsets {
        Some(offsets) => Some(compress_payload(services, offsets)?),
        None => None,
    };
    let maps = raw
        .maps
        .iter()
        .map(|map| {
            Ok(TileMap {
                width: map.width,
                height: map.height,
                data: compress_payload(services, &map.data)?,
            })
        })
        .collect::<Result<Vec<_>, BakeError>>()?;

    Ok(BakedImage {
        name: request.name.clone(),
        tiles: TileSet {
            count: raw.tiles.count,
            data: tiles_data,
            frame_offsets,
        },
        maps,
        animation: raw.animation,
    })
}

fn compress_payload<T: serde::Serialize>(
    services: &BakeServices,
    payload: &T,
) -> Result<String, BakeError> {
    let value = serde_json::to_value(payload)
        .map_err(|e| BakeError::Compress(CompressError::Serialize(e.to_string())))?;
    Ok(services.compressor.compress(&value)?)
}

// =============================================================================
// Fire-and-poll execution
// =============================================================================

/// Pollable handle to an in-flight bake pass
pub struct PendingBake {
    receiver: Receiver<Result<BakeOutcome, BakeError>>,
    result: Option<Result<BakeOutcome, BakeError>>,
    gate: Arc<AtomicBool>,
}

impl PendingBake {
    /// Check whether the pass has finished (polls the worker channel)
    pub fn is_complete(&mut self) -> bool {
        if self.result.is_some() {
            return true;
        }
        match self.receiver.try_recv() {
            Ok(result) => {
                self.result = Some(result);
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                // worker died before reporting; release the gate it left set
                self.gate.store(false, Ordering::Release);
                self.result = Some(Err(BakeError::Worker(
                    "bake thread terminated without a result".to_string(),
                )));
                true
            }
        }
    }

    /// Take the result if the pass has finished
    pub fn take(mut self) -> Option<Result<BakeOutcome, BakeError>> {
        if self.result.is_none() {
            if let Ok(result) = self.receiver.try_recv() {
                self.result = Some(result);
            }
        }
        self.result.take()
    }

    /// Block until the pass finishes
    pub fn wait(mut self) -> Result<BakeOutcome, BakeError> {
        if let Some(result) = self.result.take() {
            return result;
        }
        match self.receiver.recv() {
            Ok(result) => result,
            Err(_) => {
                self.gate.store(false, Ordering::Release);
                Err(BakeError::Worker(
                    "bake thread terminated without a result".to_string(),
                ))
            }
        }
    }
}

/// Start a bake pass against a snapshot of `actor`
///
/// Returns `None` (and drops the request) when a pass is already generating.
/// The gate is released by the worker once the pass runs to completion; there
/// is no cancellation.
pub fn start_bake(
    actor: &ActorDefinition,
    services: BakeServices,
    gate: Arc<AtomicBool>,
) -> Option<PendingBake> {
    if gate
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        warn!("bake request dropped: a pass is already generating");
        return None;
    }

    let snapshot = actor.clone();
    let (sender, receiver) = channel();
    let worker_gate = Arc::clone(&gate);
    thread::spawn(move || {
        let outcome = run_bake_pass(&snapshot, &services);
        worker_gate.store(false, Ordering::Release);
        let _ = sender.send(Ok(outcome));
    });

    Some(PendingBake {
        receiver,
        result: None,
        gate,
    })
}
