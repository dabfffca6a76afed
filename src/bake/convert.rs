//! Source-image conversion
//!
//! Turns sprite source files into console tile data: 2-bpp 8x8 tiles, maps
//! referencing them, and per-frame bookkeeping for animations. The editor
//! shell may substitute its own converter (e.g. one talking to an external
//! toolchain); `TileGridConverter` is the stock implementation.

use std::collections::HashMap;
use std::fmt;

use image::GenericImageView;

use crate::actor::component::{AnimationMeta, TexturePadding, TileCompression};

/// Pixels per tile edge
pub const TILE_SIZE: usize = 8;
/// Encoded words per 2-bpp 8x8 tile
pub const WORDS_PER_TILE: usize = 4;
/// Map entries address at most this many tiles
const MAX_MAP_TILES: usize = 0x0800;

/// Animation parameters of a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationParams {
    /// The actor has animation components
    pub is_animation: bool,
    /// Each source file is an independent frame
    pub individual_files: bool,
    /// Frame count driving per-frame bookkeeping
    pub frames: u32,
}

/// Map/tileset generation parameters of a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilesetParams {
    /// Tile set is shared between the two eyes of a stereo pair
    pub shared: bool,
    pub compression: TileCompression,
    /// Fold tiles that match an existing tile when flipped
    pub reduce_flipped: bool,
    /// Fold tiles that match an existing tile exactly
    pub reduce_unique: bool,
}

/// Sprite display/processing settings forwarded to the converter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayParams {
    /// Palette slot baked into map entries (0-3)
    pub palette: u8,
    /// Blank pixels added around each frame before tiling
    pub padding: TexturePadding,
}

/// One conversion request, covering a single output image
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertRequest {
    pub files: Vec<String>,
    /// Generated base name (carries the L/R suffix for stereo pairs)
    pub name: String,
    pub animation: AnimationParams,
    pub tileset: TilesetParams,
    pub display: DisplayParams,
}

/// Uncompressed tile set produced by a conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTileSet {
    /// 8x8 tile count (before any tile-data compression)
    pub count: u32,
    /// Encoded tile words
    pub data: Vec<u32>,
    /// Per-frame start tile index, for individual-file animations
    pub frame_offsets: Option<Vec<u32>>,
}

/// Uncompressed map produced by a conversion
///
/// Entry layout: bits 0-10 tile index, bit 12 vertical flip, bit 13
/// horizontal flip, bits 14-15 palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTileMap {
    /// Width in tiles
    pub width: u32,
    /// Height in tiles
    pub height: u32,
    pub data: Vec<u16>,
}

/// Result of one conversion
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOutput {
    pub tiles: RawTileSet,
    /// One map per frame (individual files), else a single map
    pub maps: Vec<RawTileMap>,
    pub animation: Option<AnimationMeta>,
}

/// Conversion failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// Source file could not be read or decoded
    Decode(String),
    /// Source geometry cannot be tiled (mismatched frames, no files, overflow)
    Geometry(String),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::Decode(msg) => write!(f, "decode error: {}", msg),
            ConvertError::Geometry(msg) => write!(f, "geometry error: {}", msg),
        }
    }
}

impl std::error::Error for ConvertError {}

/// Image-conversion collaborator
pub trait ImageConverter: Send + Sync {
    fn convert(&self, request: &ConvertRequest) -> Result<ConversionOutput, ConvertError>;
}

/// Stock converter: quantizes source images to 2-bpp shades and slices them
/// into deduplicated 8x8 tiles
///
/// Each eye of a stereo pair is baked independently; sharing the tile
/// allocation between eyes is the engine packer's concern.
#[derive(Debug, Default)]
pub struct TileGridConverter;

/// One quantized source frame, padded to whole tiles
struct ShadeFrame {
    width_tiles: usize,
    height_tiles: usize,
    /// Row-major 2-bit shades
    shades: Vec<u8>,
}

impl ShadeFrame {
    fn tile(&self, tx: usize, ty: usize) -> [u8; TILE_SIZE * TILE_SIZE] {
        let width = self.width_tiles * TILE_SIZE;
        let mut out = [0u8; TILE_SIZE * TILE_SIZE];
        for y in 0..TILE_SIZE {
            for x in 0..TILE_SIZE {
                out[y * TILE_SIZE + x] =
                    self.shades[(ty * TILE_SIZE + y) * width + tx * TILE_SIZE + x];
            }
        }
        out
    }
}

impl ImageConverter for TileGridConverter {
    fn convert(&self, request: &ConvertRequest) -> Result<ConversionOutput, ConvertError> {
        if request.files.is_empty() {
            return Err(ConvertError::Geometry("no source files".to_string()));
        }

        // one frame per file when frames are individual, else the first
        // file is the whole (sheet) image
        let sources: &[String] = if request.animation.individual_files {
            &request.files
        } else {
            &request.files[..1]
        };

        let mut frames = Vec::with_capacity(sources.len());
        for path in sources {
            frames.push(load_frame(path, request.display.padding)?);
        }
        let (width_tiles, height_tiles) = (frames[0].width_tiles, frames[0].height_tiles);
        if frames
            .iter()
            .any(|f| f.width_tiles != width_tiles || f.height_tiles != height_tiles)
        {
            return Err(ConvertError::Geometry(format!(
                "{}: animation frames must share dimensions",
                request.name
            )));
        }
        // sheet animations stack their frames vertically
        if request.animation.is_animation
            && !request.animation.individual_files
            && request.animation.frames > 1
            && height_tiles % request.animation.frames as usize != 0
        {
            return Err(ConvertError::Geometry(format!(
                "{}: sheet height does not divide into {} frames",
                request.name, request.animation.frames
            )));
        }

        let mut tiles: Vec<[u32; WORDS_PER_TILE]> = Vec::new();
        let mut seen: HashMap<[u32; WORDS_PER_TILE], u16> = HashMap::new();
        let mut maps = Vec::with_capacity(frames.len());
        let mut frame_offsets = Vec::with_capacity(frames.len());
        let mut largest_frame = 0u32;

        for frame in &frames {
            frame_offsets.push(tiles.len() as u32);
            let added_before = tiles.len();
            let mut map_data = Vec::with_capacity(width_tiles * height_tiles);

            for ty in 0..height_tiles {
                for tx in 0..width_tiles {
                    let pixels = frame.tile(tx, ty);
                    let (index, hflip, vflip) =
                        resolve_tile(&pixels, &request.tileset, &mut tiles, &mut seen)?;
                    map_data.push(map_entry(index, hflip, vflip, request.display.palette));
                }
            }

            maps.push(RawTileMap {
                width: width_tiles as u32,
                height: height_tiles as u32,
                data: map_data,
            });
            largest_frame = largest_frame.max((tiles.len() - added_before) as u32);
        }

        let count = tiles.len() as u32;
        let words: Vec<u32> = tiles.into_iter().flatten().collect();
        let data = match request.tileset.compression {
            TileCompression::None => words,
            TileCompression::Rle => rle_encode(&words),
        };

        let animation = request.animation.is_animation.then(|| AnimationMeta {
            largest_frame: request
                .animation
                .individual_files
                .then_some(largest_frame),
        });

        Ok(ConversionOutput {
            tiles: RawTileSet {
                count,
                data,
                frame_offsets: request.animation.individual_files.then_some(frame_offsets),
            },
            maps,
            animation,
        })
    }
}

/// Decode and quantize one source file
fn load_frame(path: &str, padding: TexturePadding) -> Result<ShadeFrame, ConvertError> {
    let img = image::open(path).map_err(|e| ConvertError::Decode(format!("{}: {}", path, e)))?;
    let (width, height) = img.dimensions();
    let luma = img.to_luma8();

    let padded_w = width as usize + 2 * padding.x as usize;
    let padded_h = height as usize + 2 * padding.y as usize;
    let width_tiles = padded_w.div_ceil(TILE_SIZE);
    let height_tiles = padded_h.div_ceil(TILE_SIZE);

    let full_w = width_tiles * TILE_SIZE;
    let full_h = height_tiles * TILE_SIZE;
    let mut shades = vec![0u8; full_w * full_h];
    for (x, y, pixel) in luma.enumerate_pixels() {
        let sx = x as usize + padding.x as usize;
        let sy = y as usize + padding.y as usize;
        // 4 luminance levels, the console's whole gamut
        shades[sy * full_w + sx] = pixel.0[0] >> 6;
    }

    Ok(ShadeFrame {
        width_tiles,
        height_tiles,
        shades,
    })
}

/// Find or append the tile for a cell, honoring the reduce flags
fn resolve_tile(
    pixels: &[u8; TILE_SIZE * TILE_SIZE],
    params: &TilesetParams,
    tiles: &mut Vec<[u32; WORDS_PER_TILE]>,
    seen: &mut HashMap<[u32; WORDS_PER_TILE], u16>,
) -> Result<(u16, bool, bool), ConvertError> {
    let encoded = encode_tile(pixels);
    if params.reduce_unique {
        if let Some(&index) = seen.get(&encoded) {
            return Ok((index, false, false));
        }
    }
    if params.reduce_flipped {
        let flipped_h = encode_tile(&flip_h(pixels));
        if let Some(&index) = seen.get(&flipped_h) {
            return Ok((index, true, false));
        }
        let flipped_v = encode_tile(&flip_v(pixels));
        if let Some(&index) = seen.get(&flipped_v) {
            return Ok((index, false, true));
        }
        let flipped_hv = encode_tile(&flip_v(&flip_h(pixels)));
        if let Some(&index) = seen.get(&flipped_hv) {
            return Ok((index, true, true));
        }
    }

    if tiles.len() >= MAX_MAP_TILES {
        return Err(ConvertError::Geometry(format!(
            "tile set exceeds {} addressable tiles",
            MAX_MAP_TILES
        )));
    }
    let index = tiles.len() as u16;
    tiles.push(encoded);
    seen.entry(encoded).or_insert(index);
    Ok((index, false, false))
}

/// Pack an 8x8 shade tile into four words, two 2-bpp rows per word
fn encode_tile(pixels: &[u8; TILE_SIZE * TILE_SIZE]) -> [u32; WORDS_PER_TILE] {
    let mut rows = [0u16; TILE_SIZE];
    for (y, row) in rows.iter_mut().enumerate() {
        for x in 0..TILE_SIZE {
            *row |= ((pixels[y * TILE_SIZE + x] & 0x03) as u16) << (x * 2);
        }
    }
    let mut words = [0u32; WORDS_PER_TILE];
    for (i, word) in words.iter_mut().enumerate() {
        *word = rows[i * 2] as u32 | ((rows[i * 2 + 1] as u32) << 16);
    }
    words
}

fn flip_h(pixels: &[u8; TILE_SIZE * TILE_SIZE]) -> [u8; TILE_SIZE * TILE_SIZE] {
    let mut out = [0u8; TILE_SIZE * TILE_SIZE];
    for y in 0..TILE_SIZE {
        for x in 0..TILE_SIZE {
            out[y * TILE_SIZE + x] = pixels[y * TILE_SIZE + (TILE_SIZE - 1 - x)];
        }
    }
    out
}

fn flip_v(pixels: &[u8; TILE_SIZE * TILE_SIZE]) -> [u8; TILE_SIZE * TILE_SIZE] {
    let mut out = [0u8; TILE_SIZE * TILE_SIZE];
    for y in 0..TILE_SIZE {
        for x in 0..TILE_SIZE {
            out[y * TILE_SIZE + x] = pixels[(TILE_SIZE - 1 - y) * TILE_SIZE + x];
        }
    }
    out
}

fn map_entry(index: u16, hflip: bool, vflip: bool, palette: u8) -> u16 {
    let mut entry = index & 0x07FF;
    if vflip {
        entry |= 1 << 12;
    }
    if hflip {
        entry |= 1 << 13;
    }
    entry | (((palette & 0x03) as u16) << 14)
}

/// Run-length encode tile words as (run, word) pairs
fn rle_encode(words: &[u32]) -> Vec<u32> {
    let mut out = Vec::new();
    let mut iter = words.iter().copied();
    let Some(mut current) = iter.next() else {
        return out;
    };
    let mut run = 1u32;
    for word in iter {
        if word == current {
            run += 1;
        } else {
            out.push(run);
            out.push(current);
            current = word;
            run = 1;
        }
    }
    out.push(run);
    out.push(current);
    out
}
