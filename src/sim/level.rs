/// World definition loading.
///
/// A world file (`*.world.json`) is a JSON record: grid shape, cell
/// pixel size, image size, and the rows × cols matrix of tile-type
/// indices (-1 = background). Matrix validation, decomposition and
/// catalog building all happen here; any failure aborts the load —
/// gameplay never starts on a partially built world.
///
/// An embedded demo world ships in the binary so the game runs with no
/// files on disk. World files are discovered in the configured worlds
/// directory.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::GameConfig;
use crate::domain::tile::TileType;
use crate::sim::assets::TraitTable;
use crate::sim::grid::{decompose, TileMatrix};
use crate::sim::world::{GameSession, RegionCatalog};

/// Screen x the hero is pinned to.
const SPAWN_X: f32 = 100.0;

/// How far the hero's box sinks into its floor. The floor probe needs
/// real overlap (touching boxes do not intersect), and the resolver's
/// floor-height exemption keeps the sunk-into floor from blocking.
const FLOOR_SINK: f32 = 1.0;

// ══════════════════════════════════════════════════════════════
// Errors
// ══════════════════════════════════════════════════════════════

/// Everything that can go wrong while constructing a world. All fatal:
/// the caller must not start gameplay on any of these.
#[derive(Debug)]
pub enum WorldError {
    /// Malformed matrix: empty, ragged, or dimensions that disagree
    /// with the declared shape.
    Shape { detail: String },
    /// A cell references a palette index that does not exist.
    UnknownTileType { index: i8, row: usize, col: usize },
    /// A materialized tile type has no asset traits registered.
    MissingTraits { tile: TileType },
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldError::Shape { detail } => write!(f, "malformed world matrix: {detail}"),
            WorldError::UnknownTileType { index, row, col } => {
                write!(f, "unknown tile type index {index} at ({row}, {col})")
            }
            WorldError::MissingTraits { tile } => {
                write!(f, "no asset traits registered for tile type '{}'", tile.name())
            }
            WorldError::Io(e) => write!(f, "world file read failed: {e}"),
            WorldError::Parse(e) => write!(f, "world file parse failed: {e}"),
        }
    }
}

impl std::error::Error for WorldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WorldError::Io(e) => Some(e),
            WorldError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for WorldError {
    fn from(e: std::io::Error) -> Self {
        WorldError::Io(e)
    }
}

impl From<serde_json::Error> for WorldError {
    fn from(e: serde_json::Error) -> Self {
        WorldError::Parse(e)
    }
}

// ══════════════════════════════════════════════════════════════
// World definition
// ══════════════════════════════════════════════════════════════

/// The serialized world record. Only these fields reach the sim; image
/// composition reads the same record on the presentation side.
#[derive(Clone, Debug, Deserialize)]
pub struct WorldDef {
    pub rows: usize,
    pub cols: usize,
    pub cell_w: u32,
    pub cell_h: u32,
    pub img_w: u32,
    pub img_h: u32,
    pub objects_matrix: Vec<Vec<i8>>,
}

impl WorldDef {
    pub fn from_path(path: &Path) -> Result<WorldDef, WorldError> {
        let text = std::fs::read_to_string(path)?;
        let def: WorldDef = serde_json::from_str(&text)?;
        Ok(def)
    }

    /// Validate the matrix against the declared shape and build the
    /// immutable tile matrix.
    pub fn tile_matrix(&self) -> Result<TileMatrix, WorldError> {
        if self.objects_matrix.len() != self.rows {
            return Err(WorldError::Shape {
                detail: format!(
                    "matrix has {} rows, header declares {}",
                    self.objects_matrix.len(),
                    self.rows
                ),
            });
        }
        if let Some(bad) = self.objects_matrix.iter().find(|r| r.len() != self.cols) {
            return Err(WorldError::Shape {
                detail: format!(
                    "matrix row has {} columns, header declares {}",
                    bad.len(),
                    self.cols
                ),
            });
        }
        TileMatrix::from_indices(&self.objects_matrix)
    }
}

// ══════════════════════════════════════════════════════════════
// Session construction
// ══════════════════════════════════════════════════════════════

/// Decompose a world definition and assemble a fresh session around it.
pub fn build_session(
    def: &WorldDef,
    name: &str,
    table: &TraitTable,
    config: &GameConfig,
) -> Result<GameSession, WorldError> {
    let matrix = def.tile_matrix()?;
    let regions = decompose(&matrix, TileType::Empty);
    log::info!(
        "world '{}': {} regions from a {}x{} matrix ({}x{} px)",
        name,
        regions.len(),
        matrix.rows(),
        matrix.cols(),
        def.img_w,
        def.img_h
    );

    // Anchor the world bottom to the viewport.
    let dy = config.screen.height as f32 - def.img_h as f32;
    let catalog = RegionCatalog::build(
        &regions,
        table,
        def.cell_w as f32,
        def.cell_h as f32,
        dy,
    )?;

    if catalog.is_empty() {
        log::warn!("world '{}' decomposed to no regions at all", name);
    }

    let anchor = spawn_anchor(&catalog, config);
    Ok(GameSession::new(catalog, anchor, name.to_string(), config))
}

/// Place the hero at the spawn column, resting on (slightly sunk into)
/// the topmost physical region under it. Falls back to a fixed height
/// when the column is open all the way down.
fn spawn_anchor(catalog: &RegionCatalog, config: &GameConfig) -> (f32, f32) {
    let cx = SPAWN_X + config.hero.width / 2.0;
    let floor_top = catalog
        .regions()
        .iter()
        .filter(|r| r.traits.physical && r.rect.left() <= cx && cx <= r.rect.right())
        .map(|r| r.rect.top())
        .fold(f32::INFINITY, f32::min);

    let y = if floor_top.is_finite() {
        floor_top - config.hero.height + FLOOR_SINK
    } else {
        log::warn!("no floor under spawn column, using fallback height");
        config.screen.height as f32 * 0.8
    };
    (SPAWN_X, y)
}

// ══════════════════════════════════════════════════════════════
// Discovery
// ══════════════════════════════════════════════════════════════

/// Scan the worlds directory for `*.world.json` files, sorted by name.
pub fn scan_worlds(dir: &Path) -> Vec<(String, PathBuf)> {
    let mut results = Vec::new();

    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return results,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if let Some(stem) = name.strip_suffix(".world.json") {
            results.push((stem.to_string(), path.clone()));
        }
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

// ══════════════════════════════════════════════════════════════
// Embedded demo world
// ══════════════════════════════════════════════════════════════

const DEMO_CELL_W: u32 = 40;
const DEMO_CELL_H: u32 = 30;

/// The built-in world: a shoreline with a watchtower, a pool to jump
/// across, a spike strip and a checkpoint.
///
/// Legend: '#' ground, 'P' platform, '~' water, '$' loot crate,
/// '!' deadly ground, '*' checkpoint ground, ' ' background.
pub fn embedded_world() -> (String, WorldDef) {
    let map: &[&str] = &[
        "                                                            ",
        "                                                            ",
        "                                                            ",
        "                                                            ",
        "                                                            ",
        "                                                            ",
        "                                                            ",
        "                                                            ",
        "                                                            ",
        "                                                            ",
        "                                                            ",
        "                  PPPPPP                                    ",
        "                                                            ",
        "                                                            ",
        "      PPPP                      PPPP                        ",
        "                                                            ",
        "                                                            ",
        "         $                $                  $              ",
        "             #                              PPP             ",
        "             #                                              ",
        "             #        $                                     ",
        "####################~~~~~##########!!!#########***##########",
        "####################~~~~~###################################",
        "####################~~~~~###################################",
        "############################################################",
    ];

    let rows = map.len();
    let cols = map[0].len();
    let objects_matrix = map
        .iter()
        .map(|row| row.chars().map(demo_cell_index).collect())
        .collect();

    let def = WorldDef {
        rows,
        cols,
        cell_w: DEMO_CELL_W,
        cell_h: DEMO_CELL_H,
        img_w: cols as u32 * DEMO_CELL_W,
        img_h: rows as u32 * DEMO_CELL_H,
        objects_matrix,
    };
    ("Shorebound Cove".to_string(), def)
}

fn demo_cell_index(ch: char) -> i8 {
    let tile = match ch {
        '#' => TileType::Ground,
        'P' => TileType::Platform,
        '~' => TileType::Water,
        '$' => TileType::LootCrate,
        '!' => TileType::DeadlyGround,
        '*' => TileType::CheckpointGround,
        _ => return -1,
    };
    tile.index()
}
