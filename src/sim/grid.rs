/// Tile-matrix → rectangle decomposition.
///
/// Two passes, each merging along a single axis:
///   1. per-column scan: maximal vertical runs of one constant type,
///      skipping background cells
///   2. left-to-right sweep: a run extends an open rectangle when an
///      adjacent candidate matches it exactly on (type, y, height);
///      otherwise it opens a new one-column rectangle. Candidates not
///      extended by the current occupied column are finalized.
///
/// Because the second pass matches on exact (y, height), runs that are
/// visually contiguous but offset by a row never merge. That can leave
/// more rectangles than a full maximal-rectangle cover would — accepted
/// behavior, kept as-is so decomposition output stays stable.
///
/// Output order is finalization order; callers must not depend on it.

use crate::domain::tile::TileType;
use crate::sim::level::WorldError;

/// One cell of the authoring matrix. `Unassigned` is the -1 sentinel in
/// serialized form; it is distinct from `TileType::Empty` and is never
/// materialized as a region.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cell {
    Unassigned,
    Type(TileType),
}

/// Rectangular grid of cells, immutable once constructed. Shape and
/// palette membership are validated up front so the decomposition scan
/// itself is total.
#[derive(Clone, Debug)]
pub struct TileMatrix {
    cells: Vec<Vec<Cell>>,
    rows: usize,
    cols: usize,
}

impl TileMatrix {
    /// Build from serialized palette indices. Rejects empty or ragged
    /// input and any index outside the palette (-1 excepted: it is the
    /// background sentinel).
    pub fn from_indices(rows: &[Vec<i8>]) -> Result<TileMatrix, WorldError> {
        if rows.is_empty() || rows[0].is_empty() {
            return Err(WorldError::Shape {
                detail: "matrix has no cells".to_string(),
            });
        }
        let cols = rows[0].len();
        for (r, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(WorldError::Shape {
                    detail: format!(
                        "row {} has {} columns, expected {}",
                        r,
                        row.len(),
                        cols
                    ),
                });
            }
        }

        let mut cells = Vec::with_capacity(rows.len());
        for (r, row) in rows.iter().enumerate() {
            let mut out = Vec::with_capacity(cols);
            for (c, &idx) in row.iter().enumerate() {
                let cell = if idx == -1 {
                    Cell::Unassigned
                } else {
                    match TileType::from_index(idx) {
                        Some(t) => Cell::Type(t),
                        None => {
                            return Err(WorldError::UnknownTileType {
                                index: idx,
                                row: r,
                                col: c,
                            })
                        }
                    }
                };
                out.push(cell);
            }
            cells.push(out);
        }

        Ok(TileMatrix {
            rows: cells.len(),
            cols,
            cells,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }
}

/// A decomposed rectangle, in tile units.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Region {
    pub tile: TileType,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// Exclusive right column.
    fn right(&self) -> u32 {
        self.x + self.width
    }
}

/// One maximal vertical run within a single column (pass 1 output).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct ColumnRun {
    tile: TileType,
    x: u32,
    y: u32,
    height: u32,
}

/// Decompose a matrix into regions. Cells equal to `background` (and
/// unassigned cells) produce nothing.
pub fn decompose(matrix: &TileMatrix, background: TileType) -> Vec<Region> {
    let columns = vertical_runs(matrix, background);
    merge_columns(&columns)
}

/// Pass 1: per-column maximal runs. Columns containing only background
/// contribute no entry at all.
fn vertical_runs(matrix: &TileMatrix, background: TileType) -> Vec<Vec<ColumnRun>> {
    let mut columns = Vec::new();

    for c in 0..matrix.cols() {
        let mut runs = Vec::new();
        let mut slow = 0;
        while slow < matrix.rows() {
            let tile = match matrix.get(slow, c) {
                Cell::Type(t) if t != background => t,
                _ => {
                    slow += 1;
                    continue;
                }
            };
            // fast runner: end of the constant-type run
            let mut fast = slow + 1;
            while fast < matrix.rows() && matrix.get(fast, c) == Cell::Type(tile) {
                fast += 1;
            }
            runs.push(ColumnRun {
                tile,
                x: c as u32,
                y: slow as u32,
                height: (fast - slow) as u32,
            });
            slow = fast;
        }
        if !runs.is_empty() {
            columns.push(runs);
        }
    }
    columns
}

/// Pass 2: horizontal merge. A run extends an open candidate only when
/// the candidate ends in the directly adjacent column and matches on
/// (type, y, height) exactly — a gap of background columns always
/// finalizes, so no region ever spans a background cell.
fn merge_columns(columns: &[Vec<ColumnRun>]) -> Vec<Region> {
    let mut finished: Vec<Region> = Vec::new();
    let mut open: Vec<Region> = Vec::new();

    for runs in columns {
        let x = runs[0].x;

        for run in runs {
            let adjacent = open.iter().position(|r| {
                r.right() == x && r.y == run.y && r.height == run.height && r.tile == run.tile
            });
            match adjacent {
                Some(i) => open[i].width += 1,
                None => open.push(Region {
                    tile: run.tile,
                    x,
                    y: run.y,
                    width: 1,
                    height: run.height,
                }),
            }
        }

        // Candidates that received no extension this column are done.
        let mut i = 0;
        while i < open.len() {
            if open[i].right() < x + 1 {
                finished.push(open.remove(i));
            } else {
                i += 1;
            }
        }
    }

    finished.extend(open);
    finished
}
