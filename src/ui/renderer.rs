/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// The virtual pixel screen (config `[screen]`) is mapped onto the
/// terminal grid each frame:
///   1. Build the next frame into `front` (array of Cell)
///   2. Compare with `back` (previous frame)
///   3. Emit terminal commands only for cells that changed
///   4. Batch with `queue!`, flush once, swap buffers
///
/// Pure presentation: reads the session, never mutates it.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::collision::StaticRegion;
use crate::domain::tile::{RegionStyle, TileType};
use crate::sim::world::{GameSession, Phase};

const BASE_BG: Color = Color::Rgb { r: 18, g: 22, b: 32 };

/// Rows reserved above the playfield for the HUD.
const HUD_ROWS: usize = 1;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: Color::White };
    /// Differs from every real cell so the first diff repaints all.
    const INVALID: Cell = Cell { ch: '\0', fg: Color::Magenta };
}

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    #[inline]
    fn set(&mut self, x: usize, y: usize, ch: char, fg: Color) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = Cell { ch, fg };
        }
    }

    #[inline]
    fn get(&self, x: usize, y: usize) -> Cell {
        self.cells[y * self.width + x]
    }

    fn text(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i, y, ch, fg);
        }
    }

    fn text_centered(&mut self, y: usize, s: &str, fg: Color) {
        let x = self.width.saturating_sub(s.chars().count()) / 2;
        self.text(x, y, s, fg);
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, session: &GameSession) -> io::Result<()> {
        // Terminal resize forces a full repaint
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))?;
        }

        // Phase change → clean transition
        if self.last_phase != Some(session.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(session.phase);
        }

        self.front.clear();
        match session.phase {
            Phase::Title => self.compose_title(session),
            Phase::Playing => self.compose_game(session),
            Phase::Dead => {
                self.compose_game(session);
                self.compose_dead_overlay();
            }
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Composition ──

    fn compose_title(&mut self, session: &GameSession) {
        let mid = self.front.height / 2;
        self.front
            .text_centered(mid.saturating_sub(3), "S H O R E B O U N D", Color::Cyan);
        self.front
            .text_centered(mid.saturating_sub(1), &session.world_name, Color::White);
        self.front.text_centered(
            mid + 1,
            "left/right walk · shift runs · space jumps",
            Color::Grey,
        );
        self.front
            .text_centered(mid + 2, "enter starts · q quits", Color::Grey);
    }

    fn compose_game(&mut self, session: &GameSession) {
        let draw_h = self.front.height.saturating_sub(HUD_ROWS);
        if draw_h == 0 || self.front.width == 0 {
            return;
        }

        // Virtual pixels per terminal cell
        let px_x = session.screen_w as f32 / self.front.width as f32;
        let px_y = session.screen_h as f32 / draw_h as f32;

        for region in session.catalog.regions() {
            self.blit_region(region, px_x, px_y, draw_h);
        }

        // Hero at its fixed anchor
        let bbox = session.hero_bbox();
        let (c0, c1) = col_span(bbox.left(), bbox.right(), px_x, self.front.width);
        let (r0, r1) = row_span(bbox.top(), bbox.bottom(), px_y, draw_h);
        for r in r0..r1 {
            for c in c0..c1 {
                self.front.set(c, r + HUD_ROWS, '@', Color::White);
            }
        }

        self.compose_hud(session);
    }

    fn blit_region(&mut self, region: &StaticRegion, px_x: f32, px_y: f32, draw_h: usize) {
        let rect = &region.rect;
        if rect.right() < 0.0 || rect.bottom() < 0.0 {
            return;
        }
        let (c0, c1) = col_span(rect.left(), rect.right(), px_x, self.front.width);
        let (r0, r1) = row_span(rect.top(), rect.bottom(), px_y, draw_h);
        let (ch, fg) = tile_glyph(region.tile);
        let fg = if region.traits.transparent { dim(fg) } else { fg };
        for r in r0..r1 {
            for c in c0..c1 {
                // Top-capped regions draw their first row distinctly,
                // echoing the top-image / bottom-filler split.
                let ch = if r == r0 && region.style == RegionStyle::BottomRepeating {
                    '▀'
                } else {
                    ch
                };
                self.front.set(c, r + HUD_ROWS, ch, fg);
            }
        }
    }

    fn compose_hud(&mut self, session: &GameSession) {
        let hud = format!(
            " {} · crates {} · {} · tick {}",
            session.world_name,
            session.crates_collected,
            if session.grounded { "grounded" } else { "airborne" },
            session.tick,
        );
        self.front.text(0, 0, &hud, Color::Grey);
    }

    fn compose_dead_overlay(&mut self) {
        let mid = self.front.height / 2;
        self.front
            .text_centered(mid.saturating_sub(1), "THE HERO PERISHED", Color::Red);
        self.front
            .text_centered(mid + 1, "enter restarts from the last checkpoint", Color::Grey);
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(
            self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(BASE_BG)
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }
}

// ── Mapping helpers ──

fn col_span(left: f32, right: f32, px_x: f32, max_w: usize) -> (usize, usize) {
    let c0 = (left / px_x).floor().max(0.0) as usize;
    let c1 = ((right / px_x).ceil().max(0.0) as usize).min(max_w);
    (c0.min(max_w), c1)
}

fn row_span(top: f32, bottom: f32, px_y: f32, max_h: usize) -> (usize, usize) {
    let r0 = (top / px_y).floor().max(0.0) as usize;
    let r1 = ((bottom / px_y).ceil().max(0.0) as usize).min(max_h);
    (r0.min(max_h), r1)
}

/// Terminal stand-in for transparency.
fn dim(c: Color) -> Color {
    match c {
        Color::Blue => Color::DarkBlue,
        Color::Magenta => Color::DarkMagenta,
        Color::Cyan => Color::DarkCyan,
        other => other,
    }
}

fn tile_glyph(tile: TileType) -> (char, Color) {
    match tile {
        TileType::Ground => ('█', Color::DarkGreen),
        TileType::Platform => ('▓', Color::DarkYellow),
        TileType::Water => ('~', Color::Blue),
        TileType::LootCrate => ('$', Color::Magenta),
        TileType::DeadlyGround => ('^', Color::Red),
        TileType::CheckpointGround => ('▒', Color::Cyan),
        TileType::Empty => (' ', Color::White),
    }
}
