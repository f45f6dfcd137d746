/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Screen layout (terminal cells):
///
///   ┌──────────┐ ┌──────────┐ ┌──────────┐
///   │   2048   │ │  SCORE   │ │   BEST   │
///   └──────────┘ └──────────┘ └──────────┘
///   R: new game
///
///   board: GAP*(N+1) + TILE*N in each axis
///
///   help line

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::tile::{Position, Value};
use crate::sim::world::{Game, Phase};
use super::anim::Animation;

// ── Palette ──

const fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb { r, g, b }
}

const COLOR_WHITE: Color = rgb(249, 246, 242);
const COLOR_GREY: Color = rgb(119, 110, 102);
const COLOR_BOARD: Color = rgb(186, 173, 161);
const COLOR_CELL: Color = rgb(204, 193, 181);
const COLOR_LOGO: Color = rgb(237, 194, 46);
const COLOR_LABEL: Color = rgb(238, 228, 218);
const COLOR_TEXT_LIGHT: Color = rgb(255, 255, 255);
const COLOR_BEYOND: Color = rgb(0, 0, 0);

/// Background of a tile with `value`. Anything past 2048 is black.
fn tile_bg(value: Value) -> Color {
    match value {
        2 => rgb(238, 228, 218),
        4 => rgb(237, 224, 200),
        8 => rgb(242, 177, 121),
        16 => rgb(245, 149, 99),
        32 => rgb(246, 124, 95),
        64 => rgb(246, 94, 59),
        128 => rgb(237, 207, 114),
        256 => rgb(237, 204, 97),
        512 => rgb(237, 200, 80),
        1024 => rgb(237, 197, 63),
        2048 => rgb(237, 194, 46),
        _ => COLOR_BEYOND,
    }
}

/// Small values are dark on light; the rest light on colour.
fn tile_fg(value: Value) -> Color {
    if value < 8 { COLOR_GREY } else { COLOR_TEXT_LIGHT }
}

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit page background for all "empty" terminal cells. Using the
    /// same RGB for `Clear(ClearType::All)` keeps VTE gap pixels matching.
    const BASE_BG: Color = COLOR_WHITE;

    const BLANK: Cell = Cell { ch: ' ', fg: COLOR_GREY, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
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

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    /// Fill a rectangle; parts off the top/left edge are clipped.
    fn fill_rect(&mut self, x: i32, y: i32, w: usize, h: usize, bg: Color) {
        for dy in 0..h as i32 {
            for dx in 0..w as i32 {
                let (cx, cy) = (x + dx, y + dy);
                if cx >= 0 && cy >= 0 {
                    self.set(cx as usize, cy as usize, Cell::new(' ', COLOR_GREY, bg));
                }
            }
        }
    }

    /// Centre `s` inside the `w`-wide span starting at `x`.
    fn put_centered(&mut self, x: i32, y: i32, w: usize, s: &str, fg: Color, bg: Color) {
        let len = s.chars().count();
        let cx = x + (w.saturating_sub(len) / 2) as i32;
        if cx >= 0 && y >= 0 {
            self.put_str(cx as usize, y as usize, s, fg, bg);
        }
    }
}

// ── Geometry ──

const TILE_W: usize = 8;
const TILE_H: usize = 3;
const GAP_X: usize = 2;
const GAP_Y: usize = 1;

const MARGIN_X: usize = 2;
const HEADER_ROW: usize = 1;
const BOX_W: usize = 10;
const HINT_ROW: usize = HEADER_ROW + 3;
const BOARD_ROW: usize = HINT_ROW + 2;

const fn board_width(n: usize) -> usize { GAP_X * (n + 1) + TILE_W * n }
const fn board_height(n: usize) -> usize { GAP_Y * (n + 1) + TILE_H * n }

/// Top-left terminal cell of a (possibly fractional) slot.
fn slot_origin(row: f32, col: f32) -> (i32, i32) {
    let x = (MARGIN_X + GAP_X) as f32 + col * (TILE_W + GAP_X) as f32;
    let y = (BOARD_ROW + GAP_Y) as f32 + row * (TILE_H + GAP_Y) as f32;
    (x.round() as i32, y.round() as i32)
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
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
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

    pub fn render<const N: usize>(&mut self, game: &Game<N>, anim: Option<&Animation>) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            // Force full repaint after resize.
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Phase change (overlay on/off): repaint everything
        if self.last_phase != Some(game.phase) {
            self.back.cells.fill(Cell::INVALID);
            self.last_phase = Some(game.phase);
        }

        self.compose(game, anim);

        // Diff and emit
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = COLOR_GREY;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colours; ResetColor would fall back to the terminal's own.
        queue!(self.writer,
            SetForegroundColor(last_fg),
            SetBackgroundColor(last_bg),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose<const N: usize>(&mut self, game: &Game<N>, anim: Option<&Animation>) {
        self.front.clear();
        self.compose_header(game);
        self.compose_board(game, anim);

        // Overlays wait for the last move to finish animating.
        if anim.map_or(true, Animation::is_done) {
            match game.phase {
                Phase::Won => self.compose_overlay::<N>(
                    "YOU WIN!",
                    "Enter: keep going   R: new game",
                    COLOR_TEXT_LIGHT,
                    COLOR_LOGO,
                ),
                Phase::Lost => self.compose_overlay::<N>(
                    "GAME OVER",
                    "R: try again",
                    COLOR_GREY,
                    COLOR_WHITE,
                ),
                Phase::Playing => {}
            }
        }

        let help_row = BOARD_ROW + board_height(N) + 1;
        let help = "\u{2190}\u{2191}\u{2192}\u{2193} / WASD: move   R: restart   Q: quit";
        self.front.put_str(MARGIN_X, help_row, help, COLOR_GREY, Cell::BASE_BG);
    }

    fn compose_header<const N: usize>(&mut self, game: &Game<N>) {
        let logo_x = MARGIN_X as i32;
        let y = HEADER_ROW as i32;
        self.front.fill_rect(logo_x, y, BOX_W, 3, COLOR_LOGO);
        self.front.put_centered(logo_x, y + 1, BOX_W, "2048", COLOR_TEXT_LIGHT, COLOR_LOGO);

        let boxes = [("SCORE", game.score()), ("BEST", game.best.max(game.score()))];
        for (i, (label, value)) in boxes.into_iter().enumerate() {
            let x = logo_x + ((BOX_W + 2) * (i + 1)) as i32;
            self.front.fill_rect(x, y, BOX_W, 3, COLOR_BOARD);
            self.front.put_centered(x, y, BOX_W, label, COLOR_LABEL, COLOR_BOARD);
            self.front.put_centered(x, y + 1, BOX_W, &value.to_string(), COLOR_TEXT_LIGHT, COLOR_BOARD);
        }

        self.front.put_str(MARGIN_X, HINT_ROW, "R: new game", COLOR_GREY, Cell::BASE_BG);
    }

    fn compose_board<const N: usize>(&mut self, game: &Game<N>, anim: Option<&Animation>) {
        self.front.fill_rect(
            MARGIN_X as i32,
            BOARD_ROW as i32,
            board_width(N),
            board_height(N),
            COLOR_BOARD,
        );

        // Pass 1: resting slots
        let mut popping = Vec::new();
        for r in 0..N {
            for c in 0..N {
                let pos = Position::new(r, c);
                let value = game.board.get(pos);
                let (x, y) = slot_origin(r as f32, c as f32);
                let hidden = anim.is_some_and(|a| a.is_hidden(pos));
                if value == 0 || hidden {
                    self.front.fill_rect(x, y, TILE_W, TILE_H, COLOR_CELL);
                    continue;
                }
                match anim.map_or(0, |a| a.pop_pad(pos)) {
                    0 => self.compose_tile(x, y, 0, value),
                    pad => {
                        self.front.fill_rect(x, y, TILE_W, TILE_H, COLOR_CELL);
                        popping.push((x, y, pad, value));
                    }
                }
            }
        }

        // Pass 2: popping tiles overlap their neighbours' gaps
        for (x, y, pad, value) in popping {
            self.compose_tile(x, y, pad, value);
        }

        // Pass 3: sliding tiles on top
        if let Some(a) = anim {
            for sprite in a.sprites() {
                let (x, y) = slot_origin(sprite.row, sprite.col);
                self.compose_tile(x, y, 0, sprite.value);
            }
        }
    }

    /// Draw one tile with its slot's top-left at (x, y), grown by `pad`.
    fn compose_tile(&mut self, x: i32, y: i32, pad: usize, value: Value) {
        let bg = tile_bg(value);
        let p = pad as i32;
        self.front.fill_rect(x - p, y - p, TILE_W + 2 * pad, TILE_H + 2 * pad, bg);
        self.front.put_centered(x, y + (TILE_H / 2) as i32, TILE_W, &value.to_string(), tile_fg(value), bg);
    }

    fn compose_overlay<const N: usize>(&mut self, title: &str, hint: &str, fg: Color, bg: Color) {
        let w = board_width(N);
        let h = board_height(N);
        let box_h = 5.min(h);
        let x = MARGIN_X as i32;
        let y = (BOARD_ROW + (h - box_h) / 2) as i32;
        self.front.fill_rect(x, y, w, box_h, bg);
        self.front.put_centered(x, y + 1, w, title, fg, bg);
        self.front.put_centered(x, y + 3, w, hint, fg, bg);
    }
}
