/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Rasterise the logical 800×300 playfield into a pixel layer sized
///      to the terminal (two pixels per cell, stacked vertically)
///   2. Fold each pixel pair into one '▀' cell (fg = top, bg = bottom)
///   3. Overlay text cells (HUD, menu) at projected positions
///   4. Compare each cell with `back` buffer (previous frame) and only emit
///      terminal commands for cells that changed, batched with `queue!`
///   5. Swap front/back
///
/// The simulation never sees terminal cells; everything here works from
/// logical coordinates and projects at draw time.

use std::io::{self, BufWriter, Write};
use std::time::Duration;

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, SetTitle},
};

use crate::domain::entity::{Rect, GROUND_Y, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::domain::rules::Difficulty;
use crate::sim::world::WorldState;

pub const WINDOW_TITLE: &str = "Jumption";

// ── Colour ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    fn color(self) -> Color {
        Color::Rgb { r: self.0, g: self.1, b: self.2 }
    }
}

/// Mix `to` over `from` with opacity `alpha` (0 = from, 255 = to).
pub fn blend(from: Rgb, to: Rgb, alpha: u8) -> Rgb {
    let mix = |a: u8, b: u8| -> u8 {
        let a = a as i32;
        let b = b as i32;
        (a + (b - a) * alpha as i32 / 255) as u8
    };
    Rgb(mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Palette {
    pub bg: Rgb,
    pub fg: Rgb,
}

impl Palette {
    pub const LIGHT: Palette = Palette { bg: Rgb(255, 255, 255), fg: Rgb(0, 0, 0) };
    pub const DARK: Palette = Palette { bg: Rgb(30, 30, 30), fg: Rgb(220, 220, 220) };

    pub fn for_mode(dark_mode: bool) -> Palette {
        if dark_mode { Palette::DARK } else { Palette::LIGHT }
    }
}

// ── Fade ──

const FADE_STEP: usize = 15;
const FADE_DELAY: Duration = Duration::from_millis(10);

/// Overlay opacities for one fade: 0, 15, 30, … 240.
pub fn fade_alphas() -> impl Iterator<Item = u8> {
    (0..255u16).step_by(FADE_STEP).map(|a| a as u8)
}

// ── Projection: logical playfield → terminal ──

/// Terminal area the playfield is stretched over. One cell holds two
/// vertically stacked pixels.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Viewport {
    pub cols: usize,
    pub rows: usize,
}

impl Viewport {
    pub fn px_w(&self) -> usize { self.cols }
    pub fn px_h(&self) -> usize { self.rows * 2 }

    fn px_x(&self, x: f32) -> f32 { x * self.px_w() as f32 / SCREEN_WIDTH }
    fn px_y(&self, y: f32) -> f32 { y * self.px_h() as f32 / SCREEN_HEIGHT }

    /// Pixel span `[x0, x1) × [y0, y1)` covered by a logical rectangle.
    /// Anything with positive size covers at least one pixel.
    pub fn project_rect(&self, r: Rect) -> (i32, i32, i32, i32) {
        let x0 = self.px_x(r.x).floor() as i32;
        let y0 = self.px_y(r.y).floor() as i32;
        let x1 = (self.px_x(r.right()).ceil() as i32).max(x0 + 1);
        let y1 = (self.px_y(r.bottom()).ceil() as i32).max(y0 + 1);
        (x0, y0, x1, y1)
    }

    /// Cell holding the logical point (x, y).
    pub fn cell_at(&self, x: f32, y: f32) -> (usize, usize) {
        let col = (x * self.cols as f32 / SCREEN_WIDTH).floor().max(0.0) as usize;
        let row = (y * self.rows as f32 / SCREEN_HEIGHT).floor().max(0.0) as usize;
        (col.min(self.cols.saturating_sub(1)), row.min(self.rows.saturating_sub(1)))
    }
}

// ── Pixel layer ──

struct PixelLayer {
    w: usize,
    h: usize,
    px: Vec<Rgb>,
}

impl PixelLayer {
    fn new(w: usize, h: usize, fill: Rgb) -> Self {
        PixelLayer { w, h, px: vec![fill; w * h] }
    }

    fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    fn fill_span(&mut self, (x0, y0, x1, y1): (i32, i32, i32, i32), c: Rgb) {
        for y in y0.max(0)..y1 {
            for x in x0.max(0)..x1 {
                self.set(x, y, c);
            }
        }
    }
}

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Rgb,
    bg: Rgb,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: Rgb(0, 0, 0), bg: Rgb(0, 0, 0) };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Rgb(255, 0, 255), bg: Rgb(255, 0, 255) };

    /// Upper half block: fg paints the top pixel, bg the bottom one.
    fn half_block(top: Rgb, bottom: Rgb) -> Self {
        Cell { ch: '▀', fg: top, bg: bottom }
    }

    fn faded(self, target: Rgb, alpha: u8) -> Self {
        Cell {
            ch: self.ch,
            fg: blend(self.fg, target, alpha),
            bg: blend(self.bg, target, alpha),
        }
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
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Rgb, bg: Rgb) {
        for (i, ch) in s.chars().enumerate() {
            let cx = x + i;
            if cx >= self.width { break; }
            self.set(cx, y, Cell { ch, fg, bg });
        }
    }

    /// Fold a pixel layer of twice our height into half-block cells.
    fn blit(&mut self, layer: &PixelLayer) {
        for y in 0..self.height.min(layer.h / 2) {
            for x in 0..self.width.min(layer.w) {
                let top = layer.get(x, y * 2);
                let bottom = layer.get(x, y * 2 + 1);
                self.set(x, y, Cell::half_block(top, bottom));
            }
        }
    }
}

// ── Screens ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Screen {
    Menu,
    Game,
}

const MENU_TITLE: &str = "Select Difficulty";
const MENU_TITLE_Y: f32 = 60.0;
const MENU_FIRST_Y: f32 = 120.0;
const MENU_LINE_GAP: f32 = 35.0;
const HUD_MARGIN: f32 = 10.0;
const SCORE_X: f32 = SCREEN_WIDTH - 150.0;
const HINT_Y: f32 = SCREEN_HEIGHT - 30.0;
const GROUND_THICKNESS: f32 = 2.0;

pub const TOGGLE_HINT: &str = "D = Toggle Dark Mode";
pub const GAME_OVER_TEXT: &str = "Game Over! Press R to Restart";

/// Menu lines, top to bottom.
pub fn menu_lines() -> Vec<String> {
    let mut lines: Vec<String> = Difficulty::ALL.iter()
        .map(|d| format!("{} - {}", d.index() + 1, d.label()))
        .collect();
    lines.push("D - Toggle Dark Mode".to_string());
    lines.push("ESC - Quit".to_string());
    lines
}

pub fn mode_indicator(dark_mode: bool) -> &'static str {
    if dark_mode { "☾ Dark Mode ON" } else { "☀ Light Mode" }
}

pub fn score_text(score: u32) -> String {
    format!("Score: {score}")
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    view: Viewport,
    last_screen: Option<Screen>,
    /// Terminal reports key Release and Repeat as distinct event kinds.
    key_events_reported: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            view: Viewport { cols: 0, rows: 0 },
            last_screen: None,
            key_events_reported: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            SetTitle(WINDOW_TITLE),
            cursor::Hide,
            Clear(ClearType::All)
        )?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.key_events_reported = true;
            log::info!("Keyboard enhancement enabled: release events honoured");
        }

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.apply_size(tw as usize, th as usize);

        Ok(())
    }

    /// Whether the input layer can trust Release events.
    pub fn key_events_reported(&self) -> bool {
        self.key_events_reported
    }

    /// Undo `init`. Every step is attempted even if an earlier one fails,
    /// so a half-finished `init` still leaves raw mode; the first error wins.
    pub fn cleanup(&mut self) -> io::Result<()> {
        let popped = if self.key_events_reported {
            self.key_events_reported = false;
            execute!(self.writer, PopKeyboardEnhancementFlags)
        } else {
            Ok(())
        };
        let screen = execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let raw = terminal::disable_raw_mode();
        popped.and(screen).and(raw)
    }

    fn apply_size(&mut self, cols: usize, rows: usize) {
        self.view = Viewport { cols, rows };
        self.front.resize(cols, rows);
        self.back.resize(cols, rows);
        // Force full repaint: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);
    }

    /// Pick up terminal resizes and screen switches; both force a repaint.
    fn begin_frame(&mut self, screen: Screen, palette: Palette) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        let resized = tw as usize != self.view.cols || th as usize != self.view.rows;
        if resized {
            self.apply_size(tw as usize, th as usize);
        }
        if resized || self.last_screen != Some(screen) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(palette.bg.color()), Clear(ClearType::All))?;
            self.last_screen = Some(screen);
        }
        Ok(())
    }

    fn end_frame(&mut self) -> io::Result<()> {
        self.flush_diff()?;
        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    pub fn render_menu(&mut self, dark_mode: bool) -> io::Result<()> {
        let palette = Palette::for_mode(dark_mode);
        self.begin_frame(Screen::Menu, palette)?;
        self.compose_menu(palette, dark_mode);
        self.end_frame()
    }

    pub fn render_game(&mut self, world: &WorldState, dark_mode: bool) -> io::Result<()> {
        let palette = Palette::for_mode(dark_mode);
        self.begin_frame(Screen::Game, palette)?;
        self.compose_game(world, palette);
        self.end_frame()
    }

    /// Blend the frame currently on screen toward `target`, one overlay
    /// step every 10 ms. Blocks for the whole animation.
    pub fn fade(&mut self, target: Rgb) -> io::Result<()> {
        if self.last_screen.is_none() {
            return Ok(());
        }
        let shown = self.back.cells.clone();
        for alpha in fade_alphas() {
            for (dst, src) in self.front.cells.iter_mut().zip(&shown) {
                *dst = src.faded(target, alpha);
            }
            self.end_frame()?;
            std::thread::sleep(FADE_DELAY);
        }
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg: Option<Rgb> = None;
        let mut last_bg: Option<Rgb> = None;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                // Position cursor if needed
                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                // Set colors only if changed
                if last_fg != Some(cell.fg) {
                    queue!(self.writer, SetForegroundColor(cell.fg.color()))?;
                    last_fg = Some(cell.fg);
                }
                if last_bg != Some(cell.bg) {
                    queue!(self.writer, SetBackgroundColor(cell.bg.color()))?;
                    last_bg = Some(cell.bg);
                }

                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn new_layer(&self, palette: Palette) -> PixelLayer {
        PixelLayer::new(self.view.px_w(), self.view.px_h(), palette.bg)
    }

    /// Text centred horizontally on logical x, on the row holding logical y.
    fn put_centered(&mut self, cx: f32, y: f32, text: &str, palette: Palette) {
        let (col, row) = self.view.cell_at(cx, y);
        let start = col.saturating_sub(text.chars().count() / 2);
        self.front.put_str(start, row, text, palette.fg, palette.bg);
    }

    fn put_at(&mut self, x: f32, y: f32, text: &str, palette: Palette) {
        let (col, row) = self.view.cell_at(x, y);
        self.front.put_str(col, row, text, palette.fg, palette.bg);
    }

    fn compose_menu(&mut self, palette: Palette, dark_mode: bool) {
        let layer = self.new_layer(palette);
        self.front.blit(&layer);

        let cx = SCREEN_WIDTH / 2.0;
        self.put_centered(cx, MENU_TITLE_Y, MENU_TITLE, palette);
        for (i, line) in menu_lines().iter().enumerate() {
            self.put_centered(cx, MENU_FIRST_Y + i as f32 * MENU_LINE_GAP, line, palette);
        }
        self.put_at(HUD_MARGIN, HUD_MARGIN, mode_indicator(dark_mode), palette);
    }

    fn compose_game(&mut self, w: &WorldState, palette: Palette) {
        let mut layer = self.new_layer(palette);
        let view = self.view;

        let ground = Rect { x: 0.0, y: GROUND_Y, w: SCREEN_WIDTH, h: GROUND_THICKNESS };
        layer.fill_span(view.project_rect(ground), palette.fg);
        layer.fill_span(view.project_rect(w.player.rect()), palette.fg);
        for obstacle in &w.obstacles {
            layer.fill_span(view.project_rect(obstacle.rect()), palette.fg);
        }
        self.front.blit(&layer);

        // ── HUD ──
        self.put_at(SCORE_X, HUD_MARGIN, &score_text(w.score), palette);
        self.put_at(HUD_MARGIN, HINT_Y, TOGGLE_HINT, palette);

        if w.is_game_over() {
            self.put_centered(SCREEN_WIDTH / 2.0, SCREEN_HEIGHT / 2.0, GAME_OVER_TEXT, palette);
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
