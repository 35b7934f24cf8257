/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The playfield is drawn through `Painter`, a `DrawSink` that scales
/// world pixels onto the terminal cells left over below the HUD.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::{Facing, Weapon};
use crate::domain::geometry::Rect;
use crate::sim::level::Campaign;
use crate::sim::session::{Screen, Session};
use crate::sim::world::{DrawSink, Sprite, WorldState};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, shared with
    /// `Clear(ClearType::All)` so inter-row gaps match the cells.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg: Self::norm_bg(bg) }
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

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Viewport: world pixels → terminal cells ──

#[derive(Clone, Copy, Debug)]
struct Viewport {
    col: usize,
    row: usize,
    cols: usize,
    rows: usize,
    sx: f64,
    sy: f64,
}

impl Viewport {
    fn fit(field: Rect, col: usize, row: usize, cols: usize, rows: usize) -> Self {
        let w = (field.right - field.left).max(1.0);
        let h = (field.bottom - field.top).max(1.0);
        Viewport { col, row, cols, rows, sx: cols as f64 / w, sy: rows as f64 / h }
    }

    /// Inclusive cell span covered by a world rect, clipped to the view.
    /// Anything at least partly on screen covers one cell or more.
    fn span(&self, r: Rect) -> Option<(usize, usize, usize, usize)> {
        if self.cols == 0 || self.rows == 0 {
            return None;
        }
        let x0 = (r.left * self.sx).floor();
        let y0 = (r.top * self.sy).floor();
        let x1 = ((r.right * self.sx).ceil() - 1.0).max(x0);
        let y1 = ((r.bottom * self.sy).ceil() - 1.0).max(y0);

        let max_x = (self.cols - 1) as f64;
        let max_y = (self.rows - 1) as f64;
        if x1 < 0.0 || y1 < 0.0 || x0 > max_x || y0 > max_y {
            return None;
        }
        Some((
            self.col + x0.max(0.0) as usize,
            self.row + y0.max(0.0) as usize,
            self.col + x1.min(max_x) as usize,
            self.row + y1.min(max_y) as usize,
        ))
    }
}

// ── Painter: sprites → cells ──

struct Painter<'a> {
    buf: &'a mut FrameBuffer,
    view: Viewport,
}

const PLATFORM_BG: Color = Color::Rgb { r: 150, g: 40, b: 60 };
const LADDER_FG: Color = Color::Rgb { r: 80, g: 200, b: 255 };
const BARREL_FG: Color = Color::Rgb { r: 200, g: 120, b: 40 };
const BOSS_FG: Color = Color::Rgb { r: 160, g: 90, b: 40 };

fn glyph(sprite: Sprite) -> (char, Color, Color) {
    match sprite {
        Sprite::Platform => ('=', Color::Rgb { r: 255, g: 120, b: 140 }, PLATFORM_BG),
        Sprite::Ladder => ('H', LADDER_FG, Color::Reset),
        Sprite::Barrel => ('o', BARREL_FG, Color::Reset),
        Sprite::Monkey { intelligent: true, .. } => ('M', Color::Rgb { r: 255, g: 220, b: 50 }, Color::Reset),
        Sprite::Monkey { intelligent: false, .. } => ('m', Color::Rgb { r: 180, g: 140, b: 90 }, Color::Reset),
        Sprite::Bullet => ('-', Color::Rgb { r: 255, g: 255, b: 120 }, Color::Reset),
        Sprite::Banana => (')', Color::Yellow, Color::Reset),
        Sprite::Hammer => ('T', Color::Rgb { r: 255, g: 200, b: 50 }, Color::Reset),
        Sprite::Blaster => ('Y', Color::Rgb { r: 100, g: 255, b: 200 }, Color::Reset),
        Sprite::Boss { defeated: true } => ('x', Color::DarkGrey, Color::Reset),
        Sprite::Boss { defeated: false } => ('K', BOSS_FG, Color::Reset),
        Sprite::Player { facing, climbing, weapon } => {
            let ch = match (climbing, facing) {
                (true, _) => '#',
                (false, Facing::Left) => '<',
                (false, Facing::Right) => '>',
            };
            let fg = match weapon {
                Weapon::None => Color::Rgb { r: 80, g: 255, b: 80 },
                Weapon::Hammer => Color::Rgb { r: 255, g: 200, b: 50 },
                Weapon::Blaster { .. } => Color::Rgb { r: 100, g: 255, b: 200 },
            };
            (ch, fg, Color::Reset)
        }
    }
}

impl DrawSink for Painter<'_> {
    fn draw(&mut self, sprite: Sprite, bounds: Rect) {
        let Some((x0, y0, x1, y1)) = self.view.span(bounds) else { return };
        let (ch, fg, bg) = glyph(sprite);
        for y in y0..=y1 {
            for x in x0..=x1 {
                // Keep the platform colour behind small sprites
                let under = self.buf.get(x, y).bg;
                let bg = if bg == Color::Reset { under } else { bg };
                self.buf.set(x, y, Cell::new(ch, fg, bg));
            }
        }
    }
}

// ── Renderer ──

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
/// HUD + gap above the map, help line below it.
const RESERVED_ROWS: usize = MAP_ROW + 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const HI: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const GOLD: Color = Color::Rgb { r: 255, g: 200, b: 50 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_screen: Option<Screen>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_screen: None,
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
        // Force full repaint on first frame
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, session: &Session) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.invalidate()?;
        }

        // Clean transition between screens
        if self.last_screen != Some(session.screen) {
            self.invalidate()?;
            self.last_screen = Some(session.screen);
        }

        self.front.clear();
        match (session.screen, session.world.as_ref()) {
            (Screen::Playing, Some(world)) => {
                compose_game(&mut self.front, world, session.diagnostics.len());
                if session.paused {
                    compose_pause_overlay(&mut self.front);
                }
            }
            (Screen::GameOver { won, score }, _) => compose_game_over(&mut self.front, won, score),
            _ => compose_title(&mut self.front, session.campaign()),
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn invalidate(&mut self) -> io::Result<()> {
        self.back.cells.fill(Cell::INVALID);
        queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colors; ResetColor would fall back to the terminal default
        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

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
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }
}

// ── Compose: build front buffer content ──

fn compose_game(buf: &mut FrameBuffer, w: &WorldState, skipped: usize) {
    let hud = hud_line(w);
    buf.fill_row(HUD_ROW, HUD_BG);
    buf.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

    let rows = buf.height.saturating_sub(RESERVED_ROWS);
    let view = Viewport::fit(w.field(), 0, MAP_ROW, buf.width, rows);
    w.draw(&mut Painter { buf: &mut *buf, view });

    let help_row = MAP_ROW + rows + 1;
    let help = " ←→ Run  ↑↓ Climb  Space Jump  F Fire  F1 Pause  Esc Title";
    buf.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
    if skipped > 0 {
        let note = format!(" {skipped} level entries skipped, see log");
        buf.put_str(0, HUD_ROW + 1, &note, Color::Yellow, Color::Reset);
    }
}

fn hud_line(w: &WorldState) -> String {
    let weapon = match w.player.weapon {
        Weapon::None => String::new(),
        Weapon::Hammer => "HAMMER".to_string(),
        Weapon::Blaster { bullets } => format!("BLASTER x{bullets}"),
    };
    format!(
        " L{} {:<12}  Score:{:<7}  Time:{:>3}  Kong:{}/{}  {} ",
        w.level_index + 1,
        w.name,
        w.score(),
        w.remaining_seconds(),
        w.boss.health,
        w.boss.max_health,
        weapon,
    )
}

fn compose_title(buf: &mut FrameBuffer, campaign: &Campaign) {
    let title = [
        r"  _  __                   ___ _ _       _             ",
        r" | |/ /___ _ _  __ _     / __| (_)_ __ | |__  ___ _ _ ",
        r" | ' </ _ \ ' \/ _` |   | (__| | | '  \| '_ \/ -_) '_|",
        r" |_|\_\___/_||_\__, |    \___|_|_|_|_|_|_.__/\___|_|  ",
        r"               |___/                                  ",
    ];
    for (i, line) in title.iter().enumerate() {
        buf.put_str(2, 2 + i, line, GOLD, Color::Reset);
    }

    let menu_base = 9;
    buf.put_str(8, menu_base, "ENTER   Start", HI, Color::Reset);
    buf.put_str(8, menu_base + 1, "1-9     Start at level", Color::White, Color::Reset);
    buf.put_str(8, menu_base + 2, "ESC     Quit", Color::White, Color::Reset);

    let list_base = menu_base + 4;
    buf.put_str(8, list_base, "Levels", GOLD, Color::Reset);
    for i in 0..campaign.len() {
        let name = campaign.name(i).unwrap_or("?");
        buf.put_str(10, list_base + 1 + i, &format!("{}. {}", i + 1, name), Color::White, Color::Reset);
    }

    let help_base = list_base + campaign.len() + 2;
    let help = [
        "Controls",
        "  ←→ / AD     Run           ↑↓ / WS   Climb",
        "  Space / Z   Jump          F / X     Fire blaster",
        "  F1          Pause         Esc       Title",
    ];
    for (i, line) in help.iter().enumerate() {
        let color = if i == 0 { GOLD } else { Color::White };
        buf.put_str(8, help_base + i, line, color, Color::Reset);
    }
}

fn compose_game_over(buf: &mut FrameBuffer, won: bool, score: u32) {
    let (banner, color) = if won {
        ("*  KONG DEFEATED! YOU WIN!  *", GOLD)
    } else {
        ("x        GAME  OVER        x", Color::Rgb { r: 255, g: 60, b: 60 })
    };
    let edge = "+".to_string() + &"-".repeat(banner.chars().count() + 2) + "+";
    buf.put_str(6, 4, &edge, color, Color::Reset);
    buf.put_str(6, 5, &format!("| {banner} |"), color, Color::Reset);
    buf.put_str(6, 6, &edge, color, Color::Reset);

    buf.put_str(8, 9, &format!("Final Score: {score}"), Color::White, Color::Reset);
    buf.put_str(8, 11, "ENTER: Play again", HI, Color::Reset);
    buf.put_str(8, 12, "ESC:   Back to Title", Color::DarkGrey, Color::Reset);
}

fn compose_pause_overlay(buf: &mut FrameBuffer) {
    let dim = Color::Rgb { r: 40, g: 40, b: 40 };
    let box_w = 28_usize.min(buf.width);
    let box_h = 7_usize.min(buf.height.saturating_sub(MAP_ROW));
    let box_x = buf.width.saturating_sub(box_w) / 2;
    let box_y = MAP_ROW + buf.height.saturating_sub(MAP_ROW + box_h) / 2;

    for y in box_y..box_y + box_h {
        for x in box_x..box_x + box_w {
            buf.set(x, y, Cell::new(' ', Color::Reset, dim));
        }
    }
    buf.put_str(box_x + 9, box_y + 1, "PAUSED", GOLD, dim);
    buf.put_str(box_x + 3, box_y + 3, "F1   Resume", LADDER_FG, dim);
    buf.put_str(box_x + 3, box_y + 4, "ESC  Back to Title", LADDER_FG, dim);
}
