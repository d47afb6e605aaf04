//! Character-cell front end
//!
//! The play area keeps its logical pixel size; the canvas scales it onto
//! whatever grid the terminal offers. The bottom row is the info panel.

use std::io::{self, Write};

use crossterm::{
    QueueableCommand, cursor,
    event::KeyCode,
    style::{Color, Print, SetForegroundColor},
};
use glam::Vec2;

use danmaku::platform::{DrawContext, Key, Sprite, SpriteKind};
use danmaku::sim::{EnemyArchetype, Team};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    glyph: char,
    color: Color,
}

const BLANK: Cell = Cell {
    glyph: ' ',
    color: Color::Reset,
};

pub struct Canvas {
    cols: u16,
    rows: u16,
    world: Vec2,
    cells: Vec<Cell>,
}

impl Canvas {
    /// `rows` is the terminal height; one row is kept for the info panel
    pub fn new(cols: u16, rows: u16, world: Vec2) -> Self {
        let mut canvas = Self {
            cols: 0,
            rows: 0,
            world,
            cells: Vec::new(),
        };
        canvas.resize(cols, rows);
        canvas
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols.max(1);
        self.rows = rows.saturating_sub(1).max(1);
        self.cells = vec![BLANK; self.cols as usize * self.rows as usize];
    }

    pub fn clear(&mut self) {
        self.cells.fill(BLANK);
    }

    /// Write the grid, an optional centred banner and the info line
    pub fn present<W: Write>(&self, out: &mut W, hud: &str, banner: Option<&str>) -> io::Result<()> {
        let mut current = Color::Reset;
        out.queue(SetForegroundColor(current))?;
        for row in 0..self.rows {
            out.queue(cursor::MoveTo(0, row))?;
            let start = row as usize * self.cols as usize;
            for cell in &self.cells[start..start + self.cols as usize] {
                if cell.color != current {
                    current = cell.color;
                    out.queue(SetForegroundColor(current))?;
                }
                out.queue(Print(cell.glyph))?;
            }
        }

        if let Some(text) = banner {
            let width = text.chars().count() as u16;
            let col = self.cols.saturating_sub(width) / 2;
            out.queue(cursor::MoveTo(col, self.rows / 2))?;
            out.queue(SetForegroundColor(Color::White))?;
            out.queue(Print(text))?;
        }

        let line: String = hud.chars().take(self.cols as usize).collect();
        out.queue(cursor::MoveTo(0, self.rows))?;
        out.queue(SetForegroundColor(Color::Grey))?;
        out.queue(Print(format!("{line:<width$}", width = self.cols as usize)))?;
        out.queue(SetForegroundColor(Color::Reset))?;
        out.flush()
    }
}

/// First cell covered by logical coordinate `x`, if it is on the grid
fn start_cell(x: f32, extent: f32, cells: u16) -> Option<u16> {
    let start = (x / extent * cells as f32).floor();
    if start >= cells as f32 {
        return None;
    }
    Some(start.max(0.0) as u16)
}

impl DrawContext for Canvas {
    fn draw_sprite(&mut self, sprite: &Sprite<'_>) {
        let min = sprite.bounds.min;
        let max = sprite.bounds.max();
        if max.x <= 0.0 || max.y <= 0.0 {
            return;
        }
        let (Some(c0), Some(r0)) = (
            start_cell(min.x, self.world.x, self.cols),
            start_cell(min.y, self.world.y, self.rows),
        ) else {
            return;
        };
        let c1 = ((max.x / self.world.x * self.cols as f32).ceil() as u16).clamp(c0 + 1, self.cols);
        let r1 = ((max.y / self.world.y * self.rows as f32).ceil() as u16).clamp(r0 + 1, self.rows);

        let (glyph, fallback) = glyph_for(sprite.kind);
        let color = match sprite.frame.map(|f| f.tint()) {
            Some([r, g, b]) if r as u16 + g as u16 + b as u16 > 0 => Color::Rgb { r, g, b },
            _ => fallback,
        };
        for row in r0..r1 {
            for col in c0..c1 {
                self.cells[row as usize * self.cols as usize + col as usize] = Cell { glyph, color };
            }
        }
    }
}

fn glyph_for(kind: SpriteKind) -> (char, Color) {
    match kind {
        SpriteKind::Player => ('A', Color::Green),
        SpriteKind::Enemy(EnemyArchetype::RedMage) => ('M', Color::Red),
        SpriteKind::Enemy(EnemyArchetype::BlueMage) => ('M', Color::Blue),
        SpriteKind::Enemy(EnemyArchetype::MagentaMage) => ('M', Color::Magenta),
        SpriteKind::Bullet(Team::Player) => ('|', Color::Yellow),
        SpriteKind::Bullet(Team::Enemy) => ('*', Color::DarkRed),
    }
}

/// Held keys: arrows or WASD move, space fires
pub fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Key::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Key::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Key::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Key::Right),
        KeyCode::Char(' ') => Some(Key::Fire),
        _ => None,
    }
}
