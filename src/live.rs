//! The `garden` command: an interactive terminal garden, or a headless render
//!
//! Interactive controls:
//! - Left click: plant something where you clicked
//! - Wheel / j,k / arrows / PgUp,PgDn: scroll the page; sections grow as they come into view
//! - c: clear the garden
//! - ?: help
//! - q/Esc: quit

use crate::config::{seeded_rng, GardenConfig};
use crate::error::GardenError;
use crate::garden::GardenSession;
use crate::help::show_help_modal;
use crate::plant::Rgb;
use crate::surface::Surface;
use crate::terminal::Terminal;
use crate::turtle::Point;
use crossterm::event::{Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use crossterm::style::Color;
use image::imageops::{self, FilterType};
use rand::prelude::*;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;

const HELP: &str = "\
WATERGARDEN
─────────────────────
click      Plant
j/k ↓/↑    Scroll
PgDn/PgUp  Scroll a page
c          Clear
q/Esc      Quit
?          Close help";

pub fn run(config: GardenConfig) -> Result<(), GardenError> {
    let rng = seeded_rng(config.seed);
    match config.out.clone() {
        Some(path) => run_headless(&config, &path, rng),
        None => run_interactive(&config, rng),
    }
}

/// Seed the startup garden, grow every section, and save a PNG
fn run_headless(config: &GardenConfig, path: &Path, rng: StdRng) -> Result<(), GardenError> {
    let surface = Surface::new(config.width, config.height);
    let mut session = GardenSession::new(surface, rng, config.session.clone());

    session.seed_startup();
    session.grow_all_sections();

    session.surface().to_image(Some(config.paper)).save(path)?;
    info!(path = %path.display(), plants = session.history_len(), "garden written");
    Ok(())
}

enum Input {
    Quit,
    Help,
    Redraw,
    Scroll(f32),
    Plant(Point),
    Clear,
    Ignore,
}

struct Viewport {
    cols: u16,
    art_rows: u16,
    scale: u32,
}

impl Viewport {
    fn height_px(&self) -> f32 {
        (self.art_rows as u32 * 2 * self.scale) as f32
    }

    /// Terminal cell to surface pixel (center of the cell)
    fn to_surface(&self, column: u16, row: u16) -> Option<Point> {
        if column >= self.cols || row >= self.art_rows {
            return None;
        }
        let s = self.scale as f32;
        Some(Point::new((column as f32 + 0.5) * s, (row as f32 * 2.0 + 1.0) * s))
    }
}

fn translate(event: Event, view: &Viewport) -> Input {
    let line = view.height_px() * 0.1;
    let page = view.height_px() * 0.9;

    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Input::Quit,
            KeyCode::Char('?') => Input::Help,
            KeyCode::Char('c') => Input::Clear,
            KeyCode::Char('j') | KeyCode::Down => Input::Scroll(line),
            KeyCode::Char('k') | KeyCode::Up => Input::Scroll(-line),
            KeyCode::PageDown | KeyCode::Char(' ') => Input::Scroll(page),
            KeyCode::PageUp => Input::Scroll(-page),
            _ => Input::Ignore,
        },
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => view
                .to_surface(mouse.column, mouse.row)
                .map(Input::Plant)
                .unwrap_or(Input::Ignore),
            MouseEventKind::ScrollDown => Input::Scroll(line),
            MouseEventKind::ScrollUp => Input::Scroll(-line),
            _ => Input::Ignore,
        },
        Event::Resize(..) => Input::Redraw,
        _ => Input::Ignore,
    }
}

/// Plant count, section progress, scroll position and what is in view
fn status_line<R: Rng>(session: &GardenSession<R>) -> String {
    let max = session.layout().max_scroll();
    let pct = if max > 0.0 { session.scroll() / max * 100.0 } else { 100.0 };
    let in_view = session
        .sections()
        .iter()
        .enumerate()
        .filter(|(i, _)| session.layout().visible_fraction(*i, session.scroll()) >= 0.5)
        .map(|(_, s)| s.id.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let grown = (0..session.sections().len()).filter(|&i| session.is_grown(i)).count();
    let last = session.history().last().map_or("-", |p| p.kind.name());
    format!(
        " watergarden  plants {} (last {})  sections {}/{}  page {:>3.0}%  {}  [? help]",
        session.history_len(),
        last,
        grown,
        session.sections().len(),
        pct,
        in_view
    )
}

fn draw<R: Rng>(
    term: &mut Terminal,
    session: &GardenSession<R>,
    view: &Viewport,
    paper: Rgb,
) -> std::io::Result<()> {
    let full = session.surface().to_image(Some(paper));
    let (w, h) = (view.cols as u32, view.art_rows as u32 * 2);
    let small = imageops::resize(&full, w, h, FilterType::Triangle);

    term.clear();
    term.draw_halfblock(&small, view.art_rows);

    let status = status_line(session);
    term.set_str(0, view.art_rows as i32, &status, Some(Color::DarkGrey));

    term.render()
}

fn run_interactive(config: &GardenConfig, rng: StdRng) -> Result<(), GardenError> {
    let mut term = Terminal::new()?;
    let (cols, rows) = term.size();
    let view = Viewport {
        cols,
        art_rows: rows.saturating_sub(1),
        scale: config.pixel_scale.max(1),
    };

    let surface = Surface::new(cols as u32 * view.scale, view.art_rows as u32 * 2 * view.scale);
    let mut session = GardenSession::new(surface, rng, config.session.clone());
    session.seed_startup();

    let frame = Duration::from_secs_f32(config.time_step.max(0.001));
    let mut dirty = true;

    loop {
        if dirty {
            draw(&mut term, &session, &view, config.paper)?;
            dirty = false;
        }

        let deadline = Instant::now() + frame;
        loop {
            let wait = deadline.saturating_duration_since(Instant::now());
            let Some(event) = term.poll_event(wait)? else {
                break;
            };
            match translate(event, &view) {
                Input::Quit => return Ok(()),
                Input::Help => {
                    if show_help_modal(&mut term, HELP)? {
                        return Ok(());
                    }
                    dirty = true;
                }
                Input::Redraw => dirty = true,
                Input::Scroll(delta) => {
                    session.scroll_to(session.scroll() + delta);
                    dirty = true;
                }
                Input::Plant(origin) => {
                    session.plant_at_pointer(origin);
                    dirty = true;
                }
                Input::Clear => {
                    session.teardown();
                    dirty = true;
                }
                Input::Ignore => {}
            }
            if Instant::now() >= deadline {
                break;
            }
        }

        if session.busy() && session.tick(Instant::now()) {
            dirty = true;
        }
    }
}
