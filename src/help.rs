use crate::terminal::Terminal;
use crossterm::event::KeyCode;
use crossterm::style::Color;
use std::io;

/// Draw a centered, bordered text box into the back buffer
pub fn render_help_overlay(term: &mut Terminal, help_text: &str) {
    if help_text.is_empty() {
        return;
    }

    let (width, height) = term.size();
    let lines: Vec<&str> = help_text.lines().collect();
    let max_width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_width = max_width + 4;
    let box_height = lines.len() + 2;

    let start_x = (width as usize).saturating_sub(box_width) / 2;
    let start_y = (height as usize).saturating_sub(box_height) / 2;
    let (x0, y0) = (start_x as i32, start_y as i32);
    let right = x0 + box_width as i32 - 1;
    let bottom = y0 + box_height as i32 - 1;

    let border = Some(Color::White);
    let text = Some(Color::Grey);
    let ink = Some(Color::Black);

    for x in x0..=right {
        let (top_ch, bot_ch) = match x {
            _ if x == x0 => ('┌', '└'),
            _ if x == right => ('┐', '┘'),
            _ => ('─', '─'),
        };
        term.set_with_bg(x, y0, top_ch, border, ink);
        term.set_with_bg(x, bottom, bot_ch, border, ink);
    }

    for (i, line) in lines.iter().enumerate() {
        let y = y0 + 1 + i as i32;
        term.set_with_bg(x0, y, '│', border, ink);
        let padded = format!(" {:<width$} ", line, width = max_width);
        for (j, ch) in padded.chars().enumerate() {
            term.set_with_bg(x0 + 1 + j as i32, y, ch, text, ink);
        }
        term.set_with_bg(right, y, '│', border, ink);
    }
}

/// Show the help box until `?` closes it.
/// Returns true if the user asked to quit (q/Esc) instead.
pub fn show_help_modal(term: &mut Terminal, help_text: &str) -> io::Result<bool> {
    if help_text.is_empty() {
        return Ok(false);
    }

    render_help_overlay(term, help_text);
    term.render()?;

    loop {
        if let Some(code) = term.wait_key(50)? {
            match code {
                KeyCode::Char('?') => return Ok(false),
                KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
                _ => {}
            }
        }
    }
}
