use crate::ui::theme;
use crate::validation::StatusGlyph;
use ratatui::{
    buffer::Buffer as Buf,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};
use unicode_width::UnicodeWidthStr;

const SPINNER_FRAMES: &[&str] = &[
    "\u{280b}", "\u{2819}", "\u{2839}", "\u{2838}", "\u{283c}", "\u{2834}", "\u{2826}",
    "\u{2827}", "\u{2807}", "\u{280f}",
];

pub fn glyph_span(glyph: StatusGlyph<'_>, spinner_frame: usize) -> Span<'static> {
    match glyph {
        StatusGlyph::Neutral => Span::raw(" "),
        StatusGlyph::Spinner => Span::styled(
            SPINNER_FRAMES[spinner_frame % SPINNER_FRAMES.len()],
            Style::default().fg(theme::SPINNER_FG),
        ),
        StatusGlyph::Success => Span::styled(
            "\u{2714}",
            Style::default()
                .fg(theme::SUCCESS_FG)
                .add_modifier(Modifier::BOLD),
        ),
        StatusGlyph::Error(_) => Span::styled(
            "\u{2716}",
            Style::default()
                .fg(theme::ERROR_FG)
                .add_modifier(Modifier::BOLD),
        ),
    }
}

/// Bordered single-line input with the status glyph pinned to the right edge.
pub struct SearchBar<'a> {
    pub text: &'a str,
    pub glyph: StatusGlyph<'a>,
    pub spinner_frame: usize,
}

impl<'a> Widget for SearchBar<'a> {
    fn render(self, area: Rect, buf: &mut Buf) {
        let block = Block::default()
            .title(" owner/repo ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACTIVE_BORDER));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width < 4 || inner.height == 0 {
            return;
        }

        // One column of padding each side, two for the glyph and its gap.
        let text_w = inner.width.saturating_sub(4) as usize;
        let shown = tail_fit(self.text, text_w);

        let line = Line::from(vec![
            Span::raw(" "),
            Span::styled(shown, Style::default().fg(theme::INPUT_FG)),
            Span::styled("\u{258c}", Style::default().fg(theme::CURSOR)),
        ]);
        buf.set_line(inner.x, inner.y, &line, inner.width.saturating_sub(2));

        let glyph = Line::from(glyph_span(self.glyph, self.spinner_frame));
        buf.set_line(inner.right().saturating_sub(2), inner.y, &glyph, 1);
    }
}

/// Keeps the end of `s` visible when it is wider than `max`, like a text field
/// scrolled to its cursor.
fn tail_fit(s: &str, max: usize) -> String {
    if UnicodeWidthStr::width(s) <= max {
        return s.to_string();
    }
    let mut kept: Vec<char> = Vec::new();
    let mut w = 0;
    for ch in s.chars().rev() {
        let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if w + cw > max {
            break;
        }
        kept.push(ch);
        w += cw;
    }
    kept.into_iter().rev().collect()
}
