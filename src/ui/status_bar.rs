use crate::ui::theme;
use ratatui::{
    buffer::Buffer as Buf,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

pub struct StatusBar<'a> {
    pub registry: Option<&'a str>,
    pub authenticated: bool,
}

impl<'a> Widget for StatusBar<'a> {
    fn render(self, area: Rect, buf: &mut Buf) {
        let bg = Style::default().bg(theme::STATUS_BG);
        for x in area.x..area.right() {
            buf[(x, area.y)].set_style(bg);
        }

        let sep = || {
            Span::styled(
                "\u{2502}",
                Style::default().fg(theme::SEPARATOR).bg(theme::STATUS_BG),
            )
        };

        let mut spans = vec![
            Span::styled(
                " hookgate ",
                Style::default()
                    .fg(theme::ACCENT)
                    .bg(theme::STATUS_BG)
                    .add_modifier(Modifier::BOLD),
            ),
            sep(),
        ];

        let registry = match self.registry {
            Some(url) => Span::styled(format!(" registry: {url} "), bg),
            None => Span::styled(
                " registry: not configured ",
                Style::default().fg(theme::DIM_TEXT).bg(theme::STATUS_BG),
            ),
        };
        spans.push(registry);
        spans.push(sep());

        let auth = if self.authenticated {
            " github: token "
        } else {
            " github: anonymous "
        };
        spans.push(Span::styled(auth, bg));
        spans.push(sep());
        spans.push(Span::styled(
            " F1 help ",
            Style::default().fg(theme::DIM_TEXT).bg(theme::STATUS_BG),
        ));

        let line = Line::from(spans);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
