use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::engine::{Divider, Visibility};
use crate::observer::Orientation;

const PANE_TITLES: [&str; 3] = [" browser ", " editor ", " preview "];

/// Integer pane rects for the current size vector. Hidden panes get a
/// zero-extent rect; the last visible pane absorbs the rounding remainder
/// so the rects always tile the body exactly.
pub fn pane_rects(
    sizes: [f64; 3],
    visibility: Visibility,
    orientation: Orientation,
    area: Rect,
) -> [Rect; 3] {
    let total = match orientation {
        Orientation::Vertical => area.width,
        Orientation::Horizontal => area.height,
    };
    let visible: Vec<usize> = (0..3).filter(|&s| visibility.slot_visible(s)).collect();

    let mut spans = [0u16; 3];
    let mut used = 0u16;
    for (k, &slot) in visible.iter().enumerate() {
        let span = if k + 1 == visible.len() {
            total.saturating_sub(used)
        } else {
            (sizes[slot].round().max(0.0) as u16).min(total.saturating_sub(used))
        };
        spans[slot] = span;
        used += span;
    }

    let mut rects = [Rect::default(); 3];
    let mut offset = 0u16;
    for slot in 0..3 {
        rects[slot] = match orientation {
            Orientation::Vertical => {
                Rect::new(area.x + offset, area.y, spans[slot], area.height)
            }
            Orientation::Horizontal => {
                Rect::new(area.x, area.y + offset, area.width, spans[slot])
            }
        };
        offset += spans[slot];
    }
    rects
}

/// Find the divider under a pointer position. A press within one cell of
/// the boundary between two visible panes counts as a hit.
pub fn divider_at(
    x: u16,
    y: u16,
    sizes: [f64; 3],
    visibility: Visibility,
    orientation: Orientation,
    area: Rect,
) -> Option<Divider> {
    let rects = pane_rects(sizes, visibility, orientation, area);
    let (pos, cross_ok) = match orientation {
        Orientation::Vertical => (x, y >= area.y && y < area.y + area.height),
        Orientation::Horizontal => (y, x >= area.x && x < area.x + area.width),
    };
    if !cross_ok {
        return None;
    }
    let boundary_after = |slot: usize| match orientation {
        Orientation::Vertical => rects[slot].x + rects[slot].width,
        Orientation::Horizontal => rects[slot].y + rects[slot].height,
    };
    if visibility.first {
        let boundary = boundary_after(0);
        if pos >= boundary.saturating_sub(1) && pos <= boundary {
            return Some(Divider::FirstMiddle);
        }
    }
    if visibility.third {
        let boundary = boundary_after(1);
        if pos >= boundary.saturating_sub(1) && pos <= boundary {
            return Some(Divider::MiddleThird);
        }
    }
    None
}

pub fn render(app: &App, frame: &mut Frame) {
    let [body, footer] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)])
        .areas(frame.area());

    if let Some(state) = app.view.state() {
        let rects = pane_rects(state.sizes, state.visibility, app.orientation(), body);
        let border_color = if app.view.is_dragging() {
            app.config.theme.border_drag
        } else {
            app.config.theme.border
        };
        for slot in 0..3 {
            let rect = rects[slot];
            if !state.visibility.slot_visible(slot) || rect.width == 0 || rect.height == 0 {
                continue;
            }
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color))
                .title(Span::styled(
                    PANE_TITLES[slot],
                    Style::default().fg(app.config.theme.title),
                ));
            let inner = block.inner(rect);
            frame.render_widget(block, rect);

            let extent = match app.orientation() {
                Orientation::Vertical => rect.width,
                Orientation::Horizontal => rect.height,
            };
            let lines = vec![
                Line::raw(""),
                Line::styled(
                    format!("  {extent} cells"),
                    Style::default().fg(app.config.theme.dim),
                ),
            ];
            frame.render_widget(Paragraph::new(lines), inner);
        }
    }

    render_status_bar(app, frame, footer);
}

fn render_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let sizes = app
        .view
        .sizes()
        .map(|s| format!(" {:.0} | {:.0} | {:.0}", s[0], s[1], s[2]))
        .unwrap_or_else(|| " measuring".to_string());
    let line = Line::from(vec![
        Span::styled(sizes, Style::default().fg(app.config.theme.title)),
        Span::styled(
            "   q quit  f/t toggle panes  e equalize  [ ] { } nudge  drag borders to resize",
            Style::default().fg(app.config.theme.dim),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
