use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::engine::{Divider, SidePane};
use crate::event::{self, AppEvent};
use crate::observer::Orientation;
use crate::tui::Tui;
use crate::ui;
use crate::view::{LayoutHooks, SplitView};

/// Cells a keyboard nudge moves a divider by.
const NUDGE_STEP: f64 = 2.0;

pub struct App {
    pub should_quit: bool,
    pub view: SplitView,
    pub config: Config,
    last_size: (u16, u16),
}

impl App {
    pub fn new(config: Config, key_override: Option<String>) -> Self {
        let view = SplitView::new(config.view_options(key_override), LayoutHooks::default());
        Self {
            should_quit: false,
            view,
            config,
            last_size: (0, 0),
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.config.layout.orientation
    }

    /// The region the panes tile: everything above the status line.
    pub fn body(&self) -> Rect {
        let (w, h) = self.last_size;
        Rect::new(0, 0, w, h.saturating_sub(1))
    }

    pub async fn run(config: Config, key_override: Option<String>) -> Result<()> {
        let mut tui = Tui::new()?;
        let (tx, mut rx) = mpsc::unbounded_channel();
        event::start_event_loop(tx);

        let mut app = App::new(config, key_override);
        let (w, h) = tui.size()?;
        app.handle_event(AppEvent::Resize(w, h));

        while !app.should_quit {
            tui.draw(|frame| ui::render(&app, frame))?;
            match rx.recv().await {
                Some(ev) => app.handle_event(ev),
                None => break,
            }
        }
        Ok(())
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::MouseDown { x, y } => self.handle_mouse_down(x, y),
            AppEvent::MouseDrag { x, y } => {
                let pos = self.pointer_scalar(x, y);
                self.view.drag_move(pos);
            }
            AppEvent::MouseUp => self.view.drag_end(),
            AppEvent::Resize(w, h) => {
                self.last_size = (w, h);
                let body = self.body();
                self.view.container_resized(body.width, body.height);
            }
            AppEvent::Tick => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('f') => {
                let shown = self.view.visibility().first;
                self.view.set_pane_visible(SidePane::First, !shown);
            }
            KeyCode::Char('t') => {
                let shown = self.view.visibility().third;
                self.view.set_pane_visible(SidePane::Third, !shown);
            }
            KeyCode::Char('e') => self.view.equalize(),
            KeyCode::Char('[') => self.view.nudge_divider(Divider::FirstMiddle, -NUDGE_STEP),
            KeyCode::Char(']') => self.view.nudge_divider(Divider::FirstMiddle, NUDGE_STEP),
            KeyCode::Char('{') => self.view.nudge_divider(Divider::MiddleThird, -NUDGE_STEP),
            KeyCode::Char('}') => self.view.nudge_divider(Divider::MiddleThird, NUDGE_STEP),
            _ => {}
        }
    }

    fn handle_mouse_down(&mut self, x: u16, y: u16) {
        let Some(state) = self.view.state() else {
            return;
        };
        let divider = ui::divider_at(
            x,
            y,
            state.sizes,
            state.visibility,
            self.orientation(),
            self.body(),
        );
        if let Some(divider) = divider {
            let pos = self.pointer_scalar(x, y);
            self.view.drag_start(divider, pos);
        }
    }

    /// Collapse the two pointer coordinates to the split-axis scalar the
    /// controller works in.
    fn pointer_scalar(&self, x: u16, y: u16) -> f64 {
        match self.orientation() {
            Orientation::Vertical => x as f64,
            Orientation::Horizontal => y as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_app() -> App {
        let mut config = Config::default();
        config.layout.storage_key = None;
        config.layout.min_pane_size = 10.0;
        let mut app = App::new(config, None);
        // 90 columns of body, plus one status row.
        app.handle_event(AppEvent::Resize(90, 25));
        app
    }

    #[test]
    fn test_resize_measures_body_not_status_bar() {
        let app = make_app();
        assert_eq!(app.view.sizes(), Some([30.0, 30.0, 30.0]));
        assert_eq!(app.body(), Rect::new(0, 0, 90, 24));
    }

    #[test]
    fn test_mouse_drag_on_divider() {
        let mut app = make_app();
        app.handle_event(AppEvent::MouseDown { x: 30, y: 5 });
        assert!(app.view.is_dragging());
        app.handle_event(AppEvent::MouseDrag { x: 35, y: 5 });
        assert_eq!(app.view.sizes(), Some([35.0, 25.0, 30.0]));
        app.handle_event(AppEvent::MouseUp);
        assert!(!app.view.is_dragging());
    }

    #[test]
    fn test_mouse_down_inside_pane_does_not_drag() {
        let mut app = make_app();
        app.handle_event(AppEvent::MouseDown { x: 10, y: 5 });
        assert!(!app.view.is_dragging());
        app.handle_event(AppEvent::MouseDrag { x: 40, y: 5 });
        assert_eq!(app.view.sizes(), Some([30.0, 30.0, 30.0]));
    }

    #[test]
    fn test_visibility_keys_toggle_panes() {
        let mut app = make_app();
        app.handle_event(AppEvent::Key(KeyEvent::new(
            KeyCode::Char('f'),
            KeyModifiers::NONE,
        )));
        assert_eq!(app.view.sizes(), Some([0.0, 60.0, 30.0]));
        app.handle_event(AppEvent::Key(KeyEvent::new(
            KeyCode::Char('f'),
            KeyModifiers::NONE,
        )));
        assert_eq!(app.view.sizes(), Some([30.0, 30.0, 30.0]));
    }

    #[test]
    fn test_nudge_keys_move_divider() {
        let mut app = make_app();
        app.handle_event(AppEvent::Key(KeyEvent::new(
            KeyCode::Char(']'),
            KeyModifiers::NONE,
        )));
        assert_eq!(app.view.sizes(), Some([32.0, 28.0, 30.0]));
        app.handle_event(AppEvent::Key(KeyEvent::new(
            KeyCode::Char('}'),
            KeyModifiers::NONE,
        )));
        assert_eq!(app.view.sizes(), Some([32.0, 30.0, 28.0]));
    }

    #[test]
    fn test_quit_key() {
        let mut app = make_app();
        app.handle_event(AppEvent::Key(KeyEvent::new(
            KeyCode::Char('q'),
            KeyModifiers::NONE,
        )));
        assert!(app.should_quit);
    }
}
