use crossterm::event::{Event, EventStream, KeyEvent, MouseButton, MouseEventKind};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    MouseDown { x: u16, y: u16 },
    MouseDrag { x: u16, y: u16 },
    MouseUp,
    Resize(u16, u16),
    Tick,
}

pub fn start_event_loop(event_tx: mpsc::UnboundedSender<AppEvent>) {
    // Crossterm event reader
    let tx = event_tx.clone();
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        loop {
            match reader.next().await {
                Some(Ok(event)) => {
                    let app_event = match event {
                        Event::Key(key) => AppEvent::Key(key),
                        Event::Mouse(m) => match m.kind {
                            MouseEventKind::Down(MouseButton::Left) => AppEvent::MouseDown {
                                x: m.column,
                                y: m.row,
                            },
                            MouseEventKind::Drag(MouseButton::Left) => AppEvent::MouseDrag {
                                x: m.column,
                                y: m.row,
                            },
                            // Any button release ends a drag, wherever the
                            // pointer happens to be.
                            MouseEventKind::Up(_) => AppEvent::MouseUp,
                            _ => continue,
                        },
                        Event::Resize(w, h) => AppEvent::Resize(w, h),
                        _ => continue,
                    };
                    if tx.send(app_event).is_err() {
                        break;
                    }
                }
                Some(Err(_)) => break,
                None => break,
            }
        }
    });

    // Tick timer for periodic redraws
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(100));
        loop {
            interval.tick().await;
            if event_tx.send(AppEvent::Tick).is_err() {
                break;
            }
        }
    });
}
