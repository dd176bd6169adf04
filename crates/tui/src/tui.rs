//! Terminal setup, input streaming and frame scheduling.
//!
//! `Tui` owns the ratatui terminal. Raw mode, bracketed paste and the
//! alternate screen are enabled on `init` and undone on `restore`, on drop,
//! and from the panic hook.

use anyhow::Result;
use crossterm::event::DisableBracketedPaste;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::Event;
use crossterm::event::KeyEvent;
use crossterm::execute;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::stdout;
use std::io::Stdout;
use std::pin::Pin;
use std::time::Duration;
use tokio::select;
use tokio::sync::broadcast;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_stream::Stream;
use tokio_stream::StreamExt;

/// Type alias for the terminal backend we're using.
pub type TerminalBackend = CrosstermBackend<Stdout>;

/// Requests closer together than this are drawn as a single frame.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Input and redraw events consumed by the app loop.
#[derive(Debug)]
pub enum TuiEvent {
    Key(KeyEvent),
    /// Text from a bracketed paste.
    Paste(String),
    /// Time to render a frame.
    Draw,
}

/// Main TUI wrapper.
pub struct Tui {
    terminal: Terminal<TerminalBackend>,
    frame_tx: mpsc::UnboundedSender<()>,
    draw_tx: broadcast::Sender<()>,
    restored: bool,
}

impl Tui {
    /// Put the terminal in raw mode on the alternate screen.
    pub fn init() -> Result<Self> {
        enable_raw_mode()?;
        execute!(stdout(), EnableBracketedPaste, EnterAlternateScreen)?;
        set_panic_hook();

        let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let (draw_tx, _) = broadcast::channel(1);
        tokio::spawn(coalesce_frames(frame_rx, draw_tx.clone()));

        Ok(Self {
            terminal,
            frame_tx,
            draw_tx,
            restored: false,
        })
    }

    /// Restore the terminal to its original state. Safe to call twice.
    pub fn restore(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        disable_raw_mode()?;
        execute!(stdout(), DisableBracketedPaste, LeaveAlternateScreen)?;
        Ok(())
    }

    /// Get a frame requester for scheduling draws.
    pub fn frame_requester(&self) -> FrameRequester {
        FrameRequester {
            frame_tx: self.frame_tx.clone(),
        }
    }

    /// Merge terminal input and scheduled draws into one stream.
    pub fn event_stream(&self) -> Pin<Box<dyn Stream<Item = TuiEvent> + Send + 'static>> {
        let mut crossterm_events = crossterm::event::EventStream::new();
        let mut draw_rx = self.draw_tx.subscribe();

        let event_stream = async_stream::stream! {
            loop {
                select! {
                    Some(Ok(event)) = crossterm_events.next() => {
                        match event {
                            Event::Key(key_event) => yield TuiEvent::Key(key_event),
                            Event::Paste(pasted) => yield TuiEvent::Paste(pasted),
                            Event::Resize(_, _) => yield TuiEvent::Draw,
                            _ => {}
                        }
                    }
                    result = draw_rx.recv() => {
                        match result {
                            // A lagged receiver still owes exactly one draw.
                            Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                                yield TuiEvent::Draw;
                            }
                            Err(broadcast::error::RecvError::Closed) => break,
                        }
                    }
                }
            }
        };

        Box::pin(event_stream)
    }

    /// Draw the UI with the provided function.
    pub fn draw<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut ratatui::Frame),
    {
        self.terminal.draw(f)?;
        Ok(())
    }

    /// Clear the terminal.
    pub fn clear(&mut self) -> Result<()> {
        self.terminal.clear()?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// Handle for scheduling frame redraws.
#[derive(Clone, Debug)]
pub struct FrameRequester {
    frame_tx: mpsc::UnboundedSender<()>,
}

impl FrameRequester {
    /// Ask for a redraw. Bursts of requests produce one frame.
    pub fn schedule_frame(&self) {
        let _ = self.frame_tx.send(());
    }
}

/// Turn bursts of frame requests into at most one draw per `FRAME_INTERVAL`.
async fn coalesce_frames(mut frame_rx: mpsc::UnboundedReceiver<()>, draw_tx: broadcast::Sender<()>) {
    let mut deadline: Option<Instant> = None;

    loop {
        let next = deadline;
        let tick = async move {
            match next {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        select! {
            request = frame_rx.recv() => {
                if request.is_none() {
                    break;
                }
                deadline.get_or_insert_with(|| Instant::now() + FRAME_INTERVAL);
            }
            _ = tick => {
                deadline = None;
                let _ = draw_tx.send(());
            }
        }
    }
}

/// Set a panic hook that restores the terminal before panicking.
fn set_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), DisableBracketedPaste, LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_frame_requests_are_coalesced() {
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let (draw_tx, mut draw_rx) = broadcast::channel(4);
        tokio::spawn(coalesce_frames(frame_rx, draw_tx));
        let requester = FrameRequester { frame_tx };

        for _ in 0..5 {
            requester.schedule_frame();
        }
        tokio::time::sleep(FRAME_INTERVAL * 3).await;

        assert!(draw_rx.try_recv().is_ok());
        assert!(
            draw_rx.try_recv().is_err(),
            "five requests should yield a single draw"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_coalescer_stops_when_requesters_drop() {
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let (draw_tx, _draw_rx) = broadcast::channel(1);
        let handle = tokio::spawn(coalesce_frames(frame_rx, draw_tx));

        drop(frame_tx);

        handle.await.unwrap();
    }
}
