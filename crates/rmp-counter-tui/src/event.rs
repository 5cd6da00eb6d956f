//! Event plumbing for the TUI.
//!
//! Terminal input, log records and count changes all arrive on one channel so
//! the main loop redraws after each of them.

use crate::app::AppEvent;
use futures::StreamExt;
use ratatui::crossterm::event::Event as CrosstermEvent;
use tokio::sync::{OnceCell, mpsc};

/// Global holding an event sender.
///
/// Only one App can be created due to this.
pub(crate) static GLOBAL_SENDER: OnceCell<mpsc::UnboundedSender<Event>> = OnceCell::const_new();

/// Send an AppEvent to the App using the global sender.
///
/// Must be called after creating an App. Callable from any thread.
macro_rules! app_send {
    ($e:expr) => {{
        let _ = crate::event::GLOBAL_SENDER
            .get()
            .expect("app_send called before app was initialized")
            .send(crate::event::Event::App($e));
    }};
}
pub(crate) use app_send;

/// Like [`app_send!`], but drops the event if no App exists yet.
pub(crate) fn try_app_send(app_event: AppEvent) -> bool {
    match GLOBAL_SENDER.get() {
        Some(sender) => sender.send(Event::App(app_event)).is_ok(),
        None => false,
    }
}

#[derive(Debug)]
pub enum Event {
    /// Input from the terminal.
    Crossterm(CrosstermEvent),

    /// Events raised by the app itself, the logger, or the view model.
    App(AppEvent),
}

#[derive(Debug)]
pub struct EventHandler {
    sender: mpsc::UnboundedSender<Event>,
    receiver: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Creates the handler, installs the global sender and starts reading
    /// terminal input.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        GLOBAL_SENDER
            .set(sender.clone())
            .expect("global sender already initialized");

        tokio::spawn(read_terminal(sender.clone()));

        Self { sender, receiver }
    }

    /// Waits for the next event.
    ///
    /// Fails only if every sender is gone, which cannot happen while this
    /// handler holds its own sender.
    pub async fn next(&mut self) -> anyhow::Result<Event> {
        self.receiver
            .recv()
            .await
            .ok_or(anyhow::anyhow!("failed to receive event"))
    }

    /// Queues an app event for the next iteration of the main loop.
    pub fn send(&mut self, app_event: AppEvent) {
        let _ = self.sender.send(Event::App(app_event));
    }
}

/// Forwards terminal events until the app drops its receiver.
async fn read_terminal(sender: mpsc::UnboundedSender<Event>) {
    let mut reader = crossterm::event::EventStream::new();
    loop {
        tokio::select! {
            _ = sender.closed() => break,
            event = reader.next() => match event {
                Some(Ok(event)) => {
                    if sender.send(Event::Crossterm(event)).is_err() {
                        break;
                    }
                }
                Some(Err(_)) => continue,
                None => break,
            },
        }
    }
}
