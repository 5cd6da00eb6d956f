use crate::{
    event::{Event, EventHandler, app_send},
    ui::log::LogState,
};
use anyhow::Context;
use rmp_counter::{Action, CoreOptions, RmpModel, Subscription, ViewModel};
use ratatui::{
    DefaultTerminal,
    crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
};
use std::path::PathBuf;
use tui_widgets::prompts::{State, Status, TextState};

/// Application.
#[derive(Debug)]
pub struct App<'a> {
    pub running: bool,
    pub events: EventHandler,

    pub view_model: ViewModel,
    _count_subscription: Subscription<i32>,

    pub mode: AppMode,
    pub screen: AppScreen,

    /// Last count delivered to the UI loop.
    pub count: i32,
    pub data_dir: PathBuf,
    pub in_memory: bool,

    pub messages: Vec<String>,

    pub log_state: LogState,
    pub command_state: TextState<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppScreen {
    #[default]
    Home,
    Log,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    #[default]
    Default,
    Command,
}

/// Application events.
#[derive(Debug)]
pub enum AppEvent {
    Log(String),

    Exit,

    CommandMode,
    ExitMode,

    Screen(AppScreen),

    Action(Action),
    Count(i32),
}

macro_rules! app_log {
    ($($arg:tt)*) => {
        crate::event::app_send!(crate::app::AppEvent::Log(format!($($arg)*)));
    };
}
pub(crate) use app_log;

impl<'a> App<'a> {
    /// Constructs a new instance of [`App`] around an already running event
    /// handler, opening the counter model in `data_dir`.
    pub fn new(events: EventHandler, data_dir: PathBuf, in_memory: bool) -> anyhow::Result<Self> {
        let model = RmpModel::with_options(
            data_dir.to_string_lossy().into_owned(),
            CoreOptions {
                init_logging: false,
                in_memory,
            },
        )?;
        let view_model = ViewModel::attach(model)?;

        // updates arrive on the model's delivery thread, hop onto the UI loop
        let count_subscription = view_model
            .count()
            .subscribe(|count| app_send!(AppEvent::Count(*count)));
        let count = view_model.count().read();

        Ok(Self {
            running: true,
            events,

            view_model,
            _count_subscription: count_subscription,

            mode: AppMode::default(),
            screen: AppScreen::default(),

            count,
            data_dir,
            in_memory,

            messages: Vec::new(),

            log_state: LogState::default(),
            command_state: TextState::default(),
        })
    }

    /// Run the application's main loop.
    pub async fn run(mut self, mut terminal: DefaultTerminal) -> anyhow::Result<()> {
        while self.running {
            terminal.draw(|frame| self.render(frame))?;
            match self.events.next().await? {
                Event::Crossterm(event) => {
                    if let crossterm::event::Event::Key(key_event) = event {
                        self.handle_key_events(key_event)?
                    }
                }
                Event::App(app_event) => self
                    .handle_app_events(app_event)
                    .context("handling app event failed")?,
            }
        }

        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    pub fn handle_key_events(&mut self, key_event: KeyEvent) -> anyhow::Result<()> {
        // windows reports releases too
        if key_event.kind != KeyEventKind::Press {
            return Ok(());
        }

        match self.mode {
            AppMode::Default => match (self.screen, key_event.code) {
                // : or / to enter command mode
                (_, KeyCode::Char(':') | KeyCode::Char('/')) => {
                    self.events.send(AppEvent::CommandMode)
                }

                // change screens
                (_, KeyCode::Char('1')) => self.events.send(AppEvent::Screen(AppScreen::Home)),
                (_, KeyCode::Char('2')) => self.events.send(AppEvent::Screen(AppScreen::Log)),
                (_, KeyCode::Char('?')) => self.events.send(AppEvent::Screen(AppScreen::Help)),

                // esc or q to quit
                (_, KeyCode::Esc | KeyCode::Char('q')) => self.events.send(AppEvent::Exit),
                // ctrl+c to quit
                (_, KeyCode::Char('c' | 'C')) if key_event.modifiers == KeyModifiers::CONTROL => {
                    self.events.send(AppEvent::Exit)
                }

                // counter
                (AppScreen::Home, KeyCode::Char('+' | '=' | 'k') | KeyCode::Up) => {
                    self.events.send(AppEvent::Action(Action::Increment))
                }
                (AppScreen::Home, KeyCode::Char('-' | 'j') | KeyCode::Down) => {
                    self.events.send(AppEvent::Action(Action::Decrement))
                }

                // log screen
                (AppScreen::Log, KeyCode::Up) => self.log_state.scroll_up(),
                (AppScreen::Log, KeyCode::Down) => self.log_state.scroll_down(),
                (AppScreen::Log, KeyCode::PageUp) => self.log_state.scroll_page_up(),
                (AppScreen::Log, KeyCode::PageDown) => self.log_state.scroll_page_down(),
                (AppScreen::Log, KeyCode::Home | KeyCode::Char('g')) => {
                    self.log_state.scroll_to_top()
                }
                (AppScreen::Log, KeyCode::End | KeyCode::Char('G')) => {
                    self.log_state.scroll_to_bottom()
                }
                (AppScreen::Log, KeyCode::Char('f')) => self.log_state.toggle_tail(),

                _ => {}
            },

            AppMode::Command => {
                self.command_state.handle_key_event(key_event);

                match self.command_state.status() {
                    Status::Done => {
                        let command = self.command_state.value().to_string();

                        if let Err(e) = self.handle_command(&command) {
                            app_log!("Error: {e:#}");
                        }

                        self.events.send(AppEvent::ExitMode);
                    }
                    Status::Aborted => self.events.send(AppEvent::ExitMode),
                    Status::Pending => {}
                }
            }
        }

        Ok(())
    }

    pub fn handle_app_events(&mut self, app_event: AppEvent) -> anyhow::Result<()> {
        match app_event {
            AppEvent::Log(s) => self.messages.push(s),

            AppEvent::Exit => self.exit(),

            AppEvent::CommandMode => {
                self.mode = AppMode::Command;
                self.command_state.focus();
            }
            AppEvent::ExitMode => {
                self.mode = AppMode::Default;
                self.command_state = TextState::default();
            }

            AppEvent::Screen(screen) => {
                self.screen = screen;
            }

            AppEvent::Action(action) => self.view_model.action(action),
            AppEvent::Count(count) => {
                self.count = count;
            }
        }
        Ok(())
    }

    pub fn handle_command(&mut self, command: &str) -> anyhow::Result<()> {
        if let Some(event) = parse_command(command)? {
            self.events.send(event);
        }
        Ok(())
    }

    /// Exit the app.
    fn exit(&mut self) {
        self.running = false;
    }
}

/// Parses a command-mode line into the event it triggers.
fn parse_command(command: &str) -> anyhow::Result<Option<AppEvent>> {
    let parts = command.split_whitespace().collect::<Vec<_>>();

    let Some(&name) = parts.first() else {
        return Ok(None);
    };

    let event = match name {
        "q" | "quit" => AppEvent::Exit,

        "inc" | "increment" | "+" => AppEvent::Action(Action::Increment),
        "dec" | "decrement" | "-" => AppEvent::Action(Action::Decrement),

        "log" => AppEvent::Screen(AppScreen::Log),
        "home" => AppEvent::Screen(AppScreen::Home),
        "help" | "h" | "?" => AppEvent::Screen(AppScreen::Help),

        _ => anyhow::bail!("unknown command: {command}"),
    };

    if parts.len() > 1 {
        anyhow::bail!("usage: {name}");
    }

    Ok(Some(event))
}
