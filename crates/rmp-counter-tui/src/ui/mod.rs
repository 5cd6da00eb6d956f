//! The app TUI.

pub mod log;

use crate::app::{App, AppMode, AppScreen};
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::Stylize,
    symbols::border,
    text::{Line, Text},
    widgets::{Block, Paragraph, Tabs, Widget},
};
use tui_widgets::prompts::{Prompt, TextPrompt};

const TITLE: &str = "Counter TUI";

impl<'a> App<'a> {
    // we're using this instead of Widget::render because we also need the
    // frame to use TextPrompt
    pub fn render(&mut self, frame: &mut Frame) {
        use Constraint::{Length, Min};

        let show_command = self.mode == AppMode::Command;

        let mut constraints = vec![Length(1), Min(0)];
        if show_command {
            constraints.push(Length(3));
        }
        let areas = Layout::vertical(constraints).split(frame.area());
        let (header_area, inner_area) = (areas[0], areas[1]);

        if show_command {
            self.render_command(frame, areas[2]);
        }

        let [tabs_area, title_area] =
            Layout::horizontal([Min(0), Length(TITLE.len() as u16)]).areas(header_area);

        let selected_tab_index = match self.screen {
            AppScreen::Home => 0,
            AppScreen::Log => 1,
            AppScreen::Help => 2,
        };
        let titles = ["Home", "Log", "Help"]
            .into_iter()
            .enumerate()
            .map(|(i, s)| {
                let key = if s == "Help" {
                    "?".blue().bold()
                } else {
                    (i + 1).to_string().blue().bold()
                };

                if i == selected_tab_index {
                    Line::from(vec!["[".blue().bold(), key, "] ".blue().bold(), s.into()])
                } else {
                    Line::from(vec!["<".blue().bold(), key, "> ".blue().bold(), s.into()])
                }
            })
            .collect::<Vec<_>>();
        Tabs::new(titles)
            .select(None)
            .padding("", "")
            .divider(" ")
            .render(tabs_area, frame.buffer_mut());

        TITLE.bold().render(title_area, frame.buffer_mut());

        match self.screen {
            AppScreen::Home => self.render_home_screen(frame, inner_area),
            AppScreen::Log => self.render_log_screen(frame, inner_area),
            AppScreen::Help => self.render_help_screen(frame, inner_area),
        }
    }

    fn render_command(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered().border_set(border::THICK);

        TextPrompt::from("Command")
            .with_block(block)
            .draw(frame, area, &mut self.command_state);
    }

    fn render_home_screen(&mut self, frame: &mut Frame, area: Rect) {
        let title = Line::from(" Counter ".bold());
        let instructions = Line::from(vec![
            " Decrement ".into(),
            "<->".blue().bold(),
            " Increment ".into(),
            "<+>".blue().bold(),
            " Quit ".into(),
            "<q> ".blue().bold(),
        ]);
        let storage = if self.in_memory {
            Line::from(" in memory ".yellow())
        } else {
            Line::from(format!(" {} ", self.data_dir.display()).yellow())
        };
        let block = Block::bordered()
            .title(title.centered())
            .title_top(instructions.right_aligned())
            .title_bottom(storage.left_aligned())
            .border_set(border::THICK);

        let inner = block.inner(area);
        block.render(area, frame.buffer_mut());

        let [row] = Layout::vertical([Constraint::Length(1)])
            .flex(Flex::Center)
            .areas(inner);

        Line::from(vec![
            "[ - ]".red().bold(),
            "   ".into(),
            self.count.to_string().bold(),
            "   ".into(),
            "[ + ]".green().bold(),
        ])
        .centered()
        .render(row, frame.buffer_mut());
    }

    fn render_help_screen(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .title(Line::from(" Help ".bold()).centered())
            .border_set(border::THICK);

        let key = |k: &'static str| k.blue().bold();

        let text = Text::from(vec![
            Line::from("Keys".bold()),
            Line::from(vec![key("+ k ↑"), "  increment (home)".into()]),
            Line::from(vec![key("- j ↓"), "  decrement (home)".into()]),
            Line::from(vec![key("1 2 ?"), "  home, log, help".into()]),
            Line::from(vec![key("f g G"), "  follow, top, bottom (log)".into()]),
            Line::from(vec![key(": /  "), "  command mode".into()]),
            Line::from(vec![key("q Esc"), "  quit".into()]),
            Line::from(""),
            Line::from("Commands".bold()),
            Line::from(vec![key("inc  "), "  increment".into()]),
            Line::from(vec![key("dec  "), "  decrement".into()]),
            Line::from(vec![key("home "), "  show the counter".into()]),
            Line::from(vec![key("log  "), "  show the log".into()]),
            Line::from(vec![key("q    "), "  quit".into()]),
        ]);

        Paragraph::new(text)
            .block(block)
            .render(area, frame.buffer_mut());
    }
}
