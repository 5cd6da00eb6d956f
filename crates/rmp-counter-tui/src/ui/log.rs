use crate::app::App;
use ratatui::{
    Frame,
    layout::{Margin, Rect},
    style::Stylize,
    symbols::border,
    text::Line,
    widgets::{Block, Scrollbar, ScrollbarOrientation, ScrollbarState, Widget},
};

/// Scroll position of the log screen.
///
/// While tailing, the view sticks to the newest line.
#[derive(Debug)]
pub struct LogState {
    offset: usize,
    tail: bool,

    scrollbar_state: ScrollbarState,
    content_height: usize,
    viewport_height: usize,
}

impl Default for LogState {
    fn default() -> Self {
        LogState {
            offset: 0,
            tail: true,

            scrollbar_state: ScrollbarState::default(),
            content_height: 0,
            viewport_height: 0,
        }
    }
}

impl LogState {
    fn max_offset(&self) -> usize {
        self.content_height.saturating_sub(self.viewport_height)
    }

    pub fn is_at_bottom(&self) -> bool {
        self.offset >= self.max_offset()
    }

    pub fn scroll_up(&mut self) {
        if self.tail {
            // first press only detaches from the tail
            self.tail = false;
        } else {
            self.offset = self.offset.saturating_sub(1);
        }
    }

    pub fn scroll_down(&mut self) {
        if self.is_at_bottom() {
            self.tail = true;
        } else {
            self.offset += 1;
        }
    }

    pub fn scroll_page_up(&mut self) {
        self.offset = self.offset.saturating_sub(self.viewport_height);
        self.tail = false;
    }

    pub fn scroll_page_down(&mut self) {
        self.offset = (self.offset + self.viewport_height).min(self.max_offset());
        self.tail = self.is_at_bottom();
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
        self.tail = false;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset();
        self.tail = true;
    }

    pub fn toggle_tail(&mut self) {
        if self.tail {
            self.tail = false;
        } else {
            self.scroll_to_bottom();
        }
    }

    /// Records the size of the content and the viewport for this frame.
    fn resize(&mut self, content_height: usize, viewport_height: usize) {
        self.content_height = content_height;
        self.viewport_height = viewport_height;

        if self.tail {
            self.offset = self.max_offset();
        }
    }
}

impl<'a> App<'a> {
    pub(super) fn render_log_screen(&mut self, frame: &mut Frame, screen_area: Rect) {
        let state = &mut self.log_state;

        let follow_hint = if state.tail {
            Line::from(vec![" Stop Following ".into(), "<f> ".blue().bold()])
        } else {
            Line::from(vec![" Follow ".into(), "<f> ".blue().bold()])
        };
        let block = Block::bordered()
            .border_set(border::THICK)
            .title(Line::from(" Log ".bold()).centered())
            .title_bottom(follow_hint.right_aligned());

        let inner_area = block.inner(screen_area);
        state.resize(self.messages.len(), inner_area.height as usize);

        let position = if !state.is_at_bottom() {
            Line::from(" ↓ more below ".blue().bold())
        } else if state.tail {
            Line::from(" … following ".blue().bold())
        } else {
            Line::from(" … at end ".blue().bold())
        };
        let block = block.title_bottom(position.left_aligned());

        for (y, message) in self
            .messages
            .iter()
            .skip(state.offset)
            .take(inner_area.height as usize)
            .enumerate()
        {
            frame.buffer_mut().set_line(
                inner_area.left(),
                inner_area.top() + y as u16,
                &Line::from(message.as_str()),
                inner_area.width,
            );
        }

        block.render(screen_area, frame.buffer_mut());

        state.scrollbar_state = state
            .scrollbar_state
            .content_length(state.max_offset())
            .viewport_content_length(state.viewport_height)
            .position(state.offset);

        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(None)
            .track_symbol(None)
            .end_symbol(None);
        frame.render_stateful_widget(
            scrollbar,
            screen_area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut state.scrollbar_state,
        );
    }
}
