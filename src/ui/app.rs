//! Main application state and logic.

use std::ops::Range;
use std::path::PathBuf;
use std::time::Instant;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph},
    Frame,
};
use tracing::{debug, warn};

use super::theme::{icons, Theme};
use super::widgets::{FlashcardWidget, GradeButtons, GroupButtons, KeyHints, OffsetSlider, TallyScreen};
use crate::config::Config;
use crate::groups;
use crate::models::Grade;
use crate::session::{Session, SessionState};
use crate::storage::CardStore;

// ══════════════════════════════════════════════════════════════════════════
// Application State
// ══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screen {
    GroupSelect,
    OffsetSelect,
    Study,
    Complete,
}

pub struct App {
    pub screen: Screen,
    pub running: bool,

    // Config and theme
    pub config: Config,
    config_path: Option<PathBuf>,
    pub theme: Theme,

    // Deck and engine
    pub store: CardStore,
    pub session: Session,
    pub group_ranges: Vec<Range<usize>>,

    // Selection
    pub selected_group: usize,
    pub offset: usize,

    // Status message (shown temporarily)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// `config_path` is where theme changes are written; `None` keeps them in memory.
    pub fn new(store: CardStore, config: Config, config_path: Option<PathBuf>) -> Self {
        let theme = Theme::from_name(&config.theme);
        let session = Session::new(store.len(), config.group_size)
            .with_max_presentations(config.max_presentations);

        let group_ranges = (0..session.group_count())
            .filter_map(|g| groups::group_range(store.len(), config.group_size, g).ok())
            .collect();

        Self {
            screen: Screen::GroupSelect,
            running: true,
            config,
            config_path,
            theme,
            store,
            session,
            group_ranges,
            selected_group: 0,
            offset: 0,
            status_message: None,
        }
    }

    pub fn cycle_theme(&mut self) {
        let new_theme_name = self.theme.name.next();
        self.theme = Theme::new(new_theme_name);
        self.config.theme = new_theme_name.as_str().to_string();
        // self.config may carry command line overrides; only the theme is saved
        if let Some(ref path) = self.config_path {
            if let Err(e) = Config::persist_theme(path, &self.config.theme) {
                warn!(error = %e, "failed to save theme");
            }
        }
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Largest offset the slider allows for the selected group.
    pub fn max_offset(&self) -> usize {
        self.group_ranges
            .get(self.selected_group)
            .map(|r| r.len().saturating_sub(1))
            .unwrap_or(0)
    }

    pub fn choose_group(&mut self, group: usize) {
        if group >= self.group_ranges.len() {
            return;
        }
        self.selected_group = group;
        self.offset = 0;
        self.screen = Screen::OffsetSelect;
    }

    pub fn move_offset(&mut self, delta: isize) {
        let max = self.max_offset() as isize;
        self.offset = (self.offset as isize + delta).clamp(0, max) as usize;
    }

    /// Build the queue for the chosen group and show the first card.
    pub fn begin_sitting(&mut self) {
        let result = self
            .session
            .start(self.selected_group, self.offset)
            .and_then(|()| self.session.advance());

        match result {
            Ok(()) => self.sync_screen(),
            Err(e) => {
                warn!(error = %e, "could not start sitting");
                self.set_status(format!("Cannot start: {}", e));
            }
        }
    }

    pub fn reveal(&mut self) {
        if let Err(e) = self.session.reveal() {
            debug!(error = %e, "reveal ignored");
        }
    }

    pub fn grade(&mut self, grade: Grade) {
        match self.session.grade(grade) {
            Ok(()) => self.sync_screen(),
            Err(e) => {
                debug!(error = %e, "grade ignored");
                self.set_status("Reveal the answer first (Space)".to_string());
            }
        }
    }

    /// Drop the sitting and go back to choosing a group.
    pub fn back_to_groups(&mut self) {
        self.session.abandon();
        self.screen = Screen::GroupSelect;
    }

    fn sync_screen(&mut self) {
        self.screen = match self.session.state() {
            SessionState::Idle => Screen::GroupSelect,
            SessionState::Ready => Screen::OffsetSelect,
            SessionState::Showing { .. } => Screen::Study,
            SessionState::Complete => Screen::Complete,
        };
    }

    // ══════════════════════════════════════════════════════════════════════
    // Event Handling
    // ══════════════════════════════════════════════════════════════════════

    pub fn handle_events(&mut self) -> anyhow::Result<()> {
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    return Ok(());
                }
                self.handle_key(key.code);
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyCode) {
        match self.screen {
            Screen::GroupSelect => self.handle_group_select_keys(key),
            Screen::OffsetSelect => self.handle_offset_select_keys(key),
            Screen::Study => self.handle_study_keys(key),
            Screen::Complete => self.handle_complete_keys(key),
        }
    }

    fn handle_group_select_keys(&mut self, key: KeyCode) {
        let count = self.group_ranges.len();
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('t') => self.cycle_theme(),
            KeyCode::Left | KeyCode::Up | KeyCode::Char('h') | KeyCode::Char('k') => {
                if count > 0 {
                    self.selected_group = if self.selected_group == 0 {
                        count - 1
                    } else {
                        self.selected_group - 1
                    };
                }
            }
            KeyCode::Right | KeyCode::Down | KeyCode::Char('l') | KeyCode::Char('j') => {
                if count > 0 {
                    self.selected_group = (self.selected_group + 1) % count;
                }
            }
            KeyCode::Char(c @ '1'..='9') => {
                let group = c as usize - '1' as usize;
                self.choose_group(group);
            }
            KeyCode::Enter => self.choose_group(self.selected_group),
            _ => {}
        }
    }

    fn handle_offset_select_keys(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Char('q') => self.back_to_groups(),
            KeyCode::Char('t') => self.cycle_theme(),
            KeyCode::Left | KeyCode::Char('h') => self.move_offset(-1),
            KeyCode::Right | KeyCode::Char('l') => self.move_offset(1),
            KeyCode::PageDown | KeyCode::Down | KeyCode::Char('j') => self.move_offset(5),
            KeyCode::PageUp | KeyCode::Up | KeyCode::Char('k') => self.move_offset(-5),
            KeyCode::Home => self.offset = 0,
            KeyCode::End => self.offset = self.max_offset(),
            KeyCode::Enter => self.begin_sitting(),
            _ => {}
        }
    }

    fn handle_study_keys(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Char('q') => self.back_to_groups(),
            KeyCode::Char('t') => self.cycle_theme(),
            KeyCode::Char(' ') | KeyCode::Enter => {
                if !self.session.is_revealed() {
                    self.reveal();
                }
            }
            KeyCode::Char(c) => {
                if let Some(grade) = Grade::from_key(c) {
                    self.grade(grade);
                }
            }
            _ => {}
        }
    }

    fn handle_complete_keys(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => self.back_to_groups(),
            KeyCode::Char('r') => self.begin_sitting(),
            KeyCode::Char('t') => self.cycle_theme(),
            _ => {}
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Rendering
    // ══════════════════════════════════════════════════════════════════════

    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        // Clear with background
        frame.render_widget(Clear, area);
        frame.render_widget(
            Block::default().style(Style::default().bg(self.theme.colors.bg)),
            area,
        );

        match self.screen {
            Screen::GroupSelect => self.render_group_select(frame, area),
            Screen::OffsetSelect => self.render_offset_select(frame, area),
            Screen::Study => self.render_study(frame, area),
            Screen::Complete => self.render_complete(frame, area),
        }

        self.render_status(frame, area);
    }

    fn render_group_select(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(2),   // Top padding
            Constraint::Length(2),   // Title
            Constraint::Length(2),   // Prompt
            Constraint::Length(4),   // Buttons
            Constraint::Min(1),      // Spacer
            Constraint::Length(2),   // Hints
        ])
        .split(area);

        let title = Paragraph::new(Line::from(vec![
            Span::styled(self.store.title(), self.theme.title()),
            Span::styled(format!("  ({} cards)", self.store.len()), self.theme.muted()),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(title, chunks[1]);

        let prompt = if self.group_ranges.is_empty() {
            "This deck has no cards".to_string()
        } else {
            format!("Choose a set of {} cards", self.session.group_size())
        };
        frame.render_widget(
            Paragraph::new(prompt)
                .alignment(Alignment::Center)
                .style(self.theme.muted()),
            chunks[2],
        );

        frame.render_widget(
            GroupButtons::new(&self.group_ranges, self.selected_group, &self.theme),
            centered_rect(80, 100, chunks[3]),
        );

        let theme_hint = format!("[{}]", self.theme.name.display_name());
        let hints_data: [(&str, &str); 5] = [
            ("←/→", "select"),
            ("1-9", "pick"),
            ("Enter", "choose"),
            ("t", &theme_hint),
            ("q", "quit"),
        ];
        frame.render_widget(KeyHints::new(&hints_data, &self.theme), chunks[5]);
    }

    fn render_offset_select(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(2),   // Top padding
            Constraint::Length(2),   // Title
            Constraint::Length(2),   // Prompt
            Constraint::Length(2),   // Slider
            Constraint::Length(1),   // Spacing
            Constraint::Length(3),   // Preview
            Constraint::Min(1),      // Spacer
            Constraint::Length(2),   // Hints
        ])
        .split(area);

        let range = self
            .group_ranges
            .get(self.selected_group)
            .cloned()
            .unwrap_or(0..0);

        let title = Paragraph::new(Line::from(vec![
            Span::styled(format!("Set {}", self.selected_group + 1), self.theme.title()),
            Span::styled(
                format!("  cards {}-{}", range.start + 1, range.end),
                self.theme.muted(),
            ),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(title, chunks[1]);

        frame.render_widget(
            Paragraph::new("Choose where to start (0 = first card)")
                .alignment(Alignment::Center)
                .style(self.theme.muted()),
            chunks[2],
        );

        frame.render_widget(
            OffsetSlider::new(self.offset, self.max_offset(), &self.theme),
            centered_rect(60, 100, chunks[3]),
        );

        let first_front = self
            .store
            .get(range.start + self.offset)
            .map(|c| c.front.as_str())
            .unwrap_or("");
        let in_sitting = range.len().saturating_sub(self.offset);
        let preview = vec![
            Line::from(vec![
                Span::styled("First card: ", self.theme.muted()),
                Span::styled(first_front, self.theme.highlight()),
            ]),
            Line::from(vec![
                Span::styled(in_sitting.to_string(), self.theme.highlight()),
                Span::styled(" cards in this sitting", self.theme.muted()),
            ]),
        ];
        frame.render_widget(
            Paragraph::new(preview).alignment(Alignment::Center),
            chunks[5],
        );

        let hints = KeyHints::new(&[
            ("←/→", "±1"),
            ("PgUp/PgDn", "±5"),
            ("Enter", "start"),
            ("Esc", "back"),
        ], &self.theme);
        frame.render_widget(hints, chunks[7]);
    }

    fn render_study(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(2),   // Header
            Constraint::Length(1),   // Progress
            Constraint::Length(1),   // Separator
            Constraint::Min(8),      // Card
            Constraint::Length(1),   // Separator
            Constraint::Length(4),   // Buttons
            Constraint::Length(2),   // Hints
        ])
        .split(area);

        let header = Paragraph::new(Line::from(vec![
            Span::styled(self.store.title(), self.theme.title()),
            Span::styled(format!("  ·  Set {}", self.selected_group + 1), self.theme.muted()),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(header, chunks[0]);

        let stats = self.session.stats();
        let mut progress = vec![
            Span::styled("Remaining ", self.theme.muted()),
            Span::styled(
                self.session.remaining_count().to_string(),
                self.theme.highlight(),
            ),
            Span::raw("   "),
        ];
        for grade in Grade::ALL {
            progress.push(Span::styled(
                format!("{} {}  ", icons::for_grade(grade), stats.count(grade)),
                Style::default().fg(grade.color_for_theme(&self.theme)),
            ));
        }
        frame.render_widget(
            Paragraph::new(Line::from(progress)).alignment(Alignment::Center),
            chunks[1],
        );

        let revealed = self.session.is_revealed();
        if let Some(card) = self.session.current_card().and_then(|id| self.store.get(id)) {
            let content = if revealed { &card.back } else { &card.front };
            frame.render_widget(
                FlashcardWidget::new(content, card.extra.as_deref(), !revealed, &self.theme),
                centered_rect(80, 100, chunks[3]),
            );
        }

        frame.render_widget(
            GradeButtons::new(revealed, &self.theme),
            centered_rect(80, 100, chunks[5]),
        );

        let hints = if revealed {
            KeyHints::new(&[
                ("1", "mastered"),
                ("2", "partial"),
                ("3", "missed"),
                ("Esc", "quit set"),
            ], &self.theme)
        } else {
            KeyHints::new(&[
                ("Space", "show answer"),
                ("Esc", "quit set"),
            ], &self.theme)
        };
        frame.render_widget(hints, chunks[6]);
    }

    fn render_complete(&mut self, frame: &mut Frame, area: Rect) {
        let card_area = centered_rect(60, 50, area);

        let (heading, initial_len, duration_mins) = self
            .session
            .sitting()
            .map(|s| {
                let heading = format!(
                    "Set {} from card {} · started {}",
                    s.group + 1,
                    s.offset + 1,
                    s.started_at.format("%H:%M")
                );
                let mins = (chrono::Local::now() - s.started_at).num_minutes();
                (heading, s.initial_len, mins)
            })
            .unwrap_or_default();

        frame.render_widget(
            TallyScreen::new(
                heading,
                self.session.stats(),
                initial_len,
                self.session.dropped().len(),
                duration_mins,
                &self.theme,
            ),
            card_area,
        );
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        // Show status message if recent (within 5 seconds)
        if let Some((ref msg, time)) = self.status_message {
            if time.elapsed().as_secs() < 5 && area.height > 3 {
                let status = Paragraph::new(msg.as_str())
                    .alignment(Alignment::Center)
                    .style(
                        Style::default()
                            .fg(self.theme.colors.grade_partial)
                            .add_modifier(Modifier::BOLD),
                    );
                // Render above the hints
                let status_area = Rect {
                    x: area.x,
                    y: area.bottom().saturating_sub(3),
                    width: area.width,
                    height: 1,
                };
                frame.render_widget(status, status_area);
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Helper Functions
// ══════════════════════════════════════════════════════════════════════════

/// Create a centered rectangle.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}
