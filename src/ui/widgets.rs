//! Custom widgets for the trainer TUI.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{block::BorderType, Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use super::theme::{icons, Theme};
use crate::models::{Grade, SessionStats};

// ══════════════════════════════════════════════════════════════════════════
// Group Buttons Widget
// ══════════════════════════════════════════════════════════════════════════

/// One button per group, labelled with its number and card range.
pub struct GroupButtons<'a> {
    ranges: &'a [std::ops::Range<usize>],
    selected: usize,
    theme: &'a Theme,
}

impl<'a> GroupButtons<'a> {
    pub fn new(ranges: &'a [std::ops::Range<usize>], selected: usize, theme: &'a Theme) -> Self {
        Self { ranges, selected, theme }
    }
}

impl Widget for GroupButtons<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.ranges.is_empty() {
            return;
        }

        let constraints = vec![Constraint::Ratio(1, self.ranges.len() as u32); self.ranges.len()];
        let chunks = Layout::horizontal(constraints).split(area);

        for (i, range) in self.ranges.iter().enumerate() {
            let is_selected = i == self.selected;
            let border_style = if is_selected {
                Style::default().fg(self.theme.colors.accent)
            } else {
                Style::default().fg(self.theme.colors.text_dim)
            };

            let button = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(border_style);
            let inner = button.inner(chunks[i]);
            button.render(chunks[i], buf);

            let number_style = if is_selected {
                self.theme.selected()
            } else {
                self.theme.highlight()
            };
            let text = vec![
                Line::from(Span::styled(format!(" {} ", i + 1), number_style)),
                Line::from(Span::styled(
                    format!("{}-{}", range.start + 1, range.end),
                    self.theme.muted(),
                )),
            ];
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .render(inner, buf);
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Offset Slider Widget
// ══════════════════════════════════════════════════════════════════════════

/// Horizontal slider for the start offset within a group.
pub struct OffsetSlider<'a> {
    offset: usize,
    max: usize,
    theme: &'a Theme,
}

impl<'a> OffsetSlider<'a> {
    pub fn new(offset: usize, max: usize, theme: &'a Theme) -> Self {
        Self { offset, max, theme }
    }

    /// Column of the knob inside a track `width` cells wide.
    fn knob_column(&self, width: u16) -> u16 {
        if self.max == 0 || width <= 1 {
            return 0;
        }
        let span = (width - 1) as usize;
        (self.offset.min(self.max) * span / self.max) as u16
    }
}

impl Widget for OffsetSlider<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 2 || area.width < 3 {
            return;
        }

        let knob = self.knob_column(area.width);
        for x in 0..area.width {
            let (symbol, style) = if x == knob {
                ("●", self.theme.key_highlight())
            } else if x < knob {
                ("━", Style::default().fg(self.theme.colors.primary))
            } else {
                ("─", Style::default().fg(self.theme.colors.text_dim))
            };
            buf.set_string(area.x + x, area.y, symbol, style);
        }

        let label = format!("{} / {}", self.offset, self.max);
        let label_width = label.width() as u16;
        let label_x = (area.x + knob).saturating_sub(label_width / 2);
        let label_x = label_x.min(area.right().saturating_sub(label_width)).max(area.x);
        buf.set_string(label_x, area.y + 1, label, self.theme.highlight());
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Flashcard Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct FlashcardWidget<'a> {
    content: &'a str,
    extra: Option<&'a str>,
    is_front: bool,
    theme: &'a Theme,
}

impl<'a> FlashcardWidget<'a> {
    pub fn new(content: &'a str, extra: Option<&'a str>, is_front: bool, theme: &'a Theme) -> Self {
        Self { content, extra, is_front, theme }
    }
}

impl Widget for FlashcardWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (label, label_style, border_style) = if self.is_front {
            ("QUESTION", self.theme.card_front(), Style::default().fg(self.theme.colors.accent))
        } else {
            ("ANSWER", self.theme.card_back(), Style::default().fg(self.theme.colors.success))
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(label, label_style),
                Span::raw(" "),
            ]))
            .title_alignment(Alignment::Center);

        let inner = block.inner(area);
        block.render(area, buf);

        let text_width = inner.width.saturating_sub(4).max(1) as usize;

        let mut lines: Vec<Line> = textwrap::wrap(self.content, text_width)
            .into_iter()
            .map(|l| Line::from(Span::styled(l.into_owned(), self.theme.title())))
            .collect();

        // Extra notes only accompany the answer side.
        if let (false, Some(extra)) = (self.is_front, self.extra) {
            lines.push(Line::from(""));
            lines.extend(textwrap::wrap(extra, text_width).into_iter().map(|l| {
                Line::from(Span::styled(
                    l.into_owned(),
                    self.theme.muted().add_modifier(Modifier::ITALIC),
                ))
            }));
        }

        // Center vertically
        let content_height = lines.len() as u16;
        let vertical_padding = inner.height.saturating_sub(content_height) / 2;

        let content_area = Rect {
            x: inner.x + 2,
            y: inner.y + vertical_padding,
            width: inner.width.saturating_sub(4),
            height: inner.height.saturating_sub(vertical_padding),
        };

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(content_area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Grade Buttons Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct GradeButtons<'a> {
    enabled: bool,
    theme: &'a Theme,
}

impl<'a> GradeButtons<'a> {
    pub fn new(enabled: bool, theme: &'a Theme) -> Self {
        Self { enabled, theme }
    }
}

impl Widget for GradeButtons<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::horizontal([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

        for (i, grade) in Grade::ALL.iter().enumerate() {
            let color = if self.enabled {
                grade.color_for_theme(self.theme)
            } else {
                self.theme.colors.text_dim
            };

            let button = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color));

            let inner = button.inner(chunks[i]);
            button.render(chunks[i], buf);

            let text = vec![
                Line::from(Span::styled(
                    grade.key().to_string(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )),
                Line::from(vec![
                    Span::styled(icons::for_grade(*grade), Style::default().fg(color)),
                    Span::raw(" "),
                    Span::styled(grade.name(), Style::default().fg(color)),
                ]),
            ];
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .render(inner, buf);
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Key Hints Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct KeyHints<'a> {
    hints: &'a [(&'a str, &'a str)],
    theme: &'a Theme,
}

impl<'a> KeyHints<'a> {
    pub fn new(hints: &'a [(&'a str, &'a str)], theme: &'a Theme) -> Self {
        Self { hints, theme }
    }
}

impl Widget for KeyHints<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let spans: Vec<Span> = self
            .hints
            .iter()
            .enumerate()
            .flat_map(|(i, (key, desc))| {
                let mut spans = Vec::with_capacity(3);
                if i > 0 {
                    spans.push(Span::styled(" │ ", Style::default().fg(self.theme.colors.text_dim)));
                }
                spans.push(Span::styled(*key, self.theme.key_highlight()));
                spans.push(Span::styled(format!(" {}", desc), self.theme.key_hint()));
                spans
            })
            .collect();

        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Tally Widget
// ══════════════════════════════════════════════════════════════════════════

/// Final counts for a finished sitting.
pub struct TallyScreen<'a> {
    heading: String,
    stats: SessionStats,
    cards_in_sitting: usize,
    dropped: usize,
    duration_mins: i64,
    theme: &'a Theme,
}

impl<'a> TallyScreen<'a> {
    pub fn new(
        heading: String,
        stats: SessionStats,
        cards_in_sitting: usize,
        dropped: usize,
        duration_mins: i64,
        theme: &'a Theme,
    ) -> Self {
        Self {
            heading,
            stats,
            cards_in_sitting,
            dropped,
            duration_mins,
            theme,
        }
    }
}

impl Widget for TallyScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.theme.colors.success))
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled("RESULTS", self.theme.card_back()),
                Span::raw(" "),
            ]))
            .title_alignment(Alignment::Center);

        let inner = block.inner(area);
        block.render(area, buf);

        let counts: Vec<Span> = Grade::ALL
            .iter()
            .flat_map(|grade| {
                let style = Style::default()
                    .fg(grade.color_for_theme(self.theme))
                    .add_modifier(Modifier::BOLD);
                vec![
                    Span::styled(format!("{} {}", icons::for_grade(*grade), self.stats.count(*grade)), style),
                    Span::raw("   "),
                ]
            })
            .collect();

        let mut text = vec![
            Line::from(Span::styled(self.heading, self.theme.muted())),
            Line::from(""),
            Line::from(counts),
            Line::from(""),
            Line::from(vec![
                Span::styled("Cards: ", self.theme.muted()),
                Span::styled(self.cards_in_sitting.to_string(), self.theme.highlight()),
                Span::styled("   Answers: ", self.theme.muted()),
                Span::styled(self.stats.total().to_string(), self.theme.highlight()),
            ]),
            Line::from(vec![
                Span::styled("Time: ", self.theme.muted()),
                Span::styled(format!("{} minutes", self.duration_mins), self.theme.highlight()),
            ]),
        ];

        if self.dropped > 0 {
            text.push(Line::from(vec![
                Span::styled("Dropped after too many tries: ", self.theme.muted()),
                Span::styled(
                    self.dropped.to_string(),
                    Style::default().fg(self.theme.colors.grade_missed),
                ),
            ]));
        }

        text.push(Line::from(""));
        text.push(Line::from(vec![
            Span::styled("Press ", Style::default().fg(self.theme.colors.text_dim)),
            Span::styled("Enter", self.theme.key_highlight()),
            Span::styled(" to pick another group, ", Style::default().fg(self.theme.colors.text_dim)),
            Span::styled("r", self.theme.key_highlight()),
            Span::styled(" to go again", Style::default().fg(self.theme.colors.text_dim)),
        ]));

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slider_knob_spans_track() {
        let theme = Theme::default();
        assert_eq!(OffsetSlider::new(0, 29, &theme).knob_column(30), 0);
        assert_eq!(OffsetSlider::new(29, 29, &theme).knob_column(30), 29);
        assert_eq!(OffsetSlider::new(0, 0, &theme).knob_column(30), 0);
    }

    #[test]
    fn flashcard_shows_extra_only_on_answer() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 40, 9);

        let mut buf = Buffer::empty(area);
        FlashcardWidget::new("Paris", Some("Europe"), false, &theme).render(area, &mut buf);
        let rendered: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(rendered.contains("Paris"));
        assert!(rendered.contains("Europe"));

        let mut buf = Buffer::empty(area);
        FlashcardWidget::new("France", Some("Europe"), true, &theme).render(area, &mut buf);
        let rendered: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(rendered.contains("France"));
        assert!(!rendered.contains("Europe"));
    }
}
