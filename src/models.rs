//! Data models for cards, grades and the per-sitting tally.

/// Self-assessed recall for the card being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grade {
    Mastered, // Retired for the rest of the sitting
    Partial,  // Close, show again later
    Missed,   // Not recalled, show again later
}

impl Grade {
    pub const ALL: [Grade; 3] = [Grade::Mastered, Grade::Partial, Grade::Missed];

    pub fn from_key(c: char) -> Option<Self> {
        match c {
            '1' => Some(Self::Mastered),
            '2' => Some(Self::Partial),
            '3' => Some(Self::Missed),
            _ => None,
        }
    }

    pub fn key(&self) -> char {
        match self {
            Self::Mastered => '1',
            Self::Partial => '2',
            Self::Missed => '3',
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mastered => "Mastered",
            Self::Partial => "Partial",
            Self::Missed => "Missed",
        }
    }

    /// Whether the card goes back into the queue after this grade.
    pub fn requeues(&self) -> bool {
        !matches!(self, Self::Mastered)
    }

    pub fn color_for_theme(&self, theme: &crate::ui::theme::Theme) -> ratatui::style::Color {
        match self {
            Self::Mastered => theme.colors.grade_mastered,
            Self::Partial => theme.colors.grade_partial,
            Self::Missed => theme.colors.grade_missed,
        }
    }
}

/// A single flashcard. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    /// Position in the card store.
    pub id: usize,
    pub front: String,
    pub back: String,
    pub extra: Option<String>,
}

impl Card {
    pub fn new(id: usize, front: String, back: String, extra: Option<String>) -> Self {
        Self {
            id,
            front,
            back,
            extra: extra.filter(|e| !e.trim().is_empty()),
        }
    }
}

/// Grade counters for one sitting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub mastered: usize,
    pub partial: usize,
    pub missed: usize,
}

impl SessionStats {
    /// Count one grade. Exactly one counter moves.
    pub fn record(&mut self, grade: Grade) {
        match grade {
            Grade::Mastered => self.mastered += 1,
            Grade::Partial => self.partial += 1,
            Grade::Missed => self.missed += 1,
        }
    }

    pub fn snapshot(&self) -> SessionStats {
        *self
    }

    pub fn count(&self, grade: Grade) -> usize {
        match grade {
            Grade::Mastered => self.mastered,
            Grade::Partial => self.partial,
            Grade::Missed => self.missed,
        }
    }

    pub fn total(&self) -> usize {
        self.mastered + self.partial + self.missed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_keys_follow_button_order() {
        for grade in Grade::ALL {
            assert_eq!(Grade::from_key(grade.key()), Some(grade));
        }
        assert_eq!(Grade::from_key('4'), None);
        assert_eq!(Grade::from_key(' '), None);
    }

    #[test]
    fn only_mastered_retires() {
        assert!(!Grade::Mastered.requeues());
        assert!(Grade::Partial.requeues());
        assert!(Grade::Missed.requeues());
    }

    #[test]
    fn record_moves_exactly_one_counter() {
        let mut stats = SessionStats::default();
        stats.record(Grade::Partial);
        assert_eq!(
            stats.snapshot(),
            SessionStats {
                mastered: 0,
                partial: 1,
                missed: 0
            }
        );

        stats.record(Grade::Missed);
        stats.record(Grade::Missed);
        stats.record(Grade::Mastered);
        assert_eq!(stats.count(Grade::Missed), 2);
        assert_eq!(stats.total(), 4);
    }

    #[test]
    fn blank_extra_is_dropped() {
        let card = Card::new(0, "a".into(), "b".into(), Some("  ".into()));
        assert_eq!(card.extra, None);
    }
}
