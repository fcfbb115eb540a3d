//! The sitting engine: queue, in-flight card and grade-driven requeue.
//!
//! A sitting walks one group of the deck card by card. Cards graded
//! [`Grade::Mastered`] are retired; anything else goes to the back of the
//! queue and comes round again after every card currently waiting. The
//! sitting is complete once the queue is empty and nothing is in flight.
//!
//! There is no retry limit unless one is configured: a card that is never
//! mastered keeps coming back.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::error::{SessionError, SessionResult};
use crate::groups;
use crate::models::{Grade, SessionStats};

/// Where the engine is in a sitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No group chosen.
    Idle,
    /// Queue built, nothing shown yet.
    Ready,
    /// A card is in flight.
    Showing { revealed: bool },
    /// Queue exhausted and no card in flight.
    Complete,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Ready => "ready",
            Self::Showing { revealed: false } => "showing the question",
            Self::Showing { revealed: true } => "showing the answer",
            Self::Complete => "complete",
        };
        f.write_str(s)
    }
}

/// What the learner picked when the sitting began.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SittingInfo {
    pub group: usize,
    pub offset: usize,
    /// Cards in the initial queue.
    pub initial_len: usize,
    pub started_at: DateTime<Local>,
}

/// Owns the live queue for one sitting at a time.
#[derive(Debug)]
pub struct Session {
    card_count: usize,
    group_size: usize,
    max_presentations: Option<u32>,

    state: SessionState,
    queue: VecDeque<usize>,
    current: Option<usize>,
    stats: SessionStats,
    sitting: Option<SittingInfo>,

    // Only consulted when a presentation cap is configured.
    presentations: HashMap<usize, u32>,
    dropped: Vec<usize>,
}

impl Session {
    pub fn new(card_count: usize, group_size: usize) -> Self {
        Self {
            card_count,
            group_size,
            max_presentations: None,
            state: SessionState::Idle,
            queue: VecDeque::new(),
            current: None,
            stats: SessionStats::default(),
            sitting: None,
            presentations: HashMap::new(),
            dropped: Vec::new(),
        }
    }

    /// Cap how many times a single card can be shown in one sitting.
    ///
    /// A card that reaches the cap without being mastered is dropped from
    /// the sitting instead of requeued.
    pub fn with_max_presentations(mut self, cap: Option<u32>) -> Self {
        self.max_presentations = cap;
        self
    }

    // ══════════════════════════════════════════════════════════════════════
    // Queries
    // ══════════════════════════════════════════════════════════════════════

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Card index in flight, if any.
    pub fn current_card(&self) -> Option<usize> {
        self.current
    }

    pub fn is_revealed(&self) -> bool {
        matches!(self.state, SessionState::Showing { revealed: true })
    }

    /// Cards waiting behind the current one.
    pub fn remaining_count(&self) -> usize {
        self.queue.len()
    }

    #[cfg(test)]
    pub fn pending(&self) -> impl Iterator<Item = usize> + '_ {
        self.queue.iter().copied()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats.snapshot()
    }

    pub fn sitting(&self) -> Option<&SittingInfo> {
        self.sitting.as_ref()
    }

    /// Cards removed by the presentation cap, in the order they were dropped.
    pub fn dropped(&self) -> &[usize] {
        &self.dropped
    }

    pub fn group_size(&self) -> usize {
        self.group_size
    }

    pub fn group_count(&self) -> usize {
        groups::group_count(self.card_count, self.group_size)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Transitions
    // ══════════════════════════════════════════════════════════════════════

    /// Begin a sitting on `group`, skipping its first `offset` cards.
    ///
    /// Allowed from every state except mid-card; abandon first to switch
    /// groups while a card is shown. On error nothing changes.
    pub fn start(&mut self, group: usize, offset: usize) -> SessionResult<()> {
        if let SessionState::Showing { .. } = self.state {
            return Err(self.refuse("start a sitting"));
        }
        if self.card_count == 0 {
            return Err(SessionError::NoCardsAvailable);
        }

        let queue = groups::build_initial_queue(self.card_count, self.group_size, group, offset)?;

        info!(group, offset, cards = queue.len(), "sitting started");

        self.sitting = Some(SittingInfo {
            group,
            offset,
            initial_len: queue.len(),
            started_at: Local::now(),
        });
        self.queue = queue;
        self.current = None;
        self.stats = SessionStats::default();
        self.presentations.clear();
        self.dropped.clear();
        self.state = SessionState::Ready;
        Ok(())
    }

    /// Move the next queued card into flight, or complete the sitting.
    ///
    /// A no-op once the sitting is complete.
    pub fn advance(&mut self) -> SessionResult<()> {
        match self.state {
            SessionState::Ready => {
                self.pull_next();
                Ok(())
            }
            SessionState::Complete => Ok(()),
            SessionState::Idle | SessionState::Showing { .. } => Err(self.refuse("advance")),
        }
    }

    /// Turn the current card over.
    pub fn reveal(&mut self) -> SessionResult<()> {
        match self.state {
            SessionState::Showing { revealed: false } => {
                self.state = SessionState::Showing { revealed: true };
                Ok(())
            }
            _ => Err(self.refuse("reveal")),
        }
    }

    /// Grade the revealed card and move straight on to the next one.
    pub fn grade(&mut self, grade: Grade) -> SessionResult<()> {
        if self.state != (SessionState::Showing { revealed: true }) {
            return Err(self.refuse("grade"));
        }
        let Some(card) = self.current.take() else {
            return Err(self.refuse("grade"));
        };

        self.stats.record(grade);

        if grade.requeues() {
            let shown = self.presentations.get(&card).copied().unwrap_or(0);
            match self.max_presentations {
                Some(cap) if shown >= cap => {
                    debug!(card, shown, "presentation cap reached, dropping card");
                    self.dropped.push(card);
                }
                _ => self.queue.push_back(card),
            }
        }

        debug!(card, grade = grade.name(), remaining = self.queue.len(), "graded");
        self.pull_next();
        Ok(())
    }

    /// Throw the sitting away and go back to group selection.
    pub fn abandon(&mut self) {
        if self.state != SessionState::Idle {
            debug!(state = %self.state, "sitting abandoned");
        }
        self.state = SessionState::Idle;
        self.queue.clear();
        self.current = None;
        self.stats = SessionStats::default();
        self.sitting = None;
        self.presentations.clear();
        self.dropped.clear();
    }

    fn pull_next(&mut self) {
        match self.queue.pop_front() {
            Some(card) => {
                *self.presentations.entry(card).or_insert(0) += 1;
                self.current = Some(card);
                self.state = SessionState::Showing { revealed: false };
            }
            None => {
                self.current = None;
                self.state = SessionState::Complete;
                info!(
                    mastered = self.stats.mastered,
                    partial = self.stats.partial,
                    missed = self.stats.missed,
                    "sitting complete"
                );
            }
        }
    }

    fn refuse(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            operation,
            state: self.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn started(group: usize, offset: usize) -> Session {
        let mut session = Session::new(150, 30);
        session.start(group, offset).unwrap();
        session
    }

    fn show_and_grade(session: &mut Session, grade: Grade) -> usize {
        let card = session.current_card().unwrap();
        session.reveal().unwrap();
        session.grade(grade).unwrap();
        card
    }

    #[test]
    fn start_builds_queue_without_showing() {
        let session = started(0, 0);
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.current_card(), None);
        assert_eq!(session.pending().collect::<Vec<_>>(), (0..30).collect::<Vec<_>>());
        assert_eq!(session.stats(), SessionStats::default());
    }

    #[test]
    fn worked_scenario_first_group() {
        let mut session = started(0, 0);
        session.advance().unwrap();
        assert_eq!(session.current_card(), Some(0));

        show_and_grade(&mut session, Grade::Missed);
        let mut expected: Vec<usize> = (2..30).collect();
        expected.push(0);
        assert_eq!(session.current_card(), Some(1));
        assert_eq!(session.pending().collect::<Vec<_>>(), expected);
        assert_eq!(
            session.stats(),
            SessionStats { mastered: 0, partial: 0, missed: 1 }
        );

        for expected_card in 1..30 {
            assert_eq!(show_and_grade(&mut session, Grade::Mastered), expected_card);
        }
        assert_eq!(session.current_card(), Some(0));
        assert_eq!(session.remaining_count(), 0);
        assert_eq!(
            session.stats(),
            SessionStats { mastered: 29, partial: 0, missed: 1 }
        );

        show_and_grade(&mut session, Grade::Mastered);
        assert_eq!(session.state(), SessionState::Complete);
        assert_eq!(session.current_card(), None);
        assert_eq!(session.remaining_count(), 0);
        assert_eq!(
            session.stats(),
            SessionStats { mastered: 30, partial: 0, missed: 1 }
        );
    }

    #[test]
    fn grade_straight_after_start_is_refused() {
        let mut session = started(1, 0);
        let before: Vec<usize> = session.pending().collect();

        let err = session.grade(Grade::Mastered).unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidTransition { operation: "grade", state: SessionState::Ready }
        );
        assert_eq!(session.pending().collect::<Vec<_>>(), before);
        assert_eq!(session.stats(), SessionStats::default());
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn grade_before_reveal_is_refused() {
        let mut session = started(0, 0);
        session.advance().unwrap();

        assert!(matches!(
            session.grade(Grade::Partial),
            Err(SessionError::InvalidTransition { .. })
        ));
        assert_eq!(session.current_card(), Some(0));
        assert_eq!(session.remaining_count(), 29);
        assert_eq!(session.stats().total(), 0);
    }

    #[test]
    fn reveal_only_once_and_only_while_showing() {
        let mut session = Session::new(150, 30);
        assert!(session.reveal().is_err());

        session.start(0, 0).unwrap();
        assert!(session.reveal().is_err());

        session.advance().unwrap();
        session.reveal().unwrap();
        assert!(session.is_revealed());
        assert!(session.reveal().is_err());
        assert_eq!(session.remaining_count(), 29);
    }

    #[test]
    fn advance_from_idle_or_mid_card_is_refused() {
        let mut session = Session::new(150, 30);
        assert!(session.advance().is_err());

        session.start(0, 0).unwrap();
        session.advance().unwrap();
        assert!(session.advance().is_err());
        assert_eq!(session.current_card(), Some(0));
        assert_eq!(session.remaining_count(), 29);
    }

    #[test]
    fn always_mastering_completes_after_initial_length() {
        for offset in [0, 7, 29] {
            let mut session = started(3, offset);
            session.advance().unwrap();

            let mut grades = 0;
            while session.state() != SessionState::Complete {
                show_and_grade(&mut session, Grade::Mastered);
                grades += 1;
            }
            assert_eq!(grades, 30 - offset);
            assert_eq!(session.stats().mastered, 30 - offset);
        }
    }

    #[test]
    fn mastered_cards_never_return() {
        let mut session = started(2, 10);
        session.advance().unwrap();

        let mut retired = HashSet::new();
        let mut step = 0;
        while session.state() != SessionState::Complete {
            let grade = match step % 4 {
                0 => Grade::Missed,
                1 => Grade::Partial,
                _ => Grade::Mastered,
            };
            let card = show_and_grade(&mut session, grade);
            if grade == Grade::Mastered {
                retired.insert(card);
            }
            assert!(session.pending().all(|c| !retired.contains(&c)));
            if let Some(current) = session.current_card() {
                assert!(!retired.contains(&current));
            }
            step += 1;
        }
        assert_eq!(retired.len(), 20);
    }

    #[test]
    fn outstanding_cards_are_conserved() {
        let mut session = started(4, 5);
        session.advance().unwrap();

        let initial: HashSet<usize> = (125..150).collect();
        let mut mastered = HashSet::new();
        let mut calls = 0;

        while session.state() != SessionState::Complete {
            let grade = if calls % 3 == 0 { Grade::Partial } else { Grade::Mastered };
            let card = show_and_grade(&mut session, grade);
            calls += 1;
            if grade == Grade::Mastered {
                mastered.insert(card);
            }

            let showing = usize::from(session.current_card().is_some());
            assert_eq!(
                session.remaining_count() + showing,
                initial.len() - mastered.len()
            );
            assert_eq!(session.stats().total(), calls);
            assert!(session.pending().all(|c| initial.contains(&c)));
        }
    }

    #[test]
    fn requeued_card_goes_behind_everything_waiting() {
        let mut session = started(0, 25);
        session.advance().unwrap();
        assert_eq!(session.current_card(), Some(25));

        show_and_grade(&mut session, Grade::Partial);
        assert_eq!(session.pending().collect::<Vec<_>>(), vec![27, 28, 29, 25]);

        show_and_grade(&mut session, Grade::Missed);
        assert_eq!(session.pending().collect::<Vec<_>>(), vec![28, 29, 25, 26]);
        assert_eq!(session.pending().last(), Some(26));
    }

    #[test]
    fn single_card_missed_forever_never_completes() {
        let mut session = started(0, 29);
        session.advance().unwrap();

        for _ in 0..100 {
            assert_eq!(show_and_grade(&mut session, Grade::Missed), 29);
            assert_eq!(session.state(), SessionState::Showing { revealed: false });
        }
        assert_eq!(session.stats().missed, 100);
    }

    #[test]
    fn presentation_cap_drops_stubborn_cards() {
        let mut session = Session::new(150, 30).with_max_presentations(Some(2));
        session.start(0, 28).unwrap();
        session.advance().unwrap();

        show_and_grade(&mut session, Grade::Missed); // 28, first showing
        show_and_grade(&mut session, Grade::Mastered); // 29
        show_and_grade(&mut session, Grade::Missed); // 28, second showing

        assert_eq!(session.state(), SessionState::Complete);
        assert_eq!(session.dropped(), &[28]);
        assert_eq!(session.stats(), SessionStats { mastered: 1, partial: 0, missed: 2 });
    }

    #[test]
    fn empty_deck_cannot_start() {
        let mut session = Session::new(0, 30);
        assert_eq!(session.start(0, 0), Err(SessionError::NoCardsAvailable));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn failed_start_keeps_previous_sitting() {
        let mut session = started(1, 0);
        assert!(matches!(
            session.start(1, 30),
            Err(SessionError::InvalidOffset { .. })
        ));
        assert!(matches!(
            session.start(9, 0),
            Err(SessionError::InvalidGroupIndex { .. })
        ));
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.sitting().map(|s| s.group), Some(1));
        assert_eq!(session.remaining_count(), 30);
    }

    #[test]
    fn start_mid_card_is_refused_but_abandon_always_works() {
        let mut session = started(0, 0);
        session.advance().unwrap();
        assert!(session.start(1, 0).is_err());

        session.abandon();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.current_card(), None);
        assert_eq!(session.remaining_count(), 0);
        assert!(session.sitting().is_none());

        session.start(1, 0).unwrap();
        assert_eq!(session.pending().next(), Some(30));
    }

    #[test]
    fn restart_after_complete_resets_stats() {
        let mut session = started(0, 29);
        session.advance().unwrap();
        show_and_grade(&mut session, Grade::Missed);
        show_and_grade(&mut session, Grade::Mastered);
        assert_eq!(session.state(), SessionState::Complete);
        assert_eq!(session.stats().total(), 2);

        session.start(0, 29).unwrap();
        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.stats(), SessionStats::default());
    }

    #[test]
    fn grade_and_reveal_refused_when_idle_or_complete() {
        let mut session = Session::new(150, 30);
        assert!(matches!(
            session.grade(Grade::Mastered),
            Err(SessionError::InvalidTransition { state: SessionState::Idle, .. })
        ));
        assert!(matches!(
            session.reveal(),
            Err(SessionError::InvalidTransition { state: SessionState::Idle, .. })
        ));
        assert_eq!(session.state(), SessionState::Idle);

        session.start(0, 29).unwrap();
        session.advance().unwrap();
        show_and_grade(&mut session, Grade::Mastered);
        assert_eq!(session.state(), SessionState::Complete);
        let done = SessionStats { mastered: 1, partial: 0, missed: 0 };
        assert_eq!(session.stats(), done);

        for grade in Grade::ALL {
            assert!(matches!(
                session.grade(grade),
                Err(SessionError::InvalidTransition { state: SessionState::Complete, .. })
            ));
        }
        assert!(matches!(
            session.reveal(),
            Err(SessionError::InvalidTransition { state: SessionState::Complete, .. })
        ));
        assert_eq!(session.state(), SessionState::Complete);
        assert_eq!(session.stats(), done);
        assert_eq!(session.current_card(), None);
    }

    #[test]
    fn advance_on_empty_queue_completes_and_stays_complete() {
        let mut session = Session::new(40, 30);
        session.start(1, 20).unwrap();
        assert_eq!(session.remaining_count(), 0);

        session.advance().unwrap();
        assert_eq!(session.state(), SessionState::Complete);
        session.advance().unwrap();
        assert_eq!(session.state(), SessionState::Complete);
        assert_eq!(session.stats().total(), 0);
    }

    #[test]
    fn sitting_info_records_choice() {
        let session = started(2, 3);
        let info = session.sitting().unwrap();
        assert_eq!((info.group, info.offset, info.initial_len), (2, 3, 27));
        assert_eq!(session.group_count(), 5);
        assert_eq!(session.group_size(), 30);
    }
}
