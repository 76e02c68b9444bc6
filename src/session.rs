use std::collections::HashSet;

use chrono::Utc;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Level};
use crate::cursor::{Arrow, Cursor, Selection};
use crate::events::{GameEvent, ProgressSummary};
use crate::grid::{Coord, Grid};
use crate::platform::{Haptic, Platform};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionState {
    Active,
    Completed,
    TimedOut,
    Abandoned,
}

/// Serialized form of an in-progress session, stored under the
/// `gameProgress` key and restorable against the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub level: u32,
    pub inputs: Vec<Option<char>>,
    pub score: i32,
    pub hints: u32,
    pub elapsed: u32,
}

/// `level·100 + time bonus − 10·hints`. The bonus bottoms out at zero but the
/// total is deliberately left unclamped; heavy hint use can go negative.
pub fn score_for(level: &Level, elapsed: u32, hints_used: u32) -> i32 {
    let bonus = level.time_limit.saturating_sub(elapsed) as i32;
    level.id as i32 * 100 + bonus - hints_used as i32 * 10
}

/// One play-through of a level. All mutation happens on the caller's thread;
/// the only side channels are the injected platform capabilities.
pub struct Session<'a> {
    level: &'a Level,
    final_level: bool,
    grid: Grid,
    cursor: Cursor,
    state: SessionState,
    elapsed: u32,
    hints_used: u32,
    score: i32,
    solved_words: HashSet<usize>,
    platform: &'a dyn Platform,
}

impl<'a> Session<'a> {
    pub fn start(catalog: &'a Catalog, level_id: u32, platform: &'a dyn Platform) -> Self {
        let session = Self::build(catalog, level_id, platform);
        session.emit(GameEvent::GameStarted {
            level: session.level.id,
            timestamp: Utc::now(),
        });
        session
    }

    /// Rebuild a session from a saved snapshot. Does not announce a fresh
    /// start over the bot channel.
    pub fn resume(catalog: &'a Catalog, snapshot: &SessionSnapshot, platform: &'a dyn Platform) -> Self {
        let mut session = Self::build(catalog, snapshot.level, platform);
        session.grid.apply_inputs(&snapshot.inputs);
        session.score = snapshot.score;
        session.hints_used = snapshot.hints;
        session.elapsed = snapshot.elapsed;
        for (i, word) in session.level.words.iter().enumerate() {
            if session.grid.is_word_solved(word) {
                session.solved_words.insert(i);
            }
        }
        session
    }

    fn build(catalog: &'a Catalog, level_id: u32, platform: &'a dyn Platform) -> Self {
        let level = catalog.level(level_id);
        Self {
            level,
            final_level: level.id >= catalog.max_level(),
            grid: Grid::build(&level.words),
            cursor: Cursor::new(),
            state: SessionState::Active,
            elapsed: 0,
            hints_used: 0,
            score: 0,
            solved_words: HashSet::new(),
            platform,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn level(&self) -> &Level {
        self.level
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn selection(&self) -> Option<Selection> {
        self.cursor.selection()
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn remaining(&self) -> u32 {
        self.level.time_limit.saturating_sub(self.elapsed)
    }

    pub fn hints_used(&self) -> u32 {
        self.hints_used
    }

    pub fn select(&mut self, coord: Coord) -> bool {
        self.is_active() && self.cursor.select(&self.grid, &self.level.words, coord)
    }

    pub fn type_char(&mut self, value: char) -> bool {
        if !self.is_active() || !self.cursor.type_char(&mut self.grid, value) {
            return false;
        }
        self.platform.haptic(Haptic::LightImpact);
        self.check_completion();
        true
    }

    pub fn backspace(&mut self) -> bool {
        self.is_active() && self.cursor.backspace(&mut self.grid)
    }

    pub fn arrow(&mut self, arrow: Arrow) -> bool {
        self.is_active() && self.cursor.arrow(&self.grid, arrow)
    }

    /// Reveal the expected letter of the first unsolved cell, in word-list
    /// order. Each reveal costs ten points at completion time.
    pub fn use_hint(&mut self) -> Option<Coord> {
        if !self.is_active() {
            return None;
        }
        let target = self.level.words.iter().find_map(|word| {
            word.cells()
                .find(|&coord| matches!(self.grid.get(coord), Some(cell) if !cell.is_solved()))
        })?;
        let expected = self.grid.get(target)?.expected();
        self.grid.set_input(target, expected);
        self.hints_used += 1;
        self.platform.haptic(Haptic::MediumImpact);
        self.check_completion();
        Some(target)
    }

    /// Advance the countdown by one sampled second. Reaching the limit moves
    /// the session into the terminal timed-out state: no score, error cue,
    /// blocking notice. Ticks against a finished session are no-ops.
    pub fn tick(&mut self) -> SessionState {
        if self.is_active() {
            self.elapsed += 1;
            if self.elapsed >= self.level.time_limit {
                self.state = SessionState::TimedOut;
                self.platform.haptic(Haptic::Error);
                self.platform.alert("Waktu habis! Permainan berakhir.");
            }
        }
        self.state
    }

    /// Send a help request carrying the current fill summary.
    pub fn request_help(&self) {
        let summary = ProgressSummary::from(self.grid.fill_stats(&self.level.words));
        self.emit(GameEvent::HelpRequested {
            level: self.level.id,
            current_progress: summary,
            timestamp: Utc::now(),
        });
    }

    /// Leave the session. Returns the final snapshot for a best-effort save;
    /// the caller is not expected to wait on persistence.
    pub fn exit(&mut self) -> SessionSnapshot {
        if self.is_active() {
            self.state = SessionState::Abandoned;
        }
        self.snapshot()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            level: self.level.id,
            inputs: self.grid.inputs(),
            score: self.score,
            hints: self.hints_used,
            elapsed: self.elapsed,
        }
    }

    // Ran after every input. Idempotent; the completion transition itself
    // fires at most once per session, guarded by the active state.
    fn check_completion(&mut self) {
        if !self.is_active() {
            return;
        }
        let mut all_solved = true;
        for (i, word) in self.level.words.iter().enumerate() {
            if self.grid.is_word_solved(word) {
                if self.solved_words.insert(i) {
                    // localized cue for a freshly matched word
                    self.platform.haptic(Haptic::Success);
                }
            } else {
                self.solved_words.remove(&i);
                all_solved = false;
            }
        }
        if all_solved {
            self.complete();
        }
    }

    fn complete(&mut self) {
        self.state = SessionState::Completed;
        self.score = score_for(self.level, self.elapsed, self.hints_used);
        self.platform.haptic(Haptic::Success);
        let timestamp = Utc::now();
        let event = if self.final_level {
            GameEvent::GameCompleted {
                level: self.level.id,
                score: self.score,
                time: self.elapsed,
                hints_used: self.hints_used,
                timestamp,
            }
        } else {
            GameEvent::LevelCompleted {
                level: self.level.id,
                score: self.score,
                time: self.elapsed,
                hints_used: self.hints_used,
                timestamp,
            }
        };
        self.emit(event);
    }

    fn emit(&self, event: GameEvent) {
        match serde_json::to_string(&event) {
            Ok(payload) => self.platform.send_data(&payload),
            Err(err) => warn!("failed to encode game event: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::catalog::{Catalog, Direction, Level, WordPlacement};

    #[derive(Default)]
    struct RecordingPlatform {
        haptics: RefCell<Vec<Haptic>>,
        alerts: RefCell<Vec<String>>,
        sent: RefCell<Vec<String>>,
    }

    impl RecordingPlatform {
        fn sent_events(&self) -> Vec<GameEvent> {
            self.sent
                .borrow()
                .iter()
                .map(|payload| GameEvent::parse(payload).unwrap())
                .collect()
        }

        fn completions(&self) -> usize {
            self.sent_events()
                .iter()
                .filter(|event| {
                    matches!(
                        event,
                        GameEvent::LevelCompleted { .. } | GameEvent::GameCompleted { .. }
                    )
                })
                .count()
        }
    }

    impl Platform for RecordingPlatform {
        fn haptic(&self, feedback: Haptic) {
            self.haptics.borrow_mut().push(feedback);
        }

        fn alert(&self, message: &str) {
            self.alerts.borrow_mut().push(message.to_owned());
        }

        fn send_data(&self, payload: &str) {
            self.sent.borrow_mut().push(payload.to_owned());
        }
    }

    // CAT across / COW down, solvable, as levels 1 and 2
    fn tiny_catalog() -> Catalog {
        let words = || {
            vec![
                WordPlacement::new("CAT", "feline", 0, 0, Direction::Across),
                WordPlacement::new("COW", "bovine", 0, 0, Direction::Down),
            ]
        };
        Catalog::new(vec![Level::new(1, words()).unwrap(), Level::new(2, words()).unwrap()]).unwrap()
    }

    fn solve(session: &mut Session) {
        session.select((0, 0));
        for letter in "cat".chars() {
            session.type_char(letter);
        }
        session.select((1, 0));
        for letter in "ow".chars() {
            session.type_char(letter);
        }
    }

    #[test]
    fn start_announces_over_the_bot_channel() {
        let catalog = tiny_catalog();
        let platform = RecordingPlatform::default();
        let session = Session::start(&catalog, 1, &platform);
        assert!(session.is_active());
        assert_eq!(session.remaining(), session.level().time_limit);
        assert!(matches!(
            platform.sent_events().as_slice(),
            [GameEvent::GameStarted { level: 1, .. }]
        ));
    }

    #[test]
    fn solving_every_word_completes_exactly_once() {
        let catalog = tiny_catalog();
        let platform = RecordingPlatform::default();
        let mut session = Session::start(&catalog, 1, &platform);
        for _ in 0..10 {
            session.tick();
        }
        solve(&mut session);
        assert_eq!(session.state(), SessionState::Completed);
        // level 1 of 2: a plain level completion
        let events = platform.sent_events();
        match events.last().unwrap() {
            GameEvent::LevelCompleted { level, score, time, hints_used, .. } => {
                assert_eq!(*level, 1);
                assert_eq!(*time, 10);
                assert_eq!(*hints_used, 0);
                assert_eq!(*score, 100 + (330 - 10));
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(platform.completions(), 1);
        assert_eq!(session.score(), 420);

        // stray keystrokes after completion must not re-fire side effects
        assert!(!session.type_char('x'));
        assert!(!session.select((0, 0)));
        session.tick();
        assert_eq!(platform.completions(), 1);
        assert_eq!(session.state(), SessionState::Completed);
    }

    #[test]
    fn final_level_reports_game_completed() {
        let catalog = tiny_catalog();
        let platform = RecordingPlatform::default();
        let mut session = Session::start(&catalog, 2, &platform);
        solve(&mut session);
        assert!(matches!(
            platform.sent_events().last().unwrap(),
            GameEvent::GameCompleted { level: 2, .. }
        ));
    }

    #[test]
    fn one_wrong_letter_means_no_completion() {
        let catalog = tiny_catalog();
        let platform = RecordingPlatform::default();
        let mut session = Session::start(&catalog, 1, &platform);
        session.select((0, 0));
        session.type_char('c');
        session.type_char('a');
        session.type_char('b'); // CAB, not CAT
        session.select((1, 0));
        session.type_char('o');
        session.type_char('w');
        assert!(session.is_active());
        assert_eq!(platform.completions(), 0);
    }

    #[test]
    fn per_word_success_cue_fires_once_per_transition() {
        let catalog = tiny_catalog();
        let platform = RecordingPlatform::default();
        let mut session = Session::start(&catalog, 1, &platform);
        session.select((0, 0));
        for letter in "cat".chars() {
            session.type_char(letter);
        }
        let successes = platform
            .haptics
            .borrow()
            .iter()
            .filter(|&&h| h == Haptic::Success)
            .count();
        assert_eq!(successes, 1);
    }

    #[test]
    fn score_formula_boundary_and_negative_cases() {
        let level = Level::new(
            1,
            vec![WordPlacement::new("AB", "x", 0, 0, Direction::Across)],
        )
        .unwrap();
        // bonus is exactly zero when the clock runs out as the last letter lands
        assert_eq!(score_for(&level, level.time_limit, 0), 100);
        assert_eq!(score_for(&level, level.time_limit + 5, 0), 100);
        assert_eq!(score_for(&level, 0, 0), 100 + 330);
        // uncapped hint penalty can push the total negative
        assert_eq!(score_for(&level, level.time_limit, 11), -10);
    }

    #[test]
    fn hints_reveal_letters_and_cost_points() {
        let catalog = tiny_catalog();
        let platform = RecordingPlatform::default();
        let mut session = Session::start(&catalog, 1, &platform);
        // first unsolved cell in word-list order is CAT's C
        assert_eq!(session.use_hint(), Some((0, 0)));
        assert_eq!(session.grid().get((0, 0)).unwrap().input(), Some('C'));
        for _ in 0..4 {
            session.use_hint();
        }
        // every cell revealed: the puzzle completes itself
        assert_eq!(session.state(), SessionState::Completed);
        assert_eq!(session.hints_used(), 5);
        assert_eq!(session.score(), 100 + 330 - 50);
        assert_eq!(session.use_hint(), None);
    }

    #[test]
    fn running_out_of_time_is_terminal_and_scoreless() {
        let catalog = tiny_catalog();
        let platform = RecordingPlatform::default();
        let mut session = Session::start(&catalog, 1, &platform);
        for _ in 0..session.level().time_limit {
            session.tick();
        }
        assert_eq!(session.state(), SessionState::TimedOut);
        assert_eq!(session.remaining(), 0);
        assert_eq!(session.score(), 0);
        assert_eq!(platform.alerts.borrow().len(), 1);
        assert_eq!(platform.completions(), 0);
        // the countdown is cancelled: further ticks change nothing
        session.tick();
        assert_eq!(session.elapsed(), session.level().time_limit);
        assert!(!session.type_char('c'));
    }

    #[test]
    fn exit_abandons_and_returns_a_snapshot() {
        let catalog = tiny_catalog();
        let platform = RecordingPlatform::default();
        let mut session = Session::start(&catalog, 1, &platform);
        session.select((0, 0));
        session.type_char('c');
        session.tick();
        let snapshot = session.exit();
        assert_eq!(session.state(), SessionState::Abandoned);
        assert_eq!(snapshot.level, 1);
        assert_eq!(snapshot.elapsed, 1);

        let resumed = Session::resume(&catalog, &snapshot, &platform);
        assert!(resumed.is_active());
        assert_eq!(resumed.elapsed(), 1);
        assert_eq!(resumed.grid().get((0, 0)).unwrap().input(), Some('C'));
    }

    #[test]
    fn resume_recognizes_already_solved_words_silently() {
        let catalog = tiny_catalog();
        let platform = RecordingPlatform::default();
        let mut session = Session::start(&catalog, 1, &platform);
        session.select((0, 0));
        for letter in "cat".chars() {
            session.type_char(letter);
        }
        let snapshot = session.exit();

        let quiet = RecordingPlatform::default();
        let mut resumed = Session::resume(&catalog, &snapshot, &quiet);
        assert!(quiet.sent.borrow().is_empty());
        // finishing the remaining word completes without re-crediting CAT
        resumed.select((1, 0));
        resumed.type_char('o');
        resumed.type_char('w');
        assert_eq!(resumed.state(), SessionState::Completed);
        assert_eq!(quiet.completions(), 1);
    }

    #[test]
    fn help_request_carries_the_fill_summary() {
        let catalog = tiny_catalog();
        let platform = RecordingPlatform::default();
        let mut session = Session::start(&catalog, 1, &platform);
        session.select((0, 0));
        for letter in "cat".chars() {
            session.type_char(letter);
        }
        session.request_help();
        match platform.sent_events().last().unwrap() {
            GameEvent::HelpRequested { level, current_progress, .. } => {
                assert_eq!(*level, 1);
                assert_eq!(current_progress.completed_words, 1);
                assert_eq!(current_progress.total_words, 2);
                assert_eq!(current_progress.filled_cells, 3);
                assert_eq!(current_progress.total_cells, 5);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
