use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::time::Duration;
use web_time::Instant;

use crate::timer::{TimerAction, TimerQueue};
use crate::*;

/// Lifecycle phase of a game.
///
/// Valid transitions:
/// - `Idle -> Presenting` on the first start
/// - `Presenting -> AwaitingInput` when playback completes
/// - `AwaitingInput -> RoundCorrect` when the round is fully replayed
/// - `AwaitingInput -> GameOver` on a wrong cell
/// - `AwaitingInput -> Cleared` when the final round is replayed
/// - `RoundCorrect -> Presenting` when the grown sequence plays back
/// - any phase `-> Presenting` on a restart
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Presenting,
    AwaitingInput,
    RoundCorrect,
    GameOver,
    Cleared,
}

impl Phase {
    /// True from start until the game ends.
    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Presenting | Self::AwaitingInput | Self::RoundCorrect)
    }

    /// True while the engine is playing the sequence back.
    pub const fn is_presenting(self) -> bool {
        matches!(self, Self::Presenting)
    }

    /// True during the pause after a correctly replayed round.
    pub const fn is_correct(self) -> bool {
        matches!(self, Self::RoundCorrect)
    }

    /// True once the game has ended, lost or cleared.
    pub const fn is_ended(self) -> bool {
        matches!(self, Self::GameOver | Self::Cleared)
    }
}

impl Default for Phase {
    fn default() -> Self {
        Self::Idle
    }
}

/// What a player tap changed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InputOutcome {
    /// The tap was ignored.
    NoChange,
    /// The tap matched the sequence and the round continues.
    Matched,
    /// The tap completed the round; the sequence grows shortly after.
    RoundComplete,
    /// The tap completed the final round.
    Cleared,
    /// The tap did not match; the game is over.
    Mismatch,
}

impl InputOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Sequence-memory engine.
///
/// The engine performs no I/O and never reads a clock. Every command takes
/// the caller's `now`, due work runs when the host calls `poll`, and the two
/// outward effects go through the injected [`Notifier`].
#[derive(Debug)]
pub struct GameEngine<G, N> {
    difficulty: Difficulty,
    timings: Timings,
    sequence: Vec<Cell>,
    player_sequence: Vec<Cell>,
    highlighted: SmallVec<[Cell; 8]>,
    phase: Phase,
    /// Bumped on every restart and round advance; scheduled tasks carrying an
    /// older epoch are stale and fire as no-ops.
    epoch: u64,
    timers: TimerQueue,
    started_at: Option<Instant>,
    generator: G,
    notifier: N,
}

impl<G: CellGenerator, N: Notifier> GameEngine<G, N> {
    pub fn new(difficulty: Difficulty, generator: G, notifier: N) -> Self {
        Self {
            difficulty,
            timings: Timings::for_difficulty(difficulty),
            sequence: Vec::new(),
            player_sequence: Vec::new(),
            highlighted: SmallVec::new(),
            phase: Default::default(),
            epoch: 0,
            timers: TimerQueue::new(),
            started_at: None,
            generator,
            notifier,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn timings(&self) -> Timings {
        self.timings
    }

    pub fn grid_size(&self) -> u8 {
        self.difficulty.grid_size()
    }

    pub fn max_sequence(&self) -> CellCount {
        self.difficulty.max_sequence()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase.is_playing()
    }

    pub fn is_presenting(&self) -> bool {
        self.phase.is_presenting()
    }

    pub fn is_correct(&self) -> bool {
        self.phase.is_correct()
    }

    pub fn is_ended(&self) -> bool {
        self.phase.is_ended()
    }

    pub fn sequence(&self) -> &[Cell] {
        &self.sequence
    }

    pub fn player_sequence(&self) -> &[Cell] {
        &self.player_sequence
    }

    /// Every cell currently lit, playback highlights and input flashes alike.
    pub fn highlighted_cells(&self) -> &[Cell] {
        &self.highlighted
    }

    /// Sequence length of the round being played, 0 before the first start.
    pub fn level(&self) -> usize {
        self.sequence.len()
    }

    /// Completed rounds, which is the final score once the game ends.
    pub fn score(&self) -> usize {
        self.sequence.len().saturating_sub(1)
    }

    /// Time since the current game started, zero before the first start.
    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.started_at {
            Some(started) => now.checked_duration_since(started).unwrap_or_default(),
            None => Duration::ZERO,
        }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    /// Deadline of the next scheduled task, if any.
    ///
    /// Tasks from an abandoned game keep their deadline until polled, so a
    /// host may wake up only to see them dropped.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Starts a new game, superseding any game in progress.
    pub fn start_game(&mut self, now: Instant) {
        self.epoch += 1;
        // The previous game's sequence still counts toward lap exclusion here.
        let first = self.generator.next_cell(&self.sequence, self.grid_size());
        self.sequence.clear();
        self.sequence.push(first);
        self.player_sequence.clear();
        if !self.highlighted.is_empty() {
            self.highlighted.clear();
            self.notifier.highlight_changed(&self.highlighted);
        }
        self.started_at = Some(now);
        log::debug!(
            "game started: difficulty {}, first cell {}",
            self.difficulty,
            first
        );
        self.begin_presentation(now);
        self.notifier.state_changed();
    }

    /// Applies a player tap.
    ///
    /// Taps are only accepted while the engine awaits input, and a tap on a
    /// cell that is currently lit is dropped, so a still-flashing cell cannot
    /// enter the buffer twice.
    pub fn handle_player_input(&mut self, now: Instant, cell: Cell) -> InputOutcome {
        use InputOutcome::*;

        if self.phase != Phase::AwaitingInput {
            return NoChange;
        }
        if self.highlighted.contains(&cell) {
            log::trace!("ignoring tap on lit cell {}", cell);
            return NoChange;
        }
        self.player_sequence.push(cell);
        self.add_highlight(cell);
        self.timers.schedule(
            now + self.timings.input_feedback_duration,
            self.epoch,
            TimerAction::HideCell(cell),
        );

        let position = self.player_sequence.len() - 1;
        if self.sequence.get(position) != Some(&cell) {
            log::debug!("mismatch at position {}: got {}", position, cell);
            self.phase = Phase::GameOver;
            self.notifier.state_changed();
            return Mismatch;
        }
        if self.player_sequence.len() == self.sequence.len() {
            if self.sequence.len() == self.max_sequence() as usize {
                log::debug!("cleared at length {}", self.sequence.len());
                self.phase = Phase::Cleared;
                self.notifier.state_changed();
                return Cleared;
            }
            self.phase = Phase::RoundCorrect;
            self.timers.schedule(
                now + self.timings.next_round_delay,
                self.epoch,
                TimerAction::AdvanceRound,
            );
            log::debug!("round {} complete", self.sequence.len());
            self.notifier.state_changed();
            return RoundComplete;
        }
        Matched
    }

    /// Runs every scheduled task whose deadline has passed, in deadline
    /// order. Stale tasks are dropped without effect.
    pub fn poll(&mut self, now: Instant) {
        use TimerAction::*;

        while let Some(task) = self.timers.pop_due(now) {
            if task.epoch != self.epoch {
                log::trace!("dropping stale {:?} from epoch {}", task.action, task.epoch);
                continue;
            }
            match task.action {
                ShowCell(cell) => self.add_highlight(cell),
                HideCell(cell) => self.remove_highlight(cell),
                PresentationDone => {
                    log::debug!("presentation done, awaiting input");
                    self.phase = Phase::AwaitingInput;
                    self.notifier.state_changed();
                }
                AdvanceRound => self.advance_round(now),
            }
        }
    }

    fn add_highlight(&mut self, cell: Cell) {
        self.highlighted.push(cell);
        self.notifier.highlight_changed(&self.highlighted);
    }

    fn remove_highlight(&mut self, cell: Cell) {
        self.highlighted.retain(|c| *c != cell);
        self.notifier.highlight_changed(&self.highlighted);
    }

    fn begin_presentation(&mut self, now: Instant) {
        self.phase = Phase::Presenting;
        let timings = self.timings;
        for (i, &cell) in self.sequence.iter().enumerate() {
            let shown = now + timings.start_delay + timings.highlight_interval * i as u32;
            self.timers
                .schedule(shown, self.epoch, TimerAction::ShowCell(cell));
            self.timers.schedule(
                shown + timings.highlight_duration,
                self.epoch,
                TimerAction::HideCell(cell),
            );
        }
        let done =
            now + timings.start_delay + timings.highlight_interval * self.sequence.len() as u32;
        self.timers
            .schedule(done, self.epoch, TimerAction::PresentationDone);
        log::trace!("presenting {} cells", self.sequence.len());
    }

    fn advance_round(&mut self, now: Instant) {
        self.epoch += 1;
        let next = self.generator.next_cell(&self.sequence, self.grid_size());
        self.sequence.push(next);
        self.player_sequence.clear();
        log::debug!("sequence grown to {} cells", self.sequence.len());
        self.begin_presentation(now);
        self.notifier.state_changed();
    }
}
