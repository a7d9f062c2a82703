use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub use engine::*;
pub use error::*;
pub use generator::*;
pub use notifier::*;
pub use types::*;
pub use web_time::Instant;

mod engine;
mod error;
mod generator;
mod notifier;
mod timer;
mod types;

/// Difficulty preset fixing the grid side, the winning sequence length, and
/// the pacing of the highlight playback.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
    Expert,
    Oni,
}

impl Difficulty {
    pub const ALL: [Difficulty; 5] = [
        Self::Easy,
        Self::Normal,
        Self::Hard,
        Self::Expert,
        Self::Oni,
    ];

    /// Side length of the square grid.
    pub const fn grid_size(self) -> u8 {
        use Difficulty::*;
        match self {
            Easy => 2,
            Normal => 3,
            Hard => 4,
            Expert | Oni => 5,
        }
    }

    /// Sequence length that clears the game.
    pub const fn max_sequence(self) -> CellCount {
        use Difficulty::*;
        match self {
            Easy => 4,
            Normal => 9,
            Hard => 16,
            Expert => 25,
            Oni => 50,
        }
    }

    /// Interval between consecutive highlights during playback.
    pub const fn step_timing(self) -> Duration {
        use Difficulty::*;
        match self {
            Easy => Duration::from_millis(1500),
            Normal => Duration::from_millis(1000),
            Hard => Duration::from_millis(500),
            Expert => Duration::from_millis(250),
            Oni => Duration::from_millis(100),
        }
    }

    pub const fn total_cells(self) -> CellCount {
        grid_cells(self.grid_size())
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Normal
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Difficulty::*;
        let name = match self {
            Easy => "easy",
            Normal => "normal",
            Hard => "hard",
            Expert => "expert",
            Oni => "oni",
        };
        f.write_str(name)
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        use Difficulty::*;
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Easy),
            "normal" => Ok(Normal),
            "hard" => Ok(Hard),
            "expert" => Ok(Expert),
            "oni" => Ok(Oni),
            _ => Err(GameError::UnknownDifficulty(s.to_owned())),
        }
    }
}

/// Delays and durations that drive one game, all derived from the difficulty.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Timings {
    /// Pause before the first highlight of a playback.
    pub start_delay: Duration,
    /// Time between consecutive highlight starts during playback.
    pub highlight_interval: Duration,
    /// How long a playback highlight stays lit.
    pub highlight_duration: Duration,
    /// How long a cell flashes after the player taps it.
    pub input_feedback_duration: Duration,
    /// Pause between a completed round and the next playback.
    pub next_round_delay: Duration,
}

impl Timings {
    pub const START_DELAY: Duration = Duration::from_millis(1000);
    pub const INPUT_FEEDBACK_DURATION: Duration = Duration::from_millis(500);
    pub const NEXT_ROUND_DELAY: Duration = Duration::from_millis(1000);

    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        let step = difficulty.step_timing();
        Self {
            start_delay: Self::START_DELAY,
            highlight_interval: step,
            // Highlights stay lit for three quarters of the step interval.
            highlight_duration: step * 3 / 4,
            input_feedback_duration: Self::INPUT_FEEDBACK_DURATION,
            next_round_delay: Self::NEXT_ROUND_DELAY,
        }
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self::for_difficulty(Difficulty::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_table_matches_presets() {
        let table = [
            (Difficulty::Easy, 2, 4, 1500),
            (Difficulty::Normal, 3, 9, 1000),
            (Difficulty::Hard, 4, 16, 500),
            (Difficulty::Expert, 5, 25, 250),
            (Difficulty::Oni, 5, 50, 100),
        ];
        for (difficulty, grid, max_seq, step_ms) in table {
            assert_eq!(difficulty.grid_size(), grid);
            assert_eq!(difficulty.max_sequence(), max_seq);
            assert_eq!(difficulty.step_timing(), Duration::from_millis(step_ms));
        }
    }

    #[test]
    fn every_difficulty_fits_its_grid() {
        // Oni replays the 25-cell grid, so the target may exceed the cell
        // count; every other preset clears after one full lap at most.
        for difficulty in Difficulty::ALL {
            let cells = difficulty.total_cells();
            assert!(cells > 0);
            if difficulty != Difficulty::Oni {
                assert!(difficulty.max_sequence() <= cells);
            }
        }
    }

    #[test]
    fn timings_scale_with_the_step() {
        let timings = Timings::for_difficulty(Difficulty::Normal);
        assert_eq!(timings.start_delay, Duration::from_millis(1000));
        assert_eq!(timings.highlight_interval, Duration::from_millis(1000));
        assert_eq!(timings.highlight_duration, Duration::from_millis(750));
        assert_eq!(timings.input_feedback_duration, Duration::from_millis(500));
        assert_eq!(timings.next_round_delay, Duration::from_millis(1000));

        // Sub-millisecond results stay exact: 3/4 of 250ms.
        let expert = Timings::for_difficulty(Difficulty::Expert);
        assert_eq!(expert.highlight_duration, Duration::from_micros(187_500));
    }

    #[test]
    fn difficulty_names_round_trip() {
        for difficulty in Difficulty::ALL {
            let name = difficulty.to_string();
            assert_eq!(name.parse::<Difficulty>().unwrap(), difficulty);
            let json = serde_json::to_string(&difficulty).unwrap();
            assert_eq!(json, format!("{name:?}"));
            assert_eq!(
                serde_json::from_str::<Difficulty>(&json).unwrap(),
                difficulty
            );
        }
    }

    #[test]
    fn unknown_difficulty_name_is_an_error() {
        assert_eq!(
            "nightmare".parse::<Difficulty>(),
            Err(GameError::UnknownDifficulty("nightmare".into()))
        );
        assert_eq!(" Expert ".parse::<Difficulty>(), Ok(Difficulty::Expert));
    }
}
