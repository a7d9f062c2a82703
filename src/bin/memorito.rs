use clap::Parser;
use memorito_core::{
    Cell, CellCount, Difficulty, GameEngine, InputOutcome, Instant, Notifier, Phase,
    RandomCellGenerator,
};
use std::io::{self, BufRead, Write};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser, Debug)]
#[command(version, about = "Sequence memory game in the terminal")]
struct Args {
    /// Difficulty preset: easy, normal, hard, expert, or oni
    #[arg(short, long, default_value_t = Difficulty::Normal)]
    difficulty: Difficulty,

    /// Seed for the cell generator, taken from the clock when omitted
    #[arg(short, long)]
    seed: Option<u64>,

    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,
}

/// Renders the grid on every highlight change and flags state changes so the
/// main loop can print a status line after it hands control back.
struct TermView {
    grid_size: u8,
    dirty: bool,
}

impl TermView {
    fn new(grid_size: u8) -> Self {
        Self {
            grid_size,
            dirty: false,
        }
    }

    fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn draw_grid(&self, lit: &[Cell]) {
        println!();
        for row in 0..self.grid_size {
            let mut line = String::new();
            for col in 0..self.grid_size {
                let cell = row * self.grid_size + col;
                if lit.contains(&cell) {
                    line.push_str("[##]");
                } else {
                    line.push_str(&format!("[{:>2}]", cell));
                }
            }
            println!("{}", line);
        }
    }
}

impl Notifier for TermView {
    fn highlight_changed(&mut self, cells: &[Cell]) {
        self.draw_grid(cells);
    }

    fn state_changed(&mut self) {
        self.dirty = true;
    }
}

type Game = GameEngine<RandomCellGenerator, TermView>;

fn entropy_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(0)
}

/// Sleeps until each pending deadline and polls it, until the engine goes
/// quiet. Also prints status lines for state changes fired along the way.
fn drive_timers(game: &mut Game) {
    while let Some(deadline) = game.next_deadline() {
        let now = Instant::now();
        if deadline > now {
            thread::sleep(deadline - now);
        }
        game.poll(Instant::now());
        report(game);
    }
}

fn report(game: &mut Game) {
    if !game.notifier_mut().take_dirty() {
        return;
    }
    match game.phase() {
        Phase::Idle => {}
        Phase::Presenting => println!("-- round {}: watch --", game.level()),
        Phase::AwaitingInput => println!("-- your turn: {} cell(s) --", game.level()),
        Phase::RoundCorrect => println!("-- correct --"),
        Phase::GameOver => println!("-- game over, score {} --", game.score()),
        Phase::Cleared => println!("-- cleared, score {} --", game.score()),
    }
}

fn ask_yes_no(stdin: &io::Stdin, prompt: &str) -> bool {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut line = String::new();
    match stdin.lock().read_line(&mut line) {
        Ok(0) | Err(_) => false,
        Ok(_) => matches!(line.trim(), "y" | "Y" | "yes"),
    }
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let seed = args.seed.unwrap_or_else(entropy_seed);
    let grid_size = args.difficulty.grid_size();
    log::info!("difficulty {}, seed {}", args.difficulty, seed);

    let mut game = Game::new(
        args.difficulty,
        RandomCellGenerator::new(seed),
        TermView::new(grid_size),
    );

    println!(
        "memorito: repeat the growing sequence on the {0}x{0} grid",
        grid_size
    );
    println!(
        "Cells are numbered left to right, top to bottom; clear {} rounds to win.",
        args.difficulty.max_sequence()
    );
    println!("Type cell numbers separated by spaces, then press enter.");

    let stdin = io::stdin();
    let mut input = String::new();
    game.start_game(Instant::now());

    loop {
        report(&mut game);
        drive_timers(&mut game);

        if game.is_ended() {
            if !ask_yes_no(&stdin, "Play again? [y/N] ") {
                break;
            }
            game.start_game(Instant::now());
            continue;
        }

        print!("> ");
        let _ = io::stdout().flush();
        input.clear();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                log::error!("reading stdin failed: {}", err);
                break;
            }
        }
        for token in input.split_whitespace() {
            let cell: Cell = match token.parse() {
                Ok(cell) => cell,
                Err(_) => {
                    println!("'{}' is not a cell number", token);
                    continue;
                }
            };
            if cell as CellCount >= args.difficulty.total_cells() {
                println!("cell {} is off the grid", cell);
                continue;
            }
            if game.handle_player_input(Instant::now(), cell) == InputOutcome::NoChange {
                println!("(ignored)");
            }
            if game.is_ended() || game.is_correct() {
                break;
            }
        }
    }
}
