//! Self-play between two agents
//!
//! Episodes are recorded step by step from each mover's own perspective,
//! so every step can be turned into a training sample without knowing
//! which symbol the mover used.

use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    agent::Agent,
    ports::{Observer, PlaydataQueue},
    tictactoe::{BoardState, Outcome},
    transition::RawTransition,
};

/// Seat at the table; `First` moves first and plays `X`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    pub fn other(self) -> Seat {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }

    /// Convert a board kept from the first mover's view into this seat's view
    fn view(self, board: &BoardState) -> BoardState {
        match self {
            Seat::First => *board,
            Seat::Second => board.swap_symbols(),
        }
    }
}

/// Whose experience [`Episode::transitions`] emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Perspective {
    First,
    Second,
    Both,
}

impl Perspective {
    pub fn includes(self, seat: Seat) -> bool {
        match self {
            Perspective::First => seat == Seat::First,
            Perspective::Second => seat == Seat::Second,
            Perspective::Both => true,
        }
    }
}

/// One move, with all boards in the mover's perspective
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub mover: Seat,
    pub state: BoardState,
    pub action: BoardState,
    pub resultant: BoardState,
    /// 1.0 if this move completed a line for the mover
    pub reward: f64,
}

/// A finished game
#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    pub steps: Vec<Step>,
    /// `None` for a draw
    pub winner: Option<Seat>,
}

impl Episode {
    /// Play a fixed sequence of cell indices, alternating seats from
    /// `First`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAction`] for an occupied cell and
    /// [`Error::Validation`] if the sequence ends before the game or
    /// continues after it.
    pub fn from_moves(moves: &[usize]) -> Result<Episode> {
        let mut remaining = moves.iter();
        let episode = play_with(|_, _| {
            let pos = remaining.next().ok_or_else(|| Error::Validation {
                message: format!("move sequence {moves:?} ends before the game does"),
            })?;
            BoardState::placement(*pos)
        })?;

        if remaining.next().is_some() {
            return Err(Error::Validation {
                message: format!(
                    "move sequence {moves:?} continues after the game ended on move {}",
                    episode.steps.len()
                ),
            });
        }
        Ok(episode)
    }

    /// Number of moves played
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Training samples with shaped rewards.
    ///
    /// A step followed by an opponent reply is paired with the board after
    /// that reply and rewarded `reward_i - reward_{i+1}`, so losing to the
    /// reply costs 1.0. The final step keeps its own resultant and reward.
    pub fn transitions(&self, perspective: Perspective) -> Vec<RawTransition> {
        self.steps
            .iter()
            .enumerate()
            .filter(|(_, step)| perspective.includes(step.mover))
            .map(|(i, step)| match self.steps.get(i + 1) {
                Some(reply) => RawTransition {
                    initial: step.state,
                    action: step.action,
                    resultant: reply.resultant.swap_symbols(),
                    reward: step.reward - reply.reward,
                },
                None => RawTransition {
                    initial: step.state,
                    action: step.action,
                    resultant: step.resultant,
                    reward: step.reward,
                },
            })
            .collect()
    }
}

/// Drive a game from an empty board, asking `choose` for each move.
/// Boards handed to `choose` are in the mover's perspective.
fn play_with<F>(mut choose: F) -> Result<Episode>
where
    F: FnMut(Seat, &BoardState) -> Result<BoardState>,
{
    // Kept from the first mover's perspective
    let mut board = BoardState::new();
    let mut steps = Vec::with_capacity(9);
    let mut mover = Seat::First;

    loop {
        let state = mover.view(&board);
        let action = choose(mover, &state)?;
        let resultant = state.play(&action)?;
        let outcome = resultant.outcome();

        steps.push(Step {
            mover,
            state,
            action,
            resultant,
            reward: if outcome == Outcome::AgentWins { 1.0 } else { 0.0 },
        });

        let winner = match outcome {
            Outcome::Ongoing => {
                board = mover.view(&resultant);
                mover = mover.other();
                continue;
            }
            Outcome::AgentWins => Some(mover),
            Outcome::OpponentWins => Some(mover.other()),
            Outcome::Draw => None,
        };
        return Ok(Episode { steps, winner });
    }
}

/// Tally of a batch of games between `a` and `b`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub rounds: usize,
    pub a_wins: usize,
    pub b_wins: usize,
    pub draws: usize,
}

impl EvaluationSummary {
    fn rate(&self, count: usize) -> f64 {
        if self.rounds == 0 {
            0.0
        } else {
            count as f64 / self.rounds as f64
        }
    }

    pub fn a_win_rate(&self) -> f64 {
        self.rate(self.a_wins)
    }

    pub fn b_win_rate(&self) -> f64 {
        self.rate(self.b_wins)
    }

    pub fn draw_rate(&self) -> f64 {
        self.rate(self.draws)
    }
}

/// Result of [`SelfPlaySimulator::generate`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub episodes: usize,
    pub transitions: usize,
    pub first_wins: usize,
    pub second_wins: usize,
    pub draws: usize,
}

/// Plays agents against each other
#[derive(Default)]
pub struct SelfPlaySimulator {
    observers: Vec<Box<dyn Observer>>,
}

impl SelfPlaySimulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer notified during [`Self::generate`] and [`Self::evaluate`]
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Play one game; `first` moves first.
    ///
    /// # Errors
    ///
    /// Propagates agent errors. Agents only see non-terminal boards, so a
    /// well-behaved agent never fails here.
    pub fn play_episode<R: Rng>(&self, first: &Agent, second: &Agent, rng: &mut R) -> Result<Episode> {
        play_with(|seat, state| match seat {
            Seat::First => first.act(state, rng),
            Seat::Second => second.act(state, rng),
        })
    }

    /// Play `episodes` games and push the canonicalized experience of
    /// `perspective` into `queue`.
    pub fn generate<R: Rng>(
        &mut self,
        first: &Agent,
        second: &Agent,
        episodes: usize,
        perspective: Perspective,
        queue: &dyn PlaydataQueue,
        rng: &mut R,
    ) -> Result<GenerationReport> {
        info!("generating {episodes} episodes ({perspective:?} perspective)");
        self.notify_start(episodes)?;

        let mut report = GenerationReport::default();
        for index in 0..episodes {
            let episode = self.play_episode(first, second, rng)?;
            for raw in episode.transitions(perspective) {
                queue.push(raw.canonicalize()?)?;
                report.transitions += 1;
            }

            match episode.winner {
                Some(Seat::First) => report.first_wins += 1,
                Some(Seat::Second) => report.second_wins += 1,
                None => report.draws += 1,
            }
            report.episodes += 1;
            self.notify_episode(index, &episode)?;
        }

        self.notify_end()?;
        info!(
            "generated {} transitions from {} episodes",
            report.transitions, report.episodes
        );
        Ok(report)
    }

    /// Tournament with random seating each round; counts are from `a`'s and
    /// `b`'s point of view regardless of seat.
    pub fn evaluate<R: Rng>(
        &mut self,
        rounds: usize,
        a: &Agent,
        b: &Agent,
        rng: &mut R,
    ) -> Result<EvaluationSummary> {
        self.notify_start(rounds)?;

        let mut summary = EvaluationSummary {
            rounds,
            ..EvaluationSummary::default()
        };
        for index in 0..rounds {
            let a_is_first = rng.random::<bool>();
            let episode = if a_is_first {
                self.play_episode(a, b, rng)?
            } else {
                self.play_episode(b, a, rng)?
            };

            match (episode.winner, a_is_first) {
                (None, _) => summary.draws += 1,
                (Some(Seat::First), true) | (Some(Seat::Second), false) => summary.a_wins += 1,
                (Some(_), _) => summary.b_wins += 1,
            }
            self.notify_episode(index, &episode)?;
        }

        self.notify_end()?;
        debug!("evaluation finished: {summary:?}");
        Ok(summary)
    }

    fn notify_start(&mut self, total: usize) -> Result<()> {
        for observer in &mut self.observers {
            observer.on_run_start(total)?;
        }
        Ok(())
    }

    fn notify_episode(&mut self, index: usize, episode: &Episode) -> Result<()> {
        for observer in &mut self.observers {
            observer.on_episode_end(index, episode)?;
        }
        Ok(())
    }

    fn notify_end(&mut self) -> Result<()> {
        for observer in &mut self.observers {
            observer.on_run_end()?;
        }
        Ok(())
    }
}
