//! Board state representation and basic operations

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Outcome, lines::LineAnalyzer, symmetry::D4Transform};
use crate::types::BoardCode;

/// Symbol of the first-moving player at the boundary
pub const FIRST_SYMBOL: &str = "X";
/// Symbol of the second-moving player at the boundary
pub const SECOND_SYMBOL: &str = "O";
/// Symbol of an empty cell at the boundary
pub const EMPTY_SYMBOL: &str = "-";

/// A cell on the Tic-Tac-Toe board, seen from the acting player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    /// Occupied by the player whose perspective the board is stored in.
    Agent,
    Opponent,
}

impl Cell {
    /// Digit used in board codes
    pub fn digit(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Agent => 1,
            Cell::Opponent => 2,
        }
    }

    pub fn from_digit(digit: u8) -> Option<Cell> {
        match digit {
            0 => Some(Cell::Empty),
            1 => Some(Cell::Agent),
            2 => Some(Cell::Opponent),
            _ => None,
        }
    }

    /// The same cell seen from the other player
    pub fn swapped(self) -> Cell {
        match self {
            Cell::Agent => Cell::Opponent,
            Cell::Opponent => Cell::Agent,
            Cell::Empty => Cell::Empty,
        }
    }

    /// Parse a boundary symbol. `X` is always the first mover.
    pub fn from_symbol(symbol: &str, agent_is_first: bool) -> Option<Cell> {
        let cell = match symbol {
            EMPTY_SYMBOL => Cell::Empty,
            FIRST_SYMBOL => Cell::Agent,
            SECOND_SYMBOL => Cell::Opponent,
            _ => return None,
        };
        Some(if agent_is_first { cell } else { cell.swapped() })
    }

    /// Render as a boundary symbol in the caller's convention
    pub fn to_symbol(self, agent_is_first: bool) -> &'static str {
        let cell = if agent_is_first { self } else { self.swapped() };
        match cell {
            Cell::Empty => EMPTY_SYMBOL,
            Cell::Agent => FIRST_SYMBOL,
            Cell::Opponent => SECOND_SYMBOL,
        }
    }

    fn to_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Agent => 'A',
            Cell::Opponent => 'o',
        }
    }
}

/// Immutable 3x3 grid stored from the acting player's perspective
///
/// The same type represents both positions and *action boards*: an action
/// board holds a single [`Cell::Agent`] on an otherwise empty grid and
/// names the cell the agent plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardState {
    pub cells: [Cell; 9],
}

/// Result of canonicalizing a board under the D4 group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canonical {
    /// The canonical representative
    pub board: BoardState,
    /// The transform that maps the original board onto `board`
    pub transform: D4Transform,
    /// The transform that maps `board` back onto the original
    pub inverse: D4Transform,
}

impl Canonical {
    /// Code of the canonical representative
    pub fn code(&self) -> BoardCode {
        self.board.code()
    }

    /// Move an action expressed in the original orientation into canonical space
    pub fn to_canonical(&self, action: &BoardState) -> BoardState {
        action.transform(self.transform)
    }

    /// Map an action chosen in canonical space back to the original orientation
    pub fn restore(&self, action: &BoardState) -> BoardState {
        BoardState::apply_inverse(action, self.inverse)
    }
}

impl BoardState {
    /// Create a new empty board
    pub fn new() -> Self {
        Self::from_cells([Cell::Empty; 9])
    }

    pub fn from_cells(cells: [Cell; 9]) -> Self {
        BoardState { cells }
    }

    /// Parse nine boundary symbols.
    ///
    /// When `agent_is_first` is false the caller plays `O`, so agent and
    /// opponent cells are swapped to keep the board in the agent's
    /// perspective.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidBoardLength`] for anything but nine
    /// symbols and [`crate::Error::InvalidSymbol`] for a symbol outside
    /// `-`, `X`, `O`.
    pub fn from_symbols<S: AsRef<str>>(
        symbols: &[S],
        agent_is_first: bool,
    ) -> Result<Self, crate::Error> {
        if symbols.len() != 9 {
            return Err(crate::Error::InvalidBoardLength {
                expected: 9,
                got: symbols.len(),
            });
        }

        let mut cells = [Cell::Empty; 9];
        for (position, symbol) in symbols.iter().enumerate() {
            let symbol = symbol.as_ref();
            cells[position] = Cell::from_symbol(symbol, agent_is_first).ok_or_else(|| {
                crate::Error::InvalidSymbol {
                    symbol: symbol.to_string(),
                    position,
                }
            })?;
        }

        Ok(Self::from_cells(cells))
    }

    /// Decode a board from its code.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidCode`] if the code is not nine ternary digits.
    pub fn from_code(code: BoardCode) -> Result<Self, crate::Error> {
        let digits = code.digits()?;
        let mut cells = [Cell::Empty; 9];
        for (cell, digit) in cells.iter_mut().zip(digits) {
            // digits() only yields 0..=2
            *cell = Cell::from_digit(digit).unwrap_or(Cell::Empty);
        }
        Ok(Self::from_cells(cells))
    }

    /// Action board placing the agent at `pos`
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Validation`] if `pos` is not a cell index.
    pub fn placement(pos: usize) -> Result<Self, crate::Error> {
        if pos >= 9 {
            return Err(crate::Error::Validation {
                message: format!("position {pos} is out of bounds (must be 0-8)"),
            });
        }
        Ok(Self::single_placement(pos))
    }

    fn single_placement(pos: usize) -> Self {
        let mut cells = [Cell::Empty; 9];
        cells[pos] = Cell::Agent;
        Self::from_cells(cells)
    }

    /// Codeword of the grid: nine digits in row-major order
    pub fn code(&self) -> BoardCode {
        let value = self
            .cells
            .iter()
            .fold(0u32, |acc, cell| acc * 10 + u32::from(cell.digit()));
        BoardCode::from_raw(value)
    }

    /// Get cell at position (0-8)
    pub fn get(&self, pos: usize) -> Cell {
        self.cells[pos]
    }

    /// Check if a position is empty
    pub fn is_empty(&self, pos: usize) -> bool {
        self.cells[pos] == Cell::Empty
    }

    /// Get all empty positions
    pub fn empty_positions(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &cell)| cell == Cell::Empty)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn is_full(&self) -> bool {
        !self.cells.contains(&Cell::Empty)
    }

    /// Action boards for every empty cell, in ascending cell order.
    ///
    /// The iterator is lazy and yields nothing for a full board.
    pub fn legal_actions(&self) -> impl Iterator<Item = BoardState> + use<> {
        let cells = self.cells;
        (0..9)
            .filter(move |&pos| cells[pos] == Cell::Empty)
            .map(Self::single_placement)
    }

    /// If this is an action board, the cell it places on
    pub fn action_position(&self) -> Option<usize> {
        let mut position = None;
        for (idx, &cell) in self.cells.iter().enumerate() {
            match cell {
                Cell::Empty => {}
                Cell::Agent if position.is_none() => position = Some(idx),
                _ => return None,
            }
        }
        position
    }

    /// Apply an action board and return the resultant board
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidAction`] unless `action` places a
    /// single agent piece on a cell that is empty here.
    #[must_use = "play returns a new board state; the original is unchanged"]
    pub fn play(&self, action: &BoardState) -> Result<BoardState, crate::Error> {
        let invalid = |reason: &str| crate::Error::InvalidAction {
            state: self.code().to_string(),
            action: action.code().to_string(),
            reason: reason.to_string(),
        };

        let pos = action
            .action_position()
            .ok_or_else(|| invalid("an action must place exactly one agent piece"))?;
        if !self.is_empty(pos) {
            return Err(invalid("the target cell is occupied"));
        }

        let mut next = *self;
        next.cells[pos] = Cell::Agent;
        Ok(next)
    }

    /// Classify the board (line wins before fullness)
    pub fn outcome(&self) -> Outcome {
        LineAnalyzer::outcome(&self.cells)
    }

    /// The same grid seen by the other player
    #[must_use = "swap_symbols returns a new board state; the original is unchanged"]
    pub fn swap_symbols(&self) -> Self {
        Self::from_cells(self.cells.map(Cell::swapped))
    }

    /// Render as boundary symbols in the caller's convention.
    ///
    /// Inverse of [`BoardState::from_symbols`] for the same flag.
    pub fn to_symbols(&self, agent_is_first: bool) -> [&'static str; 9] {
        self.cells.map(|cell| cell.to_symbol(agent_is_first))
    }

    /// Find the canonical form by searching through all D4 transforms.
    ///
    /// The representative is the transformed board with the smallest code.
    /// Transforms are tried in [`D4Transform::ALL`] order and only a
    /// strictly smaller code replaces the current best, so boards with
    /// internal symmetry resolve to the earliest matching transform.
    pub fn canonicalize(&self) -> Canonical {
        let mut best_board = *self;
        let mut best_transform = D4Transform::Identity;
        let mut best_code = self.code();

        for transform in D4Transform::ALL {
            let transformed = self.transform(transform);
            let code = transformed.code();
            if code < best_code {
                best_code = code;
                best_board = transformed;
                best_transform = transform;
            }
        }

        Canonical {
            board: best_board,
            transform: best_transform,
            inverse: best_transform.inverse(),
        }
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &cell) in self.cells.iter().enumerate() {
            write!(f, "{}", cell.to_char())?;
            if (i + 1).is_multiple_of(3) && i < 8 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
