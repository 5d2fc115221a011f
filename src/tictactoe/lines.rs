//! Winning line analysis for Tic-Tac-Toe

use super::{Cell, Outcome};

/// Winning line indices on the 3x3 board
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8], // rows
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8], // columns
    [0, 4, 8],
    [2, 4, 6], // diagonals
];

/// Utility for analyzing winning lines in Tic-Tac-Toe
pub struct LineAnalyzer;

impl LineAnalyzer {
    /// Check if `piece` occupies all three cells of any line
    pub fn has_line(cells: &[Cell; 9], piece: Cell) -> bool {
        piece != Cell::Empty
            && WINNING_LINES
                .iter()
                .any(|line| line.iter().all(|&idx| cells[idx] == piece))
    }

    /// Classify a grid.
    ///
    /// Line conditions are checked first; a draw is only reported when no
    /// line is complete and no empty cell remains. A grid where both sides
    /// hold a line cannot arise in play and is reported as the agent's win.
    pub fn outcome(cells: &[Cell; 9]) -> Outcome {
        if Self::has_line(cells, Cell::Agent) {
            Outcome::AgentWins
        } else if Self::has_line(cells, Cell::Opponent) {
            Outcome::OpponentWins
        } else if cells.contains(&Cell::Empty) {
            Outcome::Ongoing
        } else {
            Outcome::Draw
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_line_horizontal() {
        let mut cells = [Cell::Empty; 9];
        cells[0] = Cell::Agent;
        cells[1] = Cell::Agent;
        cells[2] = Cell::Agent;

        assert!(LineAnalyzer::has_line(&cells, Cell::Agent));
        assert!(!LineAnalyzer::has_line(&cells, Cell::Opponent));
    }

    #[test]
    fn test_has_line_vertical() {
        let mut cells = [Cell::Empty; 9];
        cells[0] = Cell::Opponent;
        cells[3] = Cell::Opponent;
        cells[6] = Cell::Opponent;

        assert!(LineAnalyzer::has_line(&cells, Cell::Opponent));
        assert!(!LineAnalyzer::has_line(&cells, Cell::Agent));
    }

    #[test]
    fn test_has_line_anti_diagonal() {
        let mut cells = [Cell::Empty; 9];
        cells[2] = Cell::Agent;
        cells[4] = Cell::Agent;
        cells[6] = Cell::Agent;

        assert_eq!(LineAnalyzer::outcome(&cells), Outcome::AgentWins);
    }

    #[test]
    fn test_empty_cells_never_form_a_line() {
        let cells = [Cell::Empty; 9];
        assert!(!LineAnalyzer::has_line(&cells, Cell::Empty));
        assert_eq!(LineAnalyzer::outcome(&cells), Outcome::Ongoing);
    }

    #[test]
    fn test_win_on_full_board_beats_draw() {
        // XXX
        // OOX
        // XOO
        let cells = [
            Cell::Agent,
            Cell::Agent,
            Cell::Agent,
            Cell::Opponent,
            Cell::Opponent,
            Cell::Agent,
            Cell::Agent,
            Cell::Opponent,
            Cell::Opponent,
        ];
        assert_eq!(LineAnalyzer::outcome(&cells), Outcome::AgentWins);
    }
}
