//! Newtype wrappers for improved type safety and domain modeling.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Decimal codeword of a board: the nine cell digits (0 empty, 1 agent,
/// 2 opponent) read in row-major order as a number.
///
/// Codes are unique per grid, so comparing codes gives a total order on
/// boards. A code deserialized from an external source is not validated
/// until it is decoded with [`crate::tictactoe::BoardState::from_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardCode(u32);

impl BoardCode {
    /// Largest decodable code (`222222222`).
    pub const MAX: u32 = 222_222_222;

    /// Code of the empty board.
    pub const EMPTY: BoardCode = BoardCode(0);

    /// Create a code, validating that it decodes to nine ternary digits.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidCode`] if the value exceeds
    /// [`BoardCode::MAX`] or contains a digit other than 0, 1 or 2.
    pub fn new(value: u32) -> Result<Self, crate::Error> {
        Self::decode_digits(value).map(|_| BoardCode(value))
    }

    /// Wrap a value without validation. Only used for codes computed from
    /// a well-formed board.
    pub(crate) const fn from_raw(value: u32) -> Self {
        BoardCode(value)
    }

    /// Get the inner value.
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Split the code into its nine digits, most significant (cell 0) first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidCode`] for an undecodable code.
    pub fn digits(&self) -> Result<[u8; 9], crate::Error> {
        Self::decode_digits(self.0)
    }

    fn decode_digits(value: u32) -> Result<[u8; 9], crate::Error> {
        if value > Self::MAX {
            return Err(crate::Error::InvalidCode {
                code: value,
                reason: format!("exceeds the largest board code {}", Self::MAX),
            });
        }

        let mut digits = [0u8; 9];
        let mut rest = value;
        for idx in (0..9).rev() {
            let digit = (rest % 10) as u8;
            if digit > 2 {
                return Err(crate::Error::InvalidCode {
                    code: value,
                    reason: format!("digit {digit} at cell {idx} is not a cell value"),
                });
            }
            digits[idx] = digit;
            rest /= 10;
        }
        Ok(digits)
    }
}

impl From<BoardCode> for u32 {
    fn from(code: BoardCode) -> Self {
        code.0
    }
}

impl fmt::Display for BoardCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:09}", self.0)
    }
}
