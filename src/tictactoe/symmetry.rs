//! D4 symmetry group operations for board canonicalization

use serde::{Deserialize, Serialize};

use super::board::{BoardState, Cell};

/// D4 symmetry transformation (dihedral group of the square)
///
/// Rotations are counter-clockwise. The variants are listed in the fixed
/// order used by canonicalization; [`D4Transform::id`] is the index in that
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum D4Transform {
    Identity,
    Rotate90,
    Rotate180,
    Rotate270,
    /// Mirror top and bottom rows.
    FlipVertical,
    /// Mirror left and right columns.
    FlipHorizontal,
    /// Reflect across the main diagonal.
    Transpose,
    /// Reflect across the anti-diagonal.
    AntiTranspose,
}

impl D4Transform {
    /// All 8 transforms in canonicalization order.
    pub const ALL: [D4Transform; 8] = [
        D4Transform::Identity,
        D4Transform::Rotate90,
        D4Transform::Rotate180,
        D4Transform::Rotate270,
        D4Transform::FlipVertical,
        D4Transform::FlipHorizontal,
        D4Transform::Transpose,
        D4Transform::AntiTranspose,
    ];

    /// Position of this transform in [`D4Transform::ALL`].
    pub fn id(self) -> u8 {
        match self {
            D4Transform::Identity => 0,
            D4Transform::Rotate90 => 1,
            D4Transform::Rotate180 => 2,
            D4Transform::Rotate270 => 3,
            D4Transform::FlipVertical => 4,
            D4Transform::FlipHorizontal => 5,
            D4Transform::Transpose => 6,
            D4Transform::AntiTranspose => 7,
        }
    }

    /// Look a transform up by id.
    pub fn from_id(id: u8) -> Option<D4Transform> {
        Self::ALL.get(usize::from(id)).copied()
    }

    /// Get the inverse transform
    pub fn inverse(self) -> D4Transform {
        match self {
            D4Transform::Rotate90 => D4Transform::Rotate270,
            D4Transform::Rotate270 => D4Transform::Rotate90,
            // Remaining elements are involutions
            other => other,
        }
    }

    /// Destination of the cell at `pos` (0-8) after the transform
    pub fn transform_position(self, pos: usize) -> usize {
        let (row, col) = (pos / 3, pos % 3);
        let (row, col) = match self {
            D4Transform::Identity => (row, col),
            D4Transform::Rotate90 => (2 - col, row),
            D4Transform::Rotate180 => (2 - row, 2 - col),
            D4Transform::Rotate270 => (col, 2 - row),
            D4Transform::FlipVertical => (2 - row, col),
            D4Transform::FlipHorizontal => (row, 2 - col),
            D4Transform::Transpose => (col, row),
            D4Transform::AntiTranspose => (2 - col, 2 - row),
        };
        row * 3 + col
    }

    /// Apply transform to an array of cells
    pub fn apply_to_cells(self, cells: &[Cell; 9]) -> [Cell; 9] {
        let mut transformed = [Cell::Empty; 9];
        for (idx, &cell) in cells.iter().enumerate() {
            transformed[self.transform_position(idx)] = cell;
        }
        transformed
    }
}

impl BoardState {
    /// Apply a D4 transform to the board
    pub fn transform(&self, t: D4Transform) -> Self {
        BoardState::from_cells(t.apply_to_cells(&self.cells))
    }

    /// Map an action chosen on a transformed board back through `inverse`.
    pub fn apply_inverse(action: &BoardState, inverse: D4Transform) -> BoardState {
        action.transform(inverse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_transform_is_a_permutation() {
        for t in D4Transform::ALL {
            let mut seen = [false; 9];
            for pos in 0..9 {
                seen[t.transform_position(pos)] = true;
            }
            assert!(seen.iter().all(|&s| s), "{t:?} is not a bijection");
        }
    }

    #[test]
    fn test_inverse_undoes_transform() {
        for t in D4Transform::ALL {
            for pos in 0..9 {
                assert_eq!(t.inverse().transform_position(t.transform_position(pos)), pos);
            }
        }
    }

    #[test]
    fn test_transforms_are_distinct() {
        for (i, a) in D4Transform::ALL.iter().enumerate() {
            for b in &D4Transform::ALL[i + 1..] {
                let differs = (0..9).any(|pos| a.transform_position(pos) != b.transform_position(pos));
                assert!(differs, "{a:?} and {b:?} act identically");
            }
        }
    }

    #[test]
    fn test_ids_roundtrip() {
        for t in D4Transform::ALL {
            assert_eq!(D4Transform::from_id(t.id()), Some(t));
        }
        assert_eq!(D4Transform::from_id(8), None);
    }

    #[test]
    fn test_rotate90_moves_top_right_to_top_left() {
        // Counter-clockwise: the top-right corner ends up top-left.
        assert_eq!(D4Transform::Rotate90.transform_position(2), 0);
        assert_eq!(D4Transform::Rotate90.transform_position(0), 6);
        assert_eq!(D4Transform::Rotate90.transform_position(4), 4);
    }

    #[test]
    fn test_anti_transpose_swaps_opposite_corners() {
        assert_eq!(D4Transform::AntiTranspose.transform_position(0), 8);
        assert_eq!(D4Transform::AntiTranspose.transform_position(2), 2);
        assert_eq!(D4Transform::AntiTranspose.transform_position(6), 6);
    }
}
