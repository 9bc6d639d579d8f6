// Copyright 2023 Tobin Edwards
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::IntoEnumIterator;
use thiserror::Error;

use super::material::{Color, Material, Piece};
use super::position::{between, Position};
use super::square::{Mask, Offset, Rank, Square};

use Color::*;
use Piece::*;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("No piece on {0}")]
    EmptySquare(Square),
    #[error("The piece on {0} does not belong to the side to move")]
    NotYourTurn(Square),
    #[error("Not a legal move: {0} to {1}")]
    IllegalMove(Square, Square),
    #[error("The game is over")]
    GameOver,
}

/// Whether `is_legal` simulates the move and rejects it when it leaves the
/// mover's own king attacked. Check detection runs with `Ignore`, otherwise
/// the two would recurse into each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KingSafety {
    Enforce,
    Ignore,
}

/// Decides whether `material` may move from `from` to `to` on `pos`.
///
/// Pure and total: any pair of squares is accepted and simply answered with
/// `false` when the move is not allowed. A move onto the starting square is
/// never legal.
pub fn is_legal(
    pos: &Position,
    from: Square,
    to: Square,
    material: Material,
    safety: KingSafety,
) -> bool {
    if from == to {
        return false;
    }
    if let Some(target) = pos.contents(to) {
        if target.color() == material.color() {
            return false;
        }
    }
    let shaped = match material.piece() {
        Pawn => is_pawn_move(pos, from, to, material.color()),
        Rook => is_horizontal_move(pos, from, to),
        Knight => KNIGHT_MOVES[from].contains(to),
        Bishop => is_diagonal_move(pos, from, to),
        Queen => is_horizontal_move(pos, from, to) || is_diagonal_move(pos, from, to),
        King => KING_MOVES[from].contains(to),
    };
    if !shaped {
        return false;
    }
    match safety {
        KingSafety::Ignore => true,
        KingSafety::Enforce => {
            let mut scratch = *pos;
            let _ = scratch.remove(from);
            let _ = scratch.place(to, material);
            !is_in_check(&scratch, material.color())
        }
    }
}

/// True if any opposing piece could move onto `color`'s king. A board
/// without that king reports `false`.
pub fn is_in_check(pos: &Position, color: Color) -> bool {
    let Some(king) = pos.king(color) else {
        return false;
    };
    pos.pieces(!color)
        .any(|(square, material)| is_legal(pos, square, king, material, KingSafety::Ignore))
}

/// Every legal destination for the piece on `from`, whichever color it is.
/// The mask iterates row by row, columns ascending.
pub fn legal_moves(pos: &Position, from: Square) -> Mask {
    match pos.contents(from) {
        Some(material) => Square::iter()
            .filter(|to| is_legal(pos, from, *to, material, KingSafety::Enforce))
            .collect(),
        None => Mask::empty(),
    }
}

/// Coordinate flavour of `legal_moves`. Off-board coordinates yield an
/// empty list.
pub fn legal_moves_at(pos: &Position, row: isize, col: isize) -> Vec<(usize, usize)> {
    match Square::from_coords(row, col) {
        Some(from) => legal_moves(pos, from).iter().map(|to| to.coords()).collect(),
        None => Vec::new(),
    }
}

/// All `(from, to)` pairs available to `color`, pieces visited in
/// row-then-column order.
pub fn all_legal_moves(pos: &Position, color: Color) -> Vec<(Square, Square)> {
    pos.pieces(color)
        .flat_map(|(from, _)| legal_moves(pos, from).iter().map(move |to| (from, to)))
        .collect()
}

fn is_pawn_move(pos: &Position, from: Square, to: Square, color: Color) -> bool {
    let forward = match color {
        White => -1,
        Black => 1,
    };
    let offset = to - from;
    match (offset.x, offset.y) {
        (0, dy) if dy == forward => pos.is_vacant(to),
        (0, dy) if dy == 2 * forward => {
            from.rank() == Rank::pawn_rank(color) && pos.is_vacant(to) && is_clear(pos, from, to)
        }
        (dx, dy) if dx.abs() == 1 && dy == forward => {
            matches!(pos.contents(to), Some(target) if target.color() != color)
        }
        _ => false,
    }
}

fn is_horizontal_move(pos: &Position, from: Square, to: Square) -> bool {
    let offset = to - from;
    (offset.x == 0 || offset.y == 0) && is_clear(pos, from, to)
}

fn is_diagonal_move(pos: &Position, from: Square, to: Square) -> bool {
    let (rows, cols) = (to - from).abs();
    rows == cols && is_clear(pos, from, to)
}

#[inline]
fn is_clear(pos: &Position, from: Square, to: Square) -> bool {
    between(from, to).iter().all(|square| pos.is_vacant(square))
}

/// Query helpers for anything that can be viewed as a position.
pub trait LegalMoves: AsRef<Position> {
    fn legal_moves(&self, from: Square) -> Mask {
        legal_moves(self.as_ref(), from)
    }
    fn is_in_check(&self, color: Color) -> bool {
        is_in_check(self.as_ref(), color)
    }
    fn all_legal_moves(&self, color: Color) -> Vec<(Square, Square)> {
        all_legal_moves(self.as_ref(), color)
    }
    fn can_move(&self, color: Color) -> bool {
        let pos: &Position = self.as_ref();
        pos.pieces(color)
            .any(|(from, _)| !legal_moves(pos, from).is_empty())
    }
}

impl LegalMoves for Position {}

/// A move as recorded in the game history.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub material: Material,
    pub captured: Option<Material>,
}

impl Move {
    pub fn new(from: Square, to: Square, material: Material, captured: Option<Material>) -> Self {
        Self {
            from,
            to,
            material,
            captured,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} → {}", self.material, self.from, self.to)?;
        if let Some(captured) = self.captured {
            write!(f, " x {}", captured)?;
        }
        Ok(())
    }
}

static KING_MOVES: Lazy<[Mask; 64]> = Lazy::new(|| {
    const OFFSETS: [Offset; 8] = [
        Offset::new(-1, -1),
        Offset::new(0, -1),
        Offset::new(1, -1),
        Offset::new(-1, 0),
        Offset::new(1, 0),
        Offset::new(-1, 1),
        Offset::new(0, 1),
        Offset::new(1, 1),
    ];
    let mut array = [Mask::default(); 64];
    for square in Square::iter() {
        array[square] =
            Mask::from_squares(OFFSETS.into_iter().filter_map(|offset| square + offset));
    }
    array
});

static KNIGHT_MOVES: Lazy<[Mask; 64]> = Lazy::new(|| {
    const OFFSETS: [Offset; 8] = [
        Offset::new(-2, -1),
        Offset::new(-2, 1),
        Offset::new(2, -1),
        Offset::new(2, 1),
        Offset::new(-1, -2),
        Offset::new(-1, 2),
        Offset::new(1, -2),
        Offset::new(1, 2),
    ];
    let mut array = [Mask::default(); 64];
    for square in Square::iter() {
        array[square] =
            Mask::from_squares(OFFSETS.into_iter().filter_map(|offset| square + offset));
    }
    array
});

#[cfg(test)]
mod tests {
    use crate::*;
    use Square::*;

    fn bare_kings() -> Position {
        Position::empty()
            .set_contents(E1, Some(Material::WK))
            .set_contents(E8, Some(Material::BK))
    }

    #[test]
    fn test_white_has_twenty_opening_moves() {
        let pos = Position::standard();
        let moves = pos.all_legal_moves(Color::White);
        assert_eq!(moves.len(), 20);
        let pawn_moves = moves
            .iter()
            .filter(|(from, _)| pos[*from] == Some(Material::WP))
            .count();
        assert_eq!(pawn_moves, 16);
        assert_eq!(pos.all_legal_moves(Color::Black).len(), 20);
    }
    #[test]
    fn test_white_pawn_advance() {
        let destinations = Position::standard().legal_moves(E2);
        assert_eq!(destinations.to_vec(), vec![E4, E3]);
    }
    #[test]
    fn test_black_pawn_advance() {
        let destinations = Position::standard().legal_moves(E7);
        assert_eq!(destinations.to_vec(), vec![E6, E5]);
    }
    #[test]
    fn test_white_pawn_advance_blocked() {
        let pos = Position::standard().set_contents(E3, Some(Material::BB));
        let destinations = pos.legal_moves(E2);
        assert!(!destinations.contains(E3));
        assert!(!destinations.contains(E4));
    }
    #[test]
    fn test_black_pawn_advance_blocked() {
        let pos = Position::standard().set_contents(E6, Some(Material::WB));
        let destinations = pos.legal_moves(E7);
        assert!(!destinations.contains(E6));
        assert!(!destinations.contains(E5));
    }
    #[test]
    fn test_white_pawn_double_advance_blocked() {
        let pos = Position::standard().set_contents(E4, Some(Material::BB));
        let destinations = pos.legal_moves(E2);
        assert!(destinations.contains(E3));
        assert!(!destinations.contains(E4));
    }
    #[test]
    fn test_pawn_double_advance_only_from_start_rank() {
        let pos = bare_kings().set_contents(C3, Some(Material::WP));
        assert_eq!(pos.legal_moves(C3).to_vec(), vec![C4]);
        let pos = bare_kings().set_contents(C6, Some(Material::BP));
        assert_eq!(pos.legal_moves(C6).to_vec(), vec![C5]);
    }
    #[test]
    fn test_pawns_never_move_backward() {
        let pos = bare_kings()
            .set_contents(D4, Some(Material::WP))
            .set_contents(C3, Some(Material::BN))
            .set_contents(E3, Some(Material::BN));
        let destinations = pos.legal_moves(D4);
        assert_eq!(destinations.to_vec(), vec![D5]);
    }
    #[test]
    fn test_white_pawn_capture() {
        let pos = Position::standard()
            .set_contents(D3, Some(Material::BB))
            .set_contents(F3, Some(Material::WN));
        let destinations = pos.legal_moves(E2);
        assert!(destinations.contains(D3));
        assert!(!destinations.contains(F3));
        let destinations = pos.legal_moves(C2);
        assert!(destinations.contains(D3));
        assert!(!destinations.contains(B3));
    }
    #[test]
    fn test_black_pawn_capture() {
        let pos = Position::standard()
            .set_contents(D6, Some(Material::WB))
            .set_contents(F6, Some(Material::BN));
        let destinations = pos.legal_moves(E7);
        assert!(destinations.contains(D6));
        assert!(!destinations.contains(F6));
    }
    #[test]
    fn test_pawn_cannot_capture_forward() {
        let pos = bare_kings()
            .set_contents(D4, Some(Material::WP))
            .set_contents(D5, Some(Material::BP));
        assert!(pos.legal_moves(D4).is_empty());
    }
    #[test]
    fn test_king_moves_one_square() {
        let pos = Position::standard().set_contents(E2, None);
        assert_eq!(pos.legal_moves(E1).to_vec(), vec![E2]);
    }
    #[test]
    fn test_king_blocked() {
        assert!(Position::standard().legal_moves(E1).is_empty());
    }
    #[test]
    fn test_king_cannot_castle() {
        let pos = Position::standard()
            .set_contents(F1, None)
            .set_contents(G1, None);
        let destinations = pos.legal_moves(E1);
        assert_eq!(destinations.to_vec(), vec![F1]);
        assert!(!destinations.contains(G1));
    }
    #[test]
    fn test_king_cannot_step_into_check() {
        let pos = Position::empty()
            .set_contents(E1, Some(Material::WK))
            .set_contents(D8, Some(Material::BR))
            .set_contents(H8, Some(Material::BK));
        assert_eq!(pos.legal_moves(E1).to_vec(), vec![E2, F2, F1]);
    }
    #[test]
    fn test_pinned_rook_stays_on_file() {
        let pos = Position::empty()
            .set_contents(E1, Some(Material::WK))
            .set_contents(E2, Some(Material::WR))
            .set_contents(E8, Some(Material::BR))
            .set_contents(A8, Some(Material::BK));
        let destinations = pos.legal_moves(E2);
        assert_eq!(destinations.to_vec(), vec![E8, E7, E6, E5, E4, E3]);
    }
    #[test]
    fn test_queen_destinations() {
        let pos = Position::standard()
            .set_contents(C1, None)
            .set_contents(C2, None)
            .set_contents(D2, None);
        let destinations = pos.legal_moves(D1);
        assert_eq!(destinations.len(), 10);
        assert!(destinations.contains(C1));
        assert!(!destinations.contains(B1));
        assert!(destinations.contains(B3));
        assert!(destinations.contains(D6));
        assert!(destinations.contains(D7));
        assert!(!destinations.contains(D8));
        assert!(!destinations.contains(E2));
    }
    #[test]
    fn test_queen_blocked() {
        assert!(Position::standard().legal_moves(D1).is_empty());
    }
    #[test]
    fn test_knight_destinations() {
        let destinations = Position::standard().legal_moves(G1);
        assert_eq!(destinations.to_vec(), vec![F3, H3]);
    }
    #[test]
    fn test_knight_blocked() {
        let pos = Position::standard()
            .set_contents(F3, Some(Material::WP))
            .set_contents(H3, Some(Material::WP));
        assert_eq!(pos.legal_moves(G1), Mask::empty());
    }
    #[test]
    fn test_rook_destinations() {
        let pos = Position::standard()
            .set_contents(A2, None)
            .set_contents(B1, None);
        let destinations = pos.legal_moves(A1);
        assert_eq!(destinations.len(), 7);
        assert!(destinations.contains(B1));
        assert!(!destinations.contains(B2));
        assert!(destinations.contains(A3));
        assert!(destinations.contains(A7));
        assert!(!destinations.contains(A8));
    }
    #[test]
    fn test_rook_blocked() {
        assert_eq!(Position::standard().legal_moves(A1), Mask::empty());
    }
    #[test]
    fn test_bishop_destinations() {
        let pos = Position::standard()
            .set_contents(C2, None)
            .set_contents(D2, None);
        let destinations = pos.legal_moves(C1);
        assert_eq!(destinations.len(), 5);
        assert!(!destinations.contains(B2));
        assert!(!destinations.contains(C2));
        assert!(destinations.contains(D2));
        assert!(destinations.contains(E3));
        assert!(destinations.contains(H6));
    }
    #[test]
    fn test_bishop_blocked() {
        assert_eq!(Position::standard().legal_moves(C1), Mask::empty());
    }
    #[test]
    fn test_shape_rules_without_king_safety() {
        let pos = Position::standard();
        let knight = Material::WN;
        assert!(is_legal(&pos, G1, F3, knight, KingSafety::Ignore));
        assert!(!is_legal(&pos, G1, G3, knight, KingSafety::Ignore));
        assert!(!is_legal(&pos, G1, E2, knight, KingSafety::Ignore));
        assert!(!is_legal(&pos, G1, G1, knight, KingSafety::Ignore));
    }
    #[test]
    fn test_check_detection() {
        let pos = bare_kings().set_contents(E5, Some(Material::BR));
        assert!(is_in_check(&pos, Color::White));
        assert!(!is_in_check(&pos, Color::Black));
        let pos = pos.set_contents(E3, Some(Material::WN));
        assert!(!is_in_check(&pos, Color::White));
    }
    #[test]
    fn test_pawn_gives_check_only_diagonally() {
        let pos = bare_kings().set_contents(D2, Some(Material::BP));
        assert!(is_in_check(&pos, Color::White));
        let pos = bare_kings().set_contents(E2, Some(Material::BP));
        assert!(!is_in_check(&pos, Color::White));
    }
    #[test]
    fn test_missing_king_is_not_in_check() {
        let pos = Position::empty()
            .set_contents(E1, Some(Material::WK))
            .set_contents(E5, Some(Material::WR));
        assert!(!is_in_check(&pos, Color::Black));
        assert!(!pos.legal_moves(E5).is_empty());
    }
    #[test]
    fn test_empty_square_has_no_moves() {
        let pos = Position::standard();
        assert!(pos.legal_moves(E4).is_empty());
        assert!(legal_moves_at(&pos, 4, 4).is_empty());
    }
    #[test]
    fn test_coordinate_enumeration_is_total() {
        let pos = Position::standard();
        assert_eq!(legal_moves_at(&pos, 6, 4), vec![(4, 4), (5, 4)]);
        assert!(legal_moves_at(&pos, -1, 4).is_empty());
        assert!(legal_moves_at(&pos, 6, 9).is_empty());
    }
    #[test]
    fn test_move_display() {
        let mv = Move::new(E2, E4, Material::WP, None);
        assert_eq!(mv.to_string(), "♙ e2 → e4");
        let mv = Move::new(D8, H4, Material::BQ, Some(Material::WP));
        assert_eq!(mv.to_string(), "♛ d8 → h4 x ♙");
    }
}
