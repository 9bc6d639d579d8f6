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
use std::ops::Index;
use strum::IntoEnumIterator;

use super::material::{Color, Material, Piece};
use super::square::{File, Mask, Rank, Square};

use Piece::*;

/// The contents of the 64 squares, stored row by row. Row 0 is black's back
/// rank and column 0 is the "a" file.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    rows: [[Option<Material>; 8]; 8],
}

impl Default for Position {
    fn default() -> Self {
        Self::standard()
    }
}

impl Position {
    pub const fn empty() -> Self {
        Self {
            rows: [[None; 8]; 8],
        }
    }

    /// The standard starting position.
    pub fn standard() -> Self {
        const BACKRANK: [Piece; 8] = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];
        let mut position = Self::empty();
        for (file, piece) in File::iter().zip(BACKRANK) {
            position.init_file(file, piece);
        }
        position
    }

    fn init_file(&mut self, file: File, piece: Piece) {
        for color in Color::iter() {
            let square = Square::new(file, Rank::pawn_rank(color));
            let _ = self.place(square, Material::new(color, Pawn));
            let square = Square::new(file, Rank::back_rank(color));
            let _ = self.place(square, Material::new(color, piece));
        }
    }

    /// Builder used to construct arbitrary positions.
    pub fn set_contents(mut self, square: Square, value: Option<Material>) -> Self {
        self.rows[square.row()][square.col()] = value;
        self
    }

    #[inline]
    pub fn contents(&self, square: Square) -> Option<Material> {
        self.rows[square.row()][square.col()]
    }

    #[inline]
    pub fn is_vacant(&self, square: Square) -> bool {
        self.contents(square).is_none()
    }

    #[inline]
    pub fn is_occupied(&self, square: Square) -> bool {
        self.contents(square).is_some()
    }

    pub fn rows(&self) -> &[[Option<Material>; 8]; 8] {
        &self.rows
    }

    pub fn occupied(&self) -> Mask {
        Square::iter().filter(|sq| self.is_occupied(*sq)).collect()
    }

    pub fn occupied_by(&self, color: Color) -> Mask {
        self.pieces(color).map(|(square, _)| square).collect()
    }

    /// Every piece of `color` with its square, in row-then-column order.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Material)> + '_ {
        Square::iter().filter_map(move |square| match self.contents(square) {
            Some(material) if material.color() == color => Some((square, material)),
            _ => None,
        })
    }

    /// Scans for `color`'s king. Returns `None` if the king is not on the
    /// board, which never happens in a game but is tolerated.
    pub fn king(&self, color: Color) -> Option<Square> {
        self.pieces(color)
            .find(|(_, material)| material.piece().is_king())
            .map(|(square, _)| square)
    }

    /// Moves whatever stands on `from` to `to` and returns the material that
    /// was displaced from `to`, if any.
    pub fn relocate(&mut self, from: Square, to: Square) -> Option<Material> {
        match self.remove(from) {
            Some(material) => self.place(to, material),
            None => None,
        }
    }

    pub(super) fn place(&mut self, square: Square, material: Material) -> Option<Material> {
        let replaced = self.remove(square);
        self.rows[square.row()][square.col()] = Some(material);
        replaced
    }

    pub(super) fn remove(&mut self, square: Square) -> Option<Material> {
        self.rows[square.row()][square.col()].take()
    }
}

impl Index<Square> for Position {
    type Output = Option<Material>;
    #[inline]
    fn index(&self, index: Square) -> &Self::Output {
        &self.rows[index.row()][index.col()]
    }
}

impl AsRef<Self> for Position {
    fn as_ref(&self) -> &Self {
        self
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, squares) in self.rows.iter().enumerate() {
            write!(f, "{} ", 8 - row)?;
            for contents in squares {
                match contents {
                    Some(material) => write!(f, "{}", material)?,
                    None => write!(f, ".")?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "  abcdefgh")
    }
}

/// Squares strictly between `from` and `to` when they share a row, column
/// or diagonal. Empty when they are adjacent, equal or not in a line.
#[inline]
pub fn between(from: Square, to: Square) -> Mask {
    SQUARES_BETWEEN[from.to_index() * 64 + to.to_index()]
}

static SQUARES_BETWEEN: Lazy<Vec<Mask>> = Lazy::new(|| {
    fn squares_between(start: Square, end: Square) -> Mask {
        let mut mask = Mask::empty();
        if let Some(step) = (end - start).to_unit() {
            let mut next = start + step;
            while let Some(square) = next {
                if square == end {
                    break;
                }
                mask |= square;
                next = square + step;
            }
        }
        mask
    }

    let mut table = vec![Mask::empty(); 64 * 64];
    for start in Square::iter() {
        for end in Square::iter() {
            table[start.to_index() * 64 + end.to_index()] = squares_between(start, end);
        }
    }
    table
});

#[cfg(test)]
mod tests {
    use super::*;
    use Color::*;
    use Square::*;

    #[test]
    fn test_standard_layout() {
        let position = Position::standard();
        assert_eq!(position[E1], Some(Material::WK));
        assert_eq!(position[D1], Some(Material::WQ));
        assert_eq!(position[E8], Some(Material::BK));
        assert_eq!(position[D8], Some(Material::BQ));
        assert_eq!(position[A2], Some(Material::WP));
        assert_eq!(position[H7], Some(Material::BP));
        assert_eq!(position[G1], Some(Material::WN));
        assert_eq!(position[C8], Some(Material::BB));
        assert_eq!(position.occupied().len(), 32);
        assert_eq!(position.occupied_by(White).len(), 16);
        // row 0 is black's back rank
        assert_eq!(position.rows()[0][0], Some(Material::BR));
        assert_eq!(position.rows()[7][4], Some(Material::WK));
    }
    #[test]
    fn test_king_lookup() {
        let position = Position::standard();
        assert_eq!(position.king(White), Some(E1));
        assert_eq!(position.king(Black), Some(E8));
        let position = position.set_contents(E8, None);
        assert_eq!(position.king(Black), None);
    }
    #[test]
    fn test_relocate_reports_capture() {
        let mut position = Position::standard().set_contents(D7, Some(Material::WN));
        let captured = position.relocate(D7, E8);
        assert_eq!(captured, Some(Material::BK));
        assert_eq!(position[E8], Some(Material::WN));
        assert_eq!(position[D7], None);
        assert_eq!(position.relocate(D4, D5), None);
        assert_eq!(position[D5], None);
    }
    #[test]
    fn test_between_a3_and_e3() {
        let mask = between(A3, E3);
        assert_eq!(mask.len(), 3);
        assert!(!mask.contains(A3));
        assert!(mask.contains(B3));
        assert!(mask.contains(C3));
        assert!(mask.contains(D3));
        assert!(!mask.contains(E3));
    }
    #[test]
    fn test_between_c2_and_c8() {
        let mask = between(C2, C8);
        assert_eq!(mask.len(), 5);
        assert!(!mask.contains(C2));
        assert!(mask.contains(C3));
        assert!(mask.contains(C7));
        assert!(!mask.contains(C8));
        assert_eq!(between(C8, C2), mask);
    }
    #[test]
    fn test_between_a1_and_d4() {
        let mask = between(A1, D4);
        assert_eq!(mask.len(), 2);
        assert!(mask.contains(B2));
        assert!(mask.contains(C3));
    }
    #[test]
    fn test_between_h3_and_f5() {
        let mask = between(H3, F5);
        assert_eq!(mask.len(), 1);
        assert!(mask.contains(G4));
    }
    #[test]
    fn test_between_adjacent_or_unaligned() {
        assert!(between(G4, F5).is_empty());
        assert!(between(A1, H5).is_empty());
        assert!(between(G1, F3).is_empty());
        assert!(between(E4, E4).is_empty());
    }
    #[test]
    fn test_display() {
        let text = Position::standard().to_string();
        assert!(text.starts_with("8 ♜♞♝♛♚♝♞♜"));
        assert!(text.ends_with("  abcdefgh"));
    }
}
