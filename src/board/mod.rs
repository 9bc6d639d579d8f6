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

//! Chess board for a casual game against the computer
//!
//! A _board_ holds the rules of the game: which moves are legal,
//! whether a king is in check and whether the side to move has run
//! out of options. The following features are supported:
//!
//! [x] Piece movement for all six piece types
//! [x] Pawn double advance from the starting rank
//! [x] King safety (no move may leave the mover's king attacked)
//! [x] Checkmate and stalemate detection
//! [x] Per-side countdown clocks
//! [ ] Castling
//! [ ] En passant
//! [ ] Pawn promotion
//! [ ] Repetition and fifty-move draws
//!
//! Some of the key abstractions include:
//!
//! * A `Square` represents the coordinates for a single square
//!   on an 8-by-8 board. Squares are ordered `A8` .. `H1` so that the
//!   index of a square is `row * 8 + col` where row 0 is black's
//!   back rank. `Square::from_coords` converts raw coordinates and
//!   returns `None` for anything off the board.
//!
//! * A `Mask` is a 64-bit (u64) value in which each bit maps to a
//!   square on the board. Masks are used for sets of legal move
//!   destinations and iterate in row-then-column order.
//!
//! * `Material` represents a piece of a specific color. A `Piece` has
//!   six variants: `King`, `Queen`, `Rook`, `Bishop`, `Knight` and `Pawn`.
//!   `Color` is either `White` or `Black`.
//!
//! * A `Position` holds the contents of each square and nothing else.
//!   The free functions `is_legal`, `is_in_check`, `legal_moves` and
//!   `all_legal_moves` answer rule questions about a position without
//!   modifying it.
//!
//! * `GameState` owns a position together with the side to move, the
//!   status, the move history, captured pieces and the clocks. The only
//!   way to change it is `apply_move`, which validates the move first,
//!   and `tick`, which runs the clock of the side to move.
//!

mod clock;
mod material;
mod moves;
mod play;
mod position;
mod square;

pub use clock::*;
pub use material::*;
pub use moves::*;
pub use play::*;
pub use position::*;
pub use square::*;

pub trait Turn {
    fn turn(&self) -> Color;
}
