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

use anyhow::Result;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::ops::Index;

use super::clock::Clock;
use super::material::{Color, Material, Pair};
use super::moves::{LegalMoves, Move, MoveError};
use super::position::Position;
use super::square::{Mask, Square};
use super::Turn;

use MoveError::*;

/// The situation of the side about to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Playing,
    Check,
    CheckMate,
    StaleMate,
}

impl Status {
    /// Playing or in check, i.e. the side to move still has a game.
    #[inline]
    pub fn is_live(&self) -> bool {
        matches!(*self, Status::Playing | Status::Check)
    }
}

/// How a finished game ended. Colors name the winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoardResult {
    CheckMate(Color),
    StaleMate,
    TimeExpired(Color),
}

/// The turn state machine: the position, whose turn it is, the status of
/// that side, history, captures and clocks. Only `apply_move` and `tick`
/// change it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    position: Position,
    turn: Color,
    status: Status,
    history: Vec<Move>,
    captured: Pair<Vec<Material>>,
    move_counts: Pair<u32>,
    clock: Clock,
    timed: bool,
    is_over: bool,
    expired: Option<Color>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(Clock::default(), false)
    }
}

impl GameState {
    /// A fresh game from the standard position with white to move.
    pub fn new(clock: Clock, timed: bool) -> Self {
        Self::from_position(Position::standard(), Color::White, clock, timed)
    }

    /// A game starting from an arbitrary position. The status of the side
    /// to move is evaluated immediately, so a position without legal moves
    /// starts out finished.
    pub fn from_position(position: Position, turn: Color, mut clock: Clock, timed: bool) -> Self {
        clock.reset();
        let mut state = Self {
            position,
            turn,
            status: Status::Playing,
            history: Vec::new(),
            captured: Pair::default(),
            move_counts: Pair::default(),
            clock,
            timed,
            is_over: false,
            expired: None,
        };
        state.update_status();
        state
    }

    #[inline]
    pub fn position(&self) -> &Position {
        &self.position
    }
    #[inline]
    pub fn status(&self) -> Status {
        self.status
    }
    #[inline]
    pub fn is_over(&self) -> bool {
        self.is_over
    }
    #[inline]
    pub fn is_timed(&self) -> bool {
        self.timed
    }
    #[inline]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }
    #[inline]
    pub fn history(&self) -> &[Move] {
        &self.history
    }
    #[inline]
    pub fn last_move(&self) -> Option<&Move> {
        self.history.last()
    }
    /// Pieces captured by `color`, in capture order.
    #[inline]
    pub fn captured(&self, color: Color) -> &[Material] {
        &self.captured[color]
    }
    #[inline]
    pub fn captured_pair(&self) -> &Pair<Vec<Material>> {
        &self.captured
    }
    #[inline]
    pub fn move_count(&self, color: Color) -> u32 {
        self.move_counts[color]
    }
    #[inline]
    pub fn move_counts(&self) -> Pair<u32> {
        self.move_counts
    }

    /// Legal destinations for the piece on `from`, but only while the game is
    /// live and the piece belongs to the side to move.
    pub fn destinations(&self, from: Square) -> Mask {
        match self.position.contents(from) {
            Some(material) if !self.is_over && material.color() == self.turn => {
                self.position.legal_moves(from)
            }
            _ => Mask::empty(),
        }
    }

    pub fn result(&self) -> Option<BoardResult> {
        if !self.is_over {
            return None;
        }
        if let Some(loser) = self.expired {
            return Some(BoardResult::TimeExpired(!loser));
        }
        match self.status {
            Status::CheckMate => Some(BoardResult::CheckMate(!self.turn)),
            Status::StaleMate => Some(BoardResult::StaleMate),
            _ => None,
        }
    }

    /// Moves the piece on `from` to `to` and hands the turn to the other
    /// side. The move is validated first; a rejected move leaves the state
    /// exactly as it was.
    pub fn apply_move(&mut self, from: Square, to: Square) -> Result<Move> {
        let mv = match self.validate_move(from, to) {
            Ok(mv) => mv,
            Err(error) => {
                warn!("rejected {} → {}: {}", from, to, error);
                return Err(error);
            }
        };
        let _ = self.position.relocate(from, to);
        if let Some(captured) = mv.captured {
            self.captured[self.turn].push(captured);
        }
        self.history.push(mv);
        self.move_counts[self.turn] += 1;
        self.turn = !self.turn;
        debug!("{} played {}", !self.turn, mv);

        self.status = if self.position.is_in_check(self.turn) {
            Status::Check
        } else {
            Status::Playing
        };
        self.update_status();

        // A clock that ran out before this move landed decides the game.
        if self.timed {
            if let Some(color) = self.clock.expired() {
                info!("{:?} ran out of time before the move was applied", color);
                self.expired = Some(color);
                self.is_over = true;
                self.status = Status::CheckMate;
            }
        }
        Ok(mv)
    }

    fn validate_move(&self, from: Square, to: Square) -> Result<Move> {
        if self.is_over {
            return Err(GameOver.into());
        }
        let Some(material) = self.position.contents(from) else {
            return Err(EmptySquare(from).into());
        };
        if material.color() != self.turn {
            return Err(NotYourTurn(from).into());
        }
        if !self.position.legal_moves(from).contains(to) {
            return Err(IllegalMove(from, to).into());
        }
        Ok(Move::new(from, to, material, self.position.contents(to)))
    }

    /// Ends the game when the side to move has no legal move: checkmate if
    /// it is in check, stalemate otherwise.
    fn update_status(&mut self) {
        if self.position.can_move(self.turn) {
            return;
        }
        self.status = if self.position.is_in_check(self.turn) {
            Status::CheckMate
        } else {
            Status::StaleMate
        };
        self.is_over = true;
        info!("{:?} has no legal move: {:?}", self.turn, self.status);
    }

    /// Advances the clock of the side to move by one second. Only runs in
    /// timed mode while the game is live. Returns `true` when this tick ran
    /// the clock out and ended the game.
    pub fn tick(&mut self) -> bool {
        if !self.timed || self.is_over || !self.status.is_live() {
            return false;
        }
        if !self.clock.tick(self.turn) {
            return false;
        }
        info!("{:?} ran out of time", self.turn);
        self.expired = Some(self.turn);
        self.is_over = true;
        self.status = Status::CheckMate;
        true
    }
}

impl Turn for GameState {
    #[inline]
    fn turn(&self) -> Color {
        self.turn
    }
}

impl AsRef<Position> for GameState {
    fn as_ref(&self) -> &Position {
        &self.position
    }
}

impl LegalMoves for GameState {}

impl Index<Square> for GameState {
    type Output = Option<Material>;
    fn index(&self, index: Square) -> &Self::Output {
        self.position.index(index)
    }
}

#[cfg(test)]
impl GameState {
    pub(crate) fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }
}
