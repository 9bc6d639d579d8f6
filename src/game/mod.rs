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


//! A playable session: square selection, the timed clock and the computer
//! opponent, all driven through a single `Game` value.
//!
//! Time is virtual. Nothing happens between calls; the owner reports
//! elapsed time with `advance` and the session runs every clock tick and
//! computer move that fell due, in order.

use anyhow::Result;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{
    BoardResult, Clock, Color, GameState, Mask, Material, Move, MoveError, Pair, Position, Square,
    Status, Turn,
};

mod config;
mod opponent;
mod timeline;

pub use config::*;
pub use opponent::*;
pub use timeline::*;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameResult {
    Win(Color, WinReason),
    Draw(DrawReason),
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WinReason {
    CheckMate,
    TimeExpired,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawReason {
    StaleMate,
}

impl From<BoardResult> for GameResult {
    fn from(result: BoardResult) -> Self {
        match result {
            BoardResult::CheckMate(winner) => GameResult::Win(winner, WinReason::CheckMate),
            BoardResult::TimeExpired(winner) => GameResult::Win(winner, WinReason::TimeExpired),
            BoardResult::StaleMate => GameResult::Draw(DrawReason::StaleMate),
        }
    }
}

/// The selected square and the destinations offered for it.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub from: Square,
    pub destinations: Mask,
}

/// Read-only view of a session for a presentation layer.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Snapshot {
    pub position: Position,
    pub turn: Color,
    pub status: Status,
    pub is_over: bool,
    pub timed: bool,
    pub clocks: Pair<u32>,
    pub captured: Pair<Vec<Material>>,
    pub move_counts: Pair<u32>,
    pub history: Vec<Move>,
    pub last_move: Option<Move>,
    pub selection: Option<Square>,
    pub destinations: Mask,
    pub thinking: bool,
    pub result: Option<GameResult>,
}

/// One session against the computer or between two humans. Owns the game
/// state, the current selection, virtual time and the opponent policy.
pub struct Game<P = RandomPolicy> {
    config: GameConfig,
    state: GameState,
    selection: Option<Selection>,
    timeline: Timeline,
    policy: P,
}

impl Default for Game {
    fn default() -> Self {
        Self::build(GameConfig::default(), RandomPolicy::from_entropy())
    }
}

impl Game {
    /// A session using the random opponent, seeded from the config when a
    /// seed is given.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let policy = match config.seed {
            Some(seed) => RandomPolicy::seeded(seed),
            None => RandomPolicy::from_entropy(),
        };
        Self::with_policy(config, policy)
    }
}

impl<P: Policy> Game<P> {
    pub fn with_policy(config: GameConfig, policy: P) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, policy))
    }

    fn build(config: GameConfig, policy: P) -> Self {
        let state = GameState::new(Clock::new(config.clock_seconds), config.timed);
        let mut game = Self {
            config,
            state,
            selection: None,
            timeline: Timeline::new(),
            policy,
        };
        game.schedule_opponent();
        game
    }

    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }
    #[inline]
    pub fn state(&self) -> &GameState {
        &self.state
    }
    #[inline]
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }
    #[inline]
    pub fn now(&self) -> Duration {
        self.timeline.now()
    }
    #[inline]
    pub fn pending_deliberation(&self) -> Option<Deliberation> {
        self.timeline.pending()
    }
    #[inline]
    pub fn is_thinking(&self) -> bool {
        self.timeline.pending().is_some()
    }

    pub fn result(&self) -> Option<GameResult> {
        self.state.result().map(GameResult::from)
    }

    /// Destinations the side to move may choose for the piece on `square`.
    /// Empty for the other side's pieces and once the game is over.
    pub fn destinations(&self, square: Square) -> Mask {
        self.state.destinations(square)
    }

    fn is_computer_turn(&self) -> bool {
        self.config.computer_color() == Some(self.state.turn())
    }

    /// Handles a click on `(row, col)`. With nothing selected, a piece of
    /// the side to move becomes the selection. With a selection, the click
    /// plays the move when the square is one of its destinations and clears
    /// the selection otherwise. Clicks are ignored while the computer is to
    /// move or after the game has ended.
    pub fn select_square(&mut self, row: isize, col: isize) -> Option<Move> {
        if self.state.is_over() || self.is_computer_turn() {
            return None;
        }
        let target = Square::from_coords(row, col);
        if let Some(selection) = self.selection.take() {
            return match target {
                Some(square) if selection.destinations.contains(square) => {
                    self.play(selection.from, square).ok()
                }
                _ => None,
            };
        }
        let square = target?;
        self.selection = match self.state[square] {
            Some(material) if material.color() == self.state.turn() => Some(Selection {
                from: square,
                destinations: self.state.destinations(square),
            }),
            _ => None,
        };
        None
    }

    /// Plays a move for the human side to move.
    pub fn play(&mut self, from: Square, to: Square) -> Result<Move> {
        if self.is_computer_turn() && !self.state.is_over() {
            return Err(MoveError::NotYourTurn(from).into());
        }
        let mv = self.state.apply_move(from, to)?;
        self.selection = None;
        self.after_move();
        Ok(mv)
    }

    fn after_move(&mut self) {
        if let Some(result) = self.result() {
            info!("game over: {:?}", result);
        }
        self.schedule_opponent();
    }

    /// Starts a new game with the configured clock and mode. Any computer
    /// move still pending belongs to the old game and is dropped.
    pub fn reset(&mut self) {
        self.state = GameState::new(Clock::new(self.config.clock_seconds), self.config.timed);
        self.selection = None;
        let epoch = self.timeline.restart();
        info!("new game (timed: {}, epoch {:?})", self.config.timed, epoch);
        self.schedule_opponent();
    }

    pub fn set_timed_mode(&mut self, enabled: bool) {
        info!("timed mode {}", if enabled { "on" } else { "off" });
        self.config.timed = enabled;
        self.reset();
    }

    pub fn current_state(&self) -> Snapshot {
        let (selection, destinations) = match self.selection {
            Some(selection) => (Some(selection.from), selection.destinations),
            None => (None, Mask::empty()),
        };
        Snapshot {
            position: *self.state.position(),
            turn: self.state.turn(),
            status: self.state.status(),
            is_over: self.state.is_over(),
            timed: self.state.is_timed(),
            clocks: self.state.clock().remaining_pair(),
            captured: self.state.captured_pair().clone(),
            move_counts: self.state.move_counts(),
            history: self.state.history().to_vec(),
            last_move: self.state.last_move().copied(),
            selection,
            destinations,
            thinking: self.is_thinking(),
            result: self.result(),
        }
    }

    /// Queues the computer's reply if it is the computer's turn in a live
    /// game and nothing is queued yet.
    fn schedule_opponent(&mut self) {
        if !self.is_computer_turn() || self.state.is_over() || !self.state.status().is_live() {
            return;
        }
        if self.timeline.pending().is_none() {
            let deliberation = self.timeline.schedule(self.config.deliberation());
            debug!("computer reply due at {:?}", deliberation.due);
        }
    }

    /// Runs one second of the clock for the side to move. Returns `true`
    /// when this tick ended the game.
    pub fn tick(&mut self) -> bool {
        let expired = self.state.tick();
        if expired {
            self.after_move();
        }
        expired
    }

    /// Applies the computer's move for `token`. Nothing happens when the
    /// token is not the pending deliberation (scheduled before the last
    /// reset, or already spent) or when the game ended or it is no longer
    /// the computer's turn.
    pub fn fire_deliberation(&mut self, token: Deliberation) -> Option<Move> {
        if token.epoch != self.timeline.epoch() {
            debug!("dropping deliberation from epoch {:?}", token.epoch);
            return None;
        }
        if !self.timeline.settle(token) {
            debug!("dropping spent deliberation due at {:?}", token.due);
            return None;
        }
        if self.state.is_over() || !self.is_computer_turn() {
            debug!("dropping deliberation, nothing to play");
            return None;
        }
        let color = self.state.turn();
        let (from, to) = self.policy.choose(self.state.position(), color)?;
        match self.state.apply_move(from, to) {
            Ok(mv) => {
                self.selection = None;
                self.after_move();
                Some(mv)
            }
            Err(error) => {
                warn!("computer move {} → {} rejected: {}", from, to, error);
                self.schedule_opponent();
                None
            }
        }
    }

    /// Moves virtual time forward by `elapsed`, running every clock tick and
    /// computer move that falls due. Returns the computer's moves.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<Move> {
        let until = self.timeline.now() + elapsed;
        let mut moves = Vec::new();
        while let Some(event) = self.timeline.next_event(until) {
            match event {
                Event::Tick => {
                    self.tick();
                }
                Event::Deliberation(token) => moves.extend(self.fire_deliberation(token)),
            }
        }
        self.timeline.finish(until);
        moves
    }
}
