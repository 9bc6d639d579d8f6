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


use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::{all_legal_moves, Color, Position, Square};

/// Picks the computer's next move. Returns `None` when `color` has no legal
/// move in `position`.
pub trait Policy {
    fn choose(&mut self, position: &Position, color: Color) -> Option<(Square, Square)>;
}

impl<F> Policy for F
where
    F: FnMut(&Position, Color) -> Option<(Square, Square)>,
{
    fn choose(&mut self, position: &Position, color: Color) -> Option<(Square, Square)> {
        self(position, color)
    }
}

/// Plays a legal move chosen uniformly at random.
#[derive(Debug, Clone)]
pub struct RandomPolicy<R = StdRng> {
    rng: R,
}

impl RandomPolicy<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl<R: Rng> RandomPolicy<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Policy for RandomPolicy<R> {
    fn choose(&mut self, position: &Position, color: Color) -> Option<(Square, Square)> {
        let moves = all_legal_moves(position, color);
        debug!("{} choosing among {} moves", color, moves.len());
        moves.choose(&mut self.rng).copied()
    }
}
