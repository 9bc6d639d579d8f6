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


//! A chess rule engine with a turn state machine, per-side clocks and a
//! random computer opponent.
//!
//! The `board` layer answers rule questions and owns the game state. The
//! `game` layer drives a session: square selection, the timed clock and
//! scheduling the computer's replies against a virtual timeline.

mod board;
mod game;

pub use board::*;
pub use game::*;
