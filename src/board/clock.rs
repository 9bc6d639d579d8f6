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

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use super::material::{Color, Pair};

pub const DEFAULT_CLOCK_SECONDS: u32 = 1800;

/// Countdown clocks for both sides, in whole seconds.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    duration: u32,
    remaining: Pair<u32>,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(DEFAULT_CLOCK_SECONDS)
    }
}

impl Clock {
    pub fn new(duration: u32) -> Self {
        Self {
            duration,
            remaining: Pair::splat(duration),
        }
    }

    #[inline]
    pub fn duration(&self) -> u32 {
        self.duration
    }

    #[inline]
    pub fn remaining(&self, color: Color) -> u32 {
        self.remaining[color]
    }

    #[inline]
    pub fn remaining_pair(&self) -> Pair<u32> {
        self.remaining
    }

    #[inline]
    pub fn is_expired(&self, color: Color) -> bool {
        self.remaining[color] == 0
    }

    /// The first side (white before black) whose clock reads zero.
    pub fn expired(&self) -> Option<Color> {
        Color::iter().find(|color| self.is_expired(*color))
    }

    pub fn reset(&mut self) {
        self.remaining = Pair::splat(self.duration);
    }

    /// Takes one second off `color`'s clock. Returns `true` only for the tick
    /// that reaches zero; an expired clock stays at zero.
    pub fn tick(&mut self, color: Color) -> bool {
        match self.remaining[color] {
            0 => false,
            seconds => {
                self.remaining[color] = seconds - 1;
                seconds == 1
            }
        }
    }

    /// Renders a number of seconds as `MM:SS`.
    pub fn format(seconds: u32) -> String {
        format!("{:02}:{:02}", seconds / 60, seconds % 60)
    }

    #[cfg(test)]
    pub(crate) fn set_remaining(&mut self, color: Color, seconds: u32) {
        self.remaining[color] = seconds;
    }
}
