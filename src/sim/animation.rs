//! Frame-index animation with its own clock
//!
//! Each animation advances on real elapsed time, independently of the
//! logic tick, at a fixed number of milliseconds per frame.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    /// Sprite-sheet offset multiplier for each frame
    sequence: Vec<u32>,
    frame: usize,
    /// Milliseconds between frames
    rate_ms: f32,
    looping: bool,
    playing: bool,
    /// Time accumulated toward the next frame
    #[serde(skip)]
    elapsed_ms: f32,
}

impl Animation {
    pub fn new(sequence: Vec<u32>, rate_ms: f32, looping: bool) -> Self {
        Self {
            sequence,
            frame: 0,
            rate_ms: rate_ms.max(1.0),
            looping,
            playing: false,
            elapsed_ms: 0.0,
        }
    }

    /// Start (or resume) the clock
    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Halt the clock, keeping the current frame
    pub fn stop(&mut self) {
        self.playing = false;
        self.elapsed_ms = 0.0;
    }

    /// Rewind to frame 0 without changing whether it plays
    pub fn reset(&mut self) {
        self.frame = 0;
        self.elapsed_ms = 0.0;
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    #[inline]
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Step to the next frame
    ///
    /// The last frame wraps to 0 when looping, otherwise it holds and the
    /// animation stops.
    pub fn increment(&mut self) {
        if self.frame + 1 < self.sequence.len() {
            self.frame += 1;
        } else if self.looping {
            self.frame = 0;
        } else {
            self.stop();
        }
    }

    /// Feed elapsed time into the clock, firing as many increments as fit
    pub fn advance(&mut self, dt_ms: f32) {
        if !self.playing {
            return;
        }
        self.elapsed_ms += dt_ms;
        while self.playing && self.elapsed_ms >= self.rate_ms {
            self.elapsed_ms -= self.rate_ms;
            self.increment();
        }
    }

    /// Sprite offset for the current frame
    pub fn sequence_value(&self) -> u32 {
        self.sequence.get(self.frame).copied().unwrap_or(0)
    }

    /// Largest value anywhere in the sequence
    pub fn max_value(&self) -> u32 {
        self.sequence.iter().copied().max().unwrap_or(0)
    }

    /// True while showing the sequence's largest offset
    pub fn at_peak(&self) -> bool {
        !self.sequence.is_empty() && self.sequence_value() == self.max_value()
    }
}
