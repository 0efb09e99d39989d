use clap::ValueEnum;
use serde::Deserialize;
use serde::Serialize;
use std::num::NonZeroUsize;
use strum::Display;
use strum::EnumString;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ValueEnum)]
#[strum(serialize_all = "snake_case")]
pub enum CycleDirection {
    Previous,
    Next,
}

impl CycleDirection {
    /// Wraps around at both ends.
    #[must_use]
    pub const fn next_idx(&self, idx: usize, len: NonZeroUsize) -> usize {
        match self {
            Self::Previous => {
                if idx == 0 {
                    len.get() - 1
                } else {
                    idx - 1
                }
            }
            Self::Next => {
                if idx == len.get() - 1 {
                    0
                } else {
                    idx + 1
                }
            }
        }
    }
}
