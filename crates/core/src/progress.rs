// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Progress aggregation across peer items.

use serde::{Deserialize, Serialize};

/// Anything reporting work done out of a total.
pub trait Progress {
    fn current(&self) -> u64;
    fn total(&self) -> u64;
}

/// Plain current/total pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressCounter {
    pub current: u64,
    pub total: u64,
}

impl ProgressCounter {
    pub fn new(current: u64, total: u64) -> Self {
        Self { current, total }
    }
}

impl Progress for ProgressCounter {
    fn current(&self) -> u64 {
        self.current
    }

    fn total(&self) -> u64 {
        self.total
    }
}

impl<P: Progress + ?Sized> Progress for &P {
    fn current(&self) -> u64 {
        (**self).current()
    }

    fn total(&self) -> u64 {
        (**self).total()
    }
}

/// Summed progress of a collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressTotals {
    pub current: u64,
    pub total: u64,
}

impl ProgressTotals {
    pub fn sum<P: Progress>(items: impl IntoIterator<Item = P>) -> Self {
        items.into_iter().fold(Self::default(), |acc, item| Self {
            current: acc.current.saturating_add(item.current()),
            total: acc.total.saturating_add(item.total()),
        })
    }

    /// Fraction done; zero when there is no work at all.
    pub fn complete(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.current as f64 / self.total as f64
    }

    pub fn remaining(&self) -> f64 {
        1.0 - self.complete()
    }
}

impl Progress for ProgressTotals {
    fn current(&self) -> u64 {
        self.current
    }

    fn total(&self) -> u64 {
        self.total
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
