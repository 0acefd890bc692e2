// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Progress counter specs

use crate::prelude::*;
use rollup_core::{ProgressCounter, ProgressTotals};

#[test]
fn counter_survives_flushes_and_reload() {
    let gateway = MemoryGateway::new();
    let mut magician = release(gateway.clone(), FakeClock::new());
    magician.flush_all().unwrap();

    assert_eq!(magician.increment_progress("build", 3).unwrap(), 3);
    assert_eq!(magician.increment_progress("build", 4).unwrap(), 7);
    assert_eq!(magician.flush_all().unwrap(), 0);

    magician.start("release", StartOptions::default()).unwrap();
    magician.start("build", StartOptions::default()).unwrap();
    magician.flush_all().unwrap();

    let loaded = Magician::load("release", gateway, FakeClock::new()).unwrap().unwrap();
    assert_eq!(loaded.find_by_id("build").unwrap().current_progress(), 7);
    assert_eq!(loaded.find_by_id("test").unwrap().current_progress(), 0);
}

#[test]
fn totals_roll_up_stored_counters() {
    let gateway = MemoryGateway::new();
    let mut magician = release(gateway.clone(), FakeClock::new());
    magician.flush_all().unwrap();
    magician.increment_progress("build", 5).unwrap();
    magician.increment_progress("test", 1).unwrap();

    let loaded = Magician::load("release", gateway, FakeClock::new()).unwrap().unwrap();
    let counters = ["build", "test"].map(|id| {
        let current = loaded.find_by_id(id).unwrap().current_progress();
        ProgressCounter::new(current.unsigned_abs(), 10)
    });
    let totals = ProgressTotals::sum(counters);

    assert_eq!((totals.current, totals.total), (6, 20));
    assert!((totals.complete() - 0.3).abs() < f64::EPSILON);
}
