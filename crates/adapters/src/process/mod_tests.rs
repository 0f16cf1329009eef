// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    success = { JobExit::Code(0), 0 },
    failure = { JobExit::Code(2), 2 },
    sigint = { JobExit::Signaled(2), 254 },
    sigterm = { JobExit::Signaled(15), 241 },
    sigkill = { JobExit::Signaled(9), 247 },
)]
fn exit_codes(exit: JobExit, expected: i32) {
    assert_eq!(exit.code(), expected);
}

#[test]
fn no_signal_maps_to_the_interrupted_code() {
    for signal in 1..=64 {
        let code = JobExit::Signaled(signal).code();
        assert_ne!(code, 130, "signal {signal}");
        assert!((1..=255).contains(&code), "signal {signal}");
    }
}
