// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for CLI specs.

use assert_cmd::Command;
use rollup_core::test_support::config;
use rollup_core::{FakeClock, Magician, StartOptions};
use rollup_storage::FileGateway;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A `rollup` invocation isolated from the caller's environment.
pub struct Cli {
    cmd: Command,
}

pub fn cli() -> Cli {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rollup"));
    cmd.env_remove("ROLLUP_STORE")
        .env_remove("ROLLUP_STATE_DIR")
        .env_remove("ROLLUP_LOG")
        .env("NO_COLOR", "1");
    Cli { cmd }
}

impl Cli {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        self.cmd.env(key, value);
        self
    }

    pub fn store(self, path: &Path) -> Self {
        let path = path.to_string_lossy().into_owned();
        self.args(&["--store", &path])
    }

    pub fn passes(mut self) -> Output {
        Output(self.cmd.assert().success().get_output().clone())
    }

    pub fn exits(mut self, code: i32) -> Output {
        Output(self.cmd.assert().code(code).get_output().clone())
    }
}

pub struct Output(std::process::Output);

impl Output {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.0.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.0.stderr).into_owned()
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(stdout.contains(expected), "stdout missing {expected:?}:\n{stdout}");
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(stderr.contains(expected), "stderr missing {expected:?}:\n{stderr}");
        self
    }
}

/// A temp directory holding a tracker store with this tree:
///
/// ```text
/// release [InProgress] root
///   build [Succeeded] build (nightly)
///     test [Failed] test - flaky
///   deploy [NotStarted] deploy
/// ```
pub struct Store {
    _dir: TempDir,
    pub path: PathBuf,
}

impl Store {
    pub fn seeded() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trackers.json");
        let gateway = FileGateway::open(&path).unwrap();
        let mut root = config("root", None);
        root.name = "release".to_string();
        let mut magician = Magician::new(root, gateway, FakeClock::new());

        let mut build = config("build", None);
        build.name = "build".to_string();
        build.friendly_id = Some("nightly".to_string());
        magician.create(build).unwrap();
        let mut test = config("test", Some("build"));
        test.name = "test".to_string();
        magician.create(test).unwrap();
        let mut deploy = config("deploy", None);
        deploy.name = "deploy".to_string();
        magician.create(deploy).unwrap();

        magician.start("root", StartOptions::default()).unwrap();
        magician.start("build", StartOptions::default()).unwrap();
        magician.start("test", StartOptions::default()).unwrap();
        magician.fail("test").unwrap();
        magician.tracker_mut("test").unwrap().with_status_msg("flaky");
        magician.succeed("build").unwrap();
        magician.flush_all().unwrap();

        Self { _dir: dir, path }
    }
}
