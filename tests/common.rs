#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Isolated environment for one test: its own HOME and database file.
pub struct TestEnv {
    pub home: PathBuf,
    pub db: String,
}

impl TestEnv {
    pub fn new(name: &str) -> Self {
        let mut home: PathBuf = env::temp_dir();
        home.push(format!("{}_rzoomsync_home", name));
        fs::remove_dir_all(&home).ok();
        fs::create_dir_all(&home).expect("create test home");

        let db = home.join("rzoomsync.sqlite").to_string_lossy().to_string();
        Self { home, db }
    }

    /// Command pointed at this environment, without Zoom credentials.
    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("rzoomsync");
        cmd.env("HOME", &self.home)
            .env("APPDATA", &self.home)
            .env_remove("ZOOM_ACCOUNT_ID")
            .env_remove("ZOOM_CLIENT_ID")
            .env_remove("ZOOM_CLIENT_SECRET")
            .env_remove("ZOOM_API_URL")
            .env_remove("ZOOM_OAUTH_URL")
            .args(["--db", &self.db]);
        cmd
    }

    /// Run `init` in test mode.
    pub fn init(&self) {
        self.cmd().args(["--test", "init"]).assert().success();
    }

    pub fn enrol(&self, course: &str, email: &str, first: &str, last: &str) {
        self.cmd()
            .args([
                "enrol", "--course", course, "--email", email, "--first", first, "--last", last,
            ])
            .assert()
            .success();
    }

    pub fn create_meeting(&self, course: &str, topic: &str) {
        self.cmd()
            .args([
                "meeting",
                "create",
                "--course",
                course,
                "--topic",
                topic,
                "--start",
                "2025-03-01 09:00",
                "--duration",
                "60",
            ])
            .assert()
            .success();
    }

    pub fn conn(&self) -> rusqlite::Connection {
        rusqlite::Connection::open(&self.db).expect("open db")
    }

    pub fn count(&self, table: &str) -> i64 {
        self.conn()
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
            .expect("count rows")
    }
}
