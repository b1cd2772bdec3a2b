use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub const REPORTS_DIR: &str = "docs/compatibility/clients";
pub const PROGRESS_PATH: &str = "docs/compatibility/progress.md";
pub const INDEX_PATH: &str = "docs/compatibility/index.md";

/// Temporary docs tree laid out the way the default config expects.
#[derive(Debug)]
pub struct DocsTree {
    dir: TempDir,
}

impl DocsTree {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp docs tree");
        fs::create_dir_all(dir.path().join(REPORTS_DIR)).expect("create reports dir");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&path, contents).expect("write fixture");
        path
    }

    pub fn write_report(&self, file_name: &str, contents: &str) -> PathBuf {
        self.write(&format!("{REPORTS_DIR}/{file_name}"), contents)
    }

    pub fn write_progress(&self, contents: &str) -> PathBuf {
        self.write(PROGRESS_PATH, contents)
    }

    pub fn write_index(&self, contents: &str) -> PathBuf {
        self.write(INDEX_PATH, contents)
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).expect("read fixture")
    }

    pub fn read_index(&self) -> String {
        self.read(INDEX_PATH)
    }
}

impl Default for DocsTree {
    fn default() -> Self {
        Self::new()
    }
}
