#![allow(dead_code)]

use docgraph_core::{Config, Task, TaskOutput, Workspace};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A scratch documentation project, removed when dropped.
pub struct TestWorkspace {
    _tmp: TempDir,
    pub root: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().to_path_buf();
        for dir in ["help", "help/_includes", "_data"] {
            fs::create_dir_all(root.join(dir)).expect("create workspace dir");
        }
        Self { _tmp: tmp, root }
    }

    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.root.join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("create parent");
        fs::write(&path, content).expect("write test file");
        path
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.root.join(rel)).expect("read test file")
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.root.join(rel).exists()
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::new(&self.root, Config::default())
    }

    pub fn run(&self, task: Task) -> TaskOutput {
        self.workspace().run(task).expect("task succeeds")
    }

    pub fn output(&self, task: Task) -> String {
        self.run(task).text()
    }

    pub fn relationships_file(&self) -> PathBuf {
        Config::default().relationships_path(&self.root)
    }

    pub fn relationships_yaml(&self) -> serde_yaml::Value {
        let text = fs::read_to_string(self.relationships_file()).expect("relationships file");
        serde_yaml::from_str(&text).expect("valid yaml")
    }
}
