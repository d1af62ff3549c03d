use serde_json::{Value, json};
use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A run directory under a test projects root, written the way workers do.
pub struct RunFixture {
    dir: PathBuf,
}

impl RunFixture {
    /// Create `{root}/{project}/{run}` with a plan for `workers` workers and an
    /// empty status shard per worker.
    pub fn create(root: &Path, project: &str, run: &str, workers: usize) -> Self {
        let dir = root.join(project).join(run);
        fs::create_dir_all(&dir).expect("failed to create run dir");

        let plan = json!({
            "worker_count": workers,
            "groups": {
                "test_mod": [
                    {"id": "tests/test_mod.py::test_a", "name": "test_a", "params": {}},
                    {"id": "tests/test_mod.py::test_b", "name": "test_b", "params": {}}
                ]
            },
            "row_params": []
        });
        fs::write(dir.join("plan.json"), plan.to_string()).expect("failed to write plan");

        for worker in 0..workers {
            fs::write(dir.join(format!("status.{worker}.jsonl")), "")
                .expect("failed to create shard");
        }

        Self { dir }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn shard_path(&self, worker: usize) -> PathBuf {
        self.dir.join(format!("status.{worker}.jsonl"))
    }

    pub fn log_path(&self, test: &str) -> PathBuf {
        self.dir.join(format!("{}.log.jsonl", test.replace('/', "_")))
    }

    /// Append raw text to a worker's shard. Returns the shard's new size.
    pub fn append_status(&self, worker: usize, text: &str) -> u64 {
        append(&self.shard_path(worker), text);
        fs::metadata(self.shard_path(worker))
            .expect("shard vanished")
            .len()
    }

    pub fn append_log(&self, test: &str, text: &str) {
        append(&self.log_path(test), text);
    }

    pub fn shard_sizes(&self, workers: usize) -> Vec<u64> {
        (0..workers)
            .map(|w| fs::metadata(self.shard_path(w)).map(|m| m.len()).unwrap_or(0))
            .collect()
    }
}

/// One status record line, newline included.
pub fn status_line(test: &str, status: &str, exception: Value) -> String {
    format!(
        "{}\n",
        json!({"test": test, "status": status, "exception": exception})
    )
}

/// One log record line, newline included.
pub fn log_line(level: &str, name: &str, message: &str, time: f64) -> String {
    format!(
        "{}\n",
        json!({"level": level, "name": name, "message": message, "time": time})
    )
}

fn append(path: &Path, text: &str) {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .expect("failed to open for append");
    file.write_all(text.as_bytes()).expect("failed to append");
}
