use chrono::naive::NaiveDateTime;
use std::path::{Path, PathBuf};

pub const DAY_FORMAT: &str = "%Y%m%d";

/// Date directories visited during a run, one per calendar day, in visiting order.
#[derive(Clone, Debug, Default)]
pub struct OutputManifest {
    root: PathBuf,
    days: Vec<String>,
}

impl OutputManifest {
    pub fn new(root: &Path) -> Self {
        OutputManifest {
            root: root.to_path_buf(),
            days: vec![],
        }
    }

    /// Record `time`, unless its day is the same as the last one recorded.
    pub fn visit(&mut self, time: NaiveDateTime) {
        let day = time.format(DAY_FORMAT).to_string();

        if self.days.last() != Some(&day) {
            log::debug!("Visiting new day directory {}", day);
            self.days.push(day);
        }
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn into_paths(self) -> Vec<PathBuf> {
        let root = self.root;
        self.days.into_iter().map(|day| root.join(day)).collect()
    }
}
