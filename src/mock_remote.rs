//! In-memory object store for tests.

use crate::{error::GoesFetchError, remote::RemoteArchive};
use std::{
    error::Error,
    sync::{Arc, Mutex},
    thread,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCopy {
    pub src_bucket: String,
    pub key: String,
    pub dst_bucket: String,
    pub dst_key: String,
}

#[derive(Debug, Default)]
struct State {
    /// (bucket, key, number of list calls before the blob is visible)
    blobs: Vec<(String, String, usize)>,
    list_calls: Vec<(String, String)>,
    /// (key, name of the thread that fetched it)
    downloads: Vec<(String, Option<String>)>,
    copies: Vec<RecordedCopy>,
}

/// Shares its state across clones, so a handle given to worker threads records into the
/// same log the test inspects.
#[derive(Debug, Clone, Default)]
pub struct MockRemote {
    state: Arc<Mutex<State>>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_blob(&self, bucket: &str, key: &str) {
        self.publish_after(bucket, key, 0);
    }

    /// Blob is hidden from the first `list_calls` listings of any prefix.
    pub fn publish_after(&self, bucket: &str, key: &str, list_calls: usize) {
        let mut state = self.state.lock().unwrap();
        state
            .blobs
            .push((bucket.to_owned(), key.to_owned(), list_calls));
    }

    pub fn list_calls(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().list_calls.clone()
    }

    pub fn downloads(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.downloads.iter().map(|(key, _)| key.clone()).collect()
    }

    /// Thread names that performed downloads, in order.
    pub fn download_threads(&self) -> Vec<Option<String>> {
        let state = self.state.lock().unwrap();
        state.downloads.iter().map(|(_, name)| name.clone()).collect()
    }

    pub fn copies(&self) -> Vec<RecordedCopy> {
        self.state.lock().unwrap().copies.clone()
    }
}

impl RemoteArchive for MockRemote {
    fn list_blobs(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, Box<dyn Error>> {
        let mut state = self.state.lock().unwrap();
        let seen = state.list_calls.len();
        state
            .list_calls
            .push((bucket.to_owned(), prefix.to_owned()));

        Ok(state
            .blobs
            .iter()
            .filter(|(b, k, after)| b == bucket && k.starts_with(prefix) && *after <= seen)
            .map(|(_, k, _)| k.clone())
            .collect())
    }

    fn retrieve_remote_file(&self, bucket: &str, key: &str) -> Result<Vec<u8>, Box<dyn Error>> {
        let mut state = self.state.lock().unwrap();
        let thread_name = thread::current().name().map(str::to_owned);
        state.downloads.push((key.to_owned(), thread_name));

        if state.blobs.iter().any(|(b, k, _)| b == bucket && k == key) {
            Ok(key.as_bytes().to_vec())
        } else {
            Err(Box::new(GoesFetchError::download(&format!(
                "No such key: {}",
                key
            ))))
        }
    }

    fn copy_between_buckets(
        &self,
        src_bucket: &str,
        key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> Result<(), Box<dyn Error>> {
        let mut state = self.state.lock().unwrap();
        state.copies.push(RecordedCopy {
            src_bucket: src_bucket.to_owned(),
            key: key.to_owned(),
            dst_bucket: dst_bucket.to_owned(),
            dst_key: dst_key.to_owned(),
        });
        state
            .blobs
            .push((dst_bucket.to_owned(), dst_key.to_owned(), 0));
        Ok(())
    }
}
