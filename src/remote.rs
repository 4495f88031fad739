use std::error::Error;

/// Capabilities the orchestrator needs from an object store.
///
/// Implementations are cloned into download worker threads.
pub trait RemoteArchive: Clone + Send {
    /// Every key under `prefix`, in the order the store returns them.
    fn list_blobs(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, Box<dyn Error>>;

    fn retrieve_remote_file(&self, bucket: &str, key: &str) -> Result<Vec<u8>, Box<dyn Error>>;

    /// Copy `key` into another bucket without saving it to local disk.
    fn copy_between_buckets(
        &self,
        src_bucket: &str,
        key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> Result<(), Box<dyn Error>>;
}
