use crate::{error::GoesFetchError, product::basename, remote::RemoteArchive};
use crossbeam_channel::{bounded, unbounded};
use std::{
    fs::{remove_file, File},
    io::Write,
    path::{Path, PathBuf},
};

pub const NUM_DOWNLOADERS: usize = 5;

/// Fetch `key` into `dir`, replacing any file already there.
pub fn download_to<RA: RemoteArchive>(
    remote: &RA,
    bucket: &str,
    key: &str,
    dir: &Path,
) -> Result<PathBuf, GoesFetchError> {
    let data = remote
        .retrieve_remote_file(bucket, key)
        .map_err(|err| GoesFetchError::download(&format!("{} : {}", key, err)))?;

    let pth = dir.join(basename(key));
    let f = File::create(&pth).map_err(|err| {
        GoesFetchError::download(&format!("Error creating file: {:?} : {}", pth, err))
    })?;

    save(f, &pth, &data)?;

    log::debug!("Saved {:?}", pth);
    Ok(pth)
}

/// Write `data` through `f`, the open handle for `pth`. A partial file is removed on failure.
fn save<W: Write>(mut f: W, pth: &Path, data: &[u8]) -> Result<(), GoesFetchError> {
    let res = f.write_all(data).and_then(|()| f.flush());
    drop(f);

    if let Err(err) = res {
        if let Err(rm_err) = remove_file(pth) {
            log::warn!("Unable to remove partial file: {:?} : {}", pth, rm_err);
        }

        return Err(GoesFetchError::download(&format!(
            "Error writing data to disk: {:?} : {}",
            pth, err
        )));
    }

    Ok(())
}

/// Download `keys` into `dir` with a fixed pool of [`NUM_DOWNLOADERS`] threads.
///
/// Every download runs to completion; the first failure (in key order) is returned after all
/// workers have finished.
pub fn download_parallel<RA>(
    remote: &RA,
    bucket: &str,
    keys: &[String],
    dir: &Path,
) -> Result<Vec<PathBuf>, GoesFetchError>
where
    RA: RemoteArchive + 'static,
{
    if keys.is_empty() {
        return Ok(vec![]);
    }

    let pool = threadpool::ThreadPool::with_name("Download Thread".to_owned(), NUM_DOWNLOADERS);

    let (to_downloader, needs_downloaded) = bounded::<(usize, String)>(keys.len());
    let (to_collector, results) = unbounded();

    for _ in 0..NUM_DOWNLOADERS {
        let remote = remote.clone();
        let bucket = bucket.to_owned();
        let dir = dir.to_path_buf();
        let needs_downloaded = needs_downloaded.clone();
        let to_collector = to_collector.clone();

        pool.execute(move || {
            for (idx, key) in needs_downloaded {
                log::info!("Downloading {}", key);
                let res = download_to(&remote, &bucket, &key, &dir);
                if to_collector.send((idx, res)).is_err() {
                    log::error!("Result collector hung up before {} finished", key);
                }
            }
        });
    }

    drop(to_collector);
    drop(needs_downloaded);

    for (idx, key) in keys.iter().enumerate() {
        if to_downloader.send((idx, key.clone())).is_err() {
            return Err(GoesFetchError::download("Download pool shut down early"));
        }
    }
    drop(to_downloader);

    pool.join();

    let mut finished: Vec<(usize, Result<PathBuf, GoesFetchError>)> =
        results.try_iter().collect();
    finished.sort_by_key(|(idx, _)| *idx);

    let mut paths = Vec::with_capacity(finished.len());
    let mut first_err = None;
    for (_, res) in finished {
        match res {
            Ok(pth) => paths.push(pth),
            Err(err) => {
                log::error!("Error downloading data: {}", err);
                if first_err.is_none() {
                    first_err = Some(err);
                }
            }
        }
    }

    match first_err {
        Some(err) => Err(err),
        None => Ok(paths),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_remote::MockRemote;
    use tempfile::TempDir;

    const BUCKET: &str = "noaa-goes16";

    fn glm_key(i: usize) -> String {
        format!(
            "GLM-L2-LCFA/2020/153/00/OR_GLM-L2-LCFA_G16_s2020153000{:02}00_e2020153000{:02}20_c1.nc",
            i, i
        )
    }

    #[test]
    fn test_download_to_writes_basename() {
        let remote = MockRemote::new();
        let key = glm_key(1);
        remote.add_blob(BUCKET, &key);
        let dir = TempDir::new().unwrap();

        let pth = download_to(&remote, BUCKET, &key, dir.path()).unwrap();
        assert_eq!(pth, dir.path().join(basename(&key)));
        assert_eq!(std::fs::read(&pth).unwrap(), key.as_bytes());
    }

    #[test]
    fn test_download_to_missing_blob() {
        let remote = MockRemote::new();
        let dir = TempDir::new().unwrap();

        let err = download_to(&remote, BUCKET, &glm_key(1), dir.path()).unwrap_err();
        assert!(!err.is_config());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    /// Accepts a few bytes, then fails like a full disk.
    struct FullDisk {
        room: usize,
    }

    impl Write for FullDisk {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.room == 0 {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
            }
            let n = buf.len().min(self.room);
            self.room -= n;
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_write_removes_partial_file() {
        let dir = TempDir::new().unwrap();
        let pth = dir.path().join(basename(&glm_key(1)));
        std::fs::write(&pth, b"part").unwrap();

        let err = save(FullDisk { room: 4 }, &pth, b"partial data").unwrap_err();
        assert!(err.to_string().contains("Error writing data to disk"));
        assert!(!pth.exists());
    }

    #[test]
    fn test_save_keeps_complete_file() {
        let dir = TempDir::new().unwrap();
        let pth = dir.path().join(basename(&glm_key(2)));
        let f = File::create(&pth).unwrap();

        save(f, &pth, b"complete").unwrap();
        assert_eq!(std::fs::read(&pth).unwrap(), b"complete");
    }

    #[test]
    fn test_parallel_downloads_everything() {
        let remote = MockRemote::new();
        let keys: Vec<String> = (0..23).map(glm_key).collect();
        for key in &keys {
            remote.add_blob(BUCKET, key);
        }
        let dir = TempDir::new().unwrap();

        let paths = download_parallel(&remote, BUCKET, &keys, dir.path()).unwrap();
        assert_eq!(paths.len(), keys.len());
        assert_eq!(remote.downloads().len(), keys.len());
        for (pth, key) in paths.iter().zip(&keys) {
            assert_eq!(pth.file_name().unwrap().to_str().unwrap(), basename(key));
        }
    }

    #[test]
    fn test_parallel_failure_does_not_cancel_siblings() {
        let remote = MockRemote::new();
        let keys: Vec<String> = (0..10).map(glm_key).collect();
        for key in keys.iter().filter(|k| **k != keys[3]) {
            remote.add_blob(BUCKET, key);
        }
        let dir = TempDir::new().unwrap();

        let err = download_parallel(&remote, BUCKET, &keys, dir.path()).unwrap_err();
        assert!(err.to_string().contains(&keys[3]));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 9);
    }
}
