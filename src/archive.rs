use std::{
    error::Error,
    fs::create_dir_all,
    path::{Path, PathBuf},
};

use crate::{
    config::{FetchConfig, ValidConfig},
    download::{download_parallel, download_to},
    manifest::{OutputManifest, DAY_FORMAT},
    product::{basename, batch_id, Category, ProductQuery},
    remote::RemoteArchive,
    window::TimeWindow,
};
use chrono::{naive::NaiveDateTime, Duration, Timelike};

/// GLM files taken from a neighbouring hour when the cursor sits near an hour boundary.
const GLM_BOUNDARY_FILES: usize = 8;

pub struct Archive<T: RemoteArchive> {
    root: PathBuf,
    remote: T,
}

impl<RA: 'static> Archive<RA>
where
    RA: RemoteArchive,
{
    pub fn connect<P>(root_path: P, remote: RA) -> Self
    where
        P: Into<PathBuf>,
    {
        let root = root_path.into();
        log::info!("Files downloaded to outroot {:?}", &root);
        Self { root, remote }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Fetch everything `config` asks for, in real-time mode when it has no start date.
    pub fn run(&self, config: &FetchConfig) -> Result<Vec<PathBuf>, Box<dyn Error>> {
        let now = chrono::Utc::now().naive_utc();
        let window = config.time_window(now)?;
        self.retrieve(config, window)
    }

    /// Fetch every hour of `window` and return the date directories visited.
    pub fn retrieve(
        &self,
        config: &FetchConfig,
        window: TimeWindow,
    ) -> Result<Vec<PathBuf>, Box<dyn Error>> {
        let config = config.validate()?;
        let mut manifest = OutputManifest::new(&self.root);

        let sat: &'static str = config.satellite.into();
        let sector: &'static str = config.sector.into();
        log::info!(
            "Fetching {:?} for {} {} from {} to {}",
            config.categories,
            sat,
            sector,
            window.start(),
            window.end()
        );

        for cursor in window.hours() {
            let hour = HourRun {
                archive: self,
                config: &config,
                bucket: config.satellite.bucket_name(),
                cursor,
                real_time: window.is_real_time(),
            };

            let ir_batch = if config.wants(Category::Ir) {
                hour.fetch_ir()
            } else {
                None
            };

            for cat in [Category::Vis, Category::IrDiff].iter() {
                if config.wants(*cat) {
                    hour.fetch_correlated(*cat, ir_batch.as_deref());
                }
            }

            if config.wants(Category::Glm) {
                hour.fetch_glm();
            }

            manifest.visit(cursor);
        }

        Ok(manifest.into_paths())
    }
}

// Private implementation.

/// Work for a single cursor position.
struct HourRun<'a, RA: RemoteArchive> {
    archive: &'a Archive<RA>,
    config: &'a ValidConfig,
    bucket: &'static str,
    cursor: NaiveDateTime,
    real_time: bool,
}

impl<'a, RA: 'static> HourRun<'a, RA>
where
    RA: RemoteArchive,
{
    /// Fetch the infrared channel. Returns the batch id of the newest scan in real-time mode.
    fn fetch_ir(&self) -> Option<String> {
        let cat = Category::Ir;
        let query = ProductQuery::image(self.bucket, cat, self.config.sector, self.cursor);

        let mut keys = self.list(&query);
        if keys.is_empty() && self.real_time {
            log::info!("Waiting for {} files to be available online", cat.description());
            keys = self
                .config
                .poll
                .poll(cat.description(), || query.list(&self.archive.remote));
        }

        let keys = select_images(keys, self.real_time);
        if keys.is_empty() {
            self.report_missing(cat);
            return None;
        }

        self.transfer(cat, &keys);

        if self.real_time {
            keys.last().and_then(|k| batch_id(k)).map(str::to_owned)
        } else {
            None
        }
    }

    /// Fetch a channel that should come from the same scan as the infrared file.
    fn fetch_correlated(&self, cat: Category, ir_batch: Option<&str>) {
        let query = ProductQuery::image(self.bucket, cat, self.config.sector, self.cursor);

        let keys = match (self.real_time, ir_batch) {
            (true, Some(batch)) => {
                let correlated = query.clone().with_batch_id(batch);
                let mut keys = self.list(&correlated);

                if keys.is_empty() {
                    log::info!(
                        "Waiting for {} files from scan {} to be available online",
                        cat.description(),
                        batch
                    );
                    keys = self
                        .config
                        .poll
                        .poll(cat.description(), || correlated.list(&self.archive.remote));
                }

                if keys.is_empty() {
                    log::warn!(
                        "No {} file for scan {}, taking the newest available instead",
                        cat.description(),
                        batch
                    );
                    keys = self.list(&query);
                }

                if keys.is_empty() {
                    keys = self
                        .config
                        .poll
                        .poll(cat.description(), || query.list(&self.archive.remote));
                }

                keys
            }
            _ => self.list(&query),
        };

        let keys = select_images(keys, self.real_time);
        if keys.is_empty() {
            self.report_missing(cat);
            return;
        }

        self.transfer(cat, &keys);
    }

    fn fetch_glm(&self) {
        let cat = Category::Glm;
        let minute = self.cursor.minute();

        let current = self.list(&ProductQuery::glm(self.bucket, self.cursor));
        if current.is_empty() {
            self.report_missing(cat);
        }

        let previous = if minute < 3 {
            let prev_hour = self.cursor - Duration::hours(1);
            self.list(&ProductQuery::glm(self.bucket, prev_hour))
        } else {
            vec![]
        };

        let next = if minute > 55 && !self.real_time {
            let next_hour = self.cursor + Duration::hours(1);
            self.list(&ProductQuery::glm(self.bucket, next_hour))
        } else {
            vec![]
        };

        let keys = if self.real_time {
            select_glm_real_time(
                current,
                previous,
                self.config.sector.glm_keep_count(),
                minute,
            )
        } else {
            select_glm_historical(current, previous, next, minute)
        };

        if keys.is_empty() {
            return;
        }

        if self.real_time {
            self.transfer_parallel(cat, &keys);
        } else {
            self.transfer(cat, &keys);
        }
    }

    fn list(&self, query: &ProductQuery) -> Vec<String> {
        match query.list(&self.archive.remote) {
            Ok(keys) => keys,
            Err(err) => {
                log::error!("Error retrieving remote file names: {}", err);
                vec![]
            }
        }
    }

    fn report_missing(&self, cat: Category) {
        log::info!(
            "No {} files found for {}",
            cat.description(),
            self.cursor.format("%Y-%m-%d-%H-%M-%S")
        );
    }

    fn day(&self) -> String {
        self.cursor.format(DAY_FORMAT).to_string()
    }

    /// Create the category directory for this hour's day, if it is missing.
    fn output_dir(&self, cat: Category) -> Option<PathBuf> {
        let cat_dir: &'static str = cat.into();
        let outdir = self.archive.root.join(self.day()).join(cat_dir);

        if !outdir.exists() {
            log::debug!("Creating path: {:?}", outdir);
        }

        match create_dir_all(&outdir) {
            Ok(()) => Some(outdir),
            Err(err) => {
                log::error!("Error creating directory: {:?} : {}", outdir, err);
                None
            }
        }
    }

    fn transfer(&self, cat: Category, keys: &[String]) {
        let outdir = match self.output_dir(cat) {
            Some(outdir) => outdir,
            None => return,
        };

        for key in keys {
            if self.config.keep_local {
                log::info!("Downloading {}", key);
                if let Err(err) = download_to(&self.archive.remote, self.bucket, key, &outdir) {
                    log::error!("Error downloading data: {}", err);
                }
            }

            self.mirror(cat, key);
        }
    }

    fn transfer_parallel(&self, cat: Category, keys: &[String]) {
        let outdir = match self.output_dir(cat) {
            Some(outdir) => outdir,
            None => return,
        };

        if self.config.keep_local {
            if let Err(err) = download_parallel(&self.archive.remote, self.bucket, keys, &outdir) {
                log::error!("Error in parallel download of {} files: {}", keys.len(), err);
            }
        }

        for key in keys {
            self.mirror(cat, key);
        }
    }

    fn mirror(&self, cat: Category, key: &str) {
        let dst_bucket = match &self.config.mirror_bucket {
            Some(dst_bucket) => dst_bucket,
            None => return,
        };

        let dst_key = mirror_key(&self.day(), cat, key);
        log::debug!("Copying {} to {}/{}", key, dst_bucket, dst_key);

        if let Err(err) =
            self.archive
                .remote
                .copy_between_buckets(self.bucket, key, dst_bucket, &dst_key)
        {
            log::error!("Error copying {} to {}: {}", key, dst_bucket, err);
        }
    }
}

/// Destination key in the mirror bucket, `YYYYMMDD/<category>/<file name>`.
fn mirror_key(day: &str, cat: Category, key: &str) -> String {
    let cat_dir: &'static str = cat.into();
    format!("{}/{}/{}", day, cat_dir, basename(key))
}

fn select_images(keys: Vec<String>, real_time: bool) -> Vec<String> {
    if real_time {
        tail(keys, 1)
    } else {
        keys
    }
}

/// Newest `keep` files of the hour, followed by a slice of the previous hour that shrinks as
/// the cursor moves past the top of the hour.
fn select_glm_real_time(
    current: Vec<String>,
    previous: Vec<String>,
    keep: usize,
    minute: u32,
) -> Vec<String> {
    let mut keys = tail(current, keep);

    if minute < 3 {
        let backfill = GLM_BOUNDARY_FILES.saturating_sub(3 * minute as usize);
        keys.extend(tail(previous, backfill));
    }

    keys
}

fn select_glm_historical(
    current: Vec<String>,
    previous: Vec<String>,
    next: Vec<String>,
    minute: u32,
) -> Vec<String> {
    let mut keys = vec![];

    if minute > 55 {
        keys.extend(head(next, GLM_BOUNDARY_FILES));
    }

    keys.extend(current);

    if minute < 3 {
        keys.extend(tail(previous, GLM_BOUNDARY_FILES));
    }

    keys
}

fn tail(mut keys: Vec<String>, n: usize) -> Vec<String> {
    let start = keys.len().saturating_sub(n);
    keys.split_off(start)
}

fn head(mut keys: Vec<String>, n: usize) -> Vec<String> {
    keys.truncate(n);
    keys
}
