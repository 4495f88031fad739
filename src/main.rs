use std::{env, path::PathBuf, process, time::Duration};

use clap::Parser;

use goes_fetch::{AmazonS3NoaaBigData, Archive, FetchConfig, PollPolicy, DEFAULT_OUTROOT};

#[derive(Parser)]
#[command(
    version,
    about = "Download GOES IR/VIS L1b and GLM L2 files for a date range or in real time"
)]
struct Cli {
    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase verbosity (-v for info, -vv for debug)")]
    verbose: u8,

    /// Start date, 'YYYY-MM-DD HH:MM:SS'. Omit to fetch the newest files in real time.
    #[arg(long)]
    start: Option<String>,

    /// End date, 'YYYY-MM-DD HH:MM:SS'. Defaults to the start date.
    #[arg(long, requires = "start")]
    end: Option<String>,

    #[arg(short, long, default_value = DEFAULT_OUTROOT)]
    outroot: PathBuf,

    #[arg(long, default_value = "goes-16")]
    sat: String,

    /// One of meso1, meso2, conus, full.
    #[arg(long, default_value = "meso2")]
    sector: String,

    #[arg(long)]
    no_ir: bool,

    #[arg(long)]
    no_vis: bool,

    /// Fetch the 6.2 micron IR channel, skipped by default.
    #[arg(long)]
    irdiff: bool,

    #[arg(long)]
    no_glm: bool,

    /// Bucket to copy every fetched file into.
    #[arg(long)]
    mirror_bucket: Option<String>,

    /// Do not keep a local copy; only useful with --mirror-bucket.
    #[arg(long, requires = "mirror_bucket")]
    skip_local: bool,

    /// Listing attempts while waiting for a real-time file.
    #[arg(long, default_value = "60")]
    max_attempts: u32,

    /// Re-list without delay or limit until real-time files appear.
    #[arg(long, conflicts_with = "max_attempts")]
    poll_forever: bool,

    /// Seconds before the first retry; doubles on every attempt.
    #[arg(long, default_value = "1")]
    poll_delay: u64,

    #[arg(long, default_value = "30")]
    poll_max_delay: u64,
}

impl Cli {
    fn fetch_config(&self) -> FetchConfig {
        let poll = if self.poll_forever {
            PollPolicy::spin_forever()
        } else {
            PollPolicy {
                max_attempts: Some(self.max_attempts),
                initial_delay: Duration::from_secs(self.poll_delay),
                max_delay: Duration::from_secs(self.poll_max_delay),
            }
        };

        FetchConfig {
            start: self.start.clone(),
            end: self.end.clone(),
            satellite: self.sat.clone(),
            sector: self.sector.clone(),
            no_ir: self.no_ir,
            no_vis: self.no_vis,
            no_irdiff: !self.irdiff,
            no_glm: self.no_glm,
            mirror_bucket: self.mirror_bucket.clone(),
            skip_local: self.skip_local,
            poll,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    match cli.verbose {
        0 => {}
        1 => env::set_var("RUST_LOG", "info"),
        _ => env::set_var("RUST_LOG", "debug"),
    }
    env_logger::init();

    let config = cli.fetch_config();

    let mut remote = match AmazonS3NoaaBigData::connect() {
        Ok(remote) => remote,
        Err(err) => {
            log::error!("Unable to connect to the GOES archive: {}", err);
            process::exit(1);
        }
    };

    if config.mirror_bucket.is_some() {
        remote = match remote.with_mirror_credentials() {
            Ok(remote) => remote,
            Err(err) => {
                log::error!("Unable to load credentials for the mirror bucket: {}", err);
                process::exit(1);
            }
        };
    }

    let archive = Archive::connect(&cli.outroot, remote);

    match archive.run(&config) {
        Ok(days) => {
            for day in days {
                println!("{}", day.display());
            }
        }
        Err(err) => {
            log::error!("error: {}", err);
            process::exit(1);
        }
    }
}
