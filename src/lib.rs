/**************************************************************************************************
 *                                           Public API
 *************************************************************************************************/
pub use crate::{
    archive::Archive,
    config::{FetchConfig, ValidConfig, DEFAULT_OUTROOT},
    download::{download_parallel, download_to, NUM_DOWNLOADERS},
    error::GoesFetchError,
    manifest::OutputManifest,
    poll::PollPolicy,
    product::{batch_id, Category, ProductQuery},
    remote::RemoteArchive,
    s3_remote::AmazonS3NoaaBigData,
    satellite::Satellite,
    sector::Sector,
    window::{parse_date, TimeWindow, DATE_FORMAT},
};
/**************************************************************************************************
 *                                      Private Implementation
 *************************************************************************************************/
mod archive;
mod config;
mod download;
mod error;
mod manifest;
#[cfg(test)]
mod mock_remote;
mod poll;
mod product;
mod remote;
mod s3_remote;
mod satellite;
mod sector;
mod window;
