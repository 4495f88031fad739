use crate::{error::GoesFetchError, remote::RemoteArchive};
use s3::{bucket::Bucket, creds::Credentials, region::Region};
use std::error::Error;

/// NOAA's GOES buckets on AWS, optionally paired with a bucket to mirror into.
#[derive(Debug, Clone)]
pub struct AmazonS3NoaaBigData {
    region: Region,
    source_credentials: Credentials,
    mirror_credentials: Option<Credentials>,
}

impl AmazonS3NoaaBigData {
    pub fn connect() -> Result<Self, Box<dyn Error>> {
        let region: Region = "us-east-1".parse()?;
        let source_credentials = Credentials::anonymous()?;

        Ok(AmazonS3NoaaBigData {
            region,
            source_credentials,
            mirror_credentials: None,
        })
    }

    /// Load credentials for writing to a mirror bucket from the usual AWS environment
    /// variables or profile.
    pub fn with_mirror_credentials(mut self) -> Result<Self, Box<dyn Error>> {
        self.mirror_credentials = Some(Credentials::default()?);
        Ok(self)
    }

    fn source_bucket(&self, name: &str) -> Result<Bucket, Box<dyn Error>> {
        let bucket = Bucket::new(name, self.region.clone(), self.source_credentials.clone())?;
        Ok(bucket)
    }

    fn mirror_bucket(&self, name: &str) -> Result<Bucket, Box<dyn Error>> {
        let credentials = match &self.mirror_credentials {
            Some(credentials) => credentials.clone(),
            None => {
                return Err(Box::new(GoesFetchError::config(
                    "No credentials loaded for the mirror bucket",
                )))
            }
        };

        let bucket = Bucket::new(name, self.region.clone(), credentials)?;
        Ok(bucket)
    }
}

impl RemoteArchive for AmazonS3NoaaBigData {
    fn list_blobs(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, Box<dyn Error>> {
        let bucket = self.source_bucket(bucket)?;

        let results = bucket.list_blocking(prefix.to_owned(), Some("/".into()))?;

        let mut keys: Vec<String> = vec![];
        for res in results {
            for obj in &res.contents {
                keys.push(obj.key.clone());
            }
        }

        Ok(keys)
    }

    fn retrieve_remote_file(&self, bucket: &str, key: &str) -> Result<Vec<u8>, Box<dyn Error>> {
        let bucket = self.source_bucket(bucket)?;

        let (data, code) = bucket.get_object_blocking(key)?;

        if code != 200 {
            return Err(Box::new(GoesFetchError::download(&format!(
                "Download error for {}: HTTP {}",
                key, code
            ))));
        }

        Ok(data)
    }

    fn copy_between_buckets(
        &self,
        src_bucket: &str,
        key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> Result<(), Box<dyn Error>> {
        let data = self.retrieve_remote_file(src_bucket, key)?;
        let dst = self.mirror_bucket(dst_bucket)?;

        let (_, code) = dst.put_object_blocking(dst_key, &data)?;

        if code != 200 {
            return Err(Box::new(GoesFetchError::download(&format!(
                "Upload error for {}/{}: HTTP {}",
                dst_bucket, dst_key, code
            ))));
        }

        Ok(())
    }
}
