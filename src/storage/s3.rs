//! S3 object store backend
//!
//! Credentials come from the standard AWS provider chain. Conditional writes use
//! `If-Match` / `If-None-Match: *`, which S3 rejects with `PreconditionFailed`
//! (or `ConditionalRequestConflict` while another conditional write is in flight).

use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;

use super::{ObjectStore, PutCondition, StoredObject, validate_key};
use crate::error::{self, Result};
use crate::runtime;

const PRECONDITION_CODES: [&str; 2] = ["PreconditionFailed", "ConditionalRequestConflict"];

pub struct S3ObjectStore {
    bucket: String,
    client: Client,
}

impl S3ObjectStore {
    pub fn new(bucket: String, region: Option<String>) -> Result<Self> {
        let client = runtime::block_on(async move {
            let mut loader = aws_config::defaults(BehaviorVersion::latest());
            if let Some(r) = region {
                loader = loader.region(Region::new(r));
            }
            let conf = loader.load().await;
            Client::new(&conf)
        })?;

        Ok(Self { bucket, client })
    }
}

impl ObjectStore for S3ObjectStore {
    fn get(&self, key: &str) -> Result<Option<StoredObject>> {
        validate_key(key)?;
        let request = self.client.get_object().bucket(&self.bucket).key(key);

        runtime::block_on(async move {
            let output = match request.send().await {
                Ok(output) => output,
                Err(err) => {
                    if err.as_service_error().is_some_and(|e| e.is_no_such_key()) {
                        return Ok(None);
                    }
                    return Err(error::storage::failed("get", key, err.to_string()));
                }
            };
            let etag = output.e_tag().map(ToOwned::to_owned);
            let bytes = output
                .body
                .collect()
                .await
                .map_err(|e| error::storage::failed("get", key, e.to_string()))?
                .into_bytes()
                .to_vec();
            Ok(Some(StoredObject { bytes, etag }))
        })?
    }

    fn put(&self, key: &str, bytes: &[u8], condition: &PutCondition) -> Result<String> {
        validate_key(key)?;
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(Bytes::copy_from_slice(bytes)));
        request = match condition {
            PutCondition::Always => request,
            PutCondition::IfMatch(etag) => request.if_match(etag),
            PutCondition::IfAbsent => request.if_none_match("*"),
        };

        runtime::block_on(async move {
            match request.send().await {
                Ok(output) => Ok(output.e_tag().unwrap_or_default().to_string()),
                Err(err) if err.code().is_some_and(|c| PRECONDITION_CODES.contains(&c)) => {
                    Err(error::storage::precondition_failed(key))
                }
                Err(err) => Err(error::storage::failed("put", key, err.to_string())),
            }
        })?
    }

    fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        let request = self.client.delete_object().bucket(&self.bucket).key(key);

        runtime::block_on(async move {
            request
                .send()
                .await
                .map(|_| ())
                .map_err(|e| error::storage::failed("delete", key, e.to_string()))
        })?
    }

    fn describe(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }
}
