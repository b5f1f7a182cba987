//! S3 object store

use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use contracts::{ObjectStore, StoreError};
use tracing::{debug, instrument};

/// Connection settings for S3
#[derive(Debug, Clone, Default)]
pub struct S3Settings {
    /// AWS region
    pub region: Option<String>,

    /// Custom endpoint URL (for LocalStack)
    pub endpoint: Option<String>,

    /// AWS profile name
    pub profile: Option<String>,
}

/// S3-backed object store
#[derive(Clone)]
pub struct S3Store {
    client: Client,
}

impl S3Store {
    /// Wrap an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from settings and the default AWS credential chain
    pub async fn connect(settings: &S3Settings) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = &settings.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &settings.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        if let Some(profile) = &settings.profile {
            loader = loader.profile_name(profile);
        }

        let sdk_config = loader.load().await;
        let builder = aws_sdk_s3::config::Builder::from(&sdk_config);

        // Custom endpoints (LocalStack, MinIO) need path-style addressing
        let s3_config = if settings.endpoint.is_some() {
            builder.force_path_style(true).build()
        } else {
            builder.build()
        };

        debug!(region = ?settings.region, endpoint = ?settings.endpoint, "S3 client created");
        Self::new(Client::from_conf(s3_config))
    }
}

impl ObjectStore for S3Store {
    fn backend(&self) -> &str {
        "s3"
    }

    #[instrument(name = "s3_put_object", skip(self, body), fields(bytes = body.len()))]
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    #[instrument(name = "s3_get_object", skip(self))]
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                if let SdkError::ServiceError(service) = &err {
                    if service.err().is_no_such_key() {
                        return StoreError::NotFound {
                            bucket: bucket.to_string(),
                            key: key.to_string(),
                        };
                    }
                }
                classify(err)
            })?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Unavailable(format!("reading object body: {e}")))?;
        Ok(body.into_bytes())
    }
}

/// Credential and transport failures are `Unavailable`; other service errors are `Rejected`
fn classify<E, R>(err: SdkError<E, R>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    match &err {
        SdkError::ServiceError(service) => {
            let code = service.err().code().unwrap_or("Unknown");
            let message = service.err().message().unwrap_or_default();
            if is_auth_code(code) {
                StoreError::Unavailable(format!("{code}: {message}"))
            } else {
                StoreError::Rejected(format!("{code}: {message}"))
            }
        }
        _ => StoreError::Unavailable(DisplayErrorContext(&err).to_string()),
    }
}

fn is_auth_code(code: &str) -> bool {
    matches!(
        code,
        "AccessDenied"
            | "InvalidAccessKeyId"
            | "SignatureDoesNotMatch"
            | "ExpiredToken"
            | "InvalidToken"
    )
}
