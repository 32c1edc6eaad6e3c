//! Sources of database passwords.
//!
//! With IAM database authentication the password is a SigV4-presigned
//! `connect` URL for the `rds-db` service, valid for 15 minutes. A new token
//! is fetched every time the connection pool is rebuilt.

use std::fmt;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sigv4::http_request::{
    SignableBody, SignableRequest, SignatureLocation, SigningParams, SigningSettings, sign,
};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;
use aws_types::region::Region;
use tracing::{debug, instrument};
use url::Url;

use crate::config::PostgresConfig;
use crate::error::{PostgresError, Result};

/// Validity of an RDS IAM auth token.
pub const IAM_TOKEN_LIFETIME: Duration = Duration::from_secs(15 * 60);

const RDS_SIGNING_NAME: &str = "rds-db";

/// Provides the password for a new database connection.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn password(&self) -> Result<String>;
}

/// A fixed password from configuration.
#[derive(Clone)]
pub struct StaticPassword(String);

impl StaticPassword {
    #[must_use]
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }
}

impl fmt::Debug for StaticPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticPassword(****)")
    }
}

#[async_trait]
impl CredentialSource for StaticPassword {
    async fn password(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Generates RDS IAM auth tokens from AWS credentials.
#[derive(Debug, Clone)]
pub struct RdsIamAuth {
    host: String,
    port: u16,
    user: String,
    region: Region,
    provider: SharedCredentialsProvider,
}

impl RdsIamAuth {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        region: Region,
        provider: impl ProvideCredentials + 'static,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            user: user.into(),
            region,
            provider: SharedCredentialsProvider::new(provider),
        }
    }

    /// Uses the default AWS credential chain for the given region.
    pub async fn from_default_chain(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        region: Region,
    ) -> Self {
        let chain = aws_config::default_provider::credentials::DefaultCredentialsChain::builder()
            .region(region.clone())
            .build()
            .await;
        Self::new(host, port, user, region, chain)
    }
}

#[async_trait]
impl CredentialSource for RdsIamAuth {
    #[instrument(skip(self), fields(host = %self.host, user = %self.user))]
    async fn password(&self) -> Result<String> {
        let credentials = self
            .provider
            .provide_credentials()
            .await
            .map_err(|e| PostgresError::credentials(e.to_string()))?;
        let token = presign_auth_token(
            &self.host,
            self.port,
            &self.user,
            &self.region,
            &credentials,
            SystemTime::now(),
        )?;
        debug!("Generated RDS IAM auth token");
        Ok(token)
    }
}

/// Presigns the RDS `connect` action and returns the token, which is the
/// presigned URL without its scheme.
///
/// # Errors
///
/// Returns `PostgresError::Credentials` when the request cannot be signed.
pub fn presign_auth_token(
    host: &str,
    port: u16,
    user: &str,
    region: &Region,
    credentials: &Credentials,
    time: SystemTime,
) -> Result<String> {
    let mut url = Url::parse(&format!("https://{host}:{port}/"))
        .map_err(|e| PostgresError::config(format!("invalid database host {host}: {e}")))?;
    url.query_pairs_mut()
        .append_pair("Action", "connect")
        .append_pair("DBUser", user);

    let mut settings = SigningSettings::default();
    settings.signature_location = SignatureLocation::QueryParams;
    settings.expires_in = Some(IAM_TOKEN_LIFETIME);

    let identity = Identity::from(credentials.clone());
    let params: SigningParams<'_> = v4::SigningParams::builder()
        .identity(&identity)
        .region(region.as_ref())
        .name(RDS_SIGNING_NAME)
        .time(time)
        .settings(settings)
        .build()
        .map_err(|e| PostgresError::credentials(e.to_string()))?
        .into();

    let signable = SignableRequest::new(
        "GET",
        url.as_str(),
        std::iter::empty(),
        SignableBody::Bytes(&[]),
    )
    .map_err(|e| PostgresError::credentials(e.to_string()))?;

    let (instructions, _signature) = sign(signable, &params)
        .map_err(|e| PostgresError::credentials(e.to_string()))?
        .into_parts();

    {
        let mut query = url.query_pairs_mut();
        for (name, value) in instructions.params() {
            query.append_pair(name, value);
        }
    }

    Ok(url
        .as_str()
        .trim_start_matches("https://")
        .to_string())
}

/// Picks the credential source the configuration asks for.
///
/// # Errors
///
/// Returns `PostgresError::Config` when IAM auth is enabled without a region
/// or disabled without a password.
pub async fn credential_source(config: &PostgresConfig) -> Result<Box<dyn CredentialSource>> {
    if config.iam_auth {
        let region = config
            .region
            .clone()
            .ok_or_else(|| PostgresError::config("region is required for IAM auth"))?;
        let source = RdsIamAuth::from_default_chain(
            config.host.clone(),
            config.port,
            config.user.clone(),
            Region::new(region),
        )
        .await;
        return Ok(Box::new(source));
    }

    let password = config
        .password
        .clone()
        .ok_or_else(|| PostgresError::config("password is required without IAM auth"))?;
    Ok(Box::new(StaticPassword::new(password)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::block_on;

    fn credentials() -> Credentials {
        Credentials::new("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG", None, None, "test")
    }

    fn fixed_time() -> SystemTime {
        // 2024-01-15T12:00:00Z
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_705_320_000)
    }

    #[test]
    fn test_presigned_token_shape() {
        let token = presign_auth_token(
            "db.example.com",
            5432,
            "app_user",
            &Region::new("eu-west-1"),
            &credentials(),
            fixed_time(),
        )
        .expect("token");

        assert!(token.starts_with("db.example.com:5432/?Action=connect&DBUser=app_user&"));
        assert!(!token.starts_with("https://"));
        assert!(token.contains("X-Amz-Algorithm=AWS4-HMAC-SHA256"));
        assert!(token.contains("X-Amz-Expires=900"));
        assert!(token.contains("X-Amz-Date=20240115T120000Z"));
        assert!(token.contains("AKIDEXAMPLE%2F20240115%2Feu-west-1%2Frds-db%2Faws4_request"));
        assert!(token.contains("X-Amz-Signature="));
    }

    #[test]
    fn test_presigned_token_is_deterministic() {
        let sign = || {
            presign_auth_token(
                "db.example.com",
                5432,
                "app_user",
                &Region::new("eu-west-1"),
                &credentials(),
                fixed_time(),
            )
            .expect("token")
        };
        assert_eq!(sign(), sign());
    }

    #[test]
    fn test_static_password() {
        let source = StaticPassword::new("secret");
        assert_eq!(block_on(source.password()).expect("password"), "secret");
        assert_eq!(format!("{source:?}"), "StaticPassword(****)");
    }

    #[tokio::test]
    async fn test_iam_auth_uses_provider() {
        let source = RdsIamAuth::new(
            "db.example.com",
            5432,
            "app_user",
            Region::new("us-east-1"),
            credentials(),
        );
        let token = source.password().await.expect("token");
        assert!(token.contains("DBUser=app_user"));
    }

    #[tokio::test]
    async fn test_credential_source_requires_password_or_region() {
        let config = PostgresConfig::default();
        let err = credential_source(&config).await.err().expect("missing password");
        assert!(matches!(err, PostgresError::Config { .. }));

        let config = PostgresConfig {
            iam_auth: true,
            ..PostgresConfig::default()
        };
        let err = credential_source(&config).await.err().expect("missing region");
        assert!(err.to_string().contains("region"));
    }
}
