use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;

use backend::{
    identity::IdentityProvider,
    jwt::JwtManager,
    media_storage::{MediaStorage, S3MediaStorage},
    server,
    types::Environment,
};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    // JSON logs for staging/production, plain format for development
    if environment.json_logs() {
        fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    } else {
        fmt().with_env_filter(EnvFilter::from_default_env()).init();
    }

    let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));
    let media_storage: Arc<dyn MediaStorage> = Arc::new(S3MediaStorage::new(
        s3_client,
        environment.s3_bucket(),
        environment.public_asset_base_url(),
    ));

    let identity_provider: Arc<dyn IdentityProvider> = Arc::new(JwtManager::new(&environment));

    server::start(environment, media_storage, identity_provider).await
}
