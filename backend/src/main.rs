use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use tracing_subscriber::{fmt, EnvFilter};

use backend::{
    db::Database,
    images::ImageService,
    jwt::JwtManager,
    media_storage::{ObjectStore, S3ObjectStore, UploadPolicy},
    server,
    state::AppState,
    types::Environment,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    // Configure logging format based on environment
    // Use JSON format for staging/production, regular format for development
    match environment {
        Environment::Production | Environment::Staging => {
            fmt()
                .json()
                .with_env_filter(EnvFilter::from_default_env())
                .init();
        }
        Environment::Development { .. } => {
            fmt().with_env_filter(EnvFilter::from_default_env()).init();
        }
    }

    let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));
    let media_storage: Arc<dyn ObjectStore> = Arc::new(S3ObjectStore::new(
        s3_client,
        environment.s3_bucket(),
        environment.presigned_url_expiry_secs(),
    ));

    let db = Database::connect(&environment.database_url()).await?;

    let jwt_manager = Arc::new(JwtManager::new(
        environment.jwt_secret().as_bytes(),
        environment.token_expiry_secs(),
    ));

    let images = ImageService::new(
        db.clone(),
        media_storage,
        UploadPolicy::new(environment.public_base_url()),
    );

    let state = AppState {
        db,
        images,
        jwt_manager,
    };

    server::start(environment, state).await
}
