//! Regenerate the QR artifact of every exercise, then remove orphans.
//!
//! Reads the same environment as the server (`DATABASE_URL`, `PUBLIC_DIR`,
//! `QR_CODE_SUBDIR`, `AR_BASE_URL`).

use std::collections::HashSet;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gymar_api::config::ServerConfig;
use gymar_api::qrcodes::QrArtifactStore;
use gymar_db::repositories::ExerciseRepo;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "generate_qrcodes=info,gymar_api=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().context("Invalid configuration")?;
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = gymar_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;

    let store = QrArtifactStore::from_config(&config);
    let slugs = ExerciseRepo::list_slugs(&pool)
        .await
        .context("Failed to list exercise slugs")?;
    tracing::info!(count = slugs.len(), dir = %store.dir().display(), "Regenerating QR artifacts");

    let generated = store.regenerate_all(&slugs).await;
    let valid: HashSet<String> = slugs.into_iter().collect();
    let cleaned = store
        .cleanup_orphans(&valid)
        .await
        .context("Failed to clean orphaned QR artifacts")?;

    tracing::info!(
        generated = generated.generated,
        failed = generated.failed,
        cleaned = cleaned.cleaned,
        cleanup_errors = cleaned.errors,
        "QR artifacts up to date"
    );

    pool.close().await;

    if generated.failed > 0 {
        anyhow::bail!("{} QR artifact(s) failed to generate", generated.failed);
    }
    Ok(())
}
