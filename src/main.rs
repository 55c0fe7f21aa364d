use anyhow::{Context, Result};
use object_archive::{
    ArchiveManager, ObjectDescriptor, StorageService,
    config::{AppConfig, Command},
    models::stored::{GLACIER_CLASS, STANDARD_CLASS},
};
use std::{
    path::Path,
    sync::Arc,
};
use tokio::{fs, io::AsyncWriteExt};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // --- Parse config + migrate flag ---
    let (cfg, migrate, command) = AppConfig::from_env_and_args()?;
    tracing::debug!("Starting object-archive with config: {:?}", cfg);

    // --- Ensure the metadata directory exists ---
    let db_path = cfg
        .database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .trim_start_matches("file:");
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).await?;
            tracing::info!("Created missing directory {:?}", parent);
        }
    }

    // --- Open the local store (runs migrations) ---
    let store = StorageService::open(&cfg.database_url, &cfg.storage_dir)
        .await
        .with_context(|| format!("opening store at {}", cfg.database_url))?;

    if migrate {
        tracing::info!("Database migration complete.");
        return Ok(());
    }

    let Some(command) = command else {
        anyhow::bail!("no command given; see --help");
    };

    let manager = ArchiveManager::new(Arc::new(store.clone()), cfg.archive.clone());
    run(command, &store, &manager).await
}

async fn run(command: Command, store: &StorageService, manager: &ArchiveManager) -> Result<()> {
    match command {
        Command::CreateBucket { bucket, region } => {
            store.create_bucket(&bucket, &region).await?;
            tracing::info!("Created bucket {}", bucket);
        }
        Command::DeleteBucket { bucket } => {
            store.delete_bucket(&bucket).await?;
            tracing::info!("Deleted bucket {}", bucket);
        }
        Command::Stat { bucket, key } => {
            let stat = manager.stat(&ObjectDescriptor::new(bucket, key)).await?;
            println!("{}", serde_json::to_string_pretty(&stat)?);
        }
        Command::Get { bucket, key, path } => {
            let obj = ObjectDescriptor::new(bucket, key);
            if is_stdout(&path) {
                let bytes = manager.get_to_buffer(&obj).await?;
                let mut stdout = tokio::io::stdout();
                stdout.write_all(&bytes).await?;
                stdout.flush().await?;
            } else {
                // stat first so the download is checked against the known size
                let stat = manager.stat(&obj).await?;
                let written = manager.get_to_file(&stat, &path).await?;
                tracing::info!("Wrote {} bytes to {}", written, path.display());
            }
        }
        Command::Put {
            bucket,
            key,
            path,
            storage_class,
        } => {
            let obj = ObjectDescriptor::new(bucket, key);
            manager.put_from_file(&obj, &path).await?;
            if let Some(class) = storage_class.filter(|c| c.as_str() != STANDARD_CLASS) {
                store
                    .transition_storage_class(obj.bucket(), obj.key(), &class)
                    .await?;
            }
        }
        Command::Restore {
            bucket,
            key,
            tier,
            days,
        } => {
            let obj = ObjectDescriptor::new(bucket, key);
            manager.restore_object_named(&obj, &tier, days).await?;
            tracing::info!("Restore of {} requested", obj.uri());
        }
        Command::Delete { bucket, key } => {
            manager.delete_object(&ObjectDescriptor::new(bucket, key)).await?;
        }
        Command::Archive { bucket, key } => {
            store
                .transition_storage_class(&bucket, &key, GLACIER_CLASS)
                .await?;
            tracing::info!("Archived s3://{}/{}", bucket, key);
        }
    }
    Ok(())
}

fn is_stdout(path: &Path) -> bool {
    path.as_os_str() == "-"
}
