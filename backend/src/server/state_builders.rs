//! Adapter selection for the running server.
//!
//! A configured database URL selects the Diesel repositories (after applying
//! migrations); otherwise every repository is served from memory. Likewise a
//! Redis URL selects the Redis cache over the in-process one.

use std::io;
use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use edunexus::domain::ports::{KeyValueCache, Mailer};
use edunexus::outbound::cache::{InMemoryCache, RedisCache};
use edunexus::outbound::mail::{DEFAULT_QUEUE_CAPACITY, LogMailer, QueuedMailer};
use edunexus::outbound::memory::MemoryStore;
use edunexus::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use edunexus::settings::AppSettings;
use edunexus::wiring::{Infrastructure, Repositories, Services, build_services};

/// Services plus the background task delivering queued mail.
pub struct Runtime {
    /// Services to mount and run.
    pub services: Services,
    /// Mail delivery task; aborted on shutdown.
    pub mail_task: JoinHandle<()>,
}

async fn build_repositories(settings: &AppSettings) -> io::Result<Repositories> {
    let Some(url) = settings.database_url() else {
        warn!("no database URL configured; data lives in memory only");
        return Ok(Repositories::in_memory(&MemoryStore::new()));
    };
    run_migrations(url).await.map_err(io::Error::other)?;
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.db_pool_size()))
        .await
        .map_err(|err| io::Error::other(format!("database pool: {err}")))?;
    info!(max_size = settings.db_pool_size(), "database pool ready");
    Ok(Repositories::diesel(&pool))
}

async fn build_cache(
    settings: &AppSettings,
    clock: Arc<dyn Clock>,
) -> io::Result<Arc<dyn KeyValueCache>> {
    match settings.redis_url() {
        Some(url) => {
            let cache = RedisCache::connect(url, settings.db_pool_size())
                .await
                .map_err(|err| io::Error::other(format!("redis cache: {err}")))?;
            info!("redis cache ready");
            Ok(Arc::new(cache))
        }
        None => {
            info!("no redis URL configured; using in-process cache");
            Ok(Arc::new(InMemoryCache::new(clock)))
        }
    }
}

/// Select adapters from `settings` and assemble the services.
///
/// # Errors
///
/// Returns [`io::Error`] when storage or cache setup fails or a setting is
/// out of range.
pub async fn build_runtime(settings: &AppSettings) -> io::Result<Runtime> {
    let repos = build_repositories(settings).await?;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let cache = build_cache(settings, clock.clone()).await?;
    let (mailer, mail_task) = QueuedMailer::spawn(Arc::new(LogMailer), DEFAULT_QUEUE_CAPACITY);
    let mailer: Arc<dyn Mailer> = Arc::new(mailer);

    let infra = Infrastructure {
        clock,
        ..Infrastructure::new(cache, mailer)
    };
    let services = build_services(&repos, &infra, settings).map_err(io::Error::other)?;
    Ok(Runtime {
        services,
        mail_task,
    })
}
