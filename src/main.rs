use actix_web::{middleware, web, App, HttpServer};
use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Naming};
use std::sync::Arc;
use times_tables_scores::api;
use times_tables_scores::config::Config;
use times_tables_scores::store::{MemoryStore, RedisStore, ScoreStore};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    let _logger = flexi_logger::Logger::try_with_str(&config.log_spec)?
        .log_to_file(FileSpec::default().directory(&config.log_dir))
        .append()
        .duplicate_to_stderr(Duplicate::All)
        .rotate(
            Criterion::Size(50 * 1024 * 1024),
            Naming::Timestamps,
            Cleanup::Never,
        )
        .start()?;

    let store: Arc<dyn ScoreStore> = match &config.redis_url {
        Some(redis_url) => Arc::new(RedisStore::connect(redis_url)?),
        None => {
            log::warn!("REDIS_URL is not set, scores will only be kept in memory");
            Arc::new(MemoryStore::new())
        }
    };
    let store = web::Data::from(store);

    log::info!("Listening on {}", config.bind_addr);
    HttpServer::new(move || {
        App::new()
            .wrap(api::cors_headers())
            .wrap(middleware::Logger::new(
                "%t %{r}a %r %s %b %{Referer}i %{User-Agent}i %T",
            ))
            .app_data(store.clone())
            .configure(api::routes)
    })
    .bind(&config.bind_addr)?
    .run()
    .await?;
    Ok(())
}
