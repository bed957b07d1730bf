use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use dotenvy::dotenv;
use std::sync::Arc;

use garment_ops::api::attendance::AttendanceDesk;
use garment_ops::config::Config;
use garment_ops::db::init_db;
use garment_ops::docs::ApiDoc;
use garment_ops::routes;
use garment_ops::shift::{ShiftCalendar, SystemClock};
use garment_ops::store::MySqlAttendanceStore;
use garment_ops::utils::{name_filter, shift_cache};

use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Garment ops is running"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url, config.run_migrations).await?;
    shift_cache::init(config.shift_cache_ttl_secs);

    let pool_for_filter_warmup = pool.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = name_filter::warmup_name_filter(&pool_for_filter_warmup, 100).await {
            warn!(error = %e, "Failed to warm up name filter");
        }
    });

    let desk = AttendanceDesk {
        store: Arc::new(MySqlAttendanceStore::new(pool.clone())),
        clock: Arc::new(SystemClock),
        calendar: ShiftCalendar::standard(config.factory_offset()?),
    };
    let limiters = routes::build_limiters(&config)?;
    let server_addr = config.server_addr.clone();

    info!(addr = %server_addr, offset = config.utc_offset_minutes, "Binding server");

    HttpServer::new(move || {
        let config = config.clone();
        let limiters = limiters.clone();
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                // wildcard {_:.*} matches the JS/CSS assets
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(Data::new(desk.clone()))
            .service(index)
            .configure(move |cfg| routes::configure(cfg, config, limiters))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .run()
    .await
    .context("Server stopped with an error")
}
