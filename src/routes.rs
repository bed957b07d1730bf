use crate::{
    api::{attendance, bank, user},
    auth::handlers,
    config::Config,
    error::ApiError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use anyhow::{Result, anyhow};
use std::sync::Arc;

type Limiter = Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

#[derive(Clone)]
pub struct RateLimiters {
    /// login and password reset endpoints
    pub login: Limiter,
    /// everything else
    pub protected: Limiter,
}

fn build_limiter(requests_per_min: u32) -> Result<Limiter> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(requests_per_min)).max(1);
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit: {requests_per_min}/min"))?;
    Ok(Arc::new(Governor::new(&cfg)))
}

/// Built once so every worker shares the same buckets.
pub fn build_limiters(config: &Config) -> Result<RateLimiters> {
    Ok(RateLimiters {
        login: build_limiter(config.rate_login_per_min)?,
        protected: build_limiter(config.rate_protected_per_min)?,
    })
}

/// Malformed JSON bodies and query strings answer with the usual `{"message"}` shape.
pub fn extractor_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| ApiError::bad_request(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| ApiError::bad_request(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _| ApiError::bad_request(err.to_string()).into()),
    );
}

/// Routes without the rate limiters; shared by `configure` and the tests.
pub fn attendance_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/attendance").route(web::post().to(attendance::mark_present)),
    );
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config, limiters: RateLimiters) {
    extractor_config(cfg);

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(limiters.protected.clone())
            // static /user/* paths must precede /user/{id}
            .service(
                web::resource("/user/login")
                    .wrap(limiters.login.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/user/requestResetPassword")
                    .wrap(limiters.login.clone())
                    .route(web::post().to(handlers::request_reset_password)),
            )
            .service(
                web::resource("/user/resetPassword")
                    .wrap(limiters.login.clone())
                    .route(web::post().to(handlers::reset_password)),
            )
            // /user
            .service(
                web::resource("/user")
                    .route(web::post().to(handlers::signup))
                    .route(web::get().to(user::get_own_profile)),
            )
            // /user/{id}
            .service(
                web::resource("/user/{id}")
                    .route(web::get().to(user::get_user))
                    .route(web::delete().to(user::delete_user)),
            )
            .service(web::resource("/users").route(web::get().to(user::list_users)))
            // /bank
            .service(
                web::resource("/bank")
                    .route(web::post().to(bank::create_bank_account))
                    .route(web::get().to(bank::list_bank_accounts)),
            )
            .service(
                web::resource("/bank/{id}").route(web::delete().to(bank::delete_bank_account)),
            )
            .configure(attendance_routes),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiters_build_for_any_rate() {
        for per_min in [0, 1, 60, 1000, 100_000] {
            assert!(build_limiter(per_min).is_ok(), "rate {per_min}/min");
        }
    }
}
