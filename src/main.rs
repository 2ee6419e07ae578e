//! Parivar server binary: configuration, dependency wiring, and the axum
//! router.

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, Router};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use parivar::adapters::http::family::{family_routes, FamilyHandlers};
use parivar::adapters::http::member::{member_routes, MemberHandlers};
use parivar::adapters::http::middleware::{auth_middleware, AuthState};
use parivar::adapters::memory::{
    InMemoryAccountDirectory, InMemoryEventBus, InMemoryMarriageStore, InMemoryMemberStore,
    StaticActorResolver, StaticPermissionChecker,
};
use parivar::adapters::postgres::{PostgresMarriageStore, PostgresMemberStore};
use parivar::application::handlers::family::{ResolveFamilyHandler, ResolveFamilyTreeHandler};
use parivar::application::handlers::member::{
    DashboardStatsHandler, GetMemberHandler, StartFamilyHandler, UpsertMemberHandler,
};
use parivar::application::handlers::provisioning::{AccountProvisioner, ProvisioningDefaults};
use parivar::application::identifiers::IdentifierGenerator;
use parivar::application::stats_cache::StatsCache;
use parivar::config::{AppConfig, StoreBackend};
use parivar::domain::foundation::{Actor, Role, UserId};
use parivar::ports::{MarriageStore, MemberStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.server.log_level)?)
        .init();

    let (members, marriages): (Arc<dyn MemberStore>, Arc<dyn MarriageStore>) =
        match config.database.backend {
            StoreBackend::Postgres => {
                let pool = PgPoolOptions::new()
                    .min_connections(config.database.min_connections)
                    .max_connections(config.database.max_connections)
                    .acquire_timeout(config.database.acquire_timeout())
                    .connect(&config.database.url)
                    .await?;

                if config.database.run_migrations {
                    sqlx::migrate!("./migrations").run(&pool).await?;
                    tracing::info!("database migrations applied");
                }

                (
                    Arc::new(PostgresMemberStore::new(pool.clone())),
                    Arc::new(PostgresMarriageStore::new(pool)),
                )
            }
            StoreBackend::Memory => {
                tracing::warn!("using in-memory stores; data will not survive a restart");
                (
                    Arc::new(InMemoryMemberStore::new()),
                    Arc::new(InMemoryMarriageStore::new()),
                )
            }
        };

    let permissions = Arc::new(StaticPermissionChecker::default_policy());
    let directory = Arc::new(InMemoryAccountDirectory::new());
    let events = Arc::new(InMemoryEventBus::new());
    let identifiers = Arc::new(IdentifierGenerator::new(members.clone()));
    let provisioner = Arc::new(AccountProvisioner::new(
        directory,
        ProvisioningDefaults {
            default_password: config.engine.default_password.clone(),
        },
    ));
    let stats_cache = Arc::new(StatsCache::new(Duration::from_secs(
        config.engine.stats_cache_ttl_secs,
    )));

    let upsert_handler = Arc::new(UpsertMemberHandler::new(
        members.clone(),
        marriages.clone(),
        identifiers.clone(),
        permissions.clone(),
        events,
        provisioner,
        stats_cache.clone(),
    ));
    let get_handler = Arc::new(GetMemberHandler::new(members.clone(), permissions.clone()));
    let start_family_handler = Arc::new(StartFamilyHandler::new(
        members.clone(),
        identifiers,
        permissions.clone(),
    ));
    let stats_handler = Arc::new(DashboardStatsHandler::new(
        members.clone(),
        permissions.clone(),
        stats_cache,
    ));
    let resolve_handler = Arc::new(ResolveFamilyHandler::new(
        members.clone(),
        marriages.clone(),
        permissions.clone(),
    ));
    let tree_handler = Arc::new(ResolveFamilyTreeHandler::new(
        members,
        marriages,
        permissions,
        config.engine.tree_depth,
    ));

    let mut resolver = StaticActorResolver::new();
    match &config.server.api_token {
        Some(token) => {
            let service_actor = Actor::new(
                UserId::new("service")?,
                "service",
                Role::SuperAdmin,
            );
            resolver = resolver.with_token(token.clone(), service_actor);
        }
        None => {
            tracing::warn!("no api token configured; all requests will be rejected");
        }
    }
    let auth_state: AuthState = Arc::new(resolver);

    let member_handlers = MemberHandlers::new(
        upsert_handler,
        get_handler,
        start_family_handler,
        stats_handler,
    );
    let family_handlers = FamilyHandlers::new(resolve_handler, tree_handler);

    let cors = if config.server.cors_origins_list().is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .server
            .cors_origins_list()
            .iter()
            .filter_map(|o| o.parse::<axum::http::HeaderValue>().ok())
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    };

    let app = Router::new()
        .nest("/api/members", member_routes(member_handlers))
        .nest("/api/family", family_routes(family_handlers))
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors);

    let addr = config.server.socket_addr();
    tracing::info!(%addr, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
