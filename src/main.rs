mod api;
mod auth;
mod error;
mod models;
mod settings;
mod store;
mod validate;

use auth::{AppState, MockIdentityResolver, SharedState};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use settings::Settings;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use store::TaskStore;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::load();

    let store = TaskStore::open(&settings.store_path)
        .expect("Failed to open task store");

    let state: SharedState = Arc::new(AppState {
        store,
        resolver: Arc::new(MockIdentityResolver),
    });

    // Every task route sits behind the auth middleware; login and the
    // root liveness route do not.
    let task_routes = Router::new()
        .route("/", get(api::list_tasks).post(api::create_task))
        .route(
            "/:id",
            get(api::get_task).put(api::update_task).delete(api::delete_task),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth::auth_middleware))
        .with_state(state);

    let app = Router::new()
        .route("/", get(api::root))
        .route("/login", post(auth::login))
        .nest("/tasks", task_routes)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let ip: IpAddr = settings.bind_addr.parse()
        .expect("Invalid bind_addr in settings");
    let addr = SocketAddr::new(ip, settings.port);
    tracing::info!(%addr, store = %settings.store_path, "server listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind");
    axum::serve(listener, app).await.expect("Server error");
}
