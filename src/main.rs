use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::get,
};

use std::net::SocketAddr;
use tower_cookies::CookieManagerLayer;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};

use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marginalia::config::Config;
use marginalia::state::AppState;
use marginalia::{handlers, middleware_layer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    tracing::info!("✅ Configuration loaded successfully");

    let state = AppState::new(&config).await?;
    tracing::info!("✅ AppState initialized");

    let admin_routes = Router::new()
        .route("/admin", get(handlers::pages::admin))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::session_check,
        ))
        .with_state(state.clone());

    let app = Router::new()
        .route("/", get(handlers::pages::index))
        .route(
            "/login",
            get(handlers::pages::login_page).post(handlers::auth::login),
        )
        .route(
            "/register",
            get(handlers::pages::register_page).post(handlers::auth::register),
        )
        .route("/logout", get(handlers::auth::logout))
        .route("/{id}/js", get(handlers::pages::widget_js))
        .with_state(state.clone())
        .merge(admin_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(CookieManagerLayer::new());

    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
