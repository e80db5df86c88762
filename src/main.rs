use axum::{middleware::from_fn, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use suq_api::auth::Role;
use suq_api::handlers;
use suq_api::middleware::{gate, jwt_auth_middleware, require_roles};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT secret, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = suq_api::config::config();
    tracing::info!("Starting Suq API in {:?} mode", config.environment);

    tracing_subscriber::fmt::init();

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("SUQ_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("Suq API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Authenticated API, role-gated per group
        .merge(api_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_public_routes() -> Router {
    use axum::routing::post;
    use handlers::public::auth;

    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/refresh", post(auth::refresh))
}

fn api_routes() -> Router {
    use axum::routing::{delete, post};
    use handlers::protected::auth;

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami))
        .route("/api/auth/session", delete(auth::logout))
        .route(
            "/api/media/:bucket",
            post(handlers::protected::media::upload).layer(from_fn(require_roles(gate::ANY_ROLE))),
        )
        .nest("/api/admin", admin_routes().layer(from_fn(require_roles(&[Role::Admin]))))
        .nest("/api/trainer", trainer_routes().layer(from_fn(require_roles(&[Role::Trainer]))))
        .nest("/api/broker", broker_routes().layer(from_fn(require_roles(&[Role::Broker]))))
        .layer(from_fn(jwt_auth_middleware))
}

fn admin_routes() -> Router {
    use axum::routing::{patch, put};
    use handlers::protected::admin;

    Router::new()
        .route("/brokers", get(admin::brokers::list).post(admin::brokers::create))
        .route("/brokers/:id", patch(admin::brokers::update).delete(admin::brokers::remove))
        .route("/trainers", get(admin::trainers::list).post(admin::trainers::create))
        .route("/trainers/:id", patch(admin::trainers::update).delete(admin::trainers::remove))
        .route("/staff", get(admin::staff::list).post(admin::staff::create))
        .route("/staff/:id/status", put(admin::staff::set_status))
        .route("/media", get(admin::media::list))
        .route("/quiz", get(admin::quiz::list).post(admin::quiz::create))
        .route("/quiz/:id", patch(admin::quiz::update).delete(admin::quiz::remove))
        .route("/signals", get(admin::signals::list).post(admin::signals::create))
        .route("/signals/:id", patch(admin::signals::update).delete(admin::signals::remove))
        .route("/carousel", get(admin::carousel::list).post(admin::carousel::create))
        .route("/carousel/:id", patch(admin::carousel::update).delete(admin::carousel::remove))
        .route("/exchange-rates", get(admin::exchange_rates::list).post(admin::exchange_rates::create))
        .route(
            "/exchange-rates/:id",
            put(admin::exchange_rates::update).delete(admin::exchange_rates::remove),
        )
        .route("/articles", get(admin::articles::list).post(admin::articles::create))
        .route(
            "/articles/:id",
            get(admin::articles::get).patch(admin::articles::update).delete(admin::articles::remove),
        )
}

fn trainer_routes() -> Router {
    use axum::routing::patch;
    use handlers::protected::trainer;

    Router::new()
        .route("/profile", get(trainer::profile::get).patch(trainer::profile::update))
        .route("/courses", get(trainer::courses::list).post(trainer::courses::create))
        .route("/courses/:id", patch(trainer::courses::update).delete(trainer::courses::remove))
}

fn broker_routes() -> Router {
    use axum::routing::{patch, post};
    use handlers::protected::broker;

    Router::new()
        .route("/profile", get(broker::profile::get).patch(broker::profile::update))
        .route("/media", get(broker::media::list).post(broker::media::create))
        .route("/media/:id", patch(broker::media::update).delete(broker::media::remove))
        .route("/media/:id/restore", post(broker::media::restore))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Suq API",
            "version": version,
            "description": "Admin backend for the Suq trading-education platform",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/auth/login, /auth/signup, /auth/refresh (public - token acquisition)",
                "session": "/api/auth/whoami, /api/auth/session (authenticated)",
                "admin": "/api/admin/* (admin role)",
                "trainer": "/api/trainer/* (trainer role)",
                "broker": "/api/broker/* (broker role)",
                "media": "/api/media/:bucket (any role - uploads)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match suq_api::database::manager::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
