use axum::{routing::get, Router};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use rentfolio_api::{config, database, handlers, middleware};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting Rentfolio API in {:?} mode", config.environment);

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("RENTFOLIO_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(5001);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 Rentfolio API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Everything else requires a bearer token
        .merge(protected_routes())
        // Global middleware
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn auth_public_routes() -> Router {
    use axum::routing::post;
    use handlers::public::auth;

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
}

fn protected_routes() -> Router {
    use axum::routing::{delete, post, put};
    use handlers::protected::{
        auth, expenses, maintenance, messages, payments, properties, tenants,
    };

    Router::new()
        .route("/auth/whoami", get(auth::whoami))
        // Properties
        .route("/properties", get(properties::list).post(properties::create))
        .route("/properties/:id", get(properties::show))
        // Tenant records
        .route("/tenants", get(tenants::list).post(tenants::create))
        .route("/tenants/property/:id", get(tenants::by_property))
        .route("/tenants/:id", delete(tenants::remove))
        // Payments
        .route("/payments", post(payments::create))
        .route("/payments/property/:id", get(payments::by_property))
        .route("/payments/:id", put(payments::update).delete(payments::remove))
        // Expenses
        .route("/expenses", post(expenses::create))
        .route("/expenses/property/:id", get(expenses::by_property))
        .route("/expenses/:id", delete(expenses::remove))
        // Messages
        .route("/messages", post(messages::create))
        .route("/messages/property/:id", get(messages::by_property))
        .route("/messages/:id", delete(messages::remove))
        // Maintenance requests
        .route("/maintenance", post(maintenance::create))
        .route("/maintenance/property/:id", get(maintenance::by_property))
        .route(
            "/maintenance/:id",
            put(maintenance::update).delete(maintenance::remove),
        )
        // Authentication runs before every handler above
        .layer(axum::middleware::from_fn(middleware::jwt_auth_middleware))
}

fn cors_layer() -> CorsLayer {
    let security = &config::config().security;

    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<axum::http::HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Rentfolio API",
            "version": version,
            "description": "Property-management backend API built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/auth/register, /auth/login (public), /auth/whoami (protected)",
                "properties": "/properties, /properties/:id (protected)",
                "tenants": "/tenants, /tenants/property/:id, /tenants/:id (protected)",
                "payments": "/payments, /payments/property/:id, /payments/:id (protected)",
                "expenses": "/expenses, /expenses/property/:id, /expenses/:id (protected)",
                "messages": "/messages, /messages/property/:id, /messages/:id (protected)",
                "maintenance": "/maintenance, /maintenance/property/:id, /maintenance/:id (protected)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match database::manager::DatabaseManager::health_check().await {
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
