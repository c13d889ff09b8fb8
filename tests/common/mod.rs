use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Method, Request},
    middleware, Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use evdms_api::{
    auth::{AuthConfig, AuthService, Claims},
    config::AppConfig,
    db,
    entities::{customer, vehicle_model, vehicle_variant},
    events::{self, EventSender},
    handlers::AppServices,
    services::customers::CreateCustomerRequest,
    services::vehicles::{CreateModelRequest, CreateVariantRequest},
    AppState,
};

const TEST_JWT_SECRET: &str =
    "integration-test-secret-integration-test-secret-integration-test-secret";

/// Test harness wrapping the full router over a throwaway SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    token: String,
    #[allow(dead_code)]
    auth_service: Arc<AuthService>,
    _event_task: tokio::task::JoinHandle<()>,
    _workdir: tempfile::TempDir,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let workdir = tempfile::tempdir().expect("create test workdir");
        let db_path = workdir.path().join("evdms_test.db");
        let upload_dir = workdir.path().join("uploads");

        let cfg = AppConfig {
            database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
            jwt_secret: TEST_JWT_SECRET.to_string(),
            jwt_expiration: 3600,
            refresh_token_expiration: 86_400,
            host: "127.0.0.1".to_string(),
            port: 18_080,
            environment: "test".to_string(),
            log_level: "warn".to_string(),
            log_json: false,
            auto_migrate: true,
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
            db_max_connections: 1,
            db_min_connections: 1,
            db_connect_timeout_secs: 5,
            db_idle_timeout_secs: 60,
            db_acquire_timeout_secs: 5,
            quotation_validity_days: 14,
            invoice_payment_term_days: 30,
            upload_dir: upload_dir.display().to_string(),
        };

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let event_task = tokio::spawn(events::process_events(event_rx));

        let auth_cfg = AuthConfig::new(
            cfg.jwt_secret.clone(),
            Duration::from_secs(cfg.jwt_expiration as u64),
            Duration::from_secs(cfg.refresh_token_expiration as u64),
        );
        let auth_service = Arc::new(AuthService::new(auth_cfg, db_arc.clone()));

        let services = AppServices::new(db_arc.clone(), event_sender.clone(), &cfg);

        let state = AppState {
            db: db_arc,
            config: cfg.clone(),
            event_sender,
            services,
        };

        let token = issue_token(&cfg, "admin", None);

        let auth_for_layer = auth_service.clone();
        let api_router = evdms_api::api_v1_routes().layer(middleware::from_fn_with_state(
            auth_for_layer,
            |axum::extract::State(auth): axum::extract::State<Arc<AuthService>>,
             mut req: Request<Body>,
             next: axum::middleware::Next| async move {
                req.extensions_mut().insert(auth);
                next.run(req).await
            },
        ));

        let router = Router::new()
            .route("/health", axum::routing::get(evdms_api::health_check))
            .nest("/api/v1", api_router)
            .nest("/api/public", evdms_api::public_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            token,
            auth_service,
            _event_task: event_task,
            _workdir: workdir,
        }
    }

    /// Bearer token for the default admin user.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Issue a token for an arbitrary role, optionally scoped to a dealer.
    #[allow(dead_code)]
    pub fn token_for(&self, role: &str, dealer_id: Option<Uuid>) -> String {
        issue_token(&self.state.config, role, dealer_id)
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Convenience helper for authenticated JSON requests.
    pub async fn request_authenticated(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        self.request(method, uri, body, Some(self.token())).await
    }

    /// Seed a customer record directly through the service layer.
    pub async fn seed_customer(&self, email: &str) -> customer::Model {
        self.state
            .services
            .customers
            .create_customer(CreateCustomerRequest {
                full_name: "Integration Customer".to_string(),
                email: email.to_string(),
                phone: None,
                address: None,
            })
            .await
            .expect("seed customer")
    }

    /// Seed a vehicle model and one variant, returning both.
    pub async fn seed_vehicle(
        &self,
        sku: &str,
        price: Decimal,
    ) -> (vehicle_model::Model, vehicle_variant::Model) {
        let model = self
            .state
            .services
            .vehicles
            .create_model(CreateModelRequest {
                name: format!("Test Model {}", sku),
                segment: Some("compact".to_string()),
                base_price: price,
            })
            .await
            .expect("seed vehicle model");

        let variant = self
            .state
            .services
            .vehicles
            .create_variant(CreateVariantRequest {
                model_id: model.id,
                name: format!("Test Variant {}", sku),
                sku: sku.to_string(),
                battery_kwh: Some(60),
                range_km: Some(420),
                color: Some("white".to_string()),
                price,
            })
            .await
            .expect("seed vehicle variant");

        (model, variant)
    }
}

fn issue_token(cfg: &AppConfig, role: &str, dealer_id: Option<Uuid>) -> String {
    let now = Utc::now();
    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        name: Some("Test User".to_string()),
        email: Some("test@example.com".to_string()),
        role: role.to_string(),
        permissions: evdms_api::auth::permissions_for_role(role),
        dealer_id: dealer_id.map(|id| id.to_string()),
        jti: Uuid::new_v4().to_string(),
        iat: now.timestamp(),
        exp: (now + chrono::Duration::hours(1)).timestamp(),
        nbf: now.timestamp(),
        iss: "evdms-auth".to_string(),
        aud: "evdms-api".to_string(),
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(cfg.jwt_secret.as_bytes()),
    )
    .expect("encode access token")
}
