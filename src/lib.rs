//! Blogify is a lightweight blogging platform with cookie sessions,
//! follows, bookmarks and request-time feeds.

#![forbid(unsafe_code)]

mod blog;
pub mod config;
pub mod crypto;
mod database;
pub mod error;
mod image;
mod middleware;
mod router;
mod token;
mod user;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{Method, header};
use axum::routing::{get, post};
use axum::{Router, middleware as AxumMiddleware};
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};

use crate::blog::BlogRepository;
use crate::user::UserRepository;

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    app: Router,
    method: Method,
    path: &str,
    body: String,
    token: Option<&str>,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("token={token}"));
    }

    app.oneshot(builder.body(axum::body::Body::from(body)).unwrap())
        .await
        .unwrap()
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Configuration>,
    pub db: database::Database,
    pub token: token::TokenManager,
    pub images: image::ImageHost,
}

impl AppState {
    /// Credential store handle.
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.db.postgres.clone())
    }

    /// Content store handle.
    pub fn blogs(&self) -> BlogRepository {
        BlogRepository::new(self.db.postgres.clone())
    }
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(|chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                    tracing::trace!(size_bytes = chunk.len(), latency = ?latency, "sending body chunk")
                })
                .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(DefaultOnResponse::new().latency_unit(LatencyUnit::Micros)),
        )
        // Set a timeout.
        .layer(TimeoutLayer::new(Duration::from_secs(10)))
        // Remove sensitive headers from trace.
        .layer(SetSensitiveHeadersLayer::new([header::AUTHORIZATION, header::COOKIE]))
        // Add CORS preflight support.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
                .allow_headers(Any)
                .vary([header::AUTHORIZATION]),
        );

    Router::new()
        // `GET /status.json` goes to `status`.
        .route("/status.json", get(router::status::status))
        // `POST /signup` creates an account and signs it in.
        .route("/signup", post(router::create::handler))
        // `POST /login` and `POST /logout` manage the session cookie.
        .route("/login", post(router::login::handler))
        .route("/logout", post(router::login::logout))
        // Home, archive and search views.
        .route("/feed", get(router::feed::home))
        .route("/search", get(router::feed::search))
        .route(
            "/blogs",
            get(router::feed::archive).post(router::blogs::create::handler),
        )
        .route(
            "/blogs/{blog_id}",
            get(router::blogs::get::handler)
                .patch(router::blogs::update::handler)
                .delete(router::blogs::delete::handler),
        )
        .route(
            "/blogs/{blog_id}/comments",
            post(router::blogs::comment::handler),
        )
        .route("/blogs/{blog_id}/like", post(router::blogs::like::handler))
        .route("/blogs/{blog_id}/save", post(router::blogs::save::handler))
        // Profiles and the follow graph.
        .route(
            "/users/@me",
            get(router::users::get::me).patch(router::users::update::handler),
        )
        .route("/users/{user_id}", get(router::users::get::handler))
        .route(
            "/users/{user_id}/follow",
            post(router::users::follow::handler),
        )
        // Image hosting.
        .route("/images", post(router::images::handler))
        // Every request resolves its session identity exactly once.
        .route_layer(AxumMiddleware::from_fn_with_state(
            state.clone(),
            middleware::resolve_identity,
        ))
        .with_state(state)
        .layer(middleware)
}

/// Initialize the application state.
pub async fn initialize_state() -> Result<AppState, Box<dyn std::error::Error>>
{
    // read configuration file. let it in memory.
    let config = config::Configuration::default().read()?;

    let db = match config.postgres {
        Some(ref config) => {
            database::Database::new(
                &config.address,
                &config
                    .username
                    .clone()
                    .unwrap_or(database::DEFAULT_CREDENTIALS.into()),
                &config
                    .password
                    .clone()
                    .unwrap_or(database::DEFAULT_CREDENTIALS.into()),
                &config
                    .database
                    .clone()
                    .unwrap_or(database::DEFAULT_DATABASE_NAME.into()),
                config.pool_size.unwrap_or(database::DEFAULT_POOL_SIZE),
            )
            .await?
        },
        None => {
            tracing::error!("missing `postgres` entry on `config.yaml` file");
            std::process::exit(0);
        },
    };

    // execute migrations scripts on start.
    sqlx::migrate!().run(&db.postgres).await?;

    // handle the token signing secret.
    let Some(secret) = config.token_secret() else {
        tracing::error!(
            "missing `token.secret` entry on `config.yaml` file and no `TOKEN_SECRET` variable"
        );
        std::process::exit(0);
    };
    let token = token::TokenManager::new(&secret);

    let images = image::ImageHost::new(config.images.as_ref());

    Ok(AppState {
        config,
        db,
        token,
        images,
    })
}
