use axum::Router;
use db::DBService;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod error;
pub mod extractor;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    db: DBService,
}

impl AppState {
    pub fn new(db: DBService) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
