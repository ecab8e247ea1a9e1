use axum::Router;

use crate::AppState;

pub mod employees;
pub mod health;
pub mod jobs;
pub mod salaries;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(jobs::router())
        .merge(employees::router())
        .merge(salaries::router())
        .merge(health::router())
}
