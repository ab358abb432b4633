//! Shared state for `ach-daemon`'s HTTP handlers.

use sqlx::PgPool;

/// Cloneable handle shared across all Axum handlers. The daemon only needs a
/// pool to answer `/health`; it never claims or processes events itself —
/// that is `ach-cli run`'s job via `ach-runtime::Supervisor`.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}
