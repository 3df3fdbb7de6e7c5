//! Browser front-end: one page, one action.

mod display;
mod page;
mod routes;
mod state;

pub use display::png_data_uri;
pub use page::{escape_html, Page};
pub use routes::router;
pub use state::{AppState, SharedDetector};

/// Binds `addr` and serves until the process is stopped.
pub async fn serve(state: AppState, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
