mod app;
mod commands;
mod config;
mod error;
mod feedback;
mod logging;
mod playback;
mod recording;
mod scoring;
mod ui;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    app::run().await
}
