//! House Points - live scoreboard server
//!
//! Serves the display and admin pages and broadcasts point changes to
//! every connected screen.

use housepoints::config::Config;
use housepoints::network::display_host;
use housepoints::server::{self, state::AppState};
use housepoints::store::CounterStore;
use std::sync::Arc;
use tokio::sync::watch;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("housepoints=info,tower_http=warn")
            }),
        )
        .init();

    let config = Config::from_env()?;
    let store = Arc::new(CounterStore::new(config.houses.iter().cloned())?);
    let state = Arc::new(AppState::new(Arc::clone(&store)));
    tracing::info!(houses = ?store.houses(), "Scoreboard ready");

    if !config.public_dir.is_dir() {
        tracing::warn!(
            dir = %config.public_dir.display(),
            "Public directory not found, pages will return 404"
        );
    }

    // Handle Ctrl+C
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    ctrlc::set_handler(move || {
        println!("\n🛑 Shutdown signal received...");
        let _ = shutdown_tx.send(true);
    })?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let listener = server::bind(config.socket_addr()).await?;
        let port = listener.local_addr()?.port();
        print_banner(port);

        let app = server::router(Arc::clone(&state), &config.public_dir);
        server::serve(listener, app, async move {
            let _ = shutdown_rx.wait_for(|stop| *stop).await;
        })
        .await?;

        Ok::<_, Box<dyn std::error::Error>>(())
    })?;

    let final_points = store.snapshot();
    if !final_points.is_empty() {
        tracing::info!(
            houses = final_points.len(),
            total = final_points.total(),
            "Final scoreboard"
        );
        for (house, points) in final_points.iter() {
            println!("   {:<12} {}", house, points);
        }
    }

    println!("\n👋 House Points has exited. Goodbye!");
    Ok(())
}

fn print_banner(port: u16) {
    let host = display_host();

    println!();
    println!("🏰 House Points Tracker Server Running!");
    println!();
    println!("📺 TV Display:  http://{}:{}/display.html", host, port);
    println!("📱 Admin Panel: http://{}:{}/admin.html", host, port);
    println!("💻 Local:       http://localhost:{}", port);
    println!();
}
