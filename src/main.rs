use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use ship_tracker::server::{self, Bridge};
use ship_tracker::{spawn_animator, spawn_feed, AppConfig, RandomSource, RouteAnimator, SampleFeed};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = AppConfig::from_env().context("failed to load configuration")?;

    let animator = RouteAnimator::new(&cfg.animator).context("invalid animator configuration")?;
    let feed = SampleFeed::new(&cfg.feed, Box::new(RandomSource::default()))
        .context("invalid feed configuration")?;

    tracing::info!(
        "route: {} waypoints, {} steps per traversal ({:.1} per segment), tick {:?}",
        animator.route().waypoints().len(),
        animator.route().total_steps(),
        animator.route().steps_per_segment(),
        animator.tick_interval()
    );
    tracing::info!(
        "feed: window of {}, tick {:?}",
        cfg.feed.window_capacity,
        feed.tick_interval()
    );

    let animator = spawn_animator(animator);
    let feed = spawn_feed(feed);
    let bridge = Bridge::new(&animator, &feed);

    let listener = TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("failed to bind TCP listener at {}", cfg.bind_addr))?;
    tracing::info!("listening on ws://{}", cfg.bind_addr);

    tokio::select! {
        _ = server::serve(listener, bridge) => {}
        res = tokio::signal::ctrl_c() => {
            res.context("failed to listen for ctrl-c")?;
            tracing::info!("shutting down");
        }
    }

    animator.shutdown().await;
    feed.shutdown().await;
    Ok(())
}
