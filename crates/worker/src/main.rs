//! Gamification worker: claims completion jobs, runs the pipeline, and
//! hosts the event persistence, delivery, and reconciliation loops.

mod config;
mod dispatcher;

use std::sync::Arc;

use skillforge_events::{EventBus, EventPersistence, InAppDispatcher, WebhookDelivery};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::WorkerConfig;
use crate::dispatcher::JobDispatcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skillforge_worker=debug,skillforge_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WorkerConfig::from_env()?;

    let pool = skillforge_db::connect(&config.database_url).await?;
    skillforge_db::health_check(&pool).await?;
    tracing::info!("Database connection established");

    let bus = Arc::new(EventBus::default());
    let cancel = CancellationToken::new();

    // Durable event capture.
    let persistence = tokio::spawn(EventPersistence::run(pool.clone(), bus.subscribe()));

    // Optional webhook mirror of every domain event.
    let webhook_task = config.event_webhook_url.clone().map(|url| {
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            let delivery = WebhookDelivery::new();
            while let Ok(event) = rx.recv().await {
                if let Err(e) = delivery.deliver(&url, &event).await {
                    tracing::warn!(error = %e, "Event webhook delivery failed");
                }
            }
        })
    });

    // Periodic cache reconciliation.
    let reconcile_task = tokio::spawn(skillforge_engine::reconcile::run_periodic(
        pool.clone(),
        config.reconcile_interval,
        cancel.child_token(),
    ));

    // The job dispatcher is the main loop.
    let notifier = Arc::new(InAppDispatcher::new(bus.clone()));
    let orchestrator = Arc::new(skillforge_engine::Orchestrator::new(notifier));
    let dispatcher = JobDispatcher::new(pool.clone(), orchestrator, config.poll_interval);

    let dispatcher_cancel = cancel.child_token();
    let dispatcher_task = tokio::spawn(async move { dispatcher.run(dispatcher_cancel).await });

    // Shut down cleanly on ctrl-c.
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    cancel.cancel();

    dispatcher_task.await?;
    reconcile_task.abort();
    if let Some(task) = webhook_task {
        task.abort();
    }
    drop(bus);
    persistence.await?;

    tracing::info!("Worker stopped");
    Ok(())
}
