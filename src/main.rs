use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use datacluster::{ClusterStore, JobOrchestrator, SubmitRequest};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let start_time = Instant::now();
    println!("=== datacluster: asynchronous k-means clustering jobs ===\n");

    // Step 1: Open a store and load sample data points
    println!("Step 1: Inserting sample data points...");
    let store = Arc::new(ClusterStore::open_in_memory()?);
    let samples = [
        json!({ "x": 0.0, "y": 0.0, "note": "low blob" }),
        json!({ "x": 0.0, "y": 1.0, "note": "low blob" }),
        json!({ "x": 10.0, "y": 0.0, "note": "high blob" }),
        json!({ "x": 10.0, "y": 1.0, "note": "high blob" }),
    ];
    let mut ids = Vec::new();
    for payload in samples {
        ids.push(store.insert_datapoint(payload)?.id);
    }
    println!("✓ Inserted {} data points\n", ids.len());

    // Step 2: Submit a clustering job; submission returns before execution
    println!("Step 2: Submitting clustering job...");
    let orchestrator = JobOrchestrator::builder(store).workers(2).build();
    let job = orchestrator.submit(SubmitRequest::new(2, ids)).await?;
    println!("✓ Job {} accepted with status '{}'\n", job.id, job.status);

    // Step 3: Poll until the job reaches a terminal state
    println!("Step 3: Polling job status...");
    let view = loop {
        let view = orchestrator.get_status(job.id).await?;
        if view.status.is_terminal() {
            break view;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    };
    println!("✓ Job finished with status '{}'\n", view.status);

    // Step 4: Fetch and print the clusters
    println!("Step 4: Fetching results...");
    for cluster in orchestrator.get_result(job.id).await? {
        println!(
            "  cluster {} - centroid {:?}, {} members",
            cluster.label,
            cluster.centroid,
            cluster.members.len()
        );
        for member in &cluster.members {
            println!("    {}", member);
        }
    }

    println!(
        "\n=== Done [{:.2}s] ===",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}
