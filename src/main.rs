use stress_test::{stress_test_replication, stress_test_scaling, LinkConfig};
use tracing_subscriber::EnvFilter;
pub mod stress_test;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async_main())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SARDONYX_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn async_main() -> Result<(), Box<dyn std::error::Error>> {
    println!("\n\n╔════════════════════════════════════════════════════════════╗");
    println!("║            ASYNC STRESS TESTS                              ║");
    println!("╚════════════════════════════════════════════════════════════╝");

    // Test 1: small scale, well-behaved link
    let perfect = LinkConfig {
        cut_rate: 0.0,
        dup_rate: 0.0,
    };
    let stats = stress_test_replication(2, 2, 200, 200, 1024, perfect).await?;
    stats.print();

    // Test 2: small scale, lossy link with redelivery
    let stats = stress_test_replication(4, 4, 200, 400, 1024, LinkConfig::default()).await?;
    stats.print();

    // Test 3: outbox smaller than the write burst, forcing resyncs
    let stats = stress_test_replication(4, 8, 500, 200, 64, LinkConfig::default()).await?;
    stats.print();

    // Test 4: scaling analysis
    println!("\n\n╔════════════════════════════════════════════════════════════╗");
    println!("║          SCALING ANALYSIS                                  ║");
    println!("╚════════════════════════════════════════════════════════════╝");
    stress_test_scaling(12, 4).await?;

    println!("\n✓ All stress tests completed successfully!");
    Ok(())
}
