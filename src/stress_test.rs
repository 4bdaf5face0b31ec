use async_stream::stream;
use futures::stream::Stream;
use futures::stream::StreamExt;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sdx_store::{
    strings, MemoryRegion, RegionConfigBuilder, ReplicationFrame, Snapshot, StoreError,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Keys the writers pick from; small so commands collide on the same values
const KEY_SPACE: usize = 32;

/// How frames misbehave on the way to a replica
#[derive(Clone, Copy, Debug)]
pub struct LinkConfig {
    /// Chance a batch is cut short after a random frame
    pub cut_rate: f64,
    /// Chance a delivered frame is delivered again
    pub dup_rate: f64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            cut_rate: 0.2,
            dup_rate: 0.1,
        }
    }
}

/// Statistics collected during stress testing
#[derive(Clone, Debug)]
pub struct StressTestStats {
    pub num_replicas: usize,
    pub num_writers: usize,
    pub commands_per_writer: usize,
    pub rejected_commands: usize,
    pub frames_shipped: usize,
    pub duplicates_dropped: usize,
    pub resyncs: usize,
    pub total_syncs: usize,
    pub total_time: Duration,
    pub avg_sync_time: Duration,
    pub ops_per_second: f64,
    pub converged: bool,
}

impl StressTestStats {
    pub fn print(&self) {
        println!("\n╔════════════════════════════════════════════════════════════╗");
        println!("║              Stress Test Statistics                        ║");
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║  Number of Replicas:        {:>30} ║", self.num_replicas);
        println!("║  Writers:                   {:>30} ║", self.num_writers);
        println!("║  Commands per Writer:       {:>30} ║", self.commands_per_writer);
        println!("║  Rejected Commands:         {:>30} ║", self.rejected_commands);
        println!("║  Frames Shipped:            {:>30} ║", self.frames_shipped);
        println!("║  Duplicates Dropped:        {:>30} ║", self.duplicates_dropped);
        println!("║  Full Resyncs:              {:>30} ║", self.resyncs);
        println!("║  Total Sync Operations:     {:>30} ║", self.total_syncs);
        println!("║  Total Time:                {:>29}s ║", format!("{:.3}", self.total_time.as_secs_f64()));
        println!("║  Average Sync Time:         {:>28}µs ║", self.avg_sync_time.as_micros());
        println!("║  Operations/Second:         {:>30.0} ║", self.ops_per_second);
        println!("║  Converged:                 {:>30} ║", self.converged);
        println!("╚════════════════════════════════════════════════════════════╝");
    }
}

#[derive(Default)]
struct SyncCounters {
    frames_shipped: usize,
    duplicates_dropped: usize,
    resyncs: usize,
}

/// Generator that yields which replica to sync next
fn replica_sync_generator(num_replicas: usize, num_syncs: usize) -> impl Stream<Item = usize> {
    stream! {
        let mut rng = StdRng::from_entropy();
        for _ in 0..num_syncs {
            yield rng.gen_range(0..num_replicas);
        }
    }
}

fn peer_name(idx: usize) -> String {
    format!("replica_{}", idx)
}

/// Issue one random string command against `region`.
///
/// Returns false if the command was rejected, e.g. `incr` on text.
fn random_command(region: &MemoryRegion, rng: &mut StdRng, writer: usize) -> bool {
    let key = format!("key_{}", rng.gen_range(0..KEY_SPACE));
    let key = key.as_bytes();
    let result = match rng.gen_range(0..6) {
        0 => strings::set(region, key, format!("w{}", writer).as_bytes()),
        1 | 2 => strings::append(region, key, format!("{},", rng.gen_range(0..100)).as_bytes()).map(|_| ()),
        3 => strings::incr(region, key).map(|_| ()),
        4 => strings::incrby(region, key, rng.gen_range(-1_000..1_000)).map(|_| ()),
        _ => strings::decrby(region, key, rng.gen_range(-1_000..1_000)).map(|_| ()),
    };
    result.is_ok()
}

/// Ship one batch from `primary` to a replica over a misbehaving link.
///
/// Frames travel encoded. A cut batch stops at a frame boundary, so the
/// replica never sees a gap; the unacknowledged rest is resent next time.
fn sync_once(
    primary: &MemoryRegion,
    replica: &MemoryRegion,
    peer: &str,
    link: LinkConfig,
    rng: &mut StdRng,
    counters: &mut SyncCounters,
) -> Result<(), StoreError> {
    let frames = match primary.pending_for(peer) {
        Ok(frames) => frames,
        Err(StoreError::ResyncRequired { .. }) => {
            let snapshot = primary.resync(peer)?;
            replica.install_snapshot(Snapshot::decode(&snapshot.encode())?);
            counters.resyncs += 1;
            return Ok(());
        }
        Err(err) => return Err(err),
    };

    let deliver = if !frames.is_empty() && rng.gen_bool(link.cut_rate) {
        rng.gen_range(0..frames.len())
    } else {
        frames.len()
    };

    let mut last_applied = None;
    for frame in frames.iter().take(deliver) {
        let decoded = ReplicationFrame::decode(&frame.encode())?;
        replica.receive(&decoded)?;
        counters.frames_shipped += 1;
        if rng.gen_bool(link.dup_rate) && !replica.receive(&decoded)? {
            counters.duplicates_dropped += 1;
        }
        last_applied = Some(decoded.seq);
    }

    if let Some(seq) = last_applied {
        primary.acknowledge(peer, seq)?;
    }
    Ok(())
}

fn is_converged(primary: &MemoryRegion, replicas: &[Arc<MemoryRegion>]) -> bool {
    let expected = primary.snapshot().entries;
    replicas.iter().all(|replica| replica.snapshot().entries == expected)
}

/// Writers issue string commands on one primary while replicas follow it
pub async fn stress_test_replication(
    num_replicas: usize,
    num_writers: usize,
    commands_per_writer: usize,
    num_syncs: usize,
    outbox_capacity: usize,
    link: LinkConfig,
) -> Result<StressTestStats, StoreError> {
    println!("\n╔════════════════════════════════════════════════════════════╗");
    println!("║        Primary/Replica Stress Test (Async)                 ║");
    println!("║  Replicas: {} | Writers: {} | Cmds/Writer: {} | Syncs: {} ║",
             num_replicas, num_writers, commands_per_writer, num_syncs);
    println!("╚════════════════════════════════════════════════════════════╝");

    let start = Instant::now();

    let primary = Arc::new(MemoryRegion::new(
        RegionConfigBuilder::new()
            .name("primary")
            .replica_id("primary")
            .outbox_capacity(outbox_capacity)
            .build(),
    ));

    let mut replicas: Vec<Arc<MemoryRegion>> = Vec::with_capacity(num_replicas);
    for idx in 0..num_replicas {
        let replica = MemoryRegion::new(
            RegionConfigBuilder::new()
                .name(peer_name(idx))
                .replica_id(peer_name(idx))
                .build(),
        );
        let snapshot = primary.register_peer(peer_name(idx));
        replica.install_snapshot(Snapshot::decode(&snapshot.encode())?);
        replicas.push(Arc::new(replica));
    }

    info!("[Phase 1/2] writing while replicas follow");

    let mut handles = vec![];
    for writer in 0..num_writers {
        let primary = Arc::clone(&primary);
        let handle = tokio::spawn(async move {
            let mut rng = StdRng::from_entropy();
            let mut rejected: usize = 0;
            for i in 0..commands_per_writer {
                if !random_command(&primary, &mut rng, writer) {
                    rejected += 1;
                }
                if i % 50 == 0 {
                    tokio::task::yield_now().await;
                }
            }
            rejected
        });
        handles.push(handle);
    }

    let mut rng = StdRng::from_entropy();
    let mut counters = SyncCounters::default();
    let mut sync_times = vec![];
    let mut sync_gen = Box::pin(replica_sync_generator(num_replicas, num_syncs));

    while let Some(idx) = sync_gen.next().await {
        let sync_start = Instant::now();
        sync_once(&primary, &replicas[idx], &peer_name(idx), link, &mut rng, &mut counters)?;
        sync_times.push(sync_start.elapsed());
        tokio::task::yield_now().await;
    }

    let mut rejected_commands = 0;
    for handle in handles {
        match handle.await {
            Ok(rejected) => rejected_commands += rejected,
            Err(err) => warn!(%err, "writer task failed"),
        }
    }

    info!("[Phase 2/2] draining outbox");

    // Every round makes progress unless the link cuts a batch at its start
    let mut rounds = 0;
    while !is_converged(&primary, &replicas) && rounds < 10_000 {
        for (idx, replica) in replicas.iter().enumerate() {
            let sync_start = Instant::now();
            sync_once(&primary, replica, &peer_name(idx), link, &mut rng, &mut counters)?;
            sync_times.push(sync_start.elapsed());
        }
        rounds += 1;
    }

    let converged = is_converged(&primary, &replicas);
    if !converged {
        warn!(rounds, "replicas did not converge");
    }

    let total_time = start.elapsed();
    let avg_sync_time = if !sync_times.is_empty() {
        sync_times.iter().sum::<Duration>() / sync_times.len() as u32
    } else {
        Duration::ZERO
    };

    let total_syncs = sync_times.len();
    let total_operations = num_writers * commands_per_writer + counters.frames_shipped;
    let ops_per_second = total_operations as f64 / total_time.as_secs_f64();

    info!(rounds, resyncs = counters.resyncs, "drained");

    Ok(StressTestStats {
        num_replicas,
        num_writers,
        commands_per_writer,
        rejected_commands,
        frames_shipped: counters.frames_shipped,
        duplicates_dropped: counters.duplicates_dropped,
        resyncs: counters.resyncs,
        total_syncs,
        total_time,
        avg_sync_time,
        ops_per_second,
        converged,
    })
}

/// Repeat the replication test with more replicas each step
pub async fn stress_test_scaling(max_replicas: usize, step_size: usize) -> Result<(), StoreError> {
    println!("\n╔════════════════════════════════════════════════════════════╗");
    println!("║      Scaling Analysis - Replication vs Replicas            ║");
    println!("╚════════════════════════════════════════════════════════════╝");

    let mut current_replicas = step_size;
    while current_replicas <= max_replicas {
        let stats = stress_test_replication(
            current_replicas,
            2,
            250,
            current_replicas * 100,
            1024,
            LinkConfig::default(),
        )
        .await?;
        stats.print();
        current_replicas += step_size;
    }
    Ok(())
}
