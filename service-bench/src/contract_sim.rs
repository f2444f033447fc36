use std::time::Duration;

use tokio::time::Instant;

use crate::stats;
use crate::types::SmartContractResults;

/// Time-delay stand-ins for contract deployment, NFT mint and NFT transfer.
/// No network calls happen here; the delays ramp linearly per round the way
/// the real operations slow down as blocks fill.
pub async fn benchmark_contract_operations(rounds: u32) -> SmartContractResults {
    let mut deployment = Vec::with_capacity(rounds as usize);
    let mut mint = Vec::with_capacity(rounds as usize);
    let mut transfer = Vec::with_capacity(rounds as usize);

    for i in 0..rounds as u64 {
        deployment.push(timed_delay(Duration::from_millis(200 + i * 10)).await);
        mint.push(timed_delay(Duration::from_millis(100 + i * 5)).await);
        transfer.push(timed_delay(Duration::from_millis(80 + i * 3)).await);
    }

    SmartContractResults {
        deployment: stats::operation_timing(&deployment),
        nft_mint: stats::operation_timing(&mint),
        nft_transfer: stats::operation_timing(&transfer),
    }
}

async fn timed_delay(delay: Duration) -> f64 {
    let started = Instant::now();
    tokio::time::sleep(delay).await;
    started.elapsed().as_secs_f64() * 1000.0
}
