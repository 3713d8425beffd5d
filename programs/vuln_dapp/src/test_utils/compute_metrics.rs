use litesvm::LiteSVM;
use solana_sdk::transaction::Transaction;
use std::collections::BTreeMap;
use std::sync::Mutex;

// Compute units consumed per instruction name, collected across the test binary.
struct ComputeMetrics {
    calls: BTreeMap<String, Vec<u64>>,
}

impl ComputeMetrics {
    fn new() -> Self {
        Self {
            calls: BTreeMap::new(),
        }
    }

    fn record(&mut self, instruction_name: &str, compute_units: u64) {
        self.calls
            .entry(instruction_name.to_string())
            .or_default()
            .push(compute_units);
    }

    fn print_report(&self) {
        if self.calls.is_empty() {
            return;
        }
        println!("\n{}", "=".repeat(80));
        println!("VULN_DAPP COMPUTE UNIT USAGE");
        println!("{}", "=".repeat(80));

        for (name, values) in &self.calls {
            let count = values.len();
            let sum: u64 = values.iter().sum();
            let min = values.iter().min().copied().unwrap_or_default();
            let max = values.iter().max().copied().unwrap_or_default();

            // ANSI color codes: \x1b[32;1m = green and bold, \x1b[0m = reset
            println!("\n\x1b[32;1m{}\x1b[0m", name);
            println!("  Calls:   {}", count);
            println!("  Average: {:.0} CU", sum as f64 / count as f64);
            println!("  Min:     {} CU", min);
            println!("  Max:     {} CU", max);
        }

        println!("\n{}", "=".repeat(80));
    }
}

static METRICS: Mutex<Option<ComputeMetrics>> = Mutex::new(None);

pub fn init_metrics() {
    let mut metrics = METRICS.lock().unwrap();
    *metrics = Some(ComputeMetrics::new());
}

fn record_compute_units(instruction_name: &str, compute_units: u64) {
    let mut metrics = METRICS.lock().unwrap();
    if let Some(m) = metrics.as_mut() {
        m.record(instruction_name, compute_units);
    }
}

pub fn print_metrics_report() {
    let metrics = METRICS.lock().unwrap();
    if let Some(m) = metrics.as_ref() {
        m.print_report();
    }
}

/// Sends the transaction and records its compute units when it succeeds.
pub fn send_and_record(
    svm: &mut LiteSVM,
    tx: Transaction,
    instruction_name: &str,
) -> litesvm::types::TransactionResult {
    let result = svm.send_transaction(tx)?;
    record_compute_units(instruction_name, result.compute_units_consumed);
    Ok(result)
}
