//! Basic reconciliation example

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use reconciliation_core::utils::MemoryArchiveStore;
use reconciliation_core::{
    finalize, import_statement, system_transactions, ArchiveStore, ManualMatch, PaymentDirection,
    PaymentMethod, PaymentRecord, ReconciliationEngine, ReconciliationSettings, StatementLine,
};
use std::str::FromStr;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_target(false).init();

    println!("🏦 Reconciliation Core - Basic Reconciliation Example\n");

    let day = |d: u32| NaiveDate::from_ymd_opt(2025, 4, d).ok_or("invalid date");

    // 1. Import the bank statement
    println!("📄 Importing bank statement...");
    let bank = import_statement(vec![
        StatementLine::new("L1")
            .date(day(2)?)
            .credit(BigDecimal::from_str("845.20")?)
            .description("REMISE CB 0204")
            .reference("CB0204"),
        StatementLine::new("L2")
            .date(day(3)?)
            .debit(BigDecimal::from_str("1200.00")?)
            .description("VIR SEPA Brasserie Supplies"),
        StatementLine::new("L3")
            .date(day(5)?)
            .debit(BigDecimal::from_str("92.35")?)
            .description("PRLV EDF electricity"),
        StatementLine::new("L4")
            .date(day(8)?)
            .debit(BigDecimal::from_str("57.60")?)
            .description("CHQ 0001234"),
    ])?;
    for line in &bank {
        println!("  ✓ {} {} {:>10} {}", line.id, line.date, line.amount, line.description);
    }
    println!();

    // 2. Collect system transactions from payment records
    println!("💳 Collecting system transactions...");
    let mut card = PaymentRecord::new(
        "P1".to_string(),
        day(2)?,
        BigDecimal::from_str("845.20")?,
        PaymentMethod::Card,
        PaymentDirection::Incoming,
        "Card takings".to_string(),
    );
    card.reference = Some("cb0204".to_string());
    let payments = vec![
        card,
        PaymentRecord::new(
            "P2".to_string(),
            day(2)?,
            BigDecimal::from_str("1200.00")?,
            PaymentMethod::Transfer,
            PaymentDirection::Outgoing,
            "Brasserie supplies".to_string(),
        ),
        PaymentRecord::new(
            "P3".to_string(),
            day(6)?,
            BigDecimal::from_str("92.30")?,
            PaymentMethod::Transfer,
            PaymentDirection::Outgoing,
            "EDF electricity".to_string(),
        ),
        PaymentRecord::new(
            "P4".to_string(),
            day(1)?,
            BigDecimal::from_str("57.60")?,
            PaymentMethod::Check,
            PaymentDirection::Outgoing,
            "Florist".to_string(),
        ),
        PaymentRecord::new(
            "P5".to_string(),
            day(2)?,
            BigDecimal::from_str("60.00")?,
            PaymentMethod::Cash,
            PaymentDirection::Incoming,
            "Cash tips".to_string(),
        ),
    ];
    let system = system_transactions(&payments)?;
    println!("  ✓ {} electronic payments kept\n", system.len());

    // 3. Run the matching engine
    println!("🔍 Reconciling...");
    let engine = ReconciliationEngine::new(ReconciliationSettings::default())?;
    let result = engine.reconcile(&bank, &system)?;
    for candidate in &result.matches {
        println!(
            "  ✓ {} <-> {} ({}, confidence {:.2})",
            candidate.bank_transaction.id,
            candidate.system_transaction.id,
            candidate.match_type,
            candidate.confidence
        );
    }
    for line in &result.unmatched_bank {
        println!("  ✗ Unmatched bank line {}", line.id);
    }
    for payment in &result.unmatched_system {
        println!("  ✗ Unmatched payment {}", payment.id);
    }
    println!();

    // 4. Finalize with a manual pairing and approve everything
    println!("✅ Finalizing...");
    let finalized = finalize(result, &[ManualMatch::new("L4", "P4")], true)?;
    let summary = finalized.summary();
    println!(
        "  Exact: {}, Fuzzy: {}, Manual: {}, Match rate: {:.0}%",
        summary.exact_matches,
        summary.fuzzy_matches,
        summary.manual_matches,
        summary.match_rate * 100.0
    );
    println!();

    // 5. Archive the finalized result
    println!("🗄️  Archiving...");
    let mut store = MemoryArchiveStore::new();
    let archive = store
        .save_reconciliation("statement-2025-04", &finalized)
        .await?;
    println!("  ✓ Archived as {} at {}", archive.id, archive.archived_at);

    Ok(())
}
