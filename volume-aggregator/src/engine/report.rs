use volume_core::DailyTotals;

/// Text of the daily report message: `Daily trades: {"buys":..,"sells":..}`
pub fn format_daily_report(totals: &DailyTotals) -> String {
    let snapshot = serde_json::to_string(totals)
        .unwrap_or_else(|_| format!("{{\"buys\":{},\"sells\":{}}}", totals.buys, totals.sells));
    format!("Daily trades: {}", snapshot)
}
