use crate::models::{PaymentMethod, TransactionType};
use std::time::Instant;
use tracing::info;

/// Logs how long a labelled operation took when dropped.
pub struct Timer {
    label: String,
    start: Instant,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        info!("⏱  Starting: {}", label);
        Self {
            label,
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        info!(
            "⏱  Finished: {} (took {:.2?})",
            self.label,
            self.start.elapsed()
        );
    }
}

/// Thousands grouped with a space, Czech style: 1234567 → "1 234 567".
pub fn fmt_number(n: i64) -> String {
    let s = n.unsigned_abs().to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(' ');
        }
        result.push(ch);
    }
    if n < 0 {
        result.push('-');
    }
    result.chars().rev().collect()
}

/// Whole crowns: 12990.4 → "12 990 Kč".
pub fn fmt_currency(amount: f64) -> String {
    format!("{} Kč", fmt_number(amount.round() as i64))
}

/// Ratio as a percentage with one decimal: 0.125 → "12.5 %".
pub fn fmt_percentage(ratio: f64) -> String {
    format!("{:.1} %", ratio * 100.0)
}

pub fn payment_method_label(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Cash => "Hotovost",
        PaymentMethod::Card => "Karta",
    }
}

pub fn transaction_type_label(kind: TransactionType) -> &'static str {
    match kind {
        TransactionType::Reservation => "Rezervace",
        TransactionType::DirectSale => "Přímý prodej",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_number() {
        assert_eq!(fmt_number(1_234_567), "1 234 567");
        assert_eq!(fmt_number(0), "0");
        assert_eq!(fmt_number(-42_000), "-42 000");
        assert_eq!(fmt_number(999), "999");
    }

    #[test]
    fn test_fmt_currency_and_percentage() {
        assert_eq!(fmt_currency(12_990.4), "12 990 Kč");
        assert_eq!(fmt_currency(0.0), "0 Kč");
        assert_eq!(fmt_percentage(0.125), "12.5 %");
        assert_eq!(fmt_percentage(0.0), "0.0 %");
    }

    #[test]
    fn test_labels() {
        assert_eq!(payment_method_label(PaymentMethod::Cash), "Hotovost");
        assert_eq!(transaction_type_label(TransactionType::DirectSale), "Přímý prodej");
    }
}
