use crate::model::PaymentStatus;

/// Classify a group by what is due and what has been paid.
///
/// - `due <= 0` → Paid (nothing outstanding)
/// - `due > 0` and `paid > 0` → Partial
/// - otherwise → Unpaid
pub fn classify(due: f64, paid: f64) -> PaymentStatus {
    if due <= 0.0 {
        PaymentStatus::Paid
    } else if paid > 0.0 {
        PaymentStatus::Partial
    } else {
        PaymentStatus::Unpaid
    }
}
