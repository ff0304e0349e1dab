//! Fixed-payment (annuity) mortgage math.

/// Monthly payment for a fully amortizing fixed-rate loan.
///
/// `annual_rate_pct` is in percent (7.1 means 7.1%). A zero rate degrades to
/// straight-line repayment; a zero term yields no payment.
pub fn monthly_payment(principal: f64, annual_rate_pct: f64, years: u32) -> f64 {
    let payments = f64::from(years) * 12.0;
    if payments == 0.0 {
        return 0.0;
    }
    let r = annual_rate_pct / 100.0 / 12.0;
    if r == 0.0 {
        return principal / payments;
    }
    let growth = (1.0 + r).powf(payments);
    principal * r * growth / (growth - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_closed_form_annuity() {
        let p = monthly_payment(300_000.0, 7.1, 30);
        let r: f64 = 0.071 / 12.0;
        let expected = 300_000.0 * r / (1.0 - (1.0 + r).powi(-360));
        assert!((p - expected).abs() < 1e-6);
        assert!((p - 2016.1).abs() < 0.5, "got {p}");
    }

    #[test]
    fn zero_rate_is_straight_line() {
        assert!((monthly_payment(120_000.0, 0.0, 10) - 1_000.0).abs() < 1e-9);
    }

    #[test]
    fn zero_term_pays_nothing() {
        assert_eq!(monthly_payment(100_000.0, 5.0, 0), 0.0);
    }
}
