//! KPI Report
//!
//! Daily funnel digest pushed to operators: lead count, conversions, revenue,
//! conversion rate, and a rough estimate of days remaining to the monthly
//! revenue target at the month-to-date pace.

use chrono::{DateTime, Datelike, Utc};

use crate::lead::{Lead, PaymentStatus};

/// Default monthly revenue target in minor currency units
pub const DEFAULT_MONTH_TARGET: i64 = 1_000_000;

/// Aggregated funnel metrics
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct KpiReport {
    /// Total leads in the store
    pub total_leads: usize,
    /// Leads with a completed payment
    pub conversions: usize,
    /// Sum of price over converted leads
    pub revenue: i64,
    /// conversions / total_leads, 0 when the store is empty
    pub cvr: f64,
}

impl KpiReport {
    /// Compute metrics over every lead in the store
    pub fn from_leads(leads: &[Lead]) -> Self {
        let total_leads = leads.len();
        let mut conversions = 0;
        let mut revenue = 0;
        for lead in leads {
            if lead.payment_status == PaymentStatus::Completed {
                conversions += 1;
                revenue += lead.price;
            }
        }
        let cvr = if total_leads > 0 {
            conversions as f64 / total_leads as f64
        } else {
            0.0
        };
        Self { total_leads, conversions, revenue, cvr }
    }

    /// Render the operator-facing digest message
    pub fn to_message(&self, now: DateTime<Utc>, month_target: i64) -> String {
        format!(
            "[Daily KPI]\n\
             Leads: {}\n\
             Conversions: {}\n\
             CVR: {:.2}%\n\
             Revenue: ¥{}\n\
             Target pace: {}",
            self.total_leads,
            self.conversions,
            self.cvr * 100.0,
            self.revenue,
            self.target_pace(now, month_target),
        )
    }

    /// Estimate days remaining to the monthly target at the month-to-date
    /// daily average.
    fn target_pace(&self, now: DateTime<Utc>, month_target: i64) -> String {
        if self.revenue <= 0 {
            return "insufficient data".into();
        }
        let remaining = month_target - self.revenue;
        if remaining <= 0 {
            return "target achieved".into();
        }
        let days_elapsed = i64::from(now.day());
        let avg_per_day = self.revenue as f64 / days_elapsed as f64;
        let days_left = (remaining as f64 / avg_per_day).ceil() as i64;
        format!("~{} more days at current pace", days_left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lead::{LeadStatus, ProductCode};
    use chrono::TimeZone;

    fn lead(payment_status: PaymentStatus, price: i64) -> Lead {
        Lead {
            id: "x".into(),
            name: "x".into(),
            external_id: "x".into(),
            email: None,
            phone: None,
            product: ProductCode::Guide,
            price,
            expected_cvr: 0.05,
            status: LeadStatus::New,
            payment_status,
            payment_date: None,
            notes: String::new(),
            contacted: false,
            contacted_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_metrics_count_only_completed_payments() {
        let leads = vec![
            lead(PaymentStatus::Completed, 1480),
            lead(PaymentStatus::Completed, 3000),
            lead(PaymentStatus::Pending, 1480),
            lead(PaymentStatus::Failed, 3000),
        ];
        let report = KpiReport::from_leads(&leads);
        assert_eq!(report.total_leads, 4);
        assert_eq!(report.conversions, 2);
        assert_eq!(report.revenue, 4480);
        assert!((report.cvr - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_store_has_zero_cvr_and_no_pace() {
        let report = KpiReport::from_leads(&[]);
        assert_eq!(report.cvr, 0.0);
        let msg = report.to_message(Utc::now(), DEFAULT_MONTH_TARGET);
        assert!(msg.contains("insufficient data"));
    }

    #[test]
    fn test_target_pace_estimates_days() {
        let report = KpiReport {
            total_leads: 100,
            conversions: 50,
            revenue: 100_000,
            cvr: 0.5,
        };
        // Day 10 of the month: 10k/day average, 900k remaining -> 90 days.
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap();
        let msg = report.to_message(now, 1_000_000);
        assert!(msg.contains("~90 more days"), "{}", msg);
    }

    #[test]
    fn test_target_achieved() {
        let report = KpiReport { total_leads: 10, conversions: 9, revenue: 2_000_000, cvr: 0.9 };
        let msg = report.to_message(Utc::now(), 1_000_000);
        assert!(msg.contains("target achieved"));
    }
}
