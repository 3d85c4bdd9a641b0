//! Byte budget for the email variant.
//!
//! Mail platforms clip messages past a fixed size (Gmail cuts at 102 KB and
//! hides the rest behind a "View entire message" link), so the email HTML
//! is measured after inlining and compared against a hard ceiling and a
//! softer warning threshold.

use serde::Serialize;

use crate::util::format_bytes;

/// Hard ceiling: 102 KB.
pub const DEFAULT_HARD_LIMIT: usize = 102 * 1024;

/// Warning threshold: 90 KB.
pub const DEFAULT_SOFT_LIMIT: usize = 90 * 1024;

/// Where a measured size falls relative to the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    /// At or under the soft limit.
    Within,
    /// Over the soft limit but not over the hard limit.
    OverSoft,
    /// Over the hard limit.
    OverHard,
}

impl BudgetStatus {
    pub fn label(&self) -> &'static str {
        match self {
            BudgetStatus::Within => "ok",
            BudgetStatus::OverSoft => "warning",
            BudgetStatus::OverHard => "too large",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeBudget {
    hard_limit: usize,
    soft_limit: usize,
}

impl SizeBudget {
    /// Create a budget. A soft limit above the hard limit is clamped to it.
    pub fn new(hard_limit: usize, soft_limit: usize) -> Self {
        Self {
            hard_limit,
            soft_limit: soft_limit.min(hard_limit),
        }
    }

    pub fn hard_limit(&self) -> usize {
        self.hard_limit
    }

    pub fn soft_limit(&self) -> usize {
        self.soft_limit
    }

    /// Measure the UTF-8 byte length of `html` against the budget.
    pub fn check(&self, html: &str) -> BudgetReport {
        self.check_bytes(html.len())
    }

    pub fn check_bytes(&self, bytes: usize) -> BudgetReport {
        let status = if bytes > self.hard_limit {
            BudgetStatus::OverHard
        } else if bytes > self.soft_limit {
            BudgetStatus::OverSoft
        } else {
            BudgetStatus::Within
        };

        BudgetReport {
            bytes,
            soft_limit: self.soft_limit,
            hard_limit: self.hard_limit,
            status,
        }
    }
}

impl Default for SizeBudget {
    fn default() -> Self {
        Self::new(DEFAULT_HARD_LIMIT, DEFAULT_SOFT_LIMIT)
    }
}

/// The outcome of measuring one email against the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BudgetReport {
    pub bytes: usize,
    pub soft_limit: usize,
    pub hard_limit: usize,
    pub status: BudgetStatus,
}

impl BudgetReport {
    /// Bytes left before the hard limit (negative when over).
    pub fn headroom(&self) -> i64 {
        self.hard_limit as i64 - self.bytes as i64
    }

    /// Share of the hard limit used, as a percentage.
    pub fn percent_used(&self) -> f64 {
        if self.hard_limit == 0 {
            return 0.0;
        }
        self.bytes as f64 * 100.0 / self.hard_limit as f64
    }

    pub fn is_over_hard(&self) -> bool {
        self.status == BudgetStatus::OverHard
    }

    /// One-line human summary, e.g. "93.1 KB of 102.0 KB (91%, warning)".
    pub fn summary(&self) -> String {
        format!(
            "{} of {} ({:.0}%, {})",
            format_bytes(self.bytes),
            format_bytes(self.hard_limit),
            self.percent_used(),
            self.status.label()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let budget = SizeBudget::default();
        assert_eq!(budget.hard_limit(), 104_448);
        assert_eq!(budget.soft_limit(), 92_160);
    }

    #[test]
    fn test_status_thresholds() {
        let budget = SizeBudget::new(100, 80);

        assert_eq!(budget.check_bytes(0).status, BudgetStatus::Within);
        assert_eq!(budget.check_bytes(80).status, BudgetStatus::Within);
        assert_eq!(budget.check_bytes(81).status, BudgetStatus::OverSoft);
        assert_eq!(budget.check_bytes(100).status, BudgetStatus::OverSoft);
        assert_eq!(budget.check_bytes(101).status, BudgetStatus::OverHard);
    }

    #[test]
    fn test_check_counts_bytes_not_chars() {
        let budget = SizeBudget::new(4, 4);
        // "é" is two bytes in UTF-8
        assert_eq!(budget.check("éé").status, BudgetStatus::Within);
        assert_eq!(budget.check("ééé").status, BudgetStatus::OverHard);
    }

    #[test]
    fn test_soft_limit_clamped() {
        let budget = SizeBudget::new(100, 500);
        assert_eq!(budget.soft_limit(), 100);
        assert_eq!(budget.check_bytes(100).status, BudgetStatus::Within);
    }

    #[test]
    fn test_headroom_and_percent() {
        let budget = SizeBudget::new(200, 150);

        let under = budget.check_bytes(50);
        assert_eq!(under.headroom(), 150);
        assert!((under.percent_used() - 25.0).abs() < f64::EPSILON);

        let over = budget.check_bytes(250);
        assert_eq!(over.headroom(), -50);
        assert!(over.is_over_hard());
    }

    #[test]
    fn test_summary() {
        let report = SizeBudget::default().check_bytes(51_200);
        assert_eq!(report.summary(), "50.0 KB of 102.0 KB (49%, ok)");
    }
}
