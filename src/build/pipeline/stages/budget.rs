//! Email size budget stage.

use crate::build::budget::BudgetStatus;
use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};
use crate::util::format_bytes;

/// Stage that measures each final email against the byte budget.
///
/// Every issue gets a `BudgetReport`. Issues over the soft limit are
/// logged as warnings. When enforcing, any issue over the hard limit
/// fails the stage, which runs before `write` so nothing is written.
pub struct BudgetStage {
    enforce: bool,
}

impl BudgetStage {
    pub fn new(enforce: bool) -> Self {
        Self { enforce }
    }
}

impl Stage for BudgetStage {
    fn name(&self) -> &'static str {
        "budget"
    }

    fn process(
        &self,
        docs: &mut [ProcessingDocument],
        ctx: &mut PipelineContext,
    ) -> Result<(), PipelineError> {
        for doc in docs.iter_mut() {
            let html = doc.email.html.as_ref().ok_or_else(|| {
                PipelineError::stage(
                    "budget",
                    format!(
                        "issue '{}' has no email HTML (was template stage run?)",
                        doc.slug()
                    ),
                )
            })?;

            let report = ctx.budget.check(html);
            match report.status {
                BudgetStatus::Within => {
                    tracing::debug!(slug = doc.slug(), bytes = report.bytes, "email within budget");
                }
                BudgetStatus::OverSoft => {
                    tracing::warn!(
                        slug = doc.slug(),
                        bytes = report.bytes,
                        "email is {}, over the {} soft limit",
                        format_bytes(report.bytes),
                        format_bytes(report.soft_limit)
                    );
                }
                BudgetStatus::OverHard => {
                    tracing::warn!(
                        slug = doc.slug(),
                        bytes = report.bytes,
                        "email is {}, over the {} hard limit; Gmail will clip it",
                        format_bytes(report.bytes),
                        format_bytes(report.hard_limit)
                    );
                }
            }
            doc.budget = Some(report);
        }

        if self.enforce {
            let over = docs
                .iter()
                .find_map(|doc| doc.budget.filter(|r| r.is_over_hard()).map(|r| (doc, r)));
            if let Some((doc, report)) = over {
                return Err(PipelineError::BudgetExceeded {
                    document: doc.slug().to_string(),
                    bytes: report.bytes,
                    limit: report.hard_limit,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::budget::SizeBudget;
    use crate::build::pipeline::stages::test_support::{Fixture, doc};

    fn with_email(slug: &str, bytes: usize) -> ProcessingDocument {
        let mut processing = doc(&format!("{}.md", slug), "");
        processing.email.html = Some("x".repeat(bytes));
        processing
    }

    #[test]
    fn test_reports_status() {
        let tmp = tempfile::tempdir().unwrap();
        let mut fixture = Fixture::new(tmp.path());
        fixture.budget = SizeBudget::new(100, 80);
        let mut docs = vec![with_email("small", 80), with_email("medium", 81)];

        BudgetStage::new(true)
            .process(&mut docs, &mut fixture.context())
            .unwrap();

        assert_eq!(docs[0].budget.unwrap().status, BudgetStatus::Within);
        assert_eq!(docs[1].budget.unwrap().status, BudgetStatus::OverSoft);
    }

    #[test]
    fn test_enforced_hard_limit_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let mut fixture = Fixture::new(tmp.path());
        fixture.budget = SizeBudget::new(100, 80);
        let mut docs = vec![with_email("ok", 10), with_email("huge", 101)];

        let err = BudgetStage::new(true)
            .process(&mut docs, &mut fixture.context())
            .unwrap_err();

        match err {
            PipelineError::BudgetExceeded {
                document,
                bytes,
                limit,
            } => {
                assert_eq!(document, "huge");
                assert_eq!(bytes, 101);
                assert_eq!(limit, 100);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_not_enforced_only_reports() {
        let tmp = tempfile::tempdir().unwrap();
        let mut fixture = Fixture::new(tmp.path());
        fixture.budget = SizeBudget::new(100, 80);
        let mut docs = vec![with_email("huge", 101)];

        BudgetStage::new(false)
            .process(&mut docs, &mut fixture.context())
            .unwrap();

        assert!(docs[0].budget.unwrap().is_over_hard());
    }
}
