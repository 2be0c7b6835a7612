//! Aggregate review state over a subject's documents.

use serde::Serialize;

use super::models::{Document, DocumentReviewStatus};

/// Counts of a subject's documents by review state.
///
/// `approved + pending + rejected == total` always holds. Documents that
/// require replacement are counted as pending: they wait for a new upload and
/// a fresh review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DocumentAggregate {
    pub total: usize,
    pub approved: usize,
    pub pending: usize,
    pub rejected: usize,
    /// True iff nothing is pending, nothing is rejected, and there is at
    /// least one document. Only a complete set lets the Documents stage be
    /// approved as a whole.
    pub complete: bool,
}

pub struct DocumentAggregator;

impl DocumentAggregator {
    /// Compute the aggregate in a single pass over the documents.
    pub fn compute(documents: &[Document]) -> DocumentAggregate {
        let mut aggregate = DocumentAggregate {
            total: documents.len(),
            ..Default::default()
        };

        for document in documents {
            match document.review_status {
                DocumentReviewStatus::Approved => aggregate.approved += 1,
                DocumentReviewStatus::Rejected => aggregate.rejected += 1,
                DocumentReviewStatus::Pending | DocumentReviewStatus::RequiresReplacement => {
                    aggregate.pending += 1
                }
            }
        }

        aggregate.complete =
            aggregate.total > 0 && aggregate.pending == 0 && aggregate.rejected == 0;
        aggregate
    }
}
