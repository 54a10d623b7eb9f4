//! Result merging - folds per-batch partial results into one section
//! aggregate and scores confidence.
//!
//! Each schema supplies its own merge strategy through [`MergeBatches`];
//! there is no runtime inspection of result shapes.

use crate::pipeline::orchestrate::BatchOutcome;
use crate::types::{AdmissionInfo, DepartmentList, FacilityList, FeeList};

/// Confidence never reaches 1.0; the service is heuristic and best-effort.
const CONFIDENCE_CAP: f64 = 0.95;

/// Per-schema merge strategy: how one batch's partial result folds into the
/// accumulator, and how extracted items are counted for confidence.
pub trait MergeBatches: Default {
    /// Fold one batch's result into `self`, in batch order.
    fn merge_batch(&mut self, batch: Self);

    /// Number of extracted items carried by this result.
    fn item_count(&self) -> usize;
}

impl MergeBatches for DepartmentList {
    fn merge_batch(&mut self, batch: Self) {
        self.items.extend(batch.items);
    }

    fn item_count(&self) -> usize {
        self.items.len()
    }
}

impl MergeBatches for FacilityList {
    fn merge_batch(&mut self, batch: Self) {
        self.items.extend(batch.items);
    }

    fn item_count(&self) -> usize {
        self.items.len()
    }
}

impl MergeBatches for FeeList {
    fn merge_batch(&mut self, batch: Self) {
        self.items.extend(batch.items);
    }

    fn item_count(&self) -> usize {
        self.items.len()
    }
}

impl MergeBatches for AdmissionInfo {
    fn merge_batch(&mut self, batch: Self) {
        merge_text(&mut self.eligibility_criteria, batch.eligibility_criteria);
        merge_text(&mut self.application_process, batch.application_process);
        self.test_requirements.extend(batch.test_requirements);
        self.documents_required.extend(batch.documents_required);
        self.important_dates.extend(batch.important_dates);
        self.source_chunk_ids.extend(batch.source_chunk_ids);
    }

    fn item_count(&self) -> usize {
        let narrative_fields = [&self.eligibility_criteria, &self.application_process]
            .iter()
            .filter(|f| f.as_deref().is_some_and(|s| !s.is_empty()))
            .count();
        narrative_fields
            + self.test_requirements.len()
            + self.documents_required.len()
            + self.important_dates.len()
    }
}

/// Newline-join accumulative free-text fields across batches, skipping
/// empties.
fn merge_text(accumulator: &mut Option<String>, incoming: Option<String>) {
    let Some(text) = incoming.filter(|t| !t.is_empty()) else {
        return;
    };
    match accumulator {
        Some(existing) => {
            existing.push('\n');
            existing.push_str(&text);
        }
        None => *accumulator = Some(text),
    }
}

/// A section's merged result with its degradation bookkeeping.
#[derive(Debug, Clone)]
pub struct SectionResult<T> {
    pub value: T,
    pub batches_total: usize,
    pub batches_failed: usize,

    /// Heuristic data-quality signal, not a probability
    pub confidence: f64,
}

impl<T: Default> SectionResult<T> {
    /// Result for a section with nothing to extract.
    pub fn empty() -> Self {
        Self {
            value: T::default(),
            batches_total: 0,
            batches_failed: 0,
            confidence: 0.0,
        }
    }
}

impl<T> SectionResult<T> {
    /// True when at least one batch degraded to its default.
    pub fn is_degraded(&self) -> bool {
        self.batches_failed > 0
    }
}

/// Fold a section's batch outcomes, in batch order. Failed batches
/// contribute nothing; they are counted so callers can surface warnings.
pub fn merge_outcomes<T: MergeBatches>(outcomes: Vec<BatchOutcome<T>>) -> SectionResult<T> {
    let batches_total = outcomes.len();
    let mut batches_failed = 0usize;
    let mut value = T::default();

    for outcome in outcomes {
        if outcome.is_extracted() {
            value.merge_batch(outcome.value);
        } else {
            batches_failed += 1;
        }
    }

    let confidence = confidence_score(value.item_count());
    SectionResult {
        value,
        batches_total,
        batches_failed,
        confidence,
    }
}

/// Monotonically increasing in item count, capped below 1.0; zero items
/// means zero confidence.
pub fn confidence_score(item_count: usize) -> f64 {
    if item_count == 0 {
        return 0.0;
    }
    (0.5 + 0.05 * item_count as f64).min(CONFIDENCE_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Department, Facility};

    fn department(name: &str) -> Department {
        Department {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_list_merge_keeps_batch_order_without_dedup() {
        let outcomes = vec![
            BatchOutcome::extracted(DepartmentList {
                items: vec![department("Physics"), department("Chemistry")],
            }),
            BatchOutcome::extracted(DepartmentList {
                items: vec![department("Physics")],
            }),
        ];

        let result = merge_outcomes(outcomes);
        let names: Vec<&str> = result.value.items.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Physics", "Chemistry", "Physics"]);
        assert_eq!(result.batches_failed, 0);
    }

    #[test]
    fn test_failed_batch_leaves_others_undiminished() {
        let outcomes = vec![
            BatchOutcome::extracted(FacilityList {
                items: vec![Facility {
                    name: "Library".to_string(),
                    ..Default::default()
                }],
            }),
            BatchOutcome::failed(FacilityList::default()),
            BatchOutcome::extracted(FacilityList {
                items: vec![Facility {
                    name: "Hostel".to_string(),
                    ..Default::default()
                }],
            }),
        ];

        let result = merge_outcomes(outcomes);
        assert_eq!(result.value.items.len(), 2);
        assert_eq!(result.batches_total, 3);
        assert_eq!(result.batches_failed, 1);
        assert!(result.is_degraded());
    }

    #[test]
    fn test_admission_merge_joins_narratives() {
        let first = AdmissionInfo {
            eligibility_criteria: Some("60% marks in intermediate.".to_string()),
            important_dates: vec!["Applications open 1 July".to_string()],
            ..Default::default()
        };
        let second = AdmissionInfo {
            eligibility_criteria: Some("Entry test required.".to_string()),
            application_process: Some("Apply online.".to_string()),
            important_dates: vec!["Classes start 1 September".to_string()],
            ..Default::default()
        };

        let result = merge_outcomes(vec![
            BatchOutcome::extracted(first),
            BatchOutcome::extracted(second),
        ]);

        assert_eq!(
            result.value.eligibility_criteria.as_deref(),
            Some("60% marks in intermediate.\nEntry test required.")
        );
        assert_eq!(result.value.application_process.as_deref(), Some("Apply online."));
        assert_eq!(result.value.important_dates.len(), 2);
    }

    #[test]
    fn test_confidence_zero_items_is_zero() {
        assert_eq!(confidence_score(0), 0.0);
    }

    #[test]
    fn test_confidence_monotone_and_capped() {
        let mut last = 0.0;
        for n in 1..50 {
            let c = confidence_score(n);
            assert!(c >= last);
            assert!(c < 1.0);
            last = c;
        }
        assert_eq!(confidence_score(100), CONFIDENCE_CAP);
    }

    #[test]
    fn test_empty_section_result() {
        let result: SectionResult<FeeList> = SectionResult::empty();
        assert_eq!(result.confidence, 0.0);
        assert!(!result.is_degraded());
        assert!(result.value.items.is_empty());
    }
}
