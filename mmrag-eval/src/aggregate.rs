//! Cross-modality aggregates
//!
//! Each aggregate is the plain mean of exactly two terms: the Image- and
//! Text-prefixed grades of its category. An absent grade enters the mean as
//! `-1`, it is not excluded. With one modality missing the aggregate is
//! therefore pulled down, e.g. `mean(3, -1) = 1.0`.

use crate::metric::AggregateMetric;
use crate::table::ResultTable;

/// Value substituted for a modality that was not graded
pub const ABSENT_GRADE: i64 = -1;

/// Fixed two-term mean with the absent-grade substitution
pub fn aggregate_grade(image_grade: Option<i64>, text_grade: Option<i64>) -> f64 {
    // Sum in f64: judge grades are unbounded and i64 addition can overflow
    let image = image_grade.unwrap_or(ABSENT_GRADE) as f64;
    let text = text_grade.unwrap_or(ABSENT_GRADE) as f64;
    (image + text) / 2.0
}

/// Compute `category` for the row at `index` and write `<category> grade`
pub fn aggregate(table: &mut ResultTable, index: usize, category: AggregateMetric) -> f64 {
    let grade = aggregate_grade(
        table.grade(index, category.image_metric().name()),
        table.grade(index, category.text_metric().name()),
    );
    table.set(index, &category.grade_column(), grade);
    grade
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;
    use proptest::prelude::*;

    #[test]
    fn test_both_modalities_present() {
        assert_eq!(aggregate_grade(Some(4), Some(2)), 3.0);
        assert_eq!(aggregate_grade(Some(0), Some(1)), 0.5);
    }

    /// A missing modality counts as -1 instead of being left out of the mean.
    #[test]
    fn test_missing_modality_is_averaged_as_minus_one() {
        assert_eq!(aggregate_grade(Some(3), None), 1.0);
        assert_eq!(aggregate_grade(None, Some(5)), 2.0);
        assert_eq!(aggregate_grade(None, None), -1.0);
    }

    #[test]
    fn test_extreme_grades_do_not_overflow() {
        assert_eq!(aggregate_grade(Some(i64::MAX), Some(i64::MAX)), i64::MAX as f64);
        assert_eq!(aggregate_grade(Some(i64::MIN), Some(i64::MIN)), i64::MIN as f64);
        assert_eq!(aggregate_grade(Some(i64::MAX), None), (i64::MAX as f64 - 1.0) / 2.0);
    }

    #[test]
    fn test_aggregate_writes_column() {
        let mut table = ResultTable::new();
        table.set(0, "Image Faithfulness grade", None::<i64>);
        table.set(0, "Text Faithfulness grade", Some(3_i64));

        let grade = aggregate(&mut table, 0, AggregateMetric::Faithfulness);
        assert_eq!(grade, 1.0);
        assert_eq!(table.get(0, "Faithfulness grade"), Some(&Cell::Score(1.0)));
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let mut table = ResultTable::new();
        table.set(0, "Image Context Relevancy grade", Some(2_i64));
        table.set(0, "Text Context Relevancy grade", Some(5_i64));

        let first = aggregate(&mut table, 0, AggregateMetric::ContextRelevancy);
        let snapshot = table.clone();
        let second = aggregate(&mut table, 0, AggregateMetric::ContextRelevancy);
        assert_eq!(first, second);
        assert_eq!(table, snapshot);
    }

    proptest! {
        #[test]
        fn prop_sentinel_law(image in proptest::option::of(0i64..=10), text in proptest::option::of(0i64..=10)) {
            let expected = (image.unwrap_or(-1) + text.unwrap_or(-1)) as f64 / 2.0;
            prop_assert_eq!(aggregate_grade(image, text), expected);
        }
    }
}
