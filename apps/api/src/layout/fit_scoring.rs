//! Fit Scoring: how well a layout's declared capacity matches a slide's content shape.
//!
//! Default: `CapacityFitScorer` (pure, deterministic, no I/O). The ranker holds an
//! `Arc<dyn FitScorer>` so an alternative heuristic can be swapped in without touching
//! the ranking or reconciliation code.
//!
//! Cost is non-negative and lower is better:
//! 1. Per axis (text, images): under the minimum costs `(min - actual) × 2`, over the
//!    maximum costs `(actual - max) × 1.5`, otherwise 0.
//! 2. Only when both axes are penalty-free, add `0.5 × Σ |actual - center| / span` for
//!    axes that declare both bounds with `max > min`.
//! 3. Divide by `max(0.1, weight)`.

use serde::{Deserialize, Serialize};

use crate::layout::model::{ContentShape, Layout};

const UNDERFILL_MULTIPLIER: f64 = 2.0;
const OVERFLOW_MULTIPLIER: f64 = 1.5;
const CLOSENESS_FACTOR: f64 = 0.5;
const MIN_EFFECTIVE_WEIGHT: f64 = 0.1;

// ────────────────────────────────────────────────────────────────────────────
// Output data model
// ────────────────────────────────────────────────────────────────────────────

/// Every intermediate term of a score, so the UI can explain an ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitBreakdown {
    pub layout_id: String,
    pub text_penalty: f64,
    pub image_penalty: f64,
    /// 0 unless both penalties are 0.
    pub text_closeness: f64,
    pub image_closeness: f64,
    pub effective_weight: f64,
    pub cost: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap the local fitness heuristic.
pub trait FitScorer: Send + Sync {
    fn breakdown(&self, layout: &Layout, shape: ContentShape) -> FitBreakdown;

    fn score(&self, layout: &Layout, shape: ContentShape) -> f64 {
        self.breakdown(layout, shape).cost
    }
}

/// Capacity-range scorer with asymmetric under/over-fill penalties.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapacityFitScorer;

impl FitScorer for CapacityFitScorer {
    fn breakdown(&self, layout: &Layout, shape: ContentShape) -> FitBreakdown {
        let sup = &layout.supports;
        let text = shape.text_count as f64;
        let images = shape.image_count as f64;

        let text_penalty = axis_penalty(text, sup.text_min, sup.text_max);
        let image_penalty = axis_penalty(images, sup.images_min, sup.images_max);

        let (text_closeness, image_closeness) = if text_penalty + image_penalty == 0.0 {
            (
                axis_closeness(text, sup.text_min, sup.text_max),
                axis_closeness(images, sup.images_min, sup.images_max),
            )
        } else {
            (0.0, 0.0)
        };

        let raw = text_penalty + image_penalty + CLOSENESS_FACTOR * (text_closeness + image_closeness);
        let effective_weight = effective_weight(layout.weight);

        FitBreakdown {
            layout_id: layout.id.clone(),
            text_penalty,
            image_penalty,
            text_closeness,
            image_closeness,
            effective_weight,
            cost: raw / effective_weight,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Axis terms
// ────────────────────────────────────────────────────────────────────────────

fn axis_penalty(actual: f64, min: Option<f64>, max: Option<f64>) -> f64 {
    match (min, max) {
        (Some(mn), _) if actual < mn => (mn - actual) * UNDERFILL_MULTIPLIER,
        (_, Some(mx)) if actual > mx => (actual - mx) * OVERFLOW_MULTIPLIER,
        _ => 0.0,
    }
}

fn axis_closeness(actual: f64, min: Option<f64>, max: Option<f64>) -> f64 {
    match (min, max) {
        (Some(mn), Some(mx)) if mx > mn => {
            let center = (mn + mx) / 2.0;
            (actual - center).abs() / (mx - mn)
        }
        _ => 0.0,
    }
}

/// NaN weights are treated like a missing weight; everything else is floored at 0.1.
fn effective_weight(weight: f64) -> f64 {
    if weight.is_nan() {
        1.0
    } else {
        weight.max(MIN_EFFECTIVE_WEIGHT)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::model::Supports;

    fn make_layout(id: &str, supports: Supports, weight: f64) -> Layout {
        Layout {
            id: id.to_string(),
            name: id.to_string(),
            supports,
            weight,
            preview_url: None,
            frames: Default::default(),
            style: Default::default(),
        }
    }

    fn bounded(text: (u32, u32), images: (u32, u32)) -> Supports {
        Supports::new(text, images)
    }

    fn score(layout: &Layout, shape: ContentShape) -> f64 {
        CapacityFitScorer.score(layout, shape)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_score_is_deterministic() {
        let layout = make_layout("a", bounded((1, 5), (0, 2)), 0.8);
        let shape = ContentShape::new(7, 3);
        assert_eq!(score(&layout, shape), score(&layout, shape));
    }

    #[test]
    fn test_underfill_penalty_is_monotonic() {
        let layout = make_layout(
            "a",
            Supports {
                text_min: Some(3.0),
                ..Default::default()
            },
            1.0,
        );
        let costs: Vec<f64> = (0..=3)
            .map(|t| score(&layout, ContentShape::new(t, 0)))
            .collect();
        for pair in costs.windows(2) {
            assert!(pair[0] >= pair[1], "costs not non-increasing: {costs:?}");
        }
        assert!(approx(costs[0], 6.0));
        assert!(approx(costs[2], 2.0));
        assert!(approx(costs[3], 0.0));
    }

    #[test]
    fn test_overflow_penalty_uses_one_and_a_half() {
        let layout = make_layout("a", bounded((0, 2), (0, 0)), 1.0);
        let b = CapacityFitScorer.breakdown(&layout, ContentShape::new(4, 0));
        assert!(approx(b.text_penalty, 3.0));
        assert!(approx(b.cost, 3.0));
        assert_eq!(b.text_closeness, 0.0);
    }

    #[test]
    fn test_interior_fit_costs_only_closeness() {
        let layout = make_layout("a", bounded((2, 5), (0, 2)), 1.0);
        let b = CapacityFitScorer.breakdown(&layout, ContentShape::new(3, 1));
        assert_eq!(b.text_penalty + b.image_penalty, 0.0);
        // |3 - 3.5| / 3 + |1 - 1| / 2
        assert!(approx(b.text_closeness, 0.5 / 3.0));
        assert!(approx(b.image_closeness, 0.0));
        assert!(approx(b.cost, 0.5 * (0.5 / 3.0)));
    }

    #[test]
    fn test_unbounded_axis_is_neutral() {
        let layout = make_layout(
            "a",
            Supports {
                images_min: Some(0.0),
                images_max: Some(2.0),
                ..Default::default()
            },
            1.0,
        );
        let small = CapacityFitScorer.breakdown(&layout, ContentShape::new(0, 1));
        let huge = CapacityFitScorer.breakdown(&layout, ContentShape::new(1_000_000, 1));
        assert_eq!(small.text_penalty, 0.0);
        assert_eq!(huge.text_penalty, 0.0);
        assert_eq!(huge.text_closeness, 0.0);
        assert_eq!(small.cost, huge.cost);
    }

    #[test]
    fn test_single_sided_bound_contributes_no_closeness() {
        let layout = make_layout(
            "a",
            Supports {
                text_max: Some(10.0),
                ..Default::default()
            },
            1.0,
        );
        assert_eq!(score(&layout, ContentShape::new(1, 0)), 0.0);
    }

    #[test]
    fn test_degenerate_range_contributes_no_closeness() {
        let layout = make_layout("a", bounded((1, 1), (1, 1)), 1.0);
        assert_eq!(score(&layout, ContentShape::new(1, 1)), 0.0);
    }

    #[test]
    fn test_zero_counts_are_valid() {
        let layout = make_layout("a", bounded((1, 12), (0, 1)), 0.95);
        let cost = score(&layout, ContentShape::new(0, 0));
        assert!(approx(cost, 2.0 / 0.95));
    }

    #[test]
    fn test_weight_is_floored() {
        let layout = make_layout("a", bounded((0, 2), (0, 0)), 0.0);
        let b = CapacityFitScorer.breakdown(&layout, ContentShape::new(3, 0));
        assert_eq!(b.effective_weight, 0.1);
        assert!(approx(b.cost, 15.0));

        let negative = make_layout("b", bounded((0, 2), (0, 0)), -4.0);
        assert!(approx(score(&negative, ContentShape::new(3, 0)), 15.0));
    }

    #[test]
    fn test_higher_weight_lowers_cost() {
        let light = make_layout("light", bounded((0, 2), (0, 0)), 0.5);
        let heavy = make_layout("heavy", bounded((0, 2), (0, 0)), 2.0);
        let shape = ContentShape::new(4, 0);
        assert!(score(&heavy, shape) < score(&light, shape));
    }

    #[test]
    fn test_overflow_vs_centered_fit_scenario() {
        let a = make_layout("A", bounded((0, 2), (0, 0)), 1.0);
        let b = make_layout("B", bounded((3, 6), (1, 3)), 1.0);
        let shape = ContentShape::new(4, 2);

        let cost_a = score(&a, shape);
        let cost_b = score(&b, shape);
        // A: text overflow (4-2)*1.5 + image overflow (2-0)*1.5
        assert!(approx(cost_a, 6.0));
        assert!(approx(cost_b, 0.5 * (0.5 / 3.0)));
        assert!(cost_a > cost_b);
    }
}
