//! Per-node layout cache and the recursive visit wrapper.

use super::box_model::BoxModel;
use super::{LayoutContext, LayoutRequest, resolve_direction};
use crate::algorithm::round::round_value_to_pixel_grid;
use crate::enums::{Dimension, FlexDirection, MeasureMode};
use crate::layout::CachedMeasurement;
use crate::tree::NodeId;
use crate::value::floats_equal;
use log::trace;

/// Constraints of a new request along both axes, compared against a cache entry.
#[derive(Copy, Clone, Debug)]
struct CacheQuery {
    pub width_mode: MeasureMode,
    pub width: Option<f64>,
    pub height_mode: MeasureMode,
    pub height: Option<f64>,
    pub margin_row: f64,
    pub margin_column: f64,
    /// Point scale factor; zero compares raw sizes.
    pub scale: f64,
}

/// Constraint of one axis: request side and cached side.
struct AxisCheck {
    mode: MeasureMode,
    size: Option<f64>,
    margin: f64,
    last_mode: MeasureMode,
    last_size: Option<f64>,
    last_computed: f64,
}

impl AxisCheck {
    fn compatible(&self, scale: f64) -> bool {
        let round = |size: Option<f64>| {
            if scale == 0.0 {
                size
            } else {
                size.map(|value| round_value_to_pixel_grid(value, scale, false, false))
            }
        };
        let same_constraint = self.last_mode == self.mode && floats_equal(round(self.last_size), round(self.size));
        let inner = self.size.map(|size| size - self.margin);
        same_constraint
            || self.exact_matches_old(inner)
            || self.old_unspecified_still_fits(inner)
            || self.stricter_still_valid(inner)
    }

    /// An exact request equal to the old result is already satisfied.
    fn exact_matches_old(&self, inner: Option<f64>) -> bool {
        self.mode == MeasureMode::Exactly && floats_equal(inner, Some(self.last_computed))
    }

    /// An upper bound that the old unconstrained result fits under.
    fn old_unspecified_still_fits(&self, inner: Option<f64>) -> bool {
        self.mode == MeasureMode::AtMost
            && self.last_mode == MeasureMode::Undefined
            && inner.is_some_and(|size| {
                size >= self.last_computed || floats_equal(Some(size), Some(self.last_computed))
            })
    }

    /// A tighter upper bound that the old result still fits under.
    fn stricter_still_valid(&self, inner: Option<f64>) -> bool {
        let (Some(size), Some(last_size)) = (inner, self.last_size) else {
            return false;
        };
        self.last_mode == MeasureMode::AtMost
            && self.mode == MeasureMode::AtMost
            && last_size > size
            && (self.last_computed <= size
                || floats_equal(Some(size), Some(self.last_computed)))
    }
}

/// Whether a cached measurement answers a new request.
///
/// Beyond identical constraints, an entry is reused when the new exact size equals the old
/// result, when a new bound still fits an old unconstrained result, or when a tighter bound
/// still fits the old result.
fn can_use_cached_measurement(query: &CacheQuery, cached: &CachedMeasurement) -> bool {
    if cached.computed_width < 0.0 || cached.computed_height < 0.0 {
        return false;
    }
    let width = AxisCheck {
        mode: query.width_mode,
        size: query.width,
        margin: query.margin_row,
        last_mode: cached.width_mode,
        last_size: cached.available_width,
        last_computed: cached.computed_width,
    };
    let height = AxisCheck {
        mode: query.height_mode,
        size: query.height,
        margin: query.margin_column,
        last_mode: cached.height_mode,
        last_size: cached.available_height,
        last_computed: cached.computed_height,
    };
    width.compatible(query.scale) && height.compatible(query.scale)
}

/// Exact key match, used for nodes laid out by the flex algorithm itself.
fn same_constraints(request: &LayoutRequest, cached: &CachedMeasurement) -> bool {
    floats_equal(cached.available_width, request.available_width)
        && floats_equal(cached.available_height, request.available_height)
        && cached.width_mode == request.width_mode
        && cached.height_mode == request.height_mode
}

impl LayoutContext<'_> {
    /// Visit `id` under `request`, answering from its cache when possible.
    ///
    /// Returns whether the node's layout was recomputed.
    pub(super) fn layout_node(&mut self, id: NodeId, request: LayoutRequest) -> bool {
        assert!(
            request.available_width.is_some() == (request.width_mode != MeasureMode::Undefined),
            "availableWidth must be defined exactly when widthMeasureMode is constrained"
        );
        assert!(
            request.available_height.is_some() == (request.height_mode != MeasureMode::Undefined),
            "availableHeight must be defined exactly when heightMeasureMode is constrained"
        );
        let generation = self.generation;
        let node = self.tree.node_mut(id);
        let need_to_visit = (node.is_dirty && node.layout.generation_count != generation)
            || node.layout.last_owner_direction != Some(request.owner_direction);
        if need_to_visit {
            node.layout.invalidate_cache();
        }

        let cached = self.find_cached(id, &request);
        let reused = !need_to_visit && cached.is_some();
        if let Some(entry) = cached.filter(|_| reused) {
            self.tree.stats.cache_hits += 1;
            trace!(
                target: "flex_solver::cache",
                "[CACHE] hit {id:?} ({:?}) -> {}x{}",
                request.reason,
                entry.computed_width,
                entry.computed_height
            );
            let layout = self.layout_mut(id);
            layout.set_measured(Dimension::Width, entry.computed_width);
            layout.set_measured(Dimension::Height, entry.computed_height);
        } else {
            trace!(
                target: "flex_solver::cache",
                "[CACHE] miss {id:?} ({:?}) width={:?} ({:?}) height={:?} ({:?}) layout={}",
                request.reason,
                request.available_width,
                request.width_mode,
                request.available_height,
                request.height_mode,
                request.perform_layout
            );
            if request.perform_layout {
                self.tree.stats.layouts += 1;
            } else {
                self.tree.stats.measures += 1;
            }
            self.layout_impl(id, &request);
            let layout = self.layout_mut(id);
            layout.last_owner_direction = Some(request.owner_direction);
            if cached.is_none() {
                let entry = CachedMeasurement {
                    available_width: request.available_width,
                    available_height: request.available_height,
                    width_mode: request.width_mode,
                    height_mode: request.height_mode,
                    computed_width: layout.measured_or_zero(Dimension::Width),
                    computed_height: layout.measured_or_zero(Dimension::Height),
                };
                if request.perform_layout {
                    layout.cached_layout = Some(entry);
                } else {
                    layout.push_measurement(entry);
                }
            }
        }

        let node = self.tree.node_mut(id);
        if request.perform_layout {
            let width = node.layout.measured_or_zero(Dimension::Width);
            let height = node.layout.measured_or_zero(Dimension::Height);
            node.layout.set_dimension(Dimension::Width, width);
            node.layout.set_dimension(Dimension::Height, height);
            node.has_new_layout = true;
            node.is_dirty = false;
            node.subtree_dirty = false;
        }
        node.layout.generation_count = generation;
        !reused
    }

    /// Cache entry that answers `request`, if any.
    fn find_cached(&self, id: NodeId, request: &LayoutRequest) -> Option<CachedMeasurement> {
        let node = self.tree.node(id);
        let layout = &node.layout;
        if node.measure.is_some() {
            let model = BoxModel::new(
                &node.style,
                resolve_direction(node.style.direction, request.owner_direction),
            );
            let query = CacheQuery {
                width_mode: request.width_mode,
                width: request.available_width,
                height_mode: request.height_mode,
                height: request.available_height,
                margin_row: model.margin_for_axis(FlexDirection::Row, request.owner_width),
                margin_column: model.margin_for_axis(FlexDirection::Column, request.owner_width),
                scale: node.config.point_scale_factor,
            };
            return layout
                .cached_layout
                .iter()
                .chain(layout.cached_measurements())
                .find(|entry| can_use_cached_measurement(&query, entry))
                .copied();
        }
        if request.perform_layout {
            return layout
                .cached_layout
                .filter(|entry| same_constraints(request, entry));
        }
        layout
            .cached_measurements()
            .find(|entry| same_constraints(request, entry))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measured(width_mode: MeasureMode, width: Option<f64>, computed_width: f64) -> CachedMeasurement {
        CachedMeasurement {
            available_width: width,
            available_height: None,
            width_mode,
            height_mode: MeasureMode::Undefined,
            computed_width,
            computed_height: 10.0,
        }
    }

    fn query(width_mode: MeasureMode, width: Option<f64>) -> CacheQuery {
        CacheQuery {
            width_mode,
            width,
            height_mode: MeasureMode::Undefined,
            height: None,
            margin_row: 0.0,
            margin_column: 0.0,
            scale: 0.0,
        }
    }

    #[test]
    /// Identical constraints always match.
    ///
    /// # Panics
    /// Panics if an identical request misses.
    fn identical_request_hits() {
        let cached = measured(MeasureMode::Exactly, Some(100.0), 100.0);
        assert!(can_use_cached_measurement(
            &query(MeasureMode::Exactly, Some(100.0)),
            &cached
        ));
    }

    #[test]
    /// An exact request equal to the previous result reuses it.
    ///
    /// # Panics
    /// Panics if the exact-match rule is not applied.
    fn exact_request_matching_result_hits() {
        let cached = measured(MeasureMode::AtMost, Some(200.0), 40.0);
        assert!(can_use_cached_measurement(
            &query(MeasureMode::Exactly, Some(40.0)),
            &cached
        ));
        assert!(!can_use_cached_measurement(
            &query(MeasureMode::Exactly, Some(41.0)),
            &cached
        ));
    }

    #[test]
    /// A bound reuses an unconstrained result only while the result fits.
    ///
    /// # Panics
    /// Panics if the fit check is wrong.
    fn bound_over_unconstrained_result() {
        let cached = measured(MeasureMode::Undefined, None, 40.0);
        assert!(can_use_cached_measurement(
            &query(MeasureMode::AtMost, Some(50.0)),
            &cached
        ));
        assert!(!can_use_cached_measurement(
            &query(MeasureMode::AtMost, Some(30.0)),
            &cached
        ));
    }

    #[test]
    /// A tighter bound reuses the result while it still fits; a looser one does not.
    ///
    /// # Panics
    /// Panics if the stricter-bound rule is wrong.
    fn tighter_bound_still_valid() {
        let cached = measured(MeasureMode::AtMost, Some(100.0), 40.0);
        assert!(can_use_cached_measurement(
            &query(MeasureMode::AtMost, Some(60.0)),
            &cached
        ));
        assert!(!can_use_cached_measurement(
            &query(MeasureMode::AtMost, Some(30.0)),
            &cached
        ));
        assert!(!can_use_cached_measurement(
            &query(MeasureMode::AtMost, Some(150.0)),
            &cached
        ));
    }

    #[test]
    /// With a scale factor, sizes that snap to the same pixel count as equal.
    ///
    /// # Panics
    /// Panics if rounded comparison is not applied.
    fn rounded_comparison_with_scale() {
        let cached = measured(MeasureMode::Exactly, Some(100.2), 100.2);
        let mut request = query(MeasureMode::Exactly, Some(99.9));
        request.scale = 1.0;
        assert!(can_use_cached_measurement(&request, &cached));
    }
}
