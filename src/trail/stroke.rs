// Imports from other modules
use super::hermite::HermiteInterpolator;
use crate::config::TrailParams;

pub const PREVIEW_CAPACITY: usize = 256;

/// Growing buffer of trail points owned by the trail consumer. Interpolation
/// rewrites the tail of the buffer starting at the last segment, so writes
/// go through `set_at` which either overwrites or extends.
#[derive(Debug, Default, Clone)]
pub struct TrailPoints {
    pub event_times: Vec<i32>,
    pub x_coordinates: Vec<i32>,
    pub y_coordinates: Vec<i32>,
}

impl TrailPoints {
    pub fn with_capacity(capacity: usize) -> TrailPoints {
        TrailPoints {
            event_times: Vec::with_capacity(capacity),
            x_coordinates: Vec::with_capacity(capacity),
            y_coordinates: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.event_times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.event_times.is_empty()
    }

    fn push(&mut self, time: i32, x: i32, y: i32) {
        self.event_times.push(time);
        self.x_coordinates.push(x);
        self.y_coordinates.push(y);
    }

    fn set_at(&mut self, index: usize, time: i32, x: i32, y: i32) {
        put(&mut self.event_times, index, time);
        put(&mut self.x_coordinates, index, x);
        put(&mut self.y_coordinates, index, y);
    }
}

fn put(values: &mut Vec<i32>, index: usize, value: i32) {
    if index < values.len() {
        values[index] = value;
    } else {
        values.resize(index, 0);
        values.push(value);
    }
}

/// Holds the sampled points of one stroke for trail consumption and
/// produces interpolated points between them incrementally: each call only
/// derives the newest unresolved segments, and the final segment stays
/// eligible for recomputation because its trailing tangent neighbor may not
/// have existed yet when it was first computed.
pub struct StrokeTrailPoints {
    params: TrailParams,

    preview_event_times: Vec<i32>,
    preview_x_coordinates: Vec<i32>,
    preview_y_coordinates: Vec<i32>,

    stroke_id: u32,
    last_preview_size: usize,
    last_interpolated_preview_index: usize,

    last_x: i32,
    last_y: i32,
    distance_from_last_sample: f64,
}

impl StrokeTrailPoints {
    pub fn new(params: TrailParams) -> StrokeTrailPoints {
        StrokeTrailPoints {
            params,
            preview_event_times: Vec::with_capacity(PREVIEW_CAPACITY),
            preview_x_coordinates: Vec::with_capacity(PREVIEW_CAPACITY),
            preview_y_coordinates: Vec::with_capacity(PREVIEW_CAPACITY),
            stroke_id: 0,
            last_preview_size: 0,
            last_interpolated_preview_index: 0,
            last_x: 0,
            last_y: 0,
            distance_from_last_sample: 0.0,
        }
    }

    fn reset(&mut self) {
        self.stroke_id += 1;
        self.last_preview_size = 0;
        self.last_interpolated_preview_index = 0;
        self.preview_event_times.clear();
        self.preview_x_coordinates.clear();
        self.preview_y_coordinates.clear();
    }

    /// Changes on every down event; consumers use it to detect that their
    /// buffered trail belongs to an older stroke.
    pub fn gesture_stroke_id(&self) -> u32 {
        self.stroke_id
    }

    pub fn on_down_event(&mut self, x: i32, y: i32, elapsed_time_since_first_down: i32) {
        self.reset();
        self.on_move_event(x, y, elapsed_time_since_first_down);
    }

    fn needs_sampling(&mut self, x: i32, y: i32) -> bool {
        self.distance_from_last_sample += f64::from(x - self.last_x).hypot(f64::from(y - self.last_y));
        self.last_x = x;
        self.last_y = y;
        let is_down_event = self.preview_event_times.is_empty();
        if self.distance_from_last_sample >= self.params.min_sampling_distance || is_down_event {
            self.distance_from_last_sample = 0.0;
            return true;
        }
        false
    }

    pub fn on_move_event(&mut self, x: i32, y: i32, elapsed_time_since_first_down: i32) {
        if self.needs_sampling(x, y) {
            self.preview_event_times.push(elapsed_time_since_first_down);
            self.preview_x_coordinates.push(x);
            self.preview_y_coordinates.push(y);
        }
    }

    /// Append the sampled preview points that arrived since the last call.
    pub fn append_preview_stroke(&mut self, out: &mut TrailPoints) {
        if self.preview_event_times.len() <= self.last_preview_size {
            return;
        }
        for i in self.last_preview_size..self.preview_event_times.len() {
            out.push(
                self.preview_event_times[i],
                self.preview_x_coordinates[i],
                self.preview_y_coordinates[i],
            );
        }
        self.last_preview_size = self.preview_event_times.len();
    }

    /// Interpolate between the last interpolated point and the end of the
    /// stroke, rewriting `out` from `last_interpolated_index` onwards.
    /// Sharply turning or long spans get subdivided more, up to the
    /// configured segment maximum.
    ///
    /// Returns the start index of the last interpolated segment of `out`.
    /// The caller has to pass that index back in on the next call, because
    /// the last segment has to be recomputed once its trailing tangent
    /// neighbor exists.
    pub fn interpolate_stroke(
        &mut self,
        last_interpolated_index: usize,
        out: &mut TrailPoints,
    ) -> usize {
        let size = self.preview_event_times.len();
        let pt = &self.preview_event_times;
        let px = &self.preview_x_coordinates;
        let py = &self.preview_y_coordinates;
        let mut interpolator = HermiteInterpolator::new(px, py, 0, size as i32);

        let mut last_interpolated_draw_index = last_interpolated_index;
        let mut last_interpolated_preview_index = self.last_interpolated_preview_index;
        let mut d1 = last_interpolated_index;
        for p2 in (self.last_interpolated_preview_index + 1)..size {
            let p1 = p2 - 1;
            let p0 = p1 as i32 - 1;
            let p3 = p2 + 1;
            last_interpolated_preview_index = p1;
            last_interpolated_draw_index = d1;
            interpolator.set_interval(p0, p1 as i32, p2 as i32, p3 as i32);
            let m1 = f64::from(interpolator.slope1y).atan2(f64::from(interpolator.slope1x));
            let m2 = f64::from(interpolator.slope2y).atan2(f64::from(interpolator.slope2x));
            let delta_angle = angular_diff(m2, m1).abs();
            let segments_by_angle =
                (delta_angle / self.params.max_interpolation_angular_threshold).ceil() as usize;
            let delta_distance = f64::from(interpolator.p1x - interpolator.p2x)
                .hypot(f64::from(interpolator.p1y - interpolator.p2y));
            let segments_by_distance =
                (delta_distance / self.params.max_interpolation_distance_threshold).ceil() as usize;
            let segments = self
                .params
                .max_interpolation_segments
                .min(segments_by_angle.max(segments_by_distance));
            let t1 = out.event_times[d1];
            let dt = pt[p2] - pt[p1];
            d1 += 1;
            for i in 1..segments {
                let t = i as f32 / segments as f32;
                let (x, y) = interpolator.interpolate(t);
                out.set_at(d1, (dt as f32 * t) as i32 + t1, x as i32, y as i32);
                d1 += 1;
            }
            out.set_at(d1, pt[p2], px[p2], py[p2]);
        }
        self.last_interpolated_preview_index = last_interpolated_preview_index;
        last_interpolated_draw_index
    }
}

const TWO_PI: f64 = std::f64::consts::PI * 2.0;

/// The angular rotation from `a0` to `a1`, normalized to [-PI, +PI].
fn angular_diff(a1: f64, a0: f64) -> f64 {
    let mut delta_angle = a1 - a0;
    while delta_angle > std::f64::consts::PI {
        delta_angle -= TWO_PI;
    }
    while delta_angle < -std::f64::consts::PI {
        delta_angle += TWO_PI;
    }
    delta_angle
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corner_stroke() -> StrokeTrailPoints {
        let mut stroke = StrokeTrailPoints::new(TrailParams::default());
        stroke.on_down_event(0, 0, 0);
        stroke.on_move_event(10, 0, 10);
        stroke.on_move_event(10, 10, 20);
        stroke
    }

    #[test]
    fn stroke_id_changes_per_down_event() {
        let mut stroke = StrokeTrailPoints::new(TrailParams::default());
        let first = stroke.gesture_stroke_id();
        stroke.on_down_event(0, 0, 0);
        let second = stroke.gesture_stroke_id();
        stroke.on_down_event(5, 5, 0);
        assert_ne!(first, second);
        assert_ne!(second, stroke.gesture_stroke_id());
    }

    #[test]
    fn sampling_distance_decimates_preview_points() {
        let params = TrailParams {
            min_sampling_distance: 8.0,
            ..TrailParams::default()
        };
        let mut stroke = StrokeTrailPoints::new(params);
        stroke.on_down_event(0, 0, 0);
        stroke.on_move_event(3, 0, 5);
        stroke.on_move_event(6, 0, 10);
        // 9px of accumulated travel crosses the 8px threshold.
        stroke.on_move_event(9, 0, 15);
        let mut out = TrailPoints::default();
        stroke.append_preview_stroke(&mut out);
        assert_eq!(out.len(), 2);
        assert_eq!(out.x_coordinates, vec![0, 9]);
    }

    #[test]
    fn right_angle_turn_is_subdivided_to_the_segment_cap() {
        let mut stroke = corner_stroke();
        let mut out = TrailPoints::default();
        stroke.append_preview_stroke(&mut out);
        assert_eq!(out.len(), 3);
        let last_segment_start = stroke.interpolate_stroke(0, &mut out);
        // Two spans, each expanded into 4 segments: 1 + 4 + 4 points.
        assert_eq!(out.len(), 9);
        assert_eq!(last_segment_start, 4);
        // The sampled endpoints survive interpolation exactly.
        assert_eq!(
            (out.x_coordinates[0], out.y_coordinates[0], out.event_times[0]),
            (0, 0, 0)
        );
        assert_eq!(
            (out.x_coordinates[4], out.y_coordinates[4], out.event_times[4]),
            (10, 0, 10)
        );
        assert_eq!(
            (out.x_coordinates[8], out.y_coordinates[8], out.event_times[8]),
            (10, 10, 20)
        );
        assert!(out.event_times.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn last_segment_is_recomputed_when_the_stroke_grows() {
        let mut stroke = corner_stroke();
        let mut out = TrailPoints::default();
        stroke.append_preview_stroke(&mut out);
        let last_segment_start = stroke.interpolate_stroke(0, &mut out);
        assert_eq!(last_segment_start, 4);

        stroke.on_move_event(0, 10, 30);
        stroke.append_preview_stroke(&mut out);
        // The previous last segment is rewritten with its now-known
        // trailing neighbor, then the new last segment is appended.
        let last_segment_start = stroke.interpolate_stroke(last_segment_start, &mut out);
        assert_eq!(last_segment_start, 8);
        assert_eq!(out.len(), 13);
        let last = out.len() - 1;
        assert_eq!(
            (out.x_coordinates[last], out.y_coordinates[last], out.event_times[last]),
            (0, 10, 30)
        );
    }

    #[test]
    fn straight_slow_stroke_needs_no_subdivision() {
        // A finite distance threshold well above the span length, so only
        // the angular criterion could force subdivision.
        let params = TrailParams {
            max_interpolation_distance_threshold: 1000.0,
            ..TrailParams::default()
        };
        let mut stroke = StrokeTrailPoints::new(params);
        stroke.on_down_event(0, 0, 0);
        stroke.on_move_event(10, 0, 10);
        stroke.on_move_event(20, 0, 20);
        stroke.on_move_event(30, 0, 30);
        let mut out = TrailPoints::default();
        stroke.append_preview_stroke(&mut out);
        stroke.interpolate_stroke(0, &mut out);
        // Collinear points produce zero angular difference, so every span
        // keeps its single segment.
        assert_eq!(out.len(), 4);
        assert_eq!(out.x_coordinates, vec![0, 10, 20, 30]);
    }
}
