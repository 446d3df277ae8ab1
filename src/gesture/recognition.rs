// Imports from other modules
use crate::config::RecognitionParams;
use crate::points::InputPointers;
use crate::DEFAULT_GESTURE_POINTS_CAPACITY;

/// The height of the extra area above the keyboard in which a gesture may
/// still travel. Proportional to the keyboard height.
pub const EXTRA_GESTURE_TRAIL_AREA_ABOVE_KEYBOARD_RATIO: f32 = 0.25;

const MSEC_PER_SEC: i32 = 1000;

/// Ingests the raw touch samples of one pointer and decides whether the
/// motion constitutes gesture input, which samples are worth keeping, and
/// how many of the kept samples are stable enough to hand to a decoder
/// before the stroke finishes.
pub struct StrokeRecognizer {
    pointer_id: i32,
    params: RecognitionParams,

    event_times: Vec<i32>,
    x_coordinates: Vec<i32>,
    y_coordinates: Vec<i32>,

    key_width: i32,
    min_y_coordinate: i32,
    max_y_coordinate: i32,
    // Static threshold for starting gesture detection, in pixel/sec.
    detect_fast_move_speed_threshold: i32,
    detect_fast_move_time: i32,
    detect_fast_move_x: i32,
    detect_fast_move_y: i32,
    // Dynamic threshold for gesture after fast typing.
    after_fast_typing: bool,
    dynamic_distance_threshold_from: i32, // pixel
    dynamic_distance_threshold_to: i32,   // pixel
    // Gesture sampling.
    sampling_minimum_distance: i32, // pixel
    last_major_event_time: i32,
    last_major_event_x: i32,
    last_major_event_y: i32,
    // Gesture recognition.
    recognition_speed_threshold: i32, // pixel/sec
    incremental_recognition_size: usize,
    last_incremental_batch_size: usize,
}

impl StrokeRecognizer {
    pub fn new(pointer_id: i32, params: RecognitionParams) -> StrokeRecognizer {
        StrokeRecognizer {
            pointer_id,
            params,
            event_times: Vec::with_capacity(DEFAULT_GESTURE_POINTS_CAPACITY),
            x_coordinates: Vec::with_capacity(DEFAULT_GESTURE_POINTS_CAPACITY),
            y_coordinates: Vec::with_capacity(DEFAULT_GESTURE_POINTS_CAPACITY),
            key_width: 0,
            min_y_coordinate: 0,
            max_y_coordinate: 0,
            detect_fast_move_speed_threshold: 0,
            detect_fast_move_time: 0,
            detect_fast_move_x: 0,
            detect_fast_move_y: 0,
            after_fast_typing: false,
            dynamic_distance_threshold_from: 0,
            dynamic_distance_threshold_to: 0,
            sampling_minimum_distance: 0,
            last_major_event_time: 0,
            last_major_event_x: 0,
            last_major_event_y: 0,
            recognition_speed_threshold: 0,
            incremental_recognition_size: 0,
            last_incremental_batch_size: 0,
        }
    }

    /// Recompute the pixel-space thresholds from the keyWidth-relative
    /// parameters. Must be called before the first event point; a geometry
    /// change resets the derived thresholds but not the recognizer state.
    pub fn set_keyboard_geometry(&mut self, key_width: i32, keyboard_height: i32) {
        self.key_width = key_width;
        self.min_y_coordinate =
            -((keyboard_height as f32 * EXTRA_GESTURE_TRAIL_AREA_ABOVE_KEYBOARD_RATIO) as i32);
        self.max_y_coordinate = keyboard_height;
        let key_width = key_width as f32;
        self.detect_fast_move_speed_threshold =
            (key_width * self.params.detect_fast_move_speed_threshold) as i32;
        self.dynamic_distance_threshold_from =
            (key_width * self.params.dynamic_distance_threshold_from) as i32;
        self.dynamic_distance_threshold_to =
            (key_width * self.params.dynamic_distance_threshold_to) as i32;
        self.sampling_minimum_distance =
            (key_width * self.params.sampling_minimum_distance) as i32;
        self.recognition_speed_threshold =
            (key_width * self.params.recognition_speed_threshold) as i32;
    }

    pub fn length(&self) -> usize {
        self.event_times.len()
    }

    /// Start a new stroke at the down event. When the down event follows a
    /// letter press closely enough, the gesture-start thresholds are relaxed
    /// and then decay over the configured decay window, so a user who just
    /// finished fast typing does not trigger a gesture by accident.
    pub fn add_down_event_point(
        &mut self,
        x: i32,
        y: i32,
        elapsed_time_since_first_down: i32,
        elapsed_time_since_last_typing: i32,
    ) {
        self.reset();
        if elapsed_time_since_last_typing < self.params.static_time_threshold_after_fast_typing {
            self.after_fast_typing = true;
        }
        debug!(
            "[{}] down event: dT={}{}",
            self.pointer_id,
            elapsed_time_since_last_typing,
            if self.after_fast_typing { " afterFastTyping" } else { "" }
        );
        // Record the down event point as a major event point.
        self.add_event_point(x, y, elapsed_time_since_first_down, true);
    }

    fn dynamic_distance_threshold(&self, delta_time: i32) -> i32 {
        if !self.after_fast_typing || delta_time >= self.params.dynamic_threshold_decay_duration {
            return self.dynamic_distance_threshold_to;
        }
        let decayed = (self.dynamic_distance_threshold_from - self.dynamic_distance_threshold_to)
            * delta_time
            / self.params.dynamic_threshold_decay_duration;
        self.dynamic_distance_threshold_from - decayed
    }

    fn dynamic_time_threshold(&self, delta_time: i32) -> i32 {
        if !self.after_fast_typing || delta_time >= self.params.dynamic_threshold_decay_duration {
            return self.params.dynamic_time_threshold_to;
        }
        let decayed = (self.params.dynamic_time_threshold_from
            - self.params.dynamic_time_threshold_to)
            * delta_time
            / self.params.dynamic_threshold_decay_duration;
        self.params.dynamic_time_threshold_from - decayed
    }

    /// Whether the motion recorded so far constitutes the start of a
    /// gesture: a fast move has been detected, and both the elapsed time and
    /// the traveled distance from the fast-move anchor exceed the (possibly
    /// still decaying) dynamic thresholds.
    pub fn is_start_of_a_gesture(&self) -> bool {
        if !self.has_detected_fast_move() {
            return false;
        }
        let size = self.length();
        if size == 0 {
            return false;
        }
        let last_index = size - 1;
        let delta_time = self.event_times[last_index] - self.detect_fast_move_time;
        if delta_time < 0 {
            return false;
        }
        let delta_distance = distance(
            self.x_coordinates[last_index],
            self.y_coordinates[last_index],
            self.detect_fast_move_x,
            self.detect_fast_move_y,
        );
        let distance_threshold = self.dynamic_distance_threshold(delta_time);
        let time_threshold = self.dynamic_time_threshold(delta_time);
        let is_start_of_a_gesture =
            delta_time >= time_threshold && delta_distance >= distance_threshold;
        debug!(
            "[{}] isStartOfAGesture: dT={} tT={} dD={} tD={}{}",
            self.pointer_id,
            delta_time,
            time_threshold,
            delta_distance,
            distance_threshold,
            if is_start_of_a_gesture { " startOfAGesture" } else { "" }
        );
        is_start_of_a_gesture
    }

    /// Synthesize a repeated sample at the last known position with a new
    /// time. This keeps a stationary-but-still-down finger feeding periodic
    /// updates to the decoder.
    pub fn duplicate_last_point_with(&mut self, time: i32) {
        if let Some(last_index) = self.length().checked_sub(1) {
            let x = self.x_coordinates[last_index];
            let y = self.y_coordinates[last_index];
            self.append_point(x, y, time);
            self.update_incremental_recognition_size(x, y, time);
        }
    }

    fn reset(&mut self) {
        self.incremental_recognition_size = 0;
        self.last_incremental_batch_size = 0;
        self.event_times.clear();
        self.x_coordinates.clear();
        self.y_coordinates.clear();
        self.last_major_event_time = 0;
        self.detect_fast_move_time = 0;
        self.after_fast_typing = false;
    }

    fn append_point(&mut self, x: i32, y: i32, time: i32) {
        // A point that was synthesized by duplicate_last_point_with may have
        // a later event time than the next real touch event. To maintain the
        // monotonicity of the event time, drop the successive point here.
        if let Some(last_index) = self.length().checked_sub(1) {
            if self.event_times[last_index] > time {
                warn!(
                    "[{}] drop stale event: {},{}|{} last: {},{}|{}",
                    self.pointer_id,
                    x,
                    y,
                    time,
                    self.x_coordinates[last_index],
                    self.y_coordinates[last_index],
                    self.event_times[last_index]
                );
                return;
            }
        }
        self.event_times.push(time);
        self.x_coordinates.push(x);
        self.y_coordinates.push(y);
    }

    fn update_major_event(&mut self, x: i32, y: i32, time: i32) {
        self.last_major_event_time = time;
        self.last_major_event_x = x;
        self.last_major_event_y = y;
    }

    fn has_detected_fast_move(&self) -> bool {
        self.detect_fast_move_time > 0
    }

    // Latches the time and position of the first sample whose speed relative
    // to the previous sample exceeds the detection threshold. Latched at most
    // once per stroke. Returns the distance from the last kept sample.
    fn detect_fast_move(&mut self, x: i32, y: i32, time: i32) -> i32 {
        let last_index = self.length() - 1;
        let last_x = self.x_coordinates[last_index];
        let last_y = self.y_coordinates[last_index];
        let dist = distance(last_x, last_y, x, y);
        let msecs = time - self.event_times[last_index];
        if msecs > 0 {
            let pixels_per_sec = dist * MSEC_PER_SEC;
            // Equivalent to (pixels / msecs > threshold / MSEC_PER_SEC)
            // without the integer division.
            if !self.has_detected_fast_move()
                && pixels_per_sec > self.detect_fast_move_speed_threshold * msecs
            {
                debug!(
                    "[{}] detect fast move: T={} points={}",
                    self.pointer_id,
                    time,
                    self.length()
                );
                self.detect_fast_move_time = time;
                self.detect_fast_move_x = x;
                self.detect_fast_move_y = y;
            }
        }
        dist
    }

    /// Add an event point to this stroke. The very first sample is always
    /// kept; later samples are kept only when they moved far enough from the
    /// last kept sample. Returns true if the event point lies in the valid
    /// gesture band of the keyboard.
    pub fn add_event_point(&mut self, x: i32, y: i32, time: i32, is_major_event: bool) -> bool {
        if self.length() == 0 {
            // The first event of this stroke (a.k.a. down event).
            self.append_point(x, y, time);
            self.update_major_event(x, y, time);
        } else {
            let dist = self.detect_fast_move(x, y, time);
            if dist > self.sampling_minimum_distance {
                self.append_point(x, y, time);
            }
        }
        if is_major_event {
            self.update_incremental_recognition_size(x, y, time);
            self.update_major_event(x, y, time);
        }
        y >= self.min_y_coordinate && y < self.max_y_coordinate
    }

    // When the pointer moves slowly enough around a sample, the whole kept
    // prefix becomes eligible for incremental recognition.
    fn update_incremental_recognition_size(&mut self, x: i32, y: i32, time: i32) {
        let msecs = time - self.last_major_event_time;
        if msecs <= 0 {
            return;
        }
        let pixels = distance(self.last_major_event_x, self.last_major_event_y, x, y);
        let pixels_per_sec = pixels * MSEC_PER_SEC;
        // Equivalent to (pixels / msecs < threshold / MSEC_PER_SEC).
        if pixels_per_sec < self.recognition_speed_threshold * msecs {
            self.incremental_recognition_size = self.length();
        }
    }

    /// Debounce for decoder invocations.
    pub fn has_recognition_time_past(&self, current_time: i64, last_recognition_time: i64) -> bool {
        current_time > last_recognition_time + i64::from(self.params.recognition_minimum_time)
    }

    /// Copy every kept sample that has not been handed out yet.
    pub fn append_all_batch_points(&mut self, out: &mut InputPointers) {
        self.append_batch_points(out, self.length());
    }

    /// Copy the newly recognized samples, i.e. the kept samples up to the
    /// incremental recognition cursor that have not been handed out yet.
    pub fn append_incremental_batch_points(&mut self, out: &mut InputPointers) {
        self.append_batch_points(out, self.incremental_recognition_size);
    }

    fn append_batch_points(&mut self, out: &mut InputPointers, size: usize) {
        if size <= self.last_incremental_batch_size {
            return;
        }
        let length = size - self.last_incremental_batch_size;
        out.append(
            self.pointer_id,
            &self.event_times,
            &self.x_coordinates,
            &self.y_coordinates,
            self.last_incremental_batch_size,
            length,
        );
        self.last_incremental_batch_size = size;
    }
}

fn distance(x1: i32, y1: i32, x2: i32, y2: i32) -> i32 {
    f64::from(x1 - x2).hypot(f64::from(y1 - y2)) as i32
}
