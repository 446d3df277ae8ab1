// Imports from other crates
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

// Imports from other modules
use super::recognition::StrokeRecognizer;
use crate::config::RecognitionParams;
use crate::points::InputPointers;
use crate::DEFAULT_GESTURE_POINTS_CAPACITY;

/// Callbacks toward the decoder-facing layer. All notifications are
/// fire-and-forget and invoked synchronously within the call that triggered
/// them; implementations should be short and must not call back into the
/// arbiter.
pub trait BatchInputListener {
    fn on_start_batch_input(&mut self);
    fn on_update_batch_input(&mut self, aggregated_pointers: &mut InputPointers, move_event_time: i64);
    fn on_start_update_batch_input_timer(&mut self);
    fn on_end_batch_input(&mut self, aggregated_pointers: &mut InputPointers, up_event_time: i64);
}

struct Aggregate {
    pointers: InputPointers,
    last_recognition_point_size: usize,
    last_recognition_time: i64,
}

/// State shared by every pointer of one keyboard view for the duration of a
/// gesture input session. Only one gesture session exists per keyboard view:
/// simultaneous strokes from different fingers feed into the same batch.
/// The session is created by whoever manages the keyboard view and a handle
/// to it is given to each arbiter, which makes that single-session
/// invariant an ownership fact instead of a hidden global.
pub struct GestureSession {
    // Touched from the event dispatch and from timer callbacks, hence the
    // lock around every read/mutate sequence.
    aggregate: Mutex<Aggregate>,
    // The time of the first stroke's down event of the gesture.
    first_down_time: AtomicI64,
}

impl Default for GestureSession {
    fn default() -> GestureSession {
        GestureSession::new()
    }
}

impl GestureSession {
    pub fn new() -> GestureSession {
        GestureSession {
            aggregate: Mutex::new(Aggregate {
                pointers: InputPointers::with_capacity(DEFAULT_GESTURE_POINTS_CAPACITY),
                last_recognition_point_size: 0,
                last_recognition_time: 0,
            }),
            first_down_time: AtomicI64::new(0),
        }
    }

    /// Elapsed milliseconds from the first gesture down to `event_time`.
    pub fn elapsed_time_since_first_down(&self, event_time: i64) -> i32 {
        (event_time - self.first_down_time.load(Ordering::Relaxed)) as i32
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Aggregate> {
        // A poisoned lock means a listener panicked mid-callback; there is
        // no state to salvage at that point.
        self.aggregate.lock().expect("gesture session lock poisoned")
    }
}

/// Arbitrates batch input for one pointer. Holds that pointer's
/// `StrokeRecognizer` and merges its kept samples into the shared session
/// aggregate, so strokes gestured by multiple fingers end up in one batch.
pub struct BatchInputArbiter {
    recognition_points: StrokeRecognizer,
    session: Arc<GestureSession>,
}

impl BatchInputArbiter {
    pub fn new(
        pointer_id: i32,
        params: RecognitionParams,
        session: Arc<GestureSession>,
    ) -> BatchInputArbiter {
        BatchInputArbiter {
            recognition_points: StrokeRecognizer::new(pointer_id, params),
            session,
        }
    }

    pub fn set_keyboard_geometry(&mut self, key_width: i32, keyboard_height: i32) {
        self.recognition_points
            .set_keyboard_geometry(key_width, keyboard_height);
    }

    pub fn elapsed_time_since_first_down(&self, event_time: i64) -> i32 {
        self.session.elapsed_time_since_first_down(event_time)
    }

    /// Add a down event point. The first pointer going down marks the start
    /// time of the whole gesture.
    pub fn add_down_event_point(
        &mut self,
        x: i32,
        y: i32,
        down_event_time: i64,
        last_letter_typing_time: i64,
        active_pointer_count: usize,
    ) {
        if active_pointer_count == 1 {
            self.session
                .first_down_time
                .store(down_event_time, Ordering::Relaxed);
        }
        let elapsed_time_since_first_down = self.elapsed_time_since_first_down(down_event_time);
        let elapsed_time_since_last_typing = (down_event_time - last_letter_typing_time) as i32;
        self.recognition_points.add_down_event_point(
            x,
            y,
            elapsed_time_since_first_down,
            elapsed_time_since_last_typing,
        );
    }

    /// Add a move event point. When the recognizer actually kept the sample,
    /// `on_start_update_batch_input_timer` fires so the caller can
    /// (re)schedule its polling timer. Returns true if the event point lies
    /// in the valid gesture area.
    pub fn add_move_event_point(
        &mut self,
        x: i32,
        y: i32,
        move_event_time: i64,
        is_major_event: bool,
        listener: &mut impl BatchInputListener,
    ) -> bool {
        let before_length = self.recognition_points.length();
        let on_valid_area = self.recognition_points.add_event_point(
            x,
            y,
            self.session.elapsed_time_since_first_down(move_event_time),
            is_major_event,
        );
        if self.recognition_points.length() > before_length {
            listener.on_start_update_batch_input_timer();
        }
        on_valid_area
    }

    /// Determine whether batch input has started. When the recognizer sees
    /// the start of a gesture, the shared aggregate is reset and
    /// `on_start_batch_input` fires.
    pub fn may_start_batch_input(&mut self, listener: &mut impl BatchInputListener) -> bool {
        if !self.recognition_points.is_start_of_a_gesture() {
            return false;
        }
        let mut aggregate = self.session.lock();
        aggregate.pointers.reset();
        aggregate.last_recognition_point_size = 0;
        aggregate.last_recognition_time = 0;
        listener.on_start_batch_input();
        true
    }

    /// Add a synthetic move event point and update the batch input. This is
    /// how a stationary-but-still-down finger keeps feeding low-frequency
    /// updates to the decoder.
    pub fn update_batch_input_by_timer(
        &mut self,
        synthetic_move_event_time: i64,
        listener: &mut impl BatchInputListener,
    ) {
        self.recognition_points.duplicate_last_point_with(
            self.session
                .elapsed_time_since_first_down(synthetic_move_event_time),
        );
        self.update_batch_input(synthetic_move_event_time, listener);
    }

    /// Determine whether there are enough new gesture points for another
    /// decoder lookup. `on_update_batch_input` fires only when the aggregate
    /// grew and the recognition debounce has passed, and the timer is then
    /// re-armed via `on_start_update_batch_input_timer`.
    pub fn update_batch_input(
        &mut self,
        move_event_time: i64,
        listener: &mut impl BatchInputListener,
    ) {
        let mut aggregate = self.session.lock();
        self.recognition_points
            .append_incremental_batch_points(&mut aggregate.pointers);
        let size = aggregate.pointers.len();
        if size > aggregate.last_recognition_point_size
            && self
                .recognition_points
                .has_recognition_time_past(move_event_time, aggregate.last_recognition_time)
        {
            listener.on_update_batch_input(&mut aggregate.pointers, move_event_time);
            listener.on_start_update_batch_input_timer();
            // The listener may change the size of the pointers (when
            // auto-committing for example), so the size has to be re-read.
            aggregate.last_recognition_point_size = aggregate.pointers.len();
            aggregate.last_recognition_time = move_event_time;
        }
    }

    /// Determine whether batch input has ended or continues. Remaining
    /// points are always flushed to the aggregate; `on_end_batch_input`
    /// fires only for the up event of the last active pointer.
    pub fn may_end_batch_input(
        &mut self,
        up_event_time: i64,
        active_pointer_count: usize,
        listener: &mut impl BatchInputListener,
    ) -> bool {
        let mut aggregate = self.session.lock();
        self.recognition_points
            .append_all_batch_points(&mut aggregate.pointers);
        if active_pointer_count == 1 {
            listener.on_end_batch_input(&mut aggregate.pointers, up_event_time);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingListener {
        started: usize,
        updated: usize,
        ended: usize,
        timer_armed: usize,
        last_snapshot: Vec<(i32, i32)>,
        last_times: Vec<i32>,
    }

    impl BatchInputListener for RecordingListener {
        fn on_start_batch_input(&mut self) {
            self.started += 1;
        }

        fn on_update_batch_input(&mut self, pointers: &mut InputPointers, _move_event_time: i64) {
            self.updated += 1;
            self.snapshot(pointers);
        }

        fn on_start_update_batch_input_timer(&mut self) {
            self.timer_armed += 1;
        }

        fn on_end_batch_input(&mut self, pointers: &mut InputPointers, _up_event_time: i64) {
            self.ended += 1;
            self.snapshot(pointers);
        }
    }

    impl RecordingListener {
        fn snapshot(&mut self, pointers: &InputPointers) {
            self.last_snapshot = pointers
                .x_coordinates()
                .iter()
                .zip(pointers.y_coordinates())
                .map(|(&x, &y)| (x, y))
                .collect();
            self.last_times = pointers.times().to_vec();
        }
    }

    fn geometry(arbiter: &mut BatchInputArbiter) {
        arbiter.set_keyboard_geometry(60, 300);
    }

    // Drives one pointer through a fast horizontal swipe with slow tail
    // samples so everything becomes incrementally recognized.
    fn swipe(
        arbiter: &mut BatchInputArbiter,
        listener: &mut RecordingListener,
        start_time: i64,
        y: i32,
        active_pointers: usize,
    ) {
        arbiter.add_down_event_point(100, y, start_time, 0, active_pointers);
        arbiter.add_move_event_point(220, y, start_time + 20, true, listener);
        arbiter.add_move_event_point(320, y, start_time + 60, true, listener);
        assert!(arbiter.may_start_batch_input(listener));
    }

    #[test]
    fn timer_fires_only_when_a_point_was_kept() {
        let session = Arc::new(GestureSession::new());
        let mut arbiter = BatchInputArbiter::new(0, RecognitionParams::default(), Arc::clone(&session));
        geometry(&mut arbiter);
        let mut listener = RecordingListener::default();
        arbiter.add_down_event_point(100, 100, 0, 0, 1);
        // 2px of travel is decimated away, so the timer stays untouched.
        arbiter.add_move_event_point(102, 100, 10, true, &mut listener);
        assert_eq!(listener.timer_armed, 0);
        arbiter.add_move_event_point(200, 100, 30, true, &mut listener);
        assert_eq!(listener.timer_armed, 1);
    }

    #[test]
    fn batch_starts_once_the_gesture_is_recognized() {
        let session = Arc::new(GestureSession::new());
        let mut arbiter = BatchInputArbiter::new(0, RecognitionParams::default(), Arc::clone(&session));
        geometry(&mut arbiter);
        let mut listener = RecordingListener::default();
        arbiter.add_down_event_point(100, 100, 1000, 0, 1);
        assert!(!arbiter.may_start_batch_input(&mut listener));
        assert_eq!(listener.started, 0);
        arbiter.add_move_event_point(220, 100, 1020, true, &mut listener);
        arbiter.add_move_event_point(320, 100, 1060, true, &mut listener);
        assert!(arbiter.may_start_batch_input(&mut listener));
        assert_eq!(listener.started, 1);
    }

    #[test]
    fn update_is_debounced_by_recognition_time() {
        let session = Arc::new(GestureSession::new());
        let mut arbiter = BatchInputArbiter::new(0, RecognitionParams::default(), Arc::clone(&session));
        geometry(&mut arbiter);
        let mut listener = RecordingListener::default();
        swipe(&mut arbiter, &mut listener, 1000, 100, 1);
        // A slow move makes the prefix recognizable.
        arbiter.add_move_event_point(335, 100, 1600, true, &mut listener);
        arbiter.update_batch_input(1600, &mut listener);
        assert_eq!(listener.updated, 1);
        // Another slow move right away: aggregate grows but the debounce
        // (100ms) has not passed yet.
        arbiter.add_move_event_point(350, 100, 1650, true, &mut listener);
        arbiter.update_batch_input(1650, &mut listener);
        assert_eq!(listener.updated, 1);
        // After the debounce window the update goes through.
        arbiter.add_move_event_point(365, 100, 1800, true, &mut listener);
        arbiter.update_batch_input(1800, &mut listener);
        assert_eq!(listener.updated, 2);
    }

    #[test]
    fn aggregate_times_stay_ordered_across_pointers() {
        let session = Arc::new(GestureSession::new());
        let params = RecognitionParams::default();
        let mut first = BatchInputArbiter::new(0, params, Arc::clone(&session));
        let mut second = BatchInputArbiter::new(1, params, Arc::clone(&session));
        geometry(&mut first);
        geometry(&mut second);
        let mut listener = RecordingListener::default();

        swipe(&mut first, &mut listener, 1000, 100, 1);
        second.add_down_event_point(100, 200, 1100, 0, 2);
        second.add_move_event_point(220, 200, 1120, true, &mut listener);
        second.add_move_event_point(320, 200, 1160, true, &mut listener);

        // The first pointer's up flushes its stroke but does not end the
        // batch while the second pointer is still down.
        assert!(!first.may_end_batch_input(1700, 2, &mut listener));
        assert_eq!(listener.ended, 0);
        assert!(second.may_end_batch_input(1800, 1, &mut listener));
        assert_eq!(listener.ended, 1);

        let times = &listener.last_times;
        assert!(!times.is_empty());
        assert!(times.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn end_of_batch_fires_exactly_once() {
        let session = Arc::new(GestureSession::new());
        let params = RecognitionParams::default();
        let mut first = BatchInputArbiter::new(0, params, Arc::clone(&session));
        let mut second = BatchInputArbiter::new(1, params, Arc::clone(&session));
        let mut third = BatchInputArbiter::new(2, params, Arc::clone(&session));
        for arbiter in [&mut first, &mut second, &mut third] {
            geometry(arbiter);
        }
        let mut listener = RecordingListener::default();
        swipe(&mut first, &mut listener, 1000, 50, 1);
        swipe(&mut second, &mut listener, 1010, 120, 2);
        swipe(&mut third, &mut listener, 1020, 190, 3);
        assert!(!third.may_end_batch_input(1500, 3, &mut listener));
        assert!(!second.may_end_batch_input(1600, 2, &mut listener));
        assert!(first.may_end_batch_input(1700, 1, &mut listener));
        assert_eq!(listener.ended, 1);
    }

    #[test]
    fn listener_truncation_is_respected() {
        struct TruncatingListener {
            truncated: bool,
            updates: usize,
        }
        impl BatchInputListener for TruncatingListener {
            fn on_start_batch_input(&mut self) {}
            fn on_update_batch_input(&mut self, pointers: &mut InputPointers, _time: i64) {
                self.updates += 1;
                if !self.truncated {
                    // Auto-commit: drop the head of the gesture.
                    pointers.shift(pointers.len());
                    self.truncated = true;
                }
            }
            fn on_start_update_batch_input_timer(&mut self) {}
            fn on_end_batch_input(&mut self, _pointers: &mut InputPointers, _time: i64) {}
        }

        let session = Arc::new(GestureSession::new());
        let mut arbiter = BatchInputArbiter::new(0, RecognitionParams::default(), Arc::clone(&session));
        geometry(&mut arbiter);
        let mut listener = TruncatingListener { truncated: false, updates: 0 };
        arbiter.add_down_event_point(100, 100, 1000, 0, 1);
        arbiter.recognition_points.add_event_point(220, 100, 20, true);
        arbiter.recognition_points.add_event_point(235, 100, 520, true);
        arbiter.update_batch_input(1600, &mut listener);
        assert_eq!(listener.updates, 1);
        // The truncation was recorded as the new recognition size, so an
        // empty aggregate does not immediately re-trigger an update.
        arbiter.update_batch_input(1800, &mut listener);
        assert_eq!(listener.updates, 1);
    }

    #[test]
    fn timer_update_duplicates_the_last_point() {
        let session = Arc::new(GestureSession::new());
        let mut arbiter = BatchInputArbiter::new(0, RecognitionParams::default(), Arc::clone(&session));
        geometry(&mut arbiter);
        let mut listener = RecordingListener::default();
        swipe(&mut arbiter, &mut listener, 1000, 100, 1);
        // No touch input since the swipe; the synthetic point makes the
        // stationary tail recognizable and triggers an update.
        arbiter.update_batch_input_by_timer(2000, &mut listener);
        assert_eq!(listener.updated, 1);
        let last = *listener.last_snapshot.last().unwrap();
        assert_eq!(last, (320, 100));
    }
}
