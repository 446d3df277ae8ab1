// Imports from other crates
use std::sync::atomic::{AtomicBool, Ordering};

/// Decides whether gesture events should be handled at all. The main
/// dictionary availability is reported from the dictionary loading thread
/// while the other inputs arrive on the event thread, so everything lives
/// in atomics.
#[derive(Default)]
pub struct GestureEnabler {
    should_handle_gesture: AtomicBool,
    main_dictionary_available: AtomicBool,
    enabled_by_input_field: AtomicBool,
    enabled_by_user: AtomicBool,
}

impl GestureEnabler {
    pub fn new() -> GestureEnabler {
        GestureEnabler::default()
    }

    fn update_gesture_handling_mode(&self) {
        let should_handle = self.main_dictionary_available.load(Ordering::Relaxed)
            && self.enabled_by_input_field.load(Ordering::Relaxed)
            && self.enabled_by_user.load(Ordering::Relaxed);
        self.should_handle_gesture
            .store(should_handle, Ordering::Relaxed);
    }

    /// Note that this may be called from a non-UI thread, e.g. when an
    /// asynchronous dictionary load completes.
    pub fn set_main_dictionary_availability(&self, main_dictionary_available: bool) {
        self.main_dictionary_available
            .store(main_dictionary_available, Ordering::Relaxed);
        self.update_gesture_handling_mode();
    }

    pub fn set_gesture_handling_enabled_by_user(&self, enabled_by_user: bool) {
        self.enabled_by_user.store(enabled_by_user, Ordering::Relaxed);
        self.update_gesture_handling_mode();
    }

    /// Password fields never take gesture input.
    pub fn set_password_mode(&self, password_mode: bool) {
        self.enabled_by_input_field
            .store(!password_mode, Ordering::Relaxed);
        self.update_gesture_handling_mode();
    }

    pub fn should_handle_gesture(&self) -> bool {
        self.should_handle_gesture.load(Ordering::Relaxed)
    }
}
