/// Press phase of a modifier key (shift or the symbol switch key). A
/// modifier that is held while another key goes down enters chording and
/// its own release no longer changes the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Releasing,
    Pressing,
    Chording,
    /// Shift went down while the layout was already shifted or shift
    /// locked. Releasing from here turns shift off instead of on.
    PressingOnShifted,
    /// A chord started from `PressingOnShifted`; the release is swallowed.
    Ignoring,
}

#[derive(Debug)]
pub struct ModifierKeyState {
    name: &'static str,
    phase: Phase,
    shift_phases_allowed: bool,
}

impl ModifierKeyState {
    /// State tracker for a non-shift modifier key.
    pub fn new(name: &'static str) -> ModifierKeyState {
        ModifierKeyState {
            name,
            phase: Phase::Releasing,
            shift_phases_allowed: false,
        }
    }

    /// State tracker for the shift key, which additionally distinguishes
    /// presses that happen while the layout is already shifted.
    pub fn new_shift(name: &'static str) -> ModifierKeyState {
        ModifierKeyState {
            name,
            phase: Phase::Releasing,
            shift_phases_allowed: true,
        }
    }

    pub fn on_press(&mut self) {
        debug!("{}.on_press: {:?} > Pressing", self.name, self.phase);
        self.phase = Phase::Pressing;
    }

    pub fn on_release(&mut self) {
        debug!("{}.on_release: {:?} > Releasing", self.name, self.phase);
        self.phase = Phase::Releasing;
    }

    pub fn on_press_on_shifted(&mut self) {
        debug_assert!(
            self.shift_phases_allowed,
            "{} does not track shifted presses",
            self.name
        );
        debug!(
            "{}.on_press_on_shifted: {:?} > PressingOnShifted",
            self.name, self.phase
        );
        self.phase = Phase::PressingOnShifted;
    }

    pub fn on_other_key_pressed(&mut self) {
        let next = match self.phase {
            Phase::Pressing => Phase::Chording,
            Phase::PressingOnShifted => Phase::Ignoring,
            other => other,
        };
        debug!(
            "{}.on_other_key_pressed: {:?} > {:?}",
            self.name, self.phase, next
        );
        self.phase = next;
    }

    pub fn is_pressing(&self) -> bool {
        self.phase == Phase::Pressing
    }

    pub fn is_releasing(&self) -> bool {
        self.phase == Phase::Releasing
    }

    pub fn is_chording(&self) -> bool {
        self.phase == Phase::Chording
    }

    pub fn is_pressing_on_shifted(&self) -> bool {
        self.phase == Phase::PressingOnShifted
    }

    pub fn is_ignoring(&self) -> bool {
        self.phase == Phase::Ignoring
    }
}

/// Shift state of the alphabet layout. Manual and automatic shift are kept
/// apart so that auto capitalization can be cancelled without dropping a
/// shift the user asked for, and shift lock survives a temporary manual
/// shift on top of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShiftState {
    Unshifted,
    ManualShifted,
    ManualShiftedFromAuto,
    AutomaticShifted,
    ShiftLocked,
    ShiftLockShifted,
}

#[derive(Debug)]
pub struct AlphabetShiftState {
    state: ShiftState,
}

impl Default for AlphabetShiftState {
    fn default() -> AlphabetShiftState {
        AlphabetShiftState {
            state: ShiftState::Unshifted,
        }
    }
}

impl AlphabetShiftState {
    pub fn set_shifted(&mut self, shifted: bool) {
        use ShiftState::{
            AutomaticShifted, ManualShifted, ManualShiftedFromAuto, ShiftLockShifted, ShiftLocked,
            Unshifted,
        };
        let next = if shifted {
            match self.state {
                Unshifted => ManualShifted,
                AutomaticShifted => ManualShiftedFromAuto,
                ShiftLocked => ShiftLockShifted,
                other => other,
            }
        } else {
            match self.state {
                ManualShifted | ManualShiftedFromAuto | AutomaticShifted => Unshifted,
                ShiftLockShifted => ShiftLocked,
                other => other,
            }
        };
        debug!("set_shifted({}): {:?} > {:?}", shifted, self.state, next);
        self.state = next;
    }

    pub fn set_shift_locked(&mut self, locked: bool) {
        use ShiftState::{
            AutomaticShifted, ManualShifted, ManualShiftedFromAuto, ShiftLocked, Unshifted,
        };
        let next = if locked {
            match self.state {
                Unshifted | ManualShifted | ManualShiftedFromAuto | AutomaticShifted => ShiftLocked,
                other => other,
            }
        } else {
            Unshifted
        };
        debug!("set_shift_locked({}): {:?} > {:?}", locked, self.state, next);
        self.state = next;
    }

    pub fn set_automatic_shifted(&mut self) {
        debug!("set_automatic_shifted: {:?} > AutomaticShifted", self.state);
        self.state = ShiftState::AutomaticShifted;
    }

    pub fn is_shifted_or_shift_locked(&self) -> bool {
        self.state != ShiftState::Unshifted
    }

    pub fn is_shift_locked(&self) -> bool {
        matches!(
            self.state,
            ShiftState::ShiftLocked | ShiftState::ShiftLockShifted
        )
    }

    pub fn is_shift_lock_shifted(&self) -> bool {
        self.state == ShiftState::ShiftLockShifted
    }

    pub fn is_automatic_shifted(&self) -> bool {
        self.state == ShiftState::AutomaticShifted
    }

    pub fn is_manual_shifted(&self) -> bool {
        matches!(
            self.state,
            ShiftState::ManualShifted
                | ShiftState::ManualShiftedFromAuto
                | ShiftState::ShiftLockShifted
        )
    }

    pub fn is_manual_shifted_from_automatic_shifted(&self) -> bool {
        self.state == ShiftState::ManualShiftedFromAuto
    }
}
