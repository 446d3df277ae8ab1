// Imports from other modules
use crate::event::{codes, AutoCapsFlags, KeyboardEvent, RecapitalizeMode};
use crate::keyboard::modifier::{AlphabetShiftState, ModifierKeyState};

/// Layout switching actions the state machine drives. The keyboard view
/// implements this and swaps the visible layout; the timer methods back the
/// double tap detection on the shift key.
pub trait SwitchActions {
    fn set_alphabet_keyboard(&mut self);
    fn set_alphabet_manual_shifted_keyboard(&mut self);
    fn set_alphabet_automatic_shifted_keyboard(&mut self);
    fn set_alphabet_shift_locked_keyboard(&mut self);
    fn set_alphabet_shift_lock_shifted_keyboard(&mut self);
    fn set_emoji_keyboard(&mut self);
    fn set_clipboard_keyboard(&mut self);
    fn set_symbols_keyboard(&mut self);
    fn set_symbols_shifted_keyboard(&mut self);

    /// Ask the host to call back [`KeyboardState::on_update_shift_state`]
    /// with the text field's current capitalization state.
    fn request_updating_shift_state(
        &mut self,
        auto_caps_flags: AutoCapsFlags,
        recapitalize_mode: RecapitalizeMode,
    );

    fn start_double_tap_shift_key_timer(&mut self);
    fn is_in_double_tap_shift_key_timeout(&mut self) -> bool;
    fn cancel_double_tap_shift_key_timer(&mut self);

    fn set_one_handed_mode_enabled(&mut self, enabled: bool);
    fn switch_one_handed_mode(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyboardMode {
    Alphabet,
    Symbols,
    Emoji,
    Clipboard,
}

/// Tracks which layout excursion is in flight, so that sliding input and
/// space/enter can return to the layout the excursion started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SwitchState {
    Alpha,
    /// On the symbols layout, nothing typed yet.
    SymbolBegin,
    /// On the symbols layout with at least one character typed; the next
    /// space or enter switches back to the alphabet.
    Symbol,
    MomentaryAlphaAndSymbol,
    MomentarySymbolAndMore,
    MomentaryAlphaShift,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShiftMode {
    Unshift,
    ManualShift,
    AutomaticShift,
    ShiftLockShifted,
}

#[derive(Debug, Default)]
struct SavedKeyboardState {
    is_valid: bool,
    is_alphabet_shift_locked: bool,
    mode: Option<KeyboardMode>,
    shift_mode: Option<ShiftMode>,
}

/// Keyboard state machine.
///
/// Contains all keyboard state transition logic. The inputs are the
/// `on_*` methods; the outputs are calls on the [`SwitchActions`]
/// implementation.
pub struct KeyboardState<A: SwitchActions> {
    actions: A,

    shift_key_state: ModifierKeyState,
    symbol_key_state: ModifierKeyState,

    switch_state: SwitchState,
    mode: KeyboardMode,
    alphabet_shift_state: AlphabetShiftState,
    is_symbol_shifted: bool,
    prev_main_keyboard_was_shift_locked: bool,
    prev_symbols_keyboard_was_shifted: bool,
    recapitalize_mode: RecapitalizeMode,
    clipboard_history_enabled: bool,

    // For handling double tap on the shift key.
    is_in_alphabet_unshifted_from_shifted: bool,
    is_in_double_tap_shift_key: bool,

    saved_keyboard_state: SavedKeyboardState,
}

impl<A: SwitchActions> KeyboardState<A> {
    pub fn new(actions: A) -> KeyboardState<A> {
        KeyboardState {
            actions,
            shift_key_state: ModifierKeyState::new_shift("shift"),
            symbol_key_state: ModifierKeyState::new("symbol"),
            switch_state: SwitchState::Alpha,
            mode: KeyboardMode::Alphabet,
            alphabet_shift_state: AlphabetShiftState::default(),
            is_symbol_shifted: false,
            prev_main_keyboard_was_shift_locked: false,
            prev_symbols_keyboard_was_shifted: false,
            recapitalize_mode: RecapitalizeMode::None,
            clipboard_history_enabled: true,
            is_in_alphabet_unshifted_from_shifted: false,
            is_in_double_tap_shift_key: false,
            saved_keyboard_state: SavedKeyboardState::default(),
        }
    }

    pub fn actions(&self) -> &A {
        &self.actions
    }

    pub fn actions_mut(&mut self) -> &mut A {
        &mut self.actions
    }

    /// Whether the clipboard key may open the clipboard history layout.
    pub fn set_clipboard_history_enabled(&mut self, enabled: bool) {
        self.clipboard_history_enabled = enabled;
    }

    pub fn on_load_keyboard(
        &mut self,
        auto_caps_flags: AutoCapsFlags,
        recapitalize_mode: RecapitalizeMode,
        one_handed_mode_enabled: bool,
    ) {
        debug!("on_load_keyboard");
        self.alphabet_shift_state.set_shift_locked(false);
        self.prev_main_keyboard_was_shift_locked = false;
        self.prev_symbols_keyboard_was_shifted = false;
        self.shift_key_state.on_release();
        self.symbol_key_state.on_release();
        if self.saved_keyboard_state.is_valid {
            self.on_restore_keyboard_state(auto_caps_flags, recapitalize_mode);
            self.saved_keyboard_state.is_valid = false;
        } else {
            self.set_alphabet_keyboard(auto_caps_flags, recapitalize_mode);
        }
        self.actions.set_one_handed_mode_enabled(one_handed_mode_enabled);
    }

    pub fn on_save_keyboard_state(&mut self) {
        let state = &mut self.saved_keyboard_state;
        state.mode = Some(self.mode);
        if self.mode == KeyboardMode::Alphabet {
            state.is_alphabet_shift_locked = self.alphabet_shift_state.is_shift_locked();
            state.shift_mode = Some(if self.alphabet_shift_state.is_automatic_shifted() {
                ShiftMode::AutomaticShift
            } else if self.alphabet_shift_state.is_shifted_or_shift_locked() {
                ShiftMode::ManualShift
            } else {
                ShiftMode::Unshift
            });
        } else {
            state.is_alphabet_shift_locked = self.prev_main_keyboard_was_shift_locked;
            state.shift_mode = Some(if self.is_symbol_shifted {
                ShiftMode::ManualShift
            } else {
                ShiftMode::Unshift
            });
        }
        state.is_valid = true;
        debug!("on_save_keyboard_state: saved={:?}", state);
    }

    fn on_restore_keyboard_state(
        &mut self,
        auto_caps_flags: AutoCapsFlags,
        recapitalize_mode: RecapitalizeMode,
    ) {
        debug!(
            "on_restore_keyboard_state: saved={:?}",
            self.saved_keyboard_state
        );
        self.prev_main_keyboard_was_shift_locked =
            self.saved_keyboard_state.is_alphabet_shift_locked;
        match self.saved_keyboard_state.mode {
            Some(KeyboardMode::Alphabet) | None => {
                self.set_alphabet_keyboard(auto_caps_flags, recapitalize_mode);
                let shift_locked = self.saved_keyboard_state.is_alphabet_shift_locked;
                self.set_shift_locked(shift_locked);
                if !shift_locked {
                    if let Some(shift_mode) = self.saved_keyboard_state.shift_mode {
                        self.set_shifted(shift_mode);
                    }
                }
            }
            Some(KeyboardMode::Emoji) => self.set_emoji_keyboard(),
            Some(KeyboardMode::Clipboard) => self.set_clipboard_keyboard(),
            Some(KeyboardMode::Symbols) => {
                if self.saved_keyboard_state.shift_mode == Some(ShiftMode::ManualShift) {
                    self.set_symbols_shifted_keyboard();
                } else {
                    self.set_symbols_keyboard();
                }
            }
        }
    }

    fn set_shifted(&mut self, shift_mode: ShiftMode) {
        if self.mode != KeyboardMode::Alphabet {
            return;
        }
        let prev_shift_mode = if self.alphabet_shift_state.is_automatic_shifted() {
            ShiftMode::AutomaticShift
        } else if self.alphabet_shift_state.is_manual_shifted() {
            ShiftMode::ManualShift
        } else {
            ShiftMode::Unshift
        };
        match shift_mode {
            ShiftMode::AutomaticShift => {
                self.alphabet_shift_state.set_automatic_shifted();
                if shift_mode != prev_shift_mode {
                    self.actions.set_alphabet_automatic_shifted_keyboard();
                }
            }
            ShiftMode::ManualShift => {
                self.alphabet_shift_state.set_shifted(true);
                if shift_mode != prev_shift_mode {
                    self.actions.set_alphabet_manual_shifted_keyboard();
                }
            }
            ShiftMode::Unshift => {
                self.alphabet_shift_state.set_shifted(false);
                if shift_mode != prev_shift_mode {
                    self.actions.set_alphabet_keyboard();
                }
            }
            ShiftMode::ShiftLockShifted => {
                self.alphabet_shift_state.set_shifted(true);
                self.actions.set_alphabet_shift_lock_shifted_keyboard();
            }
        }
    }

    fn set_shift_locked(&mut self, shift_locked: bool) {
        if self.mode != KeyboardMode::Alphabet {
            return;
        }
        if shift_locked
            && (!self.alphabet_shift_state.is_shift_locked()
                || self.alphabet_shift_state.is_shift_lock_shifted())
        {
            self.actions.set_alphabet_shift_locked_keyboard();
        }
        if !shift_locked && self.alphabet_shift_state.is_shift_locked() {
            self.actions.set_alphabet_keyboard();
        }
        self.alphabet_shift_state.set_shift_locked(shift_locked);
    }

    fn toggle_alphabet_and_symbols(
        &mut self,
        auto_caps_flags: AutoCapsFlags,
        recapitalize_mode: RecapitalizeMode,
    ) {
        if self.mode == KeyboardMode::Alphabet {
            self.prev_main_keyboard_was_shift_locked = self.alphabet_shift_state.is_shift_locked();
            if self.prev_symbols_keyboard_was_shifted {
                self.set_symbols_shifted_keyboard();
            } else {
                self.set_symbols_keyboard();
            }
            self.prev_symbols_keyboard_was_shifted = false;
        } else {
            self.prev_symbols_keyboard_was_shifted = self.is_symbol_shifted;
            self.set_alphabet_keyboard(auto_caps_flags, recapitalize_mode);
            if self.prev_main_keyboard_was_shift_locked {
                self.set_shift_locked(true);
            }
            self.prev_main_keyboard_was_shift_locked = false;
        }
    }

    /// Force the alphabet layout back, regardless of the current mode.
    pub fn on_reset_keyboard_state_to_alphabet(
        &mut self,
        auto_caps_flags: AutoCapsFlags,
        recapitalize_mode: RecapitalizeMode,
    ) {
        debug!("on_reset_keyboard_state_to_alphabet");
        if self.mode == KeyboardMode::Alphabet {
            return;
        }
        self.prev_symbols_keyboard_was_shifted = self.is_symbol_shifted;
        self.set_alphabet_keyboard(auto_caps_flags, recapitalize_mode);
        if self.prev_main_keyboard_was_shift_locked {
            self.set_shift_locked(true);
        }
        self.prev_main_keyboard_was_shift_locked = false;
    }

    fn toggle_shift_in_symbols(&mut self) {
        if self.is_symbol_shifted {
            self.set_symbols_keyboard();
        } else {
            self.set_symbols_shifted_keyboard();
        }
    }

    fn set_alphabet_keyboard(
        &mut self,
        auto_caps_flags: AutoCapsFlags,
        recapitalize_mode: RecapitalizeMode,
    ) {
        self.actions.set_alphabet_keyboard();
        self.mode = KeyboardMode::Alphabet;
        self.is_symbol_shifted = false;
        self.recapitalize_mode = RecapitalizeMode::None;
        self.switch_state = SwitchState::Alpha;
        self.actions
            .request_updating_shift_state(auto_caps_flags, recapitalize_mode);
    }

    fn set_symbols_keyboard(&mut self) {
        self.actions.set_symbols_keyboard();
        self.mode = KeyboardMode::Symbols;
        self.is_symbol_shifted = false;
        self.recapitalize_mode = RecapitalizeMode::None;
        self.alphabet_shift_state.set_shift_locked(false);
        self.switch_state = SwitchState::SymbolBegin;
    }

    fn set_symbols_shifted_keyboard(&mut self) {
        self.actions.set_symbols_shifted_keyboard();
        self.mode = KeyboardMode::Symbols;
        self.is_symbol_shifted = true;
        self.recapitalize_mode = RecapitalizeMode::None;
        self.alphabet_shift_state.set_shift_locked(false);
        self.switch_state = SwitchState::SymbolBegin;
    }

    fn set_emoji_keyboard(&mut self) {
        self.mode = KeyboardMode::Emoji;
        self.recapitalize_mode = RecapitalizeMode::None;
        // Remember caps lock mode and reset alphabet shift state.
        self.prev_main_keyboard_was_shift_locked = self.alphabet_shift_state.is_shift_locked();
        self.alphabet_shift_state.set_shift_locked(false);
        self.actions.set_emoji_keyboard();
    }

    fn set_clipboard_keyboard(&mut self) {
        self.mode = KeyboardMode::Clipboard;
        self.recapitalize_mode = RecapitalizeMode::None;
        // Remember caps lock mode and reset alphabet shift state.
        self.prev_main_keyboard_was_shift_locked = self.alphabet_shift_state.is_shift_locked();
        self.alphabet_shift_state.set_shift_locked(false);
        self.actions.set_clipboard_keyboard();
    }

    pub fn on_press_key(
        &mut self,
        code: i32,
        is_single_pointer: bool,
        auto_caps_flags: AutoCapsFlags,
        recapitalize_mode: RecapitalizeMode,
    ) {
        debug!("on_press_key: code={} single={}", code, is_single_pointer);
        if code != codes::SHIFT {
            // The double tap shift key timer detects two consecutive shift
            // key presses, so any other key cancels it.
            self.actions.cancel_double_tap_shift_key_timer();
        }
        if code == codes::SHIFT {
            self.on_press_shift();
        } else if code == codes::CAPSLOCK {
            // Caps lock is handled on release.
        } else if code == codes::SWITCH_ALPHA_SYMBOL {
            self.on_press_symbol(auto_caps_flags, recapitalize_mode);
        } else {
            self.shift_key_state.on_other_key_pressed();
            self.symbol_key_state.on_other_key_pressed();
            // With a second finger down on the alphabet layout, automatic
            // shift no longer matches what will actually be committed and
            // has to be dropped, unless the field wants all caps.
            if !is_single_pointer
                && self.mode == KeyboardMode::Alphabet
                && auto_caps_flags != AutoCapsFlags::CHARACTERS
            {
                let needs_to_reset_auto_caps = self.alphabet_shift_state.is_automatic_shifted()
                    || (self.alphabet_shift_state.is_manual_shifted()
                        && self.shift_key_state.is_releasing());
                if needs_to_reset_auto_caps {
                    self.actions.set_alphabet_keyboard();
                }
            }
        }
    }

    pub fn on_release_key(
        &mut self,
        code: i32,
        with_sliding: bool,
        auto_caps_flags: AutoCapsFlags,
        recapitalize_mode: RecapitalizeMode,
    ) {
        debug!("on_release_key: code={} sliding={}", code, with_sliding);
        if code == codes::SHIFT {
            self.on_release_shift(with_sliding, auto_caps_flags, recapitalize_mode);
        } else if code == codes::CAPSLOCK {
            let locked = self.alphabet_shift_state.is_shift_locked();
            self.set_shift_locked(!locked);
        } else if code == codes::SWITCH_ALPHA_SYMBOL {
            self.on_release_symbol(with_sliding, auto_caps_flags, recapitalize_mode);
        }
    }

    fn on_press_symbol(
        &mut self,
        auto_caps_flags: AutoCapsFlags,
        recapitalize_mode: RecapitalizeMode,
    ) {
        self.toggle_alphabet_and_symbols(auto_caps_flags, recapitalize_mode);
        self.symbol_key_state.on_press();
        self.switch_state = SwitchState::MomentaryAlphaAndSymbol;
    }

    fn on_release_symbol(
        &mut self,
        with_sliding: bool,
        auto_caps_flags: AutoCapsFlags,
        recapitalize_mode: RecapitalizeMode,
    ) {
        if self.symbol_key_state.is_chording() {
            // The mode change key was chorded with another key; releasing
            // it returns to the previous layout.
            self.toggle_alphabet_and_symbols(auto_caps_flags, recapitalize_mode);
        } else if !with_sliding {
            // A plain release forgets the previous symbols shift state, so
            // the next mode change lands on the unshifted symbols layout.
            self.prev_symbols_keyboard_was_shifted = false;
        }
        self.symbol_key_state.on_release();
    }

    pub fn on_update_shift_state(
        &mut self,
        auto_caps_flags: AutoCapsFlags,
        recapitalize_mode: RecapitalizeMode,
    ) {
        debug!(
            "on_update_shift_state: auto_caps={:?} recapitalize={:?}",
            auto_caps_flags, recapitalize_mode
        );
        self.recapitalize_mode = recapitalize_mode;
        self.update_alphabet_shift_state(auto_caps_flags, recapitalize_mode);
    }

    fn update_shift_state_for_recapitalize(&mut self, recapitalize_mode: RecapitalizeMode) {
        match recapitalize_mode {
            RecapitalizeMode::AllUpper => self.set_shifted(ShiftMode::ShiftLockShifted),
            RecapitalizeMode::FirstWordUpper => self.set_shifted(ShiftMode::AutomaticShift),
            RecapitalizeMode::AllLower
            | RecapitalizeMode::OriginalMixedCase
            | RecapitalizeMode::None => self.set_shifted(ShiftMode::Unshift),
        }
    }

    fn update_alphabet_shift_state(
        &mut self,
        auto_caps_flags: AutoCapsFlags,
        recapitalize_mode: RecapitalizeMode,
    ) {
        if self.mode != KeyboardMode::Alphabet {
            return;
        }
        if recapitalize_mode != RecapitalizeMode::None {
            // Recapitalizing. Match the keyboard to the recapitalize state.
            self.update_shift_state_for_recapitalize(recapitalize_mode);
            return;
        }
        if !self.shift_key_state.is_releasing() {
            // Ignore the update while the shift key is being pressed,
            // including chording.
            return;
        }
        if !self.alphabet_shift_state.is_shift_locked() && !self.shift_key_state.is_ignoring() {
            if self.shift_key_state.is_releasing() && !auto_caps_flags.is_empty() {
                // Automatic shift is only set while the shift key is fully
                // released.
                self.set_shifted(ShiftMode::AutomaticShift);
            } else if self.shift_key_state.is_chording() {
                self.set_shifted(ShiftMode::ManualShift);
            } else {
                self.set_shifted(ShiftMode::Unshift);
            }
        }
    }

    fn on_press_shift(&mut self) {
        // While recapitalizing, shift cycles the recapitalize mode on the
        // host side; none of the usual processing applies, including the
        // double tap timer.
        if self.recapitalize_mode != RecapitalizeMode::None {
            return;
        }
        if self.mode == KeyboardMode::Alphabet {
            self.is_in_double_tap_shift_key = self.actions.is_in_double_tap_shift_key_timeout();
            if !self.is_in_double_tap_shift_key {
                // This is the first tap.
                self.actions.start_double_tap_shift_key_timer();
            }
            if self.is_in_double_tap_shift_key {
                if self.alphabet_shift_state.is_manual_shifted()
                    || self.is_in_alphabet_unshifted_from_shifted
                {
                    // Double tap while manual or automatic shifted locks
                    // the shift.
                    self.set_shift_locked(true);
                } else {
                    // Double tap in normal state is the second tap that
                    // disabled shift lock; ignore it.
                }
            } else if self.alphabet_shift_state.is_shift_locked() {
                // Pressed while shift locked; treat as shift lock shifted
                // and record the press as if from the normal state.
                self.set_shifted(ShiftMode::ShiftLockShifted);
                self.shift_key_state.on_press();
            } else if self.alphabet_shift_state.is_automatic_shifted() {
                // Pressed while automatic shifted; move to manual shifted.
                self.set_shifted(ShiftMode::ManualShift);
                self.shift_key_state.on_press();
            } else if self.alphabet_shift_state.is_shifted_or_shift_locked() {
                // Already manually shifted; only record the press.
                self.shift_key_state.on_press_on_shifted();
            } else {
                // From the base layout, chording or manual shift starts.
                self.set_shifted(ShiftMode::ManualShift);
                self.shift_key_state.on_press();
            }
        } else {
            // In symbol mode shift toggles between the symbols and the
            // more-symbols layout.
            self.toggle_shift_in_symbols();
            self.switch_state = SwitchState::MomentarySymbolAndMore;
            self.shift_key_state.on_press();
        }
    }

    fn on_release_shift(
        &mut self,
        with_sliding: bool,
        auto_caps_flags: AutoCapsFlags,
        recapitalize_mode: RecapitalizeMode,
    ) {
        if self.recapitalize_mode != RecapitalizeMode::None {
            // Recapitalizing takes priority over the shift key state.
            self.update_shift_state_for_recapitalize(self.recapitalize_mode);
        } else if self.mode == KeyboardMode::Alphabet {
            let is_shift_locked = self.alphabet_shift_state.is_shift_locked();
            self.is_in_alphabet_unshifted_from_shifted = false;
            if self.is_in_double_tap_shift_key {
                // Handled in on_press_shift; swallow the release.
                self.is_in_double_tap_shift_key = false;
            } else if self.shift_key_state.is_chording() {
                if self.alphabet_shift_state.is_shift_lock_shifted() {
                    // Chording input while shift locked.
                    self.set_shift_locked(true);
                } else {
                    // Chording input while normal state.
                    self.set_shifted(ShiftMode::Unshift);
                }
                // The chorded characters may have changed the automatic
                // shift state, so ask the host for a fresh update.
                self.shift_key_state.on_release();
                self.actions
                    .request_updating_shift_state(auto_caps_flags, recapitalize_mode);
                return;
            } else if self.alphabet_shift_state.is_shift_lock_shifted() && with_sliding {
                // Shift was pressed and slid out while shift locked.
                self.set_shift_locked(true);
            } else if self.alphabet_shift_state.is_manual_shifted() && with_sliding {
                // Shift was pressed and slid out to another key.
                self.switch_state = SwitchState::MomentaryAlphaShift;
            } else if is_shift_locked
                && !self.alphabet_shift_state.is_shift_lock_shifted()
                && (self.shift_key_state.is_pressing()
                    || self.shift_key_state.is_pressing_on_shifted())
                && !with_sliding
            {
                // Shift was long pressed; ignore this release.
            } else if is_shift_locked && !self.shift_key_state.is_ignoring() && !with_sliding {
                // Shift was pressed without chording while shift locked.
                self.set_shift_locked(false);
            } else if self.alphabet_shift_state.is_shifted_or_shift_locked()
                && self.shift_key_state.is_pressing_on_shifted()
                && !with_sliding
            {
                // Shift was pressed without chording while shifted.
                self.set_shifted(ShiftMode::Unshift);
                self.is_in_alphabet_unshifted_from_shifted = true;
            } else if self.alphabet_shift_state.is_manual_shifted_from_automatic_shifted()
                && self.shift_key_state.is_pressing()
                && !with_sliding
            {
                // Shift was pressed without chording while manual shifted
                // transited from automatic shifted.
                self.set_shifted(ShiftMode::Unshift);
                self.is_in_alphabet_unshifted_from_shifted = true;
            }
        } else if self.shift_key_state.is_chording() {
            // In symbol mode a chorded shift release returns to the
            // previous symbols layout.
            self.toggle_shift_in_symbols();
        }
        self.shift_key_state.on_release();
    }

    /// Called when a sliding key input (press on a modifier, slide onto a
    /// character key) finishes or gets cancelled.
    pub fn on_finish_sliding_input(
        &mut self,
        auto_caps_flags: AutoCapsFlags,
        recapitalize_mode: RecapitalizeMode,
    ) {
        debug!("on_finish_sliding_input");
        match self.switch_state {
            SwitchState::MomentaryAlphaAndSymbol => {
                self.toggle_alphabet_and_symbols(auto_caps_flags, recapitalize_mode);
            }
            SwitchState::MomentarySymbolAndMore => self.toggle_shift_in_symbols(),
            SwitchState::MomentaryAlphaShift => {
                self.set_alphabet_keyboard(auto_caps_flags, recapitalize_mode);
            }
            _ => {}
        }
    }

    pub fn on_event(
        &mut self,
        event: KeyboardEvent,
        auto_caps_flags: AutoCapsFlags,
        recapitalize_mode: RecapitalizeMode,
    ) {
        let code = event.code();
        debug!("on_event: code={}", code);

        match self.switch_state {
            SwitchState::MomentaryAlphaAndSymbol => {
                if code == codes::SWITCH_ALPHA_SYMBOL {
                    // Only the mode change key was pressed and released.
                    self.switch_state = if self.mode == KeyboardMode::Alphabet {
                        SwitchState::Alpha
                    } else {
                        SwitchState::SymbolBegin
                    };
                }
            }
            SwitchState::MomentarySymbolAndMore => {
                if code == codes::SHIFT {
                    // Only the shift key was pressed and released on the
                    // symbols layout.
                    self.switch_state = SwitchState::SymbolBegin;
                }
                if codes::is_space_or_enter(code) {
                    self.toggle_alphabet_and_symbols(auto_caps_flags, recapitalize_mode);
                    self.prev_symbols_keyboard_was_shifted = false;
                }
            }
            SwitchState::SymbolBegin => {
                // The emoji and clipboard layouts never switch back on
                // space or enter.
                if self.mode != KeyboardMode::Emoji && self.mode != KeyboardMode::Clipboard {
                    if !codes::is_space_or_enter(code)
                        && (codes::is_letter_code(code) || code == codes::OUTPUT_TEXT)
                    {
                        self.switch_state = SwitchState::Symbol;
                    }
                    if codes::is_space_or_enter(code) {
                        self.toggle_alphabet_and_symbols(auto_caps_flags, recapitalize_mode);
                        self.prev_symbols_keyboard_was_shifted = false;
                    }
                }
            }
            SwitchState::Symbol => {
                // One or more characters followed by a space or enter
                // switches back to the alphabet layout.
                if codes::is_space_or_enter(code) {
                    self.toggle_alphabet_and_symbols(auto_caps_flags, recapitalize_mode);
                    self.prev_symbols_keyboard_was_shifted = false;
                }
            }
            SwitchState::Alpha | SwitchState::MomentaryAlphaShift => {}
        }

        if codes::is_letter_code(code) {
            self.update_alphabet_shift_state(auto_caps_flags, recapitalize_mode);
        } else if code == codes::EMOJI {
            self.set_emoji_keyboard();
        } else if code == codes::ALPHA_FROM_EMOJI || code == codes::ALPHA_FROM_CLIPBOARD {
            self.set_alphabet_keyboard(auto_caps_flags, recapitalize_mode);
        } else if code == codes::CLIPBOARD {
            if self.clipboard_history_enabled {
                self.set_clipboard_keyboard();
            }
        } else if code == codes::START_ONE_HANDED_MODE {
            self.actions.set_one_handed_mode_enabled(true);
        } else if code == codes::STOP_ONE_HANDED_MODE {
            self.actions.set_one_handed_mode_enabled(false);
        } else if code == codes::SWITCH_ONE_HANDED_MODE {
            self.actions.switch_one_handed_mode();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Alphabet,
        AlphabetManualShifted,
        AlphabetAutomaticShifted,
        AlphabetShiftLocked,
        AlphabetShiftLockShifted,
        Emoji,
        Clipboard,
        Symbols,
        SymbolsShifted,
        RequestUpdatingShiftState,
        StartDoubleTapTimer,
        CancelDoubleTapTimer,
        OneHandedEnabled(bool),
        SwitchOneHanded,
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
        in_double_tap_timeout: bool,
    }

    impl Recorder {
        fn last_layout(&self) -> Option<Call> {
            self.calls
                .iter()
                .rev()
                .find(|call| {
                    matches!(
                        call,
                        Call::Alphabet
                            | Call::AlphabetManualShifted
                            | Call::AlphabetAutomaticShifted
                            | Call::AlphabetShiftLocked
                            | Call::AlphabetShiftLockShifted
                            | Call::Emoji
                            | Call::Clipboard
                            | Call::Symbols
                            | Call::SymbolsShifted
                    )
                })
                .copied()
        }

        fn count(&self, call: Call) -> usize {
            self.calls.iter().filter(|&&c| c == call).count()
        }
    }

    impl SwitchActions for Recorder {
        fn set_alphabet_keyboard(&mut self) {
            self.calls.push(Call::Alphabet);
        }
        fn set_alphabet_manual_shifted_keyboard(&mut self) {
            self.calls.push(Call::AlphabetManualShifted);
        }
        fn set_alphabet_automatic_shifted_keyboard(&mut self) {
            self.calls.push(Call::AlphabetAutomaticShifted);
        }
        fn set_alphabet_shift_locked_keyboard(&mut self) {
            self.calls.push(Call::AlphabetShiftLocked);
        }
        fn set_alphabet_shift_lock_shifted_keyboard(&mut self) {
            self.calls.push(Call::AlphabetShiftLockShifted);
        }
        fn set_emoji_keyboard(&mut self) {
            self.calls.push(Call::Emoji);
        }
        fn set_clipboard_keyboard(&mut self) {
            self.calls.push(Call::Clipboard);
        }
        fn set_symbols_keyboard(&mut self) {
            self.calls.push(Call::Symbols);
        }
        fn set_symbols_shifted_keyboard(&mut self) {
            self.calls.push(Call::SymbolsShifted);
        }
        fn request_updating_shift_state(
            &mut self,
            _auto_caps_flags: AutoCapsFlags,
            _recapitalize_mode: RecapitalizeMode,
        ) {
            self.calls.push(Call::RequestUpdatingShiftState);
        }
        fn start_double_tap_shift_key_timer(&mut self) {
            self.calls.push(Call::StartDoubleTapTimer);
        }
        fn is_in_double_tap_shift_key_timeout(&mut self) -> bool {
            self.in_double_tap_timeout
        }
        fn cancel_double_tap_shift_key_timer(&mut self) {
            self.calls.push(Call::CancelDoubleTapTimer);
        }
        fn set_one_handed_mode_enabled(&mut self, enabled: bool) {
            self.calls.push(Call::OneHandedEnabled(enabled));
        }
        fn switch_one_handed_mode(&mut self) {
            self.calls.push(Call::SwitchOneHanded);
        }
    }

    const NO_CAPS: AutoCapsFlags = AutoCapsFlags::empty();

    fn loaded_state() -> KeyboardState<Recorder> {
        let mut state = KeyboardState::new(Recorder::default());
        state.on_load_keyboard(NO_CAPS, RecapitalizeMode::None, false);
        state.actions_mut().calls.clear();
        state
    }

    fn type_letter(state: &mut KeyboardState<Recorder>, ch: char, auto_caps: AutoCapsFlags) {
        let code = ch as i32;
        state.on_press_key(code, true, auto_caps, RecapitalizeMode::None);
        state.on_release_key(code, false, auto_caps, RecapitalizeMode::None);
        state.on_event(KeyboardEvent::CodePoint(code), auto_caps, RecapitalizeMode::None);
    }

    #[test]
    fn loading_lands_on_alphabet_and_asks_for_shift_state() {
        let mut state = KeyboardState::new(Recorder::default());
        state.on_load_keyboard(NO_CAPS, RecapitalizeMode::None, false);
        let recorder = state.actions();
        assert_eq!(recorder.last_layout(), Some(Call::Alphabet));
        assert_eq!(recorder.count(Call::RequestUpdatingShiftState), 1);
        assert_eq!(recorder.count(Call::OneHandedEnabled(false)), 1);
    }

    #[test]
    fn manual_shift_applies_to_a_single_letter() {
        let mut state = loaded_state();
        state.on_press_key(codes::SHIFT, true, NO_CAPS, RecapitalizeMode::None);
        state.on_release_key(codes::SHIFT, false, NO_CAPS, RecapitalizeMode::None);
        assert_eq!(
            state.actions().last_layout(),
            Some(Call::AlphabetManualShifted)
        );
        type_letter(&mut state, 'a', NO_CAPS);
        // The shift was consumed by the letter.
        assert_eq!(state.actions().last_layout(), Some(Call::Alphabet));
    }

    #[test]
    fn second_shift_tap_unshifts() {
        let mut state = loaded_state();
        state.on_press_key(codes::SHIFT, true, NO_CAPS, RecapitalizeMode::None);
        state.on_release_key(codes::SHIFT, false, NO_CAPS, RecapitalizeMode::None);
        // Second tap outside the double tap timeout.
        state.on_press_key(codes::SHIFT, true, NO_CAPS, RecapitalizeMode::None);
        state.on_release_key(codes::SHIFT, false, NO_CAPS, RecapitalizeMode::None);
        assert_eq!(state.actions().last_layout(), Some(Call::Alphabet));
    }

    #[test]
    fn double_tap_locks_the_shift() {
        let mut state = loaded_state();
        state.on_press_key(codes::SHIFT, true, NO_CAPS, RecapitalizeMode::None);
        state.on_release_key(codes::SHIFT, false, NO_CAPS, RecapitalizeMode::None);
        assert_eq!(state.actions().count(Call::StartDoubleTapTimer), 1);
        state.actions_mut().in_double_tap_timeout = true;
        state.on_press_key(codes::SHIFT, true, NO_CAPS, RecapitalizeMode::None);
        state.on_release_key(codes::SHIFT, false, NO_CAPS, RecapitalizeMode::None);
        assert_eq!(
            state.actions().last_layout(),
            Some(Call::AlphabetShiftLocked)
        );
        // Shift lock is not consumed by letters.
        type_letter(&mut state, 'a', NO_CAPS);
        assert_eq!(
            state.actions().last_layout(),
            Some(Call::AlphabetShiftLocked)
        );
    }

    #[test]
    fn shift_tap_while_locked_unlocks() {
        let mut state = loaded_state();
        state.on_press_key(codes::CAPSLOCK, true, NO_CAPS, RecapitalizeMode::None);
        state.on_release_key(codes::CAPSLOCK, false, NO_CAPS, RecapitalizeMode::None);
        assert_eq!(
            state.actions().last_layout(),
            Some(Call::AlphabetShiftLocked)
        );
        state.on_press_key(codes::SHIFT, true, NO_CAPS, RecapitalizeMode::None);
        state.on_release_key(codes::SHIFT, false, NO_CAPS, RecapitalizeMode::None);
        assert_eq!(state.actions().last_layout(), Some(Call::Alphabet));
    }

    #[test]
    fn shift_chording_restores_the_previous_state() {
        let mut state = loaded_state();
        state.on_press_key(codes::SHIFT, true, NO_CAPS, RecapitalizeMode::None);
        state.on_press_key('a' as i32, false, NO_CAPS, RecapitalizeMode::None);
        state.on_release_key('a' as i32, false, NO_CAPS, RecapitalizeMode::None);
        state.on_release_key(codes::SHIFT, false, NO_CAPS, RecapitalizeMode::None);
        let recorder = state.actions();
        assert_eq!(recorder.last_layout(), Some(Call::Alphabet));
        // Chorded release asks the host to re-evaluate auto caps.
        assert!(recorder.count(Call::RequestUpdatingShiftState) >= 1);
    }

    #[test]
    fn symbols_toggle_and_automatic_return_on_space() {
        let mut state = loaded_state();
        state.on_press_key(codes::SWITCH_ALPHA_SYMBOL, true, NO_CAPS, RecapitalizeMode::None);
        state.on_release_key(codes::SWITCH_ALPHA_SYMBOL, false, NO_CAPS, RecapitalizeMode::None);
        state.on_event(
            KeyboardEvent::Functional(codes::SWITCH_ALPHA_SYMBOL),
            NO_CAPS,
            RecapitalizeMode::None,
        );
        assert_eq!(state.actions().last_layout(), Some(Call::Symbols));
        // A character followed by space switches back to the alphabet.
        type_letter(&mut state, '#', NO_CAPS);
        assert_eq!(state.actions().last_layout(), Some(Call::Symbols));
        type_letter(&mut state, ' ', NO_CAPS);
        assert_eq!(state.actions().last_layout(), Some(Call::Alphabet));
    }

    #[test]
    fn space_as_first_symbol_key_returns_to_alphabet() {
        let mut state = loaded_state();
        state.on_press_key(codes::SWITCH_ALPHA_SYMBOL, true, NO_CAPS, RecapitalizeMode::None);
        state.on_release_key(codes::SWITCH_ALPHA_SYMBOL, false, NO_CAPS, RecapitalizeMode::None);
        state.on_event(
            KeyboardEvent::Functional(codes::SWITCH_ALPHA_SYMBOL),
            NO_CAPS,
            RecapitalizeMode::None,
        );
        // Space as the very first key still returns to the alphabet, per
        // the symbol-begin transition.
        type_letter(&mut state, ' ', NO_CAPS);
        assert_eq!(state.actions().last_layout(), Some(Call::Alphabet));
    }

    #[test]
    fn symbol_key_chording_returns_to_alphabet() {
        let mut state = loaded_state();
        state.on_press_key(codes::SWITCH_ALPHA_SYMBOL, true, NO_CAPS, RecapitalizeMode::None);
        assert_eq!(state.actions().last_layout(), Some(Call::Symbols));
        state.on_press_key('#' as i32, false, NO_CAPS, RecapitalizeMode::None);
        state.on_release_key('#' as i32, false, NO_CAPS, RecapitalizeMode::None);
        state.on_release_key(codes::SWITCH_ALPHA_SYMBOL, false, NO_CAPS, RecapitalizeMode::None);
        assert_eq!(state.actions().last_layout(), Some(Call::Alphabet));
    }

    #[test]
    fn shift_lock_survives_a_symbols_round_trip() {
        let mut state = loaded_state();
        state.on_press_key(codes::CAPSLOCK, true, NO_CAPS, RecapitalizeMode::None);
        state.on_release_key(codes::CAPSLOCK, false, NO_CAPS, RecapitalizeMode::None);
        state.on_press_key(codes::SWITCH_ALPHA_SYMBOL, true, NO_CAPS, RecapitalizeMode::None);
        state.on_release_key(codes::SWITCH_ALPHA_SYMBOL, false, NO_CAPS, RecapitalizeMode::None);
        assert_eq!(state.actions().last_layout(), Some(Call::Symbols));
        state.on_press_key(codes::SWITCH_ALPHA_SYMBOL, true, NO_CAPS, RecapitalizeMode::None);
        state.on_release_key(codes::SWITCH_ALPHA_SYMBOL, false, NO_CAPS, RecapitalizeMode::None);
        assert_eq!(
            state.actions().last_layout(),
            Some(Call::AlphabetShiftLocked)
        );
    }

    #[test]
    fn auto_caps_sets_automatic_shift_once() {
        let mut state = loaded_state();
        state.on_update_shift_state(AutoCapsFlags::SENTENCES, RecapitalizeMode::None);
        assert_eq!(
            state.actions().last_layout(),
            Some(Call::AlphabetAutomaticShifted)
        );
        let layout_calls = state.actions().calls.len();
        // A second update with the same flags must not re-switch the layout.
        state.on_update_shift_state(AutoCapsFlags::SENTENCES, RecapitalizeMode::None);
        assert_eq!(state.actions().calls.len(), layout_calls);
    }

    #[test]
    fn recapitalize_all_upper_takes_priority() {
        let mut state = loaded_state();
        state.on_update_shift_state(NO_CAPS, RecapitalizeMode::AllUpper);
        assert_eq!(
            state.actions().last_layout(),
            Some(Call::AlphabetShiftLockShifted)
        );
        // Shift presses are handed to the recapitalize cycle instead of
        // the usual shift processing.
        let calls = state.actions().calls.len();
        state.on_press_key(codes::SHIFT, true, NO_CAPS, RecapitalizeMode::AllUpper);
        assert_eq!(state.actions().calls.len(), calls);
    }

    #[test]
    fn emoji_and_back() {
        let mut state = loaded_state();
        state.on_event(
            KeyboardEvent::Functional(codes::EMOJI),
            NO_CAPS,
            RecapitalizeMode::None,
        );
        assert_eq!(state.actions().last_layout(), Some(Call::Emoji));
        state.on_event(
            KeyboardEvent::Functional(codes::ALPHA_FROM_EMOJI),
            NO_CAPS,
            RecapitalizeMode::None,
        );
        assert_eq!(state.actions().last_layout(), Some(Call::Alphabet));
    }

    #[test]
    fn clipboard_key_is_gated_by_the_setting() {
        let mut state = loaded_state();
        state.set_clipboard_history_enabled(false);
        state.on_event(
            KeyboardEvent::Functional(codes::CLIPBOARD),
            NO_CAPS,
            RecapitalizeMode::None,
        );
        assert_eq!(state.actions().last_layout(), None);
        state.set_clipboard_history_enabled(true);
        state.on_event(
            KeyboardEvent::Functional(codes::CLIPBOARD),
            NO_CAPS,
            RecapitalizeMode::None,
        );
        assert_eq!(state.actions().last_layout(), Some(Call::Clipboard));
    }

    #[test]
    fn saved_shift_lock_survives_a_reload() {
        let mut state = loaded_state();
        state.on_press_key(codes::CAPSLOCK, true, NO_CAPS, RecapitalizeMode::None);
        state.on_release_key(codes::CAPSLOCK, false, NO_CAPS, RecapitalizeMode::None);
        state.on_save_keyboard_state();
        state.actions_mut().calls.clear();
        state.on_load_keyboard(NO_CAPS, RecapitalizeMode::None, false);
        assert_eq!(
            state.actions().last_layout(),
            Some(Call::AlphabetShiftLocked)
        );
    }

    #[test]
    fn sliding_off_the_symbol_key_returns_after_the_slide() {
        let mut state = loaded_state();
        state.on_press_key(codes::SWITCH_ALPHA_SYMBOL, true, NO_CAPS, RecapitalizeMode::None);
        state.on_release_key(codes::SWITCH_ALPHA_SYMBOL, true, NO_CAPS, RecapitalizeMode::None);
        state.on_finish_sliding_input(NO_CAPS, RecapitalizeMode::None);
        assert_eq!(state.actions().last_layout(), Some(Call::Alphabet));
    }

    #[test]
    fn one_handed_mode_codes_reach_the_actions() {
        let mut state = loaded_state();
        state.on_event(
            KeyboardEvent::Functional(codes::START_ONE_HANDED_MODE),
            NO_CAPS,
            RecapitalizeMode::None,
        );
        state.on_event(
            KeyboardEvent::Functional(codes::SWITCH_ONE_HANDED_MODE),
            NO_CAPS,
            RecapitalizeMode::None,
        );
        let recorder = state.actions();
        assert_eq!(recorder.count(Call::OneHandedEnabled(true)), 1);
        assert_eq!(recorder.count(Call::SwitchOneHanded), 1);
    }
}
