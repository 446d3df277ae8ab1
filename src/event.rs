//! Key codes and text-field state flags exchanged with the host input method.

/// Codes for the functional keys of the keyboard. Character keys use their
/// (non-negative) code point as their code, functional keys use negative
/// values so the two ranges never collide.
pub mod codes {
    pub const ENTER: i32 = '\n' as i32;
    pub const TAB: i32 = '\t' as i32;
    pub const SPACE: i32 = ' ' as i32;

    pub const SHIFT: i32 = -1;
    pub const CAPSLOCK: i32 = -2;
    pub const SWITCH_ALPHA_SYMBOL: i32 = -3;
    pub const OUTPUT_TEXT: i32 = -4;
    pub const DELETE: i32 = -5;
    pub const SETTINGS: i32 = -6;
    pub const SHORTCUT: i32 = -7;
    pub const ACTION_NEXT: i32 = -8;
    pub const ACTION_PREVIOUS: i32 = -9;
    pub const LANGUAGE_SWITCH: i32 = -10;
    pub const EMOJI: i32 = -11;
    pub const CLIPBOARD: i32 = -12;
    pub const SHIFT_ENTER: i32 = -13;
    pub const SYMBOL_SHIFT: i32 = -14;
    pub const ALPHA_FROM_EMOJI: i32 = -15;
    pub const ALPHA_FROM_CLIPBOARD: i32 = -16;
    pub const START_ONE_HANDED_MODE: i32 = -17;
    pub const STOP_ONE_HANDED_MODE: i32 = -18;
    pub const SWITCH_ONE_HANDED_MODE: i32 = -19;
    pub const UNSPECIFIED: i32 = -20;

    /// Whether the code is a printable letter (or at least not a functional
    /// or control code). Everything from SPACE upwards counts as a letter.
    pub fn is_letter_code(code: i32) -> bool {
        code >= SPACE
    }

    pub fn is_space_or_enter(code: i32) -> bool {
        code == SPACE || code == ENTER
    }
}

/// An input event reaching the keyboard state machine after a key has been
/// fully typed. Functional keys carry their key code, character keys their
/// code point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardEvent {
    Functional(i32),
    CodePoint(i32),
}

impl KeyboardEvent {
    /// The code the state machine dispatches on.
    pub fn code(self) -> i32 {
        match self {
            KeyboardEvent::Functional(code) | KeyboardEvent::CodePoint(code) => code,
        }
    }
}

bitflags! {
    /// Capitalization the text field requests at the current cursor
    /// position. Empty flags mean no automatic capitalization.
    pub struct AutoCapsFlags: u32 {
        const CHARACTERS = 0x1000;
        const WORDS = 0x2000;
        const SENTENCES = 0x4000;
    }
}

impl AutoCapsFlags {
    pub fn off() -> AutoCapsFlags {
        AutoCapsFlags::empty()
    }
}

/// Mode of the recapitalize-selection cycling feature. While a mode other
/// than `None` is active, it takes priority over every other shift source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecapitalizeMode {
    None,
    OriginalMixedCase,
    AllLower,
    FirstWordUpper,
    AllUpper,
}
