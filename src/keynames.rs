use input_linux_sys::{EV_ABS, EV_KEY, EV_LED, EV_MSC, EV_REL, EV_SYN};

/// Linux evdev key codes mapped to the platform key-code strings used as
/// channel identities (the DOM `KeyboardEvent.code` vocabulary).
static WEB_CODES: phf::Map<u16, &'static str> = phf::phf_map! {
    1u16 => "Escape",
    2u16 => "Digit1",
    3u16 => "Digit2",
    4u16 => "Digit3",
    5u16 => "Digit4",
    6u16 => "Digit5",
    7u16 => "Digit6",
    8u16 => "Digit7",
    9u16 => "Digit8",
    10u16 => "Digit9",
    11u16 => "Digit0",
    12u16 => "Minus",
    13u16 => "Equal",
    14u16 => "Backspace",
    15u16 => "Tab",
    16u16 => "KeyQ",
    17u16 => "KeyW",
    18u16 => "KeyE",
    19u16 => "KeyR",
    20u16 => "KeyT",
    21u16 => "KeyY",
    22u16 => "KeyU",
    23u16 => "KeyI",
    24u16 => "KeyO",
    25u16 => "KeyP",
    26u16 => "BracketLeft",
    27u16 => "BracketRight",
    28u16 => "Enter",
    29u16 => "ControlLeft",
    30u16 => "KeyA",
    31u16 => "KeyS",
    32u16 => "KeyD",
    33u16 => "KeyF",
    34u16 => "KeyG",
    35u16 => "KeyH",
    36u16 => "KeyJ",
    37u16 => "KeyK",
    38u16 => "KeyL",
    39u16 => "Semicolon",
    40u16 => "Quote",
    41u16 => "Backquote",
    42u16 => "ShiftLeft",
    43u16 => "Backslash",
    44u16 => "KeyZ",
    45u16 => "KeyX",
    46u16 => "KeyC",
    47u16 => "KeyV",
    48u16 => "KeyB",
    49u16 => "KeyN",
    50u16 => "KeyM",
    51u16 => "Comma",
    52u16 => "Period",
    53u16 => "Slash",
    54u16 => "ShiftRight",
    55u16 => "NumpadMultiply",
    56u16 => "AltLeft",
    57u16 => "Space",
    58u16 => "CapsLock",
    59u16 => "F1",
    60u16 => "F2",
    61u16 => "F3",
    62u16 => "F4",
    63u16 => "F5",
    64u16 => "F6",
    65u16 => "F7",
    66u16 => "F8",
    67u16 => "F9",
    68u16 => "F10",
    69u16 => "NumLock",
    70u16 => "ScrollLock",
    71u16 => "Numpad7",
    72u16 => "Numpad8",
    73u16 => "Numpad9",
    74u16 => "NumpadSubtract",
    75u16 => "Numpad4",
    76u16 => "Numpad5",
    77u16 => "Numpad6",
    78u16 => "NumpadAdd",
    79u16 => "Numpad1",
    80u16 => "Numpad2",
    81u16 => "Numpad3",
    82u16 => "Numpad0",
    83u16 => "NumpadDecimal",
    86u16 => "IntlBackslash",
    87u16 => "F11",
    88u16 => "F12",
    96u16 => "NumpadEnter",
    97u16 => "ControlRight",
    98u16 => "NumpadDivide",
    99u16 => "PrintScreen",
    100u16 => "AltRight",
    102u16 => "Home",
    103u16 => "ArrowUp",
    104u16 => "PageUp",
    105u16 => "ArrowLeft",
    106u16 => "ArrowRight",
    107u16 => "End",
    108u16 => "ArrowDown",
    109u16 => "PageDown",
    110u16 => "Insert",
    111u16 => "Delete",
    119u16 => "Pause",
    125u16 => "MetaLeft",
    126u16 => "MetaRight",
    127u16 => "ContextMenu",
};

/// Key-code string for an evdev key code; unknown codes become `Evdev<n>`.
#[inline]
pub fn web_code(code: u16) -> String {
    match WEB_CODES.get(&code) {
        Some(name) => (*name).to_string(),
        None => format!("Evdev{code}"),
    }
}

#[inline]
pub fn get_event_type_name(type_: u16) -> &'static str {
    match i32::from(type_) {
        EV_SYN => "EV_SYN",
        EV_KEY => "EV_KEY",
        EV_REL => "EV_REL",
        EV_ABS => "EV_ABS",
        EV_MSC => "EV_MSC",
        EV_LED => "EV_LED",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_map_to_web_names() {
        assert_eq!(web_code(30), "KeyA");
        assert_eq!(web_code(57), "Space");
        assert_eq!(web_code(999), "Evdev999");
    }
}
