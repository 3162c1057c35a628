//! Locale label tables for the presentation layer.
//!
//! The engine only deals in channel identities and structured log kinds; these
//! tables turn them into display text for one locale.

use std::borrow::Cow;

use clap::ValueEnum;
use serde::Serialize;

use crate::engine::channel::ChannelId;
use crate::engine::detector::WheelDirection;
use crate::engine::log::{Classification, LogEntry, LogKind, ReleaseCause};
use crate::util::format_us;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Zh,
}

static KEY_LABELS_EN: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "Escape" => "Esc",
    "Backspace" => "Backspace",
    "Tab" => "Tab",
    "Enter" => "Enter",
    "Space" => "Space",
    "CapsLock" => "Caps Lock",
    "ShiftLeft" => "Left Shift",
    "ShiftRight" => "Right Shift",
    "ControlLeft" => "Left Ctrl",
    "ControlRight" => "Right Ctrl",
    "AltLeft" => "Left Alt",
    "AltRight" => "Right Alt",
    "MetaLeft" => "Left Win",
    "MetaRight" => "Right Win",
    "ContextMenu" => "Menu",
    "ArrowUp" => "↑",
    "ArrowDown" => "↓",
    "ArrowLeft" => "←",
    "ArrowRight" => "→",
    "PageUp" => "Page Up",
    "PageDown" => "Page Down",
    "PrintScreen" => "Print Screen",
    "ScrollLock" => "Scroll Lock",
    "NumLock" => "Num Lock",
    "Minus" => "-",
    "Equal" => "=",
    "BracketLeft" => "[",
    "BracketRight" => "]",
    "Backslash" => "\\",
    "Semicolon" => ";",
    "Quote" => "'",
    "Backquote" => "`",
    "Comma" => ",",
    "Period" => ".",
    "Slash" => "/",
    "NumpadAdd" => "Num +",
    "NumpadSubtract" => "Num -",
    "NumpadMultiply" => "Num *",
    "NumpadDivide" => "Num /",
    "NumpadDecimal" => "Num .",
    "NumpadEnter" => "Num Enter",
};

static KEY_LABELS_ZH: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "Escape" => "退出",
    "Backspace" => "退格",
    "Tab" => "制表",
    "Enter" => "回车",
    "Space" => "空格",
    "CapsLock" => "大写锁定",
    "ShiftLeft" => "左Shift",
    "ShiftRight" => "右Shift",
    "ControlLeft" => "左Ctrl",
    "ControlRight" => "右Ctrl",
    "AltLeft" => "左Alt",
    "AltRight" => "右Alt",
    "MetaLeft" => "左Win",
    "MetaRight" => "右Win",
    "ContextMenu" => "菜单",
    "PageUp" => "上翻页",
    "PageDown" => "下翻页",
    "Home" => "起始",
    "End" => "结尾",
    "Insert" => "插入",
    "Delete" => "删除",
    "PrintScreen" => "截屏",
    "ScrollLock" => "滚动锁定",
    "NumLock" => "数字锁定",
    "Pause" => "暂停",
    "NumpadEnter" => "小键盘回车",
};

const BUTTONS_EN: [&str; 5] = ["Left", "Middle", "Right", "Back", "Forward"];
const BUTTONS_ZH: [&str; 5] = ["左键", "中键", "右键", "后退键", "前进键"];

/// Display label for a channel.
///
/// Key codes resolve through the locale table, then the English table, then a
/// generic rule (`KeyA` -> `A`, `Digit1` -> `1`, `Numpad7` -> `Num 7`), and
/// finally the raw code.
pub fn channel_label(channel: &ChannelId, locale: Locale) -> Cow<'static, str> {
    match channel {
        ChannelId::Key(code) => {
            if locale == Locale::Zh {
                if let Some(label) = KEY_LABELS_ZH.get(code.as_str()).copied() {
                    return Cow::Borrowed(label);
                }
            }
            if let Some(label) = KEY_LABELS_EN.get(code.as_str()).copied() {
                return Cow::Borrowed(label);
            }
            if let Some(rest) = code.strip_prefix("Key").or_else(|| code.strip_prefix("Digit")) {
                if !rest.is_empty() {
                    return Cow::Owned(rest.to_string());
                }
            }
            if let Some(rest) = code.strip_prefix("Numpad") {
                return Cow::Owned(format!("Num {rest}"));
            }
            Cow::Owned(code.clone())
        }
        ChannelId::Button(idx) => {
            let table = match locale {
                Locale::En => &BUTTONS_EN,
                Locale::Zh => &BUTTONS_ZH,
            };
            match table.get(usize::from(*idx)).copied() {
                Some(name) => Cow::Borrowed(name),
                None => Cow::Owned(channel.to_string()),
            }
        }
        ChannelId::Wheel => Cow::Borrowed(match locale {
            Locale::En => "Wheel",
            Locale::Zh => "滚轮",
        }),
        ChannelId::Pointer => Cow::Borrowed(match locale {
            Locale::En => "Pointer",
            Locale::Zh => "指针",
        }),
    }
}

pub fn classification_label(classification: Classification, locale: Locale) -> &'static str {
    match (classification, locale) {
        (Classification::Normal, Locale::En) => "OK",
        (Classification::Warning, Locale::En) => "WARN",
        (Classification::Fault, Locale::En) => "FAULT",
        (Classification::Normal, Locale::Zh) => "正常",
        (Classification::Warning, Locale::Zh) => "警告",
        (Classification::Fault, Locale::Zh) => "故障",
    }
}

fn direction_label(direction: WheelDirection, locale: Locale) -> &'static str {
    match (direction, locale) {
        (WheelDirection::Up, Locale::En) => "up",
        (WheelDirection::Down, Locale::En) => "down",
        (WheelDirection::Up, Locale::Zh) => "向上",
        (WheelDirection::Down, Locale::Zh) => "向下",
    }
}

/// Renders a log entry's message in the given locale.
pub fn render_entry(entry: &LogEntry, locale: Locale) -> String {
    let zh = locale == Locale::Zh;
    let since = |d: &Option<u64>| match (d, zh) {
        (Some(us), _) => format!("+{}", format_us(*us)),
        (None, false) => "start".to_string(),
        (None, true) => "开始".to_string(),
    };

    match &entry.kind {
        LogKind::Down {
            channel,
            since_last_us,
            chatter,
            backwards,
        } => {
            let name = channel_label(channel, locale);
            let timing = if *backwards {
                String::from(if zh { "时间倒退" } else { "time went backwards" })
            } else {
                since(since_last_us)
            };
            let mut s = if zh {
                format!("{name} 按下 ({timing})")
            } else {
                format!("{name} down ({timing})")
            };
            if *chatter {
                s.push_str(if zh { " 连击抖动" } else { " chatter" });
            }
            s
        }
        LogKind::Up {
            channel,
            held_us,
            forced,
        } => {
            let name = channel_label(channel, locale);
            let mut s = if zh {
                format!("{name} 松开")
            } else {
                format!("{name} up")
            };
            if let Some(held) = held_us {
                if zh {
                    s.push_str(&format!(" (按住 {})", format_us(*held)));
                } else {
                    s.push_str(&format!(" (held {})", format_us(*held)));
                }
            }
            match (forced, zh) {
                (Some(ReleaseCause::FocusLost), false) => s.push_str(" [focus lost]"),
                (Some(ReleaseCause::FocusLost), true) => s.push_str(" [窗口失焦]"),
                (Some(ReleaseCause::MoveCorrection), false) => s.push_str(" [recovered]"),
                (Some(ReleaseCause::MoveCorrection), true) => s.push_str(" [已修正]"),
                (None, _) => {}
            }
            s
        }
        LogKind::DoubleClick {
            channel,
            interval_us,
        } => {
            let name = channel_label(channel, locale);
            if zh {
                format!("{name} 双击 ({})", format_us(*interval_us))
            } else {
                format!("{name} double click ({})", format_us(*interval_us))
            }
        }
        LogKind::FaultyDoubleClick {
            channel,
            interval_us,
        } => {
            let name = channel_label(channel, locale);
            if zh {
                format!("{name} 异常双击 ({})", format_us(*interval_us))
            } else {
                format!("{name} faulty double click ({})", format_us(*interval_us))
            }
        }
        LogKind::Scroll {
            direction,
            since_last_us,
            bounce,
        } => {
            let mut s = format!(
                "{} {} ({})",
                channel_label(&ChannelId::Wheel, locale),
                direction_label(*direction, locale),
                since(since_last_us)
            );
            if *bounce {
                s.push_str(if zh { " 回跳" } else { " bounce" });
            }
            s
        }
        LogKind::PollingStarted => String::from(if zh { "开始采样" } else { "polling started" }),
        LogKind::Reset => String::from(if zh { "已重置" } else { "reset" }),
    }
}
