// Snapshot printers: a localized human-readable report and a JSON document
// with a `meta` block describing the thresholds the session ran with. Both
// cover every device category of a session.

use colored::*;
use serde::Serialize;
use std::io::{self, Write};

use crate::engine::snapshot::Snapshot;
use crate::engine::Thresholds;
use crate::labels::{channel_label, Locale};
use crate::session::{DeviceCategory, Session};
use crate::util::{format_opt_us, format_us};

/// Metadata included in JSON snapshot output.
#[derive(Debug, Serialize)]
pub struct Meta {
    pub chatter_us: u64,
    pub double_click_window_us: u64,
    pub faulty_double_click_us: u64,
    pub wheel_bounce_us: u64,
    pub max_hz: f64,
    pub timing_window: usize,
    pub log_capacity: usize,
    pub runtime_us: Option<u64>,
}

impl Meta {
    pub fn new(thresholds: &Thresholds, runtime_us: Option<u64>) -> Self {
        Meta {
            chatter_us: thresholds.chatter.as_micros() as u64,
            double_click_window_us: thresholds.double_click_window.as_micros() as u64,
            faulty_double_click_us: thresholds.faulty_double_click.as_micros() as u64,
            wheel_bounce_us: thresholds.wheel_bounce.as_micros() as u64,
            max_hz: thresholds.max_hz,
            timing_window: thresholds.timing_window,
            log_capacity: thresholds.log_capacity,
            runtime_us,
        }
    }
}

/// Writes `{"meta": .., "keyboard": .., "mouse": ..}` as pretty JSON
/// followed by a newline.
pub fn print_session_json(session: &Session, mut writer: impl Write) -> io::Result<()> {
    #[derive(Serialize)]
    struct Output {
        meta: Meta,
        keyboard: Snapshot,
        mouse: Snapshot,
    }

    let output = Output {
        meta: Meta::new(session.thresholds(), session.runtime_us()),
        keyboard: session.engine(DeviceCategory::Keyboard).snapshot(),
        mouse: session.engine(DeviceCategory::Mouse).snapshot(),
    };
    serde_json::to_writer_pretty(&mut writer, &output)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer)
}

struct Headings {
    title: &'static str,
    keyboard: &'static str,
    mouse: &'static str,
    overall: &'static str,
    total: &'static str,
    tested: &'static str,
    active: &'static str,
    max_concurrent: &'static str,
    runtime: &'static str,
    anomalies: &'static str,
    chatter: &'static str,
    double_clicks: &'static str,
    faulty: &'static str,
    wheel: &'static str,
    polling: &'static str,
    per_channel: &'static str,
    columns: &'static str,
    none: &'static str,
}

const EN: Headings = Headings {
    title: "--- input-probe snapshot ---",
    keyboard: "=== Keyboard ===",
    mouse: "=== Mouse ===",
    overall: "--- Overall ---",
    total: "Events:",
    tested: "Channels Tested:",
    active: "Currently Held:",
    max_concurrent: "Max Concurrent:",
    runtime: "Runtime:",
    anomalies: "--- Anomalies ---",
    chatter: "Chatter:",
    double_clicks: "Double Clicks:",
    faulty: "Faulty Double Clicks:",
    wheel: "Wheel (up/down/left/right, bounces):",
    polling: "Polling (avg / max Hz, jitter, samples, discarded):",
    per_channel: "--- Per Channel ---",
    columns: "Format: Channel: Down / Up / Repeat, Chatter (Held: Last / Min / Max)",
    none: "--- No input recorded ---",
};

const ZH: Headings = Headings {
    title: "--- input-probe 快照 ---",
    keyboard: "=== 键盘 ===",
    mouse: "=== 鼠标 ===",
    overall: "--- 总览 ---",
    total: "事件数:",
    tested: "已测试按键:",
    active: "当前按住:",
    max_concurrent: "最大同时按下:",
    runtime: "运行时长:",
    anomalies: "--- 异常 ---",
    chatter: "连击抖动:",
    double_clicks: "双击:",
    faulty: "异常双击:",
    wheel: "滚轮 (上/下/左/右, 回跳):",
    polling: "回报率 (平均 / 最高 Hz, 抖动, 样本, 丢弃):",
    per_channel: "--- 各通道 ---",
    columns: "格式: 通道: 按下 / 松开 / 重复, 抖动 (按住: 最近 / 最短 / 最长)",
    none: "--- 尚无输入 ---",
};

/// Writes a localized, human-readable report with one section per device.
pub fn print_session_human(session: &Session, locale: Locale, mut w: impl Write) -> io::Result<()> {
    let h = match locale {
        Locale::En => &EN,
        Locale::Zh => &ZH,
    };

    writeln!(w, "{}", h.title.bold().blue().underline())?;
    for (category, engine) in session.engines() {
        let heading = match category {
            DeviceCategory::Keyboard => h.keyboard,
            DeviceCategory::Mouse => h.mouse,
        };
        writeln!(w, "\n{}", heading.bold().bright_white())?;
        write_snapshot_human(&engine.snapshot(), h, locale, &mut w)?;
    }
    Ok(())
}

fn write_snapshot_human(
    snapshot: &Snapshot,
    h: &Headings,
    locale: Locale,
    w: &mut impl Write,
) -> io::Result<()> {
    writeln!(w, "{}", h.overall.bold().blue())?;
    writeln!(w, "{} {}", h.total.bold(), snapshot.total_event_count.to_string().bright_white().bold())?;
    writeln!(w, "{} {}", h.tested.bold(), snapshot.tested_key_count)?;
    let held: Vec<_> = snapshot
        .active
        .iter()
        .map(|c| channel_label(c, locale))
        .collect();
    writeln!(w, "{} {} [{}]", h.active.bold(), snapshot.active_count, held.join(", "))?;
    writeln!(w, "{} {}", h.max_concurrent.bold(), snapshot.max_concurrent.to_string().bright_cyan().bold())?;
    writeln!(w, "{} {}", h.runtime.bold(), format_opt_us(snapshot.runtime_us))?;

    writeln!(w, "\n{}", h.anomalies.bold().blue())?;
    let count = |n: u64| {
        if n > 0 {
            n.to_string().bright_red().bold()
        } else {
            n.to_string().green()
        }
    };
    writeln!(w, "{} {}", h.chatter.bold(), count(snapshot.chatter_count))?;
    writeln!(w, "{} {}", h.double_clicks.bold(), snapshot.double_click_count)?;
    writeln!(w, "{} {}", h.faulty.bold(), count(snapshot.faulty_double_click_count))?;
    let wheel = &snapshot.wheel;
    writeln!(
        w,
        "{} {}/{}/{}/{}, {}",
        h.wheel.bold(),
        wheel.up,
        wheel.down,
        wheel.left,
        wheel.right,
        count(wheel.bounces)
    )?;
    writeln!(
        w,
        "{} {:.1} / {:.1}, {:.3} ms, {}, {}",
        h.polling.bold(),
        snapshot.avg_hz,
        snapshot.max_hz,
        snapshot.jitter_ms,
        snapshot.sample_count,
        snapshot.discarded_samples
    )?;

    if snapshot.per_channel.is_empty() {
        writeln!(w, "\n{}", h.none.green().bold())?;
        return Ok(());
    }

    writeln!(w, "\n{}", h.per_channel.bold().blue())?;
    writeln!(w, "{}", h.columns.dimmed())?;
    for (channel, c) in &snapshot.per_channel {
        let name = format!("{} ({channel})", channel_label(channel, locale));
        write!(
            w,
            "  {}: {} / {} / {}, {}",
            name.bright_magenta().bold(),
            c.down,
            c.up,
            c.repeat,
            count(c.chatter)
        )?;
        if let Some(last) = c.last_held_us {
            write!(
                w,
                " ({} / {} / {})",
                format_us(last),
                format_opt_us(c.min_held_us),
                format_opt_us(c.max_held_us)
            )?;
        }
        if c.pressed {
            write!(w, " {}", "*".bright_yellow().bold())?;
        }
        writeln!(w)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::channel::ChannelId;
    use crate::event::InputEvent;

    fn sample_session() -> Session {
        let mut session = Session::new(Thresholds::default());
        let a = ChannelId::key("KeyA");
        session.process(&InputEvent::down(a.clone(), 0));
        session.process(&InputEvent::up(a.clone(), 40_000));
        session.process(&InputEvent::down(a, 60_000));
        session.process(&InputEvent::down(ChannelId::Button(0), 70_000));
        session
    }

    #[test]
    fn json_report_has_meta_and_both_devices() {
        let mut buf = Vec::new();
        print_session_json(&sample_session(), &mut buf).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(v["meta"]["chatter_us"], 80_000);
        assert_eq!(v["meta"]["faulty_double_click_us"], 80_000);
        assert_eq!(v["meta"]["runtime_us"], 70_000);
        assert_eq!(v["keyboard"]["chatter_count"], 1);
        assert_eq!(v["keyboard"]["per_channel"]["KeyA"]["down"], 2);
        assert_eq!(v["keyboard"]["active"][0], "KeyA");
        assert_eq!(v["mouse"]["active"][0], "Mouse0");
        assert_eq!(v["mouse"]["max_concurrent"], 1);
    }

    #[test]
    fn human_report_is_localized() {
        colored::control::set_override(false);
        let session = sample_session();

        let mut en = Vec::new();
        print_session_human(&session, Locale::En, &mut en).unwrap();
        let en = String::from_utf8(en).unwrap();
        assert!(en.contains("=== Keyboard ==="));
        assert!(en.contains("=== Mouse ==="));
        assert!(en.contains("Chatter: 1"));
        assert!(en.contains("A (KeyA): 2 / 1 / 0, 1"));
        assert!(en.contains("Left (Mouse0): 1 / 0 / 0, 0"));

        let mut zh = Vec::new();
        print_session_human(&session, Locale::Zh, &mut zh).unwrap();
        let zh = String::from_utf8(zh).unwrap();
        assert!(zh.contains("=== 键盘 ==="));
        assert!(zh.contains("连击抖动: 1"));
    }
}
