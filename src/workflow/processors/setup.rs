//! Logger initialization
//!
//! Progress lines go to standard output through `env_logger`, one line per
//! file event. A `duration` key-value on a record is rendered in a fixed-width
//! column in front of the message.

use anstyle::Style;
use env_logger::{Builder, Target, WriteStyle};
use log::kv::Key;
use std::io::Write;

const DURATION_WIDTH: usize = 10;

/// Format a `{:?}`-rendered duration such as `12.3456ms` as `12.35 ms`.
fn format_duration(raw: &str) -> String {
    if let Some(idx) = raw.find(|c: char| c.is_alphabetic()) {
        let (num, unit) = (&raw[..idx], &raw[idx..]);
        if let Ok(val) = num.parse::<f32>() {
            return format!("{:.2} {}", val, unit);
        }
    }
    raw.to_string()
}

pub fn initialize_logger() {
    Builder::new()
        .write_style(WriteStyle::Auto)
        .format(|buf, record| {
            let dim = Style::new().dimmed();
            let ts = buf.timestamp_seconds();

            let level_style = buf.default_level_style(record.level());

            let dur_raw = record
                .key_values()
                .get(Key::from("duration"))
                .map(|v| format_duration(&v.to_string()))
                .unwrap_or_default();
            let dur = format!("{:>width$}", dur_raw, width = DURATION_WIDTH);

            let message = format!("{}", record.args());
            let mut lines = message.lines();

            write!(
                buf,
                "{}{}{} {}{:<5}{} {}",
                dim.render(),
                ts,
                dim.render_reset(),
                level_style.render(),
                record.level(),
                level_style.render_reset(),
                dur,
            )?;
            writeln!(buf, " {}", lines.next().unwrap_or_default())?;

            // Continuation lines (error chains) line up under the message column.
            for line in lines {
                writeln!(buf, "{:indent$}{}", "", line, indent = DURATION_WIDTH + 2)?;
            }

            Ok(())
        })
        .target(Target::Stdout)
        .filter(None, log::LevelFilter::Info)
        .init();
}
