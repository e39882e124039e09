//! Line formatting shared by every adapter
//!
//! Layout: `[MM/dd HH:mm:ss.fff] [E] [k=v, k2=v2] message`. The tag segment
//! is left out when the record carries no tag.

use super::record::LogRecord;
use chrono::{DateTime, Local};
use colored::Colorize;

/// strftime pattern for the line timestamp
pub const LINE_TIMESTAMP: &str = "%m/%d %H:%M:%S%.3f";

/// Format a timestamp the way log lines show it
pub fn format_timestamp(time: &DateTime<Local>) -> String {
    time.format(LINE_TIMESTAMP).to_string()
}

/// Render one record as a line, without the trailing newline
pub fn format_line(record: &LogRecord) -> String {
    compose(record, record.severity.label().to_string())
}

/// Same as [`format_line`] with the severity label colored
pub fn format_line_colored(record: &LogRecord) -> String {
    let label = record
        .severity
        .label()
        .color(record.severity.color_code())
        .to_string();
    compose(record, label)
}

fn compose(record: &LogRecord, label: String) -> String {
    let timestamp = format_timestamp(&record.local_time());
    let message = record.message();
    let mut line = String::with_capacity(timestamp.len() + record.tag.len() + message.len() + 12);
    line.push('[');
    line.push_str(&timestamp);
    line.push_str("] ");
    line.push_str(&label);
    line.push(' ');
    if !record.tag.is_empty() {
        line.push_str(&record.tag);
        line.push(' ');
    }
    line.push_str(&message);
    line
}

/// Substitute `args` into `payload`
///
/// `{}` takes the next argument, `{N}` the N-th; `{{` and `}}` are literal
/// braces. Placeholders without a matching argument stay as written. With
/// no arguments the payload is used verbatim.
pub fn render_message(payload: &str, args: &[String]) -> String {
    if args.is_empty() {
        return sanitize(payload);
    }

    let mut out = String::with_capacity(payload.len() + args.iter().map(String::len).sum::<usize>());
    let mut next = 0usize;
    let mut rest = payload;

    while let Some(pos) = rest.find(|c: char| c == '{' || c == '}') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('}') {
            out.push('}');
            rest = &tail[1..];
            continue;
        }

        // tail starts with '{'
        match tail[1..].find('}') {
            Some(close) => {
                let inner = &tail[1..1 + close];
                let index = if inner.is_empty() {
                    let i = next;
                    next += 1;
                    Some(i)
                } else if inner.bytes().all(|b| b.is_ascii_digit()) {
                    inner.parse::<usize>().ok()
                } else {
                    None
                };
                match index.and_then(|i| args.get(i)) {
                    Some(arg) => out.push_str(arg),
                    None => out.push_str(&tail[..close + 2]),
                }
                rest = &tail[close + 2..];
            }
            None => {
                out.push_str(tail);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    sanitize(&out)
}

/// Escape line breaks and tabs so one record is always one line
pub fn sanitize(message: &str) -> String {
    if !message.contains(|c: char| matches!(c, '\n' | '\r' | '\t')) {
        return message.to_string();
    }
    message
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}
