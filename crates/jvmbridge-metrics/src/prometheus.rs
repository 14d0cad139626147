//! Prometheus text exposition format.
//!
//! Renders gauge samples into the Prometheus text exposition format
//! for scraping by a Prometheus server or compatible agent.

use std::fmt::Write;

use jvmbridge_introspect::CounterKind;

use crate::registry::Sample;

/// Render samples into Prometheus text format.
///
/// Samples sharing a base name are grouped under one `# HELP` / `# TYPE`
/// header. A group is typed `counter` only when every sample in it comes
/// from a counter. Tags become labels and the unit becomes a `type` label.
pub fn render_prometheus(samples: &[Sample]) -> String {
    let mut sorted: Vec<&Sample> = samples.iter().collect();
    sorted.sort_by(|a, b| a.identifier.cmp(&b.identifier));

    let mut out = String::new();
    for group in sorted.chunk_by(|a, b| a.identifier.base_name() == b.identifier.base_name()) {
        let base = group[0].identifier.base_name();
        let name = metric_name(base);
        let kind = if group.iter().all(|s| s.kind == CounterKind::Counter) {
            "counter"
        } else {
            "gauge"
        };
        let _ = writeln!(out, "# HELP {name} {}", help_text(base));
        let _ = writeln!(out, "# TYPE {name} {kind}");

        for s in group {
            out.push_str(&name);
            let mut labels = s.identifier.labels().peekable();
            if labels.peek().is_some() {
                out.push('{');
                for (i, (k, v)) in labels.enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    let _ = write!(out, "{}=\"{}\"", metric_name(k), escape_label_value(v));
                }
                out.push('}');
            }
            let _ = writeln!(out, " {}", format_value(s.value));
        }
    }

    out
}

fn help_text(base: &str) -> &'static str {
    if base.starts_with("jvm_gc_") {
        "Garbage collector statistics."
    } else if base.starts_with("jvm_memory_") {
        "Memory usage by area and pool."
    } else if base.starts_with("nio_bufferPool_") {
        "NIO buffer pool statistics."
    } else if base == "jvm_threads" {
        "Thread counts."
    } else if base == "jvm_classes" {
        "Class loading counts."
    } else if base == "jvm_process_cpu_usage" {
        "Process CPU usage in percent (0-100)."
    } else {
        "Runtime metric."
    }
}

/// Replace characters not allowed in metric and label names.
fn metric_name(raw: &str) -> String {
    raw.chars()
        .enumerate()
        .map(|(i, c)| match c {
            'a'..='z' | 'A'..='Z' | '_' | ':' => c,
            '0'..='9' if i > 0 => c,
            _ => '_',
        })
        .collect()
}

fn escape_label_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        let inf = if value > 0.0 { "+Inf" } else { "-Inf" };
        inf.to_string()
    } else {
        value.to_string()
    }
}
