// Plain-text rendering of the dashboard snapshot.

use crate::dashboard::{ActivityLog, LogLevel, PendingCommands, Snapshot};

/// Human-readable sizes, 1024-based like the backend's own formatter.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}

pub fn render_snapshot(snapshot: &Snapshot, pending: &PendingCommands) -> String {
    let mut out = String::new();

    if let Some(d) = &snapshot.dashboard {
        let name = d
            .user_name
            .as_deref()
            .or(d.email.as_deref())
            .unwrap_or("user");
        out.push_str(&format!(
            "{name}: {} / {} used ({:.1}%), {} files\n",
            format_bytes(d.used_bytes),
            format_bytes(d.quota_bytes),
            d.usage_percentage,
            d.total_files,
        ));
    }

    if let Some(n) = &snapshot.network {
        out.push_str(&format!(
            "cluster: {} nodes, {} chunks, {} / {} ({:.2}%)\n",
            n.total_nodes,
            n.total_chunks,
            format_bytes(n.used_storage_bytes),
            format_bytes(n.total_storage_bytes),
            n.utilization_percent,
        ));
    }

    let views = snapshot.node_views(pending);
    let active = views.iter().filter(|v| v.is_running).count();
    out.push_str(&format!("nodes ({active}/{} active):\n", views.len()));
    for view in &views {
        let badge = if view.is_running {
            "\u{25CF} Running"
        } else {
            "\u{25CB} Offline"
        };
        let applying = if view.pending.is_some() {
            "  [applying\u{2026}]"
        } else {
            ""
        };
        out.push_str(&format!("  {:<16} {badge}{applying}\n", view.node.node_id));
    }

    out.push_str(&format!("files ({}):\n", snapshot.files.len()));
    for file in &snapshot.files {
        out.push_str(&format!(
            "  #{:<6} {:<32} {}\n",
            file.id,
            file.file_name,
            format_bytes(file.size_bytes),
        ));
    }

    out
}

/// Flat file listing, one line per entry.
pub fn render_files(files: &[crate::api::FileEntry]) -> String {
    if files.is_empty() {
        return "No files stored.\n".to_string();
    }
    files
        .iter()
        .map(|file| {
            format!(
                "  #{:<6} {:<32} {}\n",
                file.id,
                file.file_name,
                format_bytes(file.size_bytes),
            )
        })
        .collect()
}

/// The last few activity entries, oldest first.
pub fn render_activity(log: &ActivityLog, limit: usize) -> String {
    let entries = log.entries();
    let skip = entries.len().saturating_sub(limit);
    entries
        .iter()
        .skip(skip)
        .map(|e| {
            let level = match e.level {
                LogLevel::Info => "INFO   ",
                LogLevel::Success => "SUCCESS",
                LogLevel::Error => "ERROR  ",
            };
            format!("{} {level} {}\n", e.timestamp.format("%H:%M:%S"), e.message)
        })
        .collect()
}
