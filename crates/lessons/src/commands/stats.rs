use lessons_core::StatsView;

fn render_stats(stats: &StatsView) -> String {
    if stats.total == 0 {
        return "No observations recorded.".to_string();
    }

    let mut out = format!(
        "Total observations: {}\n\
         Processed: {}\n\
         Pending: {}",
        stats.total, stats.processed, stats.unprocessed
    );

    if !stats.by_type.is_empty() {
        out.push_str("\n\nBy type:");
        for (kind, count) in &stats.by_type {
            out.push_str(&format!("\n  {:<6} {}", kind, count));
        }
    }

    if !stats.recent.is_empty() {
        out.push_str(&format!("\n\nRecent (last {}):", stats.recent.len()));
        for entry in &stats.recent {
            let marker = if entry.processed { " " } else { "*" };
            out.push_str(&format!(
                "\n  {} {} [{}] {}",
                marker,
                entry.timestamp.format("%Y-%m-%d %H:%M"),
                entry.artifact_type,
                truncate(&entry.summary, 60)
            ));
        }
    }

    out
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{}...", head)
}

pub fn run() -> anyhow::Result<()> {
    let engine = super::open_engine()?;
    println!("{}", render_stats(&engine.stats()?));
    Ok(())
}
