//! services/console/src/ui/panels.rs
//!
//! Read-only dashboard views: the stats sidebar, the archive and search
//! views, memory statistics, and the admin host panel.

use colored::Colorize;
use hr_insight_core::domain::{
    ArchivedConversation, MemoryStats, Performer, Role, SearchHit,
};
use regex::Regex;

use crate::adapters::host_metrics::HostSnapshot;
use crate::stats::StatsSnapshot;

/// How much of an archived message is shown before it is elided.
const PREVIEW_LIMIT: usize = 200;

/// The sidebar numbers: headcount, departments, indexed documents, health.
pub fn render_stats(snapshot: &StatsSnapshot) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Employees    {}\n",
        total_headcount(snapshot).to_string().bold()
    ));
    out.push_str(&format!(
        "Departments  {}\n",
        snapshot.departments.len().to_string().bold()
    ));
    out.push_str(&format!(
        "Documents    {}\n",
        snapshot.status.documents_indexed.to_string().bold()
    ));
    if snapshot.status.system_ready {
        out.push_str(&format!("{}\n", "System operational".green()));
    } else {
        out.push_str(&format!("{}\n", "System not ready".red()));
    }
    out.push_str(&format!(
        "Refreshed at {}",
        snapshot.refreshed_at.format("%H:%M:%S")
    ));
    out
}

fn total_headcount(snapshot: &StatsSnapshot) -> u32 {
    snapshot.departments.iter().map(|d| d.count).sum()
}

/// The top-performers ranking.
pub fn render_top_performers(performers: &[Performer]) -> String {
    if performers.is_empty() {
        return "No performance data available.".to_string();
    }
    performers
        .iter()
        .enumerate()
        .map(|(rank, p)| {
            let position = p.title.as_deref().unwrap_or("-");
            let department = p.department.as_deref().unwrap_or("-");
            format!(
                "{:>2}. {} {} — {} ({}) — score {}",
                rank + 1,
                p.first_name,
                p.last_name,
                position,
                department,
                p.score.to_string().bold()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A server-side archived conversation, message contents elided past the
/// preview limit as on the dashboard's history modal.
pub fn render_archive(conversation: &ArchivedConversation) -> String {
    let mut out = format!(
        "Session {} ({} messages)\n",
        short_session_id(&conversation.session_id).bold(),
        conversation.total_messages
    );
    for message in &conversation.messages {
        out.push_str(&format!(
            "  {} {} {}\n",
            message.timestamp.format("%Y-%m-%d %H:%M"),
            role_tag(message.role),
            preview(&message.content)
        ));
    }
    out.trim_end().to_string()
}

/// Cross-conversation search results with the query highlighted in each hit.
pub fn render_search_hits(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No results for \"{query}\".");
    }
    let pattern = search_pattern(query);
    let mut out = format!("{} result(s) for \"{query}\"\n", hits.len());
    for hit in hits {
        out.push_str(&format!(
            "  [{}] {} {} {}\n",
            short_session_id(&hit.session_id),
            hit.timestamp.format("%Y-%m-%d %H:%M"),
            role_tag(hit.role),
            highlight(&preview(&hit.content), pattern.as_ref())
        ));
    }
    out.trim_end().to_string()
}

/// Backend conversation-memory statistics.
pub fn render_memory_stats(stats: &MemoryStats) -> String {
    format!(
        "Sessions        {}\nMessages        {}\nActive (24h)    {}\nStore size      {:.1} MB\nRetention       {} days",
        stats.total_sessions,
        stats.total_messages,
        stats.active_sessions_24h,
        stats.db_size_mb,
        stats.retention_days
    )
}

/// The admin host panel. The gauges are fabricated placeholders, and the
/// panel says so.
pub fn render_host_panel(snapshot: HostSnapshot) -> String {
    format!(
        "CPU     {:>5.1} %\nMemory  {:>5.1} %\nUptime  {}\n{}",
        snapshot.cpu_percent,
        snapshot.memory_percent,
        format_uptime(snapshot.uptime_seconds),
        "(placeholder data — not real telemetry)".dimmed()
    )
}

/// Builds the case-insensitive highlight pattern for a search query.
/// Queries are treated as literal text, never as regex syntax.
fn search_pattern(query: &str) -> Option<Regex> {
    if query.trim().is_empty() {
        return None;
    }
    Regex::new(&format!("(?i){}", regex::escape(query.trim()))).ok()
}

fn highlight(text: &str, pattern: Option<&Regex>) -> String {
    match pattern {
        Some(pattern) => pattern
            .replace_all(text, |caps: &regex::Captures<'_>| {
                caps[0].yellow().bold().to_string()
            })
            .into_owned(),
        None => text.to_string(),
    }
}

fn preview(content: &str) -> String {
    if content.chars().count() > PREVIEW_LIMIT {
        let cut: String = content.chars().take(PREVIEW_LIMIT).collect();
        format!("{cut}...")
    } else {
        content.to_string()
    }
}

fn short_session_id(session_id: &str) -> String {
    let prefix: String = session_id.chars().take(8).collect();
    if prefix.len() < session_id.len() {
        format!("{prefix}...")
    } else {
        prefix
    }
}

fn role_tag(role: Role) -> &'static str {
    match role {
        Role::User => "you",
        Role::Assistant => "hr ",
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use hr_insight_core::domain::{DepartmentCount, SystemStatus};

    use super::*;

    fn snapshot() -> StatsSnapshot {
        StatsSnapshot {
            status: SystemStatus {
                status: "ok".to_string(),
                documents_indexed: 120,
                system_ready: true,
                memory_enabled: true,
                version: "2.0.0".to_string(),
            },
            departments: vec![
                DepartmentCount {
                    department: "Engineering".to_string(),
                    count: 42,
                },
                DepartmentCount {
                    department: "People".to_string(),
                    count: 7,
                },
            ],
            refreshed_at: Utc::now(),
        }
    }

    #[test]
    fn headcount_totals_across_departments() {
        assert_eq!(total_headcount(&snapshot()), 49);
    }

    #[test]
    fn search_pattern_is_case_insensitive_and_literal() {
        let pattern = search_pattern("Head Count?").unwrap();
        assert!(pattern.is_match("what is the head count? please"));
        assert!(pattern.is_match("HEAD COUNT?"));
        // The '?' must not act as a regex quantifier.
        assert!(!pattern.is_match("head coun"));
    }

    #[test]
    fn blank_queries_produce_no_pattern() {
        assert!(search_pattern("   ").is_none());
    }

    #[test]
    fn long_contents_are_elided() {
        let long = "x".repeat(300);
        let shown = preview(&long);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), PREVIEW_LIMIT + 3);
    }

    #[test]
    fn short_session_ids_are_not_elided() {
        assert_eq!(short_session_id("abc"), "abc");
        assert_eq!(short_session_id("abcdefgh-1234"), "abcdefgh...");
    }

    #[test]
    fn empty_search_results_say_so() {
        assert!(render_search_hits("vacation", &[]).contains("No results"));
    }
}
