use owo_colors::OwoColorize;
use std::collections::BTreeMap;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::data::Metric;
use crate::scoring::{Ranking, ScoredRecord};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a score with sign and three decimals ("+1.234", "-0.050")
pub fn format_score(score: f64) -> String {
    if score == 0.0 {
        // Avoid "-0.000"
        return "0.000".to_string();
    }
    format!("{:+.3}", score)
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate_text(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn context_line(scored: &ScoredRecord) -> String {
    let r = &scored.record;
    format!(
        "{} | {} | {} | {:.1} 90s",
        r.team,
        r.position_category,
        r.league,
        r.nineties.unwrap_or(0.0)
    )
}

/// Format ranked records as a table: Rank, Score, Player, then team / position / league / nineties.
/// No headers (minimal format). Player names are truncated to fit the terminal.
pub fn format_ranking_table(records: &[ScoredRecord], use_colors: bool) -> String {
    if records.is_empty() {
        return "No players ranked.".to_string();
    }

    let term_width = get_terminal_width();

    // Rank column: 4 chars ("999."), score: 7 chars ("+12.345")
    let rank_width = 4;
    let score_width = 7;
    let separator = "  ";

    records
        .iter()
        .map(|scored| {
            let rank_str = format!("{:>3}.", scored.rank);
            let score_padded = format!("{:>width$}", format_score(scored.final_score), width = score_width);
            let context = context_line(scored);

            let fixed_width = rank_width + 1 + score_width + separator.len() * 2 + context.chars().count();
            let player = match term_width {
                Some(width) if width > fixed_width + 10 => truncate_text(&scored.record.player, width - fixed_width),
                // Very narrow terminal, show truncated
                Some(_) => truncate_text(&scored.record.player, 20),
                // No terminal (pipe), don't truncate
                None => scored.record.player.clone(),
            };

            if use_colors {
                let score_colored = if scored.final_score >= 0.0 {
                    score_padded.green().bold().to_string()
                } else {
                    score_padded.red().to_string()
                };
                format!(
                    "{} {}{}{}{}{}",
                    rank_str.dimmed(),
                    score_colored,
                    separator,
                    player.bold(),
                    separator,
                    context.cyan()
                )
            } else {
                format!(
                    "{} {}{}{}{}{}",
                    rank_str, score_padded, separator, player, separator, context
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Multi-line breakdown of one record (for verbose mode)
pub fn format_record_detail(scored: &ScoredRecord, use_colors: bool) -> String {
    let r = &scored.record;
    let metrics = Metric::ALL
        .iter()
        .map(|m| {
            format!(
                "    {:<16} p90 {:>7} -> adj {:>7}  z {:>7}  | total {:>7}  z {:>7}",
                m.key(),
                format_opt(r.per90.get(*m)),
                format_opt(scored.adjusted_per90.get(*m)),
                format_score(scored.z_rate.get(*m)),
                format_opt(r.totals.get(*m)),
                format_score(scored.z_total.get(*m)),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let title = format!("{}. {}", scored.rank, r.player);
    let title = if use_colors {
        title.bold().to_string()
    } else {
        title
    };
    format!(
        "{}\n  {} ({})\n  Competition weight: x{}  Reliability: {:.3}\n{}\n  Rate: {}  Total: {}  Raw: {}  Minutes factor: {:.3}  Final: {}",
        title,
        context_line(scored),
        r.position,
        scored.comp_weight,
        scored.reliability,
        metrics,
        format_score(scored.rate_score),
        format_score(scored.total_score),
        format_score(scored.raw_score),
        scored.minutes_factor,
        format_score(scored.final_score),
    )
}

fn format_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.3}", v),
        None => "-".to_string(),
    }
}

/// Format ranked records as tab-separated values for scripting, with a header row
pub fn format_tsv(records: &[ScoredRecord]) -> String {
    let mut lines = vec![
        "rank\tplayer\tteam\tposition\tleague\tnineties\traw_score\tminutes_factor\tfinal_score".to_string(),
    ];
    lines.extend(records.iter().map(|s| {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{:.6}\t{:.6}\t{:.6}",
            s.rank,
            s.record.player,
            s.record.team,
            s.record.position_category,
            s.record.league,
            format_opt(s.record.nineties),
            s.raw_score,
            s.minutes_factor,
            s.final_score
        )
    }));
    lines.join("\n")
}

/// Full ranking with every intermediate column, as pretty JSON
pub fn format_json(ranking: &Ranking) -> serde_json::Result<String> {
    serde_json::to_string_pretty(ranking)
}

/// Best `top_n` records of each competition, keeping overall ranking order within each.
pub fn top_by_competition(records: &[ScoredRecord], top_n: usize) -> BTreeMap<&str, Vec<&ScoredRecord>> {
    let mut out: BTreeMap<&str, Vec<&ScoredRecord>> = BTreeMap::new();
    for scored in records {
        let bucket = out.entry(scored.record.league.as_str()).or_default();
        if bucket.len() < top_n {
            bucket.push(scored);
        }
    }
    out
}
