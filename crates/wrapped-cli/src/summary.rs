use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use wrapped_engine::WrappedStats;
use wrapped_types::AgentKind;

/// Print the console summary of one wrapped year.
pub fn print_summary(stats: &WrappedStats) {
    let color = std::io::stdout().is_terminal();

    println!();
    println!("{}", heading(&format!("Code Wrapped {}", stats.year), color));
    println!();

    if stats.total_sessions == 0 {
        println!("No sessions found for {}. Nothing to wrap up!", stats.year);
        println!();
        return;
    }

    println!("{} sessions", big_number(stats.total_sessions, color));
    println!("{} conversation turns", big_number(stats.total_turns, color));
    if stats.total_tokens > 0 {
        println!("{} tokens consumed", big_number(stats.total_tokens, color));
    }
    println!(
        "{} hours of AI pair programming",
        accent(&format!("{:.1}", stats.total_duration_minutes / 60.0), color)
    );
    println!();

    print_agent_table(stats, color);
    print_top("Top Repositories:", &top(&stats.all_repos, 5), "sessions", color);
    print_top("Top Tools:", &top(&stats.all_tools, 5), "uses", color);

    println!("{}", bold("Fun Facts:", color));
    if let Some(hour) = stats.peak_hour {
        println!("  Peak productivity hour: {}:00", hour);
    }
    if let Some(day) = &stats.most_active_day {
        println!(
            "  Most active day: {} ({} sessions)",
            day, stats.most_active_day_sessions
        );
    }
    println!("  Active days: {}", stats.active_days);
    println!("  Longest streak: {} days", stats.longest_streak_days);
    println!();
}

fn print_agent_table(stats: &WrappedStats, color: bool) {
    println!("{}", bold("By Agent:", color));
    println!(
        "  {:<10} {:>10} {:>10} {:>10} {:>8}",
        "Agent", "Sessions", "Turns", "Avg Turns", "Hours"
    );
    for agent in AgentKind::ALL {
        let Some(agent_stats) = stats.agent_stats.get(&agent) else {
            continue;
        };
        if agent_stats.session_count == 0 {
            continue;
        }
        println!(
            "  {:<10} {:>10} {:>10} {:>10.0} {:>8.1}",
            agent.as_str(),
            agent_stats.session_count,
            agent_stats.turn_count,
            agent_stats.avg_turns_per_session(),
            agent_stats.total_duration_minutes / 60.0,
        );
    }
    println!();
}

fn print_top(
    title: &str,
    entries: &[(String, u64)],
    unit: &str,
    color: bool,
) {
    if entries.is_empty() {
        return;
    }
    println!("{}", bold(title, color));
    for (name, count) in entries {
        println!("  {}: {} {}", name, count, unit);
    }
    println!();
}

fn top(distribution: &std::collections::BTreeMap<String, u64>, n: usize) -> Vec<(String, u64)> {
    let mut entries: Vec<(String, u64)> = distribution
        .iter()
        .map(|(name, count)| (name.clone(), *count))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(n);
    entries
}

fn heading(text: &str, color: bool) -> String {
    if color {
        text.bold().cyan().to_string()
    } else {
        text.to_string()
    }
}

fn big_number(value: u64, color: bool) -> String {
    accent(&group_thousands(value), color)
}

fn accent(text: &str, color: bool) -> String {
    if color {
        text.bold().green().to_string()
    } else {
        text.to_string()
    }
}

fn bold(text: &str, color: bool) -> String {
    if color {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }
}
