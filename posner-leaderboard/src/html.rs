use crate::board::Leaderboard;
use chrono::NaiveDateTime;
use std::fmt::Write;

const STYLE: &str = "\
body { font-family: Arial, sans-serif; margin: 20px; }
h1 { color: #333; text-align: center; }
table { width: 100%; border-collapse: collapse; margin-top: 20px; }
th, td { padding: 12px; text-align: left; border-bottom: 1px solid #ddd; }
th { background-color: #4CAF50; color: white; }
tr:nth-child(even) { background-color: #f2f2f2; }
.gold { background-color: gold !important; }
.silver { background-color: silver !important; }
.bronze { background-color: #cd7f32 !important; }";

const HEADERS: [&str; 7] = [
    "Rank",
    "Participant",
    "Response Time (s)",
    "Response Time Valid Cues (s)",
    "Response Time Invalid Cues (s)",
    "Response Time Difference (s)",
    "Accuracy",
];

/// Renders the ranked table as a self-refreshing HTML page.
pub fn render(board: &Leaderboard, updated: NaiveDateTime, refresh_secs: u64) -> String {
    let mut html = String::new();
    // Writing into a String cannot fail.
    let _ = write_page(&mut html, board, updated, refresh_secs);
    html
}

fn write_page(
    out: &mut String,
    board: &Leaderboard,
    updated: NaiveDateTime,
    refresh_secs: u64,
) -> std::fmt::Result {
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html>")?;
    writeln!(out, "<head>")?;
    writeln!(out, "<meta charset=\"utf-8\">")?;
    writeln!(out, "<title>Leaderboard</title>")?;
    writeln!(out, "<meta http-equiv=\"refresh\" content=\"{refresh_secs}\">")?;
    writeln!(out, "<style>\n{STYLE}\n</style>")?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, "<h1>Experiment Leaderboard</h1>")?;
    writeln!(
        out,
        "<p>Last updated: {}</p>",
        updated.format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(out, "<table id=\"leaderboardTable\">")?;
    write!(out, "<thead><tr>")?;
    for h in HEADERS {
        write!(out, "<th>{h}</th>")?;
    }
    writeln!(out, "</tr></thead>")?;
    writeln!(out, "<tbody>")?;
    for (i, entry) in board.entries().iter().enumerate() {
        let class = match i {
            0 => " class=\"gold\"",
            1 => " class=\"silver\"",
            2 => " class=\"bronze\"",
            _ => "",
        };
        writeln!(
            out,
            "<tr{class}><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.1}%</td></tr>",
            i + 1,
            escape(&entry.participant),
            seconds(entry.mean_rt),
            seconds(entry.mean_rt_valid),
            seconds(entry.mean_rt_invalid),
            seconds(entry.rt_difference),
            entry.accuracy * 100.0,
        )?;
    }
    writeln!(out, "</tbody>")?;
    writeln!(out, "</table>")?;
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")
}

fn seconds(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.3}"))
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::ParticipantSummary;
    use chrono::NaiveDate;

    fn updated() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(14, 3, 9)
            .unwrap()
    }

    fn entry(participant: &str, mean_rt: f64) -> ParticipantSummary {
        ParticipantSummary {
            participant: participant.to_string(),
            n_trials: 40,
            mean_rt: Some(mean_rt),
            mean_rt_valid: Some(mean_rt - 0.02),
            mean_rt_invalid: None,
            rt_difference: None,
            accuracy: 0.975,
        }
    }

    #[test]
    fn page_has_refresh_timestamp_and_medals() {
        let mut board = Leaderboard::new();
        for (i, p) in ["a", "b", "c", "d"].iter().enumerate() {
            board.upsert(entry(p, 0.4 + i as f64 * 0.01));
        }
        let html = render(&board, updated(), 10);

        assert!(html.contains("<meta http-equiv=\"refresh\" content=\"10\">"));
        assert!(html.contains("Last updated: 2024-05-17 14:03:09"));
        assert!(html.contains("<tr class=\"gold\"><td>1</td><td>a</td><td>0.400</td><td>0.380</td><td>n/a</td><td>n/a</td><td>97.5%</td></tr>"));
        assert!(html.contains("<tr class=\"silver\"><td>2</td><td>b</td>"));
        assert!(html.contains("<tr class=\"bronze\"><td>3</td><td>c</td>"));
        assert!(html.contains("<tr><td>4</td><td>d</td>"));
    }

    #[test]
    fn participant_names_are_escaped() {
        let mut board = Leaderboard::new();
        board.upsert(entry("<script>&\"x\"", 0.5));
        let html = render(&board, updated(), 5);
        assert!(html.contains("<td>&lt;script&gt;&amp;&quot;x&quot;</td>"));
        assert!(!html.contains("<script>"));
    }
}
