//! Plain-text rendering and atomic file output.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use csdc_core::{AchievementRule, PlayerId, ScorecardRow, Standings, WeekTable};
use tempfile::NamedTempFile;

fn names(standings: &Standings) -> HashMap<PlayerId, &str> {
    standings
        .standings
        .iter()
        .map(|s| (s.player.id, s.player.name.as_str()))
        .collect()
}

fn mark(flag: bool) -> &'static str {
    if flag {
        "x"
    } else {
        "."
    }
}

fn flags(row: &ScorecardRow) -> String {
    match &row.achievements {
        Some(a) => [
            a.uniq, a.brenter, a.brend, a.god, a.rune, a.threerune, a.orb, a.win,
        ]
        .iter()
        .map(|&f| mark(f))
        .collect::<Vec<_>>()
        .join(" "),
        None => "- - - - - - - -".to_string(),
    }
}

pub fn week_table(table: &WeekTable, standings: &Standings) -> String {
    let names = names(standings);
    let mut out = String::new();
    let _ = writeln!(out, "Week {} ({})", table.week, table.combo);
    let _ = writeln!(
        out,
        "{:<16} {:<24} {:<15} {:>3} {:>3} {:>5}",
        "player", "game", "U E N G R 3 O W", "b1", "b2", "total"
    );
    for row in &table.rows {
        let (b1, b2) = row
            .achievements
            .map_or((0, 0), |a| (a.bonusone, a.bonustwo));
        let _ = writeln!(
            out,
            "{:<16} {:<24} {:<15} {:>3} {:>3} {:>5}",
            names.get(&row.player_id).copied().unwrap_or("?"),
            row.gid.as_deref().unwrap_or("-"),
            flags(row),
            b1,
            b2,
            row.total
        );
    }
    out
}

pub fn season_table(standings: &Standings) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", standings.season);
    let weeks: Vec<u32> = standings.weeks.iter().map(|t| t.week).collect();
    let mut header = format!("{:>4} {:<16}", "rank", "player");
    for n in &weeks {
        let _ = write!(header, " {:>3}", format!("w{}", n));
    }
    let _ = writeln!(
        out,
        "{} {:>4} {:>5} {:>3} {:>10}",
        header, "once", "total", "tb", "high"
    );
    for s in &standings.standings {
        let mut line = format!("{:>4} {:<16}", s.rank, s.player.name);
        for n in &weeks {
            let _ = write!(line, " {:>3}", s.week_totals.get(n).copied().unwrap_or(0));
        }
        let high = s.high_score.map_or("-".to_string(), |h| h.to_string());
        let _ = writeln!(
            out,
            "{} {:>4} {:>5} {:>3} {:>10}",
            line, s.one_time_points, s.grand_total, s.tiebreak, high
        );
    }
    out
}

pub fn rule_list(title: &str, rules: &[AchievementRule]) -> String {
    let mut out = format!("{}\n", title);
    for rule in rules {
        let _ = writeln!(out, "  {:<22} {:>2}  {}", rule.name, rule.points, rule.description);
    }
    out
}

/// Replace `path` with `standings` as JSON. Readers see either the old file
/// or the new one, never a partial write. Each call writes through its own
/// temporary file next to `path`, so overlapping calls cannot share one.
pub fn write_atomically(path: &Path, standings: &Standings) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create a temporary file in {}", dir.display()))?;
    serde_json::to_writer_pretty(&mut tmp, standings)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}
