use crate::rcv::*;

const EXHAUSTED: &str = "EXHAUSTED";

// Left-aligned columns separated by two spaces, with a dashed rule below the headers.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }
    let line = |cells: Vec<String>| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect::<Vec<String>>()
            .join("  ")
            .trim_end()
            .to_string()
    };
    let mut out: Vec<String> = Vec::new();
    out.push(line(headers.iter().map(|h| h.to_string()).collect()));
    out.push(line(widths.iter().map(|w| "-".repeat(*w)).collect()));
    for row in rows {
        out.push(line(row.clone()));
    }
    out.join("\n")
}

fn percentage(w: &VoteWeight, total: &VoteWeight) -> String {
    match w.percent_of(total) {
        Some(p) => format!("{}%", p),
        None => "-".to_string(),
    }
}

// Highest tally first, then by name.
fn sorted_tally(tally: &[(String, VoteWeight)]) -> Vec<(String, VoteWeight)> {
    let mut l = tally.to_vec();
    l.sort_by(|(n1, w1), (n2, w2)| w2.cmp(w1).then_with(|| n1.cmp(n2)));
    l
}

fn format_round(total: &VoteWeight, stats: &RoundStats) -> String {
    let mut rows: Vec<Vec<String>> = Vec::new();
    for (name, w) in sorted_tally(&stats.tally) {
        let result = if stats.tally_results_elected.iter().any(|e| e.name == name) {
            "Won"
        } else if stats.tally_result_eliminated.iter().any(|e| e.name == name) {
            "Eliminated"
        } else {
            "-"
        };
        rows.push(vec![
            name,
            w.to_string(),
            percentage(&w, total),
            result.to_string(),
        ]);
    }
    if stats.exhausted.is_positive() {
        rows.push(vec![
            EXHAUSTED.to_string(),
            stats.exhausted.to_string(),
            percentage(&stats.exhausted, total),
            "-".to_string(),
        ]);
    }
    let mut out = vec![render_table(
        &["Candidate", "Votes", "Percentage", "Result"],
        &rows,
    )];
    if let Some(p) = &stats.pairwise {
        out.push(format!(
            "{} eliminated: {} {} vs {} {}",
            p.losers.join(", "),
            p.first.0,
            p.first.1,
            p.second.0,
            p.second.1
        ));
    }
    out.join("\n")
}

pub fn format_voting_result(total: &VoteWeight, res: &VotingResult) -> String {
    let mut out: Vec<String> = vec![format!("{} votes cast", total)];
    out.push(format!("More than {} votes to win", res.threshold));
    for stats in res.round_stats.iter() {
        out.push(format!("Round {}:", stats.round));
        out.push(format_round(total, stats));
    }
    out.push(format!("Result: {} wins", res.winner));
    out.join("\n")
}

pub fn format_stv_result(total: &VoteWeight, res: &StvResult) -> String {
    let mut out: Vec<String> = vec![format!("{} votes cast, {} seats", total, res.seats)];
    for stats in res.round_stats.iter() {
        match &stats.quota {
            Some(q) => out.push(format!("Round {} ({} votes to win a seat):", stats.round, q)),
            None => out.push(format!("Round {}:", stats.round)),
        }
        out.push(format_round(total, stats));
    }
    for (idx, e) in res.elected.iter().enumerate() {
        let how = if e.by_default { " by default" } else { "" };
        out.push(format!(
            "Seat {}: {} wins{} in round {}",
            idx + 1,
            e.name,
            how,
            e.round
        ));
    }
    out.join("\n")
}

pub fn format_apportionment(res: &Apportionment) -> String {
    let total_votes: VoteWeight = res.parties.iter().map(|(_, v, _)| v).sum();
    let total_seats = VoteWeight::from_integer(res.total_seats() as u64);
    let mut parties = res.parties.clone();
    parties.sort_by(|(n1, v1, _), (n2, v2, _)| v2.cmp(v1).then_with(|| n1.cmp(n2)));
    let rows: Vec<Vec<String>> = parties
        .iter()
        .map(|(party, votes, seats)| {
            let seats_w = VoteWeight::from_integer(*seats as u64);
            vec![
                party.clone(),
                votes.to_string(),
                percentage(votes, &total_votes),
                seats.to_string(),
                percentage(&seats_w, &total_seats),
            ]
        })
        .collect();
    render_table(&["Party", "Votes", "Percentage", "Seats", "Seat %"], &rows)
}
