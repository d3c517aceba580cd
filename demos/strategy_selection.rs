//! Example demonstrating strategy selection in the cycle-time engine.
//!
//! Builds mock changelog data and shows how the engine automatically routes
//! each item to the simple or the complex algorithm based on its history.
//!
//! To run this example:
//! ```bash
//! cargo run --example strategy_selection
//! ```

use cadence_rust::api::{AccountId, CycleTime, IssueKey};
use cadence_rust::engine::CycleTimeEngine;
use cadence_rust::models::history::{Actor, ChangeItem, HistoryEntry};
use cadence_rust::models::StatusVocabulary;

const PERSON_A: &str = "person-a-id";
const PERSON_B: &str = "person-b-id";
const PERSON_C: &str = "person-c-id";

fn status_change(created: &str, from: &str, to: &str) -> HistoryEntry {
    HistoryEntry {
        created: Some(created.to_string()),
        author: None,
        items: vec![ChangeItem {
            field: "status".to_string(),
            from_string: Some(from.to_string()),
            to_string: Some(to.to_string()),
            ..Default::default()
        }],
    }
}

fn assignee_change(created: &str, from: Option<&str>, to: Option<&str>) -> HistoryEntry {
    HistoryEntry {
        created: Some(created.to_string()),
        author: to.map(|id| Actor {
            account_id: Some(id.to_string()),
        }),
        items: vec![ChangeItem {
            field: "assignee".to_string(),
            from: from.map(str::to_string),
            to: to.map(str::to_string),
            ..Default::default()
        }],
    }
}

/// A clean process: one straight line from backlog to done.
fn simple_history() -> Vec<HistoryEntry> {
    vec![
        status_change("2025-01-01T10:00:00.000+0000", "Backlog", "In Development"),
        status_change("2025-01-05T15:00:00.000+0000", "In Development", "Done"),
    ]
}

/// Several assignees passing the item along.
fn handoff_history() -> Vec<HistoryEntry> {
    vec![
        assignee_change("2025-01-01T10:00:00.000+0000", None, Some(PERSON_A)),
        status_change("2025-01-01T10:05:00.000+0000", "Backlog", "In Development"),
        assignee_change("2025-01-03T14:00:00.000+0000", Some(PERSON_A), Some(PERSON_B)),
        assignee_change("2025-01-04T11:00:00.000+0000", Some(PERSON_B), Some(PERSON_C)),
        status_change("2025-01-06T16:00:00.000+0000", "In Development", "Done"),
    ]
}

/// Many transitions: rework loops and an excluded acceptance phase.
fn churny_history() -> Vec<HistoryEntry> {
    vec![
        status_change("2025-01-01T09:00:00.000+0000", "Backlog", "In Development"),
        status_change("2025-01-02T09:00:00.000+0000", "In Development", "In Review"),
        status_change("2025-01-03T09:00:00.000+0000", "In Review", "In Development"),
        status_change("2025-01-04T09:00:00.000+0000", "In Development", "In Review"),
        status_change("2025-01-05T09:00:00.000+0000", "In Review", "Acceptance"),
        status_change("2025-01-07T09:00:00.000+0000", "Acceptance", "Done"),
    ]
}

fn print_result(label: &str, result: &CycleTime) {
    match (result.in_progress_at, result.done_at, result.seconds) {
        (Some(started), Some(done), Some(seconds)) => {
            println!(
                "   {}: {} -> {} ({:.2} active days)",
                label,
                started.format("%Y-%m-%d %H:%M"),
                done.format("%Y-%m-%d %H:%M"),
                seconds / 86_400.0
            );
            if let Some(excluded) = result.excluded_seconds {
                if excluded > 0.0 {
                    println!("      excluded: {:.2} days", excluded / 86_400.0);
                }
            }
        }
        (Some(started), None, _) => {
            println!("   {}: started {} but never completed", label, started.format("%Y-%m-%d"));
        }
        _ => println!("   {}: no cycle found", label),
    }
}

fn main() {
    let vocabulary = StatusVocabulary::new(
        &["In Development", "In Review"],
        &["Done", "Closed"],
        &["Acceptance"],
        false,
    )
    .expect("vocabulary sets are disjoint");
    let engine = CycleTimeEngine::new(vocabulary);

    println!("=== Cycle-Time Strategy Selection ===\n");

    let cases: Vec<(&str, Vec<HistoryEntry>, Option<AccountId>)> = vec![
        ("simple linear process", simple_history(), None),
        ("multi-assignee hand-off", handoff_history(), Some(AccountId::new(PERSON_C))),
        ("many status changes", churny_history(), None),
    ];

    for (index, (label, histories, worker)) in cases.iter().enumerate() {
        let decision = engine.decide_strategy(histories, worker.as_ref());
        println!("{}. {}", index + 1, label);
        println!(
            "   strategy: {:?} ({} status events, {} assignee events)",
            decision.kind, decision.status_events, decision.assignee_events
        );
        println!("   reasons: {}", decision.reasons.join("; "));

        let issue_key = IssueKey::new(format!("DEMO-{}", index + 1));
        let result = engine.calculate(histories, &issue_key, worker.as_ref());
        print_result(issue_key.as_str(), &result);
        println!();
    }
}
