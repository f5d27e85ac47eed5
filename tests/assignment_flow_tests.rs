use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use uuid::Uuid;

use crewcall::database::models::{
    AssignmentAction, AssignmentState, Availability, LaborRequest, LaborRequirement,
};
use crewcall::services::assignment::{self, TransitionOutcome};

fn slot(needed: i32, fcfs: i32) -> LaborRequirement {
    LaborRequirement {
        id: Uuid::new_v4(),
        call_time_id: Uuid::new_v4(),
        labor_type: "Stagehand".to_string(),
        needed_positions: needed,
        fcfs_positions: fcfs,
        minimum_hours: None,
        created_at: Utc::now(),
    }
}

fn queued(slot: &LaborRequirement, seq: u32) -> LaborRequest {
    LaborRequest {
        id: Uuid::new_v4(),
        worker_id: Uuid::new_v4(),
        requirement_id: slot.id,
        requested: true,
        notified: true,
        availability_response: None,
        confirmed: false,
        is_reserved: false,
        fcfs_claim: false,
        ncns: false,
        cancelled: false,
        responded_at: None,
        token_short: format!("token{:03}", seq),
        created_at: Utc.with_ymd_and_hms(2025, 6, 1, 6, 0, seq).unwrap(),
    }
}

fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, h, m, 0).unwrap()
}

/// Fold a transition outcome back into the roster the way the transaction
/// layer persists it, so multi-step scenarios see each other's writes.
fn merge(roster: &mut Vec<LaborRequest>, outcome: &TransitionOutcome) {
    let mut changed: Vec<&LaborRequest> = vec![&outcome.entry];
    changed.extend(outcome.promoted.iter());
    for update in changed {
        if let Some(existing) = roster.iter_mut().find(|r| r.id == update.id) {
            *existing = update.clone();
        }
    }
    if outcome.deleted {
        roster.retain(|r| r.id != outcome.entry.id);
    }
}

fn respond(
    roster: &mut Vec<LaborRequest>,
    slot: &LaborRequirement,
    idx: usize,
    response: Availability,
    now: DateTime<Utc>,
) -> TransitionOutcome {
    let entry = roster[idx].clone();
    let outcome = assignment::apply(
        &AssignmentAction::Respond { response },
        &entry,
        slot,
        roster,
        now,
    )
    .unwrap();
    merge(roster, &outcome);
    outcome
}

fn act(
    roster: &mut Vec<LaborRequest>,
    slot: &LaborRequirement,
    idx: usize,
    action: AssignmentAction,
    now: DateTime<Utc>,
) -> TransitionOutcome {
    let entry = roster[idx].clone();
    let outcome = assignment::apply(&action, &entry, slot, roster, now).unwrap();
    merge(roster, &outcome);
    outcome
}

#[test]
fn fcfs_lifecycle_promotes_in_response_order() {
    let s = slot(2, 1);
    let mut roster = vec![queued(&s, 1), queued(&s, 2), queued(&s, 3)];

    // Worker 1 answers first and takes the single FCFS seat.
    respond(&mut roster, &s, 0, Availability::Yes, at(8, 0));
    assert!(roster[0].confirmed);
    assert!(roster[0].fcfs_claim);

    // Workers 2 and 3 answer yes; the budget is spent, so both wait.
    respond(&mut roster, &s, 1, Availability::Yes, at(8, 5));
    respond(&mut roster, &s, 2, Availability::Yes, at(8, 10));
    assert!(!roster[1].confirmed);
    assert!(!roster[2].confirmed);

    // Worker 1 cancels; the freed FCFS seat goes to worker 2, who answered
    // before worker 3.
    let outcome = act(
        &mut roster,
        &s,
        0,
        AssignmentAction::Cancel { with_penalty: false },
        at(9, 0),
    );
    assert_eq!(outcome.promoted.len(), 1);
    assert_eq!(outcome.promoted[0].id, roster[1].id);
    assert!(roster[1].confirmed);
    assert!(roster[1].fcfs_claim);
    assert!(!roster[2].confirmed);
}

#[test]
fn reserved_seat_is_separate_from_fcfs_budget() {
    let s = slot(2, 1);
    let mut roster = vec![queued(&s, 1), queued(&s, 2)];
    roster[0].is_reserved = true;

    // The reserved worker confirms without touching the FCFS budget.
    respond(&mut roster, &s, 0, Availability::Yes, at(8, 0));
    assert!(roster[0].confirmed);
    assert!(!roster[0].fcfs_claim);

    // The open-pool worker still gets the FCFS seat.
    respond(&mut roster, &s, 1, Availability::Yes, at(8, 5));
    assert!(roster[1].confirmed);
    assert!(roster[1].fcfs_claim);
}

#[test]
fn cancelled_reserved_seat_goes_to_the_earliest_responder() {
    let s = slot(1, 1);
    let mut roster = vec![queued(&s, 1), queued(&s, 2), queued(&s, 3)];
    roster[0].is_reserved = true;

    // The reserved worker accepts and fills the only position.
    respond(&mut roster, &s, 0, Availability::Yes, at(7, 50));
    assert!(roster[0].confirmed);

    respond(&mut roster, &s, 2, Availability::Yes, at(8, 0));
    respond(&mut roster, &s, 1, Availability::Yes, at(8, 5));
    assert!(!roster[1].confirmed);
    assert!(!roster[2].confirmed);

    // The reserved worker drops out; worker 3 answered first and wins.
    let outcome = act(
        &mut roster,
        &s,
        0,
        AssignmentAction::Cancel { with_penalty: false },
        at(9, 0),
    );
    assert_eq!(outcome.promoted.len(), 1);
    assert_eq!(outcome.promoted[0].id, roster[2].id);
    assert!(roster[2].confirmed);
}

#[test]
fn responded_at_ties_break_on_creation_order() {
    let s = slot(1, 1);
    let mut roster = vec![queued(&s, 1), queued(&s, 2)];
    roster[0].availability_response = Some(Availability::Yes);
    roster[0].responded_at = Some(at(8, 0));
    roster[1].availability_response = Some(Availability::Yes);
    roster[1].responded_at = Some(at(8, 0));
    roster[0].confirmed = false;
    roster[1].confirmed = false;

    // A third, confirmed worker declines and frees the only seat.
    let mut holder = queued(&s, 3);
    holder.confirmed = true;
    holder.fcfs_claim = true;
    holder.availability_response = Some(Availability::Yes);
    roster.push(holder);

    let outcome = act(&mut roster, &s, 2, AssignmentAction::Decline, at(9, 0));
    assert_eq!(outcome.promoted.len(), 1);
    // Same responded_at; the earlier-created row wins.
    assert_eq!(outcome.promoted[0].id, roster[0].id);
}

#[test]
fn ncns_round_trip_restores_confirmation() {
    let s = slot(1, 0);
    let mut roster = vec![queued(&s, 1)];

    let confirm = act(&mut roster, &s, 0, AssignmentAction::Confirm, at(7, 0));
    assert_eq!(confirm.entry.state(), AssignmentState::Confirmed);

    let mark = act(&mut roster, &s, 0, AssignmentAction::MarkNoCallNoShow, at(8, 0));
    assert_eq!(mark.entry.state(), AssignmentState::NoCallNoShow);
    assert_eq!(mark.ncns_delta, 1);

    let reinstate = act(&mut roster, &s, 0, AssignmentAction::MarkShowedUp, at(8, 30));
    assert_eq!(reinstate.entry.state(), AssignmentState::Confirmed);
    assert_eq!(reinstate.ncns_delta, -1);
    assert_eq!(
        reinstate.entry.availability_response,
        Some(Availability::Yes)
    );
}

#[test]
fn capacity_never_overshoots_across_a_sequence() {
    let s = slot(2, 2);
    let mut roster = vec![queued(&s, 1), queued(&s, 2), queued(&s, 3), queued(&s, 4)];

    for (idx, minute) in [(0, 0), (1, 5), (2, 10), (3, 15)] {
        respond(&mut roster, &s, idx, Availability::Yes, at(8, minute));
    }

    let confirmed = roster.iter().filter(|r| r.confirmed).count();
    assert_eq!(confirmed, 2);

    // Manager confirm on a third worker must be refused, not queued.
    let entry = roster[2].clone();
    let err = assignment::apply(&AssignmentAction::Confirm, &entry, &s, &roster, at(9, 0))
        .unwrap_err();
    assert_eq!(err.reason(), "capacity_exceeded");
}

#[test]
fn every_state_change_carries_a_notification_intent() {
    let s = slot(1, 1);
    let mut roster = vec![queued(&s, 1)];

    let confirmed = respond(&mut roster, &s, 0, Availability::Yes, at(8, 0));
    assert_eq!(confirmed.intents.len(), 1);
    assert_eq!(confirmed.intents[0].state, AssignmentState::Confirmed);

    let cancelled = act(
        &mut roster,
        &s,
        0,
        AssignmentAction::Cancel { with_penalty: true },
        at(9, 0),
    );
    assert_eq!(cancelled.intents.len(), 1);
    assert_eq!(cancelled.intents[0].state, AssignmentState::Cancelled);
    assert_eq!(cancelled.ncns_delta, 1);
}
