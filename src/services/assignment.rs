use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::models::{
    AssignmentAction, AssignmentState, Availability, LaborRequest, LaborRequirement,
};
use crate::database::repositories::{request, requirement, worker};
use crate::database::DatabaseTransaction;
use crate::error::AppError;
use crate::services::fcfs;
use crate::services::notifier::{self, NotificationIntent};

/// Everything a transition decided, before any of it is persisted.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub entry: LaborRequest,
    /// Entries auto-confirmed off the open pool because this transition freed
    /// or filled capacity. Already carry confirmed + fcfs_claim.
    pub promoted: Vec<LaborRequest>,
    /// Applied to the worker's no-call/no-show counter (floored at zero when
    /// persisted).
    pub ncns_delta: i32,
    pub deleted: bool,
    pub intents: Vec<NotificationIntent>,
}

impl TransitionOutcome {
    fn new(entry: LaborRequest) -> Self {
        TransitionOutcome {
            entry,
            promoted: Vec::new(),
            ncns_delta: 0,
            deleted: false,
            intents: Vec::new(),
        }
    }
}

fn confirmed_count_excluding(roster: &[LaborRequest], exclude: Uuid) -> i32 {
    roster
        .iter()
        .filter(|r| r.id != exclude && r.confirmed && !r.cancelled)
        .count() as i32
}

/// Re-run the open-pool allocator against a roster snapshot that already
/// reflects the updated entry, and turn the winning ids into promoted rows.
fn promote(
    outcome: &mut TransitionOutcome,
    slot: &LaborRequirement,
    roster: &[LaborRequest],
) {
    let snapshot: Vec<LaborRequest> = roster
        .iter()
        .map(|r| {
            if r.id == outcome.entry.id {
                outcome.entry.clone()
            } else {
                r.clone()
            }
        })
        .collect();

    for id in fcfs::allocate(slot, &snapshot) {
        if let Some(row) = snapshot.iter().find(|r| r.id == id) {
            let mut promoted = row.clone();
            promoted.confirmed = true;
            promoted.fcfs_claim = true;
            outcome.intents.push(NotificationIntent::new(
                promoted.id,
                AssignmentState::Confirmed,
                format!("Confirmed for {} (first come, first served)", slot.labor_type),
            ));
            outcome.promoted.push(promoted);
        }
    }
}

/// Apply one assignment action as a pure value transformation. The roster is
/// every request on the same requirement, the entry included; nothing here
/// touches the database.
pub fn apply(
    action: &AssignmentAction,
    entry: &LaborRequest,
    slot: &LaborRequirement,
    roster: &[LaborRequest],
    now: DateTime<Utc>,
) -> Result<TransitionOutcome, AppError> {
    let mut outcome = TransitionOutcome::new(entry.clone());

    match action {
        AssignmentAction::Respond { response } => {
            // Worker-side responses are one-shot; once a response or a
            // confirmation is on the row, only a manager can change it.
            if entry.availability_response.is_some() || entry.confirmed {
                return Err(AppError::not_modifiable());
            }
            outcome.entry.availability_response = Some(*response);
            outcome.entry.responded_at = Some(now);

            match response {
                Availability::Yes => {
                    if entry.is_reserved {
                        outcome.entry.confirmed = true;
                        outcome.intents.push(NotificationIntent::new(
                            entry.id,
                            AssignmentState::Confirmed,
                            format!("Confirmed for {}", slot.labor_type),
                        ));
                    } else {
                        let confirmed = confirmed_count_excluding(roster, entry.id);
                        let fcfs_used = fcfs::fcfs_confirmed_count(roster) as i32;
                        if slot.fcfs_positions > 0
                            && fcfs_used < slot.fcfs_positions
                            && confirmed < slot.needed_positions
                        {
                            outcome.entry.confirmed = true;
                            outcome.entry.fcfs_claim = true;
                            outcome.intents.push(NotificationIntent::new(
                                entry.id,
                                AssignmentState::Confirmed,
                                format!(
                                    "Confirmed for {} (first come, first served)",
                                    slot.labor_type
                                ),
                            ));
                        }
                    }
                }
                Availability::No => {
                    // Declining a reserved seat releases it back to the open
                    // pool, which may promote an earlier responder.
                    if entry.is_reserved {
                        outcome.entry.is_reserved = false;
                    }
                    promote(&mut outcome, slot, roster);
                }
            }
        }

        AssignmentAction::Confirm => {
            if entry.confirmed {
                return Err(AppError::InvalidTransition(
                    "This request is already confirmed".to_string(),
                ));
            }
            if entry.ncns {
                return Err(AppError::not_modifiable());
            }
            if confirmed_count_excluding(roster, entry.id) >= slot.needed_positions {
                return Err(AppError::CapacityExceeded(format!(
                    "All {} positions for {} are filled",
                    slot.needed_positions, slot.labor_type
                )));
            }
            outcome.entry.confirmed = true;
            outcome.entry.cancelled = false;
            outcome.entry.availability_response = Some(Availability::Yes);
            outcome.entry.responded_at = entry.responded_at.or(Some(now));
            outcome.intents.push(NotificationIntent::new(
                entry.id,
                AssignmentState::Confirmed,
                format!("Confirmed for {}", slot.labor_type),
            ));
        }

        AssignmentAction::Decline => {
            if entry.ncns {
                return Err(AppError::not_modifiable());
            }
            outcome.entry.confirmed = false;
            outcome.entry.fcfs_claim = false;
            outcome.entry.is_reserved = false;
            outcome.entry.availability_response = Some(Availability::No);
            outcome.entry.responded_at = Some(now);
            outcome.intents.push(NotificationIntent::new(
                entry.id,
                AssignmentState::Declined,
                format!("Declined for {}", slot.labor_type),
            ));
            promote(&mut outcome, slot, roster);
        }

        AssignmentAction::Cancel { with_penalty } => {
            if entry.cancelled {
                return Err(AppError::not_modifiable());
            }
            if entry.ncns {
                return Err(AppError::not_modifiable());
            }
            outcome.entry.confirmed = false;
            outcome.entry.fcfs_claim = false;
            outcome.entry.is_reserved = false;
            outcome.entry.cancelled = true;
            outcome.entry.availability_response = Some(Availability::No);
            if *with_penalty {
                outcome.ncns_delta = 1;
            }
            outcome.intents.push(NotificationIntent::new(
                entry.id,
                AssignmentState::Cancelled,
                format!("Cancelled for {}", slot.labor_type),
            ));
            promote(&mut outcome, slot, roster);
        }

        AssignmentAction::MarkNoCallNoShow => {
            if entry.ncns {
                return Err(AppError::DuplicatePenalty);
            }
            outcome.entry.ncns = true;
            outcome.entry.confirmed = false;
            outcome.entry.fcfs_claim = false;
            outcome.entry.availability_response = Some(Availability::No);
            outcome.ncns_delta = 1;
            outcome.intents.push(NotificationIntent::new(
                entry.id,
                AssignmentState::NoCallNoShow,
                format!("Marked no-call/no-show for {}", slot.labor_type),
            ));
            // The vacated seat is left for manual reassignment; a no-show at
            // call time is too late for automatic promotion to help.
        }

        AssignmentAction::MarkShowedUp => {
            if !entry.ncns {
                return Err(AppError::InvalidTransition(
                    "This request is not marked no-call/no-show".to_string(),
                ));
            }
            if confirmed_count_excluding(roster, entry.id) >= slot.needed_positions {
                return Err(AppError::CapacityExceeded(format!(
                    "All {} positions for {} are filled",
                    slot.needed_positions, slot.labor_type
                )));
            }
            outcome.entry.ncns = false;
            outcome.entry.confirmed = true;
            outcome.entry.availability_response = Some(Availability::Yes);
            outcome.ncns_delta = -1;
            outcome.intents.push(NotificationIntent::new(
                entry.id,
                AssignmentState::Confirmed,
                format!("Reinstated for {}", slot.labor_type),
            ));
        }

        AssignmentAction::Delete => {
            outcome.deleted = true;
        }
    }

    Ok(outcome)
}

async fn persist_outcome(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    outcome: &TransitionOutcome,
) -> Result<(), AppError> {
    if outcome.deleted {
        request::delete_tx(tx, outcome.entry.id).await?;
    } else {
        request::persist_tx(tx, &outcome.entry).await?;
    }

    for promoted in &outcome.promoted {
        request::persist_tx(tx, promoted).await?;
    }

    if outcome.ncns_delta != 0 {
        worker::adjust_ncns_count_tx(tx, outcome.entry.worker_id, outcome.ncns_delta).await?;
    }

    for intent in &outcome.intents {
        notifier::record_tx(tx, intent).await?;
    }

    Ok(())
}

/// Manager-side entry point: load the request, lock its requirement row so
/// capacity checks and promotions are serialized, apply the transition, and
/// persist everything it decided in one transaction.
pub async fn apply_action(
    request_id: Uuid,
    action: AssignmentAction,
) -> Result<TransitionOutcome, AppError> {
    DatabaseTransaction::run(move |tx| {
        Box::pin(async move {
            let entry = request::find_by_id_tx(tx, request_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Labor request not found".to_string()))?;
            let slot = requirement::lock_by_id_tx(tx, entry.requirement_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Labor requirement not found".to_string()))?;
            let roster = request::roster_tx(tx, slot.id).await?;

            let outcome = apply(&action, &entry, &slot, &roster, Utc::now())?;
            persist_outcome(tx, &outcome).await?;
            Ok(outcome)
        })
    })
    .await
}

/// Worker-side entry point: the short token on the availability link is the
/// only credential.
pub async fn respond_by_token(
    token: &str,
    response: Availability,
) -> Result<TransitionOutcome, AppError> {
    let token = token.to_string();
    DatabaseTransaction::run(move |tx| {
        Box::pin(async move {
            let entry = request::find_by_token_tx(tx, &token)
                .await?
                .ok_or_else(|| AppError::NotFound("Labor request not found".to_string()))?;
            let slot = requirement::lock_by_id_tx(tx, entry.requirement_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Labor requirement not found".to_string()))?;
            let roster = request::roster_tx(tx, slot.id).await?;

            let outcome = apply(
                &AssignmentAction::Respond { response },
                &entry,
                &slot,
                &roster,
                Utc::now(),
            )?;
            persist_outcome(tx, &outcome).await?;
            Ok(outcome)
        })
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn slot(needed: i32, fcfs: i32) -> LaborRequirement {
        LaborRequirement {
            id: Uuid::new_v4(),
            call_time_id: Uuid::new_v4(),
            labor_type: "Rigger".to_string(),
            needed_positions: needed,
            fcfs_positions: fcfs,
            minimum_hours: None,
            created_at: Utc::now(),
        }
    }

    fn entry(slot: &LaborRequirement) -> LaborRequest {
        LaborRequest {
            id: Uuid::new_v4(),
            requirement_id: slot.id,
            worker_id: Uuid::new_v4(),
            requested: true,
            notified: true,
            availability_response: None,
            confirmed: false,
            is_reserved: false,
            fcfs_claim: false,
            ncns: false,
            cancelled: false,
            responded_at: None,
            token_short: "abcd1234".to_string(),
            created_at: Utc::now(),
        }
    }

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, h, 0, 0).unwrap()
    }

    #[test]
    fn respond_yes_reserved_confirms_without_fcfs_claim() {
        let s = slot(2, 0);
        let mut e = entry(&s);
        e.is_reserved = true;
        let roster = vec![e.clone()];

        let out = apply(
            &AssignmentAction::Respond { response: Availability::Yes },
            &e,
            &s,
            &roster,
            at(9),
        )
        .unwrap();

        assert!(out.entry.confirmed);
        assert!(!out.entry.fcfs_claim);
        assert_eq!(out.entry.availability_response, Some(Availability::Yes));
        assert_eq!(out.entry.responded_at, Some(at(9)));
    }

    #[test]
    fn respond_yes_open_pool_takes_fcfs_seat() {
        let s = slot(2, 1);
        let e = entry(&s);
        let roster = vec![e.clone()];

        let out = apply(
            &AssignmentAction::Respond { response: Availability::Yes },
            &e,
            &s,
            &roster,
            at(9),
        )
        .unwrap();

        assert!(out.entry.confirmed);
        assert!(out.entry.fcfs_claim);
    }

    #[test]
    fn respond_yes_waits_when_fcfs_budget_spent() {
        let s = slot(3, 1);
        let e = entry(&s);
        let mut winner = entry(&s);
        winner.confirmed = true;
        winner.fcfs_claim = true;
        winner.availability_response = Some(Availability::Yes);
        let roster = vec![winner, e.clone()];

        let out = apply(
            &AssignmentAction::Respond { response: Availability::Yes },
            &e,
            &s,
            &roster,
            at(9),
        )
        .unwrap();

        assert!(!out.entry.confirmed);
        assert_eq!(out.entry.availability_response, Some(Availability::Yes));
    }

    #[test]
    fn respond_twice_is_rejected() {
        let s = slot(2, 1);
        let mut e = entry(&s);
        e.availability_response = Some(Availability::Yes);
        let roster = vec![e.clone()];

        let err = apply(
            &AssignmentAction::Respond { response: Availability::No },
            &e,
            &s,
            &roster,
            at(9),
        )
        .unwrap_err();

        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[test]
    fn reserved_decline_releases_seat_to_earliest_responder() {
        let s = slot(1, 1);
        let mut reserved = entry(&s);
        reserved.is_reserved = true;
        let mut waiting = entry(&s);
        waiting.availability_response = Some(Availability::Yes);
        waiting.responded_at = Some(at(8));
        let roster = vec![reserved.clone(), waiting.clone()];

        let out = apply(
            &AssignmentAction::Respond { response: Availability::No },
            &reserved,
            &s,
            &roster,
            at(9),
        )
        .unwrap();

        assert!(!out.entry.is_reserved);
        assert_eq!(out.promoted.len(), 1);
        assert_eq!(out.promoted[0].id, waiting.id);
        assert!(out.promoted[0].confirmed);
        assert!(out.promoted[0].fcfs_claim);
    }

    #[test]
    fn confirm_at_capacity_is_rejected() {
        let s = slot(1, 0);
        let e = entry(&s);
        let mut filled = entry(&s);
        filled.confirmed = true;
        let roster = vec![filled, e.clone()];

        let err = apply(&AssignmentAction::Confirm, &e, &s, &roster, at(9)).unwrap_err();
        assert!(matches!(err, AppError::CapacityExceeded(_)));
    }

    #[test]
    fn confirm_after_decline_flips_response_to_yes() {
        let s = slot(2, 0);
        let mut e = entry(&s);
        e.availability_response = Some(Availability::No);
        e.responded_at = Some(at(8));
        let roster = vec![e.clone()];

        let out = apply(&AssignmentAction::Confirm, &e, &s, &roster, at(9)).unwrap();

        assert!(out.entry.confirmed);
        assert_eq!(out.entry.availability_response, Some(Availability::Yes));
        // The original response timestamp is kept for ordering purposes.
        assert_eq!(out.entry.responded_at, Some(at(8)));
    }

    #[test]
    fn manager_decline_frees_seat_and_promotes() {
        let s = slot(1, 1);
        let mut held = entry(&s);
        held.confirmed = true;
        held.fcfs_claim = true;
        held.availability_response = Some(Availability::Yes);
        let mut waiting = entry(&s);
        waiting.availability_response = Some(Availability::Yes);
        waiting.responded_at = Some(at(8));
        let roster = vec![held.clone(), waiting.clone()];

        let out = apply(&AssignmentAction::Decline, &held, &s, &roster, at(9)).unwrap();

        assert!(!out.entry.confirmed);
        assert!(!out.entry.fcfs_claim);
        assert_eq!(out.entry.availability_response, Some(Availability::No));
        assert_eq!(out.promoted.len(), 1);
        assert_eq!(out.promoted[0].id, waiting.id);
    }

    #[test]
    fn cancel_with_penalty_counts_against_worker() {
        let s = slot(1, 0);
        let mut e = entry(&s);
        e.confirmed = true;
        let roster = vec![e.clone()];

        let out = apply(
            &AssignmentAction::Cancel { with_penalty: true },
            &e,
            &s,
            &roster,
            at(9),
        )
        .unwrap();

        assert!(out.entry.cancelled);
        assert!(!out.entry.confirmed);
        assert_eq!(out.ncns_delta, 1);

        let without = apply(
            &AssignmentAction::Cancel { with_penalty: false },
            &e,
            &s,
            &roster,
            at(9),
        )
        .unwrap();
        assert_eq!(without.ncns_delta, 0);
    }

    #[test]
    fn ncns_is_not_double_counted() {
        let s = slot(1, 0);
        let mut e = entry(&s);
        e.confirmed = true;
        let roster = vec![e.clone()];

        let out = apply(&AssignmentAction::MarkNoCallNoShow, &e, &s, &roster, at(9)).unwrap();
        assert!(out.entry.ncns);
        assert!(!out.entry.confirmed);
        assert_eq!(out.ncns_delta, 1);

        let err =
            apply(&AssignmentAction::MarkNoCallNoShow, &out.entry, &s, &roster, at(9)).unwrap_err();
        assert!(matches!(err, AppError::DuplicatePenalty));
    }

    #[test]
    fn showed_up_reverses_ncns_and_reconfirms() {
        let s = slot(1, 0);
        let mut e = entry(&s);
        e.ncns = true;
        e.availability_response = Some(Availability::No);
        let roster = vec![e.clone()];

        let out = apply(&AssignmentAction::MarkShowedUp, &e, &s, &roster, at(9)).unwrap();
        assert!(!out.entry.ncns);
        assert!(out.entry.confirmed);
        assert_eq!(out.entry.availability_response, Some(Availability::Yes));
        assert_eq!(out.ncns_delta, -1);
    }

    #[test]
    fn showed_up_respects_capacity_and_keeps_ncns() {
        let s = slot(1, 0);
        let mut e = entry(&s);
        e.ncns = true;
        let mut replacement = entry(&s);
        replacement.confirmed = true;
        let roster = vec![e.clone(), replacement];

        let err = apply(&AssignmentAction::MarkShowedUp, &e, &s, &roster, at(9)).unwrap_err();
        assert!(matches!(err, AppError::CapacityExceeded(_)));
    }

    #[test]
    fn ncns_actions_are_locked_until_showed_up() {
        let s = slot(2, 0);
        let mut e = entry(&s);
        e.ncns = true;
        let roster = vec![e.clone()];

        for action in [
            AssignmentAction::Confirm,
            AssignmentAction::Decline,
            AssignmentAction::Cancel { with_penalty: false },
        ] {
            let err = apply(&action, &e, &s, &roster, at(9)).unwrap_err();
            assert!(matches!(err, AppError::InvalidTransition(_)));
        }
    }

    #[test]
    fn delete_produces_no_intents() {
        let s = slot(1, 0);
        let e = entry(&s);
        let roster = vec![e.clone()];

        let out = apply(&AssignmentAction::Delete, &e, &s, &roster, at(9)).unwrap();
        assert!(out.deleted);
        assert!(out.intents.is_empty());
        assert_eq!(out.ncns_delta, 0);
    }
}
