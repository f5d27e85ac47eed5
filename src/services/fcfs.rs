use uuid::Uuid;

use crate::database::models::{Availability, LaborRequest, LaborRequirement};

/// How many confirmations have consumed the FCFS budget. Reserved holds are a
/// separate pool and never count here.
pub fn fcfs_confirmed_count(roster: &[LaborRequest]) -> usize {
    roster
        .iter()
        .filter(|r| r.confirmed && r.fcfs_claim)
        .count()
}

pub fn confirmed_count(roster: &[LaborRequest]) -> usize {
    roster.iter().filter(|r| r.confirmed).count()
}

fn is_candidate(r: &LaborRequest) -> bool {
    r.availability_response == Some(Availability::Yes)
        && !r.confirmed
        && !r.is_reserved
        && !r.cancelled
        && !r.ncns
}

/// Decide which waiting workers to promote into the FCFS pool. Promotion order
/// is strictly earliest `responded_at` first; ties break on creation order.
/// The result never pushes the FCFS count past the budget, nor the total
/// confirmed count past the slot's capacity.
pub fn allocate(slot: &LaborRequirement, roster: &[LaborRequest]) -> Vec<Uuid> {
    let fcfs_budget = (slot.fcfs_positions as usize).saturating_sub(fcfs_confirmed_count(roster));
    let capacity = (slot.needed_positions.max(0) as usize).saturating_sub(confirmed_count(roster));
    let budget = fcfs_budget.min(capacity);
    if budget == 0 {
        return Vec::new();
    }

    let mut candidates: Vec<&LaborRequest> = roster.iter().filter(|r| is_candidate(r)).collect();
    // a missing responded_at sorts last, not first
    candidates.sort_by_key(|r| {
        (
            r.responded_at.unwrap_or(chrono::DateTime::<chrono::Utc>::MAX_UTC),
            r.created_at,
        )
    });

    candidates.into_iter().take(budget).map(|r| r.id).collect()
}
