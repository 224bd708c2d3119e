use chrono::{Duration, NaiveDateTime};
use crate::pools::domain::model::LicenseEntity;

// Pure queue arithmetic for one pool. Callers feed the current loans and
// holds and apply the returned counter/hold changes to storage, which keeps
// the recompute idempotent and convergent under concurrent invocations.

// an unexpired loan against the pool
#[derive(Debug, Clone)]
pub(crate) struct ActiveLoan {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

// a live hold (either still queued or holding a reservation)
#[derive(Debug, Clone)]
pub(crate) struct QueuedHold {
    pub hold_id: String,
    pub position: i64,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
}

#[derive(Debug, PartialEq)]
pub(crate) struct HoldChange {
    pub hold_id: String,
    pub position: i64,
    pub end: Option<NaiveDateTime>,
}

#[derive(Debug, PartialEq)]
pub(crate) struct QueueUpdate {
    pub licenses_owned: i64,
    pub licenses_available: i64,
    pub licenses_reserved: i64,
    pub patrons_in_hold_queue: i64,
    pub hold_changes: Vec<HoldChange>,
}

pub(crate) fn recompute_queue(licenses: &[LicenseEntity], loans: &[ActiveLoan],
                              holds: &[QueuedHold], now: NaiveDateTime,
                              loan_period: Duration, reservation_period: Duration) -> QueueUpdate {
    let licenses_owned: i64 = licenses.iter()
        .filter(|license| !license.is_expired(now))
        .map(LicenseEntity::owned_contribution)
        .sum();

    let mut loans: Vec<&ActiveLoan> = loans.iter().collect();
    loans.sort_by_key(|loan| loan.start);
    let mut holds: Vec<&QueuedHold> = holds.iter().collect();
    holds.sort_by_key(|hold| hold.start);

    let loans_count = loans.len() as i64;
    let holds_count = holds.len() as i64;
    let remaining = licenses_owned - loans_count;
    let (licenses_available, licenses_reserved) = if holds_count > remaining {
        (0, remaining.max(0))
    } else {
        (remaining - holds_count, holds_count)
    };

    // worst-case scheduling walks copies in loan-start order, then through
    // the reservation deadlines of the holds at the front of the queue
    let loan_ends: Vec<NaiveDateTime> = loans.iter().map(|loan| loan.end).collect();
    let mut reservation_ends: Vec<NaiveDateTime> = Vec::new();
    for hold in holds.iter() {
        if position_of(hold, &holds, remaining) == 0 {
            reservation_ends.push(reserved_end(hold, now, reservation_period));
        }
    }

    let mut hold_changes: Vec<HoldChange> = Vec::new();
    for hold in holds.iter() {
        let position = position_of(hold, &holds, remaining);
        let end = if position == 0 {
            Some(reserved_end(hold, now, reservation_period))
        } else {
            estimate_hold_end(position, licenses_owned, licenses_reserved,
                              &loan_ends, &reservation_ends, now, loan_period, reservation_period)
        };
        if position != hold.position || end != hold.end {
            hold_changes.push(HoldChange { hold_id: hold.hold_id.to_string(), position, end });
        }
    }

    QueueUpdate {
        licenses_owned,
        licenses_available,
        licenses_reserved,
        patrons_in_hold_queue: holds_count,
        hold_changes,
    }
}

// position is the count of holds placed strictly earlier, shifted by one
// unless a remaining license already covers this hold
fn position_of(hold: &QueuedHold, holds: &[&QueuedHold], remaining: i64) -> i64 {
    let earlier = holds.iter()
        .filter(|other| other.hold_id != hold.hold_id && other.start < hold.start)
        .count() as i64;
    if remaining > earlier {
        0
    } else {
        earlier + 1
    }
}

// the reservation clock starts the first time a hold reaches the front
fn reserved_end(hold: &QueuedHold, now: NaiveDateTime, reservation_period: Duration) -> NaiveDateTime {
    if hold.position == 0 {
        hold.end.unwrap_or(now + reservation_period)
    } else {
        now + reservation_period
    }
}

// Worst case estimate: every owned copy cycles through a full loan plus
// reservation period, so the queue drains one licenses_owned-sized batch per
// cycle. With no owned licenses the estimate is undefined.
fn estimate_hold_end(position: i64, licenses_owned: i64, licenses_reserved: i64,
                     loan_ends: &[NaiveDateTime], reservation_ends: &[NaiveDateTime],
                     now: NaiveDateTime, loan_period: Duration,
                     reservation_period: Duration) -> Option<NaiveDateTime> {
    if licenses_owned <= 0 {
        return None;
    }
    let index = (position - licenses_reserved - 1).max(0);
    let cycles = index / licenses_owned;
    let copy_index = (index % licenses_owned) as usize;

    let first_cycle_end = if copy_index < loan_ends.len() {
        loan_ends[copy_index]
    } else if copy_index - loan_ends.len() < reservation_ends.len() {
        reservation_ends[copy_index - loan_ends.len()] + loan_period
    } else {
        now + loan_period
    };
    let cycle_period = loan_period + reservation_period;
    Some(first_cycle_end + cycle_period * cycles as i32)
}
