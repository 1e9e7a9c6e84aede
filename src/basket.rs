//! Elective basket exclusivity.
//!
//! Electives in one basket compete for the same batch's attention, so for a
//! given batch no two members may overlap in time. The resolver keeps only
//! membership (basket, batch → committed sessions); time ranges are read
//! from the sessions themselves at check time.
//!
//! It also answers which basket a batch's chosen course belongs to, from
//! elective registrations, for course records that omit a basket id.

use std::collections::BTreeMap;

use crate::models::{ElectiveRegistration, Session, SessionId, SlotRange};

type MemberKey = (String, String);

/// Basket membership index.
#[derive(Debug, Clone, Default)]
pub struct BasketResolver {
    /// (basket, batch) → committed member sessions.
    members: BTreeMap<MemberKey, Vec<SessionId>>,
    /// (batch, course) → basket, from registrations.
    registrations: BTreeMap<MemberKey, String>,
}

impl BasketResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads elective registrations.
    pub fn with_registrations(mut self, registrations: &[ElectiveRegistration]) -> Self {
        for r in registrations {
            self.registrations
                .insert((r.batch_id.clone(), r.course_id.clone()), r.basket_id.clone());
        }
        self
    }

    /// Basket a batch registered `course_id` under, if any.
    pub fn registered_basket(&self, batch_id: &str, course_id: &str) -> Option<&str> {
        self.registrations
            .get(&(batch_id.to_string(), course_id.to_string()))
            .map(String::as_str)
    }

    /// Records a committed session as a member of its basket.
    ///
    /// Sessions without a basket are ignored.
    pub fn register(&mut self, session: &Session) {
        if let Some(basket) = &session.basket_id {
            let members = self
                .members
                .entry((basket.clone(), session.batch_id.clone()))
                .or_default();
            if !members.contains(&session.id) {
                members.push(session.id);
            }
        }
    }

    /// Committed members of a basket for a batch.
    pub fn members(&self, basket_id: &str, batch_id: &str) -> &[SessionId] {
        self.members
            .get(&(basket_id.to_string(), batch_id.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether a committed member of `basket_id` for `batch_id` overlaps `range`.
    ///
    /// `committed` is the session table; members are looked up in it by id.
    /// Always `false` when `basket_id` is `None`.
    pub fn conflicts_with_basket(
        &self,
        batch_id: &str,
        basket_id: Option<&str>,
        range: SlotRange,
        committed: &[Session],
    ) -> bool {
        let Some(basket) = basket_id else {
            return false;
        };
        self.members(basket, batch_id).iter().any(|&id| {
            lookup(committed, id)
                .and_then(Session::placement)
                .is_some_and(|p| p.range.overlaps(&range))
        })
    }

    /// Every (basket, batch) pair with at least one committed member.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &str, &[SessionId])> {
        self.members
            .iter()
            .map(|((basket, batch), ids)| (basket.as_str(), batch.as_str(), ids.as_slice()))
    }
}

/// Finds a session by id. Ids are dense, so the index is tried first.
pub(crate) fn lookup(sessions: &[Session], id: SessionId) -> Option<&Session> {
    sessions
        .get(id.0 as usize)
        .filter(|s| s.id == id)
        .or_else(|| sessions.iter().find(|s| s.id == id))
}
