// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Executable model of the claim/release contract the generated C++ obeys.
//!
//! **DDD Context:** Shell Generation / Multi-Client Arbitration
//!
//! [`Arbiter`] mirrors the generated construct one to one: an owner slot
//! behind one exclusive lock, a test-and-set claim, an owner-only release and
//! owner-only delivery of out-events. The generated code forwards the claim
//! to the encapsulee outside the lock and, if the encapsulee refuses, clears
//! the slot again while the claimant still holds it; [`Arbiter::claim_with`]
//! models that step.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Result of a claim attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClaimOutcome {
    Granted,
    Rejected,
}

/// Grants one client at a time exclusive use of a port.
#[derive(Debug)]
pub struct Arbiter<C> {
    owner: Mutex<Option<C>>,
}

impl<C> Default for Arbiter<C> {
    fn default() -> Self {
        Self {
            owner: Mutex::new(None),
        }
    }
}

impl<C: Clone + PartialEq> Arbiter<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<C>> {
        // A panicking client cannot leave the slot half-written.
        self.owner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically take ownership if nobody holds it.
    pub fn claim(&self, client: C) -> ClaimOutcome {
        self.claim_with(client, || true)
    }

    /// Take ownership, then ask `forward` whether the claim is accepted.
    ///
    /// `forward` runs outside the lock, so out-events delivered while it runs
    /// already reach the new owner. A refused claim clears the slot again,
    /// unless another client took it over in the meantime.
    pub fn claim_with(&self, client: C, forward: impl FnOnce() -> bool) -> ClaimOutcome {
        {
            let mut owner = self.slot();
            if owner.is_some() {
                return ClaimOutcome::Rejected;
            }
            *owner = Some(client.clone());
        }
        if forward() {
            ClaimOutcome::Granted
        } else {
            let mut owner = self.slot();
            if owner.as_ref() == Some(&client) {
                *owner = None;
            }
            ClaimOutcome::Rejected
        }
    }

    /// Clear ownership if `client` holds it. Returns whether it did.
    pub fn release(&self, client: &C) -> bool {
        let mut owner = self.slot();
        if owner.as_ref() == Some(client) {
            *owner = None;
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn owner(&self) -> Option<C> {
        self.slot().clone()
    }

    /// Hand `event` to the current owner under the lock. Without an owner
    /// the event is dropped and `false` is returned.
    pub fn deliver<T>(&self, event: T, sink: impl FnOnce(&C, T)) -> bool {
        let owner = self.slot();
        match owner.as_ref() {
            Some(client) => {
                sink(client, event);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Barrier;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn second_claim_is_rejected_until_release() {
        let arbiter = Arbiter::new();
        assert_eq!(arbiter.claim("alice"), ClaimOutcome::Granted);
        assert_eq!(arbiter.claim("bob"), ClaimOutcome::Rejected);
        assert_eq!(arbiter.owner(), Some("alice"));
        assert!(arbiter.release(&"alice"));
        assert_eq!(arbiter.claim("bob"), ClaimOutcome::Granted);
    }

    #[test]
    fn claiming_twice_is_rejected_for_the_owner_too() {
        let arbiter = Arbiter::new();
        assert_eq!(arbiter.claim("alice"), ClaimOutcome::Granted);
        assert_eq!(arbiter.claim("alice"), ClaimOutcome::Rejected);
    }

    #[test]
    fn release_by_non_owner_is_a_no_op() {
        let arbiter = Arbiter::new();
        assert!(!arbiter.release(&"alice"));
        assert_eq!(arbiter.claim("alice"), ClaimOutcome::Granted);
        assert!(!arbiter.release(&"bob"));
        assert_eq!(arbiter.owner(), Some("alice"));
    }

    #[test]
    fn unclaimed_arbiter_never_delivers() {
        let arbiter: Arbiter<&str> = Arbiter::new();
        let mut delivered = Vec::new();
        assert!(!arbiter.deliver(1, |client, event| delivered.push((*client, event))));
        assert!(delivered.is_empty());
    }

    #[test]
    fn delivery_reaches_owner_only() {
        let arbiter = Arbiter::new();
        arbiter.claim("alice");
        let mut delivered = Vec::new();
        arbiter.deliver("Done", |client, event| delivered.push((*client, event)));
        arbiter.release(&"alice");
        arbiter.deliver("Late", |client, event| delivered.push((*client, event)));
        assert_eq!(delivered, vec![("alice", "Done")]);
    }

    #[test]
    fn refused_claim_clears_owner() {
        let arbiter = Arbiter::new();
        assert_eq!(arbiter.claim_with("alice", || false), ClaimOutcome::Rejected);
        assert_eq!(arbiter.owner(), None);
        assert_eq!(arbiter.claim("bob"), ClaimOutcome::Granted);
    }

    #[test]
    fn late_refusal_keeps_the_next_owner() {
        let arbiter = Arbiter::new();
        let outcome = arbiter.claim_with("alice", || {
            assert!(arbiter.release(&"alice"));
            assert_eq!(arbiter.claim("bob"), ClaimOutcome::Granted);
            false
        });
        assert_eq!(outcome, ClaimOutcome::Rejected);
        assert_eq!(arbiter.owner(), Some("bob"));
    }

    #[test]
    fn claim_in_progress_excludes_others() {
        let arbiter = Arbiter::new();
        let outcome = arbiter.claim_with("alice", || {
            assert_eq!(arbiter.claim("bob"), ClaimOutcome::Rejected);
            true
        });
        assert_eq!(outcome, ClaimOutcome::Granted);
    }

    #[test]
    fn concurrent_claimants_get_exactly_one_grant() {
        const CLIENTS: usize = 16;
        let arbiter = Arbiter::new();
        let barrier = Barrier::new(CLIENTS);
        let granted = AtomicUsize::new(0);
        std::thread::scope(|scope| {
            for client in 0..CLIENTS {
                let (arbiter, barrier, granted) = (&arbiter, &barrier, &granted);
                scope.spawn(move || {
                    barrier.wait();
                    if arbiter.claim(client) == ClaimOutcome::Granted {
                        granted.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        });
        assert_eq!(granted.load(Ordering::SeqCst), 1);
        assert!(arbiter.owner().is_some());
    }

    #[test]
    fn handover_under_contention_never_overlaps() {
        const CLIENTS: usize = 8;
        const ROUNDS: usize = 200;
        let arbiter = Arbiter::new();
        let holders = AtomicUsize::new(0);
        let overlaps = AtomicUsize::new(0);
        std::thread::scope(|scope| {
            for client in 0..CLIENTS {
                let (arbiter, holders, overlaps) = (&arbiter, &holders, &overlaps);
                scope.spawn(move || {
                    for _ in 0..ROUNDS {
                        if arbiter.claim(client) == ClaimOutcome::Granted {
                            if holders.fetch_add(1, Ordering::SeqCst) != 0 {
                                overlaps.fetch_add(1, Ordering::SeqCst);
                            }
                            holders.fetch_sub(1, Ordering::SeqCst);
                            assert!(arbiter.release(&client));
                        }
                    }
                });
            }
        });
        assert_eq!(overlaps.load(Ordering::SeqCst), 0);
        assert_eq!(arbiter.owner(), None);
    }
}
