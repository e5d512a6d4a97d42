//! Ordered waiting queue of player ids

use crate::types::{PlayerId, Rating};
use std::cmp::Reverse;
use std::collections::VecDeque;

/// Players waiting for a free table, front first.
///
/// Ordering is owned by the caller: after pushing ids it is expected to call
/// [`WaitingQueue::sort_stable_descending_by`], which keeps arrival order among
/// equal ratings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaitingQueue {
    ids: VecDeque<PlayerId>,
}

impl WaitingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn push_back(&mut self, player_id: PlayerId) {
        self.ids.push_back(player_id);
    }

    pub fn pop_front(&mut self) -> Option<PlayerId> {
        self.ids.pop_front()
    }

    /// Remove a player wherever it sits; returns whether it was queued
    pub fn remove(&mut self, player_id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| id != player_id);
        self.ids.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerId> {
        self.ids.iter()
    }

    /// Highest rating first; equal ratings keep their current relative order
    pub fn sort_stable_descending_by<F>(&mut self, rating_of: F)
    where
        F: Fn(&str) -> Rating,
    {
        self.ids
            .make_contiguous()
            .sort_by_key(|id| Reverse(rating_of(id)));
    }
}

impl FromIterator<PlayerId> for WaitingQueue {
    fn from_iter<I: IntoIterator<Item = PlayerId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
