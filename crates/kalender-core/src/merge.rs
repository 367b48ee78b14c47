//! Ordered insertion of accepted occurrences.

use crate::event::DisplayEvent;

/// Inserts `element` into `list`, which must already be ordered by `key`.
///
/// Elements comparing equal to an existing one land after it, so the
/// first-seen of two equal keys stays first.
pub fn insert_sorted_by<T, K, F>(list: &mut Vec<T>, element: T, key: F)
where
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    let k = key(&element);
    let Some(first) = list.first() else {
        list.push(element);
        return;
    };
    let before_first = key(first) > k;
    let after_last = list.last().is_some_and(|last| key(last) < k);

    if before_first {
        list.insert(0, element);
    } else if after_last || list.len() == 1 {
        list.push(element);
    } else {
        let slot = list
            .windows(2)
            .position(|pair| key(&pair[0]) <= k && k < key(&pair[1]));
        match slot {
            Some(i) => list.insert(i + 1, element),
            None => list.push(element),
        }
    }
}

/// Inserts a display event keeping the list ordered by start.
pub fn insert_sorted(list: &mut Vec<DisplayEvent>, element: DisplayEvent) {
    insert_sorted_by(list, element, |e| e.event_start);
}

/// Output list kept ordered by start as events arrive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortedMerge {
    events: Vec<DisplayEvent>,
}

impl SortedMerge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, event: DisplayEvent) {
        insert_sorted(&mut self.events, event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn as_slice(&self) -> &[DisplayEvent] {
        &self.events
    }

    pub fn into_vec(self) -> Vec<DisplayEvent> {
        self.events
    }
}
