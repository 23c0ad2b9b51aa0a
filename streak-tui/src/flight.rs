use std::collections::HashSet;

/// Drops overlapping invocations of the same operation instead of queueing them.
///
/// Keys name operations ("feed", "my_posts"). The owner releases a key once the
/// operation settles, whatever its outcome.
#[derive(Debug, Default)]
pub struct SingleFlight {
    active: HashSet<&'static str>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when `key` is already in flight.
    pub fn try_acquire(&mut self, key: &'static str) -> bool {
        self.active.insert(key)
    }

    pub fn release(&mut self, key: &'static str) {
        self.active.remove(key);
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.active.contains(key)
    }
}
