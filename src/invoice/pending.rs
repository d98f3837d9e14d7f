use std::cell::RefCell;
use std::collections::HashMap;

/// In-flight invoice generations, keyed by bill id.
///
/// Two generations of the same bill may run at once; they are counted, not merged.
#[derive(Debug, Default)]
pub struct PendingSet {
    in_flight: RefCell<HashMap<String, usize>>,
}

impl PendingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the "generating" indicator for `bill_id` until the guard is dropped
    pub fn begin(&self, bill_id: &str) -> PendingGuard<'_> {
        let count = {
            let mut in_flight = self.in_flight.borrow_mut();
            let count = in_flight.entry(bill_id.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        tracing::info!(bill = %bill_id, in_flight = count, "generating invoice");

        PendingGuard {
            set: self,
            bill_id: bill_id.to_string(),
        }
    }

    pub fn is_pending(&self, bill_id: &str) -> bool {
        self.in_flight.borrow().contains_key(bill_id)
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.borrow().is_empty()
    }

    fn finish(&self, bill_id: &str) {
        let mut in_flight = self.in_flight.borrow_mut();
        if let Some(count) = in_flight.get_mut(bill_id) {
            *count -= 1;
            if *count == 0 {
                in_flight.remove(bill_id);
            }
        }
        tracing::debug!(bill = %bill_id, "generation finished");
    }
}

/// Clears its bill's indicator when dropped, on success and error paths alike
#[derive(Debug)]
pub struct PendingGuard<'a> {
    set: &'a PendingSet,
    bill_id: String,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.set.finish(&self.bill_id);
    }
}
