/// A value whose changes only take effect after a quiet period.
///
/// Timekeeping is left to the caller: every change hands out a generation
/// number, the caller waits for the debounce window and then calls
/// [`DebouncedValue::settle`] with that number. Only the most recent
/// generation settles, so a burst of changes collapses into one.
#[derive(Debug, Clone, PartialEq)]
pub struct DebouncedValue<T> {
    pending: T,
    settled: T,
    generation: u64,
}

impl<T: Clone + PartialEq> DebouncedValue<T> {
    /// Start already settled on `value`.
    pub fn new(value: T) -> Self {
        Self {
            pending: value.clone(),
            settled: value,
            generation: 0,
        }
    }

    /// Latest value, settled or not.
    pub fn pending(&self) -> &T {
        &self.pending
    }

    pub fn settled(&self) -> &T {
        &self.settled
    }

    pub fn is_pending(&self) -> bool {
        self.pending != self.settled
    }

    /// Generation of the most recent change.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Record a new value. Returns the generation to settle later, or `None`
    /// when the value is unchanged.
    pub fn set(&mut self, value: T) -> Option<u64> {
        if value == self.pending {
            return None;
        }
        self.pending = value;
        self.generation += 1;
        Some(self.generation)
    }

    /// Settle the pending value if `generation` is still the latest. Returns
    /// whether the settled value changed.
    pub fn settle(&mut self, generation: u64) -> bool {
        if generation != self.generation || !self.is_pending() {
            return false;
        }
        self.settled = self.pending.clone();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_collapses_to_last_value() {
        let mut value = DebouncedValue::new(String::new());
        let first = value.set("a".into()).unwrap();
        let second = value.set("ab".into()).unwrap();
        let third = value.set("abc".into()).unwrap();

        assert!(!value.settle(first));
        assert!(!value.settle(second));
        assert_eq!(value.settled(), "");
        assert!(value.settle(third));
        assert_eq!(value.settled(), "abc");
        assert!(!value.is_pending());
    }

    #[test]
    fn unchanged_value_is_not_rescheduled() {
        let mut value = DebouncedValue::new("smith".to_string());
        assert_eq!(value.set("smith".into()), None);

        let generation = value.set("jones".into()).unwrap();
        assert_eq!(value.set("jones".into()), None);
        assert!(value.settle(generation));
    }

    #[test]
    fn returning_to_settled_value_settles_nothing() {
        let mut value = DebouncedValue::new(1);
        value.set(2);
        let generation = value.set(1).unwrap();
        assert!(!value.is_pending());
        assert!(!value.settle(generation));
        assert_eq!(*value.settled(), 1);
    }
}
