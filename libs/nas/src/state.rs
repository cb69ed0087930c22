//! Session state and transaction numbering

/// Request sequencing state
///
/// Advances forward only: `GotClientId`/`SetSystemSelection` →
/// `IndicationRegister` → `SystemInfoQuery`, then holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NasState {
    /// Client id granted; system selection not yet sent
    #[default]
    GotClientId,
    /// Retry entry for system selection, same request as `GotClientId`
    SetSystemSelection,
    /// System selection sent; registering for System Info indications
    IndicationRegister,
    /// Indications registered; querying and tracking System Info
    SystemInfoQuery,
}

/// 8-bit transaction counter that skips zero
///
/// Yields `1, 2, …, 255, 1, 2, …`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransactionCounter(u8);

impl TransactionCounter {
    pub fn new() -> Self {
        Self(0)
    }

    /// Advance and return the id for the next request
    pub fn advance(&mut self) -> u16 {
        self.0 = self.0.wrapping_add(1).max(1);
        u16::from(self.0)
    }

    /// Id of the most recent request, zero before the first
    pub fn current(&self) -> u8 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_counter_wraps_to_one() {
        let mut counter = TransactionCounter::new();
        let ids: Vec<u16> = (0..257).map(|_| counter.advance()).collect();

        assert_eq!(ids[0], 1);
        assert_eq!(ids[254], 255);
        assert_eq!(ids[255], 1);
        assert_eq!(ids[256], 2);
    }

    proptest! {
        #[test]
        fn test_counter_never_zero(steps in 0usize..2000) {
            let mut counter = TransactionCounter::new();
            for _ in 0..steps {
                prop_assert_ne!(counter.advance(), 0);
            }
        }
    }
}
