// Motor fault status with edge-triggered change reporting

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultStatus {
    #[default]
    Normal,
    Fault,
}

/// Combine both drive fault bits and report whether the status changed
pub fn update(fault1: bool, fault2: bool, previous: FaultStatus) -> (FaultStatus, bool) {
    let current = if fault1 || fault2 {
        FaultStatus::Fault
    } else {
        FaultStatus::Normal
    };
    (current, current != previous)
}

/// Holds the previous status across cycles
#[derive(Debug, Default)]
pub struct FaultMonitor {
    status: FaultStatus,
}

impl FaultMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> FaultStatus {
        self.status
    }

    /// Returns the new status only when it differs from the last one
    pub fn observe(&mut self, fault1: bool, fault2: bool) -> Option<FaultStatus> {
        let (current, changed) = update(fault1, fault2, self.status);
        self.status = current;
        changed.then_some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_truth_table() {
        use FaultStatus::*;
        assert_eq!(update(false, false, Normal), (Normal, false));
        assert_eq!(update(true, false, Normal), (Fault, true));
        assert_eq!(update(false, true, Normal), (Fault, true));
        assert_eq!(update(true, true, Fault), (Fault, false));
        assert_eq!(update(false, false, Fault), (Normal, true));
    }

    #[test]
    fn test_one_transition_per_edge() {
        let sequence = [
            (false, false),
            (false, false),
            (true, false),
            (true, true),
            (false, true),
            (false, false),
            (false, false),
            (true, false),
        ];
        let mut monitor = FaultMonitor::new();
        let transitions: Vec<_> = sequence
            .iter()
            .filter_map(|&(f1, f2)| monitor.observe(f1, f2))
            .collect();

        assert_eq!(
            transitions,
            vec![FaultStatus::Fault, FaultStatus::Normal, FaultStatus::Fault]
        );
        assert_eq!(monitor.status(), FaultStatus::Fault);
    }

    #[test]
    fn test_starts_normal() {
        let mut monitor = FaultMonitor::new();
        assert_eq!(monitor.status(), FaultStatus::Normal);
        assert_eq!(monitor.observe(false, false), None);
    }
}
