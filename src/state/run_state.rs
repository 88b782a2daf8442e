/// Run state definitions for the visitor lifecycle
///
/// Cancellation is deliberately not a state: it is carried by the run's
/// cancellation token, and a cancelled run still walks through every state
/// below before it ends.
use std::fmt;

/// Represents the current phase of a visitor run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Coordinator created, nothing spawned yet
    Starting,

    /// Workers and the aggregator are running
    FetchingAndAggregating,

    /// All workers have exited and the outcome stream is closed;
    /// waiting for the aggregator to finish
    Draining,

    /// The aggregator has finished; reached exactly once per run
    Done,
}

impl RunState {
    /// Returns true if this is the terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns the only state this one may move to, if any
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Starting => Some(Self::FetchingAndAggregating),
            Self::FetchingAndAggregating => Some(Self::Draining),
            Self::Draining => Some(Self::Done),
            Self::Done => None,
        }
    }

    /// Returns true if moving from `self` to `to` is a legal transition
    pub fn can_transition_to(&self, to: RunState) -> bool {
        self.next() == Some(to)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::FetchingAndAggregating => "fetching_and_aggregating",
            Self::Draining => "draining",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_done_is_terminal() {
        assert!(!RunState::Starting.is_terminal());
        assert!(!RunState::FetchingAndAggregating.is_terminal());
        assert!(!RunState::Draining.is_terminal());
        assert!(RunState::Done.is_terminal());
    }

    #[test]
    fn test_forward_transitions() {
        assert!(RunState::Starting.can_transition_to(RunState::FetchingAndAggregating));
        assert!(RunState::FetchingAndAggregating.can_transition_to(RunState::Draining));
        assert!(RunState::Draining.can_transition_to(RunState::Done));
    }

    #[test]
    fn test_no_skipping_or_going_back() {
        assert!(!RunState::Starting.can_transition_to(RunState::Draining));
        assert!(!RunState::Starting.can_transition_to(RunState::Done));
        assert!(!RunState::FetchingAndAggregating.can_transition_to(RunState::Done));
        assert!(!RunState::Draining.can_transition_to(RunState::FetchingAndAggregating));
        assert!(!RunState::Done.can_transition_to(RunState::Starting));
        assert!(!RunState::Done.can_transition_to(RunState::Done));
    }

    #[test]
    fn test_walk_reaches_done_once() {
        let mut state = RunState::Starting;
        let mut steps = 0;
        while let Some(next) = state.next() {
            state = next;
            steps += 1;
        }
        assert_eq!(state, RunState::Done);
        assert_eq!(steps, 3);
    }

    #[test]
    fn test_display() {
        assert_eq!(RunState::Draining.to_string(), "draining");
        assert_eq!(
            format!("{}", RunState::FetchingAndAggregating),
            "fetching_and_aggregating"
        );
    }
}
