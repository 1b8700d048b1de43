/// Lifecycle of one paste/drop interaction on the chat input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    Extracting,
    NoImage,
    AwaitingConfirmation,
    Declined,
    Sending,
    Sent,
    Failed,
}

impl InteractionState {
    /// Check if a transition to the target state is valid
    pub fn can_transition_to(&self, target: InteractionState) -> bool {
        use InteractionState::*;
        match (self, target) {
            (Idle, Extracting) => true,

            (Extracting, NoImage) => true,
            (Extracting, AwaitingConfirmation) => true,
            (Extracting, Sending) => true,

            (AwaitingConfirmation, Declined) => true,
            (AwaitingConfirmation, Sending) => true,

            (Sending, Sent) => true,
            (Sending, Failed) => true,

            _ => false,
        }
    }

    /// Returns true once nothing else will happen for this interaction
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            InteractionState::NoImage
                | InteractionState::Declined
                | InteractionState::Sent
                | InteractionState::Failed
        )
    }
}
