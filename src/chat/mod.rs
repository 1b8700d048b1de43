//! Chat input handling
//!
//! - `coordinator` - paste/drop to image message pipeline
//! - `popout` - click-to-enlarge for posted images
//! - `state` - interaction lifecycle
//! - `widget` - chat input state and send slot

mod coordinator;
mod popout;
mod state;
mod widget;

// Not every re-export is used by the binary yet; tests and embedders reach
// them through `chat::`.
#[allow(unused_imports)]
pub use coordinator::{
    ChatCoordinator, Confirmer, ErrorReporter, IgnoreReason, InteractionOutcome, MessageSink,
    SendSettings,
};
pub use popout::{ImageElement, Popout, PopoutOptions, image_elements, on_image_click};
#[allow(unused_imports)]
pub use state::InteractionState;
#[allow(unused_imports)]
pub use widget::{BusyGuard, ChatWidget, ChatWidgetState, SendReservation};
