//! Services module
//!
//! Terminal-side implementations of the collaborators the chat coordinator
//! talks to: the outgoing message API, the confirmation prompt and the
//! image viewer.

mod confirm;
mod popout;
mod sink;

#[allow(unused_imports)]
pub use confirm::{LineConfirmer, PromptConfirmer};
pub use popout::SystemPopout;
pub use sink::JsonLineSink;
