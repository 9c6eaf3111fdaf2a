pub mod api;
pub mod caption;
pub mod events;
pub mod panel;
pub mod reference;

pub use api::*;
pub use caption::*;
pub use events::*;
pub use panel::*;
pub use reference::*;
