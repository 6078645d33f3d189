//! Panel views - one render function per panel page
//!
//! Current panels:
//! - Console: Scrollback log and command input
//! - Status: Power state, uptime, peak activity, version, power toggle
//! - Versions: Server version picker and custom jar input

pub mod console;
pub mod status;
pub mod versions;

pub use console::render_console;
pub use status::render_status;
pub use versions::{render_versions, VersionFocus};
