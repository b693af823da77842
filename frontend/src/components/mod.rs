pub mod camera;
pub mod handlers;
pub mod header;
pub mod preview_area;
pub mod progress;
pub mod results;
pub mod sidebar;
pub mod theme_toggle;
pub mod upload_section;
pub mod utils;
