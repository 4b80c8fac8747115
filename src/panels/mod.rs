mod central_panel;
mod import_panel;
mod properties_panel;
mod start_page;
mod tools_panel;
mod top_bar;

pub use central_panel::central_panel;
pub use import_panel::import_panel;
pub use properties_panel::{PropertiesPanel, palette};
pub use start_page::start_page;
pub use tools_panel::tools_panel;
pub use top_bar::top_bar;
