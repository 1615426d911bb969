pub mod control_panel;
pub mod help_view;
pub mod scope_view;
pub mod status_bar;

pub use control_panel::render_control_panel;
pub use help_view::render_help_view;
pub use scope_view::render_scope_view;
pub use status_bar::render_status_bar;
