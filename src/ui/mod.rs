pub mod app_ui;
pub mod input;
pub mod widgets;

pub use app_ui::render_ui;
pub use input::handle_input;
