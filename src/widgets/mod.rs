pub mod controls;
pub mod datatable;
pub mod plot;
pub mod sidebar;
pub mod text_input;
