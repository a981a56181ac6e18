pub mod difficulty_selector;
pub mod help_overlay;
pub mod map_view;
pub mod region_selector;
pub mod results;
