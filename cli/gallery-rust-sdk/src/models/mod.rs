pub mod detail_state;
pub mod filters;
pub mod guard;
pub mod list_state;
pub mod location;
pub mod sequence;
pub mod taxonomy;
