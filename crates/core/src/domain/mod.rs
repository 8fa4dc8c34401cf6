pub mod model;
pub mod visit_state;
