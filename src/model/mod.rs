pub mod chord;
pub mod chord_mapping;
pub mod finger;
pub mod gesture_state;
pub mod letter;
pub mod modifier;
pub mod pitch;
