pub mod api;
pub mod schema;

pub use api::{Classroom, ClassroomApi, ClassroomError, InviteReport};
