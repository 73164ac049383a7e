pub mod attendance;
pub mod overview;
pub mod response;
pub mod student;
