//! Turns the scraped CSV reports into enrollment records.

pub mod group;
pub mod parser;
pub mod schema;

pub use group::{
    by_course, classes_by_group_id, compute_group_ids, reconcile_teacher_emails,
    rosters_by_period,
};
pub use parser::{parse_staff_directory, parse_stu415s, ParseError};
pub use schema::{GroupId, Roster, StaffDirectoryEntry, Stu415};
