pub mod credentials;
pub mod fs_json_util;
pub mod macros;
