use std::fmt::{self, Debug};

use derive_more::{AsRef, Display, From};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Portal login, e.g. `e12345`. Needs administrative rights for report jobs.
#[derive(Debug, TypedBuilder, Serialize, Deserialize)]
pub struct Credentials {
    pub user_name: UserName,
    pub password: Password,
}

#[derive(Clone, Debug, From, AsRef, Display, Serialize, Deserialize)]
#[as_ref(forward)]
pub struct UserName(String);

#[derive(Clone, From, AsRef, Serialize, Deserialize)]
#[as_ref(forward)]
pub struct Password(String);
impl Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(..)")
    }
}
