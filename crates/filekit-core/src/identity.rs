use serde::Serialize;

/// Who is viewing a page.
///
/// There is no account system; every request is rendered as
/// [`OptionalIdentity::Anonymous`]. Page rendering takes this type so that
/// adding real authentication only changes how it is produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OptionalIdentity {
    #[default]
    Anonymous,
    Authenticated { username: String },
}

impl OptionalIdentity {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, OptionalIdentity::Authenticated { .. })
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            OptionalIdentity::Anonymous => None,
            OptionalIdentity::Authenticated { username } => Some(username),
        }
    }
}
