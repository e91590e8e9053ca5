use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Display,
            From,
            AsRef,
            Deref,
            Into,
            Serialize,
            Deserialize,
            Default,
        )]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(RecordKey);
string_id!(OrgKey);
string_id!(ConnectorId);
string_id!(ToolsetInstanceId);
string_id!(UserId);
string_id!(ExternalId);
