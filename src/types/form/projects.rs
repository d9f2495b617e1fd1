use serde::de::{Error as DeError, IgnoredAny, MapAccess, SeqAccess};
use serde::{Deserialize, Deserializer};

use crate::schema::Checkpoint;

/// Query of `GET /api/projects`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProjects {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Body of `POST /api/projects`.
///
/// Every field is optional. Snake case names are accepted as well.
/// A `progress` sent by the client is ignored since it is always derived.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, alias = "project_name")]
    pub project_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "created_by")]
    pub created_by: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default, alias = "assigned_user_ids")]
    pub assigned_user_ids: Option<Vec<String>>,
    #[serde(default)]
    pub checkpoints: Option<Vec<Checkpoint>>,
}

/// Body of `PUT /api/projects/{id}/checkpoints`.
///
/// Older clients send the bare array while newer ones wrap
/// it as `{"checkpoints": [...]}`. Both are accepted.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReplaceCheckpoints(pub Vec<Checkpoint>);

impl<'de> Deserialize<'de> for ReplaceCheckpoints {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Visitor;

        impl<'de> serde::de::Visitor<'de> for Visitor {
            type Value = ReplaceCheckpoints;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a list of checkpoints or an object with a `checkpoints` field")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut checkpoints = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(checkpoint) = seq.next_element::<Checkpoint>()? {
                    checkpoints.push(checkpoint);
                }
                Ok(ReplaceCheckpoints(checkpoints))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut checkpoints = None;
                while let Some(key) = map.next_key::<String>()? {
                    if key == "checkpoints" {
                        if checkpoints.is_some() {
                            return Err(DeError::duplicate_field("checkpoints"));
                        }
                        checkpoints = Some(map.next_value::<Vec<Checkpoint>>()?);
                    } else {
                        map.next_value::<IgnoredAny>()?;
                    }
                }

                checkpoints
                    .map(ReplaceCheckpoints)
                    .ok_or_else(|| DeError::missing_field("checkpoints"))
            }
        }

        deserializer.deserialize_any(Visitor)
    }
}
