use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::{Entity, EntityMeta};

/// The release ids on a user's want-list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserWantlist {
    #[serde(flatten)]
    pub meta: EntityMeta,
    pub username: String,
    pub exists: bool,
    pub release_ids: Vec<i64>,
    pub last_updated: DateTime<Utc>,
}

impl UserWantlist {
    pub fn new(username: &str, release_ids: Vec<i64>) -> Self {
        Self {
            meta: EntityMeta::default(),
            username: username.to_string(),
            exists: true,
            release_ids,
            last_updated: Utc::now(),
        }
    }

    pub fn not_found(username: &str) -> Self {
        Self {
            exists: false,
            ..Self::new(username, Vec::new())
        }
    }
}

impl Entity for UserWantlist {
    fn key(&self) -> &str {
        &self.username
    }

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    fn set_last_updated(&mut self, at: DateTime<Utc>) {
        self.last_updated = at;
    }
}
