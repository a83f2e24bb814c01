use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::role::Role;

/// クライアント専用のラウンド状態。ネットワークには決して載せない
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivateRoundState {
    pub player_id: String,
    pub player_role: Option<Role>,
    pub has_acted: bool,
}

/// 部分更新。Noneのフィールドは既存値を保つ
#[derive(Debug, Clone, Default)]
pub struct PrivateRoundStateUpdate {
    pub player_role: Option<Role>,
    pub has_acted: Option<bool>,
}

/// セッションスコープのキーバリュー置き場の抽象。
/// 保存先へのアドホックなアクセスはすべてここを通す
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

#[derive(Default)]
pub struct InMemorySessionStore {
    inner: Mutex<HashMap<String, String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner
            .lock()
            .expect("session store lock poisoned")
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.inner
            .lock()
            .expect("session store lock poisoned")
            .insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.inner
            .lock()
            .expect("session store lock poisoned")
            .remove(key);
    }
}

/// (room_id, player_id)ごとのPrivateRoundStateのCRUD
pub struct PrivateStateStore {
    store: Arc<dyn SessionStore>,
    room_id: String,
    player_id: String,
}

impl PrivateStateStore {
    pub fn new(store: Arc<dyn SessionStore>, room_id: String, player_id: String) -> Self {
        PrivateStateStore {
            store,
            room_id,
            player_id,
        }
    }

    fn storage_key(&self) -> String {
        format!("{}:{}", self.room_id, self.player_id)
    }

    pub fn create(&self, initial: PrivateRoundState) {
        match serde_json::to_string(&initial) {
            Ok(json) => self.store.set(&self.storage_key(), json),
            Err(e) => warn!("failed to serialize private round state: {}", e),
        }
    }

    pub fn read(&self) -> Option<PrivateRoundState> {
        let raw = self.store.get(&self.storage_key())?;
        match serde_json::from_str(&raw) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!("corrupt private round state discarded: {}", e);
                None
            }
        }
    }

    /// マージ更新。レコードが無ければ何もせずNoneを返す（エラーではない）
    pub fn update(&self, partial: PrivateRoundStateUpdate) -> Option<PrivateRoundState> {
        let mut state = self.read()?;
        if let Some(role) = partial.player_role {
            state.player_role = Some(role);
        }
        if let Some(has_acted) = partial.has_acted {
            state.has_acted = has_acted;
        }
        self.create(state.clone());
        Some(state)
    }

    pub fn set_has_acted(&self, has_acted: bool) -> Option<PrivateRoundState> {
        self.update(PrivateRoundStateUpdate {
            has_acted: Some(has_acted),
            ..Default::default()
        })
    }

    pub fn clear(&self) {
        self.store.remove(&self.storage_key());
    }
}
