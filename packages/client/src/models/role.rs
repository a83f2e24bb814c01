use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Villager, // 村人
    Werewolf, // 人狼
    Seer,     // 占い師
    Guard,    // 騎士
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Villager => write!(f, "村人"),
            Role::Werewolf => write!(f, "人狼"),
            Role::Seer => write!(f, "占い師"),
            Role::Guard => write!(f, "騎士"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Villager" | "村人" => Ok(Role::Villager),
            "Werewolf" | "人狼" => Ok(Role::Werewolf),
            "Seer" | "占い師" | "FortuneTeller" => Ok(Role::Seer),
            "Guard" | "騎士" => Ok(Role::Guard),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

impl Role {
    pub fn is_werewolf(&self) -> bool {
        matches!(self, Role::Werewolf)
    }

    pub fn is_seer(&self) -> bool {
        matches!(self, Role::Seer)
    }
}
