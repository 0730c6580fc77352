use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Player intents forwarded by the presentation layer.
///
/// None of them carries a payload; each either changes the session or is a
/// no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intent {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    HardDrop,
    TogglePause,
    ToggleAdvisor,
    NewGame,
}

impl Intent {
    pub const ALL: [Self; 8] = [
        Intent::MoveLeft,
        Intent::MoveRight,
        Intent::SoftDrop,
        Intent::Rotate,
        Intent::HardDrop,
        Intent::TogglePause,
        Intent::ToggleAdvisor,
        Intent::NewGame,
    ];

    /// Kebab-case name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Intent::MoveLeft => "move-left",
            Intent::MoveRight => "move-right",
            Intent::SoftDrop => "soft-drop",
            Intent::Rotate => "rotate",
            Intent::HardDrop => "hard-drop",
            Intent::TogglePause => "toggle-pause",
            Intent::ToggleAdvisor => "toggle-advisor",
            Intent::NewGame => "new-game",
        }
    }

    /// Returns whether this intent moves or locks the falling piece.
    #[must_use]
    pub const fn is_piece_control(self) -> bool {
        matches!(
            self,
            Intent::MoveLeft
                | Intent::MoveRight
                | Intent::SoftDrop
                | Intent::Rotate
                | Intent::HardDrop
        )
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("unknown intent: {name:?}")]
pub struct IntentParseError {
    name: String,
}

impl FromStr for Intent {
    type Err = IntentParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|intent| intent.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| IntentParseError {
                name: name.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        for intent in Intent::ALL {
            assert_eq!(intent.name().parse::<Intent>().unwrap(), intent);
        }
        assert_eq!(" Hard-Drop ".parse::<Intent>().unwrap(), Intent::HardDrop);
        assert!("jump".parse::<Intent>().is_err());
    }

    #[test]
    fn test_serde_uses_kebab_case() {
        assert_eq!(
            serde_json::to_string(&Intent::ToggleAdvisor).unwrap(),
            "\"toggle-advisor\""
        );
        let intent: Intent = serde_json::from_str("\"soft-drop\"").unwrap();
        assert_eq!(intent, Intent::SoftDrop);
    }
}
