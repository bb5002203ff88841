use serde::{Deserialize, Serialize};
use typeshare::typeshare;

/// Display text for the user facing gate. Servers may send this alongside
/// the challenge; callers may also build their own. The default is empty
/// text, which gates accept but users should rarely see.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[typeshare]
pub struct Prompt {
    /// Short title shown on the gate.
    pub title: String,

    /// Secondary line under the title.
    pub subtitle: String,

    /// Longer explanation of why the user is being asked.
    pub description: String,
}

impl Prompt {
    /// Build display text for a gate.
    pub fn new(
        title: impl Into<String>,
        subtitle: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            description: description.into(),
        }
    }
}
