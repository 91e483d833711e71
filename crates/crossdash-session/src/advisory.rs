//! Payload delivered by the advisory/chat flow.

use serde::Serialize;

/// First-aid guidance produced for the caller, plus an optional audio
/// rendition (a URL or file reference owned by the advisory subsystem).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    pub text: String,
    pub audio: Option<String>,
}

impl Advisory {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            audio: None,
        }
    }

    #[must_use]
    pub fn with_audio(mut self, audio: impl Into<String>) -> Self {
        self.audio = Some(audio.into());
        self
    }

    /// The guidance broken into individual steps.
    ///
    /// The advisory service separates steps with `-`; blank fragments are dropped.
    #[must_use]
    pub fn steps(&self) -> Vec<&str> {
        self.text
            .split('-')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Level change of the "guidance on screen" flag.
///
/// Only a `false -> true` crossing authorizes route computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealSignal {
    pub visible: bool,
    pub advisory: Option<Advisory>,
}

impl RevealSignal {
    #[must_use]
    pub fn shown(advisory: Advisory) -> Self {
        Self {
            visible: true,
            advisory: Some(advisory),
        }
    }

    #[must_use]
    pub fn hidden() -> Self {
        Self {
            visible: false,
            advisory: None,
        }
    }
}
