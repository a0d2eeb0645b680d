//! Keyboard command surface.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::asset::Direction;
use crate::error::{Error, Result};
use crate::filter::FilterKind;
use crate::session::Mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Cycle { kind: FilterKind, direction: Direction },
    Toggle,
    Quit,
}

/// Next/previous keys for one filter kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
    pub next: char,
    pub prev: char,
}

impl KeyPair {
    pub const fn new(next: char, prev: char) -> Self {
        Self { next, prev }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub glasses: KeyPair,
    pub hat: KeyPair,
    pub nose: KeyPair,
    pub mouth: KeyPair,
    pub face: KeyPair,
    pub toggle: char,
    pub quit: char,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            glasses: KeyPair::new('d', 'a'),
            hat: KeyPair::new('e', 'q'),
            nose: KeyPair::new('w', 's'),
            mouth: KeyPair::new('c', 'z'),
            face: KeyPair::new('m', 'n'),
            toggle: 'f',
            quit: 'l',
        }
    }
}

impl KeyBindings {
    pub fn pair(&self, kind: FilterKind) -> KeyPair {
        match kind {
            FilterKind::Glasses => self.glasses,
            FilterKind::Hat => self.hat,
            FilterKind::Nose => self.nose,
            FilterKind::Mouth => self.mouth,
            FilterKind::FaceMask => self.face,
        }
    }

    /// Every key must map to exactly one action.
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashMap<char, String> = HashMap::new();
        let mut bind = |key: char, action: String| match seen.insert(key, action.clone()) {
            Some(previous) => Err(Error::InvalidConfig(format!(
                "key '{key}' bound to both {previous} and {action}"
            ))),
            None => Ok(()),
        };

        for kind in FilterKind::ALL {
            let pair = self.pair(kind);
            bind(pair.next, format!("{kind} next"))?;
            bind(pair.prev, format!("{kind} prev"))?;
        }
        bind(self.toggle, "toggle".into())?;
        bind(self.quit, "quit".into())
    }
}

/// Maps key presses to session commands.
#[derive(Debug, Clone, Default)]
pub struct InputController {
    bindings: KeyBindings,
}

impl InputController {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// The command for `key` in `mode`, if any.
    ///
    /// Cycle keys only resolve for kinds that are live in `mode`; toggle and
    /// quit always resolve. Unbound keys give `None`.
    pub fn command(&self, key: char, mode: Mode) -> Option<Command> {
        if key == self.bindings.toggle {
            return Some(Command::Toggle);
        }
        if key == self.bindings.quit {
            return Some(Command::Quit);
        }

        mode.kinds().iter().find_map(|&kind| {
            let pair = self.bindings.pair(kind);
            let direction = if key == pair.next {
                Direction::Next
            } else if key == pair.prev {
                Direction::Prev
            } else {
                return None;
            };
            Some(Command::Cycle { kind, direction })
        })
    }
}
