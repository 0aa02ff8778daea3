//! Key Chord Table
//!
//! Parses per-platform binding specifications into structured [`Chord`]s.
//!
//! # Binding syntax
//!
//! - A chord is zero or more modifiers followed by a key, joined by `-` or `+`:
//!   `"Ctrl-Shift-K"`, `"Ctrl+F3"`, `"Command-\\"`, `"Ctrl--"`.
//! - Alternatives for the same command are separated by `|`: `"Ctrl-Y|Ctrl-Shift-Z"`.
//!   Matching any one alternative triggers the command.
//! - Multi-stroke sequences are separated by whitespace: `"Ctrl-K Ctrl-C"`.
//!
//! Modifier and named-key tokens are case-insensitive, and single-character keys are normalized to
//! lowercase, so `"ctrl-a"`, `"Ctrl-A"` and `"Control+a"` describe the same chord.
//!
//! # Platforms
//!
//! Bindings come in two profiles: [`Platform::Primary`] (Ctrl-style keyboards) and
//! [`Platform::Secondary`] (Command-style keyboards). A [`BindingSpec::Derived`] binding is written
//! once for the primary platform; the secondary form is obtained by replacing Ctrl with Command.
//!
//! ```rust
//! use editor_commands::{BindingSpec, Chord, Platform};
//!
//! let (binding, errors) = BindingSpec::derived("Ctrl-S").resolve();
//! assert!(errors.is_empty());
//!
//! let save_mac: Chord = "Command-S".parse().unwrap();
//! assert!(binding.matches(&save_mac, Platform::Secondary));
//! ```

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

bitflags! {
    /// Modifier keys held while pressing a chord's base key.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Control.
        const CTRL = 1;
        /// Alt / Option.
        const ALT = 1 << 1;
        /// Shift.
        const SHIFT = 1 << 2;
        /// Command / Meta / Super.
        const COMMAND = 1 << 3;
    }
}

impl Modifiers {
    fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => Some(Self::CTRL),
            "alt" | "option" => Some(Self::ALT),
            "shift" => Some(Self::SHIFT),
            "cmd" | "command" | "meta" | "super" => Some(Self::COMMAND),
            _ => None,
        }
    }
}

/// Non-character keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Home.
    Home,
    /// End.
    End,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// Backspace.
    Backspace,
    /// Forward delete.
    Delete,
    /// Insert.
    Insert,
    /// Enter / Return.
    Enter,
    /// Tab.
    Tab,
    /// Escape.
    Escape,
    /// Space bar.
    Space,
}

/// The base key of a chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character, stored lowercase.
    Char(char),
    /// A named non-character key.
    Named(NamedKey),
    /// Function key `F1`..`F24`.
    F(u8),
}

impl Key {
    /// A character key, normalized to lowercase.
    pub fn char(c: char) -> Self {
        Self::Char(c.to_lowercase().next().unwrap_or(c))
    }
}

// Load-once name table; the only shared state the parser consults.
static NAMED_KEYS: &[(&str, NamedKey)] = &[
    ("up", NamedKey::Up),
    ("down", NamedKey::Down),
    ("left", NamedKey::Left),
    ("right", NamedKey::Right),
    ("home", NamedKey::Home),
    ("end", NamedKey::End),
    ("pageup", NamedKey::PageUp),
    ("pagedown", NamedKey::PageDown),
    ("backspace", NamedKey::Backspace),
    ("delete", NamedKey::Delete),
    ("del", NamedKey::Delete),
    ("insert", NamedKey::Insert),
    ("ins", NamedKey::Insert),
    ("enter", NamedKey::Enter),
    ("return", NamedKey::Enter),
    ("tab", NamedKey::Tab),
    ("escape", NamedKey::Escape),
    ("esc", NamedKey::Escape),
    ("space", NamedKey::Space),
];

impl FromStr for Key {
    type Err = ChordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (None, _) => return Err(ChordParseError::MissingKey),
            (Some(c), None) if !c.is_whitespace() && !c.is_control() => {
                return Ok(Key::char(c));
            }
            _ => {}
        }

        let lower = s.to_ascii_lowercase();
        if let Some((_, named)) = NAMED_KEYS.iter().find(|(name, _)| *name == lower) {
            return Ok(Key::Named(*named));
        }

        if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok())
            && (1..=24).contains(&n)
        {
            return Ok(Key::F(n));
        }

        Err(ChordParseError::UnknownKey(s.to_string()))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c.to_uppercase()),
            Key::F(n) => write!(f, "F{n}"),
            Key::Named(named) => {
                let name = match named {
                    NamedKey::Up => "Up",
                    NamedKey::Down => "Down",
                    NamedKey::Left => "Left",
                    NamedKey::Right => "Right",
                    NamedKey::Home => "Home",
                    NamedKey::End => "End",
                    NamedKey::PageUp => "PageUp",
                    NamedKey::PageDown => "PageDown",
                    NamedKey::Backspace => "Backspace",
                    NamedKey::Delete => "Delete",
                    NamedKey::Insert => "Insert",
                    NamedKey::Enter => "Enter",
                    NamedKey::Tab => "Tab",
                    NamedKey::Escape => "Esc",
                    NamedKey::Space => "Space",
                };
                f.write_str(name)
            }
        }
    }
}

/// One keyboard shortcut: a modifier set plus a base key.
///
/// Equality is structural, so the order modifiers were written in does not matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chord {
    /// Held modifiers.
    pub modifiers: Modifiers,
    /// Base key.
    pub key: Key,
}

impl Chord {
    /// Create a chord. Character keys are normalized to lowercase.
    pub fn new(modifiers: Modifiers, key: Key) -> Self {
        let key = match key {
            Key::Char(c) => Key::char(c),
            other => other,
        };
        Self { modifiers, key }
    }

    /// A chord with no modifiers.
    pub fn plain(key: Key) -> Self {
        Self::new(Modifiers::empty(), key)
    }

    /// Map this chord onto another platform's dominant modifier.
    ///
    /// Returns `None` when the mapping is ambiguous, i.e. the chord already holds both the
    /// source and the target modifier.
    fn substitute(self, from: Modifiers, to: Modifiers) -> Option<Self> {
        if !self.modifiers.contains(from) {
            return Some(self);
        }
        if self.modifiers.contains(to) {
            return None;
        }
        Some(Self {
            modifiers: (self.modifiers - from) | to,
            key: self.key,
        })
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in [
            (Modifiers::CTRL, "Ctrl"),
            (Modifiers::ALT, "Alt"),
            (Modifiers::SHIFT, "Shift"),
            (Modifiers::COMMAND, "Command"),
        ] {
            if self.modifiers.contains(flag) {
                write!(f, "{name}-")?;
            }
        }
        write!(f, "{}", self.key)
    }
}

impl FromStr for Chord {
    type Err = ChordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ChordParseError::Empty);
        }

        let parts = split_chord(s);
        let (key, modifier_tokens) = parts.split_last().ok_or(ChordParseError::Empty)?;

        let mut modifiers = Modifiers::empty();
        for token in modifier_tokens {
            modifiers |= Modifiers::from_token(token)
                .ok_or_else(|| ChordParseError::UnknownModifier((*token).to_string()))?;
        }

        if Modifiers::from_token(key).is_some() {
            return Err(ChordParseError::MissingKey);
        }

        Ok(Chord::new(modifiers, key.parse()?))
    }
}

// Split on `-`/`+`, treating a separator that directly follows another as the key itself
// (`"Ctrl--"` is Ctrl plus minus).
fn split_chord(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if (c == '-' || c == '+') && i > start {
            parts.push(&s[start..i]);
            start = i + 1;
        }
    }
    parts.push(&s[start..]);
    parts
}

/// An ordered multi-stroke key sequence. Most bindings have exactly one stroke.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeySequence(pub Vec<Chord>);

impl KeySequence {
    /// A single-stroke sequence.
    pub fn single(chord: Chord) -> Self {
        Self(vec![chord])
    }

    /// The strokes of this sequence.
    pub fn chords(&self) -> &[Chord] {
        &self.0
    }

    /// The chord, if this is a single-stroke sequence.
    pub fn as_single(&self) -> Option<&Chord> {
        match self.0.as_slice() {
            [chord] => Some(chord),
            _ => None,
        }
    }
}

impl fmt::Display for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, chord) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{chord}")?;
        }
        Ok(())
    }
}

impl FromStr for KeySequence {
    type Err = ChordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chords = s
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<Chord>, _>>()?;
        if chords.is_empty() {
            return Err(ChordParseError::Empty);
        }
        Ok(Self(chords))
    }
}

/// Keyboard profile a binding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Ctrl-style keyboards (Windows, Linux).
    #[serde(alias = "win", alias = "windows", alias = "linux")]
    Primary,
    /// Command-style keyboards (macOS).
    #[serde(alias = "mac", alias = "macos")]
    Secondary,
}

impl Platform {
    /// Both platforms, primary first.
    pub const ALL: [Platform; 2] = [Platform::Primary, Platform::Secondary];

    /// The profile matching the compilation target.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::Secondary
        } else {
            Self::Primary
        }
    }

    /// The modifier this platform uses for most shortcuts.
    pub fn dominant_modifier(self) -> Modifiers {
        match self {
            Self::Primary => Modifiers::CTRL,
            Self::Secondary => Modifiers::COMMAND,
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => f.write_str("primary"),
            Self::Secondary => f.write_str("secondary"),
        }
    }
}

/// Why a single chord failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChordParseError {
    /// Empty chord or empty alternative.
    #[error("empty chord")]
    Empty,
    /// Only modifiers were given.
    #[error("chord has no base key")]
    MissingKey,
    /// A token before the key is not a modifier.
    #[error("unknown modifier `{0}`")]
    UnknownModifier(String),
    /// The key token is not recognized.
    #[error("unknown key `{0}`")]
    UnknownKey(String),
}

/// A binding form that could not be parsed. The command keeps no binding for `platform`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed {platform} binding `{spec}`: {reason}")]
pub struct MalformedBindingError {
    /// Platform whose form was rejected.
    pub platform: Platform,
    /// The raw form text.
    pub spec: String,
    /// The offending token.
    #[source]
    pub reason: ChordParseError,
}

/// Raw, unparsed binding declaration for a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingSpec {
    /// The same form on both platforms.
    Shared(Cow<'static, str>),
    /// Explicit per-platform forms; `None` means no binding on that platform.
    PerPlatform {
        /// Ctrl-style form.
        primary: Option<Cow<'static, str>>,
        /// Command-style form.
        secondary: Option<Cow<'static, str>>,
    },
    /// A primary form only; the secondary form is derived by substituting Ctrl with Command.
    Derived(Cow<'static, str>),
}

impl BindingSpec {
    /// Explicit per-platform forms.
    pub fn new(primary: Option<&'static str>, secondary: Option<&'static str>) -> Self {
        Self::PerPlatform {
            primary: primary.map(Cow::Borrowed),
            secondary: secondary.map(Cow::Borrowed),
        }
    }

    /// One form used on both platforms.
    pub fn shared(keys: impl Into<Cow<'static, str>>) -> Self {
        Self::Shared(keys.into())
    }

    /// A primary form with an automatically derived secondary form.
    pub fn derived(keys: impl Into<Cow<'static, str>>) -> Self {
        Self::Derived(keys.into())
    }

    /// Parse both platform forms.
    ///
    /// Never fails as a whole: each platform whose form is malformed ends up with no binding and
    /// contributes one [`MalformedBindingError`].
    pub fn resolve(&self) -> (ResolvedBinding, Vec<MalformedBindingError>) {
        let mut errors = Vec::new();
        let mut parse = |platform: Platform, form: Option<&str>| match form {
            None => Vec::new(),
            Some(form) => parse_alternatives(form, platform).unwrap_or_else(|err| {
                errors.push(err);
                Vec::new()
            }),
        };

        let binding = match self {
            Self::Shared(keys) => ResolvedBinding {
                primary: parse(Platform::Primary, Some(keys.as_ref())),
                secondary: parse(Platform::Secondary, Some(keys.as_ref())),
            },
            Self::PerPlatform { primary, secondary } => ResolvedBinding {
                primary: parse(Platform::Primary, primary.as_deref()),
                secondary: parse(Platform::Secondary, secondary.as_deref()),
            },
            Self::Derived(keys) => {
                let primary = parse(Platform::Primary, Some(keys.as_ref()));
                let secondary = derive_sequences(&primary, Platform::Primary, Platform::Secondary)
                    .unwrap_or_else(|| {
                        tracing::debug!(
                            binding = %keys,
                            "secondary binding is ambiguous; leaving it unbound"
                        );
                        Vec::new()
                    });
                ResolvedBinding { primary, secondary }
            }
        };

        (binding, errors)
    }
}

fn parse_alternatives(
    form: &str,
    platform: Platform,
) -> Result<Vec<KeySequence>, MalformedBindingError> {
    if form.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut alternatives: Vec<KeySequence> = Vec::new();
    for alternative in form.split('|') {
        let sequence = alternative
            .parse::<KeySequence>()
            .map_err(|reason| MalformedBindingError {
                platform,
                spec: form.to_string(),
                reason,
            })?;
        if !alternatives.contains(&sequence) {
            alternatives.push(sequence);
        }
    }
    Ok(alternatives)
}

fn derive_sequences(
    sequences: &[KeySequence],
    from: Platform,
    to: Platform,
) -> Option<Vec<KeySequence>> {
    let (from, to) = (from.dominant_modifier(), to.dominant_modifier());
    sequences
        .iter()
        .map(|sequence| {
            sequence
                .0
                .iter()
                .map(|chord| chord.substitute(from, to))
                .collect::<Option<Vec<_>>>()
                .map(KeySequence)
        })
        .collect()
}

/// Parsed, normalized bindings of one command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedBinding {
    primary: Vec<KeySequence>,
    secondary: Vec<KeySequence>,
}

impl ResolvedBinding {
    /// Alternatives for `platform`, in declaration order without duplicates.
    pub fn for_platform(&self, platform: Platform) -> &[KeySequence] {
        match platform {
            Platform::Primary => &self.primary,
            Platform::Secondary => &self.secondary,
        }
    }

    /// Whether neither platform has a binding.
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.secondary.is_empty()
    }

    /// Whether `chord` alone triggers this binding on `platform`.
    pub fn matches(&self, chord: &Chord, platform: Platform) -> bool {
        self.for_platform(platform)
            .iter()
            .any(|sequence| sequence.as_single() == Some(chord))
    }

    /// Whether the full multi-stroke `sequence` triggers this binding on `platform`.
    pub fn matches_sequence(&self, sequence: &KeySequence, platform: Platform) -> bool {
        self.for_platform(platform).contains(sequence)
    }
}
