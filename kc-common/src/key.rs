//! Pitch-class arithmetic for key previews
//!
//! Keys reported by the analysis service are sharp-spelled pitch-class names
//! (`C`, `C#`, ... `B`), optionally followed by a trailing `m` for minor keys.
//! Transposing a key is a rotation on the 12-element pitch-class cycle.
//!
//! This is a preview only. The transposed audio is produced remotely and
//! nothing here influences it.

use std::fmt;
use std::str::FromStr;

/// Name returned for keys that cannot be interpreted
pub const UNKNOWN_KEY: &str = "-";

/// Trailing qualifier marking a minor key (`Am`, `F#m`)
const MINOR_MARKER: char = 'm';

/// One of the 12 pitch classes, indexed from C
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PitchClass {
    C,
    Cs,
    D,
    Ds,
    E,
    F,
    Fs,
    G,
    Gs,
    A,
    As,
    B,
}

impl PitchClass {
    /// The pitch-class cycle in semitone order
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::Cs,
        PitchClass::D,
        PitchClass::Ds,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Fs,
        PitchClass::G,
        PitchClass::Gs,
        PitchClass::A,
        PitchClass::As,
        PitchClass::B,
    ];

    /// Semitones above C (0..=11)
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 12]
    }

    /// Sharp spelling used by the analysis service
    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::Cs => "C#",
            PitchClass::D => "D",
            PitchClass::Ds => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Fs => "F#",
            PitchClass::G => "G",
            PitchClass::Gs => "G#",
            PitchClass::A => "A",
            PitchClass::As => "A#",
            PitchClass::B => "B",
        }
    }

    /// Exact lookup by sharp spelling; flats and other spellings are not in the cycle
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|pc| pc.name() == name)
    }

    /// Rotate by `semitones` (any sign, any magnitude)
    pub fn transpose(self, semitones: i32) -> Self {
        let index = (self.index() as i32 + semitones.rem_euclid(12)).rem_euclid(12);
        Self::from_index(index as usize)
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A key as reported by the analysis service: tonic plus major/minor flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MusicalKey {
    pub tonic: PitchClass,
    pub minor: bool,
}

impl MusicalKey {
    pub fn new(tonic: PitchClass, minor: bool) -> Self {
        Self { tonic, minor }
    }

    /// Shift the tonic; the mode is carried over unchanged
    pub fn transpose(self, semitones: i32) -> Self {
        Self {
            tonic: self.tonic.transpose(semitones),
            minor: self.minor,
        }
    }
}

/// Parse failure for a key name (carries the rejected input)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKey(pub String);

impl fmt::Display for UnknownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized key name: {:?}", self.0)
    }
}

impl std::error::Error for UnknownKey {}

impl FromStr for MusicalKey {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (base, minor) = match trimmed.strip_suffix(MINOR_MARKER) {
            Some(base) => (base, true),
            None => (trimmed, false),
        };

        PitchClass::from_name(base)
            .map(|tonic| MusicalKey { tonic, minor })
            .ok_or_else(|| UnknownKey(s.to_string()))
    }
}

impl fmt::Display for MusicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.minor {
            write!(f, "{}{}", self.tonic, MINOR_MARKER)
        } else {
            write!(f, "{}", self.tonic)
        }
    }
}

/// Preview the key name that results from shifting `key_name` by `shift` semitones.
///
/// Never fails: unrecognized input yields [`UNKNOWN_KEY`].
pub fn transpose_key_name(key_name: &str, shift: i32) -> String {
    match key_name.parse::<MusicalKey>() {
        Ok(key) => key.transpose(shift).to_string(),
        Err(_) => UNKNOWN_KEY.to_string(),
    }
}
