use crate::error::VirtualDesktopError;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

/// A 128-bit class or interface identity with the same memory layout as the host's `GUID`.
#[repr(C)]
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Guid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

const GROUP_LENGTHS: [usize; 5] = [8, 4, 4, 4, 12];

impl Guid {
    pub const fn zeroed() -> Self {
        Self {
            data1: 0,
            data2: 0,
            data3: 0,
            data4: [0; 8],
        }
    }

    /// Builds an identity from its 8-4-4-4-12 groups read as one big-endian number, so
    /// `{C2F03A33-21F5-47FA-B4BB-156362A2F239}` is `0xC2F03A33_21F5_47FA_B4BB_156362A2F239`.
    pub const fn from_u128(value: u128) -> Self {
        Self {
            data1: (value >> 96) as u32,
            data2: (value >> 80) as u16,
            data3: (value >> 64) as u16,
            data4: (value as u64).to_be_bytes(),
        }
    }

    pub const fn to_u128(&self) -> u128 {
        ((self.data1 as u128) << 96)
            | ((self.data2 as u128) << 80)
            | ((self.data3 as u128) << 64)
            | u64::from_be_bytes(self.data4) as u128
    }

    /// Parses hyphenated hex text, with or without surrounding braces, in any letter case.
    pub fn parse(text: &str) -> Result<Self, VirtualDesktopError> {
        let trimmed = text.trim();
        let inner = trimmed.strip_prefix('{').unwrap_or(trimmed);
        let inner = inner.strip_suffix('}').unwrap_or(inner);

        let groups = inner.split('-').collect::<Vec<_>>();
        if groups.len() != GROUP_LENGTHS.len() {
            return Err(VirtualDesktopError::InvalidArgument(format!(
                "identity \"{text}\" has {} groups, expected {}",
                groups.len(),
                GROUP_LENGTHS.len()
            )));
        }

        let mut value = 0u128;
        for (group, expected) in groups.iter().zip(GROUP_LENGTHS) {
            if group.len() != expected {
                return Err(VirtualDesktopError::InvalidArgument(format!(
                    "identity \"{text}\" has a group of {} digits where {expected} were expected",
                    group.len()
                )));
            }

            // from_str_radix would also accept a leading sign
            if let Some(invalid) = group.chars().find(|c| !c.is_ascii_hexdigit()) {
                return Err(VirtualDesktopError::InvalidArgument(format!(
                    "identity \"{text}\" contains the non-hex character '{invalid}'"
                )));
            }

            for digit in group.chars() {
                // checked above
                let nibble = digit.to_digit(16).unwrap_or_default();
                value = (value << 4) | nibble as u128;
            }
        }

        Ok(Self::from_u128(value))
    }
}

impl Display for Guid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{:08X}-{:04X}-{:04X}-{:02X}{:02X}-",
            self.data1, self.data2, self.data3, self.data4[0], self.data4[1]
        )?;

        for byte in &self.data4[2..] {
            write!(f, "{byte:02X}")?;
        }

        write!(f, "}}")
    }
}

impl Debug for Guid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl FromStr for Guid {
    type Err = VirtualDesktopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Guid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
