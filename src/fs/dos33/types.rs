//! # DOS 3.3 types
//!
//! File type codes, the Hi-ASCII filename forms, and layout constants
//! shared by the catalog and track/sector list walkers.

use std::fmt;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

/// Track holding the VTOC and (by convention) the catalog.
pub const VTOC_TRACK: u8 = 17;
/// Byte offsets of the seven file entries within a catalog sector.
pub const ENTRY_OFFSETS: [usize;7] = [0x0b,0x2e,0x51,0x74,0x97,0xba,0xdd];
/// Number of (track,sector) pairs in one track/sector list sector.
pub const TSLIST_PAIRS: usize = 122;
/// Hi-ASCII space, the filename pad byte.
pub const HI_SPACE: u8 = 0xa0;

/// Enumerates the eight DOS file types.  Conversions:
/// * FileType to u8: `as u8`
/// * u8 to FileType: `FileType::from_code` masks off the lock bit first
#[derive(FromPrimitive,PartialEq,Eq,Clone,Copy,Debug)]
pub enum FileType {
    Text = 0x00,
    Integer = 0x01,
    Applesoft = 0x02,
    Binary = 0x04,
    TypeS = 0x08,
    Relocatable = 0x10,
    NewA = 0x20,
    NewB = 0x40
}

impl FileType {
    /// Interpret the type-and-flags byte of a file entry.  Returns None
    /// for a code that is not one of the eight defined bits.
    pub fn from_code(type_and_flags: u8) -> Option<Self> {
        FileType::from_u8(type_and_flags & 0x7f)
    }
    /// Binary and relocatable files carry a 4-byte address/length header
    /// in their first data sector.
    pub fn uses_header(&self) -> bool {
        matches!(self,Self::Binary | Self::Relocatable)
    }
}

/// One-letter code as shown by CATALOG.  The late-DOS A and B types share
/// letters with Applesoft and Binary.
impl fmt::Display for FileType {
    fn fmt(&self,f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f,"T"),
            Self::Integer => write!(f,"I"),
            Self::Applesoft => write!(f,"A"),
            Self::Binary => write!(f,"B"),
            Self::TypeS => write!(f,"S"),
            Self::Relocatable => write!(f,"R"),
            Self::NewA => write!(f,"A"),
            Self::NewB => write!(f,"B")
        }
    }
}

/// The name of a DOS 3.3 file, as the raw Hi-ASCII bytes with the
/// trailing pad stripped.
///
/// Each byte carries two signals: the low 7 bits are the ASCII character,
/// and the high bit is the Apple II video mode -- set for normal text,
/// clear for inverted.  The high bit is *not* a deletion or case marker,
/// so every derived form here must keep the raw bytes recoverable.
///
/// Three derived forms are offered: `logical` (just the characters),
/// `path_safe` (printable ASCII that can stand in a pathname, mapping an
/// inverted character into the 0x40-0x7f column), and `ansi_escaped`
/// (terminal rendering with inverse-video escape codes).
#[derive(Clone,PartialEq,Eq,Debug)]
pub struct Filename {
    raw: Vec<u8>
}

const ESC_INVERSE: &str = "\x1b[47;30m";
const ESC_RESET: &str = "\x1b[0m";

impl Filename {
    /// Wrap the name field of a file entry, trimming the trailing
    /// Hi-ASCII spaces.
    pub fn from_raw(field: &[u8]) -> Self {
        let mut end = field.len();
        while end > 0 && field[end-1] == HI_SPACE {
            end -= 1;
        }
        Self { raw: field[0..end].to_vec() }
    }
    /// Build a name from characters and their inverted flags.  The
    /// inverse of `logical` paired with `inverted_flags`.
    pub fn from_display(text: &str,inverted: &[bool]) -> Self {
        let mut raw: Vec<u8> = Vec::new();
        for (i,ch) in text.bytes().enumerate() {
            match inverted.get(i) {
                Some(true) => raw.push(ch & 0x7f),
                _ => raw.push(ch | 0x80)
            }
        }
        Self { raw }
    }
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }
    /// The characters alone, high bit stripped.
    pub fn logical(&self) -> String {
        self.raw.iter().map(|b| (b & 0x7f) as char).collect()
    }
    /// Which characters are displayed in inverse video.
    pub fn inverted_flags(&self) -> Vec<bool> {
        self.raw.iter().map(|b| b & 0x80 == 0).collect()
    }
    /// Printable form usable as a path component.  Inverted characters
    /// live in 0x00-0x3f and are lifted into the 0x40-0x7f column;
    /// normal characters decode to their low 7 bits.  Slashes are not
    /// escaped here; a path layer must reject or escape them.
    pub fn path_safe(&self) -> String {
        let mut ans = String::new();
        for b in &self.raw {
            if b & 0x80 == 0 {
                ans.push((b | 0x40) as char);
            } else {
                ans.push((b & 0x7f) as char);
            }
        }
        ans
    }
    /// Terminal rendering: maximal inverted runs are wrapped in
    /// inverse-video escape codes, the way the name looked on the II.
    pub fn ansi_escaped(&self) -> String {
        let mut ans = String::new();
        let mut prev_inverted = false;
        for b in &self.raw {
            let inverted = b & 0x80 == 0;
            if inverted && !prev_inverted {
                ans += ESC_INVERSE;
            }
            if !inverted && prev_inverted {
                ans += ESC_RESET;
            }
            prev_inverted = inverted;
            if inverted {
                ans.push((b | 0x40) as char);
            } else {
                ans.push((b & 0x7f) as char);
            }
        }
        if prev_inverted {
            ans += ESC_RESET;
        }
        ans
    }
}

/// Length of a sequential text payload up to its NUL terminator.  This is
/// a format hint for consumers; the reader itself returns whole sectors.
pub fn sequential_text_len(data: &[u8]) -> usize {
    match data.iter().position(|b| *b==0) {
        Some(n) => n,
        None => data.len()
    }
}
