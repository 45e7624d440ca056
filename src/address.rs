//! Textual addresses: `0vp<page>s<offset>` for virtual, `0pf<frame>s<offset>` for
//! physical. The offset is carried through translation unchanged.

use std::{fmt, str::FromStr};

use page_table::{FrameId, PageId};

const VIRTUAL_PREFIX: &str = "0vp";
const PHYSICAL_PREFIX: &str = "0pf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    MissingPrefix,
    MissingSeparator,
    InvalidNumber(String),
    OffsetOutOfRange { offset: u64, page_size: u64 },
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressError::MissingPrefix => write!(f, "address must start with {}", VIRTUAL_PREFIX),
            AddressError::MissingSeparator => write!(f, "address is missing the 's' separator"),
            AddressError::InvalidNumber(s) => write!(f, "'{}' is not a decimal number", s),
            AddressError::OffsetOutOfRange { offset, page_size } => {
                write!(f, "offset {} is outside a {} byte page", offset, page_size)
            }
        }
    }
}

impl std::error::Error for AddressError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualAddress {
    pub page: PageId,
    pub offset: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalAddress {
    pub frame: FrameId,
    pub offset: u64,
}

impl VirtualAddress {
    pub fn new(page: PageId, offset: u64) -> Self {
        Self { page, offset }
    }

    pub fn check_offset(&self, page_size: u64) -> Result<(), AddressError> {
        if self.offset >= page_size {
            return Err(AddressError::OffsetOutOfRange {
                offset: self.offset,
                page_size,
            });
        }
        Ok(())
    }
}

impl PhysicalAddress {
    pub fn new(frame: FrameId, offset: u64) -> Self {
        Self { frame, offset }
    }
}

fn parse_number<T: FromStr>(digits: &str) -> Result<T, AddressError> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AddressError::InvalidNumber(digits.to_string()));
    }
    digits
        .parse()
        .map_err(|_| AddressError::InvalidNumber(digits.to_string()))
}

impl FromStr for VirtualAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .trim()
            .strip_prefix(VIRTUAL_PREFIX)
            .ok_or(AddressError::MissingPrefix)?;
        let (page, offset) = rest.split_once('s').ok_or(AddressError::MissingSeparator)?;
        Ok(VirtualAddress {
            page: parse_number(page)?,
            offset: parse_number(offset)?,
        })
    }
}

impl fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}s{}", VIRTUAL_PREFIX, self.page, self.offset)
    }
}

impl fmt::Display for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}s{}", PHYSICAL_PREFIX, self.frame, self.offset)
    }
}
