use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Error, ErrorKind, Read, Write};

use crate::ostype::OSType;

/// The length of a record header (tag plus length field), in bytes.
pub const RECORD_HEADER_LENGTH: u32 = 8;

/// One entry in an ICNS file: a tag and its opaque data payload.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IconRecord {
    ostype: OSType,
    data: Vec<u8>,
}

impl IconRecord {
    /// Creates a record with the given tag and data payload.
    pub fn new(ostype: OSType, data: Vec<u8>) -> IconRecord {
        IconRecord { ostype, data }
    }

    /// Returns the tag of this record (e.g. `ic08`).
    pub fn ostype(&self) -> OSType {
        self.ostype
    }

    /// Returns the payload of this record.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the encoded length of the record, in bytes, including the
    /// header.  Fails if that length does not fit the 32-bit length field.
    pub fn total_length(&self) -> io::Result<u32> {
        u32::try_from(self.data.len())
            .ok()
            .and_then(|len| len.checked_add(RECORD_HEADER_LENGTH))
            .ok_or_else(|| {
                let msg = format!(
                    "'{}' record payload is too large ({} bytes)",
                    self.ostype,
                    self.data.len()
                );
                Error::new(ErrorKind::InvalidInput, msg)
            })
    }

    /// Reads a record from within an ICNS file.
    pub fn read<R: Read>(mut reader: R) -> io::Result<IconRecord> {
        let mut raw_ostype = [0u8; 4];
        reader.read_exact(&mut raw_ostype)?;
        let record_length = reader.read_u32::<BigEndian>()?;
        if record_length < RECORD_HEADER_LENGTH {
            let msg = format!(
                "invalid record length {} for '{}'",
                record_length,
                OSType(raw_ostype)
            );
            return Err(Error::new(ErrorKind::InvalidData, msg));
        }
        let data_length = u64::from(record_length - RECORD_HEADER_LENGTH);
        let mut data = Vec::new();
        reader.by_ref().take(data_length).read_to_end(&mut data)?;
        if data.len() as u64 != data_length {
            let msg = format!(
                "'{}' record truncated ({} of {} bytes)",
                OSType(raw_ostype),
                data.len(),
                data_length
            );
            return Err(Error::new(ErrorKind::UnexpectedEof, msg));
        }
        Ok(IconRecord::new(OSType(raw_ostype), data))
    }

    /// Writes the record to within an ICNS file.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        let length = self.total_length()?;
        writer.write_all(self.ostype.bytes())?;
        writer.write_u32::<BigEndian>(length)?;
        writer.write_all(&self.data)?;
        Ok(())
    }
}
