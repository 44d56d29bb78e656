use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Deserialize;
use std::io::{self, Cursor, Error, ErrorKind, Read, Seek, SeekFrom, Write};
use tracing::{debug, warn};

use crate::error::{self, Result};
use crate::record::IconRecord;
use crate::tagtable::TagTable;
use crate::tile::RasterTile;

/// The first four bytes of an ICNS file.
const ICNS_MAGIC_LITERAL: &[u8; 4] = b"icns";

/// The length of the container header (magic plus length field), in bytes.
const CONTAINER_HEADER_LENGTH: u32 = 8;

/// The records of a single ICNS file, in write order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MacIconContainer {
    /// The records stored in the file.  Duplicate tags are kept.
    pub records: Vec<IconRecord>,
}

impl MacIconContainer {
    /// Creates a new, empty container.
    pub fn new() -> MacIconContainer {
        MacIconContainer { records: Vec::new() }
    }

    /// Returns true if the container holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the encoded length of the file, in bytes, including the
    /// header.
    pub fn total_length(&self) -> io::Result<u32> {
        let mut length = CONTAINER_HEADER_LENGTH;
        for record in &self.records {
            length = length.checked_add(record.total_length()?).ok_or_else(too_large)?;
        }
        Ok(length)
    }

    /// Reads a container from an ICNS file.
    pub fn read<R: Read>(mut reader: R) -> io::Result<MacIconContainer> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != *ICNS_MAGIC_LITERAL {
            let msg = "not an icns file (wrong magic literal)";
            return Err(Error::new(ErrorKind::InvalidData, msg));
        }
        let file_length = reader.read_u32::<BigEndian>()?;
        let mut file_position = u64::from(CONTAINER_HEADER_LENGTH);
        let mut container = MacIconContainer::new();
        while file_position < u64::from(file_length) {
            let record = IconRecord::read(&mut reader)?;
            file_position += u64::from(record.total_length()?);
            container.records.push(record);
        }
        Ok(container)
    }

    /// Writes the container to a seekable output.  The length field is
    /// written as zero, then patched once every record has been written.
    /// The writer is left positioned at the end of the container.
    pub fn write<W: Write + Seek>(&self, mut writer: W) -> io::Result<()> {
        let start = writer.stream_position()?;
        writer.write_all(ICNS_MAGIC_LITERAL)?;
        writer.write_u32::<BigEndian>(0)?;
        for record in &self.records {
            record.write(&mut writer)?;
        }
        let end = writer.stream_position()?;
        let total = u32::try_from(end - start).map_err(|_| too_large())?;
        writer.seek(SeekFrom::Start(start + 4))?;
        writer.write_u32::<BigEndian>(total)?;
        writer.seek(SeekFrom::Start(end))?;
        writer.flush()
    }

    /// Encodes the container into an in-memory ICNS file.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write(&mut cursor)?;
        Ok(cursor.into_inner())
    }
}

fn too_large() -> Error {
    Error::new(ErrorKind::InvalidInput, "icns container exceeds 4 GiB")
}

/// What to do with a tile whose dimensions have no ICNS tag.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum UnsupportedPolicy {
    /// Leave the tile out without a message.
    #[default]
    Skip,
    /// Leave the tile out and emit a warning.
    Log,
    /// Fail the whole container.
    Error,
}

/// Maps raster tiles onto ICNS records.
#[derive(Clone, Debug, Default)]
pub struct MacContainerEncoder {
    table: TagTable,
    unsupported: UnsupportedPolicy,
}

impl MacContainerEncoder {
    /// Creates an encoder with the given tag table and policy for tiles
    /// the table does not cover.
    pub fn new(table: TagTable, unsupported: UnsupportedPolicy) -> MacContainerEncoder {
        MacContainerEncoder { table, unsupported }
    }

    /// Returns the tag table in use.
    pub fn table(&self) -> &TagTable {
        &self.table
    }

    /// Builds a container holding one record per recognized tile, in the
    /// order the tiles are given.  Payloads are copied verbatim.
    pub fn encode<'a, I>(&self, tiles: I) -> Result<MacIconContainer>
    where
        I: IntoIterator<Item = &'a RasterTile>,
    {
        let mut container = MacIconContainer::new();
        for tile in tiles {
            let (width, height) = (tile.pixel_width(), tile.pixel_height());
            match self.table.lookup(width, height) {
                Some(ostype) => {
                    debug!(
                        tile = %tile.spec(),
                        %ostype,
                        bytes = tile.byte_len(),
                        "adding icns record"
                    );
                    let data = tile.data().to_vec();
                    container.records.push(IconRecord::new(ostype, data));
                }
                None => match self.unsupported {
                    UnsupportedPolicy::Skip => {}
                    UnsupportedPolicy::Log => {
                        warn!(
                            tile = %tile.spec(),
                            "unsupported size {}x{}, skipping",
                            width,
                            height
                        );
                    }
                    UnsupportedPolicy::Error => {
                        let err = error::Error::UnsupportedDimension { width, height };
                        return Err(err);
                    }
                },
            }
        }
        Ok(container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Scale, SizeCatalog, TileSpec};
    use crate::ostype::OSType;

    fn tile(size: u32, scale: Scale, data: &[u8]) -> RasterTile {
        RasterTile::new(TileSpec { size, scale }, data.to_vec())
    }

    fn tiles_for(catalog: &SizeCatalog) -> Vec<RasterTile> {
        catalog
            .tile_specs()
            .into_iter()
            .map(|spec| RasterTile::new(spec, spec.to_string().into_bytes()))
            .collect()
    }

    #[test]
    fn write_empty_container() {
        let container = MacIconContainer::new();
        assert!(container.is_empty());
        let output = container.to_bytes().expect("write failed");
        assert_eq!(b"icns\0\0\0\x08", &output as &[u8]);
    }

    #[test]
    fn no_recognized_tiles_gives_header_only() {
        let encoder = MacContainerEncoder::default();
        let tiles = vec![tile(48, Scale::One, b"abc"), tile(24, Scale::One, b"")];
        let container = encoder.encode(&tiles).expect("encode failed");
        assert_eq!(b"icns\0\0\0\x08", &container.to_bytes().unwrap() as &[u8]);
    }

    #[test]
    fn single_128_record() {
        let encoder = MacContainerEncoder::default();
        let tiles = vec![tile(128, Scale::One, b"\x01\x02\x03")];
        let output = encoder.encode(&tiles).unwrap().to_bytes().unwrap();
        assert_eq!(output.len(), 19);
        assert_eq!(b"icns\0\0\0\x13it32\0\0\0\x0b\x01\x02\x03", &output as &[u8]);
    }

    #[test]
    fn zero_length_payload_is_written() {
        let encoder = MacContainerEncoder::default();
        let tiles = vec![tile(256, Scale::One, b"")];
        let output = encoder.encode(&tiles).unwrap().to_bytes().unwrap();
        assert_eq!(b"icns\0\0\0\x10ic08\0\0\0\x08", &output as &[u8]);
    }

    #[test]
    fn length_field_matches_file_and_records() {
        let encoder = MacContainerEncoder::default();
        let tiles = tiles_for(&SizeCatalog::default());
        let container = encoder.encode(&tiles).unwrap();
        let output = container.to_bytes().unwrap();
        let field = u32::from_be_bytes([output[4], output[5], output[6], output[7]]);
        assert_eq!(field as usize, output.len());
        let record_sum: u32 = container.records.iter().map(|r| r.total_length().unwrap()).sum();
        assert_eq!(record_sum + 8, field);
        assert_eq!(container.total_length().unwrap(), field);
    }

    #[test]
    fn round_trip_keeps_order_and_payloads() {
        let encoder = MacContainerEncoder::default();
        let tiles = tiles_for(&SizeCatalog::default());
        let container = encoder.encode(&tiles).unwrap();
        let parsed = MacIconContainer::read(Cursor::new(container.to_bytes().unwrap())).unwrap();
        let expected: Vec<(OSType, Vec<u8>)> = tiles
            .iter()
            .filter_map(|t| {
                encoder
                    .table()
                    .lookup(t.pixel_width(), t.pixel_height())
                    .map(|tag| (tag, t.data().to_vec()))
            })
            .collect();
        let actual: Vec<(OSType, Vec<u8>)> =
            parsed.records.iter().map(|r| (r.ostype(), r.data().to_vec())).collect();
        assert_eq!(actual, expected);
        // 48 and 48@2x (96) have no tag; 1024@2x (2048) neither.
        assert_eq!(actual.len(), 13);
    }

    #[test]
    fn colliding_dimensions_keep_both_records() {
        let encoder = MacContainerEncoder::default();
        let tiles = tiles_for(&SizeCatalog::new(vec![128, 256]));
        let container = encoder.encode(&tiles).unwrap();
        let tags: Vec<String> = container.records.iter().map(|r| r.ostype().to_string()).collect();
        assert_eq!(tags, vec!["it32", "ic08", "ic08", "ic09"]);
        assert_eq!(container.records[1].data(), b"128@2x");
        assert_eq!(container.records[2].data(), b"256");
    }

    #[test]
    fn size_16_catalog_gives_two_records() {
        let encoder = MacContainerEncoder::default();
        let tiles = tiles_for(&SizeCatalog::new(vec![16]));
        let container = encoder.encode(&tiles).unwrap();
        assert_eq!(container.records.len(), 2);
        assert_eq!(container.records[0].ostype(), OSType(*b"is32"));
        assert_eq!(container.records[1].ostype(), OSType(*b"il32"));
    }

    #[test]
    fn shared_tag_table_entry_duplicates() {
        let mut table = TagTable::default();
        table.set(32, 32, OSType(*b"is32"));
        let encoder = MacContainerEncoder::new(table, UnsupportedPolicy::Skip);
        let tiles = tiles_for(&SizeCatalog::new(vec![16]));
        let container = encoder.encode(&tiles).unwrap();
        let tags: Vec<OSType> = container.records.iter().map(|r| r.ostype()).collect();
        assert_eq!(tags, vec![OSType(*b"is32"), OSType(*b"is32")]);
    }

    #[test]
    fn error_policy_rejects_unknown_dimension() {
        let encoder = MacContainerEncoder::new(TagTable::default(), UnsupportedPolicy::Error);
        let tiles = vec![tile(16, Scale::One, b"a"), tile(48, Scale::One, b"b")];
        match encoder.encode(&tiles) {
            Err(error::Error::UnsupportedDimension { width: 48, height: 48 }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn log_policy_skips_like_skip() {
        let encoder = MacContainerEncoder::new(TagTable::default(), UnsupportedPolicy::Log);
        let tiles = vec![tile(48, Scale::One, b"b"), tile(16, Scale::One, b"a")];
        let container = encoder.encode(&tiles).unwrap();
        assert_eq!(container.records.len(), 1);
    }

    #[test]
    fn write_at_offset_patches_relative_length() {
        let mut container = MacIconContainer::new();
        container.records.push(IconRecord::new(OSType(*b"ic10"), b"xy".to_vec()));
        let mut cursor = Cursor::new(b"pre".to_vec());
        cursor.seek(SeekFrom::End(0)).unwrap();
        container.write(&mut cursor).unwrap();
        assert_eq!(b"preicns\0\0\0\x12ic10\0\0\0\x0axy", &cursor.into_inner() as &[u8]);
    }

    #[test]
    fn read_rejects_wrong_magic() {
        let err = MacIconContainer::read(Cursor::new(b"icnx\0\0\0\x08")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn read_fake_records() {
        let input = Cursor::new(b"icns\0\0\0\x1fquux\0\0\0\x0efoobarbaz!\0\0\0\x09#");
        let container = MacIconContainer::read(input).expect("read failed");
        assert_eq!(container.records.len(), 2);
        assert_eq!(container.records[0].ostype(), OSType(*b"quux"));
        assert_eq!(container.records[1].data(), b"#");
    }
}
