use super::*;
use crate::archive::index::ArchiveIndex;

#[test]
fn writer_round_trips_names_sizes_and_crc() {
    let mut w = StoredArchiveWriter::new();
    w.add_file("desc.txt", b"123456789").unwrap();
    w.add_directory("part0").unwrap();
    assert_eq!(w.len(), 2);

    let bytes = w.finish().unwrap();
    let index = ArchiveIndex::from_bytes(bytes.clone()).unwrap();
    let desc = index.find("desc.txt").unwrap();
    assert_eq!(desc.data_size(), 9);
    assert_eq!(desc.uncompressed_size(), 9);
    assert!(desc.is_stored());
    let payload = index.payload_of(desc).unwrap();
    assert_eq!(index.payload_bytes(&payload), b"123456789");
    assert!(index.find("part0/").is_some());

    // CRC-32 of the payload lives at offset 16 of the directory record.
    let record = desc.record_range().start;
    let crc = u32::from_le_bytes(bytes[record + 16..record + 20].try_into().unwrap());
    assert_eq!(crc, 0xCBF4_3926);
}

#[test]
fn empty_archive_is_valid() {
    let w = StoredArchiveWriter::new();
    assert!(w.is_empty());
    let index = ArchiveIndex::from_bytes(w.finish().unwrap()).unwrap();
    assert!(index.is_empty());
    assert!(index.iterate(None).is_none());
}

#[test]
fn write_to_path_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("bootanimation.zip");
    let mut w = StoredArchiveWriter::new();
    w.add_file("desc.txt", b"1 1 1\n").unwrap();
    w.write_to_path(&path).unwrap();
    assert_eq!(ArchiveIndex::open(&path).unwrap().len(), 1);
}

#[test]
fn comment_follows_the_end_record() {
    let mut w = StoredArchiveWriter::new().with_comment("frames by the art team");
    w.add_file("desc.txt", b"1 1 1\n").unwrap();
    let bytes = w.finish().unwrap();
    assert!(bytes.ends_with(b"frames by the art team"));
    assert_eq!(ArchiveIndex::from_bytes(bytes).unwrap().len(), 1);
}
