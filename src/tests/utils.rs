use crate::core::utils::{
    clone_suffix_number, collect_macro_names, ensure_macro, ensure_utf8, get_image_dimensions,
    macro_name, normalize_macros, suffix_macros,
};
use crate::tests::fixture::png;
use std::borrow::Cow;

#[test]
fn test_normalize_tag_inside_name() {
    assert_eq!(
        normalize_macros("<w:t>${na<w:proofErr/>me}</w:t>"),
        "<w:t>${name}</w:t>"
    );
}

#[test]
fn test_normalize_split_runs() {
    let xml = "<w:t>${na</w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>me}</w:t>";
    assert_eq!(normalize_macros(xml), "<w:t>${name}</w:t>");

    // "$" alone in its run / "$" 单独在一个 run 中
    let xml = "<w:t>$</w:t></w:r><w:r><w:t>{total}</w:t>";
    assert_eq!(normalize_macros(xml), "<w:t>${total}</w:t>");
}

#[test]
fn test_normalize_leaves_other_text() {
    let xml = "<w:t>$5 and {x}</w:t><w:t>${ok}</w:t>";
    assert_eq!(normalize_macros(xml), xml);
}

#[test]
fn test_macro_wrapping() {
    assert_eq!(ensure_macro("name"), "${name}");
    assert!(matches!(ensure_macro("${name}"), Cow::Borrowed("${name}")));
    assert_eq!(macro_name("${name}"), "name");
    assert_eq!(macro_name("name"), "name");
}

#[test]
fn test_suffix_macros() {
    let xml = "<w:t>${a}</w:t><w:t>${b#1}</w:t>";
    assert_eq!(
        suffix_macros(xml, 2),
        "<w:t>${a#2}</w:t><w:t>${b#1#2}</w:t>"
    );
}

#[test]
fn test_collect_macro_names() {
    let mut names = vec!["b".to_string()];
    collect_macro_names("${a} ${b} ${a} ${c#1}", &mut names);
    assert_eq!(names, vec!["b", "a", "c#1"]);
}

#[test]
fn test_clone_suffix_number() {
    assert_eq!(clone_suffix_number("${photo#3}"), 3);
    assert_eq!(clone_suffix_number("photo#12"), 12);
    assert_eq!(clone_suffix_number("photo"), 0);
    assert_eq!(clone_suffix_number("photo#abc"), 0);
}

#[test]
fn test_ensure_utf8() {
    assert!(matches!(ensure_utf8("café".as_bytes()), Cow::Borrowed("café")));
    assert_eq!(ensure_utf8(b"caf\xe9"), "café");
}

#[test]
fn test_image_dimensions() {
    assert_eq!(get_image_dimensions(&png(640, 480)), Ok((640, 480)));

    let mut gif = b"GIF89a".to_vec();
    gif.extend_from_slice(&[0x20, 0x00, 0x10, 0x00]);
    gif.resize(32, 0);
    assert_eq!(get_image_dimensions(&gif), Ok((32, 16)));

    // APP0 segment, then SOF0 / APP0 段，然后是 SOF0
    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    jpeg.resize(20, 0);
    jpeg.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x20, 0x00, 0x40]);
    jpeg.resize(40, 0);
    assert_eq!(get_image_dimensions(&jpeg), Ok((64, 32)));

    // Fill bytes and a restart marker before SOF0 / SOF0 之前的填充字节和重启标记
    let mut padded = vec![0xFF, 0xD8, 0xFF, 0xFF, 0xFF, 0xD0];
    padded.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x20, 0x00, 0x40]);
    padded.resize(32, 0);
    assert_eq!(get_image_dimensions(&padded), Ok((64, 32)));

    assert!(get_image_dimensions(b"short").is_err());
    assert!(get_image_dimensions(&[0u8; 32]).is_err());
}
