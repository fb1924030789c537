use futures::executor::block_on;

use super::*;

#[test]
fn fetch_text_returns_registered_body() {
    let loader = StaticLoader::new().with("/img/star.svg", "<svg/>");
    assert_eq!(block_on(loader.fetch_text("/img/star.svg")).unwrap(), "<svg/>");
    assert_eq!(loader.fetch_count(), 1);
}

#[test]
fn missing_reference_is_load_error() {
    let loader = StaticLoader::new();
    let err = block_on(loader.fetch_bytes("/fonts/none.woff2")).unwrap_err();
    assert_eq!(err.reference, "/fonts/none.woff2");
    assert_eq!(loader.fetch_count(), 1);
}

#[test]
fn invalid_utf8_is_load_error() {
    let loader = StaticLoader::new().with("/bin", [0xff_u8, 0xfe]);
    assert!(block_on(loader.fetch_text("/bin")).is_err());
    assert_eq!(block_on(loader.fetch_bytes("/bin")).unwrap().len(), 2);
}

#[test]
fn clones_share_the_fetch_counter() {
    let loader = StaticLoader::new().with("/a", "x");
    let other = loader.clone();
    block_on(other.fetch_text("/a")).unwrap();
    assert_eq!(loader.fetch_count(), 1);
}
