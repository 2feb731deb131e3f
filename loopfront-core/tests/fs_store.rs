//! Filesystem object store behaviour.

use loopfront_core::store::{FsObjectStore, ObjectStore};

#[tokio::test]
async fn upload_then_remove_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store =
        FsObjectStore::new(dir.path(), "https://cdn.example/thumbs").unwrap();

    store
        .upload("itm_1_card.jpg", b"jpeg bytes", "image/jpeg")
        .await
        .unwrap();
    let written = dir.path().join("itm_1_card.jpg");
    assert_eq!(tokio::fs::read(&written).await.unwrap(), b"jpeg bytes");

    store.remove("itm_1_card.jpg").await.unwrap();
    assert!(!written.exists());
}

#[tokio::test]
async fn removing_a_missing_object_is_fine() {
    let dir = tempfile::tempdir().unwrap();
    let store =
        FsObjectStore::new(dir.path(), "https://cdn.example/thumbs/").unwrap();
    store.remove("never_uploaded.jpg").await.unwrap();
}

#[tokio::test]
async fn public_urls_join_the_base() {
    let dir = tempfile::tempdir().unwrap();
    // with and without a trailing slash on the base
    for base in ["https://cdn.example/thumbs", "https://cdn.example/thumbs/"] {
        let store = FsObjectStore::new(dir.path(), base).unwrap();
        assert_eq!(
            store.public_url("itm_1_poster.jpg"),
            "https://cdn.example/thumbs/itm_1_poster.jpg"
        );
    }
}

#[test]
fn bad_base_url_is_rejected() {
    assert!(FsObjectStore::new("/tmp/thumbs", "not a url").is_err());
}
