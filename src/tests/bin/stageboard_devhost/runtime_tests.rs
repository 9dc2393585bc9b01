use super::*;

#[test]
fn parse_seed_keeps_nested_paths() {
    let (key, source) = parse_seed("acme/deploy/config/pipeline.json=./seed.json", "main").unwrap();
    assert_eq!(key.owner, "acme");
    assert_eq!(key.repo, "deploy");
    assert_eq!(key.branch, "main");
    assert_eq!(key.path, "config/pipeline.json");
    assert_eq!(source, PathBuf::from("./seed.json"));
}

#[test]
fn parse_seed_rejects_incomplete_targets() {
    for bad in [
        "acme/deploy=seed.json",
        "acme//pipeline.json=seed.json",
        "acme/deploy/pipeline.json",
        "acme/deploy/pipeline.json=",
    ] {
        assert!(parse_seed(bad, "main").is_err(), "{bad}");
    }
}

#[test]
fn revisions_follow_content() {
    let a = StoredFile::new(b"{}".to_vec());
    let b = StoredFile::new(b"{}".to_vec());
    let c = StoredFile::new(b"{ }".to_vec());
    assert_eq!(a.sha, b.sha);
    assert_ne!(a.sha, c.sha);
    assert_eq!(a.sha.len(), 40);
    assert!(a.sha.chars().all(|ch| ch.is_ascii_hexdigit()));
}
