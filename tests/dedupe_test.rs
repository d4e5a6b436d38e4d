use anyhow::Result;
use blazefox::services::fs::dedupe::{find_duplicates, HashAlgo, ScanOptions};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_duplicate_scan_groups_identical_files() -> Result<()> {
    let temp_root = tempdir()?;
    let root = temp_root.path();

    fs::write(root.join("photo.jpg"), "same bytes")?;
    fs::write(root.join("photo (1).jpg"), "same bytes")?;
    fs::create_dir_all(root.join("downloads"))?;
    fs::write(root.join("downloads").join("photo-again.jpg"), "same bytes")?;
    fs::write(root.join("unique.txt"), "different")?;

    let options = ScanOptions {
        recurse: true,
        ..ScanOptions::default()
    };
    let groups = find_duplicates(root, &options)?;

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths.len(), 3);
    assert_eq!(groups[0].size, "same bytes".len() as u64);
    Ok(())
}

#[test]
fn test_both_algorithms_agree_on_grouping() -> Result<()> {
    let temp_root = tempdir()?;
    let root = temp_root.path();

    fs::write(root.join("a.bin"), vec![42u8; 4096])?;
    fs::write(root.join("b.bin"), vec![42u8; 4096])?;
    // Same size, different content: must never be grouped.
    fs::write(root.join("c.bin"), vec![43u8; 4096])?;

    for algo in [HashAlgo::Blake3, HashAlgo::Sha256] {
        let options = ScanOptions {
            algo,
            ..ScanOptions::default()
        };
        let groups = find_duplicates(root, &options)?;
        assert_eq!(groups.len(), 1, "algo {} grouped wrongly", algo.as_str());
        assert_eq!(groups[0].paths.len(), 2);
    }
    Ok(())
}
