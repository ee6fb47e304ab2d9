use std::path::Path;
use tokio::io::AsyncReadExt;

/// Read at most `limit` bytes from the start of the file.
///
/// Returns fewer bytes when the file is shorter; never reads past `limit`.
pub(crate) async fn read_head(path: &Path, limit: usize) -> std::io::Result<Vec<u8>> {
    let file = tokio::fs::File::open(path).await?;
    let mut buf = Vec::with_capacity(limit);
    file.take(limit as u64).read_to_end(&mut buf).await?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_head_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bin");
        tokio::fs::write(&path, vec![7u8; 4096]).await.unwrap();

        let head = read_head(&path, 512).await.unwrap();
        assert_eq!(head.len(), 512);
    }

    #[tokio::test]
    async fn test_read_head_short_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.bin");
        tokio::fs::write(&path, b"abc").await.unwrap();

        let head = read_head(&path, 512).await.unwrap();
        assert_eq!(head, b"abc");
    }

    #[tokio::test]
    async fn test_read_head_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_head(&dir.path().join("nope"), 16).await.is_err());
    }
}
