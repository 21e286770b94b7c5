use crate::properties::{Properties, parse};
use log::debug;
use std::io;
use std::path::Path;

/// Where properties files are read from and written to.
///
/// Errors are handed back to the caller exactly as the storage reports them.
#[allow(async_fn_in_trait)]
pub trait FileStorage {
    async fn read_file(&self, path: &Path) -> io::Result<String>;
    async fn write_file(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// The local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct Filesystem;

impl FileStorage for Filesystem {
    async fn read_file(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    async fn write_file(&self, path: &Path, contents: &str) -> io::Result<()> {
        tokio::fs::write(path, contents).await
    }
}

/// Reads and parses the properties file at `path`.
pub async fn load(path: impl AsRef<Path>) -> io::Result<Properties> {
    load_from(&Filesystem, path).await
}

pub async fn load_from<S: FileStorage>(storage: &S, path: impl AsRef<Path>) -> io::Result<Properties> {
    let path = path.as_ref();
    let contents = storage.read_file(path).await?;
    let properties = parse(&contents);
    debug!("loaded {} lines from {}", properties.len(), path.display());
    Ok(properties)
}

impl Properties {
    /// Writes the normalized form of the document to `path`, replacing its contents.
    pub async fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
        self.save_to(&Filesystem, path).await
    }

    pub async fn save_to<S: FileStorage>(&self, storage: &S, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        storage.write_file(path, &self.stringify()).await?;
        debug!("saved {} lines to {}", self.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::properties::tests::SAMPLE;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    const NORMALIZED: &str = "# Properties file\nwoo=hoo\nyee=haw\nanswer=42\n#Two\nhi=there\n";

    /// Keeps files in memory and remembers everything written to it.
    #[derive(Default)]
    pub(crate) struct MemoryStorage {
        pub files: Mutex<HashMap<PathBuf, String>>,
        pub writes: Mutex<Vec<(PathBuf, String)>>,
    }

    impl MemoryStorage {
        pub fn with_file(path: &str, contents: &str) -> Self {
            let storage = Self::default();
            storage
                .files
                .lock()
                .expect("failed to lock files")
                .insert(PathBuf::from(path), contents.to_string());
            storage
        }
    }

    impl FileStorage for MemoryStorage {
        async fn read_file(&self, path: &Path) -> io::Result<String> {
            self.files
                .lock()
                .expect("failed to lock files")
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
        }

        async fn write_file(&self, path: &Path, contents: &str) -> io::Result<()> {
            self.writes
                .lock()
                .expect("failed to lock writes")
                .push((path.to_owned(), contents.to_string()));
            self.files
                .lock()
                .expect("failed to lock files")
                .insert(path.to_owned(), contents.to_string());
            Ok(())
        }
    }

    struct ReadOnlyStorage;

    impl FileStorage for ReadOnlyStorage {
        async fn read_file(&self, _path: &Path) -> io::Result<String> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read denied"))
        }

        async fn write_file(&self, _path: &Path, _contents: &str) -> io::Result<()> {
            Err(io::Error::other("disk full"))
        }
    }

    #[test_log::test(tokio::test)]
    async fn load_parses_a_properties_file() {
        let storage = MemoryStorage::with_file("foo", SAMPLE);
        let properties = load_from(&storage, "foo").await.expect("failed to load");

        assert_eq!(properties.get("woo"), Some("hoo"));
        assert_eq!(properties.get("yee"), Some("haw"));
        assert_eq!(properties.get("answer"), Some("42"));
        assert_eq!(properties.get("hi"), Some("there"));
    }

    #[test_log::test(tokio::test)]
    async fn save_writes_normalized_string() {
        let storage = MemoryStorage::default();
        let properties = parse(SAMPLE);

        properties.save_to(&storage, "foo").await.expect("failed to save");

        assert_eq!(
            *storage.writes.lock().expect("failed to lock writes"),
            vec![(PathBuf::from("foo"), NORMALIZED.to_string())]
        );
    }

    #[test_log::test(tokio::test)]
    async fn load_then_save_writes_normal_form() {
        let storage = MemoryStorage::with_file("server.properties", SAMPLE);

        let properties = load_from(&storage, "server.properties").await.expect("failed to load");
        properties.save_to(&storage, "server.properties").await.expect("failed to save");

        assert_eq!(
            storage.files.lock().expect("failed to lock files").get(Path::new("server.properties")),
            Some(&NORMALIZED.to_string())
        );
    }

    #[test_log::test(tokio::test)]
    async fn storage_errors_are_passed_through() {
        let read = load_from(&ReadOnlyStorage, "foo").await.expect_err("read should fail");
        assert_eq!(read.kind(), io::ErrorKind::PermissionDenied);
        assert_eq!(read.to_string(), "read denied");

        let write = Properties::new()
            .save_to(&ReadOnlyStorage, "foo")
            .await
            .expect_err("write should fail");
        assert_eq!(write.kind(), io::ErrorKind::Other);
        assert_eq!(write.to_string(), "disk full");
    }

    #[test_log::test(tokio::test)]
    async fn filesystem_round_trip() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("server.properties");
        tokio::fs::write(&path, SAMPLE).await.expect("failed to write file");

        let mut properties = load(&path).await.expect("failed to load");
        properties.set("answer", 43);
        properties.save(&path).await.expect("failed to save");

        let written = tokio::fs::read_to_string(&path).await.expect("failed to read file");
        assert_eq!(written, NORMALIZED.replace("answer=42", "answer=43"));
    }

    #[test_log::test(tokio::test)]
    async fn filesystem_missing_file_is_not_found() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");

        let err = load(dir.path().join("missing.properties")).await.expect_err("load should fail");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        let err = Properties::new()
            .save(dir.path().join("missing/server.properties"))
            .await
            .expect_err("save should fail");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
