use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use chrono::{DateTime, Utc};
use outreach_persistence_contracts::SubmissionLogRepository;
use outreach_utils::trace_instrument;
use tokio::{fs::OpenOptions, io::AsyncWriteExt, sync::Mutex};

/// Submission log stored as a plain text file with one line per entry:
///
/// ```text
/// 2024-05-01 13:37:00 | SUCCESS | From: Acme Corp
/// ```
#[derive(Debug, Clone)]
pub struct FileSubmissionLog {
    path: Arc<Path>,
    lock: Arc<Mutex<()>>,
}

impl FileSubmissionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into().into(),
            lock: Default::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SubmissionLogRepository for FileSubmissionLog {
    #[trace_instrument(skip(self))]
    async fn record(&self, organization: &str, timestamp: DateTime<Utc>) -> anyhow::Result<()> {
        let line = format!(
            "{} | SUCCESS | From: {organization}\n",
            timestamp.format("%Y-%m-%d %H:%M:%S")
        );

        let _guard = self.lock.lock().await;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open {}", self.path.display()))?;

        file.write_all(line.as_bytes())
            .await
            .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        file.flush().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("outreach-submissions-{}.log", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn record_appends_lines() {
        // Arrange
        let path = temp_path();
        let sut = FileSubmissionLog::new(&path);
        let first = DateTime::from_timestamp(1_714_570_620, 0).unwrap();
        let second = DateTime::from_timestamp(1_714_570_680, 0).unwrap();

        // Act
        sut.record("Acme Corp", first).await.unwrap();
        sut.record("Globex", second).await.unwrap();

        // Assert
        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(
            content,
            "2024-05-01 13:37:00 | SUCCESS | From: Acme Corp\n\
             2024-05-01 13:38:00 | SUCCESS | From: Globex\n"
        );

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_records_do_not_interleave() {
        let path = temp_path();
        let sut = FileSubmissionLog::new(&path);
        let now = Utc::now();

        let tasks = (0..20)
            .map(|i| {
                let sut = sut.clone();
                tokio::spawn(async move { sut.record(&format!("Org {i}"), now).await })
            })
            .collect::<Vec<_>>();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(content.lines().count(), 20);
        assert!(content.lines().all(|line| line.contains(" | SUCCESS | From: Org ")));

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn record_unwritable_path() {
        let sut = FileSubmissionLog::new(temp_path().join("missing-dir").join("contact.log"));

        let result = sut.record("Acme Corp", Utc::now()).await;

        assert!(result.is_err());
    }
}
