use super::series::{ProbabilitySeries, SeriesError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

pub const ELECTORAL_VOTES_FILE: &str = "evs.json";
pub const PROBABILITIES_FILE: &str = "probabilities.json";

/// Parsed inputs for one forecast: the dated series and the vote table.
#[derive(Debug, Clone, Default)]
pub struct ForecastData {
    pub series: ProbabilitySeries,
    pub electoral_votes: BTreeMap<String, u32>,
}

impl ForecastData {
    pub fn from_json_slices(
        electoral_votes: &[u8],
        probabilities: &[u8],
    ) -> Result<Self, LoadError> {
        let electoral_votes = serde_json::from_slice(electoral_votes)
            .map_err(|source| LoadError::ElectoralVotes { source })?;
        let series = ProbabilitySeries::from_json_slice(probabilities)?;
        Ok(Self {
            series,
            electoral_votes,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid electoral vote table: {source}")]
    ElectoralVotes {
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Series(#[from] SeriesError),
}

/// External collaborator that supplies forecast inputs.
#[allow(async_fn_in_trait)]
pub trait ForecastSource {
    async fn load(&self) -> Result<ForecastData, LoadError>;
}

/// Reads `evs.json` and `probabilities.json` from a directory.
#[derive(Debug, Clone)]
pub struct JsonDirectorySource {
    dir: PathBuf,
}

impl JsonDirectorySource {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read(&self, file: &str) -> Result<Vec<u8>, LoadError> {
        let path = self.dir.join(file);
        tokio::fs::read(&path).await.map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

impl ForecastSource for JsonDirectorySource {
    async fn load(&self) -> Result<ForecastData, LoadError> {
        let electoral_votes = self.read(ELECTORAL_VOTES_FILE).await?;
        let probabilities = self.read(PROBABILITIES_FILE).await?;
        let data = ForecastData::from_json_slices(&electoral_votes, &probabilities)?;
        info!(
            dir = %self.dir.display(),
            snapshots = data.series.len(),
            states = data.electoral_votes.len(),
            "loaded forecast data"
        );
        Ok(data)
    }
}

/// Already-parsed data, mostly for tests and embedding.
impl ForecastSource for ForecastData {
    async fn load(&self) -> Result<ForecastData, LoadError> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn scratch_dir() -> PathBuf {
        static SEQUENCE: AtomicU32 = AtomicU32::new(0);
        let dir = std::env::temp_dir().join(format!(
            "forecast-loader-{}-{}",
            std::process::id(),
            SEQUENCE.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    #[tokio::test]
    async fn loads_both_documents_from_directory() {
        let dir = scratch_dir();
        std::fs::write(dir.join(ELECTORAL_VOTES_FILE), r#"{ "Nevada": 6, "Ohio": 17 }"#)
            .expect("write evs");
        std::fs::write(
            dir.join(PROBABILITIES_FILE),
            r#"{ "20241105": { "PopularVote": 60, "ElectoralCollege": 55, "States": { "Nevada": 51 } } }"#,
        )
        .expect("write probabilities");

        let data = JsonDirectorySource::new(&dir)
            .load()
            .await
            .expect("directory loads");
        assert_eq!(data.electoral_votes.get("Ohio"), Some(&17));
        assert_eq!(data.series.len(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn missing_files_surface_the_path() {
        let dir = scratch_dir();
        match JsonDirectorySource::new(&dir).load().await {
            Err(LoadError::Io { path, .. }) => assert!(path.ends_with(ELECTORAL_VOTES_FILE)),
            other => panic!("expected io error, got {other:?}"),
        }
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn rejects_negative_vote_counts() {
        let result = ForecastData::from_json_slices(br#"{ "Nevada": -6 }"#, b"{}");
        assert!(matches!(result, Err(LoadError::ElectoralVotes { .. })));
    }
}
