//! Save file writer.

use std::path::Path;

use bms_model::Building;
use tokio::fs;
use tracing::info;

/// Writes buildings in the save-file format
pub struct SaveFileWriter;

impl SaveFileWriter {
    /// Encode buildings as save-file text, one building block after another
    pub fn encode(buildings: &[Building]) -> String {
        buildings
            .iter()
            .map(|building| format!("{}\n", building.encode()))
            .collect()
    }

    /// Write buildings to `path`, replacing any existing file
    pub async fn save(path: impl AsRef<Path>, buildings: &[Building]) -> std::io::Result<()> {
        let path = path.as_ref();
        fs::write(path, Self::encode(buildings)).await?;
        info!("Saved {} buildings to: {}", buildings.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::savefile::SaveFileLoader;
    use tempfile::TempDir;

    const SAVE: &str = "\
Hawken
2
1:20:15:2:101,102
101:STUDY:12.5:2:RuleBased
TemperatureSensor:21,24,30
OccupancySensor:3,5:2:10
102:LABORATORY:30:1:WeightingBased
CarbonDioxideSensor:690,740:5:700:150@100
2:20:10:0
Gordon Greenwood
0
";

    #[test]
    fn test_encode_reproduces_canonical_text() {
        let buildings = SaveFileLoader::parse(SAVE).unwrap();
        assert_eq!(SaveFileWriter::encode(&buildings), SAVE);
    }

    #[test]
    fn test_encode_nothing() {
        assert_eq!(SaveFileWriter::encode(&[]), "");
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("saved.txt");
        let buildings = SaveFileLoader::parse(SAVE).unwrap();

        SaveFileWriter::save(&path, &buildings).await.unwrap();
        let reloaded = SaveFileLoader::load(&path).await.unwrap();
        assert_eq!(buildings, reloaded);
    }

    #[tokio::test]
    async fn test_save_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope").join("saved.txt");
        let err = SaveFileWriter::save(&path, &[]).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
