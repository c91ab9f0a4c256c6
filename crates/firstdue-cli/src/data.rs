use std::{
    fs::File,
    io::{self, BufReader},
    path::{Path, PathBuf},
    sync::mpsc::{self, Receiver},
    thread,
};

use firstdue_engine::{Dataset, DatasetKind, LoadFailure};
use serde::de::DeserializeOwned;

pub type LoadResult = Result<Dataset, LoadFailure>;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum LoadError {
    #[display("failed to open {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

fn read_collection<T>(path: &Path) -> Result<Vec<T>, LoadError>
where
    T: DeserializeOwned,
{
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| LoadError::Json {
        path: path.to_owned(),
        source,
    })
}

/// Reads one collection from `data_dir`.
pub fn load_dataset(data_dir: &Path, kind: DatasetKind) -> Result<Dataset, LoadError> {
    let path = data_dir.join(kind.file_name());
    let dataset = match kind {
        DatasetKind::Zones => Dataset::Zones(read_collection(&path)?),
        DatasetKind::Intersections => Dataset::Intersections(read_collection(&path)?),
        DatasetKind::Blocks => Dataset::Blocks(read_collection(&path)?),
        DatasetKind::Addresses => Dataset::Addresses(read_collection(&path)?),
    };
    Ok(dataset)
}

/// Reads one collection, turning any error into the failure the controller
/// records.
pub fn load(data_dir: &Path, kind: DatasetKind) -> LoadResult {
    load_dataset(data_dir, kind).map_err(|err| LoadFailure {
        kind,
        message: err.to_string(),
    })
}

/// Loads every collection on a background thread.
///
/// Results arrive on the returned channel one collection at a time, in no
/// particular order. The channel closes once all four are delivered.
pub fn spawn_loader(data_dir: PathBuf) -> io::Result<Receiver<LoadResult>> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("dataset-loader".to_owned())
        .spawn(move || {
            for kind in DatasetKind::ALL {
                let result = load(&data_dir, kind);
                if tx.send(result).is_err() {
                    tracing::debug!(%kind, "loader stopped, receiver is gone");
                    break;
                }
            }
        })?;
    Ok(rx)
}
