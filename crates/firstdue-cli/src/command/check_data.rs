use std::path::PathBuf;

use firstdue_engine::{Dataset, DatasetKind, filter_valid_blocks};

use crate::data;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CheckDataArg {
    /// Directory holding the dataset files
    #[clap(long, default_value = "./data")]
    data_dir: PathBuf,
}

impl Default for CheckDataArg {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}

fn describe(dataset: &Dataset) -> String {
    match dataset {
        Dataset::Blocks(blocks) => format!(
            "{} segments, {} usable",
            blocks.len(),
            filter_valid_blocks(blocks).len()
        ),
        dataset => format!("{} records", dataset.len()),
    }
}

pub(crate) fn run(arg: &CheckDataArg) -> anyhow::Result<()> {
    let mut loaded = 0;
    for kind in DatasetKind::ALL {
        match data::load_dataset(&arg.data_dir, kind) {
            Ok(dataset) => {
                loaded += 1;
                println!("{kind}: {}", describe(&dataset));
            }
            Err(err) => println!("{kind}: {err}"),
        }
    }
    if loaded == 0 {
        anyhow::bail!("no dataset could be loaded from {}", arg.data_dir.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use firstdue_engine::Block;

    use super::*;

    #[test]
    fn test_describe_counts_usable_blocks() {
        let blocks = vec![
            Block {
                street: "Main St".to_owned(),
                block: 100,
                coordinates: vec![[49.28, -122.80].into(), [49.28, -122.799].into()],
            },
            Block {
                street: "Main St".to_owned(),
                block: 0,
                coordinates: vec![[49.281, -122.80].into(), [49.281, -122.799].into()],
            },
        ];
        assert_eq!(describe(&Dataset::Blocks(blocks)), "2 segments, 1 usable");
        assert_eq!(describe(&Dataset::Addresses(vec![])), "0 records");
    }
}
