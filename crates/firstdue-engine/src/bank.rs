//! The four question collections and the operations the controller runs on
//! them.
//!
//! Each collection arrives independently, possibly late, possibly never. A
//! collection that failed to load stays empty and remembers why, so that the
//! modes depending on it degrade to a no-op instead of taking the session down.

use rand::Rng;

use crate::{
    geometry::{self, LatLng},
    model::{Address, Block, Intersection, Zone},
};

/// Identifies one of the four collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum DatasetKind {
    #[display("zones")]
    Zones,
    #[display("intersections")]
    Intersections,
    #[display("blocks")]
    Blocks,
    #[display("addresses")]
    Addresses,
}

impl DatasetKind {
    pub const ALL: [Self; 4] = [
        Self::Zones,
        Self::Intersections,
        Self::Blocks,
        Self::Addresses,
    ];

    /// File name of the collection inside the data directory.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Zones => "zones.json",
            Self::Intersections => "intersections.json",
            Self::Blocks => "blocks.json",
            Self::Addresses => "addresses.json",
        }
    }
}

/// A loaded collection, as handed to [`QuestionBank::install`].
#[derive(Debug, Clone, derive_more::IsVariant)]
pub enum Dataset {
    Zones(Vec<Zone>),
    Intersections(Vec<Intersection>),
    Blocks(Vec<Block>),
    Addresses(Vec<Address>),
}

impl Dataset {
    #[must_use]
    pub fn kind(&self) -> DatasetKind {
        match self {
            Self::Zones(_) => DatasetKind::Zones,
            Self::Intersections(_) => DatasetKind::Intersections,
            Self::Blocks(_) => DatasetKind::Blocks,
            Self::Addresses(_) => DatasetKind::Addresses,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Zones(items) => items.len(),
            Self::Intersections(items) => items.len(),
            Self::Blocks(items) => items.len(),
            Self::Addresses(items) => items.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A collection that could not be delivered.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("could not load {kind}: {message}")]
pub struct LoadFailure {
    pub kind: DatasetKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, derive_more::Display, derive_more::Error)]
#[display("no {kind} available to ask")]
pub struct EmptyDatasetError {
    pub kind: DatasetKind,
}

/// Load state of one collection.
#[derive(Debug, Clone, PartialEq, Eq, Default, derive_more::IsVariant)]
pub enum DatasetStatus {
    #[default]
    Pending,
    Loaded(usize),
    Failed(String),
}

/// Uniformly random element of `items`.
pub fn pick_random<'a, T, R>(
    kind: DatasetKind,
    items: &'a [T],
    rng: &mut R,
) -> Result<&'a T, EmptyDatasetError>
where
    R: Rng + ?Sized,
{
    if items.is_empty() {
        return Err(EmptyDatasetError { kind });
    }
    Ok(&items[rng.random_range(0..items.len())])
}

/// Blocks that may be asked: those whose block number is positive.
#[must_use]
pub fn filter_valid_blocks(blocks: &[Block]) -> Vec<&Block> {
    blocks.iter().filter(|b| b.is_valid()).collect()
}

/// Every segment of `street`.
pub fn filter_by_street<'a, 's>(
    blocks: &'a [Block],
    street: &'s str,
) -> impl Iterator<Item = &'a Block> + use<'a, 's> {
    blocks.iter().filter(move |b| b.street == street)
}

/// Read-only store of everything the quiz can ask.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    zones: Vec<Zone>,
    intersections: Vec<Intersection>,
    blocks: Vec<Block>,
    addresses: Vec<Address>,
    status: [DatasetStatus; 4],
}

impl QuestionBank {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bank with every collection already loaded. Mostly useful in tests.
    #[must_use]
    pub fn with_datasets(datasets: impl IntoIterator<Item = Dataset>) -> Self {
        let mut bank = Self::new();
        for dataset in datasets {
            bank.install(dataset);
        }
        bank
    }

    /// Stores a delivered collection, replacing any previous one of that kind.
    pub fn install(&mut self, dataset: Dataset) {
        let kind = dataset.kind();
        let len = dataset.len();
        match dataset {
            Dataset::Zones(items) => self.zones = items,
            Dataset::Intersections(items) => self.intersections = items,
            Dataset::Blocks(items) => self.blocks = items,
            Dataset::Addresses(items) => self.addresses = items,
        }
        self.status[Self::slot(kind)] = DatasetStatus::Loaded(len);
    }

    /// Records that a collection will not arrive.
    pub fn mark_failed(&mut self, failure: LoadFailure) {
        self.status[Self::slot(failure.kind)] = DatasetStatus::Failed(failure.message);
    }

    #[must_use]
    pub fn status(&self, kind: DatasetKind) -> &DatasetStatus {
        &self.status[Self::slot(kind)]
    }

    /// Collections that failed to load, with their error message.
    pub fn failures(&self) -> impl Iterator<Item = (DatasetKind, &str)> + '_ {
        DatasetKind::ALL
            .into_iter()
            .filter_map(|kind| match self.status(kind) {
                DatasetStatus::Failed(message) => Some((kind, message.as_str())),
                _ => None,
            })
    }

    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    #[must_use]
    pub fn intersections(&self) -> &[Intersection] {
        &self.intersections
    }

    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    #[must_use]
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    /// Zone whose outline contains `p`, if any.
    #[must_use]
    pub fn zone_at(&self, p: LatLng) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.contains(p))
    }

    /// Segment of `street` carrying block number `block`.
    #[must_use]
    pub fn find_block(&self, street: &str, block: i64) -> Option<&Block> {
        filter_by_street(&self.blocks, street).find(|b| b.block == block)
    }

    /// Segment of `street` closest to `p`. This is how a click on the map
    /// turns into a block answer.
    #[must_use]
    pub fn nearest_on_street(&self, street: &str, p: LatLng) -> Option<&Block> {
        filter_by_street(&self.blocks, street)
            .map(|b| (b, geometry::path_proximity(p, &b.coordinates)))
            .filter(|(_, d)| d.is_finite())
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(b, _)| b)
    }

    fn slot(kind: DatasetKind) -> usize {
        match kind {
            DatasetKind::Zones => 0,
            DatasetKind::Intersections => 1,
            DatasetKind::Blocks => 2,
            DatasetKind::Addresses => 3,
        }
    }
}
