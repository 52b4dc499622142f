use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("a polygon needs at least 3 vertices, got {0}")]
    DegeneratePolygon(usize),
    #[error("radius must be finite and positive, got {0}")]
    InvalidRadius(f64),
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("leaf `{path}` has neither a weight nor children")]
    MissingWeight { path: String },
    #[error("leaf `{path}` has an invalid weight {weight}")]
    InvalidWeight { path: String, weight: f64 },
}

#[derive(Debug, Error, PartialEq)]
pub enum PartitionError {
    #[error("boundary polygon is degenerate")]
    DegenerateBoundary,
    #[error("hierarchy has no weight to distribute")]
    EmptyTree,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Partition(#[from] PartitionError),
    #[error("export failed: {0}")]
    Export(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
