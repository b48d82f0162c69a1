// CSV catalog loader.
//
// Reads the `movieId,title,genres` layout used by the MovieLens exports.
// Genre splitting on `|` is done by `Item::new`, not here.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use super::{Catalog, Item, ItemId};

#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(rename = "movieId", alias = "id")]
    id: ItemId,
    title: String,
    #[serde(default)]
    genres: String,
}

/// Load the catalog from a CSV file on disk.
pub fn load_csv(path: &Path) -> Result<Catalog> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open catalog at {}", path.display()))?;
    let catalog = from_reader(file)
        .with_context(|| format!("Failed to parse catalog at {}", path.display()))?;

    info!(
        items = catalog.len(),
        path = %path.display(),
        "Loaded item catalog"
    );
    Ok(catalog)
}

/// Parse a catalog from any CSV source with a header row.
pub fn from_reader<R: Read>(reader: R) -> Result<Catalog> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut items = Vec::new();
    for (line, row) in csv_reader.deserialize::<CatalogRow>().enumerate() {
        // +2: one for the header, one for 1-based line numbers
        let row = row.with_context(|| format!("Malformed catalog row at line {}", line + 2))?;
        items.push(Item::new(row.id, row.title, &row.genres));
    }

    Ok(Catalog::new(items)?)
}
