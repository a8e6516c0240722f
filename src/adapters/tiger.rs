use crate::core::BoundaryProvider;
use crate::domain::model::{BoundarySet, CoordinateSystem, CountyBoundary, Polygon, Ring};
use crate::utils::error::{MapError, Result};
use reqwest::Client;
use shapefile::dbase::{FieldValue, Record};
use shapefile::{PolygonRing, Shape};
use std::io::{BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

pub const DEFAULT_COUNTIES_URL: &str =
    "https://www2.census.gov/geo/tiger/TIGER2023/COUNTY/tl_2023_us_county.zip";
pub const DEFAULT_DOWNLOAD_FILE: &str = "temp_counties.zip";
pub const FLORIDA_STATE_FIPS: &str = "12";

const MIB: u64 = 1024 * 1024;

/// US Census TIGER/Line county shapefile, filtered to one state.
#[derive(Debug, Clone)]
pub struct TigerCountyProvider {
    client: Client,
    url: String,
    download_path: PathBuf,
    state_fips: &'static str,
}

impl TigerCountyProvider {
    pub fn new(
        url: impl Into<String>,
        download_path: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            download_path: download_path.into(),
            state_fips: FLORIDA_STATE_FIPS,
        })
    }

    /// Stream the archive to `download_path`. The returned guard deletes the file when dropped.
    async fn download(&self) -> Result<TempDownload> {
        tracing::info!("  Downloading US counties shapefile (this may take a moment)...");
        let mut response = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?;

        let total_size = response.content_length().unwrap_or(0);
        if let Some(parent) = self
            .download_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Declared before `file` so the file is closed before the guard removes it.
        let guard = TempDownload {
            path: self.download_path.clone(),
        };
        let mut file = tokio::fs::File::create(&self.download_path).await?;

        let mut downloaded: u64 = 0;
        let mut next_report = MIB;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            if downloaded >= next_report {
                next_report += MIB;
                if total_size > 0 {
                    tracing::info!(
                        "  Downloaded: {:.1} MB ({:.1}%)",
                        downloaded as f64 / MIB as f64,
                        downloaded as f64 / total_size as f64 * 100.0
                    );
                } else {
                    tracing::info!("  Downloaded: {:.1} MB", downloaded as f64 / MIB as f64);
                }
            }
        }
        file.flush().await?;

        tracing::debug!("Download complete: {} bytes", downloaded);
        Ok(guard)
    }
}

impl BoundaryProvider for TigerCountyProvider {
    async fn fetch_boundaries(&self) -> Result<BoundarySet> {
        let download = self.download().await?;

        tracing::info!("  Reading shapefile...");
        let archive_path = download.path.clone();
        let state_fips = self.state_fips;
        let boundaries = tokio::task::spawn_blocking(move || -> Result<BoundarySet> {
            let file = std::fs::File::open(&archive_path)?;
            read_counties(std::io::BufReader::new(file), state_fips)
        })
        .await
        .map_err(|e| MapError::boundary(format!("shapefile reader panicked: {}", e)))??;

        drop(download);
        tracing::debug!("Boundary CRS: {:?}", boundaries.crs);
        Ok(boundaries)
    }
}

/// Deletes the intermediate download on drop, whether or not the run succeeded.
struct TempDownload {
    path: PathBuf,
}

impl Drop for TempDownload {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("Removed {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Could not remove {}: {}", self.path.display(), e),
        }
    }
}

/// Read the counties of `state_fips` out of a zipped TIGER/Line county shapefile.
///
/// The nationwide `.shp` is large, so the members are unpacked to a scratch
/// directory and read from disk instead of memory.
pub fn read_counties<R: Read + Seek>(archive: R, state_fips: &str) -> Result<BoundarySet> {
    let mut archive = zip::ZipArchive::new(archive)?;

    let scratch = tempfile::tempdir()?;
    let shp_path = scratch.path().join("counties.shp");
    if !extract_entry(&mut archive, "shp", &shp_path)? {
        return Err(MapError::boundary("archive has no .shp file"));
    }
    if !extract_entry(&mut archive, "dbf", &shp_path.with_extension("dbf"))? {
        return Err(MapError::boundary("archive has no .dbf file"));
    }
    extract_entry(&mut archive, "shx", &shp_path.with_extension("shx"))?;

    let crs = match read_prj(&mut archive)? {
        Some(wkt) => check_crs(&wkt)?,
        None => {
            tracing::warn!("Archive has no .prj file, assuming WGS84 longitude/latitude");
            CoordinateSystem::AssumedWgs84
        }
    };

    let mut reader = shapefile::Reader::from_path(&shp_path)?;

    let mut counties = Vec::new();
    for item in reader.iter_shapes_and_records() {
        let (shape, record) = item?;
        if character_field(&record, "STATEFP").as_deref() != Some(state_fips) {
            continue;
        }

        let name = character_field(&record, "NAME").unwrap_or_default();
        let polygons = match shape {
            Shape::Polygon(polygon) => group_rings(polygon.rings().iter().map(|ring| {
                let points: Ring = ring.points().iter().map(|p| [p.x, p.y]).collect();
                (matches!(ring, PolygonRing::Outer(_)), points)
            })),
            other => {
                tracing::warn!("Skipping {}: unexpected shape type {:?}", name, other.shapetype());
                continue;
            }
        };

        counties.push(CountyBoundary {
            name_lsad: character_field(&record, "NAMELSAD"),
            geoid: character_field(&record, "GEOID").unwrap_or_default(),
            name,
            polygons,
        });
    }

    if counties.is_empty() {
        return Err(MapError::boundary(format!(
            "no counties found for STATEFP={}",
            state_fips
        )));
    }

    counties.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(BoundarySet::with_crs(crs, counties))
}

fn entry_name<R: Read + Seek>(archive: &zip::ZipArchive<R>, extension: &str) -> Option<String> {
    let suffix = format!(".{}", extension);
    archive
        .file_names()
        .find(|name| name.to_ascii_lowercase().ends_with(&suffix))
        .map(str::to_string)
}

/// Copy the first member ending in `.extension` to `dest`. `false` when there is none.
fn extract_entry<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
    extension: &str,
    dest: &Path,
) -> Result<bool> {
    let Some(name) = entry_name(archive, extension) else {
        return Ok(false);
    };

    let mut entry = archive.by_name(&name)?;
    let mut out = BufWriter::new(std::fs::File::create(dest)?);
    let copied = std::io::copy(&mut entry, &mut out)?;
    out.flush()?;

    tracing::debug!("Extracted {} ({} bytes)", name, copied);
    Ok(true)
}

fn read_prj<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> Result<Option<String>> {
    let Some(name) = entry_name(archive, "prj") else {
        return Ok(None);
    };

    let mut raw = Vec::new();
    archive.by_name(&name)?.read_to_end(&mut raw)?;
    Ok(Some(String::from_utf8_lossy(&raw).into_owned()))
}

fn character_field(record: &Record, field: &str) -> Option<String> {
    match record.get(field) {
        Some(FieldValue::Character(Some(value))) => {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        }
        _ => None,
    }
}

/// Accept geographic WGS84 and NAD83 (within ~2 m of WGS84 at map scale); reject anything projected.
pub fn check_crs(wkt: &str) -> Result<CoordinateSystem> {
    let wkt = wkt.trim_start();
    let upper = wkt.to_ascii_uppercase();

    if upper.starts_with("PROJCS") || upper.starts_with("PROJCRS") {
        return Err(MapError::boundary(
            "projected coordinate systems are not supported, expected longitude/latitude",
        ));
    }
    if !(upper.starts_with("GEOGCS") || upper.starts_with("GEOGCRS")) {
        return Err(MapError::boundary(format!(
            "unrecognized coordinate system definition: {}",
            wkt.chars().take(40).collect::<String>()
        )));
    }

    const KNOWN_DATUMS: &[&str] = &["WGS_1984", "WGS84", "WGS 84", "NORTH_AMERICAN_1983", "NAD83"];
    if KNOWN_DATUMS.iter().any(|datum| upper.contains(datum)) {
        Ok(CoordinateSystem::Wgs84)
    } else {
        Err(MapError::boundary(
            "unsupported geographic datum, expected WGS84 or NAD83",
        ))
    }
}

/// Build polygons from rings in file order: each outer ring starts a polygon,
/// inner rings become holes of the polygon before them.
pub fn group_rings<I>(rings: I) -> Vec<Polygon>
where
    I: IntoIterator<Item = (bool, Ring)>,
{
    let mut polygons: Vec<Polygon> = Vec::new();
    for (is_outer, ring) in rings {
        if is_outer {
            polygons.push(vec![ring]);
        } else if let Some(current) = polygons.last_mut() {
            current.push(ring);
        } else {
            tracing::warn!("Dropping hole that precedes any outer ring");
        }
    }
    polygons
}
