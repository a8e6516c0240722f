/// Free-text street address, passed to the geocoder as-is.
pub type Address = String;

/// WGS84 latitude/longitude pair. Only constructible with finite, in-range values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    pub address: Address,
}

impl Branch {
    pub fn new(name: impl Into<String>, address: impl Into<Address>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    pub fn locate(self, coordinates: Coordinates) -> LocatedBranch {
        LocatedBranch {
            name: self.name,
            address: self.address,
            coordinates,
        }
    }
}

/// A branch enriched with the coordinates its address resolved to.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedBranch {
    pub name: String,
    pub address: Address,
    pub coordinates: Coordinates,
}

impl LocatedBranch {
    pub fn latitude(&self) -> f64 {
        self.coordinates.latitude()
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates.longitude()
    }
}

/// A branch that was dropped from the map, with the reason it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedBranch {
    pub branch: Branch,
    pub reason: String,
}

/// A closed ring of `[longitude, latitude]` positions.
pub type Ring = Vec<[f64; 2]>;

/// One polygon: the outer ring first, then any holes.
pub type Polygon = Vec<Ring>;

#[derive(Debug, Clone, PartialEq)]
pub struct CountyBoundary {
    pub name: String,
    pub name_lsad: Option<String>,
    pub geoid: String,
    pub polygons: Vec<Polygon>,
}

impl CountyBoundary {
    fn positions(&self) -> impl Iterator<Item = &[f64; 2]> {
        self.polygons.iter().flatten().flatten()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSystem {
    /// WGS84 or a geographic datum treated as equivalent to it (NAD83).
    Wgs84,
    /// No CRS definition shipped with the data; positions are read as WGS84 longitude/latitude.
    AssumedWgs84,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Bounds {
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundarySet {
    pub crs: CoordinateSystem,
    pub counties: Vec<CountyBoundary>,
}

impl BoundarySet {
    /// Counties whose positions are known to be WGS84 longitude/latitude.
    pub fn new(counties: Vec<CountyBoundary>) -> Self {
        Self::with_crs(CoordinateSystem::Wgs84, counties)
    }

    pub fn with_crs(crs: CoordinateSystem, counties: Vec<CountyBoundary>) -> Self {
        Self { crs, counties }
    }

    pub fn len(&self) -> usize {
        self.counties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counties.is_empty()
    }

    /// Total bounds over every position in the set, `None` when it has no positions.
    pub fn bounds(&self) -> Option<Bounds> {
        self.counties
            .iter()
            .flat_map(CountyBoundary::positions)
            .fold(None, |acc: Option<Bounds>, &[lon, lat]| {
                Some(match acc {
                    None => Bounds {
                        min_lon: lon,
                        min_lat: lat,
                        max_lon: lon,
                        max_lat: lat,
                    },
                    Some(b) => Bounds {
                        min_lon: b.min_lon.min(lon),
                        min_lat: b.min_lat.min(lat),
                        max_lon: b.max_lon.max(lon),
                        max_lat: b.max_lat.max(lat),
                    },
                })
            })
    }
}

/// Boundaries and the branch list, before geocoding.
#[derive(Debug, Clone)]
pub struct SourceData {
    pub boundaries: BoundarySet,
    pub branches: Vec<Branch>,
}

/// Everything the renderer needs, after geocoding.
#[derive(Debug, Clone)]
pub struct OverlayData {
    pub boundaries: BoundarySet,
    pub located: Vec<LocatedBranch>,
    pub failed: Vec<FailedBranch>,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output_path: String,
    pub county_count: usize,
    pub branch_count: usize,
    pub failed: Vec<FailedBranch>,
}
