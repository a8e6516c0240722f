// Adapters layer: concrete implementations of the domain ports (http, shapefile, html, fs, timer).

pub mod clock;
pub mod leaflet;
pub mod nominatim;
pub mod storage;
pub mod tiger;
