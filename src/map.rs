//! Renders candidate routes onto a standalone Leaflet map.

use serde::Serialize;
use std::path::Path;

use crate::entities::{Coordinates, Route};
use crate::error::{io_error, Error};

pub const PALETTE: [&str; 3] = ["blue", "green", "red"];

const ZOOM: u8 = 13;
const LINE_WEIGHT: f64 = 2.5;
const LEAFLET_VERSION: &str = "1.9.4";

pub fn color_for(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

#[derive(Serialize)]
struct Layer {
    color: &'static str,
    path: Vec<[f64; 2]>,
    start: Option<[f64; 2]>,
    label: String,
}

#[derive(Serialize)]
struct Scene {
    center: [f64; 2],
    bounds: [[f64; 2]; 2],
    zoom: u8,
    weight: f64,
    layers: Vec<Layer>,
}

fn lat_lng(c: Coordinates) -> [f64; 2] {
    [c.lat, c.lng]
}

fn scene(routes: &[Route], origin: Coordinates, destination: Coordinates) -> Scene {
    let layers = routes
        .iter()
        .enumerate()
        .map(|(idx, route)| Layer {
            color: color_for(idx),
            path: route.points().into_iter().map(lat_lng).collect(),
            start: route.start().map(lat_lng),
            label: format!(
                "Route {}: {:.2} km, {:.0} min",
                idx + 1,
                route.distance_km(),
                route.duration_minutes()
            ),
        })
        .collect();

    Scene {
        center: lat_lng(origin),
        bounds: [lat_lng(origin), lat_lng(destination)],
        zoom: ZOOM,
        weight: LINE_WEIGHT,
        layers,
    }
}

// serialization failures are local, not a bad response from a service
fn to_json<T: Serialize>(value: &T) -> Result<String, Error> {
    serde_json::to_string(value).map_err(io_error)
}

/// Produces a single HTML document drawing every route and a start marker per
/// route, centered on `origin`.
pub fn render(routes: &[Route], origin: Coordinates, destination: Coordinates) -> Result<String, Error> {
    let scene = to_json(&scene(routes, origin, destination))?;
    // keep "</script>" inside string data from closing the tag
    let scene = scene.replace("</", "<\\/");

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Routes</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@{version}/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@{version}/dist/leaflet.js"></script>
<style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
const scene = {scene};
const map = L.map("map").setView(scene.center, scene.zoom);
L.tileLayer("https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png", {{
  maxZoom: 19,
  attribution: "&copy; OpenStreetMap contributors"
}}).addTo(map);
for (const layer of scene.layers) {{
  L.polyline(layer.path, {{ color: layer.color, weight: scene.weight }}).bindTooltip(layer.label).addTo(map);
  if (layer.start) {{
    L.circleMarker(layer.start, {{ color: layer.color, fillColor: layer.color, fillOpacity: 0.9, radius: 8 }}).bindPopup(layer.label).addTo(map);
  }}
}}
map.fitBounds(scene.bounds, {{ padding: [24, 24] }});
</script>
</body>
</html>
"#,
        version = LEAFLET_VERSION,
        scene = scene,
    ))
}

#[tracing::instrument(skip(html))]
pub async fn save(path: &Path, html: &str) -> Result<(), Error> {
    tokio::fs::write(path, html).await?;
    tracing::info!("map saved as {}", path.display());

    Ok(())
}

#[cfg(test)]
fn sample_route(encoded: &str) -> Route {
    Route::from_polyline(encoded, 1.0, 1.0).unwrap()
}

#[test]
fn palette_cycles_every_three_routes() {
    let colors: Vec<_> = (0..4).map(color_for).collect();

    assert_eq!(colors, vec!["blue", "green", "red", "blue"]);
}

#[test]
fn render_assigns_one_color_and_marker_per_route() {
    let routes: Vec<Route> = (0..4).map(|_| sample_route("_p~iF~ps|U_ulLnnqC")).collect();
    let origin = Coordinates::new(38.5, -120.2);
    let destination = Coordinates::new(40.7, -120.95);

    let s = scene(&routes, origin, destination);
    let colors: Vec<_> = s.layers.iter().map(|l| l.color).collect();
    assert_eq!(colors, vec!["blue", "green", "red", "blue"]);
    assert!(s.layers.iter().all(|l| l.path.len() == 2));
    assert!(s.layers.iter().all(|l| l.start.is_some()));
    assert_eq!(s.center, [38.5, -120.2]);

    let html = render(&routes, origin, destination).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("leaflet@1.9.4"));
    assert!(html.contains(r#""color":"green""#));
    assert!(html.contains("Route 4: 1.00 km, 1 min"));
}

#[test]
fn render_skips_marker_for_empty_geometry() {
    use geo_types::LineString;

    let routes = vec![Route::new(LineString::new(vec![]), 0.0, 0.0).unwrap()];
    let here = Coordinates::new(0.0, 0.0);

    let s = scene(&routes, here, here);
    assert!(s.layers[0].start.is_none());
    assert!(render(&[], here, here).unwrap().contains(r#""layers":[]"#));
}

#[test]
fn save_writes_the_document() {
    use tokio_test::block_on;

    let path = std::env::temp_dir().join(format!("routes_map_{}.html", std::process::id()));
    block_on(save(&path, "<html></html>")).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html></html>");
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn scene_serialization_failure_is_a_local_error() {
    use std::collections::HashMap;

    // JSON object keys must be strings
    let mut bad: HashMap<(u8, u8), u8> = HashMap::new();
    bad.insert((1, 2), 3);

    let err = to_json(&bad).unwrap_err();
    assert_eq!(err.code, 5);
    assert!(err.message.starts_with("io error"));
}
