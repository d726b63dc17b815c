//! Known geographic/UTM pairs through the public transformer.

use dged_common::CrsCode;
use projection::Transformer;
use test_utils::{assert_coords_approx_eq, utm_points};

#[test]
fn test_forward_reference_points() {
    for point in utm_points::ALL {
        let utm = CrsCode::from_epsg(point.epsg).unwrap();
        let t = Transformer::new(CrsCode::WGS84, utm);
        let projected = t.transform(point.lon, point.lat).unwrap();
        assert_coords_approx_eq!(projected, (point.easting, point.northing), 1e-3);
    }
}

#[test]
fn test_inverse_reference_points() {
    for point in utm_points::ALL {
        let utm = CrsCode::from_epsg(point.epsg).unwrap();
        let t = Transformer::new(utm, CrsCode::WGS84);
        let geographic = t.transform(point.easting, point.northing).unwrap();
        // 1 mm on the ground is about 1e-8 degrees
        assert_coords_approx_eq!(geographic, (point.lon, point.lat), 1e-7);
    }
}

#[test]
fn test_round_trip_is_sub_millimeter() {
    let to_utm = Transformer::new(CrsCode::WGS84, CrsCode::from_epsg(32632).unwrap());
    let to_geo = Transformer::new(CrsCode::from_epsg(32632).unwrap(), CrsCode::WGS84);

    let mut lat = -80.0;
    while lat <= 84.0 {
        for lon in [6.0, 7.5, 9.0, 10.25, 12.0] {
            let (e, n) = to_utm.transform(lon, lat).unwrap();
            let back = to_geo.transform(e, n).unwrap();
            let again = to_utm.transform(back.0, back.1).unwrap();
            assert_coords_approx_eq!(again, (e, n), 1e-3);
        }
        lat += 8.0;
    }
}

#[test]
fn test_etrs89_and_wgs84_coincide() {
    let from_wgs84 = Transformer::new(CrsCode::WGS84, CrsCode::from_epsg(32632).unwrap());
    let from_etrs89 = Transformer::new(CrsCode::from_epsg(4258).unwrap(), CrsCode::from_epsg(25832).unwrap());
    let a = from_wgs84.transform(12.0, 55.0).unwrap();
    let b = from_etrs89.transform(12.0, 55.0).unwrap();
    assert_coords_approx_eq!(a, b, 1.0);
}
