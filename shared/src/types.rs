//! Common types used across the platform

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Padding applied around the point set when a bounding-box polygon is derived
pub const BBOX_PADDING_DEGREES: f64 = 0.0001;

/// Centre of the placeholder polygon used when a field has no geometry and no points
pub const PLACEHOLDER_CENTER: (f64, f64) = (-15.7801, -47.9292);

/// GeoJSON-like polygon feature describing a field boundary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Polygon {
    #[serde(rename = "type")]
    pub feature_type: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    pub geometry: PolygonGeometry,
}

/// Polygon geometry; rings of `[longitude, latitude]` positions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolygonGeometry {
    #[serde(rename = "type")]
    pub geometry_type: String,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

impl Polygon {
    /// Build a feature from rings of `[lng, lat]` positions
    pub fn from_rings(rings: Vec<Vec<[f64; 2]>>) -> Self {
        Self {
            feature_type: "Feature".to_string(),
            properties: Map::new(),
            geometry: PolygonGeometry {
                geometry_type: "Polygon".to_string(),
                coordinates: rings,
            },
        }
    }

    /// Padded bounding box around `(latitude, longitude)` positions.
    ///
    /// Returns the placeholder polygon when there are no positions.
    pub fn bounding_box<I>(positions: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        for (lat, lng) in positions {
            if !lat.is_finite() || !lng.is_finite() {
                continue;
            }
            bounds = Some(match bounds {
                None => (lat, lat, lng, lng),
                Some((min_lat, max_lat, min_lng, max_lng)) => (
                    min_lat.min(lat),
                    max_lat.max(lat),
                    min_lng.min(lng),
                    max_lng.max(lng),
                ),
            });
        }

        match bounds {
            Some((min_lat, max_lat, min_lng, max_lng)) => Self::rectangle(
                min_lat - BBOX_PADDING_DEGREES,
                max_lat + BBOX_PADDING_DEGREES,
                min_lng - BBOX_PADDING_DEGREES,
                max_lng + BBOX_PADDING_DEGREES,
            ),
            None => Self::placeholder(),
        }
    }

    /// Fixed placeholder used when nothing is known about the field location
    pub fn placeholder() -> Self {
        let (lat, lng) = PLACEHOLDER_CENTER;
        let half = 0.001;
        Self::rectangle(lat - half, lat + half, lng - half, lng + half)
    }

    fn rectangle(min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64) -> Self {
        Self::from_rings(vec![vec![
            [min_lng, min_lat],
            [max_lng, min_lat],
            [max_lng, max_lat],
            [min_lng, max_lat],
            [min_lng, min_lat],
        ]])
    }

    /// Outer ring, if any
    pub fn outer_ring(&self) -> &[[f64; 2]] {
        self.geometry
            .coordinates
            .first()
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Pagination parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    /// Row offset for this page
    pub fn offset(&self) -> u32 {
        self.page.saturating_sub(1) * self.per_page
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

/// Paginated response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl PaginationMeta {
    pub fn new(pagination: &Pagination, total_items: u64) -> Self {
        let per_page = pagination.per_page.max(1) as u64;
        Self {
            page: pagination.page,
            per_page: pagination.per_page,
            total_items,
            total_pages: total_items.div_ceil(per_page) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_is_padded() {
        let polygon = Polygon::bounding_box(vec![(-12.0, -55.0), (-12.01, -55.02)]);
        let ring = polygon.outer_ring();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], [-55.02 - BBOX_PADDING_DEGREES, -12.01 - BBOX_PADDING_DEGREES]);
        assert_eq!(ring[2], [-55.0 + BBOX_PADDING_DEGREES, -12.0 + BBOX_PADDING_DEGREES]);
        assert_eq!(ring[0], ring[4]);
    }

    #[test]
    fn test_bounding_box_without_points_is_placeholder() {
        assert_eq!(Polygon::bounding_box(Vec::new()), Polygon::placeholder());
    }

    #[test]
    fn test_pagination_meta() {
        let meta = PaginationMeta::new(&Pagination { page: 2, per_page: 20 }, 41);
        assert_eq!(meta.total_pages, 3);
        assert_eq!(Pagination { page: 3, per_page: 20 }.offset(), 40);
    }
}
