use redglove_types::{
    geometry::Point,
    tracking::{Detection, DetectionResult, TrackState},
};

use crate::segment::Segmentation;

/// Turn raw accumulators into a detection and record where the target was seen.
///
/// This is the only place `last_centroid` is written: it is set on a hit and
/// cleared on a miss, which sends the next frame back to a full scan.
pub fn resolve_target(seg: &Segmentation, state: &mut TrackState) -> Detection {
    let count = seg.count;
    let Some(bbox) = seg.bbox.filter(|_| count > 0) else {
        state.last_centroid = None;
        return None;
    };

    let centroid = Point::new((seg.x_sum / count) as u32, (seg.y_sum / count) as u32);
    let mean = (
        seg.x_sum as f64 / count as f64,
        seg.y_sum as f64 / count as f64,
    );

    state.last_centroid = Some(centroid);
    state.last_box = Some(bbox);

    Some(DetectionResult {
        centroid,
        mean,
        bbox,
        pixel_count: count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use redglove_types::geometry::BoundingBox;

    #[test]
    fn miss_clears_last_centroid() {
        let mut state = TrackState {
            last_centroid: Some(Point::new(10, 10)),
            ..TrackState::default()
        };
        assert!(resolve_target(&Segmentation::default(), &mut state).is_none());
        assert_eq!(state.last_centroid, None);
    }

    #[test]
    fn hit_uses_integer_division() {
        let bbox = BoundingBox {
            top: 1,
            bottom: 2,
            left: 1,
            right: 2,
        };
        let seg = Segmentation {
            x_sum: 6,
            y_sum: 7,
            count: 4,
            bbox: Some(bbox),
        };
        let mut state = TrackState::default();
        let found = resolve_target(&seg, &mut state).expect("target found");
        assert_eq!(found.centroid, Point::new(1, 1));
        assert_eq!(found.mean, (1.5, 1.75));
        assert_eq!(found.bbox, bbox);
        assert_eq!(found.pixel_count, 4);
        assert_eq!(state.last_centroid, Some(Point::new(1, 1)));
        assert_eq!(state.last_box, Some(bbox));
    }
}
