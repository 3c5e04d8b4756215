use crate::pipeline::BoundingBox;

/// One raw prediction in original image pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub class_id: usize,
    pub confidence: f32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// Decode a YOLOv5 output matrix.
///
/// `rows` holds one prediction per `row_len` values laid out as
/// `[cx, cy, w, h, objectness, class_0, ..., class_n]` in model input pixels.
/// `scale_x`/`scale_y` map model input pixels back to the source image.
pub fn decode_yolov5(
    rows: &[f32],
    row_len: usize,
    scale_x: f32,
    scale_y: f32,
    score_floor: f32,
) -> Vec<Candidate> {
    if row_len <= 5 {
        return Vec::new();
    }

    rows.chunks_exact(row_len)
        .filter_map(|row| {
            let objectness = row[4];
            let (class_id, class_score) = row[5..]
                .iter()
                .copied()
                .enumerate()
                .max_by(|(_, a), (_, b)| a.total_cmp(b))?;

            let confidence = objectness * class_score;
            if confidence < score_floor {
                return None;
            }

            let (cx, cy, w, h) = (row[0], row[1], row[2], row[3]);
            Some(Candidate {
                class_id,
                confidence,
                x1: (cx - w / 2.0) * scale_x,
                y1: (cy - h / 2.0) * scale_y,
                x2: (cx + w / 2.0) * scale_x,
                y2: (cy + h / 2.0) * scale_y,
            })
        })
        .collect()
}

/// Greedy class-wise non-maximum suppression.
///
/// Takes `(box, class_id, score)` triples and returns the indices to keep,
/// ordered by descending score.
pub fn non_max_suppression(boxes: &[(BoundingBox, usize, f32)], iou_threshold: f32) -> Vec<usize> {
    let mut order: Vec<usize> = (0..boxes.len()).collect();
    order.sort_by(|&a, &b| boxes[b].2.total_cmp(&boxes[a].2));

    let mut kept: Vec<usize> = Vec::new();
    for idx in order {
        let (bbox, class_id, _) = &boxes[idx];
        let overlaps = kept.iter().any(|&k| {
            let (kept_box, kept_class, _) = &boxes[k];
            kept_class == class_id && kept_box.iou(bbox) > iou_threshold
        });
        if !overlaps {
            kept.push(idx);
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x: u32, y: u32, width: u32, height: u32) -> BoundingBox {
        BoundingBox { x, y, width, height }
    }

    #[test]
    fn decodes_best_class_and_scales_back() {
        // cx, cy, w, h, obj, class scores (3 classes)
        let rows = [
            320.0, 320.0, 64.0, 32.0, 0.9, 0.1, 0.8, 0.2, //
            10.0, 10.0, 4.0, 4.0, 0.05, 0.5, 0.1, 0.1,
        ];
        let candidates = decode_yolov5(&rows, 8, 0.5, 0.25, 0.1);
        assert_eq!(candidates.len(), 1);

        let c = candidates[0];
        assert_eq!(c.class_id, 1);
        assert!((c.confidence - 0.72).abs() < 1e-6);
        assert!((c.x1 - 144.0).abs() < 1e-4);
        assert!((c.x2 - 176.0).abs() < 1e-4);
        assert!((c.y1 - 76.0).abs() < 1e-4);
        assert!((c.y2 - 84.0).abs() < 1e-4);
    }

    #[test]
    fn suppresses_overlapping_boxes_of_same_class_only() {
        let boxes = [
            (bbox(0, 0, 100, 100), 0, 0.6),
            (bbox(5, 5, 100, 100), 0, 0.9),
            (bbox(5, 5, 100, 100), 1, 0.5),
            (bbox(300, 300, 20, 20), 0, 0.3),
        ];
        let kept = non_max_suppression(&boxes, 0.45);
        assert_eq!(kept, vec![1, 2, 3]);
    }

    #[test]
    fn iou_of_disjoint_boxes_is_zero() {
        assert_eq!(bbox(0, 0, 10, 10).iou(&bbox(20, 20, 10, 10)), 0.0);
        assert!((bbox(0, 0, 10, 10).iou(&bbox(0, 0, 10, 10)) - 1.0).abs() < 1e-6);
    }
}
