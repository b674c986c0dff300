#![no_main]

use arbitrary::Unstructured;
use libfuzzer_sys::fuzz_target;
use trapsweep::{FillRule, Polygon};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * a.abs().max(b.abs()).max(1.0)
}

fn check(mut u: Unstructured) -> arbitrary::Result<()> {
    let a = trapsweep::arbitrary::boxes(&mut u)?;
    let b = trapsweep::arbitrary::boxes(&mut u)?;
    let fill_rule = trapsweep::arbitrary::fill_rule(&mut u)?;

    // The box sweep, the rectilinear sweep and the general sweep agree.
    let boxes = trapsweep::tessellate_boxes(&a, fill_rule).unwrap();
    let polygon = Polygon::from_boxes(&a).unwrap();
    let rectilinear = trapsweep::tessellate_rectilinear_polygon(&polygon, fill_rule).unwrap();
    let general = trapsweep::tessellate_polygon(&polygon, fill_rule).unwrap();
    assert!(close(boxes.area(), rectilinear.area()));
    assert!(close(boxes.area(), general.area()));
    assert!(boxes.iter().all(|b| !b.is_empty()));

    // The intersection is no bigger than either side.
    if a.len() > 1 && b.len() > 1 {
        let both = trapsweep::intersect_boxes(&a, &b).unwrap();
        let a_area = trapsweep::tessellate_boxes(&a, FillRule::NonZero).unwrap().area();
        let b_area = trapsweep::tessellate_boxes(&b, FillRule::NonZero).unwrap().area();
        assert!(both.area() <= a_area.min(b_area) * (1.0 + 1e-9) + 1e-9);
    }
    Ok(())
}

fuzz_target!(|data: &[u8]| {
    let _ = check(Unstructured::new(data));
});
