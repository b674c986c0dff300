#![no_main]

use arbitrary::Unstructured;
use libfuzzer_sys::fuzz_target;
use trapsweep::FillRule;
use trapsweep_util::{check_partition, edge_bounds, inside, ref_edges, ref_trap, sample_points};

fn check(mut u: Unstructured) -> arbitrary::Result<()> {
    let polygon = trapsweep::arbitrary::polygon(&mut u)?;
    let fill_rule = trapsweep::arbitrary::fill_rule(&mut u)?;
    let out = trapsweep::tessellate_polygon(&polygon, fill_rule).unwrap();

    let edges = ref_edges(&polygon);
    let traps: Vec<_> = out.iter().map(ref_trap).collect();
    let samples = sample_points(edge_bounds(&edges), 32);
    if let Err(e) = check_partition(&edges, &traps, inside(fill_rule), &samples, 0.05) {
        panic!("{e}");
    }

    // Tessellating the output again doesn't change anything.
    let again = trapsweep::tessellate_traps(out.as_slice(), FillRule::NonZero).unwrap();
    assert!((again.area() - out.area()).abs() <= 1e-6 * out.area().max(1.0));
    Ok(())
}

fuzz_target!(|data: &[u8]| {
    let _ = check(Unstructured::new(data));
});
