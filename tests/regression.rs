use kurbo::BezPath;
use libtest_mimic::{Arguments, Failed, Trial};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use trapsweep::{Boxes, FillRule, FixedBox, Polygon, Traps};
use trapsweep_util::{
    box_trap, check_partition, edge_bounds, inside, ref_edges, ref_trap, sample_points, RefTrap,
};

mod common;

#[derive(Serialize, Deserialize, Debug)]
enum Operation {
    Polygon,
    Rectilinear,
    RectilinearBoxes,
    Boxes,
    Intersect,
    Retessellate,
    RetessellateRectilinear,
}

#[derive(Serialize, Deserialize, Debug)]
struct RegressionCaseDeclaration {
    /// An svg path, for the polygon operations.
    #[serde(default)]
    path: Option<String>,
    /// Boxes as `[x0, y0, x1, y1]`, for the box operations.
    #[serde(default)]
    boxes: Vec<[f64; 4]>,
    /// The second set of boxes, for intersection.
    #[serde(default)]
    other: Vec<[f64; 4]>,
    fill_rule: FillRule,
    op: Operation,
    #[serde(default)]
    area: Option<f64>,
    #[serde(default)]
    count: Option<usize>,
    /// The exact output, for operations producing boxes.
    #[serde(default)]
    expect_boxes: Option<Vec<FixedBox>>,
}

enum Output {
    Traps(Traps),
    Boxes(Boxes),
}

fn main() {
    let args = Arguments::from_args();
    let tests = regression_tests();

    libtest_mimic::run(&args, tests).exit();
}

fn regression_tests() -> Vec<Trial> {
    let ws = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let file_paths = glob::glob(&format!("{ws}/tests/regression/**/*.yml")).unwrap();

    file_paths
        .into_iter()
        .map(|p| {
            let p = p.unwrap();
            let name = input_path_base(&p).display().to_string();
            Trial::test(name, || generate_regression_test(p))
        })
        .collect()
}

fn input_path_base(input_path: &Path) -> &Path {
    let ws = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let base = format!("{ws}/tests/regression");
    input_path.strip_prefix(base).unwrap()
}

fn to_boxes(raw: &[[f64; 4]]) -> Result<Vec<FixedBox>, Failed> {
    raw.iter()
        .map(|&[x0, y0, x1, y1]| {
            FixedBox::from_rect(kurbo::Rect::new(x0, y0, x1, y1)).map_err(Failed::from)
        })
        .collect()
}

fn generate_regression_test(path: PathBuf) -> Result<(), Failed> {
    let input = std::fs::read_to_string(&path)?;
    let case: RegressionCaseDeclaration = serde_yaml::from_str(&input)?;

    let boxes = to_boxes(&case.boxes)?;
    let polygon = match &case.path {
        Some(svg) => {
            let bez = BezPath::from_svg(svg)?;
            let mut polygon = Polygon::new();
            polygon.add_path(&bez, 0.1)?;
            polygon
        }
        None => Polygon::from_boxes(&boxes)?,
    };
    let fill_rule = case.fill_rule;

    let output = match case.op {
        Operation::Polygon => Output::Traps(trapsweep::tessellate_polygon(&polygon, fill_rule)?),
        Operation::Rectilinear => Output::Traps(trapsweep::tessellate_rectilinear_polygon(
            &polygon, fill_rule,
        )?),
        Operation::RectilinearBoxes => Output::Boxes(
            trapsweep::tessellate_rectilinear_polygon_to_boxes(&polygon, fill_rule)?,
        ),
        Operation::Boxes => Output::Boxes(trapsweep::tessellate_boxes(&boxes, fill_rule)?),
        Operation::Intersect => {
            let other = to_boxes(&case.other)?;
            Output::Boxes(trapsweep::intersect_boxes(&boxes, &other)?)
        }
        Operation::Retessellate => {
            let once = trapsweep::tessellate_polygon(&polygon, FillRule::NonZero)?;
            Output::Traps(trapsweep::tessellate_traps(once.as_slice(), fill_rule)?)
        }
        Operation::RetessellateRectilinear => {
            let once = trapsweep::tessellate_polygon(&polygon, FillRule::NonZero)?;
            Output::Traps(trapsweep::tessellate_rectilinear_traps(
                once.as_slice(),
                fill_rule,
            )?)
        }
    };

    let (area, count, traps): (f64, usize, Vec<RefTrap>) = match &output {
        Output::Traps(t) => (t.area(), t.len(), t.iter().map(ref_trap).collect()),
        Output::Boxes(b) => (b.area(), b.len(), b.iter().map(box_trap).collect()),
    };

    if let Some(expected) = case.area {
        if !common::close(area, expected) {
            return Err(format!("expected area {expected}, got {area}").into());
        }
    }
    if let Some(expected) = case.count {
        if count != expected {
            return Err(format!("expected {expected} pieces, got {count}").into());
        }
    }
    if let (Some(expected), Output::Boxes(b)) = (&case.expect_boxes, &output) {
        if expected.as_slice() != b.as_slice() {
            return Err(format!("expected boxes {expected:?}, got {:?}", b.as_slice()).into());
        }
    }

    // Intersection has two winding numbers, which the reference check
    // doesn't know about.
    let reference_rule = match case.op {
        Operation::Intersect => return Ok(()),
        // The first pass already applied the non-zero rule.
        Operation::Retessellate | Operation::RetessellateRectilinear => FillRule::NonZero,
        _ => fill_rule,
    };
    let edges = ref_edges(&polygon);
    let samples = sample_points(edge_bounds(&edges), 64);
    check_partition(&edges, &traps, inside(reference_rule), &samples, 0.05)?;
    Ok(())
}
