// End-to-end tests over small synthetic territories:
//   preparation, seams, recursive bisection, diagnostics, GeoJSON.

use districtor::{
    assemble_atoms, find_split, prepare_groups, read_blocks_geojson, split_into_districts,
    write_districts_geojson, AtomId, BlockId, BreakingMethod, CensusBlock, District, DumpDir,
    GroupId, NoDiagnostics, Registry, SplitConfig, SplitError, SplitOutcome,
};
use geo::{MultiPolygon, Rect};
use geograph::Alignment;

fn square(x: f64, y: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![Rect::new((x, y), (x + 1.0, y + 1.0)).to_polygon()])
}

/// `w` by `h` unit blocks, row-major from the south-west corner.
fn grid_blocks(w: usize, h: usize, population: u64, county: impl Fn(usize, usize) -> String) -> Vec<CensusBlock> {
    (0..h)
        .flat_map(|y| (0..w).map(move |x| (x, y)))
        .enumerate()
        .map(|(i, (x, y))| {
            let id = BlockId::new(county(x, y), "000100", format!("{:04}", 1000 + i));
            CensusBlock::new(id, population, square(x as f64, y as f64))
        })
        .collect()
}

fn one_county(_: usize, _: usize) -> String { "001".into() }

fn prepared(blocks: Vec<CensusBlock>) -> (Registry, Vec<GroupId>) {
    let mut registry = Registry::new();
    let groups = prepare_groups(&mut registry, blocks, &NoDiagnostics).unwrap();
    (registry, groups)
}

fn atoms_of(registry: &Registry, district: &District) -> Vec<AtomId> {
    let mut atoms = district.groups().iter()
        .flat_map(|&id| registry.group(id).members().to_vec())
        .collect::<Vec<_>>();
    atoms.sort();
    atoms
}

#[test]
fn square_of_four_blocks_is_one_group() {
    let (registry, groups) = prepared(grid_blocks(2, 2, 10, one_county));
    assert_eq!(registry.atom_count(), 4);
    assert_eq!(groups.len(), 1);
    assert_eq!(registry.group(groups[0]).members().len(), 4);
    for i in 0..4 {
        assert_eq!(registry.atom(AtomId(i)).node().neighbors().len(), 2);
    }
}

#[test]
fn neighbor_edges_are_symmetric() {
    let (registry, groups) = prepared(grid_blocks(4, 3, 5, |x, _| if x < 2 { "001".into() } else { "003".into() }));
    assert_eq!(groups.len(), 2);
    registry.validate_groups(&groups).unwrap();
    for i in 0..registry.atom_count() as u32 {
        for &n in registry.atom(AtomId(i)).node().neighbors().all() {
            assert!(registry.atom(n).node().neighbors().contains(AtomId(i)));
        }
    }
}

#[test]
fn strip_seams() {
    let (registry, groups) = prepared(grid_blocks(6, 1, 10, one_county));
    let group = groups[0];
    assert_eq!(find_split(&registry, group, Alignment::NorthSouth, &NoDiagnostics).unwrap(), SplitOutcome::NoSplit);

    let SplitOutcome::Split { a, b } = find_split(&registry, group, Alignment::WestEast, &NoDiagnostics).unwrap()
    else { panic!("a strip splits west-east") };
    assert_eq!(a, (0..3).map(AtomId).collect::<Vec<_>>());
    assert_eq!(b, (3..6).map(AtomId).collect::<Vec<_>>());
    let population = |ids: &[AtomId]| ids.iter().map(|&id| registry.atom(id).population()).sum::<u64>();
    assert_eq!(population(&a), 30);
    assert_eq!(population(&b), 30);
}

#[test]
fn four_counties_into_four_districts() {
    let county = |x: usize, y: usize| format!("{:03}", 1 + 2 * (y * 2 + x));
    let (mut registry, groups) = prepared(grid_blocks(2, 2, 25, county));
    assert_eq!(groups.len(), 4);

    let districts = split_into_districts(&mut registry, groups, 4, &SplitConfig::default(), &NoDiagnostics).unwrap();
    assert_eq!(districts.len(), 4);
    assert!(districts.iter().all(|district| district.population() == 25));
}

#[test]
fn districts_cover_the_territory_once() {
    let (mut registry, groups) = prepared(grid_blocks(6, 1, 10, one_county));
    let districts = split_into_districts(&mut registry, groups, 3, &SplitConfig::default(), &NoDiagnostics).unwrap();

    assert_eq!(districts.iter().map(District::population).collect::<Vec<_>>(), [20, 20, 20]);
    let mut all = districts.iter().flat_map(|district| atoms_of(&registry, district)).collect::<Vec<_>>();
    all.sort();
    assert_eq!(all, (0..6).map(AtomId).collect::<Vec<_>>());
    for district in &districts {
        district.validate(&registry).unwrap();
        assert_eq!(geograph::polygons(district.geometry()).len(), 1);
    }
}

#[test]
fn bisection_is_deterministic() {
    let run = || {
        let (mut registry, groups) = prepared(grid_blocks(6, 1, 10, one_county));
        let config = SplitConfig { breaking: BreakingMethod::SplitBestCandidateGroup, ..Default::default() };
        let districts = split_into_districts(&mut registry, groups, 2, &config, &NoDiagnostics).unwrap();
        districts.iter().map(|district| atoms_of(&registry, district)).collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn populated_water_is_an_invariant_violation() {
    let mut blocks = grid_blocks(2, 1, 10, one_county);
    blocks.push(CensusBlock::new(BlockId::new("001", "000100", "0042"), 7, square(2.0, 0.0)));
    let result = prepare_groups(&mut Registry::new(), blocks, &NoDiagnostics);
    assert!(matches!(result, Err(SplitError::InvariantViolation(_))));
}

#[test]
fn zero_districts_are_rejected_before_any_work() {
    let (mut registry, groups) = prepared(grid_blocks(2, 1, 10, one_county));
    let result = split_into_districts(&mut registry, groups.clone(), 0, &SplitConfig::default(), &NoDiagnostics);
    assert!(matches!(result, Err(SplitError::UnsupportedConfiguration(_))));
    assert!(registry.group(groups[0]).is_live());
}

#[test]
fn containment_free_blocks_pass_through_assembly() {
    let blocks = grid_blocks(3, 2, 4, one_county);
    let atoms = assemble_atoms(blocks.clone()).unwrap();
    assert_eq!(atoms.len(), blocks.len());
    for (atom, block) in atoms.iter().zip(&blocks) {
        assert_eq!(atom.blocks().len(), 1);
        assert_eq!(atom.blocks()[0].id, block.id);
        assert_eq!(atom.population(), block.population);
        assert_eq!(atom.geometry(), &block.geometry);
    }
}

#[test]
fn dump_dir_collects_pass_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let dumps = DumpDir::new(dir.path().join("dumps")).unwrap();
    let (mut registry, groups) = prepared(grid_blocks(4, 1, 10, one_county));
    split_into_districts(&mut registry, groups, 2, &SplitConfig::default(), &dumps).unwrap();

    let first = std::fs::read(dumps.dir().join("d-pass-1.json")).unwrap();
    let snapshot: serde_json::Value = serde_json::from_slice(&first).unwrap();
    assert_eq!(snapshot["ideal"][0], 20);
}

#[test]
fn geojson_in_and_out() {
    let feature = |i: usize, x: f64| serde_json::json!({
        "type": "Feature",
        "properties": { "county": "001", "tract": "000100", "block": format!("{}", 1000 + i), "population": 5 },
        "geometry": { "type": "Polygon", "coordinates": [[[x, 0.0], [x + 1.0, 0.0], [x + 1.0, 1.0], [x, 1.0], [x, 0.0]]] },
    });
    let collection = serde_json::json!({
        "type": "FeatureCollection",
        "features": (0..4).map(|i| feature(i, i as f64)).collect::<Vec<_>>(),
    });

    let blocks = read_blocks_geojson(collection.to_string().as_bytes()).unwrap();
    let (mut registry, groups) = prepared(blocks);
    let districts = split_into_districts(&mut registry, groups, 2, &SplitConfig::default(), &NoDiagnostics).unwrap();

    let output: serde_json::Value = serde_json::from_slice(&write_districts_geojson(&districts).unwrap()).unwrap();
    let features = output["features"].as_array().unwrap();
    assert_eq!(features.len(), 2);
    assert_eq!(features[0]["properties"]["district"], 1);
    assert_eq!(features[1]["properties"]["population"], 10);
}
