//! Unit tests for ws-network.

#[cfg(test)]
mod helpers {
    use crate::{WardNetwork, WardNetworkBuilder};

    /// Three wards on a line, 3 and 4 units apart.
    ///
    ///   0:(0,0)  1:(3,0)  2:(3,4)
    ///
    /// Work: 0→1 (3), 0→2 (1), 1→1 (1).  Play: 2→0, 2→1 equal weight.
    pub fn three_wards() -> WardNetwork {
        let mut b = WardNetworkBuilder::new();
        let w0 = b.add_ward(1_000, Some((0.0, 0.0)));
        let w1 = b.add_ward(2_000, Some((3.0, 0.0)));
        let w2 = b.add_ward(500, Some((3.0, 4.0)));
        b.add_work_link(w0, w1, 3.0);
        b.add_work_link(w1, w1, 1.0);
        b.add_work_link(w0, w2, 1.0);
        b.add_play_link(w2, w0, 2.0);
        b.add_play_link(w2, w1, 2.0);
        b.build().unwrap()
    }
}

// ── Builder & CSR layout ──────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use approx::assert_relative_eq;

    use ws_core::{DataError, WardId};

    use crate::{LinkKind, WardNetworkBuilder};

    #[test]
    fn empty_build() {
        let net = WardNetworkBuilder::new().build().unwrap();
        assert!(net.is_empty());
        assert_eq!(net.total_population(), 0);
        assert_eq!(net.min_max_distance(), (0.0, 0.0));
    }

    #[test]
    fn csr_groups_by_source_in_insertion_order() {
        let net = super::helpers::three_wards();
        let out0: Vec<_> = net.work_links(WardId(0)).iter().map(|l| l.to).collect();
        assert_eq!(out0, vec![WardId(1), WardId(2)]);
        assert_eq!(net.work.out_degree(WardId(1)), 1);
        assert_eq!(net.work.out_degree(WardId(2)), 0);
        assert_eq!(net.play.out_degree(WardId(2)), 2);
        assert_eq!(net.links(LinkKind::Play).len(), 2);
        assert_eq!(net.work.out_start.len(), net.ward_count() + 1);
    }

    #[test]
    fn fractions_normalised_per_source() {
        let net = super::helpers::three_wards();
        let f: Vec<f64> = net.work_links(WardId(0)).iter().map(|l| l.fraction).collect();
        assert_relative_eq!(f[0], 0.75);
        assert_relative_eq!(f[1], 0.25);
        assert_relative_eq!(net.work_links(WardId(1))[0].fraction, 1.0);
        assert_relative_eq!(net.work.out_weight(WardId(0)), 4.0);
    }

    #[test]
    fn zero_weight_source_has_zero_fractions() {
        let mut b = WardNetworkBuilder::new();
        let a = b.add_ward(10, None);
        let c = b.add_ward(10, None);
        b.add_work_link(a, c, 0.0);
        let net = b.build().unwrap();
        assert_eq!(net.work_links(a)[0].fraction, 0.0);
    }

    #[test]
    fn distances_from_positions() {
        let net = super::helpers::three_wards();
        let d: Vec<f64> = net.work_links(WardId(0)).iter().map(|l| l.distance).collect();
        assert_relative_eq!(d[0], 3.0);
        assert_relative_eq!(d[1], 5.0);
        assert_relative_eq!(net.work_links(WardId(1))[0].distance, 0.0);
    }

    #[test]
    fn min_max_spans_both_kinds() {
        let net = super::helpers::three_wards();
        let (lo, hi) = net.min_max_distance();
        assert_relative_eq!(lo, 0.0);
        assert_relative_eq!(hi, 5.0);
        for l in net.work.links.iter().chain(net.play.links.iter()) {
            assert!(l.distance >= lo && l.distance <= hi);
        }
    }

    #[test]
    fn explicit_distance_wins() {
        let mut b = WardNetworkBuilder::new();
        let a = b.add_ward(1, Some((0.0, 0.0)));
        let c = b.add_ward(1, Some((100.0, 0.0)));
        b.add_link(LinkKind::Play, a, c, 1.0, Some(7.5));
        let net = b.build().unwrap();
        assert_eq!(net.min_max_distance(), (7.5, 7.5));
    }

    #[test]
    fn missing_position_gives_zero_distance() {
        let mut b = WardNetworkBuilder::new();
        let a = b.add_ward(1, Some((0.0, 0.0)));
        let c = b.add_ward(1, None);
        b.add_work_link(a, c, 1.0);
        let net = b.build().unwrap();
        assert_eq!(net.work_links(a)[0].distance, 0.0);
    }

    #[test]
    fn unknown_endpoint_rejected() {
        let mut b = WardNetworkBuilder::new();
        let a = b.add_ward(1, None);
        b.add_work_link(a, WardId(9), 1.0);
        assert!(matches!(
            b.build(),
            Err(DataError::UnknownWard { ward: 9, ward_count: 1, .. })
        ));
    }

    #[test]
    fn bad_weight_rejected() {
        let mut b = WardNetworkBuilder::new();
        let a = b.add_ward(1, None);
        b.add_work_link(a, a, f64::NAN);
        assert!(matches!(b.build(), Err(DataError::InvalidLink { what: "weight", .. })));

        let mut b = WardNetworkBuilder::new();
        let a = b.add_ward(1, None);
        b.add_link(LinkKind::Play, a, a, 1.0, Some(-2.0));
        assert!(matches!(b.build(), Err(DataError::InvalidLink { what: "distance", .. })));
    }

    #[test]
    fn population_totals() {
        let net = super::helpers::three_wards();
        assert_eq!(net.total_population(), 3_500);
        assert_eq!(net.population(WardId(1)), 2_000);
        assert!(net.contains(WardId(2)));
        assert!(!net.contains(WardId(3)));
        assert_eq!(net.ward_ids().count(), 3);
    }
}

// ── CSV loader ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::Cursor;

    use approx::assert_relative_eq;

    use ws_core::{DataError, InputFiles, Parameters, WardId};

    use crate::{load_network_reader, WardNetwork};

    const WARDS: &str = "\
ward,population,name,x,y
# comment rows are skipped
1,2000,Borchester,3.0,4.0
0,1000,Ambridge,0.0,0.0
2,500,,,
";

    const LINKS: &str = "\
from,to,weight,kind,distance
0,1,120,work,
1,0,3.5,play,4.2
2,2,1,PLAY,
";

    #[test]
    fn loads_tables() {
        let net = load_network_reader(Cursor::new(WARDS), Cursor::new(LINKS)).unwrap();
        assert_eq!(net.ward_count(), 3);
        assert_eq!(net.wards[0].name.as_deref(), Some("Ambridge"));
        assert_eq!(net.wards[2].name, None);
        assert_eq!(net.wards[2].position, None);
        assert_eq!(net.total_population(), 3_500);

        assert_relative_eq!(net.work_links(WardId(0))[0].distance, 5.0);
        assert_relative_eq!(net.play_links(WardId(1))[0].distance, 4.2);
        assert_eq!(net.play_links(WardId(2)).len(), 1);
        assert_eq!(net.min_max_distance(), (0.0, 5.0));
    }

    #[test]
    fn minimal_columns() {
        let wards = "ward,population\n0,10\n1,20\n";
        let links = "from,to,weight,kind\n0,1,1,work\n";
        let net = WardNetwork::from_readers(wards.as_bytes(), links.as_bytes()).unwrap();
        assert_eq!(net.ward_count(), 2);
        assert_eq!(net.work.len(), 1);
    }

    #[test]
    fn gap_in_ward_ids() {
        let wards = "ward,population\n0,10\n2,20\n";
        let links = "from,to,weight,kind\n";
        let err = load_network_reader(Cursor::new(wards), Cursor::new(links)).unwrap_err();
        assert!(matches!(err, DataError::NonContiguousWards { expected: 1, found: 2 }));
    }

    #[test]
    fn duplicate_ward_id() {
        let wards = "ward,population\n0,10\n0,20\n";
        let links = "from,to,weight,kind\n";
        let err = load_network_reader(Cursor::new(wards), Cursor::new(links)).unwrap_err();
        assert!(matches!(err, DataError::NonContiguousWards { expected: 1, found: 0 }));
    }

    #[test]
    fn negative_population() {
        let wards = "ward,population\n0,-5\n";
        let links = "from,to,weight,kind\n";
        let err = load_network_reader(Cursor::new(wards), Cursor::new(links)).unwrap_err();
        assert!(matches!(err, DataError::NegativePopulation { population: -5, .. }));
    }

    #[test]
    fn short_row_reports_shape() {
        let wards = "ward,population\n0,10\n1\n";
        let links = "from,to,weight,kind\n";
        let err = load_network_reader(Cursor::new(wards), Cursor::new(links)).unwrap_err();
        assert!(matches!(
            err,
            DataError::RowShape { what: "wards", row: 2, expected: 2, got: 1 }
        ));
    }

    #[test]
    fn link_to_unknown_ward() {
        let wards = "ward,population\n0,10\n";
        let links = "from,to,weight,kind\n0,4,1,work\n";
        let err = load_network_reader(Cursor::new(wards), Cursor::new(links)).unwrap_err();
        assert!(matches!(err, DataError::UnknownWard { ward: 4, .. }));
    }

    #[test]
    fn bad_link_kind() {
        let wards = "ward,population\n0,10\n";
        let links = "from,to,weight,kind\n0,0,1,school\n";
        let err = load_network_reader(Cursor::new(wards), Cursor::new(links)).unwrap_err();
        assert!(matches!(err, DataError::InvalidValue { .. }));
    }

    #[test]
    fn half_a_coordinate() {
        let wards = "ward,population,x,y\n0,10,1.0,\n";
        let links = "from,to,weight,kind\n";
        assert!(load_network_reader(Cursor::new(wards), Cursor::new(links)).is_err());
    }

    #[test]
    fn build_from_parameters() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("wards.csv"), WARDS).unwrap();
        std::fs::write(dir.path().join("links.csv"), LINKS).unwrap();

        let params = Parameters {
            input_files: InputFiles::in_dir(dir.path()),
            ..Parameters::default()
        };
        assert!(params.input_files.seeds.is_none());
        let net = WardNetwork::build(&params).unwrap();
        assert_eq!(net.ward_count(), 3);
    }

    #[test]
    fn missing_file_is_io_error() {
        let params = Parameters {
            input_files: InputFiles::in_dir(std::path::Path::new("/nonexistent/wardsim")),
            ..Parameters::default()
        };
        assert!(matches!(WardNetwork::build(&params), Err(DataError::Io(_))));
    }
}
