use crate::{
    prelude::*,
    tests::toolkit::{
        decode, decode_failure, epoch_line, event_line, first_obs_line, header_line, obs_lines,
        random_name, rinex_header, version_line,
    },
};

use std::io::Write;

fn g(prn: u8) -> SV {
    SV::new(Constellation::GPS, prn)
}

#[test]
fn single_observation() {
    let mut lines = rinex_header(&["C1"], &[]);
    lines.push(epoch_line(21, 1, 1, 0, 0, 0.0, 0, &["G01"]));
    lines.push("  20000000.000".to_string());

    let data = decode(&lines).unwrap();
    assert_eq!(data.records.len(), 1);
    assert!(data.warnings.is_empty());

    let record = &data.records[0];
    assert_eq!(
        record.epoch,
        Some(Epoch::from_gregorian(2021, 1, 1, 0, 0, 0, 0, TimeScale::GPST))
    );
    assert!(!record.power_failure);
    assert_eq!(record.clock_offset, 0.0);
    assert_eq!(record.observations.len(), 1);

    let obs = record.get(g(1), "C1").unwrap();
    assert_eq!(obs.value, 20000000.0);
    assert!(!obs.lost_lock);
    assert!(!obs.antispoofing);
    assert_eq!(obs.strength, 0);
    assert_eq!(obs.wavelength_factor, 1);

    assert_eq!(data.meta.blocks, 1);
    assert_eq!(
        data.meta.get("rnxver").unwrap().value.as_version(),
        Some(Version::new(2, 11))
    );
}

#[test]
fn file_order_is_preserved() {
    let codes = ["L1", "L2", "C1", "P2", "S1", "S2"];
    let mut lines = rinex_header(&codes, &[]);
    lines.push(epoch_line(21, 1, 1, 0, 0, 0.0, 0, &["G12", "R05", "G03"]));
    for base in [1.0, 2.0, 3.0] {
        let observations: Vec<_> = (0..codes.len())
            .map(|i| Some((base * 1000.0 + i as f64, 0, 0)))
            .collect();
        lines.extend(obs_lines(&observations));
    }
    let data = decode(&lines).unwrap();
    let record = &data.records[0];
    assert_eq!(
        record.satellites(),
        vec![g(12), SV::new(Constellation::Glonass, 5), g(3)]
    );
    let order: Vec<(SV, &str)> = record
        .observations
        .iter()
        .map(|(sv, code, _)| (*sv, code.as_str()))
        .collect();
    assert_eq!(order.len(), 18);
    assert_eq!(order[0], (g(12), "L1"));
    assert_eq!(order[5], (g(12), "S2"));
    assert_eq!(order[17], (g(3), "S2"));
    assert_eq!(record.get(g(3), "S2").unwrap().value, 3005.0);
    // 6th observation lies on a continuation line
    assert_eq!(record.get(g(12), "S2").unwrap().value, 1005.0);
    // not applicable
    let r05 = SV::new(Constellation::Glonass, 5);
    assert_eq!(record.get(r05, "L1").unwrap().wavelength_factor, 0);
}

#[test]
fn flags_and_wavelength_factors() {
    let extra = [header_line("     2     1", "WAVELENGTH FACT L1/2")];
    let mut lines = rinex_header(&["L1", "L2", "L5"], &extra);
    lines.push(epoch_line(21, 1, 1, 0, 0, 0.0, 0, &["G01", "G02"]));
    lines.extend(obs_lines(&[
        Some((1.0, 0, 9)),
        Some((2.0, 0, 0)),
        Some((5.0, 0, 0)),
    ]));
    lines.extend(obs_lines(&[
        Some((1.0, 2, 0)),
        Some((2.0, 7, 0)),
        Some((5.0, 2, 0)),
    ]));

    let data = decode(&lines).unwrap();
    let record = &data.records[0];

    let l1 = record.get(g(1), "L1").unwrap();
    assert_eq!(l1.wavelength_factor, 2);
    assert_eq!(l1.strength, 9);
    assert_eq!(record.get(g(1), "L2").unwrap().wavelength_factor, 1);
    assert_eq!(record.get(g(1), "L5").unwrap().wavelength_factor, 0);

    // wavelength toggled for this single observation
    assert_eq!(record.get(g(2), "L1").unwrap().wavelength_factor, 1);
    let l2 = record.get(g(2), "L2").unwrap();
    assert_eq!(l2.wavelength_factor, 2);
    assert!(l2.lost_lock);
    assert!(l2.antispoofing);
    // 0 is never toggled
    assert_eq!(record.get(g(2), "L5").unwrap().wavelength_factor, 0);
}

#[test]
fn wavelength_factors_follow_events() {
    let mut lines = rinex_header(&["L1"], &[]);
    lines.push(epoch_line(21, 1, 1, 0, 0, 0.0, 0, &["G01", "G02"]));
    lines.extend(obs_lines(&[Some((1.0, 0, 0))]));
    lines.extend(obs_lines(&[Some((1.0, 0, 0))]));
    lines.push(event_line(4, 2));
    lines.push(header_line("     1     1", "WAVELENGTH FACT L1/2"));
    lines.push(header_line(
        &format!("{:6}{:6}{:6}{:3}{}", 2, 1, 1, "", "G02"),
        "WAVELENGTH FACT L1/2",
    ));
    lines.push(epoch_line(21, 1, 1, 0, 0, 30.0, 0, &["G01", "G02"]));
    lines.extend(obs_lines(&[Some((1.0, 0, 0))]));
    lines.extend(obs_lines(&[Some((1.0, 0, 0))]));

    let data = decode(&lines).unwrap();
    assert_eq!(data.records.len(), 2);
    assert_eq!(data.meta.blocks, 2);
    assert_eq!(data.records[0].get(g(2), "L1").unwrap().wavelength_factor, 1);
    assert_eq!(data.records[1].get(g(1), "L1").unwrap().wavelength_factor, 1);
    assert_eq!(data.records[1].get(g(2), "L1").unwrap().wavelength_factor, 2);

    // snapshot is indexed by record
    assert_eq!(data.meta.all("ambiguity").len(), 1);
    assert!(data.meta.at("ambiguity", 0).is_none());
    assert!(data.meta.at("ambiguity", 1).is_some());
}

#[test]
fn observation_types_change_mid_file() {
    let mut lines = rinex_header(&["C1"], &[]);
    lines.push(epoch_line(21, 1, 1, 0, 0, 0.0, 0, &["G01"]));
    lines.extend(obs_lines(&[Some((1.0, 0, 0))]));
    lines.push(event_line(4, 1));
    lines.push(header_line("     2    C1    L1", "# / TYPES OF OBSERV"));
    lines.push(epoch_line(21, 1, 1, 0, 0, 30.0, 0, &["G01"]));
    lines.extend(obs_lines(&[Some((2.0, 0, 0)), Some((3.0, 0, 0))]));

    let data = decode(&lines).unwrap();
    assert_eq!(data.meta.obs_codes(0), vec!["C1"]);
    assert_eq!(data.meta.obs_codes(1), vec!["C1", "L1"]);
    assert_eq!(data.records[0].observations.len(), 1);
    assert_eq!(data.records[1].observations.len(), 2);
    assert_eq!(data.records[1].get(g(1), "L1").unwrap().value, 3.0);
}

#[test]
fn epoch_events() {
    let mut lines = rinex_header(&["C1"], &[]);
    // antenna starts moving
    lines.push(event_line(2, 0));
    lines.push(epoch_line(21, 1, 1, 0, 0, 0.0, 1, &["G01"]));
    lines.extend(obs_lines(&[Some((1.0, 0, 0))]));
    // new site
    lines.push(event_line(3, 1));
    lines.push(header_line("SITE B", "MARKER NAME"));
    // external event
    lines.push(epoch_line(21, 1, 1, 0, 0, 15.0, 5, &[]));
    lines.push(epoch_line(21, 1, 1, 0, 0, 30.0, 0, &["G01"]));
    lines.extend(obs_lines(&[Some((2.0, 0, 0))]));
    // event stamped with an epoch, with a comment
    let mut stamped = epoch_line(21, 1, 1, 0, 0, 45.0, 5, &[]);
    stamped.replace_range(29..32, "  1");
    lines.push(stamped);
    lines.push(header_line("external trigger", "COMMENT"));

    let data = decode(&lines).unwrap();
    assert_eq!(data.records.len(), 2);
    assert!(data.records[0].power_failure);
    assert!(data.records[0].in_motion);
    assert!(!data.records[1].power_failure);
    assert!(!data.records[1].in_motion);

    assert_eq!(
        data.meta.at("marker", 1).unwrap().value.as_text(),
        Some("SITE B")
    );
    assert!(data.meta.at("marker", 0).is_none());

    let comment = data.meta.get("comment").unwrap();
    assert_eq!(comment.value.as_text(), Some("external trigger"));
    assert_eq!(comment.record, 2);
    assert_eq!(
        comment.epoch,
        Some(Epoch::from_gregorian(2021, 1, 1, 0, 0, 45, 0, TimeScale::GPST))
    );
    // blocks with no lines are not accounted for
    assert_eq!(data.meta.blocks, 3);
}

#[test]
fn cycle_slip_records_are_skipped() {
    let codes = ["L1", "L2", "C1", "P1", "P2", "S1"];
    let mut lines = rinex_header(&codes, &[]);
    let observations: Vec<_> = (0..codes.len()).map(|i| Some((i as f64, 0, 0))).collect();

    lines.push(epoch_line(21, 1, 1, 0, 0, 0.0, 0, &["G01", "G02"]));
    lines.extend(obs_lines(&observations));
    lines.extend(obs_lines(&observations));

    lines.push(epoch_line(21, 1, 1, 0, 0, 15.0, 6, &["G02"]));
    lines.extend(obs_lines(&observations));

    lines.push(epoch_line(21, 1, 1, 0, 0, 30.0, 0, &["G01", "G02"]));
    lines.extend(obs_lines(&observations));
    lines.extend(obs_lines(&observations));

    let data = decode(&lines).unwrap();
    assert_eq!(data.records.len(), 2);
    assert_eq!(data.records[1].get(g(2), "S1").unwrap().value, 5.0);
    assert_eq!(
        data.records[1].phase_breaks,
        [g(2)].into_iter().collect()
    );
    assert!(data.warnings.is_empty());
}

#[test]
fn two_digit_years() {
    let mut lines = rinex_header(&["C1"], &[]);
    lines.push(epoch_line(99, 12, 31, 23, 59, 30.0, 0, &["G01"]));
    lines.extend(obs_lines(&[Some((1.0, 0, 0))]));
    let data = decode(&lines).unwrap();
    assert_eq!(
        data.records[0].epoch,
        Some(Epoch::from_gregorian(1999, 12, 31, 23, 59, 30, 0, TimeScale::GPST))
    );

    let mut lines = rinex_header(&["C1"], &[first_obs_line(1999, 12, 31, "GPS")]);
    lines.push(epoch_line(0, 1, 1, 0, 0, 0.0, 0, &["G01"]));
    lines.extend(obs_lines(&[Some((1.0, 0, 0))]));
    let data = decode(&lines).unwrap();
    assert_eq!(
        data.records[0].epoch,
        Some(Epoch::from_gregorian(2000, 1, 1, 0, 0, 0, 0, TimeScale::GPST))
    );
}

#[test]
fn glonass_time_system() {
    let mut lines = rinex_header(&["C1"], &[first_obs_line(2021, 1, 1, "GLO")]);
    lines.push(epoch_line(21, 1, 1, 0, 0, 0.0, 0, &["R01"]));
    lines.extend(obs_lines(&[Some((1.0, 0, 0))]));
    let data = decode(&lines).unwrap();
    assert_eq!(
        data.records[0].epoch,
        Some(Epoch::from_gregorian(2021, 1, 1, 0, 0, 0, 0, TimeScale::UTC))
    );
}

#[test]
fn audit() {
    let extra = [
        header_line("    30.000", "INTERVAL"),
        header_line("   G01     2     1", "PRN / # OF OBS"),
        header_line("   G02     1     1", "PRN / # OF OBS"),
    ];
    let mut lines = rinex_header(&["C1", "L1"], &extra);
    lines.push(epoch_line(21, 1, 1, 0, 0, 0.0, 0, &["G01", "G02"]));
    lines.extend(obs_lines(&[Some((1.0, 0, 0)), None]));
    lines.extend(obs_lines(&[Some((1.0, 0, 0)), Some((1.0, 0, 0))]));
    lines.push(epoch_line(21, 1, 1, 0, 0, 30.0, 0, &["G01"]));
    lines.extend(obs_lines(&[Some((1.0, 0, 0)), Some((1.0, 0, 0))]));

    let data = decode(&lines).unwrap();
    assert!(data.warnings.is_empty());

    // blank observations are reported, but not counted
    let blank = data.records[0].get(g(1), "L1").unwrap();
    assert_eq!(blank.value, 0.0);
    assert_eq!(data.records[0].observations.len(), 4);
}

#[test]
fn audit_mismatches() {
    let extra = [
        header_line("    15.000", "INTERVAL"),
        header_line("   G01     3", "PRN / # OF OBS"),
    ];
    let mut lines = rinex_header(&["C1"], &extra);
    lines.push(epoch_line(21, 1, 1, 0, 0, 0.0, 0, &["G01"]));
    lines.extend(obs_lines(&[Some((1.0, 0, 0))]));
    lines.push(epoch_line(21, 1, 1, 0, 0, 30.0, 0, &["G01"]));
    lines.extend(obs_lines(&[Some((1.0, 0, 0))]));

    let data = decode(&lines).unwrap();
    assert_eq!(
        data.warnings,
        vec![
            Warning::ObservationCount {
                sv: g(1),
                code: "C1".to_string(),
                declared: 3,
                observed: 2,
            },
            Warning::Interval {
                declared: Duration::from_seconds(15.0),
                observed: Duration::from_seconds(30.0),
            },
        ]
    );
}

#[test]
fn truncated_records() {
    let mut lines = rinex_header(&["C1"], &[]);
    lines.push(epoch_line(21, 1, 1, 0, 0, 0.0, 0, &["G01", "G02"]));
    lines.extend(obs_lines(&[Some((1.0, 0, 0))]));
    let (kind, line) = decode_failure(&lines);
    assert_eq!(kind, FormatError::UnexpectedEof("observations"));
    assert_eq!(line, lines.len());

    let mut lines = rinex_header(&["C1"], &[]);
    lines.push(event_line(4, 2));
    lines.push(header_line("only one", "COMMENT"));
    let (kind, _) = decode_failure(&lines);
    assert_eq!(kind, FormatError::UnexpectedEof("header block"));

    // clean end of stream, in between records
    let mut lines = rinex_header(&["C1"], &[]);
    lines.push(epoch_line(21, 1, 1, 0, 0, 0.0, 0, &["G01"]));
    lines.extend(obs_lines(&[Some((1.0, 0, 0))]));
    lines.push(String::new());
    assert!(decode(&lines).is_ok());
}

#[test]
fn missing_end_of_header() {
    let mut lines = rinex_header(&["C1"], &[]);
    lines.pop();
    let (kind, _) = decode_failure(&lines);
    assert_eq!(kind, FormatError::MissingHeaderDelimiter);
}

#[test]
fn from_file() {
    let mut lines = rinex_header(&["C1"], &[]);
    lines.push(epoch_line(21, 1, 1, 0, 0, 0.0, 0, &["G01"]));
    lines.push("  20000000.000".to_string());

    let name = format!("{}.21o", random_name(8));
    let path = std::env::temp_dir().join(&name);
    let mut fd = std::fs::File::create(&path).unwrap();
    write!(fd, "{}", lines.join("\n")).unwrap();
    drop(fd);

    let data = ObservationData::from_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(data.records.len(), 1);
    assert_eq!(
        data.meta.get("filename").unwrap().value.as_text(),
        Some(name.as_str())
    );
}

#[cfg(feature = "flate2")]
#[test]
fn from_gzip_file() {
    use flate2::{write::GzEncoder, Compression};

    let mut lines = rinex_header(&["C1"], &[]);
    lines.push(epoch_line(21, 1, 1, 0, 0, 0.0, 0, &["G01"]));
    lines.push("  20000000.000".to_string());

    let path = std::env::temp_dir().join(format!("{}.21o.gz", random_name(8)));
    let fd = std::fs::File::create(&path).unwrap();
    let mut encoder = GzEncoder::new(fd, Compression::default());
    write!(encoder, "{}", lines.join("\n")).unwrap();
    encoder.finish().unwrap();

    let data = ObservationData::from_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(
        data.records[0].get(g(1), "C1").unwrap().value,
        20000000.0
    );
}

#[test]
fn revisions() {
    let mut lines = rinex_header(&["C1"], &[]);
    lines[0] = version_line("3.04", 'O');
    let (kind, line) = decode_failure(&lines);
    assert!(matches!(kind, FormatError::NonSupportedVersion(_)));
    assert_eq!(line, 1);

    lines[0] = version_line("2.11", 'N');
    let (kind, _) = decode_failure(&lines);
    assert_eq!(kind, FormatError::NotObservationData);

    lines[0] = version_line("2.12", 'O');
    let data = decode(&lines).unwrap();
    assert_eq!(
        data.warnings,
        vec![Warning::NewerRevision("2.12".to_string())]
    );
}
