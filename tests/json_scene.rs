//! Integration tests for JSON scene files and reader settings.

use std::io::Write;
use std::path::PathBuf;

use abc_readgeo::archive::json;
use abc_readgeo::prelude::*;
use abc_readgeo::reader::{Interpolation, Timing};
use abc_readgeo::util::Vec3;
use tempfile::NamedTempFile;

fn shot_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/shot.json")
}

fn open_shot() -> MemoryArchive {
    json::open(shot_path()).expect("open shot.json")
}

#[test]
fn shot_enumerates_geometry() {
    let archive = open_shot();
    let objects = ObjectList::from_archive(&archive);
    let names: Vec<_> = objects.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["body", "marker"]);
    assert!(scan::find_named(&archive, "/rig/shotcam", Some(NodeKind::Camera)).is_some());
}

#[test]
fn reader_covers_animated_range() {
    let archive = open_shot();
    let reader = GeoReader::for_archive(&archive, ReadSettings::default()).expect("reader");
    // static nodes sit at time 0
    assert_eq!((reader.settings.first_frame, reader.settings.last_frame), (0, 3));
}

#[test]
fn frames_resolve_through_reader() {
    let archive = open_shot();
    let objects = ObjectList::from_archive(&archive);
    let settings = ReadSettings {
        interpolation: Interpolation::Linear,
        ..Default::default()
    };
    let reader = GeoReader::for_archive(&archive, settings).expect("reader");

    let out = reader.create_geometry(&archive, &objects, 2.0);
    assert_eq!(out.len(), 2);
    assert!((out[0].points[0] - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
    assert_eq!(out[0].face_indices, vec![3, 2, 1, 0]);
    assert!(out[0].uvs.is_assigned());
    // `locked` ignores the animated rig
    assert_eq!(out[1].points, vec![Vec3::new(0.0, 5.0, 0.0)]);

    // halfway between frames 2 and 3
    let out = reader.create_geometry(&archive, &objects, 2.5);
    assert!((out[0].points[0].x - 1.5).abs() < 1e-5);

    // frames past the range clamp to the last frame
    let out = reader.create_geometry(&archive, &objects, 40.0);
    assert!((out[0].points[0].x - 2.0).abs() < 1e-5);
}

#[test]
fn retime_holds_one_frame() {
    let archive = open_shot();
    let objects = ObjectList::from_archive(&archive);
    let settings = ReadSettings {
        timing: Timing::Retime,
        retime_frame: 3.0,
        ..Default::default()
    };
    let reader = GeoReader::for_archive(&archive, settings).expect("reader");

    for frame in [1.0, 2.0, 17.0] {
        let out = reader.create_geometry(&archive, &objects, frame);
        assert!((out[0].points[0].x - 2.0).abs() < 1e-5, "frame {frame}");
    }
}

#[test]
fn camera_follows_rig() {
    let archive = open_shot();
    let cam = scan::find_named(&archive, "shotcam", None).expect("camera");
    let reader = GeoReader::for_archive(&archive, ReadSettings::default()).expect("reader");
    let view = reader.camera(&archive, cam, 2.0).expect("camera view");
    assert_eq!(view.sample.focal_length, 50.0);
    assert!((view.world.matrix.w_axis.x - 1.0).abs() < 1e-9);
}

#[test]
fn scene_from_temp_file() {
    let mut file = NamedTempFile::new().expect("create temp file");
    write!(
        file,
        r#"{{"children":[{{"name":"m","type":"poly_mesh","samples":[{{"positions":[[1,2,3]]}}]}}]}}"#
    )
    .expect("write scene");

    let archive = json::open(file.path()).expect("open temp scene");
    let m = scan::find_named(&archive, "m", None).expect("mesh");
    let s = sample_geometry(&archive, m, 0.0, false, SampleMode::Full);
    assert_eq!(s.points, vec![Vec3::new(1.0, 2.0, 3.0)]);
}

#[test]
fn malformed_scene_is_an_error() {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(b"{ not json").expect("write");
    assert!(matches!(json::open(file.path()), Err(Error::Json(_))));
}

#[test]
fn settings_survive_a_save() {
    let file = NamedTempFile::new().expect("create temp file");
    let settings = ReadSettings {
        fps: 30.0,
        interpolation: Interpolation::Linear,
        first_frame: 10,
        last_frame: 90,
        ..Default::default()
    };
    settings.save(file.path()).expect("save");
    assert_eq!(ReadSettings::load(file.path()).expect("load"), settings);

    std::fs::write(file.path(), r#"{"fps": 0}"#).expect("write");
    assert!(matches!(ReadSettings::load(file.path()), Err(Error::InvalidSettings(_))));
}
