//! abc-readgeo CLI - inspect scenes and resolve geometry at arbitrary frames.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use abc_readgeo::archive::{json as scene_json, MemoryArchive};
use abc_readgeo::core::{NodeId, NodeKind, SceneArchive};
use abc_readgeo::reader::{frame_range, scan, GeoReader, Interpolation, ObjectList, ReadSettings};
use abc_readgeo::sampling::{
    local_matrix, world_matrix, GeometrySample, PointBlend, VertexAttribute, WorldMatrix,
};
use abc_readgeo::util::{matrix_to_row_major, DMat4};
use abc_readgeo::Error;

/// Verbosity levels
const LOG_QUIET: u8 = 0;
const LOG_WARN: u8 = 1;
const LOG_DEBUG: u8 = 2;
const LOG_TRACE: u8 = 3;

#[derive(Debug, Default)]
struct Options {
    frame: Option<f64>,
    fps: Option<f64>,
    interp: bool,
    bbox: bool,
    json: bool,
    settings: Option<PathBuf>,
    verbosity: u8,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let (opts, positional) = parse_args(&args)?;
    init_logging(opts.verbosity);

    let Some(&command) = positional.first() else {
        print_help();
        return Ok(());
    };

    match command {
        "info" | "i" => cmd_info(&opts, require_file(&positional, "info")?),
        "tree" | "t" => cmd_tree(&opts, require_file(&positional, "tree")?),
        "span" => cmd_span(&opts, require_file(&positional, "span")?),
        "xform" | "x" => {
            if positional.len() < 3 {
                bail!("missing arguments\nUsage: abc-readgeo xform <name> <scene.json>");
            }
            cmd_xform(&opts, positional[1], positional[2])
        }
        "camera" | "c" => {
            if positional.len() < 3 {
                bail!("missing arguments\nUsage: abc-readgeo camera <name> <scene.json>");
            }
            cmd_camera(&opts, positional[1], positional[2])
        }
        "sample" | "s" => {
            let (pattern, file) = match positional.len() {
                0..=1 => bail!("missing file argument\nUsage: abc-readgeo sample [pattern] <scene.json>"),
                2 => (None, positional[1]),
                _ => (Some(positional[1]), positional[2]),
            };
            cmd_sample(&opts, pattern, file)
        }
        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    }
}

fn parse_args(args: &[String]) -> anyhow::Result<(Options, Vec<&str>)> {
    let mut opts = Options { verbosity: LOG_WARN, ..Default::default() };
    let mut positional = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-v" | "--verbose" => opts.verbosity = LOG_DEBUG,
            "-vv" | "--trace" => opts.verbosity = LOG_TRACE,
            "-q" | "--quiet" => opts.verbosity = LOG_QUIET,
            "--interp" => opts.interp = true,
            "--bbox" => opts.bbox = true,
            "--json" | "-j" => opts.json = true,
            "--frame" | "-f" => {
                let v = iter.next().context("--frame needs a value")?;
                opts.frame = Some(v.parse().with_context(|| format!("bad frame {v:?}"))?);
            }
            "--fps" => {
                let v = iter.next().context("--fps needs a value")?;
                opts.fps = Some(v.parse().with_context(|| format!("bad fps {v:?}"))?);
            }
            "--settings" => {
                let v = iter.next().context("--settings needs a file")?;
                opts.settings = Some(PathBuf::from(v));
            }
            _ => positional.push(arg.as_str()),
        }
    }
    Ok((opts, positional))
}

fn log_level(verbosity: u8) -> &'static str {
    match verbosity {
        LOG_QUIET => "error",
        LOG_WARN => "warn",
        LOG_DEBUG => "debug",
        LOG_TRACE.. => "trace",
    }
}

fn init_logging(verbosity: u8) {
    let level = log_level(verbosity);
    let filter = EnvFilter::try_from_env("ABC_READGEO_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("abc_readgeo={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn require_file<'a>(positional: &[&'a str], command: &str) -> anyhow::Result<&'a str> {
    match positional.get(1) {
        Some(&f) => Ok(f),
        None => bail!("missing file argument\nUsage: abc-readgeo {command} <scene.json>"),
    }
}

fn open(path: &str) -> anyhow::Result<MemoryArchive> {
    tracing::info!("Opening scene: {path}");
    scene_json::open(path).with_context(|| format!("failed to open {path}"))
}

/// Settings file (if any) with command-line overrides; the frame range
/// follows the archive unless a settings file fixed it.
fn reader_for(opts: &Options, archive: &MemoryArchive) -> anyhow::Result<GeoReader> {
    let mut settings = match &opts.settings {
        Some(p) => ReadSettings::load(p).with_context(|| format!("loading {}", p.display()))?,
        None => ReadSettings::default(),
    };
    if let Some(fps) = opts.fps {
        settings.fps = fps;
    }
    if opts.interp {
        settings.interpolation = Interpolation::Linear;
    }
    let reader = if opts.settings.is_some() {
        GeoReader::new(settings)?
    } else {
        GeoReader::for_archive(archive, settings)?
    };
    Ok(reader)
}

fn frame_of(opts: &Options, reader: &GeoReader) -> f64 {
    opts.frame.unwrap_or(reader.settings.first_frame as f64)
}

fn cmd_info(opts: &Options, path: &str) -> anyhow::Result<()> {
    let archive = open(path)?;
    let geometry = scan::geometry_nodes(&archive);
    let xforms = scan::xform_nodes(&archive);
    let cameras = scan::camera_nodes(&archive);
    let span = scan::time_span(&archive);
    let bounds = scan::archive_bounds(&archive);

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&json!({
            "archive": path,
            "nodes": archive.num_nodes(),
            "geometry": geometry.len(),
            "xforms": xforms.len(),
            "cameras": cameras.len(),
            "time_span": span.map(|(a, b)| [a, b]),
            "bounds": (!bounds.is_empty()).then(|| json!({
                "min": bounds.min.to_array(),
                "max": bounds.max.to_array(),
            })),
        }))?);
        return Ok(());
    }

    println!("abc-readgeo (built {} {})", env!("ABC_READGEO_BUILD_DATE"), env!("ABC_READGEO_BUILD_TIME"));
    println!("Scene: {path}");
    println!("Nodes: {}", archive.num_nodes());
    println!();
    println!("  Xforms:   {}", xforms.len());
    println!("  Geometry: {}", geometry.len());
    println!("  Cameras:  {}", cameras.len());
    println!();
    match span {
        Some((first, last)) => println!("Time span: {first:.4}s - {last:.4}s"),
        None => println!("Time span: static"),
    }
    if !bounds.is_empty() {
        println!(
            "Bounds: ({:.3}, {:.3}, {:.3}) - ({:.3}, {:.3}, {:.3})",
            bounds.min.x, bounds.min.y, bounds.min.z, bounds.max.x, bounds.max.y, bounds.max.z
        );
    }
    Ok(())
}

fn cmd_tree(opts: &Options, path: &str) -> anyhow::Result<()> {
    let archive = open(path)?;
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&tree_json(&archive, archive.root()))?);
        return Ok(());
    }
    println!("Scene: {path}");
    println!();
    print_tree(&archive, archive.root(), 0);
    Ok(())
}

fn print_tree(archive: &MemoryArchive, node: NodeId, depth: usize) {
    let indent = "  ".repeat(depth);
    let kind = archive.kind(node);
    let samples = archive.timeline(node).map(|t| t.num_samples()).unwrap_or(0);
    if kind.is_animatable() {
        println!("{indent}{} [{}] ({samples} samples)", archive.name_of(node), kind.label());
    } else {
        println!("{indent}{} [{}]", archive.name_of(node), kind.label());
    }
    for &child in archive.children(node) {
        print_tree(archive, child, depth + 1);
    }
}

fn tree_json(archive: &MemoryArchive, node: NodeId) -> serde_json::Value {
    let children: Vec<_> = archive.children(node).iter().map(|&c| tree_json(archive, c)).collect();
    json!({
        "name": archive.name_of(node),
        "path": archive.full_name_of(node),
        "kind": archive.kind(node).label(),
        "schema": archive.kind(node).schema(),
        "children": children,
    })
}

fn cmd_span(opts: &Options, path: &str) -> anyhow::Result<()> {
    let archive = open(path)?;
    let fps = opts.fps.unwrap_or(ReadSettings::default().fps);
    let span = scan::time_span(&archive);
    let frames = span.map(|s| frame_range(s, fps));

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&json!({
            "time_span": span.map(|(a, b)| [a, b]),
            "fps": fps,
            "frames": frames.map(|(a, b)| [a, b]),
        }))?);
    } else if let (Some((t0, t1)), Some((f0, f1))) = (span, frames) {
        println!("Time: {t0:.4}s - {t1:.4}s");
        println!("Frames @ {fps} fps: {f0} - {f1}");
    } else {
        println!("Static scene (no animated nodes)");
    }
    Ok(())
}

fn cmd_xform(opts: &Options, name: &str, path: &str) -> anyhow::Result<()> {
    let archive = open(path)?;
    let reader = reader_for(opts, &archive)?;
    let node = scan::find_named(&archive, name, None)
        .ok_or_else(|| Error::ObjectNotFound(name.to_string()))?;

    let frame = frame_of(opts, &reader);
    let time = reader.settings.sample_time(frame);
    let interpolate = reader.settings.interpolate();

    let parent = world_matrix(&archive, node, time, interpolate);
    let local = if archive.kind(node) == NodeKind::Xform {
        Some(local_matrix(&archive, node, time, interpolate)?)
    } else {
        None
    };
    let world = match local {
        Some((m, true)) => parent.matrix * m,
        Some((m, false)) => m,
        None => parent.matrix,
    };

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&json!({
            "node": archive.full_name_of(node),
            "frame": frame,
            "time": time,
            "interpolate": interpolate,
            "local": local.map(|(m, _)| matrix_to_row_major(&m)),
            "world": matrix_to_row_major(&world),
            "complete": parent.is_complete(),
            "unreadable": parent.unreadable.iter().map(|&n| archive.full_name_of(n)).collect::<Vec<_>>(),
        }))?);
        return Ok(());
    }

    println!("{} [{}] at frame {frame} (t={time:.4}s, interp={interpolate})",
        archive.full_name_of(node), archive.kind(node).label());
    if let Some((m, inherits)) = local {
        println!("  local matrix (inherits={inherits}):");
        print_matrix(&m, "  ");
    }
    println!("  world matrix:");
    print_matrix(&world, "  ");
    let (scale, rotation, translation) = world.to_scale_rotation_translation();
    let euler = rotation.to_euler(glam::EulerRot::XYZ);
    println!("  decomposed:");
    println!("    T: ({:.4}, {:.4}, {:.4})", translation.x, translation.y, translation.z);
    println!("    R: ({:.2}, {:.2}, {:.2}) deg",
        euler.0.to_degrees(), euler.1.to_degrees(), euler.2.to_degrees());
    println!("    S: ({:.4}, {:.4}, {:.4})", scale.x, scale.y, scale.z);
    print_unreadable(&archive, &parent);
    Ok(())
}

fn print_unreadable(archive: &MemoryArchive, world: &WorldMatrix) {
    if world.is_complete() {
        return;
    }
    for &n in &world.unreadable {
        println!("  warning: {} could not be read (identity used)", archive.full_name_of(n));
    }
}

fn cmd_camera(opts: &Options, name: &str, path: &str) -> anyhow::Result<()> {
    let archive = open(path)?;
    let reader = reader_for(opts, &archive)?;
    let node = scan::find_named(&archive, name, Some(NodeKind::Camera))
        .ok_or_else(|| Error::ObjectNotFound(name.to_string()))?;

    let frame = frame_of(opts, &reader);
    let view = reader.camera(&archive, node, frame)?;
    let cam = &view.sample;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&json!({
            "node": archive.full_name_of(node),
            "frame": frame,
            "time": reader.settings.sample_time(frame),
            "sample": cam,
            "horizontal_fov": cam.horizontal_fov().to_degrees(),
            "vertical_fov": cam.vertical_fov().to_degrees(),
            "aspect_ratio": cam.aspect_ratio(),
            "world": matrix_to_row_major(&view.world.matrix),
            "complete": view.world.is_complete(),
        }))?);
        return Ok(());
    }

    println!("{} [{}] at frame {frame}", archive.full_name_of(node), NodeKind::Camera.label());
    println!("  focal length: {:.2} mm", cam.focal_length);
    println!("  aperture:     {:.3} x {:.3} cm", cam.horizontal_aperture, cam.vertical_aperture);
    println!("  fov:          {:.2} x {:.2} deg",
        cam.horizontal_fov().to_degrees(), cam.vertical_fov().to_degrees());
    println!("  aspect:       {:.4}", cam.aspect_ratio());
    println!("  clipping:     {} - {}", cam.near_clipping_plane, cam.far_clipping_plane);
    println!("  world matrix:");
    print_matrix(&view.world.matrix, "  ");
    print_unreadable(&archive, &view.world);
    Ok(())
}

fn print_matrix(m: &DMat4, indent: &str) {
    // row-vector layout, translation in the last row
    let v = matrix_to_row_major(m);
    for row in v.chunks(4) {
        println!("{indent}  [{:10.4} {:10.4} {:10.4} {:10.4}]", row[0], row[1], row[2], row[3]);
    }
}

fn cmd_sample(opts: &Options, pattern: Option<&str>, path: &str) -> anyhow::Result<()> {
    let archive = open(path)?;
    let reader = reader_for(opts, &archive)?;

    let mut objects = ObjectList::from_archive(&archive);
    if let Some(p) = pattern {
        let all: Vec<usize> = (0..objects.len()).collect();
        objects.set_active(&all, false);
        objects.set_active(&objects.matching(p), true);
    }
    if opts.bbox {
        let all: Vec<usize> = (0..objects.len()).collect();
        objects.set_bbox(&all, true);
    }

    let frame = frame_of(opts, &reader);
    let samples = reader.create_geometry(&archive, &objects, frame);

    if opts.json {
        let out: Vec<_> = objects
            .iter()
            .zip(&samples)
            .filter(|(e, _)| e.active)
            .map(|(e, s)| sample_json(&archive, e.node, s))
            .collect();
        println!("{}", serde_json::to_string_pretty(&json!({
            "scene": path,
            "frame": frame,
            "time": reader.settings.sample_time(frame),
            "objects": out,
        }))?);
        return Ok(());
    }

    println!("Scene: {path}");
    println!("Frame {frame} (sampled at t={:.4}s, interp={})",
        reader.settings.sample_time(frame), reader.settings.interpolate());
    println!();
    for (entry, s) in objects.iter().zip(&samples) {
        if !entry.active {
            continue;
        }
        println!("{} {}", archive.full_name_of(entry.node), if entry.bbox { "[bbox]" } else { "" });
        println!("  points: {}  faces: {}", s.points.len(), s.num_faces());
        println!("  source: {}", blend_label(&s.blend));
        if s.topology_dropped {
            println!("  warning: face indices do not fit the points, faces omitted");
        }
        println!("  uvs: {}  normals: {}", attr_label(&s.uvs), attr_label(&s.normals));
        if !s.is_empty() {
            let b = s.bounds();
            println!(
                "  bounds: ({:.3}, {:.3}, {:.3}) - ({:.3}, {:.3}, {:.3})",
                b.min.x, b.min.y, b.min.z, b.max.x, b.max.y, b.max.z
            );
        }
    }
    Ok(())
}

fn sample_json(archive: &MemoryArchive, node: NodeId, s: &GeometrySample) -> serde_json::Value {
    json!({
        "node": archive.full_name_of(node),
        "source": blend_label(&s.blend),
        "topology_dropped": s.topology_dropped,
        "points": s.points.iter().map(|p| p.to_array()).collect::<Vec<_>>(),
        "face_counts": s.face_counts,
        "face_indices": s.face_indices,
        "uvs": s.uvs.values().map(|v| v.iter().map(|u| u.to_array()).collect::<Vec<_>>()),
        "normals": s.normals.values().map(|v| v.iter().map(|n| n.to_array()).collect::<Vec<_>>()),
    })
}

fn blend_label(blend: &PointBlend) -> String {
    match blend {
        PointBlend::Single { index } => format!("sample {index}"),
        PointBlend::Blended { floor, ceil, weight } => format!("samples {floor}-{ceil} @ {weight:.3}"),
        PointBlend::TopologyMismatch { floor, floor_count, ceil_count } => {
            format!("sample {floor} (point count {floor_count} vs {ceil_count}, not blended)")
        }
        PointBlend::CeilUnreadable { floor } => format!("sample {floor} (next sample unreadable)"),
        PointBlend::Unavailable => "unavailable".to_string(),
    }
}

fn attr_label<T>(attr: &VertexAttribute<T>) -> String {
    match attr {
        VertexAttribute::Absent => "-".to_string(),
        VertexAttribute::Mismatched { num_indices } => format!("omitted ({num_indices} indices)"),
        VertexAttribute::Assigned(v) => v.len().to_string(),
    }
}

fn print_help() {
    println!("abc-readgeo - resolve time-sampled scenes at arbitrary frames");
    println!();
    println!("USAGE:");
    println!("    abc-readgeo [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info   <scene>                 Show node counts, time span and bounds");
    println!("    t, tree   <scene>                 Show full node hierarchy");
    println!("    span      <scene>                 Show time span and frame range");
    println!("    x, xform  <name> <scene>          Local and world matrix of a node");
    println!("    c, camera <name> <scene>          Camera lens, field of view and world matrix");
    println!("    s, sample [pattern] <scene>       Resolve geometry (filter by name pattern)");
    println!("    h, help                           Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -f, --frame <F>     Output frame (default: first frame of the scene)");
    println!("    --fps <N>           Frames per second (default: 24)");
    println!("    --interp            Interpolate between samples");
    println!("    --bbox              Read bounding boxes instead of full geometry");
    println!("    -j, --json          JSON output");
    println!("    --settings <FILE>   Reader settings (JSON)");
    println!("    -v, --verbose       Show debug output");
    println!("    -vv, --trace        Show trace output (very verbose)");
    println!("    -q, --quiet         Errors only");
    println!();
    println!("EXAMPLES:");
    println!("    abc-readgeo tree shot.json");
    println!("    abc-readgeo --frame 12.5 --interp xform wheel shot.json");
    println!("    abc-readgeo -f 30 --bbox sample body shot.json");
    println!();
    println!("Log filtering can be overridden with ABC_READGEO_LOG (e.g. ABC_READGEO_LOG=trace).");
}
