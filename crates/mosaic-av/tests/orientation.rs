//! Orientation normalization against a scripted executor.

use mosaic_av::{
    normalize_orientation, Error, ExecContext, MockExecutor, MockResponse, NormalizeOutcome,
    OrientationPhase,
};
use std::path::Path;

fn probe_json(codec: &str, rotation: i32) -> String {
    format!(
        r#"{{"streams":[{{"width":1920,"height":1080,"codec_name":"{}","side_data_list":[{{"rotation":{}}}]}}]}}"#,
        codec, rotation
    )
}

fn leftover_temp_files(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(".mosaic-orientation-"))
        .collect()
}

#[tokio::test]
async fn rotated_source_is_reencoded_and_verified() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("upright.mp4");

    let mock = MockExecutor::new()
        .with_response("ffprobe", MockResponse::ok(probe_json("h264", 90)))
        .with_response("ffprobe", MockResponse::ok(probe_json("h264", 0)))
        .with_response("ffmpeg", MockResponse::ok(""));

    let outcome = normalize_orientation(&ExecContext::new(), &mock, "in.mp4", &output)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        NormalizeOutcome::Rotated {
            rotation: 90,
            encoder: "libx264".into()
        }
    );
    assert!(output.exists());
    assert!(leftover_temp_files(dir.path()).is_empty());

    let calls = mock.calls();
    let names: Vec<&str> = calls.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["ffprobe", "ffmpeg", "ffprobe"]);

    let ffmpeg = &calls[1].args;
    assert!(ffmpeg.contains(&"-noautorotate".to_string()));
    assert!(ffmpeg.contains(&"transpose=1".to_string()));
    assert!(ffmpeg.contains(&"rotate=0".to_string()));

    // the verification probe targets the temp file, not the input
    let verified = calls[2].args.last().unwrap();
    assert!(verified.contains(".mosaic-orientation-"));
    assert!(verified.ends_with(".mp4"));
}

#[tokio::test]
async fn unrotated_source_is_stream_copied() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out").join("copy.mov");

    let mock = MockExecutor::new()
        .with_response("ffprobe", MockResponse::ok(probe_json("hevc", 0)))
        .with_response("ffmpeg", MockResponse::ok(""));

    let outcome = normalize_orientation(&ExecContext::new(), &mock, "in.mov", &output)
        .await
        .unwrap();

    assert_eq!(outcome, NormalizeOutcome::Remuxed);
    assert!(output.exists());
    assert_eq!(mock.call_count("ffprobe"), 1);
    assert_eq!(mock.call_count("ffmpeg"), 1);

    let args = &mock.calls()[1].args;
    assert!(args.windows(2).any(|w| w == ["-c", "copy"]));
    assert!(!args.contains(&"-noautorotate".to_string()));
}

#[tokio::test]
async fn failed_preferred_encoder_falls_back_to_libx264() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("upright.mp4");

    let mock = MockExecutor::new()
        .with_response("ffprobe", MockResponse::ok(probe_json("hevc", 270)))
        .with_response("ffprobe", MockResponse::ok(probe_json("h264", 0)))
        .with_response("ffmpeg", MockResponse::failed(1, "Unknown encoder 'libx265'"))
        .with_response("ffmpeg", MockResponse::ok(""));

    let outcome = normalize_orientation(&ExecContext::new(), &mock, "in.mp4", &output)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        NormalizeOutcome::Rotated {
            rotation: 270,
            encoder: "libx264".into()
        }
    );

    let encoders: Vec<String> = mock
        .calls()
        .iter()
        .filter(|c| c.name == "ffmpeg")
        .map(|c| {
            let pos = c.args.iter().position(|a| a == "-c:v").unwrap();
            c.args[pos + 1].clone()
        })
        .collect();
    assert_eq!(encoders, vec!["libx265", "libx264"]);
}

#[tokio::test]
async fn failed_default_encoder_is_not_retried() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("upright.mp4");

    let mock = MockExecutor::new()
        .with_response("ffprobe", MockResponse::ok(probe_json("h264", 180)))
        .with_response("ffmpeg", MockResponse::failed(1, "disk full"));

    let err = normalize_orientation(&ExecContext::new(), &mock, "in.mp4", &output)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Orientation {
            phase: OrientationPhase::Encode,
            ..
        }
    ));
    assert_eq!(mock.call_count("ffmpeg"), 1);
    assert!(!output.exists());
    assert!(leftover_temp_files(dir.path()).is_empty());
}

#[tokio::test]
async fn remaining_rotation_fails_verification() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("upright.mp4");

    let mock = MockExecutor::new()
        .with_response("ffprobe", MockResponse::ok(probe_json("h264", 90)))
        .with_response("ffprobe", MockResponse::ok(probe_json("h264", 90)))
        .with_response("ffmpeg", MockResponse::ok(""));

    let err = normalize_orientation(&ExecContext::new(), &mock, "in.mp4", &output)
        .await
        .unwrap_err();

    match err {
        Error::Orientation {
            phase: OrientationPhase::Verify,
            source,
        } => assert!(matches!(*source, Error::Verification { rotation: 90 })),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!output.exists());
    assert!(leftover_temp_files(dir.path()).is_empty());
}

#[tokio::test]
async fn probe_failure_reports_probe_phase() {
    let dir = tempfile::tempdir().unwrap();
    let mock = MockExecutor::new().with_response("ffprobe", MockResponse::failed(1, "moov atom not found"));

    let err = normalize_orientation(&ExecContext::new(), &mock, "in.mp4", &dir.path().join("o.mp4"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Orientation {
            phase: OrientationPhase::Probe,
            ..
        }
    ));
    assert_eq!(mock.call_count("ffmpeg"), 0);
}

#[tokio::test]
async fn empty_paths_are_rejected() {
    let mock = MockExecutor::new();
    let ctx = ExecContext::new();

    let err = normalize_orientation(&ctx, &mock, "  ", Path::new("out.mp4"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));

    let err = normalize_orientation(&ctx, &mock, "in.mp4", Path::new(""))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));

    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn cancellation_is_not_wrapped() {
    let dir = tempfile::tempdir().unwrap();
    let mock = MockExecutor::new().with_response("ffprobe", MockResponse::ok(probe_json("h264", 90)));
    let ctx = ExecContext::new();
    ctx.cancel();

    let err = normalize_orientation(&ctx, &mock, "in.mp4", &dir.path().join("o.mp4"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled { .. }));
}
