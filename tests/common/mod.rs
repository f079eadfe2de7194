//! Shared test harness for integration tests.
//!
//! Provides scripted ffprobe/ffmpeg responses for a [`MockExecutor`] and a
//! progress recorder, so pipeline tests never touch real binaries.

#![allow(dead_code)]

use mosaic::{MockExecutor, MockResponse, PackageOptions, Packager, ProgressInfo};
use std::sync::{Arc, Mutex};

/// ffprobe JSON for the first video stream.
pub fn video_json(width: u32, height: u32, rate: &str, rotation: i32, duration: f64) -> String {
    format!(
        r#"{{
            "streams": [{{
                "width": {width},
                "height": {height},
                "avg_frame_rate": "{rate}",
                "codec_name": "h264",
                "side_data_list": [{{"rotation": {rotation}}}]
            }}],
            "format": {{"duration": "{duration:.6}"}}
        }}"#
    )
}

/// ffprobe CSV answer to the audio-stream request.
pub fn audio_csv(has_audio: bool) -> &'static str {
    if has_audio {
        "1\n"
    } else {
        ""
    }
}

/// A source with the usual landscape metadata.
pub struct Source {
    pub width: u32,
    pub height: u32,
    pub rotation: i32,
    pub has_audio: bool,
    pub duration: f64,
}

impl Default for Source {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            rotation: 0,
            has_audio: true,
            duration: 10.0,
        }
    }
}

impl Source {
    /// Mock answering the two probe requests for this source, then any
    /// ffmpeg call with `ffmpeg`.
    pub fn executor(&self, ffmpeg: MockResponse) -> MockExecutor {
        let mock = MockExecutor::new()
            .with_response(
                "ffprobe",
                MockResponse::ok(video_json(
                    self.width,
                    self.height,
                    "30/1",
                    self.rotation,
                    self.duration,
                )),
            )
            .with_response("ffprobe", MockResponse::ok(audio_csv(self.has_audio)));
        mock.push_response("ffmpeg", ffmpeg);
        mock
    }
}

/// Packager sharing `mock` with the test so calls can be inspected.
pub fn packager(mock: &Arc<MockExecutor>, options: PackageOptions) -> Packager {
    Packager::new(mock.clone(), options)
}

/// One ffmpeg `-progress` block.
pub fn progress_chunk(out_time: &str, out_time_us: u64, state: &str) -> String {
    format!(
        "frame=100\nbitrate=2500.0kbits/s\nout_time_us={}\nout_time={}\nspeed=1.5x\nprogress={}\n",
        out_time_us, out_time, state
    )
}

/// Records every progress report it receives.
#[derive(Clone, Default)]
pub struct ProgressLog(Arc<Mutex<Vec<ProgressInfo>>>);

impl ProgressLog {
    pub fn handler(&self) -> impl Fn(ProgressInfo) + Send + Sync + 'static {
        let log = self.0.clone();
        move |info| log.lock().unwrap().push(info)
    }

    pub fn entries(&self) -> Vec<ProgressInfo> {
        self.0.lock().unwrap().clone()
    }
}

/// Value following `flag` in an argument list.
pub fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}
