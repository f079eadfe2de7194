use super::{audio_stream_args, input_args, video_stream_args, ArgumentBuilder, EncodePlan};
use mosaic_av::args;
use mosaic_common::Rendition;

/// HLS with fragmented-MP4 (CMAF) segments.
///
/// Writes `master.m3u8`, one `stream_<n>.m3u8` per rendition and
/// `seg_<n>_<k>.m4s` segments into the output directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct HlsCmaf;

impl ArgumentBuilder for HlsCmaf {
    fn name(&self) -> &'static str {
        "hls"
    }

    fn build_args(&self, plan: &EncodePlan) -> Vec<String> {
        let mut cmd = input_args(plan);
        cmd.push("-filter_complex".to_string());
        cmd.push(filter_graph(&plan.renditions));

        for (i, r) in plan.renditions.iter().enumerate() {
            cmd.push("-map".to_string());
            cmd.push(format!("[v{}o]", i));
            cmd.extend(video_stream_args(plan, i, r));
        }

        if plan.info.has_audio {
            for i in 0..plan.renditions.len() {
                cmd.extend(audio_stream_args(i, "a:0"));
            }
        }

        let segment = plan.profile.segment_duration.to_string();
        let playlist_type = if plan.profile.low_latency {
            "event"
        } else {
            "vod"
        };
        cmd.extend(args([
            "-f",
            "hls",
            "-hls_segment_type",
            "fmp4",
            "-hls_playlist_type",
            playlist_type,
            "-hls_time",
            segment.as_str(),
        ]));

        if plan.profile.low_latency {
            cmd.extend(args([
                "-hls_part_size",
                "0.5",
                "-hls_flags",
                "independent_segments+split_by_time",
            ]));
        } else {
            cmd.extend(args(["-hls_flags", "independent_segments"]));
        }

        cmd.extend(args([
            "-hls_segment_filename".to_string(),
            plan.output_path("seg_%v_%d.m4s"),
            "-master_pl_name".to_string(),
            "master.m3u8".to_string(),
            "-var_stream_map".to_string(),
            var_stream_map(plan.renditions.len(), plan.info.has_audio),
            plan.output_path("stream_%v.m3u8"),
        ]));

        cmd
    }
}

/// Split the source video once per rendition, then scale, letterbox and
/// square the pixels of each branch. Branch `i` is labelled `[v{i}o]`.
pub fn filter_graph(renditions: &[Rendition]) -> String {
    let mut graph = format!("[0:v]split={}", renditions.len());
    for i in 0..renditions.len() {
        graph.push_str(&format!("[v{}]", i));
    }

    for (i, r) in renditions.iter().enumerate() {
        graph.push_str(&format!(
            ";[v{i}]scale={w}:{h}:force_original_aspect_ratio=decrease,\
             pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,setsar=1[v{i}o]",
            i = i,
            w = r.width,
            h = r.height,
        ));
    }

    graph
}

/// Group output streams into HLS variants, e.g. `v:0,a:0 v:1,a:1`.
pub fn var_stream_map(variants: usize, has_audio: bool) -> String {
    (0..variants)
        .map(|i| {
            if has_audio {
                format!("v:{},a:{}", i, i)
            } else {
                format!("v:{}", i)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
