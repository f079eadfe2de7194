use super::{audio_stream_args, input_args, video_stream_args, ArgumentBuilder, EncodePlan};
use mosaic_av::args;

/// DASH with fragmented-MP4 (CMAF) segments.
///
/// Writes `manifest.mpd`, `init-stream<id>.m4s` initialization segments and
/// `chunk-stream<id>-<n>.m4s` media segments into the output directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct DashCmaf;

impl ArgumentBuilder for DashCmaf {
    fn name(&self) -> &'static str {
        "dash"
    }

    fn build_args(&self, plan: &EncodePlan) -> Vec<String> {
        let mut cmd = input_args(plan);

        for (i, r) in plan.renditions.iter().enumerate() {
            cmd.extend(args(["-map", "0:v:0"]));
            cmd.extend(video_stream_args(plan, i, r));
            cmd.push(format!("-s:v:{}", i));
            cmd.push(format!("{}x{}", r.width, r.height));
        }

        if plan.info.has_audio {
            for i in 0..plan.renditions.len() {
                cmd.extend(audio_stream_args(i, "0:a:0"));
            }
        }

        let segment = plan.profile.segment_duration.to_string();
        cmd.extend(args([
            "-f",
            "dash",
            "-seg_duration",
            segment.as_str(),
            "-use_template",
            "1",
            "-use_timeline",
            "1",
            "-init_seg_name",
            "init-stream$RepresentationID$.m4s",
            "-media_seg_name",
            "chunk-stream$RepresentationID$-$Number$.m4s",
            "-adaptation_sets",
            adaptation_sets(plan.info.has_audio),
        ]));

        if plan.profile.low_latency {
            cmd.extend(args(["-ldash", "1", "-streaming", "1"]));
        }

        cmd.push(plan.output_path("manifest.mpd"));
        cmd
    }
}

fn adaptation_sets(has_audio: bool) -> &'static str {
    if has_audio {
        "id=0,streams=v id=1,streams=a"
    } else {
        "id=0,streams=v"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::tests::{plan, value_after};
    use mosaic_common::{GpuBackend, Profile};

    #[test]
    fn test_vod_layout() {
        let args = DashCmaf.build_args(&plan(true, Profile::VOD));

        assert_eq!(value_after(&args, "-f"), Some("dash"));
        assert_eq!(value_after(&args, "-seg_duration"), Some("5"));
        assert_eq!(value_after(&args, "-use_template"), Some("1"));
        assert_eq!(value_after(&args, "-use_timeline"), Some("1"));
        assert_eq!(
            value_after(&args, "-init_seg_name"),
            Some("init-stream$RepresentationID$.m4s")
        );
        assert_eq!(
            value_after(&args, "-media_seg_name"),
            Some("chunk-stream$RepresentationID$-$Number$.m4s")
        );
        assert_eq!(
            value_after(&args, "-adaptation_sets"),
            Some("id=0,streams=v id=1,streams=a")
        );
        assert_eq!(value_after(&args, "-s:v:0"), Some("1920x1080"));
        assert_eq!(value_after(&args, "-s:v:1"), Some("1280x720"));
        assert_eq!(args.last().map(String::as_str), Some("/out/manifest.mpd"));
        assert!(!args.contains(&"-ldash".to_string()));

        let video_maps = args.iter().filter(|a| *a == "0:v:0").count();
        let audio_maps = args.iter().filter(|a| *a == "0:a:0").count();
        assert_eq!(video_maps, 2);
        assert_eq!(audio_maps, 2);
    }

    #[test]
    fn test_live_without_audio() {
        let args = DashCmaf.build_args(&plan(false, Profile::LIVE));

        assert_eq!(value_after(&args, "-seg_duration"), Some("2"));
        assert_eq!(value_after(&args, "-adaptation_sets"), Some("id=0,streams=v"));
        assert_eq!(value_after(&args, "-ldash"), Some("1"));
        assert_eq!(value_after(&args, "-streaming"), Some("1"));
        assert!(!args.contains(&"aac".to_string()));
    }

    #[test]
    fn test_hardware_encoders() {
        for (gpu, encoder) in [
            (GpuBackend::Nvenc, "h264_nvenc"),
            (GpuBackend::Vaapi, "h264_vaapi"),
            (GpuBackend::VideoToolbox, "h264_videotoolbox"),
        ] {
            let mut p = plan(false, Profile::VOD);
            p.options.gpu = gpu;
            let args = DashCmaf.build_args(&p);
            assert_eq!(value_after(&args, "-c:v:0"), Some(encoder));
            assert_eq!(value_after(&args, "-c:v:1"), Some(encoder));
        }
    }

    #[test]
    fn test_threads_and_progress() {
        let mut p = plan(false, Profile::VOD);
        p.options.threads = 4;
        p.options.log_level = "error".into();
        p.progress = true;
        let args = DashCmaf.build_args(&p);
        assert_eq!(value_after(&args, "-threads"), Some("4"));
        assert_eq!(value_after(&args, "-loglevel"), Some("error"));
        assert_eq!(value_after(&args, "-progress"), Some("pipe:1"));
    }
}
