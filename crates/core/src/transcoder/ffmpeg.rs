//! FFmpeg-based transcoder implementation.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::error::TranscodeError;
use super::traits::Transcoder;
use super::types::{EncodingProfile, MediaInfo, TranscodeReport};
use crate::artifact::Artifact;
use crate::config::TranscoderConfig;

/// Upper bound on ffmpeg error text kept for the caller.
const MAX_ERROR_LINES: usize = 20;

/// Transcoder that pipes the input into an ffmpeg child process.
pub struct FfmpegTranscoder {
    config: TranscoderConfig,
    profile: EncodingProfile,
}

impl FfmpegTranscoder {
    /// Creates a new FFmpeg transcoder with the given configuration.
    pub fn new(config: TranscoderConfig) -> Self {
        Self {
            config,
            profile: EncodingProfile::OPUS,
        }
    }

    /// Creates a transcoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(TranscoderConfig::default())
    }

    pub fn config(&self) -> &TranscoderConfig {
        &self.config
    }

    /// Builds ffmpeg arguments: input from stdin, output to `output_path`.
    fn build_args(&self, output_path: &Path) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-nostats".to_string(),
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
            "-y".to_string(), // Overwrite output
            "-i".to_string(),
            "pipe:0".to_string(),
        ];

        args.extend(self.profile.to_ffmpeg_args());
        args.extend(self.config.extra_ffmpeg_args.iter().cloned());
        args.push(output_path.to_string_lossy().to_string());

        args
    }

    fn spawn_error(&self, e: std::io::Error) -> TranscodeError {
        if e.kind() == std::io::ErrorKind::NotFound {
            TranscodeError::FfmpegNotFound {
                path: self.config.ffmpeg_path.clone(),
            }
        } else {
            TranscodeError::Io(e)
        }
    }

    /// Turns a non-zero exit into the message shown to the caller.
    fn failure_reason(code: Option<i32>, stderr_lines: &[String]) -> String {
        let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
        if stderr_lines.is_empty() {
            format!("ffmpeg exited with code {}", code)
        } else {
            format!("ffmpeg exited with code {}: {}", code, stderr_lines.join("\n"))
        }
    }

    /// Parses ffprobe JSON output into MediaInfo.
    fn parse_probe_output(path: &Path, output: &str) -> Result<MediaInfo, TranscodeError> {
        #[derive(Deserialize)]
        struct ProbeOutput {
            format: ProbeFormat,
            #[serde(default)]
            streams: Vec<ProbeStream>,
        }

        #[derive(Deserialize)]
        struct ProbeFormat {
            format_name: String,
            duration: Option<String>,
            size: Option<String>,
            bit_rate: Option<String>,
        }

        #[derive(Deserialize)]
        struct ProbeStream {
            codec_type: String,
            codec_name: Option<String>,
            bit_rate: Option<String>,
            sample_rate: Option<String>,
            channels: Option<u8>,
        }

        let probe: ProbeOutput =
            serde_json::from_str(output).map_err(|e| TranscodeError::ParseError {
                reason: format!("Failed to parse ffprobe output: {}", e),
            })?;

        let parse_kbps = |b: &String| b.parse::<u32>().ok().map(|b| b / 1000);

        let audio_stream = probe.streams.iter().find(|s| s.codec_type == "audio");

        // Ogg streams usually lack a per-stream bitrate; fall back to the
        // container's overall rate.
        let audio_bitrate_kbps = audio_stream
            .and_then(|s| s.bit_rate.as_ref())
            .and_then(parse_kbps)
            .or_else(|| probe.format.bit_rate.as_ref().and_then(parse_kbps));

        Ok(MediaInfo {
            path: path.to_path_buf(),
            size_bytes: probe
                .format
                .size
                .as_ref()
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(0),
            duration_secs: probe
                .format
                .duration
                .as_ref()
                .and_then(|d| d.parse::<f64>().ok())
                .unwrap_or(0.0),
            format: probe
                .format
                .format_name
                .split(',')
                .next()
                .unwrap_or("unknown")
                .to_string(),
            audio_codec: audio_stream.and_then(|s| s.codec_name.clone()),
            audio_bitrate_kbps,
            audio_sample_rate: audio_stream
                .and_then(|s| s.sample_rate.as_ref())
                .and_then(|r| r.parse::<u32>().ok()),
            audio_channels: audio_stream.and_then(|s| s.channels),
        })
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn profile(&self) -> EncodingProfile {
        self.profile
    }

    async fn transcode(
        &self,
        input: Bytes,
        artifact: &Artifact,
    ) -> Result<TranscodeReport, TranscodeError> {
        let start = Instant::now();
        let args = self.build_args(artifact.path());
        debug!(artifact = %artifact.file_name(), ?args, "Spawning ffmpeg");

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| TranscodeError::failed("ffmpeg stdin was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| TranscodeError::failed("ffmpeg stderr was not captured"))?;

        // Feed stdin and drain stderr together: ffmpeg can block on a full
        // stderr pipe, and it stops reading stdin early on bad input.
        let feed = async move {
            let written = stdin.write_all(&input).await;
            drop(stdin);
            match written {
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
                other => other,
            }
        };
        let drain = async {
            let mut lines = BufReader::new(stderr).lines();
            let mut kept = Vec::new();
            while let Ok(Some(line)) = lines.next_line().await {
                if kept.len() < MAX_ERROR_LINES && !line.trim().is_empty() {
                    kept.push(line);
                }
            }
            kept
        };
        let run = async {
            let (fed, stderr_lines) = tokio::join!(feed, drain);
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, fed, stderr_lines))
        };

        let result = match self.config.timeout_secs {
            Some(secs) => timeout(Duration::from_secs(secs), run)
                .await
                .map_err(|_| secs),
            None => Ok(run.await),
        };

        let (status, fed, stderr_lines) = match result {
            Ok(finished) => finished?,
            Err(secs) => {
                // Kill the process on timeout
                let _ = child.kill().await;
                return Err(TranscodeError::Timeout { timeout_secs: secs });
            }
        };
        if !status.success() {
            return Err(TranscodeError::failed(Self::failure_reason(
                status.code(),
                &stderr_lines,
            )));
        }
        fed?;

        let output_meta = tokio::fs::metadata(artifact.path())
            .await
            .map_err(|_| TranscodeError::EmptyOutput)?;
        if output_meta.len() == 0 {
            return Err(TranscodeError::EmptyOutput);
        }

        Ok(TranscodeReport {
            output_size_bytes: output_meta.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn probe(&self, path: &Path) -> Result<MediaInfo, TranscodeError> {
        let output = Command::new(&self.config.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TranscodeError::FfprobeNotFound {
                        path: self.config.ffprobe_path.clone(),
                    }
                } else {
                    TranscodeError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(TranscodeError::probe_failed(format!(
                "ffprobe failed on {}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        Self::parse_probe_output(path, &String::from_utf8_lossy(&output.stdout))
    }

    async fn validate(&self) -> Result<(), TranscodeError> {
        Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        Command::new(&self.config.ffprobe_path)
            .arg("-version")
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TranscodeError::FfprobeNotFound {
                        path: self.config.ffprobe_path.clone(),
                    }
                } else {
                    TranscodeError::Io(e)
                }
            })?;

        tokio::fs::create_dir_all(&self.config.artifact_dir).await?;

        Ok(())
    }
}
