//! Audio capture and encoding.
//!
//! Captures PCM samples from the system's input device via cpal, downmixes to
//! mono, and encodes the finished take as AAC in an M4A container via ffmpeg.
//! The encoding policy is fixed (mono, 16 kHz target, lossy AAC) to match what
//! the scoring API expects; it is not user-configurable.

use anyhow::anyhow;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use hound::WavWriter;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex, OnceLock};

use super::ffmpeg::find_ffmpeg;
use super::session::{AudioArtifact, RecordingSession};
use crate::error::ScreenError;

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Capture channel count after downmix. Fixed by the scoring API contract.
const CHANNELS: u16 = 1;

static AUDIO_INIT: OnceLock<()> = OnceLock::new();

/// One-time initialization of the audio subsystem.
///
/// Selects the default host and logs the default input device so device
/// problems show up in the log before the first recording attempt. Safe to
/// call more than once; later calls are no-ops.
pub fn init_audio() {
    AUDIO_INIT.get_or_init(|| {
        let probe = suppress_alsa_warnings(|| {
            let host = cpal::default_host();
            Ok(host.default_input_device().and_then(|d| d.name().ok()))
        });
        match probe {
            Ok(Some(name)) => tracing::info!("Audio subsystem ready, default input: {}", name),
            Ok(None) => tracing::warn!("Audio subsystem ready, but no default input device"),
            Err(e) => tracing::warn!("Audio subsystem probe failed: {}", e),
        }
    });
}

/// Records one utterance from the configured input device.
///
/// Owns the session state machine: `start()` transitions Idle -> Recording,
/// `stop()` finalizes the capture and yields the immutable [`AudioArtifact`].
/// Multi-channel input is averaged down to mono in the stream callback.
pub struct Recorder {
    session: RecordingSession,
    /// Actual recording sample rate, updated from the device on start.
    sample_rate: u32,
    /// Recorded audio samples (i16 PCM mono).
    samples: Arc<Mutex<Vec<i16>>>,
    /// Active input stream, kept alive while recording.
    stream: Option<cpal::Stream>,
    /// Device name or "default" for the system default device.
    device_name: String,
}

impl Recorder {
    /// Creates a recorder targeting the given sample rate and device.
    ///
    /// The actual rate may differ based on device capabilities; the artifact
    /// records whatever rate the capture really used.
    pub fn new(requested_sample_rate: u32, device_name: String) -> Self {
        Self {
            session: RecordingSession::new(),
            sample_rate: requested_sample_rate,
            samples: Arc::new(Mutex::new(Vec::new())),
            stream: None,
            device_name,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_recording()
    }

    /// Whole seconds since the current recording began; 0 when not recording.
    pub fn elapsed_seconds(&self) -> u64 {
        self.session.elapsed_seconds()
    }

    /// Starts capturing from the input device.
    ///
    /// # Errors
    /// - `RecordingFailure` if a recording is already in progress
    /// - `PermissionDenied` if no input device is available or it refuses to open
    /// - `RecordingFailure` for other capture setup errors; the session resets
    ///   to Idle and the screen keeps running
    pub fn start(&mut self) -> Result<(), ScreenError> {
        self.session.begin()?;

        match self.open_stream() {
            Ok(()) => Ok(()),
            Err(e) => {
                self.session.reset();
                self.stream = None;
                Err(e)
            }
        }
    }

    fn open_stream(&mut self) -> Result<(), ScreenError> {
        let device = suppress_alsa_warnings(|| {
            let host = cpal::default_host();
            if self.device_name == "default" {
                host.default_input_device()
                    .ok_or_else(|| anyhow!("no audio input device available"))
            } else {
                find_device_by_name(&host, &self.device_name)
            }
        })
        .map_err(|e| ScreenError::PermissionDenied(e.to_string()))?;

        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Recording device: {}", device_name);

        let device_config = device
            .default_input_config()
            .map_err(|e| ScreenError::PermissionDenied(e.to_string()))?;
        let device_sample_rate = device_config.sample_rate().0;
        let num_channels = device_config.channels() as usize;

        if device_sample_rate != self.sample_rate {
            tracing::warn!(
                "Requested sample rate {}Hz but device uses {}Hz. Recording at device rate.",
                self.sample_rate,
                device_sample_rate
            );
        }

        self.sample_rate = device_sample_rate;
        self.samples.lock().unwrap().clear();

        let samples_arc = Arc::clone(&self.samples);
        let stream = device
            .build_input_stream(
                &device_config.into(),
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    downmix_into(data, &samples_arc, num_channels);
                },
                |err| {
                    tracing::error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| ScreenError::RecordingFailure(e.to_string()))?;

        stream
            .play()
            .map_err(|e| ScreenError::RecordingFailure(e.to_string()))?;
        self.stream = Some(stream);

        tracing::debug!(
            "Audio stream started: {}Hz, {} channels downmixed to mono",
            device_sample_rate,
            num_channels
        );
        Ok(())
    }

    /// Stops the capture, encodes the take, and yields the artifact.
    ///
    /// The samples are written to a temporary WAV and converted to AAC/M4A
    /// with ffmpeg. On any failure the session resets to Idle and no artifact
    /// is produced.
    ///
    /// # Errors
    /// - `RecordingFailure` if nothing is recording, no samples were captured,
    ///   or encoding fails
    pub fn stop(&mut self) -> Result<AudioArtifact, ScreenError> {
        self.session.finish()?;
        self.stream = None;

        match self.finalize() {
            Ok(artifact) => Ok(artifact),
            Err(e) => {
                self.session.reset();
                Err(ScreenError::RecordingFailure(e.to_string()))
            }
        }
    }

    /// Discards the current recording without producing an artifact.
    pub fn cancel(&mut self) {
        self.stream = None;
        self.samples.lock().unwrap().clear();
        self.session.reset();
        tracing::debug!("Recording cancelled, samples discarded");
    }

    fn finalize(&mut self) -> anyhow::Result<AudioArtifact> {
        let samples = std::mem::take(&mut *self.samples.lock().unwrap());

        if samples.is_empty() {
            return Err(anyhow!("no samples captured"));
        }

        let duration_millis = samples.len() as u64 * 1000 / self.sample_rate as u64;
        tracing::info!(
            "Recording stopped: {:.2}s ({} samples at {}Hz)",
            duration_millis as f64 / 1000.0,
            samples.len(),
            self.sample_rate
        );

        let temp_wav = temp_path("wav");
        let output_path = temp_path("m4a");

        self.save_wav(&samples, &temp_wav)?;
        encode_aac(&temp_wav, &output_path)?;

        if let Err(e) = std::fs::remove_file(&temp_wav) {
            tracing::debug!("Failed to remove temp file: {}", e);
        }

        let file_size = std::fs::metadata(&output_path)?.len();
        tracing::info!(
            "Recording saved: {} ({} bytes)",
            output_path.display(),
            file_size
        );

        Ok(AudioArtifact {
            path: output_path,
            encoding: "aac",
            sample_rate: self.sample_rate,
            channels: CHANNELS,
            duration_millis,
        })
    }

    /// Writes the captured samples as an uncompressed PCM WAV intermediate.
    fn save_wav(&self, samples: &[i16], path: &Path) -> anyhow::Result<()> {
        let wav_spec = hound::WavSpec {
            channels: CHANNELS,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = WavWriter::create(path, wav_spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;

        tracing::debug!("Temporary WAV created: {}", path.display());
        Ok(())
    }
}

/// Downmixes incoming device samples to mono and appends them to the buffer.
fn downmix_into(data: &[i16], samples_arc: &Arc<Mutex<Vec<i16>>>, num_channels: usize) {
    let mut samples = samples_arc.lock().unwrap();

    match num_channels {
        1 => samples.extend_from_slice(data),
        _ => {
            for chunk in data.chunks_exact(num_channels) {
                let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
                samples.push((sum / num_channels as i32) as i16);
            }
        }
    }
}

/// Converts the intermediate WAV to mono 16 kHz AAC in an M4A container.
fn encode_aac(input_wav: &Path, output_path: &Path) -> anyhow::Result<()> {
    let ffmpeg_path = find_ffmpeg()?;

    let output = Command::new(&ffmpeg_path)
        .arg("-loglevel")
        .arg("error")
        .arg("-i")
        .arg(input_wav)
        .arg("-acodec")
        .arg("aac")
        .arg("-ac")
        .arg("1")
        .arg("-ar")
        .arg("16000")
        .arg("-y")
        .arg(output_path)
        .output()?;

    if output.status.success() {
        tracing::debug!("Audio encoded to AAC: {}", output_path.display());
        Ok(())
    } else {
        let error_msg = String::from_utf8_lossy(&output.stderr);
        tracing::error!("ffmpeg encoding failed: {}", error_msg);
        Err(anyhow!("audio encoding failed: {error_msg}"))
    }
}

fn temp_path(extension: &str) -> PathBuf {
    std::env::temp_dir().join(format!("prate-recording-{}.{}", std::process::id(), extension))
}

/// Finds an audio input device by name or numeric index.
fn find_device_by_name(host: &cpal::Host, device_spec: &str) -> anyhow::Result<cpal::Device> {
    if let Ok(index) = device_spec.parse::<usize>() {
        let devices: Vec<_> = host
            .input_devices()
            .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?
            .collect();

        let count = devices.len();
        return devices.into_iter().nth(index).ok_or_else(|| {
            anyhow!(
                "Device index {} is out of range (0-{})",
                index,
                count.saturating_sub(1)
            )
        });
    }

    let devices = host
        .input_devices()
        .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?;

    for device in devices {
        if let Ok(name) = device.name() {
            if name == device_spec {
                return Ok(device);
            }
        }
    }

    Err(anyhow!(
        "Audio input device '{device_spec}' not found. Use 'prate list-devices' to see available devices."
    ))
}

/// Temporarily redirects stderr to /dev/null to suppress ALSA library warnings on Linux.
/// On non-Linux platforms, this is a no-op since ALSA doesn't exist.
#[cfg(target_os = "linux")]
pub(crate) fn suppress_alsa_warnings<F, T>(f: F) -> anyhow::Result<T>
where
    F: FnOnce() -> anyhow::Result<T>,
{
    let dev_null = OpenOptions::new()
        .write(true)
        .open("/dev/null")
        .map_err(|e| anyhow!("Failed to open /dev/null: {e}"))?;

    let dev_null_fd = dev_null.as_raw_fd();

    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(anyhow!("Failed to duplicate stderr"));
    }

    let redirect_result = unsafe { libc::dup2(dev_null_fd, libc::STDERR_FILENO) };
    if redirect_result == -1 {
        unsafe { libc::close(old_stderr) };
        return Err(anyhow!("Failed to redirect stderr"));
    }

    let result = f();

    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

/// On non-Linux platforms, no stderr suppression is needed since ALSA doesn't exist.
#[cfg(not(target_os = "linux"))]
pub(crate) fn suppress_alsa_warnings<F, T>(f: F) -> anyhow::Result<T>
where
    F: FnOnce() -> anyhow::Result<T>,
{
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_passes_mono_through() {
        let samples = Arc::new(Mutex::new(Vec::new()));
        downmix_into(&[1, 2, 3], &samples, 1);
        assert_eq!(*samples.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn downmix_averages_stereo_pairs() {
        let samples = Arc::new(Mutex::new(Vec::new()));
        downmix_into(&[100, 200, -50, 50], &samples, 2);
        assert_eq!(*samples.lock().unwrap(), vec![150, 0]);
    }

    #[test]
    fn downmix_averages_all_channels() {
        let samples = Arc::new(Mutex::new(Vec::new()));
        downmix_into(&[30, 60, 90], &samples, 3);
        assert_eq!(*samples.lock().unwrap(), vec![60]);
    }
}
