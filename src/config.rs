//! Run configuration: format/extension contract and validated settings.
//!
//! A [`RunConfig`] is built once from CLI-resolved values, validated, and
//! threaded immutably through the rest of the run. Nothing downstream reads
//! ambient state.

use std::path::PathBuf;

use crate::error::{ConfigError, ValidationError};
use crate::logging::Logger;
use crate::manifest::Record;

/// Extensions accepted for video and combined formats.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "webm"];

/// Extensions accepted for the audio-only format.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "aac", "opus", "wav", "flac"];

/// Tokens recognised by [`MediaFormat::parse`], for error messages.
const FORMAT_TOKENS: &[&str] = &[
    "ba",
    "bestaudio",
    "bv",
    "bestvideo",
    "ba+bv",
    "bestaudio+bestvideo",
];

/// Canonical media format resolved from a CLI format token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    /// Best audio stream only (`ba`, `bestaudio`).
    Audio,
    /// Best video stream only (`bv`, `bestvideo`).
    Video,
    /// Best audio and video merged (`ba+bv`, `bestaudio+bestvideo`).
    AudioVideo,
}

impl MediaFormat {
    /// Normalize a CLI format token to a canonical format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownFormat`] for unrecognised tokens.
    pub fn parse(token: &str) -> Result<Self, ValidationError> {
        match token {
            "ba" | "bestaudio" => Ok(Self::Audio),
            "bv" | "bestvideo" => Ok(Self::Video),
            "ba+bv" | "bestaudio+bestvideo" => Ok(Self::AudioVideo),
            _ => Err(ValidationError::UnknownFormat {
                token: token.to_string(),
                valid: FORMAT_TOKENS.join(", "),
            }),
        }
    }

    /// The extension set this format can produce.
    #[must_use]
    pub const fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            Self::Audio => AUDIO_EXTENSIONS,
            Self::Video | Self::AudioVideo => VIDEO_EXTENSIONS,
        }
    }

    /// The yt-dlp `-f` selector string for this format.
    #[must_use]
    pub const fn selector(self) -> &'static str {
        match self {
            Self::Audio => "bestaudio/best",
            Self::Video => "bestvideo/best",
            Self::AudioVideo => "bestvideo+bestaudio/best",
        }
    }

    /// Whether output is audio-only (drives `--extract-audio` vs merge).
    #[must_use]
    pub const fn is_audio_only(self) -> bool {
        matches!(self, Self::Audio)
    }

    /// Human-readable name used in incompatibility messages.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Audio => "audio-only",
            Self::Video => "video",
            Self::AudioVideo => "audio+video",
        }
    }
}

impl std::fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = match self {
            Self::Audio => "ba",
            Self::Video => "bv",
            Self::AudioVideo => "ba+bv",
        };
        write!(f, "{token}")
    }
}

/// Validated, immutable settings for one orchestration run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Path to the manifest file.
    pub input_path: PathBuf,
    /// Directory receiving one output file per record.
    pub output_dir: PathBuf,
    /// Resolved media format.
    pub format: MediaFormat,
    /// Output container/codec extension; a member of the format's allowed set.
    pub extension: String,
    /// Additional attempts after the first failed one (0 = no retries).
    pub retry_count: u32,
    /// Pause between attempts and between records, in seconds.
    pub delay_seconds: u64,
    /// Process only the first N manifest records when set.
    pub item_limit: Option<usize>,
    /// Simulate without invoking external tools or touching the filesystem.
    pub dry_run: bool,
}

impl RunConfig {
    /// Validate raw option values into an immutable config.
    ///
    /// `retry_count` and `delay_seconds` arrive already shaped as
    /// non-negative integers by the argument layer; the semantic rules owned
    /// here are format normalization, format/extension compatibility, and
    /// the positivity of `item_limit`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] identifying the offending option.
    pub fn build(
        input_path: PathBuf,
        output_dir: PathBuf,
        format_token: &str,
        extension: &str,
        retry_count: u32,
        delay_seconds: u64,
        item_limit: Option<u64>,
        dry_run: bool,
    ) -> Result<Self, ValidationError> {
        let format = MediaFormat::parse(format_token)?;

        if !format.allowed_extensions().contains(&extension) {
            return Err(ValidationError::IncompatibleExtension {
                extension: extension.to_string(),
                format: format.describe().to_string(),
                allowed: format.allowed_extensions().join(", "),
            });
        }

        let item_limit = match item_limit {
            Some(0) => return Err(ValidationError::InvalidItemLimit(0)),
            Some(n) => Some(usize::try_from(n).map_err(|_| ValidationError::InvalidItemLimit(n))?),
            None => None,
        };

        Ok(Self {
            input_path,
            output_dir,
            format,
            extension: extension.to_string(),
            retry_count,
            delay_seconds,
            item_limit,
            dry_run,
        })
    }

    /// The output file a record resolves to: `<output_dir>/<name>.<extension>`.
    #[must_use]
    pub fn output_path(&self, record: &Record) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", record.name, self.extension))
    }

    /// The yt-dlp output template for a record (`<dir>/<name>.%(ext)s`).
    ///
    /// yt-dlp fills in the real extension itself; post-processing converts
    /// to the configured one.
    #[must_use]
    pub fn output_template(&self, record: &Record) -> String {
        self.output_dir
            .join(format!("{}.%(ext)s", record.name))
            .display()
            .to_string()
    }

    /// Make sure the output directory exists, asking before creating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DirectoryDeclined`] if the user answers no,
    /// or [`ConfigError::Io`] if creation fails.
    pub fn ensure_output_dir(&self, log: &Logger) -> Result<(), ConfigError> {
        if self.output_dir.exists() {
            return Ok(());
        }

        let dir = self.output_dir.display().to_string();
        let created = log
            .confirm(&format!("Output directory '{dir}' does not exist. Create it?"))
            .map_err(|source| ConfigError::Io {
                path: dir.clone(),
                source,
            })?;
        if !created {
            return Err(ConfigError::DirectoryDeclined(dir));
        }

        std::fs::create_dir_all(&self.output_dir).map_err(|source| ConfigError::Io {
            path: dir.clone(),
            source,
        })?;
        log.info(&format!("created directory: {dir}"));
        Ok(())
    }
}
