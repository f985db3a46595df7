//! Export orchestration: replay → capture → assemble.
//!
//! The orchestrator owns the run lock and the observable run record. A run
//! works on an immutable snapshot of the conversation and a view nobody else
//! can see, so the caller's state is never touched while frames are taken.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chatshot_chat_model::Conversation;
use chatshot_common::clock::{reveal_pause, scroll_settle, ProgressWeights, RunClock};
use chatshot_common::config::{AssetConfig, ExportSettings};
use chatshot_common::error::{ChatshotError, ChatshotResult};

use crate::assets::{AssetLoader, AssetSet, FsAssetLoader};
use crate::encode::{encode_png, AnimationEncoder, EncodeOptions, GifAnimationEncoder};
use crate::progress::{ExportProgress, ExportRun, ProgressCallback, RunStatus};
use crate::raster::{surface_size, CaptureOptions, Rasterizer, SoftwareRasterizer};
use crate::view::{PhoneViewBuilder, ViewBuilder};

/// What an export produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    StillPng,
    AnimatedGif,
}

impl ArtifactKind {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::StillPng => "chat-screenshot.png",
            Self::AnimatedGif => "chat-animation.gif",
        }
    }
}

/// Encoded export result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub kind: ArtifactKind,
    pub bytes: Vec<u8>,
    pub frame_count: usize,
    pub width: u32,
    pub height: u32,
}

impl ExportArtifact {
    pub fn file_name(&self) -> &'static str {
        self.kind.file_name()
    }

    /// Write the artifact into `dir` under its fixed file name.
    pub fn write_to(&self, dir: &Path) -> ChatshotResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Drives export runs. At most one run is active at a time.
pub struct ExportOrchestrator {
    settings: ExportSettings,
    loader: Box<dyn AssetLoader>,
    builder: Box<dyn ViewBuilder>,
    rasterizer: Box<dyn Rasterizer>,
    encoder: Box<dyn AnimationEncoder>,
    active: AtomicBool,
    run: Mutex<ExportRun>,
    on_progress: Option<ProgressCallback>,
}

/// Holds the run lock; releasing it on drop covers every exit path,
/// including a dropped run future.
struct RunGuard<'a> {
    active: &'a AtomicBool,
    run: &'a Mutex<ExportRun>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let mut run = self.run.lock().unwrap_or_else(|p| p.into_inner());
        if run.status.is_active() {
            run.status = RunStatus::Failed;
            run.label = "Export cancelled".to_string();
            run.error = Some("cancelled".to_string());
        }
        drop(run);
        self.active.store(false, Ordering::Release);
    }
}

impl ExportOrchestrator {
    /// Orchestrator with the default phone view, software rasterizer, GIF
    /// encoder and filesystem assets.
    pub fn new(settings: ExportSettings, assets: AssetConfig) -> Self {
        Self {
            settings,
            loader: Box::new(FsAssetLoader::new(assets)),
            builder: Box::new(PhoneViewBuilder),
            rasterizer: Box::new(SoftwareRasterizer),
            encoder: Box::new(GifAnimationEncoder),
            active: AtomicBool::new(false),
            run: Mutex::new(ExportRun::default()),
            on_progress: None,
        }
    }

    pub fn with_loader(mut self, loader: Box<dyn AssetLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_view_builder(mut self, builder: Box<dyn ViewBuilder>) -> Self {
        self.builder = builder;
        self
    }

    pub fn with_rasterizer(mut self, rasterizer: Box<dyn Rasterizer>) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    pub fn with_encoder(mut self, encoder: Box<dyn AnimationEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Current or last finished run.
    pub fn snapshot(&self) -> ExportRun {
        self.lock_run().clone()
    }

    /// Export `conversation` as a looping animation, one frame per message.
    pub async fn run_export(&self, conversation: &Conversation) -> ChatshotResult<ExportArtifact> {
        let Some(_guard) = self.try_begin() else {
            tracing::debug!("Export already running; request ignored");
            return Err(ChatshotError::AlreadyRunning);
        };
        if conversation.is_empty() {
            return Err(ChatshotError::EmptyConversation);
        }

        let snapshot = Arc::new(conversation.clone());
        let mut clock = RunClock::start();
        self.begin(snapshot.len());
        tracing::info!(
            messages = snapshot.len(),
            started = clock.epoch_wall(),
            "Starting animated export"
        );

        let result = self.animate(snapshot, &mut clock).await;
        self.finish(&result, &clock);
        result
    }

    /// Export the full conversation as a single PNG, scrolled to the bottom.
    pub async fn export_still(&self, conversation: &Conversation) -> ChatshotResult<ExportArtifact> {
        let Some(_guard) = self.try_begin() else {
            tracing::debug!("Export already running; request ignored");
            return Err(ChatshotError::AlreadyRunning);
        };

        let snapshot = Arc::new(conversation.clone());
        let mut clock = RunClock::start();
        self.begin(1);
        tracing::info!(messages = snapshot.len(), "Starting still export");

        let result = self.still(snapshot, &mut clock).await;
        self.finish(&result, &clock);
        result
    }

    async fn animate(
        &self,
        snapshot: Arc<Conversation>,
        clock: &mut RunClock,
    ) -> ChatshotResult<ExportArtifact> {
        let total = snapshot.len();
        let weights = ProgressWeights::new(self.settings.capture_weight);

        let assets = self.load_assets(&snapshot).await?;
        let mut view = self.builder.build(Arc::clone(&snapshot), assets)?;
        view.set_prefix(0);
        tracing::debug!(elapsed_ms = clock.lap_ms(), "Assets ready");

        self.update(|run| {
            run.status = RunStatus::Capturing;
            run.label = format!("Capturing frame 1 of {total}");
        });

        let pause = reveal_pause(
            snapshot.timing.reveal_delay.secs(),
            self.settings.reveal_pacing_factor,
        );
        let settle = scroll_settle(self.settings.scroll_settle_ms);
        let scale = self.settings.resolution_scale as f32;
        let capture = CaptureOptions {
            background: None,
            scale,
        };

        let mut frames = Vec::with_capacity(total);
        for i in 1..=total {
            view.set_prefix(i);
            pace(pause).await;
            if view.overflows() {
                view.scroll_to_bottom();
                pace(settle).await;
            }

            let frame = self
                .rasterizer
                .capture(view.as_ref(), &capture)
                .await
                .map_err(|e| ChatshotError::rasterize(i, e.to_string()))?;
            frames.push(frame);

            self.update(|run| {
                run.frames_captured = i;
                run.progress = weights.capturing(i, total);
                run.label = format!("Capturing frame {i} of {total}");
            });
            tracing::debug!(frame = i, total_frames = total, "Frame captured");
        }
        tracing::info!(
            total_frames = total,
            elapsed_ms = clock.lap_ms(),
            "Capture complete"
        );

        let (width, height) = surface_size(view.logical_size(), scale)?;
        let options = EncodeOptions {
            width,
            height,
            frame_interval: snapshot.timing.frame_hold.duration(),
            looping: true,
            quality: self.settings.gif_quality,
        };
        self.update(|run| {
            run.status = RunStatus::Encoding;
            run.progress = weights.encoding(0.0);
            run.label = "Encoding animation".to_string();
        });

        let frame_count = frames.len();
        let bytes = self
            .encoder
            .encode(frames, &options, &mut |p| {
                self.update(|run| run.progress = run.progress.max(weights.encoding(p)))
            })
            .await
            .map_err(|e| match e {
                ChatshotError::Encode { .. } => e,
                other => ChatshotError::encode(other.to_string()),
            })?;
        tracing::info!(
            bytes = bytes.len(),
            elapsed_ms = clock.lap_ms(),
            "Encoding complete"
        );

        Ok(ExportArtifact {
            kind: ArtifactKind::AnimatedGif,
            bytes,
            frame_count,
            width,
            height,
        })
    }

    async fn still(
        &self,
        snapshot: Arc<Conversation>,
        clock: &mut RunClock,
    ) -> ChatshotResult<ExportArtifact> {
        let weights = ProgressWeights::new(self.settings.capture_weight);

        let assets = self.load_assets(&snapshot).await?;
        let mut view = self.builder.build(Arc::clone(&snapshot), assets)?;
        view.set_prefix(snapshot.len());
        if view.overflows() {
            view.scroll_to_bottom();
        }
        tracing::debug!(elapsed_ms = clock.lap_ms(), "Assets ready");

        self.update(|run| {
            run.status = RunStatus::Capturing;
            run.label = "Capturing screenshot".to_string();
        });
        let capture = CaptureOptions {
            background: None,
            scale: self.settings.still_scale as f32,
        };
        let image = self
            .rasterizer
            .capture(view.as_ref(), &capture)
            .await
            .map_err(|e| ChatshotError::rasterize(1, e.to_string()))?;

        self.update(|run| {
            run.frames_captured = 1;
            run.status = RunStatus::Encoding;
            run.progress = weights.capturing(1, 1);
            run.label = "Encoding PNG".to_string();
        });

        let (width, height) = image.dimensions();
        let bytes = tokio::task::spawn_blocking(move || encode_png(&image))
            .await
            .map_err(|e| ChatshotError::encode(format!("PNG task failed: {e}")))??;
        tracing::info!(bytes = bytes.len(), width, height, "Screenshot encoded");

        Ok(ExportArtifact {
            kind: ArtifactKind::StillPng,
            bytes,
            frame_count: 1,
            width,
            height,
        })
    }

    /// Asset barrier: everything render-blocking, bounded by the configured
    /// timeout.
    async fn load_assets(&self, conversation: &Conversation) -> ChatshotResult<AssetSet> {
        let secs = self.settings.asset_timeout_secs;
        match tokio::time::timeout(Duration::from_secs(secs), self.loader.load(conversation)).await
        {
            Ok(Ok(assets)) => Ok(assets),
            Ok(Err(e @ ChatshotError::AssetLoad { .. })) => Err(e),
            Ok(Err(other)) => Err(ChatshotError::asset_load(other.to_string())),
            Err(_) => Err(ChatshotError::AssetLoadTimeout { timeout_secs: secs }),
        }
    }

    fn try_begin(&self) -> Option<RunGuard<'_>> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard {
                active: &self.active,
                run: &self.run,
            })
    }

    fn begin(&self, total_frames: usize) {
        self.update(|run| *run = ExportRun::preparing(total_frames));
    }

    fn finish(&self, result: &ChatshotResult<ExportArtifact>, clock: &RunClock) {
        match result {
            Ok(artifact) => {
                self.update(|run| {
                    run.status = RunStatus::Done;
                    run.progress = 1.0;
                    run.label = "Done".to_string();
                });
                tracing::info!(
                    file = artifact.file_name(),
                    frames = artifact.frame_count,
                    elapsed_ms = clock.elapsed_ms(),
                    "Export finished"
                );
            }
            Err(e) => {
                self.update(|run| {
                    run.status = RunStatus::Failed;
                    run.label = format!("Failed: {e}");
                    run.error = Some(e.to_string());
                });
                tracing::error!(error = %e, elapsed_ms = clock.elapsed_ms(), "Export failed");
            }
        }
    }

    fn update(&self, change: impl FnOnce(&mut ExportRun)) {
        let event: ExportProgress = {
            let mut run = self.lock_run();
            change(&mut run);
            run.to_progress()
        };
        if let Some(callback) = &self.on_progress {
            callback(event);
        }
    }

    fn lock_run(&self) -> MutexGuard<'_, ExportRun> {
        self.run.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// Suspend for `d`, or just yield when there is nothing to wait for.
async fn pace(d: Duration) {
    if d.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(d).await;
    }
}
